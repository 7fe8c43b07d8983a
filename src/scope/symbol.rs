use std::fmt;

use crate::ast;
use crate::scope;
use crate::ty;

/// A handle to a symbol stored in [`scope::Scopes`].
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct SymbolId(pub(super) u32);

/// A named entity declared in a scope.
#[derive(Clone, Debug, PartialEq)]
pub struct Symbol {
    name: String,
    scope: scope::ScopeId,
    kind: SymbolKind,
    site: Option<ast::NodeId>,
}

/// What kind of entity a symbol refers to.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SymbolKind {
    /// A variable, with its currently known type.
    Variable {
        /// The type of the variable; `Unknown` until the first definition.
        ty: ty::TermType,
    },
}

impl Symbol {
    pub(super) fn variable(
        name: String,
        scope: scope::ScopeId,
        ty: ty::TermType,
        site: Option<ast::NodeId>,
    ) -> Self {
        let kind = SymbolKind::Variable { ty };
        Symbol {
            name,
            scope,
            kind,
            site,
        }
    }

    /// The local name of this symbol.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The scope that owns this symbol.
    pub fn scope(&self) -> scope::ScopeId {
        self.scope
    }

    /// The kind of this symbol.
    pub fn kind(&self) -> SymbolKind {
        self.kind
    }

    /// The AST node that declared this symbol, if any.
    pub fn site(&self) -> Option<ast::NodeId> {
        self.site
    }

    /// The type of this symbol.
    pub fn ty(&self) -> ty::TermType {
        match self.kind {
            SymbolKind::Variable { ty } => ty,
        }
    }

    pub(super) fn set_ty(&mut self, ty: ty::TermType) {
        self.kind = SymbolKind::Variable { ty };
    }

    pub(super) fn set_site(&mut self, site: Option<ast::NodeId>) {
        if site.is_some() {
            self.site = site;
        }
    }
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            SymbolKind::Variable { ty } => write!(f, "variable of type {}", ty),
        }
    }
}
