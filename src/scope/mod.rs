//! Lexical scopes and the symbols declared in them.
//!
//! Scopes form a tree mirroring the block structure of the source.  All scopes and symbols of a
//! program are owned by a single [`Scopes`] arena and referred to by handles.
use std::collections;
use std::fmt;

use crate::ast;
use crate::ty;

mod error;
mod symbol;

pub use self::error::Error;
pub use self::error::Result;
pub use self::symbol::Symbol;
pub use self::symbol::SymbolId;
pub use self::symbol::SymbolKind;

/// The reserved name of the global scope.
pub const GLOBAL_SCOPE_NAME: &str = "$$GLOBAL$$";

/// A handle to a scope stored in [`Scopes`].
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ScopeId(u32);

/// A tree of scopes together with all of their symbols.
#[derive(Clone, Debug, PartialEq)]
pub struct Scopes {
    scopes: Vec<Scope>,
    symbols: Vec<Symbol>,
    anonymous_count: u32,
}

/// A lexical naming region.
#[derive(Clone, Debug, PartialEq)]
pub struct Scope {
    name: String,
    parent: Option<ScopeId>,
    children: Vec<ScopeId>,
    table: SymbolTable,
}

/// The symbols declared directly in one scope, by name.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SymbolTable {
    symbols: collections::BTreeMap<String, SymbolId>,
}

impl Scopes {
    /// Creates a scope tree containing only the global scope.
    pub fn new() -> Self {
        let scopes = vec![Scope::new(GLOBAL_SCOPE_NAME.to_owned(), None)];
        let symbols = Vec::new();
        let anonymous_count = 0;

        Scopes {
            scopes,
            symbols,
            anonymous_count,
        }
    }

    /// The global scope, which has no parent.
    pub fn global(&self) -> ScopeId {
        ScopeId(0)
    }

    /// Creates a named child scope of `parent`.
    pub fn create_scope(&mut self, name: String, parent: ScopeId) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(Scope::new(name, Some(parent)));
        self.scope_mut(parent).children.push(id);
        id
    }

    /// Creates a child scope of `parent` with a generated name.
    pub fn create_anonymous_scope(&mut self, parent: ScopeId) -> ScopeId {
        self.anonymous_count += 1;
        let name = format!("anonScope{}", self.anonymous_count);
        self.create_scope(name, parent)
    }

    /// Looks up a scope.
    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.0 as usize]
    }

    fn scope_mut(&mut self, id: ScopeId) -> &mut Scope {
        &mut self.scopes[id.0 as usize]
    }

    /// The name of a scope.
    pub fn name(&self, id: ScopeId) -> &str {
        &self.scope(id).name
    }

    /// The parent of a scope; `None` for the global scope.
    pub fn parent(&self, id: ScopeId) -> Option<ScopeId> {
        self.scope(id).parent
    }

    /// The child scopes of a scope, in creation order.
    pub fn children(&self, id: ScopeId) -> &[ScopeId] {
        &self.scope(id).children
    }

    /// Whether `id` refers to the global scope.
    pub fn is_global(&self, id: ScopeId) -> bool {
        self.parent(id).is_none()
    }

    /// Iterates over a scope and all of its ancestors, innermost first.
    pub fn ancestry(&self, id: ScopeId) -> impl Iterator<Item = ScopeId> + '_ {
        let mut next = Some(id);
        std::iter::from_fn(move || {
            let current = next?;
            next = self.parent(current);
            Some(current)
        })
    }

    /// Looks up a symbol.
    pub fn symbol_info(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id.0 as usize]
    }

    /// The symbols declared directly in a scope, ordered by name.
    pub fn symbols(&self, scope: ScopeId) -> impl Iterator<Item = SymbolId> + '_ {
        self.scope(scope).table.symbols.values().cloned()
    }

    /// Declares a variable of unknown type.
    ///
    /// This does nothing if a symbol with the same name already exists in this very scope.
    pub fn declare_variable(
        &mut self,
        scope: ScopeId,
        name: &str,
        site: Option<ast::NodeId>,
    ) -> SymbolId {
        if let Some(existing) = self.scope(scope).table.get(name) {
            return existing;
        }
        trace!("declaring {:?} in {}", name, self.absolute_name(scope));
        self.insert(scope, name, ty::TermType::Unknown, site)
    }

    /// Defines a variable with a concrete type.
    ///
    /// A variable declared with an unknown type gets its type established; a variable that
    /// already has a different type causes a [`Error::TypeConflict`].
    pub fn define_variable(
        &mut self,
        scope: ScopeId,
        name: &str,
        site: Option<ast::NodeId>,
        ty: ty::TermType,
    ) -> Result<SymbolId> {
        if !ty.is_concrete() {
            let name = name.to_owned();
            return Err(Error::NotConcrete { name, ty });
        }

        match self.scope(scope).table.get(name) {
            None => Ok(self.insert(scope, name, ty, site)),
            Some(id) => {
                let existing = self.symbol_info(id).ty();
                if existing == ty {
                    Ok(id)
                } else if existing == ty::TermType::Unknown {
                    let symbol = &mut self.symbols[id.0 as usize];
                    symbol.set_ty(ty);
                    symbol.set_site(site);
                    Ok(id)
                } else {
                    let name = name.to_owned();
                    Err(Error::TypeConflict {
                        name,
                        existing,
                        new: ty,
                    })
                }
            }
        }
    }

    /// Looks up a symbol by name, optionally searching enclosing scopes.
    pub fn symbol(&self, scope: ScopeId, name: &str, search_parents: bool) -> Result<SymbolId> {
        let found = if search_parents {
            self.ancestry(scope)
                .filter_map(|s| self.scope(s).table.get(name))
                .next()
        } else {
            self.scope(scope).table.get(name)
        };

        found.ok_or_else(|| Error::UnknownIdentifier {
            name: name.to_owned(),
        })
    }

    /// Whether a symbol with the given name is visible.
    pub fn has_symbol(&self, scope: ScopeId, name: &str, search_parents: bool) -> bool {
        self.symbol(scope, name, search_parents).is_ok()
    }

    /// The fully qualified name of a scope, joining the names of all enclosing scopes.
    pub fn absolute_name(&self, scope: ScopeId) -> String {
        let mut names = self.ancestry(scope).map(|s| self.name(s)).collect::<Vec<_>>();
        names.reverse();
        names.join(".")
    }

    /// The fully qualified name of a symbol.
    pub fn symbol_absolute_name(&self, id: SymbolId) -> String {
        let symbol = self.symbol_info(id);
        format!("{}${}", self.absolute_name(symbol.scope()), symbol.name())
    }

    fn insert(
        &mut self,
        scope: ScopeId,
        name: &str,
        ty: ty::TermType,
        site: Option<ast::NodeId>,
    ) -> SymbolId {
        let id = SymbolId(self.symbols.len() as u32);
        self.symbols
            .push(Symbol::variable(name.to_owned(), scope, ty, site));
        self.scope_mut(scope)
            .table
            .symbols
            .insert(name.to_owned(), id);
        id
    }
}

impl Default for Scopes {
    fn default() -> Self {
        Scopes::new()
    }
}

impl Scope {
    fn new(name: String, parent: Option<ScopeId>) -> Self {
        let children = Vec::new();
        let table = SymbolTable::default();

        Scope {
            name,
            parent,
            children,
            table,
        }
    }

    /// The name of this scope.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The symbols declared directly in this scope.
    pub fn table(&self) -> &SymbolTable {
        &self.table
    }
}

impl SymbolTable {
    /// Looks up a symbol declared directly in this table.
    pub fn get(&self, name: &str) -> Option<SymbolId> {
        self.symbols.get(name).cloned()
    }

    /// The number of symbols in this table.
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Whether this table is empty.
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "scope#{}", self.0)
    }
}
