//! The abstract syntax tree of L-system source code.
//!
//! Nodes live in an arena owned by [`Ast`] and refer to each other through [`NodeId`] handles, so
//! that a node can be spliced out of its parent in constant time.  The [`Ast`] also owns the
//! scope tree that was built while parsing.
use std::fmt;

use crate::scope;
use crate::syntax;

pub mod printer;
pub mod visitor;

pub use self::visitor::Flow;

/// A handle to a node stored in an [`Ast`].
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct NodeId(u32);

/// An abstract syntax tree together with its scopes.
#[derive(Clone, Debug, PartialEq)]
pub struct Ast {
    nodes: Vec<Node>,
    root: NodeId,
    scopes: scope::Scopes,
}

/// A single node in an [`Ast`].
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    kind: NodeKind,
    region: syntax::TextRegion,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// The different kinds of AST nodes.
#[derive(Clone, Debug, PartialEq)]
pub enum NodeKind {
    /// The root of the tree, owning the global scope; children are statements.
    Root {
        /// The global scope.
        scope: scope::ScopeId,
    },
    /// A statement wrapping exactly one assignment, rule definition, block or expression.
    Statement,
    /// `set <name> = <expression>`; the only child is the expression.
    Assignment {
        /// The assigned variable.
        name: String,
        /// The scope the assignment appears in.
        scope: scope::ScopeId,
    },
    /// `rule [<name>] : <expected> -> <replacement>`.
    RuleDefinition {
        /// The optional rule name.
        name: Option<String>,
        /// The pattern to rewrite.
        expected: String,
        /// What to rewrite the pattern to.
        replacement: String,
    },
    /// `{ <statements> }`, owning a scope of its own; children are statements.
    Block {
        /// The scope of this block.
        scope: scope::ScopeId,
    },
    /// An expression with exactly one child: an operator, identifier or literal.
    Expression,
    /// A binary operator; the children are the left and right operands.
    Operator(Operator),
    /// A reference to a variable.
    Identifier {
        /// The referenced name.
        name: String,
        /// The scope the identifier appears in.
        scope: scope::ScopeId,
    },
    /// A number literal.
    Number(Number),
    /// A string literal.
    String(String),
}

/// A number literal.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Number {
    /// A number written without a decimal point.
    Integer(i64),
    /// A number written with a decimal point.
    Float(f64),
}

/// Operators that may appear in expressions.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Operator {
    /// `+`
    Add,
    /// `-`
    Subtract,
    /// `*`
    Multiply,
    /// `/`
    Divide,
    /// `(`, only ever seen on the operator stack while parsing.
    Parens,
}

impl Ast {
    /// Creates an AST consisting of only a root node, with a fresh global scope.
    pub fn new() -> Self {
        let scopes = scope::Scopes::new();
        let root = NodeId(0);
        let nodes = vec![Node::new(
            NodeKind::Root {
                scope: scopes.global(),
            },
            syntax::TextRegion::default(),
        )];

        Ast {
            nodes,
            root,
            scopes,
        }
    }

    /// The root node.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// The scopes of this AST.
    pub fn scopes(&self) -> &scope::Scopes {
        &self.scopes
    }

    /// The scopes of this AST, for defining symbols.
    pub fn scopes_mut(&mut self) -> &mut scope::Scopes {
        &mut self.scopes
    }

    /// The number of nodes in the arena, including detached ones.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the arena holds only the root node.
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// Allocates a new detached node.
    pub fn new_node(&mut self, kind: NodeKind, region: syntax::TextRegion) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node::new(kind, region));
        id
    }

    /// Looks up a node.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0 as usize]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0 as usize]
    }

    /// The kind of a node.
    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.node(id).kind
    }

    /// Appends `child` to the children of `parent`, detaching it from any previous parent.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.node_mut(child).parent = Some(parent);
        self.node_mut(parent).children.push(child);
    }

    /// The child of `node` at `index`.
    pub fn child(&self, node: NodeId, index: usize) -> Option<NodeId> {
        self.node(node).children.get(index).cloned()
    }

    /// The children of `node`, in order.
    pub fn children(&self, node: NodeId) -> &[NodeId] {
        &self.node(node).children
    }

    /// The parent of `node`, or `None` for the root and detached nodes.
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.node(node).parent
    }

    /// Replaces `old` with `new` among the children of `parent`.
    ///
    /// Returns `false` if `old` is not a child of `parent`.
    pub fn replace_child(&mut self, parent: NodeId, old: NodeId, new: NodeId) -> bool {
        if !self.children(parent).contains(&old) {
            return false;
        }
        if old == new {
            return true;
        }

        self.detach(new);
        let position = match self.children(parent).iter().position(|&c| c == old) {
            Some(position) => position,
            None => return false,
        };
        self.node_mut(parent).children[position] = new;
        self.node_mut(new).parent = Some(parent);
        self.node_mut(old).parent = None;
        true
    }

    /// Replaces `node` with `new` in the parent of `node`.
    ///
    /// Returns `false` if `node` has no parent.
    pub fn replace_with(&mut self, node: NodeId, new: NodeId) -> bool {
        match self.parent(node) {
            Some(parent) => self.replace_child(parent, node, new),
            None => false,
        }
    }

    /// Creates a detached copy of `node`, optionally copying all descendants as well.
    pub fn create_copy(&mut self, node: NodeId, include_children: bool) -> NodeId {
        let original = self.node(node);
        let kind = original.kind.clone();
        let region = original.region;
        let children = original.children.clone();

        let copy = self.new_node(kind, region);
        if include_children {
            for child in children {
                let child_copy = self.create_copy(child, true);
                self.add_child(copy, child_copy);
            }
        }
        copy
    }

    /// The region of source text that `node` itself was parsed from.
    pub fn region(&self, node: NodeId) -> syntax::TextRegion {
        self.node(node).region
    }

    /// The region of source text covering `node` and all of its descendants.
    pub fn region_including_children(&self, node: NodeId) -> syntax::TextRegion {
        self.children(node)
            .iter()
            .fold(self.region(node), |region, &child| {
                region.merge(self.region_including_children(child))
            })
    }

    /// The scope that `node` is defined in: the scope of the nearest enclosing block, or the
    /// global scope.
    pub fn definition_scope(&self, node: NodeId) -> scope::ScopeId {
        let mut current = Some(node);
        while let Some(id) = current {
            if let Some(scope) = self.kind(id).scope_owner() {
                return scope;
            }
            current = self.parent(id);
        }
        self.scopes.global()
    }

    /// Finds all nodes below (and including) the root that satisfy `predicate`, in document
    /// order.
    pub fn find<F>(&self, mut predicate: F) -> Vec<NodeId>
    where
        F: FnMut(&NodeKind) -> bool,
    {
        let mut result = Vec::new();
        self.visit_in_order(self.root, |ast, node| {
            if predicate(ast.kind(node)) {
                result.push(node);
            }
            Flow::Continue
        });
        result
    }

    /// The statements at the top level of the tree.
    pub fn statements(&self) -> &[NodeId] {
        self.children(self.root)
    }

    /// A one-line description of a node, for debugging.
    pub fn debug_string(&self, node: NodeId) -> String {
        format!(
            "{} {} {}",
            self.kind(node),
            self.region(node),
            self.region_including_children(node)
        )
    }

    /// An indented description of a node and all of its descendants, for debugging.
    pub fn dump(&self, node: NodeId) -> String {
        let mut result = String::new();
        self.dump_into(node, 0, &mut result);
        result
    }

    fn dump_into(&self, node: NodeId, depth: usize, out: &mut String) {
        for _ in 0..depth {
            out.push_str("  ");
        }
        out.push_str(&self.debug_string(node));
        out.push('\n');
        for &child in self.children(node) {
            self.dump_into(child, depth + 1, out);
        }
    }

    fn detach(&mut self, node: NodeId) {
        if let Some(parent) = self.node_mut(node).parent.take() {
            self.node_mut(parent).children.retain(|&c| c != node);
        }
    }
}

impl Default for Ast {
    fn default() -> Self {
        Ast::new()
    }
}

impl Node {
    fn new(kind: NodeKind, region: syntax::TextRegion) -> Self {
        let parent = None;
        let children = Vec::new();

        Node {
            kind,
            region,
            parent,
            children,
        }
    }

    /// The kind of this node.
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// The region of source text this node was parsed from.
    pub fn region(&self) -> syntax::TextRegion {
        self.region
    }

    /// The parent of this node.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// The children of this node.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

impl NodeId {
    /// The position of this node in its arena.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl NodeKind {
    /// The scope owned by this node, for the root and blocks.
    pub fn scope_owner(&self) -> Option<scope::ScopeId> {
        match *self {
            NodeKind::Root { scope } | NodeKind::Block { scope } => Some(scope),
            _ => None,
        }
    }

    /// Whether this is a number or string literal.
    pub fn is_literal(&self) -> bool {
        match *self {
            NodeKind::Number(_) | NodeKind::String(_) => true,
            _ => false,
        }
    }
}

impl Operator {
    /// Parses an operator token.
    pub fn from_symbol(symbol: &str) -> Option<Operator> {
        match symbol {
            "+" => Some(Operator::Add),
            "-" => Some(Operator::Subtract),
            "*" => Some(Operator::Multiply),
            "/" => Some(Operator::Divide),
            "(" => Some(Operator::Parens),
            _ => None,
        }
    }

    /// The binding strength of this operator; higher binds tighter.
    pub fn precedence(self) -> u32 {
        match self {
            Operator::Add | Operator::Subtract => 1,
            Operator::Multiply | Operator::Divide => 2,
            Operator::Parens => 100,
        }
    }

    /// Whether operators of equal precedence group to the left.
    pub fn is_left_associative(self) -> bool {
        match self {
            Operator::Parens => false,
            _ => true,
        }
    }

    /// The number of operands this operator takes.
    pub fn arity(self) -> usize {
        match self {
            Operator::Parens => 1,
            _ => 2,
        }
    }

    /// The source symbol of this operator.
    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Add => "+",
            Operator::Subtract => "-",
            Operator::Multiply => "*",
            Operator::Divide => "/",
            Operator::Parens => "(",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Number::Integer(v) => write!(f, "{}", v),
            Number::Float(v) => write!(f, "{:?}", v),
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            NodeKind::Root { scope } => write!(f, "Root({})", scope),
            NodeKind::Statement => f.write_str("Statement"),
            NodeKind::Assignment { ref name, .. } => write!(f, "Assignment({})", name),
            NodeKind::RuleDefinition {
                ref name,
                ref expected,
                ref replacement,
            } => write!(
                f,
                "RuleDefinition({}: {} -> {})",
                name.as_ref().map_or("", String::as_str),
                expected,
                replacement
            ),
            NodeKind::Block { scope } => write!(f, "Block({})", scope),
            NodeKind::Expression => f.write_str("Expression"),
            NodeKind::Operator(operator) => write!(f, "Operator({})", operator),
            NodeKind::Identifier { ref name, .. } => write!(f, "Identifier({})", name),
            NodeKind::Number(number) => write!(f, "Number({})", number),
            NodeKind::String(ref string) => write!(f, "String({:?})", string),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn number(ast: &mut Ast, value: i64, offset: usize) -> NodeId {
        ast.new_node(
            NodeKind::Number(Number::Integer(value)),
            syntax::TextRegion::new(offset, 1),
        )
    }

    #[test]
    fn add_and_replace_children() {
        let _ = env_logger::try_init();

        let mut ast = Ast::new();
        let operator = ast.new_node(
            NodeKind::Operator(Operator::Add),
            syntax::TextRegion::new(2, 1),
        );
        let one = number(&mut ast, 1, 0);
        let two = number(&mut ast, 2, 4);
        ast.add_child(operator, one);
        ast.add_child(operator, two);

        assert_eq!(&[one, two], ast.children(operator));
        assert_eq!(Some(operator), ast.parent(one));
        assert_eq!(Some(two), ast.child(operator, 1));
        assert_eq!(None, ast.child(operator, 2));

        let three = number(&mut ast, 3, 4);
        assert!(ast.replace_with(two, three));
        assert_eq!(&[one, three], ast.children(operator));
        assert_eq!(None, ast.parent(two));
        assert_eq!(Some(operator), ast.parent(three));

        assert!(!ast.replace_child(operator, two, one));
        assert!(!ast.replace_with(operator, one));
    }

    #[test]
    fn moving_a_child_detaches_it() {
        let _ = env_logger::try_init();

        let mut ast = Ast::new();
        let a = ast.new_node(NodeKind::Expression, syntax::TextRegion::default());
        let b = ast.new_node(NodeKind::Expression, syntax::TextRegion::default());
        let leaf = number(&mut ast, 1, 0);

        ast.add_child(a, leaf);
        ast.add_child(b, leaf);

        assert!(ast.children(a).is_empty());
        assert_eq!(&[leaf], ast.children(b));
    }

    #[test]
    fn regions() {
        let _ = env_logger::try_init();

        let mut ast = Ast::new();
        let operator = ast.new_node(
            NodeKind::Operator(Operator::Multiply),
            syntax::TextRegion::new(2, 1),
        );
        let one = number(&mut ast, 1, 0);
        let two = number(&mut ast, 2, 4);
        ast.add_child(operator, one);
        ast.add_child(operator, two);

        assert_eq!(syntax::TextRegion::new(2, 1), ast.region(operator));
        assert_eq!(
            syntax::TextRegion::new(0, 5),
            ast.region_including_children(operator)
        );
    }

    #[test]
    fn copies_are_independent() {
        let _ = env_logger::try_init();

        let mut ast = Ast::new();
        let operator = ast.new_node(
            NodeKind::Operator(Operator::Add),
            syntax::TextRegion::new(2, 1),
        );
        let one = number(&mut ast, 1, 0);
        let two = number(&mut ast, 2, 4);
        ast.add_child(operator, one);
        ast.add_child(operator, two);

        let shallow = ast.create_copy(operator, false);
        assert!(ast.children(shallow).is_empty());
        assert_eq!(ast.kind(operator), ast.kind(shallow));

        let deep = ast.create_copy(operator, true);
        let deep_children = ast.children(deep).to_vec();
        assert_eq!(2, deep_children.len());
        assert_ne!(one, deep_children[0]);
        assert_eq!(ast.kind(one), ast.kind(deep_children[0]));

        let five = number(&mut ast, 5, 0);
        assert!(ast.replace_with(deep_children[0], five));
        assert_eq!(&[one, two], ast.children(operator));
        assert_eq!(None, ast.parent(deep));
    }

    #[test]
    fn operator_properties() {
        assert_eq!(1, Operator::Add.precedence());
        assert_eq!(2, Operator::Divide.precedence());
        assert_eq!(100, Operator::Parens.precedence());
        assert!(!Operator::Parens.is_left_associative());
        assert!(Operator::Subtract.is_left_associative());
        assert_eq!(1, Operator::Parens.arity());
        assert_eq!(2, Operator::Multiply.arity());
        assert_eq!(Some(Operator::Divide), Operator::from_symbol("/"));
        assert_eq!(None, Operator::from_symbol("%"));
    }
}
