//! Graph rendering tools for parsed L-system programs.
//!
//! Use this module to diagnose how a piece of source code was understood.  Every AST node becomes
//! a graph node, labelled with its kind, source region and, for variables, the type that is known
//! for the variable.
//!
//! # Examples
//!
//! ```
//! # extern crate failure;
//! # extern crate lsystems;
//! # fn main() -> Result<(), failure::Error> {
//! let mut lsystems = lsystems::LSystems::new();
//! let program = lsystems.load("tree.ls", "set axiom = \"F\"\nset recursionCount = 1 + 1\n")?;
//!
//! let mut output = Vec::new();
//! program.graph().render(&mut output)?;
//! assert!(String::from_utf8(output)?.starts_with("digraph ast {"));
//! # Ok(())
//! # }
//! ```
use std::borrow;
use std::fmt;
use std::io;

use crate::ast;

/// A graph representation of an AST.
pub struct Graph<'a> {
    ast: &'a ast::Ast,
}

/// A node in the AST graph.
#[derive(Clone, Copy, Debug)]
pub struct Node(ast::NodeId);

/// An edge in the AST graph.
#[derive(Clone, Copy, Debug)]
pub struct Edge {
    source: Node,
    target: Node,
    label: Label,
}

#[derive(Clone, Copy, Debug)]
enum Label {
    Statement(usize),
    Content,
    AssignedValue,
    Lhs,
    Rhs,
}

impl<'a> Graph<'a> {
    /// Creates a new graph of the supplied AST.
    pub(crate) fn new(ast: &'a ast::Ast) -> Graph<'a> {
        Graph { ast }
    }

    /// Writes this graph in the GraphViz dot format.
    pub fn render<W>(&self, output: &mut W) -> io::Result<()>
    where
        W: io::Write,
    {
        dot::render(self, output)
    }

    fn symbol_type(&self, node: ast::NodeId) -> Option<String> {
        let (name, scope) = match *self.ast.kind(node) {
            ast::NodeKind::Assignment { ref name, scope }
            | ast::NodeKind::Identifier { ref name, scope } => (name, scope),
            _ => return None,
        };
        let scopes = self.ast.scopes();
        scopes
            .symbol(scope, name, true)
            .ok()
            .map(|symbol| scopes.symbol_info(symbol).ty().to_string())
    }
}

impl<'a> dot::GraphWalk<'a, Node, Edge> for Graph<'a> {
    fn nodes(&'a self) -> borrow::Cow<'a, [Node]> {
        let mut nodes = Vec::new();
        self.ast.visit_in_order(self.ast.root(), |_, node| {
            nodes.push(Node(node));
            ast::Flow::Continue
        });
        borrow::Cow::Owned(nodes)
    }

    fn edges(&'a self) -> borrow::Cow<'a, [Edge]> {
        let mut edges = Vec::new();

        self.ast.visit_in_order(self.ast.root(), |tree, node| {
            for (idx, &child) in tree.children(node).iter().enumerate() {
                let label = match *tree.kind(node) {
                    ast::NodeKind::Root { .. } | ast::NodeKind::Block { .. } => {
                        Label::Statement(idx)
                    }
                    ast::NodeKind::Assignment { .. } => Label::AssignedValue,
                    ast::NodeKind::Operator(_) if idx == 0 => Label::Lhs,
                    ast::NodeKind::Operator(_) => Label::Rhs,
                    _ => Label::Content,
                };
                edges.push(Edge {
                    source: Node(node),
                    target: Node(child),
                    label,
                });
            }
            ast::Flow::Continue
        });

        borrow::Cow::Owned(edges)
    }

    fn source(&'a self, edge: &Edge) -> Node {
        edge.source
    }

    fn target(&'a self, edge: &Edge) -> Node {
        edge.target
    }
}

impl<'a> dot::Labeller<'a, Node, Edge> for Graph<'a> {
    fn graph_id(&'a self) -> dot::Id<'a> {
        dot::Id::new("ast").unwrap()
    }

    fn node_id(&'a self, n: &Node) -> dot::Id<'a> {
        dot::Id::new(format!("n{}", n.0.index())).unwrap()
    }

    fn node_shape(&'a self, _n: &Node) -> Option<dot::LabelText<'a>> {
        Some(dot::LabelText::LabelStr("record".into()))
    }

    fn node_label(&'a self, n: &Node) -> dot::LabelText<'a> {
        let kind = self.ast.kind(n.0);
        let mut result = format!(
            "({}) {} <br/> <font color=\"gray\">{}</font>",
            n.0.index(),
            escape(&kind.to_string()),
            self.ast.region(n.0)
        );

        if let Some(ty) = self.symbol_type(n.0) {
            result.push_str(&format!("<br/> <font color=\"blue\">{}</font>", ty));
        }

        if let Some(scope) = kind.scope_owner() {
            let scopes = self.ast.scopes();
            result.push_str(&format!(
                "<br/> <font color=\"purple\">{} ({} symbols)</font>",
                escape(&scopes.absolute_name(scope)),
                scopes.scope(scope).table().len()
            ));
        }

        dot::LabelText::HtmlStr(result.into())
    }

    fn edge_label(&'a self, e: &Edge) -> dot::LabelText<'a> {
        match e.label {
            Label::Statement(idx) => {
                dot::LabelText::HtmlStr(format!("stmt <b>{}</b>", idx).into())
            }
            Label::Content => dot::LabelText::LabelStr("".into()),
            Label::AssignedValue => dot::LabelText::LabelStr("value".into()),
            Label::Lhs => dot::LabelText::LabelStr("lhs".into()),
            Label::Rhs => dot::LabelText::LabelStr("rhs".into()),
        }
    }

    fn edge_style(&'a self, e: &Edge) -> dot::Style {
        match e.label {
            Label::Statement(_) => dot::Style::Dashed,
            Label::Content => dot::Style::Dotted,
            Label::AssignedValue | Label::Lhs | Label::Rhs => dot::Style::None,
        }
    }
}

impl<'a> fmt::Debug for Graph<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Graph")
            .field("nodes", &self.ast.len())
            .finish()
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::syntax;

    #[test]
    fn every_node_is_rendered() {
        let _ = env_logger::try_init();

        let ast = syntax::parse("set a = 1 + 2\nrule : F -> FF\n").unwrap();
        let graph = Graph::new(&ast);

        let nodes = dot::GraphWalk::nodes(&graph);
        let edges = dot::GraphWalk::edges(&graph);
        assert_eq!(nodes.len() - 1, edges.len());
        assert!(nodes.len() > 5);

        let mut output = Vec::new();
        graph.render(&mut output).unwrap();
        let output = String::from_utf8(output).unwrap();
        assert!(output.contains("Assignment(a)"));
        assert!(output.contains("lhs"));
        assert!(output.contains("RuleDefinition(: F -&gt; FF)"));
    }
}
