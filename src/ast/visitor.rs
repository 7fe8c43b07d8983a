//! Traversal of AST nodes.
//!
//! Every visit callback decides how the walk continues by returning a [`Flow`].
use std::result;

use crate::ast;

/// How a traversal proceeds after visiting a node.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Flow {
    /// Keep walking.
    Continue,
    /// Do not descend into the children of the node just visited.  Has no effect in post-order
    /// walks, where the children have already been visited.
    SkipChildren,
    /// Abort the whole walk.
    Stop,
}

impl ast::Ast {
    /// Visits `start` and its descendants, parents before children.
    pub fn visit_in_order<F>(&self, start: ast::NodeId, mut visitor: F)
    where
        F: FnMut(&ast::Ast, ast::NodeId) -> Flow,
    {
        in_order(self, start, &mut visitor);
    }

    /// Visits `start` and its descendants, children before parents.
    pub fn visit_post_order<F>(&self, start: ast::NodeId, mut visitor: F)
    where
        F: FnMut(&ast::Ast, ast::NodeId) -> Flow,
    {
        post_order(self, start, &mut visitor);
    }

    /// Visits `start` and its descendants children first, allowing the visitor to modify the tree.
    ///
    /// Each child list is copied before it is walked, so the visitor may replace the node it is
    /// given (or its siblings) without disturbing the walk.
    pub fn rewrite_post_order<F, E>(
        &mut self,
        start: ast::NodeId,
        mut visitor: F,
    ) -> result::Result<(), E>
    where
        F: FnMut(&mut ast::Ast, ast::NodeId) -> result::Result<Flow, E>,
    {
        rewrite_post_order(self, start, &mut visitor).map(|_| ())
    }
}

fn in_order<F>(ast: &ast::Ast, node: ast::NodeId, visitor: &mut F) -> Flow
where
    F: FnMut(&ast::Ast, ast::NodeId) -> Flow,
{
    match visitor(ast, node) {
        Flow::Stop => return Flow::Stop,
        Flow::SkipChildren => return Flow::Continue,
        Flow::Continue => {}
    }

    for &child in ast.children(node) {
        if in_order(ast, child, visitor) == Flow::Stop {
            return Flow::Stop;
        }
    }
    Flow::Continue
}

fn post_order<F>(ast: &ast::Ast, node: ast::NodeId, visitor: &mut F) -> Flow
where
    F: FnMut(&ast::Ast, ast::NodeId) -> Flow,
{
    for &child in ast.children(node) {
        if post_order(ast, child, visitor) == Flow::Stop {
            return Flow::Stop;
        }
    }

    match visitor(ast, node) {
        Flow::Stop => Flow::Stop,
        _ => Flow::Continue,
    }
}

fn rewrite_post_order<F, E>(
    ast: &mut ast::Ast,
    node: ast::NodeId,
    visitor: &mut F,
) -> result::Result<Flow, E>
where
    F: FnMut(&mut ast::Ast, ast::NodeId) -> result::Result<Flow, E>,
{
    for child in ast.children(node).to_vec() {
        if rewrite_post_order(ast, child, visitor)? == Flow::Stop {
            return Ok(Flow::Stop);
        }
    }

    match visitor(ast, node)? {
        Flow::Stop => Ok(Flow::Stop),
        _ => Ok(Flow::Continue),
    }
}
