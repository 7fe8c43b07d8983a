//! Pretty printing of ASTs back to source code.
use crate::ast;

const INDENT: &str = "  ";

/// Renders `node` and its descendants as source code.
///
/// Parentheses are only emitted where they are needed to preserve the structure of an expression.
pub fn print(ast: &ast::Ast, node: ast::NodeId) -> String {
    let mut out = String::new();
    write_node(ast, node, 0, &mut out);
    out
}

fn write_node(ast: &ast::Ast, node: ast::NodeId, depth: usize, out: &mut String) {
    match ast.kind(node) {
        ast::NodeKind::Root { .. } => write_statements(ast, node, depth, out),
        ast::NodeKind::Statement | ast::NodeKind::Expression => {
            for &child in ast.children(node) {
                write_node(ast, child, depth, out);
            }
        }
        ast::NodeKind::Assignment { name, .. } => {
            out.push_str("set ");
            out.push_str(name);
            out.push_str(" = ");
            for &child in ast.children(node) {
                write_node(ast, child, depth, out);
            }
        }
        ast::NodeKind::RuleDefinition {
            name,
            expected,
            replacement,
        } => {
            out.push_str("rule");
            if let Some(name) = name {
                out.push(' ');
                out.push_str(name);
            }
            out.push_str(": ");
            out.push_str(expected);
            out.push_str(" -> ");
            out.push_str(replacement);
        }
        ast::NodeKind::Block { .. } => {
            out.push_str("{\n");
            write_statements(ast, node, depth + 1, out);
            out.push('\n');
            indent(depth, out);
            out.push('}');
        }
        ast::NodeKind::Operator(operator) => {
            let operator = *operator;
            if let Some(lhs) = ast.child(node, 0) {
                write_operand(ast, lhs, operator, false, depth, out);
            }
            out.push(' ');
            out.push_str(operator.symbol());
            out.push(' ');
            if let Some(rhs) = ast.child(node, 1) {
                write_operand(ast, rhs, operator, true, depth, out);
            }
        }
        ast::NodeKind::Identifier { name, .. } => out.push_str(name),
        ast::NodeKind::Number(number) => out.push_str(&number.to_string()),
        ast::NodeKind::String(string) => {
            // There are no escapes; a string closes on the quote that opened it.
            let quote = if string.contains('"') { '\'' } else { '"' };
            out.push(quote);
            out.push_str(string);
            out.push(quote);
        }
    }
}

fn write_statements(ast: &ast::Ast, node: ast::NodeId, depth: usize, out: &mut String) {
    for (index, &child) in ast.children(node).iter().enumerate() {
        if index > 0 {
            out.push('\n');
        }
        indent(depth, out);
        write_node(ast, child, depth, out);
    }
}

fn write_operand(
    ast: &ast::Ast,
    operand: ast::NodeId,
    parent: ast::Operator,
    right: bool,
    depth: usize,
    out: &mut String,
) {
    let needs_parens = match ast.kind(operand) {
        ast::NodeKind::Operator(child) => {
            child.precedence() < parent.precedence()
                || (right && child.precedence() == parent.precedence())
        }
        _ => false,
    };

    if needs_parens {
        out.push('(');
        write_node(ast, operand, depth, out);
        out.push(')');
    } else {
        write_node(ast, operand, depth, out);
    }
}

fn indent(depth: usize, out: &mut String) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::syntax;

    fn round_trip(source: &str) -> String {
        let ast = syntax::parse(source).unwrap();
        print(&ast, ast.root())
    }

    #[test]
    fn simple_expression() {
        let _ = env_logger::try_init();

        assert_eq!("3 * 2", round_trip("3 * 2"));
    }

    #[test]
    fn needed_parentheses_are_kept() {
        let _ = env_logger::try_init();

        assert_eq!("(1 + 2) * 3", round_trip("(1+2)*3"));
        assert_eq!("1 + 2 * 3", round_trip("1 + (2 * 3)"));
        assert_eq!("1 - (2 - 3)", round_trip("1 - (2 - 3)"));
        assert_eq!("1 - 2 - 3", round_trip("(1 - 2) - 3"));
    }

    #[test]
    fn statements() {
        let _ = env_logger::try_init();

        let source = "set axiom = \"F\"\nset recursionCount = 2\nrule grow: F -> F[+F]F\n{\n  set a = 1.5\n}";
        assert_eq!(source, round_trip(source));
    }

    #[test]
    fn quotes_inside_strings() {
        let _ = env_logger::try_init();

        let source = "set axiom = 'say \"F\"'";
        let printed = round_trip(source);
        assert_eq!(source, printed);
        assert_eq!(printed, round_trip(&printed));
        assert_eq!("set axiom = \"it's\"", round_trip("set axiom = \"it's\""));
    }

    #[test]
    fn unnamed_rule() {
        let _ = env_logger::try_init();

        assert_eq!("rule: a -> ab", round_trip("rule : a -> ab"));
    }
}
