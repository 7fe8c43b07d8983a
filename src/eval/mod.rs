//! Evaluation, constant folding and type inference of expressions.
//!
//! Identifiers are resolved through an [`ExpressionContext`], so the same expression can be
//! checked statically with [`NoVariables`] and evaluated later once variables have values.
use crate::ast;
use crate::scope;
use crate::ty;
use crate::value;

mod error;

pub use self::error::Error;
pub use self::error::Result;

/// Resolves identifiers to values during evaluation.
pub trait ExpressionContext {
    /// Looks up the value of `name` as seen from `scope`.
    ///
    /// Implementations should fail with [`Error::UnknownIdentifier`] if the name has no value.
    fn lookup(
        &self,
        scopes: &scope::Scopes,
        scope: scope::ScopeId,
        name: &str,
    ) -> Result<value::Value>;
}

/// A context in which no variable has a value.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoVariables;

/// The outcome of reducing an expression.
#[derive(Clone, Debug, PartialEq)]
pub enum Reduced {
    /// The expression reduced to a literal value.
    Literal(value::Value),
    /// The expression depends on something unknown and was left as is.
    Unchanged(ast::NodeId),
}

impl ExpressionContext for NoVariables {
    fn lookup(
        &self,
        _scopes: &scope::Scopes,
        _scope: scope::ScopeId,
        name: &str,
    ) -> Result<value::Value> {
        let name = name.to_owned();
        Err(Error::UnknownIdentifier { name })
    }
}

/// Evaluates the expression rooted at `node` to a value.
pub fn evaluate<C>(ast: &ast::Ast, node: ast::NodeId, ctx: &C) -> Result<value::Value>
where
    C: ExpressionContext + ?Sized,
{
    match *ast.kind(node) {
        ast::NodeKind::Statement | ast::NodeKind::Expression => {
            evaluate(ast, single_child(ast, node)?, ctx)
        }
        ast::NodeKind::Number(ast::Number::Integer(v)) => Ok(value::Value::Integer(v)),
        ast::NodeKind::Number(ast::Number::Float(v)) => Ok(value::Value::Float(v)),
        ast::NodeKind::String(ref v) => Ok(value::Value::String(v.clone())),
        ast::NodeKind::Identifier { ref name, scope } => ctx.lookup(ast.scopes(), scope, name),
        ast::NodeKind::Operator(operator) => {
            let (lhs, rhs) = operands(ast, node)?;
            let lhs = evaluate(ast, lhs, ctx)?;
            let rhs = evaluate(ast, rhs, ctx)?;
            apply(operator, &lhs, &rhs)
        }
        ref other => Err(not_an_expression(other)),
    }
}

/// Reduces the expression rooted at `node` to a literal if possible.
///
/// An expression that refers to an identifier without a value is left unchanged; any other
/// evaluation error is returned.
pub fn reduce<C>(ast: &ast::Ast, node: ast::NodeId, ctx: &C) -> Result<Reduced>
where
    C: ExpressionContext + ?Sized,
{
    match evaluate(ast, node, ctx) {
        Ok(value) => Ok(Reduced::Literal(value)),
        Err(Error::UnknownIdentifier { name }) => {
            trace!("cannot reduce {} yet, {} is unknown", ast.kind(node), name);
            Ok(Reduced::Unchanged(node))
        }
        Err(error) => Err(error),
    }
}

/// Infers the type of the expression rooted at `node`.
///
/// Identifiers without a value in `ctx` get the type recorded for their symbol, which is
/// [`ty::TermType::Unknown`] until the variable has been defined.
pub fn get_type<C>(ast: &ast::Ast, node: ast::NodeId, ctx: &C) -> Result<ty::TermType>
where
    C: ExpressionContext + ?Sized,
{
    match *ast.kind(node) {
        ast::NodeKind::Statement | ast::NodeKind::Expression => {
            get_type(ast, single_child(ast, node)?, ctx)
        }
        ast::NodeKind::Number(ast::Number::Integer(_)) => Ok(ty::TermType::Integer),
        ast::NodeKind::Number(ast::Number::Float(_)) => Ok(ty::TermType::FloatingPoint),
        ast::NodeKind::String(_) => Ok(ty::TermType::StringLiteral),
        ast::NodeKind::Identifier { ref name, scope } => {
            match ctx.lookup(ast.scopes(), scope, name) {
                Ok(value) => Ok(value.ty()),
                Err(Error::UnknownIdentifier { .. }) => Ok(ast
                    .scopes()
                    .symbol(scope, name, true)
                    .map(|id| ast.scopes().symbol_info(id).ty())
                    .unwrap_or(ty::TermType::Unknown)),
                Err(error) => Err(error),
            }
        }
        ast::NodeKind::Operator(operator) => {
            let (lhs, rhs) = operands(ast, node)?;
            let lhs = get_type(ast, lhs, ctx)?;
            let rhs = get_type(ast, rhs, ctx)?;
            ty::infer_binary(operator, lhs, rhs)
                .ok_or(Error::TypeMismatch { operator, lhs, rhs })
        }
        _ => Ok(ty::TermType::Void),
    }
}

/// Whether `node` already is a literal, or an expression wrapping exactly a literal.
pub fn is_literal_value(ast: &ast::Ast, node: ast::NodeId) -> bool {
    match *ast.kind(node) {
        ast::NodeKind::Statement | ast::NodeKind::Expression => {
            ast.children(node).len() == 1 && is_literal_value(ast, ast.children(node)[0])
        }
        ref kind => kind.is_literal(),
    }
}

/// Replaces every reducible operator and identifier below `node` with the literal it reduces to.
///
/// Returns the number of subtrees that were replaced.
pub fn fold_constants<C>(ast: &mut ast::Ast, node: ast::NodeId, ctx: &C) -> Result<usize>
where
    C: ExpressionContext + ?Sized,
{
    let mut folded = 0;
    ast.rewrite_post_order(node, |ast, current| -> Result<ast::Flow> {
        let foldable = match *ast.kind(current) {
            ast::NodeKind::Operator(_) | ast::NodeKind::Identifier { .. } => true,
            _ => false,
        };
        if !foldable {
            return Ok(ast::Flow::Continue);
        }

        if let Reduced::Literal(value) = reduce(ast, current, ctx)? {
            let region = ast.region_including_children(current);
            let literal = ast.new_node(literal_kind(value), region);
            if ast.replace_with(current, literal) {
                folded += 1;
            }
        }
        Ok(ast::Flow::Continue)
    })?;

    debug!("folded {} constant subexpressions", folded);
    Ok(folded)
}

fn literal_kind(value: value::Value) -> ast::NodeKind {
    match value {
        value::Value::Integer(v) => ast::NodeKind::Number(ast::Number::Integer(v)),
        value::Value::Float(v) => ast::NodeKind::Number(ast::Number::Float(v)),
        value::Value::String(v) => ast::NodeKind::String(v),
    }
}

fn apply(
    operator: ast::Operator,
    lhs: &value::Value,
    rhs: &value::Value,
) -> Result<value::Value> {
    match (lhs, rhs) {
        (value::Value::String(_), _) | (_, value::Value::String(_))
            if operator == ast::Operator::Add =>
        {
            Ok(value::Value::String(format!("{}{}", lhs, rhs)))
        }
        (&value::Value::Integer(l), &value::Value::Integer(r)) => apply_integer(operator, l, r),
        _ => match (lhs.to_f64(), rhs.to_f64()) {
            (Some(l), Some(r)) => apply_float(operator, l, r),
            _ => Err(Error::TypeMismatch {
                operator,
                lhs: lhs.ty(),
                rhs: rhs.ty(),
            }),
        },
    }
}

fn apply_integer(operator: ast::Operator, lhs: i64, rhs: i64) -> Result<value::Value> {
    let result = match operator {
        ast::Operator::Add => lhs.checked_add(rhs),
        ast::Operator::Subtract => lhs.checked_sub(rhs),
        ast::Operator::Multiply => lhs.checked_mul(rhs),
        ast::Operator::Divide => {
            if rhs == 0 {
                return Err(Error::DivisionByZero);
            }
            lhs.checked_div(rhs)
        }
        ast::Operator::Parens => return Err(parens_error()),
    };

    result
        .map(value::Value::Integer)
        .ok_or(Error::Overflow { operator, lhs, rhs })
}

fn apply_float(operator: ast::Operator, lhs: f64, rhs: f64) -> Result<value::Value> {
    let result = match operator {
        ast::Operator::Add => lhs + rhs,
        ast::Operator::Subtract => lhs - rhs,
        ast::Operator::Multiply => lhs * rhs,
        ast::Operator::Divide => lhs / rhs,
        ast::Operator::Parens => return Err(parens_error()),
    };
    Ok(value::Value::Float(result))
}

fn single_child(ast: &ast::Ast, node: ast::NodeId) -> Result<ast::NodeId> {
    match ast.children(node) {
        [child] => Ok(*child),
        _ => Err(not_an_expression(ast.kind(node))),
    }
}

fn operands(ast: &ast::Ast, node: ast::NodeId) -> Result<(ast::NodeId, ast::NodeId)> {
    match ast.children(node) {
        [lhs, rhs] => Ok((*lhs, *rhs)),
        _ => Err(not_an_expression(ast.kind(node))),
    }
}

fn not_an_expression(kind: &ast::NodeKind) -> Error {
    let kind = kind.to_string();
    Error::NotAnExpression { kind }
}

fn parens_error() -> Error {
    let kind = "a parenthesis".to_owned();
    Error::NotAnExpression { kind }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections;

    use crate::syntax;

    #[derive(Debug, Default)]
    struct Globals(collections::HashMap<String, value::Value>);

    impl ExpressionContext for Globals {
        fn lookup(
            &self,
            _scopes: &scope::Scopes,
            _scope: scope::ScopeId,
            name: &str,
        ) -> Result<value::Value> {
            self.0
                .get(name)
                .cloned()
                .ok_or_else(|| Error::UnknownIdentifier {
                    name: name.to_owned(),
                })
        }
    }

    fn expression(ast: &ast::Ast) -> ast::NodeId {
        let statement = ast.statements()[0];
        ast.child(statement, 0).unwrap()
    }

    fn eval_str(source: &str) -> Result<value::Value> {
        let ast = syntax::parse(source).unwrap();
        evaluate(&ast, expression(&ast), &NoVariables)
    }

    #[test]
    fn arithmetic_precedence() {
        let _ = env_logger::try_init();

        assert_eq!(Ok(value::Value::Integer(7)), eval_str("1+2*3"));
        assert_eq!(Ok(value::Value::Integer(9)), eval_str("(1+2)*3"));
        assert_eq!(Ok(value::Value::Integer(2)), eval_str("8 - 4 - 2"));
        assert_eq!(Ok(value::Value::Integer(1)), eval_str("8 / 4 / 2"));
    }

    #[test]
    fn integer_division_truncates() {
        let _ = env_logger::try_init();

        assert_eq!(Ok(value::Value::Integer(3)), eval_str("7 / 2"));
        assert_eq!(Ok(value::Value::Float(3.5)), eval_str("7.0 / 2"));
    }

    #[test]
    fn numeric_promotion() {
        let _ = env_logger::try_init();

        assert_eq!(Ok(value::Value::Float(3.5)), eval_str("1 + 2.5"));
        assert_eq!(Ok(value::Value::Float(5.0)), eval_str("2.5 * 2"));
    }

    #[test]
    fn string_concatenation() {
        let _ = env_logger::try_init();

        assert_eq!(Ok(value::Value::from("F[+F]")), eval_str("\"F[\" + '+F]'"));
        assert_eq!(Ok(value::Value::from("F2")), eval_str("\"F\" + 2"));
        assert_eq!(Ok(value::Value::from("2.0F")), eval_str("2.0 + \"F\""));
        assert_eq!(Ok(value::Value::from("1.5F")), eval_str("1.5 + \"F\""));
    }

    #[test]
    fn type_mismatch() {
        let _ = env_logger::try_init();

        assert_eq!(
            Err(Error::TypeMismatch {
                operator: ast::Operator::Subtract,
                lhs: ty::TermType::Integer,
                rhs: ty::TermType::StringLiteral,
            }),
            eval_str("2 - \"x\"")
        );
        assert_eq!(
            Err(Error::TypeMismatch {
                operator: ast::Operator::Multiply,
                lhs: ty::TermType::StringLiteral,
                rhs: ty::TermType::StringLiteral,
            }),
            eval_str("'a' * 'b'")
        );
    }

    #[test]
    fn runtime_errors() {
        let _ = env_logger::try_init();

        assert_eq!(Err(Error::DivisionByZero), eval_str("1 / (2 - 2)"));
        assert_eq!(
            Err(Error::Overflow {
                operator: ast::Operator::Multiply,
                lhs: 9223372036854775807,
                rhs: 2,
            }),
            eval_str("9223372036854775807 * 2")
        );
    }

    #[test]
    fn unknown_identifiers_block_reduction() {
        let _ = env_logger::try_init();

        let ast = syntax::parse("x + 1").unwrap();
        let node = expression(&ast);
        assert_eq!(Ok(Reduced::Unchanged(node)), reduce(&ast, node, &NoVariables));
        assert_eq!(
            Ok(ty::TermType::Unknown),
            get_type(&ast, node, &NoVariables)
        );

        let mut globals = Globals::default();
        globals.0.insert("x".to_owned(), value::Value::Integer(41));
        assert_eq!(
            Ok(Reduced::Literal(value::Value::Integer(42))),
            reduce(&ast, node, &globals)
        );
        assert_eq!(Ok(ty::TermType::Integer), get_type(&ast, node, &globals));
    }

    #[test]
    fn reduction_does_not_hide_fatal_errors() {
        let _ = env_logger::try_init();

        let ast = syntax::parse("x + 1 / 0").unwrap();
        let node = expression(&ast);
        let mut globals = Globals::default();
        globals.0.insert("x".to_owned(), value::Value::Integer(1));
        assert_eq!(Err(Error::DivisionByZero), reduce(&ast, node, &globals));
    }

    #[test]
    fn static_types() {
        let _ = env_logger::try_init();

        let ast = syntax::parse("'F' + 2 * 3").unwrap();
        assert_eq!(
            Ok(ty::TermType::StringLiteral),
            get_type(&ast, expression(&ast), &NoVariables)
        );

        let ast = syntax::parse("set a = 1").unwrap();
        assert_eq!(
            Ok(ty::TermType::Void),
            get_type(&ast, expression(&ast), &NoVariables)
        );

        let ast = syntax::parse("'F' / 2").unwrap();
        assert!(get_type(&ast, expression(&ast), &NoVariables).is_err());
    }

    #[test]
    fn literal_values() {
        let _ = env_logger::try_init();

        let ast = syntax::parse("'F'").unwrap();
        assert!(is_literal_value(&ast, expression(&ast)));
        let ast = syntax::parse("1 + 2").unwrap();
        assert!(!is_literal_value(&ast, expression(&ast)));
    }

    #[test]
    fn folding_is_idempotent() {
        let _ = env_logger::try_init();

        let mut ast = syntax::parse("x * (2 + 3)").unwrap();
        let node = expression(&ast);

        assert_eq!(Ok(1), fold_constants(&mut ast, node, &NoVariables));
        assert_eq!("x * 5", crate::ast::printer::print(&ast, node));
        assert_eq!(Ok(0), fold_constants(&mut ast, node, &NoVariables));
        assert_eq!("x * 5", crate::ast::printer::print(&ast, node));

        let mut globals = Globals::default();
        globals.0.insert("x".to_owned(), value::Value::Integer(2));
        assert_eq!(Ok(2), fold_constants(&mut ast, node, &globals));
        assert!(is_literal_value(&ast, node));
        assert_eq!(
            Ok(value::Value::Integer(10)),
            evaluate(&ast, node, &NoVariables)
        );
    }
}
