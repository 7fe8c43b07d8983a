//! Semantic checks of parsed programs.
//!
//! Unlike syntax and evaluation errors, validation problems are collected in a batch so that all
//! of them can be reported at once.
use std::collections;
use std::fmt;
use std::result;

use itertools::Itertools;

use crate::ast;
use crate::diagnostic;
use crate::eval;
use crate::syntax;
use crate::ty;
use crate::value;

/// The variable holding the initial token sequence.
pub const AXIOM: &str = "axiom";
/// The variable holding the number of rewriting generations.
pub const RECURSION_COUNT: &str = "recursionCount";

/// An error returned when a program has failed validation.
#[derive(Clone, Debug, Fail, PartialEq)]
pub enum Error {
    /// The program has one or more semantic problems.
    #[fail(display = "invalid program: {}", errors)]
    Invalid {
        /// All problems that were found.
        errors: ValidationResult,
    },
}

/// A convenience result wrapper for the [`Error`] type.
pub type Result<A> = result::Result<A, Error>;

/// A single semantic problem.
#[derive(Clone, Debug, PartialEq)]
pub struct ValidationError {
    message: String,
    node: ast::NodeId,
    region: syntax::TextRegion,
}

/// The problems found while validating a program.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ValidationResult {
    errors: Vec<ValidationError>,
}

/// What is statically known about the value of an assignment.
#[derive(Debug)]
enum Static {
    Value(value::Value),
    Type(ty::TermType),
    Unknown,
}

/// Checks a program for semantic problems.
///
/// The following is verified:
///
///   * every top-level variable is assigned at most once,
///   * there is exactly one `axiom`, and it is a string,
///   * there is exactly one `recursionCount`, and it is an integer of at least 1,
///   * no two rules share a name.
///
/// Values are checked as far as they can be reduced without knowing any variables; a value that
/// depends on other variables is accepted here and checked again when the program runs.
pub fn validate(ast: &ast::Ast) -> ValidationResult {
    let mut result = ValidationResult::default();

    let assignments = top_level_assignments(ast);
    check_duplicate_assignments(ast, &assignments, &mut result);
    check_axiom(ast, &assignments, &mut result);
    check_recursion_count(ast, &assignments, &mut result);
    check_rule_names(ast, &mut result);

    debug!("validation found {} errors", result.errors.len());
    result
}

fn top_level_assignments(ast: &ast::Ast) -> Vec<(String, ast::NodeId)> {
    ast.statements()
        .iter()
        .filter_map(|&statement| ast.child(statement, 0))
        .filter_map(|node| match *ast.kind(node) {
            ast::NodeKind::Assignment { ref name, .. } => Some((name.clone(), node)),
            _ => None,
        })
        .collect()
}

fn check_duplicate_assignments(
    ast: &ast::Ast,
    assignments: &[(String, ast::NodeId)],
    result: &mut ValidationResult,
) {
    let mut seen = collections::HashSet::new();
    for &(ref name, node) in assignments {
        if !seen.insert(name.as_str()) {
            result.add_error(
                format!("duplicate assignment of `{}`", name),
                node,
                ast.region(node),
            );
        }
    }
}

fn check_axiom(
    ast: &ast::Ast,
    assignments: &[(String, ast::NodeId)],
    result: &mut ValidationResult,
) {
    let node = match first_assignment(assignments, AXIOM) {
        Some(node) => node,
        None => {
            result.add_error("missing axiom".to_owned(), ast.root(), ast.region(ast.root()));
            return;
        }
    };

    let ty = match static_check(ast, node) {
        Ok(Static::Value(value)) => value.ty(),
        Ok(Static::Type(ty)) => ty,
        Ok(Static::Unknown) => return,
        Err(error) => return add_eval_error(ast, node, error, result),
    };
    if ty != ty::TermType::StringLiteral {
        result.add_error(
            format!("`{}` must be a string but is {}", AXIOM, ty),
            node,
            ast.region_including_children(node),
        );
    }
}

fn check_recursion_count(
    ast: &ast::Ast,
    assignments: &[(String, ast::NodeId)],
    result: &mut ValidationResult,
) {
    let node = match first_assignment(assignments, RECURSION_COUNT) {
        Some(node) => node,
        None => {
            result.add_error(
                format!("missing {}", RECURSION_COUNT),
                ast.root(),
                ast.region(ast.root()),
            );
            return;
        }
    };
    let region = ast.region_including_children(node);

    let ty = match static_check(ast, node) {
        Ok(Static::Value(value::Value::Integer(count))) => {
            if count < 1 {
                result.add_error(
                    format!("`{}` must be at least 1 but is {}", RECURSION_COUNT, count),
                    node,
                    region,
                );
            }
            return;
        }
        Ok(Static::Value(value)) => value.ty(),
        Ok(Static::Type(ty)) => ty,
        Ok(Static::Unknown) => return,
        Err(error) => return add_eval_error(ast, node, error, result),
    };
    if ty != ty::TermType::Integer {
        result.add_error(
            format!("`{}` must be an integer but is {}", RECURSION_COUNT, ty),
            node,
            region,
        );
    }
}

fn check_rule_names(ast: &ast::Ast, result: &mut ValidationResult) {
    let rules = ast.find(|kind| match *kind {
        ast::NodeKind::RuleDefinition { name: Some(_), .. } => true,
        _ => false,
    });

    let mut seen = collections::HashSet::new();
    for node in rules {
        if let ast::NodeKind::RuleDefinition {
            name: Some(ref name),
            ..
        } = *ast.kind(node)
        {
            if !seen.insert(name.clone()) {
                result.add_error(
                    format!("duplicate rule name `{}`", name),
                    node,
                    ast.region(node),
                );
            }
        }
    }
}

fn first_assignment(assignments: &[(String, ast::NodeId)], name: &str) -> Option<ast::NodeId> {
    assignments
        .iter()
        .find(|&&(ref n, _)| n == name)
        .map(|&(_, node)| node)
}

/// Reduces the value of an assignment without knowing any variables.
fn static_check(ast: &ast::Ast, assignment: ast::NodeId) -> eval::Result<Static> {
    let expression = match ast.child(assignment, 0) {
        Some(expression) => expression,
        None => return Ok(Static::Unknown),
    };

    match eval::reduce(ast, expression, &eval::NoVariables)? {
        eval::Reduced::Literal(value) => Ok(Static::Value(value)),
        eval::Reduced::Unchanged(_) => {
            let ty = eval::get_type(ast, expression, &eval::NoVariables)?;
            if ty.is_concrete() {
                Ok(Static::Type(ty))
            } else {
                Ok(Static::Unknown)
            }
        }
    }
}

fn add_eval_error(
    ast: &ast::Ast,
    assignment: ast::NodeId,
    error: eval::Error,
    result: &mut ValidationResult,
) {
    let node = ast.child(assignment, 0).unwrap_or(assignment);
    result.add_error(error.to_string(), node, ast.region_including_children(node));
}

impl ValidationError {
    /// A description of the problem.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The node where the problem was found.
    pub fn node(&self) -> ast::NodeId {
        self.node
    }

    /// The region of source text where the problem was found.
    pub fn region(&self) -> syntax::TextRegion {
        self.region
    }
}

impl ValidationResult {
    /// All problems found so far, in the order they were found.
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// Records a problem.
    pub fn add_error(&mut self, message: String, node: ast::NodeId, region: syntax::TextRegion) {
        trace!("validation error at {}: {}", region, message);
        self.errors.push(ValidationError {
            message,
            node,
            region,
        });
    }

    /// Whether any problem was found.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Fails with [`Error::Invalid`] if any problem was found.
    pub fn assert_no_errors(&self) -> Result<()> {
        if self.has_errors() {
            let errors = self.clone();
            Err(Error::Invalid { errors })
        } else {
            Ok(())
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.errors.iter().join("; "))
    }
}

impl diagnostic::Diagnostics for Error {
    fn to_diagnostics(&self, builder: &mut diagnostic::DiagnosticsBuilder) {
        match *self {
            Error::Invalid { ref errors } => {
                for error in errors.errors() {
                    if error.region.length() > 0 {
                        builder.add_region_label(
                            error.region,
                            None,
                            codespan_reporting::LabelStyle::Primary,
                        );
                    }
                    builder.add_diagnostic(
                        codespan_reporting::Severity::Error,
                        None,
                        &error.message,
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn messages(source: &str) -> Vec<String> {
        let ast = syntax::parse(source).unwrap();
        validate(&ast)
            .errors()
            .iter()
            .map(|e| e.message().to_owned())
            .collect()
    }

    #[test]
    fn valid_program() {
        let _ = env_logger::try_init();

        let ast = syntax::parse("set axiom = \"F\"\nset recursionCount = 2\nrule: F -> FF").unwrap();
        let result = validate(&ast);
        assert!(!result.has_errors());
        assert_eq!(Ok(()), result.assert_no_errors());
    }

    #[test]
    fn missing_axiom_and_duplicate_recursion_count() {
        let _ = env_logger::try_init();

        assert_eq!(
            vec![
                "duplicate assignment of `recursionCount`".to_owned(),
                "missing axiom".to_owned(),
            ],
            messages("set recursionCount = 1\nset recursionCount = 2")
        );
    }

    #[test]
    fn empty_program() {
        let _ = env_logger::try_init();

        assert_eq!(
            vec!["missing axiom".to_owned(), "missing recursionCount".to_owned()],
            messages("")
        );
    }

    #[test]
    fn axiom_type() {
        let _ = env_logger::try_init();

        assert_eq!(
            vec!["`axiom` must be a string but is integer".to_owned()],
            messages("set axiom = 3\nset recursionCount = 1")
        );
        assert_eq!(
            Vec::<String>::new(),
            messages("set axiom = \"F\" + 3\nset recursionCount = 1")
        );
    }

    #[test]
    fn recursion_count_values() {
        let _ = env_logger::try_init();

        assert_eq!(
            vec!["`recursionCount` must be at least 1 but is 0".to_owned()],
            messages("set axiom = \"F\"\nset recursionCount = 2 - 2")
        );
        assert_eq!(
            vec!["`recursionCount` must be an integer but is floating point".to_owned()],
            messages("set axiom = \"F\"\nset recursionCount = 1.5")
        );
        assert_eq!(
            vec!["operator `-` cannot be applied to integer and string".to_owned()],
            messages("set axiom = \"F\"\nset recursionCount = 2 - \"x\"")
        );
    }

    #[test]
    fn unknown_values_are_deferred() {
        let _ = env_logger::try_init();

        assert_eq!(
            Vec::<String>::new(),
            messages("set n = 2\nset axiom = start\nset recursionCount = n * 2")
        );
    }

    #[test]
    fn nested_assignments_do_not_count() {
        let _ = env_logger::try_init();

        assert_eq!(
            vec!["missing axiom".to_owned()],
            messages("{\n  set axiom = \"F\"\n}\nset recursionCount = 1")
        );
    }

    #[test]
    fn duplicate_rule_names() {
        let _ = env_logger::try_init();

        assert_eq!(
            vec!["duplicate rule name `grow`".to_owned()],
            messages(
                "set axiom = \"F\"\nset recursionCount = 1\nrule grow: F -> FF\n{\n  rule grow: F -> F\n}\nrule: F -> F\nrule: F -> F"
            )
        );
    }

    #[test]
    fn invalid_error_lists_everything() {
        let _ = env_logger::try_init();

        let ast = syntax::parse("").unwrap();
        let result = validate(&ast);
        let error = result.assert_no_errors().unwrap_err();
        assert_eq!(
            "invalid program: missing axiom; missing recursionCount",
            error.to_string()
        );
        match error {
            Error::Invalid { errors } => assert_eq!(2, errors.errors().len()),
        }
    }
}
