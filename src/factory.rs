//! Building a ready to run [`lsystem::LSystem`] out of a parsed program.
use std::collections;
use std::result;

use num_traits::ToPrimitive;

use crate::ast;
use crate::diagnostic;
use crate::interpreter;
use crate::lsystem;
use crate::lsystem::random;
use crate::syntax;
use crate::validator;
use crate::value;

/// An error that occurs while turning a program into an L-system.
#[derive(Clone, Debug, Fail, PartialEq)]
pub enum Error {
    /// The program did not pass validation.
    #[fail(display = "validation failed")]
    Validation(#[cause] validator::Error),
    /// Running the assignments of the program failed.
    #[fail(display = "running the program failed")]
    Interpreter(#[cause] interpreter::Error),
    /// The axiom is not a valid token sequence.
    #[fail(display = "invalid axiom")]
    Axiom(#[cause] lsystem::Error),
    /// A rule definition could not be turned into a rule.
    #[fail(display = "invalid rule")]
    Rule {
        /// Where the rule is defined.
        region: syntax::TextRegion,
        /// The underlying problem.
        #[cause]
        cause: lsystem::Error,
    },
    /// The L-system could not be set up.
    #[fail(display = "invalid L-system")]
    LSystem(#[cause] lsystem::Error),
}

/// A convenience result wrapper for the [`Error`] type.
pub type Result<A> = result::Result<A, Error>;

/// Resolves placeholders to the canonical rendering of global variables.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GlobalParameters {
    values: collections::BTreeMap<String, String>,
}

/// Validates and runs a program, and creates the L-system it describes.
///
/// The axiom and recursion count come from the `axiom` and `recursionCount` variables.  Every
/// rule definition in the program, including those inside of blocks, becomes a rule, in the
/// order in which they appear.  Placeholders in token parameters resolve to global variables.
pub fn create_lsystem(
    ast: &mut ast::Ast,
    random: Box<dyn random::RandomSource>,
) -> Result<lsystem::LSystem> {
    validator::validate(ast).assert_no_errors()?;

    let mut interpreter = interpreter::Interpreter::new();
    interpreter.run(ast)?;

    let axiom = interpreter.string_value(ast, validator::AXIOM)?;
    let axiom = lsystem::TokenSeq::parse(axiom).map_err(Error::Axiom)?;

    let count = interpreter.int_value(ast, validator::RECURSION_COUNT)?;
    let recursion_count = count
        .to_usize()
        .filter(|&c| c >= 1)
        .ok_or(Error::LSystem(lsystem::Error::InvalidRecursionCount { count }))?;

    let rules = create_rules(ast)?;
    let parameters = GlobalParameters::new(&interpreter.global_values(ast));

    debug!(
        "created an L-system with {} rules and {} generations",
        rules.len(),
        recursion_count
    );

    let mut lsystem = lsystem::LSystem::new(axiom, recursion_count, random);
    lsystem.add_rules(rules);
    lsystem.set_parameter_provider(Box::new(parameters));
    Ok(lsystem)
}

fn create_rules(ast: &ast::Ast) -> Result<Vec<lsystem::SimpleRule>> {
    let definitions = ast.find(|kind| match *kind {
        ast::NodeKind::RuleDefinition { .. } => true,
        _ => false,
    });

    definitions
        .into_iter()
        .filter_map(|node| match *ast.kind(node) {
            ast::NodeKind::RuleDefinition {
                ref name,
                ref expected,
                ref replacement,
            } => Some(
                create_rule(name.as_ref(), expected, replacement).map_err(|cause| {
                    let region = ast.region(node);
                    Error::Rule { region, cause }
                }),
            ),
            _ => None,
        })
        .collect()
}

fn create_rule(
    name: Option<&String>,
    expected: &str,
    replacement: &str,
) -> lsystem::Result<lsystem::SimpleRule> {
    let pattern = lsystem::TokenSeq::parse(expected)?;
    let token = match pattern.tokens() {
        [token] => token,
        tokens => {
            return Err(lsystem::Error::MultiTokenPattern {
                pattern: expected.to_owned(),
                count: tokens.len(),
            });
        }
    };
    let expected = lsystem::Expected::Literal(token.literal().to_owned());
    let replacement = lsystem::TokenSeq::parse(replacement)?;

    let rule = lsystem::SimpleRule::new(expected, replacement);
    Ok(match name {
        Some(name) => rule.named(name.as_str()),
        None => rule,
    })
}

impl GlobalParameters {
    /// Captures the rendered values of `values`.
    pub fn new(values: &collections::BTreeMap<String, value::Value>) -> Self {
        let values = values
            .iter()
            .map(|(name, value)| (name.clone(), value.to_string()))
            .collect();
        GlobalParameters { values }
    }
}

impl lsystem::ParameterProvider for GlobalParameters {
    fn parameter(&self, _token: &lsystem::Token, name: &str) -> Option<String> {
        self.values.get(name).cloned()
    }
}

impl From<validator::Error> for Error {
    fn from(err: validator::Error) -> Self {
        Error::Validation(err)
    }
}

impl From<interpreter::Error> for Error {
    fn from(err: interpreter::Error) -> Self {
        Error::Interpreter(err)
    }
}

impl diagnostic::Diagnostics for Error {
    fn to_diagnostics(&self, builder: &mut diagnostic::DiagnosticsBuilder) {
        match *self {
            Error::Validation(ref cause) => cause.to_diagnostics(builder),
            Error::Interpreter(ref cause) => cause.to_diagnostics(builder),
            Error::Axiom(ref cause) | Error::LSystem(ref cause) => {
                builder.add_message(self.to_string());
                cause.to_diagnostics(builder);
            }
            Error::Rule { region, ref cause } => {
                builder.add_region_label(region, None, codespan_reporting::LabelStyle::Primary);
                builder.add_message(self.to_string());
                cause.to_diagnostics(builder);
            }
        }
    }
}
