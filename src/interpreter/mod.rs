//! Execution of the assignments of a program.
use std::collections;

use crate::ast;
use crate::eval;
use crate::scope;
use crate::ty;
use crate::value;

mod error;

pub use self::error::Error;
pub use self::error::Result;

/// Runs the top-level assignments of a program and keeps track of the resulting values.
#[derive(Clone, Debug, Default)]
pub struct Interpreter {
    variables: Variables,
}

/// The values of all variables that have been assigned so far.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Variables {
    values: collections::HashMap<scope::SymbolId, value::Value>,
}

impl Interpreter {
    /// Creates an interpreter with no variables.
    pub fn new() -> Self {
        Interpreter::default()
    }

    /// Executes the top-level assignments of `ast` in order.
    ///
    /// Blocks are not entered.  Every assigned value must reduce to a literal using the variables
    /// assigned before it; assigning a value of a different type to a variable that already has a
    /// type is an error.
    pub fn run(&mut self, ast: &mut ast::Ast) -> Result<()> {
        let assignments = ast
            .statements()
            .iter()
            .filter_map(|&statement| ast.child(statement, 0))
            .filter(|&node| match *ast.kind(node) {
                ast::NodeKind::Assignment { .. } => true,
                _ => false,
            })
            .collect::<Vec<_>>();

        for assignment in assignments {
            self.assign(ast, assignment)?;
        }
        debug!("interpreter defined {} variables", self.variables.len());
        Ok(())
    }

    fn assign(&mut self, ast: &mut ast::Ast, assignment: ast::NodeId) -> Result<()> {
        let (name, scope) = match *ast.kind(assignment) {
            ast::NodeKind::Assignment { ref name, scope } => (name.clone(), scope),
            _ => return Ok(()),
        };
        let expression = ast
            .child(assignment, 0)
            .ok_or_else(|| Error::NotALiteral { name: name.clone() })?;

        let value = match eval::reduce(ast, expression, &self.variables) {
            Ok(eval::Reduced::Literal(value)) => value,
            Ok(eval::Reduced::Unchanged(_)) => return Err(Error::NotALiteral { name }),
            Err(cause) => return Err(Error::Eval { name, cause }),
        };

        let symbol = ast
            .scopes_mut()
            .define_variable(scope, &name, Some(assignment), value.ty())?;
        trace!("{} = {:?}", ast.scopes().symbol_absolute_name(symbol), value);
        self.variables.values.insert(symbol, value);
        Ok(())
    }

    /// The variables assigned so far.
    pub fn variables(&self) -> &Variables {
        &self.variables
    }

    /// The value of a global variable.
    pub fn value(&self, ast: &ast::Ast, name: &str) -> Option<&value::Value> {
        let global = ast.scopes().global();
        ast.scopes()
            .symbol(global, name, false)
            .ok()
            .and_then(|symbol| self.variables.get(symbol))
    }

    /// The value of a global string variable.
    pub fn string_value(&self, ast: &ast::Ast, name: &str) -> Result<&str> {
        match self.defined_value(ast, name)? {
            value::Value::String(v) => Ok(v.as_str()),
            other => Err(wrong_type(name, ty::TermType::StringLiteral, other)),
        }
    }

    /// The value of a global integer variable.
    pub fn int_value(&self, ast: &ast::Ast, name: &str) -> Result<i64> {
        match *self.defined_value(ast, name)? {
            value::Value::Integer(v) => Ok(v),
            ref other => Err(wrong_type(name, ty::TermType::Integer, other)),
        }
    }

    /// The values of all global variables, by name.
    pub fn global_values(&self, ast: &ast::Ast) -> collections::BTreeMap<String, value::Value> {
        let scopes = ast.scopes();
        scopes
            .symbols(scopes.global())
            .filter_map(|symbol| {
                self.variables
                    .get(symbol)
                    .map(|value| (scopes.symbol_info(symbol).name().to_owned(), value.clone()))
            })
            .collect()
    }

    fn defined_value(&self, ast: &ast::Ast, name: &str) -> Result<&value::Value> {
        self.value(ast, name).ok_or_else(|| Error::UndefinedVariable {
            name: name.to_owned(),
        })
    }
}

impl Variables {
    /// The value of a symbol.
    pub fn get(&self, symbol: scope::SymbolId) -> Option<&value::Value> {
        self.values.get(&symbol)
    }

    /// The number of variables that have a value.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no variable has a value.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Resolves names to the innermost visible symbol that has a value.
impl eval::ExpressionContext for Variables {
    fn lookup(
        &self,
        scopes: &scope::Scopes,
        scope: scope::ScopeId,
        name: &str,
    ) -> eval::Result<value::Value> {
        scopes
            .ancestry(scope)
            .filter_map(|s| scopes.scope(s).table().get(name))
            .filter_map(|symbol| self.values.get(&symbol))
            .next()
            .cloned()
            .ok_or_else(|| eval::Error::UnknownIdentifier {
                name: name.to_owned(),
            })
    }
}

fn wrong_type(name: &str, expected: ty::TermType, actual: &value::Value) -> Error {
    let name = name.to_owned();
    let actual = actual.ty();
    Error::WrongType {
        name,
        expected,
        actual,
    }
}
