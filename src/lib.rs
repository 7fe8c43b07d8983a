//! A small language for configuring Lindenmayer systems, and an engine for rewriting them.
//!
//! A program assigns the initial token sequence to `axiom`, the number of generations to
//! `recursionCount`, and defines rewriting rules.  Values may be computed from other variables.
//!
//! # Examples
//!
//! ```
//! # extern crate failure;
//! # extern crate lsystems;
//! # fn main() -> Result<(), failure::Error> {
//! let source = r#"
//! set generations = 2
//! set axiom = "F"
//! set recursionCount = generations
//! rule branch: F -> F[+F]F[-F]F
//! "#;
//!
//! let mut lsystems = lsystems::LSystems::new();
//! let program = lsystems.load("tree.ls", source)?;
//!
//! let lsystem = program.run(Box::new(lsystems::lsystem::random::StdRandom::seeded(1)))?;
//! assert_eq!(2, lsystem.recursion_count());
//! assert_eq!(61, lsystem.state().len());
//! # Ok(())
//! # }
//! ```
#![deny(nonstandard_style, unused_must_use)]
#![warn(
    missing_docs,
    missing_debug_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unstable_features,
    unused_import_braces
)]
#![cfg_attr(feature = "cargo-clippy", deny(clippy::all))]

#[macro_use]
extern crate failure;
#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate log;

use std::fmt;

pub mod ast;
pub mod diagnostic;
pub mod error;
pub mod eval;
pub mod factory;
pub mod graph;
pub mod interpreter;
pub mod lsystem;
pub mod scope;
pub mod syntax;
pub mod ty;
pub mod validator;
pub mod value;

pub use crate::error::Error;
pub use crate::error::Result;

/// Keeps track of all loaded source code.
pub struct LSystems {
    codemap: codespan::CodeMap,
}

/// A successfully parsed program.
#[derive(Clone, Debug)]
pub struct Program {
    span: codespan::ByteSpan,
    ast: ast::Ast,
}

impl LSystems {
    /// Creates an instance without any source code.
    pub fn new() -> LSystems {
        let codemap = codespan::CodeMap::new();

        LSystems { codemap }
    }

    /// Loads and parses the specified source code.
    ///
    /// # Errors
    ///
    /// This function will return an error if the source code contains a syntax error.  Semantic
    /// problems are only detected when the program is validated or compiled.
    ///
    /// # Examples
    ///
    /// ```
    /// # extern crate failure;
    /// # extern crate lsystems;
    /// # fn main() -> Result<(), failure::Error> {
    /// let mut lsystems = lsystems::LSystems::new();
    /// assert!(lsystems.load("a.ls", "set axiom = \"F\"").is_ok());
    /// assert!(lsystems.load("b.ls", "set axiom = (\"F\"").is_err());
    /// # Ok(())
    /// # }
    /// ```
    pub fn load<F>(&mut self, file_name: F, source: &str) -> Result<Program>
    where
        F: Into<codespan::FileName>,
    {
        let span = self
            .codemap
            .add_filemap(file_name.into(), source.to_owned())
            .span();
        let ast = syntax::parse(source).map_err(|cause| Error::Syntax { file: span, cause })?;
        debug!("parsed {} AST nodes", ast.len());

        Ok(Program { span, ast })
    }

    /// Returns a reference to the current code map, which contains location mapping for all source
    /// code loaded so far.
    pub fn codemap(&self) -> &codespan::CodeMap {
        &self.codemap
    }
}

impl Program {
    /// The parsed source code.
    pub fn ast(&self) -> &ast::Ast {
        &self.ast
    }

    /// The span of the source file within the code map of the [`LSystems`] that loaded it.
    pub fn span(&self) -> codespan::ByteSpan {
        self.span
    }

    /// Checks the program for semantic problems, reporting all of them at once.
    pub fn validate(&self) -> Result<()> {
        validator::validate(&self.ast)
            .assert_no_errors()
            .map_err(|cause| Error::Validation {
                file: self.span,
                cause,
            })
    }

    /// Creates the L-system that this program describes, without rewriting it.
    ///
    /// Stochastic rules draw their random numbers from `random`.
    pub fn compile(&self, random: Box<dyn lsystem::random::RandomSource>) -> Result<lsystem::LSystem> {
        let mut ast = self.ast.clone();
        factory::create_lsystem(&mut ast, random).map_err(|cause| Error::Build {
            file: self.span,
            cause,
        })
    }

    /// Creates the L-system that this program describes, and rewrites it for the configured
    /// number of generations.
    pub fn run(&self, random: Box<dyn lsystem::random::RandomSource>) -> Result<lsystem::LSystem> {
        let mut lsystem = self.compile(random)?;
        lsystem
            .rewrite_recursively()
            .map_err(|cause| self.rewrite_error(cause))?;
        Ok(lsystem)
    }

    /// Renders the current state of `lsystem`, resolving placeholders in token parameters.
    pub fn resolve(&self, lsystem: &lsystem::LSystem) -> Result<String> {
        lsystem
            .resolved_state()
            .map_err(|cause| self.rewrite_error(cause))
    }

    /// Creates a graph representation of the AST of this program.
    ///
    /// This can be used to for example visualize the code using GraphViz or other tools.
    pub fn graph(&self) -> graph::Graph {
        graph::Graph::new(&self.ast)
    }

    /// Renders the program as normalized source code.
    pub fn pretty_print(&self) -> String {
        ast::printer::print(&self.ast, self.ast.root())
    }

    fn rewrite_error(&self, cause: lsystem::Error) -> Error {
        Error::Rewrite {
            file: self.span,
            cause,
        }
    }
}

impl Default for LSystems {
    fn default() -> Self {
        LSystems::new()
    }
}

impl fmt::Debug for LSystems {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("LSystems").finish()
    }
}
