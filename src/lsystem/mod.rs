//! The L-system rewriting engine.
//!
//! An [`LSystem`] starts out from an axiom and grows it by repeatedly replacing every token that
//! some rule matches.
//!
//! # Examples
//!
//! ```
//! # extern crate failure;
//! # extern crate lsystems;
//! # fn main() -> Result<(), failure::Error> {
//! use lsystems::lsystem;
//!
//! let axiom = lsystem::TokenSeq::parse("F")?;
//! let mut system = lsystem::LSystem::new(axiom, 2, Box::new(lsystem::random::Fixed(0.0)));
//! system.add_rule(lsystem::SimpleRule::new(
//!     lsystem::Expected::Type(lsystem::TokenType::Forward),
//!     lsystem::TokenSeq::parse("F[+F]")?,
//! ));
//!
//! system.rewrite_recursively()?;
//! assert_eq!("F[+F][+F[+F]]", system.state().to_string());
//! # Ok(())
//! # }
//! ```
use std::fmt;

mod error;
pub mod random;
mod rule;
mod token;

pub use self::error::Error;
pub use self::error::Result;
pub use self::rule::Cursor;
pub use self::rule::Expected;
pub use self::rule::Rule;
pub use self::rule::SimpleRule;
pub use self::rule::StochasticRule;
pub use self::token::NoParameters;
pub use self::token::ParameterProvider;
pub use self::token::Token;
pub use self::token::TokenSeq;
pub use self::token::TokenType;

/// A Lindenmayer system.
pub struct LSystem {
    axiom: TokenSeq,
    state: TokenSeq,
    rules: Vec<Rule>,
    recursion_count: usize,
    desired_recursion_count: usize,
    random: Box<dyn random::RandomSource>,
    parameter_provider: Box<dyn ParameterProvider>,
}

impl LSystem {
    /// Creates a system without rules whose state is `axiom`.
    pub fn new(
        axiom: TokenSeq,
        desired_recursion_count: usize,
        random: Box<dyn random::RandomSource>,
    ) -> Self {
        let state = axiom.clone();
        let rules = Vec::new();
        let recursion_count = 0;
        let parameter_provider = Box::new(NoParameters);

        LSystem {
            axiom,
            state,
            rules,
            recursion_count,
            desired_recursion_count,
            random,
            parameter_provider,
        }
    }

    /// Restores the axiom as the current state.
    pub fn reset(&mut self) {
        self.state = self.axiom.clone();
        self.recursion_count = 0;
    }

    /// Rewrites the current state once.
    ///
    /// Each token is rewritten by the first rule that matches it, in the order that the rules
    /// were added; tokens that no rule matches are kept.
    pub fn rewrite(&mut self) -> Result<()> {
        let mut cursor = Cursor::new(self.state.tokens());
        while let Some(token) = cursor.peek() {
            match self.rules.iter().find(|rule| rule.matches(token)) {
                Some(rule) => rule.rewrite(&mut cursor, &mut *self.random)?,
                None => {
                    cursor.next();
                    cursor.write_token(token.clone());
                }
            }
        }

        let state = cursor.into_output();
        self.state = state;
        self.recursion_count += 1;
        trace!(
            "generation {} has {} tokens",
            self.recursion_count,
            self.state.len()
        );
        Ok(())
    }

    /// Resets the system and rewrites it the desired number of times.
    pub fn rewrite_recursively(&mut self) -> Result<()> {
        self.reset();
        for _ in 0..self.desired_recursion_count {
            self.rewrite()?;
        }
        debug!(
            "rewrote {} generations into {} tokens",
            self.recursion_count,
            self.state.len()
        );
        Ok(())
    }

    /// The axiom.
    pub fn axiom(&self) -> &TokenSeq {
        &self.axiom
    }

    /// The current state.
    pub fn state(&self) -> &TokenSeq {
        &self.state
    }

    /// The current state with all placeholders resolved.
    pub fn resolved_state(&self) -> Result<String> {
        self.state.to_resolved_string(&*self.parameter_provider)
    }

    /// The number of times the current state has been rewritten since the last reset.
    pub fn recursion_count(&self) -> usize {
        self.recursion_count
    }

    /// The number of times [`LSystem::rewrite_recursively`] rewrites.
    pub fn desired_recursion_count(&self) -> usize {
        self.desired_recursion_count
    }

    /// Changes the number of times [`LSystem::rewrite_recursively`] rewrites.
    pub fn set_desired_recursion_count(&mut self, desired_recursion_count: usize) {
        self.desired_recursion_count = desired_recursion_count;
    }

    /// Adds a rule with lower priority than all rules added before.
    pub fn add_rule<R>(&mut self, rule: R) -> &mut Self
    where
        R: Into<Rule>,
    {
        self.rules.push(rule.into());
        self
    }

    /// Adds several rules, in order.
    pub fn add_rules<I>(&mut self, rules: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Into<Rule>,
    {
        self.rules.extend(rules.into_iter().map(Into::into));
        self
    }

    /// The rules, in order of priority.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Replaces the provider used to resolve placeholders in token parameters.
    pub fn set_parameter_provider(&mut self, parameter_provider: Box<dyn ParameterProvider>) {
        self.parameter_provider = parameter_provider;
    }

    /// The parameter at `index` of `token`, with all placeholders resolved.
    pub fn resolve(&self, token: &Token, index: usize) -> Result<String> {
        token.parameter(index, &*self.parameter_provider)
    }
}

impl fmt::Debug for LSystem {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("LSystem")
            .field("axiom", &self.axiom.to_string())
            .field("state", &self.state.to_string())
            .field("rules", &self.rules)
            .field("recursion_count", &self.recursion_count)
            .field("desired_recursion_count", &self.desired_recursion_count)
            .field("random", &self.random)
            .finish()
    }
}
