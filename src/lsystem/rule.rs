use std::fmt;

use crate::lsystem;
use crate::lsystem::random;

/// What a rule matches.
#[derive(Clone, Debug, PartialEq)]
pub enum Expected {
    /// Any token of the given type.
    Type(lsystem::TokenType),
    /// Any token with exactly the given literal.
    Literal(String),
}

/// A rule that always rewrites a matching token to the same replacement.
#[derive(Clone, Debug, PartialEq)]
pub struct SimpleRule {
    name: Option<String>,
    expected: Expected,
    replacement: lsystem::TokenSeq,
}

/// A rule that picks one of several rules at random, each with a given probability.
#[derive(Clone, Debug, PartialEq)]
pub struct StochasticRule {
    name: Option<String>,
    expected: lsystem::TokenType,
    intervals: Vec<Interval>,
}

/// A rewriting rule.
#[derive(Clone, Debug, PartialEq)]
pub enum Rule {
    /// A deterministic rule.
    Simple(SimpleRule),
    /// A randomized rule.
    Stochastic(StochasticRule),
}

/// A cursor over the current state of an L-system that collects the next state.
#[derive(Debug)]
pub struct Cursor<'a> {
    input: &'a [lsystem::Token],
    index: usize,
    output: Vec<lsystem::Token>,
}

#[derive(Clone, Debug, PartialEq)]
struct Interval {
    start: f64,
    end: f64,
    rule: SimpleRule,
}

impl Expected {
    /// Whether `token` is matched.
    pub fn matches(&self, token: &lsystem::Token) -> bool {
        match *self {
            Expected::Type(ty) => token.ty() == ty,
            Expected::Literal(ref literal) => token.literal() == literal,
        }
    }
}

impl SimpleRule {
    /// Creates a rule that rewrites tokens matching `expected` to `replacement`.
    pub fn new(expected: Expected, replacement: lsystem::TokenSeq) -> Self {
        let name = None;
        SimpleRule {
            name,
            expected,
            replacement,
        }
    }

    /// Gives this rule a name.
    pub fn named<S>(mut self, name: S) -> Self
    where
        S: Into<String>,
    {
        self.name = Some(name.into());
        self
    }

    /// The name of this rule.
    pub fn name(&self) -> Option<&str> {
        self.name.as_ref().map(String::as_str)
    }

    /// What this rule matches.
    pub fn expected(&self) -> &Expected {
        &self.expected
    }

    /// What this rule rewrites to.
    pub fn replacement(&self) -> &lsystem::TokenSeq {
        &self.replacement
    }

    /// Whether this rule matches `token`.
    pub fn matches(&self, token: &lsystem::Token) -> bool {
        self.expected.matches(token)
    }

    /// Consumes the token at the cursor and writes the replacement.
    ///
    /// Placeholders in the replacement are kept as is.
    pub fn rewrite(&self, cursor: &mut Cursor) {
        cursor.next();
        cursor.write(&self.replacement);
    }
}

impl StochasticRule {
    /// Creates a rule that picks one of `rules` with equal probability.
    ///
    /// The intervals cover all of `[0, 1)`, regardless of rounding.
    pub fn new(expected: lsystem::TokenType, rules: Vec<SimpleRule>) -> lsystem::Result<Self> {
        let count = rules.len();
        let probabilities = vec![1.0 / count as f64; count];
        let mut rule = StochasticRule::with_probabilities(expected, rules, probabilities)?;
        if let Some(last) = rule.intervals.last_mut() {
            last.end = 1.0;
        }
        Ok(rule)
    }

    /// Creates a rule that picks `rules[i]` with probability `probabilities[i]`.
    ///
    /// The probabilities are laid out as consecutive intervals starting at zero.  They should sum
    /// up to one; random numbers outside of all intervals cause an error when rewriting.
    pub fn with_probabilities(
        expected: lsystem::TokenType,
        rules: Vec<SimpleRule>,
        probabilities: Vec<f64>,
    ) -> lsystem::Result<Self> {
        if rules.is_empty() || rules.len() != probabilities.len() {
            return Err(lsystem::Error::InvalidProbabilities {
                rules: rules.len(),
                probabilities: probabilities.len(),
            });
        }

        let mut start = 0.0;
        let intervals = rules
            .into_iter()
            .zip(probabilities)
            .map(|(rule, probability)| {
                let end = start + probability;
                let interval = Interval { start, end, rule };
                start = end;
                interval
            })
            .collect();
        let name = None;

        Ok(StochasticRule {
            name,
            expected,
            intervals,
        })
    }

    /// Gives this rule a name.
    pub fn named<S>(mut self, name: S) -> Self
    where
        S: Into<String>,
    {
        self.name = Some(name.into());
        self
    }

    /// The name of this rule.
    pub fn name(&self) -> Option<&str> {
        self.name.as_ref().map(String::as_str)
    }

    /// Whether this rule matches `token`.
    pub fn matches(&self, token: &lsystem::Token) -> bool {
        token.ty() == self.expected
    }

    /// Draws a random number and rewrites with the rule whose interval contains it.
    pub fn rewrite(
        &self,
        cursor: &mut Cursor,
        random: &mut dyn random::RandomSource,
    ) -> lsystem::Result<()> {
        let value = random.next_f64();
        let interval = self
            .intervals
            .iter()
            .find(|i| i.start <= value && value < i.end)
            .ok_or(lsystem::Error::NoRuleMatched { value })?;

        trace!("random value {} picked {}", value, interval.rule);
        interval.rule.rewrite(cursor);
        Ok(())
    }
}

impl Rule {
    /// The name of this rule.
    pub fn name(&self) -> Option<&str> {
        match *self {
            Rule::Simple(ref rule) => rule.name(),
            Rule::Stochastic(ref rule) => rule.name(),
        }
    }

    /// Whether this rule matches `token`.
    pub fn matches(&self, token: &lsystem::Token) -> bool {
        match *self {
            Rule::Simple(ref rule) => rule.matches(token),
            Rule::Stochastic(ref rule) => rule.matches(token),
        }
    }

    /// Rewrites the token at the cursor.
    pub fn rewrite(
        &self,
        cursor: &mut Cursor,
        random: &mut dyn random::RandomSource,
    ) -> lsystem::Result<()> {
        match *self {
            Rule::Simple(ref rule) => {
                rule.rewrite(cursor);
                Ok(())
            }
            Rule::Stochastic(ref rule) => rule.rewrite(cursor, random),
        }
    }
}

impl<'a> Cursor<'a> {
    /// Creates a cursor at the start of `input`.
    pub fn new(input: &'a [lsystem::Token]) -> Self {
        let index = 0;
        let output = Vec::with_capacity(input.len());
        Cursor {
            input,
            index,
            output,
        }
    }

    /// Whether all input has been consumed.
    pub fn eof(&self) -> bool {
        self.index >= self.input.len()
    }

    /// The token at the cursor.
    pub fn peek(&self) -> Option<&'a lsystem::Token> {
        self.input.get(self.index)
    }

    /// Consumes the token at the cursor.
    pub fn next(&mut self) -> Option<&'a lsystem::Token> {
        let token = self.input.get(self.index);
        if token.is_some() {
            self.index += 1;
        }
        token
    }

    /// Appends a sequence of tokens to the output.
    pub fn write(&mut self, tokens: &lsystem::TokenSeq) {
        self.output.extend(tokens.iter().cloned());
    }

    /// Appends a single token to the output.
    pub fn write_token(&mut self, token: lsystem::Token) {
        self.output.push(token);
    }

    /// The collected output.
    pub fn into_output(self) -> lsystem::TokenSeq {
        lsystem::TokenSeq::from(self.output)
    }
}

impl From<SimpleRule> for Rule {
    fn from(rule: SimpleRule) -> Self {
        Rule::Simple(rule)
    }
}

impl From<StochasticRule> for Rule {
    fn from(rule: StochasticRule) -> Self {
        Rule::Stochastic(rule)
    }
}

impl fmt::Display for Expected {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Expected::Type(ty) => write!(f, "{:?}", ty),
            Expected::Literal(ref literal) => write!(f, "{:?}", literal),
        }
    }
}

impl fmt::Display for SimpleRule {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if let Some(ref name) = self.name {
            write!(f, "{}: ", name)?;
        }
        write!(f, "{} -> {}", self.expected, self.replacement)
    }
}

impl fmt::Display for StochasticRule {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if let Some(ref name) = self.name {
            write!(f, "{}: ", name)?;
        }
        write!(f, "{:?} -> ", self.expected)?;
        for (i, interval) in self.intervals.iter().enumerate() {
            if i > 0 {
                f.write_str(" | ")?;
            }
            write!(
                f,
                "[{}, {}) {}",
                interval.start, interval.end, interval.rule.replacement
            )?;
        }
        Ok(())
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Rule::Simple(ref rule) => fmt::Display::fmt(rule, f),
            Rule::Stochastic(ref rule) => fmt::Display::fmt(rule, f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn replacement(text: &str) -> lsystem::TokenSeq {
        lsystem::TokenSeq::parse(text).unwrap()
    }

    fn alternatives() -> Vec<SimpleRule> {
        ["F", "FF", "FFF"]
            .iter()
            .map(|r| SimpleRule::new(Expected::Type(lsystem::TokenType::Forward), replacement(r)))
            .collect()
    }

    fn rewrite_once(rule: &Rule, input: &str, random: &mut dyn random::RandomSource) -> String {
        let input = replacement(input);
        let mut cursor = Cursor::new(input.tokens());
        rule.rewrite(&mut cursor, random).unwrap();
        cursor.into_output().to_string()
    }

    #[test]
    fn matching() {
        let _ = env_logger::try_init();

        let f = lsystem::Token::new(lsystem::TokenType::Forward, "F");
        let a = lsystem::Token::new(lsystem::TokenType::Characters, "a");

        let by_type = SimpleRule::new(
            Expected::Type(lsystem::TokenType::Forward),
            replacement("FF"),
        );
        assert!(by_type.matches(&f));
        assert!(!by_type.matches(&a));

        let by_literal = SimpleRule::new(Expected::Literal("a".to_owned()), replacement("ab"));
        assert!(by_literal.matches(&a));
        assert!(!by_literal.matches(&f));
    }

    #[test]
    fn simple_rules_consume_one_token() {
        let _ = env_logger::try_init();

        let rule = Rule::from(
            SimpleRule::new(
                Expected::Type(lsystem::TokenType::Forward),
                replacement("F(${len})+"),
            )
            .named("grow"),
        );
        assert_eq!(Some("grow"), rule.name());
        assert_eq!(
            "F(${len})+",
            rewrite_once(&rule, "FF", &mut random::Fixed(0.0))
        );
        assert_eq!("grow: Forward -> F(${len})+", rule.to_string());
    }

    #[test]
    fn stochastic_rules_pick_by_interval() {
        let _ = env_logger::try_init();

        let rule = Rule::from(
            StochasticRule::new(lsystem::TokenType::Forward, alternatives()).unwrap(),
        );
        assert_eq!("F", rewrite_once(&rule, "F", &mut random::Fixed(0.0)));
        assert_eq!("FF", rewrite_once(&rule, "F", &mut random::Fixed(0.5)));
        assert_eq!("FFF", rewrite_once(&rule, "F", &mut random::Fixed(0.99)));
    }

    #[test]
    fn uniform_intervals_reach_one() {
        let _ = env_logger::try_init();

        let largest = 1.0 - std::f64::EPSILON / 2.0;
        for &count in &[6, 7, 10] {
            let alternatives = (1..=count)
                .map(|n| {
                    let text = "F".repeat(n);
                    SimpleRule::new(
                        Expected::Type(lsystem::TokenType::Forward),
                        replacement(&text),
                    )
                })
                .collect();
            let rule = Rule::from(
                StochasticRule::new(lsystem::TokenType::Forward, alternatives).unwrap(),
            );
            assert_eq!(
                "F".repeat(count),
                rewrite_once(&rule, "F", &mut random::Fixed(largest))
            );
        }
    }

    #[test]
    fn weighted_stochastic_rules() {
        let _ = env_logger::try_init();

        let rule = Rule::from(
            StochasticRule::with_probabilities(
                lsystem::TokenType::Forward,
                alternatives(),
                vec![0.1, 0.1, 0.5],
            )
            .unwrap(),
        );
        assert_eq!("FF", rewrite_once(&rule, "F", &mut random::Fixed(0.15)));
        assert_eq!("FFF", rewrite_once(&rule, "F", &mut random::Fixed(0.2)));

        let input = replacement("F");
        let mut cursor = Cursor::new(input.tokens());
        assert_eq!(
            Err(lsystem::Error::NoRuleMatched { value: 0.9 }),
            rule.rewrite(&mut cursor, &mut random::Fixed(0.9))
        );
    }

    #[test]
    fn invalid_probabilities() {
        let _ = env_logger::try_init();

        assert_eq!(
            Err(lsystem::Error::InvalidProbabilities {
                rules: 0,
                probabilities: 0,
            }),
            StochasticRule::new(lsystem::TokenType::Forward, Vec::new())
        );
        assert_eq!(
            Err(lsystem::Error::InvalidProbabilities {
                rules: 3,
                probabilities: 2,
            }),
            StochasticRule::with_probabilities(
                lsystem::TokenType::Forward,
                alternatives(),
                vec![0.5, 0.5]
            )
        );
    }

    #[test]
    fn cursor() {
        let _ = env_logger::try_init();

        let input = replacement("ab");
        let mut cursor = Cursor::new(input.tokens());
        assert_eq!(Some("a"), cursor.peek().map(lsystem::Token::literal));
        let a = cursor.next().cloned().unwrap();
        cursor.write_token(a);
        cursor.next();
        assert!(cursor.eof());
        assert_eq!(None, cursor.next());
        assert_eq!("a", cursor.into_output().to_string());
    }
}
