use std::fmt;
use std::iter;
use std::slice;

use itertools::Itertools;

use crate::lsystem;

lazy_static! {
    static ref PLACEHOLDER: regex::Regex = regex::Regex::new(r"\$\{(.*?)\}").unwrap();
}

/// The symbols understood by the renderer.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum TokenType {
    /// `[`, saves the turtle state.
    PushState,
    /// `]`, restores the last saved turtle state.
    PopState,
    /// `g`
    ColorGreen,
    /// `b`
    ColorBlue,
    /// `r`
    ColorRed,
    /// `c`
    DrawCircle,
    /// `C`
    DrawFilledCircle,
    /// `F`, moves forward while drawing.
    Forward,
    /// `f`, moves forward without drawing.
    ForwardNoDraw,
    /// `+`
    RotateLeft,
    /// `-`
    RotateRight,
    /// Any other character.
    Characters,
}

/// A single symbol of an L-system state.
#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    ty: TokenType,
    literal: String,
    parameters: Vec<String>,
}

/// A sequence of tokens.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TokenSeq {
    tokens: Vec<Token>,
}

/// Resolves `${name}` placeholders in token parameters.
pub trait ParameterProvider {
    /// The value of the placeholder `name` occurring in a parameter of `token`.
    fn parameter(&self, token: &Token, name: &str) -> Option<String>;
}

/// A parameter provider that resolves nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoParameters;

impl TokenType {
    /// The token type of a character.
    pub fn from_char(c: char) -> TokenType {
        match c {
            '[' => TokenType::PushState,
            ']' => TokenType::PopState,
            'g' => TokenType::ColorGreen,
            'b' => TokenType::ColorBlue,
            'r' => TokenType::ColorRed,
            'c' => TokenType::DrawCircle,
            'C' => TokenType::DrawFilledCircle,
            'F' => TokenType::Forward,
            'f' => TokenType::ForwardNoDraw,
            '+' => TokenType::RotateLeft,
            '-' => TokenType::RotateRight,
            _ => TokenType::Characters,
        }
    }

    /// The maximum number of parameters a token of this type accepts.
    pub fn max_parameters(self) -> usize {
        match self {
            TokenType::Forward
            | TokenType::ForwardNoDraw
            | TokenType::RotateLeft
            | TokenType::RotateRight
            | TokenType::DrawCircle
            | TokenType::DrawFilledCircle => 1,
            _ => 0,
        }
    }
}

impl Token {
    /// Creates a token without parameters.
    pub fn new<S>(ty: TokenType, literal: S) -> Self
    where
        S: Into<String>,
    {
        Token::with_parameters(ty, literal, Vec::new())
    }

    /// Creates a token with parameters.
    pub fn with_parameters<S>(ty: TokenType, literal: S, parameters: Vec<String>) -> Self
    where
        S: Into<String>,
    {
        let literal = literal.into();
        Token {
            ty,
            literal,
            parameters,
        }
    }

    /// The type of this token.
    pub fn ty(&self) -> TokenType {
        self.ty
    }

    /// The text this token was lexed from, excluding parameters.
    pub fn literal(&self) -> &str {
        &self.literal
    }

    /// The unresolved parameters of this token.
    pub fn parameters(&self) -> &[String] {
        &self.parameters
    }

    /// Whether this token has any parameters.
    pub fn has_parameters(&self) -> bool {
        !self.parameters.is_empty()
    }

    /// The parameter at `index`, with all placeholders resolved through `provider`.
    pub fn parameter(
        &self,
        index: usize,
        provider: &dyn ParameterProvider,
    ) -> lsystem::Result<String> {
        let raw = self
            .parameters
            .get(index)
            .ok_or_else(|| lsystem::Error::MissingParameter {
                token: self.to_string(),
                index,
            })?;
        self.substitute(raw, provider)
    }

    /// The parameter at `index` as an integer.
    pub fn int_parameter(
        &self,
        index: usize,
        provider: &dyn ParameterProvider,
    ) -> lsystem::Result<i64> {
        let value = self.parameter(index, provider)?;
        value
            .trim()
            .parse()
            .map_err(|_| lsystem::Error::BadParameter { value })
    }

    /// The parameter at `index` as a floating point number.
    pub fn float_parameter(
        &self,
        index: usize,
        provider: &dyn ParameterProvider,
    ) -> lsystem::Result<f64> {
        let value = self.parameter(index, provider)?;
        value
            .trim()
            .parse()
            .map_err(|_| lsystem::Error::BadParameter { value })
    }

    /// Renders this token with all placeholders in its parameters resolved.
    pub fn to_resolved_string(&self, provider: &dyn ParameterProvider) -> lsystem::Result<String> {
        if !self.has_parameters() {
            return Ok(self.literal.clone());
        }
        let parameters = self
            .parameters
            .iter()
            .map(|p| self.substitute(p, provider))
            .collect::<lsystem::Result<Vec<_>>>()?;
        Ok(format!("{}({})", self.literal, parameters.join(",")))
    }

    fn substitute(&self, raw: &str, provider: &dyn ParameterProvider) -> lsystem::Result<String> {
        let mut result = String::with_capacity(raw.len());
        let mut last = 0;
        for captures in PLACEHOLDER.captures_iter(raw) {
            let (whole, name) = match (captures.get(0), captures.get(1)) {
                (Some(whole), Some(name)) => (whole, name.as_str()),
                _ => continue,
            };
            let value = provider.parameter(self, name).ok_or_else(|| {
                lsystem::Error::UnresolvedPlaceholder {
                    name: name.to_owned(),
                }
            })?;
            result.push_str(&raw[last..whole.start()]);
            result.push_str(&value);
            last = whole.end();
        }
        result.push_str(&raw[last..]);
        Ok(result)
    }
}

impl TokenSeq {
    /// Creates an empty sequence.
    pub fn new() -> Self {
        TokenSeq::default()
    }

    /// Lexes a token sequence.
    ///
    /// Whitespace is ignored.  Every renderer symbol becomes a token of its own, while a run of
    /// other characters becomes a single [`TokenType::Characters`] token.  Tokens that accept
    /// parameters may be followed by a comma separated parameter list in parentheses, like
    /// `F(10)` or `+(${angle})`.
    pub fn parse(text: &str) -> lsystem::Result<TokenSeq> {
        let mut chars = text.char_indices().peekable();
        let mut tokens = Vec::new();

        while let Some((offset, c)) = chars.next() {
            if c.is_whitespace() {
                continue;
            }
            let ty = TokenType::from_char(c);
            let mut literal = c.to_string();

            if ty == TokenType::Characters {
                while let Some(&(_, c)) = chars.peek() {
                    if c.is_whitespace() || TokenType::from_char(c) != TokenType::Characters {
                        break;
                    }
                    literal.push(c);
                    chars.next();
                }
                tokens.push(Token::new(ty, literal));
                continue;
            }

            if ty.max_parameters() == 0 || chars.peek().map(|&(_, c)| c) != Some('(') {
                tokens.push(Token::new(ty, literal));
                continue;
            }

            chars.next();
            let mut parameters = Vec::new();
            let mut current = String::new();
            let mut closed = false;
            for (_, c) in &mut chars {
                match c {
                    ')' => {
                        closed = true;
                        break;
                    }
                    ',' if !current.is_empty() => parameters.push(current.split_off(0)),
                    c if c.is_whitespace() => {}
                    c => current.push(c),
                }
            }
            if !closed {
                return Err(lsystem::Error::MissingClosingParenthesis { offset });
            }
            if !current.is_empty() {
                parameters.push(current);
            }

            let max = ty.max_parameters();
            if parameters.len() > max {
                let count = parameters.len();
                return Err(lsystem::Error::TooManyParameters { offset, count, max });
            }
            tokens.push(Token::with_parameters(ty, literal, parameters));
        }

        trace!("lexed {:?} into {} tokens", text, tokens.len());
        Ok(TokenSeq { tokens })
    }

    /// The tokens of this sequence.
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// The number of tokens in this sequence.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Whether this sequence has no tokens.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Iterates over the tokens of this sequence.
    pub fn iter(&self) -> slice::Iter<Token> {
        self.tokens.iter()
    }

    /// Renders this sequence with all placeholders resolved.
    pub fn to_resolved_string(&self, provider: &dyn ParameterProvider) -> lsystem::Result<String> {
        self.tokens
            .iter()
            .map(|t| t.to_resolved_string(provider))
            .collect()
    }
}

impl<F> ParameterProvider for F
where
    F: Fn(&Token, &str) -> Option<String>,
{
    fn parameter(&self, token: &Token, name: &str) -> Option<String> {
        self(token, name)
    }
}

impl ParameterProvider for NoParameters {
    fn parameter(&self, _token: &Token, _name: &str) -> Option<String> {
        None
    }
}

impl From<Vec<Token>> for TokenSeq {
    fn from(tokens: Vec<Token>) -> Self {
        TokenSeq { tokens }
    }
}

impl iter::FromIterator<Token> for TokenSeq {
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = Token>,
    {
        let tokens = iter.into_iter().collect();
        TokenSeq { tokens }
    }
}

impl<'a> IntoIterator for &'a TokenSeq {
    type Item = &'a Token;
    type IntoIter = slice::Iter<'a, Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.iter()
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.has_parameters() {
            write!(f, "{}({})", self.literal, self.parameters.iter().join(","))
        } else {
            f.write_str(&self.literal)
        }
    }
}

impl fmt::Display for TokenSeq {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for token in &self.tokens {
            write!(f, "{}", token)?;
        }
        Ok(())
    }
}
