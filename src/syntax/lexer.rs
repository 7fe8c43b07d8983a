use std::fmt;

use crate::syntax;

lazy_static! {
    static ref IDENTIFIER: regex::Regex = regex::Regex::new(r"^[A-Za-z0-9_]+$").unwrap();
}

/// The kind of a lexed token.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum TokenKind {
    /// `"` or `'`.
    Quote,
    /// `:`.
    Colon,
    /// `=`.
    Assignment,
    /// `(`.
    ParensOpen,
    /// `)`.
    ParensClose,
    /// `{`.
    CurlyBraceOpen,
    /// `}`.
    CurlyBraceClose,
    /// `->`.
    Arrow,
    /// `.`.
    Dot,
    /// One of `+ - * /`.
    Operator,
    /// A run of digits, optionally with a fraction.
    Number,
    /// A run of `[A-Za-z0-9_]`.
    Identifier,
    /// A run of characters that is neither a keyword nor an identifier.
    Unparsed,
    /// The `rule` keyword.
    Rule,
    /// The `map` keyword.
    Map,
    /// The `set` keyword.
    Set,
    /// A run of whitespace, only produced when whitespace is significant.
    Whitespace,
    /// A line terminator, only produced when whitespace is significant.
    Eol,
}

/// A lexed token.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Token {
    /// The kind of this token.
    pub kind: TokenKind,
    /// The source text of this token.
    pub text: String,
    /// The byte offset of the start of this token.
    pub offset: usize,
}

/// Turns source text into tokens, one token of lookahead at a time.
#[derive(Clone, Debug)]
pub struct Lexer<'a> {
    scanner: syntax::Scanner<'a>,
    buffer: Option<Token>,
    skip_whitespace: bool,
}

impl Token {
    /// The region of source text covered by this token.
    pub fn region(&self) -> syntax::TextRegion {
        syntax::TextRegion::new(self.offset, self.text.len())
    }
}

impl<'a> Lexer<'a> {
    /// Creates a lexer for `source` that skips whitespace.
    pub fn new(source: &'a str) -> Self {
        let scanner = syntax::Scanner::new(source);
        let buffer = None;
        let skip_whitespace = true;

        Lexer {
            scanner,
            buffer,
            skip_whitespace,
        }
    }

    /// Whether whitespace is currently skipped.
    pub fn skip_whitespace(&self) -> bool {
        self.skip_whitespace
    }

    /// Controls whether whitespace is skipped or emitted as tokens.
    ///
    /// Turning skipping back on discards an already buffered whitespace or line terminator token.
    pub fn set_skip_whitespace(&mut self, skip_whitespace: bool) {
        self.skip_whitespace = skip_whitespace;
        if skip_whitespace {
            let buffered_whitespace = self
                .buffer
                .as_ref()
                .map_or(false, |t| t.kind.is_whitespace());
            if buffered_whitespace {
                self.buffer = None;
            }
        }
    }

    /// The byte offset of the next unconsumed character.
    pub fn offset(&self) -> usize {
        self.buffer
            .as_ref()
            .map_or_else(|| self.scanner.offset(), |t| t.offset)
    }

    /// Whether there are no more tokens.
    pub fn eof(&mut self) -> bool {
        if self.buffer.is_some() {
            return false;
        }
        if self.skip_whitespace {
            self.skip_blanks();
        }
        self.scanner.eof()
    }

    /// Returns the next token without consuming it.
    pub fn peek(&mut self) -> syntax::Result<&Token> {
        if self.buffer.is_none() {
            let token = self.lex()?;
            self.buffer = Some(token);
        }
        let offset = self.scanner.offset();
        self.buffer
            .as_ref()
            .ok_or(syntax::Error::PrematureEnd { offset })
    }

    /// Whether the next token is of the specified kind.
    ///
    /// Returns `false` at the end of input.
    pub fn peek_kind(&mut self, kind: TokenKind) -> bool {
        !self.eof() && self.peek().map(|t| t.kind == kind).unwrap_or(false)
    }

    /// Consumes and returns the next token.
    pub fn next(&mut self) -> syntax::Result<Token> {
        let token = match self.buffer.take() {
            Some(token) => token,
            None => self.lex()?,
        };
        trace!("token {:?} {:?} at {}", token.kind, token.text, token.offset);
        Ok(token)
    }

    /// Consumes the next token, failing if it is not of the specified kind.
    pub fn next_kind(&mut self, expected: TokenKind) -> syntax::Result<Token> {
        if self.eof() {
            let offset = self.offset();
            return Err(syntax::Error::PrematureEnd { offset });
        }

        let found = self.peek()?.kind;
        if found == expected {
            self.next()
        } else {
            let token = self.next()?;
            Err(syntax::Error::UnexpectedToken {
                expected,
                found,
                region: token.region(),
                text: token.text,
            })
        }
    }

    fn skip_blanks(&mut self) {
        while let Ok(c) = self.scanner.peek() {
            if !c.is_whitespace() {
                break;
            }
            let _ = self.scanner.next();
        }
    }

    fn lex(&mut self) -> syntax::Result<Token> {
        if self.skip_whitespace {
            self.skip_blanks();
        }

        let offset = self.scanner.offset();
        let kind = match self.scanner.next()? {
            '"' | '\'' => TokenKind::Quote,
            ':' => TokenKind::Colon,
            '=' => TokenKind::Assignment,
            '(' => TokenKind::ParensOpen,
            ')' => TokenKind::ParensClose,
            '{' => TokenKind::CurlyBraceOpen,
            '}' => TokenKind::CurlyBraceClose,
            '-' => {
                if self.scanner.eof() {
                    TokenKind::Operator
                } else if self.scanner.next()? == '>' {
                    TokenKind::Arrow
                } else {
                    self.scanner.push_back()?;
                    TokenKind::Operator
                }
            }
            '.' => TokenKind::Dot,
            '+' | '*' | '/' => TokenKind::Operator,
            '\n' => TokenKind::Eol,
            '\r' => {
                if self.scanner.peek() == Ok('\n') {
                    self.scanner.next()?;
                }
                TokenKind::Eol
            }
            c if c.is_whitespace() => {
                while let Ok(c) = self.scanner.peek() {
                    if !c.is_whitespace() || c == '\n' || c == '\r' {
                        break;
                    }
                    self.scanner.next()?;
                }
                TokenKind::Whitespace
            }
            c if c.is_ascii_digit() => {
                self.digits()?;
                if self.scanner.peek() == Ok('.') {
                    self.scanner.next()?;
                    if self.scanner.peek().map_or(false, |c| c.is_ascii_digit()) {
                        self.digits()?;
                    } else {
                        self.scanner.push_back()?;
                    }
                }
                TokenKind::Number
            }
            _ => {
                while let Ok(c) = self.scanner.peek() {
                    if c.is_whitespace() || is_delimiter(c) {
                        break;
                    }
                    self.scanner.next()?;
                }
                classify(self.scanner.text(offset, self.scanner.offset()))
            }
        };

        let text = self.scanner.text(offset, self.scanner.offset()).to_owned();
        Ok(Token { kind, text, offset })
    }

    fn digits(&mut self) -> syntax::Result<()> {
        while self.scanner.peek().map_or(false, |c| c.is_ascii_digit()) {
            self.scanner.next()?;
        }
        Ok(())
    }
}

impl TokenKind {
    /// Whether this kind of token is only produced when whitespace is significant.
    pub fn is_whitespace(self) -> bool {
        match self {
            TokenKind::Whitespace | TokenKind::Eol => true,
            _ => false,
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            TokenKind::Quote => f.write_str("quote"),
            TokenKind::Colon => f.write_str("`:`"),
            TokenKind::Assignment => f.write_str("`=`"),
            TokenKind::ParensOpen => f.write_str("`(`"),
            TokenKind::ParensClose => f.write_str("`)`"),
            TokenKind::CurlyBraceOpen => f.write_str("`{`"),
            TokenKind::CurlyBraceClose => f.write_str("`}`"),
            TokenKind::Arrow => f.write_str("`->`"),
            TokenKind::Dot => f.write_str("`.`"),
            TokenKind::Operator => f.write_str("operator"),
            TokenKind::Number => f.write_str("number"),
            TokenKind::Identifier => f.write_str("identifier"),
            TokenKind::Unparsed => f.write_str("unparsed text"),
            TokenKind::Rule => f.write_str("`rule`"),
            TokenKind::Map => f.write_str("`map`"),
            TokenKind::Set => f.write_str("`set`"),
            TokenKind::Whitespace => f.write_str("whitespace"),
            TokenKind::Eol => f.write_str("end of line"),
        }
    }
}

fn is_delimiter(c: char) -> bool {
    match c {
        '"' | '\'' | ':' | '=' | '(' | ')' | '{' | '}' | '-' | '.' | '+' | '*' | '/' => true,
        _ => false,
    }
}

fn classify(text: &str) -> TokenKind {
    match text {
        "rule" => TokenKind::Rule,
        "map" => TokenKind::Map,
        "set" => TokenKind::Set,
        _ if IDENTIFIER.is_match(text) => TokenKind::Identifier,
        _ => TokenKind::Unparsed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(lexer: &mut Lexer) -> Vec<(TokenKind, String)> {
        let mut result = Vec::new();
        while !lexer.eof() {
            let token = lexer.next().unwrap();
            result.push((token.kind, token.text));
        }
        result
    }

    fn token(kind: TokenKind, text: &str) -> (TokenKind, String) {
        (kind, text.to_owned())
    }

    #[test]
    fn assignment() {
        let _ = env_logger::try_init();

        let mut lexer = Lexer::new("set axiom = \"abc\"");
        assert_eq!(
            vec![
                token(TokenKind::Set, "set"),
                token(TokenKind::Identifier, "axiom"),
                token(TokenKind::Assignment, "="),
                token(TokenKind::Quote, "\""),
                token(TokenKind::Identifier, "abc"),
                token(TokenKind::Quote, "\""),
            ],
            kinds(&mut lexer)
        );
    }

    #[test]
    fn unnamed_rule() {
        let _ = env_logger::try_init();

        let mut lexer = Lexer::new("rule: ab -> cd");
        assert_eq!(
            vec![
                token(TokenKind::Rule, "rule"),
                token(TokenKind::Colon, ":"),
                token(TokenKind::Identifier, "ab"),
                token(TokenKind::Arrow, "->"),
                token(TokenKind::Identifier, "cd"),
            ],
            kinds(&mut lexer)
        );
    }

    #[test]
    fn named_rule() {
        let _ = env_logger::try_init();

        let mut lexer = Lexer::new("rule myFancyRule : ab -> cd");
        assert_eq!(
            vec![
                token(TokenKind::Rule, "rule"),
                token(TokenKind::Identifier, "myFancyRule"),
                token(TokenKind::Colon, ":"),
                token(TokenKind::Identifier, "ab"),
                token(TokenKind::Arrow, "->"),
                token(TokenKind::Identifier, "cd"),
            ],
            kinds(&mut lexer)
        );
    }

    #[test]
    fn minus_is_pushed_back() {
        let _ = env_logger::try_init();

        let mut lexer = Lexer::new("3-2");
        assert_eq!(
            vec![
                token(TokenKind::Number, "3"),
                token(TokenKind::Operator, "-"),
                token(TokenKind::Number, "2"),
            ],
            kinds(&mut lexer)
        );
    }

    #[test]
    fn numbers() {
        let _ = env_logger::try_init();

        let mut lexer = Lexer::new("1.5 42 7.");
        assert_eq!(
            vec![
                token(TokenKind::Number, "1.5"),
                token(TokenKind::Number, "42"),
                token(TokenKind::Number, "7"),
                token(TokenKind::Dot, "."),
            ],
            kinds(&mut lexer)
        );
    }

    #[test]
    fn unparsed_runs() {
        let _ = env_logger::try_init();

        let mut lexer = Lexer::new("F[+F]");
        assert_eq!(
            vec![
                token(TokenKind::Unparsed, "F["),
                token(TokenKind::Operator, "+"),
                token(TokenKind::Unparsed, "F]"),
            ],
            kinds(&mut lexer)
        );
    }

    #[test]
    fn significant_whitespace() {
        let _ = env_logger::try_init();

        let mut lexer = Lexer::new("a  b\r\nc\n");
        lexer.set_skip_whitespace(false);
        assert_eq!(
            vec![
                token(TokenKind::Identifier, "a"),
                token(TokenKind::Whitespace, "  "),
                token(TokenKind::Identifier, "b"),
                token(TokenKind::Eol, "\r\n"),
                token(TokenKind::Identifier, "c"),
                token(TokenKind::Eol, "\n"),
            ],
            kinds(&mut lexer)
        );
    }

    #[test]
    fn skipping_discards_buffered_whitespace() {
        let _ = env_logger::try_init();

        let mut lexer = Lexer::new("a b");
        lexer.set_skip_whitespace(false);
        assert_eq!(TokenKind::Identifier, lexer.next().unwrap().kind);
        assert_eq!(TokenKind::Whitespace, lexer.peek().unwrap().kind);

        lexer.set_skip_whitespace(true);
        assert_eq!(TokenKind::Identifier, lexer.peek().unwrap().kind);
        assert_eq!("b", lexer.next().unwrap().text);
        assert!(lexer.eof());
    }

    #[test]
    fn next_kind_mismatch() {
        let _ = env_logger::try_init();

        let mut lexer = Lexer::new("rule x");
        assert_eq!(
            Err(syntax::Error::UnexpectedToken {
                expected: TokenKind::Set,
                found: TokenKind::Rule,
                text: "rule".to_owned(),
                region: syntax::TextRegion::new(0, 4),
            }),
            lexer.next_kind(TokenKind::Set)
        );
    }

    #[test]
    fn premature_end() {
        let _ = env_logger::try_init();

        let mut lexer = Lexer::new("   ");
        assert!(lexer.eof());
        assert_eq!(
            Err(syntax::Error::PrematureEnd { offset: 3 }),
            lexer.next()
        );
        assert!(!lexer.peek_kind(TokenKind::Identifier));
    }

    #[test]
    fn keywords_and_peek_kind() {
        let _ = env_logger::try_init();

        let mut lexer = Lexer::new("map set");
        assert!(lexer.peek_kind(TokenKind::Map));
        assert_eq!(TokenKind::Map, lexer.next().unwrap().kind);
        assert!(lexer.peek_kind(TokenKind::Set));
    }
}
