use std::mem;

use crate::ast;
use crate::scope;
use crate::syntax;
use crate::syntax::TokenKind;

/// A recursive-descent parser that builds an AST, binding identifiers to the scope that is active
/// where they appear.
#[derive(Debug)]
pub struct Parser<'a> {
    lexer: syntax::Lexer<'a>,
    ast: ast::Ast,
    scope: scope::ScopeId,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str) -> Self {
        let lexer = syntax::Lexer::new(source);
        let ast = ast::Ast::new();
        let scope = ast.scopes().global();

        Parser { lexer, ast, scope }
    }

    pub fn parse(mut self) -> syntax::Result<ast::Ast> {
        let root = self.ast.root();
        while !self.lexer.eof() {
            let statement = self.statement()?;
            self.ast.add_child(root, statement);
        }
        debug!(
            "parsed {} statements into {} nodes",
            self.ast.statements().len(),
            self.ast.len()
        );
        Ok(self.ast)
    }

    fn statement(&mut self) -> syntax::Result<ast::NodeId> {
        let inner = match self.lexer.peek()?.kind {
            TokenKind::CurlyBraceOpen => self.block()?,
            TokenKind::Rule => self.rule_definition()?,
            TokenKind::Set => self.assignment()?,
            TokenKind::CurlyBraceClose => {
                let token = self.lexer.next()?;
                return Err(syntax::Error::syntax(
                    token.region(),
                    "unexpected `}` outside of a block",
                ));
            }
            _ => self.expression()?,
        };

        let region = self.ast.region_including_children(inner);
        let statement = self.ast.new_node(ast::NodeKind::Statement, region);
        self.ast.add_child(statement, inner);
        Ok(statement)
    }

    fn block(&mut self) -> syntax::Result<ast::NodeId> {
        let open = self.lexer.next_kind(TokenKind::CurlyBraceOpen)?;
        let scope = self.ast.scopes_mut().create_anonymous_scope(self.scope);
        let outer = mem::replace(&mut self.scope, scope);

        let mut statements = Vec::new();
        loop {
            if self.lexer.eof() {
                let offset = self.lexer.offset();
                return Err(syntax::Error::PrematureEnd { offset });
            }
            if self.lexer.peek_kind(TokenKind::CurlyBraceClose) {
                break;
            }
            statements.push(self.statement()?);
        }
        let close = self.lexer.next_kind(TokenKind::CurlyBraceClose)?;
        self.scope = outer;

        let region = open.region().merge(close.region());
        let block = self.ast.new_node(ast::NodeKind::Block { scope }, region);
        for statement in statements {
            self.ast.add_child(block, statement);
        }
        Ok(block)
    }

    fn assignment(&mut self) -> syntax::Result<ast::NodeId> {
        let set = self.lexer.next_kind(TokenKind::Set)?;
        let name = self.lexer.next_kind(TokenKind::Identifier)?;
        let equals = self.lexer.next_kind(TokenKind::Assignment)?;
        let value = self.expression()?;

        let kind = ast::NodeKind::Assignment {
            name: name.text,
            scope: self.scope,
        };
        let assignment = self.ast.new_node(kind, set.region().merge(equals.region()));
        self.ast.add_child(assignment, value);
        Ok(assignment)
    }

    fn rule_definition(&mut self) -> syntax::Result<ast::NodeId> {
        let rule = self.lexer.next_kind(TokenKind::Rule)?;
        let name = if self.lexer.peek_kind(TokenKind::Identifier) {
            Some(self.lexer.next()?.text)
        } else {
            None
        };
        self.lexer.next_kind(TokenKind::Colon)?;
        let (expected, _) = self.unbroken_run()?;
        self.lexer.next_kind(TokenKind::Arrow)?;
        let (replacement, end) = self.unbroken_run()?;

        let kind = ast::NodeKind::RuleDefinition {
            name,
            expected,
            replacement,
        };
        Ok(self.ast.new_node(kind, rule.region().merge(end)))
    }

    /// Reads the text of adjacent tokens up to the next whitespace.
    fn unbroken_run(&mut self) -> syntax::Result<(String, syntax::TextRegion)> {
        if self.lexer.eof() {
            let offset = self.lexer.offset();
            return Err(syntax::Error::PrematureEnd { offset });
        }

        let skip_whitespace = self.lexer.skip_whitespace();
        let first = self.lexer.next()?;
        self.lexer.set_skip_whitespace(false);

        let mut text = first.text.clone();
        let mut region = first.region();
        while !self.lexer.eof() && !self.lexer.peek()?.kind.is_whitespace() {
            let token = self.lexer.next()?;
            text.push_str(&token.text);
            region = region.merge(token.region());
        }

        self.lexer.set_skip_whitespace(skip_whitespace);
        Ok((text, region))
    }

    fn expression(&mut self) -> syntax::Result<ast::NodeId> {
        let skip_whitespace = self.lexer.skip_whitespace();
        self.lexer.set_skip_whitespace(false);
        let result = self.operator_precedence();
        self.lexer.set_skip_whitespace(skip_whitespace);

        let (value, region) = result?;
        let expression = self.ast.new_node(ast::NodeKind::Expression, region);
        self.ast.add_child(expression, value);
        Ok(expression)
    }

    /// Parses an infix expression with the shunting-yard algorithm, stopping at the end of the
    /// line, the end of the input or a closing curly brace.
    fn operator_precedence(&mut self) -> syntax::Result<(ast::NodeId, syntax::TextRegion)> {
        let mut values = Vec::new();
        let mut operators: Vec<(ast::Operator, syntax::TextRegion)> = Vec::new();
        let mut region: Option<syntax::TextRegion> = None;

        while !self.lexer.eof() {
            let (kind, token_region) = {
                let token = self.lexer.peek()?;
                (token.kind, token.region())
            };
            let consumed = match kind {
                TokenKind::Whitespace => {
                    self.lexer.next()?;
                    continue;
                }
                TokenKind::Eol | TokenKind::CurlyBraceClose => break,
                TokenKind::Identifier => {
                    let token = self.lexer.next()?;
                    values.push(self.identifier(token));
                    token_region
                }
                TokenKind::Number => {
                    let token = self.lexer.next()?;
                    values.push(self.number(token)?);
                    token_region
                }
                TokenKind::Quote => {
                    let string = self.string()?;
                    values.push(string);
                    self.ast.region(string)
                }
                TokenKind::ParensOpen => {
                    self.lexer.next()?;
                    operators.push((ast::Operator::Parens, token_region));
                    token_region
                }
                TokenKind::ParensClose => {
                    self.lexer.next()?;
                    loop {
                        match operators.pop() {
                            Some((ast::Operator::Parens, _)) => break,
                            Some((operator, at)) => self.reduce(operator, at, &mut values)?,
                            None => {
                                return Err(syntax::Error::syntax(
                                    token_region,
                                    "misplaced closing parenthesis",
                                ))
                            }
                        }
                    }
                    token_region
                }
                TokenKind::Operator => {
                    let token = self.lexer.next()?;
                    let operator = ast::Operator::from_symbol(&token.text).ok_or_else(|| {
                        syntax::Error::syntax(
                            token_region,
                            format!("unknown operator `{}`", token.text),
                        )
                    })?;
                    while let Some(&(top, at)) = operators.last() {
                        let pops = top != ast::Operator::Parens
                            && (top.precedence() > operator.precedence()
                                || (operator.is_left_associative()
                                    && top.precedence() == operator.precedence()));
                        if !pops {
                            break;
                        }
                        operators.pop();
                        self.reduce(top, at, &mut values)?;
                    }
                    operators.push((operator, token_region));
                    token_region
                }
                _ => {
                    let token = self.lexer.next()?;
                    return Err(syntax::Error::syntax(
                        token_region,
                        format!("unexpected {} `{}` in expression", kind, token.text),
                    ));
                }
            };
            region = Some(region.map_or(consumed, |r| r.merge(consumed)));
        }

        let region =
            region.unwrap_or_else(|| syntax::TextRegion::new(self.lexer.offset(), 0));
        while let Some((operator, at)) = operators.pop() {
            if operator == ast::Operator::Parens {
                return Err(syntax::Error::syntax(at, "missing closing parenthesis"));
            }
            self.reduce(operator, at, &mut values)?;
        }

        match values.len() {
            0 => Err(syntax::Error::syntax(region, "expected an expression")),
            1 => Ok((values[0], region)),
            _ => Err(syntax::Error::syntax(region, "dangling values")),
        }
    }

    fn reduce(
        &mut self,
        operator: ast::Operator,
        region: syntax::TextRegion,
        values: &mut Vec<ast::NodeId>,
    ) -> syntax::Result<()> {
        if values.len() < operator.arity() {
            return Err(syntax::Error::syntax(
                region,
                format!("operator `{}` is missing an operand", operator),
            ));
        }

        let operands = values.split_off(values.len() - operator.arity());
        let node = self
            .ast
            .new_node(ast::NodeKind::Operator(operator), region);
        for operand in operands {
            self.ast.add_child(node, operand);
        }
        values.push(node);
        Ok(())
    }

    fn identifier(&mut self, token: syntax::Token) -> ast::NodeId {
        let region = token.region();
        let kind = ast::NodeKind::Identifier {
            name: token.text.clone(),
            scope: self.scope,
        };
        let node = self.ast.new_node(kind, region);
        self.ast
            .scopes_mut()
            .declare_variable(self.scope, &token.text, Some(node));
        node
    }

    fn number(&mut self, token: syntax::Token) -> syntax::Result<ast::NodeId> {
        let region = token.region();
        let number = if token.text.contains('.') {
            token.text.parse().ok().map(ast::Number::Float)
        } else {
            token.text.parse().ok().map(ast::Number::Integer)
        };

        match number {
            Some(number) => Ok(self.ast.new_node(ast::NodeKind::Number(number), region)),
            None => Err(syntax::Error::IllegalNumber {
                literal: token.text,
                region,
            }),
        }
    }

    fn string(&mut self) -> syntax::Result<ast::NodeId> {
        let open = self.lexer.next_kind(TokenKind::Quote)?;
        let skip_whitespace = self.lexer.skip_whitespace();
        self.lexer.set_skip_whitespace(false);

        let mut text = String::new();
        let close = loop {
            if self.lexer.eof() {
                let offset = self.lexer.offset();
                return Err(syntax::Error::PrematureEnd { offset });
            }
            let token = self.lexer.next()?;
            match token.kind {
                TokenKind::Quote if token.text == open.text => break token,
                TokenKind::Eol => {}
                _ => text.push_str(&token.text),
            }
        };

        self.lexer.set_skip_whitespace(skip_whitespace);
        let region = open.region().merge(close.region());
        Ok(self.ast.new_node(ast::NodeKind::String(text), region))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::ast::printer;

    fn parse(source: &str) -> ast::Ast {
        syntax::parse(source).unwrap()
    }

    fn only_statement(ast: &ast::Ast) -> ast::NodeId {
        assert_eq!(1, ast.statements().len());
        ast.child(ast.statements()[0], 0).unwrap()
    }

    #[test]
    fn assignment() {
        let _ = env_logger::try_init();

        let ast = parse("set axiom = \"abc\"");
        let assignment = only_statement(&ast);
        assert_eq!(
            &ast::NodeKind::Assignment {
                name: "axiom".to_owned(),
                scope: ast.scopes().global(),
            },
            ast.kind(assignment)
        );

        let expression = ast.child(assignment, 0).unwrap();
        assert_eq!(&ast::NodeKind::Expression, ast.kind(expression));
        let string = ast.child(expression, 0).unwrap();
        assert_eq!(&ast::NodeKind::String("abc".to_owned()), ast.kind(string));
        assert_eq!(syntax::TextRegion::new(12, 5), ast.region(string));
    }

    #[test]
    fn unnamed_rule() {
        let _ = env_logger::try_init();

        let ast = parse("rule: ab -> cd");
        assert_eq!(
            &ast::NodeKind::RuleDefinition {
                name: None,
                expected: "ab".to_owned(),
                replacement: "cd".to_owned(),
            },
            ast.kind(only_statement(&ast))
        );
    }

    #[test]
    fn named_rule() {
        let _ = env_logger::try_init();

        let ast = parse("rule myFancyRule : ab -> cd");
        assert_eq!(
            &ast::NodeKind::RuleDefinition {
                name: Some("myFancyRule".to_owned()),
                expected: "ab".to_owned(),
                replacement: "cd".to_owned(),
            },
            ast.kind(only_statement(&ast))
        );
    }

    #[test]
    fn rule_operands_are_unbroken_runs() {
        let _ = env_logger::try_init();

        let ast = parse("rule: F -> F[+F]F[-F]F\nset recursionCount = 1");
        assert_eq!(2, ast.statements().len());
        assert_eq!(
            &ast::NodeKind::RuleDefinition {
                name: None,
                expected: "F".to_owned(),
                replacement: "F[+F]F[-F]F".to_owned(),
            },
            ast.kind(ast.child(ast.statements()[0], 0).unwrap())
        );
    }

    #[test]
    fn statements_end_at_line_breaks() {
        let _ = env_logger::try_init();

        let ast = parse("set axiom = \"a\"\nset recursionCount = 2\nrule: a -> ab");
        assert_eq!(3, ast.statements().len());
    }

    #[test]
    fn strings_keep_whitespace_and_drop_line_breaks() {
        let _ = env_logger::try_init();

        let ast = parse("set axiom = \"F  +\nF 'x'\"");
        let expression = ast.child(only_statement(&ast), 0).unwrap();
        let string = ast.child(expression, 0).unwrap();
        assert_eq!(
            &ast::NodeKind::String("F  +F 'x'".to_owned()),
            ast.kind(string)
        );
    }

    #[test]
    fn precedence() {
        let _ = env_logger::try_init();

        let ast = parse("1+2*3");
        let expression = only_statement(&ast);
        let add = ast.child(expression, 0).unwrap();
        assert_eq!(&ast::NodeKind::Operator(ast::Operator::Add), ast.kind(add));
        let multiply = ast.child(add, 1).unwrap();
        assert_eq!(
            &ast::NodeKind::Operator(ast::Operator::Multiply),
            ast.kind(multiply)
        );
    }

    #[test]
    fn left_associativity() {
        let _ = env_logger::try_init();

        let ast = parse("8 - 4 - 2");
        let expression = only_statement(&ast);
        let outer = ast.child(expression, 0).unwrap();
        let inner = ast.child(outer, 0).unwrap();
        assert_eq!(
            &ast::NodeKind::Operator(ast::Operator::Subtract),
            ast.kind(inner)
        );
        assert_eq!(
            &ast::NodeKind::Number(ast::Number::Integer(2)),
            ast.kind(ast.child(outer, 1).unwrap())
        );
    }

    #[test]
    fn numbers() {
        let _ = env_logger::try_init();

        let ast = parse("1.25");
        let expression = only_statement(&ast);
        assert_eq!(
            &ast::NodeKind::Number(ast::Number::Float(1.25)),
            ast.kind(ast.child(expression, 0).unwrap())
        );
    }

    #[test]
    fn illegal_number() {
        let _ = env_logger::try_init();

        assert_eq!(
            Err(syntax::Error::IllegalNumber {
                literal: "99999999999999999999".to_owned(),
                region: syntax::TextRegion::new(0, 20),
            }),
            syntax::parse("99999999999999999999")
        );
    }

    #[test]
    fn blocks_open_scopes() {
        let _ = env_logger::try_init();

        let ast = parse("a\n{\n  a\n}");
        let global = ast.scopes().global();
        let block = ast.child(ast.statements()[1], 0).unwrap();
        let scope = match *ast.kind(block) {
            ast::NodeKind::Block { scope } => scope,
            ref other => panic!("not a block: {}", other),
        };

        assert_eq!(Some(global), ast.scopes().parent(scope));
        assert_eq!("anonScope1", ast.scopes().name(scope));

        let outer = ast.scopes().symbol(global, "a", false).unwrap();
        let inner = ast.scopes().symbol(scope, "a", false).unwrap();
        assert_ne!(outer, inner);

        let identifier = ast.find(|kind| match *kind {
            ast::NodeKind::Identifier { scope: s, .. } => s == scope,
            _ => false,
        });
        assert_eq!(1, identifier.len());
        assert_eq!(scope, ast.definition_scope(identifier[0]));
        assert_eq!(Some(identifier[0]), ast.scopes().symbol_info(inner).site());
    }

    #[test]
    fn nested_blocks_with_one_liners() {
        let _ = env_logger::try_init();

        let ast = parse("{\n  set a = 1\n  { set b = 2 }\n}");
        assert_eq!(
            "{\n  set a = 1\n  {\n    set b = 2\n  }\n}",
            printer::print(&ast, ast.root())
        );
    }

    #[test]
    fn dangling_values() {
        let _ = env_logger::try_init();

        match syntax::parse("1 2") {
            Err(syntax::Error::Syntax { ref message, .. }) => {
                assert_eq!("dangling values", message)
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn missing_operand() {
        let _ = env_logger::try_init();

        match syntax::parse("set a = 1 +") {
            Err(syntax::Error::Syntax { ref message, .. }) => {
                assert_eq!("operator `+` is missing an operand", message)
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn parenthesis_mismatch() {
        let _ = env_logger::try_init();

        match syntax::parse("(1 + 2") {
            Err(syntax::Error::Syntax { ref message, region }) => {
                assert_eq!("missing closing parenthesis", message);
                assert_eq!(syntax::TextRegion::new(0, 1), region);
            }
            other => panic!("unexpected result: {:?}", other),
        }
        match syntax::parse("1 + 2)") {
            Err(syntax::Error::Syntax { ref message, .. }) => {
                assert_eq!("misplaced closing parenthesis", message)
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn missing_arrow() {
        let _ = env_logger::try_init();

        match syntax::parse("rule: a ab") {
            Err(syntax::Error::UnexpectedToken {
                expected, found, ..
            }) => {
                assert_eq!(TokenKind::Arrow, expected);
                assert_eq!(TokenKind::Identifier, found);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn unterminated_block_and_string() {
        let _ = env_logger::try_init();

        assert_eq!(
            Err(syntax::Error::PrematureEnd { offset: 11 }),
            syntax::parse("{ set a = 1")
        );
        assert_eq!(
            Err(syntax::Error::PrematureEnd { offset: 11 }),
            syntax::parse("set a = \"bc")
        );
    }

    #[test]
    fn stray_closing_brace() {
        let _ = env_logger::try_init();

        match syntax::parse("}") {
            Err(syntax::Error::Syntax { ref message, .. }) => {
                assert_eq!("unexpected `}` outside of a block", message)
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn empty_source() {
        let _ = env_logger::try_init();

        let ast = parse("  \n\n ");
        assert!(ast.statements().is_empty());
    }
}
