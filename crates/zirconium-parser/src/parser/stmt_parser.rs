//! Statement parsing.
//!
//! Handles the file and block loops, control flow, declarations and the
//! command-mode decision between a call and an expression.

use zirconium_core::{ParseError, ParseErrorKind, Span};

use super::{Feature, Parser, ParserMode};
use crate::ast::*;
use crate::lexer::{Keyword, Operator, Punct, TokenFlags, TokenKind, precedence};

impl<'src, 'ast> Parser<'src, 'ast> {
    /// Parse statements until the end of input.
    pub fn parse_source_file(&mut self) -> Result<&'ast SourceFile<'ast>, ParseError> {
        let mut statements = Vec::new();
        loop {
            self.skip_statement_ends();
            if self.is_eof() {
                break;
            }
            statements.push(self.parse_statement()?);
            self.expect_statement_end(false)?;
        }

        let span = match (statements.first(), statements.last()) {
            (Some(first), Some(last)) => first.span().merge(last.span()),
            _ => Span::default(),
        };
        Ok(self.factory.source_file(&statements, span))
    }

    /// Parse a single statement.
    pub fn parse_statement(&mut self) -> Result<Stmt<'ast>, ParseError> {
        let token = self.peek();
        match token.kind {
            TokenKind::Keyword(Keyword::If) => self.parse_if_statement(),
            TokenKind::Keyword(Keyword::For) => self.parse_for_in_statement(),
            TokenKind::Keyword(Keyword::Function) => {
                if self.peek_nth(1).is_special(Punct::LeftParen) {
                    self.parse_expression_statement()
                } else {
                    Ok(Stmt::Function(self.parse_function_declaration()?))
                }
            }
            TokenKind::Keyword(Keyword::Return) => self.parse_return_statement(),
            TokenKind::Keyword(Keyword::Let | Keyword::Const) => Ok(Stmt::Variable(self.parse_let_const()?)),
            TokenKind::Keyword(Keyword::Enum) => Ok(Stmt::Enum(self.parse_enum_declaration()?)),
            TokenKind::Keyword(Keyword::Export) => self.parse_export(),
            TokenKind::Keyword(_) => Err(self.unexpected(token)),
            TokenKind::Special(Punct::LeftBrace) => Ok(Stmt::Block(self.parse_block()?)),
            TokenKind::Identifier | TokenKind::PropertyAccess => self.parse_name_statement(),
            _ => self.parse_expression_statement(),
        }
    }

    fn parse_expression_statement(&mut self) -> Result<Stmt<'ast>, ParseError> {
        let expr = self.parse_expression()?;
        Ok(self.factory.expression_statement(expr))
    }

    /// After a statement: a newline, `;`, end of input, or `}` in a block.
    fn expect_statement_end(&mut self, in_block: bool) -> Result<(), ParseError> {
        let token = self.peek();
        match token.kind {
            TokenKind::EndOfStatement => {
                self.advance();
                Ok(())
            }
            TokenKind::Eof => Ok(()),
            TokenKind::Special(Punct::RightBrace) if in_block => Ok(()),
            _ => Err(self.throw_error(
                ParseErrorKind::UnexpectedToken,
                token.span,
                format!("expected end of statement, found {}", token.kind),
            )),
        }
    }

    /// Parse `{ statements }`. Calls inside use the top-level call mode.
    pub(super) fn parse_block(&mut self) -> Result<&'ast Block<'ast>, ParseError> {
        let open = self.peek();
        if !open.is_special(Punct::LeftBrace) {
            return Err(self.throw_error(
                ParseErrorKind::ExpectedBlock,
                open.span,
                format!("expected '{{', found {}", open.kind),
            ));
        }
        self.advance();
        let mode = self.options.mode;
        self.push_call_mode(mode);

        let statements = self.nested(open.span, |p| {
            let mut statements = Vec::new();
            loop {
                p.skip_statement_ends();
                if p.check_special(Punct::RightBrace) {
                    return Ok(statements);
                }
                if p.is_eof() {
                    let token = p.peek();
                    return Err(p.throw_error(ParseErrorKind::UnexpectedEof, token.span, "expected '}' to close block"));
                }
                statements.push(p.parse_statement()?);
                p.expect_statement_end(true)?;
            }
        })?;

        let close = self.advance();
        self.pop_call_mode();
        Ok(self.factory.block(&statements, open.span.merge(close.span)))
    }

    // ========================================================================
    // Names: assignment, command call or expression
    // ========================================================================

    fn parse_name_statement(&mut self) -> Result<Stmt<'ast>, ParseError> {
        let token = self.peek();
        let next = self.peek_nth(1);

        if next.is_operator(Operator::Assign) {
            if token.kind == TokenKind::Identifier {
                self.advance();
                let name = self.identifier(token);
                let stmt = self.parse_variable_declaration(token.span, name, NodeFlags::empty())?;
                return Ok(Stmt::Variable(stmt));
            }
            return self.parse_expression_statement();
        }

        let adjacent = Self::adjacent(&token, &next);
        if self.is_strict() || (adjacent && (next.is_special(Punct::LeftParen) || next.is_special(Punct::LeftBracket)))
        {
            return self.parse_expression_statement();
        }

        if adjacent && next.is_operator(Operator::Bang) && self.options.supports(Feature::BangCall) {
            let after = self.peek_nth(2);
            if after.is_statement_end() || after.is_special(Punct::RightBrace) {
                self.advance();
                let bang = self.advance();
                let callee = self.property_chain(token)?;
                let call = self.factory.call(callee, &[], bang.span);
                return Ok(self.factory.expression_statement(call));
            }
        }

        self.advance();
        let callee = self.property_chain(token)?;

        let following = self.peek();
        let binary_follows =
            matches!(following.kind, TokenKind::Operator(op) if precedence(op).is_some()) && !self.can_start_argument();
        if binary_follows {
            let expr = self.mutate_expression(callee, 1)?;
            return Ok(self.factory.expression_statement(expr));
        }
        if token.flags.contains(TokenFlags::VARIABLE) && !self.can_start_argument() {
            return Ok(self.factory.expression_statement(callee));
        }

        let call = self.parse_simple_call(callee)?;
        Ok(self.factory.expression_statement(call))
    }

    /// Parse `= initializer` after a name.
    fn parse_variable_declaration(
        &mut self,
        start: Span,
        name: &'ast Identifier<'ast>,
        flags: NodeFlags,
    ) -> Result<&'ast VariableStatement<'ast>, ParseError> {
        self.expect(TokenKind::Operator(Operator::Assign))?;

        let token = self.peek();
        let rejected = match token.kind {
            TokenKind::Special(Punct::LeftBrace) if !self.looks_like_object_literal() => {
                Some("a block cannot be assigned to a variable".to_string())
            }
            TokenKind::Keyword(keyword) if keyword != Keyword::Function => {
                Some(format!("'{}' cannot be assigned to a variable", keyword.as_str()))
            }
            TokenKind::EndOfStatement | TokenKind::Eof => Some("expected a value after '='".to_string()),
            _ => None,
        };
        if let Some(message) = rejected {
            return Err(self.throw_error(ParseErrorKind::InvalidVariableAssignment, token.span, message));
        }

        let initializer = self.parse_expression()?.unparenthesized();
        if matches!(
            initializer,
            Expr::Option(_) | Expr::OptionKey(_) | Expr::SimpleCall(_) | Expr::Invalid(_)
        ) {
            return Err(self.throw_node_error(
                initializer.meta(),
                ParseErrorKind::InvalidVariableAssignment,
                "this expression cannot be assigned to a variable",
            ));
        }
        Ok(self.factory.variable_statement(start, name, initializer, flags))
    }

    /// Whether the `{` at the current token opens an object literal.
    fn looks_like_object_literal(&mut self) -> bool {
        let mut n = 1;
        while self.peek_nth(n).kind == TokenKind::EndOfStatement {
            n += 1;
        }
        let key = self.peek_nth(n);
        if key.is_special(Punct::RightBrace) {
            return true;
        }
        matches!(
            key.kind,
            TokenKind::Identifier | TokenKind::String | TokenKind::Number | TokenKind::Boolean | TokenKind::Keyword(_)
        ) && self.peek_nth(n + 1).is_special(Punct::Colon)
    }

    fn parse_let_const(&mut self) -> Result<&'ast VariableStatement<'ast>, ParseError> {
        let keyword = self.advance();
        let flags = if keyword.is_keyword(Keyword::Const) {
            NodeFlags::CONST
        } else {
            NodeFlags::LET
        };
        if !self.options.supports(Feature::LetConst) {
            self.error(
                ParseErrorKind::NotImplemented,
                keyword.span,
                format!("'{}' requires language version 2021", keyword.lexeme),
            );
        }

        let token = self.peek();
        match token.kind {
            TokenKind::Identifier => {}
            TokenKind::Keyword(_) | TokenKind::Boolean => {
                return Err(self.throw_error(
                    ParseErrorKind::ReservedKeyword,
                    token.span,
                    format!("'{}' is reserved and cannot name a variable", token.lexeme),
                ));
            }
            _ => {
                return Err(self.throw_error(
                    ParseErrorKind::IdentifierExpected,
                    token.span,
                    format!("expected variable name after '{}', found {}", keyword.lexeme, token.kind),
                ));
            }
        }
        self.advance();
        let name = self.identifier(token);
        self.parse_variable_declaration(keyword.span, name, flags)
    }

    // ========================================================================
    // Control flow
    // ========================================================================

    fn parse_if_statement(&mut self) -> Result<Stmt<'ast>, ParseError> {
        let keyword = self.advance();
        let condition = self.parse_expression()?;
        let then_statement = self.parse_branch()?;

        let else_statement = if self.eat_else() {
            if self.check_keyword(Keyword::If) {
                Some(self.parse_if_statement()?)
            } else {
                Some(self.parse_branch()?)
            }
        } else {
            None
        };
        Ok(self
            .factory
            .if_statement(keyword.span, condition, then_statement, else_statement))
    }

    /// A `{ block }` or `: statement` body.
    fn parse_branch(&mut self) -> Result<Stmt<'ast>, ParseError> {
        let token = self.peek();
        if token.is_special(Punct::LeftBrace) {
            return Ok(Stmt::Block(self.parse_block()?));
        }
        if self.eat(TokenKind::Special(Punct::Colon)).is_some() {
            return self.parse_statement();
        }
        Err(self.throw_error(
            ParseErrorKind::ExpectedBlock,
            token.span,
            format!("expected '{{' or ':', found {}", token.kind),
        ))
    }

    /// Consume an `else`, possibly on a following line.
    fn eat_else(&mut self) -> bool {
        let mut newlines = 0;
        loop {
            let token = self.peek_nth(newlines);
            match token.kind {
                TokenKind::EndOfStatement if token.lexeme == "\n" => newlines += 1,
                TokenKind::Keyword(Keyword::Else) => break,
                _ => return false,
            }
        }
        for _ in 0..=newlines {
            self.advance();
        }
        true
    }

    fn parse_for_in_statement(&mut self) -> Result<Stmt<'ast>, ParseError> {
        let keyword = self.advance();
        let mut open = self.eat(TokenKind::Special(Punct::LeftParen)).is_some();
        if open {
            self.push_call_mode(ParserMode::Strict);
        }

        let token = self.peek();
        if token.kind != TokenKind::Identifier {
            return Err(self.throw_error(
                ParseErrorKind::IdentifierExpected,
                token.span,
                format!("expected loop variable, found {}", token.kind),
            ));
        }
        self.advance();
        let initializer = self.identifier(token);

        if open && self.eat(TokenKind::Special(Punct::RightParen)).is_some() {
            open = false;
            self.pop_call_mode();
        }
        if self.eat(TokenKind::Keyword(Keyword::In)).is_none() {
            let token = self.peek();
            return Err(self.throw_error(
                ParseErrorKind::KeywordExpected,
                token.span,
                format!("expected 'in', found {}", token.kind),
            ));
        }

        let expression = self.parse_expression()?;
        if open {
            self.expect(TokenKind::Special(Punct::RightParen))?;
            self.pop_call_mode();
        }

        let body = self.parse_block()?;
        Ok(self
            .factory
            .for_in_statement(keyword.span, initializer, expression, body))
    }

    fn parse_return_statement(&mut self) -> Result<Stmt<'ast>, ParseError> {
        let keyword = self.advance();
        let next = self.peek();
        let expression = if next.is_statement_end() || next.is_special(Punct::RightBrace) || next.is_keyword(Keyword::Else)
        {
            None
        } else {
            Some(self.parse_expression()?)
        };

        let node = self.factory.return_statement(keyword.span, expression);
        if !self.in_function() {
            self.error_node(
                &node.meta,
                ParseErrorKind::ReturnOutsideFunction,
                "'return' is only valid inside a function",
            );
        }
        Ok(Stmt::Return(node))
    }

    // ========================================================================
    // Declarations
    // ========================================================================

    fn parse_function_declaration(&mut self) -> Result<&'ast FunctionDeclaration<'ast>, ParseError> {
        let keyword = self.advance();
        let token = self.peek();
        if token.kind != TokenKind::Identifier {
            return Err(self.throw_error(
                ParseErrorKind::FunctionIdentifierExpected,
                token.span,
                format!("expected function name, found {}", token.kind),
            ));
        }
        self.advance();
        let name = self.identifier(token);
        let parameters = self.parse_parameter_list()?;
        let body = self.parse_function_body(name.name)?;
        Ok(self
            .factory
            .function_declaration(keyword.span, name, &parameters, body))
    }

    fn parse_enum_declaration(&mut self) -> Result<&'ast EnumDeclaration<'ast>, ParseError> {
        let keyword = self.advance();
        if !self.options.supports(Feature::Enum) {
            self.error(
                ParseErrorKind::NotImplemented,
                keyword.span,
                "'enum' requires language version 2022",
            );
        }

        let name = self.parse_enum_name()?;
        let (members, span) = self.parse_list_expression(Punct::LeftBrace, Punct::RightBrace, Self::parse_enum_name)?;
        let items: Vec<_> = members
            .into_iter()
            .enumerate()
            .map(|(index, ident)| self.factory.enum_item(ident, index as u32))
            .collect();
        Ok(self
            .factory
            .enum_declaration(name, &items, keyword.span.merge(span)))
    }

    fn parse_enum_name(&mut self) -> Result<&'ast Identifier<'ast>, ParseError> {
        let token = self.peek();
        if token.kind != TokenKind::Identifier || token.flags.contains(TokenFlags::VARIABLE) {
            return Err(self.throw_error(
                ParseErrorKind::IdentifierExpected,
                token.span,
                format!("expected enum name, found {}", token.kind),
            ));
        }
        self.advance();
        Ok(self.identifier(token))
    }

    fn parse_export(&mut self) -> Result<Stmt<'ast>, ParseError> {
        let keyword = self.advance();
        if !self.options.supports(Feature::Export) {
            self.error(
                ParseErrorKind::NotImplemented,
                keyword.span,
                "'export' is not enabled for this script",
            );
        }

        let token = self.peek();
        let stmt = match token.kind {
            TokenKind::Keyword(Keyword::Function) => Stmt::Function(self.parse_function_declaration()?),
            TokenKind::Keyword(Keyword::Let | Keyword::Const) => Stmt::Variable(self.parse_let_const()?),
            TokenKind::Keyword(Keyword::Enum) => Stmt::Enum(self.parse_enum_declaration()?),
            _ => {
                return Err(self.throw_error(
                    ParseErrorKind::UnexpectedToken,
                    token.span,
                    format!("only declarations can be exported, found {}", token.kind),
                ));
            }
        };

        stmt.meta().add_flags(NodeFlags::EXPORT);
        if let Stmt::Variable(var) = stmt {
            var.declaration.meta.add_flags(NodeFlags::EXPORT);
        }
        Ok(stmt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ParserOptions;
    use bumpalo::Bump;

    fn parse_ok<'ast>(source: &str, arena: &'ast Bump) -> &'ast SourceFile<'ast> {
        match Parser::parse_or_throw(source, arena, ParserOptions::default()) {
            Ok(file) => file,
            Err(errors) => panic!("{}", errors),
        }
    }

    fn parse_err(source: &str, options: ParserOptions) -> zirconium_core::ParseErrors {
        let arena = Bump::new();
        match Parser::parse_or_throw(source, &arena, options) {
            Ok(_) => panic!("expected errors for {:?}", source),
            Err(errors) => errors,
        }
    }

    fn only_expr<'ast>(file: &'ast SourceFile<'ast>) -> Expr<'ast> {
        let [Stmt::Expression(stmt)] = file.statements else {
            panic!("expected one expression statement, got {:?}", file.statements);
        };
        stmt.expression
    }

    #[test]
    fn command_call_with_bare_words() {
        let arena = Bump::new();
        let Expr::SimpleCall(call) = only_expr(parse_ok("say hello world", &arena)) else {
            panic!("expected simple call");
        };
        assert!(matches!(call.callee, Expr::Identifier(i) if i.name == "say"));
        assert_eq!(call.arguments.len(), 2);
        assert!(matches!(call.arguments[0], Expr::String(s) if s.text == "hello"));
    }

    #[test]
    fn command_options_and_negative_numbers() {
        let arena = Bump::new();
        let Expr::SimpleCall(call) = only_expr(parse_ok("kick --reason spam --silent -5", &arena)) else {
            panic!("expected simple call");
        };
        assert_eq!(call.arguments.len(), 2);
        assert!(matches!(call.arguments[0], Expr::Option(o) if o.option.name == "reason"));
        let Expr::Option(silent) = call.arguments[1] else {
            panic!("expected option with value");
        };
        assert!(matches!(silent.expression, Expr::Unary(u) if u.op == UnaryOp::Neg));
    }

    #[test]
    fn trailing_option_is_key() {
        let arena = Bump::new();
        let Expr::SimpleCall(call) = only_expr(parse_ok("ban player --force", &arena)) else {
            panic!("expected simple call");
        };
        assert!(matches!(call.arguments[1], Expr::OptionKey(k) if k.name == "force"));
    }

    #[test]
    fn adjacent_paren_is_strict_call() {
        let arena = Bump::new();
        let e = only_expr(parse_ok("print(1, 2)", &arena));
        assert!(matches!(e, Expr::Call(c) if c.arguments.len() == 2));

        let arena = Bump::new();
        let e = only_expr(parse_ok("print (1 + 2)", &arena));
        let Expr::SimpleCall(call) = e else {
            panic!("expected simple call");
        };
        assert!(matches!(call.arguments[0], Expr::Parenthesized(_)));
    }

    #[test]
    fn nested_strict_call_in_command() {
        let arena = Bump::new();
        let Expr::SimpleCall(call) = only_expr(parse_ok("print add(1, 2) $x", &arena)) else {
            panic!("expected simple call");
        };
        assert!(matches!(call.arguments[0], Expr::Call(_)));
        assert!(matches!(call.arguments[1], Expr::Identifier(i) if i.name == "x"));
    }

    #[test]
    fn bare_word_followed_by_operator_is_expression() {
        let arena = Bump::new();
        let e = only_expr(parse_ok("$x + 1", &arena));
        assert!(matches!(e, Expr::Binary(_)));

        let arena = Bump::new();
        let e = only_expr(parse_ok("count - 1", &arena));
        assert!(matches!(e, Expr::Binary(b) if b.op == BinaryOp::Sub));
    }

    #[test]
    fn variable_alone_is_expression() {
        let arena = Bump::new();
        let e = only_expr(parse_ok("$x", &arena));
        assert!(matches!(e, Expr::Identifier(_)));
    }

    #[test]
    fn bare_and_prefixed_assignment() {
        let arena = Bump::new();
        let file = parse_ok("x = 1\n$y = (2 + 3)", &arena);
        let Stmt::Variable(first) = file.statements[0] else {
            panic!("expected variable statement");
        };
        assert_eq!(first.declaration.name.name, "x");
        let Stmt::Variable(second) = file.statements[1] else {
            panic!("expected variable statement");
        };
        assert!(matches!(second.declaration.initializer, Expr::Binary(_)));
    }

    #[test]
    fn let_and_const_flags() {
        let arena = Bump::new();
        let file = parse_ok("let a = 1; const b = 2", &arena);
        let Stmt::Variable(a) = file.statements[0] else {
            panic!("expected variable statement");
        };
        let Stmt::Variable(b) = file.statements[1] else {
            panic!("expected variable statement");
        };
        assert!(a.meta.flags().contains(NodeFlags::LET));
        assert!(b.is_const());
    }

    #[test]
    fn block_assignment_rejected() {
        let errors = parse_err("x = { print 1 }", ParserOptions::default());
        assert_eq!(errors.first().unwrap().kind, ParseErrorKind::InvalidVariableAssignment);
    }

    #[test]
    fn object_assignment_accepted() {
        let arena = Bump::new();
        let file = parse_ok("x = {}\ny = {\n  a: 1\n}", &arena);
        assert_eq!(file.statements.len(), 2);
    }

    #[test]
    fn reserved_word_as_variable() {
        let errors = parse_err("let if = 1", ParserOptions::default());
        assert_eq!(errors.first().unwrap().kind, ParseErrorKind::ReservedKeyword);
    }

    #[test]
    fn let_requires_2021() {
        let options = ParserOptions {
            version: 2020,
            ..Default::default()
        };
        let errors = parse_err("let a = 1", options);
        assert!(errors.contains(ParseErrorKind::NotImplemented));
    }

    #[test]
    fn if_else_chain_and_inline() {
        let arena = Bump::new();
        let source = "if $a {\n  print a\n}\nelse if $b: print b\nelse {\n  print c\n}";
        let file = parse_ok(source, &arena);
        assert_eq!(file.statements.len(), 1);
        let Stmt::If(outer) = file.statements[0] else {
            panic!("expected if");
        };
        let Some(Stmt::If(inner)) = outer.else_statement else {
            panic!("expected else-if");
        };
        assert!(matches!(inner.then_statement, Stmt::Expression(_)));
        assert!(matches!(inner.else_statement, Some(Stmt::Block(_))));
    }

    #[test]
    fn if_requires_body() {
        let errors = parse_err("if $a print", ParserOptions::default());
        assert_eq!(errors.first().unwrap().kind, ParseErrorKind::ExpectedBlock);
    }

    #[test]
    fn for_in_forms() {
        let arena = Bump::new();
        let file = parse_ok("for (x in $items) {\n}\nfor y in [1, 2] {}\nfor (z) in (range(1, 3)) {}", &arena);
        assert_eq!(file.statements.len(), 3);
        for stmt in file.statements {
            assert!(matches!(stmt, Stmt::ForIn(_)));
        }
    }

    #[test]
    fn for_requires_in() {
        let errors = parse_err("for x of $items {}", ParserOptions::default());
        assert_eq!(errors.first().unwrap().kind, ParseErrorKind::KeywordExpected);
    }

    #[test]
    fn function_requires_name() {
        let errors = parse_err("function {}", ParserOptions::default());
        assert_eq!(errors.first().unwrap().kind, ParseErrorKind::FunctionIdentifierExpected);
    }

    #[test]
    fn return_outside_function() {
        let errors = parse_err("return 1", ParserOptions::default());
        assert_eq!(errors.first().unwrap().kind, ParseErrorKind::ReturnOutsideFunction);
        assert!(errors.first().unwrap().node.is_some());
    }

    #[test]
    fn enum_items_numbered() {
        let arena = Bump::new();
        let file = parse_ok("enum Color { Red, Green\n Blue }", &arena);
        let Stmt::Enum(e) = file.statements[0] else {
            panic!("expected enum");
        };
        let indices: Vec<u32> = e.items.iter().map(|i| i.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        assert_eq!(e.items[2].name.name, "Blue");
    }

    #[test]
    fn export_requires_option() {
        let errors = parse_err("export function f() {}", ParserOptions::default());
        assert!(errors.contains(ParseErrorKind::NotImplemented));

        let arena = Bump::new();
        let options = ParserOptions {
            enable_export: true,
            ..Default::default()
        };
        let file = Parser::parse_or_throw("export const x = 1", &arena, options).unwrap();
        assert!(file.statements[0].meta().flags().contains(NodeFlags::EXPORT));
    }

    #[test]
    fn strict_mode_rejects_commands() {
        let options = ParserOptions {
            mode: ParserMode::Strict,
            ..Default::default()
        };
        let errors = parse_err("print hello", options);
        assert_eq!(errors.first().unwrap().kind, ParseErrorKind::UnexpectedToken);

        let arena = Bump::new();
        let file = Parser::parse_or_throw("print(\"hello\")", &arena, options).unwrap();
        assert!(matches!(only_expr(file), Expr::Call(_)));
    }

    #[test]
    fn bang_call_is_experimental() {
        let arena = Bump::new();
        let options = ParserOptions {
            experimental_features: true,
            ..Default::default()
        };
        let file = Parser::parse_or_throw("reload!", &arena, options).unwrap();
        assert!(matches!(only_expr(file), Expr::Call(c) if c.arguments.is_empty()));

        let errors = parse_err("reload!", ParserOptions::default());
        assert_eq!(errors.first().unwrap().kind, ParseErrorKind::UnexpectedToken);
    }

    #[test]
    fn unterminated_string_reported() {
        let errors = parse_err("print \"oops", ParserOptions::default());
        assert_eq!(errors.first().unwrap().kind, ParseErrorKind::UnterminatedStringLiteral);
    }

    #[test]
    fn invalid_tokens_accumulate() {
        let errors = parse_err("print @ ~", ParserOptions::default());
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn commands_inside_function_expression_argument() {
        let arena = Bump::new();
        let file = parse_ok("on(\"join\", function(p) {\n  greet $p\n})", &arena);
        let Expr::Call(call) = only_expr(file) else {
            panic!("expected call");
        };
        let Expr::Function(f) = call.arguments[1] else {
            panic!("expected function argument");
        };
        let [Stmt::Expression(inner)] = f.body.statements else {
            panic!("expected one statement");
        };
        assert!(matches!(inner.expression, Expr::SimpleCall(_)));
    }
}
