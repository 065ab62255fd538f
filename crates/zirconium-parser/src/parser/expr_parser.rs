//! Expression parsing.
//!
//! Binary operators use precedence climbing (`mutate_expression`). Command
//! arguments have their own entry point because bare words and `--options`
//! mean something different there than in strict expressions.

use zirconium_core::{ParseError, ParseErrorKind, Span};

use super::{Parser, ParserMode};
use crate::ast::*;
use crate::lexer::{Keyword, Operator, Punct, Token, TokenFlags, TokenKind, TokenPayload};
use crate::lexer::{is_right_associative, precedence};

impl<'src, 'ast> Parser<'src, 'ast> {
    /// Parse a full expression, including assignment.
    pub fn parse_expression(&mut self) -> Result<Expr<'ast>, ParseError> {
        let left = self.parse_unary()?;
        self.mutate_expression(left, 1)
    }

    /// Fold binary operators binding at least as tightly as `min_prec` onto
    /// an already parsed left operand.
    pub(super) fn mutate_expression(&mut self, mut left: Expr<'ast>, min_prec: u8) -> Result<Expr<'ast>, ParseError> {
        loop {
            let token = self.peek();
            let TokenKind::Operator(op) = token.kind else {
                break;
            };
            let (Some(prec), Some(binary_op)) = (precedence(op), BinaryOp::from_operator(op)) else {
                break;
            };
            if prec < min_prec {
                break;
            }
            if binary_op == BinaryOp::Assign && !left.is_assignment_target() {
                return Err(self.throw_node_error(
                    left.meta(),
                    ParseErrorKind::InvalidVariableAssignment,
                    "only a name or property can be assigned to",
                ));
            }

            self.advance();
            self.skip_statement_ends();
            let next_min = if is_right_associative(op) { prec } else { prec + 1 };
            let operand = self.parse_unary()?;
            let right = self.mutate_expression(operand, next_min)?;
            left = self.factory.binary(left, binary_op, right);
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr<'ast>, ParseError> {
        let token = self.peek();
        self.nested(token.span, |p| {
            if let TokenKind::Operator(op) = token.kind {
                if let Some(unary_op) = UnaryOp::from_operator(op) {
                    p.advance();
                    let operand = p.parse_unary()?;
                    return Ok(p.factory.unary(unary_op, token.span, operand));
                }
            }
            let primary = p.parse_primary()?;
            p.parse_postfix(primary)
        })
    }

    // ========================================================================
    // Primary expressions
    // ========================================================================

    pub(super) fn parse_primary(&mut self) -> Result<Expr<'ast>, ParseError> {
        let token = self.peek();
        match token.kind {
            TokenKind::Number => {
                self.advance();
                self.number_literal(token)
            }
            TokenKind::String => {
                self.advance();
                Ok(Expr::String(self.string_literal(token)))
            }
            TokenKind::InterpolatedString => {
                self.advance();
                Ok(self.interpolated_string(token))
            }
            TokenKind::Boolean => {
                self.advance();
                Ok(Expr::Boolean(self.factory.boolean_literal(token.lexeme == "true", token.span)))
            }
            TokenKind::Identifier => {
                self.advance();
                Ok(Expr::Identifier(self.identifier(token)))
            }
            TokenKind::PropertyAccess => {
                self.advance();
                self.property_chain(token)
            }
            TokenKind::Option => {
                self.advance();
                Ok(Expr::OptionKey(self.factory.option_key(token.value, token.span)))
            }
            TokenKind::Special(Punct::LeftParen) => self.parse_parenthesized(),
            TokenKind::Special(Punct::LeftBracket) => self.parse_array_literal(),
            TokenKind::Special(Punct::LeftBrace) => self.parse_object_literal(),
            TokenKind::Keyword(Keyword::Function) => self.parse_function_expression(),
            TokenKind::Error => {
                self.advance();
                let node = self.factory.invalid(token.lexeme, token.span);
                self.error_node(
                    &node.meta,
                    ParseErrorKind::UnexpectedToken,
                    format!("invalid token '{}'", token.lexeme),
                );
                Ok(Expr::Invalid(node))
            }
            _ => Err(self.unexpected(token)),
        }
    }

    fn number_literal(&mut self, token: Token<'ast>) -> Result<Expr<'ast>, ParseError> {
        match token.lexeme.parse::<f64>() {
            Ok(value) => Ok(Expr::Number(self.factory.number_literal(value, token.lexeme, token.span))),
            Err(_) => Err(self.throw_error(
                ParseErrorKind::UnexpectedToken,
                token.span,
                format!("invalid number '{}'", token.lexeme),
            )),
        }
    }

    pub(super) fn string_literal(&mut self, token: Token<'ast>) -> &'ast StringLiteral<'ast> {
        let node = self.factory.string_literal(token.value, token.span);
        self.check_terminated(token, &node.meta);
        node
    }

    fn check_terminated(&mut self, token: Token<'ast>, meta: &NodeMeta) {
        if token.flags.contains(TokenFlags::UNTERMINATED) {
            meta.add_flags(NodeFlags::UNTERMINATED);
            self.error_node(meta, ParseErrorKind::UnterminatedStringLiteral, "missing closing quote");
        }
    }

    fn interpolated_string(&mut self, token: Token<'ast>) -> Expr<'ast> {
        let TokenPayload::Interpolation { values, variables } = token.payload else {
            return Expr::String(self.string_literal(token));
        };

        let mut parts = Vec::with_capacity(values.len() + variables.len());
        for (i, text) in values.iter().enumerate() {
            parts.push(InterpolatedPart::Text(self.factory.string_literal(text, token.span)));
            if let Some(name) = variables.get(i) {
                let ident = self.factory.identifier(name, token.span, NodeFlags::VARIABLE);
                parts.push(InterpolatedPart::Variable(ident));
            }
        }
        let node = self.factory.interpolated_string(&parts, token.span);
        self.check_terminated(token, &node.meta);
        Expr::Interpolated(node)
    }

    /// Build an identifier node from a name token.
    pub(super) fn identifier(&mut self, token: Token<'ast>) -> &'ast Identifier<'ast> {
        let flags = if token.flags.contains(TokenFlags::VARIABLE) {
            NodeFlags::VARIABLE
        } else {
            NodeFlags::empty()
        };
        let len = token.value.len() as u32 + u32::from(flags.contains(NodeFlags::VARIABLE));
        let span = sub_span(&token, token.span.start, token.span.start + len);
        self.factory.identifier(token.value, span, flags)
    }

    /// Expand a folded `base.seg.seg` token into nested accesses.
    pub(super) fn property_chain(&mut self, token: Token<'ast>) -> Result<Expr<'ast>, ParseError> {
        let base = Expr::Identifier(self.identifier(token));
        self.apply_segments(base, &token)
    }

    fn apply_segments(&mut self, mut expr: Expr<'ast>, token: &Token<'ast>) -> Result<Expr<'ast>, ParseError> {
        let mut cursor = expr.span().end;
        for segment in token.properties() {
            let start = cursor + 1;
            let end = start + segment.len() as u32;
            let span = sub_span(token, start, end);
            expr = self.segment_access(expr, segment, span)?;
            cursor = end;
        }
        Ok(expr)
    }

    fn segment_access(&mut self, expr: Expr<'ast>, segment: &'ast str, span: Span) -> Result<Expr<'ast>, ParseError> {
        if !segment.bytes().all(|b| b.is_ascii_digit()) {
            let name = self.factory.identifier(segment, span, NodeFlags::empty());
            return Ok(self.factory.property_access(expr, name));
        }
        match segment.parse::<u32>() {
            Ok(index) => Ok(self.factory.array_index(expr, index, span)),
            Err(_) => Err(self.throw_error(
                ParseErrorKind::InvalidPropertyAccess,
                span,
                format!("array index '{}' is out of range", segment),
            )),
        }
    }

    // ========================================================================
    // Postfix: calls, element access, member access
    // ========================================================================

    fn parse_postfix(&mut self, mut expr: Expr<'ast>) -> Result<Expr<'ast>, ParseError> {
        loop {
            let token = self.peek();
            expr = match token.kind {
                TokenKind::Special(Punct::LeftParen) if expr.is_callee() => self.parse_call(expr)?,
                TokenKind::Special(Punct::LeftBracket) => self.parse_element_access(expr)?,
                TokenKind::Special(Punct::Dot) => self.parse_dot_access(expr)?,
                _ => return Ok(expr),
            };
        }
    }

    /// Like postfix parsing, but only for tokens touching the expression.
    /// Used for command arguments, where a space separates arguments.
    fn parse_adjacent_postfix(&mut self, mut expr: Expr<'ast>) -> Result<Expr<'ast>, ParseError> {
        loop {
            let token = self.peek();
            if token.span.start != expr.span().end {
                return Ok(expr);
            }
            expr = match token.kind {
                TokenKind::Special(Punct::LeftParen) if expr.is_callee() => self.parse_call(expr)?,
                TokenKind::Special(Punct::LeftBracket) => self.parse_element_access(expr)?,
                TokenKind::Special(Punct::Dot) => self.parse_dot_access(expr)?,
                _ => return Ok(expr),
            };
        }
    }

    /// Parse `callee(args...)`.
    pub(super) fn parse_call(&mut self, callee: Expr<'ast>) -> Result<Expr<'ast>, ParseError> {
        let (arguments, span) =
            self.parse_list_expression(Punct::LeftParen, Punct::RightParen, Self::parse_expression)?;
        Ok(self.factory.call(callee, &arguments, span))
    }

    fn parse_element_access(&mut self, expr: Expr<'ast>) -> Result<Expr<'ast>, ParseError> {
        self.advance();
        self.push_call_mode(ParserMode::Strict);
        self.skip_statement_ends();
        let argument = self.parse_expression()?;
        self.skip_statement_ends();
        let close = self.expect(TokenKind::Special(Punct::RightBracket))?;
        self.pop_call_mode();
        Ok(self.factory.element_access(expr, argument, close.span))
    }

    fn parse_dot_access(&mut self, expr: Expr<'ast>) -> Result<Expr<'ast>, ParseError> {
        self.advance();
        let token = self.peek();
        match token.kind {
            TokenKind::Identifier | TokenKind::PropertyAccess if !token.flags.contains(TokenFlags::VARIABLE) => {
                self.advance();
                let name = self.identifier(token);
                let access = self.factory.property_access(expr, name);
                self.apply_segments(access, &token)
            }
            TokenKind::Number if token.lexeme.bytes().all(|b| b.is_ascii_digit()) => {
                self.advance();
                self.segment_access(expr, token.lexeme, token.span)
            }
            _ => Err(self.throw_error(
                ParseErrorKind::InvalidPropertyAccess,
                token.span,
                format!("expected property name after '.', found {}", token.kind),
            )),
        }
    }

    // ========================================================================
    // Bracketed forms
    // ========================================================================

    /// Parse a delimited, separated list of items.
    ///
    /// Items may be separated by commas, newlines or both, and newlines are
    /// allowed after the opening and before the closing delimiter. Calls
    /// inside the list are strict.
    pub(super) fn parse_list_expression<T>(
        &mut self,
        start: Punct,
        stop: Punct,
        mut item: impl FnMut(&mut Self) -> Result<T, ParseError>,
    ) -> Result<(Vec<T>, Span), ParseError> {
        let open = self.expect(TokenKind::Special(start))?;
        self.push_call_mode(ParserMode::Strict);

        let mut items = Vec::new();
        self.skip_statement_ends();
        while !self.check_special(stop) {
            items.push(item(self)?);
            let separated = self.skip_statement_ends();
            if self.eat(TokenKind::Special(Punct::Comma)).is_some() {
                self.skip_statement_ends();
                continue;
            }
            if !separated && !self.check_special(stop) {
                let token = self.peek();
                let kind = if token.kind == TokenKind::Eof {
                    ParseErrorKind::UnexpectedEof
                } else {
                    ParseErrorKind::UnexpectedToken
                };
                return Err(self.throw_error(
                    kind,
                    token.span,
                    format!("expected ',' or '{}', found {}", stop.as_str(), token.kind),
                ));
            }
        }

        let close = self.expect(TokenKind::Special(stop))?;
        self.pop_call_mode();
        Ok((items, open.span.merge(close.span)))
    }

    fn parse_parenthesized(&mut self) -> Result<Expr<'ast>, ParseError> {
        let open = self.advance();
        self.push_call_mode(ParserMode::Strict);
        self.skip_statement_ends();
        let expression = self.parse_expression()?;
        self.skip_statement_ends();
        let close = self.expect(TokenKind::Special(Punct::RightParen))?;
        self.pop_call_mode();
        Ok(self.factory.parenthesized(expression, open.span.merge(close.span)))
    }

    fn parse_array_literal(&mut self) -> Result<Expr<'ast>, ParseError> {
        let (elements, span) =
            self.parse_list_expression(Punct::LeftBracket, Punct::RightBracket, Self::parse_expression)?;
        Ok(self.factory.array_literal(&elements, span))
    }

    fn parse_object_literal(&mut self) -> Result<Expr<'ast>, ParseError> {
        let (properties, span) =
            self.parse_list_expression(Punct::LeftBrace, Punct::RightBrace, Self::parse_property_assignment)?;
        Ok(self.factory.object_literal(&properties, span))
    }

    fn parse_property_assignment(&mut self) -> Result<&'ast PropertyAssignment<'ast>, ParseError> {
        let key = self.peek();
        let name = match key.kind {
            TokenKind::Identifier if !key.flags.contains(TokenFlags::VARIABLE) => key.value,
            TokenKind::String | TokenKind::Number | TokenKind::Boolean | TokenKind::Keyword(_) => key.value,
            _ => {
                return Err(self.throw_error(
                    ParseErrorKind::IdentifierExpected,
                    key.span,
                    format!("expected property name, found {}", key.kind),
                ));
            }
        };
        self.advance();
        if key.flags.contains(TokenFlags::UNTERMINATED) {
            self.error(ParseErrorKind::UnterminatedStringLiteral, key.span, "missing closing quote");
        }

        self.expect(TokenKind::Special(Punct::Colon))?;
        self.skip_statement_ends();
        let initializer = self.parse_expression()?;
        Ok(self.factory.property_assignment(name, key.span, initializer))
    }

    // ========================================================================
    // Functions
    // ========================================================================

    fn parse_function_expression(&mut self) -> Result<Expr<'ast>, ParseError> {
        let keyword = self.advance();
        let parameters = self.parse_parameter_list()?;
        let body = self.parse_function_body("<anonymous>")?;
        Ok(self.factory.function_expression(keyword.span, &parameters, body))
    }

    pub(super) fn parse_parameter_list(&mut self) -> Result<Vec<&'ast Parameter<'ast>>, ParseError> {
        let (parameters, _) = self.parse_list_expression(Punct::LeftParen, Punct::RightParen, Self::parse_parameter)?;
        Ok(parameters)
    }

    fn parse_parameter(&mut self) -> Result<&'ast Parameter<'ast>, ParseError> {
        let token = self.peek();
        match token.kind {
            TokenKind::Identifier => {
                self.advance();
                let name = self.identifier(token);
                Ok(self.factory.parameter(name))
            }
            TokenKind::Keyword(_) | TokenKind::Boolean => Err(self.throw_error(
                ParseErrorKind::ReservedKeyword,
                token.span,
                format!("'{}' is reserved and cannot name a parameter", token.lexeme),
            )),
            _ => Err(self.throw_error(
                ParseErrorKind::IdentifierExpected,
                token.span,
                format!("expected parameter name, found {}", token.kind),
            )),
        }
    }

    /// Parse a function body with `name` pushed on the function stack.
    pub(super) fn parse_function_body(&mut self, name: &'ast str) -> Result<&'ast Block<'ast>, ParseError> {
        self.functions.push(name);
        let body = self.parse_block();
        self.functions.pop();
        body
    }

    // ========================================================================
    // Command-style calls
    // ========================================================================

    /// Whether the current token can begin a command argument.
    pub(super) fn can_start_argument(&mut self) -> bool {
        let token = self.peek();
        match token.kind {
            TokenKind::Identifier
            | TokenKind::PropertyAccess
            | TokenKind::String
            | TokenKind::InterpolatedString
            | TokenKind::Number
            | TokenKind::Boolean
            | TokenKind::Option
            | TokenKind::Error
            | TokenKind::Keyword(Keyword::Function)
            | TokenKind::Special(Punct::LeftParen | Punct::LeftBracket | Punct::LeftBrace) => true,
            TokenKind::Operator(Operator::Minus | Operator::Bang) => {
                let next = self.peek_nth(1);
                Self::adjacent(&token, &next)
                    && matches!(
                        next.kind,
                        TokenKind::Number
                            | TokenKind::Identifier
                            | TokenKind::PropertyAccess
                            | TokenKind::Special(Punct::LeftParen)
                    )
            }
            _ => false,
        }
    }

    /// Parse `callee arg arg ...` up to the end of the statement.
    pub(super) fn parse_simple_call(&mut self, callee: Expr<'ast>) -> Result<Expr<'ast>, ParseError> {
        if !matches!(
            callee,
            Expr::Identifier(_) | Expr::PropertyAccess(_) | Expr::ArrayIndex(_)
        ) {
            return Err(self.throw_node_error(
                callee.meta(),
                ParseErrorKind::UnexpectedToken,
                "only names and property accesses can be called as commands",
            ));
        }

        let mut arguments = Vec::new();
        while self.can_start_argument() {
            arguments.push(self.parse_command_argument()?);
        }
        Ok(self.factory.simple_call(callee, &arguments))
    }

    /// Parse one whitespace-separated command argument.
    fn parse_command_argument(&mut self) -> Result<Expr<'ast>, ParseError> {
        let token = self.peek();
        match token.kind {
            TokenKind::Identifier | TokenKind::PropertyAccess if !token.flags.contains(TokenFlags::VARIABLE) => {
                self.advance();
                let next = self.peek();
                if token.kind == TokenKind::Identifier
                    && next.is_special(Punct::LeftParen)
                    && Self::adjacent(&token, &next)
                {
                    let callee = Expr::Identifier(self.identifier(token));
                    let call = self.parse_call(callee)?;
                    return self.parse_adjacent_postfix(call);
                }
                Ok(Expr::String(self.factory.string_literal(token.lexeme, token.span)))
            }
            TokenKind::Identifier | TokenKind::PropertyAccess => {
                self.advance();
                let expr = self.property_chain(token)?;
                self.parse_adjacent_postfix(expr)
            }
            TokenKind::Option => {
                self.advance();
                let key = self.factory.option_key(token.value, token.span);
                if !self.check(TokenKind::Option) && self.can_start_argument() {
                    let value = self.parse_command_argument()?;
                    return Ok(self.factory.option_expression(key, value));
                }
                Ok(Expr::OptionKey(key))
            }
            TokenKind::Operator(op) => {
                let Some(unary_op) = UnaryOp::from_operator(op) else {
                    return Err(self.unexpected(token));
                };
                self.advance();
                let operand = self.parse_command_argument()?;
                Ok(self.factory.unary(unary_op, token.span, operand))
            }
            _ => {
                let expr = self.parse_primary()?;
                self.parse_adjacent_postfix(expr)
            }
        }
    }
}

/// A span covering `start..end` on the same line as `token`.
fn sub_span(token: &Token<'_>, start: u32, end: u32) -> Span {
    Span::new(start, end, token.span.line, token.span.col + (start - token.span.start))
}
