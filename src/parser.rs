//! Recursive-descent grammar driver.
//!
//! Consumes scanner tokens and turns each statement into calls against a
//! [`ParseContext`]. Expressions are evaluated bottom-up as they are
//! recognised; the first error aborts the parse.

use indexmap::IndexMap;

use crate::ast::{Expr, Literal};
use crate::context::ParseContext;
use crate::error::ConfError;
use crate::scanner::{scan, Spanned, Token};

struct Parser<'c> {
    tokens: Vec<Spanned>,
    pos: usize,
    ctxt: &'c mut ParseContext,
}

/// Parse `input` into `ctxt`. On failure the error is also left in the
/// context's error slot.
pub fn parse(input: &str, ctxt: &mut ParseContext) -> Result<(), ConfError> {
    ctxt.clear_error();
    let tokens = match scan(input) {
        Ok(tokens) => tokens,
        Err(err) => return Err(ctxt.fail(err)),
    };
    let mut parser = Parser {
        tokens,
        pos: 0,
        ctxt,
    };
    while parser.pos < parser.tokens.len() {
        if let Err(err) = parser.parse_statement() {
            return Err(parser.ctxt.fail(err));
        }
    }
    Ok(())
}

impl<'c> Parser<'c> {
    // ── Helpers ──────────────────────────────────────────────────────

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|t| &t.token)
    }

    /// Consume the next token, keeping the context's line current.
    fn next(&mut self) -> Option<Token> {
        let spanned = self.tokens.get(self.pos)?;
        self.ctxt.set_line(spanned.line);
        self.pos += 1;
        Some(spanned.token.clone())
    }

    fn line(&self) -> usize {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .map(|t| t.line)
            .unwrap_or(self.ctxt.line())
    }

    fn is_punct(&self, ch: char) -> bool {
        self.peek() == Some(&Token::Punct(ch))
    }

    fn eat_punct(&mut self, ch: char) -> bool {
        if self.is_punct(ch) {
            self.next();
            true
        } else {
            false
        }
    }

    fn expect_punct(&mut self, ch: char) -> Result<(), ConfError> {
        if self.eat_punct(ch) {
            Ok(())
        } else {
            Err(self.unexpected(&format!("'{}'", ch)))
        }
    }

    fn expect_keyword(&mut self) -> Result<String, ConfError> {
        if let Some(Token::Keyword(kw)) = self.peek() {
            let kw = kw.clone();
            self.next();
            Ok(kw)
        } else {
            Err(self.unexpected("a name"))
        }
    }

    fn unexpected(&self, expected: &str) -> ConfError {
        let found = match self.peek() {
            Some(Token::Number(n)) => format!("number {}", n),
            Some(Token::Str(s)) => format!("string \"{}\"", s),
            Some(Token::Keyword(kw)) => format!("'{}'", kw),
            Some(Token::Punct(ch)) => format!("'{}'", ch),
            None => "end of input".to_string(),
        };
        ConfError::syntax(format!("Expected {}, found {}", expected, found), self.line())
    }

    // ── Statements ──────────────────────────────────────────────────

    fn parse_statement(&mut self) -> Result<(), ConfError> {
        let label = self.expect_keyword()?;

        match self.peek() {
            Some(Token::Punct('=')) => {
                self.next();
                let expr = self.parse_expr()?;
                self.expect_punct(';')?;
                self.ctxt.assign(&label, expr);
                Ok(())
            }
            Some(Token::Punct(':')) => {
                self.next();
                let etype = self.expect_keyword()?;
                if self.is_punct('=') {
                    self.parse_line_body(&label, &etype)
                } else {
                    self.parse_element_body(&label, &etype)
                }
            }
            Some(Token::Punct('(')) => {
                self.next();
                let arg = self.parse_expr()?;
                self.expect_punct(')')?;
                self.expect_punct(';')?;
                self.ctxt.call(&label, &arg)
            }
            Some(Token::Punct(';')) => {
                self.next();
                self.ctxt.command(&label)
            }
            _ => Err(self.unexpected("'=', ':', '(' or ';'")),
        }
    }

    /// `[, key = expr ...] ;` after `label: type`
    fn parse_element_body(&mut self, label: &str, etype: &str) -> Result<(), ConfError> {
        let mut properties = IndexMap::new();
        while self.eat_punct(',') {
            let key = self.expect_keyword()?;
            self.expect_punct('=')?;
            let value = self.parse_expr()?;
            properties.insert(key, value);
        }
        self.expect_punct(';')?;
        self.ctxt.add_element(label, etype, properties)
    }

    /// `= ( expr, ... ) ;` after `label: type`
    fn parse_line_body(&mut self, label: &str, etype: &str) -> Result<(), ConfError> {
        self.expect_punct('=')?;
        self.expect_punct('(')?;
        let mut names = Vec::new();
        if !self.is_punct(')') {
            loop {
                let entry = self.parse_expr()?;
                self.ctxt.append_line_entry(&mut names, entry)?;
                if !self.eat_punct(',') {
                    break;
                }
            }
        }
        self.expect_punct(')')?;
        self.expect_punct(';')?;
        self.ctxt.add_line(label, etype, names)
    }

    // ── Expressions ─────────────────────────────────────────────────

    fn parse_expr(&mut self) -> Result<Expr, ConfError> {
        let mut lhs = self.parse_term()?;
        loop {
            let op = match self.peek() {
                Some(Token::Punct(ch @ ('+' | '-'))) => *ch,
                _ => return Ok(lhs),
            };
            self.next();
            let rhs = self.parse_term()?;
            lhs = self.ctxt.apply(&op.to_string(), vec![lhs, rhs])?;
        }
    }

    fn parse_term(&mut self) -> Result<Expr, ConfError> {
        let mut lhs = self.parse_unary()?;
        loop {
            let op = match self.peek() {
                Some(Token::Punct(ch @ ('*' | '/'))) => *ch,
                _ => return Ok(lhs),
            };
            self.next();
            let rhs = self.parse_unary()?;
            lhs = self.ctxt.apply(&op.to_string(), vec![lhs, rhs])?;
        }
    }

    fn parse_unary(&mut self) -> Result<Expr, ConfError> {
        if self.eat_punct('-') {
            let operand = self.parse_unary()?;
            return self.ctxt.apply("-", vec![operand]);
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Expr, ConfError> {
        match self.peek() {
            Some(Token::Number(n)) => {
                let n = *n;
                self.next();
                self.ctxt.make_literal(Literal::Number(n))
            }
            Some(Token::Str(s)) => {
                let s = s.clone();
                self.next();
                self.ctxt.make_literal(Literal::String(s))
            }
            Some(Token::Punct('[')) => self.parse_vector(),
            Some(Token::Punct('(')) => {
                self.next();
                let inner = self.parse_expr()?;
                self.expect_punct(')')?;
                Ok(inner)
            }
            Some(Token::Keyword(_)) => {
                let name = self.expect_keyword()?;
                if self.eat_punct('(') {
                    let arg = self.parse_expr()?;
                    self.expect_punct(')')?;
                    self.ctxt.apply(&name, vec![arg])
                } else {
                    self.ctxt.make_literal(Literal::Var(name))
                }
            }
            _ => Err(self.unexpected("an expression")),
        }
    }

    fn parse_vector(&mut self) -> Result<Expr, ConfError> {
        self.expect_punct('[')?;
        let mut values = Vec::new();
        if !self.is_punct(']') {
            loop {
                let entry = self.parse_expr()?;
                self.ctxt.append_vector(&mut values, entry)?;
                if !self.eat_punct(',') {
                    break;
                }
            }
        }
        self.expect_punct(']')?;
        self.ctxt.make_literal(Literal::Vector(values))
    }
}
