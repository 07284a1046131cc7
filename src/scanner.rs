//! Tokenizer for lattice source text.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::ConfError;

static NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[0-9]+\.?[0-9]*|\.[0-9]+)(?:[eE][+-]?[0-9]+)?")
        .expect("number pattern is valid")
});

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Number(f64),
    Str(String),
    Keyword(String),
    /// One of `= : ; ( ) [ ] , + - * /`
    Punct(char),
}

/// A token and the 1-based line it starts on.
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    pub token: Token,
    pub line: usize,
}

struct Scanner<'a> {
    input: &'a str,
    pos: usize,
    line: usize,
}

/// Split `input` into tokens, dropping whitespace and `#` comments.
pub fn scan(input: &str) -> Result<Vec<Spanned>, ConfError> {
    let mut scanner = Scanner {
        input,
        pos: 0,
        line: 1,
    };
    let mut tokens = Vec::new();
    while let Some(tok) = scanner.next_token()? {
        tokens.push(tok);
    }
    Ok(tokens)
}

impl<'a> Scanner<'a> {
    fn remaining(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn peek_char(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    fn advance(&mut self, n: usize) {
        self.pos += n;
    }

    fn skip_ws_and_comments(&mut self) {
        while let Some(ch) = self.peek_char() {
            match ch {
                '\n' => {
                    self.line += 1;
                    self.advance(1);
                }
                ' ' | '\t' | '\r' => self.advance(1),
                '#' => {
                    let end = self.remaining().find('\n').unwrap_or(self.remaining().len());
                    self.advance(end);
                }
                _ => break,
            }
        }
    }

    fn next_token(&mut self) -> Result<Option<Spanned>, ConfError> {
        self.skip_ws_and_comments();
        let line = self.line;
        let ch = match self.peek_char() {
            Some(ch) => ch,
            None => return Ok(None),
        };

        let token = match ch {
            '=' | ':' | ';' | '(' | ')' | '[' | ']' | ',' | '+' | '-' | '*' | '/' => {
                self.advance(1);
                Token::Punct(ch)
            }
            '"' => self.scan_string()?,
            c if c.is_ascii_digit() || c == '.' => self.scan_number()?,
            c if c.is_ascii_alphabetic() || c == '_' => self.scan_keyword(),
            other => {
                return Err(ConfError::syntax(
                    format!("Unexpected character '{}'", other),
                    line,
                ))
            }
        };

        Ok(Some(Spanned { token, line }))
    }

    fn scan_number(&mut self) -> Result<Token, ConfError> {
        let text = NUMBER
            .find(self.remaining())
            .map(|m| m.as_str())
            .ok_or_else(|| ConfError::syntax("Malformed number", self.line))?;
        let value: f64 = text
            .parse()
            .map_err(|_| ConfError::syntax(format!("Malformed number '{}'", text), self.line))?;
        self.advance(text.len());
        Ok(Token::Number(value))
    }

    fn scan_string(&mut self) -> Result<Token, ConfError> {
        self.advance(1);
        let rest = self.remaining();
        match rest.find(|c: char| c == '"' || c == '\n') {
            Some(end) if rest[end..].starts_with('"') => {
                let value = rest[..end].to_string();
                self.advance(end + 1);
                Ok(Token::Str(value))
            }
            _ => Err(ConfError::syntax("Unterminated string", self.line)),
        }
    }

    fn scan_keyword(&mut self) -> Token {
        let rest = self.remaining();
        let end = rest
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .unwrap_or(rest.len());
        self.advance(end);
        Token::Keyword(rest[..end].to_string())
    }
}
