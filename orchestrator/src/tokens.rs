use sqlparser::{
    dialect::GenericDialect,
    tokenizer::{Token, Tokenizer},
};

use crate::{OrchestratorError, Result};

/// A whitespace-skipping cursor over the tokens of one piece of SQL text.
pub(crate) struct Tokens {
    tokens: Vec<Token>,
    pos: usize,
}

impl Tokens {
    pub fn new(sql: &str) -> Result<Self> {
        let tokens = Tokenizer::new(&GenericDialect {}, sql)
            .tokenize()
            .map_err(|e| OrchestratorError::Parse(e.to_string()))?;

        Ok(Self { tokens, pos: 0 })
    }

    pub fn into_inner(self) -> Vec<Token> {
        self.tokens
    }

    fn next_index(&self) -> Option<usize> {
        (self.pos..self.tokens.len())
            .find(|&i| !matches!(self.tokens[i], Token::Whitespace(_)))
            .filter(|&i| self.tokens[i] != Token::EOF)
    }

    pub fn peek(&self) -> Option<&Token> {
        self.next_index().map(|i| &self.tokens[i])
    }

    pub fn next(&mut self) -> Option<Token> {
        let i = self.next_index()?;
        self.pos = i + 1;
        Some(self.tokens[i].clone())
    }

    pub fn eat(&mut self, token: &Token) -> bool {
        if self.peek() == Some(token) {
            self.next();
            return true;
        }

        false
    }

    pub fn expect(&mut self, token: Token) -> Result<()> {
        match self.next() {
            Some(got) if got == token => Ok(()),
            got => Err(unexpected(&token.to_string(), got)),
        }
    }

    pub fn peek_keyword(&self, keyword: &str) -> bool {
        self.peek().is_some_and(|t| is_keyword(t, keyword))
    }

    pub fn eat_keyword(&mut self, keyword: &str) -> bool {
        if self.peek_keyword(keyword) {
            self.next();
            return true;
        }

        false
    }

    pub fn expect_keyword(&mut self, keyword: &str) -> Result<()> {
        match self.next() {
            Some(t) if is_keyword(&t, keyword) => Ok(()),
            got => Err(unexpected(keyword, got)),
        }
    }

    /// Reads an identifier, lower-casing it unless it was double quoted.
    pub fn ident(&mut self, what: &str) -> Result<String> {
        match self.next() {
            Some(Token::Word(w)) if w.quote_style.is_some() => Ok(w.value),
            Some(Token::Word(w)) => Ok(w.value.to_lowercase()),
            got => Err(unexpected(what, got)),
        }
    }

    /// Reads a parenthesized, comma separated, non empty identifier list.
    pub fn ident_list(&mut self, what: &str) -> Result<Vec<String>> {
        self.expect(Token::LParen)?;

        if self.peek() == Some(&Token::RParen) {
            return Err(OrchestratorError::Parse(format!("{what} list can't be empty")));
        }

        let mut idents = vec![self.ident(what)?];
        while self.eat(&Token::Comma) {
            idents.push(self.ident(what)?);
        }

        self.expect(Token::RParen)?;
        Ok(idents)
    }

    /// Consumes the raw text up to the first `keyword` outside any parentheses, a `;` or the end.
    pub fn raw_until_keyword(&mut self, keyword: &str) -> Result<String> {
        let mut depth = 0usize;
        let mut text = String::new();

        while let Some(token) = self.tokens.get(self.pos) {
            match token {
                Token::EOF | Token::SemiColon if depth == 0 => break,
                t if depth == 0 && is_keyword(t, keyword) => break,
                Token::LParen => depth += 1,
                Token::RParen => {
                    depth = depth
                        .checked_sub(1)
                        .ok_or_else(|| OrchestratorError::Parse("unbalanced ')'".into()))?;
                }
                _ => {}
            }

            text.push_str(&token.to_string());
            self.pos += 1;
        }

        let text = text.trim();
        if text.is_empty() {
            return Err(OrchestratorError::Parse(format!(
                "expected a query before {keyword}"
            )));
        }

        Ok(text.to_string())
    }

    pub fn unsigned(&mut self, what: &str) -> Result<u64> {
        match self.next() {
            Some(Token::Number(n, _)) => n
                .parse()
                .map_err(|_| OrchestratorError::Parse(format!("{what} must be an integer, got {n}"))),
            got => Err(unexpected(what, got)),
        }
    }

    /// Accepts an optional trailing `;` and requires nothing else after it.
    pub fn finish(&mut self) -> Result<()> {
        self.eat(&Token::SemiColon);
        match self.next() {
            None => Ok(()),
            got => Err(unexpected("end of statement", got)),
        }
    }
}

fn is_keyword(token: &Token, keyword: &str) -> bool {
    matches!(token, Token::Word(w) if w.quote_style.is_none() && w.value.eq_ignore_ascii_case(keyword))
}

fn unexpected(expected: &str, got: Option<Token>) -> OrchestratorError {
    match got {
        Some(t) => OrchestratorError::Parse(format!("expected {expected}, found {t}")),
        None => OrchestratorError::Parse(format!("expected {expected}, found end of statement")),
    }
}
