use cursor::{Cursor, SourceRange};
use errors::{EvalError, Result};
use itertools::Itertools;

pub mod token;
mod whitelist;

pub use token::{Token, TokenData, TokenType};
pub use whitelist::{check_whitelist, is_allowed};

use TokenData::*;

/// Runs the whitelist gate over `source` and tokenizes it.
pub fn scan(source: &str) -> Result<Vec<Token<'_>>> {
    check_whitelist(source)?;
    Scanner::new(source).scan_tokens()
}

pub struct Scanner<'a> {
    cursor: Cursor<'a>,
}

impl<'a> Scanner<'a> {
    pub fn new(source: &'a str) -> Self {
        Self { cursor: Cursor::new(source) }
    }

    pub fn scan_tokens(mut self) -> Result<Vec<Token<'a>>> {
        let mut tokens = Vec::new();
        while let Some(token) = self.scan_token()? {
            tokens.push(token);
        }

        log::trace!("Scanned {} tokens: {}", tokens.len(), tokens.iter().join(" "));
        Ok(tokens)
    }

    fn scan_token(&mut self) -> Result<Option<Token<'a>>> {
        self.cursor.advance_while(char::is_whitespace);

        let start = self.cursor.clone();
        let Some(c) = self.cursor.next() else {
            return Ok(None);
        };

        let data = match c {
            '(' => LeftParen,
            ')' => RightParen,
            '-' => Minus,
            '+' => Plus,
            '/' => Slash,
            '*' => Star,

            d if is_numeral_char(d) => return self.number(start, d).map(Some),

            character => {
                return Err(EvalError::InvalidCharacter { character, offset: start.offset() })
            }
        };

        Ok(Some(self.make_token(data, start)))
    }

    fn make_token(&self, data: TokenData, start: Cursor<'a>) -> Token<'a> {
        Token::new(data, (start, self.cursor.clone()))
    }

    /// Whitespace is stripped, not a separator: `1 2` is the numeral `12` and
    /// `1. 5` is `1.5`. The token's range still covers the raw input.
    fn number(&mut self, start: Cursor<'a>, first: char) -> Result<Token<'a>> {
        // Swallow the whole run so that `1.2.3` is reported as one numeral
        let mut numeral = String::from(first);
        loop {
            let mut lookahead = self.cursor.clone();
            lookahead.advance_while(char::is_whitespace);
            match lookahead.next() {
                Some(c) if is_numeral_char(c) => {
                    numeral.push(c);
                    self.cursor = lookahead;
                }
                _ => break,
            }
        }

        let range = SourceRange::new(start, self.cursor.clone());

        let malformed =
            || EvalError::MalformedNumber { lexeme: numeral.clone(), offset: range.offset() };

        if !is_well_formed_number(&numeral) {
            return Err(malformed());
        }
        let value = numeral.parse::<f64>().map_err(|_| malformed())?;

        Ok(Token::new(Number(value), range))
    }
}

fn is_numeral_char(c: char) -> bool {
    c.is_ascii_digit() || c == '.'
}

/// `[0-9]+(\.[0-9]+)?`
fn is_well_formed_number(lexeme: &str) -> bool {
    let digits = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit());
    match lexeme.split_once('.') {
        Some((integral, fractional)) => digits(integral) && digits(fractional),
        None => digits(lexeme),
    }
}
