mod expr;
use std::{
    cell::{Cell, RefCell},
    iter::Peekable,
};

pub use expr::{BinaryOp, Expr};

use cursor::Offset;
use errors::{EvalError, Result};
use scanner::{Token, TokenData};

use TokenData::*;

/// Default bound on nested groups and unary minuses.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Tokenizes `source` (whitelist gate included) and parses it with the
/// default nesting limit.
pub fn parse(source: &str) -> Result<Expr> {
    Parser::new(scanner::scan(source)?).parse()
}

/// Recursive descent parser over
///
/// ```text
/// expression := term (('+' | '-') term)*
/// term       := factor (('*' | '/') factor)*
/// factor     := '-' factor | primary
/// primary    := NUMBER | '(' expression ')'
/// ```
#[derive(Debug)]
pub struct Parser<'a> {
    tokens: RefCell<Peekable<std::vec::IntoIter<Token<'a>>>>,
    end: Offset,
    max_depth: usize,
    depth: Cell<usize>,
    // Offsets of the `(` that are still waiting for their `)`
    open_parens: RefCell<Vec<Offset>>,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: Vec<Token<'a>>) -> Self {
        let end = tokens
            .first()
            .map(|t| Offset(t.range.source().chars().count()))
            .unwrap_or_default();

        Self {
            tokens: RefCell::new(tokens.into_iter().peekable()),
            end,
            max_depth: DEFAULT_MAX_DEPTH,
            depth: Cell::new(0),
            open_parens: RefCell::new(Vec::new()),
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn parse(self) -> Result<Expr> {
        if self.is_at_end() {
            return Err(EvalError::EmptyExpression);
        }

        let expr = self.expression()?;

        match self.advance() {
            None => {
                log::debug!("Parsed expression: {expr}");
                Ok(expr)
            }
            Some(token) if token.data == RightParen => {
                Err(EvalError::UnbalancedParentheses { offset: token.offset() })
            }
            Some(token) => Err(unexpected(&token)),
        }
    }

    fn expression(&self) -> Result<Expr> {
        self.term()
    }

    fn term(&self) -> Result<Expr> {
        let mut expr = self.factor()?;

        while let Some(Plus) | Some(Minus) = self.peek() {
            let op = self.binary_op()?;
            let right = self.factor()?;
            expr = Expr::binary(op, expr, right);
        }
        Ok(expr)
    }

    fn factor(&self) -> Result<Expr> {
        let mut expr = self.unary()?;

        while let Some(Star) | Some(Slash) = self.peek() {
            let op = self.binary_op()?;
            let right = self.unary()?;
            expr = Expr::binary(op, expr, right);
        }
        Ok(expr)
    }

    fn unary(&self) -> Result<Expr> {
        if let Some(Minus) = self.peek() {
            let operator = self.advance().ok_or_else(|| self.unexpected_end())?;
            let right = self.nested(operator.offset(), || self.unary())?;
            return Ok(Expr::negate(right));
        }
        self.primary()
    }

    fn primary(&self) -> Result<Expr> {
        let Some(token) = self.advance() else {
            return Err(self.unexpected_end());
        };

        match token.data {
            Number(n) => Ok(Expr::Literal(n)),
            LeftParen => self.nested(token.offset(), || self.group(&token)),
            RightParen if self.open_parens.borrow().is_empty() => {
                Err(EvalError::UnbalancedParentheses { offset: token.offset() })
            }
            _ => Err(unexpected(&token)),
        }
    }

    fn group(&self, left_paren: &Token<'a>) -> Result<Expr> {
        self.open_parens.borrow_mut().push(left_paren.offset());

        let expr = self.expression()?;

        match self.advance() {
            Some(token) if token.data == RightParen => {
                self.open_parens.borrow_mut().pop();
                Ok(expr)
            }
            Some(token) => Err(unexpected(&token)),
            None => Err(EvalError::UnbalancedParentheses { offset: left_paren.offset() }),
        }
    }

    fn binary_op(&self) -> Result<BinaryOp> {
        let token = self.advance().ok_or_else(|| self.unexpected_end())?;
        BinaryOp::from_token(&token.data).ok_or_else(|| unexpected(&token))
    }

    fn nested(&self, offset: Offset, parse: impl FnOnce() -> Result<Expr>) -> Result<Expr> {
        let depth = self.depth.get() + 1;
        if depth > self.max_depth {
            return Err(EvalError::NestingTooDeep { max_depth: self.max_depth, offset });
        }

        self.depth.set(depth);
        let result = parse();
        self.depth.set(depth - 1);
        result
    }

    /// Running out of tokens inside a group means the group was never closed.
    fn unexpected_end(&self) -> EvalError {
        match self.open_parens.borrow().last() {
            Some(&offset) => EvalError::UnbalancedParentheses { offset },
            None => EvalError::UnexpectedToken { token: "end of input".to_string(), offset: self.end },
        }
    }
}

fn unexpected(token: &Token) -> EvalError {
    EvalError::UnexpectedToken { token: format!("'{}'", token.lexeme()), offset: token.offset() }
}

// Helpers
impl<'a> Parser<'a> {
    fn peek(&self) -> Option<TokenData> {
        self.tokens.borrow_mut().peek().map(|t| t.data)
    }

    fn advance(&self) -> Option<Token<'a>> {
        self.tokens.borrow_mut().next()
    }

    fn is_at_end(&self) -> bool {
        self.peek().is_none()
    }
}
