use cursor::Offset;

/// Everything that can go wrong while evaluating an expression.
///
/// All variants are terminal: each one is a deterministic function of the
/// input, so retrying the same input yields the same error.
#[derive(thiserror::Error, Clone, Debug, PartialEq)]
pub enum EvalError {
    #[error("Invalid character '{character}' at position {offset}. Only numbers and basic operators (+, -, *, /, parentheses) are allowed.")]
    InvalidCharacter { character: char, offset: Offset },
    #[error("Malformed number '{lexeme}' at position {offset}.")]
    MalformedNumber { lexeme: String, offset: Offset },
    #[error("Unexpected {token} at position {offset}.")]
    UnexpectedToken { token: String, offset: Offset },
    #[error("Unbalanced parentheses at position {offset}.")]
    UnbalancedParentheses { offset: Offset },
    #[error("Empty expression.")]
    EmptyExpression,
    #[error("Division by zero.")]
    DivisionByZero,
    #[error("Result must be a finite number.")]
    NonFiniteResult,
    #[error("Expression is too long ({len} characters, at most {max} allowed).")]
    InputTooLong { len: usize, max: usize },
    #[error("Expression nested too deeply at position {offset} (at most {max_depth} levels allowed).")]
    NestingTooDeep { max_depth: usize, offset: Offset },
}

impl EvalError {
    /// Position in the raw input the error points at, if it points anywhere.
    pub fn offset(&self) -> Option<Offset> {
        use EvalError::*;
        match self {
            InvalidCharacter { offset, .. }
            | MalformedNumber { offset, .. }
            | UnexpectedToken { offset, .. }
            | UnbalancedParentheses { offset }
            | NestingTooDeep { offset, .. } => Some(*offset),
            EmptyExpression | DivisionByZero | NonFiniteResult | InputTooLong { .. } => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, EvalError>;
