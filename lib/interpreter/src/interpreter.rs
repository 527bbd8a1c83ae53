pub use errors::{EvalError, Result};
pub use parser::{BinaryOp, Expr, DEFAULT_MAX_DEPTH};

use parser::Parser;

pub const DEFAULT_MAX_INPUT_LEN: usize = 4096;

/// Bounds applied to every input before and while it is parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Longest accepted input, in characters.
    pub max_input_len: usize,
    /// Deepest accepted nesting of groups and unary minuses.
    pub max_depth: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self { max_input_len: DEFAULT_MAX_INPUT_LEN, max_depth: DEFAULT_MAX_DEPTH }
    }
}

/// Evaluates arithmetic expressions from untrusted input.
///
/// Holds nothing but its [`Limits`], so a single instance can be shared
/// freely between threads.
#[derive(Debug, Default, Clone, Copy)]
pub struct Interpreter {
    limits: Limits,
}

impl Interpreter {
    pub fn new(limits: Limits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> Limits {
        self.limits
    }

    /// Length check, whitelist gate, scanner, parser and evaluator, in that
    /// order. The first failing stage decides the error.
    pub fn evaluate(&self, source: &str) -> Result<f64> {
        let result = self.run(source);
        match &result {
            Ok(value) => log::debug!("Evaluated to {value}"),
            Err(e) => log::debug!("Rejected expression: {e}"),
        }
        result
    }

    fn run(&self, source: &str) -> Result<f64> {
        let len = source.chars().count();
        if len > self.limits.max_input_len {
            return Err(EvalError::InputTooLong { len, max: self.limits.max_input_len });
        }

        let tokens = scanner::scan(source)?;
        let expr = Parser::new(tokens).with_max_depth(self.limits.max_depth).parse()?;
        self.evaluate_expr(&expr)
    }

    pub fn evaluate_expr(&self, expr: &Expr) -> Result<f64> {
        fold(expr)
    }
}

/// Evaluates `source` with the default [`Limits`].
pub fn evaluate(source: &str) -> Result<f64> {
    Interpreter::default().evaluate(source)
}

/// Folds the tree into a single value. Division by zero is refused up front
/// and every intermediate value has to be finite.
pub fn fold(expr: &Expr) -> Result<f64> {
    use BinaryOp::*;

    let value = match expr {
        Expr::Literal(value) => *value,
        Expr::UnaryMinus(operand) => -fold(operand)?,
        Expr::Binary { op, left, right } => {
            let left = fold(left)?;
            let right = fold(right)?;
            match op {
                Add => left + right,
                Sub => left - right,
                Mul => left * right,
                Div => {
                    if right == 0.0 {
                        return Err(EvalError::DivisionByZero);
                    }
                    left / right
                }
            }
        }
    };

    if value.is_finite() {
        Ok(value)
    } else {
        Err(EvalError::NonFiniteResult)
    }
}

#[cfg(test)]
mod tests {
    use cursor::Offset;
    use itertools::Itertools;
    use pretty_assertions::assert_eq;

    use super::*;

    const ALPHABET: [char; 10] = ['1', '0', '.', '+', '-', '*', '/', '(', ')', ' '];
    const DISALLOWED: [char; 10] = ['a', 'Z', '_', '\'', '"', ';', '$', '=', '^', 'é'];

    /// Every non-empty string over `ALPHABET` up to `max_len` characters.
    fn whitelisted_inputs(max_len: usize) -> impl Iterator<Item = String> {
        (1..=max_len).flat_map(|len| {
            std::iter::repeat(ALPHABET)
                .take(len)
                .multi_cartesian_product()
                .map(|chars| chars.into_iter().collect::<String>())
        })
    }

    #[ctor::ctor]
    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[test]
    fn arithmetic() {
        assert_eq!(evaluate("2 + 2 * 3"), Ok(8.0));
        assert_eq!(evaluate("(10 + 5) / 3"), Ok(5.0));
        assert_eq!(evaluate("100 - 25 * 2"), Ok(50.0));
        assert_eq!(evaluate("7 / 2"), Ok(3.5));
        assert_eq!(evaluate("0.1 + 0.2"), Ok(0.1 + 0.2));
        assert_eq!(evaluate("  42  "), Ok(42.0));
    }

    #[test]
    fn associativity() {
        assert_eq!(evaluate("10 - 4 - 3"), Ok(3.0));
        assert_eq!(evaluate("64 / 4 / 2"), Ok(8.0));
        assert_eq!(evaluate("2 * 3 / 4"), Ok(1.5));
    }

    #[test]
    fn unary_minus() {
        assert_eq!(evaluate("--5"), Ok(5.0));
        assert_eq!(evaluate("-(-5)"), Ok(5.0));
        assert_eq!(evaluate("---5"), Ok(-5.0));
        assert_eq!(evaluate("3 - -2"), Ok(5.0));
        assert_eq!(evaluate("-2 * -3"), Ok(6.0));
    }

    #[test]
    fn division_by_zero() {
        assert_eq!(evaluate("1/0"), Err(EvalError::DivisionByZero));
        assert_eq!(evaluate("1 / -0"), Err(EvalError::DivisionByZero));
        assert_eq!(evaluate("1 / (2 - 2)"), Err(EvalError::DivisionByZero));
        assert_eq!(evaluate("0 / 0"), Err(EvalError::DivisionByZero));
        assert_eq!(evaluate("0 / 5"), Ok(0.0));
    }

    #[test]
    fn non_finite_results() {
        let huge = "9".repeat(400);
        assert_eq!(evaluate(&huge), Err(EvalError::NonFiniteResult));

        let overflow = format!("1{} * 1{}", "0".repeat(200), "0".repeat(200));
        assert_eq!(evaluate(&overflow), Err(EvalError::NonFiniteResult));

        // The intermediate overflows even though the quotient would be representable
        let intermediate = format!("{overflow} / 1{}", "0".repeat(300));
        assert_eq!(evaluate(&intermediate), Err(EvalError::NonFiniteResult));
    }

    #[test]
    fn fold_does_not_need_a_parser() {
        let expr = Expr::binary(
            BinaryOp::Div,
            Expr::negate(Expr::Literal(9.0)),
            Expr::binary(BinaryOp::Add, Expr::Literal(1.0), Expr::Literal(2.0)),
        );
        assert_eq!(fold(&expr), Ok(-3.0));
        assert_eq!(Interpreter::default().evaluate_expr(&expr), Ok(-3.0));
        assert_eq!(fold(&Expr::Literal(f64::NAN)), Err(EvalError::NonFiniteResult));
    }

    #[test]
    fn injection_attempts_never_reach_the_parser() {
        for (source, character, offset) in [
            ("require('fs')", 'r', 0),
            ("process.exit()", 'p', 0),
            ("__proto__", '_', 0),
            ("alert(1)", 'a', 0),
            ("1; drop", ';', 1),
            ("0x10", 'x', 1),
            ("1e5", 'e', 1),
        ] {
            assert_eq!(
                evaluate(source),
                Err(EvalError::InvalidCharacter { character, offset: Offset(offset) }),
                "{source}"
            );
        }
    }

    #[test]
    fn every_whitelisted_input_is_finite_or_an_error() {
        for source in whitelisted_inputs(6) {
            match evaluate(&source) {
                Ok(value) => assert!(value.is_finite(), "{source:?} evaluated to {value}"),
                Err(
                    e @ (EvalError::InvalidCharacter { .. }
                    | EvalError::InputTooLong { .. }
                    | EvalError::NestingTooDeep { .. }),
                ) => panic!("{source:?} was refused as {e:?}"),
                Err(_) => {}
            }
        }
    }

    #[test]
    fn any_disallowed_character_is_reported_where_it_sits() {
        for source in whitelisted_inputs(4) {
            let chars = source.chars().collect_vec();
            for character in DISALLOWED {
                for offset in 0..=chars.len() {
                    let mut injected = chars.clone();
                    injected.insert(offset, character);
                    let injected: String = injected.into_iter().collect();

                    assert_eq!(
                        evaluate(&injected),
                        Err(EvalError::InvalidCharacter { character, offset: Offset(offset) }),
                        "{injected:?}"
                    );
                }
            }
        }
    }

    #[test]
    fn whitespace_is_stripped() {
        assert_eq!(evaluate("1 2"), Ok(12.0));
        assert_eq!(evaluate("1. 5"), Ok(1.5));
        assert_eq!(evaluate("1\u{a0}+\u{a0}2"), Ok(3.0));
        assert_eq!(
            evaluate("1 2 +"),
            Err(EvalError::UnexpectedToken { token: "end of input".to_string(), offset: Offset(5) })
        );
    }

    #[test]
    fn structural_errors() {
        assert_eq!(
            evaluate("()"),
            Err(EvalError::UnexpectedToken { token: "')'".to_string(), offset: Offset(1) })
        );
        assert_eq!(
            evaluate("(1+2"),
            Err(EvalError::UnbalancedParentheses { offset: Offset(0) })
        );
        assert_eq!(evaluate(""), Err(EvalError::EmptyExpression));
        assert_eq!(evaluate(" \t "), Err(EvalError::EmptyExpression));
    }

    #[test]
    fn input_length_limit() {
        let interpreter = Interpreter::new(Limits { max_input_len: 5, ..Limits::default() });
        assert_eq!(interpreter.evaluate("1+2+3"), Ok(6.0));
        assert_eq!(
            interpreter.evaluate("1 + 2 + 3"),
            Err(EvalError::InputTooLong { len: 9, max: 5 })
        );
        // Checked before the whitelist
        assert_eq!(
            interpreter.evaluate("require('fs')"),
            Err(EvalError::InputTooLong { len: 13, max: 5 })
        );
    }

    #[test]
    fn nesting_limit() {
        let interpreter = Interpreter::new(Limits { max_depth: 3, ..Limits::default() });
        assert_eq!(interpreter.evaluate("-((1))"), Ok(-1.0));
        assert_eq!(
            interpreter.evaluate("-((-1))"),
            Err(EvalError::NestingTooDeep { max_depth: 3, offset: Offset(3) })
        );
        assert_eq!(interpreter.limits().max_depth, 3);
    }

    #[test]
    fn deeply_nested_input_is_refused() {
        let source = format!("{}1{}", "(".repeat(2_000), ")".repeat(2_000));
        assert!(matches!(evaluate(&source), Err(EvalError::NestingTooDeep { .. })));

        let source = format!("{}1", "-".repeat(2_000));
        assert!(matches!(evaluate(&source), Err(EvalError::NestingTooDeep { .. })));
    }

    #[test]
    fn idempotent() {
        for source in ["2 + 2 * 3", "1/0", "(1+2", "x"] {
            assert_eq!(evaluate(source), evaluate(source));
        }
    }

    #[test]
    fn concurrent_callers() {
        let interpreter = Interpreter::default();
        std::thread::scope(|s| {
            for i in 0..8 {
                s.spawn(move || {
                    for _ in 0..100 {
                        let source = format!("({i} + 1) * 2 - {i}");
                        assert_eq!(interpreter.evaluate(&source), Ok((i + 2) as f64));
                    }
                });
            }
        });
    }
}
