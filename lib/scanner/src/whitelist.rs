use cursor::Offset;
use errors::{EvalError, Result};

/// `[0-9+\-*/().]`, ASCII digits only.
pub fn is_allowed(c: char) -> bool {
    c.is_ascii_digit() || matches!(c, '+' | '-' | '*' | '/' | '(' | ')' | '.')
}

/// Rejects the input if any non-whitespace character lies outside the
/// whitelist, pointing at the first offender.
///
/// Whitespace means Unicode whitespace, so a no-break space (U+00A0) or a
/// line separator is stripped like an ASCII space.
pub fn check_whitelist(source: &str) -> Result<()> {
    match source.chars().enumerate().find(|(_, c)| !c.is_whitespace() && !is_allowed(*c)) {
        Some((offset, character)) => {
            log::debug!("Rejecting input, {character:?} at {offset} is not whitelisted");
            Err(EvalError::InvalidCharacter { character, offset: Offset(offset) })
        }
        None => Ok(()),
    }
}
