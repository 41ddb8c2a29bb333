//! Phone address helpers used by transports before dialing.
//!
//! CHANGELOG:
//! - 10/16/2026 - Initial implementation

/// Fewest digits we are willing to dial.
pub const MIN_DIALABLE_DIGITS: usize = 7;

/// Characters allowed between digits in a formatted number.
const SEPARATORS: &[char] = &[' ', '-', '(', ')', '.'];

/// Strip everything but digits.
pub fn digits_only(phone: &str) -> String {
    phone.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Reduce a `+`-prefixed number to `+<digits>` if it is dialable.
///
/// Returns `None` when the address has no leading `+`, contains anything
/// besides digits and common separators, or has too few digits.
pub fn dialable(phone: &str) -> Option<String> {
    let rest = phone.strip_prefix('+')?;
    if !rest
        .chars()
        .all(|c| c.is_ascii_digit() || SEPARATORS.contains(&c))
    {
        return None;
    }

    let digits = digits_only(rest);
    if digits.len() < MIN_DIALABLE_DIGITS {
        return None;
    }
    Some(format!("+{}", digits))
}
