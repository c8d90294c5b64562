//! Reading the numbers of a reference body.

use crate::coordinate::{FIRST, LAST};

/// Parse a chapter or verse number, ignoring a partial-verse letter
/// (`5a` reads as 5). Returns `None` outside 1..=999.
pub fn parse_number(raw: &str) -> Option<u16> {
    let digits = digits_of(raw);
    if digits.is_empty() {
        return None;
    }
    let value = digits.parse::<u16>().ok()?;
    return (FIRST..=LAST).contains(&value).then_some(value);
}

/// Complete an abbreviated range end from its start: `(130, 45)` means
/// 130 to 145. Only applies when the end is numerically smaller and has
/// fewer digits. Returns the completed end as written digits.
pub fn infer_abbreviation(start: &str, end: &str) -> Option<String> {
    let (start, end) = (digits_of(start), digits_of(end));
    if end.len() >= start.len() {
        return None;
    }
    let (first, last) = (start.parse::<u16>().ok()?, end.parse::<u16>().ok()?);
    if last >= first {
        return None;
    }
    let keep = start.get(..start.len().saturating_sub(end.len()))?;
    return Some(format!("{keep}{end}"));
}

/// Resolve a written range to numbers, completing an abbreviated end.
///
/// Returns `None` if either side is out of range, or if the end is smaller
/// than the start and cannot be read as an abbreviation.
pub fn resolve_span(start: &str, end: Option<&str>) -> Option<(u16, u16)> {
    let first = parse_number(start)?;
    let Some(end) = end else {
        return Some((first, first));
    };
    let last = parse_number(end)?;
    if last >= first {
        return Some((first, last));
    }
    let completed = parse_number(&infer_abbreviation(start, end)?)?;
    return (completed >= first).then_some((first, completed));
}

/// The leading ASCII digits of a written number.
fn digits_of(raw: &str) -> &str {
    let end = raw.bytes().take_while(u8::is_ascii_digit).count();
    return raw.get(..end).unwrap_or_default();
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_and_lettered_numbers() {
        assert_eq!(parse_number("16"), Some(16));
        assert_eq!(parse_number("1a"), Some(1));
        assert_eq!(parse_number("4b"), Some(4));
    }

    #[test]
    fn rejects_numbers_outside_range() {
        assert_eq!(parse_number("0"), None);
        assert_eq!(parse_number("1000"), None);
        assert_eq!(parse_number("99999999"), None);
        assert_eq!(parse_number(""), None);
    }

    #[test]
    fn infers_abbreviated_range_ends() {
        assert_eq!(infer_abbreviation("130", "45").as_deref(), Some("145"));
        assert_eq!(infer_abbreviation("776", "77").as_deref(), Some("777"));
        assert_eq!(infer_abbreviation("13", "4").as_deref(), Some("14"));
        assert_eq!(infer_abbreviation("4", "1"), None);
        assert_eq!(infer_abbreviation("13", "24"), None);
    }

    #[test]
    fn resolves_spans() {
        assert_eq!(resolve_span("1", None), Some((1, 1)));
        assert_eq!(resolve_span("1", Some("4")), Some((1, 4)));
        assert_eq!(resolve_span("776", Some("77")), Some((776, 777)));
        assert_eq!(resolve_span("13", Some("4")), Some((13, 14)));
        assert_eq!(resolve_span("4", Some("1")), None);
        assert_eq!(resolve_span("19", Some("5")), None);
    }
}
