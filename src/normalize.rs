//! Text-to-number converters for the loosely formatted profile fields.
//!
//! Every converter takes `Option<&str>` and returns `None` for absent input,
//! so a missing cell stays missing instead of turning into zero or an error.

use crate::error::{ScrapeError, ScrapeResult};

/// Cell contents the site (and spreadsheet exports of it) use for "no value".
const MISSING_SENTINELS: &[&str] = &["", "-", "--", "n/a", "na", "nan", "null", "none"];

pub fn is_missing(raw: &str) -> bool {
    let trimmed = raw.trim();
    MISSING_SENTINELS
        .iter()
        .any(|s| trimmed.eq_ignore_ascii_case(s))
}

/// `Some(trimmed)` unless the cell is blank or a missing sentinel.
pub fn present(raw: Option<&str>) -> Option<&str> {
    let raw = raw?.trim();
    if is_missing(raw) { None } else { Some(raw) }
}

/// Every maximal run of ASCII digits, in order, read as floats. Runs too
/// long to represent come back as infinity and are rejected by the callers.
pub fn digit_runs(raw: &str) -> Vec<f64> {
    raw.split(|ch: char| !ch.is_ascii_digit())
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<f64>().unwrap_or(f64::INFINITY))
        .collect()
}

fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

/// `6' 2"` -> 74.0. Needs exactly a feet group and an inches group.
pub fn height_to_inches(raw: Option<&str>) -> Option<f64> {
    let raw = present(raw)?;
    match digit_runs(raw).as_slice() {
        [feet, inches] => finite(feet * 12.0 + inches),
        _ => None,
    }
}

/// Sums every digit run: `"210 lbs"` -> 210, `"6 Yrs 3 Mo"` -> 9.
///
/// Also used for the experience field (`"3 Yrs"`), which shares the
/// "number followed by a unit" shape. A present value with no digits
/// (e.g. `"Rookie"`) sums to zero.
pub fn sum_digit_groups(raw: Option<&str>) -> Option<f64> {
    let raw = present(raw)?;
    finite(digit_runs(raw).iter().sum::<f64>())
}

pub fn weight_to_lbs(raw: Option<&str>) -> Option<f64> {
    sum_digit_groups(raw)
}

pub fn experience_to_years(raw: Option<&str>) -> Option<f64> {
    sum_digit_groups(raw)
}

/// Concatenates all digit runs and reads them as one number:
/// `"$1,250"` -> 1250.0. Absent when the text holds no digits.
pub fn parse_digits_to_num(raw: Option<&str>) -> Option<f64> {
    let raw = present(raw)?;
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse::<f64>().ok().and_then(finite)
}

/// Header label -> field identifier: whitespace runs become `_`, every
/// non-word character is dropped, result is lowercased.
/// `"DOB/Age:"` -> `"dobage"`, `"Roster Status:"` -> `"roster_status"`.
pub fn clean_column_name(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut prev_space = false;
    for ch in raw.trim().chars() {
        if ch.is_whitespace() {
            if !prev_space {
                out.push('_');
            }
            prev_space = true;
            continue;
        }
        prev_space = false;
        if ch.is_alphanumeric() || ch == '_' {
            out.extend(ch.to_lowercase());
        }
    }
    out
}

/// Float read for cells that may carry `$`, `,` or `%`. Blanks and
/// sentinels are absent; any other non-numeric text is a coercion error.
pub fn parse_number_cell(column: &str, raw: Option<&str>) -> ScrapeResult<Option<f64>> {
    let Some(raw) = present(raw) else {
        return Ok(None);
    };
    let cleaned: String = raw
        .chars()
        .filter(|c| !matches!(c, '$' | ',' | '%'))
        .collect();
    cleaned
        .trim()
        .parse::<f64>()
        .map(Some)
        .map_err(|_| ScrapeError::coercion(column, raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn height_feet_and_inches() {
        assert_eq!(height_to_inches(Some("6' 2\"")), Some(74.0));
        assert_eq!(height_to_inches(Some("5'11\"")), Some(71.0));
        assert_eq!(height_to_inches(Some("6-0")), Some(72.0));
    }

    #[test]
    fn height_absent_or_unparseable() {
        assert_eq!(height_to_inches(None), None);
        assert_eq!(height_to_inches(Some("  ")), None);
        assert_eq!(height_to_inches(Some("N/A")), None);
        assert_eq!(height_to_inches(Some("6'")), None);
    }

    #[test]
    fn digit_groups_are_summed() {
        assert_eq!(weight_to_lbs(Some("210 lbs")), Some(210.0));
        assert_eq!(experience_to_years(Some("6 Yrs 3 Mo")), Some(9.0));
        assert_eq!(experience_to_years(Some("Rookie")), Some(0.0));
        assert_eq!(weight_to_lbs(None), None);
        assert_eq!(weight_to_lbs(Some("-")), None);
    }

    #[test]
    fn oversized_digit_runs_do_not_panic() {
        let huge = "9".repeat(400);
        assert_eq!(
            height_to_inches(Some("9999999999999999999' 1\"")),
            Some(9999999999999999999.0 * 12.0 + 1.0)
        );
        assert_eq!(height_to_inches(Some(&format!("{huge}' 1\""))), None);
        assert_eq!(
            weight_to_lbs(Some("18446744073709551615 / 1 lbs")),
            Some(18446744073709551615.0 + 1.0)
        );
        assert_eq!(weight_to_lbs(Some("99999999999999999999 lbs")), Some(1e20));
        assert_eq!(weight_to_lbs(Some(&format!("{huge} lbs"))), None);
        assert_eq!(parse_digits_to_num(Some(&huge)), None);
    }

    #[test]
    fn digits_concatenate() {
        assert_eq!(parse_digits_to_num(Some("$1,250")), Some(1250.0));
        assert_eq!(parse_digits_to_num(Some("abc")), None);
    }

    #[test]
    fn clean_column_name_examples() {
        assert_eq!(clean_column_name("DOB/Age:"), "dobage");
        assert_eq!(clean_column_name("Roster  Status:"), "roster_status");
        assert_eq!(clean_column_name("Height/Weight:"), "heightweight");
    }

    #[test]
    fn clean_column_name_is_idempotent() {
        for raw in ["DOB/Age:", "Roster Status:", "NFL Team", "already_clean"] {
            let once = clean_column_name(raw);
            assert_eq!(clean_column_name(&once), once);
        }
    }

    #[test]
    fn number_cells() {
        assert_eq!(parse_number_cell("salary", Some("$1,000")).unwrap(), Some(1000.0));
        assert_eq!(parse_number_cell("pts", Some("12.5")).unwrap(), Some(12.5));
        assert_eq!(parse_number_cell("pts", Some("")).unwrap(), None);
        let err = parse_number_cell("pts", Some("bye")).unwrap_err();
        assert!(matches!(err, ScrapeError::Coercion { ref column, .. } if column == "pts"));
    }
}
