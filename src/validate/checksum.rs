//! GTIN-13 / UPC-A check digit arithmetic.

use std::sync::LazyLock;

use regex::Regex;

/// Length of a normalized GTIN-13 code.
pub const GTIN13_LEN: usize = 13;

const UPC_LEN: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GtinError {
    /// No run of 12 or 13 consecutive digits.
    Malformed,
    CheckDigit { expected: u32, found: u32 },
}

static DIGIT_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("[0-9]{12,13}").expect("digit run pattern is valid"));

/// Find the leftmost run of 12 or 13 ASCII digits in `raw` and left-pad it to 13.
///
/// Longer runs contribute their first 13 digits. Surrounding characters are ignored.
pub fn extract_gtin13(raw: &str) -> Option<String> {
    let digits = DIGIT_RUN.find(raw)?.as_str();
    Some(if digits.len() == UPC_LEN {
        format!("0{digits}")
    } else {
        digits.to_string()
    })
}

/// Check digit for a 12-digit payload. Weights alternate 1, 3 from the left.
pub fn expected_check_digit(payload: &[u8]) -> u32 {
    let weighted: u32 = payload
        .iter()
        .enumerate()
        .map(|(i, b)| {
            let digit = u32::from(b - b'0');
            if i % 2 == 0 { digit } else { digit * 3 }
        })
        .sum();
    (10 - weighted % 10) % 10
}

/// Validate a UPC-A or EAN-13 code, returning the normalized 13-digit string.
pub fn validate_gtin(raw: &str) -> Result<String, GtinError> {
    let code = extract_gtin13(raw).ok_or(GtinError::Malformed)?;
    let bytes = code.as_bytes();
    let (payload, check) = bytes.split_at(GTIN13_LEN - 1);
    let expected = expected_check_digit(payload);
    let found = u32::from(check[0] - b'0');
    if expected != found {
        return Err(GtinError::CheckDigit { expected, found });
    }
    Ok(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pads_twelve_digit_upc() {
        assert_eq!(extract_gtin13("036000291452").as_deref(), Some("0036000291452"));
    }

    #[test]
    fn tolerates_surrounding_text() {
        assert_eq!(
            extract_gtin13("UPC: 036000291452 (case)").as_deref(),
            Some("0036000291452")
        );
    }

    #[test]
    fn skips_short_runs() {
        assert_eq!(
            extract_gtin13("12345-4006381333931").as_deref(),
            Some("4006381333931")
        );
        assert_eq!(extract_gtin13("12345678901"), None);
        assert_eq!(extract_gtin13(""), None);
    }

    #[test]
    fn only_ascii_digits_count() {
        assert_eq!(extract_gtin13("٠٣٦٠٠٠٢٩١٤٥٢"), None);
        assert_eq!(extract_gtin13("03600029145x2"), None);
    }

    #[test]
    fn long_run_keeps_first_thirteen() {
        assert_eq!(
            extract_gtin13("40063813339319").as_deref(),
            Some("4006381333931")
        );
    }

    #[test]
    fn known_check_digits() {
        assert_eq!(expected_check_digit(b"003600029145"), 2);
        assert_eq!(expected_check_digit(b"400638133393"), 1);
        assert_eq!(expected_check_digit(b"590123412345"), 7);
    }

    #[test]
    fn mismatch_reports_both_digits() {
        assert_eq!(
            validate_gtin("4006381333932"),
            Err(GtinError::CheckDigit {
                expected: 1,
                found: 2
            })
        );
        assert_eq!(validate_gtin("abc"), Err(GtinError::Malformed));
    }
}
