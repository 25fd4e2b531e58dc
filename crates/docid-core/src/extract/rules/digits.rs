//! Fixed-length digit runs: card numbers and passport numbers.

use super::patterns::{DIGIT_RUN, NATIONAL_ID};

/// First run of exactly `len` consecutive digits.
///
/// Longer runs are not split, so a 13-digit run never yields a 12-digit
/// card number.
pub fn exact_digit_run(text: &str, len: usize) -> Option<String> {
    DIGIT_RUN
        .find_iter(text)
        .find(|m| m.as_str().len() == len)
        .map(|m| m.as_str().to_string())
}

/// First run of exactly `len` digits that is not the tail of a national ID
/// such as `A123456789`.
///
/// A letter directly before the run only disqualifies it when the two form a
/// national ID, so compacted labels like `PASSPORTNO312345678` still match.
pub fn standalone_digit_run(text: &str, len: usize) -> Option<String> {
    DIGIT_RUN
        .find_iter(text)
        .filter(|m| m.as_str().len() == len)
        .find(|m| {
            !text[..m.start()]
                .chars()
                .next_back()
                .is_some_and(|c| is_national_id_tail(c, m.as_str()))
        })
        .map(|m| m.as_str().to_string())
}

fn is_national_id_tail(prefix: char, digits: &str) -> bool {
    prefix.is_ascii_alphabetic()
        && NATIONAL_ID.is_match(&format!("{}{}", prefix.to_ascii_uppercase(), digits))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_exact_twelve_digits() {
        assert_eq!(
            exact_digit_run("卡號000012345678", 12),
            Some("000012345678".to_string())
        );
        assert_eq!(exact_digit_run("卡號00001234567", 12), None);
        assert_eq!(exact_digit_run("卡號0000123456789", 12), None);
    }

    #[test]
    fn test_skips_shorter_runs_before_match() {
        assert_eq!(
            exact_digit_run("65/03/10 123456789012", 12),
            Some("123456789012".to_string())
        );
    }

    #[test]
    fn test_standalone_skips_id_tail() {
        assert_eq!(standalone_digit_run("A123456789", 9), None);
        assert_eq!(
            standalone_digit_run("A123456789 PASSPORT 312345678", 9),
            Some("312345678".to_string())
        );
    }

    #[test]
    fn test_standalone_after_compacted_label() {
        assert_eq!(
            standalone_digit_run("護照號碼PASSPORTNO312345678", 9),
            Some("312345678".to_string())
        );
        // B + 212345678 is a national ID, not a passport number
        assert_eq!(standalone_digit_run("NOB212345678", 9), None);
    }
}
