use crate::errors::SprintNameError;
use once_cell::sync::Lazy;
use regex::Regex;

static SPRINT_LABEL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Sprint[\t\n\f\r ]+([0-9]+)").expect("valid sprint label regex"));

/// Pulls the sprint ordinal out of an iteration label such as `"Team Sprint 67"`.
///
/// The match is case-sensitive and the first `Sprint <digits>` occurrence wins.
pub fn extract_sprint_number(name: Option<&str>) -> Result<i64, SprintNameError> {
    let name = name.ok_or(SprintNameError::MissingName)?;
    let digits = SPRINT_LABEL_RE
        .captures(name)
        .and_then(|caps| caps.get(1))
        .ok_or(SprintNameError::NoMatch)?
        .as_str();

    digits
        .parse::<i64>()
        .map_err(|_| SprintNameError::MalformedNumber(digits.to_string()))
}

#[cfg(test)]
mod tests {
    use super::extract_sprint_number;
    use crate::errors::SprintNameError;

    #[test]
    fn extracts_number_from_label() {
        assert_eq!(extract_sprint_number(Some("Sprint 67")), Ok(67));
        assert_eq!(extract_sprint_number(Some("Platform Sprint   012 (Q3)")), Ok(12));
        assert_eq!(extract_sprint_number(Some("Sprint\t5")), Ok(5));
    }

    #[test]
    fn first_match_wins() {
        assert_eq!(extract_sprint_number(Some("Sprint 4 / Sprint 5")), Ok(4));
    }

    #[test]
    fn rejects_labels_without_pattern() {
        assert_eq!(extract_sprint_number(Some("Retro")), Err(SprintNameError::NoMatch));
        assert_eq!(extract_sprint_number(Some("sprint 4")), Err(SprintNameError::NoMatch));
        assert_eq!(extract_sprint_number(Some("Sprint4")), Err(SprintNameError::NoMatch));
        assert_eq!(extract_sprint_number(Some("")), Err(SprintNameError::NoMatch));
    }

    #[test]
    fn only_ascii_whitespace_and_digits_count() {
        assert_eq!(extract_sprint_number(Some("Sprint 6\u{0667}")), Ok(6));
        assert_eq!(extract_sprint_number(Some("Sprint\u{a0}67")), Err(SprintNameError::NoMatch));
        assert_eq!(extract_sprint_number(Some("Sprint \u{0667}")), Err(SprintNameError::NoMatch));
    }

    #[test]
    fn missing_name_is_reported() {
        assert_eq!(extract_sprint_number(None), Err(SprintNameError::MissingName));
    }

    #[test]
    fn oversized_digit_run_is_malformed() {
        let result = extract_sprint_number(Some("Sprint 99999999999999999999999"));
        assert!(matches!(result, Err(SprintNameError::MalformedNumber(_))));
    }
}
