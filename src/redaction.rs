use once_cell::sync::Lazy;
use regex::Regex;

static SECRET_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r#"(?i)(authorization|api[_-]?key|token|secret|password)\s*[:=]\s*["']?(basic |bearer )?([A-Za-z0-9_\-\.+/=]{6,})["']?"#)
            .expect("valid regex"),
        Regex::new(r"\b([A-Za-z0-9]{52})\b").expect("valid regex"),
    ]
});

/// Scrubs credentials out of text that is about to be logged or surfaced in
/// an error, such as an HTTP error body echoed back by the tracker.
#[derive(Debug, Default, Clone)]
pub struct Redactor {
    secrets: Vec<String>,
}

impl Redactor {
    pub fn new<I, S>(secrets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            secrets: secrets
                .into_iter()
                .map(Into::into)
                .filter(|secret| !secret.is_empty())
                .collect(),
        }
    }

    pub fn redact(&self, input: &str) -> String {
        if input.is_empty() {
            return String::new();
        }

        let mut result = input.to_string();
        for secret in &self.secrets {
            result = result.replace(secret.as_str(), "[REDACTED]");
        }

        for pattern in SECRET_PATTERNS.iter() {
            if !pattern.is_match(&result) {
                continue;
            }
            result = pattern
                .replace_all(&result, |caps: &regex::Captures<'_>| match caps.get(1) {
                    Some(key) if caps.len() > 2 => format!("{}=[REDACTED]", key.as_str().to_ascii_lowercase()),
                    _ => "[REDACTED]".to_string(),
                })
                .to_string();
        }

        result
    }
}
