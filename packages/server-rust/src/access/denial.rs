//! Best-effort scraping of remote access-error text.
//!
//! The remote system's error format is not a contract, so anything that does
//! not match falls back to the raw text.

use std::sync::LazyLock;

use regex::Regex;

static GROUPS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"group\(s\):\s*([^\n]+)").expect("groups pattern compiles"));

static MODEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"on model '([^']+)'").expect("model pattern compiles"));

/// Human-readable denial reason extracted from an error message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Denial {
    pub reason: String,
    pub required_groups: Option<Vec<String>>,
}

/// Parses a remote error text into a reason and, when listed, the required groups.
#[must_use]
pub fn parse_denial(raw: &str) -> Denial {
    if let Some(captures) = GROUPS.captures(raw) {
        let groups: Vec<String> = captures[1]
            .split(',')
            .map(str::trim)
            .filter(|group| !group.is_empty())
            .map(str::to_string)
            .collect();
        if !groups.is_empty() {
            return Denial {
                reason: format!("Access denied. Required group(s): {}", groups.join(", ")),
                required_groups: Some(groups),
            };
        }
    }

    if let Some(captures) = MODEL.captures(raw) {
        return Denial {
            reason: format!("Access denied on model '{}'", &captures[1]),
            required_groups: None,
        };
    }

    Denial {
        reason: raw.trim().to_string(),
        required_groups: None,
    }
}
