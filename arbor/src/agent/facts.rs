//! Regex-based fact extraction from user messages.
//!
//! Each pattern captures one personal detail and renders it as a canonical
//! fact sentence the long-term store can retrieve later ("User's name is
//! Sam"). Patterns are compiled once.

use once_cell::sync::Lazy;
use regex::Regex;

/// One extraction rule: pattern plus a sentence template with `{}` for the
/// captured group.
struct FactPattern {
    regex: Regex,
    template: &'static str,
}

static FACT_PATTERNS: Lazy<Vec<FactPattern>> = Lazy::new(|| {
    let rules: &[(&str, &str)] = &[
        (
            r"(?i)\bmy name is\s+([A-Za-z][\w'-]*)",
            "User's name is {}",
        ),
        (
            r"(?i)\bcall me\s+([A-Za-z][\w'-]*)",
            "User's name is {}",
        ),
        (r"(?i)\bI(?:'m| am)\s+(\d{1,3})\s+years old\b", "User is {} years old"),
        (
            r"(?i)\bI live in\s+([A-Za-z][\w' -]*?)(?:[.,!?]|$)",
            "User lives in {}",
        ),
        (
            r"(?i)\bI (?:really )?(?:like|love|enjoy)\s+([\w' -]+?)(?:[.,!?]|$)",
            "User likes {}",
        ),
        (
            r"(?i)\bI (?:dislike|hate)\s+([\w' -]+?)(?:[.,!?]|$)",
            "User dislikes {}",
        ),
        (
            r"(?i)\bI work as an?\s+([\w' -]+?)(?:[.,!?]|$)",
            "User works as a {}",
        ),
        (
            r"(?i)\bmy birthday is\s+([\w, -]+?)(?:[.!?]|$)",
            "User's birthday is {}",
        ),
    ];
    rules
        .iter()
        .map(|(pattern, template)| FactPattern {
            // Patterns are static and known-valid.
            regex: Regex::new(pattern).expect("fact pattern must compile"),
            template,
        })
        .collect()
});

/// Extracts canonical fact sentences from a user message.
///
/// Every match of every pattern contributes one fact; a message can yield
/// several. Unmatched messages yield an empty vector.
pub fn extract_facts(user_message: &str) -> Vec<String> {
    let mut facts = Vec::new();
    for pattern in FACT_PATTERNS.iter() {
        for caps in pattern.regex.captures_iter(user_message) {
            if let Some(m) = caps.get(1) {
                let value = m.as_str().trim();
                if !value.is_empty() {
                    facts.push(pattern.template.replace("{}", value));
                }
            }
        }
    }
    facts
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Scenario**: name, age, and location each extract a canonical sentence.
    #[test]
    fn extracts_name_age_location() {
        let facts = extract_facts("Hi, my name is Sam. I'm 25 years old and I live in Oslo.");
        assert!(facts.contains(&"User's name is Sam".to_string()), "{:?}", facts);
        assert!(facts.contains(&"User is 25 years old".to_string()), "{:?}", facts);
        assert!(facts.contains(&"User lives in Oslo".to_string()), "{:?}", facts);
    }

    /// **Scenario**: likes and dislikes both extract.
    #[test]
    fn extracts_preferences() {
        let facts = extract_facts("I like climbing, and I hate mornings.");
        assert!(facts.contains(&"User likes climbing".to_string()), "{:?}", facts);
        assert!(facts.contains(&"User dislikes mornings".to_string()), "{:?}", facts);
    }

    /// **Scenario**: occupation and birthday extract.
    #[test]
    fn extracts_occupation_and_birthday() {
        let facts = extract_facts("I work as a software engineer. My birthday is March 3.");
        assert!(
            facts.contains(&"User works as a software engineer".to_string()),
            "{:?}",
            facts
        );
        assert!(
            facts.contains(&"User's birthday is March 3".to_string()),
            "{:?}",
            facts
        );
    }

    /// **Scenario**: a message with no personal details yields nothing.
    #[test]
    fn no_facts_in_plain_message() {
        assert!(extract_facts("What's the weather like today?").is_empty());
    }

    /// **Scenario**: matching is case-insensitive.
    #[test]
    fn case_insensitive_matching() {
        let facts = extract_facts("MY NAME IS Ada");
        assert_eq!(facts, vec!["User's name is Ada".to_string()]);
    }
}
