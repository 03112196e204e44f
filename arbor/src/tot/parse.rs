//! Tolerant parsing of oracle output for proposals and scores.
//!
//! The oracle is untrusted: ideally it returns the requested JSON, but it
//! may return markdown lists, prose, or garbage. Each parser is an ordered
//! chain of attempts, and the outcome keeps the tier that succeeded:
//! "oracle gave clean JSON" and "oracle gave free text we guessed at" are
//! different situations when debugging prompt quality.

/// How a value was obtained from raw oracle text.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome<T> {
    /// The requested format parsed cleanly.
    Parsed(T),
    /// A fallback heuristic produced a value from non-conforming text.
    Fallback(T),
    /// No tier produced content.
    Unparseable,
}

impl<T> ParseOutcome<T> {
    /// Returns the contained value, or `default` for `Unparseable`.
    pub fn unwrap_or(self, default: T) -> T {
        match self {
            ParseOutcome::Parsed(v) | ParseOutcome::Fallback(v) => v,
            ParseOutcome::Unparseable => default,
        }
    }

    /// Label for logging: which tier produced the value.
    pub fn tier(&self) -> &'static str {
        match self {
            ParseOutcome::Parsed(_) => "parsed",
            ParseOutcome::Fallback(_) => "fallback",
            ParseOutcome::Unparseable => "unparseable",
        }
    }
}

/// Coerces a JSON value to a display string: strings verbatim, everything
/// else in its JSON rendering.
fn value_to_string(v: &serde_json::Value) -> String {
    match v {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Parses proposal candidates from raw oracle text.
///
/// 1. JSON array → up to `limit` elements, each coerced to string.
/// 2. Newline-delimited text: trim each line, strip leading `"- "` list
///    markers, drop empties, take up to `limit`.
/// 3. Neither yields content → `Unparseable` (callers treat this as "no
///    expansion", not an error).
pub fn parse_proposals(raw: &str, limit: usize) -> ParseOutcome<Vec<String>> {
    if let Ok(serde_json::Value::Array(items)) = serde_json::from_str::<serde_json::Value>(raw) {
        return ParseOutcome::Parsed(items.iter().take(limit).map(value_to_string).collect());
    }

    let lines: Vec<String> = raw
        .lines()
        .map(|line| line.trim().trim_start_matches(['-', ' ']).trim().to_string())
        .filter(|line| !line.is_empty())
        .take(limit)
        .collect();

    if lines.is_empty() {
        ParseOutcome::Unparseable
    } else {
        ParseOutcome::Fallback(lines)
    }
}

/// Coerces a JSON value to f64 for the score field: numbers directly,
/// numeric strings via parse. `None` means the value was present but not
/// coercible, which sends the caller down the token fallback.
fn value_to_score(v: &serde_json::Value) -> Option<f64> {
    match v {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Parses `(score, reason)` from raw oracle text.
///
/// 1. JSON object → `score` coerced to f64 (absent → 0.0), `reason`
///    coerced to string (absent → empty).
/// 2. First whitespace-delimited token as f64 → that score with the whole
///    raw text as the reason.
/// 3. `Unparseable`; the caller substitutes `(0.0, raw)`.
pub fn parse_score(raw: &str) -> ParseOutcome<(f64, String)> {
    if let Ok(serde_json::Value::Object(map)) = serde_json::from_str::<serde_json::Value>(raw) {
        let score = match map.get("score") {
            None => Some(0.0),
            Some(v) => value_to_score(v),
        };
        if let Some(score) = score {
            let reason = map.get("reason").map(value_to_string).unwrap_or_default();
            return ParseOutcome::Parsed((score, reason));
        }
        // score present but not a number: fall through to the token tier.
    }

    if let Some(token) = raw.split_whitespace().next() {
        if let Ok(score) = token.parse::<f64>() {
            return ParseOutcome::Fallback((score, raw.to_string()));
        }
    }

    ParseOutcome::Unparseable
}
