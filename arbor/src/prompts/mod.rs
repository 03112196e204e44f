//! Load prompt templates from a JSON file and fall back to embedded defaults.
//!
//! **Canonical source**: Default prompt text lives in `arbor/prompts/default.json`;
//! it is embedded at compile time and used when no file is configured or the
//! configured path does not exist. See [`load`], [`load_or_default`], and
//! [`default_from_embedded`].

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

/// Embedded default JSON (canonical source: `arbor/prompts/default.json`).
const EMBED_DEFAULT: &str = include_str!("../../prompts/default.json");

/// Env var naming an alternative prompts file.
const PROMPTS_FILE_ENV: &str = "ARBOR_PROMPTS_FILE";

/// Default file name when no path or env override is given.
const DEFAULT_PROMPTS_FILE: &str = "prompts.json";

/// Error when loading prompts from a file (missing file, invalid JSON).
#[derive(Debug, thiserror::Error)]
pub enum PromptsError {
    #[error("prompts file not found: {0}")]
    FileNotFound(String),
    #[error("failed to read prompts file {path}: {message}")]
    ReadFile { path: String, message: String },
    #[error("failed to parse JSON in {path}: {message}")]
    ParseJson { path: String, message: String },
}

/// Chat section: the conversational system prompt.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatPrompts {
    pub system_prompt: String,
}

/// A one-shot template chain: system prompt plus a user template with
/// `{name}` placeholders.
#[derive(Debug, Clone, Deserialize)]
pub struct TemplatePrompt {
    pub system_prompt: String,
    pub user_template: String,
}

/// Tree-of-Thought prompt fragments for the proposal and scoring calls.
#[derive(Debug, Clone, Deserialize)]
pub struct TotPrompts {
    /// System prompt asking for a JSON array of up to `{branches}` candidates.
    pub propose_system: String,
    /// User template with `{problem}`, `{context}`, `{path}` placeholders.
    pub propose_user: String,
    /// System prompt asking for `{"score": number, "reason": string}`.
    pub score_system: String,
    /// User template with `{problem}`, `{context}`, `{thought}` placeholders.
    pub score_user: String,
}

/// All prompt sections, as loaded from one JSON file.
#[derive(Debug, Clone, Deserialize)]
pub struct Prompts {
    pub chat: ChatPrompts,
    pub summarize: TemplatePrompt,
    pub extract_info: TemplatePrompt,
    pub translate: TemplatePrompt,
    pub tot: TotPrompts,
}

impl Default for Prompts {
    fn default() -> Self {
        default_from_embedded()
    }
}

/// Substitutes `{name}` placeholders in a template. Unknown placeholders are
/// left untouched, so literal braces in prompt text (e.g. example JSON)
/// survive.
pub fn fill(template: &str, vars: &[(&str, &str)]) -> String {
    let map: HashMap<&str, &str> = vars.iter().copied().collect();
    let mut out = template.to_string();
    for (name, value) in &map {
        out = out.replace(&format!("{{{}}}", name), value);
    }
    out
}

/// Resolves the file to load from: `path` if `Some`, else `ARBOR_PROMPTS_FILE`
/// env, else `./prompts.json`.
fn prompts_file(path: Option<&Path>) -> std::path::PathBuf {
    path.map(std::path::PathBuf::from).unwrap_or_else(|| {
        std::env::var(PROMPTS_FILE_ENV)
            .ok()
            .map(std::path::PathBuf::from)
            .unwrap_or_else(|| std::path::PathBuf::from(DEFAULT_PROMPTS_FILE))
    })
}

/// Loads prompts from a JSON file.
///
/// If `path` is `None`, uses `ARBOR_PROMPTS_FILE` env or the default
/// `./prompts.json`. A missing file is an error here; use
/// [`load_or_default`] for the fall-back-to-embedded behavior.
pub fn load(path: Option<&Path>) -> Result<Prompts, PromptsError> {
    let file = prompts_file(path);
    if !file.exists() || !file.is_file() {
        return Err(PromptsError::FileNotFound(file.display().to_string()));
    }
    let content = std::fs::read_to_string(&file).map_err(|e| PromptsError::ReadFile {
        path: file.display().to_string(),
        message: e.to_string(),
    })?;
    serde_json::from_str(&content).map_err(|e| PromptsError::ParseJson {
        path: file.display().to_string(),
        message: e.to_string(),
    })
}

/// Returns default prompts by parsing the embedded JSON.
///
/// This is the single source of truth for default prompt text; no duplicate
/// strings in Rust.
pub fn default_from_embedded() -> Prompts {
    serde_json::from_str(EMBED_DEFAULT).expect("embedded default prompts must parse")
}

/// Loads prompts from the file if it exists; otherwise returns the embedded
/// default. A present-but-invalid file is still an error.
pub fn load_or_default(path: Option<&Path>) -> Result<Prompts, PromptsError> {
    match load(path) {
        Ok(p) => Ok(p),
        Err(PromptsError::FileNotFound(_)) => Ok(default_from_embedded()),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Scenario**: the embedded default parses and has non-empty sections.
    #[test]
    fn embedded_default_parses() {
        let p = default_from_embedded();
        assert!(!p.chat.system_prompt.is_empty());
        assert!(p.tot.propose_system.contains("{branches}"));
        assert!(p.tot.score_system.contains("score"));
        assert!(p.summarize.user_template.contains("{text}"));
    }

    /// **Scenario**: fill substitutes known placeholders and leaves literal
    /// braces (example JSON) alone.
    #[test]
    fn fill_substitutes_and_preserves_literals() {
        let out = fill("Problem: {problem}\nJSON: {\"score\": 1}", &[("problem", "2+2")]);
        assert_eq!(out, "Problem: 2+2\nJSON: {\"score\": 1}");
    }

    /// **Scenario**: load with an explicit non-existent path returns FileNotFound.
    #[test]
    fn load_nonexistent_file_returns_error() {
        let result = load(Some(Path::new("/nonexistent_prompts_12345.json")));
        assert!(matches!(result, Err(PromptsError::FileNotFound(_))));
    }

    /// **Scenario**: load_or_default falls back to embedded for a missing file.
    #[test]
    fn load_or_default_missing_file_uses_embedded() {
        let p = load_or_default(Some(Path::new("/nonexistent_prompts_12345.json"))).unwrap();
        assert_eq!(p.chat.system_prompt, default_from_embedded().chat.system_prompt);
    }

    /// **Scenario**: a present file overrides the defaults; invalid JSON is an error.
    #[test]
    fn load_from_file_and_parse_error() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("prompts.json");

        let mut value: serde_json::Value = serde_json::from_str(EMBED_DEFAULT).unwrap();
        value["chat"]["system_prompt"] = serde_json::json!("From file.");
        std::fs::write(&path, serde_json::to_string(&value).unwrap()).unwrap();
        let p = load(Some(&path)).unwrap();
        assert_eq!(p.chat.system_prompt, "From file.");

        std::fs::write(&path, "{ not json").unwrap();
        let err = load_or_default(Some(&path)).unwrap_err();
        assert!(matches!(err, PromptsError::ParseJson { .. }));
    }
}
