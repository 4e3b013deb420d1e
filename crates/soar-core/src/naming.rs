//! Name derivation for tools and tool arguments.
//!
//! Catalogs only carry human-readable names ("Add Comment to Detection",
//! "User IDs"). Tool names and argument names are derived from them so that
//! a catalog entry never has to repeat itself.

use regex::Regex;
use std::sync::LazyLock;

const UNNAMED: &str = "_unnamed_parameter";

static SEPARATORS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\s\-./\\]+").unwrap());
static WORD_BOUNDARY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(.)([A-Z][a-z]+)").unwrap());
static LOWER_UPPER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"([a-z0-9])([A-Z])").unwrap());
static ACRONYM: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"([A-Z]+)([A-Z][a-z])").unwrap());
static UNDERSCORES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"_+").unwrap());
static TRAILING_JUNK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^a-z0-9_]+$").unwrap());

/// Convert CamelCase, PascalCase and space separated names to snake_case.
///
/// `"Add Comment to Detection"` → `add_comment_to_detection`,
/// `"CrowdStrikeFalcon"` → `crowd_strike_falcon`, `"User IDs"` → `user_i_ds`.
pub fn to_snake_case(name: &str) -> String {
    if name.is_empty() {
        return UNNAMED.to_string();
    }

    let stripped: String = name
        .chars()
        .filter(|c| !matches!(c, '(' | ')' | '|' | '\'' | '`' | '\u{2019}' | '"'))
        .collect();
    let stripped = stripped.replace("->", "to");

    let name = SEPARATORS.replace_all(&stripped, "_");
    let name = WORD_BOUNDARY.replace_all(&name, "${1}_${2}");
    let name = LOWER_UPPER.replace_all(&name, "${1}_${2}");
    let name = ACRONYM.replace_all(&name, "${1}_${2}");
    let name = name.to_lowercase();
    let name = name.trim_matches('_');
    let mut name = UNDERSCORES.replace_all(name, "_").into_owned();

    match name.chars().next() {
        None => return UNNAMED.to_string(),
        Some(first) if !first.is_alphabetic() && first != '_' => name.insert(0, '_'),
        Some(_) => {}
    }

    TRAILING_JUNK.replace(&name, "").into_owned()
}

/// Normalize an integration name for matching `--integrations` entries
/// against catalogs: spaces and slashes removed, lowercased.
pub fn normalize_integration_name(name: &str) -> String {
    name.trim()
        .chars()
        .filter(|c| *c != ' ' && *c != '/')
        .collect::<String>()
        .to_lowercase()
}

/// Tool name for an action: `<snake(integration)>_<snake(action)>`.
pub fn tool_name(integration: &str, action: &str) -> String {
    format!("{}_{}", to_snake_case(integration), to_snake_case(action))
}
