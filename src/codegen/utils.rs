//! Naming conventions for generated artifacts.
//!
//! Every directory, file stem and identifier derived from a model name goes
//! through these functions, so renaming rules live in exactly one place.

use crate::codegen::ir::ModelNames;
use convert_case::{Case, Casing};
use regex::Regex;
use std::sync::OnceLock;

fn case_boundary() -> &'static Regex {
    static BOUNDARY: OnceLock<Regex> = OnceLock::new();
    BOUNDARY.get_or_init(|| Regex::new("([a-z])([A-Z])").expect("static pattern"))
}

/// Convert a model name to its directory/file-safe form.
///
/// A hyphen is inserted at each lowercase-to-uppercase boundary, then the
/// whole name is lowercased: `UserProfile` -> `user-profile`.
pub fn to_kebab_name(name: &str) -> String {
    case_boundary()
        .replace_all(name, "$1-$2")
        .to_lowercase()
}

/// Uppercase the first character only (`userProfile` -> `UserProfile`)
pub fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Lowercase the first character only (`UserProfile` -> `userProfile`)
pub fn camel_initial(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Convert an action name to PascalCase (`reset_password` -> `ResetPassword`)
pub fn to_pascal_case(s: &str) -> String {
    s.to_case(Case::Pascal)
}

/// Resolve every derived name of a model at once
pub fn model_names(name: &str) -> ModelNames {
    ModelNames {
        canonical: name.to_string(),
        class_name: capitalize_first(name),
        value_name: camel_initial(name),
        file_stem: to_kebab_name(name),
    }
}

/// Escape a string for use inside a single-quoted TypeScript literal
pub fn escape_ts_string(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('\'', "\\'")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t")
}

/// Render a single-quoted TypeScript string literal
pub fn ts_string_literal(s: &str) -> String {
    format!("'{}'", escape_ts_string(s))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kebab_name() {
        assert_eq!(to_kebab_name("UserProfile"), "user-profile");
        assert_eq!(to_kebab_name("user"), "user");
        assert_eq!(to_kebab_name("Post"), "post");
        assert_eq!(to_kebab_name("orderLineItem"), "order-line-item");
    }

    #[test]
    fn test_kebab_name_is_deterministic() {
        let first = to_kebab_name("UserProfile");
        let second = to_kebab_name("UserProfile");
        assert_eq!(first, second);
    }

    #[test]
    fn test_display_forms() {
        assert_eq!(capitalize_first("userProfile"), "UserProfile");
        assert_eq!(capitalize_first(""), "");
        assert_eq!(camel_initial("UserProfile"), "userProfile");
        assert_eq!(to_pascal_case("reset_password"), "ResetPassword");
        assert_eq!(to_pascal_case("create"), "Create");
    }

    #[test]
    fn test_model_names() {
        let names = model_names("userProfile");
        assert_eq!(names.canonical, "userProfile");
        assert_eq!(names.class_name, "UserProfile");
        assert_eq!(names.value_name, "userProfile");
        assert_eq!(names.file_stem, "user-profile");
    }

    #[test]
    fn test_escape_ts_string() {
        assert_eq!(escape_ts_string("it's"), "it\\'s");
        assert_eq!(escape_ts_string("a\\d+"), "a\\\\d+");
        assert_eq!(ts_string_literal("line\nbreak"), "'line\\nbreak'");
    }
}
