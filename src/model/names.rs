//! Name Resolution
//!
//! Canonical names for schemas, synthetic types and members:
//! - safe names (runs of `-`, `_` and spaces collapse to `_`)
//! - case conversion shared by every backend
//! - collision handling with numeric suffixes
//!
//! Language-specific escaping lives with the generators.

use std::collections::HashSet;

/// Replace runs of `-`, `_` and spaces with a single `_`, and drop any
/// remaining character that cannot appear in an identifier.
pub fn safe_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_separator = false;
    for c in name.chars() {
        if c == '-' || c == '_' || c == ' ' {
            if !in_separator {
                out.push('_');
            }
            in_separator = true;
        } else if c.is_alphanumeric() {
            out.push(c);
            in_separator = false;
        } else {
            in_separator = false;
        }
    }
    out
}

/// Whether a name needs quoting or renaming to be an identifier
pub fn is_special_name(name: &str) -> bool {
    safe_name(name) != name || name.chars().next().map_or(true, |c| c.is_ascii_digit())
}

fn words(name: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;
    for c in name.chars() {
        if !c.is_alphanumeric() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev_lower = false;
            continue;
        }
        if c.is_uppercase() && prev_lower && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        prev_lower = c.is_lowercase() || c.is_ascii_digit();
        current.push(c);
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

/// Upper-case the first character, keep the rest as written
fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().chain(chars).collect(),
    }
}

/// `board_section` -> `BoardSection`
pub fn title_case(name: &str) -> String {
    words(name).iter().map(|w| capitalize(w)).collect()
}

/// `board_section` -> `boardSection`
pub fn camel_case(name: &str) -> String {
    let title = title_case(name);
    let mut chars = title.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_lowercase().chain(chars).collect(),
    }
}

/// `BoardSection` -> `board_section`
pub fn snake_case(name: &str) -> String {
    words(name)
        .iter()
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join("_")
}

// =============================================================================
// Name Registry
// =============================================================================

/// Tracks canonical names in use and hands out unique ones.
///
/// A collision appends the smallest free numeric suffix, so registration
/// order alone determines the outcome.
#[derive(Debug, Default, Clone)]
pub struct NameRegistry {
    taken: HashSet<String>,
}

impl NameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.taken.contains(name)
    }

    /// Reserve `name` exactly. Returns false if it was already taken.
    pub fn reserve(&mut self, name: &str) -> bool {
        self.taken.insert(name.to_string())
    }

    /// Reserve `base`, or `base1`, `base2`, ... whichever is free first
    pub fn unique(&mut self, base: &str) -> String {
        if self.taken.insert(base.to_string()) {
            return base.to_string();
        }
        let mut suffix = 1usize;
        loop {
            let candidate = format!("{}{}", base, suffix);
            if self.taken.insert(candidate.clone()) {
                return candidate;
            }
            suffix += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_name() {
        assert_eq!(safe_name("hello-world"), "hello_world");
        assert_eq!(safe_name("a -_ b"), "a_b");
        assert_eq!(safe_name("Look"), "Look");
        assert_eq!(safe_name("query.id"), "queryid");
    }

    #[test]
    fn test_special_names() {
        assert!(is_special_name("foo-bar"));
        assert!(is_special_name("1st"));
        assert!(!is_special_name("foo_bar"));
    }

    #[test]
    fn test_case_conversion() {
        assert_eq!(title_case("board_section"), "BoardSection");
        assert_eq!(title_case("BoardSection"), "BoardSection");
        assert_eq!(camel_case("look_id"), "lookId");
        assert_eq!(snake_case("BoardSection"), "board_section");
        assert_eq!(snake_case("look_id"), "look_id");
        assert_eq!(title_case("create-dashboard body"), "CreateDashboardBody");
    }

    #[test]
    fn test_unique_suffixes() {
        let mut names = NameRegistry::new();
        assert_eq!(names.unique("Thing"), "Thing");
        assert_eq!(names.unique("Thing"), "Thing1");
        assert_eq!(names.unique("Thing"), "Thing2");
        assert!(names.contains("Thing1"));
        assert!(!names.reserve("Thing"));
    }
}
