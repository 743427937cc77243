//! Comparison-key construction for registry and catalog lookups

/// Separator used when joining the two halves of a composite key.
///
/// Contains a control character, so no inventory text (VM names, category
/// keys, UUIDs) can collide across the boundary.
const KEY_SEPARATOR: &str = "\u{1f}::\u{1f}";

/// How keys are compared against the registry and catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseMode {
    /// Compare exactly as entered.
    Sensitive,
    /// Lowercase both sides before comparing.
    Insensitive,
}

impl CaseMode {
    /// Normalize one key component under this mode. Missing values become
    /// the empty string.
    pub fn normalize(&self, value: Option<&str>) -> String {
        let value = value.unwrap_or_default();
        match self {
            CaseMode::Sensitive => value.to_string(),
            CaseMode::Insensitive => value.to_lowercase(),
        }
    }

    /// Build the composite lookup key for a pair of components.
    pub fn composite_key(&self, a: &str, b: &str) -> String {
        format!(
            "{}{}{}",
            self.normalize(Some(a)),
            KEY_SEPARATOR,
            self.normalize(Some(b))
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insensitive_mode_folds_case() {
        let mode = CaseMode::Insensitive;
        assert_eq!(mode.composite_key("VM1", "X1"), mode.composite_key("vm1", "x1"));
    }

    #[test]
    fn sensitive_mode_preserves_case() {
        let mode = CaseMode::Sensitive;
        assert_ne!(mode.composite_key("VM1", "X1"), mode.composite_key("vm1", "x1"));
    }

    #[test]
    fn missing_component_becomes_empty() {
        assert_eq!(CaseMode::Sensitive.normalize(None), "");
        assert_eq!(CaseMode::Insensitive.normalize(None), "");
    }

    #[test]
    fn separator_prevents_boundary_collisions() {
        let mode = CaseMode::Sensitive;
        assert_ne!(mode.composite_key("ab", "c"), mode.composite_key("a", "bc"));
    }
}
