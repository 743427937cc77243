//! Parser for the free-text category spec cell
//!
//! The editable sheet holds one cell per row of the form
//! `"Category=Value, Category=Value, ..."`. Fragments are comma-separated;
//! malformed fragments are collected as failures, never short-circuited.

use super::key::CaseMode;

/// One parsed `Category=Value` fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryPair {
    pub category: String,
    pub value: String,
    /// Precomputed catalog lookup key.
    pub comparison_key: String,
}

/// Parse a raw category spec into pairs plus per-fragment failure reasons.
///
/// Splits on commas, trims fragments, drops empty ones. Each fragment must
/// contain `=`; the split is on the *first* `=` only, so values may
/// themselves contain `=` (`Owner=a=b` parses to value `a=b`). A fragment
/// without `=` produces a failure reason for that fragment while the rest of
/// the spec is still parsed. A blank spec yields no pairs and no failures;
/// the reconciler treats the absence of pairs as a row failure.
pub fn parse_spec(raw: &str, mode: CaseMode) -> (Vec<CategoryPair>, Vec<String>) {
    let mut pairs = Vec::new();
    let mut failures = Vec::new();

    for fragment in raw.split(',') {
        let fragment = fragment.trim();
        if fragment.is_empty() {
            continue;
        }

        match fragment.split_once('=') {
            Some((category, value)) => {
                let category = category.trim();
                let value = value.trim();
                pairs.push(CategoryPair {
                    category: category.to_string(),
                    value: value.to_string(),
                    comparison_key: mode.composite_key(category, value),
                });
            }
            None => {
                failures.push(format!(
                    "malformed fragment '{}': expected Category=Value",
                    fragment
                ));
            }
        }
    }

    (pairs, failures)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tolerates_whitespace_around_fragments() {
        let (pairs, failures) = parse_spec(" Environment = Prod , Owner=Alice ", CaseMode::Sensitive);
        assert!(failures.is_empty());
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].category, "Environment");
        assert_eq!(pairs[0].value, "Prod");
        assert_eq!(pairs[1].category, "Owner");
        assert_eq!(pairs[1].value, "Alice");
    }

    #[test]
    fn fragment_without_equals_is_a_failure_not_an_abort() {
        let (pairs, failures) = parse_spec("Environment, Owner=Alice", CaseMode::Sensitive);
        assert_eq!(failures.len(), 1);
        assert!(failures[0].contains("Environment"));
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].category, "Owner");
    }

    #[test]
    fn splits_on_first_equals_only() {
        let (pairs, failures) = parse_spec("Tier=A=B", CaseMode::Sensitive);
        assert!(failures.is_empty());
        assert_eq!(pairs[0].category, "Tier");
        assert_eq!(pairs[0].value, "A=B");
    }

    #[test]
    fn blank_input_yields_nothing() {
        let (pairs, failures) = parse_spec("   ", CaseMode::Insensitive);
        assert!(pairs.is_empty());
        assert!(failures.is_empty());
    }

    #[test]
    fn empty_fragments_are_dropped() {
        let (pairs, failures) = parse_spec("Environment=Prod,, ,Owner=Alice", CaseMode::Sensitive);
        assert!(failures.is_empty());
        assert_eq!(pairs.len(), 2);
    }

    #[test]
    fn comparison_key_follows_case_mode() {
        let (insensitive, _) = parse_spec("ENV=PROD", CaseMode::Insensitive);
        let (sensitive, _) = parse_spec("ENV=PROD", CaseMode::Sensitive);
        assert_eq!(
            insensitive[0].comparison_key,
            CaseMode::Insensitive.composite_key("env", "prod")
        );
        assert_ne!(insensitive[0].comparison_key, sensitive[0].comparison_key);
    }
}
