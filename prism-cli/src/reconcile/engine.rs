//! Row reconciliation
//!
//! Single-pass pure evaluation: every request row always produces a
//! `ReconciliationResult`, validation failures are values rather than
//! errors. Only structural problems (handled upstream, in the loaders)
//! abort a run.

use std::collections::HashMap;

use super::key::CaseMode;
use super::parser::parse_spec;
use super::UpdateRequest;

/// Verdict for one request row.
#[derive(Debug, Clone)]
pub struct ReconciliationResult {
    /// Zero-based data row index, carried through to writeback.
    pub row_index: usize,
    pub ok: bool,
    /// De-duplicated, insertion-ordered identifiers for the matched
    /// categories. Cleared for failed rows so re-runs never leave stale
    /// identifiers behind.
    pub resolved_identifiers: Vec<String>,
    /// Human-readable diagnostics, one per failure.
    pub reasons: Vec<String>,
}

/// Reconcile one request row against the prepared indexes.
pub fn reconcile(
    request: &UpdateRequest,
    vm_index: &HashMap<String, usize>,
    category_index: &HashMap<String, Option<String>>,
    mode: CaseMode,
) -> ReconciliationResult {
    let mut reasons = Vec::new();

    let vm_key = mode.composite_key(&request.vm_name, &request.vm_external_id);
    let vm_count = vm_index.get(&vm_key).copied().unwrap_or(0);
    let vm_ok = vm_count == 1;
    match vm_count {
        1 => {}
        0 => reasons.push(format!(
            "VM '{}' with extId '{}' not found in registry",
            request.vm_name, request.vm_external_id
        )),
        n => reasons.push(format!(
            "VM '{}' with extId '{}' is ambiguous: {} registry entries",
            request.vm_name, request.vm_external_id, n
        )),
    }

    let (pairs, parse_failures) = parse_spec(&request.raw_category_spec, mode);
    let mut categories_ok = parse_failures.is_empty();
    reasons.extend(parse_failures);

    if pairs.is_empty() && categories_ok {
        categories_ok = false;
        reasons.push("no categories specified".to_string());
    }

    let mut identifiers: Vec<String> = Vec::new();
    for pair in &pairs {
        match category_index.get(&pair.comparison_key) {
            Some(identifier) => {
                if let Some(id) = identifier {
                    if !identifiers.contains(id) {
                        identifiers.push(id.clone());
                    }
                }
            }
            None => {
                categories_ok = false;
                reasons.push(format!(
                    "category '{}={}' not found in catalog",
                    pair.category, pair.value
                ));
            }
        }
    }

    let ok = vm_ok && categories_ok;
    if !ok {
        identifiers.clear();
    }

    ReconciliationResult {
        row_index: request.row_index,
        ok,
        resolved_identifiers: identifiers,
        reasons,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconcile::{CategoryRecord, VmRecord, build_category_index, build_vm_index};

    fn registry(entries: &[(&str, &str)]) -> Vec<VmRecord> {
        entries
            .iter()
            .map(|(name, ext_id)| VmRecord {
                name: name.to_string(),
                external_id: ext_id.to_string(),
            })
            .collect()
    }

    fn catalog(entries: &[(&str, &str, Option<&str>)]) -> Vec<CategoryRecord> {
        entries
            .iter()
            .map(|(category, value, id)| CategoryRecord {
                category: category.to_string(),
                value: value.to_string(),
                identifier: id.map(str::to_string),
            })
            .collect()
    }

    fn request(name: &str, ext_id: &str, spec: &str) -> UpdateRequest {
        UpdateRequest {
            vm_name: name.to_string(),
            vm_external_id: ext_id.to_string(),
            raw_category_spec: spec.to_string(),
            row_index: 0,
        }
    }

    fn run(
        registry: &[VmRecord],
        catalog: &[CategoryRecord],
        req: &UpdateRequest,
        mode: CaseMode,
    ) -> ReconciliationResult {
        let vm_index = build_vm_index(registry, mode);
        let category_index = build_category_index(catalog, mode);
        reconcile(req, &vm_index, &category_index, mode)
    }

    #[test]
    fn end_to_end_match() {
        let result = run(
            &registry(&[("hard-vm-1", "ext-1")]),
            &catalog(&[("Environment", "Prod", Some("uuid-1"))]),
            &request("hard-vm-1", "ext-1", "Environment=Prod"),
            CaseMode::Insensitive,
        );
        assert!(result.ok);
        assert_eq!(result.resolved_identifiers, vec!["uuid-1"]);
        assert!(result.reasons.is_empty());
    }

    #[test]
    fn case_mode_controls_vm_matching() {
        let reg = registry(&[("VM1", "X1")]);
        let cat = catalog(&[("Environment", "Prod", Some("uuid-1"))]);
        let req = request("vm1", "x1", "Environment=Prod");

        assert!(run(&reg, &cat, &req, CaseMode::Insensitive).ok);

        let sensitive = run(&reg, &cat, &req, CaseMode::Sensitive);
        assert!(!sensitive.ok);
        assert!(sensitive.reasons.iter().any(|r| r.contains("not found")));
    }

    #[test]
    fn duplicate_registry_pair_is_ambiguous_not_missing() {
        let result = run(
            &registry(&[("web-1", "ext-1"), ("web-1", "ext-1")]),
            &catalog(&[("Environment", "Prod", Some("uuid-1"))]),
            &request("web-1", "ext-1", "Environment=Prod"),
            CaseMode::Insensitive,
        );
        assert!(!result.ok);
        assert!(result.reasons.iter().any(|r| r.contains("ambiguous")));
        assert!(!result.reasons.iter().any(|r| r.contains("not found")));
    }

    #[test]
    fn duplicate_catalog_rows_resolve_to_first_identifier() {
        let result = run(
            &registry(&[("web-1", "ext-1")]),
            &catalog(&[
                ("Environment", "Prod", Some("uuid-first")),
                ("Environment", "Prod", Some("uuid-second")),
            ]),
            &request("web-1", "ext-1", "Environment=Prod"),
            CaseMode::Insensitive,
        );
        assert!(result.ok);
        assert_eq!(result.resolved_identifiers, vec!["uuid-first"]);
    }

    #[test]
    fn malformed_fragment_fails_row_but_evaluates_the_rest() {
        let result = run(
            &registry(&[("web-1", "ext-1")]),
            &catalog(&[
                ("Environment", "Prod", Some("uuid-1")),
                ("Owner", "Alice", Some("uuid-2")),
            ]),
            &request("web-1", "ext-1", "Environment, Owner=Alice"),
            CaseMode::Insensitive,
        );
        assert!(!result.ok);
        // Both the malformed fragment and the unknown-category checks ran.
        assert!(result.reasons.iter().any(|r| r.contains("malformed")));
        assert_eq!(result.reasons.len(), 1);
    }

    #[test]
    fn blank_spec_is_never_ok() {
        let result = run(
            &registry(&[("web-1", "ext-1")]),
            &catalog(&[("Environment", "Prod", Some("uuid-1"))]),
            &request("web-1", "ext-1", "   "),
            CaseMode::Insensitive,
        );
        assert!(!result.ok);
        assert!(result.reasons.iter().any(|r| r.contains("no categories")));
    }

    #[test]
    fn unknown_category_records_reason() {
        let result = run(
            &registry(&[("web-1", "ext-1")]),
            &catalog(&[("Environment", "Prod", Some("uuid-1"))]),
            &request("web-1", "ext-1", "Environment=Dev"),
            CaseMode::Insensitive,
        );
        assert!(!result.ok);
        assert!(
            result
                .reasons
                .iter()
                .any(|r| r.contains("'Environment=Dev' not found"))
        );
    }

    #[test]
    fn failed_rows_clear_identifiers() {
        let result = run(
            &registry(&[("web-1", "ext-1")]),
            &catalog(&[("Environment", "Prod", Some("uuid-1"))]),
            &request("web-1", "ext-1", "Environment=Prod, Environment=Dev"),
            CaseMode::Insensitive,
        );
        assert!(!result.ok);
        assert!(result.resolved_identifiers.is_empty());
    }

    #[test]
    fn identifiers_are_deduplicated_in_order() {
        let result = run(
            &registry(&[("web-1", "ext-1")]),
            &catalog(&[
                ("Environment", "Prod", Some("uuid-1")),
                ("Owner", "Alice", Some("uuid-2")),
            ]),
            &request("web-1", "ext-1", "Owner=Alice, Environment=Prod, Owner=Alice"),
            CaseMode::Insensitive,
        );
        assert!(result.ok);
        assert_eq!(result.resolved_identifiers, vec!["uuid-2", "uuid-1"]);
    }

    #[test]
    fn catalog_rows_without_identifier_still_match() {
        let result = run(
            &registry(&[("web-1", "ext-1")]),
            &catalog(&[("Owner", "Alice", None)]),
            &request("web-1", "ext-1", "Owner=Alice"),
            CaseMode::Insensitive,
        );
        assert!(result.ok);
        assert!(result.resolved_identifiers.is_empty());
    }
}
