//! Lookup indexes built from the reference tables
//!
//! Both builders are pure: they take the loaded records and return owned
//! maps, constructed once per run and passed explicitly to the reconciler.

use std::collections::HashMap;

use super::key::CaseMode;
use super::{CategoryRecord, VmRecord};

/// Count registry occurrences per (name, extId) composite key.
///
/// The count is the sole uniqueness signal: absent/zero means not found,
/// 1 means unique, more means the pair is ambiguous. Records with both
/// fields blank are skipped.
pub fn build_vm_index(records: &[VmRecord], mode: CaseMode) -> HashMap<String, usize> {
    let mut counts = HashMap::new();
    for record in records {
        if record.name.trim().is_empty() && record.external_id.trim().is_empty() {
            continue;
        }
        let key = mode.composite_key(&record.name, &record.external_id);
        *counts.entry(key).or_insert(0) += 1;
    }
    counts
}

/// Map each (category, value) composite key to its backend identifier.
///
/// First occurrence wins: the catalog is assumed to list each pair once, but
/// duplicates must neither crash nor overwrite. Rows with both fields blank
/// are skipped.
pub fn build_category_index(
    records: &[CategoryRecord],
    mode: CaseMode,
) -> HashMap<String, Option<String>> {
    let mut identifiers = HashMap::new();
    for record in records {
        if record.category.trim().is_empty() && record.value.trim().is_empty() {
            continue;
        }
        let key = mode.composite_key(&record.category, &record.value);
        identifiers
            .entry(key)
            .or_insert_with(|| record.identifier.clone());
    }
    identifiers
}
