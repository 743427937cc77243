// Reconciliation core: matching human-entered category requests against the
// VM registry and category catalog.
//
// Everything in this module is pure business logic, decoupled from the
// workbook and API layers so it can be tested without either.

pub mod engine;
pub mod index;
pub mod key;
pub mod parser;

pub use engine::{ReconciliationResult, reconcile};
pub use index::{build_category_index, build_vm_index};
pub use key::CaseMode;

/// One VM as known to the registry. The (name, external_id) pair is not
/// guaranteed unique in the source data; duplication is detected later.
#[derive(Debug, Clone)]
pub struct VmRecord {
    pub name: String,
    pub external_id: String,
}

/// One category key=value definition from the catalog, with its resolvable
/// backend identifier when the catalog row carries one.
#[derive(Debug, Clone)]
pub struct CategoryRecord {
    pub category: String,
    pub value: String,
    pub identifier: Option<String>,
}

/// One human-entered row awaiting reconciliation. `raw_category_spec` is the
/// unparsed free-text cell.
#[derive(Debug, Clone)]
pub struct UpdateRequest {
    pub vm_name: String,
    pub vm_external_id: String,
    pub raw_category_spec: String,
    /// Zero-based data row index in the request sheet (header excluded).
    pub row_index: usize,
}

impl UpdateRequest {
    /// Rows with every field blank are skipped entirely, not reconciled.
    pub fn is_blank(&self) -> bool {
        self.vm_name.trim().is_empty()
            && self.vm_external_id.trim().is_empty()
            && self.raw_category_spec.trim().is_empty()
    }
}
