// Workbook layer: an in-memory buffer model plus the calamine/rust_xlsxwriter
// adapters around it.
//
// The xlsx stack here cannot edit a file in place, so a run loads every sheet
// into a WorkbookBuffer up front, mutates the buffer, and rewrites the whole
// file at save time. Dry runs simply skip the save.

pub mod reader;
pub mod workbook;
pub mod writer;

pub use reader::{load_catalog, load_registry, load_requests, open_workbook_buffer};
pub use workbook::{CellStyle, SheetBuffer, WorkbookBuffer};
pub use writer::{save_workbook, write_result};

/// Column header labels shared by the reader and writeback engine.
pub mod headers {
    pub const VM_NAME: &str = "VM Name";
    pub const VM_EXT_ID: &str = "VM extId";
    pub const CATEGORY: &str = "Category";
    pub const VALUE: &str = "Value";
    /// The catalog identifier column appears in the wild under both spellings.
    pub const CATEGORY_EXT_ID: &str = "extID";
    pub const CATEGORY_EXT_ID_ALT: &str = "extId";
    pub const CATEGORY_SPEC: &str = "UPDATE WITH CATEGORIES";
    pub const MATCH_STATUS: &str = "VM Name/extId & Category exId(s) Match";
    pub const CATEGORY_UUIDS: &str = "Category UUID(s)";
    pub const APPLY_STATUS: &str = "STATUS OF UPDATE";
    pub const APPLY_TIMESTAMP: &str = "TIMESTAMP";
}

/// Default sheet names, overridable from the config file.
pub mod sheets {
    pub const VMS: &str = "VMs";
    pub const CATEGORIES: &str = "Categories";
    pub const REQUESTS: &str = "ToUpdate";
}
