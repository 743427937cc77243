//! Nutanix Prism Central v4 REST API module
//!
//! Thin client over the vmm/prism namespaces: paginated inventory listing,
//! ETag retrieval, and the associate-categories action.

pub mod client;
pub mod models;
pub mod pagination;

pub use client::{ApplyOutcome, PrismClient};
pub use models::{CategorySummary, VmSummary};
pub use pagination::fetch_all_pages;

/// VM inventory and actions.
pub const VMS_PATH: &str = "vmm/v4.1/ahv/config/vms";
/// Category catalog.
pub const CATEGORIES_PATH: &str = "prism/v4.0/config/categories";
