//! Serde models for the slices of the v4 API this tool consumes
//!
//! List responses arrive as `{"data": [...], "metadata": {...}}`; only the
//! fields the reconciliation workflow needs are deserialized, the raw JSON
//! is persisted separately for inspection.

use serde::Deserialize;

/// One VM from `vmm/v4.1/ahv/config/vms`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VmSummary {
    pub ext_id: String,
    #[serde(default)]
    pub name: String,
}

/// One category definition from `prism/v4.0/config/categories`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySummary {
    pub ext_id: String,
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub value: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vm_summary_deserializes_from_api_shape() {
        let vm: VmSummary =
            serde_json::from_str(r#"{"extId":"ext-1","name":"web-1","numSockets":2}"#).unwrap();
        assert_eq!(vm.ext_id, "ext-1");
        assert_eq!(vm.name, "web-1");
    }

    #[test]
    fn category_summary_tolerates_missing_value() {
        let cat: CategorySummary = serde_json::from_str(r#"{"extId":"uuid-1","key":"Environment"}"#)
            .unwrap();
        assert_eq!(cat.key, "Environment");
        assert_eq!(cat.value, "");
    }
}
