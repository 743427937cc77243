//! Fetch command: pull VM and category inventory from Prism Central
//!
//! Persists the concatenated raw JSON for inspection and refreshes the
//! workbook's reference sheets. The editable sheet is never touched beyond
//! creating it (with headers) in a brand-new workbook.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;
use serde_json::Value;

use crate::api::{self, CategorySummary, PrismClient, VmSummary, fetch_all_pages};
use crate::cli::RunStatus;
use crate::config::Config;
use crate::excel::{self, SheetBuffer, WorkbookBuffer, headers, save_workbook};

pub async fn run(
    config: &Config,
    out_dir: &Path,
    limit: usize,
    workbook_flag: Option<&Path>,
) -> Result<RunStatus> {
    let client = PrismClient::new(&config.api_credentials()?)?;

    let raw_vms = fetch_all_pages(&client, api::VMS_PATH, limit).await?;
    let raw_categories = fetch_all_pages(&client, api::CATEGORIES_PATH, limit).await?;

    fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create output directory: {}", out_dir.display()))?;
    persist_json(&raw_vms, &out_dir.join("vms.json"))?;
    persist_json(&raw_categories, &out_dir.join("categories.json"))?;

    let vms = parse_items::<VmSummary>(&raw_vms, "VM");
    let categories = parse_items::<CategorySummary>(&raw_categories, "category");

    println!(
        "Fetched {} VM(s) and {} category definition(s)",
        vms.len().to_string().bold(),
        categories.len().to_string().bold()
    );

    // Workbook refresh is optional: without a configured workbook the JSON
    // inventory is still useful on its own.
    match config.workbook(workbook_flag) {
        Ok(path) => {
            refresh_workbook(config, &path, &vms, &categories)?;
            println!("Reference sheets refreshed in {}", path.display());
        }
        Err(_) => {
            log::info!("No workbook configured, skipping reference sheet refresh");
        }
    }

    Ok(RunStatus::Clean)
}

fn persist_json(items: &[Value], path: &Path) -> Result<()> {
    let body = serde_json::to_string_pretty(items).context("Failed to serialize inventory")?;
    fs::write(path, body).with_context(|| format!("Failed to write {}", path.display()))?;
    log::info!("Wrote {} item(s) to {}", items.len(), path.display());
    Ok(())
}

fn parse_items<T: serde::de::DeserializeOwned>(items: &[Value], kind: &str) -> Vec<T> {
    items
        .iter()
        .filter_map(|item| match serde_json::from_value(item.clone()) {
            Ok(parsed) => Some(parsed),
            Err(err) => {
                log::warn!("Skipping malformed {} entry: {}", kind, err);
                None
            }
        })
        .collect()
}

fn refresh_workbook(
    config: &Config,
    path: &Path,
    vms: &[VmSummary],
    categories: &[CategorySummary],
) -> Result<()> {
    let mut workbook = if path.exists() {
        excel::open_workbook_buffer(path)?
    } else {
        WorkbookBuffer::default()
    };

    let mut vms_sheet = SheetBuffer::new(&config.sheets.vms);
    vms_sheet.headers = vec![headers::VM_NAME.to_string(), headers::VM_EXT_ID.to_string()];
    vms_sheet.rows = vms
        .iter()
        .map(|vm| vec![vm.name.clone(), vm.ext_id.clone()])
        .collect();
    workbook.replace_sheet(vms_sheet);

    let mut categories_sheet = SheetBuffer::new(&config.sheets.categories);
    categories_sheet.headers = vec![
        headers::CATEGORY.to_string(),
        headers::VALUE.to_string(),
        headers::CATEGORY_EXT_ID.to_string(),
    ];
    categories_sheet.rows = categories
        .iter()
        .map(|cat| vec![cat.key.clone(), cat.value.clone(), cat.ext_id.clone()])
        .collect();
    workbook.replace_sheet(categories_sheet);

    let requests = workbook.ensure_sheet(&config.sheets.requests);
    if requests.headers.is_empty() {
        requests.headers = vec![
            headers::VM_NAME.to_string(),
            headers::VM_EXT_ID.to_string(),
            headers::CATEGORY_SPEC.to_string(),
        ];
    }

    save_workbook(&workbook, path)
}
