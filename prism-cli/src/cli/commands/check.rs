//! Check command: reconcile the editable sheet and write verdicts back

use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;

use crate::cli::RunStatus;
use crate::config::Config;
use crate::excel::{self, headers, save_workbook, write_result};
use crate::reconcile::{build_category_index, build_vm_index, reconcile};

pub fn run(
    config: &Config,
    workbook_flag: Option<&Path>,
    dry_run: bool,
    case_sensitive: bool,
) -> Result<RunStatus> {
    let path = config.workbook(workbook_flag)?;
    let mode = config.case_mode(case_sensitive);
    log::info!("Checking workbook {} ({:?})", path.display(), mode);

    let mut workbook = excel::open_workbook_buffer(&path)?;

    let registry = {
        let sheet = workbook.sheet(&config.sheets.vms).with_context(|| {
            format!("Workbook has no sheet named '{}'", config.sheets.vms)
        })?;
        excel::load_registry(sheet)?
    };
    let catalog = {
        let sheet = workbook.sheet(&config.sheets.categories).with_context(|| {
            format!("Workbook has no sheet named '{}'", config.sheets.categories)
        })?;
        excel::load_catalog(sheet)?
    };
    let requests = {
        let sheet = workbook.sheet(&config.sheets.requests).with_context(|| {
            format!("Workbook has no sheet named '{}'", config.sheets.requests)
        })?;
        excel::load_requests(sheet)?
    };

    let vm_index = build_vm_index(&registry, mode);
    let category_index = build_category_index(&catalog, mode);

    let sheet = workbook
        .sheet_mut(&config.sheets.requests)
        .with_context(|| format!("Workbook has no sheet named '{}'", config.sheets.requests))?;
    let status_col = sheet.ensure_column(headers::MATCH_STATUS);
    let identifier_col = sheet.ensure_column(headers::CATEGORY_UUIDS);

    let mut checked = 0usize;
    let mut failed = 0usize;

    for request in &requests {
        if request.is_blank() {
            continue;
        }
        checked += 1;

        let result = reconcile(request, &vm_index, &category_index, mode);
        let sheet_row = request.row_index + 2; // 1-based, after the header

        if result.ok {
            println!(
                "Row {}: {} {} ({}) -> {}",
                sheet_row,
                "OK".green().bold(),
                request.vm_name,
                request.vm_external_id,
                result.resolved_identifiers.join(", ")
            );
        } else {
            failed += 1;
            println!(
                "Row {}: {} {} ({}): {}",
                sheet_row,
                "Mismatch".red().bold(),
                request.vm_name,
                request.vm_external_id,
                result.reasons.join("; ")
            );
        }

        write_result(sheet, &result, status_col, Some(identifier_col));
    }

    println!();
    if failed == 0 {
        println!(
            "{} {} row(s) checked, all matched",
            "Summary:".bold(),
            checked
        );
    } else {
        println!(
            "{} {} row(s) checked, {} mismatched",
            "Summary:".bold(),
            checked,
            failed.to_string().red()
        );
    }

    if dry_run {
        println!("{}", "Dry run: workbook not saved".yellow());
        log::info!("Dry run enabled, skipping save of {}", path.display());
    } else {
        save_workbook(&workbook, &path)?;
    }

    Ok(RunStatus::from_all_ok(failed == 0))
}
