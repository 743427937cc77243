//! Apply command: push reconciled category assignments through the API
//!
//! Mirrors the manual workflow's final step: for every request row the check
//! marked OK, fetch the VM's ETag and POST the associate-categories action,
//! then record the outcome and a timestamp in the workbook. A row whose API
//! calls fail is a row failure, not a run failure: the scan always continues
//! and the workbook keeps every verdict recorded so far.

use std::path::Path;

use anyhow::{Context, Result, bail};
use colored::Colorize;

use crate::api::{ApplyOutcome, PrismClient};
use crate::cli::RunStatus;
use crate::config::Config;
use crate::excel::{self, CellStyle, SheetBuffer, headers, save_workbook};

pub async fn run(
    config: &Config,
    workbook_flag: Option<&Path>,
    dry_run: bool,
) -> Result<RunStatus> {
    let path = config.workbook(workbook_flag)?;
    let mut workbook = excel::open_workbook_buffer(&path)?;

    let sheet = workbook
        .sheet_mut(&config.sheets.requests)
        .with_context(|| format!("Workbook has no sheet named '{}'", config.sheets.requests))?;

    let name_col = sheet
        .column_index(headers::VM_NAME)
        .with_context(|| missing_column(config, headers::VM_NAME))?;
    let ext_id_col = sheet
        .column_index(headers::VM_EXT_ID)
        .with_context(|| missing_column(config, headers::VM_EXT_ID))?;
    let match_col = sheet.column_index(headers::MATCH_STATUS).with_context(|| {
        format!(
            "Sheet '{}' has no '{}' column; run `prism-cli check` first",
            config.sheets.requests,
            headers::MATCH_STATUS
        )
    })?;
    let uuids_col = sheet
        .column_index(headers::CATEGORY_UUIDS)
        .with_context(|| missing_column(config, headers::CATEGORY_UUIDS))?;
    let status_col = sheet.ensure_column(headers::APPLY_STATUS);
    let timestamp_col = sheet.ensure_column(headers::APPLY_TIMESTAMP);

    let client = if dry_run {
        None
    } else {
        Some(PrismClient::new(&config.api_credentials()?)?)
    };

    let mut applied = 0usize;
    let mut failed = 0usize;

    for row in 0..sheet.rows.len() {
        let match_status = sheet.cell(row, match_col).trim().to_string();
        if !match_status.eq_ignore_ascii_case("OK") {
            if !match_status.is_empty() {
                log::debug!("Row {}: match status '{}', skipping", row + 2, match_status);
            }
            continue;
        }

        let vm_name = sheet.cell(row, name_col).trim().to_string();
        let vm_ext_id = sheet.cell(row, ext_id_col).trim().to_string();
        let identifiers: Vec<String> = sheet
            .cell(row, uuids_col)
            .split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .collect();

        if vm_name.is_empty() || vm_ext_id.is_empty() || identifiers.is_empty() {
            println!(
                "Row {}: {} missing VM fields or identifiers, skipping",
                row + 2,
                "skipped".yellow()
            );
            continue;
        }

        if dry_run {
            applied += 1;
            println!(
                "Row {}: {} would associate {} category(ies) with {} ({})",
                row + 2,
                "dry-run".yellow().bold(),
                identifiers.len(),
                vm_name,
                vm_ext_id
            );
            continue;
        }

        let client = client.as_ref().expect("client built for non-dry runs");
        let timestamp = chrono::Local::now().format("%d%m%Y-%H%M").to_string();

        let outcome = apply_one(client, &vm_ext_id, &identifiers).await;
        if let Err(err) = &outcome {
            log::warn!("Row {}: {:#}", row + 2, err);
        }

        let (status, success) =
            record_outcome(sheet, row, status_col, timestamp_col, &timestamp, &outcome);

        if success {
            applied += 1;
            println!(
                "Row {}: {} {} ({}) -> {} category(ies)",
                row + 2,
                status.green().bold(),
                vm_name,
                vm_ext_id,
                identifiers.len()
            );
        } else {
            failed += 1;
            let detail = match &outcome {
                Err(err) => format!(": {:#}", err),
                Ok(_) => String::new(),
            };
            println!(
                "Row {}: {} {} ({}){}",
                row + 2,
                status.red().bold(),
                vm_name,
                vm_ext_id,
                detail
            );
        }
    }

    println!();
    println!(
        "{} {} row(s) applied, {} failed",
        "Summary:".bold(),
        applied,
        failed
    );

    if dry_run {
        println!("{}", "Dry run: no API calls made, workbook not saved".yellow());
    } else {
        save_workbook(&workbook, &path)?;
    }

    Ok(RunStatus::from_all_ok(failed == 0))
}

/// The two API calls for one row. Any failure here (transport error,
/// non-success GET, missing ETag) is returned as an error for the caller to
/// record against the row.
async fn apply_one(
    client: &PrismClient,
    ext_id: &str,
    identifiers: &[String],
) -> Result<ApplyOutcome> {
    let (etag, _body) = client.get_vm(ext_id).await?;
    let Some(etag) = etag else {
        bail!("no ETag returned for VM {}", ext_id);
    };
    client.associate_categories(ext_id, &etag, identifiers).await
}

/// Record one row's apply outcome in the sheet and classify it.
///
/// An `Err` outcome (unreachable VM, HTTP error, missing ETag) becomes a
/// styled `FAILED (error)` cell for that row, never a run abort.
fn record_outcome(
    sheet: &mut SheetBuffer,
    row: usize,
    status_col: usize,
    timestamp_col: usize,
    timestamp: &str,
    outcome: &Result<ApplyOutcome>,
) -> (String, bool) {
    let (status, success) = match outcome {
        Ok(outcome) if outcome.accepted => ("ACCEPTED".to_string(), true),
        Ok(outcome) => (format!("FAILED ({})", outcome.status), false),
        Err(_) => ("FAILED (error)".to_string(), false),
    };

    sheet.set_cell(row, status_col, &status);
    sheet.set_style(
        row,
        status_col,
        if success { CellStyle::Success } else { CellStyle::Failure },
    );
    sheet.set_cell(row, timestamp_col, timestamp);

    (status, success)
}

fn missing_column(config: &Config, column: &str) -> String {
    format!(
        "Sheet '{}' is missing required column '{}'",
        config.sheets.requests, column
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    fn sheet_with_columns() -> (SheetBuffer, usize, usize) {
        let mut sheet = SheetBuffer::new("ToUpdate");
        let status_col = sheet.ensure_column(headers::APPLY_STATUS);
        let timestamp_col = sheet.ensure_column(headers::APPLY_TIMESTAMP);
        (sheet, status_col, timestamp_col)
    }

    #[test]
    fn accepted_outcome_writes_success_status() {
        let (mut sheet, status_col, timestamp_col) = sheet_with_columns();
        let outcome = Ok(ApplyOutcome {
            accepted: true,
            status: 202,
        });

        let (status, success) =
            record_outcome(&mut sheet, 0, status_col, timestamp_col, "28082026-1200", &outcome);

        assert!(success);
        assert_eq!(status, "ACCEPTED");
        assert_eq!(sheet.cell(0, status_col), "ACCEPTED");
        assert_eq!(sheet.style(0, status_col), Some(CellStyle::Success));
        assert_eq!(sheet.cell(0, timestamp_col), "28082026-1200");
    }

    #[test]
    fn rejected_outcome_records_the_status_code() {
        let (mut sheet, status_col, timestamp_col) = sheet_with_columns();
        let outcome = Ok(ApplyOutcome {
            accepted: false,
            status: 409,
        });

        let (status, success) =
            record_outcome(&mut sheet, 1, status_col, timestamp_col, "28082026-1200", &outcome);

        assert!(!success);
        assert_eq!(status, "FAILED (409)");
        assert_eq!(sheet.style(1, status_col), Some(CellStyle::Failure));
    }

    #[test]
    fn api_error_becomes_a_row_failure_not_an_abort() {
        // A VM deleted between check and apply surfaces as an Err from the
        // GET; the row gets a FAILED cell and later rows keep their writes.
        let (mut sheet, status_col, timestamp_col) = sheet_with_columns();
        let error: Result<ApplyOutcome> = Err(anyhow!("GET .../vms/ext-gone returned 404"));

        let (status, success) =
            record_outcome(&mut sheet, 0, status_col, timestamp_col, "28082026-1200", &error);
        assert!(!success);
        assert_eq!(status, "FAILED (error)");
        assert_eq!(sheet.cell(0, status_col), "FAILED (error)");
        assert_eq!(sheet.style(0, status_col), Some(CellStyle::Failure));

        let accepted = Ok(ApplyOutcome {
            accepted: true,
            status: 202,
        });
        record_outcome(&mut sheet, 1, status_col, timestamp_col, "28082026-1201", &accepted);
        assert_eq!(sheet.cell(0, status_col), "FAILED (error)");
        assert_eq!(sheet.cell(1, status_col), "ACCEPTED");
    }
}
