use std::path::{Path, PathBuf};

use anyhow::Context;
use log::{debug, info, warn};

use crate::extract::{extract, read_text};
use crate::reconcile::{excluded_fields, reconcile, ReconcileSummary};
use crate::reference::{normalize, read_table, unmapped_keys};
use crate::report::{report_path, write_report, ReportFormat};
use crate::types::DeviceRecord;

/// Validate a device configuration against its reference template and store the report.
///
/// The report is written into `output_dir`, or next to the configuration file when no
/// directory is given. Returns the report path.
pub(crate) fn validate(
    config_file: &str,
    reference_file: &str,
    output_dir: Option<&str>,
    format: ReportFormat,
) -> Result<PathBuf, anyhow::Error> {
    let record = load_record(config_file)?;

    info!("Reading reference template {reference_file:?}...");
    let rows = read_table(Path::new(reference_file)).context("Reading reference template")?;

    for key in unmapped_keys(&rows[0]) {
        debug!("Skipped unmapped reference variable '{key}'");
    }

    let reference = normalize(&rows).context("Normalizing reference template")?;
    debug!("Normalized reference: {reference:?}");

    for (interface, key) in excluded_fields(&record) {
        warn!("Not comparing '{key}' on interface '{interface}': field is excluded from validation");
    }

    let results = reconcile(&record, &reference);
    let summary = ReconcileSummary::from_rows(&results);

    let dir = match output_dir {
        Some(dir) => PathBuf::from(dir),
        None => Path::new(config_file)
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default(),
    };
    let destination = report_path(&dir, &record.hostname, format);

    write_report(&destination, &results, format).context("Storing validation report")?;

    info!(
        "Compared {} fields: {} matched, {} mismatched",
        results.len(),
        summary.matched,
        summary.mismatched
    );

    Ok(destination)
}

/// Parse a device configuration and render the extracted record as YAML.
pub(crate) fn extract_record(config_file: &str) -> Result<String, anyhow::Error> {
    let record = load_record(config_file)?;

    serde_yaml::to_string(&record).context("Serializing device record")
}

fn load_record(config_file: &str) -> Result<DeviceRecord, anyhow::Error> {
    info!("Reading device config {config_file:?}...");
    let text = read_text(Path::new(config_file)).context("Reading device config")?;

    let record = extract(&text);
    info!(
        "Identified device '{}' with {} supported interfaces",
        record.hostname,
        record.interfaces.len()
    );
    debug!("Extracted device record: {record:?}");

    Ok(record)
}
