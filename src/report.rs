use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::ValidationError;
use crate::types::ComparisonRow;

const REPORT_PREFIX: &str = "validation_report";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ReportFormat {
    Csv,
    Yaml,
}

impl ReportFormat {
    pub(crate) const VALUES: [&'static str; 2] = ["csv", "yaml"];

    pub(crate) fn from_name(name: &str) -> Option<Self> {
        match name {
            "csv" => Some(ReportFormat::Csv),
            "yaml" => Some(ReportFormat::Yaml),
            _ => None,
        }
    }

    fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Csv => "csv",
            ReportFormat::Yaml => "yaml",
        }
    }
}

/// One report line, column names as they appear in the written file.
#[derive(Serialize, Debug)]
#[cfg_attr(test, derive(serde::Deserialize, PartialEq))]
struct ReportRecord {
    #[serde(rename = "Field")]
    field: String,
    #[serde(rename = "Config Value")]
    config_value: String,
    #[serde(rename = "CSV Value")]
    reference_value: String,
    #[serde(rename = "Interface")]
    interface: Option<String>,
    #[serde(rename = "Match Status")]
    status: String,
}

impl From<&ComparisonRow> for ReportRecord {
    fn from(row: &ComparisonRow) -> Self {
        Self {
            field: row.field.to_string(),
            config_value: row.config_value.clone(),
            reference_value: row.reference_value.clone(),
            interface: row.interface.clone(),
            status: row.status.to_string(),
        }
    }
}

/// Report location derived from the device hostname, e.g. `<dir>/validation_report_R1.csv`.
pub(crate) fn report_path(dir: &Path, hostname: &str, format: ReportFormat) -> PathBuf {
    let hostname = hostname.replace(['/', '\\'], "_");

    dir.join(format!("{REPORT_PREFIX}_{hostname}.{}", format.extension()))
}

pub(crate) fn write_report(
    path: &Path,
    rows: &[ComparisonRow],
    format: ReportFormat,
) -> Result<(), ValidationError> {
    let io_error = |source| ValidationError::Io {
        path: path.to_path_buf(),
        source,
    };

    let file = fs::File::create(path).map_err(io_error)?;
    let records: Vec<ReportRecord> = rows.iter().map(ReportRecord::from).collect();

    match format {
        ReportFormat::Csv => write_csv(file, &records).map_err(io_error),
        ReportFormat::Yaml => serde_yaml::to_writer(file, &records)
            .map_err(|e| io_error(std::io::Error::other(e))),
    }
}

fn write_csv<W: Write>(writer: W, records: &[ReportRecord]) -> Result<(), std::io::Error> {
    let mut writer = csv::Writer::from_writer(writer);

    for record in records {
        writer.serialize(record)?;
    }

    writer.flush()
}
