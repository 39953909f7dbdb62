// starload-core/src/domain/run_log.rs

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::table::Conformed;
use crate::domain::value::Value;

/// Process names written to `etl_log`.
pub mod process {
    pub const DIMENSIONS: &str = "dimensions";
    pub const INTERNET_SALES: &str = "internet_sales";
    pub const RESELLER_SALES: &str = "reseller_sales";
    pub const ETL_RUN: &str = "etl_run";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Success,
    Failed,
    NoNewData,
    Skipped,
}

impl RunStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            RunStatus::Success => "success",
            RunStatus::Failed => "failed",
            RunStatus::NoNewData => "no_new_data",
            RunStatus::Skipped => "skipped",
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunLogEntry {
    pub process_name: String,
    pub run_timestamp: NaiveDateTime,
    pub status: RunStatus,
    pub records_processed: i64,
    pub details: Option<String>,
}

impl RunLogEntry {
    pub fn new(process_name: &str, status: RunStatus, run_timestamp: NaiveDateTime) -> Self {
        Self {
            process_name: process_name.to_string(),
            run_timestamp,
            status,
            records_processed: 0,
            details: None,
        }
    }

    pub fn records(mut self, count: usize) -> Self {
        self.records_processed = i64::try_from(count).unwrap_or(i64::MAX);
        self
    }

    pub fn details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

impl Conformed for RunLogEntry {
    fn into_fields(self) -> Vec<(&'static str, Value)> {
        vec![
            ("process_name", self.process_name.into()),
            ("run_timestamp", self.run_timestamp.into()),
            ("status", self.status.as_str().into()),
            ("records_processed", self.records_processed.into()),
            ("details", self.details.into()),
        ]
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::table::Table;
    use crate::domain::warehouse::catalog;
    use chrono::NaiveDate;

    #[test]
    fn test_entry_matches_log_table() {
        let ts = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        let entry = RunLogEntry::new(process::ETL_RUN, RunStatus::NoNewData, ts)
            .records(0)
            .details("source max 2014-06-30");

        let table = Table::from_records(&catalog::ETL_LOG, [entry]).unwrap();
        let row = table.records().next().unwrap();
        assert_eq!(row.text("status"), "no_new_data");
        assert_eq!(row.text("details"), "source max 2014-06-30");
    }
}
