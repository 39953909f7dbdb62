// starload-core/src/domain/watermark.rs

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::table::Table;

/// Outcome of reading MAX(order id) from a fact table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "state", content = "value")]
pub enum WatermarkProbe {
    /// The fact table does not exist yet: create it and load everything.
    TableMissing,
    /// The table exists but holds no rows.
    Empty,
    At(i64),
}

impl WatermarkProbe {
    pub fn value(self) -> Option<i64> {
        match self {
            WatermarkProbe::At(k) => Some(k),
            _ => None,
        }
    }
}

/// Keeps only the rows whose `order_column` is strictly above the watermark.
/// Rows without an order id cannot be placed and are dropped.
pub fn keep_after(batch: &mut Table, order_column: &str, watermark: WatermarkProbe) {
    if let Some(k) = watermark.value() {
        batch.retain_rows(|r| r.int(order_column).is_some_and(|id| id > k));
    }
}

/// Verdict of the source-vs-warehouse date comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "verdict")]
pub enum Freshness {
    /// No fact table holds any row yet.
    FirstLoad { source: Option<NaiveDate> },
    NewData {
        source: NaiveDate,
        destination: NaiveDate,
    },
    UpToDate {
        source: Option<NaiveDate>,
        destination: NaiveDate,
    },
    /// A comparison query failed; the run proceeds as if there were new data.
    Unknown { reason: String },
}

impl Freshness {
    /// Both sides are expected at day precision.
    pub fn compare(source: Option<NaiveDate>, destination: Option<NaiveDate>) -> Self {
        match (source, destination) {
            (source, None) => Freshness::FirstLoad { source },
            (Some(source), Some(destination)) if source > destination => Freshness::NewData {
                source,
                destination,
            },
            (source, Some(destination)) => Freshness::UpToDate {
                source,
                destination,
            },
        }
    }

    pub fn has_new_data(&self) -> bool {
        !matches!(self, Freshness::UpToDate { .. })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::value::Value;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_keep_after_is_strict() {
        let mut batch = Table::with_rows(
            &["sales_order_id"],
            vec![
                vec![Value::Int(99)],
                vec![Value::Int(100)],
                vec![Value::Int(101)],
                vec![Value::Int(102)],
                vec![Value::Null],
            ],
        );
        keep_after(&mut batch, "sales_order_id", WatermarkProbe::At(100));

        let ids: Vec<Option<i64>> = batch.records().map(|r| r.int("sales_order_id")).collect();
        assert_eq!(ids, vec![Some(101), Some(102)]);
    }

    #[test]
    fn test_missing_or_empty_keeps_everything() {
        let rows = vec![vec![Value::Int(1)], vec![Value::Int(2)]];
        for probe in [WatermarkProbe::TableMissing, WatermarkProbe::Empty] {
            let mut batch = Table::with_rows(&["sales_order_id"], rows.clone());
            keep_after(&mut batch, "sales_order_id", probe);
            assert_eq!(batch.len(), 2);
        }
    }

    #[test]
    fn test_freshness_verdicts() {
        assert!(Freshness::compare(Some(day(2014, 6, 30)), None).has_new_data());
        assert!(Freshness::compare(None, None).has_new_data());
        assert!(Freshness::compare(Some(day(2014, 6, 30)), Some(day(2014, 6, 1))).has_new_data());
        assert!(!Freshness::compare(Some(day(2014, 6, 30)), Some(day(2014, 6, 30))).has_new_data());
        assert!(!Freshness::compare(Some(day(2014, 5, 1)), Some(day(2014, 6, 30))).has_new_data());
        // Empty source never outruns a loaded warehouse
        assert!(!Freshness::compare(None, Some(day(2014, 6, 30))).has_new_data());
        assert!(
            Freshness::Unknown {
                reason: "boom".into()
            }
            .has_new_data()
        );
    }
}
