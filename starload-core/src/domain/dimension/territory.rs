// starload-core/src/domain/dimension/territory.rs

use chrono::NaiveDate;

use crate::domain::error::DomainError;
use crate::domain::table::{Conformed, Table};
use crate::domain::value::{Value, round_to};

pub const ENTITY: &str = "territory";

pub const REQUIRED_COLUMNS: &[&str] = &[
    "TerritoryID",
    "Name",
    "CountryRegionCode",
    "Group",
    "SalesYTD",
    "SalesLastYear",
    "CostYTD",
    "CostLastYear",
];

#[derive(Debug, Clone, PartialEq)]
pub struct TerritoryRow {
    pub territory_id: Option<i64>,
    pub territory_name: String,
    pub country_region_code: String,
    pub region_group: String,
    pub sales_ytd: Option<f64>,
    pub sales_last_year: Option<f64>,
    pub cost_ytd: Option<f64>,
    pub cost_last_year: Option<f64>,
    pub ytd_profit: Option<f64>,
    pub last_year_profit: Option<f64>,
    pub sales_growth: Option<f64>,
    pub saved_date: NaiveDate,
}

impl Conformed for TerritoryRow {
    fn into_fields(self) -> Vec<(&'static str, Value)> {
        vec![
            ("territory_id", self.territory_id.into()),
            ("territory_name", self.territory_name.into()),
            ("country_region_code", self.country_region_code.into()),
            ("region_group", self.region_group.into()),
            ("sales_ytd", self.sales_ytd.into()),
            ("sales_last_year", self.sales_last_year.into()),
            ("cost_ytd", self.cost_ytd.into()),
            ("cost_last_year", self.cost_last_year.into()),
            ("ytd_profit", self.ytd_profit.into()),
            ("last_year_profit", self.last_year_profit.into()),
            ("sales_growth", self.sales_growth.into()),
            ("saved_date", self.saved_date.into()),
        ]
    }
}

/// Year-over-year growth in percent. Undefined without prior-year sales.
pub fn sales_growth(ytd: Option<f64>, last_year: Option<f64>) -> Option<f64> {
    match (ytd, last_year) {
        (Some(ytd), Some(prev)) if prev != 0.0 => Some(round_to((ytd - prev) / prev * 100.0, 2)),
        _ => None,
    }
}

fn difference(a: Option<f64>, b: Option<f64>) -> Option<f64> {
    Some(a? - b?)
}

pub fn build(raw: &Table, today: NaiveDate) -> Result<Vec<TerritoryRow>, DomainError> {
    raw.require_columns(ENTITY, REQUIRED_COLUMNS)?;

    Ok(raw
        .records()
        .map(|r| {
            let sales_ytd = r.float("SalesYTD");
            let sales_last_year = r.float("SalesLastYear");
            let cost_ytd = r.float("CostYTD");
            let cost_last_year = r.float("CostLastYear");

            TerritoryRow {
                territory_id: r.int("TerritoryID"),
                territory_name: r.text("Name"),
                country_region_code: r.text("CountryRegionCode"),
                region_group: r.text("Group"),
                sales_ytd,
                sales_last_year,
                cost_ytd,
                cost_last_year,
                ytd_profit: difference(sales_ytd, cost_ytd),
                last_year_profit: difference(sales_last_year, cost_last_year),
                sales_growth: sales_growth(sales_ytd, sales_last_year),
                saved_date: today,
            }
        })
        .collect())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_sales_growth() {
        assert_eq!(sales_growth(Some(150.0), Some(120.0)), Some(25.0));
        assert_eq!(sales_growth(Some(100.0), Some(300.0)), Some(-66.67));
        assert_eq!(sales_growth(Some(100.0), Some(0.0)), None);
        assert_eq!(sales_growth(None, Some(10.0)), None);
    }

    #[test]
    fn test_build_territory() {
        let table = Table::with_rows(
            REQUIRED_COLUMNS,
            vec![vec![
                Value::Int(1),
                "Northwest".into(),
                "US".into(),
                "North America".into(),
                Value::Float(7_887_186.79),
                Value::Float(3_298_694.49),
                Value::Float(0.0),
                Value::Float(0.0),
            ]],
        );
        let rows = build(&table, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()).unwrap();

        let row = &rows[0];
        assert_eq!(row.region_group, "North America");
        assert_eq!(row.ytd_profit, Some(7_887_186.79));
        assert_eq!(row.sales_growth, Some(139.1));
    }
}
