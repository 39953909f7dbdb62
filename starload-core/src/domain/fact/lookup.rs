// starload-core/src/domain/fact/lookup.rs

use std::collections::HashMap;

use crate::domain::error::DomainError;
use crate::domain::table::Table;
use crate::domain::value::{NaturalKey, Value};
use crate::domain::warehouse::TableSchema;

/// Natural key -> surrogate key index over one persisted dimension.
///
/// When the dimension holds a natural key more than once, the highest
/// surrogate key (the latest insert) wins, so a fact line resolves to at most
/// one row.
#[derive(Debug, Clone, Default)]
pub struct DimensionLookup {
    keys: HashMap<NaturalKey, i64>,
    attribute: HashMap<i64, f64>,
}

impl DimensionLookup {
    /// Indexes `table` (read back from the warehouse) by the schema's first
    /// natural key column.
    pub fn from_table(schema: &TableSchema, table: &Table) -> Result<Self, DomainError> {
        Self::build(schema, table, None)
    }

    /// Same as [`from_table`](Self::from_table), also keeping one numeric
    /// attribute per surrogate key (e.g. the product standard cost).
    pub fn with_attribute(
        schema: &TableSchema,
        table: &Table,
        attribute: &str,
    ) -> Result<Self, DomainError> {
        Self::build(schema, table, Some(attribute))
    }

    fn build(
        schema: &TableSchema,
        table: &Table,
        attribute: Option<&str>,
    ) -> Result<Self, DomainError> {
        let surrogate = schema
            .surrogate_key()
            .ok_or_else(|| DomainError::UnknownTable(schema.name.to_string()))?
            .name;
        let natural = schema
            .natural_key
            .first()
            .copied()
            .ok_or_else(|| DomainError::UnknownTable(schema.name.to_string()))?;

        let mut required = vec![surrogate, natural];
        required.extend(attribute);
        table.require_columns(schema.name, &required)?;

        let mut lookup = DimensionLookup::default();
        for record in table.records() {
            let (Some(nk), Some(sk)) = (
                NaturalKey::from_value(record.get(natural)),
                record.int(surrogate),
            ) else {
                continue;
            };

            let entry = lookup.keys.entry(nk).or_insert(sk);
            if sk > *entry {
                *entry = sk;
            }
            if let Some(value) = attribute.and_then(|a| record.float(a)) {
                lookup.attribute.insert(sk, value);
            }
        }
        Ok(lookup)
    }

    pub fn resolve(&self, natural: &Value) -> Option<i64> {
        NaturalKey::from_value(natural).and_then(|k| self.keys.get(&k).copied())
    }

    pub fn attribute(&self, surrogate: i64) -> Option<f64> {
        self.attribute.get(&surrogate).copied()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::warehouse::catalog;
    use chrono::NaiveDate;

    #[test]
    fn test_duplicate_natural_key_keeps_highest_surrogate() {
        let table = Table::with_rows(
            &["product_key", "product_id", "standard_cost"],
            vec![
                vec![Value::Int(3), Value::Int(771), Value::Float(10.0)],
                vec![Value::Int(9), Value::Int(771), Value::Float(12.0)],
                vec![Value::Int(5), Value::Int(771), Value::Float(11.0)],
            ],
        );
        let lookup =
            DimensionLookup::with_attribute(&catalog::DIM_PRODUCT, &table, "standard_cost")
                .unwrap();

        assert_eq!(lookup.len(), 1);
        assert_eq!(lookup.resolve(&Value::Int(771)), Some(9));
        assert_eq!(lookup.attribute(9), Some(12.0));
        assert_eq!(lookup.resolve(&Value::Int(999)), None);
    }

    #[test]
    fn test_date_lookup_matches_timestamps() {
        let day = NaiveDate::from_ymd_opt(2013, 7, 4).unwrap();
        let table = Table::with_rows(
            &["date_key", "full_date"],
            vec![vec![Value::Int(42), Value::Date(day)]],
        );
        let lookup = DimensionLookup::from_table(&catalog::DIM_DATE, &table).unwrap();

        let order_ts = Value::Timestamp(day.and_hms_opt(23, 59, 1).unwrap());
        assert_eq!(lookup.resolve(&order_ts), Some(42));
    }

    #[test]
    fn test_missing_key_column_is_reported() {
        let table = Table::with_rows(&["customer_id"], vec![]);
        let err = DimensionLookup::from_table(&catalog::DIM_CUSTOMER, &table).err();
        assert!(matches!(
            err,
            Some(DomainError::MissingColumn { ref column, .. }) if column == "customer_key"
        ));
    }
}
