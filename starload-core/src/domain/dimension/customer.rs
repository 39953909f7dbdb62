// starload-core/src/domain/dimension/customer.rs

use chrono::NaiveDate;

use crate::domain::error::DomainError;
use crate::domain::table::{Conformed, Table};
use crate::domain::value::Value;

pub const ENTITY: &str = "customer";

pub const REQUIRED_COLUMNS: &[&str] = &[
    "CustomerID",
    "PersonID",
    "StoreID",
    "FirstName",
    "LastName",
    "EmailPromotion",
    "EmailAddress",
    "PhoneNumber",
    "City",
    "StateProvince",
    "CountryRegion",
];

#[derive(Debug, Clone, PartialEq)]
pub struct CustomerRow {
    pub customer_id: Option<i64>,
    pub person_id: Option<i64>,
    pub store_id: Option<i64>,
    pub customer_name: String,
    pub email: String,
    pub phone: String,
    pub city: String,
    pub state_province: String,
    pub country_region: String,
    pub customer_type: &'static str,
    pub email_promotion_tier: &'static str,
    pub saved_date: NaiveDate,
}

impl Conformed for CustomerRow {
    fn into_fields(self) -> Vec<(&'static str, Value)> {
        vec![
            ("customer_id", self.customer_id.into()),
            ("person_id", self.person_id.into()),
            ("store_id", self.store_id.into()),
            ("customer_name", self.customer_name.into()),
            ("email", self.email.into()),
            ("phone", self.phone.into()),
            ("city", self.city.into()),
            ("state_province", self.state_province.into()),
            ("country_region", self.country_region.into()),
            ("customer_type", self.customer_type.into()),
            ("email_promotion_tier", self.email_promotion_tier.into()),
            ("saved_date", self.saved_date.into()),
        ]
    }
}

/// Store-affiliated customers are businesses.
pub fn customer_type(store_id: Option<i64>) -> &'static str {
    if store_id.is_some() {
        "Business"
    } else {
        "Individual"
    }
}

pub fn email_promotion_tier(level: Option<i64>) -> &'static str {
    match level {
        Some(2) => "High",
        Some(1) => "Medium",
        _ => "Low",
    }
}

pub fn build(raw: &Table, today: NaiveDate) -> Result<Vec<CustomerRow>, DomainError> {
    raw.require_columns(ENTITY, REQUIRED_COLUMNS)?;

    Ok(raw
        .records()
        .map(|r| {
            let store_id = r.int("StoreID");
            CustomerRow {
                customer_id: r.int("CustomerID"),
                person_id: r.int("PersonID"),
                store_id,
                customer_name: format!("{} {}", r.text("FirstName"), r.text("LastName")),
                email: r.text("EmailAddress"),
                phone: r.text("PhoneNumber"),
                city: r.text("City"),
                state_province: r.text("StateProvince"),
                country_region: r.text("CountryRegion"),
                customer_type: customer_type(store_id),
                email_promotion_tier: email_promotion_tier(r.int("EmailPromotion")),
                saved_date: today,
            }
        })
        .collect())
}
