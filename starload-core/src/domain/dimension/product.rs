// starload-core/src/domain/dimension/product.rs

use chrono::NaiveDate;

use crate::domain::error::DomainError;
use crate::domain::table::{Conformed, Table};
use crate::domain::value::{UNSPECIFIED, Value, round_to};

pub const ENTITY: &str = "product";

pub const REQUIRED_COLUMNS: &[&str] = &[
    "ProductID",
    "ProductName",
    "ProductNumber",
    "Color",
    "StandardCost",
    "ListPrice",
    "Size",
    "Weight",
    "SubcategoryName",
    "CategoryName",
    "ProductModelName",
];

#[derive(Debug, Clone, PartialEq)]
pub struct ProductRow {
    pub product_id: Option<i64>,
    pub product_name: String,
    pub product_number: String,
    pub color: String,
    pub size: String,
    pub weight: Option<f64>,
    pub standard_cost: Option<f64>,
    pub list_price: Option<f64>,
    pub profit_margin: f64,
    pub price_category: &'static str,
    pub margin_category: &'static str,
    pub category_name: String,
    pub subcategory_name: String,
    pub full_category: String,
    pub product_model_name: String,
    pub saved_date: NaiveDate,
}

impl Conformed for ProductRow {
    fn into_fields(self) -> Vec<(&'static str, Value)> {
        vec![
            ("product_id", self.product_id.into()),
            ("product_name", self.product_name.into()),
            ("product_number", self.product_number.into()),
            ("color", self.color.into()),
            ("size", self.size.into()),
            ("weight", self.weight.into()),
            ("standard_cost", self.standard_cost.into()),
            ("list_price", self.list_price.into()),
            ("profit_margin", self.profit_margin.into()),
            ("price_category", self.price_category.into()),
            ("margin_category", self.margin_category.into()),
            ("category_name", self.category_name.into()),
            ("subcategory_name", self.subcategory_name.into()),
            ("full_category", self.full_category.into()),
            ("product_model_name", self.product_model_name.into()),
            ("saved_date", self.saved_date.into()),
        ]
    }
}

/// Margin over list price in percent, 2 decimals. Zero when there is no
/// usable list price.
pub fn profit_margin(list_price: Option<f64>, standard_cost: Option<f64>) -> f64 {
    match list_price {
        Some(price) if price != 0.0 => {
            let margin = (price - standard_cost.unwrap_or(0.0)) / price * 100.0;
            if margin.is_finite() {
                round_to(margin, 2)
            } else {
                0.0
            }
        }
        _ => 0.0,
    }
}

/// Bins are right-closed: (.., 100] is Economy. Zero-priced parts count as Economy.
pub fn price_category(list_price: Option<f64>) -> &'static str {
    match list_price {
        Some(p) if (0.0..=100.0).contains(&p) => "Economy",
        Some(p) if p > 100.0 && p <= 500.0 => "Standard",
        Some(p) if p > 500.0 && p <= 1000.0 => "Premium",
        Some(p) if p > 1000.0 => "Luxury",
        _ => UNSPECIFIED,
    }
}

pub fn margin_category(margin: f64) -> &'static str {
    if margin <= 0.0 {
        "Loss"
    } else if margin <= 20.0 {
        "Low"
    } else if margin <= 40.0 {
        "Medium"
    } else {
        "High"
    }
}

pub fn build(raw: &Table, today: NaiveDate) -> Result<Vec<ProductRow>, DomainError> {
    raw.require_columns(ENTITY, REQUIRED_COLUMNS)?;

    Ok(raw
        .records()
        .map(|r| {
            let list_price = r.float("ListPrice");
            let standard_cost = r.float("StandardCost");
            let margin = profit_margin(list_price, standard_cost);
            let category_name = r.text("CategoryName");
            let subcategory_name = r.text("SubcategoryName");

            ProductRow {
                product_id: r.int("ProductID"),
                product_name: r.text("ProductName"),
                product_number: r.text("ProductNumber"),
                color: r.text("Color"),
                size: r.text("Size"),
                weight: r.float("Weight"),
                standard_cost,
                list_price,
                profit_margin: margin,
                price_category: price_category(list_price),
                margin_category: margin_category(margin),
                full_category: format!("{} - {}", category_name, subcategory_name),
                category_name,
                subcategory_name,
                product_model_name: r.text("ProductModelName"),
                saved_date: today,
            }
        })
        .collect())
}
