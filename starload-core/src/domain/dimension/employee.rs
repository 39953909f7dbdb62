// starload-core/src/domain/dimension/employee.rs

use chrono::NaiveDate;

use crate::domain::error::DomainError;
use crate::domain::table::{Conformed, Table};
use crate::domain::value::Value;

pub const ENTITY: &str = "employee";

pub const REQUIRED_COLUMNS: &[&str] = &[
    "BusinessEntityID",
    "FirstName",
    "LastName",
    "JobTitle",
    "HireDate",
    "BirthDate",
    "DepartmentName",
];

#[derive(Debug, Clone, PartialEq)]
pub struct EmployeeRow {
    pub business_entity_id: Option<i64>,
    pub employee_name: String,
    pub job_title: String,
    pub department_name: String,
    pub department_category: &'static str,
    pub age: Option<i64>,
    pub years_of_service: Option<i64>,
    pub birth_date: Option<NaiveDate>,
    pub hire_date: Option<NaiveDate>,
    pub saved_date: NaiveDate,
}

impl Conformed for EmployeeRow {
    fn into_fields(self) -> Vec<(&'static str, Value)> {
        vec![
            ("business_entity_id", self.business_entity_id.into()),
            ("employee_name", self.employee_name.into()),
            ("job_title", self.job_title.into()),
            ("department_name", self.department_name.into()),
            ("department_category", self.department_category.into()),
            ("age", self.age.into()),
            ("years_of_service", self.years_of_service.into()),
            ("birth_date", self.birth_date.into()),
            ("hire_date", self.hire_date.into()),
            ("saved_date", self.saved_date.into()),
        ]
    }
}

/// Whole years between `since` and `today`, counted as days / 365.
pub fn whole_years(since: Option<NaiveDate>, today: NaiveDate) -> Option<i64> {
    since.map(|d| (today - d).num_days().div_euclid(365))
}

pub fn department_category(department: &str) -> &'static str {
    if department.contains("Sales") {
        "Sales"
    } else if department.contains("Executive") {
        "Administrative"
    } else {
        "Operations"
    }
}

pub fn build(raw: &Table, today: NaiveDate) -> Result<Vec<EmployeeRow>, DomainError> {
    raw.require_columns(ENTITY, REQUIRED_COLUMNS)?;

    Ok(raw
        .records()
        .map(|r| {
            let birth_date = r.get("BirthDate").as_date();
            let hire_date = r.get("HireDate").as_date();
            let department_name = r.text("DepartmentName");

            EmployeeRow {
                business_entity_id: r.int("BusinessEntityID"),
                employee_name: format!("{} {}", r.text("FirstName"), r.text("LastName")),
                job_title: r.text("JobTitle"),
                department_category: department_category(&department_name),
                department_name,
                age: whole_years(birth_date, today),
                years_of_service: whole_years(hire_date, today),
                birth_date,
                hire_date,
                saved_date: today,
            }
        })
        .collect())
}
