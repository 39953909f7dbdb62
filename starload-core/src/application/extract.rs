// starload-core/src/application/extract.rs
//
// Read side of the source system (AdventureWorks layout). Money columns are
// widened to DOUBLE so every engine hands back plain floats.

use chrono::NaiveDate;
use tracing::{debug, instrument};

use crate::domain::dimension::DimensionKind;
use crate::domain::fact::FactKind;
use crate::domain::table::Table;
use crate::domain::value::Value;
use crate::error::StarloadError;
use crate::ports::connector::Connector;

const CUSTOMERS: &str = r#"
SELECT
    c.CustomerID,
    c.PersonID,
    c.StoreID,
    p.FirstName,
    p.LastName,
    p.EmailPromotion,
    be.EmailAddress,
    pp.PhoneNumber,
    a.City,
    sp.Name AS StateProvince,
    cr.Name AS CountryRegion
FROM Sales.Customer c
LEFT JOIN Person.Person p ON c.PersonID = p.BusinessEntityID
LEFT JOIN Person.EmailAddress be ON p.BusinessEntityID = be.BusinessEntityID
LEFT JOIN Person.PersonPhone pp ON p.BusinessEntityID = pp.BusinessEntityID
LEFT JOIN Person.BusinessEntityAddress bea ON p.BusinessEntityID = bea.BusinessEntityID
LEFT JOIN Person.Address a ON bea.AddressID = a.AddressID
LEFT JOIN Person.StateProvince sp ON a.StateProvinceID = sp.StateProvinceID
LEFT JOIN Person.CountryRegion cr ON sp.CountryRegionCode = cr.CountryRegionCode
"#;

const PRODUCTS: &str = r#"
SELECT
    p.ProductID,
    p.Name AS ProductName,
    p.ProductNumber,
    p.Color,
    CAST(p.StandardCost AS DOUBLE) AS StandardCost,
    CAST(p.ListPrice AS DOUBLE) AS ListPrice,
    p.Size,
    CAST(p.Weight AS DOUBLE) AS Weight,
    psc.Name AS SubcategoryName,
    pc.Name AS CategoryName,
    pm.Name AS ProductModelName
FROM Production.Product p
LEFT JOIN Production.ProductSubcategory psc ON p.ProductSubcategoryID = psc.ProductSubcategoryID
LEFT JOIN Production.ProductCategory pc ON psc.ProductCategoryID = pc.ProductCategoryID
LEFT JOIN Production.ProductModel pm ON p.ProductModelID = pm.ProductModelID
"#;

const TERRITORIES: &str = r#"
SELECT
    TerritoryID,
    Name,
    CountryRegionCode,
    "Group",
    CAST(SalesYTD AS DOUBLE) AS SalesYTD,
    CAST(SalesLastYear AS DOUBLE) AS SalesLastYear,
    CAST(CostYTD AS DOUBLE) AS CostYTD,
    CAST(CostLastYear AS DOUBLE) AS CostLastYear
FROM Sales.SalesTerritory
"#;

const CURRENCIES: &str = "SELECT CurrencyCode, Name FROM Sales.Currency";

// Current department only
const EMPLOYEES: &str = r#"
SELECT
    e.BusinessEntityID,
    p.FirstName,
    p.LastName,
    e.JobTitle,
    e.HireDate,
    e.BirthDate,
    d.Name AS DepartmentName
FROM HumanResources.Employee e
JOIN Person.Person p ON e.BusinessEntityID = p.BusinessEntityID
JOIN HumanResources.EmployeeDepartmentHistory edh ON e.BusinessEntityID = edh.BusinessEntityID
JOIN HumanResources.Department d ON edh.DepartmentID = d.DepartmentID
WHERE edh.EndDate IS NULL
"#;

const STORES: &str = r#"
SELECT
    s.BusinessEntityID AS StoreID,
    s.Name AS StoreName,
    a.AddressLine1,
    a.City,
    a.PostalCode,
    sp.Name AS StateProvince,
    cr.Name AS CountryRegion
FROM Sales.Store s
JOIN Person.BusinessEntityAddress bea ON s.BusinessEntityID = bea.BusinessEntityID
JOIN Person.Address a ON bea.AddressID = a.AddressID
JOIN Person.StateProvince sp ON a.StateProvinceID = sp.StateProvinceID
JOIN Person.CountryRegion cr ON sp.CountryRegionCode = cr.CountryRegionCode
"#;

const SALES_REASONS: &str = r#"
SELECT
    sr.SalesReasonID,
    sr.Name AS ReasonName,
    sr.ReasonType,
    soh.SalesOrderID
FROM Sales.SalesReason sr
JOIN Sales.SalesOrderHeaderSalesReason sohsr ON sr.SalesReasonID = sohsr.SalesReasonID
JOIN Sales.SalesOrderHeader soh ON sohsr.SalesOrderID = soh.SalesOrderID
"#;

const INTERNET_SALES: &str = r#"
SELECT
    soh.SalesOrderID,
    sod.SalesOrderDetailID,
    soh.OrderDate,
    soh.CustomerID,
    soh.TerritoryID,
    sod.ProductID,
    sod.OrderQty,
    CAST(sod.UnitPrice AS DOUBLE) AS UnitPrice,
    CAST(sod.UnitPriceDiscount AS DOUBLE) AS UnitPriceDiscount,
    CAST(sod.LineTotal AS DOUBLE) AS LineTotal,
    CAST(soh.TaxAmt AS DOUBLE) AS TaxAmt,
    CAST(soh.Freight AS DOUBLE) AS Freight
FROM Sales.SalesOrderHeader soh
JOIN Sales.SalesOrderDetail sod ON soh.SalesOrderID = sod.SalesOrderID
JOIN Sales.Customer c ON soh.CustomerID = c.CustomerID
WHERE soh.OnlineOrderFlag = 1
  AND soh.OrderDate >= CAST(? AS DATE)
ORDER BY soh.SalesOrderID, sod.SalesOrderDetailID
"#;

const RESELLER_SALES: &str = r#"
SELECT
    soh.SalesOrderID,
    sod.SalesOrderDetailID,
    soh.OrderDate,
    s.BusinessEntityID AS StoreID,
    soh.SalesPersonID,
    soh.TerritoryID,
    sod.ProductID,
    sod.OrderQty,
    CAST(sod.UnitPrice AS DOUBLE) AS UnitPrice,
    CAST(sod.UnitPriceDiscount AS DOUBLE) AS UnitPriceDiscount,
    CAST(sod.LineTotal AS DOUBLE) AS LineTotal,
    CAST(soh.TaxAmt AS DOUBLE) AS TaxAmt,
    CAST(soh.Freight AS DOUBLE) AS Freight
FROM Sales.SalesOrderHeader soh
JOIN Sales.SalesOrderDetail sod ON soh.SalesOrderID = sod.SalesOrderID
JOIN Sales.Customer c ON soh.CustomerID = c.CustomerID
JOIN Sales.Store s ON c.StoreID = s.BusinessEntityID
WHERE soh.OnlineOrderFlag = 0
  AND soh.OrderDate >= CAST(? AS DATE)
ORDER BY soh.SalesOrderID, sod.SalesOrderDetailID
"#;

const MAX_ORDER_DATE: &str =
    "SELECT MAX(OrderDate) AS max_order_date FROM Sales.SalesOrderHeader";

/// Typed entry points over the source connector.
pub struct SourceExtractor<'a> {
    source: &'a dyn Connector,
}

impl<'a> SourceExtractor<'a> {
    pub fn new(source: &'a dyn Connector) -> Self {
        Self { source }
    }

    fn dimension_query(kind: DimensionKind) -> Option<&'static str> {
        match kind {
            DimensionKind::Customer => Some(CUSTOMERS),
            DimensionKind::Product => Some(PRODUCTS),
            DimensionKind::Date => None,
            DimensionKind::Territory => Some(TERRITORIES),
            DimensionKind::Currency => Some(CURRENCIES),
            DimensionKind::Employee => Some(EMPLOYEES),
            DimensionKind::Reseller => Some(STORES),
            DimensionKind::SalesReason => Some(SALES_REASONS),
        }
    }

    /// Raw rows for one dimension. Synthetic dimensions get an empty table.
    #[instrument(skip(self))]
    pub async fn dimension(&self, kind: DimensionKind) -> Result<Table, StarloadError> {
        let Some(query) = Self::dimension_query(kind) else {
            return Ok(Table::default());
        };
        let table = self.source.query(query, &[]).await?;
        debug!(rows = table.len(), "Extracted {}", kind);
        Ok(table)
    }

    /// Transaction lines ordered on or after `start_date`.
    #[instrument(skip(self))]
    pub async fn fact_lines(
        &self,
        kind: FactKind,
        start_date: NaiveDate,
    ) -> Result<Table, StarloadError> {
        let query = match kind {
            FactKind::InternetSales => INTERNET_SALES,
            FactKind::ResellerSales => RESELLER_SALES,
        };
        let table = self.source.query(query, &[Value::Date(start_date)]).await?;
        debug!(rows = table.len(), "Extracted {} lines", kind.process_name());
        Ok(table)
    }

    /// Latest order date in the source, at day precision.
    pub async fn max_order_date(&self) -> Result<Option<NaiveDate>, StarloadError> {
        let table = self.source.query(MAX_ORDER_DATE, &[]).await?;
        Ok(table
            .records()
            .next()
            .and_then(|r| r.get("max_order_date").as_date()))
    }
}
