use crate::error::{AnalystError, Result};
use crate::types::{BusinessRecord, SourceFigures};
use serde::{Deserialize, Serialize};

/// Column names the dataset must provide. Defaults follow the dashboard's CSV export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetSchema {
    pub period_column: String,
    pub sales_column: String,
    pub expenses_column: String,
    pub customers_column: String,
    pub inventory_cost_column: String,
    pub marketing_spend_column: String,
}

impl Default for DatasetSchema {
    fn default() -> Self {
        Self {
            period_column: "Month".to_string(),
            sales_column: "Sales (INR)".to_string(),
            expenses_column: "Expenses (INR)".to_string(),
            customers_column: "Customers".to_string(),
            inventory_cost_column: "Inventory Cost (INR)".to_string(),
            marketing_spend_column: "Marketing Spend (INR)".to_string(),
        }
    }
}

/// Raw tabular data as loaded from CSV: a header row plus string cells.
///
/// Rows are addressed by their 0-based position among the data rows
/// (the header is not counted).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Dataset {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Number of data rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column by exact header name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Resolve a single data row into a typed record
    pub fn record_at(&self, schema: &DatasetSchema, row: usize) -> Result<BusinessRecord> {
        let cells = self.rows.get(row).ok_or_else(|| {
            AnalystError::Dataset(format!("row {} out of range ({} rows)", row, self.len()))
        })?;

        let period = self.text_cell(cells, row, &schema.period_column)?;
        let (sales, sales_text) = self.numeric_cell(cells, row, &schema.sales_column)?;
        let (expenses, expenses_text) = self.numeric_cell(cells, row, &schema.expenses_column)?;
        let (customers, customers_text) =
            self.numeric_cell(cells, row, &schema.customers_column)?;
        let (inventory_cost, inventory_cost_text) =
            self.numeric_cell(cells, row, &schema.inventory_cost_column)?;
        let (marketing_spend, marketing_spend_text) =
            self.numeric_cell(cells, row, &schema.marketing_spend_column)?;

        Ok(BusinessRecord {
            period,
            sales,
            expenses,
            inventory_cost,
            marketing_spend,
            customers,
            source: SourceFigures {
                sales: sales_text,
                expenses: expenses_text,
                inventory_cost: inventory_cost_text,
                marketing_spend: marketing_spend_text,
                customers: customers_text,
            },
        })
    }

    /// Resolve every data row, failing on the first row that lacks a required field
    pub fn to_records(&self, schema: &DatasetSchema) -> Result<Vec<BusinessRecord>> {
        (0..self.len()).map(|row| self.record_at(schema, row)).collect()
    }

    fn text_cell(&self, cells: &[String], row: usize, column: &str) -> Result<String> {
        let idx = self
            .column_index(column)
            .ok_or_else(|| AnalystError::formatting(row, column, "missing column"))?;

        let value = cells.get(idx).map(|c| c.trim()).unwrap_or("");
        if value.is_empty() {
            return Err(AnalystError::formatting(row, column, "empty value"));
        }

        Ok(value.to_string())
    }

    /// Parsed value plus the trimmed text it came from
    fn numeric_cell(&self, cells: &[String], row: usize, column: &str) -> Result<(f64, String)> {
        let raw = self.text_cell(cells, row, column)?;

        match raw.parse::<f64>() {
            Ok(v) if v.is_finite() => Ok((v, raw)),
            _ => Err(AnalystError::formatting(
                row,
                column,
                format!("'{}' is not a number", raw),
            )),
        }
    }
}
