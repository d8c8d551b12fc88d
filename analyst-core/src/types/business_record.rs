use crate::types::PeriodLabel;
use serde::{Deserialize, Serialize};

/// One period of business activity. This is the primary data structure for RAG:
/// every record is rendered to text, embedded, and retrieved as context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessRecord {
    // ═══════════════════════════════════════════════════
    // IDENTIFICATION
    // ═══════════════════════════════════════════════════
    pub period: PeriodLabel,

    // ═══════════════════════════════════════════════════
    // REVENUE & COSTS (INR)
    // ═══════════════════════════════════════════════════
    pub sales: f64,
    pub expenses: f64,
    pub inventory_cost: f64,
    pub marketing_spend: f64,

    // ═══════════════════════════════════════════════════
    // AUDIENCE
    // ═══════════════════════════════════════════════════
    pub customers: f64,

    // ═══════════════════════════════════════════════════
    // SOURCE TEXT (rendered into documents as-is)
    // ═══════════════════════════════════════════════════
    pub source: SourceFigures,
}

/// Trimmed cell text each amount was parsed from.
///
/// Parsing to `f64` is lossy (`1000.50`, `1e3`, integers past 2^53), so
/// document text is rendered from these strings, never from the floats.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceFigures {
    pub sales: String,
    pub expenses: String,
    pub inventory_cost: String,
    pub marketing_spend: String,
    pub customers: String,
}

impl SourceFigures {
    /// Source text for amounts that did not come from a file
    pub fn from_values(
        sales: f64,
        expenses: f64,
        inventory_cost: f64,
        marketing_spend: f64,
        customers: f64,
    ) -> Self {
        Self {
            sales: sales.to_string(),
            expenses: expenses.to_string(),
            inventory_cost: inventory_cost.to_string(),
            marketing_spend: marketing_spend.to_string(),
            customers: customers.to_string(),
        }
    }
}

impl BusinessRecord {
    /// Create a record with all amounts zeroed
    pub fn new(period: impl Into<PeriodLabel>) -> Self {
        Self::with_amounts(period, 0.0, 0.0, 0.0, 0.0, 0.0)
    }

    /// Create a record from amounts, deriving the source text from the values
    pub fn with_amounts(
        period: impl Into<PeriodLabel>,
        sales: f64,
        expenses: f64,
        inventory_cost: f64,
        marketing_spend: f64,
        customers: f64,
    ) -> Self {
        Self {
            period: period.into(),
            sales,
            expenses,
            inventory_cost,
            marketing_spend,
            customers,
            source: SourceFigures::from_values(
                sales,
                expenses,
                inventory_cost,
                marketing_spend,
                customers,
            ),
        }
    }

    /// Profit for the period (sales minus expenses)
    pub fn profit(&self) -> f64 {
        self.sales - self.expenses
    }

    /// Marketing ROI in percent, `None` when nothing was spent on marketing
    pub fn marketing_roi_pct(&self) -> Option<f64> {
        if self.marketing_spend.abs() > 1e-10 {
            Some((self.profit() / self.marketing_spend) * 100.0)
        } else {
            None
        }
    }
}
