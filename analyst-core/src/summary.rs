use crate::error::{AnalystError, Result};
use crate::types::BusinessRecord;
use serde::Serialize;

/// Query keywords that ask for a visual comparison of the series
const TREND_KEYWORDS: [&str; 5] = ["trend", "chart", "plot", "graph", "compare"];

/// Headline metrics across all periods of a dataset
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BusinessSummary {
    pub periods: usize,
    pub avg_sales: f64,
    pub avg_expenses: f64,
    pub avg_profit: f64,
    /// Mean of per-period marketing ROI (%), periods without marketing spend skipped
    pub avg_roi_pct: f64,
    pub best_period: String,
    pub best_profit: f64,
}

impl BusinessSummary {
    pub fn from_records(records: &[BusinessRecord]) -> Result<Self> {
        if records.is_empty() {
            return Err(AnalystError::EmptyCorpus);
        }

        let n = records.len() as f64;
        let avg_sales = records.iter().map(|r| r.sales).sum::<f64>() / n;
        let avg_expenses = records.iter().map(|r| r.expenses).sum::<f64>() / n;
        let avg_profit = records.iter().map(|r| r.profit()).sum::<f64>() / n;

        let rois: Vec<f64> = records
            .iter()
            .filter_map(|r| r.marketing_roi_pct())
            .collect();
        let avg_roi_pct = if rois.is_empty() {
            0.0
        } else {
            rois.iter().sum::<f64>() / rois.len() as f64
        };

        // First period wins on ties
        let mut best = &records[0];
        for record in &records[1..] {
            if record.profit() > best.profit() {
                best = record;
            }
        }

        tracing::debug!(
            "Summarised {} periods: avg_sales={:.0}, avg_profit={:.0}, best={}",
            records.len(),
            avg_sales,
            avg_profit,
            best.period
        );

        Ok(Self {
            periods: records.len(),
            avg_sales,
            avg_expenses,
            avg_profit,
            avg_roi_pct,
            best_period: best.period.clone(),
            best_profit: best.profit(),
        })
    }

    /// One-line overview shown before any question has been asked
    pub fn overview(&self) -> String {
        format!(
            "Your dataset covers {} months. The highest profit was in {}, with an average ROI of {:.2}%.",
            self.periods, self.best_period, self.avg_roi_pct
        )
    }
}

/// Whether a question asks for a trend/comparison view of the data
pub fn wants_trend_chart(query: &str) -> bool {
    let lowered = query.to_lowercase();
    TREND_KEYWORDS.iter().any(|k| lowered.contains(k))
}
