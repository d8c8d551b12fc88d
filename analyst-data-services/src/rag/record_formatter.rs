use analyst_core::{AnalystError, BusinessRecord, Dataset, DatasetSchema, Result};
use serde::{Deserialize, Serialize};

/// Trait for converting business records into text for embeddings
pub trait RecordFormatter {
    /// Labeled, field-by-field rendering; every numeric field appears by name
    fn to_document_text(&self) -> String;
}

impl RecordFormatter for BusinessRecord {
    fn to_document_text(&self) -> String {
        format!(
            "Month: {}, Sales: {}, Expenses: {}, Customers: {}, \
             Inventory Cost: {}, Marketing Spend: {}",
            self.period,
            self.source.sales,
            self.source.expenses,
            self.source.customers,
            self.source.inventory_cost,
            self.source.marketing_spend
        )
    }
}

/// How dataset rows are grouped into documents before chunking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentGranularity {
    /// One document per row; each row is its own retrieval unit
    #[default]
    PerRow,
    /// One document for the whole dataset, rows joined by newlines
    WholeDataset,
}

/// Text rendering of one or more records
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Position of the document in assembly order
    pub index: usize,
    pub text: String,
}

/// Resolve every row against the schema and render documents.
///
/// Returns the resolved records alongside their documents. Fails with
/// `EmptyCorpus` on a dataset without rows and with `Formatting` on the
/// first row missing a required field.
pub fn assemble_documents(
    dataset: &Dataset,
    schema: &DatasetSchema,
    granularity: DocumentGranularity,
) -> Result<(Vec<BusinessRecord>, Vec<Document>)> {
    if dataset.is_empty() {
        tracing::warn!("Refusing to build corpus from an empty dataset");
        return Err(AnalystError::EmptyCorpus);
    }

    let records = dataset.to_records(schema)?;
    let documents = documents_from_records(&records, granularity);
    Ok((records, documents))
}

/// Render already-resolved records into documents
pub fn documents_from_records(
    records: &[BusinessRecord],
    granularity: DocumentGranularity,
) -> Vec<Document> {
    match granularity {
        DocumentGranularity::PerRow => records
            .iter()
            .enumerate()
            .map(|(i, r)| Document {
                index: i,
                text: r.to_document_text(),
            })
            .collect(),
        DocumentGranularity::WholeDataset => {
            if records.is_empty() {
                return Vec::new();
            }
            let text = records
                .iter()
                .map(|r| r.to_document_text())
                .collect::<Vec<_>>()
                .join("\n");
            vec![Document {
                index: 0,
                text,
            }]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(period: &str, sales: f64) -> BusinessRecord {
        BusinessRecord::with_amounts(period, sales, 400.0, 100.0, 200.0, 50.0)
    }

    #[test]
    fn test_document_text() {
        let text = record("Jan", 1000.0).to_document_text();
        assert_eq!(
            text,
            "Month: Jan, Sales: 1000, Expenses: 400, Customers: 50, Inventory Cost: 100, Marketing Spend: 200"
        );
    }

    #[test]
    fn test_fractional_amounts_kept() {
        let text = record("Mar", 1234.5).to_document_text();
        assert!(text.contains("Sales: 1234.5"));
    }

    #[test]
    fn test_cells_rendered_verbatim() {
        let headers = DatasetSchema::default();
        let dataset = Dataset::new(
            vec![
                headers.period_column.clone(),
                headers.sales_column.clone(),
                headers.expenses_column.clone(),
                headers.customers_column.clone(),
                headers.inventory_cost_column.clone(),
                headers.marketing_spend_column.clone(),
            ],
            vec![["Jan", "12345678901234567891", "1000.50", "50", "1e3", "200"]
                .iter()
                .map(|c| c.to_string())
                .collect()],
        );

        let (records, docs) =
            assemble_documents(&dataset, &headers, DocumentGranularity::PerRow).unwrap();
        assert_eq!(records[0].sales, 12345678901234567891.0);
        assert_eq!(
            docs[0].text,
            "Month: Jan, Sales: 12345678901234567891, Expenses: 1000.50, Customers: 50, \
             Inventory Cost: 1e3, Marketing Spend: 200"
        );
    }

    #[test]
    fn test_per_row_documents() {
        let docs = documents_from_records(
            &[record("Jan", 1000.0), record("Feb", 900.0)],
            DocumentGranularity::PerRow,
        );
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[1].index, 1);
        assert!(docs[1].text.starts_with("Month: Feb"));
    }

    #[test]
    fn test_whole_dataset_document() {
        let docs = documents_from_records(
            &[record("Jan", 1000.0), record("Feb", 900.0)],
            DocumentGranularity::WholeDataset,
        );
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].text.lines().count(), 2);
        assert!(docs[0].text.ends_with("Marketing Spend: 200"));
    }

    #[test]
    fn test_empty_dataset_rejected() {
        let dataset = Dataset::new(vec!["Month".to_string()], vec![]);
        let err = assemble_documents(
            &dataset,
            &DatasetSchema::default(),
            DocumentGranularity::PerRow,
        )
        .unwrap_err();
        assert_eq!(err, AnalystError::EmptyCorpus);
    }
}
