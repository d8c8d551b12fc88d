use analyst_core::{AnalystError, Dataset, Result};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Reads the business dataset from CSV
///
/// The first line must be a header row. Cells are trimmed; short rows are
/// accepted here and reported as missing fields when records are resolved.
pub struct DatasetLoader;

impl DatasetLoader {
    /// Load a dataset from a CSV file on disk
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Dataset> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(AnalystError::Dataset(format!(
                "dataset path does not exist: {}",
                path.display()
            )));
        }

        tracing::info!("Loading dataset from {}", path.display());

        let file = File::open(path)
            .map_err(|e| AnalystError::Dataset(format!("{}: {}", path.display(), e)))?;

        Self::from_reader(file)
    }

    /// Load a dataset from any CSV source (uploads, in-memory buffers)
    pub fn from_reader<R: Read>(reader: R) -> Result<Dataset> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers: Vec<String> = csv_reader
            .headers()
            .map_err(|e| AnalystError::Dataset(format!("invalid header row: {}", e)))?
            .iter()
            .map(|h| h.to_string())
            .collect();

        let mut rows = Vec::new();
        for (i, record) in csv_reader.records().enumerate() {
            let record = record
                .map_err(|e| AnalystError::Dataset(format!("invalid CSV at row {}: {}", i, e)))?;
            rows.push(record.iter().map(|c| c.to_string()).collect());
        }

        tracing::info!(
            "Loaded dataset: {} columns, {} rows",
            headers.len(),
            rows.len()
        );

        Ok(Dataset::new(headers, rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use analyst_core::DatasetSchema;

    const CSV: &str = "Month,Sales (INR),Expenses (INR),Customers,Inventory Cost (INR),Marketing Spend (INR)\n\
                       Jan,1000,400,50,100,200\n\
                       Feb, 1200 ,500,55,120,150\n";

    #[test]
    fn test_load_from_reader() {
        let dataset = DatasetLoader::from_reader(CSV.as_bytes()).unwrap();
        assert_eq!(dataset.headers().len(), 6);
        assert_eq!(dataset.len(), 2);

        let records = dataset.to_records(&DatasetSchema::default()).unwrap();
        assert_eq!(records[1].period, "Feb");
        assert_eq!(records[1].sales, 1200.0);
    }

    #[test]
    fn test_header_only_is_empty() {
        let dataset = DatasetLoader::from_reader(
            "Month,Sales (INR),Expenses (INR),Customers,Inventory Cost (INR),Marketing Spend (INR)\n"
                .as_bytes(),
        )
        .unwrap();
        assert!(dataset.is_empty());
    }

    #[test]
    fn test_nonexistent_path() {
        let err = DatasetLoader::from_path("/path/that/does/not/exist.csv").unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("business_data.csv");
        std::fs::write(&path, CSV).unwrap();

        let dataset = DatasetLoader::from_path(&path).unwrap();
        assert_eq!(dataset.len(), 2);
    }
}
