use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use tracing::{debug, info};

use crate::models::store::Store;

/// Read-only lookup of valid store ids, loaded once at startup.
#[derive(Debug, Default)]
pub struct StoreRegistry {
    stores: HashMap<String, Store>,
}

impl StoreRegistry {
    /// Load the store master CSV (`AreaCode, StoreName, StoreID` with a header row).
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RegistryError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(RegistryError::Io)?;
        let registry = Self::from_reader(file)?;
        info!(path = %path.display(), stores = registry.len(), "Loaded store registry");
        Ok(registry)
    }

    /// Parse the store master CSV from any reader. Rows with fewer than three
    /// columns are skipped; a repeated store id replaces the earlier row.
    pub fn from_reader(reader: impl Read) -> Result<Self, RegistryError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let mut stores = HashMap::new();
        for record in csv_reader.records() {
            let record = record.map_err(RegistryError::Csv)?;
            if record.len() < 3 {
                debug!(row = ?record.position().map(|p| p.line()), "Skipping short store row");
                continue;
            }
            let store = Store {
                area_code: record[0].to_string(),
                store_name: record[1].to_string(),
                store_id: record[2].to_string(),
            };
            stores.insert(store.store_id.clone(), store);
        }

        Ok(Self { stores })
    }

    pub fn from_stores(stores: impl IntoIterator<Item = Store>) -> Self {
        Self {
            stores: stores
                .into_iter()
                .map(|store| (store.store_id.clone(), store))
                .collect(),
        }
    }

    pub fn exists(&self, store_id: &str) -> bool {
        self.stores.contains_key(store_id)
    }

    pub fn get(&self, store_id: &str) -> Option<&Store> {
        self.stores.get(store_id)
    }

    pub fn len(&self) -> usize {
        self.stores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stores.is_empty()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Failed to open store master file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse store master CSV: {0}")]
    Csv(#[from] csv::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = "AreaCode,StoreName,StoreID\n\
                          7100001,RP Mart,RP00001\n\
                          7100002,Corner Shop,RP00002\n\
                          short,row\n";

    #[test]
    fn test_header_skipped_and_rows_indexed() {
        let registry = StoreRegistry::from_reader(SAMPLE.as_bytes()).unwrap();
        assert_eq!(registry.len(), 2);
        assert!(registry.exists("RP00001"));
        assert!(registry.exists("RP00002"));
        assert!(!registry.exists("StoreID"));
    }

    #[test]
    fn test_short_rows_ignored() {
        let registry = StoreRegistry::from_reader(SAMPLE.as_bytes()).unwrap();
        assert!(!registry.exists("row"));
    }

    #[test]
    fn test_get_returns_store_fields() {
        let registry = StoreRegistry::from_reader(SAMPLE.as_bytes()).unwrap();
        let store = registry.get("RP00002").unwrap();
        assert_eq!(store.area_code, "7100002");
        assert_eq!(store.store_name, "Corner Shop");
    }

    #[test]
    fn test_duplicate_store_id_keeps_last_row() {
        let csv = "AreaCode,StoreName,StoreID\n1,First,S1\n2,Second,S1\n";
        let registry = StoreRegistry::from_reader(csv.as_bytes()).unwrap();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("S1").unwrap().store_name, "Second");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        let registry = StoreRegistry::load(file.path()).unwrap();
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_load_missing_file_fails() {
        let err = StoreRegistry::load("/nonexistent/stores.csv").unwrap_err();
        assert!(matches!(err, RegistryError::Io(_)));
    }
}
