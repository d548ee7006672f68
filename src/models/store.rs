use serde::Serialize;

/// Entry of the store reference dataset.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Store {
    pub area_code: String,
    pub store_name: String,
    pub store_id: String,
}
