use crate::Result;

/// A durable model record. The name is unique among all records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelRecord {
    pub name: String,
    pub type_tag: String,
    pub binary: Option<Vec<u8>>,
}

/// Storage for model records.
pub trait ModelStore {
    /// Inserts a new record, all or nothing.
    ///
    /// # Returns
    /// `DuplicateModelName` if a record with the same name already exists, in which case the
    /// existing record is left untouched.
    fn insert(&self, record: ModelRecord) -> Result<()>;

    /// Fetches the record named `name`, if any.
    fn get(&self, name: &str) -> Result<Option<ModelRecord>>;
}
