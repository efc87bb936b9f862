use super::DataType;

/// A result set column. Dropped columns keep their slot but can't be addressed by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub data_type: DataType,
    pub dropped: bool,
}

impl Column {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            dropped: false,
        }
    }

    /// A column slot left behind by a dropped column.
    pub fn dropped(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            dropped: true,
            ..Self::new(name, data_type)
        }
    }
}

/// The ordered column layout of a result set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    columns: Vec<Column>,
}

impl Schema {
    pub fn new(columns: Vec<Column>) -> Self {
        Self { columns }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn column(&self, pos: usize) -> Option<&Column> {
        self.columns.get(pos)
    }

    /// Finds the first live column named exactly `name`, in schema order.
    ///
    /// # Returns
    /// Its zero based offset, or `None` if there is no such live column.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| !c.dropped && c.name == name)
    }

    /// Appends a column, returning the extended schema.
    pub fn with_column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }
}
