use crate::{Result, TrainErr, data::Schema};

/// Positional offsets of the input and label columns within a result set schema.
///
/// Order follows the requested names, not the schema: tensor column `k` holds the cell at
/// `input[k]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMapping {
    input: Vec<usize>,
    label: Vec<usize>,
    input_names: Vec<String>,
    label_names: Vec<String>,
}

impl ColumnMapping {
    /// Resolves column names against a schema.
    ///
    /// Nothing stops a name from appearing in both lists; the same offset then feeds both tensors.
    ///
    /// # Arguments
    /// * `schema` - The result set layout.
    /// * `input_names` - The feature columns, in tensor order.
    /// * `label_names` - The label columns, in tensor order.
    ///
    /// # Returns
    /// The mapping, or the first name that has no live match or isn't numeric.
    pub fn resolve<S: AsRef<str>>(
        schema: &Schema,
        input_names: &[S],
        label_names: &[S],
    ) -> Result<Self> {
        Ok(Self {
            input: Self::offsets(schema, input_names)?,
            label: Self::offsets(schema, label_names)?,
            input_names: input_names.iter().map(|n| n.as_ref().to_string()).collect(),
            label_names: label_names.iter().map(|n| n.as_ref().to_string()).collect(),
        })
    }

    fn offsets<S: AsRef<str>>(schema: &Schema, names: &[S]) -> Result<Vec<usize>> {
        names
            .iter()
            .map(|name| {
                let name = name.as_ref();
                let pos = schema
                    .position(name)
                    .ok_or_else(|| TrainErr::UnknownColumn(name.to_string()))?;

                match schema.column(pos) {
                    Some(c) if !c.data_type.is_numeric() => {
                        Err(TrainErr::NonNumericColumn(name.to_string()))
                    }
                    _ => Ok(pos),
                }
            })
            .collect()
    }

    pub fn input(&self) -> &[usize] {
        &self.input
    }

    pub fn label(&self) -> &[usize] {
        &self.label
    }

    pub fn input_names(&self) -> &[String] {
        &self.input_names
    }

    pub fn label_names(&self) -> &[String] {
        &self.label_names
    }

    pub fn input_width(&self) -> usize {
        self.input.len()
    }

    pub fn label_width(&self) -> usize {
        self.label.len()
    }
}
