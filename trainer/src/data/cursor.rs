use super::{Row, Schema};
use crate::Result;

/// A rewindable, sequential source of rows produced by running a query.
pub trait ResultCursor {
    /// The layout of every row this cursor yields.
    fn schema(&self) -> &Schema;

    /// Total amount of rows in the result set.
    fn row_count(&self) -> usize;

    /// Moves the cursor back to the first row.
    fn rewind(&mut self) -> Result<()>;

    /// Returns the next row, or `None` once the result set is exhausted.
    fn next_row(&mut self) -> Result<Option<Row>>;
}

impl<T: ResultCursor + ?Sized> ResultCursor for Box<T> {
    fn schema(&self) -> &Schema {
        (**self).schema()
    }

    fn row_count(&self) -> usize {
        (**self).row_count()
    }

    fn rewind(&mut self) -> Result<()> {
        (**self).rewind()
    }

    fn next_row(&mut self) -> Result<Option<Row>> {
        (**self).next_row()
    }
}

/// A fully materialized result set held in memory.
#[derive(Debug, Clone)]
pub struct MemoryCursor {
    schema: Schema,
    rows: Vec<Row>,
    cursor: usize,
}

impl MemoryCursor {
    pub fn new(schema: Schema, rows: Vec<Row>) -> Self {
        Self {
            schema,
            rows,
            cursor: 0,
        }
    }
}

impl ResultCursor for MemoryCursor {
    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn rewind(&mut self) -> Result<()> {
        self.cursor = 0;
        Ok(())
    }

    fn next_row(&mut self) -> Result<Option<Row>> {
        let row = self.rows.get(self.cursor).cloned();
        if row.is_some() {
            self.cursor += 1;
        }

        Ok(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Column, DataType, Value};

    #[test]
    fn memory_cursor_rewinds_to_the_start() {
        let schema = Schema::new(vec![Column::new("x", DataType::Int)]);
        let rows = (0..3).map(|i| vec![Value::Int(i)]).collect();
        let mut cursor = MemoryCursor::new(schema, rows);

        assert_eq!(cursor.row_count(), 3);
        for i in 0..3 {
            assert_eq!(cursor.next_row().unwrap(), Some(vec![Value::Int(i)]));
        }
        assert_eq!(cursor.next_row().unwrap(), None);

        cursor.rewind().unwrap();
        assert_eq!(cursor.next_row().unwrap(), Some(vec![Value::Int(0)]));
    }
}
