use log::trace;

use super::{BatchBuffer, ResultCursor, Value};
use crate::{ColumnMapping, Result, TrainErr};

/// Pulls rows from `cursor` into `buffer` until the batch is full or the cursor runs dry.
///
/// A null or non numeric cell at any mapped position fails the whole batch; whatever was already
/// written is left behind as garbage, never handed out.
///
/// # Arguments
/// * `cursor` - The row source, read sequentially.
/// * `mapping` - Which cells feed which tensor column.
/// * `buffer` - The destination, overwritten from row 0.
///
/// # Returns
/// The amount of rows written, lower than the batch size only when the cursor is exhausted.
pub fn fill_batch<C>(cursor: &mut C, mapping: &ColumnMapping, buffer: &mut BatchBuffer) -> Result<usize>
where
    C: ResultCursor + ?Sized,
{
    let batch_size = buffer.batch_size();
    let mut filled = 0;

    while filled < batch_size {
        let Some(row) = cursor.next_row()? else {
            break;
        };

        pack_row(buffer, filled, &row, mapping)?;
        filled += 1;
    }

    trace!(filled = filled, batch_size = batch_size; "batch materialized");
    Ok(filled)
}

/// Writes the mapped input and label cells of `row` into row `slot` of `buffer`.
pub fn pack_row(
    buffer: &mut BatchBuffer,
    slot: usize,
    row: &[Value],
    mapping: &ColumnMapping,
) -> Result<()> {
    let (mut inputs, mut labels) = buffer.parts_mut();

    for (k, (&pos, name)) in mapping.input().iter().zip(mapping.input_names()).enumerate() {
        inputs[[slot, k]] = cell(row, pos, name, || TrainErr::NullFeatureValue {
            column: name.clone(),
        })?;
    }

    for (k, (&pos, name)) in mapping.label().iter().zip(mapping.label_names()).enumerate() {
        labels[[slot, k]] = cell(row, pos, name, || TrainErr::NullLabelValue {
            column: name.clone(),
        })?;
    }

    Ok(())
}

/// Writes only the mapped input cells of `row` into row `slot` of `buffer`.
pub fn pack_inputs(
    buffer: &mut BatchBuffer,
    slot: usize,
    row: &[Value],
    mapping: &ColumnMapping,
) -> Result<()> {
    let (mut inputs, _) = buffer.parts_mut();

    for (k, (&pos, name)) in mapping.input().iter().zip(mapping.input_names()).enumerate() {
        inputs[[slot, k]] = cell(row, pos, name, || TrainErr::NullFeatureValue {
            column: name.clone(),
        })?;
    }

    Ok(())
}

fn cell<F>(row: &[Value], pos: usize, name: &str, on_null: F) -> Result<f32>
where
    F: FnOnce() -> TrainErr,
{
    let value = row.get(pos).ok_or_else(|| {
        TrainErr::Cursor(format!(
            "row has {} cells but column {name} sits at offset {pos}",
            row.len()
        ))
    })?;

    if value.is_null() {
        return Err(on_null());
    }

    value.as_f32().ok_or_else(|| TrainErr::NonNumericValue {
        column: name.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Column, DataType, MemoryCursor, Schema};
    use ndarray::array;

    fn schema() -> Schema {
        Schema::new(vec![
            Column::new("x1", DataType::Float),
            Column::new("x2", DataType::Int),
            Column::new("y", DataType::Float),
        ])
    }

    fn row(x1: f64, x2: i64, y: f64) -> Vec<Value> {
        vec![Value::Float(x1), Value::Int(x2), Value::Float(y)]
    }

    #[test]
    fn fills_full_then_short_batch() {
        let rows = vec![row(1.0, 2, 3.0), row(4.0, 5, 6.0), row(7.0, 8, 9.0)];
        let mut cursor = MemoryCursor::new(schema(), rows);
        let mapping = ColumnMapping::resolve(cursor.schema(), &["x2", "x1"], &["y"]).unwrap();
        let mut buffer = BatchBuffer::new(2, 2, 1);

        assert_eq!(fill_batch(&mut cursor, &mapping, &mut buffer).unwrap(), 2);
        assert_eq!(buffer.inputs(2), array![[2.0_f32, 1.0], [5.0, 4.0]]);
        assert_eq!(buffer.labels(2), array![[3.0_f32], [6.0]]);

        assert_eq!(fill_batch(&mut cursor, &mapping, &mut buffer).unwrap(), 1);
        assert_eq!(buffer.inputs(1), array![[8.0_f32, 7.0]]);

        assert_eq!(fill_batch(&mut cursor, &mapping, &mut buffer).unwrap(), 0);
    }

    #[test]
    fn null_input_fails_a_one_row_batch() {
        let rows = vec![vec![Value::Null, Value::Int(1), Value::Float(1.0)]];
        let mut cursor = MemoryCursor::new(schema(), rows);
        let mapping = ColumnMapping::resolve(cursor.schema(), &["x1", "x2"], &["y"]).unwrap();
        let mut buffer = BatchBuffer::new(1, 2, 1);

        let err = fill_batch(&mut cursor, &mapping, &mut buffer).unwrap_err();
        assert!(matches!(err, TrainErr::NullFeatureValue { column } if column == "x1"));
    }

    #[test]
    fn null_label_is_reported_as_such() {
        let rows = vec![row(1.0, 1, 1.0), vec![Value::Float(1.0), Value::Int(1), Value::Null]];
        let mut cursor = MemoryCursor::new(schema(), rows);
        let mapping = ColumnMapping::resolve(cursor.schema(), &["x1"], &["y"]).unwrap();
        let mut buffer = BatchBuffer::new(2, 1, 1);

        let err = fill_batch(&mut cursor, &mapping, &mut buffer).unwrap_err();
        assert!(matches!(err, TrainErr::NullLabelValue { column } if column == "y"));
    }

    #[test]
    fn text_cells_are_rejected() {
        let rows = vec![vec![Value::from("1.5"), Value::Int(1), Value::Float(1.0)]];
        let mut cursor = MemoryCursor::new(schema(), rows);
        let mapping = ColumnMapping::resolve(cursor.schema(), &["x1"], &["y"]).unwrap();
        let mut buffer = BatchBuffer::new(1, 1, 1);

        let err = fill_batch(&mut cursor, &mapping, &mut buffer).unwrap_err();
        assert!(matches!(err, TrainErr::NonNumericValue { .. }));
    }
}
