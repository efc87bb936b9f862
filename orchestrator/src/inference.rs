use std::num::NonZeroUsize;

use log::{debug, info};
use machine_learning::Model;
use trainer::{
    ColumnMapping,
    data::{BatchBuffer, Column, DataType, ResultCursor, Row, Schema, Value, pack_inputs},
};

use crate::{OrchestratorError, Result};

/// Prefix of the output column holding the prediction for each label.
pub const PREDICTION_PREFIX: &str = "predicted_";

/// Where inference output rows go.
pub trait RowSink {
    /// Announces the layout of every row that follows.
    fn begin(&mut self, schema: &Schema) -> Result<()>;

    fn send(&mut self, row: Row) -> Result<()>;

    /// Called once after the last row.
    fn end(&mut self) -> Result<()>;
}

/// A `RowSink` collecting everything in memory.
#[derive(Debug, Default)]
pub struct VecSink {
    pub schema: Option<Schema>,
    pub rows: Vec<Row>,
    pub finished: bool,
}

impl VecSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RowSink for VecSink {
    fn begin(&mut self, schema: &Schema) -> Result<()> {
        self.schema = Some(schema.clone());
        Ok(())
    }

    fn send(&mut self, row: Row) -> Result<()> {
        self.rows.push(row);
        Ok(())
    }

    fn end(&mut self) -> Result<()> {
        self.finished = true;
        Ok(())
    }
}

/// Streams query rows through a model's forward pass.
pub struct InferenceDispatcher {
    batch_size: NonZeroUsize,
}

impl InferenceDispatcher {
    pub fn new(batch_size: NonZeroUsize) -> Self {
        Self { batch_size }
    }

    /// Emits every row of `cursor`, in order, extended with one `predicted_<label>` column per
    /// model label.
    ///
    /// # Arguments
    /// * `cursor` - The rows to predict on, read once from its current position.
    /// * `model` - The model to evaluate.
    /// * `input` - The input columns in tensor order, as many as the model takes.
    /// * `sink` - The destination of the output rows.
    ///
    /// # Returns
    /// The amount of rows emitted.
    pub fn dispatch<C, M, S>(
        &self,
        cursor: &mut C,
        model: &M,
        input: &[String],
        sink: &mut S,
    ) -> Result<usize>
    where
        C: ResultCursor + ?Sized,
        M: Model + ?Sized,
        S: RowSink + ?Sized,
    {
        let config = model.config();
        if input.len() != config.input_size {
            return Err(OrchestratorError::ColumnCountMismatch {
                expected: config.input_size,
                got: input.len(),
            });
        }

        let no_labels: &[String] = &[];
        let mapping = ColumnMapping::resolve(cursor.schema(), input, no_labels)?;
        let schema = output_schema(cursor.schema(), &config.label_columns);

        let batch_size = self.batch_size.get().min(cursor.row_count().max(1));
        let mut buffer = BatchBuffer::new(batch_size, mapping.input_width(), 0);
        let mut pending: Vec<Row> = Vec::with_capacity(batch_size);
        let mut emitted = 0;

        sink.begin(&schema)?;

        loop {
            pending.clear();
            while pending.len() < batch_size {
                let Some(row) = cursor.next_row()? else {
                    break;
                };

                pack_inputs(&mut buffer, pending.len(), &row, &mapping)?;
                pending.push(row);
            }

            if pending.is_empty() {
                break;
            }

            let predictions = model.forward(buffer.inputs(pending.len()))?;
            for (mut row, prediction) in pending.drain(..).zip(predictions.rows()) {
                row.extend(prediction.iter().map(|&p| Value::Float(p as f64)));
                sink.send(row)?;
                emitted += 1;
            }

            debug!("emitted {emitted} prediction row(s)");
        }

        sink.end()?;
        info!("inference produced {emitted} row(s)");
        Ok(emitted)
    }
}

fn output_schema(input: &Schema, labels: &[String]) -> Schema {
    labels.iter().fold(input.clone(), |schema, label| {
        schema.with_column(Column::new(
            format!("{PREDICTION_PREFIX}{label}"),
            DataType::Float,
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use machine_learning::{ModelConfig, ModelKind, OptimizerKind, models::LinearRegression};
    use trainer::{TrainErr, data::MemoryCursor};

    /// `y = 2 a - b`, exactly.
    fn model() -> LinearRegression {
        let config = ModelConfig {
            kind: ModelKind::LinearRegression,
            input_size: 2,
            label_size: 1,
            optimizer: OptimizerKind::Sgd,
            learning_rate: 0.1,
            seed: None,
            input_columns: vec!["a".into(), "b".into()],
            label_columns: vec!["y".into()],
        };

        LinearRegression::from_parts(config, vec![2.0, -1.0, 0.0]).unwrap()
    }

    fn cursor(rows: Vec<Row>) -> MemoryCursor {
        let schema = Schema::new(vec![
            Column::new("id", DataType::Int),
            Column::new("a", DataType::Float),
            Column::new("b", DataType::Int),
        ]);
        MemoryCursor::new(schema, rows)
    }

    fn columns(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn one_output_row_per_input_row_in_order() {
        let rows = (0..5)
            .map(|i| vec![Value::Int(i), Value::Float(i as f64), Value::Int(1)])
            .collect();
        let mut cursor = cursor(rows);
        let mut sink = VecSink::new();

        let dispatcher = InferenceDispatcher::new(NonZeroUsize::new(2).unwrap());
        let emitted = dispatcher
            .dispatch(&mut cursor, &model(), &columns(&["a", "b"]), &mut sink)
            .unwrap();

        assert_eq!(emitted, 5);
        assert!(sink.finished);

        let schema = sink.schema.unwrap();
        let names: Vec<_> = schema.columns().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["id", "a", "b", "predicted_y"]);

        for (i, row) in sink.rows.iter().enumerate() {
            assert_eq!(row[0], Value::Int(i as i64));
            assert_eq!(row[3], Value::Float(2.0 * i as f64 - 1.0));
        }
    }

    #[test]
    fn batch_size_is_bounded_by_the_result_set() {
        let rows = (0..3)
            .map(|i| vec![Value::Int(i), Value::Float(1.0), Value::Int(0)])
            .collect();
        let mut sink = VecSink::new();

        let emitted = InferenceDispatcher::new(NonZeroUsize::MAX)
            .dispatch(&mut cursor(rows), &model(), &columns(&["a", "b"]), &mut sink)
            .unwrap();

        assert_eq!(emitted, 3);
        assert!(sink.rows.iter().all(|row| row[3] == Value::Float(2.0)));
    }

    #[test]
    fn input_order_follows_the_column_list() {
        let mut cursor = cursor(vec![vec![Value::Int(0), Value::Float(1.0), Value::Int(3)]]);
        let mut sink = VecSink::new();

        InferenceDispatcher::new(NonZeroUsize::new(8).unwrap())
            .dispatch(&mut cursor, &model(), &columns(&["b", "a"]), &mut sink)
            .unwrap();

        assert_eq!(sink.rows[0][3], Value::Float(5.0));
    }

    #[test]
    fn empty_input_still_announces_the_schema() {
        let mut cursor = cursor(Vec::new());
        let mut sink = VecSink::new();

        let emitted = InferenceDispatcher::new(NonZeroUsize::new(8).unwrap())
            .dispatch(&mut cursor, &model(), &columns(&["a", "b"]), &mut sink)
            .unwrap();

        assert_eq!(emitted, 0);
        assert!(sink.schema.is_some() && sink.finished);
    }

    #[test]
    fn bad_inputs_are_rejected() {
        let dispatcher = InferenceDispatcher::new(NonZeroUsize::new(8).unwrap());

        let err = dispatcher
            .dispatch(&mut cursor(Vec::new()), &model(), &columns(&["a"]), &mut VecSink::new())
            .unwrap_err();
        assert!(matches!(
            err,
            OrchestratorError::ColumnCountMismatch { expected: 2, got: 1 }
        ));

        let rows = vec![vec![Value::Int(0), Value::Null, Value::Int(1)]];
        let err = dispatcher
            .dispatch(&mut cursor(rows), &model(), &columns(&["a", "b"]), &mut VecSink::new())
            .unwrap_err();
        assert!(matches!(
            err,
            OrchestratorError::Train(TrainErr::NullFeatureValue { .. })
        ));
    }
}
