use std::num::NonZeroUsize;

use machine_learning::{MlErr, Model, ModelConfig, ModelHandle, ModelKind, OptimizerKind};
use ndarray::{Array2, ArrayView2};
use trainer::{
    ColumnMapping, TrainConfig, TrainErr, TrainingLoop,
    data::{Column, DataType, MemoryCursor, ResultCursor, Schema, Value},
};

/// Records the first input column of every batch it is trained on.
struct Recorder {
    config: ModelConfig,
    batches: Vec<Vec<f32>>,
}

impl Recorder {
    fn new() -> Self {
        Self {
            config: config(OptimizerKind::Sgd, 0.1),
            batches: Vec::new(),
        }
    }
}

impl Model for Recorder {
    fn config(&self) -> &ModelConfig {
        &self.config
    }

    fn params(&self) -> &[f32] {
        &[]
    }

    fn forward(&self, x: ArrayView2<f32>) -> Result<Array2<f32>, MlErr> {
        Ok(Array2::zeros((x.nrows(), 1)))
    }

    fn train_step(&mut self, x: ArrayView2<f32>, _y: ArrayView2<f32>) -> Result<f32, MlErr> {
        self.batches.push(x.column(0).to_vec());
        Ok(0.0)
    }
}

fn config(optimizer: OptimizerKind, learning_rate: f32) -> ModelConfig {
    ModelConfig {
        kind: ModelKind::LinearRegression,
        input_size: 2,
        label_size: 1,
        optimizer,
        learning_rate,
        seed: Some(42),
        input_columns: vec!["x1".into(), "x2".into()],
        label_columns: vec!["y".into()],
    }
}

fn schema() -> Schema {
    Schema::new(vec![
        Column::new("id", DataType::Int),
        Column::new("x1", DataType::Float),
        Column::new("x2", DataType::Float),
        Column::new("y", DataType::Float),
    ])
}

/// `y = 3 x1 - 2 x2 + 0.5` over a small grid.
fn dataset(rows: usize) -> MemoryCursor {
    let rows = (0..rows)
        .map(|i| {
            let x1 = (i % 7) as f64 / 7.0;
            let x2 = (i % 5) as f64 / 5.0;
            vec![
                Value::Int(i as i64),
                Value::Float(x1),
                Value::Float(x2),
                Value::Float(3.0 * x1 - 2.0 * x2 + 0.5),
            ]
        })
        .collect();

    MemoryCursor::new(schema(), rows)
}

fn cfg(epochs: usize, batch_size: usize) -> TrainConfig {
    TrainConfig::new(
        NonZeroUsize::new(epochs).unwrap(),
        NonZeroUsize::new(batch_size).unwrap(),
    )
}

#[test]
fn tail_remainder_is_never_trained_on() {
    let mut cursor = dataset(10);
    let mapping = ColumnMapping::resolve(cursor.schema(), &["id", "x1"], &["y"]).unwrap();
    let mut model = Recorder::new();

    let metrics = TrainingLoop::new(cfg(2, 3), &mapping)
        .run(&mut cursor, &mut model)
        .unwrap();

    assert_eq!(metrics.batches_per_epoch, 3);
    assert_eq!(metrics.dropped_rows_per_epoch, 1);
    assert_eq!(metrics.steps, 6);
    assert_eq!(metrics.samples, 18);

    let epoch = vec![
        vec![0.0, 1.0, 2.0],
        vec![3.0, 4.0, 5.0],
        vec![6.0, 7.0, 8.0],
    ];
    let expected: Vec<_> = epoch.iter().chain(epoch.iter()).cloned().collect();
    assert_eq!(model.batches, expected);
    assert!(model.batches.iter().flatten().all(|&id| id != 9.0));
}

#[test]
fn null_input_aborts_the_run() {
    let rows = vec![vec![
        Value::Int(0),
        Value::Null,
        Value::Float(1.0),
        Value::Float(1.0),
    ]];
    let mut cursor = MemoryCursor::new(schema(), rows);
    let mapping = ColumnMapping::resolve(cursor.schema(), &["x1", "x2"], &["y"]).unwrap();
    let mut model = Recorder::new();

    let err = TrainingLoop::new(cfg(3, 1), &mapping)
        .run(&mut cursor, &mut model)
        .unwrap_err();

    assert!(matches!(&err, TrainErr::NullFeatureValue { column } if column == "x1"));
    assert!(err.is_data_error());
    assert!(model.batches.is_empty());
}

#[test]
fn linear_regression_loss_trends_down() {
    for optimizer in [OptimizerKind::Sgd, OptimizerKind::Adam] {
        let mut cursor = dataset(70);
        let mapping = ColumnMapping::resolve(cursor.schema(), &["x1", "x2"], &["y"]).unwrap();
        let mut model = ModelHandle::create(config(optimizer, 0.05)).unwrap();

        let metrics = TrainingLoop::new(cfg(60, 7), &mapping)
            .run(&mut cursor, &mut model)
            .unwrap();

        let losses = &metrics.epoch_losses;
        assert_eq!(losses.len(), 60);

        let head: f32 = losses[..10].iter().sum::<f32>() / 10.0;
        let tail: f32 = losses[50..].iter().sum::<f32>() / 10.0;
        assert!(tail < head, "{optimizer}: {head} -> {tail}");
        assert!(metrics.final_loss().unwrap() < losses[0]);
    }
}
