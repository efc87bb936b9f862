use std::fmt;

use log::{debug, info, warn};
use machine_learning::{Model, ModelConfig, ModelHandle, ModelKind};
use trainer::{ColumnMapping, TrainConfig, TrainingLoop, TrainingMetrics};

use crate::{
    Result,
    configs::{HyperParams, SessionConfig, parse_model_options},
    engine::QueryEngine,
    inference::{InferenceDispatcher, RowSink},
    options::OptionTable,
    registry::{DirStore, MemoryStore, ModelStore, Registry},
    statement::{self, CreateModel, Infer, Statement},
};

/// The phases a `CREATE MODEL` statement goes through. `Failed` can follow any phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Init,
    MaterializeSchema,
    CreateHandle,
    EpochLoop,
    Serialize,
    Persist,
    Done,
    Failed,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Init => "init",
            Self::MaterializeSchema => "materialize schema",
            Self::CreateHandle => "create handle",
            Self::EpochLoop => "epoch loop",
            Self::Serialize => "serialize",
            Self::Persist => "persist",
            Self::Done => "done",
            Self::Failed => "failed",
        };

        f.write_str(name)
    }
}

/// What a successful `CREATE MODEL` did.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingReport {
    pub model: String,
    pub kind: ModelKind,
    pub rows: usize,
    pub batches_per_epoch: usize,
    pub dropped_rows_per_epoch: usize,
    pub epoch_losses: Vec<f32>,
    pub steps: u64,
    pub blob_size: usize,
    pub notices: Vec<String>,
}

impl TrainingReport {
    pub fn final_loss(&self) -> Option<f32> {
        self.epoch_losses.last().copied()
    }
}

/// The result of executing one statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Trained(TrainingReport),
    Inferred { model: String, rows: usize },
}

/// Executes model statements against a query engine and a model registry.
pub struct Session {
    engine: Box<dyn QueryEngine>,
    registry: Registry,
    config: SessionConfig,
}

impl Session {
    /// Creates a new `Session`.
    ///
    /// # Arguments
    /// * `engine` - Runs the query part of every statement.
    /// * `store` - Holds the model records.
    /// * `config` - The session settings.
    ///
    /// # Returns
    /// A new `Session` instance.
    pub fn new(
        engine: Box<dyn QueryEngine>,
        store: Box<dyn ModelStore>,
        config: SessionConfig,
    ) -> Self {
        Self {
            engine,
            registry: Registry::new(store),
            config,
        }
    }

    /// Creates a `Session` whose model store is picked by `config.models_dir`.
    pub fn open(engine: Box<dyn QueryEngine>, config: SessionConfig) -> Result<Self> {
        let store: Box<dyn ModelStore> = match &config.models_dir {
            Some(dir) => {
                info!("keeping models in {}", dir.display());
                Box::new(DirStore::open(dir)?)
            }
            None => Box::new(MemoryStore::new()),
        };

        Ok(Self::new(engine, store, config))
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Parses and executes one statement.
    ///
    /// # Arguments
    /// * `sql` - The statement text.
    /// * `sink` - Receives the output rows of an `INFER`; untouched by `CREATE MODEL`.
    pub fn execute<S: RowSink + ?Sized>(&self, sql: &str, sink: &mut S) -> Result<Outcome> {
        match statement::parse(sql)? {
            Statement::CreateModel(stmt) => self.create_model(&stmt).map(Outcome::Trained),
            Statement::Infer(stmt) => {
                let rows = self.infer(&stmt, sink)?;
                Ok(Outcome::Inferred {
                    model: stmt.name,
                    rows,
                })
            }
        }
    }

    /// Trains a model on the rows of the statement's query and persists it.
    ///
    /// Everything allocated along the way belongs to this call and is released on return, on
    /// success and on failure alike.
    pub fn create_model(&self, stmt: &CreateModel) -> Result<TrainingReport> {
        let mut run = TrainingRun::new(stmt);

        match run.execute(self.engine.as_ref(), &self.registry) {
            Ok(report) => {
                run.enter(Phase::Done);
                Ok(report)
            }
            Err(e) => {
                warn!("CREATE MODEL {} failed during {}: {e}", stmt.name, run.phase);
                run.enter(Phase::Failed);
                Err(e)
            }
        }
    }

    /// Runs the statement's query through a stored model.
    ///
    /// # Returns
    /// The amount of rows sent to `sink`.
    pub fn infer<S: RowSink + ?Sized>(&self, stmt: &Infer, sink: &mut S) -> Result<usize> {
        let model = self.registry.load(&stmt.name)?;
        let input = match &stmt.input {
            Some(columns) => columns.clone(),
            None => model.config().input_columns.clone(),
        };

        let mut cursor = self.engine.execute(&stmt.query)?;
        InferenceDispatcher::new(self.config.inference_batch_size).dispatch(
            cursor.as_mut(),
            &model,
            &input,
            sink,
        )
    }
}

/// The state of one `CREATE MODEL` execution.
struct TrainingRun<'a> {
    stmt: &'a CreateModel,
    phase: Phase,
    notices: Vec<String>,
}

impl<'a> TrainingRun<'a> {
    fn new(stmt: &'a CreateModel) -> Self {
        Self {
            stmt,
            phase: Phase::Init,
            notices: Vec::new(),
        }
    }

    fn enter(&mut self, phase: Phase) {
        debug!(model = self.stmt.name.as_str(); "{} -> {phase}", self.phase);
        self.phase = phase;
    }

    fn execute(&mut self, engine: &dyn QueryEngine, registry: &Registry) -> Result<TrainingReport> {
        let stmt = self.stmt;

        let table = OptionTable::build(stmt.options.iter().map(|(k, v)| (k, v.clone())))?;
        let params = HyperParams::from_options(&table, &mut self.notices)?;
        let model_params = parse_model_options(stmt.kind, &table)?;
        debug!("{} options: {params:?}, {model_params:?}", stmt.kind);

        self.enter(Phase::MaterializeSchema);
        let mut cursor = engine.execute(&stmt.query)?;
        let mapping = ColumnMapping::resolve(cursor.schema(), &stmt.input, &stmt.label)?;
        info!("count: {}", cursor.row_count());

        self.enter(Phase::CreateHandle);
        let mut model = ModelHandle::create(ModelConfig {
            kind: stmt.kind,
            input_size: mapping.input_width(),
            label_size: mapping.label_width(),
            optimizer: params.optimizer,
            learning_rate: params.learning_rate,
            seed: params.seed,
            input_columns: mapping.input_names().to_vec(),
            label_columns: mapping.label_names().to_vec(),
        })?;

        self.enter(Phase::EpochLoop);
        let cfg = TrainConfig::new(params.epochs, params.batch_size);
        let metrics = TrainingLoop::new(cfg, &mapping).run(cursor.as_mut(), &mut model)?;
        drop(cursor);

        if metrics.steps == 0 {
            self.notice(format!(
                "{} row(s) can't fill a batch of {}, model {} is saved untrained",
                metrics.total_rows, params.batch_size, stmt.name
            ));
        }

        self.enter(Phase::Serialize);
        let binary = model.serialize()?;
        drop(model);
        info!("model bin size: {}", binary.len());

        self.enter(Phase::Persist);
        let blob_size = binary.len();
        registry.persist(&stmt.name, stmt.kind.as_str(), binary)?;

        Ok(self.report(metrics, blob_size))
    }

    fn notice(&mut self, msg: String) {
        warn!("{msg}");
        self.notices.push(msg);
    }

    fn report(&mut self, metrics: TrainingMetrics, blob_size: usize) -> TrainingReport {
        TrainingReport {
            model: self.stmt.name.clone(),
            kind: self.stmt.kind,
            rows: metrics.total_rows,
            batches_per_epoch: metrics.batches_per_epoch,
            dropped_rows_per_epoch: metrics.dropped_rows_per_epoch,
            epoch_losses: metrics.epoch_losses,
            steps: metrics.steps,
            blob_size,
            notices: std::mem::take(&mut self.notices),
        }
    }
}
