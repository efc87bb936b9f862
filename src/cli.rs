use std::{
    fs,
    io::{self, Read, Write},
    path::PathBuf,
};

use anyhow::Context;
use clap::{Parser, ValueEnum};
use orchestrator::{RowSink, SessionConfig};
use trainer::data::{Row, Schema, Value};

#[derive(Parser, Debug)]
#[command(author, version, about = "Train and apply models with SQL statements", long_about = None)]
pub struct Cli {
    /// Session settings, as a JSON file.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// A CSV backed table, as `name=path.csv`. May be repeated.
    #[arg(long = "table", value_parser = parse_table)]
    pub tables: Vec<(String, PathBuf)>,

    /// Keep models in this directory instead of in memory.
    #[arg(long)]
    pub models_dir: Option<PathBuf>,

    /// How inference rows are printed.
    #[arg(long, value_enum, default_value_t = Format::Tsv)]
    pub format: Format,

    /// The `;` separated statements to run. Read from stdin when absent.
    pub script: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Tsv,
    Json,
}

impl Cli {
    /// Merges the config file with the command line, the command line winning.
    pub fn session_config(&self) -> anyhow::Result<SessionConfig> {
        let mut config = match &self.config {
            Some(path) => SessionConfig::from_path(path)
                .with_context(|| format!("cannot load config '{}'", path.display()))?,
            None => SessionConfig::default(),
        };

        config.tables.extend(self.tables.iter().cloned());
        if let Some(dir) = &self.models_dir {
            config.models_dir = Some(dir.clone());
        }

        Ok(config)
    }

    pub fn read_script(&self) -> anyhow::Result<String> {
        match &self.script {
            Some(path) => fs::read_to_string(path)
                .with_context(|| format!("cannot read script '{}'", path.display())),
            None => {
                let mut script = String::new();
                io::stdin().read_to_string(&mut script)?;
                Ok(script)
            }
        }
    }
}

fn parse_table(arg: &str) -> Result<(String, PathBuf), String> {
    match arg.split_once('=') {
        Some((name, path)) if !name.is_empty() && !path.is_empty() => {
            Ok((name.to_string(), PathBuf::from(path)))
        }
        _ => Err(format!("expected name=path.csv, got '{arg}'")),
    }
}

/// Prints inference rows as they arrive.
pub struct Printer<W: Write> {
    out: W,
    format: Format,
    names: Vec<String>,
}

impl<W: Write> Printer<W> {
    pub fn new(out: W, format: Format) -> Self {
        Self {
            out,
            format,
            names: Vec::new(),
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> RowSink for Printer<W> {
    fn begin(&mut self, schema: &Schema) -> orchestrator::Result<()> {
        self.names = schema.columns().iter().map(|c| c.name.clone()).collect();

        if self.format == Format::Tsv {
            writeln!(self.out, "{}", self.names.join("\t"))?;
        }

        Ok(())
    }

    fn send(&mut self, row: Row) -> orchestrator::Result<()> {
        match self.format {
            Format::Tsv => {
                let cells: Vec<String> = row.iter().map(ToString::to_string).collect();
                writeln!(self.out, "{}", cells.join("\t"))?;
            }
            Format::Json => {
                let object: serde_json::Map<_, _> = self
                    .names
                    .iter()
                    .cloned()
                    .zip(row.iter().map(json_value))
                    .collect();
                writeln!(self.out, "{}", serde_json::Value::Object(object))?;
            }
        }

        Ok(())
    }

    fn end(&mut self) -> orchestrator::Result<()> {
        self.out.flush()?;
        Ok(())
    }
}

fn json_value(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Bool(b) => (*b).into(),
        Value::Int(n) => (*n).into(),
        Value::Float(x) => (*x).into(),
        Value::Text(s) => s.as_str().into(),
    }
}
