mod cli;
mod tables;

use std::io;

use anyhow::anyhow;
use clap::Parser;
use log::info;
use orchestrator::{MemoryEngine, Outcome, Session, TrainingReport, statement};

use cli::{Cli, Printer};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = cli.session_config()?;

    let mut engine = MemoryEngine::new();
    for (name, path) in &config.tables {
        let (schema, rows) = tables::load_csv(path)?;
        info!("loaded table {name} from {}", path.display());
        engine.register(name.clone(), schema, rows);
    }

    let session = Session::open(Box::new(engine), config)?;
    let script = cli.read_script()?;

    for sql in statement::split_script(&script)? {
        let mut printer = Printer::new(io::stdout().lock(), cli.format);

        let outcome = session
            .execute(&sql, &mut printer)
            .map_err(|e| anyhow!("{:?} error: {e}\nin statement: {sql}", e.kind()))?;

        match outcome {
            Outcome::Trained(report) => print_report(&report),
            Outcome::Inferred { model, rows } => eprintln!("INFER {model}: {rows} row(s)"),
        }
    }

    Ok(())
}

fn print_report(report: &TrainingReport) {
    for notice in &report.notices {
        eprintln!("NOTICE: {notice}");
    }

    let loss = report
        .final_loss()
        .map_or_else(|| "n/a".to_string(), |l| format!("{l:.6}"));

    eprintln!(
        "CREATE MODEL {} ({}): {} row(s), {} batch(es) per epoch, {} row(s) dropped per epoch, {} step(s), final loss {loss}, {} byte(s)",
        report.model,
        report.kind,
        report.rows,
        report.batches_per_epoch,
        report.dropped_rows_per_epoch,
        report.steps,
        report.blob_size,
    );
}
