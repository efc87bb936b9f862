use std::collections::HashMap;

use log::debug;
use sqlparser::tokenizer::Token;
use trainer::data::{Column, MemoryCursor, ResultCursor, Row, Schema, Value};

use crate::{OrchestratorError, Result, tokens::Tokens};

/// Runs the query part of a statement.
pub trait QueryEngine {
    /// Executes `sql` and returns a rewindable cursor over its result set.
    fn execute(&self, sql: &str) -> Result<Box<dyn ResultCursor>>;
}

#[derive(Debug, Clone)]
struct Table {
    schema: Schema,
    rows: Vec<Row>,
}

/// A query engine over tables held in memory.
///
/// Understands `SELECT <col>[, ...] | * FROM <table> [LIMIT <n>]`, which is enough to feed the
/// model statements.
#[derive(Debug, Default)]
pub struct MemoryEngine {
    tables: HashMap<String, Table>,
}

impl MemoryEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a table, replacing any table with the same name.
    pub fn register(&mut self, name: impl Into<String>, schema: Schema, rows: Vec<Row>) {
        let name = name.into();
        debug!("registered table {name} with {} row(s)", rows.len());
        self.tables.insert(name, Table { schema, rows });
    }

    fn projection(schema: &Schema, names: &[String]) -> Result<Vec<usize>> {
        names
            .iter()
            .map(|name| {
                schema
                    .position(name)
                    .ok_or_else(|| OrchestratorError::Query(format!("column {name} does not exist")))
            })
            .collect()
    }
}

/// The parts of a `SELECT` the memory engine understands.
struct Select {
    columns: Option<Vec<String>>,
    table: String,
    limit: Option<usize>,
}

impl Select {
    fn parse(sql: &str) -> Result<Self> {
        let mut tokens = Tokens::new(sql)?;
        tokens.expect_keyword("SELECT")?;

        let columns = if tokens.eat(&Token::Mul) {
            None
        } else {
            let mut names = vec![tokens.ident("column")?];
            while tokens.eat(&Token::Comma) {
                names.push(tokens.ident("column")?);
            }
            Some(names)
        };

        tokens.expect_keyword("FROM")?;
        let table = tokens.ident("table")?;

        let limit = if tokens.eat_keyword("LIMIT") {
            let n = tokens.unsigned("LIMIT")?;
            Some(usize::try_from(n).unwrap_or(usize::MAX))
        } else {
            None
        };

        tokens.finish()?;
        Ok(Self {
            columns,
            table,
            limit,
        })
    }
}

impl QueryEngine for MemoryEngine {
    fn execute(&self, sql: &str) -> Result<Box<dyn ResultCursor>> {
        let select = Select::parse(sql).map_err(|e| OrchestratorError::Query(e.to_string()))?;

        let table = self.tables.get(&select.table).ok_or_else(|| {
            OrchestratorError::Query(format!("relation {} does not exist", select.table))
        })?;

        let take = select.limit.unwrap_or(table.rows.len());
        let (schema, rows): (Schema, Vec<Row>) = match select.columns {
            None => (
                table.schema.clone(),
                table.rows.iter().take(take).cloned().collect(),
            ),
            Some(names) => {
                let positions = Self::projection(&table.schema, &names)?;
                let schema = Schema::new(
                    positions
                        .iter()
                        .zip(&names)
                        .map(|(&pos, name)| {
                            let data_type = table.schema.columns()[pos].data_type;
                            Column::new(name.clone(), data_type)
                        })
                        .collect(),
                );
                let rows = table
                    .rows
                    .iter()
                    .take(take)
                    .map(|row| {
                        positions
                            .iter()
                            .map(|&pos| row.get(pos).cloned().unwrap_or(Value::Null))
                            .collect()
                    })
                    .collect();
                (schema, rows)
            }
        };

        debug!("{sql} -> {} row(s)", rows.len());
        Ok(Box::new(MemoryCursor::new(schema, rows)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trainer::data::DataType;

    fn engine() -> MemoryEngine {
        let mut engine = MemoryEngine::new();
        let schema = Schema::new(vec![
            Column::new("x", DataType::Int),
            Column::new("y", DataType::Float),
            Column::new("tag", DataType::Text),
        ])
        .with_column(Column::dropped("old", DataType::Int));

        let rows = (0..5)
            .map(|i| {
                vec![
                    Value::Int(i),
                    Value::Float(i as f64 * 0.5),
                    Value::from("t"),
                    Value::Null,
                ]
            })
            .collect();

        engine.register("points", schema, rows);
        engine
    }

    #[test]
    fn star_keeps_the_full_layout() {
        let mut cursor = engine().execute("SELECT * FROM points").unwrap();
        assert_eq!(cursor.schema().len(), 4);
        assert_eq!(cursor.row_count(), 5);
        assert_eq!(cursor.next_row().unwrap().unwrap()[0], Value::Int(0));
    }

    #[test]
    fn projection_and_limit() {
        let mut cursor = engine().execute("select Y, x from points limit 2;").unwrap();

        let names: Vec<_> = cursor.schema().columns().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["y", "x"]);
        assert_eq!(cursor.row_count(), 2);
        assert_eq!(
            cursor.next_row().unwrap(),
            Some(vec![Value::Float(0.0), Value::Int(0)])
        );
    }

    #[test]
    fn unknown_relations_and_columns_fail() {
        let engine = engine();
        for sql in [
            "SELECT * FROM nowhere",
            "SELECT z FROM points",
            "SELECT old FROM points",
            "SELECT x FROM points WHERE x > 1",
            "DELETE FROM points",
        ] {
            assert!(
                matches!(engine.execute(sql), Err(OrchestratorError::Query(_))),
                "{sql}"
            );
        }
    }
}
