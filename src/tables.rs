use std::{fs, path::Path};

use anyhow::{Context, bail};
use trainer::data::{Column, DataType, Row, Schema, Value};

/// Loads a CSV file with a header line into a schema and its rows.
///
/// Column types are inferred from the non empty cells: integers, floats (integers widen to
/// floats), `true`/`false`, anything else is text. Empty cells are nulls.
pub fn load_csv(path: &Path) -> anyhow::Result<(Schema, Vec<Row>)> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("cannot read table '{}'", path.display()))?;

    parse_csv(&content).with_context(|| format!("invalid table '{}'", path.display()))
}

pub fn parse_csv(content: &str) -> anyhow::Result<(Schema, Vec<Row>)> {
    let mut lines = content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty());

    let Some((_, header)) = lines.next() else {
        bail!("missing header line");
    };
    let names: Vec<&str> = header.split(',').map(str::trim).collect();

    let mut raw = Vec::new();
    for (i, line) in lines {
        let cells: Vec<&str> = line.split(',').map(str::trim).collect();
        if cells.len() != names.len() {
            bail!(
                "line {}: expected {} values, got {}",
                i + 1,
                names.len(),
                cells.len()
            );
        }
        raw.push(cells);
    }

    let types: Vec<DataType> = (0..names.len())
        .map(|k| {
            raw.iter()
                .filter_map(|cells| infer(cells[k]))
                .reduce(unify)
                .unwrap_or(DataType::Float)
        })
        .collect();

    let schema = Schema::new(
        names
            .iter()
            .zip(&types)
            .map(|(name, &data_type)| Column::new(*name, data_type))
            .collect(),
    );

    let rows = raw
        .iter()
        .map(|cells| {
            cells
                .iter()
                .zip(&types)
                .map(|(cell, &data_type)| convert(cell, data_type))
                .collect()
        })
        .collect();

    Ok((schema, rows))
}

fn infer(cell: &str) -> Option<DataType> {
    if cell.is_empty() {
        None
    } else if cell.parse::<i64>().is_ok() {
        Some(DataType::Int)
    } else if cell.parse::<f64>().is_ok() {
        Some(DataType::Float)
    } else if parse_bool(cell).is_some() {
        Some(DataType::Bool)
    } else {
        Some(DataType::Text)
    }
}

fn unify(a: DataType, b: DataType) -> DataType {
    match (a, b) {
        (a, b) if a == b => a,
        (DataType::Int, DataType::Float) | (DataType::Float, DataType::Int) => DataType::Float,
        _ => DataType::Text,
    }
}

fn parse_bool(cell: &str) -> Option<bool> {
    match cell.to_ascii_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

fn convert(cell: &str, data_type: DataType) -> Value {
    if cell.is_empty() {
        return Value::Null;
    }

    let value = match data_type {
        DataType::Int => cell.parse().ok().map(Value::Int),
        DataType::Float => cell.parse().ok().map(Value::Float),
        DataType::Bool => parse_bool(cell).map(Value::Bool),
        DataType::Text => None,
    };

    value.unwrap_or_else(|| Value::Text(cell.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infers_one_type_per_column() {
        let (schema, rows) = parse_csv(
            "id, x, flag, name, empty\n\
             1, 2, true, a,\n\
             \n\
             2, 2.5, FALSE, 3,\n",
        )
        .unwrap();

        let types: Vec<_> = schema.columns().iter().map(|c| c.data_type).collect();
        assert_eq!(
            types,
            [
                DataType::Int,
                DataType::Float,
                DataType::Bool,
                DataType::Text,
                DataType::Float,
            ]
        );

        assert_eq!(
            rows[1],
            [
                Value::Int(2),
                Value::Float(2.5),
                Value::Bool(false),
                Value::from("3"),
                Value::Null,
            ]
        );
        assert_eq!(rows[0][1], Value::Float(2.0));
    }

    #[test]
    fn ragged_lines_are_rejected() {
        let err = parse_csv("a,b\n1,2\n3\n").unwrap_err();
        assert!(err.to_string().contains("line 3"));
        assert!(parse_csv("\n\n").is_err());
    }
}
