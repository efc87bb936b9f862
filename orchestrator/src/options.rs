use std::{collections::HashMap, fmt};

use crate::{OrchestratorError, Result};

/// Option names are compared on at most this many bytes.
pub const MAX_OPTION_NAME_LEN: usize = 31;

/// A literal option value, tagged with the kind it was written as.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    Integer(i64),
    Float(f64),
    String(String),
}

impl OptionValue {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::String(_) => "string",
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v:?}"),
            Self::String(v) => write!(f, "'{v}'"),
        }
    }
}

/// The `OPTIONS (...)` of one statement, keyed by name.
#[derive(Debug, Default)]
pub struct OptionTable {
    entries: HashMap<String, OptionValue>,
}

impl OptionTable {
    /// Builds the table from the options in the order they were written.
    ///
    /// Names longer than `MAX_OPTION_NAME_LEN` bytes are cut before insertion, so two names that
    /// only differ past that point collide.
    ///
    /// # Arguments
    /// * `options` - The `(name, value)` pairs.
    ///
    /// # Returns
    /// The table, or `DuplicateOption` with the first repeated name.
    pub fn build<I, K>(options: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, OptionValue)>,
        K: AsRef<str>,
    {
        let mut entries = HashMap::new();

        for (name, value) in options {
            let name = name.as_ref();
            let key = truncate_key(name).to_string();

            if entries.insert(key, value).is_some() {
                return Err(OrchestratorError::DuplicateOption(name.to_string()));
            }
        }

        Ok(Self { entries })
    }

    pub fn get(&self, name: &str) -> Option<&OptionValue> {
        self.entries.get(truncate_key(name))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn truncate_key(name: &str) -> &str {
    if name.len() <= MAX_OPTION_NAME_LEN {
        return name;
    }

    let mut end = MAX_OPTION_NAME_LEN;
    while !name.is_char_boundary(end) {
        end -= 1;
    }

    &name[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicates_are_rejected_wherever_they_appear() {
        let orders = [
            vec!["lr", "lr", "epochs"],
            vec!["lr", "epochs", "lr"],
            vec!["epochs", "lr", "lr"],
        ];

        for names in orders {
            let options = names.iter().map(|&n| (n, OptionValue::Float(0.1)));
            let err = OptionTable::build(options).unwrap_err();
            assert!(matches!(err, OrchestratorError::DuplicateOption(name) if name == "lr"));
        }
    }

    #[test]
    fn values_keep_their_literal_kind() {
        let table = OptionTable::build([
            ("lr", OptionValue::Float(0.5)),
            ("epochs", OptionValue::Integer(3)),
            ("opt", OptionValue::String("adam".into())),
        ])
        .unwrap();

        assert_eq!(table.len(), 3);
        assert_eq!(table.get("lr"), Some(&OptionValue::Float(0.5)));
        assert_eq!(table.get("epochs"), Some(&OptionValue::Integer(3)));
        assert_eq!(table.get("opt").map(|v| v.kind_name()), Some("string"));
        assert_eq!(table.get("batch_size"), None);
    }

    #[test]
    fn long_names_collide_on_their_prefix() {
        let a = format!("{}a", "k".repeat(MAX_OPTION_NAME_LEN));
        let b = format!("{}b", "k".repeat(MAX_OPTION_NAME_LEN));

        let err = OptionTable::build([
            (a.as_str(), OptionValue::Integer(1)),
            (b.as_str(), OptionValue::Integer(2)),
        ])
        .unwrap_err();
        assert!(matches!(err, OrchestratorError::DuplicateOption(name) if name == b));

        let table = OptionTable::build([(a.as_str(), OptionValue::Integer(1))]).unwrap();
        assert_eq!(table.get(&b), Some(&OptionValue::Integer(1)));
    }
}
