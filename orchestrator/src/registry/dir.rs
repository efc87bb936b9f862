use std::{
    fs,
    io::{self, Read, Write},
    path::PathBuf,
};

use log::debug;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use super::{ModelRecord, ModelStore};
use crate::{OrchestratorError, Result};

const EXTENSION: &str = "model";

#[derive(Serialize, Deserialize)]
struct RecordHeader {
    name: String,
    type_tag: String,
    has_binary: bool,
}

/// A `ModelStore` keeping one file per model in a directory.
///
/// Each file holds a one line JSON header followed by the raw binary. A record is first written
/// to a temporary file in the same directory and then linked into place without replacing
/// anything, so a name is claimed atomically and a reader never sees a partial record.
#[derive(Debug, Clone)]
pub struct DirStore {
    root: PathBuf,
}

impl DirStore {
    /// Opens a store rooted at `root`, creating the directory if needed.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    fn path_of(&self, name: &str) -> PathBuf {
        let encoded: String = name.bytes().map(|b| format!("{b:02x}")).collect();
        self.root.join(format!("{encoded}.{EXTENSION}"))
    }
}

impl ModelStore for DirStore {
    fn insert(&self, record: ModelRecord) -> Result<()> {
        let header = RecordHeader {
            name: record.name.clone(),
            type_tag: record.type_tag,
            has_binary: record.binary.is_some(),
        };

        let mut file = NamedTempFile::new_in(&self.root)?;
        serde_json::to_writer(&mut file, &header).map_err(io::Error::from)?;
        file.write_all(b"\n")?;
        if let Some(binary) = &record.binary {
            file.write_all(binary)?;
        }
        file.as_file().sync_all()?;

        let path = self.path_of(&record.name);
        match file.persist_noclobber(&path) {
            Ok(_) => {
                debug!("wrote model record {}", path.display());
                Ok(())
            }
            Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => {
                Err(OrchestratorError::DuplicateModelName(record.name))
            }
            Err(e) => Err(e.error.into()),
        }
    }

    fn get(&self, name: &str) -> Result<Option<ModelRecord>> {
        let mut file = match fs::File::open(self.path_of(name)) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let mut content = Vec::new();
        file.read_to_end(&mut content)?;

        let split = content
            .iter()
            .position(|&b| b == b'\n')
            .ok_or_else(|| corrupt(name, "missing header"))?;

        let header: RecordHeader = serde_json::from_slice(&content[..split])
            .map_err(|e| corrupt(name, &e.to_string()))?;

        if header.name != name {
            return Err(corrupt(name, "header names another model"));
        }

        let binary = header.has_binary.then(|| content[split + 1..].to_vec());
        Ok(Some(ModelRecord {
            name: header.name,
            type_tag: header.type_tag,
            binary,
        }))
    }
}

fn corrupt(name: &str, reason: &str) -> OrchestratorError {
    OrchestratorError::Io(io::Error::new(
        io::ErrorKind::InvalidData,
        format!("model record {name}: {reason}"),
    ))
}
