use std::fs::File;
use std::io::ErrorKind;
use std::path::PathBuf;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::event;

use crate::errors::AgentError;

/// Filesystem storage for learned agent models.
///
/// Each model lands in one JSON file named `{name}_{player}.json` under
/// the base directory, where `name` identifies the agent variant and
/// `player` the seat it was trained in. The directory is created on the
/// first save.
#[derive(Debug, Clone)]
pub struct ModelStore {
    base_path: PathBuf,
}

impl ModelStore {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    /// The file that backs the given agent name and player index.
    pub fn model_path(&self, name: &str, player: usize) -> PathBuf {
        self.base_path
            .join(format!("{name}_{player}"))
            .with_extension("json")
    }

    /// Serialize a model, replacing any previous save for the same name
    /// and player.
    pub fn save<T: Serialize>(
        &self,
        name: &str,
        player: usize,
        model: &T,
    ) -> Result<(), AgentError> {
        if !self.base_path.exists() {
            std::fs::create_dir_all(&self.base_path)?;
        }
        let path = self.model_path(name, player);
        let file = File::create(&path)?;
        serde_json::to_writer_pretty(file, model)?;
        event!(tracing::Level::INFO, "saved model to {}", path.display());
        Ok(())
    }

    /// Deserialize a previously saved model.
    ///
    /// A save that never happened is reported as
    /// [`AgentError::MissingModelFile`] so callers can tell "train first"
    /// apart from real IO failures.
    pub fn load<T: DeserializeOwned>(&self, name: &str, player: usize) -> Result<T, AgentError> {
        let path = self.model_path(name, player);
        let file = File::open(&path).map_err(|err| match err.kind() {
            ErrorKind::NotFound => AgentError::MissingModelFile { path: path.clone() },
            _ => AgentError::Io(err),
        })?;
        Ok(serde_json::from_reader(file)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = ModelStore::new(dir.path());

        let table: Vec<(u8, Vec<f64>)> = vec![(0, vec![0.25, 0.75]), (1, vec![-1.5, 2.0])];
        store.save("q", 0, &table).unwrap();

        let loaded: Vec<(u8, Vec<f64>)> = store.load("q", 0).unwrap();
        assert_eq!(table, loaded);
    }

    #[test]
    fn test_save_creates_base_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("models").join("run_1");
        let store = ModelStore::new(&nested);

        store.save("minimax", 1, &vec![1.0, 2.0]).unwrap();
        assert!(nested.join("minimax_1.json").exists());
    }

    #[test]
    fn test_load_missing_model_is_its_own_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = ModelStore::new(dir.path());

        let err = store.load::<Vec<f64>>("q", 1).unwrap_err();
        match err {
            AgentError::MissingModelFile { path } => {
                assert_eq!(store.model_path("q", 1), path);
            }
            other => panic!("expected MissingModelFile, got {other:?}"),
        }
    }

    #[test]
    fn test_model_path_names_agent_and_player() {
        let store = ModelStore::new("/tmp/models");
        assert_eq!(
            PathBuf::from("/tmp/models/kappa_0.json"),
            store.model_path("kappa", 0)
        );
    }
}
