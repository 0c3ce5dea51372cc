use crate::domain::model::Declaration;
use crate::domain::ports::Storage;
use crate::utils::error::{CmError, Result};
use std::path::{Path, PathBuf};

/// Reads declaration files relative to a base directory.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }
}

impl Storage for LocalStorage {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let full_path = self.base_path.join(path);
        tracing::debug!("📂 Reading {}", full_path.display());
        let data = tokio::fs::read(&full_path).await.map_err(|e| {
            tracing::error!("📂 Cannot read {}: {}", full_path.display(), e);
            CmError::IoError(e)
        })?;
        Ok(data)
    }
}

/// Loads a JSON declaration through any [`Storage`].
pub async fn load_declaration<S: Storage>(storage: &S, path: &str) -> Result<Declaration> {
    let bytes = storage.read_file(path).await?;
    Declaration::from_slice(&bytes).map_err(|e| CmError::InvalidConfigValueError {
        field: "declaration".to_string(),
        value: path.to_string(),
        reason: format!("not valid JSON: {}", e),
    })
}
