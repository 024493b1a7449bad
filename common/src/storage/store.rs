use std::{
    io::Write,
    path::{Path, PathBuf},
};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tempfile::NamedTempFile;
use tokio::sync::OwnedMutexGuard;
use tracing::debug;

use crate::{
    error::AppError,
    storage::{
        lock::index_lock,
        types::{
            chunk::Chunk,
            vector_index::{IndexEntry, VectorIndex},
        },
    },
    utils::embedding::EmbeddingProvider,
};

const PERSIST_VERSION: u32 = 1;

/// On-disk envelope. The checksum covers the serialized entries so a
/// truncated or bit-flipped file is reported as corrupt rather than loaded
/// with missing data.
#[derive(Serialize, Deserialize)]
struct PersistedIndex {
    version: u32,
    model: Option<String>,
    dimension: usize,
    created_at: chrono::DateTime<Utc>,
    updated_at: chrono::DateTime<Utc>,
    entries: Vec<IndexEntry>,
    checksum: String,
}

/// Durable, append-friendly similarity index over (chunk, embedding) pairs.
///
/// The store exclusively owns the persisted file. Ingestion and querying
/// never share an in-memory index across requests; each operation re-loads
/// current on-disk state, and `save` replaces the file atomically so a
/// concurrent reader observes either the fully-old or fully-new index.
#[derive(Clone, Debug)]
pub struct VectorIndexStore {
    path: PathBuf,
    model: Option<String>,
    dimension: usize,
}

impl VectorIndexStore {
    pub fn new(path: impl Into<PathBuf>, model: Option<String>, dimension: usize) -> Self {
        Self {
            path: path.into(),
            model,
            dimension,
        }
    }

    pub fn for_provider(path: impl Into<PathBuf>, provider: &EmbeddingProvider) -> Self {
        Self::new(path, provider.model_code(), provider.dimension())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Acquires the named mutex for this index. Writers must hold the guard
    /// across the whole load-modify-save cycle; dropping it releases the
    /// index for the next writer.
    pub async fn lock(&self) -> OwnedMutexGuard<()> {
        index_lock(&self.path).lock_owned().await
    }

    pub async fn load(&self) -> Result<VectorIndex, AppError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(AppError::IndexNotFound(format!(
                    "no index has been created at {}",
                    self.path.display()
                )));
            }
            Err(e) => return Err(e.into()),
        };

        let persisted: PersistedIndex = serde_json::from_slice(&bytes).map_err(|e| {
            AppError::IndexCorrupt(format!(
                "failed to parse index at {}: {e}",
                self.path.display()
            ))
        })?;

        if persisted.version != PERSIST_VERSION {
            return Err(AppError::IndexCorrupt(format!(
                "unsupported index version {}",
                persisted.version
            )));
        }

        let checksum = entries_checksum(&persisted.entries)?;
        if checksum != persisted.checksum {
            return Err(AppError::IndexCorrupt(
                "index checksum mismatch; file is truncated or damaged".into(),
            ));
        }

        if persisted.dimension != self.dimension {
            return Err(AppError::IndexCorrupt(format!(
                "index was built with dimension {} but the configured embedding model uses {}",
                persisted.dimension, self.dimension
            )));
        }

        if persisted.model != self.model {
            return Err(AppError::IndexCorrupt(format!(
                "index was built with embedding model {:?} but {:?} is configured",
                persisted.model, self.model
            )));
        }

        Ok(VectorIndex {
            model: persisted.model,
            dimension: persisted.dimension,
            created_at: persisted.created_at,
            updated_at: persisted.updated_at,
            entries: persisted.entries,
        })
    }

    /// Builds a fresh index from parallel chunk/embedding sequences.
    pub fn create_from(
        &self,
        chunks: Vec<Chunk>,
        embeddings: Vec<Vec<f32>>,
    ) -> Result<VectorIndex, AppError> {
        if chunks.is_empty() {
            return Err(AppError::Validation(
                "cannot create an index from zero chunks".into(),
            ));
        }

        let entries = self.zip_entries(chunks, embeddings)?;
        let now = Utc::now();

        Ok(VectorIndex {
            model: self.model.clone(),
            dimension: self.dimension,
            created_at: now,
            updated_at: now,
            entries,
        })
    }

    /// Appends new entries, preserving the order of prior ones.
    pub fn add(
        &self,
        index: VectorIndex,
        chunks: Vec<Chunk>,
        embeddings: Vec<Vec<f32>>,
    ) -> Result<VectorIndex, AppError> {
        if index.dimension != self.dimension || index.model != self.model {
            return Err(AppError::InvalidConfiguration(
                "index embedding identity does not match this store".into(),
            ));
        }

        let new_entries = self.zip_entries(chunks, embeddings)?;

        let mut entries = index.entries;
        entries.extend(new_entries);

        Ok(VectorIndex {
            model: index.model,
            dimension: index.dimension,
            created_at: index.created_at,
            updated_at: Utc::now(),
            entries,
        })
    }

    /// Persists the index atomically: the serialized envelope is written to
    /// a temp file in the same directory and renamed over the target, so a
    /// concurrent reader never observes a torn write.
    pub async fn save(&self, index: &VectorIndex) -> Result<(), AppError> {
        let persisted = PersistedIndex {
            version: PERSIST_VERSION,
            model: index.model.clone(),
            dimension: index.dimension,
            created_at: index.created_at,
            updated_at: index.updated_at,
            entries: index.entries.clone(),
            checksum: entries_checksum(&index.entries)?,
        };

        let bytes = serde_json::to_vec(&persisted)
            .map_err(|e| AppError::Processing(format!("failed to serialize index: {e}")))?;

        let path = self.path.clone();
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let entry_count = index.entries.len();
        tokio::task::spawn_blocking(move || -> Result<(), AppError> {
            let dir = path.parent().unwrap_or_else(|| Path::new("."));
            let mut temp = NamedTempFile::new_in(dir)?;
            temp.write_all(&bytes)?;
            temp.as_file().sync_all()?;
            temp.persist(&path)
                .map_err(|e| AppError::Io(e.error))?;
            Ok(())
        })
        .await??;

        debug!(
            path = %self.path.display(),
            entries = entry_count,
            "Persisted vector index"
        );

        Ok(())
    }

    fn zip_entries(
        &self,
        chunks: Vec<Chunk>,
        embeddings: Vec<Vec<f32>>,
    ) -> Result<Vec<IndexEntry>, AppError> {
        if chunks.len() != embeddings.len() {
            return Err(AppError::Validation(format!(
                "got {} chunks but {} embeddings",
                chunks.len(),
                embeddings.len()
            )));
        }

        for embedding in &embeddings {
            if embedding.len() != self.dimension {
                return Err(AppError::InvalidConfiguration(format!(
                    "embedding of dimension {} cannot be stored in an index of dimension {}",
                    embedding.len(),
                    self.dimension
                )));
            }
        }

        Ok(chunks
            .into_iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| IndexEntry { chunk, embedding })
            .collect())
    }
}

fn entries_checksum(entries: &[IndexEntry]) -> Result<String, AppError> {
    let payload = serde_json::to_vec(entries)
        .map_err(|e| AppError::Processing(format!("failed to serialize index entries: {e}")))?;
    let digest = Sha256::digest(&payload);
    Ok(format!("{digest:x}"))
}
