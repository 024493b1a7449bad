use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::{Arc, Mutex as StdMutex, OnceLock},
};

use tokio::sync::Mutex;

/// Process-wide registry of named async mutexes keyed by index path.
///
/// The store's load-modify-save cycle is a lost-update hazard under
/// concurrent ingestion, so every writer must hold the index's mutex across
/// the whole cycle. Identity is the configured index path; the service
/// binary is the single writer process.
static LOCKS: OnceLock<StdMutex<HashMap<PathBuf, Arc<Mutex<()>>>>> = OnceLock::new();

pub fn index_lock(path: &Path) -> Arc<Mutex<()>> {
    let registry = LOCKS.get_or_init(|| StdMutex::new(HashMap::new()));
    let mut map = registry
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner);
    Arc::clone(
        map.entry(path.to_path_buf())
            .or_insert_with(|| Arc::new(Mutex::new(()))),
    )
}
