use crate::record::StackRecord;
use anyhow::{Context, Result};
use log::warn;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tokio::fs;

/// Two-tier store keyed by stack id.
///
/// Also hands out the per-stack mutex that callers must hold around any
/// read-record → compute → write-record sequence; the store itself does not
/// serialize mutations.
pub struct StackStore {
    base_dir: PathBuf,
    cache: Mutex<HashMap<String, StackRecord>>,
    locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl StackStore {
    /// Store rooted at the system temp directory.
    pub fn new() -> Self {
        Self::with_base_dir(std::env::temp_dir())
    }

    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            cache: Mutex::new(HashMap::new()),
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Directory holding a stack's durable document and generated program.
    pub fn stack_dir(&self, stack_id: &str) -> PathBuf {
        self.base_dir.join(format!("infra-{stack_id}"))
    }

    fn state_path(&self, stack_id: &str) -> PathBuf {
        self.stack_dir(stack_id).join("state.json")
    }

    /// Write-through: the cache is updated unconditionally; a failed
    /// durable write is logged and swallowed, never surfaced. The
    /// in-memory view stays valid even when persistence is unavailable.
    pub async fn set(&self, record: StackRecord) {
        self.cache
            .lock()
            .expect("stack cache mutex poisoned")
            .insert(record.stack_id.clone(), record.clone());

        if let Err(err) = self.write_durable(&record).await {
            warn!(
                "Durable write for stack {} failed (in-memory copy kept): {err:#}",
                record.stack_id
            );
        }
    }

    async fn write_durable(&self, record: &StackRecord) -> Result<()> {
        let dir = self.stack_dir(&record.stack_id);
        fs::create_dir_all(&dir)
            .await
            .with_context(|| format!("create stack dir {}", dir.display()))?;
        let bytes = serde_json::to_vec_pretty(record).context("serialize stack record")?;
        let path = self.state_path(&record.stack_id);
        fs::write(&path, bytes)
            .await
            .with_context(|| format!("write stack state {}", path.display()))
    }

    /// Cache hit, else durable read with cache hydration. Any read or
    /// parse failure means "not found"; this never errors.
    pub async fn get(&self, stack_id: &str) -> Option<StackRecord> {
        if let Some(record) = self
            .cache
            .lock()
            .expect("stack cache mutex poisoned")
            .get(stack_id)
        {
            return Some(record.clone());
        }

        let path = self.state_path(stack_id);
        let bytes = fs::read(&path).await.ok()?;
        let record: StackRecord = match serde_json::from_slice(&bytes) {
            Ok(record) => record,
            Err(err) => {
                warn!("Stack state corrupted {}: {err}", path.display());
                return None;
            }
        };

        self.cache
            .lock()
            .expect("stack cache mutex poisoned")
            .insert(stack_id.to_string(), record.clone());
        Some(record)
    }

    /// Per-stack mutual-exclusion handle. Callers mutating a record hold
    /// this across the whole read → compute → write sequence to prevent
    /// lost updates between racing calls for the same stack.
    pub fn lock(&self, stack_id: &str) -> Arc<tokio::sync::Mutex<()>> {
        self.locks
            .lock()
            .expect("stack lock table mutex poisoned")
            .entry(stack_id.to_string())
            .or_default()
            .clone()
    }
}

impl Default for StackStore {
    fn default() -> Self {
        Self::new()
    }
}
