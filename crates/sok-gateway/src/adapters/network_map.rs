//! Persistence of the gossiped network map.
//!
//! The file holds `{"active_nodes": [...]}` with the node list sorted and
//! de-duplicated. Each update replaces the whole set. Writes go to a
//! `.tmp` sibling that is then renamed over the target, so readers never
//! observe a partial file; concurrent writers are serialised.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

/// On-disk shape of the network map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkMap {
    /// Known node URLs, sorted and unique
    pub active_nodes: Vec<String>,
}

impl NetworkMap {
    /// Normalise a gossiped node list.
    pub fn from_nodes<I>(nodes: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let unique: BTreeSet<String> = nodes.into_iter().collect();
        Self {
            active_nodes: unique.into_iter().collect(),
        }
    }
}

/// Writes the network map file.
pub struct NetworkMapStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl NetworkMapStore {
    /// Store persisting to `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Target file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut temp: OsString = self.path.as_os_str().to_owned();
        temp.push(".tmp");
        PathBuf::from(temp)
    }

    /// Replace the persisted map with `nodes`.
    pub async fn replace(&self, nodes: Vec<String>) -> io::Result<NetworkMap> {
        let map = NetworkMap::from_nodes(nodes);
        let text = serde_json::to_string_pretty(&map).map_err(io::Error::other)?;

        let _guard = self.write_lock.lock().await;
        let temp = self.temp_path();
        tokio::fs::write(&temp, text.as_bytes()).await?;
        tokio::fs::rename(&temp, &self.path).await?;

        tracing::info!(
            path = %self.path.display(),
            nodes = map.active_nodes.len(),
            "network map updated"
        );
        Ok(map)
    }

    /// Read the persisted map; a missing file is an empty map.
    pub async fn load(&self) -> io::Result<NetworkMap> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(io::Error::other),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(NetworkMap::default()),
            Err(e) => Err(e),
        }
    }
}
