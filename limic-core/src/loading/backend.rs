//! Sources of raw topologies

use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use log::{debug, info};

use super::snapshot::SnapshotCache;
use crate::{Error, model::RawTopology};

/// Anything that can deliver the raw topology of an area
pub trait TopologySource {
    /// # Errors
    ///
    /// Returns an error if the area is unknown or cannot be retrieved
    fn fetch(&mut self, area: &str) -> Result<RawTopology, Error>;
}

/// Remote service answering topology queries for an area
pub trait QueryClient {
    /// # Errors
    ///
    /// Returns [`Error::QueryError`] when the service fails
    fn query(&mut self, area: &str) -> Result<RawTopology, Error>;
}

/// Reads areas from an existing snapshot, never queries anything
#[derive(Debug)]
pub struct SnapshotBackend {
    cache: SnapshotCache,
}

impl SnapshotBackend {
    pub fn new(cache: SnapshotCache) -> Self {
        Self { cache }
    }

    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be read
    pub fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        Ok(Self::new(SnapshotCache::open(path)?))
    }

    pub fn cache(&self) -> &SnapshotCache {
        &self.cache
    }
}

impl TopologySource for SnapshotBackend {
    fn fetch(&mut self, area: &str) -> Result<RawTopology, Error> {
        self.cache
            .get(area)
            .cloned()
            .ok_or_else(|| Error::AreaNotFound(area.to_string()))
    }
}

/// Serves areas from a snapshot and asks `client` for the missing ones.
///
/// Fetched areas are merged into the snapshot, which is written back on
/// [`QueryBackend::close`].
pub struct QueryBackend<C> {
    client: C,
    cache: SnapshotCache,
}

impl<C: QueryClient> QueryBackend<C> {
    pub fn new(client: C, cache: SnapshotCache) -> Self {
        Self { client, cache }
    }

    pub fn cache(&self) -> &SnapshotCache {
        &self.cache
    }

    /// Persists newly queried areas. Returns whether the snapshot was written.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be written
    pub fn close(self) -> Result<bool, Error> {
        self.cache.close()
    }
}

impl<C: QueryClient> TopologySource for QueryBackend<C> {
    fn fetch(&mut self, area: &str) -> Result<RawTopology, Error> {
        if let Some(topology) = self.cache.get(area) {
            debug!("Area {area} served from snapshot");
            return Ok(topology.clone());
        }

        info!("Querying topology of area {area}");
        let topology = self.client.query(area)?;
        self.cache.insert(area, topology.clone());
        Ok(topology)
    }
}

/// A single pre-extracted topology file, valid for any area
#[derive(Debug, Clone)]
pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TopologySource for FileBackend {
    fn fetch(&mut self, _area: &str) -> Result<RawTopology, Error> {
        let reader = BufReader::new(File::open(&self.path)?);
        Ok(serde_json::from_reader(reader)?)
    }
}

/// Area encoded in a snapshot file name such as `cache.europe.json`
pub fn area_from_file_name(path: impl AsRef<Path>) -> Option<String> {
    let name = path.as_ref().file_name()?.to_str()?;
    name.split('.')
        .nth(1)
        .filter(|area| !area.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    struct CountingClient {
        queries: usize,
    }

    impl QueryClient for CountingClient {
        fn query(&mut self, area: &str) -> Result<RawTopology, Error> {
            self.queries += 1;
            if area == "atlantis" {
                return Err(Error::QueryError("no such area".to_string()));
            }
            Ok(RawTopology::new()
                .with_node(1, 52.0, 5.0)
                .with_line(vec![1]))
        }
    }

    #[test]
    fn test_area_from_file_name() {
        assert_eq!(
            area_from_file_name("data/cache.europe.json"),
            Some("europe".to_string())
        );
        assert_eq!(area_from_file_name("cache"), None);
        assert_eq!(area_from_file_name("cache..json"), None);
    }

    #[test]
    fn test_snapshot_backend() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cache.nl.json");
        let mut cache = SnapshotCache::open(&path).unwrap();
        cache.insert("nl", RawTopology::new().with_node(1, 52.0, 5.0));
        cache.close().unwrap();

        let mut backend = SnapshotBackend::open(&path).unwrap();
        assert_eq!(backend.fetch("nl").unwrap().coordinates.len(), 1);
        assert!(matches!(
            backend.fetch("de"),
            Err(Error::AreaNotFound(area)) if area == "de"
        ));
    }

    #[test]
    fn test_query_backend_caches_results() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cache.nl.json");
        let cache = SnapshotCache::open(&path).unwrap();
        let mut backend = QueryBackend::new(CountingClient { queries: 0 }, cache);

        let first = backend.fetch("nl").unwrap();
        let second = backend.fetch("nl").unwrap();
        assert_eq!(first, second);
        assert_eq!(backend.client.queries, 1);
        assert!(backend.fetch("atlantis").is_err());
        assert!(!backend.cache().contains("atlantis"));

        assert!(backend.close().unwrap());
        assert!(SnapshotCache::open(&path).unwrap().contains("nl"));
    }

    #[test]
    fn test_file_backend() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("topology.json");
        std::fs::write(
            &path,
            r#"{"lines": [{"nodes": [1, 2]}], "coordinates": {"1": [52.0, 5.0], "2": [52.0, 5.01]}}"#,
        )
        .unwrap();

        let topology = FileBackend::new(&path).fetch("anything").unwrap();
        assert_eq!(topology.lines[0].nodes, vec![1, 2]);
        assert!(topology.polygons.is_empty());
    }
}
