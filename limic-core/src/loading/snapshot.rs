//! On-disk snapshot of raw topologies per area

use std::{
    collections::BTreeMap,
    fs::{self, File},
    io::{BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

use log::{debug, info};

use crate::{Error, model::RawTopology};

/// JSON file of raw topologies keyed by area name.
///
/// Reads happen against the in-memory copy. Writes only reach the disk on
/// [`SnapshotCache::persist`] or [`SnapshotCache::close`], through a
/// temporary file that replaces the snapshot in one rename.
#[derive(Debug)]
pub struct SnapshotCache {
    path: PathBuf,
    areas: BTreeMap<String, RawTopology>,
    dirty: bool,
}

impl SnapshotCache {
    /// Opens the snapshot at `path`, a missing file is an empty cache
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed
    pub fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref().to_path_buf();
        let areas = if path.exists() {
            let reader = BufReader::new(File::open(&path)?);
            serde_json::from_reader(reader)?
        } else {
            debug!("No snapshot at {}, starting empty", path.display());
            BTreeMap::new()
        };

        Ok(Self {
            path,
            areas,
            dirty: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, area: &str) -> Option<&RawTopology> {
        self.areas.get(area)
    }

    pub fn contains(&self, area: &str) -> bool {
        self.areas.contains_key(area)
    }

    pub fn areas(&self) -> impl Iterator<Item = &str> {
        self.areas.keys().map(String::as_str)
    }

    /// Stores `topology` under `area`, replacing any previous entry
    pub fn insert(&mut self, area: impl Into<String>, topology: RawTopology) {
        self.areas.insert(area.into(), topology);
        self.dirty = true;
    }

    /// Whether the cache holds changes that are not on disk yet
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Writes the cache to disk if it changed
    ///
    /// # Errors
    ///
    /// Returns an error if the temporary file cannot be written or renamed
    pub fn persist(&mut self) -> Result<bool, Error> {
        if !self.dirty {
            return Ok(false);
        }

        let tmp = self.temporary_path();
        {
            let mut writer = BufWriter::new(File::create(&tmp)?);
            serde_json::to_writer(&mut writer, &self.areas)?;
            writer.flush()?;
        }
        fs::rename(&tmp, &self.path)?;

        self.dirty = false;
        info!(
            "Saved {} areas to snapshot {}",
            self.areas.len(),
            self.path.display()
        );
        Ok(true)
    }

    /// Persists pending changes and releases the cache
    ///
    /// # Errors
    ///
    /// See [`SnapshotCache::persist`]
    pub fn close(mut self) -> Result<bool, Error> {
        self.persist()
    }

    fn temporary_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}
