//! File system storage engine

use remark_core::comment::Comment;
use remark_core::error::{RemarkError, Result};
use remark_core::store::{Engine, SiteData};
use remark_core::types::{CommentId, DeleteMode, Locator, PostInfo};
use std::collections::HashMap;
use std::fs;
use std::io::{BufReader, BufWriter, Write};
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

/// File system based comment storage, one JSON document per site
///
/// Sites are loaded on first access and kept in memory. Every mutation is
/// written back atomically, unless the site is in bulk mode, in which case
/// the file is written once by [`Engine::end_bulk`].
pub struct FileSystemEngine {
    /// Base directory for site files
    base_dir: PathBuf,
    /// Loaded sites and bulk-mode bookkeeping
    state: Mutex<State>,
}

#[derive(Default)]
struct State {
    sites: HashMap<String, SiteData>,
    bulk: HashMap<String, Bulk>,
}

/// Open bulk writes of one site
#[derive(Default)]
struct Bulk {
    depth: usize,
    dirty: bool,
}

impl FileSystemEngine {
    /// Create a new file system engine
    pub fn new(base_dir: impl Into<PathBuf>) -> Result<Self> {
        let engine = Self {
            base_dir: base_dir.into(),
            state: Mutex::new(State::default()),
        };

        engine.ensure_dirs()?;
        Ok(engine)
    }

    /// Create storage with default directory (platform data dir, or ~/.remark)
    pub fn default_location() -> Result<Self> {
        let base_dir = directories::ProjectDirs::from("com", "remark-rs", "remark")
            .map(|dirs| dirs.data_dir().join("sites"))
            .unwrap_or_else(|| {
                dirs::home_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join(".remark")
                    .join("sites")
            });

        Self::new(base_dir)
    }

    /// Ensure required directories exist
    fn ensure_dirs(&self) -> Result<()> {
        if !self.base_dir.exists() {
            fs::create_dir_all(&self.base_dir).map_err(|e| {
                RemarkError::Io(std::io::Error::new(
                    e.kind(),
                    format!("Failed to create storage directory: {}", e),
                ))
            })?;
            debug!("Created storage directory: {:?}", self.base_dir);
        }
        Ok(())
    }

    /// Site IDs become file names and must stay inside the base directory
    fn check_site_id(site_id: &str) -> Result<()> {
        let invalid = site_id.is_empty()
            || site_id.starts_with('.')
            || site_id.contains("..")
            || site_id.contains(['/', '\\', '\0']);
        if invalid {
            return Err(RemarkError::Validation(format!(
                "invalid site id {:?}",
                site_id
            )));
        }
        Ok(())
    }

    /// Get the path for a site file
    fn site_path(&self, site_id: &str) -> Result<PathBuf> {
        Self::check_site_id(site_id)?;
        Ok(self.base_dir.join(format!("{}.json", site_id)))
    }

    /// Get a temporary path for atomic writes
    fn temp_path(&self, site_id: &str) -> Result<PathBuf> {
        Self::check_site_id(site_id)?;
        Ok(self.base_dir.join(format!(".{}.json.tmp", site_id)))
    }

    /// Write site atomically (write to temp, then rename)
    fn atomic_write(&self, site_id: &str, site: &SiteData) -> Result<()> {
        let temp_path = self.temp_path(site_id)?;
        let final_path = self.site_path(site_id)?;

        let temp_file = fs::File::create(&temp_path).map_err(|e| {
            RemarkError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to create temp file: {}", e),
            ))
        })?;
        let mut writer = BufWriter::new(temp_file);
        serde_json::to_writer(&mut writer, site)?;
        writer.flush()?;

        // Rename to final path (atomic on most filesystems)
        fs::rename(&temp_path, &final_path).map_err(|e| {
            let _ = fs::remove_file(&temp_path);
            RemarkError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to rename temp file: {}", e),
            ))
        })?;

        debug!("Saved site {} to {:?}", site_id, final_path);
        Ok(())
    }

    /// Read and parse a site file, None if the site has no file yet
    fn read_site(&self, site_id: &str) -> Result<Option<SiteData>> {
        let path = self.site_path(site_id)?;
        let file = match fs::File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(RemarkError::Io(e)),
        };

        let site: SiteData = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| RemarkError::Serde(e).with_context(format!("site file {:?}", path)))?;
        info!("Loaded site {} with {} posts", site_id, site.posts.len());
        Ok(Some(site))
    }

    fn lock_state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make sure the site is loaded into `sites`, returning false if it does not exist
    fn load_site(&self, sites: &mut HashMap<String, SiteData>, site_id: &str) -> Result<bool> {
        if sites.contains_key(site_id) {
            return Ok(true);
        }
        match self.read_site(site_id)? {
            Some(site) => {
                sites.insert(site_id.to_string(), site);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn read<T>(&self, site_id: &str, f: impl FnOnce(&SiteData) -> Result<T>) -> Result<T> {
        let mut state = self.lock_state();
        if !self.load_site(&mut state.sites, site_id)? {
            return Err(RemarkError::NotFound(format!("site {:?}", site_id)));
        }
        f(&state.sites[site_id])
    }

    /// Apply a mutation in place and persist the site
    ///
    /// A failed write evicts the site, so the next access reloads the last
    /// persisted copy from disk.
    fn write<T>(
        &self,
        site_id: &str,
        create_missing: bool,
        f: impl FnOnce(&mut SiteData) -> Result<T>,
    ) -> Result<T> {
        let mut guard = self.lock_state();
        let state = &mut *guard;
        let existed = self.load_site(&mut state.sites, site_id)?;
        if !existed && !create_missing {
            return Err(RemarkError::NotFound(format!("site {:?}", site_id)));
        }

        let site = state.sites.entry(site_id.to_string()).or_default();
        let result = match f(site) {
            Ok(result) => result,
            Err(e) => {
                if !existed {
                    state.sites.remove(site_id);
                }
                return Err(e);
            }
        };

        if let Some(bulk) = state.bulk.get_mut(site_id) {
            bulk.dirty = true;
            return Ok(result);
        }

        if let Err(e) = self.atomic_write(site_id, site) {
            warn!("Failed to save site {}, dropping cached copy: {}", site_id, e);
            state.sites.remove(site_id);
            return Err(e);
        }
        Ok(result)
    }

    /// Get base directory
    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Site IDs with a data file on disk
    pub fn sites(&self) -> Result<Vec<String>> {
        let mut sites = Vec::new();
        for entry in fs::read_dir(&self.base_dir)? {
            let path = entry?.path();
            if !path.extension().map(|e| e == "json").unwrap_or(false) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                if !stem.starts_with('.') {
                    sites.push(stem.to_string());
                }
            }
        }
        sites.sort();
        Ok(sites)
    }
}

impl Engine for FileSystemEngine {
    fn create(&self, comment: Comment) -> Result<CommentId> {
        let site_id = comment.locator.site_id.clone();
        self.write(&site_id, true, |site| site.create(comment))
    }

    fn get(&self, locator: &Locator, id: &CommentId) -> Result<Comment> {
        self.read(&locator.site_id, |site| site.get(&locator.url, id))
    }

    fn put(&self, locator: &Locator, comment: Comment) -> Result<()> {
        self.write(&locator.site_id, false, |site| site.put(&locator.url, comment))
    }

    fn delete(&self, locator: &Locator, id: &CommentId, mode: DeleteMode) -> Result<()> {
        self.write(&locator.site_id, false, |site| {
            site.delete(&locator.url, id, mode)
        })
    }

    fn count(&self, locator: &Locator) -> Result<usize> {
        self.read(&locator.site_id, |site| site.count(&locator.url))
    }

    fn list(&self, site_id: &str, limit: usize, skip: usize) -> Result<Vec<PostInfo>> {
        self.read(site_id, |site| Ok(site.list(limit, skip)))
    }

    fn last(&self, site_id: &str, max: usize) -> Result<Vec<Comment>> {
        self.read(site_id, |site| Ok(site.last(max)))
    }

    fn begin_bulk(&self, site_id: &str) {
        let mut state = self.lock_state();
        state.bulk.entry(site_id.to_string()).or_default().depth += 1;
        debug!("Bulk write to site {} started", site_id);
    }

    fn end_bulk(&self, site_id: &str) -> Result<()> {
        let mut guard = self.lock_state();
        let state = &mut *guard;
        let Some(bulk) = state.bulk.get_mut(site_id) else {
            return Ok(());
        };
        bulk.depth = bulk.depth.saturating_sub(1);
        if bulk.depth > 0 {
            return Ok(());
        }

        let dirty = bulk.dirty;
        state.bulk.remove(site_id);
        if !dirty {
            return Ok(());
        }
        let Some(site) = state.sites.get(site_id) else {
            return Ok(());
        };
        if let Err(e) = self.atomic_write(site_id, site) {
            warn!("Failed to flush site {}, dropping cached copy: {}", site_id, e);
            state.sites.remove(site_id);
            return Err(e);
        }
        debug!("Bulk write to site {} flushed", site_id);
        Ok(())
    }
}
