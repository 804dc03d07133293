//! Search path entries: on-disk import directories and resource overlays.
//!
//! The search path is an ordered list. Module lookup walks it front to back
//! and the first entry providing a module wins, so the precedence between
//! an overlay and a disk directory is whatever order the caller configured.

use std::collections::BTreeMap;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A file inside an overlay: either backed by a disk file or held in memory.
#[derive(Clone, Debug)]
pub enum OverlayFile {
    Disk(PathBuf),
    Content(Arc<str>),
}

/// A virtual file system mapping logical `/`-separated paths to files,
/// like a compiled resource archive.
#[derive(Clone, Debug, Default)]
pub struct ResourceOverlay {
    name: String,
    files: BTreeMap<String, OverlayFile>,
}

/// Strip a leading `:`/`/`, collapse `.` and `..` components.
fn normalize(logical: &str) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for part in logical.trim_start_matches(':').split('/') {
        match part {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            _ => parts.push(part),
        }
    }
    parts.join("/")
}

impl ResourceOverlay {
    pub fn new(name: impl Into<String>) -> Self {
        ResourceOverlay {
            name: name.into(),
            files: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Map `logical` to a file on disk.
    pub fn with_file(mut self, logical: &str, path: impl Into<PathBuf>) -> Self {
        self.files
            .insert(normalize(logical), OverlayFile::Disk(path.into()));
        self
    }

    /// Map `logical` to in-memory content.
    pub fn with_content(mut self, logical: &str, content: impl Into<Arc<str>>) -> Self {
        self.files
            .insert(normalize(logical), OverlayFile::Content(content.into()));
        self
    }

    pub fn is_file(&self, logical: &str) -> bool {
        self.files.contains_key(&normalize(logical))
    }

    pub fn is_dir(&self, logical: &str) -> bool {
        let prefix = normalize(logical);
        if prefix.is_empty() {
            return !self.files.is_empty();
        }
        let prefix = format!("{prefix}/");
        self.files.keys().any(|k| k.starts_with(&prefix))
    }

    pub fn read(&self, logical: &str) -> io::Result<String> {
        match self.files.get(&normalize(logical)) {
            Some(OverlayFile::Disk(path)) => std::fs::read_to_string(path),
            Some(OverlayFile::Content(content)) => Ok(content.to_string()),
            None => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{logical} is not part of resource overlay {}", self.name),
            )),
        }
    }

    /// Direct children (files only) of the logical directory `logical`.
    pub fn list_files(&self, logical: &str) -> Vec<String> {
        let dir = normalize(logical);
        let prefix = if dir.is_empty() {
            String::new()
        } else {
            format!("{dir}/")
        };
        self.files
            .keys()
            .filter_map(|k| k.strip_prefix(&prefix))
            .filter(|rest| !rest.contains('/'))
            .map(str::to_string)
            .collect()
    }
}

/// One entry of the module search path.
#[derive(Clone, Debug)]
pub enum SearchEntry {
    Directory(PathBuf),
    Overlay(Arc<ResourceOverlay>),
}

impl SearchEntry {
    pub fn directory(path: impl Into<PathBuf>) -> Self {
        SearchEntry::Directory(path.into())
    }

    pub fn overlay(overlay: ResourceOverlay) -> Self {
        SearchEntry::Overlay(Arc::new(overlay))
    }

    /// The location of the module directory for `uri` in this entry, if it
    /// contains a `qmldir` there.
    pub fn find_module(&self, uri: &str) -> Option<Location> {
        let relative = uri.replace('.', "/");
        let location = match self {
            SearchEntry::Directory(dir) => Location::Disk(dir.join(&relative)),
            SearchEntry::Overlay(overlay) => Location::Overlay {
                overlay: Arc::clone(overlay),
                path: normalize(&relative),
            },
        };
        location.join("qmldir").is_file().then_some(location)
    }
}

/// A directory or file, on disk or inside an overlay.
#[derive(Clone)]
pub enum Location {
    Disk(PathBuf),
    Overlay {
        overlay: Arc<ResourceOverlay>,
        path: String,
    },
}

impl fmt::Debug for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Disk(path) => write!(f, "{}", path.display()),
            Location::Overlay { overlay, path } => write!(f, ":/{}/{}", overlay.name(), path),
        }
    }
}

impl Location {
    pub fn disk(path: impl AsRef<Path>) -> Self {
        Location::Disk(path.as_ref().to_path_buf())
    }

    pub fn join(&self, name: &str) -> Location {
        match self {
            Location::Disk(path) => Location::Disk(path.join(name)),
            Location::Overlay { overlay, path } => Location::Overlay {
                overlay: Arc::clone(overlay),
                path: normalize(&format!("{path}/{name}")),
            },
        }
    }

    /// The containing directory, `None` at a root.
    pub fn parent(&self) -> Option<Location> {
        match self {
            Location::Disk(path) => path.parent().map(|p| {
                if p.as_os_str().is_empty() {
                    Location::Disk(PathBuf::from("."))
                } else {
                    Location::Disk(p.to_path_buf())
                }
            }),
            Location::Overlay { overlay, path } => {
                let parent = path.rsplit_once('/').map(|(dir, _)| dir).unwrap_or_default();
                (!path.is_empty()).then(|| Location::Overlay {
                    overlay: Arc::clone(overlay),
                    path: parent.to_string(),
                })
            }
        }
    }

    /// The last path component.
    pub fn file_name(&self) -> Option<String> {
        match self {
            Location::Disk(path) => path.file_name().and_then(|n| n.to_str()).map(str::to_string),
            Location::Overlay { path, .. } => path.rsplit('/').next().map(str::to_string),
        }
    }

    pub fn is_file(&self) -> bool {
        match self {
            Location::Disk(path) => path.is_file(),
            Location::Overlay { overlay, path } => overlay.is_file(path),
        }
    }

    pub fn is_dir(&self) -> bool {
        match self {
            Location::Disk(path) => path.is_dir(),
            Location::Overlay { overlay, path } => overlay.is_dir(path),
        }
    }

    pub fn read(&self) -> io::Result<String> {
        match self {
            Location::Disk(path) => std::fs::read_to_string(path),
            Location::Overlay { overlay, path } => overlay.read(path),
        }
    }

    /// File names directly inside this directory, sorted.
    pub fn list_files(&self) -> Vec<String> {
        let mut names = match self {
            Location::Disk(path) => std::fs::read_dir(path)
                .map(|entries| {
                    entries
                        .filter_map(Result::ok)
                        .filter(|e| e.path().is_file())
                        .filter_map(|e| e.file_name().to_str().map(str::to_string))
                        .collect()
                })
                .unwrap_or_default(),
            Location::Overlay { overlay, path } => overlay.list_files(path),
        };
        names.sort();
        names
    }

    /// The disk path, for locations that have one.
    pub fn disk_path(&self) -> Option<PathBuf> {
        match self {
            Location::Disk(path) => Some(path.clone()),
            Location::Overlay { overlay, path } => match overlay.files.get(path) {
                Some(OverlayFile::Disk(disk)) => Some(disk.clone()),
                _ => None,
            },
        }
    }

    /// Stable key used to cache the module loaded from this location.
    pub fn cache_key(&self) -> String {
        match self {
            Location::Disk(path) => {
                let canonical = path.canonicalize().unwrap_or_else(|_| path.clone());
                canonical.display().to_string()
            }
            Location::Overlay { .. } => self.to_string(),
        }
    }
}
