//! Single-cell persistent store for the last accepted status.
//!
//! The webhook only ever needs one value: the raw body of the most recent
//! accepted request. `StatusStore` models that cell so the updater can run
//! against a real file in production and an in-memory cell in tests.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// What the current process may do with the cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Access {
    pub exists: bool,
    pub readable: bool,
    pub writable: bool,
}

/// A persistent cell holding one opaque value.
pub trait StatusStore: Send + Sync {
    /// Create the cell empty if it is absent. Existing contents are kept.
    fn ensure_exists(&self) -> io::Result<()>;

    /// Report existence and permissions.
    fn access(&self) -> Access;

    /// Replace the whole contents.
    fn replace(&self, contents: &[u8]) -> io::Result<()>;

    /// Read the current contents, `None` if the cell does not exist.
    fn load(&self) -> io::Result<Option<Vec<u8>>>;
}

/// Status cell backed by a plain file.
///
/// Every operation opens its own handle and drops it before returning.
#[derive(Debug, Clone)]
pub struct FileStatusStore {
    path: PathBuf,
}

impl FileStatusStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StatusStore for FileStatusStore {
    fn ensure_exists(&self) -> io::Result<()> {
        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&self.path)
        {
            Ok(_) => {
                tracing::info!(path = %self.path.display(), "Created empty status file");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Ok(()),
            Err(e) => Err(e),
        }
    }

    fn access(&self) -> Access {
        let exists = self.path.is_file();
        if !exists {
            return Access {
                exists,
                readable: false,
                writable: false,
            };
        }

        let readable = File::open(&self.path).is_ok();

        // Permission bits are checked first: a privileged process can open a
        // read-only file for writing, but the file is still meant to be read-only.
        let writable = fs::metadata(&self.path)
            .map(|meta| !meta.permissions().readonly())
            .unwrap_or(false)
            && OpenOptions::new().write(true).open(&self.path).is_ok();

        Access {
            exists,
            readable,
            writable,
        }
    }

    fn replace(&self, contents: &[u8]) -> io::Result<()> {
        let mut file = OpenOptions::new()
            .write(true)
            .truncate(true)
            .open(&self.path)?;
        file.write_all(contents)?;
        file.flush()
    }

    fn load(&self) -> io::Result<Option<Vec<u8>>> {
        match fs::read(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }
}

#[derive(Debug)]
struct MemoryCell {
    contents: Option<Vec<u8>>,
    readable: bool,
    writable: bool,
    creatable: bool,
    replace_error: Option<io::ErrorKind>,
}

/// In-memory status cell with switchable permissions.
#[derive(Debug)]
pub struct MemoryStatusStore {
    cell: Mutex<MemoryCell>,
}

impl Default for MemoryStatusStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStatusStore {
    /// An absent cell.
    pub fn new() -> Self {
        Self {
            cell: Mutex::new(MemoryCell {
                contents: None,
                readable: true,
                writable: true,
                creatable: true,
                replace_error: None,
            }),
        }
    }

    /// A cell that already holds `contents`.
    pub fn with_contents(contents: impl Into<Vec<u8>>) -> Self {
        let store = Self::new();
        store.lock().contents = Some(contents.into());
        store
    }

    pub fn set_readable(&self, readable: bool) {
        self.lock().readable = readable;
    }

    pub fn set_writable(&self, writable: bool) {
        self.lock().writable = writable;
    }

    /// Make `ensure_exists` fail when the cell is absent.
    pub fn set_creatable(&self, creatable: bool) {
        self.lock().creatable = creatable;
    }

    /// Make `replace` fail with `kind` even though `access` reports the
    /// cell as writable, as a full disk or a vanished file would.
    pub fn set_replace_error(&self, kind: Option<io::ErrorKind>) {
        self.lock().replace_error = kind;
    }

    fn lock(&self) -> MutexGuard<'_, MemoryCell> {
        self.cell.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl StatusStore for MemoryStatusStore {
    fn ensure_exists(&self) -> io::Result<()> {
        let mut cell = self.lock();
        if cell.contents.is_none() {
            if !cell.creatable {
                return Err(io::Error::new(
                    io::ErrorKind::PermissionDenied,
                    "status cell cannot be created",
                ));
            }
            cell.contents = Some(Vec::new());
        }
        Ok(())
    }

    fn access(&self) -> Access {
        let cell = self.lock();
        let exists = cell.contents.is_some();
        Access {
            exists,
            readable: exists && cell.readable,
            writable: exists && cell.writable,
        }
    }

    fn replace(&self, contents: &[u8]) -> io::Result<()> {
        let mut cell = self.lock();
        if let Some(kind) = cell.replace_error {
            return Err(io::Error::new(kind, "status cell write failed"));
        }
        if !cell.writable {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "status cell is read-only",
            ));
        }
        match cell.contents.as_mut() {
            Some(existing) => {
                existing.clear();
                existing.extend_from_slice(contents);
                Ok(())
            }
            None => Err(io::Error::new(
                io::ErrorKind::NotFound,
                "status cell does not exist",
            )),
        }
    }

    fn load(&self) -> io::Result<Option<Vec<u8>>> {
        Ok(self.lock().contents.clone())
    }
}
