use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use crate::error::Result;
use crate::fs::{FileHandle, FilePath, PathFactory};

/// Scheme prefix accepted (and stripped) for disk paths
pub const SCHEME: &str = "file";

/// Expand a leading `~` to the current user's home directory
///
/// An optional `file:` prefix is removed first. Paths that do not start
/// with `~`, or a home directory that cannot be determined, leave the path
/// unchanged.
pub fn expand_home(location: &str) -> PathBuf {
    let location = location
        .strip_prefix(SCHEME)
        .and_then(|rest| rest.strip_prefix(':'))
        .unwrap_or(location);

    let rest = match location.strip_prefix('~') {
        Some("") => "",
        Some(rest) if rest.starts_with(['/', '\\']) => &rest[1..],
        _ => return PathBuf::from(location),
    };

    match std::env::var_os("HOME").or_else(|| std::env::var_os("USERPROFILE")) {
        Some(home) => PathBuf::from(home).join(rest),
        None => PathBuf::from(location),
    }
}

/// Path on the local filesystem
#[derive(Debug, Clone)]
pub struct DiskPath {
    name: String,
}

impl DiskPath {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// The filesystem path this value refers to
    pub fn resolve(&self) -> PathBuf {
        expand_home(&self.name)
    }

    fn boxed(path: &Path) -> Box<dyn FilePath> {
        Box::new(Self::new(path.to_string_lossy().into_owned()))
    }
}

impl FilePath for DiskPath {
    fn name(&self) -> &str {
        &self.name
    }

    fn scheme(&self) -> &'static str {
        SCHEME
    }

    fn exists(&self) -> bool {
        self.resolve().exists()
    }

    fn is_directory(&self) -> bool {
        self.resolve().is_dir()
    }

    fn size(&self) -> u64 {
        fs::metadata(self.resolve()).map(|m| m.len()).unwrap_or(0)
    }

    fn last_modified(&self) -> u64 {
        fs::metadata(self.resolve())
            .and_then(|m| m.modified())
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }

    fn can_write(&self) -> bool {
        fs::metadata(self.resolve())
            .map(|m| !m.permissions().readonly())
            .unwrap_or(false)
    }

    fn list(&self) -> Result<Vec<Box<dyn FilePath>>> {
        let mut children = Vec::new();
        for entry in fs::read_dir(self.resolve())? {
            children.push(Self::boxed(&entry?.path()));
        }
        Ok(children)
    }

    fn parent(&self) -> Option<Box<dyn FilePath>> {
        self.resolve()
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Self::boxed)
    }

    fn is_absolute(&self) -> bool {
        self.resolve().is_absolute()
    }

    fn canonical(&self) -> Result<Box<dyn FilePath>> {
        Ok(Self::boxed(&fs::canonicalize(self.resolve())?))
    }

    fn create_file(&self) -> Result<bool> {
        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(self.resolve())
        {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn create_directory(&self) -> Result<()> {
        let path = self.resolve();
        match fs::create_dir(&path) {
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists && path.is_dir() => Ok(()),
            other => Ok(other?),
        }
    }

    fn delete(&self) -> Result<()> {
        let path = self.resolve();
        if path.is_dir() {
            fs::remove_dir(&path)?;
        } else {
            fs::remove_file(&path)?;
        }
        Ok(())
    }

    fn move_to(&self, target: &str) -> Result<()> {
        fs::rename(self.resolve(), expand_home(target))?;
        Ok(())
    }

    fn set_writable(&self, writable: bool) -> Result<()> {
        let path = self.resolve();
        let mut permissions = fs::metadata(&path)?.permissions();
        permissions.set_readonly(!writable);
        fs::set_permissions(&path, permissions)?;
        Ok(())
    }

    fn open_read(&self) -> Result<Box<dyn FileHandle>> {
        Ok(Box::new(File::open(self.resolve())?))
    }

    fn open_write(&self, append: bool) -> Result<Box<dyn Write + Send>> {
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .append(append)
            .truncate(!append)
            .open(self.resolve())?;
        Ok(Box::new(file))
    }

    fn create_temp_file(&self, suffix: &str, in_temp_dir: bool) -> Result<Box<dyn FilePath>> {
        let path = self.resolve();
        let dir = match path.parent() {
            Some(parent) if !in_temp_dir && !parent.as_os_str().is_empty() => parent.to_path_buf(),
            Some(_) if !in_temp_dir => PathBuf::from("."),
            _ => std::env::temp_dir(),
        };
        let prefix = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let temp = tempfile::Builder::new()
            .prefix(&prefix)
            .suffix(suffix)
            .tempfile_in(dir)?;
        let kept = temp.into_temp_path().keep().map_err(|e| e.error)?;
        log::debug!("created temp file {}", kept.display());
        Ok(Self::boxed(&kept))
    }
}

impl FileHandle for File {
    fn len(&self) -> Result<u64> {
        Ok(self.metadata()?.len())
    }

    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Factory for [`DiskPath`], the registry's default provider
#[derive(Debug, Clone, Copy, Default)]
pub struct DiskPathFactory;

impl PathFactory for DiskPathFactory {
    fn scheme(&self) -> &'static str {
        SCHEME
    }

    fn path(&self, raw: &str) -> Box<dyn FilePath> {
        Box::new(DiskPath::new(raw))
    }
}
