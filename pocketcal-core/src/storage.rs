//! Block storage capability (the SD card on the device).

use std::collections::BTreeMap;
use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use crate::error::{CalError, CalResult};

/// Line-oriented file access.
pub trait Storage {
    /// Files (not directories) directly inside `dir`.
    fn list(&self, dir: &Path) -> CalResult<Vec<PathBuf>>;

    fn read_lines(&self, path: &Path) -> CalResult<Vec<String>>;

    /// Replace the file's contents.
    fn write_lines(&mut self, path: &Path, lines: &[String]) -> CalResult<()>;

    fn create_dir_all(&mut self, dir: &Path) -> CalResult<()>;
}

/// Storage backed by the host filesystem.
#[derive(Debug, Default, Clone)]
pub struct FsStorage;

impl Storage for FsStorage {
    fn list(&self, dir: &Path) -> CalResult<Vec<PathBuf>> {
        let mut files: Vec<PathBuf> = fs::read_dir(dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .collect();
        files.sort();
        Ok(files)
    }

    fn read_lines(&self, path: &Path) -> CalResult<Vec<String>> {
        let file = fs::File::open(path)?;
        Ok(BufReader::new(file).lines().collect::<Result<_, _>>()?)
    }

    fn write_lines(&mut self, path: &Path, lines: &[String]) -> CalResult<()> {
        let mut file = fs::File::create(path)?;
        // CRLF, as .ics files expect.
        for line in lines {
            write!(file, "{line}\r\n")?;
        }
        file.flush()?;
        Ok(())
    }

    fn create_dir_all(&mut self, dir: &Path) -> CalResult<()> {
        fs::create_dir_all(dir)?;
        Ok(())
    }
}

/// In-memory storage for tests and simulation.
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    files: BTreeMap<PathBuf, Vec<String>>,
    dirs: Vec<PathBuf>,
    /// When set, every write fails.
    pub read_only: bool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: impl Into<PathBuf>, content: &str) -> Self {
        let path = path.into();
        if let Some(parent) = path.parent() {
            self.dirs.push(parent.to_path_buf());
        }
        self.files.insert(path, content.lines().map(String::from).collect());
        self
    }

    pub fn contents(&self, path: &Path) -> Option<String> {
        self.files.get(path).map(|lines| lines.join("\n"))
    }

    fn check_writable(&self, path: &Path) -> CalResult<()> {
        if self.read_only {
            return Err(CalError::Storage(format!("{} is read-only", path.display())));
        }
        Ok(())
    }
}

impl Storage for MemoryStorage {
    fn list(&self, dir: &Path) -> CalResult<Vec<PathBuf>> {
        if !self.dirs.iter().any(|d| d == dir) {
            return Err(CalError::Storage(format!("No such directory: {}", dir.display())));
        }
        Ok(self
            .files
            .keys()
            .filter(|path| path.parent() == Some(dir))
            .cloned()
            .collect())
    }

    fn read_lines(&self, path: &Path) -> CalResult<Vec<String>> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| CalError::Storage(format!("No such file: {}", path.display())))
    }

    fn write_lines(&mut self, path: &Path, lines: &[String]) -> CalResult<()> {
        self.check_writable(path)?;
        self.files.insert(path.to_path_buf(), lines.to_vec());
        Ok(())
    }

    fn create_dir_all(&mut self, dir: &Path) -> CalResult<()> {
        self.check_writable(dir)?;
        if !self.dirs.iter().any(|d| d == dir) {
            self.dirs.push(dir.to_path_buf());
        }
        Ok(())
    }
}
