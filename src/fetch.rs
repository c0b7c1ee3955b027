use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

/// Failure to fetch one asset, with an HTTP-like status.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("not found (404)")]
    NotFound,
    #[error("status {0}")]
    Status(u16),
    #[error("{0} (500)")]
    Io(String),
}

impl FetchError {
    pub fn status(&self) -> u16 {
        match self {
            FetchError::NotFound => 404,
            FetchError::Status(code) => *code,
            FetchError::Io(_) => 500,
        }
    }
}

impl From<io::Error> for FetchError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => FetchError::NotFound,
            _ => FetchError::Io(err.to_string()),
        }
    }
}

/// Source of the manifest and piece assets. Paths are relative to the
/// puzzle root.
#[allow(async_fn_in_trait)]
pub trait AssetFetcher {
    async fn fetch(&self, path: &str) -> Result<String, FetchError>;
}

/// Reads a generated puzzle directory from disk.
#[derive(Debug, Clone)]
pub struct DirFetcher {
    root: PathBuf,
}

impl DirFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl AssetFetcher for DirFetcher {
    async fn fetch(&self, path: &str) -> Result<String, FetchError> {
        let relative = Path::new(path);
        if relative.is_absolute()
            || relative
                .components()
                .any(|part| matches!(part, std::path::Component::ParentDir))
        {
            return Err(FetchError::Status(403));
        }
        Ok(tokio::fs::read_to_string(self.root.join(relative)).await?)
    }
}

/// In-memory assets keyed by path.
#[derive(Debug, Clone, Default)]
pub struct MemoryFetcher {
    files: HashMap<String, Result<String, FetchError>>,
}

impl MemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<String>, content: impl Into<String>) {
        self.files.insert(path.into(), Ok(content.into()));
    }

    pub fn fail(&mut self, path: impl Into<String>, err: FetchError) {
        self.files.insert(path.into(), Err(err));
    }
}

impl AssetFetcher for MemoryFetcher {
    async fn fetch(&self, path: &str) -> Result<String, FetchError> {
        self.files.get(path).cloned().unwrap_or(Err(FetchError::NotFound))
    }
}
