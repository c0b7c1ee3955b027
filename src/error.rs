use crate::fetch::FetchError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    AssetLoad,
    Content,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum BoardError {
    #[error("Failed to load {file}: {status}")]
    AssetLoad {
        file: String,
        status: u16,
        #[source]
        source: FetchError,
    },
    #[error("Invalid manifest {file}: {reason}")]
    Manifest { file: String, reason: String },
    #[error("Invalid piece asset {file}: {reason}")]
    InvalidAsset { file: String, reason: String },
}

impl BoardError {
    pub(crate) fn asset(file: &str, source: FetchError) -> Self {
        BoardError::AssetLoad {
            file: file.to_string(),
            status: source.status(),
            source,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            BoardError::AssetLoad { .. } => ErrorKind::AssetLoad,
            BoardError::Manifest { .. } | BoardError::InvalidAsset { .. } => ErrorKind::Content,
        }
    }

    /// File that could not be loaded or understood.
    pub fn file(&self) -> &str {
        match self {
            BoardError::AssetLoad { file, .. }
            | BoardError::Manifest { file, .. }
            | BoardError::InvalidAsset { file, .. } => file,
        }
    }

    /// HTTP-equivalent status, for fetch failures.
    pub fn status(&self) -> Option<u16> {
        match self {
            BoardError::AssetLoad { status, .. } => Some(*status),
            BoardError::Manifest { .. } | BoardError::InvalidAsset { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn asset_error_names_file_and_status() {
        let err = BoardError::asset("piece2.svg", FetchError::NotFound);
        assert_eq!(err.kind(), ErrorKind::AssetLoad);
        assert_eq!(err.file(), "piece2.svg");
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.to_string(), "Failed to load piece2.svg: 404");
    }
}
