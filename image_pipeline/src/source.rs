use std::path::Path;

use crate::error::GenerateError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Raster,
    Vector,
}

impl SourceFormat {
    /// Picks the clipping backend from the file extension.
    pub fn from_path(path: &Path) -> Result<Self, GenerateError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        match extension.as_str() {
            "png" | "jpg" | "jpeg" => Ok(SourceFormat::Raster),
            "svg" => Ok(SourceFormat::Vector),
            _ => Err(GenerateError::UnsupportedFormat { extension }),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SourceFormat::Raster => "raster",
            SourceFormat::Vector => "vector",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn detects_by_extension_case_insensitively() {
        assert_eq!(
            SourceFormat::from_path(Path::new("a/photo.JPG")).expect("jpg"),
            SourceFormat::Raster
        );
        assert_eq!(
            SourceFormat::from_path(Path::new("art.svg")).expect("svg"),
            SourceFormat::Vector
        );
    }

    #[test]
    fn rejects_unknown_and_missing_extensions() {
        let err = SourceFormat::from_path(Path::new("anim.gif")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedFormat);
        let err = SourceFormat::from_path(Path::new("noext")).unwrap_err();
        assert!(matches!(err, GenerateError::UnsupportedFormat { extension } if extension.is_empty()));
    }
}
