use crate::model::{DatasetError, Post};
use std::fs;
use std::path::Path;

/// Reads the whole dataset into memory.
pub fn load_dataset(path: &Path) -> Result<Vec<Post>, DatasetError> {
    let content = fs::read_to_string(path).map_err(|source| DatasetError::Io {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| DatasetError::Parse {
        path: path.display().to_string(),
        source,
    })
}

/// Rewrites the whole dataset: two-space indentation, non-ASCII kept verbatim.
pub fn save_dataset(path: &Path, posts: &[Post]) -> Result<(), DatasetError> {
    let content = serde_json::to_string_pretty(posts).map_err(|source| DatasetError::Parse {
        path: path.display().to_string(),
        source,
    })?;
    fs::write(path, content).map_err(|source| DatasetError::Io {
        path: path.display().to_string(),
        source,
    })
}
