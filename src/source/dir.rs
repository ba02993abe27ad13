//! Saved feed documents, one `<code>.xml` file per location.

use std::path::PathBuf;

use super::FeedSource;
use crate::error::FetchError;
use crate::forecast::LocationCode;

pub struct DirSource {
    pub dir: PathBuf,
    label: String,
}

impl DirSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        let label = dir.display().to_string();
        Self { dir, label }
    }

    pub fn path(&self, code: &LocationCode) -> PathBuf {
        self.dir.join(format!("{code}.xml"))
    }
}

impl FeedSource for DirSource {
    fn name(&self) -> &str {
        &self.label
    }

    fn fetch(&self, code: &LocationCode) -> Result<Vec<u8>, FetchError> {
        let path = self.path(code);
        tracing::info!("reading {:?}", path);
        Ok(std::fs::read(path)?)
    }
}
