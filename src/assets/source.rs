use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::foundation::error::{TesseraError, TesseraResult};

/// Extensions probed, in order, when a requested path has none.
pub const PROBE_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "bmp", "gif"];

/// Raw bytes of an opened asset plus the extension it was found under.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssetBytes {
    pub bytes: Vec<u8>,
    pub extension: Option<String>,
}

/// Where image files come from.
pub trait AssetSource: Send {
    /// Opens `path`; a path without extension may resolve to any of [`PROBE_EXTENSIONS`].
    fn open_read(&self, path: &str) -> TesseraResult<AssetBytes>;

    fn exists(&self, path: &str) -> bool {
        self.open_read(path).is_ok()
    }
}

/// Reads assets from files below a root directory.
#[derive(Clone, Debug)]
pub struct DirAssetSource {
    root: PathBuf,
}

impl DirAssetSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, norm: &str) -> Option<(PathBuf, Option<String>)> {
        let direct = self.root.join(norm);
        if extension_of(norm).is_some() && direct.is_file() {
            return Some((direct, extension_of(norm)));
        }
        for ext in PROBE_EXTENSIONS {
            let candidate = self.root.join(format!("{norm}.{ext}"));
            if candidate.is_file() {
                return Some((candidate, Some(ext.to_string())));
            }
        }
        direct.is_file().then_some((direct, None))
    }
}

impl AssetSource for DirAssetSource {
    fn open_read(&self, path: &str) -> TesseraResult<AssetBytes> {
        let norm = normalize_rel_path(path)?;
        let Some((full, extension)) = self.resolve(&norm) else {
            return Err(anyhow::anyhow!("asset '{norm}' not found under '{}'", self.root.display()).into());
        };
        let bytes =
            std::fs::read(&full).with_context(|| format!("read asset '{}'", full.display()))?;
        Ok(AssetBytes { bytes, extension })
    }

    fn exists(&self, path: &str) -> bool {
        normalize_rel_path(path)
            .ok()
            .and_then(|norm| self.resolve(&norm))
            .is_some()
    }
}

/// In-memory asset table keyed by normalized path.
#[derive(Clone, Debug, Default)]
pub struct MemoryAssetSource {
    files: HashMap<String, Vec<u8>>,
}

impl MemoryAssetSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: &str, bytes: Vec<u8>) -> TesseraResult<()> {
        let norm = normalize_rel_path(path)?;
        self.files.insert(norm, bytes);
        Ok(())
    }

    pub fn with(mut self, path: &str, bytes: Vec<u8>) -> TesseraResult<Self> {
        self.insert(path, bytes)?;
        Ok(self)
    }
}

impl AssetSource for MemoryAssetSource {
    fn open_read(&self, path: &str) -> TesseraResult<AssetBytes> {
        let norm = normalize_rel_path(path)?;
        if let Some(bytes) = self.files.get(&norm) {
            return Ok(AssetBytes {
                bytes: bytes.clone(),
                extension: extension_of(&norm),
            });
        }
        for ext in PROBE_EXTENSIONS {
            if let Some(bytes) = self.files.get(&format!("{norm}.{ext}")) {
                return Ok(AssetBytes {
                    bytes: bytes.clone(),
                    extension: Some(ext.to_string()),
                });
            }
        }
        Err(anyhow::anyhow!("asset '{norm}' not found").into())
    }
}

pub(crate) fn normalize_rel_path(source: &str) -> TesseraResult<String> {
    let s = source.replace('\\', "/");
    if s.starts_with('/') {
        return Err(TesseraError::precondition("asset paths must be relative"));
    }
    if s.is_empty() {
        return Err(TesseraError::precondition("asset path must be non-empty"));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(TesseraError::precondition(
                "asset paths must not contain '..'",
            ));
        }
        out.push(part);
    }

    if out.is_empty() {
        return Err(TesseraError::precondition(
            "asset path must contain a file name",
        ));
    }

    Ok(out.join("/"))
}

fn extension_of(path: &str) -> Option<String> {
    let name = path.rsplit('/').next()?;
    let (stem, ext) = name.rsplit_once('.')?;
    (!stem.is_empty() && !ext.is_empty()).then(|| ext.to_ascii_lowercase())
}

#[cfg(test)]
#[path = "../../tests/unit/assets/source.rs"]
mod tests;
