//! How import paths become module names, and module names become source.

use std::path::{Component, Path, PathBuf};

use rustc_hash::FxHashMap;

use crate::LinkerError;

pub trait Linker: Send + Sync {
    /// Name of the module `path` refers to when imported from `from`.
    fn resolve(&self, path: &str, from: &str) -> Result<String, LinkerError>;

    fn load_source(&self, name: &str) -> Result<String, LinkerError>;
}

/// In-memory sources. Import paths are module names.
#[derive(Clone, Debug, Default)]
pub struct MapLinker {
    sources: FxHashMap<String, String>,
}

impl MapLinker {
    pub fn new() -> Self {
        MapLinker::default()
    }

    #[must_use]
    pub fn with_source(mut self, name: impl Into<String>, code: impl Into<String>) -> Self {
        self.sources.insert(name.into(), code.into());
        self
    }
}

impl Linker for MapLinker {
    fn resolve(&self, path: &str, _from: &str) -> Result<String, LinkerError> {
        Ok(path.to_string())
    }

    fn load_source(&self, name: &str) -> Result<String, LinkerError> {
        self.sources
            .get(name)
            .cloned()
            .ok_or_else(|| LinkerError::NotFound {
                name: name.to_string(),
            })
    }
}

/// Files under a root directory. Module names are paths relative to the
/// root, and imports must be relative to the importing file.
#[derive(Clone, Debug)]
pub struct FsLinker {
    root: PathBuf,
}

impl FsLinker {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FsLinker { root: root.into() }
    }
}

/// Lexically resolve `.` and `..`. Leading `..` that would climb above the
/// root are kept.
fn normalize(path: &Path) -> PathBuf {
    let mut parts: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match parts.last() {
                Some(Component::Normal(_)) => {
                    parts.pop();
                }
                _ => parts.push(component),
            },
            other => parts.push(other),
        }
    }
    parts.iter().collect()
}

impl Linker for FsLinker {
    fn resolve(&self, path: &str, from: &str) -> Result<String, LinkerError> {
        if !path.starts_with("./") && !path.starts_with("../") {
            return Err(LinkerError::NotRelative {
                path: path.to_string(),
            });
        }
        let base = Path::new(from).parent().unwrap_or_else(|| Path::new(""));
        Ok(normalize(&base.join(path)).to_string_lossy().into_owned())
    }

    fn load_source(&self, name: &str) -> Result<String, LinkerError> {
        let path = self.root.join(name);
        tracing::debug!(path = %path.display(), "loading source");
        std::fs::read_to_string(&path).map_err(|err| match err.kind() {
            std::io::ErrorKind::NotFound => LinkerError::NotFound {
                name: name.to_string(),
            },
            _ => LinkerError::Io {
                name: name.to_string(),
                message: err.to_string(),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fs_linker_resolves_relative_to_importer() {
        let linker = FsLinker::new("/tmp");
        assert_eq!(
            linker.resolve("./b.squiggle", "dir/a.squiggle").ok(),
            Some("dir/b.squiggle".to_string())
        );
        assert_eq!(
            linker.resolve("../c.squiggle", "dir/sub/a.squiggle").ok(),
            Some("dir/c.squiggle".to_string())
        );
        assert_eq!(
            linker.resolve("./b.squiggle", "a.squiggle").ok(),
            Some("b.squiggle".to_string())
        );
    }

    #[test]
    fn test_fs_linker_rejects_bare_paths() {
        let err = FsLinker::new("/tmp").resolve("b.squiggle", "a.squiggle");
        assert_eq!(
            err.map_err(|e| e.to_string()),
            Err("Only relative paths in imports are allowed".to_string())
        );
    }

    #[test]
    fn test_map_linker() {
        let linker = MapLinker::new().with_source("p1", "x = 1");
        assert_eq!(linker.resolve("p1", "main").ok(), Some("p1".to_string()));
        assert_eq!(linker.load_source("p1").ok(), Some("x = 1".to_string()));
        assert_eq!(
            linker.load_source("p2"),
            Err(LinkerError::NotFound {
                name: "p2".to_string()
            })
        );
    }
}
