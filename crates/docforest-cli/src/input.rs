//! Source unit files written by a parse-tree provider

use std::path::{Path, PathBuf};

use docforest_core::doc::SourceUnit;
use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when reading unit files
#[derive(Error, Debug)]
pub enum InputError {
    #[error("failed to read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// A unit file holds either one unit or a list of them
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum UnitFile {
    Many(Vec<SourceUnit>),
    One(SourceUnit),
}

impl UnitFile {
    fn into_units(self) -> Vec<SourceUnit> {
        match self {
            UnitFile::Many(units) => units,
            UnitFile::One(unit) => vec![unit],
        }
    }
}

/// Parse the units of one file's content
pub fn parse_units(content: &str, path: &Path) -> Result<Vec<SourceUnit>, InputError> {
    serde_json::from_str::<UnitFile>(content)
        .map(UnitFile::into_units)
        .map_err(|source| InputError::Parse {
            path: path.to_path_buf(),
            source,
        })
}

/// Read every unit from the given files, in argument order
pub fn load_units(paths: &[PathBuf]) -> Result<Vec<SourceUnit>, InputError> {
    let mut units = Vec::new();
    for path in paths {
        let content = std::fs::read_to_string(path).map_err(|source| InputError::Io {
            path: path.clone(),
            source,
        })?;
        let parsed = parse_units(&content, path)?;
        tracing::debug!("loaded {} units from {}", parsed.len(), path.display());
        units.extend(parsed);
    }
    Ok(units)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SINGLE: &str = r#"{
        "package": "core",
        "comments": [{"line": 1, "text": " A list. "}],
        "nodes": [{"name": "List", "line": 1, "children": [{"name": "len", "line": 2}]}]
    }"#;

    #[test]
    fn test_parse_single_unit() {
        let units = parse_units(SINGLE, Path::new("single.json")).unwrap();
        assert_eq!(units.len(), 1);
        assert_eq!(units[0].package, "core");
        assert_eq!(units[0].nodes[0].children[0].name.as_deref(), Some("len"));
    }

    #[test]
    fn test_parse_unit_list() {
        let content = r#"[{"package": "a", "nodes": []}, {"package": "b"}]"#;
        let units = parse_units(content, Path::new("many.json")).unwrap();
        let packages: Vec<_> = units.iter().map(|u| u.package.as_str()).collect();
        assert_eq!(packages, ["a", "b"]);
        assert!(units[1].comments.is_empty());
    }

    #[test]
    fn test_parse_error_names_the_file() {
        let err = parse_units("{not json", Path::new("broken.json")).unwrap_err();
        assert!(err.to_string().contains("broken.json"));
    }

    #[test]
    fn test_load_units_in_argument_order() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("first.json");
        let second = dir.path().join("second.json");
        std::fs::write(&first, SINGLE).unwrap();
        std::fs::write(&second, r#"[{"package": "io"}]"#).unwrap();

        let units = load_units(&[first, second]).unwrap();
        let packages: Vec<_> = units.iter().map(|u| u.package.as_str()).collect();
        assert_eq!(packages, ["core", "io"]);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_units(&[dir.path().join("missing.json")]);
        assert!(matches!(result, Err(InputError::Io { .. })));
    }
}
