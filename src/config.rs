//! Loading of the repository list.
//!
//! The config file is a JSON object whose keys are arbitrary project
//! identifiers. Each value must carry a `github` block naming the owner and
//! repository; anything else in the entry is ignored. Targets are returned in
//! the order the keys appear in the file.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::types::{Repo, RepoError};

pub const DEFAULT_CONFIG_PATH: &str = "repos.json";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file '{}'", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("config file '{}' is not valid JSON", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("config file '{}' must contain a JSON object at the top level", path.display())]
    NotAnObject { path: PathBuf },

    #[error("config entry '{key}' must contain 'github.owner' and 'github.repoName' strings")]
    InvalidEntry {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("config entry '{key}' names an invalid repository: {reason}")]
    InvalidRepository { key: String, reason: RepoError },
}

#[derive(Debug, Deserialize)]
struct ProjectEntry {
    github: GitHubCoordinates,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GitHubCoordinates {
    owner: String,
    repo_name: String,
}

/// Reads and validates the config file at `path`.
pub fn load_targets(path: &Path) -> Result<Vec<Repo>, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    parse_targets(path, &raw)
}

fn parse_targets(path: &Path, raw: &str) -> Result<Vec<Repo>, ConfigError> {
    let document: serde_json::Value =
        serde_json::from_str(raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    let serde_json::Value::Object(entries) = document else {
        return Err(ConfigError::NotAnObject {
            path: path.to_path_buf(),
        });
    };

    entries
        .into_iter()
        .map(|(key, value)| parse_entry(key, value))
        .collect()
}

fn parse_entry(key: String, value: serde_json::Value) -> Result<Repo, ConfigError> {
    let entry: ProjectEntry = match serde_json::from_value(value) {
        Ok(entry) => entry,
        Err(source) => return Err(ConfigError::InvalidEntry { key, source }),
    };

    Repo::new(entry.github.owner, entry.github.repo_name)
        .map_err(|reason| ConfigError::InvalidRepository { key, reason })
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_loads_targets_in_file_order() {
        let file = write_config(
            r#"{
                "zeta-service": { "github": { "owner": "acme", "repoName": "zeta" } },
                "alpha-lib": { "github": { "owner": "acme", "repoName": "alpha" }, "npm": "@acme/alpha" },
                "middle": { "github": { "owner": "other", "repoName": "middle" } }
            }"#,
        );

        let targets = load_targets(file.path()).unwrap();
        let names: Vec<String> = targets.iter().map(|t| t.to_string()).collect();

        assert_eq!(names, vec!["acme/zeta", "acme/alpha", "other/middle"]);
    }

    #[test]
    fn test_empty_object_yields_no_targets() {
        let file = write_config("{}");
        assert!(load_targets(file.path()).unwrap().is_empty());
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_targets(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        let file = write_config("{ not json");
        let err = load_targets(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_top_level_array_is_rejected() {
        let file = write_config("[]");
        let err = load_targets(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::NotAnObject { .. }));
    }

    #[test]
    fn test_missing_repo_name_names_the_key() {
        let file = write_config(
            r#"{
                "good": { "github": { "owner": "acme", "repoName": "good" } },
                "broken": { "github": { "owner": "acme" } }
            }"#,
        );

        let err = load_targets(file.path()).unwrap_err();
        match &err {
            ConfigError::InvalidEntry { key, .. } => assert_eq!(key, "broken"),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.to_string().contains("'broken'"));
    }

    #[test]
    fn test_blank_owner_is_invalid_repository() {
        let file = write_config(r#"{ "blank": { "github": { "owner": "", "repoName": "x" } } }"#);

        let err = load_targets(file.path()).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidRepository {
                reason: RepoError::BlankOwner,
                ..
            }
        ));
    }
}
