use std::{
    fs,
    net::SocketAddr,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Server settings, read from a JSON file at startup. A missing file falls
/// back to the development defaults; CLI flags may override individual
/// fields afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub bind_addr: SocketAddr,
    pub db_path: PathBuf,
    pub study_image: PathBuf,
    /// Hex SHA-256 digest of the admin password. The default digest matches
    /// the development password "snowstudy-dev"; override it in deployment.
    pub admin_password_sha256: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: ([127, 0, 0, 1], 8000).into(),
            db_path: PathBuf::from("snowstudy.sqlite3"),
            study_image: PathBuf::from("assets/study_scene.jpg"),
            admin_password_sha256:
                "c93797a2a7a74db163ab8c7b37629ead0506cfc2c16fce865ea5f5af325d06d8".into(),
        }
    }
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse settings from {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load(&dir.path().join("absent.json")).unwrap();
        assert_eq!(settings.db_path, PathBuf::from("snowstudy.sqlite3"));
    }

    #[test]
    fn file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(
            &path,
            r#"{
                "bind_addr": "0.0.0.0:9100",
                "db_path": "/tmp/study.sqlite3",
                "study_image": "/srv/scene.jpg",
                "admin_password_sha256": "deadbeef"
            }"#,
        )
        .unwrap();

        let settings = Settings::load(&path).unwrap();
        assert_eq!(settings.bind_addr, "0.0.0.0:9100".parse().unwrap());
        assert_eq!(settings.admin_password_sha256, "deadbeef");
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{not json").unwrap();
        assert!(Settings::load(&path).is_err());
    }
}
