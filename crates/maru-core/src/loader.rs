//! maru.yaml の読み込みと検証

use crate::discovery::PROJECT_FILE;
use crate::error::{ConfigError, Result};
use crate::model::ProjectConfig;
use std::path::Path;
use tracing::{debug, info};

/// Dockerタグとして使える最大長
const MAX_TAG_LENGTH: usize = 128;

/// プロジェクトルートから maru.yaml を読み込む
#[tracing::instrument]
pub fn load(project_root: &Path) -> Result<ProjectConfig> {
    let path = project_root.join(PROJECT_FILE);
    if !path.exists() {
        return Err(ConfigError::ProjectFileNotFound(project_root.to_path_buf()));
    }

    let content = std::fs::read_to_string(&path)?;
    let config: ProjectConfig =
        serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.clone(),
            source,
        })?;

    validate(&config)?;

    info!(
        name = %config.name,
        version = %config.version,
        build_args = config.build_args.len(),
        "Loaded project config"
    );
    Ok(config)
}

/// 設定をYAMLとして書き出す
pub fn save(project_root: &Path, config: &ProjectConfig) -> Result<()> {
    let path = project_root.join(PROJECT_FILE);
    let content = serde_yaml::to_string(config).map_err(|source| ConfigError::Parse {
        path: path.clone(),
        source,
    })?;
    std::fs::write(&path, content)?;
    debug!(path = %path.display(), "Wrote project config");
    Ok(())
}

/// 設定の意味的な検証
///
/// - name: 空でなく、Dockerリポジトリ名として有効（小文字英数字と `._-/`）
/// - version: 空でなく、Dockerタグとして有効
pub fn validate(config: &ProjectConfig) -> Result<()> {
    if config.name.trim().is_empty() {
        return Err(ConfigError::InvalidConfig("name must not be empty".into()));
    }

    let valid_name = config.name.chars().all(|c| {
        c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '.' | '_' | '-' | '/')
    });
    if !valid_name
        || config.name.starts_with(['.', '_', '-', '/'])
        || config.name.ends_with(['.', '_', '-', '/'])
    {
        return Err(ConfigError::InvalidConfig(format!(
            "name '{}' is not a valid image name (use lowercase letters, digits, '.', '_', '-', '/')",
            config.name
        )));
    }

    if config.version.trim().is_empty() {
        return Err(ConfigError::InvalidConfig(
            "version must not be empty".into(),
        ));
    }

    if config.version.len() > MAX_TAG_LENGTH
        || config.version.starts_with(['.', '-'])
        || !config
            .version
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
    {
        return Err(ConfigError::InvalidConfig(format!(
            "version '{}' is not a valid image tag",
            config.version
        )));
    }

    if let Some(key) = config
        .build_args
        .keys()
        .find(|key| key.is_empty() || key.contains(['=', ' ']))
    {
        return Err(ConfigError::InvalidConfig(format!(
            "build arg name '{}' is invalid",
            key
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_project(content: &str) -> tempfile::TempDir {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::write(temp_dir.path().join(PROJECT_FILE), content).unwrap();
        temp_dir
    }

    #[test]
    fn test_load_full_config() {
        let project = write_project(
            r#"
name: app
version: 1.2.0
build:
  repo_url: https://github.com/example/app.git
  repo_tag: release
  base_image: debian:bookworm
build_args:
  FEATURES: full
  PROFILE: release
"#,
        );

        let config = load(project.path()).unwrap();
        assert_eq!(config.name, "app");
        assert_eq!(config.version, "1.2.0");
        assert_eq!(config.build.repo_url, "https://github.com/example/app.git");
        assert_eq!(config.repo_tag(), "release");
        assert_eq!(config.base_image(), "debian:bookworm");
        assert_eq!(config.build_args.len(), 2);
        assert_eq!(config.build_args["PROFILE"], "release");
    }

    #[test]
    fn test_load_minimal_config() {
        let project = write_project("name: app\nversion: 1.2.0\n");

        let config = load(project.path()).unwrap();
        assert_eq!(config, ProjectConfig::new("app", "1.2.0"));
    }

    #[test]
    fn test_load_missing_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            load(temp_dir.path()),
            Err(ConfigError::ProjectFileNotFound(_))
        ));
    }

    #[test]
    fn test_load_malformed_yaml() {
        let project = write_project("name: [unterminated\n");
        assert!(matches!(
            load(project.path()),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_load_missing_version() {
        let project = write_project("name: app\n");
        assert!(matches!(
            load(project.path()),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_bad_name() {
        for name in ["", "App", "my app", "-app", "app/"] {
            let config = ProjectConfig::new(name, "1.0.0");
            assert!(
                matches!(validate(&config), Err(ConfigError::InvalidConfig(_))),
                "name {:?} should be rejected",
                name
            );
        }
    }

    #[test]
    fn test_validate_rejects_bad_version() {
        for version in ["", "1.0 beta", ".1", "v1:2"] {
            let config = ProjectConfig::new("app", version);
            assert!(
                matches!(validate(&config), Err(ConfigError::InvalidConfig(_))),
                "version {:?} should be rejected",
                version
            );
        }
    }

    #[test]
    fn test_validate_accepts_registry_name() {
        let config = ProjectConfig::new("ghcr.io/example/app", "1.0.0-rc.1");
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_save_then_load() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut config = ProjectConfig::new("app", "0.1.0");
        config.build.repo_url = "https://example.com/app.git".to_string();

        save(temp_dir.path(), &config).unwrap();
        let loaded = load(temp_dir.path()).unwrap();

        assert_eq!(loaded, config);
        assert_eq!(loaded.checksum().unwrap(), config.checksum().unwrap());
    }
}
