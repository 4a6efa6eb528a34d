//! プロジェクトルートの検出

use crate::error::{ConfigError, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// プロジェクト定義ファイル名
pub const PROJECT_FILE: &str = "maru.yaml";

/// プロジェクトルートを検出
///
/// 以下の優先順位で検索:
/// 1. 環境変数 MARU_PROJECT_ROOT
/// 2. カレントディレクトリから上に向かって maru.yaml を探す
#[tracing::instrument]
pub fn find_project_root() -> Result<PathBuf> {
    // 1. 環境変数
    if let Ok(root) = std::env::var("MARU_PROJECT_ROOT") {
        let path = PathBuf::from(&root);
        debug!(env_root = %root, "Checking MARU_PROJECT_ROOT");
        if path.join(PROJECT_FILE).exists() {
            info!(project_root = %path.display(), "Found project root from environment variable");
            return Ok(path);
        }
    }

    // 2. カレントディレクトリから上に向かって探す
    let start_dir = std::env::current_dir()?;
    find_project_root_from(&start_dir)
}

/// 指定ディレクトリから上に向かってプロジェクトルートを探す
pub fn find_project_root_from(start_dir: &Path) -> Result<PathBuf> {
    let mut current = start_dir.to_path_buf();
    debug!(start_dir = %start_dir.display(), "Searching for project root");

    loop {
        if current.join(PROJECT_FILE).exists() {
            info!(project_root = %current.display(), "Found project root (maru.yaml)");
            return Ok(current);
        }

        // 親ディレクトリへ
        if !current.pop() {
            break;
        }
    }

    warn!(start_dir = %start_dir.display(), "Project root not found");
    Err(ConfigError::ProjectFileNotFound(start_dir.to_path_buf()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;

    #[test]
    fn test_find_in_start_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::write(temp_dir.path().join(PROJECT_FILE), "name: app\nversion: 1.0.0\n").unwrap();

        let root = find_project_root_from(temp_dir.path()).unwrap();
        assert_eq!(root, temp_dir.path());
    }

    #[test]
    fn test_find_in_parent_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::write(temp_dir.path().join(PROJECT_FILE), "name: app\nversion: 1.0.0\n").unwrap();

        let nested = temp_dir.path().join("src").join("bin");
        fs::create_dir_all(&nested).unwrap();

        let root = find_project_root_from(&nested).unwrap();
        assert_eq!(root, temp_dir.path());
    }

    #[test]
    fn test_not_found() {
        let temp_dir = tempfile::tempdir().unwrap();
        let result = find_project_root_from(temp_dir.path());

        match result {
            Err(ConfigError::ProjectFileNotFound(path)) => assert_eq!(path, temp_dir.path()),
            other => panic!("Expected ProjectFileNotFound, got {:?}", other),
        }
    }

    #[test]
    #[serial]
    fn test_env_var_takes_priority() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::write(temp_dir.path().join(PROJECT_FILE), "name: app\nversion: 1.0.0\n").unwrap();

        temp_env::with_var("MARU_PROJECT_ROOT", Some(temp_dir.path()), || {
            let root = find_project_root().unwrap();
            assert_eq!(root, temp_dir.path());
        });
    }
}
