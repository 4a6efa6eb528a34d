use maru_core::{ConsoleReporter, DockerfileGenerator, PROJECT_FILE, ProjectConfig, Reporter};
use std::path::{Path, PathBuf};

/// 新規プロジェクトの初期バージョン
const INITIAL_VERSION: &str = "0.1.0";

/// 既存プロジェクトがあればそのルート、なければカレントディレクトリ
pub fn resolve_root() -> anyhow::Result<PathBuf> {
    match maru_core::find_project_root() {
        Ok(root) => Ok(root),
        Err(maru_core::ConfigError::ProjectFileNotFound(_)) => Ok(std::env::current_dir()?),
        Err(e) => Err(e.into()),
    }
}

/// 初期化コマンドを処理
///
/// maru.yaml がなければ作成し、Dockerfileとチェックサムを生成する。
pub fn handle(project_root: &Path, force: bool) -> anyhow::Result<()> {
    let reporter = ConsoleReporter;
    let project_file = project_root.join(PROJECT_FILE);

    if force || !project_file.exists() {
        let config = ProjectConfig::new(default_project_name(project_root), INITIAL_VERSION);
        maru_core::loader::validate(&config)?;
        maru_core::save(project_root, &config)?;
        reporter.success(&format!("Created {}", project_file.display()));
    }

    let config = maru_core::load(project_root)?;
    let dockerfile = DockerfileGenerator::new(project_root).generate(&config)?;
    reporter.success(&format!("Generated {}", dockerfile.display()));
    reporter.info("Next use `maru build` to build the container");

    Ok(())
}

/// ディレクトリ名からイメージ名として使える名前を作る
fn default_project_name(project_root: &Path) -> String {
    let raw = project_root
        .file_name()
        .map(|name| name.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    let mut name = String::with_capacity(raw.len());
    for c in raw.chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '.' || c == '_' {
            name.push(c);
        } else if !name.ends_with('-') {
            name.push('-');
        }
    }

    let name = name.trim_matches(['-', '.', '_']).to_string();
    if name.is_empty() { "app".to_string() } else { name }
}
