//! Dockerfile生成
//!
//! Teraを使用して maru.yaml からDockerfileを生成します。

use crate::checksum::ChecksumStore;
use crate::drift::Regenerator;
use crate::error::{ConfigError, Result};
use crate::model::ProjectConfig;
use std::path::{Path, PathBuf};
use tera::{Context, Tera};
use tracing::{debug, info};

/// 生成するDockerfileのパス（プロジェクトルートからの相対パス）
pub const DOCKERFILE: &str = "Dockerfile";

/// 組み込みテンプレート名（エラー表示用）
const BUILTIN_TEMPLATE_NAME: &str = "<builtin>";

/// 組み込みDockerfileテンプレート
pub const BUILTIN_TEMPLATE: &str = r#"# Generated by maru from maru.yaml. Run `maru init` to regenerate.
FROM {{ base_image }}
{% for arg in build_args %}
ARG {{ arg }}{% endfor %}

LABEL org.opencontainers.image.title="{{ name }}" \
      org.opencontainers.image.version="{{ version }}" \
      org.opencontainers.image.source="{{ repo_url }}" \
      org.opencontainers.image.revision="{{ repo_tag }}"

WORKDIR /app
COPY . /app
"#;

/// テンプレートからDockerfileを生成する
pub struct DockerfileGenerator {
    project_root: PathBuf,
    store: ChecksumStore,
}

impl DockerfileGenerator {
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        let project_root = project_root.into();
        let store = ChecksumStore::for_project(&project_root);
        Self {
            project_root,
            store,
        }
    }

    /// 出力先のDockerfileパス
    pub fn dockerfile_path(&self) -> PathBuf {
        self.project_root.join(DOCKERFILE)
    }

    /// Dockerfileの内容を生成（書き込みはしない）
    pub fn render(&self, config: &ProjectConfig) -> Result<String> {
        let (template, file) = match &config.build.template {
            Some(relative) => {
                let path = self.project_root.join(relative);
                let content = std::fs::read_to_string(&path).map_err(|e| {
                    ConfigError::Template {
                        file: path.clone(),
                        message: e.to_string(),
                    }
                })?;
                (content, path)
            }
            None => (
                BUILTIN_TEMPLATE.to_string(),
                PathBuf::from(BUILTIN_TEMPLATE_NAME),
            ),
        };

        let mut tera = Tera::default();
        tera.render_str(&template, &template_context(config))
            .map_err(|e| ConfigError::Template {
                file,
                message: extract_tera_error_detail(&e),
            })
    }

    /// Dockerfileを書き出し、チェックサムを保存
    #[tracing::instrument(skip_all, fields(project = %config.name))]
    pub fn generate(&self, config: &ProjectConfig) -> Result<PathBuf> {
        let content = self.render(config)?;
        let path = self.dockerfile_path();
        std::fs::write(&path, content)?;
        info!(dockerfile = %path.display(), "Generated Dockerfile");

        self.store.save(&config.checksum()?)?;
        Ok(path)
    }
}

impl Regenerator for DockerfileGenerator {
    fn regenerate(&self, config: &ProjectConfig) -> Result<()> {
        self.generate(config).map(|_| ())
    }
}

/// テンプレートに渡す変数
fn template_context(config: &ProjectConfig) -> Context {
    let mut context = Context::new();
    context.insert("name", &config.name);
    context.insert("version", &config.version);
    context.insert("repo_url", &config.build.repo_url);
    context.insert("repo_tag", &config.repo_tag());
    context.insert("base_image", config.base_image());
    context.insert(
        "build_args",
        &config.build_args.keys().collect::<Vec<_>>(),
    );
    context.insert("build_arg_defaults", &config.build_args);
    debug!(name = %config.name, "Prepared template context");
    context
}

/// Teraのエラーチェーンから詳細を抽出
fn extract_tera_error_detail(e: &tera::Error) -> String {
    use std::error::Error;

    let mut details = vec![e.to_string()];
    let mut source = e.source();
    while let Some(err) = source {
        details.push(err.to_string());
        source = err.source();
    }

    let full_error = details.join(" | ");

    // "Variable `xxx` not found in context"
    if full_error.contains("not found in context")
        && let Some(start) = full_error.find("Variable `")
        && let Some(end) = full_error[start..].find("` not found")
    {
        let var_name = &full_error[start + 10..start + end];
        return format!(
            "undefined variable `{}`\nhint: available variables are name, version, repo_url, repo_tag, base_image, build_args, build_arg_defaults",
            var_name
        );
    }

    full_error
}

/// 生成済みDockerfileが存在するか
pub fn dockerfile_exists(project_root: &Path) -> bool {
    project_root.join(DOCKERFILE).exists()
}
