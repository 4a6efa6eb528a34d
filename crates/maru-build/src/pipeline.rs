//! ビルド全体の流れ
//!
//! 設定読み込み済み → ドリフト確認 → エンジン接続確認 → コンテキスト作成 →
//! ビルド送信 → 進捗中継 → タグ付与

use crate::builder::{BuildSummary, ImageBuilder};
use crate::context::ContextBuilder;
use crate::engine::BuildEngine;
use crate::error::{BuildError, BuildResult};
use crate::options::BuildOptions;
use crate::progress::ProgressSink;
use maru_core::template::dockerfile_exists;
use maru_core::{
    ChecksumStore, DOCKERFILE, DriftOutcome, ProjectConfig, Regenerator, Session, check_drift,
};
use std::path::{Path, PathBuf};

/// パイプラインの結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildReport {
    Built(BuildSummary),
    /// ドリフト確認でユーザーがビルドを取りやめた
    Aborted,
}

pub struct BuildPipeline<'a, E: BuildEngine + ?Sized> {
    engine: &'a E,
    session: &'a Session<'a>,
    regenerator: &'a dyn Regenerator,
    project_root: PathBuf,
    no_cache: bool,
}

impl<'a, E: BuildEngine + ?Sized> BuildPipeline<'a, E> {
    pub fn new(
        engine: &'a E,
        session: &'a Session<'a>,
        regenerator: &'a dyn Regenerator,
        project_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            engine,
            session,
            regenerator,
            project_root: project_root.into(),
            no_cache: false,
        }
    }

    pub fn no_cache(mut self, no_cache: bool) -> Self {
        self.no_cache = no_cache;
        self
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// ビルドを実行
    #[tracing::instrument(skip_all, fields(project = %config.name))]
    pub async fn run(
        &self,
        config: &ProjectConfig,
        sink: &mut dyn ProgressSink,
    ) -> BuildResult<BuildReport> {
        let reporter = self.session.reporter;
        let store = ChecksumStore::for_project(&self.project_root);

        let reconciled = match check_drift(config, &store, self.session, self.regenerator)? {
            DriftOutcome::Proceed(reconciled) => reconciled,
            DriftOutcome::Abort => return Ok(BuildReport::Aborted),
        };

        reporter.info(&format!(
            "Building {} from {} @ {}",
            config.name_version(),
            config.repo_tag(),
            if config.build.repo_url.is_empty() {
                "(no repository)"
            } else {
                config.build.repo_url.as_str()
            }
        ));

        let options = BuildOptions::from_reconciled(&reconciled)?.with_no_cache(self.no_cache);

        if !dockerfile_exists(&self.project_root) {
            return Err(BuildError::DockerfileNotFound(
                self.project_root.join(DOCKERFILE),
            ));
        }

        self.engine.ping().await?;

        reporter.step("Creating build context...");
        let context = ContextBuilder::package(&self.project_root)?;

        reporter.step("Building image...");
        let summary = ImageBuilder::new(self.engine)
            .build(context, &options, sink)
            .await?;

        Ok(BuildReport::Built(summary))
    }
}
