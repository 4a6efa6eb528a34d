//! イメージビルドエンジン
//!
//! ビルドそのものはDocker Engineに委譲します。テストではモック実装に差し替えます。

use crate::context::ContextArchive;
use crate::error::{BuildError, BuildResult};
use crate::options::{BuildOptions, split_image_tag};
use crate::progress::ProgressMessage;
use async_trait::async_trait;
use bollard::Docker;
use futures_util::StreamExt;
use futures_util::stream::BoxStream;
use std::sync::OnceLock;

#[async_trait]
pub trait BuildEngine: Send + Sync {
    /// エンジンへの接続を確認
    async fn ping(&self) -> BuildResult<()>;

    /// ビルドを開始し、進捗メッセージのストリームをすぐに返す
    ///
    /// 実際の処理はストリームを読み進めるにつれて行われる。
    /// コンテキストは一時ファイルから逐次送信する。
    fn build_image(
        &self,
        context: ContextArchive,
        options: &BuildOptions,
    ) -> BoxStream<'_, BuildResult<ProgressMessage>>;

    /// 既存イメージに `target`（repo:tag）を付与
    async fn tag_image(&self, source: &str, target: &str) -> BuildResult<()>;
}

/// Docker Engine API を使う実装
///
/// 接続は最初に使うとき（通常は `ping`）に確立する。
pub struct DockerEngine {
    docker: OnceLock<Docker>,
}

impl DockerEngine {
    pub fn new(docker: Docker) -> Self {
        Self {
            docker: OnceLock::from(docker),
        }
    }

    /// 環境変数（DOCKER_HOST など）またはローカルの既定値で接続するエンジン
    pub fn local() -> Self {
        Self {
            docker: OnceLock::new(),
        }
    }

    fn docker(&self) -> BuildResult<&Docker> {
        if let Some(docker) = self.docker.get() {
            return Ok(docker);
        }
        let docker = Docker::connect_with_local_defaults()?;
        tracing::debug!("Connected to Docker engine");
        Ok(self.docker.get_or_init(|| docker))
    }
}

#[async_trait]
impl BuildEngine for DockerEngine {
    async fn ping(&self) -> BuildResult<()> {
        self.docker()?.ping().await?;
        tracing::debug!("Docker engine is reachable");
        Ok(())
    }

    fn build_image(
        &self,
        context: ContextArchive,
        options: &BuildOptions,
    ) -> BoxStream<'_, BuildResult<ProgressMessage>> {
        tracing::info!("Building image: {}", options.primary_tag());

        let docker = match self.docker() {
            Ok(docker) => docker,
            Err(e) => return futures_util::stream::once(std::future::ready(Err(e))).boxed(),
        };

        #[allow(deprecated)]
        let build_options = bollard::image::BuildImageOptions::<String> {
            dockerfile: options.dockerfile().to_string(),
            t: options.primary_tag().to_string(),
            buildargs: options.build_args().clone(),
            nocache: options.no_cache(),
            rm: true,      // 中間コンテナを削除
            forcerm: true, // ビルド失敗時も中間コンテナを削除
            ..Default::default()
        };

        tracing::debug!("Build options: {:?}", build_options);

        let body = bollard::body_try_stream(context.into_stream());
        docker
            .build_image(build_options, None, Some(body))
            .map(|result| {
                result
                    .map(ProgressMessage::from)
                    .map_err(|e| match e {
                        // ビルド中にエンジンが返したエラーはそのまま表示する
                        bollard::errors::Error::DockerStreamError { error } => {
                            BuildError::BuildFailed(error)
                        }
                        other => BuildError::EngineConnection(other),
                    })
            })
            .boxed()
    }

    async fn tag_image(&self, source: &str, target: &str) -> BuildResult<()> {
        let (repo, tag) = split_image_tag(target)?;

        #[allow(deprecated)]
        let options = bollard::image::TagImageOptions::<String> {
            repo: repo.to_string(),
            tag: tag.to_string(),
        };

        self.docker()?.tag_image(source, Some(options)).await?;
        tracing::debug!("Tagged {} as {}", source, target);
        Ok(())
    }
}
