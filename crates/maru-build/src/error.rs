use maru_core::ConfigError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Dockerfile not found: {0}")]
    DockerfileNotFound(PathBuf),

    #[error("Docker connection error")]
    EngineConnection(#[from] bollard::errors::Error),

    #[error("Failed to create build context")]
    Packaging(#[source] std::io::Error),

    #[error("Build failed: {0}")]
    BuildFailed(String),

    #[error("Invalid image tag: {0}")]
    InvalidTag(String),
}

impl BuildError {
    /// ユーザー向けの分かりやすいエラーメッセージ
    pub fn user_message(&self) -> String {
        match self {
            BuildError::EngineConnection(e) => {
                format!(
                    "Could not talk to the Docker engine: {}\n\
                     \n\
                     hints:\n\
                     • make sure the Docker daemon is running\n\
                     • check DOCKER_HOST if you use a remote engine\n\
                     • `docker ps` should work from this shell",
                    e
                )
            }
            BuildError::DockerfileNotFound(path) => {
                format!(
                    "Dockerfile not found: {}\n\
                     \n\
                     Run `maru init` to generate it from maru.yaml.",
                    path.display()
                )
            }
            _ => {
                // 原因のチェーンを1行にまとめる
                let mut message = self.to_string();
                let mut source = std::error::Error::source(self);
                while let Some(cause) = source {
                    message.push_str(": ");
                    message.push_str(&cause.to_string());
                    source = cause.source();
                }
                message
            }
        }
    }
}

pub type BuildResult<T> = std::result::Result<T, BuildError>;
