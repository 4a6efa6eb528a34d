use crate::error::{BuildError, BuildResult};
use maru_core::Reconciled;
use std::collections::HashMap;

/// ビルドで使うDockerfileのパス（コンテキストルートからの相対パス）
pub const DOCKERFILE_PATH: &str = "./Dockerfile";

/// エンジンに渡すビルドオプション
///
/// クレート外からはドリフト確認済みの設定からしか作れない。
///
/// ```compile_fail
/// let options = maru_build::BuildOptions {
///     tags: vec!["app:latest".to_string()],
///     dockerfile: "./Dockerfile".to_string(),
///     build_args: Default::default(),
///     no_cache: false,
/// };
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOptions {
    /// 付与するタグ。先頭のタグでビルドし、残りは後から付与する
    pub(crate) tags: Vec<String>,
    pub(crate) dockerfile: String,
    pub(crate) build_args: HashMap<String, String>,
    pub(crate) no_cache: bool,
}

impl BuildOptions {
    /// ドリフト確認済みの設定からオプションを組み立てる
    pub fn from_reconciled(reconciled: &Reconciled<'_>) -> BuildResult<Self> {
        let config = reconciled.config();
        Self::assemble(config.image_tags(), config.resolved_build_args())
    }

    /// ビルド引数の解決方法を指定して組み立てる
    pub fn from_reconciled_with<F>(reconciled: &Reconciled<'_>, lookup: F) -> BuildResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = reconciled.config();
        let build_args = config
            .build_args
            .keys()
            .filter_map(|key| {
                config
                    .resolve_build_arg_with(key, &lookup)
                    .map(|value| (key.clone(), value))
            })
            .collect();
        Self::assemble(config.image_tags(), build_args)
    }

    fn assemble(tags: Vec<String>, build_args: HashMap<String, String>) -> BuildResult<Self> {
        for tag in &tags {
            split_image_tag(tag)?;
        }

        Ok(Self {
            tags,
            dockerfile: DOCKERFILE_PATH.to_string(),
            build_args,
            no_cache: false,
        })
    }

    pub fn with_no_cache(mut self, no_cache: bool) -> Self {
        self.no_cache = no_cache;
        self
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn dockerfile(&self) -> &str {
        &self.dockerfile
    }

    pub fn build_args(&self) -> &HashMap<String, String> {
        &self.build_args
    }

    pub fn no_cache(&self) -> bool {
        self.no_cache
    }

    /// ビルド時に指定するタグ
    pub fn primary_tag(&self) -> &str {
        self.tags.first().map(String::as_str).unwrap_or_default()
    }

    /// ビルド後に追加で付与するタグ
    pub fn additional_tags(&self) -> &[String] {
        self.tags.get(1..).unwrap_or_default()
    }
}

/// `repo:tag` をリポジトリとタグに分割
///
/// 例: "app:1.2.0" -> ("app", "1.2.0")
///     "localhost:5000/app:dev" -> ("localhost:5000/app", "dev")
pub fn split_image_tag(image: &str) -> BuildResult<(&str, &str)> {
    let slash = image.rfind('/').map(|i| i + 1).unwrap_or(0);
    match image[slash..].rfind(':') {
        Some(colon) => {
            let (repo, tag) = image.split_at(slash + colon);
            let tag = &tag[1..];
            if repo.is_empty() || tag.is_empty() {
                Err(BuildError::InvalidTag(image.to_string()))
            } else {
                Ok((repo, tag))
            }
        }
        None => Err(BuildError::InvalidTag(image.to_string())),
    }
}
