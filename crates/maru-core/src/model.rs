//! プロジェクト定義
//!
//! YAML形式：
//! ```yaml
//! name: app
//! version: 1.2.0
//! build:
//!   repo_url: https://github.com/example/app.git
//!   repo_tag: v1.2.0
//!   base_image: alpine:3.20
//!   template: Dockerfile.tera
//! build_args:
//!   RUST_LOG: info
//! ```

use crate::checksum::Checksum;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

/// 組み込みテンプレートで使うベースイメージ
pub const DEFAULT_BASE_IMAGE: &str = "alpine:latest";

/// maru.yaml の内容
///
/// チェックサムはこの構造体のシリアライズ結果から計算されるため、
/// マップ型は順序の安定した `BTreeMap` を使う。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub build: BuildSection,
    #[serde(default)]
    pub build_args: BTreeMap<String, String>,
}

/// ビルド設定
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildSection {
    /// ソースリポジトリのURL
    #[serde(default)]
    pub repo_url: String,
    /// ソースリポジトリのタグ（省略時は `v{version}`）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo_tag: Option<String>,
    /// ベースイメージ（省略時は [`DEFAULT_BASE_IMAGE`]）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_image: Option<String>,
    /// Dockerfileテンプレート（プロジェクトルートからの相対パス）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<PathBuf>,
}

impl ProjectConfig {
    /// 最小構成のプロジェクトを作成
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            build: BuildSection::default(),
            build_args: BTreeMap::new(),
        }
    }

    /// `name:version` 形式のイメージタグ
    pub fn name_version(&self) -> String {
        format!("{}:{}", self.name, self.version)
    }

    /// `name:latest` 形式のイメージタグ
    pub fn latest_tag(&self) -> String {
        format!("{}:latest", self.name)
    }

    /// ビルドで付与する全タグ（latest → version の順）
    pub fn image_tags(&self) -> Vec<String> {
        vec![self.latest_tag(), self.name_version()]
    }

    pub fn repo_tag(&self) -> String {
        self.build
            .repo_tag
            .clone()
            .unwrap_or_else(|| format!("v{}", self.version))
    }

    pub fn base_image(&self) -> &str {
        self.build.base_image.as_deref().unwrap_or(DEFAULT_BASE_IMAGE)
    }

    /// 設定内容のチェックサム
    pub fn checksum(&self) -> crate::error::Result<Checksum> {
        Checksum::of(self)
    }

    /// ビルド引数を解決
    ///
    /// 同名の環境変数があればその値、なければ maru.yaml の値を使う。
    /// 宣言されていないキーは `None`。
    pub fn resolve_build_arg(&self, key: &str) -> Option<String> {
        self.resolve_build_arg_with(key, |k| std::env::var(k).ok())
    }

    /// 環境の参照方法を指定してビルド引数を解決
    pub fn resolve_build_arg_with<F>(&self, key: &str, lookup: F) -> Option<String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let declared = self.build_args.get(key)?;
        Some(lookup(key).unwrap_or_else(|| declared.clone()))
    }

    /// 宣言済みの全ビルド引数を解決
    pub fn resolved_build_args(&self) -> HashMap<String, String> {
        self.build_args
            .keys()
            .filter_map(|key| {
                self.resolve_build_arg(key)
                    .map(|value| (key.clone(), value))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ProjectConfig {
        let mut config = ProjectConfig::new("app", "1.2.0");
        config
            .build_args
            .insert("MARU_TEST_GREETING".to_string(), "hello".to_string());
        config
    }

    #[test]
    fn test_image_tags() {
        let config = sample();
        assert_eq!(config.name_version(), "app:1.2.0");
        assert_eq!(config.image_tags(), vec!["app:latest", "app:1.2.0"]);
    }

    #[test]
    fn test_repo_tag_defaults_to_version() {
        let mut config = sample();
        assert_eq!(config.repo_tag(), "v1.2.0");

        config.build.repo_tag = Some("release-1".to_string());
        assert_eq!(config.repo_tag(), "release-1");
    }

    #[test]
    fn test_resolve_build_arg_default() {
        let config = sample();
        let value = config.resolve_build_arg_with("MARU_TEST_GREETING", |_| None);
        assert_eq!(value.as_deref(), Some("hello"));
    }

    #[test]
    fn test_resolve_build_arg_env_override() {
        let config = sample();
        temp_env::with_var("MARU_TEST_GREETING", Some("from-env"), || {
            assert_eq!(
                config.resolve_build_arg("MARU_TEST_GREETING").as_deref(),
                Some("from-env")
            );
            let args = config.resolved_build_args();
            assert_eq!(args.get("MARU_TEST_GREETING").unwrap(), "from-env");
        });
    }

    #[test]
    fn test_resolve_build_arg_undeclared() {
        let config = sample();
        assert!(config
            .resolve_build_arg_with("UNDECLARED", |_| Some("x".to_string()))
            .is_none());
    }

    #[test]
    fn test_empty_build_arg_is_present() {
        let mut config = ProjectConfig::new("app", "1.0.0");
        config
            .build_args
            .insert("MARU_TEST_EMPTY_ARG".to_string(), String::new());

        temp_env::with_var_unset("MARU_TEST_EMPTY_ARG", || {
            let args = config.resolved_build_args();
            assert_eq!(args.get("MARU_TEST_EMPTY_ARG").map(String::as_str), Some(""));
        });
    }
}
