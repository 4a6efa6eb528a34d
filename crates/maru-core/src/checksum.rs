//! 設定チェックサム
//!
//! maru.yaml の内容から決定的なダイジェストを計算し、
//! 前回 Dockerfile を生成したときの値と比較するために保存します。

use crate::error::{ConfigError, Result};
use crate::model::ProjectConfig;
use sha2::{Digest, Sha256};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

/// チェックサムの保存先（プロジェクトルートからの相対パス）
pub const CHECKSUM_FILE: &str = ".maru/checksum";

/// 設定内容のダイジェスト（SHA-256, 16進小文字）
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Checksum(String);

impl Checksum {
    /// 設定の正規化JSONからチェックサムを計算
    ///
    /// フィールド順は構造体定義順、マップはキー順で固定される。
    /// UTF-8でないテンプレートパスなど、JSONにできない値はエラーになる。
    pub fn of(config: &ProjectConfig) -> Result<Self> {
        let canonical = serde_json::to_vec(config).map_err(ConfigError::Serialize)?;
        Ok(Self(hex::encode(Sha256::digest(&canonical))))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for Checksum {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// 保存済みチェックサムの読み書き
#[derive(Debug, Clone)]
pub struct ChecksumStore {
    path: PathBuf,
}

impl ChecksumStore {
    /// プロジェクトルート配下の既定の場所を使う
    pub fn for_project(project_root: &Path) -> Self {
        Self::new(project_root.join(CHECKSUM_FILE))
    }

    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 保存済みチェックサムを読み込む（未保存なら `None`）
    pub fn load(&self) -> Result<Option<Checksum>> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => {
                let value = content.trim();
                if value.is_empty() {
                    Ok(None)
                } else {
                    Ok(Some(Checksum(value.to_string())))
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn save(&self, checksum: &Checksum) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, format!("{}\n", checksum))?;
        debug!(path = %self.path.display(), %checksum, "Saved config checksum");
        Ok(())
    }

    /// 保存済みの値と一致するか
    pub fn matches(&self, checksum: &Checksum) -> Result<bool> {
        Ok(self.load()?.as_ref() == Some(checksum))
    }
}
