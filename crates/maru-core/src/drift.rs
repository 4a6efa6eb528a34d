//! 設定ドリフトの検出
//!
//! maru.yaml のチェックサムを前回Dockerfileを生成した時点の値と比較し、
//! 変更があればDockerfileの再生成をユーザーに確認します。

use crate::checksum::{Checksum, ChecksumStore};
use crate::error::Result;
use crate::model::ProjectConfig;
use crate::session::Session;
use tracing::{debug, info};

pub const REGENERATE_QUESTION: &str =
    "The project configuration has changed. Do you want to regenerate the Dockerfile?";
pub const PROCEED_QUESTION: &str = "Proceed with container build?";

/// 各質問の既定の回答
pub const REGENERATE_DEFAULT: bool = true;
pub const PROCEED_DEFAULT: bool = true;

/// 生成物（Dockerfile）を再生成する
pub trait Regenerator {
    fn regenerate(&self, config: &ProjectConfig) -> Result<()>;
}

/// ドリフト確認を通過した設定
///
/// チェックサムが一致したか、ユーザーが不一致のまま続行を承認した場合にのみ
/// [`check_drift`] から得られる。
#[derive(Debug, Clone, Copy)]
pub struct Reconciled<'a> {
    config: &'a ProjectConfig,
    drifted: bool,
}

impl<'a> Reconciled<'a> {
    pub fn config(&self) -> &'a ProjectConfig {
        self.config
    }

    /// チェックサム不一致のまま続行したか
    pub fn drifted(&self) -> bool {
        self.drifted
    }
}

/// ドリフト確認の結果
#[derive(Debug)]
pub enum DriftOutcome<'a> {
    /// ビルドを続行する
    Proceed(Reconciled<'a>),
    /// ユーザーがビルドを取りやめた
    Abort,
}

/// チェックサムを比較し、必要ならDockerfileを再生成する
///
/// - 一致: 何も尋ねずに続行
/// - 不一致: 再生成するか確認し、再生成した場合はさらに続行するか確認
#[tracing::instrument(skip_all, fields(project = %config.name))]
pub fn check_drift<'a>(
    config: &'a ProjectConfig,
    store: &ChecksumStore,
    session: &Session<'_>,
    regenerator: &dyn Regenerator,
) -> Result<DriftOutcome<'a>> {
    let checksum = config.checksum()?;
    let stored = store.load()?;

    if stored.as_ref() == Some(&checksum) {
        debug!(%checksum, "Config checksum matches");
        return Ok(DriftOutcome::Proceed(Reconciled {
            config,
            drifted: false,
        }));
    }

    debug!(
        %checksum,
        stored = %stored.as_ref().map(Checksum::as_str).unwrap_or("<none>"),
        "Checksum does not match"
    );

    if !session
        .confirmer
        .ask(REGENERATE_QUESTION, REGENERATE_DEFAULT)?
    {
        info!("Continuing with the existing Dockerfile");
        session
            .reporter
            .warn("Building with a Dockerfile generated from an older configuration");
        return Ok(DriftOutcome::Proceed(Reconciled {
            config,
            drifted: true,
        }));
    }

    regenerator.regenerate(config)?;
    session.reporter.success("Regenerated the Dockerfile");

    if !session.confirmer.ask(PROCEED_QUESTION, PROCEED_DEFAULT)? {
        info!("Build cancelled by user");
        return Ok(DriftOutcome::Abort);
    }

    Ok(DriftOutcome::Proceed(Reconciled {
        config,
        drifted: false,
    }))
}
