//! ビルド進捗の表示
//!
//! エンジンから届くJSON進捗メッセージを端末に中継します。
//! 端末かどうかは最初に一度だけ判定し、端末ならスピナーと色付き出力、
//! そうでなければプレーンな行出力にします。

use crate::error::{BuildError, BuildResult};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{IsTerminal, Write};
use std::time::Duration;

/// エンジンの進捗メッセージ1件
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgressMessage {
    pub id: Option<String>,
    /// ビルドステップの出力（改行を含む生テキスト）
    pub stream: Option<String>,
    /// pull などのステータス
    pub status: Option<String>,
    pub progress: Option<String>,
    pub error: Option<String>,
    /// ビルド完了時のイメージID
    pub image_id: Option<String>,
}

impl ProgressMessage {
    pub fn stream(text: impl Into<String>) -> Self {
        Self {
            stream: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn status(text: impl Into<String>) -> Self {
        Self {
            status: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            error: Some(text.into()),
            ..Default::default()
        }
    }

    /// エラーメッセージがあればビルド失敗として返す
    pub fn check(&self) -> BuildResult<()> {
        match &self.error {
            Some(error) => Err(BuildError::BuildFailed(error.clone())),
            None => Ok(()),
        }
    }

    fn status_line(&self) -> Option<String> {
        let status = self.status.as_deref()?;
        let mut line = match &self.id {
            Some(id) => format!("{}: {}", id, status),
            None => status.to_string(),
        };
        if let Some(progress) = &self.progress {
            line.push(' ');
            line.push_str(progress);
        }
        Some(line)
    }
}

impl From<bollard::models::BuildInfo> for ProgressMessage {
    fn from(info: bollard::models::BuildInfo) -> Self {
        let error = info
            .error_detail
            .and_then(|detail| detail.message)
            .or(info.error);

        Self {
            id: info.id,
            stream: info.stream,
            status: info.status,
            progress: info.progress,
            error,
            image_id: info.aux.and_then(|aux| aux.id),
        }
    }
}

/// 進捗メッセージの表示先
pub trait ProgressSink {
    /// メッセージを表示する。エンジンがエラーを報告した場合は `BuildFailed` を返す
    fn display(&mut self, message: &ProgressMessage) -> BuildResult<()>;

    /// ストリーム終了時に呼ばれる
    fn finish(&mut self, success: bool);
}

/// 表示方式の判定
pub struct ProgressRenderer;

impl ProgressRenderer {
    /// stderr が端末かどうかで表示方式を選ぶ
    pub fn detect() -> Box<dyn ProgressSink> {
        let is_term = std::io::stderr().is_terminal();
        tracing::debug!(is_term, "Detected terminal capability for build output");
        if is_term {
            Box::new(TerminalProgress::new())
        } else {
            Box::new(PlainProgress::new(std::io::stderr()))
        }
    }
}

/// 行単位のプレーン出力
pub struct PlainProgress<W: Write> {
    writer: W,
}

impl<W: Write> PlainProgress<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write(&mut self, text: &str) -> BuildResult<()> {
        self.writer
            .write_all(text.as_bytes())
            .and_then(|_| self.writer.flush())
            .map_err(|e| BuildError::BuildFailed(format!("failed to write build output: {}", e)))
    }
}

impl<W: Write> ProgressSink for PlainProgress<W> {
    fn display(&mut self, message: &ProgressMessage) -> BuildResult<()> {
        if let Some(error) = &message.error {
            self.write(&format!("ERROR: {}\n", error))?;
            return message.check();
        }

        if let Some(stream) = &message.stream {
            self.write(stream)?;
        }

        if let Some(line) = message.status_line() {
            self.write(&format!("{}\n", line))?;
        }

        Ok(())
    }

    fn finish(&mut self, _success: bool) {
        let _ = self.writer.flush();
    }
}

/// スピナー付きの端末出力
pub struct TerminalProgress {
    progress_bar: ProgressBar,
}

impl TerminalProgress {
    pub fn new() -> Self {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.enable_steady_tick(Duration::from_millis(120));
        pb.set_message("Building image...");

        Self { progress_bar: pb }
    }

    fn print_stream(&self, stream: &str) {
        self.progress_bar.suspend(|| {
            for line in stream.lines() {
                let trimmed = line.trim_end();
                if trimmed.is_empty() {
                    continue;
                }
                if trimmed.starts_with("Step ") || trimmed.starts_with("#") {
                    eprintln!("{}", trimmed.bold());
                } else if trimmed.starts_with(" ---> ") {
                    eprintln!("{}", trimmed.dimmed());
                } else {
                    eprintln!("{}", trimmed);
                }
            }
        });
    }
}

impl Default for TerminalProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressSink for TerminalProgress {
    fn display(&mut self, message: &ProgressMessage) -> BuildResult<()> {
        if let Some(error) = &message.error {
            self.progress_bar
                .finish_with_message(format!("{} {}", "Build failed:".red().bold(), error));
            return message.check();
        }

        if let Some(stream) = &message.stream {
            self.print_stream(stream);
        }

        if let Some(line) = message.status_line() {
            self.progress_bar.set_message(line.cyan().to_string());
        }

        Ok(())
    }

    fn finish(&mut self, success: bool) {
        if self.progress_bar.is_finished() {
            return;
        }
        if success {
            self.progress_bar
                .finish_with_message("Build completed ✓".green().to_string());
        } else {
            self.progress_bar.abandon_with_message("Build failed".red().to_string());
        }
    }
}
