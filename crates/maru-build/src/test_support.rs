//! テスト用のモック実装

use crate::context::ContextArchive;
use crate::engine::BuildEngine;
use crate::error::{BuildError, BuildResult};
use crate::options::BuildOptions;
use crate::progress::{ProgressMessage, ProgressSink};
use async_trait::async_trait;
use futures_util::StreamExt;
use futures_util::stream::BoxStream;
use maru_core::{Confirmer, ProjectConfig, Regenerator, Reporter};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// 呼び出し順を記録する共有ログ
pub type EventLog = Arc<Mutex<Vec<String>>>;

/// エンジンに届いたビルド要求
#[derive(Debug, Clone)]
pub struct BuildRequest {
    pub options: BuildOptions,
    /// コンテキストに含まれていたエントリ（先頭の "./" は除去）
    pub entries: Vec<String>,
}

pub struct MockEngine {
    messages: Vec<ProgressMessage>,
    unreachable: bool,
    events: EventLog,
    pub builds: Mutex<Vec<BuildRequest>>,
    pub tags: Mutex<Vec<(String, String)>>,
}

impl MockEngine {
    pub fn new(events: EventLog) -> Self {
        Self {
            messages: vec![
                ProgressMessage::stream("Step 1/2 : FROM alpine:latest\n"),
                ProgressMessage::stream("Step 2/2 : COPY . /app\n"),
                ProgressMessage {
                    image_id: Some("sha256:0123abcd".to_string()),
                    ..Default::default()
                },
            ],
            unreachable: false,
            events,
            builds: Mutex::new(Vec::new()),
            tags: Mutex::new(Vec::new()),
        }
    }

    pub fn with_messages(mut self, messages: Vec<ProgressMessage>) -> Self {
        self.messages = messages;
        self
    }

    pub fn unreachable(mut self) -> Self {
        self.unreachable = true;
        self
    }

    pub fn build_count(&self) -> usize {
        self.builds.lock().unwrap().len()
    }
}

#[async_trait]
impl BuildEngine for MockEngine {
    async fn ping(&self) -> BuildResult<()> {
        self.events.lock().unwrap().push("ping".to_string());
        if self.unreachable {
            return Err(BuildError::EngineConnection(
                bollard::errors::Error::DockerResponseServerError {
                    status_code: 500,
                    message: "engine unavailable".to_string(),
                },
            ));
        }
        Ok(())
    }

    fn build_image(
        &self,
        context: ContextArchive,
        options: &BuildOptions,
    ) -> BoxStream<'_, BuildResult<ProgressMessage>> {
        self.events.lock().unwrap().push("build".to_string());

        let mut archive = tar::Archive::new(context);
        let entries = archive
            .entries()
            .unwrap()
            .map(|entry| {
                let path = entry.unwrap().path().unwrap().to_string_lossy().into_owned();
                path.trim_start_matches("./").to_string()
            })
            .filter(|path| !path.is_empty() && path != ".")
            .collect();

        self.builds.lock().unwrap().push(BuildRequest {
            options: options.clone(),
            entries,
        });

        futures_util::stream::iter(self.messages.clone().into_iter().map(Ok)).boxed()
    }

    async fn tag_image(&self, source: &str, target: &str) -> BuildResult<()> {
        self.events.lock().unwrap().push(format!("tag {}", target));
        self.tags
            .lock()
            .unwrap()
            .push((source.to_string(), target.to_string()));
        Ok(())
    }
}

/// 再生成の呼び出しを記録する
pub struct RecordingRegenerator {
    events: EventLog,
}

impl RecordingRegenerator {
    pub fn new(events: EventLog) -> Self {
        Self { events }
    }
}

impl Regenerator for RecordingRegenerator {
    fn regenerate(&self, _config: &ProjectConfig) -> maru_core::Result<()> {
        self.events.lock().unwrap().push("regenerate".to_string());
        Ok(())
    }
}

/// 用意した回答を順に返し、質問を記録する
pub struct ScriptedConfirmer {
    answers: RefCell<VecDeque<bool>>,
    pub asked: RefCell<Vec<String>>,
}

impl ScriptedConfirmer {
    pub fn new(answers: &[bool]) -> Self {
        Self {
            answers: RefCell::new(answers.iter().copied().collect()),
            asked: RefCell::new(Vec::new()),
        }
    }
}

impl Confirmer for ScriptedConfirmer {
    fn ask(&self, question: &str, _default: bool) -> maru_core::Result<bool> {
        self.asked.borrow_mut().push(question.to_string());
        Ok(self
            .answers
            .borrow_mut()
            .pop_front()
            .expect("unexpected prompt"))
    }
}

#[derive(Default)]
pub struct RecordingReporter {
    pub lines: RefCell<Vec<String>>,
}

impl Reporter for RecordingReporter {
    fn info(&self, message: &str) {
        self.lines.borrow_mut().push(format!("info: {}", message));
    }

    fn step(&self, message: &str) {
        self.lines.borrow_mut().push(format!("step: {}", message));
    }

    fn success(&self, message: &str) {
        self.lines.borrow_mut().push(format!("success: {}", message));
    }

    fn warn(&self, message: &str) {
        self.lines.borrow_mut().push(format!("warn: {}", message));
    }
}

/// 表示されたメッセージを保持する
#[derive(Default)]
pub struct CollectingSink {
    pub messages: Vec<ProgressMessage>,
    pub finished: Option<bool>,
}

impl ProgressSink for CollectingSink {
    fn display(&mut self, message: &ProgressMessage) -> BuildResult<()> {
        self.messages.push(message.clone());
        message.check()
    }

    fn finish(&mut self, success: bool) {
        self.finished = Some(success);
    }
}
