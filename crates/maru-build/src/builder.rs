use crate::context::ContextArchive;
use crate::engine::BuildEngine;
use crate::error::BuildResult;
use crate::options::BuildOptions;
use crate::progress::ProgressSink;
use futures_util::stream::StreamExt;

/// ビルド結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSummary {
    /// エンジンが報告したイメージID（報告がなければ `None`）
    pub image_id: Option<String>,
    pub tags: Vec<String>,
}

pub struct ImageBuilder<'e, E: BuildEngine + ?Sized> {
    engine: &'e E,
}

impl<'e, E: BuildEngine + ?Sized> ImageBuilder<'e, E> {
    pub fn new(engine: &'e E) -> Self {
        Self { engine }
    }

    /// イメージをビルドして全タグを付与
    ///
    /// 進捗は `sink` に中継する。ストリーム途中でエラーが返れば即座に失敗とする。
    pub async fn build(
        &self,
        context: ContextArchive,
        options: &BuildOptions,
        sink: &mut dyn ProgressSink,
    ) -> BuildResult<BuildSummary> {
        tracing::info!("Building image: {}", options.primary_tag());
        if !options.build_args().is_empty() {
            tracing::debug!("Build args: {:?}", options.build_args());
        }

        let result = self.relay(context, options, sink).await;
        sink.finish(result.is_ok());
        let image_id = result?;

        // 残りのタグを付与
        let primary = options.primary_tag();
        for tag in options.additional_tags() {
            self.engine.tag_image(primary, tag).await?;
        }

        tracing::info!("Successfully built: {}", options.tags().join(", "));
        Ok(BuildSummary {
            image_id,
            tags: options.tags().to_vec(),
        })
    }

    /// ビルドストリームを最後まで読み、表示先に中継する
    async fn relay(
        &self,
        context: ContextArchive,
        options: &BuildOptions,
        sink: &mut dyn ProgressSink,
    ) -> BuildResult<Option<String>> {
        let mut stream = self.engine.build_image(context, options);
        let mut image_id = None;

        while let Some(message) = stream.next().await {
            let message = message?;
            sink.display(&message)?;
            if message.image_id.is_some() {
                image_id = message.image_id;
            }
        }

        Ok(image_id)
    }
}
