use colored::Colorize;
use maru_build::{BuildPipeline, BuildReport, DockerEngine, ProgressRenderer};
use maru_core::{
    Confirmer, ConsoleReporter, DockerfileGenerator, FixedConfirmer, Reporter, Session,
    TerminalConfirmer,
};
use std::path::Path;

/// ビルドコマンドを処理
///
/// `assume` が指定されていれば全ての確認にその値で答える。
pub async fn handle(project_root: &Path, no_cache: bool, assume: Option<bool>) -> anyhow::Result<()> {
    let config = maru_core::load(project_root)?;

    let confirmer: Box<dyn Confirmer> = match assume {
        Some(answer) => Box::new(FixedConfirmer::new(answer)),
        None => Box::new(TerminalConfirmer::new()),
    };
    let reporter = ConsoleReporter;
    let session = Session::new(confirmer.as_ref(), &reporter);
    let regenerator = DockerfileGenerator::new(project_root);

    // 接続はドリフト確認の後、パイプライン内の ping で行う
    let engine = DockerEngine::local();
    let mut sink = ProgressRenderer::detect();

    let report = BuildPipeline::new(&engine, &session, &regenerator, project_root)
        .no_cache(no_cache)
        .run(&config, sink.as_mut())
        .await?;

    match report {
        BuildReport::Aborted => {
            println!("{}", "Build cancelled.".yellow());
        }
        BuildReport::Built(summary) => {
            reporter.success(&format!("Successfully built {}", config.name_version()));
            if let Some(image_id) = &summary.image_id {
                tracing::debug!(image_id = %image_id, tags = ?summary.tags, "Image built");
            }
            reporter.info("Next use `maru run` to run the container");
        }
    }

    Ok(())
}
