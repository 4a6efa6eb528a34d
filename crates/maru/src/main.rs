mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use maru_build::BuildError;

#[derive(Parser)]
#[command(name = "maru")]
#[command(about = "Build a container image for the current project", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// デバッグログを出力
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a container for the current project
    #[command(
        long_about = "Runs a docker build for the current maru project. The current directory must \
                      contain a maru.yaml file describing the project. You can initialize a project \
                      using the init command."
    )]
    Build {
        /// Do not use the build cache
        #[arg(long)]
        no_cache: bool,
        /// Answer every prompt with this value instead of asking
        #[arg(long, value_enum, env = "MARU_ASSUME")]
        assume: Option<Assume>,
    },
    /// Create maru.yaml if needed and generate the Dockerfile
    Init {
        /// Overwrite an existing maru.yaml
        #[arg(short, long)]
        force: bool,
    },
    /// Show version information
    Version,
}

/// プロンプトへの自動回答
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Assume {
    Yes,
    No,
}

impl Assume {
    fn answer(self) -> bool {
        matches!(self, Assume::Yes)
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("{} {}", "✗".red().bold(), describe_error(&e));
        std::process::exit(1);
    }
}

/// ログはstderrに出力（既定は warn 以上）
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        tracing_subscriber::EnvFilter::from_default_env().add_directive(tracing::Level::DEBUG.into())
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Version => {
            println!("maru {}", env!("CARGO_PKG_VERSION"));
        }
        Commands::Init { force } => {
            let project_root = commands::init::resolve_root()?;
            commands::init::handle(&project_root, force)?;
        }
        Commands::Build { no_cache, assume } => {
            let project_root = maru_core::find_project_root()?;
            commands::build::handle(&project_root, no_cache, assume.map(Assume::answer)).await?;
        }
    }

    Ok(())
}

/// エラーをユーザー向けの1行（+ヒント）に整形
fn describe_error(error: &anyhow::Error) -> String {
    match error.downcast_ref::<BuildError>() {
        Some(build_error) => build_error.user_message(),
        None => format!("{:#}", error),
    }
}
