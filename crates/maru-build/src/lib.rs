//! maru Docker Image Build functionality
//!
//! This crate packages the project directory into a build context,
//! submits it to the Docker engine and relays build progress to the terminal.

pub mod builder;
pub mod context;
pub mod engine;
pub mod error;
pub mod options;
pub mod pipeline;
pub mod progress;

#[cfg(test)]
mod test_support;

pub use builder::{BuildSummary, ImageBuilder};
pub use context::{ContextArchive, ContextBuilder};
pub use engine::{BuildEngine, DockerEngine};
pub use error::{BuildError, BuildResult};
pub use options::{BuildOptions, DOCKERFILE_PATH, split_image_tag};
pub use pipeline::{BuildPipeline, BuildReport};
pub use progress::{PlainProgress, ProgressMessage, ProgressRenderer, ProgressSink, TerminalProgress};
