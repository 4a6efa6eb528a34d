//! maru core
//!
//! maru.yaml の読み込み、設定チェックサムによるドリフト検出、
//! Dockerfile生成、対話プロンプトを提供します。

pub mod checksum;
pub mod discovery;
pub mod drift;
pub mod error;
pub mod loader;
pub mod model;
pub mod prompt;
pub mod session;
pub mod template;

pub use checksum::{CHECKSUM_FILE, Checksum, ChecksumStore};
pub use discovery::{PROJECT_FILE, find_project_root, find_project_root_from};
pub use drift::{DriftOutcome, Reconciled, Regenerator, check_drift};
pub use error::{ConfigError, Result};
pub use loader::{load, save};
pub use model::{BuildSection, ProjectConfig};
pub use prompt::{Confirmer, FixedConfirmer, TerminalConfirmer};
pub use session::{ConsoleReporter, Reporter, Session};
pub use template::{DOCKERFILE, DockerfileGenerator};
