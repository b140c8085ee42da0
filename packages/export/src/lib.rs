//! # Pagewright Export
//!
//! Turns a document snapshot into a standalone, deployable project.
//!
//! ## Architecture
//!
//! ```text
//! build time                         request time
//! ──────────                         ────────────
//! Registry + components dir          PageSnapshot(s) + DesignSystem + CMS
//!          │                                   │
//!          ▼                                   ▼
//!   SourceIndexBuilder ──► SourceTable ──► ExportEngine ──► ExportManifest
//!                         (JSON on disk)                          │
//!                                                                 ▼
//!                                                            Deployer
//! ```
//!
//! The source table is produced once and loaded by every export, so export
//! never touches the component tree.

mod codegen;
mod context;
mod dependencies;
mod deploy;
mod engine;
mod error;
mod imports;
mod indexer;
mod manifest;
mod source_table;
mod tokens;

pub use codegen::{package_name, PageTarget};
pub use dependencies::{DependencySet, UNPINNED};
pub use deploy::{DeployConfig, Deployer, Deployment, DirectoryDeployer};
pub use engine::{CancellationToken, ExportEngine, ExportOptions};
pub use error::{DeployError, ExportError, ExportProblem, MissingSource, SourceIndexError};
pub use imports::{scan_specifiers, ModuleImports};
pub use indexer::{index_sources_async, SourceIndexBuilder, SourceIndexOptions};
pub use manifest::{ExportManifest, ManifestFile};
pub use source_table::{ComponentSource, MatchKind, SourceModule, SourceTable};
pub use tokens::{substitute_tokens, tokens_css};
