pub mod analyzer;
pub mod cli;
pub mod clone;
pub mod config;
pub mod pattern;
pub mod probe;
pub mod reporter;
pub mod search;
pub mod walker;
pub mod workspace;

pub use analyzer::{AnalysisResult, Analyzer, RunReport};
pub use cli::Cli;
pub use clone::{GitCloner, RepositoryCloner};
pub use config::Config;
pub use pattern::{FilePattern, PatternSet};
pub use probe::{AnalysisRecord, RepositoryProber};
pub use reporter::{ReportContext, Reporter};
pub use search::{GhSearch, RepositoryDescriptor, RepositorySearch};
pub use walker::TreeWalker;
pub use workspace::Workspace;

pub type Result<T> = anyhow::Result<T>;
