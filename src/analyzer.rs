use crate::{
    clone::{CloneError, RepositoryCloner},
    pattern::PatternSet,
    probe::{Analysis, RepositoryProber},
    search::{RepositoryDescriptor, RepositorySearch, SearchError},
    walker::{relativize, TreeWalker},
    workspace::Workspace,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Where a repository got to in its pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Pending,
    Cloned,
    Walked,
    Analyzed,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub repository: RepositoryDescriptor,
    pub local_path: PathBuf,
    /// Relative to `local_path`
    pub files: Vec<PathBuf>,
    /// Subset of `files`
    pub matching_files: Vec<PathBuf>,
    pub analysis: Analysis,
}

/// A repository that produced no result because it could not be cloned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkippedRepository {
    pub repository: RepositoryDescriptor,
    pub reason: String,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub results: Vec<AnalysisResult>,
    pub skipped: Vec<SkippedRepository>,
}

/// Drives search, clone, walk, match and probe for one run.
pub struct Analyzer<S, C> {
    search: S,
    cloner: C,
    walker: TreeWalker,
    prober: RepositoryProber,
    patterns: PatternSet,
}

impl<S: RepositorySearch, C: RepositoryCloner> Analyzer<S, C> {
    pub fn new(search: S, cloner: C, walker: TreeWalker, patterns: PatternSet) -> Self {
        Self {
            search,
            cloner,
            walker,
            prober: RepositoryProber::new(),
            patterns,
        }
    }

    /// Only a failed search aborts the run; every repository failure is
    /// recorded and the next repository is processed.
    pub async fn run(
        &self,
        query: &str,
        limit: usize,
        workspace: &Workspace,
    ) -> Result<RunReport, SearchError> {
        info!("Searching for repositories matching \"{}\" (limit {})", query, limit);
        let repositories = self.search.search(query, limit).await?;
        info!("Found {} repositories", repositories.len());

        let mut report = RunReport::default();
        let total = repositories.len();

        for (i, repo) in repositories.into_iter().enumerate() {
            info!("[{}/{}] {}", i + 1, total, repo.full_name());
            let destination = workspace.clone_path(&repo);

            match self.process(repo, &destination).await {
                Ok(result) => report.results.push(result),
                Err((repo, err)) => {
                    warn!("Skipping {}: {}", repo.full_name(), err);
                    report.skipped.push(SkippedRepository {
                        repository: repo,
                        reason: err.to_string(),
                    });
                }
            }
        }

        Ok(report)
    }

    async fn process(
        &self,
        repo: RepositoryDescriptor,
        destination: &Path,
    ) -> Result<AnalysisResult, (RepositoryDescriptor, CloneError)> {
        let name = repo.full_name();
        debug!("{}: {:?}", name, Stage::Pending);

        let local_path = match self.cloner.clone_repository(&repo, destination).await {
            Ok(path) => path,
            Err(err) => {
                debug!("{}: {:?}", name, Stage::Failed);
                return Err((repo, err));
            }
        };
        debug!("{}: {:?}", name, Stage::Cloned);

        Ok(self.analyze_clone(repo, local_path))
    }

    /// Walk, match and probe an existing clone.
    pub fn analyze_clone(&self, repo: RepositoryDescriptor, local_path: PathBuf) -> AnalysisResult {
        let name = repo.full_name();

        let walked = local_path.canonicalize().map_err(anyhow::Error::from).and_then(|root| {
            let absolute = self.walker.list_files(&root)?;
            Ok((root, absolute))
        });

        let (root, absolute) = match walked {
            Ok(walked) => walked,
            Err(err) => {
                let message = format!("failed to list files: {:#}", err);
                warn!("{}: {}", name, message);
                debug!("{}: {:?}", name, Stage::Failed);
                return AnalysisResult {
                    repository: repo,
                    local_path,
                    files: Vec::new(),
                    matching_files: Vec::new(),
                    analysis: Err(message),
                };
            }
        };
        debug!("{}: {:?} ({} files)", name, Stage::Walked, absolute.len());

        let matching_absolute: Vec<PathBuf> = absolute
            .iter()
            .filter(|f| self.patterns.matches(f))
            .cloned()
            .collect();
        let files = relativize(&root, &absolute);
        let matching_files = relativize(&root, &matching_absolute);

        let analysis = self.prober.probe(&root, &files);
        match &analysis {
            Ok(_) => debug!("{}: {:?}", name, Stage::Analyzed),
            Err(err) => warn!("{}: probe failed: {}", name, err),
        }

        info!(
            "{}: {} files, {} matching",
            name,
            files.len(),
            matching_files.len()
        );

        AnalysisResult {
            repository: repo,
            local_path,
            files,
            matching_files,
            analysis,
        }
    }
}
