// End-to-end runs through the public API with local fixtures standing in for
// the search and clone commands.
use async_trait::async_trait;
use repo_scout::{
    clone::CloneError,
    search::SearchError,
    Analyzer, PatternSet, ReportContext, Reporter, RepositoryCloner, RepositoryDescriptor,
    RepositorySearch, TreeWalker, Workspace,
};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

struct StaticSearch(Vec<RepositoryDescriptor>);

#[async_trait]
impl RepositorySearch for StaticSearch {
    async fn search(
        &self,
        _query: &str,
        limit: usize,
    ) -> Result<Vec<RepositoryDescriptor>, SearchError> {
        Ok(self.0.iter().take(limit).cloned().collect())
    }
}

/// Copies a fixture tree per repository. `private` repositories fail to clone
/// and `unreadable` ones clone to a path that does not exist.
struct FixtureCloner;

#[async_trait]
impl RepositoryCloner for FixtureCloner {
    async fn clone_repository(
        &self,
        repo: &RepositoryDescriptor,
        destination: &Path,
    ) -> Result<PathBuf, CloneError> {
        match repo.name.as_str() {
            "private" => Err(CloneError::Timeout {
                url: repo.url.clone(),
                seconds: 60,
            }),
            "unreadable" => Ok(destination.join("vanished")),
            _ => {
                write_dotfiles(destination);
                Ok(destination.to_path_buf())
            }
        }
    }
}

fn write_dotfiles(root: &Path) {
    let files = [
        "README.md",
        "zsh/aliases.zsh",
        "zsh/prompt.zsh",
        "bash/profile.bash",
        "bash/notes.txt",
        "vim/vimrc",
        "package.json",
        "node_modules/left-pad/helper.zsh",
        ".git/hooks/pre-commit.bash",
        ".github/setup.bash",
    ];
    for file in files {
        let path = root.join(file);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }
    fs::write(root.join("package.json"), r#"{"name":"dots","version":"1.0.0"}"#).unwrap();
}

fn repo(owner: &str, name: &str) -> RepositoryDescriptor {
    RepositoryDescriptor {
        owner: owner.to_string(),
        name: name.to_string(),
        url: format!("https://github.com/{}/{}", owner, name),
        description: Some("My dotfiles".to_string()),
        stars: 100,
        language: Some("Shell".to_string()),
    }
}

fn analyzer(repos: Vec<RepositoryDescriptor>, patterns: &[&str]) -> Analyzer<StaticSearch, FixtureCloner> {
    Analyzer::new(
        StaticSearch(repos),
        FixtureCloner,
        TreeWalker::default(),
        PatternSet::new(patterns).unwrap(),
    )
}

fn context(patterns: &[&str]) -> ReportContext {
    ReportContext {
        query: "dotfiles".to_string(),
        patterns: patterns.iter().map(|p| p.to_string()).collect(),
        generated_at: chrono::Local::now(),
    }
}

#[tokio::test]
async fn test_dotfiles_scenario() {
    let dir = TempDir::new().unwrap();
    let workspace = Workspace::at(dir.path().join("run")).unwrap();
    let patterns = ["*.zsh", "*.bash"];
    let repos = vec![repo("alice", "dotfiles"), repo("bob", "dotfiles"), repo("carol", "dotfiles")];

    let report = analyzer(repos, &patterns)
        .run("dotfiles", 2, &workspace)
        .await
        .unwrap();

    assert_eq!(report.results.len(), 2);
    for result in &report.results {
        assert!(result.local_path.starts_with(workspace.root()));
        assert_eq!(result.files.len(), 7);
        assert_eq!(result.matching_files.len(), 3);

        for file in &result.matching_files {
            assert!(result.files.contains(file));
            assert!(!file.starts_with(workspace.root()));
            let name = file.file_name().unwrap().to_string_lossy().into_owned();
            assert!(name.ends_with(".zsh") || name.ends_with(".bash"), "{}", name);
        }
        assert!(result
            .files
            .iter()
            .all(|f| !f.starts_with("node_modules") && !f.starts_with(".git")));
    }

    let markdown = Reporter::default().render(&context(&patterns), &report);
    assert!(markdown.contains("**Total Repositories:** 2"));
    assert!(markdown.contains("## 1. alice/dotfiles"));
    assert!(markdown.contains("## 2. bob/dotfiles"));
    assert!(markdown.contains("- **Manifest:** `package.json` (dots@1.0.0)"));
}

#[tokio::test]
async fn test_failures_do_not_abort_the_run() {
    let dir = TempDir::new().unwrap();
    let workspace = Workspace::at(dir.path().join("run")).unwrap();
    let repos = vec![
        repo("alice", "private"),
        repo("bob", "unreadable"),
        repo("carol", "dotfiles"),
    ];

    let report = analyzer(repos, &["README"])
        .run("dotfiles", 10, &workspace)
        .await
        .unwrap();

    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].repository.name, "private");

    assert_eq!(report.results.len(), 2);
    let unreadable = &report.results[0];
    assert!(unreadable.analysis.is_err());
    assert!(unreadable.files.is_empty());
    assert_eq!(report.results[1].matching_files, vec![PathBuf::from("README.md")]);

    let markdown = Reporter::default().render(&context(&["README"]), &report);
    let bob_section = markdown
        .split("## 1. bob/unreadable")
        .nth(1)
        .and_then(|rest| rest.split("## 2.").next())
        .unwrap();
    assert!(bob_section.contains("- **Error:**"));
    assert!(!bob_section.contains("Total Files"));
    assert!(markdown.contains("## Skipped Repositories"));
}
