use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::process::Command;
use tracing::debug;

use crate::config::SearchConfig;

/// Fields requested from `gh search repos --json`.
const SEARCH_FIELDS: &str = "name,owner,url,description,stargazersCount,language";

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("`{command}` exited with {status}: {stderr}")]
    Failed {
        command: String,
        status: std::process::ExitStatus,
        stderr: String,
    },
    #[error("could not parse search results: {0}")]
    Malformed(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryDescriptor {
    pub owner: String,
    pub name: String,
    pub url: String,
    pub description: Option<String>,
    pub stars: u64,
    pub language: Option<String>,
}

impl RepositoryDescriptor {
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

/// Source of repositories for one run.
#[async_trait]
pub trait RepositorySearch {
    async fn search(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<RepositoryDescriptor>, SearchError>;
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OwnerField {
    Login(String),
    Account { login: String },
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LanguageField {
    Name(String),
    Named { name: String },
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchRecord {
    name: String,
    owner: OwnerField,
    url: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default, alias = "stargazerCount")]
    stargazers_count: u64,
    #[serde(default, alias = "primaryLanguage")]
    language: Option<LanguageField>,
}

impl From<SearchRecord> for RepositoryDescriptor {
    fn from(record: SearchRecord) -> Self {
        let owner = match record.owner {
            OwnerField::Login(login) | OwnerField::Account { login } => login,
        };
        let language = record
            .language
            .map(|lang| match lang {
                LanguageField::Name(name) | LanguageField::Named { name } => name,
            })
            .filter(|name| !name.is_empty());
        let description = record.description.filter(|d| !d.trim().is_empty());

        RepositoryDescriptor {
            owner,
            name: record.name,
            url: record.url,
            description,
            stars: record.stargazers_count,
            language,
        }
    }
}

/// Parse the JSON array printed by the search CLI.
pub fn parse_search_output(output: &str) -> Result<Vec<RepositoryDescriptor>, SearchError> {
    let records: Vec<SearchRecord> = serde_json::from_str(output)?;
    Ok(records.into_iter().map(RepositoryDescriptor::from).collect())
}

/// Repository search backed by the GitHub CLI.
#[derive(Debug, Clone)]
pub struct GhSearch {
    command: String,
}

impl GhSearch {
    pub fn new(config: &SearchConfig) -> Self {
        Self {
            command: config.command.clone(),
        }
    }
}

#[async_trait]
impl RepositorySearch for GhSearch {
    async fn search(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<RepositoryDescriptor>, SearchError> {
        let limit = limit.to_string();
        let args = [
            "search",
            "repos",
            query,
            "--limit",
            limit.as_str(),
            "--json",
            SEARCH_FIELDS,
        ];
        debug!("Executing search: {} {}", self.command, args.join(" "));

        let output = Command::new(&self.command)
            .args(args)
            .output()
            .await
            .map_err(|source| SearchError::Spawn {
                command: self.command.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(SearchError::Failed {
                command: self.command.clone(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        parse_search_output(&String::from_utf8_lossy(&output.stdout))
    }
}
