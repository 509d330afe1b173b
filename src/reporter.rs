use crate::{
    analyzer::{AnalysisResult, RunReport, SkippedRepository},
    config::ScanConfig,
    probe::AnalysisRecord,
};
use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Run-level details shown in the report header.
#[derive(Debug, Clone)]
pub struct ReportContext {
    pub query: String,
    pub patterns: Vec<String>,
    pub generated_at: DateTime<Local>,
}

pub struct Reporter {
    max_listed_matches: usize,
    top_extensions: usize,
}

impl Default for Reporter {
    fn default() -> Self {
        Self::new(&ScanConfig::default())
    }
}

impl Reporter {
    pub fn new(config: &ScanConfig) -> Self {
        Self {
            max_listed_matches: config.max_listed_matches,
            top_extensions: config.top_extensions,
        }
    }

    /// Render the Markdown document. The output depends only on the inputs.
    pub fn render(&self, context: &ReportContext, report: &RunReport) -> String {
        let mut md = String::new();

        md.push_str("# Repository Analysis Report\n\n");
        md.push_str(&format!("**Generated:** {}\n", context.generated_at.to_rfc3339()));
        md.push_str(&format!("**Query:** {}\n", context.query));
        if context.patterns.is_empty() {
            md.push_str("**Patterns:** (none)\n");
        } else {
            let patterns: Vec<String> = context.patterns.iter().map(|p| format!("`{}`", p)).collect();
            md.push_str(&format!("**Patterns:** {}\n", patterns.join(", ")));
        }
        md.push_str(&format!("**Total Repositories:** {}\n\n", report.results.len()));

        for (i, result) in report.results.iter().enumerate() {
            self.render_result(&mut md, i + 1, result);
        }

        if !report.skipped.is_empty() {
            self.render_skipped(&mut md, &report.skipped);
        }

        md
    }

    fn render_result(&self, md: &mut String, index: usize, result: &AnalysisResult) {
        let repo = &result.repository;
        md.push_str(&format!("## {}. {}\n\n", index, repo.full_name()));
        md.push_str(&format!(
            "- **Description:** {}\n",
            repo.description.as_deref().unwrap_or("No description")
        ));
        md.push_str(&format!("- **Stars:** {}\n", repo.stars));
        md.push_str(&format!(
            "- **Language:** {}\n",
            repo.language.as_deref().unwrap_or("Unknown")
        ));
        md.push_str(&format!("- **URL:** {}\n", repo.url));

        match &result.analysis {
            Err(message) => {
                md.push_str(&format!("- **Error:** {}\n\n", message));
            }
            Ok(record) => self.render_record(md, result, record),
        }
    }

    fn render_record(&self, md: &mut String, result: &AnalysisResult, record: &AnalysisRecord) {
        md.push_str(&format!("- **Total Files:** {}\n", result.files.len()));
        md.push_str(&format!("- **Matching Files:** {}\n", result.matching_files.len()));
        if let Some(readme) = &record.readme {
            md.push_str(&format!("- **README:** `{}`\n", display_path(readme)));
        }
        if let Some(manifest) = &record.manifest {
            let label = match manifest.name_and_version() {
                (Some(name), Some(version)) => format!(" ({}@{})", name, version),
                (Some(name), None) => format!(" ({})", name),
                _ => String::new(),
            };
            md.push_str(&format!("- **Manifest:** `{}`{}\n", display_path(&manifest.path), label));
        }
        md.push('\n');

        if !result.matching_files.is_empty() {
            md.push_str("### Matching Files\n\n");
            for file in result.matching_files.iter().take(self.max_listed_matches) {
                md.push_str(&format!("- `{}`\n", display_path(file)));
            }
            if result.matching_files.len() > self.max_listed_matches {
                md.push_str(&format!(
                    "- ...and {} more\n",
                    result.matching_files.len() - self.max_listed_matches
                ));
            }
            md.push('\n');
        }

        let top = record.top_file_types(self.top_extensions);
        if !top.is_empty() {
            md.push_str("### File Types\n\n");
            for (ext, count) in top {
                md.push_str(&format!("- {}: {}\n", ext, count));
            }
            md.push('\n');
        }
    }

    fn render_skipped(&self, md: &mut String, skipped: &[SkippedRepository]) {
        md.push_str("## Skipped Repositories\n\n");
        for entry in skipped {
            md.push_str(&format!("- **{}**: {}\n", entry.repository.full_name(), entry.reason));
        }
        md.push('\n');
    }

    /// Write `repo-analysis-<timestamp>.md` (and the JSON twin when asked) into `output_dir`.
    pub fn export_report(
        &self,
        markdown: &str,
        report: &RunReport,
        context: &ReportContext,
        output_dir: &Path,
        write_json: bool,
    ) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(output_dir)
            .with_context(|| format!("creating {}", output_dir.display()))?;
        let stamp = context.generated_at.format("%Y%m%d-%H%M%S");
        let mut exported_files = Vec::new();

        let md_path = output_dir.join(format!("repo-analysis-{}.md", stamp));
        fs::write(&md_path, markdown).with_context(|| format!("writing {}", md_path.display()))?;
        exported_files.push(md_path);

        if write_json {
            let json_path = output_dir.join(format!("repo-analysis-{}.json", stamp));
            let json_content = serde_json::to_string_pretty(report)?;
            fs::write(&json_path, json_content)
                .with_context(|| format!("writing {}", json_path.display()))?;
            exported_files.push(json_path);
        }

        Ok(exported_files)
    }
}

fn display_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
