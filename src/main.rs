use anyhow::Context;
use clap::CommandFactory;
use repo_scout::{
    Analyzer, Cli, Config, GhSearch, GitCloner, PatternSet, ReportContext, Reporter, TreeWalker,
    Workspace,
};
use std::path::PathBuf;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse_normalized();
    init_tracing(cli.verbose);

    if cli.init_config {
        return generate_config(cli.config.clone());
    }

    let Some(query) = cli.query.clone() else {
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    scout(&cli, &query).await
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn scout(cli: &Cli, query: &str) -> anyhow::Result<()> {
    let start_time = Instant::now();

    let config = match &cli.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => Config::load()?,
    };
    let limit = cli.limit_or(config.search.default_limit);
    let patterns = PatternSet::new(cli.patterns.as_slice())?;

    eprintln!("🚀 Scouting repositories for \"{}\"", query);
    if patterns.is_empty() {
        eprintln!("ℹ️  No file patterns given, only repository statistics will be reported");
    } else {
        eprintln!("🔍 Patterns: {}", patterns.sources().join(", "));
    }

    let workspace = Workspace::create(&config.clone.workspace_prefix)?;
    eprintln!("📂 Cloning into {}", workspace.root().display());

    let analyzer = Analyzer::new(
        GhSearch::new(&config.search),
        GitCloner::new(&config.clone),
        TreeWalker::new(&config.scan),
        patterns,
    );
    let report = analyzer
        .run(query, limit, &workspace)
        .await
        .context("repository search failed")?;

    let context = ReportContext {
        query: query.to_string(),
        patterns: cli.patterns.clone(),
        generated_at: chrono::Local::now(),
    };
    let reporter = Reporter::new(&config.scan);
    let markdown = reporter.render(&context, &report);
    println!("{}", markdown);

    let exported_files = reporter.export_report(
        &markdown,
        &report,
        &context,
        &config.output.directory,
        config.output.write_json,
    )?;

    eprintln!(
        "\n✅ Analyzed {} repositories ({} skipped) in {:.2}s",
        report.results.len(),
        report.skipped.len(),
        start_time.elapsed().as_secs_f64()
    );
    eprintln!("📁 Report written to:");
    for file in exported_files {
        eprintln!("   - {}", file.display());
    }

    if cli.cleanup {
        let root = workspace.root().display().to_string();
        workspace.cleanup()?;
        println!("🧹 Removed clone directory {}", root);
    } else {
        println!("📦 Clones kept in {}", workspace.root().display());
    }

    Ok(())
}

fn generate_config(output_path: Option<PathBuf>) -> anyhow::Result<()> {
    let config_path = match output_path {
        Some(path) => path,
        None => Config::default_config_path()?,
    };

    eprintln!("📝 Generating configuration file: {}", config_path.display());
    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&config_path, Config::create_documented_config())?;
    eprintln!("✅ Configuration file created successfully!");

    Ok(())
}
