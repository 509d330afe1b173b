use repo_scout::{Config, PatternSet};
use std::path::Path;

fn main() -> anyhow::Result<()> {
    println!("repo-scout Configuration Example");
    println!("================================");

    match Config::default_config_path() {
        Ok(path) => println!("📍 Default config location: {}", path.display()),
        Err(e) => println!("❌ Error getting config path: {}", e),
    }

    println!("\n🔧 Loading configuration...");
    let config = Config::load()?;

    println!("✅ Configuration loaded successfully!");
    println!("🔍 Search command: {} (default limit {})", config.search.command, config.search.default_limit);
    println!("📥 Clone: {} --depth {} ({}s timeout)", config.clone.command, config.clone.depth, config.clone.timeout_seconds);
    println!("🚫 Skipped directories: {:?} prefixes, {:?} names", config.scan.excluded_dir_prefixes, config.scan.excluded_dir_names);

    let patterns = PatternSet::new(&["*.mdc", ".cursorrules"])?;
    for candidate in [".cursor/rules/style.mdc", "docs/style.md", "project/.cursorrules"] {
        let hit = patterns.matches(&Path::new("/tmp/clone").join(candidate));
        println!("{} {}", if hit { "✓" } else { "✗" }, candidate);
    }

    Ok(())
}
