use clap::{CommandFactory, Parser};
use std::ffi::OsString;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "repo-scout")]
#[command(about = "Search repositories, clone them, and report files matching your patterns")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(after_help = "Patterns containing `*` are globs (`*.mdc`); anything else is a case-insensitive substring.")]
pub struct Cli {
    /// Search query sent to the repository search
    pub query: Option<String>,

    /// File name patterns to look for in each repository
    pub patterns: Vec<String>,

    /// Maximum number of repositories to analyze (missing or non-numeric values fall back to the default)
    #[arg(short, long, value_name = "N", num_args = 0..=1, allow_negative_numbers = true)]
    pub limit: Option<String>,

    /// Configuration file path (defaults to ~/.repo-scout.toml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Write a documented configuration file and exit
    #[arg(long)]
    pub init_config: bool,

    /// Remove the clone directory once the report has been written
    #[arg(long)]
    pub cleanup: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Parse the process arguments after [`normalize_args`].
    pub fn parse_normalized() -> Self {
        Self::parse_from(normalize_args(std::env::args_os()))
    }

    /// Requested limit, or `default` when absent, zero, or not a number.
    pub fn limit_or(&self, default: usize) -> usize {
        self.limit
            .as_deref()
            .and_then(|raw| raw.trim().parse::<usize>().ok())
            .filter(|n| *n > 0)
            .unwrap_or(default)
    }
}

struct KnownOption {
    short: Option<char>,
    long: Option<String>,
    takes_value: bool,
}

impl KnownOption {
    fn flag(&self) -> String {
        match (&self.long, self.short) {
            (Some(long), _) => format!("--{}", long),
            (None, Some(short)) => format!("-{}", short),
            (None, None) => String::new(),
        }
    }
}

fn known_options() -> Vec<KnownOption> {
    let mut cmd = Cli::command();
    cmd.build();
    cmd.get_arguments()
        .filter(|arg| !arg.is_positional())
        .map(|arg| KnownOption {
            short: arg.get_short(),
            long: arg.get_long().map(str::to_string),
            takes_value: arg.get_action().takes_values(),
        })
        .collect()
}

/// The option `arg` names, with any value attached to it (`--limit=3`, `-l3`).
/// Unknown dash tokens and short-flag clusters are not options.
fn classify<'a>(arg: &str, options: &'a [KnownOption]) -> Option<(&'a KnownOption, Option<String>)> {
    if let Some(long) = arg.strip_prefix("--") {
        let (name, inline) = match long.split_once('=') {
            Some((name, value)) => (name, Some(value.to_string())),
            None => (long, None),
        };
        return options
            .iter()
            .find(|o| o.long.as_deref() == Some(name))
            .map(|o| (o, inline));
    }

    let mut chars = arg.strip_prefix('-')?.chars();
    let first = chars.next()?;
    let option = options.iter().find(|o| o.short == Some(first))?;
    let rest: String = chars.collect();
    if rest.is_empty() {
        Some((option, None))
    } else if option.takes_value {
        Some((option, Some(rest)))
    } else {
        None
    }
}

/// Regroup raw arguments so that every token which is not one of our options
/// (or an option's value) is passed after `--`, in its original order.
///
/// This lets patterns such as `-rc` through as patterns while `--help`,
/// `--limit` and the other options keep working wherever they appear. The
/// token after `--limit`/`--config` is taken as its value unless it is itself
/// an option.
pub fn normalize_args<I, T>(args: I) -> Vec<String>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let options = known_options();
    let mut args = args
        .into_iter()
        .map(|arg| arg.into().to_string_lossy().into_owned())
        .peekable();

    let mut normalized: Vec<String> = args.next().into_iter().collect();
    let mut positionals = Vec::new();

    while let Some(arg) = args.next() {
        if arg == "--" {
            positionals.extend(args.by_ref());
            break;
        }
        let Some((option, inline)) = classify(&arg, &options) else {
            positionals.push(arg);
            continue;
        };
        if !option.takes_value {
            normalized.push(option.flag());
            continue;
        }
        let value = inline.or_else(|| {
            args.next_if(|next| next != "--" && classify(next, &options).is_none())
        });
        match value {
            Some(value) => normalized.push(format!("{}={}", option.flag(), value)),
            None => normalized.push(option.flag()),
        }
    }

    if !positionals.is_empty() {
        normalized.push("--".to_string());
        normalized.extend(positionals);
    }
    normalized
}
