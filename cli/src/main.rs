//! webtext CLI - scraped article cleanup tool
//!
//! A command-line tool for turning scraped article markdown into plain text.

use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashSet;
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use webtext::{Cleaner, CleanupOptions, HtmlPolicy, Preamble, Rule};

/// Scraped article markdown to clean plain text
#[derive(Parser)]
#[command(
    name = "webtext",
    version,
    about = "Clean scraped article markdown into plain text",
    long_about = "webtext - Fast cleanup of scraped article markdown.\n\n\
                  Strips markup, preamble headers, bylines and boilerplate,\n\
                  leaving readable prose with bulleted lists.\n\n\
                  Usage:\n  \
                  webtext <file>              Clean a file to stdout\n  \
                  webtext clean - -o out.txt  Clean stdin into a file\n  \
                  webtext batch *.md -o out   Clean many files in parallel"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Input file path (for default cleaning, `-` for stdin)
    #[arg(global = false)]
    input: Option<PathBuf>,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Clean a single document
    Clean {
        /// Input file path (default: stdin)
        #[arg(default_value = "-")]
        input: PathBuf,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output title, preamble and text as JSON
        #[arg(long)]
        json: bool,

        /// Output compact JSON (no indentation)
        #[arg(long, requires = "json")]
        compact: bool,

        #[command(flatten)]
        options: CleanArgs,
    },

    /// Clean many documents in parallel
    Batch {
        /// Input file paths
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Output directory (one .txt file per input)
        #[arg(short, long)]
        output: PathBuf,

        #[command(flatten)]
        options: CleanArgs,
    },

    /// Show preamble metadata and cleanup statistics
    Info {
        /// Input file path (`-` for stdin)
        input: PathBuf,

        #[command(flatten)]
        options: CleanArgs,
    },

    /// List cleanup rules in execution order
    Rules {
        #[command(flatten)]
        options: CleanArgs,
    },

    /// Show version information
    Version,
}

/// Options shared by every cleaning command
#[derive(Args, Clone)]
struct CleanArgs {
    /// Cleanup preset
    #[arg(long, default_value = "standard")]
    preset: Preset,

    /// Inline HTML handling (default: the preset's)
    #[arg(long)]
    html: Option<HtmlMode>,

    /// Keep boilerplate words
    #[arg(long)]
    keep_boilerplate: bool,

    /// Keep the Title/URL Source preamble as-is
    #[arg(long)]
    no_title: bool,

    /// Comma-separated boilerplate words (replaces the preset's list)
    #[arg(long, value_delimiter = ',')]
    words: Option<Vec<String>>,
}

/// Cleanup preset
#[derive(Clone, Copy, ValueEnum)]
enum Preset {
    /// Markup only, preamble and boilerplate kept
    Minimal,
    /// Preamble-aware cleanup (default)
    Standard,
    /// Standard with a longer boilerplate list
    Aggressive,
}

/// Inline HTML mode
#[derive(Clone, Copy, ValueEnum)]
enum HtmlMode {
    /// Remove every tag
    Strip,
    /// Only unwrap <https://...> autolinks
    Autolinks,
}

impl From<HtmlMode> for HtmlPolicy {
    fn from(mode: HtmlMode) -> Self {
        match mode {
            HtmlMode::Strip => HtmlPolicy::StripTags,
            HtmlMode::Autolinks => HtmlPolicy::UnwrapAutolinks,
        }
    }
}

impl CleanArgs {
    fn to_options(&self) -> CleanupOptions {
        let mut options = match self.preset {
            Preset::Minimal => CleanupOptions::minimal(),
            Preset::Standard => CleanupOptions::default(),
            Preset::Aggressive => CleanupOptions::aggressive(),
        };

        if let Some(mode) = self.html {
            options = options.with_html_policy(mode.into());
        }
        if self.keep_boilerplate {
            options = options.keep_boilerplate();
        }
        if self.no_title {
            options = options.without_title();
        }
        if let Some(ref words) = self.words {
            options = options.with_boilerplate_words(words.iter().cloned());
        }

        options
    }

    fn cleaner(&self) -> webtext::Result<Cleaner> {
        Cleaner::new(self.to_options())
    }
}

impl Default for CleanArgs {
    fn default() -> Self {
        Self {
            preset: Preset::Standard,
            html: None,
            keep_boilerplate: false,
            no_title: false,
            words: None,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

/// Logs to stderr. `RUST_LOG` takes precedence over `-v`.
fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let Some(command) = cli.command else {
        // Handle default command (webtext <file>)
        if let Some(input) = cli.input {
            let cleaner = Cleaner::default();
            let content = read_input(&input)?;
            return write_output(None, &cleaner.clean(&content));
        }

        // No input provided, show help
        use clap::CommandFactory;
        Cli::command().print_help()?;
        return Ok(());
    };

    match command {
        Commands::Clean {
            input,
            output,
            json,
            compact,
            options,
        } => {
            let cleaner = options.cleaner()?;
            let content = read_input(&input)?;
            debug!(rules = cleaner.rules().len(), bytes = content.len(), "cleaning document");

            let rendered = if json {
                let document = cleaner.clean_document(&content);
                if compact {
                    serde_json::to_string(&document)?
                } else {
                    serde_json::to_string_pretty(&document)?
                }
            } else {
                cleaner.clean(&content)
            };

            write_output(output.as_deref(), &rendered)?;

            if let Some(path) = output {
                println!("{} Cleaned: {}", "✓".green().bold(), path.display());
            }
        }

        Commands::Batch {
            inputs,
            output,
            options,
        } => {
            run_batch(&inputs, &output, &options)?;
        }

        Commands::Info { input, options } => {
            let pb = create_spinner("Analyzing document...");

            let cleaner = options.cleaner()?;
            let content = read_input(&input)?;
            let preamble = Preamble::parse(&content);
            let text = cleaner.clean(&content);

            pb.finish_and_clear();

            println!("{}", "Document Information".cyan().bold());
            println!("{}", "─".repeat(40));
            println!("{}: {}", "Input".bold(), input.display());
            print_preamble(&preamble);

            let stats = Stats::of(&content, &text);
            println!("\n{}", "Content Statistics".cyan().bold());
            println!("{}", "─".repeat(40));
            println!("{}: {}", "Input characters".bold(), stats.input_chars);
            println!("{}: {}", "Output characters".bold(), stats.output_chars);
            println!("{}: {:.1}%", "Reduction".bold(), stats.reduction_percent());
            println!("{}: {}", "Words".bold(), stats.words);
            println!("{}: {}", "Paragraphs".bold(), stats.paragraphs);
            println!("{}: {}", "Bullets".bold(), stats.bullets);
            println!("{}: {}", "Rules applied".bold(), cleaner.rules().len());
        }

        Commands::Rules { options } => {
            let cleaner = options.cleaner()?;

            println!("{}", "Cleanup Rules".cyan().bold());
            println!("{}", "─".repeat(40));
            for (index, rule) in Rule::ALL.iter().enumerate() {
                let line = format!("{:>2}. {:<26} {}", index + 1, rule.name(), rule.description());
                if cleaner.rules().contains(rule) {
                    println!("{}", line);
                } else {
                    println!("{}", line.dimmed());
                }
            }
        }

        Commands::Version => {
            print_version();
        }
    }

    Ok(())
}

/// Clean every input in parallel and write `<stem>.txt` files to `output_dir`.
fn run_batch(
    inputs: &[PathBuf],
    output_dir: &Path,
    options: &CleanArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let pb = create_spinner("Reading documents...");

    let cleaner = options.cleaner()?;
    let documents = inputs
        .iter()
        .map(|path| read_input(path))
        .collect::<io::Result<Vec<String>>>()?;

    pb.set_message(format!("Cleaning {} documents...", documents.len()));
    let cleaned = cleaner.clean_batch(&documents);

    pb.set_message("Writing output...");
    fs::create_dir_all(output_dir)?;

    let names = output_names(inputs);
    let mut written = Vec::with_capacity(cleaned.len());
    for ((input, name), text) in inputs.iter().zip(&names).zip(&cleaned) {
        let path = output_dir.join(name);
        fs::write(&path, text)?;
        info!(input = %input.display(), output = %path.display(), "cleaned document");
        written.push(path);
    }

    pb.finish_and_clear();

    // Print summary
    println!("{}", "Batch Complete".green().bold());
    println!("{}", "─".repeat(40));
    println!("{}: {}", "Output".bold(), output_dir.display());
    for path in &written {
        let name = path.file_name().unwrap_or_default().to_string_lossy();
        println!("  {} {}", "✓".green(), name);
    }

    let input_chars: usize = documents.iter().map(|d| d.chars().count()).sum();
    let output_chars: usize = cleaned.iter().map(|d| d.chars().count()).sum();
    println!("\n{}", "Statistics".cyan().bold());
    println!("{}", "─".repeat(40));
    println!("{}: {}", "Documents".bold(), written.len());
    println!("{}: {}", "Input characters".bold(), input_chars);
    println!("{}: {}", "Output characters".bold(), output_chars);

    Ok(())
}

fn output_stem(input: &Path) -> String {
    input
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .filter(|s| !s.is_empty() && s != "-")
        .unwrap_or_else(|| "stdin".to_string())
}

/// One `.txt` name per input. Repeated stems get a `-2`, `-3`, ... suffix.
fn output_names(inputs: &[PathBuf]) -> Vec<String> {
    let mut taken = HashSet::new();
    inputs
        .iter()
        .map(|input| {
            let stem = output_stem(input);
            let mut name = format!("{}.txt", stem);
            let mut n = 2;
            while !taken.insert(name.clone()) {
                name = format!("{}-{}.txt", stem, n);
                n += 1;
            }
            name
        })
        .collect()
}

fn print_preamble(preamble: &Preamble) {
    if preamble.is_empty() {
        println!("{}: {}", "Preamble".bold(), "none".dimmed());
        return;
    }
    if let Some(ref title) = preamble.title {
        println!("{}: {}", "Title".bold(), title);
    }
    if let Some(ref url) = preamble.url_source {
        println!("{}: {}", "URL Source".bold(), url);
    }
    if let Some(ref published) = preamble.published_time {
        println!("{}: {}", "Published".bold(), published);
    }
}

/// Before/after size figures for one document.
struct Stats {
    input_chars: usize,
    output_chars: usize,
    words: usize,
    paragraphs: usize,
    bullets: usize,
}

impl Stats {
    fn of(input: &str, output: &str) -> Self {
        Self {
            input_chars: input.chars().count(),
            output_chars: output.chars().count(),
            words: output.split_whitespace().count(),
            paragraphs: output
                .split("\n\n")
                .filter(|block| !block.trim().is_empty())
                .count(),
            bullets: output
                .lines()
                .filter(|line| line.starts_with(webtext::rules::BULLET_PREFIX))
                .count(),
        }
    }

    fn reduction_percent(&self) -> f64 {
        if self.input_chars == 0 {
            return 0.0;
        }
        100.0 * (1.0 - self.output_chars as f64 / self.input_chars as f64)
    }
}

fn print_version() {
    println!("{} {}", "webtext".green().bold(), env!("CARGO_PKG_VERSION"));
    println!("Fast cleanup of scraped article markdown into plain text");
    println!();
    println!("Rules: {}", Rule::ALL.len());
}

fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
            .template("{spinner:.blue} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

/// Reads a file, or stdin when `path` is `-`.
fn read_input(path: &Path) -> io::Result<String> {
    if path.as_os_str() == "-" {
        let mut content = String::new();
        io::stdin().read_to_string(&mut content)?;
        Ok(content)
    } else {
        fs::read_to_string(path)
    }
}

fn write_output(path: Option<&Path>, content: &str) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            writeln!(handle, "{}", content)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_verbose_flag() {
        let cli = Cli::parse_from(["webtext", "-vv", "rules"]);
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Some(Commands::Rules { .. })));
    }

    #[test]
    fn test_clean_defaults_to_stdin() {
        let cli = Cli::parse_from(["webtext", "clean"]);
        match cli.command {
            Some(Commands::Clean { input, json, .. }) => {
                assert_eq!(input, PathBuf::from("-"));
                assert!(!json);
            }
            _ => panic!("expected clean command"),
        }
    }

    #[test]
    fn test_clean_args_to_options() {
        let cli = Cli::parse_from([
            "webtext",
            "clean",
            "in.md",
            "--preset",
            "minimal",
            "--html",
            "strip",
            "--words",
            "subscribe,clap",
        ]);
        let Some(Commands::Clean { options, .. }) = cli.command else {
            panic!("expected clean command");
        };

        let options = options.to_options();
        assert!(!options.extract_title);
        assert_eq!(options.html_policy, HtmlPolicy::StripTags);
        assert_eq!(options.boilerplate_words, vec!["subscribe", "clap"]);
    }

    #[test]
    fn test_default_args_match_library_default() {
        assert_eq!(CleanArgs::default().to_options(), CleanupOptions::default());
    }

    #[test]
    fn test_output_names() {
        let names = output_names(&[PathBuf::from("dir/post.md"), PathBuf::from("-")]);
        assert_eq!(names, vec!["post.txt", "stdin.txt"]);
    }

    #[test]
    fn test_output_names_repeated_stems() {
        let inputs = [
            PathBuf::from("a/post.md"),
            PathBuf::from("b/post.md"),
            PathBuf::from("post-2.txt"),
            PathBuf::from("c/post.markdown"),
        ];
        assert_eq!(
            output_names(&inputs),
            vec!["post.txt", "post-2.txt", "post-2-2.txt", "post-3.txt"]
        );
    }

    #[test]
    fn test_stats() {
        let stats = Stats::of("# Title\n\n**body**", "Title\n\nbody\n\t• a");
        assert_eq!(stats.words, 4);
        assert_eq!(stats.paragraphs, 2);
        assert_eq!(stats.bullets, 1);
        assert!(stats.reduction_percent() > 0.0);
    }
}
