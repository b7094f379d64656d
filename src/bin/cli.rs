use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use fortifybridge::config::{Settings, SETTINGS_FILE};
use fortifybridge::error::BridgeError;
use fortifybridge::output::{self, OutputFormat};
use fortifybridge::rules::{IssueMapper, Vulnerability};
use fortifybridge::source::{DataSource, SscExportSource};
use fortifybridge::taxonomy::ExternalList;
use fortifybridge::{expr, Bridge, BridgeOptions};

#[derive(Parser)]
#[command(
    name = "fortify-bridge",
    about = "Fortify SSC metrics and rules for code-quality hosts",
    version,
    author
)]
struct Cli {
    /// Settings file path
    #[arg(long, short = 'c', global = true)]
    config: Option<PathBuf>,

    /// External list to generate rules from (overrides settings)
    #[arg(long, global = true)]
    rules_source: Option<String>,

    /// Log filter (error, warn, info, debug, trace). RUST_LOG takes precedence.
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the rules that would be registered, and the default profile
    ListRules {
        /// Output format (table, json)
        #[arg(long, short = 'f', default_value = "table")]
        format: String,
    },

    /// List the configured metric definitions
    ListMetrics {
        /// Output format (table, json)
        #[arg(long, short = 'f', default_value = "table")]
        format: String,
    },

    /// List the external category lists available for rule generation
    ListTaxonomies {
        /// Output format (table, json)
        #[arg(long, short = 'f', default_value = "table")]
        format: String,
    },

    /// Evaluate every metric for one application version
    Evaluate {
        /// Application version id (directory name in the export)
        #[arg(long)]
        version: String,

        /// Directory of saved SSC responses (overrides settings)
        #[arg(long, short = 'd')]
        data: Option<PathBuf>,

        /// Output format (console, json)
        #[arg(long, short = 'f', default_value = "console")]
        format: String,

        /// Write output to file instead of stdout
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Exit with 1 if any metric could not be computed
        #[arg(long)]
        strict: bool,
    },

    /// Map exported Fortify vulnerabilities onto registered rules
    MapIssues {
        /// JSON array of vulnerabilities
        #[arg(long, short = 'i')]
        issues: PathBuf,

        /// Output format (console, json)
        #[arg(long, short = 'f', default_value = "console")]
        format: String,
    },

    /// Print the HTML help for metric expressions
    Docs,

    /// Generate a starter .fortify-bridge.toml settings file
    Init {
        /// Overwrite existing settings file
        #[arg(long)]
        force: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let options = BridgeOptions {
        settings_path: cli.config,
        rules_source_override: cli.rules_source,
    };

    let result = match cli.command {
        Commands::ListRules { format } => cmd_list_rules(&options, format),
        Commands::ListMetrics { format } => cmd_list_metrics(&options, format),
        Commands::ListTaxonomies { format } => cmd_list_taxonomies(&options, format),
        Commands::Evaluate {
            version,
            data,
            format,
            output,
            strict,
        } => cmd_evaluate(&options, version, data, format, output, strict),
        Commands::MapIssues { issues, format } => cmd_map_issues(&options, issues, format),
        Commands::Docs => cmd_docs(),
        Commands::Init { force } => cmd_init(force),
    };

    match result {
        Ok(exit_code) => process::exit(exit_code),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(e.exit_code());
        }
    }
}

fn parse_format(format_str: &str) -> OutputFormat {
    OutputFormat::from_str_lenient(format_str).unwrap_or_else(|| {
        eprintln!("Warning: unknown format '{}', using console", format_str);
        OutputFormat::Console
    })
}

fn cmd_list_rules(options: &BridgeOptions, format_str: String) -> Result<i32, BridgeError> {
    let bridge = Bridge::shared(options)?;
    let request = bridge.registration(&SscExportSource::new("."));
    print!("{}", output::render_rules(&request, parse_format(&format_str))?);
    Ok(0)
}

fn cmd_list_metrics(options: &BridgeOptions, format_str: String) -> Result<i32, BridgeError> {
    let bridge = Bridge::shared(options)?;
    let request = bridge.registration(&SscExportSource::new("."));
    print!("{}", output::render_metrics(&request, parse_format(&format_str))?);
    Ok(0)
}

fn cmd_list_taxonomies(options: &BridgeOptions, format_str: String) -> Result<i32, BridgeError> {
    let bridge = Bridge::shared(options)?;
    let lists: Vec<&ExternalList> = bridge
        .taxonomy()
        .map(|md| md.lists().collect())
        .unwrap_or_default();
    print!("{}", output::render_taxonomies(&lists, parse_format(&format_str))?);
    Ok(0)
}

fn cmd_evaluate(
    options: &BridgeOptions,
    version: String,
    data: Option<PathBuf>,
    format_str: String,
    output_path: Option<PathBuf>,
    strict: bool,
) -> Result<i32, BridgeError> {
    let bridge = Bridge::shared(options)?;
    let root = data
        .or_else(|| bridge.settings().ssc_export_path())
        .ok_or_else(|| BridgeError::ConfigLoad {
            origin: SETTINGS_FILE.to_string(),
            message: "no SSC export directory; pass --data or set sources.ssc_export".into(),
        })?;

    let pass = bridge.evaluate(&SscExportSource::new(root), &version)?;
    let rendered = output::render_pass(&pass, parse_format(&format_str))?;

    match output_path {
        Some(out) => std::fs::write(&out, &rendered)?,
        None => print!("{}", rendered),
    }

    // Exit code: 0 = all computed, 1 = failures with --strict
    Ok(if strict && !pass.failures.is_empty() { 1 } else { 0 })
}

fn cmd_map_issues(
    options: &BridgeOptions,
    issues_path: PathBuf,
    format_str: String,
) -> Result<i32, BridgeError> {
    let bridge = Bridge::shared(options)?;
    let content = std::fs::read_to_string(&issues_path)?;
    let vulns: Vec<Vulnerability> = serde_json::from_str(&content)?;

    let catalog = bridge.catalog();
    let issues = IssueMapper::new(&catalog).map_all(&vulns);
    print!("{}", output::render_issues(&issues, parse_format(&format_str))?);
    Ok(0)
}

fn cmd_docs() -> Result<i32, BridgeError> {
    let source = SscExportSource::new(".");
    println!("{}", expr::docs::render(&source.fields(), &source.examples()));
    Ok(0)
}

fn cmd_init(force: bool) -> Result<i32, BridgeError> {
    let path = PathBuf::from(SETTINGS_FILE);

    if path.exists() && !force {
        eprintln!("{} already exists. Use --force to overwrite.", SETTINGS_FILE);
        return Ok(1);
    }

    std::fs::write(&path, Settings::starter_toml())?;
    println!("Created {}", SETTINGS_FILE);

    Ok(0)
}
