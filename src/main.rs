//! Tosca Bridge CLI
//!
//! Entry point for the `tosca-bridge` command-line tool.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::process;
use tosca_bridge::{
    Auth, BridgeConfig, ExecutionSummary, HttpTransport, PublishReport, QTestPublisher,
    ResultExtractor, XrayPublisher,
};
use tracing::level_filters::LevelFilter;

#[derive(Parser)]
#[command(name = "tosca-bridge")]
#[command(about = "Normalize Tosca execution results and publish them", version)]
struct Cli {
    /// Path to config file (default: .tosca/bridge.toml)
    #[arg(long, short = 'c', global = true)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse Tosca XML results into a JSON summary
    Parse {
        /// Directory containing XML results
        #[arg(long)]
        results_dir: PathBuf,

        /// Output file path
        #[arg(long)]
        output_file: PathBuf,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        output_format: OutputFormat,
    },

    /// Create a Test Execution and defects in JIRA/Xray
    PublishXray {
        /// Path to results JSON file
        #[arg(long)]
        results: PathBuf,

        /// JIRA instance URL
        #[arg(long)]
        jira_url: String,

        /// JIRA username
        #[arg(long)]
        username: String,

        /// JIRA password or API token
        #[arg(long)]
        password: String,

        /// JIRA project key
        #[arg(long)]
        project: String,

        /// Build number
        #[arg(long)]
        build_number: String,
    },

    /// Publish results to a qTest test cycle
    PublishQtest {
        /// Path to results JSON file
        #[arg(long)]
        results: PathBuf,

        /// qTest API URL
        #[arg(long)]
        api_url: String,

        /// qTest API token
        #[arg(long)]
        token: String,

        /// qTest project ID
        #[arg(long)]
        project_id: String,

        /// Test cycle name
        #[arg(long)]
        test_cycle: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
}

impl Commands {
    /// Whether the command reads the bridge config file
    fn uses_config(&self) -> bool {
        match self {
            Commands::Parse { .. } | Commands::PublishXray { .. } => true,
            Commands::PublishQtest { .. } => false,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = if cli.command.uses_config() {
        load_config(cli.config.as_deref())
    } else {
        BridgeConfig::default()
    };

    match cli.command {
        Commands::Parse {
            results_dir,
            output_file,
            output_format,
        } => run_parse(&config, &results_dir, &output_file, output_format),
        Commands::PublishXray {
            results,
            jira_url,
            username,
            password,
            project,
            build_number,
        } => run_publish_xray(
            config,
            &results,
            &jira_url,
            Auth::Basic { username, password },
            &project,
            &build_number,
        ),
        Commands::PublishQtest {
            results,
            api_url,
            token,
            project_id,
            test_cycle,
        } => run_publish_qtest(&results, &api_url, Auth::Bearer(token), &project_id, &test_cycle),
    }
}

fn load_config(path: Option<&Path>) -> BridgeConfig {
    match BridgeConfig::load(path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            process::exit(1);
        }
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose { LevelFilter::DEBUG } else { LevelFilter::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run_parse(config: &BridgeConfig, results_dir: &Path, output_file: &Path, format: OutputFormat) {
    let extractor = match ResultExtractor::new(results_dir, &config.document_patterns) {
        Ok(e) => e,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };
    tracing::info!("Parsing Tosca results from: {}", extractor.root().display());

    let summary = extractor
        .extract()
        .into_summary()
        .with_environment(config.environment.clone());

    println!("\n{}\n", summary.to_human());

    match format {
        OutputFormat::Json => {
            if let Err(e) = summary.write_to_file(output_file) {
                eprintln!("Error writing {}: {}", output_file.display(), e);
                process::exit(1);
            }
            println!("Results saved to: {}", output_file.display());
        }
    }

    process::exit(if summary.has_failures() { 1 } else { 0 });
}

fn load_results(path: &Path) -> ExecutionSummary {
    match ExecutionSummary::from_file(path) {
        Ok(summary) => summary,
        Err(e) => {
            eprintln!("Failed to load results file: {}", e);
            process::exit(1);
        }
    }
}

fn http_transport(auth: Auth) -> HttpTransport {
    match HttpTransport::new(auth) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Error creating HTTP client: {}", e);
            process::exit(1);
        }
    }
}

fn exit_with(report: &impl PublishReport) -> ! {
    process::exit(if report.is_success() { 0 } else { 1 })
}

fn run_publish_xray(
    config: BridgeConfig,
    results: &Path,
    jira_url: &str,
    auth: Auth,
    project: &str,
    build_number: &str,
) {
    let summary = load_results(results);
    let publisher = XrayPublisher::new(http_transport(auth), jira_url, project, build_number, config);
    let report = tosca_bridge::publish::run_publisher(&publisher, &summary);
    exit_with(&report);
}

fn run_publish_qtest(results: &Path, api_url: &str, auth: Auth, project_id: &str, test_cycle: &str) {
    let summary = load_results(results);
    let publisher = QTestPublisher::new(http_transport(auth), api_url, project_id, test_cycle);
    let report = tosca_bridge::publish::run_publisher(&publisher, &summary);
    exit_with(&report);
}
