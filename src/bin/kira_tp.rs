use std::process::ExitCode;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use kira_target_profiler::app::App;
use kira_target_profiler::config::{ConfigLoader, ResolvedConfig};
use kira_target_profiler::discovery::Discovery;
use kira_target_profiler::domain::{self, DiseaseId};
use kira_target_profiler::error::{ErrorClass, KiraError};
use kira_target_profiler::orchestrator::Sources;
use kira_target_profiler::output::{JsonOutput, OutputMode, TextOutput};
use kira_target_profiler::runtime::block_on_detached;
use kira_target_profiler::xref::HttpCrossRefResolver;

#[derive(Parser)]
#[command(name = "kira-tp")]
#[command(about = "Drug-target profiler: aggregates seven evidence sources into a 0-100 target score")]
#[command(version, author)]
struct Cli {
    /// Path to a kira-tp.json config file
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Profile a single gene target")]
    Analyze(AnalyzeArgs),
    #[command(about = "Rank candidate targets for a disease")]
    Discover(DiscoverArgs),
    #[command(about = "Print the canonical symbol for a gene name or alias")]
    Normalize(NormalizeArgs),
}

#[derive(Args)]
struct AnalyzeArgs {
    gene: String,

    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct DiscoverArgs {
    /// Ontology disease id, e.g. EFO_0000311
    #[arg(long)]
    disease: String,

    #[arg(required = true)]
    genes: Vec<String>,

    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct NormalizeArgs {
    input: String,

    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(kira) = report.downcast_ref::<KiraError>() {
            return ExitCode::from(map_exit_code(kira));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &KiraError) -> u8 {
    match error.class() {
        ErrorClass::BadRequest | ErrorClass::NotFound => 2,
        ErrorClass::UpstreamFailure => 3,
        ErrorClass::Internal => 1,
    }
}

fn output_mode(json: bool) -> OutputMode {
    if json {
        OutputMode::Json
    } else {
        OutputMode::Text
    }
}

fn run() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Normalize(args) => run_normalize(args),
        Commands::Analyze(args) => {
            let config = ConfigLoader::resolve(cli.config.as_deref())?;
            let app = build_app(&config)?;
            let profile = block_on_detached(app.analyze(&args.gene))??;
            match output_mode(args.json) {
                OutputMode::Json => JsonOutput::print_profile(&profile).into_diagnostic(),
                OutputMode::Text => {
                    TextOutput::print(&TextOutput::render_profile(&profile)).into_diagnostic()
                }
            }
        }
        Commands::Discover(args) => {
            let disease = args.disease.parse::<DiseaseId>()?;
            let config = ConfigLoader::resolve(cli.config.as_deref())?;
            let app = Arc::new(build_app(&config)?);
            let discovery = Discovery::new(app, config.discovery);
            let ranking = block_on_detached(discovery.rank(&disease, &args.genes))??;
            match output_mode(args.json) {
                OutputMode::Json => JsonOutput::print_ranking(&ranking).into_diagnostic(),
                OutputMode::Text => {
                    TextOutput::print(&TextOutput::render_ranking(&ranking)).into_diagnostic()
                }
            }
        }
    }
}

fn run_normalize(args: NormalizeArgs) -> miette::Result<()> {
    let symbol = domain::normalize(&args.input)?;
    match output_mode(args.json) {
        OutputMode::Json => JsonOutput::print_symbol(&args.input, &symbol).into_diagnostic(),
        OutputMode::Text => TextOutput::print(&format!("{symbol}\n")).into_diagnostic(),
    }
}

/// Blocking HTTP clients spin up their own runtime, so they are built before
/// ours exists.
fn build_app(config: &ResolvedConfig) -> Result<App, KiraError> {
    let sources = Sources::http(&config.source_timeouts)?;
    let resolver = Arc::new(HttpCrossRefResolver::new(config.resolver_timeout)?);
    Ok(App::new(config, sources, resolver))
}
