use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use retrofit_oracle::analysis::{AnalysisRequest, AnalysisResult, RetrofitAnalyzer};
use retrofit_oracle::config::{Config, ConfigOverrides};
use retrofit_oracle::improvement::{parse_improvement_list, ImprovementType};
use retrofit_oracle::output::csv::analysis_to_csv;
use retrofit_oracle::output::json::{render_analysis_json, render_json};
use retrofit_oracle::output::table::{render_analysis_table, render_improvements_catalog};
use retrofit_oracle::providers::ProviderSet;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
    Csv,
}

#[derive(Debug, Parser)]
#[command(
    name = "retrofit-oracle",
    about = "Cost, value and planning feasibility of home energy retrofits"
)]
struct Cli {
    #[arg(short, long)]
    config: Option<PathBuf>,
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    output: OutputFormat,
    #[arg(long = "epc-api-key", env = "EPC_API_KEY", hide_env_values = true)]
    epc_api_key: Option<String>,
    #[arg(long = "ibex-api-key", env = "IBEX_API_KEY", hide_env_values = true)]
    ibex_api_key: Option<String>,
    #[arg(long = "timeout-secs")]
    timeout_secs: Option<u64>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Analyse improvements for one property.
    Analyze {
        /// Postcode, UPRN or other property reference.
        reference: String,
        #[arg(short, long)]
        budget: f64,
        /// Comma-separated, e.g. "solar,heat_pump,windows".
        #[arg(short, long)]
        improvements: String,
        #[arg(long, allow_hyphen_values = true)]
        lat: Option<f64>,
        #[arg(long, allow_hyphen_values = true)]
        lon: Option<f64>,
        #[arg(long)]
        address: Option<String>,
        #[arg(long = "conservation-area")]
        conservation_area: Option<bool>,
        #[arg(long)]
        radius: Option<u32>,
        #[arg(long = "years-back")]
        years_back: Option<u32>,
        #[arg(long = "no-fuzzy")]
        no_fuzzy: bool,
        #[arg(long = "no-compliance")]
        no_compliance: bool,
        /// Use built-in sample data instead of live services.
        #[arg(long)]
        offline: bool,
    },
    /// List known improvement types and their benchmark figures.
    Improvements,
    Config {
        #[arg(long)]
        init: bool,
        #[arg(long)]
        show: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    let mut config = Config::load(Some(&config_path))?;
    let mut overrides = ConfigOverrides {
        epc_api_key: cli.epc_api_key.clone(),
        ibex_api_key: cli.ibex_api_key.clone(),
        timeout_secs: cli.timeout_secs,
        ..ConfigOverrides::default()
    };

    match &cli.command {
        Commands::Config { init, show } => {
            config.apply_overrides(overrides);
            handle_config_command(*init, *show, &config, &config_path)
        }
        Commands::Improvements => {
            match cli.output {
                OutputFormat::Table => println!("{}", render_improvements_catalog()),
                OutputFormat::Json => println!("{}", render_json(&ImprovementType::KNOWN)?),
                OutputFormat::Csv => {
                    warn!("CSV output for improvements not implemented, using JSON");
                    println!("{}", render_json(&ImprovementType::KNOWN)?);
                }
            }
            Ok(())
        }
        Commands::Analyze {
            reference,
            budget,
            improvements,
            lat,
            lon,
            address,
            conservation_area,
            radius,
            years_back,
            no_fuzzy,
            no_compliance,
            offline,
        } => {
            overrides.radius_m = *radius;
            overrides.years_back = *years_back;
            overrides.fuzzy_matching = (*no_fuzzy).then_some(false);
            config.apply_overrides(overrides);

            let providers = if *offline {
                info!("using offline sample data");
                ProviderSet::sample()
            } else {
                ProviderSet::from_config(&config.providers)
            };
            let analyzer = RetrofitAnalyzer::from_config(providers, &config);

            let parsed = parse_improvement_list(improvements);
            let mut request = AnalysisRequest::new(
                reference.clone(),
                *budget,
                parsed.iter().map(ToString::to_string),
            );
            request.address = address.clone();
            request.latitude = *lat;
            request.longitude = *lon;
            request.conservation_area = *conservation_area;
            if *no_compliance {
                request.include_compliance = Some(false);
            }

            let result = analyzer.analyze(&request).await?;
            print_analysis(&result, cli.output)
        }
    }
}

fn handle_config_command(init: bool, show: bool, config: &Config, config_path: &Path) -> Result<()> {
    if init {
        Config::write_template(config_path)?;
        println!("Wrote config template to {}", config_path.display());
    }
    if show || !init {
        println!("{}", render_json(&redacted(config))?);
    }
    Ok(())
}

fn redacted(config: &Config) -> Config {
    let mut shown = config.clone();
    for key in [
        &mut shown.providers.epc_api_key,
        &mut shown.providers.ibex_api_key,
    ] {
        if !key.is_empty() {
            *key = "<redacted>".to_string();
        }
    }
    shown
}

fn print_analysis(result: &AnalysisResult, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => println!("{}", render_analysis_table(result)),
        OutputFormat::Json => println!("{}", render_analysis_json(result, Utc::now())?),
        OutputFormat::Csv => print!("{}", analysis_to_csv(result)?),
    }
    Ok(())
}
