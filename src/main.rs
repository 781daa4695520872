use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{error, info};

use property_etl::{logging, Config, PropertyEtl, Store, SummaryReport};

#[derive(Parser)]
#[command(name = "property-etl")]
#[command(about = "Normalize raw property records into a relational store")]
#[command(version)]
struct Cli {
    /// TOML configuration file (defaults are used when omitted)
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Override the database path
    #[arg(long)]
    database: Option<PathBuf>,

    /// Override the JSON input file
    #[arg(long)]
    input: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract, transform and load, then validate
    Run,
    /// Validate an already-loaded database
    Validate,
    /// Print distribution summaries of an already-loaded database
    Summary,
}

fn main() {
    let cli = Cli::parse();

    let config = match build_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ ETL pipeline failed: {:#}", e);
            std::process::exit(1);
        }
    };

    let _guard = match logging::init_logging(&config.logging) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("❌ Failed to initialize logging: {:#}", e);
            std::process::exit(1);
        }
    };

    match execute(cli.command, config) {
        Ok(message) => println!("✅ {}", message),
        Err(e) => {
            error!("ETL pipeline failed: {:#}", e);
            eprintln!("❌ ETL pipeline failed: {:#}", e);
            std::process::exit(1);
        }
    }
}

fn build_config(cli: &Cli) -> Result<Config> {
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(database) = &cli.database {
        config.database.path = database.clone();
    }
    if let Some(input) = &cli.input {
        config.paths.input_file = input.clone();
    }
    Ok(config)
}

fn execute(command: Commands, config: Config) -> Result<String> {
    match command {
        Commands::Run => {
            let mut etl = PropertyEtl::setup(config)?;
            let report = etl.run()?;
            println!("📊 {}", report.summary());
            Ok("ETL pipeline completed successfully!".to_string())
        }
        Commands::Validate => {
            let etl = open_existing(config)?;
            let report = etl.validate();
            print_summary(&etl.summary_report());
            println!("📋 {}", report.summary());
            Ok("Data validation completed successfully!".to_string())
        }
        Commands::Summary => {
            let etl = open_existing(config)?;
            print_summary(&etl.summary_report());
            Ok("Summary report completed successfully!".to_string())
        }
    }
}

fn print_summary(summary: &SummaryReport) {
    println!("🏠 Properties by type:");
    for (property_type, count) in &summary.by_type {
        println!("   {}: {}", property_type, count);
    }
    println!("🗺️  Properties by state:");
    for (state, count) in &summary.by_state {
        println!("   {}: {}", state, count);
    }
    println!("💰 Average market value by type:");
    for (property_type, value) in &summary.avg_market_value_by_type {
        println!("   {}: ${:.2}", property_type, value);
    }
}

fn open_existing(config: Config) -> Result<PropertyEtl> {
    if !config.database.path.exists() {
        anyhow::bail!(
            "Database not found: {} (run the `run` command first)",
            config.database.path.display()
        );
    }
    let store = Store::connect(&config.database)?;
    info!("Opened existing database {}", config.database.path.display());
    Ok(PropertyEtl::with_store(config, store))
}
