use anyhow::Context;
use clap::{Parser, Subcommand};
use moip_sdk::config::Config;
use moip_sdk::gateway_client::GatewayClient;
use moip_sdk::instruction::InstructionBuilder;
use moip_sdk::models::{InstallmentQuery, InstructionRequest};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(author, version, about = "Moip single payment instruction client", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the XML document for an instruction request file
    Render {
        /// JSON instruction request
        request: PathBuf,
    },
    /// Send an instruction request file to Moip
    Send {
        /// JSON instruction request
        request: PathBuf,
    },
    /// Simulate installments for a Moip account
    Installments {
        /// Moip login of the receiving account
        #[arg(long)]
        login: String,
        /// Highest number of installments
        #[arg(long)]
        max: u32,
        /// Monthly interest rate
        #[arg(long)]
        rate: String,
        /// Amount to simulate
        #[arg(long)]
        value: String,
    },
}

/// Reads a request file and applies the configured environment and
/// credential unless the file sets its own.
fn load_instruction(path: &Path, config: Option<&Config>) -> anyhow::Result<InstructionBuilder> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let request: InstructionRequest = serde_json::from_str(&content)
        .with_context(|| format!("Invalid instruction request in {}", path.display()))?;

    let mut builder = InstructionBuilder::new();
    if let Some(config) = config {
        builder.set_environment(config.environment.key());
        if request.credential.is_none() {
            builder.set_credential(&config.key, &config.token);
        }
    }
    builder.apply_request(&request);
    Ok(builder)
}

fn report_errors(builder: &InstructionBuilder) -> anyhow::Result<()> {
    for error in builder.errors() {
        tracing::error!("{}", error);
    }
    if builder.has_errors() {
        anyhow::bail!("instruction has {} error(s)", builder.errors().len());
    }
    Ok(())
}

/// Entry point for the `moip` command line client.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "moip_sdk=info,moip=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Render { request } => {
            let builder = load_instruction(&request, None)?;
            let xml = builder.render()?;
            report_errors(&builder)?;
            println!("{}", xml);
        }
        Command::Send { request } => {
            let config = Config::from_env()?;
            let builder = load_instruction(&request, Some(&config))?;
            report_errors(&builder)?;

            let client = GatewayClient::from_config(&config)?;
            let result = client.send(&builder).await?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Command::Installments {
            login,
            max,
            rate,
            value,
        } => {
            let config = Config::from_env()?;
            let mut builder = InstructionBuilder::new();
            builder
                .set_environment(config.environment.key())
                .set_credential(&config.key, &config.token);

            let query = InstallmentQuery {
                login,
                max_installments: max,
                rate,
                simulated_value: value,
            };
            let client = GatewayClient::from_config(&config)?;
            let quote = client.query_installments(&builder, &query).await?;
            println!("{}", serde_json::to_string_pretty(&quote)?);
        }
    }

    Ok(())
}
