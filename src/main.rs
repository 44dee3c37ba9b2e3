use std::{fs::write, path::PathBuf};

use address_verify::{batch, AddressInput, ClientConfig, VerificationClient, Verifier};
use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(about = "Verify and normalize US street addresses")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Debug, Subcommand)]
enum Command {
    /// Verify a single address and print the normalized result
    Check {
        #[arg(long)]
        street: String,
        #[arg(long)]
        secondary: Option<String>,
        #[arg(long)]
        city: String,
        #[arg(long)]
        state: String,
        #[arg(long)]
        zipcode: String,
        #[arg(long, default_value = "US")]
        country: String,
    },
    /// Validate a JSON array of address records
    Batch {
        input: PathBuf,
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let client = VerificationClient::new(ClientConfig::from_env()?);

    match cli.command {
        Command::Check {
            street,
            secondary,
            city,
            state,
            zipcode,
            country,
        } => {
            let input = AddressInput {
                street,
                secondary,
                city,
                state,
                zipcode,
                country,
            };
            if !input.is_domestic() {
                bail!("only US addresses can be verified, got country {:?}", input.country);
            }

            let verification = client.verify(&input)?;
            println!("{}", serde_json::to_string_pretty(&verification)?);
        }
        Command::Batch { input, output } => {
            let records = batch::load(&input)?;
            let report = batch::run(records, &client)?;
            let rendered = batch::render(&report)?;
            match output {
                Some(path) => write(path, rendered)?,
                None => print!("{rendered}"),
            }
        }
    }

    Ok(())
}
