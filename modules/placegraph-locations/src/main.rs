use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use mapbox_client::MapboxClient;
use placegraph_common::Config;
use placegraph_graph::{migrate::migrate, GraphClient, LocationReader, LocationWriter};
use placegraph_locations::{IngestOutcome, LocationIngestor};

#[derive(Parser)]
#[command(name = "placegraph", about = "Resolve place names into the location graph")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Geocode a place name and bind the user to it
    Locate {
        #[arg(long)]
        user: String,
        name: String,
    },
    /// Print a user's current location and its containers
    Show {
        #[arg(long)]
        user: String,
    },
    /// Create constraints and indexes
    Migrate,
}

/// Default log levels for every workspace crate, overridable via `RUST_LOG`.
const LOG_DIRECTIVES: [&str; 2] = ["placegraph=info", "mapbox_client=info"];

fn env_filter() -> Result<EnvFilter> {
    let mut filter = EnvFilter::from_default_env();
    for directive in LOG_DIRECTIVES {
        filter = filter.add_directive(directive.parse()?);
    }
    Ok(filter)
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(env_filter()?)
        .init();

    let cli = Cli::parse();

    let config = match cli.command {
        Command::Locate { .. } => Config::from_env()?,
        _ => Config::graph_from_env()?,
    };
    config.log_redacted();

    let client =
        GraphClient::connect(&config.neo4j_uri, &config.neo4j_user, &config.neo4j_password)
            .await?;

    match cli.command {
        Command::Migrate => {
            migrate(&client).await?;
            info!("Migrations complete");
        }
        Command::Locate { user, name } => {
            let geocoder = MapboxClient::new(
                config.mapbox_token.clone(),
                &config.mapbox_base_url,
                config.geocoding_timeout,
            )?;
            let ingestor = LocationIngestor::new(
                Arc::new(geocoder),
                Arc::new(LocationWriter::new(client.clone())),
            );

            match ingestor.resolve_and_bind_location(&user, &name).await {
                Ok(IngestOutcome::Skipped) => println!("Empty location name, nothing to do"),
                Ok(IngestOutcome::Resolved(r)) => {
                    println!("{} -> {}", user, r.location_id);
                    if !r.ancestors.is_empty() {
                        println!("  in {}", r.ancestors.join(" > "));
                    }
                    if !r.bound {
                        println!("  (no User node '{user}', binding not written)");
                    }
                }
                Err(e) => {
                    tracing::error!(stage = %e.stage(), error = %e, "Ingestion failed");
                    anyhow::bail!("{}", e.user_message());
                }
            }
        }
        Command::Show { user } => {
            let reader = LocationReader::new(client);
            match reader.user_location(&user).await? {
                Some(location) => {
                    let name = location.name().unwrap_or("<unnamed>");
                    println!("{user}: {name} ({})", location.id);
                    for ancestor in reader.ancestors(&location.id).await? {
                        println!("  in {} ({})", ancestor.name().unwrap_or("<unnamed>"), ancestor.id);
                    }
                }
                None => println!("{user}: no location"),
            }
        }
    }

    Ok(())
}
