use anyhow::Context;
use api_shared::{HealthService, MedicalRecordRes, UserRes};
use carepoint_core::constants::DEFAULT_DATA_DIR;
use carepoint_core::{CoreConfig, ShardableUuid, UserService};
use carepoint_files::{CloudinaryStore, MediaStore, MediaStoreConfig};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "carepoint")]
#[command(about = "Carepoint operator CLI")]
struct Cli {
    /// Data directory holding users and records
    #[arg(long, env = "DATA_DIR", default_value = DEFAULT_DATA_DIR)]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check service health
    Health,
    /// List all users
    List,
    /// Show one user as JSON
    Show {
        /// Canonical user id
        user_id: String,
    },
    /// List a user's medical records as JSON
    Records {
        /// Canonical user id
        user_id: String,
    },
    /// Delete a hosted image from the media store
    DeleteUpload {
        /// Media-store public id, folder included
        public_id: String,
    },
}

fn user_service(data_dir: PathBuf) -> anyhow::Result<UserService> {
    let cfg = CoreConfig::new(data_dir).context("failed to open data directory")?;
    Ok(UserService::new(Arc::new(cfg)))
}

fn parse_user_id(raw: &str) -> anyhow::Result<ShardableUuid> {
    ShardableUuid::parse(raw).with_context(|| format!("invalid user id '{}'", raw))
}

fn media_store_from_env() -> anyhow::Result<CloudinaryStore> {
    let var = |key: &str| std::env::var(key).with_context(|| format!("{} must be set", key));
    let mut cfg = MediaStoreConfig::new(
        var("CLOUD_NAME")?,
        var("CLOUD_API_KEY")?,
        var("CLOUD_API_SECRET")?,
    )?;
    if let Ok(base) = std::env::var("CLOUD_API_BASE") {
        cfg = cfg.with_api_base(base);
    }
    Ok(CloudinaryStore::new(cfg)?)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("carepoint=warn".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Health => {
            let res = HealthService::check_health();
            println!("Health: ok={}, message={}", res.ok, res.message);
        }
        Commands::List => {
            let users = user_service(cli.data_dir)?.list_users();
            if users.is_empty() {
                println!("No users found.");
            } else {
                for user in users {
                    println!(
                        "ID: {}, Name: {}, Email: {}, Created: {}",
                        user.id,
                        user.fullname,
                        user.email,
                        user.created_at.to_rfc3339()
                    );
                }
            }
        }
        Commands::Show { user_id } => {
            let id = parse_user_id(&user_id)?;
            match user_service(cli.data_dir)?.get_user_by_id(&id)? {
                Some(user) => {
                    let res: UserRes = user.into();
                    println!("{}", serde_json::to_string_pretty(&res)?);
                }
                None => anyhow::bail!("no user with id {}", id),
            }
        }
        Commands::Records { user_id } => {
            let id = parse_user_id(&user_id)?;
            let records: Vec<MedicalRecordRes> = user_service(cli.data_dir)?
                .list_records(&id)
                .into_iter()
                .map(Into::into)
                .collect();
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
        Commands::DeleteUpload { public_id } => {
            let store = media_store_from_env()?;
            store
                .destroy(&public_id)
                .await
                .with_context(|| format!("failed to delete {}", public_id))?;
            println!("Deleted {}", public_id);
        }
    }

    Ok(())
}
