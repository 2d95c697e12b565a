#![allow(clippy::print_stdout)]

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sqlx::SqlitePool;

use bairnlog_lib::snapshot::Snapshot;
use bairnlog_lib::{commands, db, logging, migrate, time};

#[derive(Parser)]
#[command(name = "bairnlog-admin", about = "bairnlog maintenance helper")]
struct Cli {
    /// Path to the sqlite database file
    #[arg(long, value_name = "PATH", default_value = "bairnlog.sqlite3")]
    db: PathBuf,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Apply pending schema migrations and exit
    Migrate,
    /// Register (or re-enter) a family scope
    Login { code: String },
    /// Print the day's statistics summary
    Stats {
        #[arg(long, value_name = "CODE")]
        family: String,
        /// Defaults to today
        #[arg(long, value_name = "YYYY-MM-DD")]
        date: Option<String>,
    },
    /// Dump the family's full dataset as JSON
    Export {
        #[arg(long, value_name = "CODE")]
        family: String,
        /// Write to a file instead of stdout
        #[arg(long, value_name = "PATH")]
        out: Option<PathBuf>,
    },
    /// Apply a snapshot file under the family scope (additive merge)
    Import {
        #[arg(long, value_name = "CODE")]
        family: String,
        file: PathBuf,
    },
    /// Print the family's settings
    Settings {
        #[arg(long, value_name = "CODE")]
        family: String,
    },
}

async fn open(db_path: &PathBuf) -> Result<SqlitePool> {
    let pool = db::connect_sqlite_pool(db_path)
        .await
        .context("open sqlite pool")?;
    migrate::apply_migrations(&pool)
        .await
        .context("apply migrations")?;
    Ok(pool)
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();
    let cli = Cli::parse();
    let pool = open(&cli.db).await?;

    match cli.cmd {
        Cmd::Migrate => {
            // open() already applied them
            println!("migrations up to date");
        }
        Cmd::Login { code } => {
            let ack = commands::login(&pool, &code).await?;
            println!("{}", serde_json::to_string_pretty(&ack)?);
        }
        Cmd::Stats { family, date } => {
            let date = date.unwrap_or_else(time::today);
            let summary = commands::day_stats(&pool, &family, &date).await?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Cmd::Export { family, out } => {
            let snapshot = commands::export_all(&pool, &family).await?;
            let json = serde_json::to_string_pretty(&snapshot)?;
            match out {
                Some(path) => {
                    fs::write(&path, json).with_context(|| format!("write {}", path.display()))?;
                    println!("exported {} records to {}", snapshot.record_count(), path.display());
                }
                None => println!("{json}"),
            }
        }
        Cmd::Import { family, file } => {
            let raw = fs::read_to_string(&file)
                .with_context(|| format!("read {}", file.display()))?;
            let snapshot: Snapshot = serde_json::from_str(&raw).context("parse snapshot")?;
            let report = commands::import_all(&pool, &family, snapshot).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Cmd::Settings { family } => {
            let settings = commands::get_settings(&pool, &family).await?;
            println!("{}", serde_json::to_string_pretty(&settings)?);
        }
    }

    Ok(())
}
