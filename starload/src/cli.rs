// starload/src/cli.rs
//
// Single source of truth for all CLI definitions (Clap structs).

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use starload_core::domain::fact::FactKind;

#[derive(Parser)]
#[command(name = "starload")]
#[command(about = "Star-schema refresh pipeline for the AdventureWorks sales warehouse", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 🚀 Refreshes the warehouse (Dimensions -> Facts -> Run log)
    Run {
        /// Project directory
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,

        /// Only pull orders placed on or after this date (YYYY-MM-DD)
        #[arg(long)]
        start_date: Option<NaiveDate>,

        /// Rebuild dimensions and fact tables from scratch
        #[arg(long)]
        full_refresh: bool,

        /// Keep the current dimensions and only load new facts
        #[arg(long, conflicts_with = "full_refresh")]
        skip_dimensions: bool,
    },

    /// 🏗️  Creates 'starload.yaml' and the empty warehouse tables
    Init {
        /// Project directory
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,

        /// Project name (defaults to the directory name)
        #[arg(long)]
        name: Option<String>,
    },

    /// 📊 Row counts per warehouse table and the latest run log entries
    Status {
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,

        /// Number of run log entries to show
        #[arg(long, default_value = "5")]
        history: usize,
    },

    /// 🔍 Inspects a DuckDB table (schema + sample rows)
    Inspect {
        /// Path to the DuckDB database file
        #[arg(long, default_value = "warehouse.duckdb")]
        db_path: String,

        /// Table name to inspect (ex: "dim_customer" or "Sales.Customer")
        #[arg(long, short)]
        table: String,

        /// Number of sample rows to display
        #[arg(long, default_value = "5")]
        limit: usize,
    },

    /// 💰 Sales metrics per date and product from a loaded fact table
    Metrics {
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,

        #[arg(long, value_enum, default_value_t = FactArg::Internet)]
        fact: FactArg,

        /// Number of groups to display, largest net sales first
        #[arg(long, default_value = "20")]
        limit: usize,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FactArg {
    Internet,
    Reseller,
}

impl From<FactArg> for FactKind {
    fn from(arg: FactArg) -> Self {
        match arg {
            FactArg::Internet => FactKind::InternetSales,
            FactArg::Reseller => FactKind::ResellerSales,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Result, bail};
    use clap::Parser;

    #[test]
    fn test_cli_parse_run_defaults() -> Result<()> {
        let args = Cli::parse_from(["starload", "run"]);
        match args.command {
            Commands::Run {
                project_dir,
                start_date,
                full_refresh,
                skip_dimensions,
            } => {
                assert_eq!(project_dir.to_string_lossy(), ".");
                assert_eq!(start_date, None);
                assert!(!full_refresh);
                assert!(!skip_dimensions);
                Ok(())
            }
            _ => bail!("Expected Run command"),
        }
    }

    #[test]
    fn test_cli_parse_run_start_date() -> Result<()> {
        let args = Cli::parse_from([
            "starload",
            "run",
            "--start-date",
            "2013-07-01",
            "--project-dir",
            "/tmp",
        ]);
        match args.command {
            Commands::Run {
                project_dir,
                start_date,
                ..
            } => {
                assert_eq!(project_dir.to_string_lossy(), "/tmp");
                assert_eq!(start_date, NaiveDate::from_ymd_opt(2013, 7, 1));
                Ok(())
            }
            _ => bail!("Expected Run command"),
        }
    }

    #[test]
    fn test_cli_rejects_bad_date() {
        let parsed = Cli::try_parse_from(["starload", "run", "--start-date", "07/01/2013"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_cli_full_refresh_conflicts_with_skip_dimensions() {
        let parsed = Cli::try_parse_from([
            "starload",
            "run",
            "--full-refresh",
            "--skip-dimensions",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_cli_parse_inspect() -> Result<()> {
        let args = Cli::parse_from(["starload", "inspect", "--table", "dim_date", "--limit", "10"]);
        match args.command {
            Commands::Inspect {
                table,
                limit,
                db_path,
            } => {
                assert_eq!(table, "dim_date");
                assert_eq!(limit, 10);
                assert_eq!(db_path, "warehouse.duckdb");
                Ok(())
            }
            _ => bail!("Expected Inspect command"),
        }
    }

    #[test]
    fn test_cli_parse_metrics() -> Result<()> {
        let args = Cli::parse_from(["starload", "metrics", "--fact", "reseller"]);
        match args.command {
            Commands::Metrics { fact, limit, .. } => {
                assert_eq!(FactKind::from(fact), FactKind::ResellerSales);
                assert_eq!(limit, 20);
                Ok(())
            }
            _ => bail!("Expected Metrics command"),
        }
    }
}
