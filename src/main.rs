// ==========================================
// 五险一金计算系统 - 命令行主入口
// ==========================================
// 命令: upload-cities / upload-salaries / calculate / results
// 输出: 默认文本, --json 输出完整 ApiResponse
// ==========================================

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use social_insurance_calc::api::ApiResponse;
use social_insurance_calc::app::{get_default_db_path, AppState};
use social_insurance_calc::domain::ContributionResult;
use social_insurance_calc::logging;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "social-insurance-calc")]
#[command(about = "Social insurance contribution calculator: upload spreadsheets, compute company fees")]
#[command(version)]
struct Cli {
    /// SQLite database path (defaults to SOCIAL_INSURANCE_DB_PATH or the user data directory)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Print the raw API response as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload a city standards spreadsheet (.xlsx, .xls, .csv)
    UploadCities {
        file: PathBuf,
    },
    /// Upload an employee salary spreadsheet (.xlsx, .xls, .csv)
    UploadSalaries {
        file: PathBuf,
    },
    /// Aggregate salaries and append contribution results
    Calculate,
    /// List the most recent contribution results
    Results {
        /// Maximum number of rows to show
        #[arg(long, default_value_t = 50)]
        limit: usize,
    },
}

fn read_upload(file: &Path) -> Result<(String, Vec<u8>)> {
    let bytes = std::fs::read(file).with_context(|| format!("cannot read {}", file.display()))?;
    let file_name = file
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    Ok((file_name, bytes))
}

/// 打印响应并返回是否成功
fn report<T: Serialize>(resp: &ApiResponse<T>, json: bool) -> Result<bool> {
    if json {
        println!("{}", serde_json::to_string_pretty(resp)?);
        return Ok(resp.success);
    }

    if resp.success {
        println!("✅ {}", resp.message);
    } else {
        println!("❌ {}", resp.message);
    }
    if let Some(error) = &resp.error {
        println!("   {}", error);
    }
    Ok(resp.success)
}

fn print_row_errors(errors: &[String]) {
    if errors.is_empty() {
        return;
    }
    println!("\n⚠️  Skipped rows:");
    for error in errors {
        println!("   - {}", error);
    }
}

fn print_results(results: &[ContributionResult]) {
    if results.is_empty() {
        println!("No results yet, run `calculate` first.");
        return;
    }
    println!(
        "{:<12} {:<8} {:>12} {:>14} {:>8} {:>12}  {}",
        "employee", "city", "avg_salary", "base", "rate", "company_fee", "calculated_at"
    );
    for r in results {
        println!(
            "{:<12} {:<8} {:>12} {:>14} {:>8} {:>12}  {}",
            r.employee_name,
            r.city_name,
            r.avg_salary,
            r.contribution_base,
            r.rate,
            r.company_fee,
            r.calculated_at.format("%Y-%m-%d %H:%M:%S")
        );
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.log_json {
        logging::init_json();
    } else {
        logging::init();
    }

    let db_path = cli
        .db
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(get_default_db_path);
    tracing::info!(version = social_insurance_calc::VERSION, db_path = %db_path, "启动");

    let state = AppState::new(db_path).map_err(anyhow::Error::msg)?;

    let ok = match cli.command {
        Commands::UploadCities { file } => {
            let (file_name, bytes) = read_upload(&file)?;
            let resp = state.upload_api.upload_cities(&file_name, &bytes).await;
            let ok = report(&resp, cli.json)?;
            if let (false, Some(outcome)) = (cli.json, &resp.data) {
                print_row_errors(&outcome.errors);
            }
            ok
        }
        Commands::UploadSalaries { file } => {
            let (file_name, bytes) = read_upload(&file)?;
            let resp = state.upload_api.upload_salaries(&file_name, &bytes).await;
            let ok = report(&resp, cli.json)?;
            if let (false, Some(outcome)) = (cli.json, &resp.data) {
                print_row_errors(&outcome.errors);
            }
            ok
        }
        Commands::Calculate => {
            let resp = state.calculation_api.calculate().await;
            report(&resp, cli.json)?
        }
        Commands::Results { limit } => {
            let results = state.calculation_api.list_results(limit).await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&results)?);
            } else {
                print_results(&results);
            }
            true
        }
    };

    if !ok {
        std::process::exit(1);
    }
    Ok(())
}
