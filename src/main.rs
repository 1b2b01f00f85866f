// ==========================================
// 车队司机评分系统 - 命令行入口
// ==========================================
// 工具: clap derive 解析子命令
// 选项: --json-logs 日志以 JSON 输出到 stderr
// 数据库: FLEET_SCORECARD_DB_PATH 或用户数据目录
// ==========================================

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use fleet_scorecard::api::ScorecardApi;
use fleet_scorecard::config::resolve_db_path;
use fleet_scorecard::domain::PipelineStage;
use fleet_scorecard::importer::load_bundle_from_dir;
use fleet_scorecard::{logging, RunReport, APP_NAME, VERSION};
use serde_json::json;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "fleet-scorecard", about = "车队司机月度绩效评分流水线", version)]
struct Cli {
    /// 日志以 JSON 输出到 stderr
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Command {
    /// 导入 CSV 目录中的原始数据并运行完整流水线
    Import {
        year: i32,
        month: u32,
        csv_dir: PathBuf,
    },
    /// 基于已导入的原始数据重新计算
    Recalc { year: i32, month: u32 },
    /// 输出月度评分卡
    Show { year: i32, month: u32 },
    /// 单独执行一个阶段
    Stage {
        #[arg(value_parser = parse_stage)]
        stage: PipelineStage,
        month_run_id: String,
    },
}

fn parse_stage(raw: &str) -> Result<PipelineStage, String> {
    PipelineStage::parse(raw).ok_or_else(|| {
        let names: Vec<String> = PipelineStage::ORDERED.iter().map(|s| s.to_string()).collect();
        format!("未知阶段 '{}'，可选: {}", raw, names.join(", "))
    })
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.json_logs);

    tracing::info!("{} v{}", APP_NAME, VERSION);

    match run(cli.command) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(2),
        Err(e) => {
            tracing::error!(error = %e, "执行失败");
            eprintln!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// 返回 Ok(false) 表示运行报告中存在失败阶段
fn run(command: Command) -> Result<bool> {
    let db_path = resolve_db_path()?;
    tracing::info!("使用数据库: {}", db_path);
    let api = ScorecardApi::new(&db_path)?;

    match command {
        Command::Import {
            year,
            month,
            csv_dir,
        } => {
            let bundle = load_bundle_from_dir(&csv_dir)
                .with_context(|| format!("读取 CSV 目录失败: {}", csv_dir.display()))?;
            let report = api.import_month(year, month, &bundle)?;
            print_report(&report)
        }
        Command::Recalc { year, month } => {
            let report = api.recalculate(year, month)?;
            print_report(&report)
        }
        Command::Show { year, month } => {
            let view = api.get_scorecard(year, month)?;
            println!("{}", serde_json::to_string_pretty(&view)?);
            Ok(true)
        }
        Command::Stage {
            stage,
            month_run_id,
        } => {
            let response = api.invoke_stage(stage, &json!({ "month_run_id": month_run_id }));
            println!("{}", serde_json::to_string_pretty(&response)?);
            Ok(response.get("error").is_none())
        }
    }
}

fn print_report(report: &RunReport) -> Result<bool> {
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(report.is_success())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_command_with_global_flag() {
        let cli = Cli::try_parse_from(["fleet-scorecard", "--json-logs", "stage", "fpd", "abc"])
            .unwrap();
        assert!(cli.json_logs);
        assert_eq!(
            cli.command,
            Command::Stage {
                stage: PipelineStage::Fpd,
                month_run_id: "abc".to_string(),
            }
        );

        // 全局选项也可放在子命令之后
        let cli = Cli::try_parse_from(["fleet-scorecard", "recalc", "2024", "5", "--json-logs"])
            .unwrap();
        assert!(cli.json_logs);
        assert_eq!(cli.command, Command::Recalc { year: 2024, month: 5 });
    }

    #[test]
    fn test_import_command_takes_typed_arguments() {
        let cli = Cli::try_parse_from(["fleet-scorecard", "import", "2024", "5", "data/may"])
            .unwrap();
        assert!(!cli.json_logs);
        assert_eq!(
            cli.command,
            Command::Import {
                year: 2024,
                month: 5,
                csv_dir: PathBuf::from("data/may"),
            }
        );
    }

    #[test]
    fn test_invalid_arguments_are_rejected() {
        assert!(Cli::try_parse_from(["fleet-scorecard", "stage", "bogus", "abc"]).is_err());
        assert!(Cli::try_parse_from(["fleet-scorecard", "show", "2024", "May"]).is_err());
        assert!(Cli::try_parse_from(["fleet-scorecard", "show", "2024"]).is_err());
        assert!(Cli::try_parse_from(["fleet-scorecard"]).is_err());
        assert!(parse_stage(" team_performance ").is_ok());
    }
}
