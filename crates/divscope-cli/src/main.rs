//! 배당 데이터 조회 CLI.
//!
//! # 사용 예시
//!
//! ```bash
//! # 종목 확정 (코드/이름/티커 자동 분류)
//! divscope resolve 005930
//! divscope resolve 삼성전자
//! divscope resolve AAPL
//!
//! # 국내 종목 이름 검색
//! divscope search 배당
//!
//! # 배당/분배 내역 조회
//! divscope actions 005930 --year 2023
//! divscope actions 466920 --from 2024-01-01 --to 2024-12-31
//! divscope actions SCHD --lookback 2y
//!
//! # 해외 시세/요약/종합 조회
//! divscope history AAPL --lookback 1y
//! divscope profile AAPL
//! divscope overview AAPL
//! ```

use clap::{Parser, Subcommand};
use tracing::error;

use divscope_core::{init_logging, AppConfig, LogConfig, LogFormat};
use divscope_data::MarketDataManager;

mod commands;

use commands::actions::ActionsArgs;
use commands::OutputFormat;

#[derive(Parser)]
#[command(name = "divscope")]
#[command(about = "배당 데이터 조회 CLI - 공시/거래소/해외 시세 통합", long_about = None)]
#[command(version)]
struct Cli {
    /// 설정 파일 경로
    #[arg(short, long, default_value = "config/default.toml")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 입력을 종목으로 확정 (6자리 코드, 한글 이름, 해외 티커 자동 분류)
    Resolve {
        /// 종목 코드/이름/티커 (예: 005930, 삼성전자, AAPL)
        input: String,

        /// 출력 형식 (table, json)
        #[arg(short, long, default_value = "table")]
        format: String,
    },

    /// 국내 종목 이름 부분 일치 검색
    Search {
        /// 검색할 이름 조각
        fragment: String,

        /// 출력 형식 (table, json)
        #[arg(short, long, default_value = "table")]
        format: String,
    },

    /// 배당/분배 내역 조회
    Actions {
        /// 종목 코드/이름/티커
        input: String,

        /// 사업연도 (국내 주식, 기본: 직전 연도)
        #[arg(short, long)]
        year: Option<i32>,

        /// 보고서 기간 (annual, semiannual, q1, q3)
        #[arg(short, long, default_value = "annual")]
        period: String,

        /// 분배금 조회 시작일 (YYYY-MM-DD, 국내 ETF 전용)
        #[arg(long)]
        from: Option<String>,

        /// 분배금 조회 종료일 (YYYY-MM-DD, 국내 ETF 전용)
        #[arg(long)]
        to: Option<String>,

        /// 조회 구간 (1mo, 3mo, 6mo, 1y, 2y, 5y / 해외, ETF 기본 범위)
        #[arg(short, long, default_value = "1y")]
        lookback: String,

        /// 정규화 전 공시 원본 표 출력 (국내 주식 전용)
        #[arg(long, default_value = "false")]
        full: bool,

        /// 출력 형식 (table, json)
        #[arg(short, long, default_value = "table")]
        format: String,
    },

    /// 해외 종목 일별 시세 조회
    History {
        /// 종목 코드/이름/티커
        input: String,

        /// 조회 구간 (1mo, 3mo, 6mo, 1y, 2y, 5y)
        #[arg(short, long, default_value = "1y")]
        lookback: String,

        /// 마지막 n개 바만 표로 출력 (0 = 전체)
        #[arg(short, long, default_value = "10")]
        tail: usize,

        /// 출력 형식 (table, json)
        #[arg(short, long, default_value = "table")]
        format: String,
    },

    /// 해외 종목 요약 정보 조회
    Profile {
        /// 종목 코드/이름/티커
        input: String,
    },

    /// 해외 종목 종합 조회 (요약 + 시세 + 배당)
    Overview {
        /// 종목 코드/이름/티커
        input: String,

        /// 조회 구간 (1mo, 3mo, 6mo, 1y, 2y, 5y)
        #[arg(short, long, default_value = "1y")]
        lookback: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // .env 파일이 있으면 환경 변수로 로드 (DART_API_KEY 등)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let config = AppConfig::load(&cli.config)?;

    let log_format = config
        .logging
        .format
        .parse()
        .unwrap_or(LogFormat::Pretty);
    init_logging(LogConfig::new(config.logging.level.clone()).with_format(log_format))?;

    let manager = MarketDataManager::new(config)?;

    match cli.command {
        Commands::Resolve { input, format } => {
            let format = OutputFormat::parse(&format)?;

            if let Err(e) = commands::resolve::run_resolve(&manager, &input, format).await {
                error!("Resolve failed: {}", e);
                return Err(e.into());
            }
        }

        Commands::Search { fragment, format } => {
            let format = OutputFormat::parse(&format)?;

            if let Err(e) = commands::resolve::run_search(&manager, &fragment, format).await {
                error!("Search failed: {}", e);
                return Err(e.into());
            }
        }

        Commands::Actions {
            input,
            year,
            period,
            from,
            to,
            lookback,
            full,
            format,
        } => {
            let args = ActionsArgs {
                input,
                year,
                period,
                from,
                to,
                lookback,
                full,
                format: OutputFormat::parse(&format)?,
            };

            if let Err(e) = commands::actions::run_actions(&manager, args).await {
                error!("Actions lookup failed: {}", e);
                return Err(e.into());
            }
        }

        Commands::History {
            input,
            lookback,
            tail,
            format,
        } => {
            let format = OutputFormat::parse(&format)?;

            if let Err(e) =
                commands::history::run_history(&manager, &input, &lookback, tail, format).await
            {
                error!("History lookup failed: {}", e);
                return Err(e.into());
            }
        }

        Commands::Profile { input } => {
            if let Err(e) = commands::overview::run_profile(&manager, &input).await {
                error!("Profile lookup failed: {}", e);
                return Err(e.into());
            }
        }

        Commands::Overview { input, lookback } => {
            if let Err(e) = commands::overview::run_overview(&manager, &input, &lookback).await {
                error!("Overview failed: {}", e);
                return Err(e.into());
            }
        }
    }

    Ok(())
}
