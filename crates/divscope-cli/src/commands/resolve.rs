//! 종목 확정/검색 명령.

use anyhow::{Context, Result};
use tracing::info;

use divscope_core::{Instrument, InstrumentQuery};
use divscope_data::MarketDataManager;

use super::OutputFormat;

/// 입력을 종목으로 확정해 출력합니다.
pub async fn run_resolve(
    manager: &MarketDataManager,
    input: &str,
    format: OutputFormat,
) -> Result<()> {
    let query = InstrumentQuery::parse(input);
    info!(query = %query, "종목 확정 시작");

    let resolved = manager
        .resolve(&query)
        .await
        .with_context(|| format!("종목 확정 실패: {}", input))?;

    match resolved {
        Some(instrument) => print_instruments(&[instrument], format)?,
        None => println!("일치하는 종목이 없습니다: {}", input),
    }

    Ok(())
}

/// 국내 종목 이름을 부분 일치로 검색해 출력합니다.
pub async fn run_search(
    manager: &MarketDataManager,
    fragment: &str,
    format: OutputFormat,
) -> Result<()> {
    info!(fragment = fragment, "이름 검색 시작");

    let results = manager
        .search_domestic(fragment)
        .await
        .with_context(|| format!("이름 검색 실패: {}", fragment))?;

    if results.is_empty() {
        println!("일치하는 종목이 없습니다: {}", fragment);
        return Ok(());
    }

    print_instruments(&results, format)
}

/// 종목 목록을 표 또는 JSON으로 출력합니다.
fn print_instruments(instruments: &[Instrument], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(instruments)?);
        }
        OutputFormat::Table => {
            println!("{:<16} {:<10} {:<14} 이름", "소스", "코드", "표준코드");
            for instrument in instruments {
                println!(
                    "{:<16} {:<10} {:<14} {}",
                    instrument.source,
                    instrument.primary_code,
                    instrument.standard_code.as_deref().unwrap_or("-"),
                    instrument.display_name
                );
            }
            println!("\n총 {} 건", instruments.len());
        }
    }

    Ok(())
}
