//! 해외 종목 일별 시세 조회 명령.

use anyhow::{Context, Result};
use tracing::info;

use divscope_core::{Instrument, PriceBar};
use divscope_data::MarketDataManager;

use super::{resolve_input, OutputFormat};

/// 일별 시세를 조회해 출력합니다.
pub async fn run_history(
    manager: &MarketDataManager,
    input: &str,
    lookback: &str,
    tail: usize,
    format: OutputFormat,
) -> Result<()> {
    let instrument = resolve_input(manager, input).await?;
    let lookback = lookback.parse()?;

    info!(instrument = %instrument, lookback = %lookback, "시세 조회 시작");

    let bars = manager
        .get_price_history(&instrument, lookback)
        .await
        .with_context(|| format!("시세 조회 실패: {}", instrument))?;

    if bars.is_empty() {
        println!("조회 구간 내 시세가 없습니다: {}", instrument);
        return Ok(());
    }

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&bars)?),
        OutputFormat::Table => print_bars_table(&instrument, &bars, tail),
    }

    Ok(())
}

/// 시세 바를 표로 출력합니다. `tail`이 0이면 전체를 출력합니다.
fn print_bars_table(instrument: &Instrument, bars: &[PriceBar], tail: usize) {
    let first = &bars[0];
    let last = &bars[bars.len() - 1];
    println!("\n{} 일별 시세 ({} ~ {})", instrument, first.date, last.date);
    println!(
        "{:<12} {:>10} {:>10} {:>10} {:>10} {:>12} {:>8}",
        "날짜", "시가", "고가", "저가", "종가", "거래량", "등락%"
    );

    let start = if tail == 0 || tail >= bars.len() {
        0
    } else {
        bars.len() - tail
    };

    for bar in &bars[start..] {
        let change = bar
            .change_pct()
            .map(|c| c.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<12} {:>10} {:>10} {:>10} {:>10} {:>12} {:>8}",
            bar.date, bar.open, bar.high, bar.low, bar.close, bar.volume, change
        );
    }

    if start > 0 {
        println!("\n... 전체 {} 개 중 마지막 {} 개", bars.len(), bars.len() - start);
    } else {
        println!("\n총 {} 개", bars.len());
    }
}
