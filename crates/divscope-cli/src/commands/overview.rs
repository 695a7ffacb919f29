//! 해외 종목 요약/종합 조회 명령.

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use tracing::{info, warn};

use divscope_core::{CorporateActionQuery, InstrumentProfile};
use divscope_data::MarketDataManager;

use super::resolve_input;

/// 요약 정보를 조회해 출력합니다.
pub async fn run_profile(manager: &MarketDataManager, input: &str) -> Result<()> {
    let instrument = resolve_input(manager, input).await?;

    info!(instrument = %instrument, "요약 정보 조회 시작");

    let profile = manager
        .get_profile(&instrument)
        .await
        .with_context(|| format!("요약 정보 조회 실패: {}", instrument))?;

    println!("\n=== {} ===", instrument);
    print_profile(&profile);

    Ok(())
}

/// 요약/시세/배당을 한 번에 조회해 출력합니다.
///
/// 소스별 조회가 일부 실패해도 성공한 항목은 그대로 출력합니다.
pub async fn run_overview(
    manager: &MarketDataManager,
    input: &str,
    lookback: &str,
) -> Result<()> {
    let instrument = resolve_input(manager, input).await?;
    let query = CorporateActionQuery::default().with_lookback(lookback.parse()?);

    info!(instrument = %instrument, "종합 조회 시작");

    let overview = manager.get_overview(&instrument, &query).await;

    println!("\n=== {} ===", overview.instrument);

    match overview.profile {
        Ok(profile) => print_profile(&profile),
        Err(e) => {
            warn!(error = %e, "요약 정보 조회 실패");
            println!("⚠️  요약 정보를 가져오지 못했습니다: {}", e);
        }
    }

    match overview.bars {
        Ok(bars) if bars.is_empty() => println!("\n시세: 조회 구간 내 데이터 없음"),
        Ok(bars) => {
            let first = &bars[0];
            let last = &bars[bars.len() - 1];
            println!(
                "\n시세: {} 개 바 ({} ~ {}), 종가 {} → {}",
                bars.len(),
                first.date,
                last.date,
                first.close,
                last.close
            );
        }
        Err(e) => {
            warn!(error = %e, "시세 조회 실패");
            println!("\n⚠️  시세를 가져오지 못했습니다: {}", e);
        }
    }

    match overview.actions {
        Ok(actions) if actions.is_empty() => println!("배당: 조회 구간 내 내역 없음"),
        Ok(actions) => {
            println!("배당: {} 건", actions.len());
            for record in &actions {
                let amount = record
                    .amount
                    .map(|a| a.to_string())
                    .unwrap_or_else(|| "-".to_string());
                println!("  {} {}", record.period_label, amount);
            }
        }
        Err(e) => {
            warn!(error = %e, "배당 이력 조회 실패");
            println!("⚠️  배당 이력을 가져오지 못했습니다: {}", e);
        }
    }

    Ok(())
}

/// 요약 정보 블록을 출력합니다.
fn print_profile(profile: &InstrumentProfile) {
    if let Some(name) = &profile.name {
        println!("이름: {}", name);
    }
    if let Some(price) = profile.current_price {
        let currency = profile.currency.as_deref().unwrap_or("");
        println!("현재가: {} {}", price, currency);
    }
    match profile.dividend_yield_pct() {
        Some(pct) => println!("배당수익률: {}%", pct),
        None => println!("배당수익률: 미제공"),
    }
    if let Some(market_cap) = profile.market_cap {
        println!("시가총액: {}", format_market_cap(market_cap));
    }
}

/// 시가총액을 천 단위 구분 기호가 있는 문자열로 변환합니다.
fn format_market_cap(value: Decimal) -> String {
    let raw = value.trunc().to_string();
    let (sign, digits) = match raw.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", raw.as_str()),
    };

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!("{}{}", sign, grouped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_format_market_cap() {
        assert_eq!(format_market_cap(dec!(3450000000000)), "3,450,000,000,000");
        assert_eq!(format_market_cap(dec!(950)), "950");
        assert_eq!(format_market_cap(dec!(1000)), "1,000");
        assert_eq!(format_market_cap(dec!(-25000)), "-25,000");
    }
}
