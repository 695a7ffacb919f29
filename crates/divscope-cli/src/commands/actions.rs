//! 배당/분배 내역 조회 명령.

use anyhow::{Context, Result};
use tracing::info;

use divscope_core::{CorporateActionQuery, CorporateActionRecord, Instrument, ReportPeriod};
use divscope_data::provider::dart::field_label;
use divscope_data::{AllotmentRow, MarketDataManager};

use super::{parse_date, resolve_input, OutputFormat};

/// actions 명령 인자.
#[derive(Debug)]
pub struct ActionsArgs {
    /// 종목 코드/이름/티커
    pub input: String,
    /// 사업연도
    pub year: Option<i32>,
    /// 보고서 기간
    pub period: String,
    /// 분배금 조회 시작일
    pub from: Option<String>,
    /// 분배금 조회 종료일
    pub to: Option<String>,
    /// 조회 구간
    pub lookback: String,
    /// 공시 원본 표 출력 여부
    pub full: bool,
    /// 출력 형식
    pub format: OutputFormat,
}

/// 배당/분배 내역을 조회해 출력합니다.
pub async fn run_actions(manager: &MarketDataManager, args: ActionsArgs) -> Result<()> {
    let instrument = resolve_input(manager, &args.input).await?;

    let mut query = CorporateActionQuery::default()
        .with_report_period(args.period.parse::<ReportPeriod>()?)
        .with_lookback(args.lookback.parse()?);
    if let Some(year) = args.year {
        query.fiscal_year = year;
    }
    if let (Some(from), Some(to)) = (&args.from, &args.to) {
        query = query.with_range(parse_date(from)?, parse_date(to)?);
    }

    info!(instrument = %instrument, fiscal_year = query.fiscal_year, "배당/분배 조회 시작");

    if args.full {
        let rows = manager
            .get_allotment_report(&instrument, &query)
            .await
            .with_context(|| format!("공시 원본 조회 실패: {}", instrument))?;
        print_allotment_table(&instrument, &rows);
        return Ok(());
    }

    let records = manager
        .get_corporate_actions(&instrument, &query)
        .await
        .with_context(|| format!("배당/분배 조회 실패: {}", instrument))?;

    if records.is_empty() {
        println!("조회 기간 내 배당/분배 내역이 없습니다: {}", instrument);
        return Ok(());
    }

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&records)?),
        OutputFormat::Table => print_records_table(&instrument, &records),
    }

    Ok(())
}

/// 정규화된 레코드를 표로 출력합니다.
fn print_records_table(instrument: &Instrument, records: &[CorporateActionRecord]) {
    println!("\n{} 배당/분배 내역", instrument);
    println!("{:<12} {:<10} {:>14} 지급일", "기간", "종류", "금액");

    for record in records {
        let class = record.security_class.as_deref().unwrap_or("-");
        let amount = record
            .amount
            .map(|a| a.to_string())
            .unwrap_or_else(|| "-".to_string());
        let payment = record
            .payment_date
            .map(|d| d.to_string())
            .unwrap_or_else(|| "-".to_string());

        println!(
            "{:<12} {:<10} {:>14} {}",
            record.period_label, class, amount, payment
        );
    }

    println!("\n총 {} 건", records.len());
}

/// 공시 원본 행을 항목별 표로 출력합니다.
fn print_allotment_table(instrument: &Instrument, rows: &[AllotmentRow]) {
    if rows.is_empty() {
        println!("조회 기간 내 공시 행이 없습니다: {}", instrument);
        return;
    }

    println!("\n{} 배당에 관한 사항 (공시 원본)", instrument);
    println!(
        "{:<28} {:<10} {:>14} {:>14} {:>14}",
        field_label("se").unwrap_or("se"),
        field_label("stock_knd").unwrap_or("stock_knd"),
        field_label("thstrm").unwrap_or("thstrm"),
        field_label("frmtrm").unwrap_or("frmtrm"),
        field_label("lwfr").unwrap_or("lwfr"),
    );

    for row in rows {
        println!(
            "{:<28} {:<10} {:>14} {:>14} {:>14}",
            row.se,
            row.stock_knd.as_deref().unwrap_or("-"),
            row.thstrm.as_deref().unwrap_or("-"),
            row.frmtrm.as_deref().unwrap_or("-"),
            row.lwfr.as_deref().unwrap_or("-"),
        );
    }

    println!("\n총 {} 행", rows.len());
}
