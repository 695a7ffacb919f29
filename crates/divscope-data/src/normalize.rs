//! 정규화 레이어.
//!
//! 소스별 원본 행을 공통 도메인 모델로 변환합니다. 모든 함수는 I/O가 없는
//! 순수 변환입니다.
//!
//! # 변환 규칙
//!
//! - 선택 필드가 없으면 기본값을 채우지 않고 None으로 둡니다.
//!   0으로 채우면 실제 데이터와 구분할 수 없습니다.
//! - 가격 바는 날짜 오름차순으로 정렬해 반환합니다.
//! - OHLC 범위 불변식 위반은 경고로 표면화하되 값을 고치지 않습니다.

use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::warn;

use divscope_core::{
    CorporateActionRecord, DirectoryEntry, Instrument, InstrumentSource, PeriodLabel, PriceBar,
};

use crate::provider::dart::AllotmentRow;
use crate::provider::krx::{DistributionRow, EtfListingRow};
use crate::provider::yahoo::{ForeignDividend, ForeignQuoteMatch, RawBar};

// ============================================================================
// 수치/날짜 강제 변환
// ============================================================================

/// 로캘 서식 숫자 문자열을 Decimal로 변환.
///
/// 천 단위 쉼표를 제거한 뒤 파싱합니다. 비어 있거나 `-` 같은 무값 표기,
/// `N/A` 같은 파싱 불가 문자열은 None입니다. 필드 하나가 깨졌다고
/// 행 전체를 버리지 않기 위한 규칙입니다.
pub fn parse_amount_opt(raw: &str) -> Option<Decimal> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "-" {
        return None;
    }
    let cleaned = trimmed.replace(',', "");
    Decimal::from_str(&cleaned).ok()
}

/// 소스별 날짜 표기 파싱.
///
/// YYYYMMDD, YYYY/MM/DD, YYYY-MM-DD, YYYY.MM.DD 네 가지 표기를 받습니다.
pub fn parse_date_flexible(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "-" {
        return None;
    }

    const FORMATS: [&str; 4] = ["%Y%m%d", "%Y/%m/%d", "%Y-%m-%d", "%Y.%m.%d"];
    FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
}

// ============================================================================
// Instrument 변환
// ============================================================================

/// 기업 디렉토리 항목을 Instrument로 변환.
///
/// 상장 종목 코드가 없는 항목은 조회 대상이 아니므로 None입니다.
pub fn instrument_from_corp_entry(entry: &DirectoryEntry) -> Option<Instrument> {
    let ticker = entry.ticker.as_deref().map(str::trim).filter(|t| !t.is_empty())?;
    Some(Instrument::new(
        InstrumentSource::DomesticEquity,
        ticker,
        &entry.name,
    ))
}

/// ETF 목록 행을 Instrument로 변환.
pub fn instrument_from_etf_listing(row: &EtfListingRow) -> Instrument {
    Instrument::new(InstrumentSource::DomesticEtf, &row.short_code, &row.name)
        .with_standard_code(&row.standard_code)
}

/// ETF 목록 행을 디렉토리 항목으로 변환.
pub fn entry_from_etf_listing(row: &EtfListingRow) -> DirectoryEntry {
    DirectoryEntry::new(&row.short_code, &row.name)
        .with_ticker(&row.short_code)
        .with_standard_code(&row.standard_code)
}

/// Yahoo 검색 결과를 Instrument로 변환.
///
/// quote type이 ETF면 해외 ETF, 그 외에는 해외 주식으로 취급합니다.
pub fn instrument_from_quote_match(item: &ForeignQuoteMatch) -> Instrument {
    let source = if item.quote_type.eq_ignore_ascii_case("ETF") {
        InstrumentSource::ForeignEtf
    } else {
        InstrumentSource::ForeignEquity
    };
    let name = if item.name.is_empty() {
        item.symbol.clone()
    } else {
        item.name.clone()
    };
    Instrument::new(source, &item.symbol, name)
}

// ============================================================================
// CorporateActionRecord 변환
// ============================================================================

/// 배당 보고서의 주당 현금배당 행인지 확인.
fn is_cash_dividend_row(row: &AllotmentRow) -> bool {
    row.se.contains("현금배당금") && row.se.contains("주당")
}

/// DART 배당 보고서 행을 레코드로 변환.
///
/// 주당 현금배당 행만 취해 당기/전기/전전기 세 기간으로 펼칩니다.
/// 금액도 지급일도 없는 기간은 건너뜁니다.
pub fn actions_from_allotment(rows: &[AllotmentRow]) -> Vec<CorporateActionRecord> {
    let mut records = Vec::new();

    for row in rows.iter().filter(|r| is_cash_dividend_row(r)) {
        let periods = [
            (PeriodLabel::Current, &row.thstrm, &row.thstrm_dt),
            (PeriodLabel::Prior, &row.frmtrm, &row.frmtrm_dt),
            (PeriodLabel::PriorPrior, &row.lwfr, &row.lwfr_dt),
        ];

        for (label, value, date) in periods {
            let amount = value.as_deref().and_then(parse_amount_opt);
            let payment_date = date.as_deref().and_then(parse_date_flexible);
            if amount.is_none() && payment_date.is_none() {
                continue;
            }

            let mut record = CorporateActionRecord::new(label)
                .with_amount(amount)
                .with_payment_date(payment_date);
            if let Some(class) = row.stock_knd.as_deref().map(str::trim) {
                if !class.is_empty() {
                    record = record.with_security_class(class);
                }
            }
            records.push(record);
        }
    }

    records
}

/// KRX 분배금 행을 레코드로 변환.
///
/// 지급일이 없으면 기준일을 라벨 날짜로 대신 사용하고,
/// 둘 다 없는 행은 라벨을 만들 수 없어 건너뜁니다.
pub fn actions_from_distributions(rows: &[DistributionRow]) -> Vec<CorporateActionRecord> {
    let mut records = Vec::new();

    for row in rows {
        let label_date = match row.payment_date.or(row.record_date) {
            Some(date) => date,
            None => {
                warn!(code = %row.code, "분배금 행에 날짜 없음, 건너뜀");
                continue;
            }
        };

        records.push(
            CorporateActionRecord::new(PeriodLabel::Payment(label_date))
                .with_amount(row.amount)
                .with_payment_date(row.payment_date),
        );
    }

    records
}

/// 해외 배당 시계열을 레코드로 변환.
pub fn actions_from_foreign_dividends(series: &[ForeignDividend]) -> Vec<CorporateActionRecord> {
    let mut records: Vec<CorporateActionRecord> = series
        .iter()
        .map(|div| {
            CorporateActionRecord::new(PeriodLabel::Payment(div.date))
                .with_amount(Some(div.amount))
                .with_payment_date(Some(div.date))
        })
        .collect();
    records.sort_by_key(|r| r.payment_date);
    records
}

// ============================================================================
// PriceBar 변환
// ============================================================================

/// 원본 시세 행을 가격 바 시퀀스로 변환.
///
/// 날짜 오름차순으로 정렬합니다. 타임스탬프나 가격이 변환 불가한 행은
/// 건너뛰고, OHLC 범위가 깨진 바는 경고만 남깁니다.
pub fn to_price_bars(raw: &[RawBar]) -> Vec<PriceBar> {
    let mut bars = Vec::with_capacity(raw.len());

    for row in raw {
        let date = match chrono::DateTime::from_timestamp(row.timestamp, 0) {
            Some(dt) => dt.date_naive(),
            None => continue,
        };
        let (open, high, low, close) = match (
            Decimal::from_f64_retain(row.open),
            Decimal::from_f64_retain(row.high),
            Decimal::from_f64_retain(row.low),
            Decimal::from_f64_retain(row.close),
        ) {
            (Some(o), Some(h), Some(l), Some(c)) => {
                (o.round_dp(4), h.round_dp(4), l.round_dp(4), c.round_dp(4))
            }
            _ => continue,
        };

        let bar = PriceBar {
            date,
            open,
            high,
            low,
            close,
            volume: row.volume,
        };
        if !bar.is_coherent() {
            warn!(date = %bar.date, "OHLC 범위 불변식 위반 바 수신");
        }
        bars.push(bar);
    }

    bars.sort_by_key(|b| b.date);
    bars
}
