//! CLI 명령어 구현 모듈.

pub mod actions;
pub mod history;
pub mod overview;
pub mod resolve;

use anyhow::{Context, Result};
use chrono::NaiveDate;

use divscope_core::{Instrument, InstrumentQuery};
use divscope_data::MarketDataManager;

/// 출력 형식.
#[derive(Debug, Clone, Copy)]
pub enum OutputFormat {
    Table,
    Json,
}

impl OutputFormat {
    pub fn parse(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "table" => Ok(Self::Table),
            "json" => Ok(Self::Json),
            _ => Err(anyhow::anyhow!("Invalid format: {}. Use: table, json", s)),
        }
    }
}

/// 자유 형식 입력을 단일 종목으로 확정합니다.
///
/// 일치하는 종목이 없으면 오류를 반환합니다.
pub(crate) async fn resolve_input(
    manager: &MarketDataManager,
    input: &str,
) -> Result<Instrument> {
    let query = InstrumentQuery::parse(input);
    manager
        .resolve(&query)
        .await
        .with_context(|| format!("종목 확정 실패: {}", input))?
        .ok_or_else(|| anyhow::anyhow!("일치하는 종목이 없습니다: {}", input))
}

/// YYYY-MM-DD 형식 날짜를 파싱합니다.
pub(crate) fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("날짜 형식이 올바르지 않습니다 (YYYY-MM-DD): {}", s))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_parse() {
        assert!(matches!(
            OutputFormat::parse("table"),
            Ok(OutputFormat::Table)
        ));
        assert!(matches!(OutputFormat::parse("JSON"), Ok(OutputFormat::Json)));
        assert!(OutputFormat::parse("csv").is_err());
    }

    #[test]
    fn test_parse_date() {
        let date = parse_date("2024-04-30").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 4, 30).unwrap());
        assert!(parse_date("20240430").is_err());
        assert!(parse_date("2024-13-01").is_err());
    }
}
