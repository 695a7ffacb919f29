//! 보고서 기간 및 조회 기간 정의.
//!
//! 이 모듈은 조회 기간 관련 타입을 정의합니다:
//! - `ReportPeriod` - 국내 공시 보고서 기간 (사업/반기/분기)
//! - `LookbackPeriod` - 해외 시세 조회 구간 (1개월 ~ 5년)

use crate::error::FetchError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 국내 공시 보고서 기간.
///
/// 제공자는 기간을 5자리 보고서 코드로 식별합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportPeriod {
    /// 사업보고서 (연간)
    Annual,
    /// 반기보고서
    SemiAnnual,
    /// 1분기보고서
    FirstQuarter,
    /// 3분기보고서
    ThirdQuarter,
}

impl ReportPeriod {
    /// 제공자 보고서 코드를 반환합니다.
    pub fn to_report_code(&self) -> &'static str {
        match self {
            ReportPeriod::Annual => "11011",
            ReportPeriod::SemiAnnual => "11012",
            ReportPeriod::FirstQuarter => "11013",
            ReportPeriod::ThirdQuarter => "11014",
        }
    }

    /// 이 기간의 표시 이름을 반환합니다.
    pub fn display_name(&self) -> &'static str {
        match self {
            ReportPeriod::Annual => "사업보고서",
            ReportPeriod::SemiAnnual => "반기보고서",
            ReportPeriod::FirstQuarter => "1분기보고서",
            ReportPeriod::ThirdQuarter => "3분기보고서",
        }
    }
}

impl Default for ReportPeriod {
    fn default() -> Self {
        ReportPeriod::Annual
    }
}

impl fmt::Display for ReportPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for ReportPeriod {
    type Err = FetchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "annual" | "year" | "11011" => Ok(ReportPeriod::Annual),
            "semiannual" | "half" | "11012" => Ok(ReportPeriod::SemiAnnual),
            "q1" | "11013" => Ok(ReportPeriod::FirstQuarter),
            "q3" | "11014" => Ok(ReportPeriod::ThirdQuarter),
            _ => Err(FetchError::Validation(format!(
                "알 수 없는 보고서 기간: {} (annual, semiannual, q1, q3 지원)",
                s
            ))),
        }
    }
}

/// 해외 시세 조회 구간.
///
/// 제공자가 허용하는 고정 토큰 집합만 지원합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LookbackPeriod {
    /// 1개월
    M1,
    /// 3개월
    M3,
    /// 6개월
    M6,
    /// 1년
    Y1,
    /// 2년
    Y2,
    /// 5년
    Y5,
}

impl LookbackPeriod {
    /// 제공자 구간 토큰을 반환합니다.
    pub fn to_range_token(&self) -> &'static str {
        match self {
            LookbackPeriod::M1 => "1mo",
            LookbackPeriod::M3 => "3mo",
            LookbackPeriod::M6 => "6mo",
            LookbackPeriod::Y1 => "1y",
            LookbackPeriod::Y2 => "2y",
            LookbackPeriod::Y5 => "5y",
        }
    }

    /// 이 구간의 근사 일수를 반환합니다.
    ///
    /// 국내 분배금 조회의 기본 날짜 범위 계산에 사용됩니다.
    pub fn approx_days(&self) -> i64 {
        match self {
            LookbackPeriod::M1 => 30,
            LookbackPeriod::M3 => 91,
            LookbackPeriod::M6 => 182,
            LookbackPeriod::Y1 => 365,
            LookbackPeriod::Y2 => 730,
            LookbackPeriod::Y5 => 1825,
        }
    }
}

impl Default for LookbackPeriod {
    fn default() -> Self {
        LookbackPeriod::Y1
    }
}

impl fmt::Display for LookbackPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_range_token())
    }
}

impl FromStr for LookbackPeriod {
    type Err = FetchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "1mo" | "1m" => Ok(LookbackPeriod::M1),
            "3mo" | "3m" => Ok(LookbackPeriod::M3),
            "6mo" | "6m" => Ok(LookbackPeriod::M6),
            "1y" => Ok(LookbackPeriod::Y1),
            "2y" => Ok(LookbackPeriod::Y2),
            "5y" => Ok(LookbackPeriod::Y5),
            _ => Err(FetchError::Validation(format!(
                "알 수 없는 조회 구간: {} (1mo, 3mo, 6mo, 1y, 2y, 5y 지원)",
                s
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_period_codes() {
        assert_eq!(ReportPeriod::Annual.to_report_code(), "11011");
        assert_eq!(ReportPeriod::SemiAnnual.to_report_code(), "11012");
        assert_eq!(ReportPeriod::FirstQuarter.to_report_code(), "11013");
        assert_eq!(ReportPeriod::ThirdQuarter.to_report_code(), "11014");
    }

    #[test]
    fn test_report_period_from_str() {
        assert_eq!("annual".parse::<ReportPeriod>().unwrap(), ReportPeriod::Annual);
        assert_eq!("11012".parse::<ReportPeriod>().unwrap(), ReportPeriod::SemiAnnual);
        assert_eq!("Q1".parse::<ReportPeriod>().unwrap(), ReportPeriod::FirstQuarter);
        assert!(matches!(
            "quarterly".parse::<ReportPeriod>(),
            Err(FetchError::Validation(_))
        ));
    }

    #[test]
    fn test_lookback_tokens() {
        assert_eq!(LookbackPeriod::M1.to_range_token(), "1mo");
        assert_eq!(LookbackPeriod::Y5.to_range_token(), "5y");
        assert_eq!("6mo".parse::<LookbackPeriod>().unwrap(), LookbackPeriod::M6);
        assert!(matches!(
            "10y".parse::<LookbackPeriod>(),
            Err(FetchError::Validation(_))
        ));
    }

    #[test]
    fn test_lookback_default_is_one_year() {
        assert_eq!(LookbackPeriod::default(), LookbackPeriod::Y1);
        assert_eq!(LookbackPeriod::default().approx_days(), 365);
    }
}
