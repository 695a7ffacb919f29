//! 배당/분배 내역 타입.
//!
//! 이 모듈은 기업 배당 및 펀드 분배 관련 타입을 정의합니다:
//! - `PeriodLabel` - 레코드가 속한 기간 라벨
//! - `CorporateActionRecord` - 정규화된 배당/분배 한 건
//! - `CorporateActionQuery` - 소스별 조회 파라미터 묶음

use crate::types::{LookbackPeriod, ReportPeriod};
use chrono::{Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 배당/분배 레코드의 기간 라벨.
///
/// 국내 공시는 당기/전기/전전기 3개 기간을 한 행에 담아 반환하고,
/// ETF 분배금과 해외 배당은 지급일 기준으로 개별 레코드가 됩니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PeriodLabel {
    /// 당기
    Current,
    /// 전기
    Prior,
    /// 전전기
    PriorPrior,
    /// 지급일 기준
    Payment(NaiveDate),
}

impl fmt::Display for PeriodLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PeriodLabel::Current => write!(f, "당기"),
            PeriodLabel::Prior => write!(f, "전기"),
            PeriodLabel::PriorPrior => write!(f, "전전기"),
            PeriodLabel::Payment(date) => write!(f, "{}", date.format("%Y-%m-%d")),
        }
    }
}

/// 정규화된 배당/분배 레코드.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorporateActionRecord {
    /// 기간 라벨
    pub period_label: PeriodLabel,
    /// 금액 (미공시/파싱 불가면 None)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Decimal>,
    /// 증권 종류 (보통주/우선주 등, 소스가 제공할 때만)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security_class: Option<String>,
    /// 지급일
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_date: Option<NaiveDate>,
}

impl CorporateActionRecord {
    /// 새 레코드를 생성합니다.
    pub fn new(period_label: PeriodLabel) -> Self {
        Self {
            period_label,
            amount: None,
            security_class: None,
            payment_date: None,
        }
    }

    /// 금액을 설정합니다.
    pub fn with_amount(mut self, amount: Option<Decimal>) -> Self {
        self.amount = amount;
        self
    }

    /// 증권 종류를 설정합니다.
    pub fn with_security_class(mut self, class: impl Into<String>) -> Self {
        self.security_class = Some(class.into());
        self
    }

    /// 지급일을 설정합니다.
    pub fn with_payment_date(mut self, date: Option<NaiveDate>) -> Self {
        self.payment_date = date;
        self
    }
}

/// 배당/분배 조회 파라미터.
///
/// 소스에 따라 사용하는 필드가 다릅니다:
/// - 국내 주식: `fiscal_year` + `report_period`
/// - 국내 ETF: `range` (없으면 `lookback` 일수로 오늘부터 역산)
/// - 해외: `lookback`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorporateActionQuery {
    /// 사업연도
    pub fiscal_year: i32,
    /// 보고서 기간
    pub report_period: ReportPeriod,
    /// 분배금 조회 날짜 범위 (시작, 끝 모두 포함)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<(NaiveDate, NaiveDate)>,
    /// 조회 구간
    pub lookback: LookbackPeriod,
}

impl CorporateActionQuery {
    /// 특정 사업연도의 조회를 생성합니다.
    pub fn for_year(fiscal_year: i32) -> Self {
        Self {
            fiscal_year,
            ..Default::default()
        }
    }

    /// 보고서 기간을 설정합니다.
    pub fn with_report_period(mut self, period: ReportPeriod) -> Self {
        self.report_period = period;
        self
    }

    /// 날짜 범위를 설정합니다.
    pub fn with_range(mut self, from: NaiveDate, to: NaiveDate) -> Self {
        self.range = Some((from, to));
        self
    }

    /// 조회 구간을 설정합니다.
    pub fn with_lookback(mut self, lookback: LookbackPeriod) -> Self {
        self.lookback = lookback;
        self
    }
}

impl Default for CorporateActionQuery {
    fn default() -> Self {
        // 당해 연도 사업보고서는 보통 미공시 상태이므로 직전 연도를 기본으로 사용
        Self {
            fiscal_year: Utc::now().year() - 1,
            report_period: ReportPeriod::default(),
            range: None,
            lookback: LookbackPeriod::default(),
        }
    }
}
