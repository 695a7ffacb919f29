//! 종목 메타데이터 타입.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 해외 종목 메타데이터.
///
/// 제공자가 값을 생략하면 필드도 생략됩니다. 0으로 채우면 실제
/// 데이터와 구분할 수 없으므로 모든 필드가 Option입니다.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstrumentProfile {
    /// 종목 이름
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// 통화 코드 (예: USD)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    /// 현재가
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_price: Option<Decimal>,
    /// 배당수익률 (소수, 0.0044 = 0.44%)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dividend_yield: Option<Decimal>,
    /// 시가총액
    #[serde(skip_serializing_if = "Option::is_none")]
    pub market_cap: Option<Decimal>,
}

impl InstrumentProfile {
    /// 배당수익률을 퍼센트 값으로 반환합니다.
    pub fn dividend_yield_pct(&self) -> Option<Decimal> {
        self.dividend_yield
            .map(|y| (y * Decimal::from(100)).round_dp(2))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_dividend_yield_pct() {
        let profile = InstrumentProfile {
            dividend_yield: Some(dec!(0.0044)),
            ..Default::default()
        };
        assert_eq!(profile.dividend_yield_pct(), Some(dec!(0.44)));

        assert_eq!(InstrumentProfile::default().dividend_yield_pct(), None);
    }
}
