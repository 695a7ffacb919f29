//! 가격 데이터 타입.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 일별 OHLCV 가격 바.
///
/// 정규화 계층은 날짜 오름차순을 보장합니다. `low ≤ open,close ≤ high`
/// 불변식은 소스가 강제하지 않으므로 위반 시 경고로 표면화하되
/// 값을 고치지는 않습니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceBar {
    /// 거래일
    pub date: NaiveDate,
    /// 시가
    pub open: Decimal,
    /// 고가
    pub high: Decimal,
    /// 저가
    pub low: Decimal,
    /// 종가
    pub close: Decimal,
    /// 거래량
    pub volume: u64,
}

impl PriceBar {
    /// OHLC 범위 불변식을 만족하는지 확인합니다.
    pub fn is_coherent(&self) -> bool {
        self.low <= self.high
            && self.low <= self.open
            && self.open <= self.high
            && self.low <= self.close
            && self.close <= self.high
    }

    /// 시가 대비 종가 변화율(%)을 반환합니다.
    pub fn change_pct(&self) -> Option<Decimal> {
        if self.open.is_zero() {
            return None;
        }
        Some(((self.close - self.open) / self.open * Decimal::from(100)).round_dp(2))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn bar(open: Decimal, high: Decimal, low: Decimal, close: Decimal) -> PriceBar {
        PriceBar {
            date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            open,
            high,
            low,
            close,
            volume: 1_000,
        }
    }

    #[test]
    fn test_coherence() {
        assert!(bar(dec!(100), dec!(110), dec!(95), dec!(105)).is_coherent());
        // 고가보다 높은 종가는 불변식 위반
        assert!(!bar(dec!(100), dec!(110), dec!(95), dec!(111)).is_coherent());
        // 저가가 시가보다 높은 경우도 위반
        assert!(!bar(dec!(100), dec!(110), dec!(101), dec!(105)).is_coherent());
    }

    #[test]
    fn test_change_pct() {
        assert_eq!(
            bar(dec!(100), dec!(110), dec!(95), dec!(105)).change_pct(),
            Some(dec!(5.00))
        );
        assert_eq!(bar(dec!(0), dec!(0), dec!(0), dec!(0)).change_pct(), None);
    }
}
