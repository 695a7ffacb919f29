//! 정밀한 금융 수치를 위한 Decimal 유틸리티.

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;

/// 금액/가격 표현을 위한 타입.
pub type Amount = Decimal;

/// f64 값을 소수점 4자리로 반올림한 Decimal로 변환합니다.
///
/// 해외 제공자는 가격을 부동소수점으로 반환하므로 표시/비교 전에
/// 고정 자릿수로 정규화합니다. NaN/무한대는 None이 됩니다.
pub fn round_decimal_from_f64(value: f64) -> Option<Decimal> {
    Decimal::from_f64(value).map(|d| d.round_dp(4))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_round_decimal_from_f64() {
        assert_eq!(round_decimal_from_f64(1.23456789), Some(dec!(1.2346)));
        assert_eq!(round_decimal_from_f64(195.0), Some(dec!(195.0000)));
        assert_eq!(round_decimal_from_f64(f64::NAN), None);
        assert_eq!(round_decimal_from_f64(f64::INFINITY), None);
    }
}
