//! 숫자 강제 변환 정책.

use serde::{Deserialize, Serialize};

/// 파싱 불가능한 금액 문자열을 만났을 때의 처리 정책.
///
/// 국내 분배금 응답의 금액은 천 단위 구분자가 포함된 문자열로 도착하며
/// "N/A", "-" 등 숫자가 아닌 값이 섞여 있을 수 있습니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoercionPolicy {
    /// 해당 필드만 null로 두고 행은 유지 (기본값)
    NullifyField,
    /// 행 전체를 버림
    DropRow,
}

impl Default for CoercionPolicy {
    fn default() -> Self {
        CoercionPolicy::NullifyField
    }
}

impl CoercionPolicy {
    /// 파싱 실패 시 행을 유지해야 하는지 확인합니다.
    pub fn keeps_row(&self) -> bool {
        matches!(self, CoercionPolicy::NullifyField)
    }
}
