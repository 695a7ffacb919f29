//! 데이터 수집 시스템의 에러 타입.
//!
//! 모든 소스 클라이언트가 같은 분류 체계를 사용합니다. HTTP 200 응답이라도
//! 제공자 자체 상태 코드가 실패를 나타내면 `Provider` 에러로 변환되며,
//! "조회 결과 없음"은 에러가 아니라 빈 컬렉션으로 표현됩니다.

use thiserror::Error;

/// 데이터 수집 에러.
#[derive(Debug, Error)]
pub enum FetchError {
    /// 설정 에러 (자격증명 누락 등)
    #[error("설정 에러: {0}")]
    Config(String),

    /// 입력 검증 에러 (잘못된 종목코드 길이, 알 수 없는 기간 토큰 등)
    #[error("입력 검증 에러: {0}")]
    Validation(String),

    /// 네트워크/HTTP 전송 에러 (타임아웃 포함)
    #[error("전송 에러: {0}")]
    Transport(String),

    /// 압축 아카이브 해제 에러
    #[error("아카이브 에러: {0}")]
    Archive(String),

    /// 응답 해석 에러 (XML/JSON 형태 불일치)
    #[error("디코딩 에러: {0}")]
    Decode(String),

    /// 제공자 보고 에러 (전송 성공 + 본문 상태 코드 실패)
    #[error("제공자 에러 [{code}]: {message}")]
    Provider { code: String, message: String },

    /// 해당 소스가 지원하지 않는 조회
    #[error("지원하지 않는 조회: {0}")]
    Unsupported(String),
}

/// 데이터 수집 작업을 위한 Result 타입.
pub type Result<T> = std::result::Result<T, FetchError>;

impl FetchError {
    /// 재시도 가능한 에러인지 확인합니다.
    ///
    /// 전송 계층 실패만 재시도 대상입니다. 검증/설정/제공자 에러는
    /// 같은 요청을 반복해도 결과가 달라지지 않습니다.
    pub fn is_retryable(&self) -> bool {
        matches!(self, FetchError::Transport(_))
    }

    /// 네트워크에 도달하기 전에 발생하는 에러인지 확인합니다.
    pub fn is_pre_network(&self) -> bool {
        matches!(self, FetchError::Config(_) | FetchError::Validation(_))
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        FetchError::Decode(err.to_string())
    }
}
