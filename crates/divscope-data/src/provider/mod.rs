//! 데이터 제공자 모듈.
//!
//! 외부 소스별 클라이언트를 정의합니다.
//!
//! ## DART 공시 시스템
//! - `DartClient`: 금융감독원 전자공시 Open API 클라이언트 (인증키 필요)
//! - 기업 고유번호 디렉토리 (ZIP 아카이브), 배당에 관한 사항 보고서
//!
//! ## KRX 정보데이터시스템
//! - `KrxClient`: 화면 조회용 JSON 엔드포인트 클라이언트 (인증키 불필요)
//! - 전체 ETF 디렉토리, ETF 분배금 내역
//!
//! ## Yahoo Finance
//! - `YahooMarketClient`: 해외 주식/ETF 시세, 배당, 종목 정보
//! - `ForeignMarket` 트레잇 뒤에 두어 테스트 더블 주입 가능

pub mod dart;
pub mod krx;
pub mod yahoo;

pub use dart::{AllotmentRow, CorpDirectory, DartClient, ALLOTMENT_FIELD_LABELS};
pub use krx::{DistributionRow, EtfListingRow, KrxClient};
pub use yahoo::{ForeignDividend, ForeignMarket, ForeignQuoteMatch, RawBar, YahooMarketClient};

use std::future::Future;
use std::time::Duration;

use tracing::debug;

use divscope_core::{HttpConfig, Result};

/// 공통 HTTP 클라이언트 생성.
///
/// 모든 제공자가 동일한 타임아웃과 User-Agent 정책을 공유합니다.
pub(crate) fn build_http_client(config: &HttpConfig) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .user_agent(config.user_agent.clone())
        .build()
        .expect("HTTP 클라이언트 생성 실패")
}

/// 일시적 오류에 한해 1회 재시도.
///
/// 멱등한 조회 요청에만 사용합니다. 재시도 전 500ms 대기합니다.
/// 검증/디코딩/제공자 오류는 재시도하지 않습니다.
pub(crate) async fn retry_once<T, F, Fut>(op: F) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    match op().await {
        Ok(value) => Ok(value),
        Err(e) if e.is_retryable() => {
            debug!(error = %e, "일시적 오류, 재시도");
            tokio::time::sleep(Duration::from_millis(500)).await;
            op().await
        }
        Err(e) => Err(e),
    }
}

/// 로그/에러 메시지용 본문 앞부분 잘라내기 (문자 경계 보존).
pub(crate) fn truncate_body(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
