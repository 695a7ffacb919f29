//! 데이터 수집 및 조회.
//!
//! 이 crate는 다음을 제공합니다:
//! - DART 공시 API 클라이언트 (기업 디렉토리, 배당 보고서)
//! - KRX 정보데이터시스템 클라이언트 (ETF 디렉토리, 분배금 내역)
//! - Yahoo Finance 클라이언트 (해외 주식/ETF 시세, 배당, 프로필)
//! - 디렉토리 캐시 (TTL + 단일 비행 다운로드)
//! - 원본 응답을 도메인 타입으로 변환하는 정규화 레이어
//! - 조회 진입점을 통합하는 `MarketDataManager`

pub mod cache;
pub mod manager;
pub mod normalize;
pub mod provider;

pub use manager::{MarketDataManager, MarketOverview};

// 제공자 재내보내기
pub use provider::dart::{AllotmentRow, CorpDirectory, DartClient};
pub use provider::krx::{DistributionRow, EtfListingRow, KrxClient};
pub use provider::yahoo::{ForeignMarket, ForeignQuoteMatch, YahooMarketClient};

// 캐시 재내보내기
pub use cache::directory::{DirectoryCache, FetchFailure};
