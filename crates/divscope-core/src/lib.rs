//! # DivScope Core
//!
//! 다중 소스 금융 데이터 엔진의 핵심 도메인 모델 및 타입을 제공합니다.
//!
//! 이 크레이트는 데이터 수집 시스템 전반에서 사용되는 기본 타입을 제공합니다:
//! - 종목 식별 및 디렉토리 항목
//! - 배당/분배 내역 레코드
//! - OHLCV 가격 데이터 구조체
//! - 보고서 기간 및 조회 기간 정의
//! - 설정 관리
//! - 로깅 인프라

pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod types;

pub use config::*;
pub use domain::*;
pub use error::*;
pub use logging::*;
pub use types::*;
