//! 배당 데이터 조회 CLI 라이브러리.
//!
//! 종목 확정/검색, 배당·분배 내역 조회, 해외 시세/요약 조회 명령을
//! 제공합니다. 바이너리 진입점은 `main.rs`에 있습니다.

pub mod commands;

pub use commands::*;
