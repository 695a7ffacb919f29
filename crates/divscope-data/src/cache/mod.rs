//! 캐싱 레이어.
//!
//! - Directory 캐시: 기업 디렉토리, ETF 디렉토리처럼 느리게 변하는
//!   전체 목록을 TTL 동안 메모리에 보관

pub mod directory;

pub use directory::{DirectoryCache, FetchFailure};
