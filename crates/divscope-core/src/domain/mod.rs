//! 데이터 수집을 위한 도메인 모델.

mod action;
mod entry;
mod instrument;
mod price;
mod profile;

pub use action::*;
pub use entry::*;
pub use instrument::*;
pub use price::*;
pub use profile::*;
