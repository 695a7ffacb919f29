//! 데이터 엔진 전반에서 사용되는 공통 타입.

mod decimal;
mod period;
mod policy;

pub use decimal::*;
pub use period::*;
pub use policy::*;
