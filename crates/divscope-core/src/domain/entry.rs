//! 디렉토리 항목 타입.

use serde::{Deserialize, Serialize};

/// 제공자 디렉토리의 한 행.
///
/// 기업 레지스트리와 ETF 목록이 같은 형태를 공유합니다.
/// 캐시가 소유하며 소비자에게는 읽기 전용입니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryEntry {
    /// 제공자 고유 코드 (기업: 고유번호, ETF: 단축 코드)
    pub code: String,
    /// 이름
    pub name: String,
    /// 상장 종목 코드 (비상장이면 None)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticker: Option<String>,
    /// 표준 코드 (ETF 전용)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub standard_code: Option<String>,
}

impl DirectoryEntry {
    /// 새 디렉토리 항목을 생성합니다.
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            ticker: None,
            standard_code: None,
        }
    }

    /// 상장 종목 코드를 설정합니다.
    pub fn with_ticker(mut self, ticker: impl Into<String>) -> Self {
        self.ticker = Some(ticker.into());
        self
    }

    /// 표준 코드를 설정합니다.
    pub fn with_standard_code(mut self, standard_code: impl Into<String>) -> Self {
        self.standard_code = Some(standard_code.into());
        self
    }

    /// 거래 가능한 상장 코드를 가진 항목인지 확인합니다.
    ///
    /// 공백 코드는 비상장 기업을 의미하며 식별자 색인에서 제외됩니다.
    pub fn has_listed_ticker(&self) -> bool {
        self.ticker
            .as_deref()
            .map(|t| !t.trim().is_empty())
            .unwrap_or(false)
    }
}
