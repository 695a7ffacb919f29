//! 종목 식별 타입.
//!
//! 이 모듈은 조회 대상 종목 관련 타입을 정의합니다:
//! - `InstrumentSource` - 데이터 소스 분류 (국내 주식/ETF, 해외 주식/ETF)
//! - `Instrument` - 조회가 확정된 종목 식별 레코드
//! - `InstrumentQuery` - 사용자 입력 질의 (이름/코드/티커)

use serde::{Deserialize, Serialize};
use std::fmt;

/// 데이터 소스 분류.
///
/// 소스에 따라 사용 가능한 조회와 담당 클라이언트가 결정됩니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InstrumentSource {
    /// 국내 상장 주식
    DomesticEquity,
    /// 국내 상장 ETF
    DomesticEtf,
    /// 해외 상장 주식
    ForeignEquity,
    /// 해외 상장 ETF
    ForeignEtf,
}

impl InstrumentSource {
    /// 소스 식별 문자열을 반환합니다.
    pub fn as_str(&self) -> &'static str {
        match self {
            InstrumentSource::DomesticEquity => "domestic-equity",
            InstrumentSource::DomesticEtf => "domestic-etf",
            InstrumentSource::ForeignEquity => "foreign-equity",
            InstrumentSource::ForeignEtf => "foreign-etf",
        }
    }

    /// 국내 소스인지 확인합니다.
    pub fn is_domestic(&self) -> bool {
        matches!(
            self,
            InstrumentSource::DomesticEquity | InstrumentSource::DomesticEtf
        )
    }

    /// 해외 소스인지 확인합니다.
    pub fn is_foreign(&self) -> bool {
        !self.is_domestic()
    }
}

impl fmt::Display for InstrumentSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 조회가 확정된 종목 식별 레코드.
///
/// 디렉토리/레지스트리 조회로만 생성되며 생성 후 변경되지 않습니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instrument {
    /// 데이터 소스
    pub source: InstrumentSource,
    /// 주 식별자 (국내: 종목/회사 코드, 해외: 티커)
    pub primary_code: String,
    /// 표시 이름
    pub display_name: String,
    /// 표준 코드 (국내 ETF 전용)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub standard_code: Option<String>,
}

impl Instrument {
    /// 새 종목 레코드를 생성합니다.
    pub fn new(
        source: InstrumentSource,
        primary_code: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Self {
        Self {
            source,
            primary_code: primary_code.into(),
            display_name: display_name.into(),
            standard_code: None,
        }
    }

    /// 표준 코드를 설정합니다.
    pub fn with_standard_code(mut self, standard_code: impl Into<String>) -> Self {
        self.standard_code = Some(standard_code.into());
        self
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.display_name, self.primary_code)
    }
}

/// 사용자 입력 질의.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InstrumentQuery {
    /// 국내 종목명 부분 일치 검색
    DomesticName(String),
    /// 국내 6자리 종목 코드
    DomesticCode(String),
    /// 해외 티커
    ForeignTicker(String),
}

impl InstrumentQuery {
    /// 자유 형식 입력을 질의로 분류합니다.
    ///
    /// 숫자 6자리는 국내 코드, 한글이 포함되면 국내 이름 검색,
    /// 나머지는 해외 티커로 취급합니다.
    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim();
        if trimmed.len() == 6 && trimmed.chars().all(|c| c.is_ascii_digit()) {
            InstrumentQuery::DomesticCode(trimmed.to_string())
        } else if contains_hangul(trimmed) {
            InstrumentQuery::DomesticName(trimmed.to_string())
        } else {
            InstrumentQuery::ForeignTicker(trimmed.to_uppercase())
        }
    }
}

impl fmt::Display for InstrumentQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstrumentQuery::DomesticName(name) => write!(f, "이름:{}", name),
            InstrumentQuery::DomesticCode(code) => write!(f, "코드:{}", code),
            InstrumentQuery::ForeignTicker(ticker) => write!(f, "티커:{}", ticker),
        }
    }
}

/// 문자열에 한글 음절이 포함되어 있는지 확인합니다.
fn contains_hangul(s: &str) -> bool {
    s.chars().any(|c| ('가'..='힣').contains(&c))
}
