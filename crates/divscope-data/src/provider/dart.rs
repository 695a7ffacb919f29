//! DART 전자공시 API 클라이언트.
//!
//! 금융감독원 DART Open API에서 기업 디렉토리와 배당 보고서를 조회합니다.
//!
//! # 지원 데이터
//!
//! - 기업 고유번호 디렉토리 (corpCode.xml, ZIP 아카이브)
//! - 배당에 관한 사항 보고서 (alotMatter.json)
//!
//! # API 키
//!
//! DART Open API 인증키가 필요합니다. 설정 파일의 `dart.api_key` 또는
//! 환경변수 `DART_API_KEY`로 공급합니다.
//!
//! # 사용 예제
//!
//! ```rust,ignore
//! use divscope_core::{HttpConfig, ReportPeriod};
//! use divscope_data::provider::dart::DartClient;
//!
//! let client = DartClient::new("YOUR_API_KEY", &HttpConfig::default());
//! let directory = client.fetch_corp_directory().await?;
//! let rows = client
//!     .fetch_dividend_report("005930", 2024, ReportPeriod::Annual)
//!     .await?;
//! ```

use std::collections::HashMap;
use std::io::{Cursor, Read};

use serde::Deserialize;
use tracing::{debug, info};

use divscope_core::{DirectoryEntry, FetchError, HttpConfig, ReportPeriod, Result};

use super::{build_http_client, retry_once, truncate_body};

/// DART Open API 기본 URL.
const DART_BASE_URL: &str = "https://opendart.fss.or.kr/api";

/// ZIP 아카이브 시그니처.
const ZIP_MAGIC: &[u8] = b"PK";

/// DART 배당 보고서 필드 → 화면 표기 라벨 고정 매핑.
///
/// 열 이름 번역은 이 표로만 합니다 (런타임 추론 금지).
pub const ALLOTMENT_FIELD_LABELS: &[(&str, &str)] = &[
    ("se", "구분"),
    ("stock_knd", "주식 종류"),
    ("thstrm", "당기"),
    ("frmtrm", "전기"),
    ("lwfr", "전전기"),
    ("thstrm_dt", "당기 지급일"),
    ("frmtrm_dt", "전기 지급일"),
    ("lwfr_dt", "전전기 지급일"),
];

/// 응답 필드 이름의 화면 라벨 조회.
pub fn field_label(field: &str) -> Option<&'static str> {
    ALLOTMENT_FIELD_LABELS
        .iter()
        .find(|(name, _)| *name == field)
        .map(|(_, label)| *label)
}

/// 배당에 관한 사항 원본 행.
///
/// 필드 이름은 DART JSON 키와 동일합니다. 값 필드는 문자열 그대로 두고
/// 수치/날짜 변환은 정규화 레이어가 담당합니다.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AllotmentRow {
    /// 접수번호
    #[serde(default)]
    pub rcept_no: Option<String>,
    /// 법인 구분
    #[serde(default)]
    pub corp_cls: Option<String>,
    /// 고유번호
    #[serde(default)]
    pub corp_code: Option<String>,
    /// 법인명
    #[serde(default)]
    pub corp_name: Option<String>,
    /// 구분 (예: "주당 현금배당금(원)")
    pub se: String,
    /// 주식 종류 (보통주/우선주)
    #[serde(default)]
    pub stock_knd: Option<String>,
    /// 당기 값
    #[serde(default)]
    pub thstrm: Option<String>,
    /// 전기 값
    #[serde(default)]
    pub frmtrm: Option<String>,
    /// 전전기 값
    #[serde(default)]
    pub lwfr: Option<String>,
    /// 당기 지급일
    #[serde(default)]
    pub thstrm_dt: Option<String>,
    /// 전기 지급일
    #[serde(default)]
    pub frmtrm_dt: Option<String>,
    /// 전전기 지급일
    #[serde(default)]
    pub lwfr_dt: Option<String>,
}

/// alotMatter.json 응답 래퍼.
#[derive(Debug, Deserialize)]
struct AllotmentReport {
    /// 제공자 상태 코드 ("000" = 정상)
    status: String,
    #[serde(default)]
    message: String,
    #[serde(default)]
    list: Vec<AllotmentRow>,
}

/// corpCode.xml 문서 루트.
#[derive(Debug, Deserialize)]
struct CorpCodeDocument {
    #[serde(rename = "list", default)]
    list: Vec<RawCorpEntry>,
}

/// corpCode.xml 항목.
#[derive(Debug, Deserialize)]
#[allow(dead_code)] // 문서 전체 필드 매핑 (일부만 사용)
struct RawCorpEntry {
    corp_code: String,
    corp_name: String,
    #[serde(default)]
    stock_code: Option<String>,
    #[serde(default)]
    modify_date: Option<String>,
}

/// ZIP 대신 내려오는 XML 에러 봉투.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    status: String,
    message: String,
}

/// 기업 디렉토리.
///
/// 상장 종목 코드가 있는 기업만 담습니다. 종목 코드 조회는 O(1) 색인,
/// 이름 검색은 선형 탐색입니다. 디렉토리가 수천 건 수준이라 선형 탐색으로
/// 충분합니다.
#[derive(Debug, Clone)]
pub struct CorpDirectory {
    entries: Vec<DirectoryEntry>,
    by_ticker: HashMap<String, usize>,
}

impl CorpDirectory {
    /// 항목 목록으로 디렉토리 구성. 상장 코드가 없는 항목은 제외합니다.
    pub fn from_entries(entries: Vec<DirectoryEntry>) -> Self {
        let entries: Vec<DirectoryEntry> = entries
            .into_iter()
            .filter(DirectoryEntry::has_listed_ticker)
            .collect();
        let by_ticker = entries
            .iter()
            .enumerate()
            .filter_map(|(idx, entry)| entry.ticker.clone().map(|t| (t, idx)))
            .collect();
        Self { entries, by_ticker }
    }

    /// 항목 수.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// 디렉토리가 비었는지 확인.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 전체 항목.
    pub fn entries(&self) -> &[DirectoryEntry] {
        &self.entries
    }

    /// 종목 코드로 조회 (O(1)).
    pub fn find_by_ticker(&self, ticker: &str) -> Option<&DirectoryEntry> {
        self.by_ticker
            .get(ticker.trim())
            .map(|&idx| &self.entries[idx])
    }

    /// 이름 부분 일치 검색 (대소문자 무시, 전체 탐색).
    pub fn search_by_name(&self, fragment: &str) -> Vec<&DirectoryEntry> {
        let needle = fragment.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }
        self.entries
            .iter()
            .filter(|entry| entry.name.to_lowercase().contains(&needle))
            .collect()
    }
}

/// DART Open API 클라이언트.
#[derive(Clone)]
pub struct DartClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl DartClient {
    /// 새 클라이언트 생성.
    pub fn new(api_key: impl Into<String>, http: &HttpConfig) -> Self {
        Self {
            client: build_http_client(http),
            api_key: api_key.into(),
            base_url: DART_BASE_URL.to_string(),
        }
    }

    /// 환경변수 `DART_API_KEY`에서 인증키를 읽어 클라이언트 생성.
    pub fn from_env(http: &HttpConfig) -> Option<Self> {
        std::env::var("DART_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty())
            .map(|key| Self::new(key, http))
    }

    /// 기본 URL 교체 (테스트 서버 주입용).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// 기업 고유번호 디렉토리 전체 다운로드.
    ///
    /// ZIP 아카이브를 메모리에서 풀고 내부 XML을 파싱합니다. 임시 파일은
    /// 만들지 않습니다. 상장 종목 코드가 없는 기업은 결과에서 제외됩니다.
    pub async fn fetch_corp_directory(&self) -> Result<CorpDirectory> {
        let bytes = retry_once(|| self.download_corp_archive()).await?;
        let directory = decode_corp_archive(&bytes)?;
        info!(count = directory.len(), "기업 디렉토리 적재 완료");
        Ok(directory)
    }

    async fn download_corp_archive(&self) -> Result<Vec<u8>> {
        let url = format!("{}/corpCode.xml", self.base_url);
        debug!(url = %url, "기업 디렉토리 다운로드");

        let response = self
            .client
            .get(&url)
            .query(&[("crtfc_key", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| FetchError::Transport(format!("DART API 호출 실패: {}", e)))?;

        if !response.status().is_success() {
            return Err(FetchError::Transport(format!(
                "DART API 오류: {}",
                response.status()
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| FetchError::Transport(format!("응답 읽기 실패: {}", e)))?;
        Ok(bytes.to_vec())
    }

    /// 배당에 관한 사항 조회.
    ///
    /// HTTP 200이어도 본문의 제공자 상태가 실패면 실패로 처리합니다.
    /// 상태 "000"은 행 목록, "013"(조회 결과 없음)은 빈 목록입니다.
    /// 빈 목록은 "해당 기간 공시 없음"이지 에러가 아닙니다.
    pub async fn fetch_dividend_report(
        &self,
        company_code: &str,
        fiscal_year: i32,
        period: ReportPeriod,
    ) -> Result<Vec<AllotmentRow>> {
        // 네트워크 호출 전에 코드 형식 검증
        validate_company_code(company_code)?;

        retry_once(|| self.request_dividend_report(company_code, fiscal_year, period)).await
    }

    async fn request_dividend_report(
        &self,
        company_code: &str,
        fiscal_year: i32,
        period: ReportPeriod,
    ) -> Result<Vec<AllotmentRow>> {
        let url = format!("{}/alotMatter.json", self.base_url);
        let year = fiscal_year.to_string();

        debug!(
            company_code = company_code,
            fiscal_year = fiscal_year,
            report_code = period.to_report_code(),
            "배당 보고서 조회"
        );

        let response = self
            .client
            .get(&url)
            .query(&[
                ("crtfc_key", self.api_key.as_str()),
                ("corp_code", company_code),
                ("bsns_year", year.as_str()),
                ("reprt_code", period.to_report_code()),
            ])
            .send()
            .await
            .map_err(|e| FetchError::Transport(format!("DART API 호출 실패: {}", e)))?;

        if !response.status().is_success() {
            return Err(FetchError::Transport(format!(
                "DART API 오류: {}",
                response.status()
            )));
        }

        let text = response
            .text()
            .await
            .map_err(|e| FetchError::Transport(format!("응답 읽기 실패: {}", e)))?;

        let report: AllotmentReport = serde_json::from_str(&text).map_err(|e| {
            FetchError::Decode(format!(
                "JSON 파싱 실패: {} - {}",
                e,
                truncate_body(&text, 200)
            ))
        })?;

        match report.status.as_str() {
            "000" => {
                info!(
                    company_code = company_code,
                    count = report.list.len(),
                    "배당 보고서 조회 완료"
                );
                Ok(report.list)
            }
            "013" => {
                debug!(company_code = company_code, "해당 기간 공시 없음");
                Ok(Vec::new())
            }
            code => Err(FetchError::Provider {
                code: code.to_string(),
                message: report.message,
            }),
        }
    }
}

/// 기업 코드 형식 검증. 정확히 6자여야 합니다.
fn validate_company_code(code: &str) -> Result<()> {
    if code.chars().count() != 6 {
        return Err(FetchError::Validation(format!(
            "기업 코드는 정확히 6자여야 합니다: {:?}",
            code
        )));
    }
    Ok(())
}

/// ZIP 아카이브를 풀어 기업 디렉토리로 디코딩.
fn decode_corp_archive(bytes: &[u8]) -> Result<CorpDirectory> {
    // 인증 실패 시 ZIP 대신 XML 에러 봉투가 내려온다
    if !bytes.starts_with(ZIP_MAGIC) {
        return Err(decode_error_envelope(bytes));
    }

    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| FetchError::Archive(format!("ZIP 아카이브 열기 실패: {}", e)))?;
    if archive.is_empty() {
        return Err(FetchError::Archive("빈 ZIP 아카이브".to_string()));
    }

    let entry_name = archive
        .file_names()
        .find(|name| name.eq_ignore_ascii_case("CORPCODE.xml"))
        .map(str::to_string);

    let mut xml = String::new();
    {
        let mut file = match entry_name {
            Some(name) => archive
                .by_name(&name)
                .map_err(|e| FetchError::Archive(format!("ZIP 항목 열기 실패: {}", e)))?,
            None => archive
                .by_index(0)
                .map_err(|e| FetchError::Archive(format!("ZIP 항목 열기 실패: {}", e)))?,
        };
        file.read_to_string(&mut xml)
            .map_err(|e| FetchError::Archive(format!("ZIP 항목 읽기 실패: {}", e)))?;
    }

    let document: CorpCodeDocument = quick_xml::de::from_str(&xml)
        .map_err(|e| FetchError::Decode(format!("corpCode XML 파싱 실패: {}", e)))?;

    let entries = document
        .list
        .into_iter()
        .map(|raw| {
            let mut entry = DirectoryEntry::new(raw.corp_code, raw.corp_name);
            if let Some(code) = raw.stock_code.as_deref().map(str::trim) {
                if !code.is_empty() {
                    entry = entry.with_ticker(code);
                }
            }
            entry
        })
        .collect();

    Ok(CorpDirectory::from_entries(entries))
}

/// ZIP이 아닌 본문을 에러 봉투로 해석.
fn decode_error_envelope(bytes: &[u8]) -> FetchError {
    let text = String::from_utf8_lossy(bytes);
    if let Ok(envelope) = quick_xml::de::from_str::<ErrorEnvelope>(&text) {
        return FetchError::Provider {
            code: envelope.status,
            message: envelope.message,
        };
    }
    FetchError::Archive(format!(
        "ZIP 아카이브가 아닌 응답: {}",
        truncate_body(&text, 200)
    ))
}
