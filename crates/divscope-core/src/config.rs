//! 설정 관리.
//!
//! 이 모듈은 애플리케이션 설정을 정의하고 관리합니다.
//! 우선순위: 기본값 → 설정 파일 → `DIVSCOPE__` 접두사 환경 변수.

use crate::types::CoercionPolicy;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 애플리케이션 설정.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    /// 기업 공시 API 설정
    #[serde(default)]
    pub dart: DartConfig,
    /// 거래소 정보 API 설정
    #[serde(default)]
    pub krx: KrxConfig,
    /// 시장 데이터 처리 설정
    #[serde(default)]
    pub market: MarketConfig,
    /// 디렉토리 캐시 설정
    #[serde(default)]
    pub cache: CacheConfig,
    /// HTTP 클라이언트 설정
    #[serde(default)]
    pub http: HttpConfig,
    /// 로깅 설정
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// 기업 공시 API 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DartConfig {
    /// API 인증 키 (없으면 DART_API_KEY 환경 변수 사용)
    #[serde(default)]
    pub api_key: Option<String>,
    /// API 기본 URL
    #[serde(default = "default_dart_base_url")]
    pub base_url: String,
}

fn default_dart_base_url() -> String {
    "https://opendart.fss.or.kr/api".to_string()
}

impl Default for DartConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_dart_base_url(),
        }
    }
}

impl DartConfig {
    /// 설정 혹은 환경 변수에서 API 키를 확정합니다.
    ///
    /// 공백 문자열 키는 미설정으로 취급합니다. 네트워크 호출 전에
    /// 키 부재를 확인하는 데 사용됩니다.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .map(String::from)
            .or_else(|| {
                std::env::var("DART_API_KEY")
                    .ok()
                    .filter(|key| !key.trim().is_empty())
            })
    }
}

/// 거래소 정보 API 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct KrxConfig {
    /// API 기본 URL
    #[serde(default = "default_krx_base_url")]
    pub base_url: String,
}

fn default_krx_base_url() -> String {
    "https://data.krx.co.kr/comm/bldAttendant".to_string()
}

impl Default for KrxConfig {
    fn default() -> Self {
        Self {
            base_url: default_krx_base_url(),
        }
    }
}

/// 시장 데이터 처리 설정.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MarketConfig {
    /// 파싱 불가능한 금액 처리 정책
    #[serde(default)]
    pub coercion_policy: CoercionPolicy,
}

/// 디렉토리 캐시 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    /// 디렉토리 캐시 TTL (초) - 레지스트리/ETF 목록은 천천히 변함
    #[serde(default = "default_directory_ttl_secs")]
    pub directory_ttl_secs: u64,
}

fn default_directory_ttl_secs() -> u64 {
    3600
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            directory_ttl_secs: default_directory_ttl_secs(),
        }
    }
}

/// HTTP 클라이언트 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HttpConfig {
    /// 요청 타임아웃 (초)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// User-Agent 헤더
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    format!("divscope/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// 로그 레벨
    #[serde(default = "default_log_level")]
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl AppConfig {
    /// 파일과 환경 변수에서 설정을 로드합니다.
    ///
    /// 파일이 없어도 기본값과 환경 변수만으로 동작합니다.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            // 파일에서 로드 (선택)
            .add_source(config::File::from(path.as_ref()).required(false))
            // 환경 변수로 오버라이드
            .add_source(
                config::Environment::with_prefix("DIVSCOPE")
                    .separator("__")
                    .try_parsing(true),
            );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// 기본 경로에서 설정을 로드합니다.
    pub fn load_default() -> Result<Self, config::ConfigError> {
        Self::load("config/default.toml")
    }
}
