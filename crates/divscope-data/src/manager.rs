//! 시장 데이터 통합 매니저.
//!
//! 국내 공시(DART), 거래소 정보(KRX), 해외 시장(Yahoo Finance) 클라이언트를
//! 조정하여 종목 확정과 배당/시세 조회의 단일 진입점을 제공합니다.

use std::sync::Arc;

use chrono::{Duration, NaiveDate, Utc};
use tracing::{debug, info, instrument, warn};

use divscope_core::{
    AppConfig, CorporateActionQuery, CorporateActionRecord, FetchError, Instrument,
    InstrumentProfile, InstrumentQuery, InstrumentSource, LookbackPeriod, PriceBar, Result,
};

use crate::cache::directory::{DirectoryCache, FetchFailure};
use crate::normalize;
use crate::provider::dart::{AllotmentRow, CorpDirectory, DartClient};
use crate::provider::krx::{EtfListingRow, KrxClient};
use crate::provider::yahoo::{ForeignMarket, YahooMarketClient};

/// 디렉토리 캐시 키.
const CORP_DIRECTORY_KEY: &str = "dart:corp-directory";
const ETF_DIRECTORY_KEY: &str = "krx:etf-directory";

/// 해외 종목 종합 조회 결과.
///
/// 슬롯별 부분 실패를 허용하기 위해 각 항목이 Result입니다.
#[derive(Debug)]
pub struct MarketOverview {
    pub instrument: Instrument,
    pub profile: Result<InstrumentProfile>,
    pub bars: Result<Vec<PriceBar>>,
    pub actions: Result<Vec<CorporateActionRecord>>,
}

/// 소스별 클라이언트를 조정하는 중앙 매니저.
pub struct MarketDataManager {
    config: AppConfig,
    dart: DartClient,
    krx: KrxClient,
    foreign: Arc<dyn ForeignMarket>,

    // 디렉토리 캐시 (인메모리)
    corp_directory: DirectoryCache<CorpDirectory>,
    etf_directory: DirectoryCache<Vec<EtfListingRow>>,
}

impl MarketDataManager {
    /// 새 매니저를 생성합니다.
    ///
    /// DART API 키가 설정과 환경 변수 어디에도 없으면 네트워크 호출 전에
    /// 설정 에러를 반환합니다.
    pub fn new(config: AppConfig) -> Result<Self> {
        let api_key = config.dart.resolve_api_key().ok_or_else(|| {
            FetchError::Config(
                "DART API 키가 없습니다 (설정 dart.api_key 또는 DART_API_KEY 환경 변수)"
                    .to_string(),
            )
        })?;

        let dart =
            DartClient::new(api_key, &config.http).with_base_url(config.dart.base_url.clone());
        let krx = KrxClient::new(&config.http)
            .with_policy(config.market.coercion_policy)
            .with_base_url(config.krx.base_url.clone());
        let foreign: Arc<dyn ForeignMarket> = Arc::new(YahooMarketClient::new()?);

        info!("MarketDataManager 초기화 완료");

        Ok(Self {
            config,
            dart,
            krx,
            foreign,
            corp_directory: DirectoryCache::new(),
            etf_directory: DirectoryCache::new(),
        })
    }

    /// 해외 시장 클라이언트를 교체합니다 (테스트 주입용).
    pub fn with_foreign_market(mut self, foreign: Arc<dyn ForeignMarket>) -> Self {
        self.foreign = foreign;
        self
    }

    fn directory_ttl(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.config.cache.directory_ttl_secs)
    }

    /// 기업 레지스트리를 가져옵니다 (캐시 우선).
    async fn corp_directory(&self) -> Result<Arc<CorpDirectory>> {
        let dart = self.dart.clone();
        let result = self
            .corp_directory
            .get_or_fetch(CORP_DIRECTORY_KEY, self.directory_ttl(), move || async move {
                dart.fetch_corp_directory().await
            })
            .await;
        unwrap_or_stale(result, "기업 레지스트리")
    }

    /// ETF 디렉토리를 가져옵니다 (캐시 우선).
    async fn etf_directory(&self) -> Result<Arc<Vec<EtfListingRow>>> {
        let krx = self.krx.clone();
        let result = self
            .etf_directory
            .get_or_fetch(ETF_DIRECTORY_KEY, self.directory_ttl(), move || async move {
                krx.fetch_etf_directory().await
            })
            .await;
        unwrap_or_stale(result, "ETF 디렉토리")
    }

    // =========================================================================
    // 종목 확정
    // =========================================================================

    /// 질의를 종목 레코드로 확정합니다.
    ///
    /// 일치하는 종목이 없으면 Ok(None)입니다.
    #[instrument(skip(self))]
    pub async fn resolve(&self, query: &InstrumentQuery) -> Result<Option<Instrument>> {
        match query {
            InstrumentQuery::DomesticCode(code) => self.resolve_domestic_code(code).await,
            InstrumentQuery::DomesticName(name) => {
                Ok(self.search_domestic(name).await?.into_iter().next())
            }
            InstrumentQuery::ForeignTicker(ticker) => self.resolve_foreign(ticker).await,
        }
    }

    /// 6자리 코드로 국내 종목을 확정합니다.
    ///
    /// ETF 디렉토리의 단축코드를 먼저 확인하고, 없으면 기업 레지스트리에서
    /// 찾습니다.
    async fn resolve_domestic_code(&self, code: &str) -> Result<Option<Instrument>> {
        let etfs = self.etf_directory().await?;
        if let Some(row) = etfs.iter().find(|row| row.short_code == code) {
            return Ok(Some(normalize::instrument_from_etf_listing(row)));
        }

        let registry = self.corp_directory().await?;
        Ok(registry
            .find_by_ticker(code)
            .and_then(normalize::instrument_from_corp_entry))
    }

    /// 이름 조각으로 국내 종목을 검색합니다.
    ///
    /// 기업 레지스트리와 ETF 디렉토리 양쪽에서 부분 일치로 찾습니다.
    #[instrument(skip(self))]
    pub async fn search_domestic(&self, fragment: &str) -> Result<Vec<Instrument>> {
        let needle = fragment.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(Vec::new());
        }

        let registry = self.corp_directory().await?;
        let etfs = self.etf_directory().await?;

        let mut results: Vec<Instrument> = registry
            .search_by_name(fragment)
            .into_iter()
            .filter_map(normalize::instrument_from_corp_entry)
            .collect();
        results.extend(
            etfs.iter()
                .filter(|row| row.name.to_lowercase().contains(&needle))
                .map(normalize::instrument_from_etf_listing),
        );

        debug!(fragment = fragment, count = results.len(), "국내 검색 완료");
        Ok(results)
    }

    /// 해외 티커를 검색으로 확정합니다.
    ///
    /// 심볼 정확 일치를 우선하고, 없으면 첫 번째 검색 결과를 사용합니다.
    async fn resolve_foreign(&self, ticker: &str) -> Result<Option<Instrument>> {
        let matches = self.foreign.search(ticker).await?;
        let best = matches
            .iter()
            .find(|m| m.symbol.eq_ignore_ascii_case(ticker))
            .or_else(|| matches.first());
        Ok(best.map(normalize::instrument_from_quote_match))
    }

    // =========================================================================
    // 배당/분배 조회
    // =========================================================================

    /// 종목의 배당/분배 내역을 조회합니다.
    ///
    /// 소스에 따라 담당 클라이언트로 분기합니다. 기간 내 내역이 없으면
    /// 빈 벡터이며 에러가 아닙니다.
    #[instrument(skip(self, instrument), fields(code = %instrument.primary_code))]
    pub async fn get_corporate_actions(
        &self,
        instrument: &Instrument,
        query: &CorporateActionQuery,
    ) -> Result<Vec<CorporateActionRecord>> {
        match instrument.source {
            InstrumentSource::DomesticEquity => {
                let rows = self
                    .dart
                    .fetch_dividend_report(
                        &instrument.primary_code,
                        query.fiscal_year,
                        query.report_period,
                    )
                    .await?;
                Ok(normalize::actions_from_allotment(&rows))
            }
            InstrumentSource::DomesticEtf => {
                let (from, to) = distribution_range(query, Utc::now().date_naive());
                let code = instrument
                    .standard_code
                    .as_deref()
                    .unwrap_or(&instrument.primary_code);
                let rows = self.krx.fetch_distributions(code, from, to).await?;
                Ok(normalize::actions_from_distributions(&rows))
            }
            InstrumentSource::ForeignEquity | InstrumentSource::ForeignEtf => {
                let series = self
                    .foreign
                    .dividend_history(&instrument.primary_code, query.lookback)
                    .await?;
                Ok(normalize::actions_from_foreign_dividends(&series))
            }
        }
    }

    /// 국내 주식의 배당 공시 원본 행을 조회합니다.
    ///
    /// 표 형태 출력처럼 전체 공시 항목이 필요한 경우를 위해 정규화 전
    /// 행을 그대로 반환합니다.
    #[instrument(skip(self, instrument), fields(code = %instrument.primary_code))]
    pub async fn get_allotment_report(
        &self,
        instrument: &Instrument,
        query: &CorporateActionQuery,
    ) -> Result<Vec<AllotmentRow>> {
        if instrument.source != InstrumentSource::DomesticEquity {
            return Err(FetchError::Unsupported(format!(
                "배당 공시 원본 조회는 국내 주식 전용입니다: {}",
                instrument.primary_code
            )));
        }

        self.dart
            .fetch_dividend_report(
                &instrument.primary_code,
                query.fiscal_year,
                query.report_period,
            )
            .await
    }

    // =========================================================================
    // 시세/요약 조회
    // =========================================================================

    /// 해외 종목의 일별 시세를 조회합니다.
    ///
    /// 국내 소스는 시세 조회를 지원하지 않습니다.
    #[instrument(skip(self, instrument), fields(code = %instrument.primary_code))]
    pub async fn get_price_history(
        &self,
        instrument: &Instrument,
        lookback: LookbackPeriod,
    ) -> Result<Vec<PriceBar>> {
        if instrument.source.is_domestic() {
            return Err(FetchError::Unsupported(format!(
                "국내 종목 시세 조회는 지원하지 않습니다: {}",
                instrument.primary_code
            )));
        }

        let raw = self
            .foreign
            .price_history(&instrument.primary_code, lookback)
            .await?;
        Ok(normalize::to_price_bars(&raw))
    }

    /// 해외 종목의 요약 정보를 조회합니다.
    #[instrument(skip(self, instrument), fields(code = %instrument.primary_code))]
    pub async fn get_profile(&self, instrument: &Instrument) -> Result<InstrumentProfile> {
        if instrument.source.is_domestic() {
            return Err(FetchError::Unsupported(format!(
                "국내 종목 요약 정보 조회는 지원하지 않습니다: {}",
                instrument.primary_code
            )));
        }

        self.foreign.profile(&instrument.primary_code).await
    }

    /// 해외 종목의 요약/시세/배당을 동시에 조회합니다.
    ///
    /// 한 슬롯의 실패가 다른 슬롯을 취소하지 않으며, 각 슬롯의 에러는
    /// 원래 분류 그대로 보존됩니다.
    #[instrument(skip(self, instrument), fields(code = %instrument.primary_code))]
    pub async fn get_overview(
        &self,
        instrument: &Instrument,
        query: &CorporateActionQuery,
    ) -> MarketOverview {
        let (profile, bars, actions) = tokio::join!(
            self.get_profile(instrument),
            self.get_price_history(instrument, query.lookback),
            self.get_corporate_actions(instrument, query),
        );

        MarketOverview {
            instrument: instrument.clone(),
            profile,
            bars,
            actions,
        }
    }
}

/// 캐시 갱신 실패를 처리합니다.
///
/// 보유 중인 이전 값이 있으면 경고 후 그대로 사용하고, 없으면 원래
/// 에러를 전파합니다.
fn unwrap_or_stale<T>(
    result: std::result::Result<Arc<T>, FetchFailure<T>>,
    what: &str,
) -> Result<Arc<T>> {
    match result {
        Ok(value) => Ok(value),
        Err(failure) => match failure.stale {
            Some(stale) => {
                warn!(error = %failure.error, "{} 갱신 실패, 이전 값 사용", what);
                Ok(stale)
            }
            None => Err(failure.error),
        },
    }
}

/// 분배금 조회 날짜 범위를 확정합니다.
///
/// 질의에 명시된 범위가 있으면 그대로 쓰고, 없으면 조회 구간 일수만큼
/// 오늘부터 역산합니다.
fn distribution_range(query: &CorporateActionQuery, today: NaiveDate) -> (NaiveDate, NaiveDate) {
    match query.range {
        Some(range) => range,
        None => (today - Duration::days(query.lookback.approx_days()), today),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distribution_range_prefers_explicit() {
        let from = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let to = NaiveDate::from_ymd_opt(2024, 6, 28).unwrap();
        let query = CorporateActionQuery::for_year(2024).with_range(from, to);
        let today = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();

        assert_eq!(distribution_range(&query, today), (from, to));
    }

    #[test]
    fn test_distribution_range_derives_from_lookback() {
        let query = CorporateActionQuery::for_year(2024).with_lookback(LookbackPeriod::M3);
        let today = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();

        let (from, to) = distribution_range(&query, today);
        assert_eq!(to, today);
        assert_eq!(from, today - Duration::days(91));
    }

    #[test]
    fn test_unwrap_or_stale_serves_previous_value() {
        let failure: FetchFailure<i32> = FetchFailure {
            error: FetchError::Transport("연결 끊김".to_string()),
            stale: Some(Arc::new(42)),
        };
        let served = unwrap_or_stale(Err(failure), "테스트 디렉토리").unwrap();
        assert_eq!(*served, 42);
    }

    #[test]
    fn test_unwrap_or_stale_propagates_without_previous_value() {
        let failure: FetchFailure<i32> = FetchFailure {
            error: FetchError::Transport("연결 끊김".to_string()),
            stale: None,
        };
        let result = unwrap_or_stale(Err(failure), "테스트 디렉토리");
        assert!(matches!(result, Err(FetchError::Transport(_))));
    }
}
