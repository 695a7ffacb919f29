//! Yahoo Finance 해외 시장 클라이언트.
//!
//! Yahoo Finance API를 사용하여 해외 상장 주식/ETF의 일별 시세(OHLCV),
//! 배당 이력, 종목 요약 정보를 조회합니다.
//!
//! # 심볼 형식
//!
//! 모든 심볼은 Yahoo Finance 형식으로 전달되어야 합니다:
//! - 미국 주식: "AAPL", "MSFT"
//! - 미국 ETF: "SPY", "SCHD"
//!
//! # 사용 예제
//!
//! ```rust,ignore
//! use divscope_core::LookbackPeriod;
//! use divscope_data::provider::yahoo::{ForeignMarket, YahooMarketClient};
//!
//! let client = YahooMarketClient::new()?;
//! let bars = client.price_history("AAPL", LookbackPeriod::Y1).await?;
//! ```

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use tracing::{debug, warn};
use yahoo_finance_api as yahoo;

use divscope_core::{
    round_decimal_from_f64, FetchError, InstrumentProfile, LookbackPeriod, Result,
};

use super::retry_once;

/// 일별 시세 원본 행 (Unix 초 타임스탬프 + OHLCV).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawBar {
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

/// 해외 배당 이력 한 건.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForeignDividend {
    /// 배당 기준일
    pub date: NaiveDate,
    /// 1주당 배당금
    pub amount: Decimal,
}

/// 심볼 검색 결과 한 건.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignQuoteMatch {
    pub symbol: String,
    pub name: String,
    /// 종목 유형 ("EQUITY", "ETF" 등)
    pub quote_type: String,
    pub exchange: String,
}

/// 해외 시장 데이터 제공자 추상화.
///
/// 운영 구현은 [`YahooMarketClient`]이며, 테스트에서는 스텁 구현을
/// 주입할 수 있습니다.
#[async_trait]
pub trait ForeignMarket: Send + Sync {
    /// 키워드로 심볼을 검색합니다.
    async fn search(&self, keyword: &str) -> Result<Vec<ForeignQuoteMatch>>;

    /// 조회 구간의 일별 OHLCV를 반환합니다.
    ///
    /// 구간 내 데이터가 없는 종목은 빈 벡터를 반환합니다.
    async fn price_history(&self, ticker: &str, lookback: LookbackPeriod) -> Result<Vec<RawBar>>;

    /// 조회 구간의 배당 이력을 기준일 오름차순으로 반환합니다.
    async fn dividend_history(
        &self,
        ticker: &str,
        lookback: LookbackPeriod,
    ) -> Result<Vec<ForeignDividend>>;

    /// 종목 요약 정보 (이름, 현재가, 배당수익률, 시가총액).
    async fn profile(&self, ticker: &str) -> Result<InstrumentProfile>;
}

/// Yahoo Finance 기반 해외 시장 클라이언트.
pub struct YahooMarketClient {
    connector: yahoo::YahooConnector,
}

impl YahooMarketClient {
    /// 새 클라이언트를 생성합니다.
    pub fn new() -> Result<Self> {
        let connector = yahoo::YahooConnector::new()
            .map_err(|e| FetchError::Transport(format!("Yahoo Finance 연결 실패: {}", e)))?;
        Ok(Self { connector })
    }

    /// 심볼의 통화 코드 추정.
    fn guess_currency(symbol: &str) -> &'static str {
        if symbol.ends_with(".KS") || symbol.ends_with(".KQ") {
            "KRW"
        } else if symbol.ends_with(".T") {
            "JPY"
        } else if symbol.ends_with(".L") {
            "GBP"
        } else {
            "USD"
        }
    }

    /// 배당 원본 행 (타임스탬프 초 + 금액)을 변환합니다.
    ///
    /// 타임스탬프가 범위를 벗어나거나 금액이 NaN이면 None입니다.
    fn dividend_from_parts(date: i64, amount: f64) -> Option<ForeignDividend> {
        let date = DateTime::from_timestamp(date, 0)?.date_naive();
        let amount = round_decimal_from_f64(amount)?;
        Some(ForeignDividend { date, amount })
    }

    async fn request_search(&self, keyword: &str) -> Result<Vec<ForeignQuoteMatch>> {
        let search_result = self.connector.search_ticker(keyword).await.map_err(|e| {
            FetchError::Transport(format!("Yahoo Finance 검색 실패 ({}): {}", keyword, e))
        })?;

        // 티커 검색 결과에서는 제한된 정보만 제공됨
        let matches: Vec<ForeignQuoteMatch> = search_result
            .quotes
            .iter()
            .map(|item| {
                let name = if item.long_name.trim().is_empty() {
                    item.short_name.clone()
                } else {
                    item.long_name.clone()
                };
                ForeignQuoteMatch {
                    symbol: item.symbol.clone(),
                    name,
                    quote_type: item.quote_type.clone(),
                    exchange: item.exchange.clone(),
                }
            })
            .collect();

        debug!("Yahoo Finance: '{}' 검색 결과 {} 건", keyword, matches.len());
        Ok(matches)
    }

    async fn request_history(&self, ticker: &str, lookback: LookbackPeriod) -> Result<Vec<RawBar>> {
        let range = lookback.to_range_token();
        debug!(ticker = ticker, range = range, "Yahoo Finance 시세 조회");

        let response = match self.connector.get_quote_range(ticker, "1d", range).await {
            Ok(response) => response,
            Err(yahoo::YahooError::NoResult | yahoo::YahooError::NoQuotes) => {
                warn!("Yahoo Finance: {} 데이터 없음", ticker);
                return Ok(Vec::new());
            }
            Err(e) => {
                return Err(FetchError::Transport(format!(
                    "Yahoo Finance API 오류 ({}): {}",
                    ticker, e
                )));
            }
        };

        let quotes = match response.quotes() {
            Ok(quotes) => quotes,
            Err(yahoo::YahooError::NoResult | yahoo::YahooError::NoQuotes) => {
                warn!("Yahoo Finance: {} 데이터 없음", ticker);
                return Ok(Vec::new());
            }
            Err(e) => {
                return Err(FetchError::Decode(format!(
                    "Quote 파싱 오류 ({}): {}",
                    ticker, e
                )));
            }
        };

        debug!("Yahoo Finance: {} 캔들 {} 개 수신", ticker, quotes.len());

        Ok(quotes
            .iter()
            .map(|q| RawBar {
                timestamp: q.timestamp,
                open: q.open,
                high: q.high,
                low: q.low,
                close: q.close,
                volume: q.volume,
            })
            .collect())
    }

    async fn request_dividends(
        &self,
        ticker: &str,
        lookback: LookbackPeriod,
    ) -> Result<Vec<ForeignDividend>> {
        let range = lookback.to_range_token();
        debug!(ticker = ticker, range = range, "Yahoo Finance 배당 이력 조회");

        let response = match self.connector.get_quote_range(ticker, "1d", range).await {
            Ok(response) => response,
            Err(yahoo::YahooError::NoResult | yahoo::YahooError::NoQuotes) => {
                warn!("Yahoo Finance: {} 데이터 없음", ticker);
                return Ok(Vec::new());
            }
            Err(e) => {
                return Err(FetchError::Transport(format!(
                    "Yahoo Finance API 오류 ({}): {}",
                    ticker, e
                )));
            }
        };

        let raw = match response.dividends() {
            Ok(raw) => raw,
            // 배당 없는 종목은 정상 상태
            Err(yahoo::YahooError::NoResult | yahoo::YahooError::NoQuotes) => return Ok(Vec::new()),
            Err(e) => {
                return Err(FetchError::Decode(format!(
                    "배당 이력 파싱 오류 ({}): {}",
                    ticker, e
                )));
            }
        };

        let mut dividends: Vec<ForeignDividend> = raw
            .iter()
            .filter_map(|d| {
                let converted = Self::dividend_from_parts(d.date, d.amount);
                if converted.is_none() {
                    warn!(ticker = ticker, "변환 불가 배당 행 건너뜀");
                }
                converted
            })
            .collect();
        dividends.sort_by_key(|d| d.date);

        debug!("Yahoo Finance: {} 배당 {} 건 수신", ticker, dividends.len());
        Ok(dividends)
    }

    async fn request_profile(&self, ticker: &str) -> Result<InstrumentProfile> {
        // get_ticker_info는 &mut 커넥터를 요구하므로 호출마다 새로 만든다
        let mut connector = yahoo::YahooConnector::new()
            .map_err(|e| FetchError::Transport(format!("Yahoo Finance 연결 실패: {}", e)))?;
        let summary = connector.get_ticker_info(ticker).await.map_err(|e| {
            FetchError::Transport(format!("Yahoo ticker info 조회 실패 ({}): {}", ticker, e))
        })?;

        let quote_summary = summary.quote_summary.ok_or_else(|| {
            FetchError::Decode(format!("Yahoo ticker info 결과 없음: {}", ticker))
        })?;
        let result_data = quote_summary
            .result
            .and_then(|r| r.into_iter().next())
            .ok_or_else(|| {
                FetchError::Decode(format!("Yahoo ticker info 결과 비어있음: {}", ticker))
            })?;

        // SummaryDetail에서 시가총액과 배당수익률 추출
        let summary_detail = result_data.summary_detail.as_ref();
        let market_cap = summary_detail
            .and_then(|sd| sd.market_cap)
            .and_then(Decimal::from_u64);
        let dividend_yield = summary_detail
            .and_then(|sd| sd.trailing_annual_dividend_yield)
            .and_then(round_decimal_from_f64);

        // QuoteType에서 종목명 추출
        let name = result_data
            .quote_type
            .as_ref()
            .and_then(|qt| qt.long_name.clone().or(qt.short_name.clone()));

        // 현재가는 최근 일봉 종가로 채운다 (조회 실패 시 None)
        let current_price = self.latest_close(ticker).await;

        Ok(InstrumentProfile {
            name,
            currency: Some(Self::guess_currency(ticker).to_string()),
            current_price,
            dividend_yield,
            market_cap,
        })
    }

    /// 최근 5일 일봉에서 마지막 종가를 가져옵니다.
    async fn latest_close(&self, ticker: &str) -> Option<Decimal> {
        let response = self
            .connector
            .get_quote_range(ticker, "1d", "5d")
            .await
            .ok()?;
        let quotes = response.quotes().ok()?;
        quotes.last().and_then(|q| round_decimal_from_f64(q.close))
    }
}

#[async_trait]
impl ForeignMarket for YahooMarketClient {
    async fn search(&self, keyword: &str) -> Result<Vec<ForeignQuoteMatch>> {
        retry_once(|| self.request_search(keyword)).await
    }

    async fn price_history(&self, ticker: &str, lookback: LookbackPeriod) -> Result<Vec<RawBar>> {
        retry_once(|| self.request_history(ticker, lookback)).await
    }

    async fn dividend_history(
        &self,
        ticker: &str,
        lookback: LookbackPeriod,
    ) -> Result<Vec<ForeignDividend>> {
        retry_once(|| self.request_dividends(ticker, lookback)).await
    }

    async fn profile(&self, ticker: &str) -> Result<InstrumentProfile> {
        retry_once(|| self.request_profile(ticker)).await
    }
}
