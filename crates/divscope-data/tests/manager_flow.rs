//! 매니저 종합 흐름 통합 테스트.
//!
//! 스텁 해외 클라이언트와 mockito 국내 API로 종목 확정부터 배당/시세
//! 조회까지의 전체 경로와 슬롯별 부분 실패 처리를 검증합니다.

use std::io::Write;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate, Weekday};
use mockito::Matcher;
use rust_decimal_macros::dec;

use divscope_core::{
    AppConfig, CorporateActionQuery, FetchError, Instrument, InstrumentProfile, InstrumentQuery,
    InstrumentSource, LookbackPeriod, PeriodLabel, ReportPeriod, Result,
};
use divscope_data::provider::yahoo::{ForeignDividend, ForeignMarket, ForeignQuoteMatch, RawBar};
use divscope_data::MarketDataManager;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// 2023-01-02(월)부터 평일 n개의 Unix 타임스탬프.
fn trading_days(n: usize) -> Vec<i64> {
    let mut days = Vec::with_capacity(n);
    let mut current = date(2023, 1, 2);
    while days.len() < n {
        if !matches!(current.weekday(), Weekday::Sat | Weekday::Sun) {
            let ts = current.and_hms_opt(14, 30, 0).unwrap().and_utc().timestamp();
            days.push(ts);
        }
        current = current.succ_opt().unwrap();
    }
    days
}

/// 고정 응답을 돌려주는 해외 시장 스텁.
#[derive(Default)]
struct StubForeignMarket {
    fail_history: bool,
    reject_dividends: bool,
}

#[async_trait]
impl ForeignMarket for StubForeignMarket {
    async fn search(&self, keyword: &str) -> Result<Vec<ForeignQuoteMatch>> {
        if keyword.eq_ignore_ascii_case("AAPL") {
            Ok(vec![
                ForeignQuoteMatch {
                    symbol: "AAPL".to_string(),
                    name: "Apple Inc.".to_string(),
                    quote_type: "EQUITY".to_string(),
                    exchange: "NMS".to_string(),
                },
                ForeignQuoteMatch {
                    symbol: "APLE".to_string(),
                    name: "Apple Hospitality REIT, Inc.".to_string(),
                    quote_type: "EQUITY".to_string(),
                    exchange: "NYQ".to_string(),
                },
            ])
        } else {
            Ok(Vec::new())
        }
    }

    async fn price_history(
        &self,
        _ticker: &str,
        _lookback: LookbackPeriod,
    ) -> Result<Vec<RawBar>> {
        if self.fail_history {
            return Err(FetchError::Transport("모의 전송 실패".to_string()));
        }
        // 최신 바가 앞에 오는 역순으로 제공하여 정렬을 검증
        Ok(trading_days(252)
            .into_iter()
            .rev()
            .enumerate()
            .map(|(i, timestamp)| RawBar {
                timestamp,
                open: 150.0 + i as f64,
                high: 155.0 + i as f64,
                low: 149.0 + i as f64,
                close: 152.0 + i as f64,
                volume: 1_000_000,
            })
            .collect())
    }

    async fn dividend_history(
        &self,
        _ticker: &str,
        _lookback: LookbackPeriod,
    ) -> Result<Vec<ForeignDividend>> {
        if self.reject_dividends {
            return Err(FetchError::Provider {
                code: "900".to_string(),
                message: "모의 제공자 거절".to_string(),
            });
        }
        Ok(vec![
            ForeignDividend {
                date: date(2024, 2, 9),
                amount: dec!(0.24),
            },
            ForeignDividend {
                date: date(2024, 5, 10),
                amount: dec!(0.25),
            },
        ])
    }

    async fn profile(&self, _ticker: &str) -> Result<InstrumentProfile> {
        Ok(InstrumentProfile {
            name: Some("Apple Inc.".to_string()),
            currency: Some("USD".to_string()),
            current_price: Some(dec!(226.05)),
            dividend_yield: Some(dec!(0.0044)),
            market_cap: Some(dec!(3450000000000)),
        })
    }
}

fn foreign_manager(stub: StubForeignMarket) -> MarketDataManager {
    let mut config = AppConfig::default();
    config.dart.api_key = Some("testkey".to_string());
    MarketDataManager::new(config)
        .unwrap()
        .with_foreign_market(Arc::new(stub))
}

#[tokio::test]
async fn test_foreign_resolve_and_history_end_to_end() {
    let manager = foreign_manager(StubForeignMarket::default());

    let instrument = manager
        .resolve(&InstrumentQuery::parse("aapl"))
        .await
        .unwrap()
        .expect("AAPL 확정 실패");
    assert_eq!(instrument.source, InstrumentSource::ForeignEquity);
    assert_eq!(instrument.primary_code, "AAPL");
    assert_eq!(instrument.display_name, "Apple Inc.");

    let bars = manager
        .get_price_history(&instrument, LookbackPeriod::Y1)
        .await
        .unwrap();
    assert_eq!(bars.len(), 252);
    assert!(bars.windows(2).all(|pair| pair[0].date < pair[1].date));

    let actions = manager
        .get_corporate_actions(&instrument, &CorporateActionQuery::for_year(2024))
        .await
        .unwrap();
    assert_eq!(actions.len(), 2);
    assert_eq!(actions[0].amount, Some(dec!(0.24)));
    assert_eq!(actions[0].payment_date, Some(date(2024, 2, 9)));
}

#[tokio::test]
async fn test_overview_keeps_partial_failures_separate() {
    let manager = foreign_manager(StubForeignMarket {
        fail_history: true,
        ..Default::default()
    });
    let instrument = Instrument::new(InstrumentSource::ForeignEquity, "AAPL", "Apple Inc.");

    let overview = manager
        .get_overview(&instrument, &CorporateActionQuery::for_year(2024))
        .await;

    // 시세 실패가 요약/배당 슬롯을 막지 않는다
    assert!(overview.profile.is_ok());
    assert!(matches!(overview.bars, Err(FetchError::Transport(_))));
    assert_eq!(overview.actions.unwrap().len(), 2);
}

#[tokio::test]
async fn test_overview_preserves_provider_error_class() {
    let manager = foreign_manager(StubForeignMarket {
        reject_dividends: true,
        ..Default::default()
    });
    let instrument = Instrument::new(
        InstrumentSource::ForeignEtf,
        "SCHD",
        "Schwab US Dividend Equity ETF",
    );

    let overview = manager
        .get_overview(&instrument, &CorporateActionQuery::for_year(2024))
        .await;

    assert!(overview.profile.is_ok());
    assert!(overview.bars.is_ok());
    match overview.actions {
        Err(FetchError::Provider { code, .. }) => assert_eq!(code, "900"),
        other => panic!("Provider 에러가 보존되지 않음: {:?}", other),
    }
}

#[tokio::test]
async fn test_missing_api_key_is_config_error() {
    std::env::remove_var("DART_API_KEY");

    let error = MarketDataManager::new(AppConfig::default()).err().unwrap();
    assert!(matches!(error, FetchError::Config(_)));
}

#[tokio::test]
async fn test_domestic_price_history_is_unsupported() {
    let manager = foreign_manager(StubForeignMarket::default());
    let instrument = Instrument::new(InstrumentSource::DomesticEquity, "005930", "삼성전자");

    let error = manager
        .get_price_history(&instrument, LookbackPeriod::Y1)
        .await
        .unwrap_err();
    assert!(matches!(error, FetchError::Unsupported(_)));
}

#[tokio::test]
async fn test_domestic_actions_through_manager() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/alotMatter.json")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("corp_code".into(), "005930".into()),
            Matcher::UrlEncoded("bsns_year".into(), "2023".into()),
        ]))
        .with_status(200)
        .with_body(
            r#"{"status":"000","message":"정상","list":[{
                "se": "주당 현금배당금(원)",
                "stock_knd": "보통주",
                "thstrm": "1,444",
                "frmtrm": "1,444",
                "lwfr": "1,444",
                "thstrm_dt": "2024.04.19",
                "frmtrm_dt": "2023.04.14",
                "lwfr_dt": "2022.04.15"
            }]}"#,
        )
        .create_async()
        .await;

    let mut config = AppConfig::default();
    config.dart.api_key = Some("testkey".to_string());
    config.dart.base_url = server.url();
    let manager = MarketDataManager::new(config)
        .unwrap()
        .with_foreign_market(Arc::new(StubForeignMarket::default()));

    let instrument = Instrument::new(InstrumentSource::DomesticEquity, "005930", "삼성전자");
    let query = CorporateActionQuery::for_year(2023).with_report_period(ReportPeriod::Annual);
    let actions = manager
        .get_corporate_actions(&instrument, &query)
        .await
        .unwrap();

    mock.assert_async().await;
    // 당기/전기/전전기 3건으로 전개
    assert_eq!(actions.len(), 3);
    assert_eq!(actions[0].period_label, PeriodLabel::Current);
    assert_eq!(actions[0].amount, Some(dec!(1444)));
    assert_eq!(actions[0].payment_date, Some(date(2024, 4, 19)));
    assert_eq!(actions[0].security_class.as_deref(), Some("보통주"));
}

#[tokio::test]
async fn test_domestic_etf_actions_use_standard_code() {
    let body = r#"{
        "output": [
            {
                "ISU_SRT_CD": "069500",
                "ISU_ABBRV": "KODEX 200",
                "RGT_RCD_DD": "2024/04/30",
                "CASH_PAY_DD": "2024/05/03",
                "ALOC_AMT": "1,050",
                "ALOC_ERN_RT": "2.51"
            }
        ]
    }"#;

    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/getJsonData.cmd")
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("bld".into(), "dbms/MDC/STAT/standard/MDCSTAT04701".into()),
            Matcher::UrlEncoded("isuCd".into(), "KR7069500007".into()),
            Matcher::UrlEncoded("strtDd".into(), "20240101".into()),
            Matcher::UrlEncoded("endDd".into(), "20241231".into()),
        ]))
        .with_status(200)
        .with_body(body)
        .create_async()
        .await;

    let mut config = AppConfig::default();
    config.dart.api_key = Some("testkey".to_string());
    config.krx.base_url = server.url();
    let manager = MarketDataManager::new(config)
        .unwrap()
        .with_foreign_market(Arc::new(StubForeignMarket::default()));

    let instrument = Instrument::new(InstrumentSource::DomesticEtf, "069500", "KODEX 200")
        .with_standard_code("KR7069500007");
    let query =
        CorporateActionQuery::for_year(2024).with_range(date(2024, 1, 1), date(2024, 12, 31));
    let actions = manager
        .get_corporate_actions(&instrument, &query)
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(actions.len(), 1);
    assert_eq!(actions[0].period_label, PeriodLabel::Payment(date(2024, 5, 3)));
    assert_eq!(actions[0].amount, Some(dec!(1050)));
    assert_eq!(actions[0].payment_date, Some(date(2024, 5, 3)));
}

/// 기업 디렉토리 ZIP 응답 본문을 만듭니다.
fn build_corp_zip() -> Vec<u8> {
    let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<result>
    <list>
        <corp_code>00126380</corp_code>
        <corp_name>삼성전자</corp_name>
        <stock_code>005930</stock_code>
        <modify_date>20240102</modify_date>
    </list>
</result>"#;

    let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    writer
        .start_file("CORPCODE.xml", zip::write::SimpleFileOptions::default())
        .unwrap();
    writer.write_all(xml.as_bytes()).unwrap();
    writer.finish().unwrap().into_inner()
}

#[tokio::test]
async fn test_resolve_domestic_code_and_name() {
    let etf_body = r#"{
        "output": [
            {
                "ISU_CD": "KR7069500007",
                "ISU_SRT_CD": "069500",
                "ISU_ABBRV": "KODEX 200",
                "ETF_OBJ_IDX_NM": "코스피 200",
                "COM_ABBRV": "삼성자산운용"
            }
        ]
    }"#;

    let mut server = mockito::Server::new_async().await;
    // 디렉토리는 캐시되므로 각 엔드포인트는 한 번만 호출된다
    let etf_mock = server
        .mock("POST", "/getJsonData.cmd")
        .match_body(Matcher::UrlEncoded(
            "bld".into(),
            "dbms/MDC/STAT/standard/MDCSTAT04601".into(),
        ))
        .with_status(200)
        .with_body(etf_body)
        .expect(1)
        .create_async()
        .await;
    let corp_mock = server
        .mock("GET", "/corpCode.xml")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(build_corp_zip())
        .expect(1)
        .create_async()
        .await;

    let mut config = AppConfig::default();
    config.dart.api_key = Some("testkey".to_string());
    config.dart.base_url = server.url();
    config.krx.base_url = server.url();
    let manager = MarketDataManager::new(config)
        .unwrap()
        .with_foreign_market(Arc::new(StubForeignMarket::default()));

    // ETF 단축코드는 레지스트리 조회 없이 확정
    let etf = manager
        .resolve(&InstrumentQuery::parse("069500"))
        .await
        .unwrap()
        .expect("ETF 확정 실패");
    assert_eq!(etf.source, InstrumentSource::DomesticEtf);
    assert_eq!(etf.standard_code.as_deref(), Some("KR7069500007"));

    // 주식 코드는 기업 레지스트리에서 확정
    let equity = manager
        .resolve(&InstrumentQuery::parse("005930"))
        .await
        .unwrap()
        .expect("주식 확정 실패");
    assert_eq!(equity.source, InstrumentSource::DomesticEquity);
    assert_eq!(equity.display_name, "삼성전자");

    // 이름 검색도 캐시된 디렉토리를 재사용
    let by_name = manager
        .resolve(&InstrumentQuery::DomesticName("삼성".to_string()))
        .await
        .unwrap()
        .expect("이름 확정 실패");
    assert_eq!(by_name.primary_code, "005930");

    etf_mock.assert_async().await;
    corp_mock.assert_async().await;
}

#[tokio::test]
async fn test_resolve_unknown_foreign_ticker_is_none() {
    let manager = foreign_manager(StubForeignMarket::default());

    let resolved = manager
        .resolve(&InstrumentQuery::parse("ZZZZ"))
        .await
        .unwrap();
    assert!(resolved.is_none());
}
