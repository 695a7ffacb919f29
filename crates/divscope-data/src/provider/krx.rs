//! KRX 정보데이터시스템 클라이언트.
//!
//! 한국거래소 정보데이터시스템의 화면 조회용 JSON 엔드포인트에서
//! ETF 데이터를 조회합니다. 인증키 없이 `bld` 쿼리 템플릿 이름과
//! Referer 헤더만으로 동작합니다.
//!
//! # 지원 데이터
//!
//! - 전체 ETF 기본 정보 (표준코드/단축코드/종목약명)
//! - ETF 분배금 내역 (기준일/지급일/주당 분배금)
//!
//! # 사용 예제
//!
//! ```rust,ignore
//! use divscope_core::HttpConfig;
//! use divscope_data::provider::krx::KrxClient;
//!
//! let krx = KrxClient::new(&HttpConfig::default());
//! let listings = krx.fetch_etf_directory().await?;
//! ```

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, info, warn};

use divscope_core::{CoercionPolicy, FetchError, HttpConfig, Result};

use crate::normalize::{parse_amount_opt, parse_date_flexible};

use super::{build_http_client, retry_once, truncate_body};

/// KRX 정보데이터시스템 기본 URL.
const KRX_BASE_URL: &str = "https://data.krx.co.kr/comm/bldAttendant";

/// 화면 조회 엔드포인트 경로.
const KRX_JSON_PATH: &str = "getJsonData.cmd";

/// 외부 로더 Referer. 이 헤더가 없으면 KRX가 요청을 거부한다.
const KRX_REFERER: &str = "https://data.krx.co.kr/contents/MDC/MDI/outerLoader/index.cmd";

/// ETF 전종목 기본정보 bld.
const BLD_ETF_DIRECTORY: &str = "dbms/MDC/STAT/standard/MDCSTAT04601";

/// ETF 분배금 내역 bld.
const BLD_ETF_DISTRIBUTION: &str = "dbms/MDC/STAT/standard/MDCSTAT04701";

/// 화면 조회 응답 래퍼.
#[derive(Debug, Deserialize)]
struct KrxScreenResponse<T> {
    /// 출력 데이터 배열.
    #[serde(default)]
    output: Vec<T>,
}

/// ETF 기본정보 원본 행.
#[derive(Debug, Default, Deserialize)]
struct RawEtfRow {
    /// 표준코드 (ISIN)
    #[serde(rename = "ISU_CD", default)]
    isu_cd: String,
    /// 단축코드 (6자리)
    #[serde(rename = "ISU_SRT_CD", default)]
    isu_srt_cd: String,
    /// 종목약명
    #[serde(rename = "ISU_ABBRV", default)]
    isu_abbrv: String,
    /// 기초지수명
    #[serde(rename = "ETF_OBJ_IDX_NM", default)]
    etf_obj_idx_nm: String,
    /// 운용사
    #[serde(rename = "COM_ABBRV", default)]
    com_abbrv: String,
}

/// ETF 분배금 원본 행.
#[derive(Debug, Default, Deserialize)]
struct RawDistributionRow {
    /// 단축코드
    #[serde(rename = "ISU_SRT_CD", default)]
    isu_srt_cd: String,
    /// 종목약명
    #[serde(rename = "ISU_ABBRV", default)]
    isu_abbrv: String,
    /// 권리 기준일
    #[serde(rename = "RGT_RCD_DD", default)]
    rgt_rcd_dd: String,
    /// 현금 지급일
    #[serde(rename = "CASH_PAY_DD", default)]
    cash_pay_dd: String,
    /// 주당 분배금 (천 단위 쉼표 포함 문자열)
    #[serde(rename = "ALOC_AMT", default)]
    aloc_amt: String,
    /// 분배율 (%)
    #[serde(rename = "ALOC_ERN_RT", default)]
    aloc_ern_rt: String,
}

/// ETF 기본정보 (표준코드/단축코드/종목약명 삼중쌍).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EtfListingRow {
    /// 표준코드 (ISIN)
    pub standard_code: String,
    /// 단축코드 (6자리)
    pub short_code: String,
    /// 종목약명
    pub name: String,
    /// 기초지수명
    pub underlying_index: Option<String>,
    /// 운용사
    pub manager_name: Option<String>,
}

/// ETF 분배금 내역 한 건.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistributionRow {
    /// 단축코드
    pub code: String,
    /// 종목약명
    pub name: String,
    /// 권리 기준일
    pub record_date: Option<NaiveDate>,
    /// 현금 지급일
    pub payment_date: Option<NaiveDate>,
    /// 주당 분배금 (파싱 불가면 None)
    pub amount: Option<Decimal>,
    /// 분배율 (%)
    pub yield_rate: Option<Decimal>,
}

/// KRX 정보데이터시스템 클라이언트.
#[derive(Clone)]
pub struct KrxClient {
    client: reqwest::Client,
    base_url: String,
    policy: CoercionPolicy,
}

impl KrxClient {
    /// 새 클라이언트 생성.
    pub fn new(http: &HttpConfig) -> Self {
        Self {
            client: build_http_client(http),
            base_url: KRX_BASE_URL.to_string(),
            policy: CoercionPolicy::default(),
        }
    }

    /// 수치 강제 변환 정책 교체.
    pub fn with_policy(mut self, policy: CoercionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// 기본 URL 교체 (테스트 서버 주입용).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// 전체 ETF 기본정보 조회.
    pub async fn fetch_etf_directory(&self) -> Result<Vec<EtfListingRow>> {
        let params = [("locale", "ko_KR")];
        let raw: Vec<RawEtfRow> =
            retry_once(|| self.request_rows(BLD_ETF_DIRECTORY, &params)).await?;

        let listings: Vec<EtfListingRow> = raw.into_iter().map(EtfListingRow::from_raw).collect();
        info!(count = listings.len(), "ETF 디렉토리 조회 완료");
        Ok(listings)
    }

    /// 기간 내 ETF 분배금 내역 조회.
    ///
    /// `security_code`는 표준코드(ISIN)를 우선 사용합니다. 기간 내 분배가
    /// 없으면 빈 목록이며 에러가 아닙니다. 금액 파싱 실패 처리는
    /// 설정된 정책을 따릅니다.
    pub async fn fetch_distributions(
        &self,
        security_code: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DistributionRow>> {
        let from_param = from.format("%Y%m%d").to_string();
        let to_param = to.format("%Y%m%d").to_string();
        let params = [
            ("locale", "ko_KR"),
            ("isuCd", security_code),
            ("strtDd", from_param.as_str()),
            ("endDd", to_param.as_str()),
        ];

        let raw: Vec<RawDistributionRow> =
            retry_once(|| self.request_rows(BLD_ETF_DISTRIBUTION, &params)).await?;

        let rows = self.convert_distributions(raw);
        info!(
            security_code = security_code,
            count = rows.len(),
            "ETF 분배금 조회 완료"
        );
        Ok(rows)
    }

    /// 분배금 원본 행 변환.
    ///
    /// 값이 아예 없는 필드("", "-")는 None으로 두고, 내용이 있는데 파싱이
    /// 안 되는 금액은 정책에 따라 필드 무효화 또는 행 폐기합니다.
    fn convert_distributions(&self, raw: Vec<RawDistributionRow>) -> Vec<DistributionRow> {
        let mut rows = Vec::with_capacity(raw.len());

        for item in raw {
            let amount = parse_amount_opt(&item.aloc_amt);
            if amount.is_none() && has_content(&item.aloc_amt) {
                if self.policy.keeps_row() {
                    debug!(
                        code = %item.isu_srt_cd,
                        value = %item.aloc_amt,
                        "분배금 파싱 불가, 필드 무효화"
                    );
                } else {
                    warn!(
                        code = %item.isu_srt_cd,
                        value = %item.aloc_amt,
                        "분배금 파싱 불가, 행 폐기"
                    );
                    continue;
                }
            }

            rows.push(DistributionRow {
                code: item.isu_srt_cd.trim().to_string(),
                name: item.isu_abbrv.trim().to_string(),
                record_date: parse_date_flexible(&item.rgt_rcd_dd),
                payment_date: parse_date_flexible(&item.cash_pay_dd),
                amount,
                yield_rate: parse_amount_opt(&item.aloc_ern_rt),
            });
        }

        rows
    }

    /// 화면 조회 요청 공통 처리.
    async fn request_rows<T: DeserializeOwned + Default>(
        &self,
        bld: &str,
        extra: &[(&str, &str)],
    ) -> Result<Vec<T>> {
        let url = format!("{}/{}", self.base_url, KRX_JSON_PATH);
        let mut params = vec![("bld", bld)];
        params.extend_from_slice(extra);

        debug!(bld = bld, "KRX 화면 조회 요청");

        let response = self
            .client
            .post(&url)
            .header("Referer", KRX_REFERER)
            .form(&params)
            .send()
            .await
            .map_err(|e| FetchError::Transport(format!("KRX API 호출 실패: {}", e)))?;

        if !response.status().is_success() {
            return Err(FetchError::Transport(format!(
                "KRX API 오류: {}",
                response.status()
            )));
        }

        let text = response
            .text()
            .await
            .map_err(|e| FetchError::Transport(format!("응답 읽기 실패: {}", e)))?;

        let parsed: KrxScreenResponse<T> = serde_json::from_str(&text).map_err(|e| {
            FetchError::Decode(format!(
                "JSON 파싱 실패: {} - {}",
                e,
                truncate_body(&text, 200)
            ))
        })?;

        Ok(parsed.output)
    }
}

impl EtfListingRow {
    fn from_raw(raw: RawEtfRow) -> Self {
        Self {
            standard_code: raw.isu_cd.trim().to_string(),
            short_code: raw.isu_srt_cd.trim().to_string(),
            name: raw.isu_abbrv.trim().to_string(),
            underlying_index: non_blank(&raw.etf_obj_idx_nm),
            manager_name: non_blank(&raw.com_abbrv),
        }
    }
}

/// 내용이 있는 값인지 확인 ("", "-"는 무값 표기).
fn has_content(raw: &str) -> bool {
    let trimmed = raw.trim();
    !trimmed.is_empty() && trimmed != "-"
}

/// 무값 표기("", "-")를 None으로 변환.
fn non_blank(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if has_content(trimmed) {
        Some(trimmed.to_string())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn raw_distribution(amount: &str) -> RawDistributionRow {
        RawDistributionRow {
            isu_srt_cd: "466920".to_string(),
            isu_abbrv: "SOL 조선TOP3플러스".to_string(),
            rgt_rcd_dd: "2024/04/30".to_string(),
            cash_pay_dd: "2024/05/03".to_string(),
            aloc_amt: amount.to_string(),
            aloc_ern_rt: "0.55".to_string(),
        }
    }

    #[test]
    fn test_convert_distribution_parses_formatted_amount() {
        let client = KrxClient::new(&HttpConfig::default());
        let rows = client.convert_distributions(vec![raw_distribution("1,234,567")]);

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].amount, Some(dec!(1234567)));
        assert_eq!(
            rows[0].record_date,
            NaiveDate::from_ymd_opt(2024, 4, 30)
        );
        assert_eq!(rows[0].yield_rate, Some(dec!(0.55)));
    }

    #[test]
    fn test_convert_distribution_nullifies_unparsable_amount() {
        let client = KrxClient::new(&HttpConfig::default());
        let rows = client.convert_distributions(vec![raw_distribution("N/A")]);

        // 기본 정책: 필드만 무효화하고 행은 유지
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].amount, None);
        assert_eq!(rows[0].code, "466920");
    }

    #[test]
    fn test_convert_distribution_drop_row_policy() {
        let client =
            KrxClient::new(&HttpConfig::default()).with_policy(CoercionPolicy::DropRow);
        let rows = client.convert_distributions(vec![
            raw_distribution("N/A"),
            raw_distribution("55"),
        ]);

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].amount, Some(dec!(55)));
    }

    #[test]
    fn test_convert_distribution_missing_amount_kept_under_both_policies() {
        for policy in [CoercionPolicy::NullifyField, CoercionPolicy::DropRow] {
            let client = KrxClient::new(&HttpConfig::default()).with_policy(policy);
            let rows = client.convert_distributions(vec![raw_distribution("-")]);
            assert_eq!(rows.len(), 1, "무값 표기는 행을 버리지 않음");
            assert_eq!(rows[0].amount, None);
        }
    }

    #[test]
    fn test_etf_row_trims_and_drops_blank_optionals() {
        let row = EtfListingRow::from_raw(RawEtfRow {
            isu_cd: " KR7466920006 ".to_string(),
            isu_srt_cd: "466920".to_string(),
            isu_abbrv: "SOL 조선TOP3플러스".to_string(),
            etf_obj_idx_nm: "  ".to_string(),
            com_abbrv: "신한자산운용".to_string(),
        });

        assert_eq!(row.standard_code, "KR7466920006");
        assert_eq!(row.underlying_index, None);
        assert_eq!(row.manager_name.as_deref(), Some("신한자산운용"));

        let dashed = EtfListingRow::from_raw(RawEtfRow {
            isu_cd: "KR7069500007".to_string(),
            isu_srt_cd: "069500".to_string(),
            isu_abbrv: "KODEX 200".to_string(),
            etf_obj_idx_nm: "-".to_string(),
            com_abbrv: "-".to_string(),
        });
        assert_eq!(dashed.underlying_index, None);
        assert_eq!(dashed.manager_name, None);
    }
}
