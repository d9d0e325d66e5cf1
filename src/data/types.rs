//! Wire types for the IPO data API.
//!
//! The upstream database stores most numerics as text (prices sometimes
//! carry a currency suffix like "10.00 HKD") and the prospectus table
//! uses Chinese column names, so deserialization is deliberately
//! permissive: numbers may arrive as numbers or strings, dates in a few
//! common formats.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};

/// Identity and offering terms of one IPO. Read-only to the engine.
#[derive(Debug, Clone, Deserialize)]
pub struct StockInfo {
    #[serde(rename = "代码", deserialize_with = "de_string")]
    pub code: String,
    #[serde(rename = "名称", alias = "股票名")]
    pub name: String,
    #[serde(rename = "发行价", deserialize_with = "de_opt_price", default)]
    pub issue_price: Option<f64>,
    #[serde(rename = "招股定价上限", deserialize_with = "de_opt_price", default)]
    pub price_ceiling: Option<f64>,
    #[serde(rename = "每手股数", deserialize_with = "de_opt_number", default)]
    pub board_lot: Option<f64>,
    #[serde(rename = "总发行股数", deserialize_with = "de_opt_number", default)]
    pub total_offer_shares: Option<f64>,
    #[serde(rename = "公开发售股数", deserialize_with = "de_opt_number", default)]
    pub public_offer_shares: Option<f64>,
    #[serde(rename = "申购截止日期", deserialize_with = "de_opt_date", default)]
    pub subscription_deadline: Option<NaiveDate>,
    #[serde(rename = "暗盘日期", deserialize_with = "de_opt_date", default)]
    pub grey_market_date: Option<NaiveDate>,
    #[serde(rename = "上市日期", deserialize_with = "de_opt_date", default)]
    pub listing_date: Option<NaiveDate>,
}

impl StockInfo {
    /// Final issue price when fixed, otherwise the prospectus ceiling.
    pub fn effective_issue_price(&self) -> Option<f64> {
        self.issue_price.or(self.price_ceiling)
    }
}

/// One subscription tier offered by the broker for a stock.
#[derive(Debug, Clone, Deserialize)]
pub struct SubscriptionDetail {
    #[serde(rename = "id", deserialize_with = "de_string")]
    pub stock_id: String,
    #[serde(deserialize_with = "de_number")]
    pub shares_applied: f64,
    #[serde(default)]
    pub max_payment_hkd: Option<String>,
    #[serde(default)]
    pub apply_group: Option<String>,
    #[serde(default)]
    pub match_key: Option<String>,
}

/// Published lottery outcome row for a tier. Absent results are normal
/// before publication, so every statistic is optional.
#[derive(Debug, Clone, Deserialize)]
pub struct TierResult {
    #[serde(rename = "id", deserialize_with = "de_string")]
    pub stock_id: String,
    #[serde(default)]
    pub match_key: Option<String>,
    #[serde(deserialize_with = "de_opt_number", default)]
    pub shares_applied: Option<f64>,
    #[serde(deserialize_with = "de_opt_number", default)]
    pub approx_alloc_pct: Option<f64>,
    #[serde(deserialize_with = "de_opt_number", default)]
    pub valid_applications: Option<f64>,
    #[serde(deserialize_with = "de_opt_number", default)]
    pub winners: Option<f64>,
}

/// `/api/stock-details/{code}` envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct StockDetailsResponse {
    #[serde(rename = "stockInfo")]
    pub stock_info: StockInfo,
    #[serde(rename = "applyDetails")]
    pub apply_details: Vec<SubscriptionDetail>,
    #[serde(rename = "applyTiers")]
    pub apply_tiers: Vec<TierResult>,
}

/// One pre-joined row from `/api/tier-details/{code}`.
#[derive(Debug, Clone, Deserialize)]
pub struct JoinedTier {
    #[serde(deserialize_with = "de_number")]
    pub shares_applied: f64,
    #[serde(default)]
    pub max_payment_hkd: Option<String>,
    #[serde(default)]
    pub apply_group: Option<String>,
    #[serde(default)]
    pub match_key: Option<String>,
    #[serde(deserialize_with = "de_opt_number", default)]
    pub approx_alloc_pct: Option<f64>,
    #[serde(deserialize_with = "de_opt_number", default)]
    pub valid_applications: Option<f64>,
    #[serde(deserialize_with = "de_opt_number", default)]
    pub winners: Option<f64>,
}

/// `/api/tier-details/{code}` envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct TierDetailsResponse {
    pub stock: StockInfo,
    pub tiers: Vec<JoinedTier>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(f64),
    String(String),
}

fn parse_loose_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    // Accept "10.00 HKD", "1,000", plain numbers.
    let cleaned: String = trimmed
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.' || *c == ',' || *c == '-')
        .filter(|c| *c != ',')
        .collect();
    cleaned.parse().ok()
}

fn de_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match NumberOrString::deserialize(deserializer)? {
        // Integer-typed codes come back as numbers from the DB.
        NumberOrString::Number(n) if n.fract() == 0.0 => format!("{}", n as i64),
        NumberOrString::Number(n) => n.to_string(),
        NumberOrString::String(s) => s,
    })
}

fn de_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(n) => Ok(n),
        NumberOrString::String(s) => parse_loose_number(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("not a number: {s:?}"))),
    }
}

fn de_opt_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    Ok(match Option::<NumberOrString>::deserialize(deserializer)? {
        None => None,
        Some(NumberOrString::Number(n)) => Some(n),
        Some(NumberOrString::String(s)) => parse_loose_number(&s),
    })
}

fn de_opt_price<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    de_opt_number(deserializer)
}

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%Y年%m月%d日"];

fn de_opt_date<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<NaiveDate>, D::Error> {
    let raw = match Option::<String>::deserialize(deserializer)? {
        Some(s) if !s.trim().is_empty() => s,
        _ => return Ok(None),
    };
    let raw = raw.trim();
    // Timestamps like "2024-05-02T00:00:00.000Z" carry the date up front.
    let date_part = raw.split('T').next().unwrap_or(raw);
    Ok(DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(date_part, fmt).ok()))
}
