//! Rows of the remote tables this client reads and updates

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

pub const TARGET_CURRENCIES: &str = "target_currencies";
pub const EXCHANGE_RATES: &str = "exchange_rates";
pub const FUND_DATA: &str = "fund_data";
pub const FUND_NAV_HISTORY: &str = "fund_nav_history";

/// A currency code the external crawler syncs while `is_active` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetCurrency {
    pub code: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
    pub is_active: bool,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accepts RFC 3339 as well as `timestamp without time zone` values, which
/// are read as UTC. Unparseable values become `None`.
fn lenient_timestamp<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error> {
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    if let Ok(ts) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(Some(ts.with_timezone(&Utc)));
    }
    let naive = NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(&raw, "%Y-%m-%d %H:%M:%S%.f"));
    Ok(naive.ok().map(|ts| ts.and_utc()))
}

/// Bank sell quotes against TWD, keyed by `(base_currency, date)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeRate {
    pub base_currency: String,
    pub date: NaiveDate,
    pub spot_sell_rate: Option<f64>,
    pub cash_sell_rate: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundInfo {
    pub cnyes_id: String,
    pub display_name: String,
    pub currency: String,
}

impl FundInfo {
    pub fn label(&self) -> String {
        format!("{} ({})", self.display_name, self.currency)
    }
}

/// One net asset value quote, keyed by `(cnyes_id, price_date)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundNav {
    pub cnyes_id: String,
    pub price_date: NaiveDate,
    pub nav: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_currency_deserialization() {
        let json = r#"{
            "code": "USD",
            "description": "美金",
            "is_active": true,
            "created_at": "2025-01-03T08:15:30.123456+00:00"
        }"#;

        let currency: TargetCurrency = serde_json::from_str(json).unwrap();
        assert_eq!(currency.code, "USD");
        assert_eq!(currency.description, "美金");
        assert!(currency.is_active);
        assert_eq!(
            currency.created_at.unwrap().date_naive(),
            NaiveDate::from_ymd_opt(2025, 1, 3).unwrap()
        );
    }

    #[test]
    fn test_target_currency_tolerates_null_description_and_naive_timestamp() {
        let json = r#"[
            {"code": "AUD", "description": null, "is_active": false, "created_at": "2025-01-01T08:15:30.123456"},
            {"code": "CAD", "is_active": true, "created_at": "2025-01-02 09:00:00"},
            {"code": "CHF", "description": "瑞士法郎", "is_active": true, "created_at": "garbled"}
        ]"#;

        let rows: Vec<TargetCurrency> = serde_json::from_str(json).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].description, "");
        assert_eq!(
            rows[0].created_at.unwrap().to_rfc3339(),
            "2025-01-01T08:15:30.123456+00:00"
        );
        assert_eq!(
            rows[1].created_at.unwrap().date_naive(),
            NaiveDate::from_ymd_opt(2025, 1, 2).unwrap()
        );
        assert!(rows[2].created_at.is_none());
    }

    #[test]
    fn test_fund_nav_with_null_value() {
        let nav: FundNav =
            serde_json::from_str(r#"{"cnyes_id": "F001", "price_date": "2025-03-03", "nav": null}"#)
                .unwrap();
        assert!(nav.nav.is_none());
    }

    #[test]
    fn test_exchange_rate_with_missing_quotes() {
        let json = r#"{
            "base_currency": "JPY",
            "date": "2025-02-14",
            "spot_sell_rate": 0.2153,
            "cash_sell_rate": null
        }"#;

        let rate: ExchangeRate = serde_json::from_str(json).unwrap();
        assert_eq!(rate.date, NaiveDate::from_ymd_opt(2025, 2, 14).unwrap());
        assert_eq!(rate.spot_sell_rate, Some(0.2153));
        assert!(rate.cash_sell_rate.is_none());
    }

    #[test]
    fn test_fund_label() {
        let fund = FundInfo {
            cnyes_id: "B09,009".to_string(),
            display_name: "Global Tech Fund".to_string(),
            currency: "USD".to_string(),
        };
        assert_eq!(fund.label(), "Global Tech Fund (USD)");
    }
}
