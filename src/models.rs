//! Data models for the dashboards.
//!
//! These mirror the JSON shapes returned by the trust-scoring backend.
//! Deserialization is lenient: a malformed numeric field on a
//! seller becomes `None` instead of rejecting the record, so the aggregation
//! layer can skip it.

use chrono::{NaiveDate, NaiveDateTime};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use tracing::debug;

/// Risk level assigned to a seller by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    /// Anything the backend sent that is not one of the three levels.
    #[default]
    #[serde(other)]
    Unknown,
}

impl RiskLevel {
    /// Parses the wire label. Matching is exact, as the backend emits it.
    pub fn from_label(label: &str) -> Self {
        match label {
            "Low" => RiskLevel::Low,
            "Medium" => RiskLevel::Medium,
            "High" => RiskLevel::High,
            _ => RiskLevel::Unknown,
        }
    }

    /// Returns an emoji badge for the level.
    pub fn emoji(&self) -> &'static str {
        match self {
            RiskLevel::Low => "🟢",
            RiskLevel::Medium => "🟡",
            RiskLevel::High => "🔴",
            RiskLevel::Unknown => "⚪",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "Low"),
            RiskLevel::Medium => write!(f, "Medium"),
            RiskLevel::High => write!(f, "High"),
            RiskLevel::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Review counts for a seller, split by authenticity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReviewStats {
    #[serde(default, deserialize_with = "lenient_count")]
    pub real_reviews: Option<u64>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub fake_reviews: Option<u64>,
}

impl ReviewStats {
    #[cfg(test)]
    pub fn new(real_reviews: u64, fake_reviews: u64) -> Self {
        Self {
            real_reviews: Some(real_reviews),
            fake_reviews: Some(fake_reviews),
        }
    }

    /// Real review count, treating a missing value as zero.
    pub fn real(&self) -> u64 {
        self.real_reviews.unwrap_or(0)
    }

    /// Fake review count, treating a missing value as zero.
    pub fn fake(&self) -> u64 {
        self.fake_reviews.unwrap_or(0)
    }

    /// Real plus fake reviews, saturating at `u64::MAX`.
    pub fn total(&self) -> u64 {
        self.real().saturating_add(self.fake())
    }
}

/// Per-dimension metric scores (0-100) computed by the backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SellerMetrics {
    #[serde(default, deserialize_with = "lenient_f64")]
    pub delivery: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub return_rate_score: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub response: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub authenticity: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub consistency: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub age: Option<f64>,
}

impl SellerMetrics {
    /// Radar-chart axes in display order.
    pub const LABELS: [&'static str; 6] = [
        "Delivery",
        "Returns",
        "Response",
        "Authenticity",
        "Consistency",
        "Account Age",
    ];

    /// `(label, value)` pairs in [`SellerMetrics::LABELS`] order.
    pub fn entries(&self) -> [(&'static str, Option<f64>); 6] {
        let values = [
            self.delivery,
            self.return_rate_score,
            self.response,
            self.authenticity,
            self.consistency,
            self.age,
        ];
        std::array::from_fn(|i| (Self::LABELS[i], values[i]))
    }

    /// Values in the same order as [`SellerMetrics::LABELS`]; missing values become 0.
    pub fn values(&self) -> Vec<f64> {
        self.entries()
            .iter()
            .map(|(_, v)| v.unwrap_or(0.0))
            .collect()
    }
}

/// A single scored seller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SellerRecord {
    #[serde(rename = "seller_id", alias = "id", default, deserialize_with = "lenient_id")]
    pub id: String,
    #[serde(alias = "seller_name", default, deserialize_with = "lenient_or_default")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub trust_score: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub confidence_score: Option<f64>,
    #[serde(default, deserialize_with = "lenient_risk")]
    pub risk_level: RiskLevel,
    #[serde(default, deserialize_with = "lenient_or_default", skip_serializing_if = "Option::is_none")]
    pub metrics: Option<SellerMetrics>,
    #[serde(default, deserialize_with = "lenient_or_default")]
    pub stats: ReviewStats,
}

impl SellerRecord {
    /// Creates a record with the fields the aggregator reads.
    #[cfg(test)]
    pub fn new(id: &str, name: &str, trust_score: f64, risk_level: RiskLevel) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            trust_score: Some(trust_score),
            confidence_score: None,
            risk_level,
            metrics: None,
            stats: ReviewStats::default(),
        }
    }

    /// Builder-style setter for review counts.
    #[cfg(test)]
    pub fn with_reviews(mut self, real_reviews: u64, fake_reviews: u64) -> Self {
        self.stats = ReviewStats::new(real_reviews, fake_reviews);
        self
    }

    /// Parses a JSON array of sellers, dropping elements that are not objects.
    pub fn parse_many(value: Value) -> Vec<SellerRecord> {
        let items = match value {
            Value::Array(items) => items,
            other => {
                debug!("Expected an array of sellers, got {}", kind_of(&other));
                return Vec::new();
            }
        };

        items
            .into_iter()
            .enumerate()
            .filter_map(|(index, item)| {
                if !item.is_object() {
                    debug!("Skipping seller #{}: not an object", index);
                    return None;
                }
                match serde_json::from_value(item) {
                    Ok(record) => Some(record),
                    Err(e) => {
                        debug!("Skipping seller #{}: {}", index, e);
                        None
                    }
                }
            })
            .collect()
    }
}

/// Numeric seller field used for rankings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(dead_code)] // The bundled views rank by trust score and fake reviews only
pub enum RankField {
    TrustScore,
    ConfidenceScore,
    RealReviews,
    FakeReviews,
}

impl RankField {
    /// Reads the field from a record; `None` when the value is missing.
    pub fn value(&self, record: &SellerRecord) -> Option<f64> {
        match self {
            RankField::TrustScore => record.trust_score,
            RankField::ConfidenceScore => record.confidence_score,
            RankField::RealReviews => record.stats.real_reviews.map(|v| v as f64),
            RankField::FakeReviews => record.stats.fake_reviews.map(|v| v as f64),
        }
    }
}

/// Five-bucket histogram of trust scores.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Histogram {
    pub buckets: [usize; 5],
}

impl Histogram {
    /// Bucket labels, inclusive on both ends.
    pub const LABELS: [&'static str; 5] = ["0-20", "21-40", "41-60", "61-80", "81-100"];

    /// Number of scores counted.
    pub fn total(&self) -> usize {
        self.buckets.iter().sum()
    }

    /// Iterate over `(label, count)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, usize)> + '_ {
        Self::LABELS.iter().copied().zip(self.buckets.iter().copied())
    }
}

/// Count of sellers per recognized risk level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RiskDistribution {
    pub low: usize,
    pub medium: usize,
    pub high: usize,
}

impl RiskDistribution {
    pub fn total(&self) -> usize {
        self.low + self.medium + self.high
    }
}

/// Platform-wide summary delivered with the admin dashboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardStats {
    pub total_sellers: usize,
    pub avg_trust_score: f64,
    pub high_risk_count: usize,
    pub medium_risk_count: usize,
    pub low_risk_count: usize,
}

/// Response of `GET /api/admin/dashboard`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdminDashboard {
    #[serde(default)]
    pub stats: DashboardStats,
    #[serde(default, deserialize_with = "lenient_records")]
    pub sellers: Vec<SellerRecord>,
}

/// A customer review as shown on the seller pages.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Review {
    #[serde(default, deserialize_with = "lenient_f64")]
    pub rating: Option<f64>,
    #[serde(default, deserialize_with = "lenient_or_default")]
    pub review_text: String,
    #[serde(default, deserialize_with = "lenient_or_default")]
    pub review_date: Option<String>,
}

impl Review {
    /// Calendar date of the review, or the raw string when it does not parse.
    pub fn display_date(&self) -> String {
        let Some(raw) = self.review_date.as_deref() else {
            return "-".to_string();
        };
        let raw = raw.trim();

        if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(raw) {
            return dt.date_naive().format("%Y-%m-%d").to_string();
        }
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
            return dt.date().format("%Y-%m-%d").to_string();
        }
        if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            return date.format("%Y-%m-%d").to_string();
        }
        raw.to_string()
    }
}

/// Star-rating sentiment bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

impl Sentiment {
    /// 4-5 stars are positive, exactly 3 neutral, anything else negative.
    pub fn from_rating(rating: f64) -> Self {
        if rating >= 4.0 {
            Sentiment::Positive
        } else if rating == 3.0 {
            Sentiment::Neutral
        } else {
            Sentiment::Negative
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sentiment::Positive => write!(f, "Positive"),
            Sentiment::Neutral => write!(f, "Neutral"),
            Sentiment::Negative => write!(f, "Negative"),
        }
    }
}

/// Review counts per sentiment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SentimentBreakdown {
    pub positive: usize,
    pub neutral: usize,
    pub negative: usize,
}

impl SentimentBreakdown {
    pub fn total(&self) -> usize {
        self.positive + self.neutral + self.negative
    }
}

/// Review summary for one seller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewSummary {
    pub avg_rating: f64,
    pub total_reviews: usize,
    pub total_orders: usize,
}

/// Platform averages a seller is compared against.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Benchmarks {
    pub avg_trust_score: f64,
    pub avg_delivery: f64,
    pub avg_return: f64,
    pub avg_response: f64,
    pub avg_authenticity: f64,
}

/// Advice entry produced by the backend for the seller dashboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerInsight {
    #[serde(rename = "type")]
    pub kind: String,
    pub icon: String,
    pub msg: String,
}

/// Response of `GET /api/seller/dashboard`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SellerDashboard {
    pub score_card: SellerRecord,
    pub reviews: Vec<Review>,
    pub summary: ReviewSummary,
    pub trend_data: Vec<f64>,
    pub sentiment_analysis: SentimentBreakdown,
    pub benchmarks: Benchmarks,
    pub insights: Vec<ServerInsight>,
}

/// Role carried by the logged-in user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Seller,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Admin => write!(f, "admin"),
            Role::Seller => write!(f, "seller"),
        }
    }
}

/// The logged-in user, handed to view builders by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub username: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seller_id: Option<String>,
}

impl Session {
    /// Seller id to query; demo accounts without one fall back to "1".
    pub fn effective_seller_id(&self) -> &str {
        self.seller_id
            .as_deref()
            .filter(|id| !id.trim().is_empty())
            .unwrap_or("1")
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn number_from_value(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    n.filter(|v| v.is_finite())
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(number_from_value(&value))
}

fn lenient_count<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(number_from_value(&value)
        .filter(|v| *v >= 0.0 && v.fract() == 0.0)
        .map(|v| v as u64))
}

fn lenient_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    })
}

fn lenient_risk<'de, D>(deserializer: D) -> Result<RiskLevel, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value
        .as_str()
        .map(RiskLevel::from_label)
        .unwrap_or_default())
}

fn lenient_or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

fn lenient_records<'de, D>(deserializer: D) -> Result<Vec<SellerRecord>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(SellerRecord::parse_many(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_risk_level_from_label() {
        assert_eq!(RiskLevel::from_label("Low"), RiskLevel::Low);
        assert_eq!(RiskLevel::from_label("Medium"), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_label("High"), RiskLevel::High);
        assert_eq!(RiskLevel::from_label("high"), RiskLevel::Unknown);
        assert_eq!(RiskLevel::from_label("Unknown"), RiskLevel::Unknown);
    }

    #[test]
    fn test_seller_record_from_buyer_payload() {
        let record: SellerRecord = serde_json::from_value(json!({
            "seller_name": "Acme",
            "trust_score": 61,
            "risk_level": "Medium",
            "confidence_score": 40,
            "metrics": { "delivery": 70, "age": 12.5 },
            "stats": { "real_reviews": 9, "fake_reviews": 1 }
        }))
        .unwrap();

        assert_eq!(record.id, "");
        assert_eq!(record.name, "Acme");
        assert_eq!(record.risk_level, RiskLevel::Medium);
        let metrics = record.metrics.unwrap();
        assert_eq!(metrics.entries()[0], ("Delivery", Some(70.0)));
        assert_eq!(metrics.entries()[1], ("Returns", None));
        assert_eq!(metrics.values()[5], 12.5);
    }

    #[test]
    fn test_seller_record_from_backend_json() {
        let record: SellerRecord = serde_json::from_value(json!({
            "seller_id": "42",
            "name": "Acme",
            "trust_score": 87.5,
            "confidence_score": 64.0,
            "risk_level": "Low",
            "metrics": {
                "delivery": 90.0,
                "return_rate_score": 80.0,
                "response": 70.0,
                "authenticity": 95.0,
                "consistency": 60.0,
                "age": 100.0
            },
            "stats": { "fake_reviews": 2, "real_reviews": 38 }
        }))
        .unwrap();

        assert_eq!(record.id, "42");
        assert_eq!(record.trust_score, Some(87.5));
        assert_eq!(record.risk_level, RiskLevel::Low);
        assert_eq!(record.stats.fake(), 2);
        assert_eq!(record.stats.total(), 40);
        assert_eq!(record.metrics.unwrap().values()[0], 90.0);
    }

    #[test]
    fn test_malformed_fields_become_none() {
        let record: SellerRecord = serde_json::from_value(json!({
            "seller_id": 7,
            "name": "Broken",
            "trust_score": "n/a",
            "risk_level": 3,
            "stats": null
        }))
        .unwrap();

        assert_eq!(record.id, "7");
        assert_eq!(record.trust_score, None);
        assert_eq!(record.confidence_score, None);
        assert_eq!(record.risk_level, RiskLevel::Unknown);
        assert_eq!(record.stats, ReviewStats::default());
    }

    #[test]
    fn test_numeric_strings_are_accepted() {
        let record: SellerRecord = serde_json::from_value(json!({
            "seller_id": "1",
            "trust_score": " 55.5 ",
            "stats": { "real_reviews": "10", "fake_reviews": -1 }
        }))
        .unwrap();

        assert_eq!(record.trust_score, Some(55.5));
        assert_eq!(record.stats.real_reviews, Some(10));
        assert_eq!(record.stats.fake_reviews, None);
    }

    #[test]
    fn test_parse_many_skips_non_objects() {
        let records = SellerRecord::parse_many(json!([
            { "seller_id": "1", "trust_score": 10 },
            "garbage",
            null,
            { "seller_id": "2", "trust_score": 90 }
        ]));
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].id, "2");

        assert!(SellerRecord::parse_many(json!({ "not": "an array" })).is_empty());
    }

    #[test]
    fn test_admin_dashboard_deserialization() {
        let dashboard: AdminDashboard = serde_json::from_value(json!({
            "stats": {
                "total_sellers": 2,
                "avg_trust_score": 61.3,
                "high_risk_count": 1,
                "medium_risk_count": 0,
                "low_risk_count": 1
            },
            "sellers": [
                { "seller_id": "1", "risk_level": "High" },
                42
            ]
        }))
        .unwrap();

        assert_eq!(dashboard.stats.total_sellers, 2);
        assert_eq!(dashboard.sellers.len(), 1);
    }

    #[test]
    fn test_sentiment_from_rating() {
        assert_eq!(Sentiment::from_rating(5.0), Sentiment::Positive);
        assert_eq!(Sentiment::from_rating(4.0), Sentiment::Positive);
        assert_eq!(Sentiment::from_rating(3.0), Sentiment::Neutral);
        assert_eq!(Sentiment::from_rating(3.5), Sentiment::Negative);
        assert_eq!(Sentiment::from_rating(1.0), Sentiment::Negative);
    }

    #[test]
    fn test_review_display_date() {
        let mut review = Review {
            rating: Some(5.0),
            review_text: "Great".to_string(),
            review_date: Some("2024-03-09 14:22:01".to_string()),
        };
        assert_eq!(review.display_date(), "2024-03-09");

        review.review_date = Some("2024-03-09".to_string());
        assert_eq!(review.display_date(), "2024-03-09");

        review.review_date = Some("last tuesday".to_string());
        assert_eq!(review.display_date(), "last tuesday");

        review.review_date = None;
        assert_eq!(review.display_date(), "-");
    }

    #[test]
    fn test_session_seller_id_fallback() {
        let mut session = Session {
            username: "bob".to_string(),
            role: Role::Seller,
            seller_id: None,
        };
        assert_eq!(session.effective_seller_id(), "1");

        session.seller_id = Some("  ".to_string());
        assert_eq!(session.effective_seller_id(), "1");

        session.seller_id = Some("17".to_string());
        assert_eq!(session.effective_seller_id(), "17");
    }

    #[test]
    fn test_histogram_iter_and_total() {
        let histogram = Histogram {
            buckets: [1, 0, 2, 0, 3],
        };
        assert_eq!(histogram.total(), 6);
        let pairs: Vec<_> = histogram.iter().collect();
        assert_eq!(pairs[0], ("0-20", 1));
        assert_eq!(pairs[4], ("81-100", 3));
    }
}
