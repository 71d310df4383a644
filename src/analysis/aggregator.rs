//! Seller aggregation and statistics.
//!
//! Turns the flat list of scored sellers into chart-ready series: the trust
//! score histogram, the risk distribution, top-N rankings and the insight
//! sentences shown on the risk analysis page. Nothing in here fails; records
//! with missing values are skipped and empty input yields zeroes.

use crate::models::{DashboardStats, Histogram, RankField, RiskDistribution, RiskLevel, SellerRecord};
use tracing::debug;

/// Default length of a ranking.
pub const DEFAULT_TOP_N: usize = 10;

/// Average trust score above which platform quality reads as "good overall".
pub const GOOD_AVERAGE_THRESHOLD: f64 = 70.0;

/// Round to `decimals` places, half away from zero.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Integer percentage of `part` in `whole`; 0 when `whole` is 0.
pub fn percent_of(part: usize, whole: usize) -> u64 {
    if whole == 0 {
        return 0;
    }
    ((part as f64 / whole as f64) * 100.0).round() as u64
}

/// Histogram bucket for a score. Upper edges are inclusive: 20 is in the
/// first bucket, 21 in the second.
fn bucket_index(score: f64) -> usize {
    if score <= 20.0 {
        0
    } else if score <= 40.0 {
        1
    } else if score <= 60.0 {
        2
    } else if score <= 80.0 {
        3
    } else {
        4
    }
}

/// Count trust scores into the five fixed buckets.
pub fn bucketize_scores(records: &[SellerRecord]) -> Histogram {
    let mut histogram = Histogram::default();

    for record in records {
        match record.trust_score {
            Some(score) => histogram.buckets[bucket_index(score)] += 1,
            None => debug!("Seller {:?} has no trust score, not bucketed", record.id),
        }
    }
    debug!("Bucketed {} of {} trust scores", histogram.total(), records.len());

    histogram
}

/// Count sellers per risk level. Unrecognized levels are not counted.
pub fn tally_risk_levels(records: &[SellerRecord]) -> RiskDistribution {
    let mut dist = RiskDistribution::default();

    for record in records {
        match record.risk_level {
            RiskLevel::Low => dist.low += 1,
            RiskLevel::Medium => dist.medium += 1,
            RiskLevel::High => dist.high += 1,
            RiskLevel::Unknown => debug!("Seller {:?} has an unrecognized risk level", record.id),
        }
    }
    debug!("Tallied {} of {} risk levels", dist.total(), records.len());

    dist
}

/// The `n` highest records by `field`, in descending order.
///
/// The sort is stable, so equal values keep their input order. Records
/// missing the field sort after every record that has it.
pub fn top_n(records: &[SellerRecord], field: RankField, n: usize) -> Vec<&SellerRecord> {
    let mut ranked: Vec<&SellerRecord> = records.iter().collect();

    ranked.sort_by(|a, b| {
        field
            .value(b)
            .partial_cmp(&field.value(a))
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    ranked.truncate(n);

    ranked
}

/// Sellers with at least one fake review, most fakes first.
pub fn top_fake_reviewers(records: &[SellerRecord], n: usize) -> Vec<&SellerRecord> {
    let mut ranked: Vec<&SellerRecord> = records.iter().filter(|r| r.stats.fake() > 0).collect();

    ranked.sort_by_key(|r| std::cmp::Reverse(r.stats.fake()));
    ranked.truncate(n);

    ranked
}

/// Sum of fake reviews across sellers, saturating at `u64::MAX`.
pub fn total_fake_reviews(records: &[SellerRecord]) -> u64 {
    records
        .iter()
        .fold(0u64, |acc, r| acc.saturating_add(r.stats.fake()))
}

/// Sum of real and fake reviews across sellers, saturating at `u64::MAX`.
pub fn total_reviews(records: &[SellerRecord]) -> u64 {
    records
        .iter()
        .fold(0u64, |acc, r| acc.saturating_add(r.stats.total()))
}

/// Platform-wide fake review percentage, one decimal place.
pub fn compute_fake_rate(records: &[SellerRecord]) -> f64 {
    fake_rate(total_fake_reviews(records), total_reviews(records))
}

fn fake_rate(fake: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round_to(fake as f64 / total as f64 * 100.0, 1)
}

impl DashboardStats {
    /// Compute the summary locally from the seller list.
    pub fn from_records(records: &[SellerRecord]) -> Self {
        let dist = tally_risk_levels(records);
        let scores: Vec<f64> = records.iter().filter_map(|r| r.trust_score).collect();

        let avg_trust_score = if scores.is_empty() {
            0.0
        } else {
            round_to(scores.iter().sum::<f64>() / scores.len() as f64, 1)
        };

        Self {
            total_sellers: records.len(),
            avg_trust_score,
            high_risk_count: dist.high,
            medium_risk_count: dist.medium,
            low_risk_count: dist.low,
        }
    }

    /// Risk distribution as reported in the summary.
    pub fn risk_distribution(&self) -> RiskDistribution {
        RiskDistribution {
            low: self.low_risk_count,
            medium: self.medium_risk_count,
            high: self.high_risk_count,
        }
    }
}

/// Generate the three insight sentences for the risk analysis page.
pub fn build_insight_text(
    stats: &DashboardStats,
    records: &[SellerRecord],
    total_fake: u64,
) -> Vec<String> {
    let quality = if stats.avg_trust_score > GOOD_AVERAGE_THRESHOLD {
        "good overall"
    } else {
        "moderate"
    };

    let total = total_reviews(records);

    vec![
        format!(
            "The platform average is {}, indicating {} seller quality.",
            stats.avg_trust_score, quality
        ),
        format!(
            "{} sellers ({}%) are low risk, {} medium, and {} high risk.",
            stats.low_risk_count,
            percent_of(stats.low_risk_count, stats.total_sellers),
            stats.medium_risk_count,
            stats.high_risk_count
        ),
        format!(
            "{} fake reviews detected out of {} total ({:.1}% detection rate).",
            total_fake,
            total,
            fake_rate(total_fake, total)
        ),
    ]
}
