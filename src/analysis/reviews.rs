//! Review-level helpers for the seller pages.

use crate::analysis::aggregator::percent_of;
use crate::models::{Review, Sentiment, SentimentBreakdown};

/// Reviews shown on the seller dashboard's recent list.
pub const DEFAULT_RECENT_REVIEWS: usize = 5;

/// Count reviews per sentiment. Reviews without a usable rating are skipped.
pub fn sentiment_breakdown(reviews: &[Review]) -> SentimentBreakdown {
    let mut breakdown = SentimentBreakdown::default();

    for rating in reviews.iter().filter_map(|r| r.rating) {
        match Sentiment::from_rating(rating) {
            Sentiment::Positive => breakdown.positive += 1,
            Sentiment::Neutral => breakdown.neutral += 1,
            Sentiment::Negative => breakdown.negative += 1,
        }
    }

    breakdown
}

/// Share of positive reviews as a whole percentage.
pub fn positive_percent(positive: usize, total_reviews: usize) -> u64 {
    percent_of(positive, total_reviews)
}

/// The first `n` reviews, in the order the backend sent them.
pub fn recent_reviews(reviews: &[Review], n: usize) -> &[Review] {
    &reviews[..n.min(reviews.len())]
}

/// Five-glyph star rating, filled up to the (clamped) rating.
pub fn star_string(rating: Option<f64>) -> String {
    let filled = rating.map(|r| r.clamp(0.0, 5.0).ceil() as usize).unwrap_or(0);
    (0..5).map(|i| if i < filled { '★' } else { '☆' }).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn review(rating: Option<f64>) -> Review {
        Review {
            rating,
            review_text: "text".to_string(),
            review_date: None,
        }
    }

    #[test]
    fn test_sentiment_breakdown() {
        let reviews = vec![
            review(Some(5.0)),
            review(Some(4.0)),
            review(Some(3.0)),
            review(Some(1.0)),
            review(None),
        ];

        let breakdown = sentiment_breakdown(&reviews);
        assert_eq!(breakdown.positive, 2);
        assert_eq!(breakdown.neutral, 1);
        assert_eq!(breakdown.negative, 1);
        assert_eq!(breakdown.total(), 4);
    }

    #[test]
    fn test_positive_percent() {
        assert_eq!(positive_percent(3, 4), 75);
        assert_eq!(positive_percent(0, 0), 0);
    }

    #[test]
    fn test_recent_reviews_limits() {
        let reviews: Vec<_> = (0..8).map(|i| review(Some(i as f64))).collect();
        assert_eq!(recent_reviews(&reviews, DEFAULT_RECENT_REVIEWS).len(), 5);
        assert_eq!(recent_reviews(&reviews[..2], DEFAULT_RECENT_REVIEWS).len(), 2);
        assert!(recent_reviews(&[], DEFAULT_RECENT_REVIEWS).is_empty());
    }

    #[test]
    fn test_star_string() {
        assert_eq!(star_string(Some(3.0)), "★★★☆☆");
        assert_eq!(star_string(Some(5.0)), "★★★★★");
        assert_eq!(star_string(Some(9.0)), "★★★★★");
        assert_eq!(star_string(None), "☆☆☆☆☆");
    }
}
