//! View builders for the admin, risk analysis and seller pages.
//!
//! Builders are pure: same session and data in, same view out.

use super::{
    require_role, AccessDenied, ChartKind, ChartSpec, Dataset, DashboardView, InsightKind,
    InsightLine, StatCard, TableSpec,
};
use crate::analysis::{
    bucketize_scores, build_insight_text, positive_percent, recent_reviews, sentiment_breakdown,
    star_string, tally_risk_levels, top_fake_reviewers, top_n, total_fake_reviews,
};
use crate::models::{
    AdminDashboard, DashboardStats, Histogram, RankField, RiskDistribution, Role,
    SellerDashboard, SellerMetrics, SellerRecord, Sentiment, SentimentBreakdown, Session,
};

const RISK_COLORS: [&str; 3] = ["#10b981", "#f59e0b", "#ef4444"];

const HISTOGRAM_COLORS: [&str; 5] = [
    "rgba(239, 68, 68, 0.8)",
    "rgba(251, 146, 60, 0.8)",
    "rgba(250, 204, 21, 0.8)",
    "rgba(52, 211, 153, 0.8)",
    "rgba(16, 185, 129, 0.8)",
];

/// Knobs for the view builders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewOptions {
    /// Length of the ranking charts.
    pub top_n: usize,
    /// Rows in the seller dashboard's recent reviews table.
    pub recent_reviews: usize,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            top_n: crate::analysis::DEFAULT_TOP_N,
            recent_reviews: crate::analysis::DEFAULT_RECENT_REVIEWS,
        }
    }
}

fn fmt_opt(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

fn fmt_percent(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{}%", v))
}

/// Collapse line breaks so free text stays on one table row.
fn single_line(text: &str) -> String {
    text.replace(['\n', '\r'], " ")
}

fn risk_chart(id: &str, dist: RiskDistribution) -> ChartSpec {
    ChartSpec {
        id: id.to_string(),
        kind: ChartKind::Doughnut,
        title: "Risk Distribution".to_string(),
        labels: vec!["Low Risk".into(), "Medium Risk".into(), "High Risk".into()],
        datasets: vec![Dataset::new(
            "Sellers",
            vec![dist.low as f64, dist.medium as f64, dist.high as f64],
            &RISK_COLORS,
        )],
        max: None,
    }
}

fn histogram_chart(id: &str, histogram: Histogram, colors: &[&str]) -> ChartSpec {
    ChartSpec {
        id: id.to_string(),
        kind: ChartKind::Bar,
        title: "Trust Score Distribution".to_string(),
        labels: histogram.iter().map(|(label, _)| label.to_string()).collect(),
        datasets: vec![Dataset::new(
            "Number of Sellers",
            histogram.iter().map(|(_, count)| count as f64).collect(),
            colors,
        )],
        max: None,
    }
}

fn ranking_chart(
    id: &str,
    title: &str,
    kind: ChartKind,
    records: &[&SellerRecord],
    field: RankField,
    color: &str,
    max: Option<f64>,
) -> ChartSpec {
    ChartSpec {
        id: id.to_string(),
        kind,
        title: title.to_string(),
        labels: records.iter().map(|r| r.name.clone()).collect(),
        datasets: vec![Dataset::new(
            title,
            records
                .iter()
                .map(|r| field.value(r).unwrap_or(0.0))
                .collect(),
            &[color],
        )],
        max,
    }
}

fn sellers_table(sellers: &[SellerRecord]) -> TableSpec {
    TableSpec {
        id: "sellers".to_string(),
        title: "Sellers".to_string(),
        headers: ["ID", "Name", "Trust Score", "Confidence", "Risk"]
            .iter()
            .map(|h| h.to_string())
            .collect(),
        rows: sellers
            .iter()
            .map(|s| {
                vec![
                    format!("#{}", s.id),
                    single_line(&s.name),
                    fmt_opt(s.trust_score),
                    fmt_percent(s.confidence_score),
                    format!("{} {}", s.risk_level.emoji(), s.risk_level),
                ]
            })
            .collect(),
        empty_message: "No sellers found.".to_string(),
    }
}

/// Admin overview: headline stats, risk split, score histogram, seller list.
pub fn admin_view(
    session: &Session,
    dashboard: &AdminDashboard,
) -> Result<DashboardView, AccessDenied> {
    require_role(session, Role::Admin)?;

    let stats = &dashboard.stats;

    Ok(DashboardView {
        title: "Admin Dashboard".to_string(),
        greeting: Some(format!("Welcome, {}", session.username)),
        cards: vec![
            StatCard::new("Total Sellers", stats.total_sellers),
            StatCard::new("Average Trust Score", stats.avg_trust_score),
            StatCard::new("High Risk", stats.high_risk_count),
            StatCard::new("Low Risk", stats.low_risk_count),
        ],
        charts: vec![
            risk_chart("risk", stats.risk_distribution()),
            histogram_chart(
                "score_distribution",
                bucketize_scores(&dashboard.sellers),
                &["#6366f1"],
            ),
        ],
        tables: vec![sellers_table(&dashboard.sellers)],
        insights: Vec::new(),
    })
}

/// Risk analysis page: distributions, rankings and the derived insights.
pub fn risk_analysis_view(
    session: &Session,
    stats: &DashboardStats,
    sellers: &[SellerRecord],
    options: ViewOptions,
) -> Result<DashboardView, AccessDenied> {
    require_role(session, Role::Admin)?;

    let total_fake = total_fake_reviews(sellers);
    let top_sellers = top_n(sellers, RankField::TrustScore, options.top_n);
    let fake_reviewers = top_fake_reviewers(sellers, options.top_n);

    Ok(DashboardView {
        title: "Risk Analysis".to_string(),
        greeting: Some(format!("Welcome, {}", session.username)),
        cards: vec![
            StatCard::new("Low Risk", stats.low_risk_count),
            StatCard::new("Medium Risk", stats.medium_risk_count),
            StatCard::new("High Risk", stats.high_risk_count),
            StatCard::new("Fake Reviews", total_fake),
        ],
        charts: vec![
            histogram_chart(
                "trust_score_histogram",
                bucketize_scores(sellers),
                &HISTOGRAM_COLORS,
            ),
            risk_chart("risk_pie", tally_risk_levels(sellers)),
            ranking_chart(
                "top_sellers",
                "Trust Score",
                ChartKind::HorizontalBar,
                &top_sellers,
                RankField::TrustScore,
                "rgba(102, 126, 234, 0.8)",
                Some(100.0),
            ),
            ranking_chart(
                "fake_reviews",
                "Fake Reviews",
                ChartKind::Bar,
                &fake_reviewers,
                RankField::FakeReviews,
                "rgba(239, 68, 68, 0.8)",
                None,
            ),
        ],
        tables: Vec::new(),
        insights: build_insight_text(stats, sellers, total_fake)
            .into_iter()
            .map(InsightLine::info)
            .collect(),
    })
}

/// Trend labels: "Month 1".."Month n-1", then "Current".
fn trend_labels(points: usize) -> Vec<String> {
    (1..=points)
        .map(|i| {
            if i == points {
                "Current".to_string()
            } else {
                format!("Month {}", i)
            }
        })
        .collect()
}

/// Headline cards for one seller's score card.
fn score_cards(card: &SellerRecord) -> Vec<StatCard> {
    vec![
        StatCard::new("Trust Score", fmt_opt(card.trust_score)),
        StatCard::new("Confidence", fmt_percent(card.confidence_score)),
        StatCard::new(
            "Risk Level",
            format!("{} {}", card.risk_level.emoji(), card.risk_level),
        ),
        StatCard::new("Real Reviews", card.stats.real()),
        StatCard::new("Fake Reviews", card.stats.fake()),
    ]
}

fn metrics_radar(metrics: &SellerMetrics) -> ChartSpec {
    ChartSpec {
        id: "metrics_radar".to_string(),
        kind: ChartKind::Radar,
        title: "Metric Scores".to_string(),
        labels: SellerMetrics::LABELS.iter().map(|l| l.to_string()).collect(),
        datasets: vec![Dataset::new("Metric Score", metrics.values(), &["#3b82f6"])],
        max: Some(100.0),
    }
}

fn seller_charts(dashboard: &SellerDashboard) -> Vec<ChartSpec> {
    let card = &dashboard.score_card;
    let mut charts = Vec::new();

    if let Some(metrics) = &card.metrics {
        charts.push(metrics_radar(metrics));
    }

    if !dashboard.trend_data.is_empty() {
        charts.push(ChartSpec {
            id: "trend".to_string(),
            kind: ChartKind::Line,
            title: "Trust Score History".to_string(),
            labels: trend_labels(dashboard.trend_data.len()),
            datasets: vec![Dataset::new(
                "Trust Score History",
                dashboard.trend_data.clone(),
                &["#3b82f6"],
            )],
            max: Some(100.0),
        });
    }

    let metrics = card.metrics.clone().unwrap_or_default();
    let bench = &dashboard.benchmarks;
    charts.push(ChartSpec {
        id: "benchmark".to_string(),
        kind: ChartKind::Bar,
        title: "You vs Platform Average".to_string(),
        labels: ["Trust Score", "Delivery", "Response", "Authenticity"]
            .iter()
            .map(|l| l.to_string())
            .collect(),
        datasets: vec![
            Dataset::new(
                "You",
                [
                    card.trust_score,
                    metrics.delivery,
                    metrics.response,
                    metrics.authenticity,
                ]
                .iter()
                .map(|v| v.unwrap_or(0.0))
                .collect(),
                &["#3b82f6"],
            ),
            Dataset::new(
                "Platform Average",
                vec![
                    bench.avg_trust_score,
                    bench.avg_delivery,
                    bench.avg_response,
                    bench.avg_authenticity,
                ],
                &["#94a3b8"],
            ),
        ],
        max: Some(100.0),
    });

    let sentiment = effective_sentiment(dashboard);
    charts.push(ChartSpec {
        id: "sentiment".to_string(),
        kind: ChartKind::Doughnut,
        title: "Review Sentiment".to_string(),
        labels: vec![
            "Positive (4-5★)".to_string(),
            "Neutral (3★)".to_string(),
            "Negative (1-2★)".to_string(),
        ],
        datasets: vec![Dataset::new(
            "Reviews",
            vec![
                sentiment.positive as f64,
                sentiment.neutral as f64,
                sentiment.negative as f64,
            ],
            &RISK_COLORS,
        )],
        max: None,
    });

    charts
}

/// The backend's sentiment counts, or counts derived from the reviews when
/// the backend sent none.
fn effective_sentiment(dashboard: &SellerDashboard) -> SentimentBreakdown {
    if dashboard.sentiment_analysis.total() == 0 {
        sentiment_breakdown(&dashboard.reviews)
    } else {
        dashboard.sentiment_analysis
    }
}


/// Seller dashboard: score card, metric charts, recent reviews, advice.
pub fn seller_view(
    session: &Session,
    dashboard: &SellerDashboard,
    options: ViewOptions,
) -> Result<DashboardView, AccessDenied> {
    require_role(session, Role::Seller)?;

    let recent = recent_reviews(&dashboard.reviews, options.recent_reviews);
    let recent_table = TableSpec {
        id: "recent_reviews".to_string(),
        title: "Recent Reviews".to_string(),
        headers: vec!["Rating".into(), "Review".into(), "Date".into()],
        rows: recent
            .iter()
            .map(|r| {
                vec![
                    format!("{}/5", fmt_opt(r.rating)),
                    single_line(&r.review_text),
                    r.display_date(),
                ]
            })
            .collect(),
        empty_message: "No reviews found.".to_string(),
    };

    let insights = if dashboard.insights.is_empty() {
        vec![InsightLine::info(
            "No critical insights at this time. Keep up the good work!",
        )]
    } else {
        dashboard
            .insights
            .iter()
            .map(|i| InsightLine {
                kind: InsightKind::from_label(&i.kind),
                text: i.msg.clone(),
            })
            .collect()
    };

    Ok(DashboardView {
        title: format!("{}'s Dashboard", session.username),
        greeting: Some(format!("Seller #{}", session.effective_seller_id())),
        cards: score_cards(&dashboard.score_card),
        charts: seller_charts(dashboard),
        tables: vec![recent_table],
        insights,
    })
}

/// Public profile of one seller: score card, metric table and radar.
///
/// Open to every role; admins reach it from the sellers table.
pub fn profile_view(session: &Session, record: &SellerRecord) -> DashboardView {
    let metrics = record.metrics.clone().unwrap_or_default();

    let metrics_table = TableSpec {
        id: "metrics".to_string(),
        title: "Metric Breakdown".to_string(),
        headers: vec!["Metric".into(), "Score".into()],
        rows: metrics
            .entries()
            .iter()
            .map(|(label, value)| vec![label.to_string(), fmt_opt(*value)])
            .collect(),
        empty_message: "No metrics available.".to_string(),
    };

    DashboardView {
        title: single_line(&record.name),
        greeting: Some(format!("Welcome, {}", session.username)),
        cards: score_cards(record),
        charts: vec![metrics_radar(&metrics)],
        tables: vec![metrics_table],
        insights: Vec::new(),
    }
}

/// Full review list for a seller, with sentiment badges.
pub fn seller_reviews_view(
    session: &Session,
    dashboard: &SellerDashboard,
) -> Result<DashboardView, AccessDenied> {
    require_role(session, Role::Seller)?;

    let summary = &dashboard.summary;
    let total_reviews = summary.total_reviews.max(dashboard.reviews.len());
    let positive = positive_percent(effective_sentiment(dashboard).positive, total_reviews);

    let rows = dashboard
        .reviews
        .iter()
        .map(|r| {
            let sentiment = r
                .rating
                .map(Sentiment::from_rating)
                .map_or_else(|| "-".to_string(), |s| s.to_string());
            vec![r.display_date(), star_string(r.rating), single_line(&r.review_text), sentiment]
        })
        .collect();

    Ok(DashboardView {
        title: "Customer Reviews".to_string(),
        greeting: None,
        cards: vec![
            StatCard::new("Average Rating", summary.avg_rating),
            StatCard::new("Total Reviews", total_reviews),
            StatCard::new("Positive", format!("{}%", positive)),
        ],
        charts: Vec::new(),
        tables: vec![TableSpec {
            id: "all_reviews".to_string(),
            title: "All Reviews".to_string(),
            headers: vec![
                "Date".into(),
                "Rating".into(),
                "Review".into(),
                "Sentiment".into(),
            ],
            rows,
            empty_message: "No reviews found.".to_string(),
        }],
        insights: Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Benchmarks, Review, ReviewSummary, RiskLevel, ServerInsight};

    fn admin() -> Session {
        Session {
            username: "root".to_string(),
            role: Role::Admin,
            seller_id: None,
        }
    }

    fn seller_session() -> Session {
        Session {
            username: "shop".to_string(),
            role: Role::Seller,
            seller_id: Some("3".to_string()),
        }
    }

    fn sellers() -> Vec<SellerRecord> {
        vec![
            SellerRecord::new("1", "Alpha", 92.0, RiskLevel::Low).with_reviews(40, 0),
            SellerRecord::new("2", "Beta", 75.0, RiskLevel::Medium).with_reviews(20, 5),
            SellerRecord::new("3", "Gamma", 20.0, RiskLevel::High).with_reviews(10, 5),
        ]
    }

    fn seller_dashboard(reviews: Vec<Review>) -> SellerDashboard {
        SellerDashboard {
            score_card: SellerRecord {
                metrics: Some(SellerMetrics {
                    delivery: Some(80.0),
                    response: Some(60.0),
                    ..SellerMetrics::default()
                }),
                ..SellerRecord::new("3", "Gamma", 20.0, RiskLevel::High).with_reviews(10, 5)
            },
            summary: ReviewSummary {
                avg_rating: 3.7,
                total_reviews: reviews.len(),
                total_orders: 12,
            },
            sentiment_analysis: SentimentBreakdown {
                positive: 1,
                neutral: 1,
                negative: 1,
            },
            reviews,
            trend_data: vec![10.0, 12.0, 15.0, 18.0, 19.0, 20.0],
            benchmarks: Benchmarks {
                avg_trust_score: 62.0,
                ..Benchmarks::default()
            },
            insights: Vec::new(),
        }
    }

    fn review(rating: f64, text: &str) -> Review {
        Review {
            rating: Some(rating),
            review_text: text.to_string(),
            review_date: Some("2024-05-01 10:00:00".to_string()),
        }
    }

    #[test]
    fn test_admin_view_requires_admin() {
        let dashboard = AdminDashboard::default();
        let denied = admin_view(&seller_session(), &dashboard).unwrap_err();
        assert_eq!(denied.redirect, "login.html");
    }

    #[test]
    fn test_admin_view_contents() {
        let sellers = sellers();
        let dashboard = AdminDashboard {
            stats: DashboardStats::from_records(&sellers),
            sellers,
        };

        let view = admin_view(&admin(), &dashboard).unwrap();
        assert_eq!(view.greeting.as_deref(), Some("Welcome, root"));
        assert_eq!(view.card("Total Sellers").unwrap().value, "3");

        let histogram = view.chart("score_distribution").unwrap();
        assert_eq!(histogram.datasets[0].data, vec![1.0, 0.0, 0.0, 1.0, 1.0]);
        assert_eq!(histogram.labels[1], "21-40");

        let risk = view.chart("risk").unwrap();
        assert_eq!(risk.datasets[0].data, vec![1.0, 1.0, 1.0]);

        let table = view.table("sellers").unwrap();
        assert_eq!(table.rows.len(), 3);
        assert_eq!(table.rows[0][0], "#1");
        assert_eq!(table.rows[0][3], "-");
    }

    #[test]
    fn test_risk_analysis_view() {
        let sellers = sellers();
        let stats = DashboardStats::from_records(&sellers);

        let view = risk_analysis_view(&admin(), &stats, &sellers, ViewOptions::default()).unwrap();

        assert_eq!(view.card("Fake Reviews").unwrap().value, "10");

        let top = view.chart("top_sellers").unwrap();
        assert_eq!(top.labels, vec!["Alpha", "Beta", "Gamma"]);
        assert_eq!(top.max, Some(100.0));

        let fakes = view.chart("fake_reviews").unwrap();
        assert_eq!(fakes.labels, vec!["Beta", "Gamma"]);

        assert_eq!(view.insights.len(), 3);
        assert!(view.insights[2].text.starts_with("10 fake reviews detected out of 80 total"));
    }

    #[test]
    fn test_risk_analysis_view_respects_top_n() {
        let sellers = sellers();
        let stats = DashboardStats::from_records(&sellers);
        let options = ViewOptions {
            top_n: 1,
            ..ViewOptions::default()
        };

        let view = risk_analysis_view(&admin(), &stats, &sellers, options).unwrap();
        assert_eq!(view.chart("top_sellers").unwrap().labels, vec!["Alpha"]);
    }

    #[test]
    fn test_risk_analysis_view_empty_sellers() {
        let view = risk_analysis_view(
            &admin(),
            &DashboardStats::default(),
            &[],
            ViewOptions::default(),
        )
        .unwrap();

        assert!(view.chart("top_sellers").unwrap().labels.is_empty());
        assert!(view.insights[2].text.contains("(0.0% detection rate)"));
    }

    #[test]
    fn test_seller_view() {
        let reviews = (0..7).map(|i| review(5.0, &format!("review {}", i))).collect();
        let view = seller_view(&seller_session(), &seller_dashboard(reviews), ViewOptions::default())
            .unwrap();

        assert_eq!(view.title, "shop's Dashboard");
        assert_eq!(view.card("Risk Level").unwrap().value, "🔴 High");

        let recent = view.table("recent_reviews").unwrap();
        assert_eq!(recent.rows.len(), 5);
        assert_eq!(recent.rows[0], vec!["5/5", "review 0", "2024-05-01"]);

        let trend = view.chart("trend").unwrap();
        assert_eq!(trend.labels.first().map(String::as_str), Some("Month 1"));
        assert_eq!(trend.labels.last().map(String::as_str), Some("Current"));

        let bench = view.chart("benchmark").unwrap();
        assert_eq!(bench.datasets[0].data, vec![20.0, 80.0, 60.0, 0.0]);
        assert_eq!(bench.datasets[1].data[0], 62.0);

        assert_eq!(view.insights.len(), 1);
        assert!(view.insights[0].text.contains("Keep up the good work"));
    }

    #[test]
    fn test_seller_view_maps_server_insights() {
        let mut dashboard = seller_dashboard(Vec::new());
        dashboard.insights = vec![ServerInsight {
            kind: "warning".to_string(),
            icon: "fa-truck".to_string(),
            msg: "Slow delivery".to_string(),
        }];

        let view = seller_view(&seller_session(), &dashboard, ViewOptions::default()).unwrap();
        assert_eq!(view.insights[0].kind, InsightKind::Warning);
        assert!(view.table("recent_reviews").unwrap().rows.is_empty());
    }

    #[test]
    fn test_seller_view_rejects_admin() {
        let dashboard = seller_dashboard(Vec::new());
        assert!(seller_view(&admin(), &dashboard, ViewOptions::default()).is_err());
        assert!(seller_reviews_view(&admin(), &dashboard).is_err());
    }

    #[test]
    fn test_seller_reviews_view() {
        let reviews = vec![review(5.0, "great"), review(3.0, "ok"), review(1.0, "bad")];
        let view = seller_reviews_view(&seller_session(), &seller_dashboard(reviews)).unwrap();

        assert_eq!(view.card("Positive").unwrap().value, "33%");
        let table = view.table("all_reviews").unwrap();
        assert_eq!(table.rows[0][1], "★★★★★");
        assert_eq!(table.rows[1][3], "Neutral");
        assert_eq!(table.rows[2][3], "Negative");
    }

    #[test]
    fn test_sentiment_falls_back_to_reviews() {
        let reviews = vec![review(5.0, "great"), review(4.0, "good"), review(2.0, "meh")];
        let mut dashboard = seller_dashboard(reviews);
        dashboard.sentiment_analysis = SentimentBreakdown::default();

        let view = seller_view(&seller_session(), &dashboard, ViewOptions::default()).unwrap();
        let sentiment = view.chart("sentiment").unwrap();
        assert_eq!(sentiment.datasets[0].data, vec![2.0, 0.0, 1.0]);

        let reviews_page = seller_reviews_view(&seller_session(), &dashboard).unwrap();
        assert_eq!(reviews_page.card("Positive").unwrap().value, "67%");
    }

    #[test]
    fn test_profile_view() {
        let record = SellerRecord {
            confidence_score: Some(64.0),
            metrics: Some(SellerMetrics {
                delivery: Some(90.0),
                age: Some(100.0),
                ..SellerMetrics::default()
            }),
            ..SellerRecord::new("7", "Acme", 87.5, RiskLevel::Low).with_reviews(38, 2)
        };

        for session in [admin(), seller_session()] {
            let view = profile_view(&session, &record);
            assert_eq!(view.title, "Acme");
            assert_eq!(view.card("Trust Score").unwrap().value, "87.5");
            assert_eq!(view.card("Confidence").unwrap().value, "64%");
            assert_eq!(view.card("Risk Level").unwrap().value, "🟢 Low");
            assert_eq!(view.card("Fake Reviews").unwrap().value, "2");

            let radar = view.chart("metrics_radar").unwrap();
            assert_eq!(radar.labels.len(), SellerMetrics::LABELS.len());
            assert_eq!(radar.datasets[0].data, vec![90.0, 0.0, 0.0, 0.0, 0.0, 100.0]);

            let table = view.table("metrics").unwrap();
            assert_eq!(table.rows[0], vec!["Delivery", "90"]);
            assert_eq!(table.rows[1], vec!["Returns", "-"]);
        }
    }

    #[test]
    fn test_sellers_table_flattens_names() {
        let sellers = vec![SellerRecord::new("1", "Two\nLines", 50.0, RiskLevel::Medium)];
        let table = sellers_table(&sellers);
        assert_eq!(table.rows[0][1], "Two Lines");
    }

    #[test]
    fn test_trend_labels() {
        assert_eq!(trend_labels(1), vec!["Current"]);
        assert_eq!(trend_labels(3), vec!["Month 1", "Month 2", "Current"]);
    }
}
