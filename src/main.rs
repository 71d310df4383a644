//! TrustBoard - seller trust dashboards
//!
//! A CLI tool that fetches scored sellers from the trust-scoring backend,
//! aggregates them client-side and renders the admin, risk analysis and
//! seller dashboards as Markdown or JSON.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (connection, config, bad input, etc.)
//!   3 - The session's role may not open the requested view

mod analysis;
mod api;
mod cli;
mod config;
mod models;
mod report;
mod view;

use anyhow::{Context, Result};
use api::{ApiClient, DataSource};
use chrono::Utc;
use clap::ValueEnum;
use cli::{Args, OutputFormat, ViewKind};
use config::Config;
use indicatif::{ProgressBar, ProgressStyle};
use models::{Role, Session};
use report::RenderOptions;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, error, info, warn, Level};
use tracing_subscriber::filter::{EnvFilter, LevelFilter};
use tracing_subscriber::FmtSubscriber;
use view::{DashboardView, ViewOptions};

/// Exit code when the session is rejected by the role gate.
const EXIT_ACCESS_DENIED: i32 = 3;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Load configuration first so [general].verbose can set the log level
    let (mut config, config_origin) = match load_config(&args) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };
    config.merge_with_args(&args);
    if let Err(e) = config.validate() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }

    // Initialize logging
    init_logging(config.log_level(args.quiet));

    info!("TrustBoard v{}", env!("CARGO_PKG_VERSION"));
    info!("Using config from {}", config_origin);
    debug!("Arguments: {:?}", args);

    match run_dashboard(args, config).await {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Dashboard failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .trustboard.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(config::CONFIG_FILE);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            config::CONFIG_FILE
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", config::CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", config::CONFIG_FILE);
    println!("   Edit it to set the API URL, ranking length and report format.");
    Ok(())
}

/// Filter for `level`, replaced by `directives` (from `RUST_LOG`) when given.
fn log_filter(level: Level, directives: Option<&str>) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(level).into())
        .parse_lossy(directives.unwrap_or_default())
}

/// Initialize logging. `RUST_LOG` overrides `level` when set.
fn init_logging(level: Level) {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(log_filter(level, rust_log.as_deref()))
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Role a view requires; `None` when every role may open it.
fn required_role(view: ViewKind) -> Option<Role> {
    match view {
        ViewKind::Admin | ViewKind::Risk => Some(Role::Admin),
        ViewKind::Seller | ViewKind::Reviews => Some(Role::Seller),
        ViewKind::Profile => None,
    }
}

/// Fetch, aggregate and render one dashboard. Returns the exit code.
async fn run_dashboard(args: Args, config: Config) -> Result<i32> {
    let session = args.session();

    // Reject the session before any data is fetched
    if let Some(role) = required_role(args.view) {
        if let Err(denied) = view::require_role(&session, role) {
            warn!("{}", denied);
            eprintln!("⛔ {}. Redirecting to {}", denied, denied.redirect);
            return Ok(EXIT_ACCESS_DENIED);
        }
    }

    let source = match args.input {
        Some(ref path) => DataSource::File(path.clone()),
        None => DataSource::Api(ApiClient::new(
            &config.api.base_url,
            config.api.timeout_seconds,
        )?),
    };
    info!("Loading {:?} dashboard from {}", args.view, source.describe());

    let options = ViewOptions {
        top_n: config.dashboard.top_n,
        recent_reviews: config.dashboard.recent_reviews,
    };

    let spinner = fetch_spinner(args.quiet, &source);
    let built = build_view(args.view, &session, &source, options).await;
    spinner.finish_and_clear();
    let view = built?;

    let format = resolve_format(&args, &config);
    let generated_at = Utc::now();
    let content = match format {
        OutputFormat::Json => report::generate_json_report(&view, generated_at)?,
        OutputFormat::Markdown => report::generate_markdown_report(
            &view,
            generated_at,
            RenderOptions {
                include_tables: config.report.include_tables,
            },
        ),
    };

    let output = config.general.output.as_str();
    if output == "-" {
        print!("{}", content);
        return Ok(0);
    }

    report::write_report(&content, Path::new(output))
        .with_context(|| format!("Failed to write report to {}", output))?;

    if !args.quiet {
        print_summary(&view, output);
    }

    Ok(0)
}

/// Fetch the data a view needs and build it.
async fn build_view(
    kind: ViewKind,
    session: &Session,
    source: &DataSource,
    options: ViewOptions,
) -> Result<DashboardView> {
    let view = match kind {
        ViewKind::Admin => {
            let dashboard = source.admin_dashboard().await?;
            view::admin_view(session, &dashboard)?
        }
        ViewKind::Risk => {
            let (stats, sellers) = source.risk_data().await?;
            view::risk_analysis_view(session, &stats, &sellers, options)?
        }
        ViewKind::Seller => {
            let dashboard = source.seller_dashboard(session.effective_seller_id()).await?;
            view::seller_view(session, &dashboard, options)?
        }
        ViewKind::Reviews => {
            let dashboard = source.seller_dashboard(session.effective_seller_id()).await?;
            view::seller_reviews_view(session, &dashboard)?
        }
        ViewKind::Profile => {
            let record = source.seller_profile(session.effective_seller_id()).await?;
            view::profile_view(session, &record)
        }
    };

    Ok(view)
}

/// Spinner shown while data is fetched; hidden in quiet mode.
fn fetch_spinner(quiet: bool, source: &DataSource) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(format!("Fetching dashboard data from {}", source.describe()));
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// --format wins, then [report].format; an unknown config value falls back to Markdown.
fn resolve_format(args: &Args, config: &Config) -> OutputFormat {
    if let Some(format) = args.format {
        return format;
    }

    OutputFormat::from_str(&config.report.format, true).unwrap_or_else(|_| {
        warn!(
            "Unknown report format {:?} in config, using markdown",
            config.report.format
        );
        OutputFormat::Markdown
    })
}

fn print_summary(view: &DashboardView, output: &str) {
    println!("\n📊 {}", view.title);
    for card in &view.cards {
        println!("   {}: {}", card.label, card.value);
    }
    if !view.insights.is_empty() {
        println!();
        for insight in &view.insights {
            println!("   {} {}", insight.kind.emoji(), insight.text);
        }
    }
    println!("\n✅ Dashboard saved to: {}", output);
}

/// Load configuration from file or use defaults.
///
/// Runs before logging is set up, so it reports where the config came from
/// instead of logging it.
fn load_config(args: &Args) -> Result<(Config, String)> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        let config = Config::load(config_path)?;
        return Ok((config, config_path.display().to_string()));
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => Ok((config, config::CONFIG_FILE.to_string())),
        Ok(None) => Ok((Config::default(), "built-in defaults".to_string())),
        Err(e) => {
            eprintln!("⚠️  Failed to load config: {:#}. Using defaults.", e);
            Ok((Config::default(), "built-in defaults".to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_required_role() {
        assert_eq!(required_role(ViewKind::Admin), Some(Role::Admin));
        assert_eq!(required_role(ViewKind::Risk), Some(Role::Admin));
        assert_eq!(required_role(ViewKind::Seller), Some(Role::Seller));
        assert_eq!(required_role(ViewKind::Reviews), Some(Role::Seller));
        assert_eq!(required_role(ViewKind::Profile), None);
    }

    #[test]
    fn test_log_filter() {
        let filter = log_filter(Level::INFO, None);
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::INFO));

        let filter = log_filter(Level::ERROR, Some("debug"));
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::DEBUG));
    }

    #[test]
    fn test_load_config_from_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("board.toml");
        std::fs::write(&path, "[general]\nverbose = true\n").unwrap();

        let path_arg = path.display().to_string();
        let args =
            Args::try_parse_from(["trustboard", "--user", "root", "--config", &path_arg]).unwrap();
        let (config, origin) = load_config(&args).unwrap();

        assert!(config.general.verbose);
        assert_eq!(config.log_level(args.quiet), Level::DEBUG);
        assert_eq!(origin, path_arg);
    }

    #[tokio::test]
    async fn test_build_profile_view_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("sellers.json");
        std::fs::write(
            &file,
            r#"[
                {"seller_id": "7", "name": "Acme", "trust_score": 88, "risk_level": "Low",
                 "metrics": {"delivery": 91}, "stats": {"real_reviews": 9, "fake_reviews": 1}}
            ]"#,
        )
        .unwrap();

        let session = Session {
            username: "shop".to_string(),
            role: Role::Seller,
            seller_id: Some("7".to_string()),
        };
        let source = DataSource::File(file);

        let view = build_view(ViewKind::Profile, &session, &source, ViewOptions::default())
            .await
            .unwrap();

        assert_eq!(view.title, "Acme");
        assert_eq!(view.chart("metrics_radar").unwrap().datasets[0].data[0], 91.0);
    }

    #[test]
    fn test_resolve_format() {
        let args = Args::try_parse_from(["trustboard", "--user", "root"]).unwrap();
        let mut config = Config::default();
        assert_eq!(resolve_format(&args, &config), OutputFormat::Markdown);

        config.report.format = "JSON".to_string();
        assert_eq!(resolve_format(&args, &config), OutputFormat::Json);

        config.report.format = "yaml".to_string();
        assert_eq!(resolve_format(&args, &config), OutputFormat::Markdown);

        let args =
            Args::try_parse_from(["trustboard", "--user", "root", "--format", "json"]).unwrap();
        config.report.format = "markdown".to_string();
        assert_eq!(resolve_format(&args, &config), OutputFormat::Json);
    }

    #[tokio::test]
    async fn test_build_view_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("sellers.json");
        std::fs::write(
            &file,
            r#"[
                {"seller_id": "1", "name": "A", "trust_score": 20, "risk_level": "High",
                 "stats": {"real_reviews": 8, "fake_reviews": 2}},
                {"seller_id": "2", "name": "B", "trust_score": 21, "risk_level": "Medium",
                 "stats": {"real_reviews": 7, "fake_reviews": 3}},
                {"seller_id": "3", "name": "C", "trust_score": 95, "risk_level": "Low",
                 "stats": {"real_reviews": 10, "fake_reviews": 0}}
            ]"#,
        )
        .unwrap();

        let session = Session {
            username: "root".to_string(),
            role: Role::Admin,
            seller_id: None,
        };
        let source = DataSource::File(file);

        let view = build_view(ViewKind::Risk, &session, &source, ViewOptions::default())
            .await
            .unwrap();

        let histogram = view.chart("trust_score_histogram").unwrap();
        assert_eq!(histogram.datasets[0].data, vec![1.0, 1.0, 0.0, 0.0, 1.0]);
        assert_eq!(
            view.insights[2].text,
            "5 fake reviews detected out of 30 total (16.7% detection rate)."
        );
    }
}
