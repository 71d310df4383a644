//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::models::{Role, Session};
use clap::Parser;
use std::path::PathBuf;

/// TrustBoard - seller trust dashboards in your terminal
///
/// Fetches scored sellers from the trust-scoring backend, aggregates them
/// and renders the admin, risk analysis or seller dashboard as Markdown or
/// JSON.
///
/// Examples:
///   trustboard --user root --role admin --view risk
///   trustboard --user shop --role seller --seller-id 3 --view seller
///   trustboard --user root --role admin --input sellers.json --format json -o -
///   trustboard --user root --view profile --seller-id 7
///   trustboard --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Dashboard to render
    #[arg(long, value_name = "VIEW", default_value = "admin")]
    pub view: ViewKind,

    /// Base URL of the trust-scoring backend
    ///
    /// Overrides [api].base_url from .trustboard.toml.
    #[arg(long, value_name = "URL", env = "TRUSTBOARD_API_URL")]
    pub api_url: Option<String>,

    /// Read dashboard data from a JSON file instead of the API
    ///
    /// Accepts the admin endpoint's {stats, sellers} object, a bare seller
    /// array, or a seller dashboard object for the seller views.
    #[arg(short, long, value_name = "FILE", conflicts_with = "api_url")]
    pub input: Option<PathBuf>,

    /// Logged-in username
    #[arg(
        short,
        long,
        value_name = "NAME",
        env = "TRUSTBOARD_USER",
        required_unless_present = "init_config"
    )]
    pub user: Option<String>,

    /// Role of the logged-in user
    #[arg(long, value_name = "ROLE", env = "TRUSTBOARD_ROLE", default_value = "admin")]
    pub role: RoleArg,

    /// Seller id of the logged-in seller
    #[arg(long, value_name = "ID", env = "TRUSTBOARD_SELLER_ID")]
    pub seller_id: Option<String>,

    /// Output format (markdown, json)
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Output file path; "-" writes to stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Number of sellers in the ranking charts
    #[arg(long, value_name = "COUNT")]
    pub top_n: Option<usize>,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .trustboard.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .trustboard.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Which dashboard to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ViewKind {
    /// Admin overview (stats, risk split, histogram, sellers)
    Admin,
    /// Risk analysis (rankings, fake reviews, insights)
    Risk,
    /// Seller dashboard
    Seller,
    /// Seller's full review list
    Reviews,
    /// One seller's public profile (needs --seller-id)
    Profile,
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Markdown => "markdown",
            OutputFormat::Json => "json",
        }
    }
}

/// Role values accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum RoleArg {
    Admin,
    Seller,
}

impl From<RoleArg> for Role {
    fn from(role: RoleArg) -> Self {
        match role {
            RoleArg::Admin => Role::Admin,
            RoleArg::Seller => Role::Seller,
        }
    }
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if self.user.as_deref().map_or(true, |u| u.trim().is_empty()) {
            return Err("Username must not be empty".to_string());
        }

        if let Some(ref url) = self.api_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err("API URL must start with 'http://' or 'https://'".to_string());
            }
        }

        if self.view == ViewKind::Profile
            && self.seller_id.as_deref().map_or(true, |id| id.trim().is_empty())
        {
            return Err("--view profile requires --seller-id".to_string());
        }

        if self.top_n == Some(0) {
            return Err("Top N must be at least 1".to_string());
        }

        if self.timeout == Some(0) {
            return Err("Timeout must be at least 1 second".to_string());
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(ref input) = self.input {
            if !input.is_file() {
                return Err(format!("Input file does not exist: {}", input.display()));
            }
        }

        Ok(())
    }

    /// The session described by --user, --role and --seller-id.
    pub fn session(&self) -> Session {
        Session {
            username: self.user.clone().unwrap_or_default(),
            role: self.role.into(),
            seller_id: self.seller_id.clone(),
        }
    }
}
