//! Declarative dashboard views.
//!
//! A view is plain data: stat cards, chart specifications, tables and
//! insight lines. Builders in [`builder`] produce views from fetched data and
//! the caller's [`Session`]; the report module turns a view into Markdown or
//! JSON.

pub mod builder;

pub use builder::*;

use crate::models::{Role, Session};
use serde::Serialize;
use thiserror::Error;

/// Page a rejected session is sent to.
pub const LOGIN_PAGE: &str = "login.html";

/// The session's role does not grant access to the requested view.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("access denied for {username:?}: {required} role required, session has {actual}")]
pub struct AccessDenied {
    pub username: String,
    pub required: Role,
    pub actual: Role,
    /// Where the client should go instead.
    pub redirect: &'static str,
}

/// Check that `session` carries `required`.
pub fn require_role(session: &Session, required: Role) -> Result<(), AccessDenied> {
    if session.role == required {
        Ok(())
    } else {
        Err(AccessDenied {
            username: session.username.clone(),
            required,
            actual: session.role,
            redirect: LOGIN_PAGE,
        })
    }
}

/// A complete page, ready to render.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardView {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub greeting: Option<String>,
    pub cards: Vec<StatCard>,
    pub charts: Vec<ChartSpec>,
    pub tables: Vec<TableSpec>,
    pub insights: Vec<InsightLine>,
}

#[cfg(test)]
impl DashboardView {
    pub fn chart(&self, id: &str) -> Option<&ChartSpec> {
        self.charts.iter().find(|c| c.id == id)
    }

    pub fn table(&self, id: &str) -> Option<&TableSpec> {
        self.tables.iter().find(|t| t.id == id)
    }

    pub fn card(&self, label: &str) -> Option<&StatCard> {
        self.cards.iter().find(|c| c.label == label)
    }
}

/// A single headline number.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatCard {
    pub label: String,
    pub value: String,
}

impl StatCard {
    pub fn new(label: &str, value: impl ToString) -> Self {
        Self {
            label: label.to_string(),
            value: value.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Bar,
    HorizontalBar,
    Doughnut,
    Radar,
    Line,
}

/// One series of a chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dataset {
    pub label: String,
    pub data: Vec<f64>,
    /// One color for the whole series, or one per point.
    pub colors: Vec<String>,
}

impl Dataset {
    pub fn new(label: &str, data: Vec<f64>, colors: &[&str]) -> Self {
        Self {
            label: label.to_string(),
            data,
            colors: colors.iter().map(|c| c.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub id: String,
    pub kind: ChartKind,
    pub title: String,
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
    /// Fixed upper bound of the value axis, when the chart has one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableSpec {
    pub id: String,
    pub title: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    /// Shown instead of the rows when there are none.
    pub empty_message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightKind {
    Info,
    Success,
    Warning,
    Danger,
}

impl InsightKind {
    /// Maps the backend's insight type; unknown types read as info.
    pub fn from_label(label: &str) -> Self {
        match label {
            "success" => InsightKind::Success,
            "warning" => InsightKind::Warning,
            "danger" => InsightKind::Danger,
            _ => InsightKind::Info,
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            InsightKind::Info => "ℹ️",
            InsightKind::Success => "✅",
            InsightKind::Warning => "⚠️",
            InsightKind::Danger => "⛔",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InsightLine {
    pub kind: InsightKind,
    pub text: String,
}

impl InsightLine {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            kind: InsightKind::Info,
            text: text.into(),
        }
    }
}
