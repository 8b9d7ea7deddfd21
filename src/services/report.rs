//! Scan report rendering

use serde::Serialize;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::models::signal::Signal;
use crate::services::notifier::format_price;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to encode report: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("failed to write report {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Rendered report ready to be written or attached somewhere
#[derive(Debug, Clone, PartialEq)]
pub struct ReportArtifact {
    pub file_name: String,
    pub content_type: &'static str,
    pub body: String,
}

impl ReportArtifact {
    pub async fn write_to(&self, dir: &Path) -> Result<PathBuf, ReportError> {
        let path = dir.join(&self.file_name);
        let io_err = |source| ReportError::Io {
            path: path.display().to_string(),
            source,
        };
        tokio::fs::create_dir_all(dir).await.map_err(io_err)?;
        tokio::fs::write(&path, self.body.as_bytes())
            .await
            .map_err(io_err)?;
        Ok(path)
    }
}

pub trait ReportExporter: Send + Sync {
    /// `signals` are expected ranked best first
    fn render(&self, signals: &[Signal], title: &str) -> Result<ReportArtifact, ReportError>;
}

/// Lowercase, dash-separated title for file names
fn slug(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('-') && !slug.is_empty() {
            slug.push('-');
        }
    }
    let trimmed = slug.trim_end_matches('-');
    if trimmed.is_empty() {
        "report".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Fixed-width table with a top-N section followed by everything else
pub struct TextReportExporter {
    pub top_n: usize,
}

impl TextReportExporter {
    pub fn new(top_n: usize) -> Self {
        Self { top_n }
    }

    fn write_table(out: &mut String, signals: &[Signal], first_rank: usize) {
        let _ = writeln!(
            out,
            "{:>3}  {:<14} {:<5} {:>12} {:>12} {:>12} {:>12} {:>14} {:>5} {:>6} {:>5}  {:<14} {}",
            "#", "Symbol", "Side", "Entry", "SL", "TP", "Liq.", "Size", "Conf", "Score", "RRR", "Regime", "Strategy"
        );
        for (i, s) in signals.iter().enumerate() {
            let _ = writeln!(
                out,
                "{:>3}  {:<14} {:<5} {:>12} {:>12} {:>12} {:>12} {:>14.6} {:>5.0} {:>6.2} {:>5.2}  {:<14} {}",
                first_rank + i,
                s.symbol,
                s.side.as_str(),
                format_price(s.entry),
                format_price(s.stop),
                format_price(s.target),
                format_price(s.liquidation),
                s.position_size,
                s.confidence,
                s.score,
                s.risk_reward(),
                s.regime.as_str(),
                s.strategy.label()
            );
        }
    }
}

impl ReportExporter for TextReportExporter {
    fn render(&self, signals: &[Signal], title: &str) -> Result<ReportArtifact, ReportError> {
        let split = self.top_n.min(signals.len());
        let (top, others) = signals.split_at(split);

        let mut body = String::new();
        let _ = writeln!(body, "{}", title);
        let _ = writeln!(body, "{}", "=".repeat(title.chars().count()));
        let _ = writeln!(body);

        let _ = writeln!(body, "Top {} signals", self.top_n);
        if top.is_empty() {
            let _ = writeln!(body, "  (none)");
        } else {
            Self::write_table(&mut body, top, 1);
        }

        if !others.is_empty() {
            let _ = writeln!(body);
            let _ = writeln!(body, "Other signals");
            Self::write_table(&mut body, others, split + 1);
        }

        Ok(ReportArtifact {
            file_name: format!("{}.txt", slug(title)),
            content_type: "text/plain",
            body,
        })
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    title: &'a str,
    count: usize,
    signals: &'a [Signal],
}

pub struct JsonReportExporter;

impl ReportExporter for JsonReportExporter {
    fn render(&self, signals: &[Signal], title: &str) -> Result<ReportArtifact, ReportError> {
        let body = serde_json::to_string_pretty(&JsonReport {
            title,
            count: signals.len(),
            signals,
        })?;
        Ok(ReportArtifact {
            file_name: format!("{}.json", slug(title)),
            content_type: "application/json",
            body,
        })
    }
}
