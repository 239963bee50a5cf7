//! Timeline loading from a remote endpoint or a local file.
//!
//! [`TimelineLoader::load`] never fails: the primary source is tried, then the
//! fallback once, and an empty timeline is returned when both are unavailable.
//! Commands that must report errors use [`TimelineLoader::load_source`].

mod thumbnail;

use std::fmt;
use std::io::Read;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use tracing::{info, warn};

use crate::models::Timeline;
use crate::parsers::{parse_timeline_file, parse_timeline_str};
use crate::utils::MAX_TIMELINE_SIZE_BYTES;
pub use thumbnail::probe_thumbnail;

/// Where a timeline document comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimelineSource {
    /// JSON body of an HTTP GET
    Http { url: String },
    /// JSON file on disk
    File { path: PathBuf },
}

impl fmt::Display for TimelineSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimelineSource::Http { url } => write!(f, "{}", url),
            TimelineSource::File { path } => write!(f, "{}", path.display()),
        }
    }
}

/// Primary source plus at most one fallback
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineSources {
    pub primary: TimelineSource,
    pub fallback: Option<TimelineSource>,
}

impl TimelineSources {
    pub fn single(primary: TimelineSource) -> Self {
        Self { primary, fallback: None }
    }
}

/// Result of a fail-soft load
#[derive(Debug, Default)]
pub struct LoadReport {
    pub timeline: Timeline,
    /// Source that produced the timeline, `None` when every source failed
    pub source: Option<TimelineSource>,
    /// One entry per failed source, in the order tried
    pub failures: Vec<String>,
}

impl LoadReport {
    pub fn used_fallback(&self) -> bool {
        self.source.is_some() && !self.failures.is_empty()
    }
}

pub struct TimelineLoader {
    agent: ureq::Agent,
}

impl TimelineLoader {
    pub fn new(timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self { agent }
    }

    /// Load one source, reporting any failure
    pub fn load_source(&self, source: &TimelineSource) -> Result<Timeline> {
        match source {
            TimelineSource::File { path } => parse_timeline_file(path),
            TimelineSource::Http { url } => self.fetch(url),
        }
    }

    /// Load the primary source, then the fallback once; empty when both fail
    pub fn load(&self, sources: &TimelineSources) -> Timeline {
        self.load_with_report(sources).timeline
    }

    pub fn load_with_report(&self, sources: &TimelineSources) -> LoadReport {
        let mut report = LoadReport::default();

        let candidates = std::iter::once(&sources.primary).chain(sources.fallback.as_ref());
        for source in candidates {
            match self.load_source(source) {
                Ok(timeline) => {
                    info!(source = %source, days = timeline.len(), "Loaded timeline");
                    report.timeline = timeline;
                    report.source = Some(source.clone());
                    return report;
                }
                Err(e) => {
                    warn!(source = %source, "Failed to load timeline: {:#}", e);
                    report.failures.push(format!("{}: {:#}", source, e));
                }
            }
        }

        warn!("No timeline source available, showing an empty archive");
        report
    }

    fn fetch(&self, url: &str) -> Result<Timeline> {
        let response = self
            .agent
            .get(url)
            .set("Accept", "application/json")
            .call()
            .with_context(|| format!("Failed to fetch timeline from {}", url))?;

        let mut body = String::new();
        response
            .into_reader()
            .take(MAX_TIMELINE_SIZE_BYTES + 1)
            .read_to_string(&mut body)
            .with_context(|| format!("Failed to read timeline response from {}", url))?;

        if body.len() as u64 > MAX_TIMELINE_SIZE_BYTES {
            bail!(
                "Timeline response from {} exceeds the {}MB limit",
                url,
                MAX_TIMELINE_SIZE_BYTES / 1024 / 1024
            );
        }

        parse_timeline_str(&body).with_context(|| format!("Invalid timeline from {}", url))
    }
}

impl Default for TimelineLoader {
    fn default() -> Self {
        Self::new(Duration::from_secs(30))
    }
}
