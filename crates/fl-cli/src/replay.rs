//! Recorded event feed replay
//!
//! One event per line:
//!
//! ```text
//! # time_ms  kind      tab  url
//! 1000       request   12   https://acme.bynder.com/api/v4/search/assets/?field=tags&value=hero
//! 1500       navigate  12   https://acme.bynder.com/media/
//! 9000       close     12
//! ```
//!
//! Blank lines and lines starting with `#` are skipped.

use fl_core::{SnapshotSink, TabId, Timestamp};
use fl_url::Tracker;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedAction {
    Request(String),
    Navigate(String),
    Close,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedLine {
    pub time: Timestamp,
    pub tab_id: TabId,
    pub action: FeedAction,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplayStats {
    pub requests: usize,
    pub navigations: usize,
    pub closes: usize,
    /// Requests and closes that changed tab state
    pub changes: usize,
}

pub fn parse_line(line: &str) -> Result<Option<FeedLine>, String> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let mut parts = line.split_whitespace();
    let (Some(time), Some(kind), Some(tab)) = (parts.next(), parts.next(), parts.next()) else {
        return Err("expected '<time_ms> <kind> <tab_id> [url]'".to_string());
    };

    let time: u64 = time
        .parse()
        .map_err(|_| format!("invalid time '{}'", time))?;
    let tab_id: TabId = tab
        .parse()
        .map_err(|_| format!("invalid tab id '{}'", tab))?;
    let url = parts.next();

    let action = match (kind, url) {
        ("request", Some(url)) => FeedAction::Request(url.to_string()),
        ("navigate", Some(url)) => FeedAction::Navigate(url.to_string()),
        ("close", None) => FeedAction::Close,
        ("request" | "navigate", None) => return Err(format!("'{}' needs a URL", kind)),
        ("close", Some(_)) => return Err("'close' takes no URL".to_string()),
        (other, _) => return Err(format!("unknown event kind '{}'", other)),
    };

    Ok(Some(FeedLine {
        time: Timestamp::from_millis(time),
        tab_id,
        action,
    }))
}

pub fn parse_feed(text: &str) -> Result<Vec<FeedLine>, String> {
    let mut lines = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        if let Some(parsed) = parse_line(line).map_err(|e| format!("line {}: {}", idx + 1, e))? {
            lines.push(parsed);
        }
    }
    Ok(lines)
}

pub fn replay<S: SnapshotSink>(tracker: &mut Tracker<S>, feed: &[FeedLine]) -> ReplayStats {
    let mut stats = ReplayStats::default();

    for line in feed {
        match &line.action {
            FeedAction::Request(url) => {
                stats.requests += 1;
                if tracker.on_request(url, line.tab_id, line.time) {
                    stats.changes += 1;
                }
            }
            FeedAction::Navigate(url) => {
                stats.navigations += 1;
                let outcome = tracker.on_navigated(line.tab_id, url, line.time);
                log::debug!("navigate tab {} -> {}", line.tab_id, outcome.as_str());
            }
            FeedAction::Close => {
                stats.closes += 1;
                if tracker.on_tab_closed(line.tab_id) {
                    stats.changes += 1;
                }
            }
        }
    }

    stats
}
