//! Remote domain-list refresh.
//!
//! Feeds are plain text, one rule per line: hosts-style entries
//! (`0.0.0.0 evil.example`), bare domains, or AdBlock `||domain^` rules.
//! Comment lines start with `#`, `!` or `[`. Refresh is cancellable and never
//! blocks profile operations; inserts are idempotent so a re-run of the same
//! feed is harmless.

use crate::security::domain_lists::{DomainLists, ListError, ListKind};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

const FEED_TIMEOUT: Duration = Duration::from_secs(30);

pub const DEFAULT_FEEDS: &[(&str, ListKind)] = &[
  (
    "https://malware-filter.gitlab.io/malware-filter/malware-filter-domains.txt",
    ListKind::Malware,
  ),
  ("https://easylist.to/easylist/easylist.txt", ListKind::Ad),
  (
    "https://easylist.to/easylist/easyprivacy.txt",
    ListKind::Tracking,
  ),
];

#[derive(Debug, thiserror::Error)]
pub enum UpdateError {
  #[error("Feed request failed: {0}")]
  Http(#[from] reqwest::Error),

  #[error(transparent)]
  List(#[from] ListError),

  #[error("Refresh cancelled")]
  Cancelled,

  #[error("Feed task failed: {0}")]
  Task(String),
}

/// Outcome of one feed refresh.
#[derive(Debug, Clone)]
pub struct FeedRefresh {
  pub url: String,
  pub kind: ListKind,
  pub added: usize,
}

/// Extract a domain from one feed line, or `None` for comments and
/// non-domain rules.
fn extract_domain(line: &str) -> Option<String> {
  let line = line.trim();
  if line.is_empty() || line.starts_with('#') || line.starts_with('!') || line.starts_with('[') {
    return None;
  }

  let candidate = if line.contains("||") && line.contains('^') {
    line.split("||").nth(1)?.split('^').next()?.to_string()
  } else {
    line
      .strip_prefix("0.0.0.0 ")
      .or_else(|| line.strip_prefix("127.0.0.1 "))
      .unwrap_or(line)
      .split_whitespace()
      .next()?
      .to_string()
  };

  if candidate.is_empty()
    || !candidate.contains('.')
    || candidate.contains('*')
    || candidate.contains('/')
  {
    return None;
  }
  Some(candidate)
}

pub struct ListUpdater {
  client: reqwest::Client,
}

impl ListUpdater {
  pub fn new() -> Result<Self, reqwest::Error> {
    let client = reqwest::Client::builder().timeout(FEED_TIMEOUT).build()?;
    Ok(Self { client })
  }

  /// Download one feed and insert its domains. The insert loop runs on the
  /// blocking pool; large feeds carry tens of thousands of lines.
  pub async fn refresh_feed(
    &self,
    lists: Arc<DomainLists>,
    url: &str,
    kind: ListKind,
    cancel: &CancellationToken,
  ) -> Result<FeedRefresh, UpdateError> {
    let body = tokio::select! {
      _ = cancel.cancelled() => return Err(UpdateError::Cancelled),
      response = self.client.get(url).send() => {
        let response = response?.error_for_status()?;
        tokio::select! {
          _ = cancel.cancelled() => return Err(UpdateError::Cancelled),
          text = response.text() => text?,
        }
      }
    };

    let insert_cancel = cancel.clone();
    let added = tokio::task::spawn_blocking(move || -> Result<usize, UpdateError> {
      let mut added = 0;
      for line in body.lines() {
        if insert_cancel.is_cancelled() {
          return Err(UpdateError::Cancelled);
        }
        if let Some(domain) = extract_domain(line) {
          if lists.add(kind, &domain)? {
            added += 1;
          }
        }
      }
      Ok(added)
    })
    .await
    .map_err(|e| UpdateError::Task(format!("{e}")))??;

    Ok(FeedRefresh {
      url: url.to_string(),
      kind,
      added,
    })
  }

  /// Refresh every feed in order. A failing feed is logged and skipped; only
  /// cancellation aborts the whole run.
  pub async fn refresh_all(
    &self,
    lists: Arc<DomainLists>,
    feeds: &[(&str, ListKind)],
    cancel: &CancellationToken,
  ) -> Result<Vec<FeedRefresh>, UpdateError> {
    let mut reports = Vec::new();
    for (url, kind) in feeds {
      match self.refresh_feed(lists.clone(), url, *kind, cancel).await {
        Ok(report) => {
          log::info!("Refreshed {} domains from {url}", report.added);
          reports.push(report);
        }
        Err(UpdateError::Cancelled) => return Err(UpdateError::Cancelled),
        Err(e) => log::warn!("Feed refresh failed for {url}: {e}"),
      }
    }
    Ok(reports)
  }
}
