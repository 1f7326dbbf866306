//! Domain membership store.
//!
//! Four disjoint-purpose sets (malware, ad, tracking, whitelist) backed by
//! SQLite. Lookups normalize the domain first: lowercase with a leading
//! `www.` stripped. Inserts are idempotent. Whitelist membership
//! short-circuits every blocking check for that domain.

use rusqlite::Connection;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

#[derive(Debug, thiserror::Error)]
pub enum ListError {
  #[error("Database error: {0}")]
  Database(#[from] rusqlite::Error),

  #[error("Database path error: {0}")]
  Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListKind {
  Malware,
  Ad,
  Tracking,
  Whitelist,
}

impl ListKind {
  fn table(&self) -> &'static str {
    match self {
      ListKind::Malware => "malware_domains",
      ListKind::Ad => "ad_domains",
      ListKind::Tracking => "tracking_domains",
      ListKind::Whitelist => "whitelist_domains",
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockReason {
  Malware,
  Ads,
  Tracking,
}

/// Outcome of a blocking check for one domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockDecision {
  pub blocked: bool,
  pub reason: Option<BlockReason>,
}

impl BlockDecision {
  fn allow() -> Self {
    Self {
      blocked: false,
      reason: None,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct SecurityStats {
  pub malware_domains: u64,
  pub ad_domains: u64,
  pub tracking_domains: u64,
  pub whitelisted_domains: u64,
}

pub struct DomainLists {
  conn: Mutex<Connection>,
  malware_protection: AtomicBool,
  ad_blocking: AtomicBool,
  tracking_protection: AtomicBool,
}

/// Lowercase and strip a single leading `www.`.
pub fn normalize_domain(domain: &str) -> String {
  let lower = domain.trim().to_lowercase();
  lower.strip_prefix("www.").unwrap_or(&lower).to_string()
}

impl DomainLists {
  /// Open (or create) the database at `path` and seed the default ad/tracker
  /// entries. All protections start enabled.
  pub fn open(path: &Path) -> Result<Self, ListError> {
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)?;
    }
    let conn = Connection::open(path)?;
    let lists = Self::from_connection(conn)?;
    lists.seed_defaults()?;
    Ok(lists)
  }

  /// In-memory store, used by tests.
  pub fn open_in_memory() -> Result<Self, ListError> {
    Self::from_connection(Connection::open_in_memory()?)
  }

  fn from_connection(conn: Connection) -> Result<Self, ListError> {
    conn.execute_batch(
      "CREATE TABLE IF NOT EXISTS malware_domains (
         domain TEXT PRIMARY KEY,
         source TEXT NOT NULL DEFAULT 'manual',
         added_at TEXT NOT NULL DEFAULT (datetime('now'))
       );
       CREATE TABLE IF NOT EXISTS ad_domains (
         domain TEXT PRIMARY KEY,
         added_at TEXT NOT NULL DEFAULT (datetime('now'))
       );
       CREATE TABLE IF NOT EXISTS tracking_domains (
         domain TEXT PRIMARY KEY,
         added_at TEXT NOT NULL DEFAULT (datetime('now'))
       );
       CREATE TABLE IF NOT EXISTS whitelist_domains (
         domain TEXT PRIMARY KEY,
         added_at TEXT NOT NULL DEFAULT (datetime('now'))
       );",
    )?;
    Ok(Self {
      conn: Mutex::new(conn),
      malware_protection: AtomicBool::new(true),
      ad_blocking: AtomicBool::new(true),
      tracking_protection: AtomicBool::new(true),
    })
  }

  fn seed_defaults(&self) -> Result<(), ListError> {
    const DEFAULT_AD_DOMAINS: &[&str] = &[
      "googlesyndication.com",
      "doubleclick.net",
      "googleadservices.com",
      "amazon-adsystem.com",
      "outbrain.com",
      "taboola.com",
      "adsystem.amazon.com",
      "ads.twitter.com",
    ];
    const DEFAULT_TRACKING_DOMAINS: &[&str] = &[
      "google-analytics.com",
      "googletagmanager.com",
      "hotjar.com",
      "mixpanel.com",
      "segment.com",
      "fullstory.com",
      "mouseflow.com",
      "crazyegg.com",
      "quantserve.com",
    ];
    for domain in DEFAULT_AD_DOMAINS {
      self.add(ListKind::Ad, domain)?;
    }
    for domain in DEFAULT_TRACKING_DOMAINS {
      self.add(ListKind::Tracking, domain)?;
    }
    Ok(())
  }

  /// Idempotent insert. Returns true if the domain was newly added.
  pub fn add(&self, kind: ListKind, domain: &str) -> Result<bool, ListError> {
    let normalized = normalize_domain(domain);
    if normalized.is_empty() {
      return Ok(false);
    }
    let conn = self.conn.lock().unwrap();
    let changed = conn.execute(
      &format!(
        "INSERT OR IGNORE INTO {} (domain) VALUES (?1)",
        kind.table()
      ),
      [&normalized],
    )?;
    Ok(changed > 0)
  }

  /// Remove a domain from one set. Returns true if it was present.
  pub fn remove(&self, kind: ListKind, domain: &str) -> Result<bool, ListError> {
    let normalized = normalize_domain(domain);
    let conn = self.conn.lock().unwrap();
    let changed = conn.execute(
      &format!("DELETE FROM {} WHERE domain = ?1", kind.table()),
      [&normalized],
    )?;
    Ok(changed > 0)
  }

  pub fn contains(&self, kind: ListKind, domain: &str) -> Result<bool, ListError> {
    let normalized = normalize_domain(domain);
    let conn = self.conn.lock().unwrap();
    let found = conn
      .query_row(
        &format!("SELECT 1 FROM {} WHERE domain = ?1", kind.table()),
        [&normalized],
        |_| Ok(()),
      )
      .is_ok();
    Ok(found)
  }

  /// Blocking decision for a domain. Whitelist wins over everything; the
  /// remaining checks run in severity order (malware, ads, tracking) and honor
  /// the per-category enable flags.
  pub fn check(&self, domain: &str) -> Result<BlockDecision, ListError> {
    if self.contains(ListKind::Whitelist, domain)? {
      return Ok(BlockDecision::allow());
    }
    if self.malware_protection.load(Ordering::Relaxed) && self.contains(ListKind::Malware, domain)?
    {
      return Ok(BlockDecision {
        blocked: true,
        reason: Some(BlockReason::Malware),
      });
    }
    if self.ad_blocking.load(Ordering::Relaxed) && self.contains(ListKind::Ad, domain)? {
      return Ok(BlockDecision {
        blocked: true,
        reason: Some(BlockReason::Ads),
      });
    }
    if self.tracking_protection.load(Ordering::Relaxed)
      && self.contains(ListKind::Tracking, domain)?
    {
      return Ok(BlockDecision {
        blocked: true,
        reason: Some(BlockReason::Tracking),
      });
    }
    Ok(BlockDecision::allow())
  }

  pub fn set_malware_protection(&self, enabled: bool) {
    self.malware_protection.store(enabled, Ordering::Relaxed);
  }

  pub fn set_ad_blocking(&self, enabled: bool) {
    self.ad_blocking.store(enabled, Ordering::Relaxed);
  }

  pub fn set_tracking_protection(&self, enabled: bool) {
    self.tracking_protection.store(enabled, Ordering::Relaxed);
  }

  /// Per-category entry counts.
  pub fn stats(&self) -> Result<SecurityStats, ListError> {
    let conn = self.conn.lock().unwrap();
    let count = |table: &str| -> Result<u64, rusqlite::Error> {
      conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
        row.get::<_, i64>(0).map(|v| v as u64)
      })
    };
    Ok(SecurityStats {
      malware_domains: count("malware_domains")?,
      ad_domains: count("ad_domains")?,
      tracking_domains: count("tracking_domains")?,
      whitelisted_domains: count("whitelist_domains")?,
    })
  }
}
