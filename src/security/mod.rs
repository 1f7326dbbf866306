//! Threat scoring.
//!
//! [`ThreatScorer`] composes the lexical URL analysis, the TLS certificate
//! inspection and the content signature scan into one result with an overall
//! score, a discrete threat level and user-facing recommendations. Results are
//! cached by URL hash for an hour. A scan never fails: sub-analyses that
//! cannot run are skipped or reported degraded, and a failed certificate check
//! floors the overall risk at MEDIUM instead of defaulting to safe.

pub mod certificate;
pub mod content_scanner;
pub mod domain_lists;
pub mod list_updater;
pub mod url_analyzer;

use certificate::{CertError, CertificateAnalysis};
use chrono::{DateTime, Utc};
use content_scanner::MalwareAnalysis;
use domain_lists::DomainLists;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use url_analyzer::UrlAnalysis;

pub const SCAN_CACHE_TTL: Duration = Duration::from_secs(3600);

/// Floor applied to the overall score when the certificate could not be
/// verified at all.
const UNVERIFIED_FLOOR: u32 = 40;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ThreatLevel {
  Safe,
  Low,
  Medium,
  High,
  Critical,
}

impl ThreatLevel {
  /// Fixed discretization of a 0-100 risk score.
  pub fn from_score(score: u32) -> Self {
    match score {
      80.. => ThreatLevel::Critical,
      60..=79 => ThreatLevel::High,
      40..=59 => ThreatLevel::Medium,
      20..=39 => ThreatLevel::Low,
      _ => ThreatLevel::Safe,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ThreatType {
  Malware,
  Phishing,
  Suspicious,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThreatScanResult {
  pub url: String,
  pub timestamp: DateTime<Utc>,
  pub url_analysis: UrlAnalysis,
  /// Absent for non-HTTPS URLs.
  pub certificate_analysis: Option<CertificateAnalysis>,
  /// Present only when page content was supplied.
  pub malware_analysis: Option<MalwareAnalysis>,
  pub overall_risk_score: u32,
  pub overall_threat_level: ThreatLevel,
  pub recommendations: Vec<String>,
}

struct CacheEntry {
  result: ThreatScanResult,
  inserted_at: Instant,
}

pub struct ThreatScorer {
  lists: Arc<DomainLists>,
  cache: Mutex<HashMap<String, CacheEntry>>,
  cache_ttl: Duration,
}

fn degraded_certificate(error: &CertError) -> CertificateAnalysis {
  let risk_score = match error {
    CertError::Timeout => 40,
    CertError::Tls(_) => 50,
    CertError::Connection(_) => 30,
  };
  CertificateAnalysis {
    valid: false,
    risk_score,
    issues: vec![format!("{error}")],
  }
}

impl ThreatScorer {
  pub fn new(lists: Arc<DomainLists>) -> Self {
    Self::with_cache_ttl(lists, SCAN_CACHE_TTL)
  }

  pub fn with_cache_ttl(lists: Arc<DomainLists>, cache_ttl: Duration) -> Self {
    Self {
      lists,
      cache: Mutex::new(HashMap::new()),
      cache_ttl,
    }
  }

  fn cache_key(url: &str) -> String {
    blake3::hash(url.as_bytes()).to_hex().to_string()
  }

  /// Full scan of a URL, with optional already-fetched page content. Cached
  /// by URL for the TTL window; a cache hit never re-runs the network
  /// certificate check.
  pub fn score(&self, url: &str, content: Option<&str>) -> ThreatScanResult {
    let key = Self::cache_key(url);
    {
      let cache = self.cache.lock().unwrap();
      if let Some(entry) = cache.get(&key) {
        if entry.inserted_at.elapsed() < self.cache_ttl {
          return entry.result.clone();
        }
      }
    }

    let result = self.scan(url, content);

    let mut cache = self.cache.lock().unwrap();
    cache.insert(
      key,
      CacheEntry {
        result: result.clone(),
        inserted_at: Instant::now(),
      },
    );
    result
  }

  /// Async form of [`score`](Self::score); the scan runs on the blocking pool
  /// since certificate validation is a synchronous network round-trip.
  pub async fn score_async(
    self: &Arc<Self>,
    url: String,
    content: Option<String>,
  ) -> Result<ThreatScanResult, tokio::task::JoinError> {
    let scorer = self.clone();
    tokio::task::spawn_blocking(move || scorer.score(&url, content.as_deref())).await
  }

  pub fn clear_cache(&self) {
    self.cache.lock().unwrap().clear();
  }

  fn scan(&self, url: &str, content: Option<&str>) -> ThreatScanResult {
    let url_analysis = url_analyzer::analyze(url, &self.lists);

    let mut verification_failed = false;
    let certificate_analysis = match url::Url::parse(url) {
      Ok(parsed) if parsed.scheme() == "https" => {
        parsed
          .host_str()
          .map(|host| match certificate::validate(host, parsed.port().unwrap_or(443)) {
            Ok(analysis) => analysis,
            Err(e) => {
              log::warn!("Certificate validation failed for {host}: {e}");
              verification_failed = true;
              degraded_certificate(&e)
            }
          })
      }
      _ => None,
    };

    let malware_analysis = content.map(content_scanner::scan);

    let mut scores = vec![url_analysis.risk_score];
    if let Some(cert) = &certificate_analysis {
      scores.push(cert.risk_score);
    }
    if let Some(malware) = &malware_analysis {
      scores.push(malware.risk_score);
    }
    let mut overall_risk_score =
      (scores.iter().sum::<u32>() / scores.len() as u32).min(100);
    if verification_failed {
      overall_risk_score = overall_risk_score.max(UNVERIFIED_FLOOR);
    }
    let overall_threat_level = ThreatLevel::from_score(overall_risk_score);

    let recommendations = build_recommendations(
      overall_threat_level,
      &url_analysis,
      certificate_analysis.as_ref(),
      verification_failed,
    );

    ThreatScanResult {
      url: url.to_string(),
      timestamp: Utc::now(),
      url_analysis,
      certificate_analysis,
      malware_analysis,
      overall_risk_score,
      overall_threat_level,
      recommendations,
    }
  }
}

fn build_recommendations(
  level: ThreatLevel,
  url_analysis: &UrlAnalysis,
  certificate_analysis: Option<&CertificateAnalysis>,
  verification_failed: bool,
) -> Vec<String> {
  let mut recommendations: Vec<String> = match level {
    ThreatLevel::Critical => vec![
      "BLOCK ACCESS TO THIS SITE IMMEDIATELY".to_string(),
      "Clear all browser data".to_string(),
      "Run full system antivirus scan".to_string(),
    ],
    ThreatLevel::High => vec![
      "Do not enter personal information".to_string(),
      "Do not download any files".to_string(),
      "Close this page".to_string(),
    ],
    ThreatLevel::Medium => vec![
      "Proceed with caution".to_string(),
      "Verify site authenticity".to_string(),
      "Avoid entering sensitive information".to_string(),
    ],
    ThreatLevel::Low => vec!["Site appears safe, but stay vigilant".to_string()],
    ThreatLevel::Safe => Vec::new(),
  };

  if url_analysis.threat_types.contains(&ThreatType::Phishing) {
    recommendations.push("Possible phishing attempt - verify URL carefully".to_string());
  }
  if certificate_analysis.is_some_and(|cert| !cert.valid) {
    recommendations.push("SSL certificate issues detected".to_string());
  }
  if verification_failed {
    recommendations.push("Could not verify site certificate".to_string());
  }

  recommendations
}

#[cfg(test)]
mod tests {
  use super::*;
  use domain_lists::ListKind;

  fn scorer() -> ThreatScorer {
    ThreatScorer::new(Arc::new(DomainLists::open_in_memory().unwrap()))
  }

  #[test]
  fn test_threat_level_thresholds() {
    assert_eq!(ThreatLevel::from_score(0), ThreatLevel::Safe);
    assert_eq!(ThreatLevel::from_score(19), ThreatLevel::Safe);
    assert_eq!(ThreatLevel::from_score(20), ThreatLevel::Low);
    assert_eq!(ThreatLevel::from_score(40), ThreatLevel::Medium);
    assert_eq!(ThreatLevel::from_score(60), ThreatLevel::High);
    assert_eq!(ThreatLevel::from_score(80), ThreatLevel::Critical);
    assert_eq!(ThreatLevel::from_score(100), ThreatLevel::Critical);
  }

  #[test]
  fn test_phishing_url_scores_low_or_worse() {
    let result = scorer().score("http://example.com/verify-account-urgent", None);
    assert!(result.overall_risk_score > 0);
    assert!(result
      .url_analysis
      .threat_types
      .contains(&ThreatType::Phishing));
    assert!(result.overall_threat_level >= ThreatLevel::Low);
    assert!(result
      .recommendations
      .iter()
      .any(|r| r.contains("phishing")));
  }

  #[test]
  fn test_non_https_skips_certificate_analysis() {
    let result = scorer().score("http://example.com/", None);
    assert!(result.certificate_analysis.is_none());
    assert!(result.malware_analysis.is_none());
  }

  #[test]
  fn test_overall_is_average_of_present_scores() {
    // URL score 20 (3 keywords +5 each, http +5); content score 40 (mining)
    let result = scorer().score(
      "http://example.com/verify-account-urgent",
      Some("worker pool hash difficulty"),
    );
    assert_eq!(result.url_analysis.risk_score, 20);
    assert_eq!(result.malware_analysis.as_ref().unwrap().risk_score, 40);
    assert_eq!(result.overall_risk_score, 30);
    assert_eq!(result.overall_threat_level, ThreatLevel::Low);
  }

  #[test]
  fn test_cache_returns_identical_result() {
    let scorer = scorer();
    let first = scorer.score("http://example.com/login", None);
    let second = scorer.score("http://example.com/login", None);
    assert_eq!(first, second);
  }

  #[test]
  fn test_expired_cache_entry_is_recomputed() {
    let lists = Arc::new(DomainLists::open_in_memory().unwrap());
    let scorer = ThreatScorer::with_cache_ttl(lists.clone(), Duration::ZERO);

    let before = scorer.score("http://target.example/", None);
    lists.add(ListKind::Malware, "target.example").unwrap();
    let after = scorer.score("http://target.example/", None);
    assert!(after.overall_risk_score > before.overall_risk_score);
  }

  #[test]
  fn test_failed_verification_is_at_least_medium() {
    let result = scorer().score("https://no-such-host.invalid/", None);
    let cert = result.certificate_analysis.unwrap();
    assert!(!cert.valid);
    assert!(result.overall_risk_score >= 40);
    assert!(result.overall_threat_level >= ThreatLevel::Medium);
    assert!(result
      .recommendations
      .iter()
      .any(|r| r.contains("Could not verify")));
  }

  #[tokio::test]
  async fn test_async_scoring_matches_blocking() {
    let scorer = Arc::new(scorer());
    let blocking = scorer.score("http://example.com/update", None);
    let through_pool = scorer
      .score_async("http://example.com/update".to_string(), None)
      .await
      .unwrap();
    assert_eq!(blocking, through_pool);
  }
}
