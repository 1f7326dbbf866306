use andetect_core::security::domain_lists::{BlockReason, DomainLists, ListKind};
use andetect_core::security::{ThreatLevel, ThreatScorer, ThreatType};
use std::sync::Arc;

fn scorer_with_lists() -> (Arc<DomainLists>, ThreatScorer) {
  let _ = env_logger::builder().is_test(true).try_init();
  let lists = Arc::new(DomainLists::open_in_memory().unwrap());
  let scorer = ThreatScorer::new(lists.clone());
  (lists, scorer)
}

#[test]
fn test_phishing_url_is_flagged() {
  let (_, scorer) = scorer_with_lists();
  let result = scorer.score("http://example.com/verify-account-urgent", None);

  assert!(result.overall_risk_score > 0);
  assert!(result
    .url_analysis
    .threat_types
    .contains(&ThreatType::Phishing));
  assert!(result.overall_threat_level >= ThreatLevel::Low);
}

#[test]
fn test_ip_host_always_contributes() {
  let (_, scorer) = scorer_with_lists();
  let result = scorer.score("http://192.0.2.55/", None);
  assert!(result.url_analysis.risk_score >= 30);
}

#[test]
fn test_cache_avoids_rescoring() {
  let (lists, scorer) = scorer_with_lists();
  let first = scorer.score("http://cached.example/", None);

  // A list change after the scan must not affect the cached result
  lists.add(ListKind::Malware, "cached.example").unwrap();
  let second = scorer.score("http://cached.example/", None);
  assert_eq!(first, second);

  scorer.clear_cache();
  let third = scorer.score("http://cached.example/", None);
  assert!(third.overall_risk_score > first.overall_risk_score);
}

#[test]
fn test_whitelist_short_circuits_blocking() {
  let lists = DomainLists::open_in_memory().unwrap();
  lists.add(ListKind::Malware, "dual.example").unwrap();
  lists.add(ListKind::Ad, "dual.example").unwrap();
  lists.add(ListKind::Whitelist, "dual.example").unwrap();

  let decision = lists.check("www.DUAL.example").unwrap();
  assert!(!decision.blocked);

  lists.remove(ListKind::Whitelist, "dual.example").unwrap();
  let decision = lists.check("dual.example").unwrap();
  assert!(decision.blocked);
  assert_eq!(decision.reason, Some(BlockReason::Malware));
}

#[test]
fn test_content_scan_contributes_to_overall() {
  let (_, scorer) = scorer_with_lists();
  let clean = scorer.score("http://pages.example/a", None);
  let mining = scorer.score(
    "http://pages.example/b",
    Some("connect to pool, submit hash at difficulty, spawn worker"),
  );
  assert!(mining.overall_risk_score > clean.overall_risk_score);
  assert!(mining.malware_analysis.is_some());
}

#[test]
fn test_listed_domain_scores_high() {
  let (lists, scorer) = scorer_with_lists();
  lists.add(ListKind::Malware, "evil.example").unwrap();

  let result = scorer.score("http://evil.example/home", None);
  assert!(result.url_analysis.risk_score >= 70);
  assert!(result
    .url_analysis
    .threat_types
    .contains(&ThreatType::Malware));
  assert!(result.overall_threat_level >= ThreatLevel::High);
}
