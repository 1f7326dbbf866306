//! Lexical URL risk analysis.
//!
//! Pure scoring over the parsed URL plus one membership lookup against the
//! malware domain list. Every check is additive; the final score is capped at
//! 100. Analysis never fails: an unparseable URL is itself reported as a
//! medium-risk finding.

use crate::security::domain_lists::{DomainLists, ListKind};
use crate::security::{ThreatLevel, ThreatType};
use serde::Serialize;

const SUSPICIOUS_TLDS: &[&str] = &[".tk", ".ml", ".ga", ".cf"];

const PHISHING_KEYWORDS: &[&str] = &[
  "verify",
  "account",
  "suspended",
  "urgent",
  "secure",
  "update",
  "confirm",
  "login",
  "password",
  "bank",
  "paypal",
  "amazon",
  "microsoft",
  "google",
  "winner",
  "prize",
  "lottery",
  "congratulations",
  "click here",
  "act now",
  "limited time",
  "expires today",
];

const REDIRECT_PARAMS: &[&str] = &["redirect", "goto", "url", "link", "ref"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UrlAnalysis {
  pub risk_score: u32,
  pub threat_level: ThreatLevel,
  pub threat_types: Vec<ThreatType>,
  pub warnings: Vec<String>,
}

fn push_threat(threats: &mut Vec<ThreatType>, threat: ThreatType) {
  if !threats.contains(&threat) {
    threats.push(threat);
  }
}

fn is_ipv4(domain: &str) -> bool {
  domain.parse::<std::net::Ipv4Addr>().is_ok()
}

/// Homograph heuristic: Cyrillic or Greek codepoints, Latin letters mixed with
/// any non-ASCII letters, or an IDNA-encoded (`xn--`) label.
fn contains_suspicious_characters(domain: &str) -> bool {
  if domain.split('.').any(|label| label.starts_with("xn--")) {
    return true;
  }
  let mut latin = 0usize;
  let mut non_ascii = 0usize;
  for c in domain.chars() {
    if ('\u{0400}'..='\u{04FF}').contains(&c) || ('\u{0370}'..='\u{03FF}').contains(&c) {
      return true;
    }
    if c.is_ascii_alphabetic() {
      latin += 1;
    } else if !c.is_ascii() {
      non_ascii += 1;
    }
  }
  latin > 0 && non_ascii > 0
}

fn analyze_domain(
  domain: &str,
  lists: &DomainLists,
  threats: &mut Vec<ThreatType>,
  warnings: &mut Vec<String>,
) -> u32 {
  let mut score = 0;

  match lists.contains(ListKind::Malware, domain) {
    Ok(true) => {
      score += 70;
      push_threat(threats, ThreatType::Malware);
      warnings.push("Domain found in malware blacklist".to_string());
    }
    Ok(false) => {}
    Err(e) => log::warn!("Malware list lookup failed for {domain}: {e}"),
  }

  if is_ipv4(domain) {
    score += 30;
    warnings.push("Using IP address instead of domain name".to_string());
  }

  if SUSPICIOUS_TLDS.iter().any(|tld| domain.ends_with(tld)) {
    score += 20;
    warnings.push("Suspicious top-level domain".to_string());
  }

  if domain.len() > 50 {
    score += 15;
    warnings.push("Unusually long domain name".to_string());
  }

  if domain.split('.').count() > 4 {
    score += 10;
    warnings.push("Multiple subdomains detected".to_string());
  }

  if contains_suspicious_characters(domain) {
    score += 25;
    push_threat(threats, ThreatType::Phishing);
    warnings.push("Domain contains suspicious characters".to_string());
  }

  score
}

fn analyze_path_and_query(
  path: &str,
  query: &str,
  threats: &mut Vec<ThreatType>,
  warnings: &mut Vec<String>,
) -> u32 {
  let mut score = 0;
  let text = format!("{path} {query}").to_lowercase();

  let matched: Vec<&str> = PHISHING_KEYWORDS
    .iter()
    .filter(|kw| text.contains(*kw))
    .copied()
    .collect();
  if !matched.is_empty() {
    score += matched.len() as u32 * 5;
    push_threat(threats, ThreatType::Phishing);
    warnings.push(format!(
      "Phishing keywords detected: {}",
      matched[..matched.len().min(3)].join(", ")
    ));
  }

  let query_lower = query.to_lowercase();
  if REDIRECT_PARAMS.iter().any(|p| query_lower.contains(p)) {
    score += 15;
    warnings.push("Suspicious redirect parameters detected".to_string());
  }

  if path.len() + query.len() > 200 {
    score += 10;
    warnings.push("Unusually long URL path".to_string());
  }

  score
}

fn analyze_scheme(scheme: &str, warnings: &mut Vec<String>) -> u32 {
  match scheme {
    "https" => 0,
    "http" => {
      warnings.push("Unsecured HTTP connection".to_string());
      5
    }
    other => {
      warnings.push(format!("Unusual URL scheme: {other}"));
      15
    }
  }
}

/// Score a URL. The malware-list membership check is the only external input;
/// everything else is derived from the URL text itself.
pub fn analyze(url: &str, lists: &DomainLists) -> UrlAnalysis {
  let mut threats = Vec::new();
  let mut warnings = Vec::new();

  let Ok(parsed) = url::Url::parse(url) else {
    warnings.push("Could not parse URL".to_string());
    return UrlAnalysis {
      risk_score: 50,
      threat_level: ThreatLevel::Medium,
      threat_types: vec![ThreatType::Suspicious],
      warnings,
    };
  };

  let domain = parsed.host_str().unwrap_or("").to_lowercase();
  let total = analyze_domain(&domain, lists, &mut threats, &mut warnings)
    + analyze_path_and_query(
      parsed.path(),
      parsed.query().unwrap_or(""),
      &mut threats,
      &mut warnings,
    )
    + analyze_scheme(parsed.scheme(), &mut warnings);

  UrlAnalysis {
    risk_score: total.min(100),
    threat_level: ThreatLevel::from_score(total.min(100)),
    threat_types: threats,
    warnings,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn empty_lists() -> DomainLists {
    DomainLists::open_in_memory().unwrap()
  }

  #[test]
  fn test_clean_https_url_is_safe() {
    let analysis = analyze("https://example.com/about", &empty_lists());
    assert_eq!(analysis.risk_score, 0);
    assert_eq!(analysis.threat_level, ThreatLevel::Safe);
    assert!(analysis.threat_types.is_empty());
  }

  #[test]
  fn test_phishing_keywords_accumulate() {
    let analysis = analyze("http://example.com/verify-account-urgent", &empty_lists());
    // 3 keywords x5 plus http +5
    assert_eq!(analysis.risk_score, 20);
    assert_eq!(analysis.threat_level, ThreatLevel::Low);
    assert!(analysis.threat_types.contains(&ThreatType::Phishing));
  }

  #[test]
  fn test_ip_host_scores_thirty() {
    let analysis = analyze("https://203.0.113.10/index.html", &empty_lists());
    assert!(analysis.risk_score >= 30);
    assert!(analysis
      .warnings
      .iter()
      .any(|w| w.contains("IP address")));
  }

  #[test]
  fn test_listed_domain_is_malware() {
    let lists = empty_lists();
    lists.add(ListKind::Malware, "evil.example").unwrap();
    let analysis = analyze("https://evil.example/", &lists);
    assert!(analysis.risk_score >= 70);
    assert!(analysis.threat_types.contains(&ThreatType::Malware));
    assert_eq!(analysis.threat_level, ThreatLevel::High);
  }

  #[test]
  fn test_suspicious_tld_and_scheme() {
    let analysis = analyze("ftp://files.example.tk/download", &empty_lists());
    // TLD +20, non-http(s) scheme +15
    assert_eq!(analysis.risk_score, 35);
  }

  #[test]
  fn test_homograph_domain_marks_phishing() {
    // The url crate IDNA-encodes the Cyrillic host into an xn-- label
    let analysis = analyze("https://аррle.com/login", &empty_lists());
    assert!(analysis.threat_types.contains(&ThreatType::Phishing));
    assert!(analysis
      .warnings
      .iter()
      .any(|w| w.contains("suspicious characters")));
  }

  #[test]
  fn test_redirect_parameter_and_long_url() {
    let long_path = format!("/a{}", "x".repeat(210));
    let analysis = analyze(
      &format!("https://example.com{long_path}?redirect=https://other.example"),
      &empty_lists(),
    );
    assert!(analysis
      .warnings
      .iter()
      .any(|w| w.contains("redirect parameters")));
    assert!(analysis.warnings.iter().any(|w| w.contains("long URL")));
  }

  #[test]
  fn test_unparseable_url_is_medium() {
    let analysis = analyze("not a url at all", &empty_lists());
    assert_eq!(analysis.risk_score, 50);
    assert_eq!(analysis.threat_level, ThreatLevel::Medium);
  }

  #[test]
  fn test_score_is_capped_at_hundred() {
    let lists = empty_lists();
    lists.add(ListKind::Malware, "203.0.113.10").unwrap();
    let analysis = analyze(
      "http://203.0.113.10/verify-login-password-bank-urgent?redirect=x",
      &lists,
    );
    assert_eq!(analysis.risk_score, 100);
    assert_eq!(analysis.threat_level, ThreatLevel::Critical);
  }
}
