//! Signature-based page content scanning.
//!
//! Pure substring matching over lowercased content: known malicious JS
//! patterns, suspicious device/API keywords, and a cryptomining heuristic
//! that requires several co-occurring indicators before it fires.

use serde::Serialize;

const MALWARE_SIGNATURES: &[&str] = &[
  // Obfuscated JS loaders
  "eval(atob(",
  "document.write(unescape(",
  "string.fromcharcode(",
  "settimeout(\"eval(",
  "location.href=\"data:text/html,",
  // Known miner libraries
  "coinhive",
  "cryptoloot",
  "jsecoin",
  "mineralt",
  // Forced redirects
  "window.location.replace(",
  "top.location.href",
  "parent.location",
];

const SUSPICIOUS_SCRIPTS: &[&str] = &[
  "keylogger",
  "screenshot",
  "clipboard",
  "microphone",
  "camera",
  "geolocation",
  "download_file",
  "upload_file",
];

const MINING_INDICATORS: &[&str] = &["worker", "hash", "difficulty", "mining", "pool"];
const MINING_THRESHOLD: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentThreatKind {
  MalwareSignature,
  SuspiciousScript,
  CryptocurrencyMining,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentThreat {
  #[serde(rename = "type")]
  pub kind: ContentThreatKind,
  pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MalwareAnalysis {
  pub threats_found: Vec<ContentThreat>,
  pub risk_score: u32,
}

/// Scan page content. Case-insensitive; each signature match adds +25, each
/// suspicious keyword +15, and the mining heuristic +40 when at least three
/// indicators co-occur.
pub fn scan(content: &str) -> MalwareAnalysis {
  let content_lower = content.to_lowercase();
  let mut threats_found = Vec::new();
  let mut risk_score = 0;

  for signature in MALWARE_SIGNATURES {
    if content_lower.contains(signature) {
      threats_found.push(ContentThreat {
        kind: ContentThreatKind::MalwareSignature,
        description: format!("Malware signature detected: {signature}"),
      });
      risk_score += 25;
    }
  }

  for pattern in SUSPICIOUS_SCRIPTS {
    if content_lower.contains(pattern) {
      threats_found.push(ContentThreat {
        kind: ContentThreatKind::SuspiciousScript,
        description: format!("Suspicious script detected: {pattern}"),
      });
      risk_score += 15;
    }
  }

  let mining_count = MINING_INDICATORS
    .iter()
    .filter(|indicator| content_lower.contains(*indicator))
    .count();
  if mining_count >= MINING_THRESHOLD {
    threats_found.push(ContentThreat {
      kind: ContentThreatKind::CryptocurrencyMining,
      description: "Possible cryptocurrency mining detected".to_string(),
    });
    risk_score += 40;
  }

  MalwareAnalysis {
    threats_found,
    risk_score,
  }
}
