//! Fingerprint generation.
//!
//! Produces internally-consistent attribute sets from fixed pools: the
//! User-Agent, screen geometry, timezone and language are always picked from
//! curated lists so a generated profile never carries an implausible
//! combination. Random choice is seedable for deterministic tests.

pub mod data;
pub mod scripts;

use crate::profile::FingerprintProfile;
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

pub use scripts::{protection_scripts, ScriptSnippet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrowserFamily {
  Chrome,
  Firefox,
  Edge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
  Canvas,
  Webgl,
}

/// Attribute set produced by a generation pass. Callers merge these into a
/// profile; any field the caller overrides wins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedFields {
  pub user_agent: String,
  pub screen_width: u32,
  pub screen_height: u32,
  pub timezone: String,
  pub language: String,
  pub country_code: String,
  pub canvas_fingerprint: String,
  pub webgl_fingerprint: String,
}

pub struct FingerprintGenerator {
  rng: StdRng,
}

impl Default for FingerprintGenerator {
  fn default() -> Self {
    Self::new()
  }
}

impl FingerprintGenerator {
  pub fn new() -> Self {
    Self {
      rng: StdRng::from_os_rng(),
    }
  }

  /// Deterministic generator for tests.
  pub fn with_seed(seed: u64) -> Self {
    Self {
      rng: StdRng::seed_from_u64(seed),
    }
  }

  /// Generate a full random attribute set. `family` restricts the User-Agent
  /// pool; `None` draws from all families.
  pub fn random_fields(&mut self, family: Option<BrowserFamily>) -> GeneratedFields {
    let user_agent = self.random_user_agent(family);
    let &(screen_width, screen_height) = data::SCREEN_RESOLUTIONS
      .choose(&mut self.rng)
      .expect("resolution pool is non-empty");
    let timezone = data::TIMEZONES
      .choose(&mut self.rng)
      .expect("timezone pool is non-empty")
      .to_string();
    let language = data::LANGUAGES
      .choose(&mut self.rng)
      .expect("language pool is non-empty")
      .to_string();
    let country_code = data::country_for_timezone(&timezone).to_string();

    GeneratedFields {
      user_agent,
      screen_width,
      screen_height,
      timezone,
      language,
      country_code,
      canvas_fingerprint: self.regenerate_token(TokenKind::Canvas),
      webgl_fingerprint: self.regenerate_token(TokenKind::Webgl),
    }
  }

  pub fn random_user_agent(&mut self, family: Option<BrowserFamily>) -> String {
    let pool: Vec<&str> = match family {
      Some(BrowserFamily::Chrome) => data::CHROME_USER_AGENTS.to_vec(),
      Some(BrowserFamily::Firefox) => data::FIREFOX_USER_AGENTS.to_vec(),
      Some(BrowserFamily::Edge) => data::EDGE_USER_AGENTS.to_vec(),
      None => data::CHROME_USER_AGENTS
        .iter()
        .chain(data::FIREFOX_USER_AGENTS)
        .chain(data::EDGE_USER_AGENTS)
        .copied()
        .collect(),
    };
    pool
      .choose(&mut self.rng)
      .expect("user agent pool is non-empty")
      .to_string()
  }

  /// Regenerate a single opaque fingerprint token without touching any other
  /// field. Uniqueness matters here, unpredictability does not.
  pub fn regenerate_token(&mut self, _kind: TokenKind) -> String {
    uuid::Uuid::new_v4().to_string()
  }

  /// Build a complete profile from generated fields with default permissions.
  pub fn build_profile(
    &mut self,
    id: uuid::Uuid,
    name: &str,
    now: DateTime<Utc>,
  ) -> FingerprintProfile {
    let fields = self.random_fields(None);
    FingerprintProfile {
      id,
      name: name.to_string(),
      user_agent: fields.user_agent,
      screen_width: fields.screen_width,
      screen_height: fields.screen_height,
      timezone: fields.timezone,
      language: fields.language,
      proxy_host: String::new(),
      proxy_port: 0,
      proxy_username: String::new(),
      proxy_password: String::new(),
      proxy_type: Default::default(),
      canvas_fingerprint: fields.canvas_fingerprint,
      webgl_fingerprint: fields.webgl_fingerprint,
      created_at: now,
      last_used: now,
      cookies_enabled: true,
      javascript_enabled: true,
      images_enabled: true,
      plugins_enabled: true,
      geolocation_enabled: false,
      notifications_enabled: false,
      webrtc_enabled: false,
      icon_type: "default".to_string(),
      country_code: fields.country_code,
      label_color: "blue".to_string(),
      tags: String::new(),
      description: String::new(),
      favorite: false,
      last_ip: String::new(),
      usage_count: 0,
      total_time: 0,
      status: Default::default(),
      notes: String::new(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_resolution_is_always_a_known_pair() {
    let mut generator = FingerprintGenerator::with_seed(1);
    for _ in 0..200 {
      let fields = generator.random_fields(None);
      assert!(
        data::SCREEN_RESOLUTIONS.contains(&(fields.screen_width, fields.screen_height)),
        "unexpected resolution {}x{}",
        fields.screen_width,
        fields.screen_height
      );
    }
  }

  #[test]
  fn test_family_restriction() {
    let mut generator = FingerprintGenerator::with_seed(2);
    for _ in 0..50 {
      let ua = generator.random_user_agent(Some(BrowserFamily::Firefox));
      assert!(ua.contains("Firefox/"), "not a Firefox UA: {ua}");
    }
    for _ in 0..50 {
      let ua = generator.random_user_agent(Some(BrowserFamily::Edge));
      assert!(ua.contains("Edg/"), "not an Edge UA: {ua}");
    }
  }

  #[test]
  fn test_seeded_generation_is_deterministic() {
    let mut a = FingerprintGenerator::with_seed(42);
    let mut b = FingerprintGenerator::with_seed(42);
    let fields_a = a.random_fields(None);
    let fields_b = b.random_fields(None);
    assert_eq!(fields_a.user_agent, fields_b.user_agent);
    assert_eq!(fields_a.timezone, fields_b.timezone);
    assert_eq!(fields_a.language, fields_b.language);
  }

  #[test]
  fn test_token_regeneration_is_independent() {
    let mut generator = FingerprintGenerator::with_seed(3);
    let first = generator.regenerate_token(TokenKind::Canvas);
    let second = generator.regenerate_token(TokenKind::Canvas);
    assert_ne!(first, second);
  }

  #[test]
  fn test_country_code_matches_timezone() {
    let mut generator = FingerprintGenerator::with_seed(4);
    for _ in 0..50 {
      let fields = generator.random_fields(None);
      assert_eq!(
        fields.country_code,
        data::country_for_timezone(&fields.timezone)
      );
    }
  }
}
