use crate::proxy::{ProxyConfig, ProxyType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProfileStatus {
  #[default]
  Active,
  Inactive,
  Blocked,
}

/// A persisted pseudo-identity: spoofed fingerprint attributes, content
/// permissions, proxy egress and labeling metadata. Immutable per session;
/// all mutation goes through the [`ProfileStore`](crate::profile::ProfileStore).
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct FingerprintProfile {
  pub id: uuid::Uuid,
  pub name: String,
  pub user_agent: String,
  pub screen_width: u32,
  pub screen_height: u32,
  pub timezone: String,
  pub language: String,
  #[serde(default)]
  pub proxy_host: String,
  #[serde(default)]
  pub proxy_port: u16,
  #[serde(default)]
  pub proxy_username: String,
  #[serde(default)]
  pub proxy_password: String,
  #[serde(default)]
  pub proxy_type: ProxyType,
  #[serde(default)]
  pub canvas_fingerprint: String,
  #[serde(default)]
  pub webgl_fingerprint: String,
  pub created_at: DateTime<Utc>,
  pub last_used: DateTime<Utc>,
  #[serde(default = "default_true")]
  pub cookies_enabled: bool,
  #[serde(default = "default_true")]
  pub javascript_enabled: bool,
  #[serde(default = "default_true")]
  pub images_enabled: bool,
  #[serde(default = "default_true")]
  pub plugins_enabled: bool,
  #[serde(default)]
  pub geolocation_enabled: bool,
  #[serde(default)]
  pub notifications_enabled: bool,
  #[serde(default)]
  pub webrtc_enabled: bool,
  #[serde(default = "default_icon_type")]
  pub icon_type: String,
  #[serde(default)]
  pub country_code: String,
  #[serde(default = "default_label_color")]
  pub label_color: String,
  #[serde(default)]
  pub tags: String, // Comma-separated
  #[serde(default)]
  pub description: String,
  #[serde(default)]
  pub favorite: bool,
  #[serde(default)]
  pub last_ip: String,
  #[serde(default)]
  pub usage_count: u64,
  #[serde(default)]
  pub total_time: u64, // Seconds
  #[serde(default)]
  pub status: ProfileStatus,
  #[serde(default)]
  pub notes: String,
}

fn default_true() -> bool {
  true
}

fn default_icon_type() -> String {
  "default".to_string()
}

fn default_label_color() -> String {
  "blue".to_string()
}

impl FingerprintProfile {
  /// Get the path to the isolated browser state directory (profiles/{uuid}/profile).
  /// Same id always maps to the same path so repeated launches reuse state.
  pub fn get_profile_data_path(&self, profiles_dir: &Path) -> PathBuf {
    profiles_dir.join(self.id.to_string()).join("profile")
  }

  pub fn has_proxy(&self) -> bool {
    !self.proxy_host.is_empty()
  }

  /// Proxy egress configuration, if any networking fields are set.
  pub fn proxy_config(&self) -> Option<ProxyConfig> {
    if !self.has_proxy() {
      return None;
    }
    let (username, password) = if !self.proxy_username.is_empty() && !self.proxy_password.is_empty()
    {
      (
        Some(self.proxy_username.clone()),
        Some(self.proxy_password.clone()),
      )
    } else {
      (None, None)
    };
    Some(ProxyConfig {
      host: self.proxy_host.clone(),
      port: self.proxy_port,
      proxy_type: self.proxy_type,
      username,
      password,
    })
  }

  /// Field-level validation enforced at the store boundary.
  pub fn validate(&self) -> Result<(), String> {
    if self.name.trim().is_empty() {
      return Err("Profile name cannot be empty".to_string());
    }
    if self.user_agent.is_empty() {
      return Err("User-Agent cannot be empty".to_string());
    }
    if self.screen_width == 0 || self.screen_height == 0 {
      return Err("Screen dimensions must be positive".to_string());
    }
    if self.proxy_host.is_empty() {
      // No proxy: credentials without a host are invalid, not silently dropped
      if !self.proxy_username.is_empty() || !self.proxy_password.is_empty() {
        return Err("Proxy credentials set without a proxy host".to_string());
      }
    } else if self.proxy_port == 0 {
      return Err("Proxy host set without a port".to_string());
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::fingerprint::FingerprintGenerator;

  fn sample_profile() -> FingerprintProfile {
    let mut generator = FingerprintGenerator::with_seed(7);
    let now = Utc::now();
    generator.build_profile(uuid::Uuid::new_v4(), "sample", now)
  }

  #[test]
  fn test_valid_profile_passes() {
    assert!(sample_profile().validate().is_ok());
  }

  #[test]
  fn test_empty_name_rejected() {
    let mut profile = sample_profile();
    profile.name = "  ".to_string();
    assert!(profile.validate().is_err());
  }

  #[test]
  fn test_credentials_without_host_rejected() {
    let mut profile = sample_profile();
    profile.proxy_username = "alice".to_string();
    profile.proxy_password = "secret".to_string();
    assert!(profile.validate().is_err());
  }

  #[test]
  fn test_host_without_port_rejected() {
    let mut profile = sample_profile();
    profile.proxy_host = "10.0.0.1".to_string();
    profile.proxy_port = 0;
    assert!(profile.validate().is_err());
  }

  #[test]
  fn test_proxy_config_requires_both_credentials() {
    let mut profile = sample_profile();
    profile.proxy_host = "10.0.0.1".to_string();
    profile.proxy_port = 1080;
    profile.proxy_username = "alice".to_string();

    // One-sided credentials are not carried into the config
    let config = profile.proxy_config().unwrap();
    assert!(config.username.is_none());
    assert!(config.password.is_none());
  }

  #[test]
  fn test_profile_data_path_is_stable() {
    let profile = sample_profile();
    let dir = Path::new("/tmp/profiles");
    assert_eq!(
      profile.get_profile_data_path(dir),
      profile.get_profile_data_path(dir)
    );
  }
}
