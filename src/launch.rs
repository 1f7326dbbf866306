//! Launch plan construction.
//!
//! Turns a profile into the concrete artifacts a Chromium-style host needs to
//! start an isolated session: the ordered command-line arguments, the masking
//! script bundle and, when the proxy needs authentication, an in-memory
//! credential helper. Building a plan never touches the filesystem or the
//! network; proxy credentials exist only inside the returned plan and are
//! never written to disk by this crate.

use crate::fingerprint::{protection_scripts, ScriptSnippet};
use crate::profile::FingerprintProfile;
use std::path::{Path, PathBuf};

/// Extension-shaped credential responder for authenticated proxies. Chromium
/// cannot take proxy credentials on the command line; hosts install this as an
/// unpacked extension from memory (or a tmpfs) at launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyAuthHelper {
  pub manifest: String,
  pub background_script: String,
}

/// Everything needed to start one browser session for a profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchPlan {
  pub profile_data_dir: PathBuf,
  pub user_agent: String,
  pub window_width: u32,
  pub window_height: u32,
  /// Ordered command-line arguments; the target URL, when present, is last.
  pub args: Vec<String>,
  pub scripts: Vec<ScriptSnippet>,
  pub proxy_auth: Option<ProxyAuthHelper>,
}

fn auth_helper(username: &str, password: &str) -> ProxyAuthHelper {
  let manifest = serde_json::json!({
    "manifest_version": 3,
    "name": "Proxy Credentials",
    "version": "1.0",
    "permissions": ["webRequest", "webRequestAuthProvider"],
    "host_permissions": ["<all_urls>"],
    "background": { "service_worker": "background.js" }
  });
  let background_script = format!(
    r#"chrome.webRequest.onAuthRequired.addListener(
  function(details, callback) {{
    callback({{
      authCredentials: {{
        username: {username},
        password: {password}
      }}
    }});
  }},
  {{ urls: ['<all_urls>'] }},
  ['asyncBlocking']
);"#,
    username = serde_json::json!(username),
    password = serde_json::json!(password),
  );
  ProxyAuthHelper {
    // Pretty output so hosts can drop the string straight into manifest.json
    manifest: serde_json::to_string_pretty(&manifest).unwrap_or_else(|_| manifest.to_string()),
    background_script,
  }
}

/// Build the launch plan for `profile`. `target_url` is appended as the final
/// argument when present.
pub fn build_launch_plan(
  profile: &FingerprintProfile,
  profiles_dir: &Path,
  target_url: Option<&str>,
) -> LaunchPlan {
  let profile_data_dir = profile.get_profile_data_path(profiles_dir);

  let mut args = vec![
    format!("--user-data-dir={}", profile_data_dir.display()),
    format!("--user-agent={}", profile.user_agent),
    "--no-first-run".to_string(),
    "--no-default-browser-check".to_string(),
    format!(
      "--window-size={},{}",
      profile.screen_width, profile.screen_height
    ),
  ];

  // One directive per disabled permission flag, in field order
  if !profile.cookies_enabled {
    args.push("--disable-cookies".to_string());
  }
  if !profile.javascript_enabled {
    args.push("--disable-javascript".to_string());
  }
  if !profile.images_enabled {
    args.push("--blink-settings=imagesEnabled=false".to_string());
  }
  if !profile.plugins_enabled {
    args.push("--disable-plugins".to_string());
  }
  if !profile.geolocation_enabled {
    args.push("--deny-permission=geolocation".to_string());
  }
  if !profile.notifications_enabled {
    args.push("--disable-notifications".to_string());
  }
  if !profile.webrtc_enabled {
    args.push("--webrtc-ip-handling-policy=disable_non_proxied_udp".to_string());
  }

  let mut proxy_auth = None;
  if let Some(proxy) = profile.proxy_config() {
    args.push(format!("--proxy-server={}", proxy.scheme_url()));
    if let (Some(username), Some(password)) = (&proxy.username, &proxy.password) {
      proxy_auth = Some(auth_helper(username, password));
    }
  }

  // Primary subtag only: "uk-UA,uk;q=0.9" becomes "uk"
  let primary_language = profile.language.split('-').next().unwrap_or("en");
  args.push(format!("--lang={primary_language}"));

  if let Some(url) = target_url {
    args.push(url.to_string());
  }

  LaunchPlan {
    profile_data_dir,
    user_agent: profile.user_agent.clone(),
    window_width: profile.screen_width,
    window_height: profile.screen_height,
    args,
    scripts: protection_scripts(profile),
    proxy_auth,
  }
}
