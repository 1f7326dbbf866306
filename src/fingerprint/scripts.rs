//! Anti-fingerprinting script bundle.
//!
//! The core emits named script snippets as plain data; the embedding browser
//! host decides how to inject them. Every snippet is derived deterministically
//! from the profile so a site sees the same (spoofed) surface across visits:
//! noise is seeded from the profile's fingerprint tokens and the reported
//! screen/language values are the profile's own, never fresh randomness.

use crate::profile::FingerprintProfile;

/// One named script the host should install before page scripts run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptSnippet {
  pub name: &'static str,
  pub source: String,
}

/// Derive a small stable noise seed from an opaque fingerprint token.
fn noise_seed(token: &str) -> u32 {
  let hash = blake3::hash(token.as_bytes());
  u32::from_le_bytes(hash.as_bytes()[..4].try_into().expect("hash is 32 bytes"))
}

fn canvas_script(profile: &FingerprintProfile) -> String {
  let seed = noise_seed(&profile.canvas_fingerprint);
  format!(
    r#"(function() {{
  const SEED = {seed};
  let state = SEED;
  function next() {{
    state = (state * 1664525 + 1013904223) >>> 0;
    return state / 4294967296;
  }}
  const originalGetImageData = CanvasRenderingContext2D.prototype.getImageData;
  CanvasRenderingContext2D.prototype.getImageData = function() {{
    const imageData = originalGetImageData.apply(this, arguments);
    const data = imageData.data;
    for (let i = 0; i < data.length; i += 4) {{
      data[i] += Math.floor(next() * 3) - 1;
      data[i + 1] += Math.floor(next() * 3) - 1;
      data[i + 2] += Math.floor(next() * 3) - 1;
    }}
    return imageData;
  }};
}})();"#
  )
}

fn webgl_script(profile: &FingerprintProfile) -> String {
  let seed = noise_seed(&profile.webgl_fingerprint);
  // Renderer string varies with the token so two profiles do not share a GPU
  let renderers = [
    "Intel(R) HD Graphics 620",
    "Intel(R) UHD Graphics 630",
    "Intel(R) Iris(R) Xe Graphics",
    "AMD Radeon(TM) Graphics",
  ];
  let renderer = renderers[(seed as usize) % renderers.len()];
  format!(
    r#"(function() {{
  const getParameter = WebGLRenderingContext.prototype.getParameter;
  const spoofed = {{
    37445: 'Intel Inc.',
    37446: '{renderer}',
    7936: 'WebGL 1.0',
    35724: 'WebGL GLSL ES 1.0'
  }};
  WebGLRenderingContext.prototype.getParameter = function(parameter) {{
    if (spoofed[parameter]) return spoofed[parameter];
    return getParameter.call(this, parameter);
  }};
  const getExtension = WebGLRenderingContext.prototype.getExtension;
  WebGLRenderingContext.prototype.getExtension = function(name) {{
    if (name === 'WEBGL_debug_renderer_info' || name === 'WEBGL_debug_shaders') return null;
    return getExtension.call(this, name);
  }};
}})();"#
  )
}

fn audio_script(profile: &FingerprintProfile) -> String {
  let seed = noise_seed(&profile.canvas_fingerprint) ^ 0x5f3759df;
  format!(
    r#"(function() {{
  const OriginalAudioContext = window.AudioContext || window.webkitAudioContext;
  if (!OriginalAudioContext) return;
  const DRIFT = ({seed} % 1000) / 10000000;
  const originalCreateOscillator = OriginalAudioContext.prototype.createOscillator;
  OriginalAudioContext.prototype.createOscillator = function() {{
    const oscillator = originalCreateOscillator.call(this);
    const originalStart = oscillator.start;
    oscillator.start = function(when) {{
      oscillator.frequency.value += DRIFT;
      return originalStart.call(this, when);
    }};
    return oscillator;
  }};
}})();"#
  )
}

fn navigator_script(profile: &FingerprintProfile) -> String {
  let primary = profile.language.split(',').next().unwrap_or("en-US");
  let webrtc_block = if profile.webrtc_enabled {
    String::new()
  } else {
    r#"
  for (const name of ['RTCPeerConnection', 'webkitRTCPeerConnection', 'mozRTCPeerConnection']) {
    if (window[name]) {
      window[name] = function() { throw new Error('WebRTC is disabled'); };
    }
  }"#
      .to_string()
  };
  let geolocation_block = if profile.geolocation_enabled {
    String::new()
  } else {
    r#"
  if (navigator.geolocation) {
    navigator.geolocation.getCurrentPosition = function(success, error) {
      if (error) error({ code: 1, message: 'User denied the request for Geolocation.' });
    };
    navigator.geolocation.watchPosition = navigator.geolocation.getCurrentPosition;
  }"#
      .to_string()
  };
  format!(
    r#"(function() {{
  Object.defineProperty(navigator, 'language', {{ get: function() {{ return '{primary}'; }} }});
  Object.defineProperty(navigator, 'languages', {{ get: function() {{ return ['{primary}']; }} }});
  Object.defineProperty(navigator, 'hardwareConcurrency', {{ get: function() {{ return 4; }} }});
  if (navigator.deviceMemory) {{
    Object.defineProperty(navigator, 'deviceMemory', {{ get: function() {{ return 8; }} }});
  }}{webrtc_block}{geolocation_block}
}})();"#
  )
}

fn screen_script(profile: &FingerprintProfile) -> String {
  let width = profile.screen_width;
  let height = profile.screen_height;
  format!(
    r#"(function() {{
  Object.defineProperty(screen, 'width', {{ get: function() {{ return {width}; }} }});
  Object.defineProperty(screen, 'height', {{ get: function() {{ return {height}; }} }});
  Object.defineProperty(screen, 'availWidth', {{ get: function() {{ return {width}; }} }});
  Object.defineProperty(screen, 'availHeight', {{ get: function() {{ return {height} - 40; }} }});
  Object.defineProperty(screen, 'colorDepth', {{ get: function() {{ return 24; }} }});
  Object.defineProperty(screen, 'pixelDepth', {{ get: function() {{ return 24; }} }});
}})();"#
  )
}

fn font_script() -> String {
  r#"(function() {
  const standardFonts = [
    'Arial', 'Arial Black', 'Calibri', 'Cambria', 'Courier', 'Courier New',
    'Georgia', 'Helvetica', 'Impact', 'Lucida Console', 'Tahoma',
    'Times', 'Times New Roman', 'Trebuchet MS', 'Verdana'
  ];
  if (document.fonts && document.fonts.check) {
    document.fonts.check = function(font) {
      const fontFamily = font.split(' ').pop().replace(/['"]/g, '');
      return standardFonts.includes(fontFamily);
    };
  }
})();"#
    .to_string()
}

/// Build the full masking bundle for a profile, in injection order.
pub fn protection_scripts(profile: &FingerprintProfile) -> Vec<ScriptSnippet> {
  vec![
    ScriptSnippet {
      name: "canvas_noise",
      source: canvas_script(profile),
    },
    ScriptSnippet {
      name: "webgl_mask",
      source: webgl_script(profile),
    },
    ScriptSnippet {
      name: "audio_noise",
      source: audio_script(profile),
    },
    ScriptSnippet {
      name: "navigator_mask",
      source: navigator_script(profile),
    },
    ScriptSnippet {
      name: "screen_mask",
      source: screen_script(profile),
    },
    ScriptSnippet {
      name: "font_mask",
      source: font_script(),
    },
  ]
}
