//! Static selection pools for fingerprint generation.
//!
//! Screen sizes are paired: a generated profile always uses one of these exact
//! (width, height) combinations, never an independently random pair.

pub const CHROME_USER_AGENTS: &[&str] = &[
  "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
  "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/130.0.0.0 Safari/537.36",
  "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
  "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
];

pub const FIREFOX_USER_AGENTS: &[&str] = &[
  "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:133.0) Gecko/20100101 Firefox/133.0",
  "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:133.0) Gecko/20100101 Firefox/133.0",
  "Mozilla/5.0 (X11; Linux x86_64; rv:133.0) Gecko/20100101 Firefox/133.0",
];

pub const EDGE_USER_AGENTS: &[&str] = &[
  "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36 Edg/131.0.0.0",
  "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/130.0.0.0 Safari/537.36 Edg/130.0.0.0",
];

/// Common desktop resolutions. Width and height are never randomized
/// independently; an uncommon combination is itself a fingerprint.
pub const SCREEN_RESOLUTIONS: &[(u32, u32)] = &[
  (1920, 1080),
  (1366, 768),
  (1440, 900),
  (1600, 900),
  (1280, 1024),
  (2560, 1440),
  (1536, 864),
];

pub const TIMEZONES: &[&str] = &[
  "Europe/Kiev",
  "Europe/London",
  "Europe/Berlin",
  "Europe/Paris",
  "Europe/Warsaw",
  "Europe/Madrid",
  "Europe/Amsterdam",
  "America/New_York",
  "America/Chicago",
  "America/Los_Angeles",
  "America/Toronto",
  "Asia/Tokyo",
  "Asia/Singapore",
  "Australia/Sydney",
];

pub const LANGUAGES: &[&str] = &[
  "uk-UA,uk;q=0.9,en;q=0.8",
  "en-US,en;q=0.9",
  "en-GB,en;q=0.9",
  "de-DE,de;q=0.9,en;q=0.8",
  "fr-FR,fr;q=0.9,en;q=0.8",
  "pl-PL,pl;q=0.9,en;q=0.8",
  "es-ES,es;q=0.9,en;q=0.8",
  "nl-NL,nl;q=0.9,en;q=0.8",
  "ja-JP,ja;q=0.9,en;q=0.8",
];

/// Timezone to ISO country code. Many-to-one: several timezones share a country.
const TIMEZONE_COUNTRIES: &[(&str, &str)] = &[
  ("Europe/Kiev", "UA"),
  ("Europe/London", "GB"),
  ("Europe/Berlin", "DE"),
  ("Europe/Paris", "FR"),
  ("America/New_York", "US"),
  ("America/Chicago", "US"),
  ("America/Los_Angeles", "US"),
  ("America/Toronto", "CA"),
  ("Asia/Tokyo", "JP"),
  ("Asia/Seoul", "KR"),
  ("Asia/Shanghai", "CN"),
  ("Australia/Sydney", "AU"),
  ("Europe/Rome", "IT"),
  ("Europe/Madrid", "ES"),
  ("Europe/Amsterdam", "NL"),
  ("Europe/Stockholm", "SE"),
  ("Europe/Oslo", "NO"),
  ("Europe/Copenhagen", "DK"),
  ("Europe/Helsinki", "FI"),
  ("Europe/Warsaw", "PL"),
  ("Europe/Prague", "CZ"),
  ("Europe/Budapest", "HU"),
  ("Europe/Vienna", "AT"),
  ("Europe/Zurich", "CH"),
  ("Europe/Brussels", "BE"),
  ("Europe/Lisbon", "PT"),
  ("Europe/Athens", "GR"),
  ("Europe/Istanbul", "TR"),
  ("Asia/Singapore", "SG"),
  ("Asia/Bangkok", "TH"),
  ("Asia/Kolkata", "IN"),
  ("America/Sao_Paulo", "BR"),
  ("America/Mexico_City", "MX"),
  ("America/Argentina/Buenos_Aires", "AR"),
];

/// Country code for a timezone, `"UA"` when unknown.
pub fn country_for_timezone(timezone: &str) -> &'static str {
  TIMEZONE_COUNTRIES
    .iter()
    .find(|(tz, _)| *tz == timezone)
    .map(|(_, country)| *country)
    .unwrap_or("UA")
}
