//! Anti-detection browser core: per-identity fingerprint profiles with
//! encrypted persistence, proxy-backed launch planning, and a composable
//! URL/certificate/content threat scorer.
//!
//! The crate is a library for embedding hosts. It never spawns browser
//! processes, injects scripts or renders pages; it produces the data those
//! collaborators consume: a [`launch::LaunchPlan`], a masking script bundle
//! and [`security::ThreatScanResult`]s.

pub mod app_dirs;
pub mod fingerprint;
pub mod launch;
pub mod profile;
pub mod proxy;
pub mod security;

pub use fingerprint::{BrowserFamily, FingerprintGenerator, TokenKind};
pub use launch::{build_launch_plan, LaunchPlan, ProxyAuthHelper};
pub use profile::{FingerprintProfile, ProfileStatus, ProfileStore, StoreError};
pub use proxy::{ProxyConfig, ProxyParseError, ProxyType};
pub use security::{ThreatLevel, ThreatScanResult, ThreatScorer, ThreatType};
