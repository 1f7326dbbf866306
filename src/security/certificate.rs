//! TLS certificate inspection.
//!
//! Connects with certificate verification disabled so the peer certificate can
//! always be retrieved and scored, even when it would fail normal validation:
//! an expired or mis-issued certificate is exactly what the checks are for.
//! Errors are classified so callers can weight a timeout differently from an
//! active TLS failure.

use serde::Serialize;
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;
use x509_parser::certificate::X509Certificate;
use x509_parser::extensions::GeneralName;
use x509_parser::prelude::FromDer;

pub const VALIDATION_TIMEOUT: Duration = Duration::from_secs(10);

const NEAR_EXPIRY_SECS: i64 = 30 * 24 * 60 * 60;

const TRUSTED_CAS: &[&str] = &[
  "DigiCert",
  "Symantec",
  "GeoTrust",
  "Thawte",
  "VeriSign",
  "Comodo",
  "GlobalSign",
  "Entrust",
];

#[derive(Debug, thiserror::Error)]
pub enum CertError {
  #[error("Connection timed out")]
  Timeout,

  #[error("TLS error: {0}")]
  Tls(String),

  #[error("Connection error: {0}")]
  Connection(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CertificateAnalysis {
  pub valid: bool,
  pub risk_score: u32,
  pub issues: Vec<String>,
}

fn is_trusted_issuer(organization: &str) -> bool {
  TRUSTED_CAS.iter().any(|ca| organization.contains(ca))
}

/// Exact or single-level wildcard match, case-insensitive.
fn hostname_matches(pattern: &str, hostname: &str) -> bool {
  let pattern = pattern.to_lowercase();
  let hostname = hostname.to_lowercase();
  if pattern == hostname {
    return true;
  }
  if let Some(suffix) = pattern.strip_prefix("*.") {
    if let Some((_, host_suffix)) = hostname.split_once('.') {
      return host_suffix == suffix;
    }
  }
  false
}

fn inspect(cert: &X509Certificate<'_>, hostname: &str) -> CertificateAnalysis {
  let mut issues = Vec::new();
  let mut risk_score = 0;

  let now = chrono::Utc::now().timestamp();
  let not_after = cert.validity().not_after.timestamp();
  if not_after < now {
    issues.push("Certificate has expired".to_string());
    risk_score += 70;
  } else if not_after - now < NEAR_EXPIRY_SECS {
    let days = (not_after - now) / (24 * 60 * 60);
    issues.push(format!("Certificate expires in {days} days"));
    risk_score += 20;
  }

  let organization = cert
    .issuer()
    .iter_organization()
    .next()
    .and_then(|attr| attr.as_str().ok())
    .unwrap_or("");
  if !is_trusted_issuer(organization) {
    issues.push(format!("Unknown certificate authority: {organization}"));
    risk_score += 30;
  }

  let mut names: Vec<String> = Vec::new();
  if let Ok(Some(san)) = cert.subject_alternative_name() {
    for name in &san.value.general_names {
      if let GeneralName::DNSName(dns) = name {
        names.push(dns.to_string());
      }
    }
  }
  if let Some(cn) = cert
    .subject()
    .iter_common_name()
    .next()
    .and_then(|attr| attr.as_str().ok())
  {
    names.push(cn.to_string());
  }
  if !names.iter().any(|name| hostname_matches(name, hostname)) {
    issues.push("Hostname doesn't match certificate".to_string());
    risk_score += 40;
  }

  CertificateAnalysis {
    valid: true,
    risk_score,
    issues,
  }
}

/// Fetch and score the peer certificate of `hostname:port`. Blocking, with a
/// 10 second connect/read budget.
pub fn validate(hostname: &str, port: u16) -> Result<CertificateAnalysis, CertError> {
  let addr = (hostname, port)
    .to_socket_addrs()
    .map_err(|e| CertError::Connection(format!("failed to resolve {hostname}: {e}")))?
    .next()
    .ok_or_else(|| CertError::Connection(format!("no addresses for {hostname}")))?;

  let stream = TcpStream::connect_timeout(&addr, VALIDATION_TIMEOUT).map_err(|e| {
    if e.kind() == std::io::ErrorKind::TimedOut {
      CertError::Timeout
    } else {
      CertError::Connection(format!("{e}"))
    }
  })?;
  stream
    .set_read_timeout(Some(VALIDATION_TIMEOUT))
    .and_then(|_| stream.set_write_timeout(Some(VALIDATION_TIMEOUT)))
    .map_err(|e| CertError::Connection(format!("{e}")))?;

  // Verification stays off so the certificate itself is always inspectable
  let connector = native_tls::TlsConnector::builder()
    .danger_accept_invalid_certs(true)
    .danger_accept_invalid_hostnames(true)
    .build()
    .map_err(|e| CertError::Tls(format!("{e}")))?;

  let tls = connector.connect(hostname, stream).map_err(|e| match e {
    native_tls::HandshakeError::Failure(inner) => {
      let message = format!("{inner}");
      if message.contains("timed out") {
        CertError::Timeout
      } else {
        CertError::Tls(message)
      }
    }
    native_tls::HandshakeError::WouldBlock(_) => {
      CertError::Connection("handshake interrupted".to_string())
    }
  })?;

  let der = tls
    .peer_certificate()
    .map_err(|e| CertError::Tls(format!("{e}")))?
    .ok_or_else(|| CertError::Tls("no peer certificate presented".to_string()))?
    .to_der()
    .map_err(|e| CertError::Tls(format!("{e}")))?;

  let (_, cert) = X509Certificate::from_der(&der)
    .map_err(|e| CertError::Tls(format!("certificate parse error: {e}")))?;

  Ok(inspect(&cert, hostname))
}

/// Async form; the handshake runs on the blocking pool.
pub async fn validate_async(hostname: String, port: u16) -> Result<CertificateAnalysis, CertError> {
  tokio::task::spawn_blocking(move || validate(&hostname, port))
    .await
    .map_err(|e| CertError::Connection(format!("validation task failed: {e}")))?
}
