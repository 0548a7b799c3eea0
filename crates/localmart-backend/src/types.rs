//! Wire shapes for PostgREST error bodies and IP geolocation lookups.

use serde::Deserialize;

/// Error body PostgREST returns alongside a non-2xx status.
///
/// Every field is optional: proxies in front of PostgREST may return a
/// different shape or no JSON at all.
#[derive(Debug, Default, Deserialize)]
pub struct PostgrestErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub hint: Option<String>,
}

impl PostgrestErrorBody {
    /// Collapses the body into one log-friendly line.
    #[must_use]
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();
        if let Some(code) = &self.code {
            parts.push(format!("[{code}]"));
        }
        parts.push(
            self.message
                .clone()
                .unwrap_or_else(|| "unknown error".to_string()),
        );
        if let Some(details) = &self.details {
            parts.push(format!("({details})"));
        }
        if let Some(hint) = &self.hint {
            parts.push(format!("hint: {hint}"));
        }
        parts.join(" ")
    }
}

/// Position reported by an IP geolocation service.
///
/// Accepts both the `ip-api.com` shape (`lat`/`lon`) and the `ipapi.co`
/// shape (`latitude`/`longitude`).
#[derive(Debug, Deserialize)]
pub struct IpLocationResponse {
    #[serde(alias = "latitude")]
    pub lat: Option<f64>,
    #[serde(alias = "longitude")]
    pub lon: Option<f64>,
    /// `ip-api.com` reports `"fail"` here with a `message`.
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}
