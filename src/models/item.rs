use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::types::DashboardError;

/// Named partition of the monitored key space.
pub type Category = String;

/// Health reported for a single item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum StatusKind {
    Success,
    Warning,
    Danger,
    Info,
    #[default]
    Other,
}

impl StatusKind {
    pub const ALL: [StatusKind; 5] = [
        StatusKind::Success,
        StatusKind::Warning,
        StatusKind::Danger,
        StatusKind::Info,
        StatusKind::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StatusKind::Success => "success",
            StatusKind::Warning => "warning",
            StatusKind::Danger => "danger",
            StatusKind::Info => "info",
            StatusKind::Other => "other",
        }
    }

    /// Lenient wire decoding. The server writes statuses past `danger` as their
    /// numeric code, so `"3"` is info; anything unknown becomes `Other`.
    pub fn from_wire(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "success" | "0" => StatusKind::Success,
            "warning" | "1" => StatusKind::Warning,
            "danger" | "2" => StatusKind::Danger,
            "info" | "3" => StatusKind::Info,
            _ => StatusKind::Other,
        }
    }

    /// Ordering used when picking the worst item of a category.
    ///
    /// Not the wire code order: info (`"3"`) ranks below warning and danger here,
    /// so an informational item never masks a failing one.
    pub fn severity(&self) -> u8 {
        match self {
            StatusKind::Success => 0,
            StatusKind::Info => 1,
            StatusKind::Other => 2,
            StatusKind::Warning => 3,
            StatusKind::Danger => 4,
        }
    }
}

impl fmt::Display for StatusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for StatusKind {
    fn from(raw: String) -> Self {
        StatusKind::from_wire(&raw)
    }
}

impl From<StatusKind> for String {
    fn from(status: StatusKind) -> Self {
        status.as_str().to_string()
    }
}

/// Strict parsing for user input: only the five status names are accepted.
impl FromStr for StatusKind {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StatusKind::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| DashboardError::InvalidCommand(format!("unknown status `{s}`")))
    }
}

/// One key reported by a node, as delivered by the server.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Item {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub category: String,
    #[serde(default)]
    pub node: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub status: StatusKind,
    #[serde(default)]
    pub data: String,
}
