//! Listing records and their validation into typed metadata.

use crate::error::ApiError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// What a listed path is, as reported by the listing service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum EntryKind {
    File {
        size: u64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        mode: Option<u32>,
    },
    Directory {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        mode: Option<u32>,
    },
    /// Links, sockets and whatever else a backend reports.
    Other {
        kind: String,
        size: u64,
    },
}

/// Validated record for one listed path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryMetadata {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ino: Option<u64>,
    #[serde(flatten)]
    pub kind: EntryKind,
}

/// Wire shape of a listing record: `{name, type, size, ino, mode}`, all optional.
///
/// Numeric fields are kept untyped; backends disagree on whether they send
/// integers, floats or strings.
#[derive(Debug, Default, Deserialize)]
struct RawEntry {
    #[serde(default)]
    name: Option<Value>,
    #[serde(default, rename = "type")]
    kind: Option<Value>,
    #[serde(default)]
    size: Option<Value>,
    #[serde(default)]
    ino: Option<Value>,
    #[serde(default)]
    mode: Option<Value>,
}

/// Best-effort unsigned integer from a JSON number or numeric string.
///
/// Floats are truncated; negative, non-finite and out-of-range values give `None`.
fn lenient_u64(value: Option<&Value>) -> Option<u64> {
    let float = match value? {
        Value::Number(n) => match n.as_u64() {
            Some(int) => return Some(int),
            None => n.as_f64()?,
        },
        Value::String(s) => {
            let s = s.trim();
            match s.parse::<u64>() {
                Ok(int) => return Some(int),
                Err(_) => s.parse::<f64>().ok()?,
            }
        }
        _ => return None,
    };
    (float.is_finite() && float >= 0.0 && float < u64::MAX as f64).then(|| float as u64)
}

/// Permission bits from a number or a string; `"0644"` and `"0o644"` read as octal.
fn lenient_mode(value: Option<&Value>) -> Option<u32> {
    if let Some(Value::String(s)) = value {
        let s = s.trim();
        let octal = s
            .strip_prefix("0o")
            .or_else(|| s.strip_prefix('0').filter(|rest| !rest.is_empty()));
        if let Some(octal) = octal {
            return u32::from_str_radix(octal, 8).ok();
        }
    }
    lenient_u64(value).and_then(|mode| u32::try_from(mode).ok())
}

impl EntryMetadata {
    /// Validate one listing record.
    ///
    /// Only a missing, empty or non-string `name` (or a record that is not an
    /// object) is malformed. A missing `type` classifies as a file, and
    /// unreadable `size`, `ino` or `mode` values are dropped.
    pub fn from_json(value: &Value) -> Result<Self, ApiError> {
        if !value.is_object() {
            return Err(ApiError::MalformedEntry(format!(
                "expected an object, got {}",
                value
            )));
        }
        let raw: RawEntry = serde_json::from_value(value.clone())
            .map_err(|e| ApiError::MalformedEntry(e.to_string()))?;
        let name = match raw.name {
            Some(Value::String(name)) if !name.is_empty() => name,
            _ => {
                return Err(ApiError::MalformedEntry(format!(
                    "missing name in {}",
                    value
                )))
            }
        };

        let size = lenient_u64(raw.size.as_ref()).unwrap_or(0);
        let mode = lenient_mode(raw.mode.as_ref());
        let kind = match raw.kind.as_ref().and_then(Value::as_str) {
            None | Some("file") => EntryKind::File { size, mode },
            Some("directory") => EntryKind::Directory { mode },
            Some(other) => EntryKind::Other {
                kind: other.to_string(),
                size,
            },
        };

        Ok(Self {
            name,
            ino: lenient_u64(raw.ino.as_ref()),
            kind,
        })
    }

    /// Metadata for a directory known only by its path, such as a tree root.
    pub fn directory(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ino: None,
            kind: EntryKind::Directory { mode: None },
        }
    }

    pub fn is_directory(&self) -> bool {
        matches!(self.kind, EntryKind::Directory { .. })
    }

    /// Size in bytes, if the record is sized.
    pub fn size(&self) -> Option<u64> {
        match self.kind {
            EntryKind::File { size, .. } | EntryKind::Other { size, .. } => Some(size),
            EntryKind::Directory { .. } => None,
        }
    }
}
