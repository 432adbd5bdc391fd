//! Query parameter types for the read API.
//!
//! Parameters arrive as raw strings so that a malformed number can be
//! reported with its parse error instead of a generic extractor rejection.

use serde::{Deserialize, Serialize};

/// Page size used when `limit` is not supplied.
pub const DEFAULT_LIMIT: u32 = 10;

/// Raw `?limit=&offset=` parameters for offset pagination.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageQuery {
    pub limit: Option<String>,
    pub offset: Option<String>,
}

/// Raw `?limit=&lastid=` parameters for cursor pagination.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LazyQuery {
    pub limit: Option<String>,
    pub lastid: Option<String>,
}

/// Validated offset pagination request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: u32,
    pub offset: u32,
}

/// Validated cursor pagination request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursor {
    pub limit: u32,
    pub last_id: String,
}

fn parse_param(name: &str, raw: Option<&str>, default: u32) -> Result<u32, String> {
    match raw {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse::<u32>()
            .map_err(|e| format!("invalid {}: {}", name, e)),
    }
}

impl PageQuery {
    /// Applies defaults and parses the numeric parameters.
    pub fn parse(&self) -> Result<Page, String> {
        Ok(Page {
            limit: parse_param("limit", self.limit.as_deref(), DEFAULT_LIMIT)?,
            offset: parse_param("offset", self.offset.as_deref(), 0)?,
        })
    }
}

impl LazyQuery {
    /// Applies defaults and parses the numeric parameters.
    pub fn parse(&self) -> Result<Cursor, String> {
        Ok(Cursor {
            limit: parse_param("limit", self.limit.as_deref(), DEFAULT_LIMIT)?,
            last_id: self.lastid.clone().unwrap_or_default(),
        })
    }
}
