use serde::{Deserialize, Serialize};
use std::fmt;

/// 曲目 ID（由调用方提供，内容不透明）
///
/// 引擎只比较相等，从不解析。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackId(String);

impl TrackId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TrackId {
    fn from(v: &str) -> Self {
        Self(v.to_owned())
    }
}

impl From<String> for TrackId {
    fn from(v: String) -> Self {
        Self(v)
    }
}
