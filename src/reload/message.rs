//! Live-reload message protocol.
//!
//! JSON messages pushed over the WebSocket to browser clients.
//!
//! - `reload`: reload the page
//! - `css`: re-fetch one stylesheet without a page reload
//! - `connected`: handshake acknowledgement

use serde::{Deserialize, Serialize};

/// Message sent to live-reload clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ReloadMessage {
    /// Full page reload
    Reload {
        #[serde(skip_serializing_if = "Option::is_none", default)]
        reason: Option<String>,
    },

    /// Stylesheet swap
    Css {
        /// URL path of the stylesheet, e.g. `/css/style.css`
        path: String,
    },

    /// Connection established
    Connected {
        /// Server version for compatibility check
        version: String,
    },
}

impl ReloadMessage {
    pub fn reload() -> Self {
        Self::Reload { reason: None }
    }

    pub fn reload_with_reason(reason: impl Into<String>) -> Self {
        Self::Reload {
            reason: Some(reason.into()),
        }
    }

    pub fn css(path: impl Into<String>) -> Self {
        Self::Css { path: path.into() }
    }

    pub fn connected() -> Self {
        Self::Connected {
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| r#"{"type":"reload"}"#.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reload_json() {
        assert_eq!(ReloadMessage::reload().to_json(), r#"{"type":"reload"}"#);

        let json = ReloadMessage::reload_with_reason("html").to_json();
        assert!(json.contains(r#""reason":"html""#));
    }

    #[test]
    fn test_css_json() {
        let json = ReloadMessage::css("/css/style.css").to_json();
        assert_eq!(json, r#"{"type":"css","path":"/css/style.css"}"#);
    }

    #[test]
    fn test_connected_carries_version() {
        let json = ReloadMessage::connected().to_json();
        assert!(json.contains(r#""type":"connected""#));
        assert!(json.contains(env!("CARGO_PKG_VERSION")));
    }
}
