//! Session persistence seam.
//!
//! The host owns session serialization entirely; this crate only moves
//! opaque blobs around. The two placeholder states the coordinator loads
//! during a transition ([`SessionBlob::blank`] and
//! [`SessionBlob::private_landing`]) are the only blobs built here.

use crate::stores::StoreError;

/// Opaque serialized snapshot of all open windows/tabs.
///
/// Produced and consumed by the host's session service; never inspected
/// by this crate beyond equality in tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionBlob(String);

impl SessionBlob {
    /// Wraps a host-produced serialized state.
    pub fn new(raw: impl Into<String>) -> Self {
        SessionBlob(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Single window, single `about:blank` tab. Loaded between the private
    /// and non-private sessions so the transition point is state-clean.
    pub fn blank() -> Self {
        Self::single_tab("about:blank")
    }

    /// Single `about:private` tab, loaded after entering private mode.
    pub fn private_landing() -> Self {
        Self::single_tab("about:private")
    }

    fn single_tab(url: &str) -> Self {
        let state = serde_json::json!({
            "windows": [{
                "tabs": [{
                    "entries": [{ "url": url }]
                }],
                "closed_tabs": []
            }]
        });
        SessionBlob(state.to_string())
    }
}

/// Host session-persistence service: get/set the whole browser state.
pub trait SessionStore {
    fn state(&self) -> Result<SessionBlob, StoreError>;
    fn set_state(&self, blob: &SessionBlob) -> Result<(), StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_is_single_about_blank_tab() {
        let blob = SessionBlob::blank();
        let value: serde_json::Value = serde_json::from_str(blob.as_str()).unwrap();
        assert_eq!(value["windows"][0]["tabs"][0]["entries"][0]["url"], "about:blank");
        assert_eq!(value["windows"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_private_landing_tab() {
        let blob = SessionBlob::private_landing();
        let value: serde_json::Value = serde_json::from_str(blob.as_str()).unwrap();
        assert_eq!(
            value["windows"][0]["tabs"][0]["entries"][0]["url"],
            "about:private"
        );
    }

    #[test]
    fn test_host_blob_roundtrips_untouched() {
        let raw = r#"{"anything":"the host wrote"}"#;
        let blob = SessionBlob::new(raw);
        assert_eq!(blob.as_str(), raw);
    }
}
