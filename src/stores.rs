//! Per-domain data store seams.
//!
//! One trait per store category, each offering the enumeration and targeted
//! deletion primitives the purge sweep needs. The traits are deliberately
//! narrow: the host services behind them (cookie jar, download list, login
//! vault…) are far richer, but the purge only enumerates and deletes.
//!
//! [`StoreRegistry`] bundles one handle per category and is what gets
//! injected into [`DomainPurger`](crate::purge::DomainPurger).

use std::fmt;
use std::rc::Rc;

use thiserror::Error;

/// Failure from a host store backend.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("store unavailable")]
    Unavailable,
    #[error("backend failure: {0}")]
    Backend(String),
}

/// Store categories swept by the purge, in sweep order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    History,
    Cache,
    Cookies,
    Downloads,
    Logins,
    Permissions,
    ContentPrefs,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::History,
        Category::Cache,
        Category::Cookies,
        Category::Downloads,
        Category::Logins,
        Category::Permissions,
        Category::ContentPrefs,
    ];
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Category::History => "history",
            Category::Cache => "cache",
            Category::Cookies => "cookies",
            Category::Downloads => "downloads",
            Category::Logins => "logins",
            Category::Permissions => "permissions",
            Category::ContentPrefs => "content-prefs",
        };
        f.write_str(name)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Record types
// ─────────────────────────────────────────────────────────────────────────────

/// A stored cookie, keyed by (host, name, path).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    pub host: String,
    pub name: String,
    pub path: String,
}

/// A download record. `source` is the full source URL; matching is done
/// on its host component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub id: u64,
    pub source: String,
    /// Still transferring. Active downloads are cancelled before removal.
    pub active: bool,
}

/// A saved credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Login {
    pub hostname: String,
    pub username: String,
}

/// A per-host permission grant ("geolocation", "notifications"…).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Permission {
    pub host: String,
    pub kind: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Store traits
// ─────────────────────────────────────────────────────────────────────────────

/// Browsing history, enumerated and deleted by host.
pub trait HistoryStore {
    fn hosts(&self) -> Result<Vec<String>, StoreError>;
    fn remove_pages(&self, host: &str) -> Result<(), StoreError>;
}

/// Network cache. The host exposes no per-domain granularity, so the purge
/// evicts everything — a documented approximation.
pub trait CacheStore {
    fn evict_all(&self) -> Result<(), StoreError>;
}

/// Cookie jar.
pub trait CookieStore {
    fn cookies(&self) -> Result<Vec<Cookie>, StoreError>;
    fn remove(&self, cookie: &Cookie) -> Result<(), StoreError>;
}

/// Download list, active and completed.
pub trait DownloadStore {
    fn downloads(&self) -> Result<Vec<Download>, StoreError>;
    fn cancel(&self, id: u64) -> Result<(), StoreError>;
    fn remove(&self, id: u64) -> Result<(), StoreError>;
}

/// Saved credentials, plus the "never save for this site" host list.
pub trait LoginStore {
    fn logins(&self) -> Result<Vec<Login>, StoreError>;
    fn remove(&self, login: &Login) -> Result<(), StoreError>;
    fn disabled_hosts(&self) -> Result<Vec<String>, StoreError>;
    fn set_login_saving_enabled(&self, host: &str, enabled: bool) -> Result<(), StoreError>;
}

/// Per-host permission grants.
pub trait PermissionStore {
    fn permissions(&self) -> Result<Vec<Permission>, StoreError>;
    fn remove(&self, host: &str, kind: &str) -> Result<(), StoreError>;
}

/// Authentication and network session state cleared on every mode change:
/// cached credentials and auth tokens, and any open connections that could
/// carry a session across the private/non-private boundary.
pub trait AuthStore {
    /// Logs out token stores and forgets all HTTP auth sessions.
    fn clear_auth_sessions(&self) -> Result<(), StoreError>;
    /// Drops open connections so none outlives the transition.
    fn drop_open_connections(&self) -> Result<(), StoreError>;
    /// Clears the error console. Only invoked when leaving private mode.
    fn clear_console(&self) -> Result<(), StoreError>;
}

/// Per-site content preferences (zoom level, text encoding…), grouped by
/// host.
pub trait ContentPrefStore {
    fn groups(&self) -> Result<Vec<String>, StoreError>;
    fn pref_names(&self, group: &str) -> Result<Vec<String>, StoreError>;
    fn remove_pref(&self, group: &str, name: &str) -> Result<(), StoreError>;
}

/// One handle per store category, injected into the purge engine.
#[derive(Clone)]
pub struct StoreRegistry {
    pub history: Rc<dyn HistoryStore>,
    pub cache: Rc<dyn CacheStore>,
    pub cookies: Rc<dyn CookieStore>,
    pub downloads: Rc<dyn DownloadStore>,
    pub logins: Rc<dyn LoginStore>,
    pub permissions: Rc<dyn PermissionStore>,
    pub content_prefs: Rc<dyn ContentPrefStore>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_display_names() {
        assert_eq!(Category::History.to_string(), "history");
        assert_eq!(Category::ContentPrefs.to_string(), "content-prefs");
    }

    #[test]
    fn test_all_covers_every_category() {
        assert_eq!(Category::ALL.len(), 7);
    }

    #[test]
    fn test_store_error_display() {
        assert_eq!(StoreError::Unavailable.to_string(), "store unavailable");
        assert_eq!(
            StoreError::Backend("disk full".into()).to_string(),
            "backend failure: disk full"
        );
    }
}
