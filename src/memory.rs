//! In-memory implementations of every service seam.
//!
//! Used as test doubles throughout the crate and usable by embedders that
//! have no host backend yet. Each store carries a `poison()` switch that
//! makes every subsequent call fail, to exercise the purge's per-category
//! error aggregation.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::session::{SessionBlob, SessionStore};
use crate::stores::{
    AuthStore, CacheStore, ContentPrefStore, Cookie, CookieStore, Download, DownloadStore,
    HistoryStore, Login, LoginStore, Permission, PermissionStore, StoreError, StoreRegistry,
};

fn check(poisoned: &Cell<bool>) -> Result<(), StoreError> {
    if poisoned.get() {
        Err(StoreError::Backend("poisoned".to_string()))
    } else {
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Session
// ─────────────────────────────────────────────────────────────────────────────

/// In-memory session service holding a single current state.
pub struct MemorySessionStore {
    state: RefCell<SessionBlob>,
    poisoned: Cell<bool>,
    /// Every state ever set, oldest first. Test hook.
    pub history: RefCell<Vec<SessionBlob>>,
}

impl MemorySessionStore {
    pub fn new(initial: SessionBlob) -> Self {
        MemorySessionStore {
            state: RefCell::new(initial),
            poisoned: Cell::new(false),
            history: RefCell::new(Vec::new()),
        }
    }

    pub fn poison(&self) {
        self.poisoned.set(true);
    }
}

impl SessionStore for MemorySessionStore {
    fn state(&self) -> Result<SessionBlob, StoreError> {
        check(&self.poisoned)?;
        Ok(self.state.borrow().clone())
    }

    fn set_state(&self, blob: &SessionBlob) -> Result<(), StoreError> {
        check(&self.poisoned)?;
        *self.state.borrow_mut() = blob.clone();
        self.history.borrow_mut().push(blob.clone());
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Auth / network session state
// ─────────────────────────────────────────────────────────────────────────────

/// In-memory auth-state double counting each cleanup call.
#[derive(Default)]
pub struct MemoryAuth {
    pub auth_clears: Cell<usize>,
    pub connection_drops: Cell<usize>,
    pub console_clears: Cell<usize>,
    poisoned: Cell<bool>,
}

impl MemoryAuth {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn poison(&self) {
        self.poisoned.set(true);
    }
}

impl AuthStore for MemoryAuth {
    fn clear_auth_sessions(&self) -> Result<(), StoreError> {
        check(&self.poisoned)?;
        self.auth_clears.set(self.auth_clears.get() + 1);
        Ok(())
    }

    fn drop_open_connections(&self) -> Result<(), StoreError> {
        check(&self.poisoned)?;
        self.connection_drops.set(self.connection_drops.get() + 1);
        Ok(())
    }

    fn clear_console(&self) -> Result<(), StoreError> {
        check(&self.poisoned)?;
        self.console_clears.set(self.console_clears.get() + 1);
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Per-domain stores
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct MemoryHistory {
    pub hosts: RefCell<Vec<String>>,
    poisoned: Cell<bool>,
}

impl MemoryHistory {
    pub fn with_hosts(hosts: &[&str]) -> Self {
        MemoryHistory {
            hosts: RefCell::new(hosts.iter().map(|h| h.to_string()).collect()),
            poisoned: Cell::new(false),
        }
    }

    pub fn poison(&self) {
        self.poisoned.set(true);
    }
}

impl HistoryStore for MemoryHistory {
    fn hosts(&self) -> Result<Vec<String>, StoreError> {
        check(&self.poisoned)?;
        Ok(self.hosts.borrow().clone())
    }

    fn remove_pages(&self, host: &str) -> Result<(), StoreError> {
        check(&self.poisoned)?;
        self.hosts.borrow_mut().retain(|h| h != host);
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryCache {
    pub entries: Cell<usize>,
    poisoned: Cell<bool>,
}

impl MemoryCache {
    pub fn with_entries(count: usize) -> Self {
        MemoryCache {
            entries: Cell::new(count),
            poisoned: Cell::new(false),
        }
    }

    pub fn poison(&self) {
        self.poisoned.set(true);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.get() == 0
    }
}

impl CacheStore for MemoryCache {
    fn evict_all(&self) -> Result<(), StoreError> {
        check(&self.poisoned)?;
        self.entries.set(0);
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryCookies {
    pub jar: RefCell<Vec<Cookie>>,
    poisoned: Cell<bool>,
}

impl MemoryCookies {
    pub fn with_hosts(hosts: &[&str]) -> Self {
        let jar = hosts
            .iter()
            .map(|h| Cookie {
                host: h.to_string(),
                name: "sid".to_string(),
                path: "/".to_string(),
            })
            .collect();
        MemoryCookies {
            jar: RefCell::new(jar),
            poisoned: Cell::new(false),
        }
    }

    pub fn poison(&self) {
        self.poisoned.set(true);
    }
}

impl CookieStore for MemoryCookies {
    fn cookies(&self) -> Result<Vec<Cookie>, StoreError> {
        check(&self.poisoned)?;
        Ok(self.jar.borrow().clone())
    }

    fn remove(&self, cookie: &Cookie) -> Result<(), StoreError> {
        check(&self.poisoned)?;
        self.jar.borrow_mut().retain(|c| c != cookie);
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryDownloads {
    pub list: RefCell<Vec<Download>>,
    pub cancelled: RefCell<Vec<u64>>,
    poisoned: Cell<bool>,
}

impl MemoryDownloads {
    pub fn with_downloads(downloads: Vec<Download>) -> Self {
        MemoryDownloads {
            list: RefCell::new(downloads),
            cancelled: RefCell::new(Vec::new()),
            poisoned: Cell::new(false),
        }
    }

    pub fn poison(&self) {
        self.poisoned.set(true);
    }
}

impl DownloadStore for MemoryDownloads {
    fn downloads(&self) -> Result<Vec<Download>, StoreError> {
        check(&self.poisoned)?;
        Ok(self.list.borrow().clone())
    }

    fn cancel(&self, id: u64) -> Result<(), StoreError> {
        check(&self.poisoned)?;
        self.cancelled.borrow_mut().push(id);
        if let Some(dl) = self.list.borrow_mut().iter_mut().find(|d| d.id == id) {
            dl.active = false;
        }
        Ok(())
    }

    fn remove(&self, id: u64) -> Result<(), StoreError> {
        check(&self.poisoned)?;
        self.list.borrow_mut().retain(|d| d.id != id);
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryLogins {
    pub vault: RefCell<Vec<Login>>,
    pub disabled: RefCell<Vec<String>>,
    poisoned: Cell<bool>,
}

impl MemoryLogins {
    pub fn with_logins(hosts: &[&str]) -> Self {
        let vault = hosts
            .iter()
            .map(|h| Login {
                hostname: h.to_string(),
                username: "user".to_string(),
            })
            .collect();
        MemoryLogins {
            vault: RefCell::new(vault),
            disabled: RefCell::new(Vec::new()),
            poisoned: Cell::new(false),
        }
    }

    pub fn poison(&self) {
        self.poisoned.set(true);
    }
}

impl LoginStore for MemoryLogins {
    fn logins(&self) -> Result<Vec<Login>, StoreError> {
        check(&self.poisoned)?;
        Ok(self.vault.borrow().clone())
    }

    fn remove(&self, login: &Login) -> Result<(), StoreError> {
        check(&self.poisoned)?;
        self.vault.borrow_mut().retain(|l| l != login);
        Ok(())
    }

    fn disabled_hosts(&self) -> Result<Vec<String>, StoreError> {
        check(&self.poisoned)?;
        Ok(self.disabled.borrow().clone())
    }

    fn set_login_saving_enabled(&self, host: &str, enabled: bool) -> Result<(), StoreError> {
        check(&self.poisoned)?;
        let mut disabled = self.disabled.borrow_mut();
        if enabled {
            disabled.retain(|h| h != host);
        } else if !disabled.iter().any(|h| h == host) {
            disabled.push(host.to_string());
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryPermissions {
    pub grants: RefCell<Vec<Permission>>,
    poisoned: Cell<bool>,
}

impl MemoryPermissions {
    pub fn with_grants(grants: Vec<Permission>) -> Self {
        MemoryPermissions {
            grants: RefCell::new(grants),
            poisoned: Cell::new(false),
        }
    }

    pub fn poison(&self) {
        self.poisoned.set(true);
    }
}

impl PermissionStore for MemoryPermissions {
    fn permissions(&self) -> Result<Vec<Permission>, StoreError> {
        check(&self.poisoned)?;
        Ok(self.grants.borrow().clone())
    }

    fn remove(&self, host: &str, kind: &str) -> Result<(), StoreError> {
        check(&self.poisoned)?;
        self.grants
            .borrow_mut()
            .retain(|p| !(p.host == host && p.kind == kind));
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryContentPrefs {
    /// (group, pref name) pairs.
    pub prefs: RefCell<Vec<(String, String)>>,
    poisoned: Cell<bool>,
}

impl MemoryContentPrefs {
    pub fn with_prefs(prefs: &[(&str, &str)]) -> Self {
        MemoryContentPrefs {
            prefs: RefCell::new(
                prefs
                    .iter()
                    .map(|(g, n)| (g.to_string(), n.to_string()))
                    .collect(),
            ),
            poisoned: Cell::new(false),
        }
    }

    pub fn poison(&self) {
        self.poisoned.set(true);
    }
}

impl ContentPrefStore for MemoryContentPrefs {
    fn groups(&self) -> Result<Vec<String>, StoreError> {
        check(&self.poisoned)?;
        let mut groups: Vec<String> = Vec::new();
        for (group, _) in self.prefs.borrow().iter() {
            if !groups.contains(group) {
                groups.push(group.clone());
            }
        }
        Ok(groups)
    }

    fn pref_names(&self, group: &str) -> Result<Vec<String>, StoreError> {
        check(&self.poisoned)?;
        Ok(self
            .prefs
            .borrow()
            .iter()
            .filter(|(g, _)| g == group)
            .map(|(_, n)| n.clone())
            .collect())
    }

    fn remove_pref(&self, group: &str, name: &str) -> Result<(), StoreError> {
        check(&self.poisoned)?;
        self.prefs
            .borrow_mut()
            .retain(|(g, n)| !(g == group && n == name));
        Ok(())
    }
}

impl StoreRegistry {
    /// Registry backed entirely by empty in-memory stores.
    pub fn in_memory() -> StoreRegistry {
        StoreRegistry {
            history: Rc::new(MemoryHistory::default()),
            cache: Rc::new(MemoryCache::default()),
            cookies: Rc::new(MemoryCookies::default()),
            downloads: Rc::new(MemoryDownloads::default()),
            logins: Rc::new(MemoryLogins::default()),
            permissions: Rc::new(MemoryPermissions::default()),
            content_prefs: Rc::new(MemoryContentPrefs::default()),
        }
    }
}
