//! Preference store seam and the keys the coordinator consults.
//!
//! The host browser owns the real preference service; the coordinator only
//! reads two booleans from it. [`MemoryPrefStore`] is the in-memory
//! implementation used in tests and by embedders without a host backend,
//! seedable from the TOML [`Config`](crate::config::Config).

use std::cell::RefCell;
use std::collections::HashMap;

use crate::config::Config;

/// Enter private mode automatically at startup.
pub const PREF_AUTOSTART: &str = "privacy.autostart";

/// Keep the current session when entering private mode (no snapshot, no
/// placeholder session swap).
pub const PREF_KEEP_CURRENT_SESSION: &str = "privacy.keep_current_session";

/// Host preference service: booleans and strings by key.
/// A missing key is a normal `None`, not an error.
pub trait PrefStore {
    fn get_bool(&self, key: &str) -> Option<bool>;
    fn set_bool(&self, key: &str, value: bool);
    fn get_string(&self, key: &str) -> Option<String>;
    fn set_string(&self, key: &str, value: &str);
}

/// In-memory preference store.
#[derive(Default)]
pub struct MemoryPrefStore {
    bools: RefCell<HashMap<String, bool>>,
    strings: RefCell<HashMap<String, String>>,
}

impl MemoryPrefStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the privacy keys from a loaded config.
    pub fn from_config(config: &Config) -> Self {
        let store = Self::new();
        store.set_bool(PREF_AUTOSTART, config.privacy.autostart);
        store.set_bool(
            PREF_KEEP_CURRENT_SESSION,
            config.privacy.keep_current_session,
        );
        store
    }
}

impl PrefStore for MemoryPrefStore {
    fn get_bool(&self, key: &str) -> Option<bool> {
        self.bools.borrow().get(key).copied()
    }

    fn set_bool(&self, key: &str, value: bool) {
        self.bools.borrow_mut().insert(key.to_string(), value);
    }

    fn get_string(&self, key: &str) -> Option<String> {
        self.strings.borrow().get(key).cloned()
    }

    fn set_string(&self, key: &str, value: &str) {
        self.strings
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
    }
}
