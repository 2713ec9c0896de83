//! Purge des données stockées pour un domaine racine.
//!
//! Balaye chaque catégorie de stockage (historique, cache, cookies,
//! téléchargements, identifiants, permissions, préférences de contenu),
//! teste chaque enregistrement avec le prédicat de domaine racine et
//! supprime les correspondances. Le cache n'offre aucune granularité par
//! domaine côté hôte : il est vidé entièrement à chaque purge —
//! approximation documentée, pas un bug.
//!
//! Chaque catégorie produit son propre résultat ; un échec dans l'une
//! n'interrompt pas les suivantes. Le rapport agrège compteurs et erreurs,
//! et la notification `purge-domain-data` part une fois le balayage
//! terminé, complet ou non.

use std::rc::Rc;

use tracing::{error, info};

use crate::domain::{has_root_domain, host_of};
use crate::observers::{ObserverBus, TOPIC_DOWNLOAD_REMOVED, TOPIC_PURGE_DOMAIN_DATA};
use crate::stores::{Category, StoreError, StoreRegistry};

/// Result of one category's sweep.
#[derive(Debug, Clone)]
pub struct CategoryOutcome {
    pub category: Category,
    /// Records removed. Zero when the sweep failed; always zero for the
    /// cache, whose eviction has no per-record count.
    pub removed: usize,
    pub error: Option<StoreError>,
}

/// Aggregated outcome of a whole purge call.
#[derive(Debug, Clone)]
pub struct PurgeReport {
    pub domain: String,
    pub outcomes: Vec<CategoryOutcome>,
}

impl PurgeReport {
    /// True if every category was swept without a backend failure.
    pub fn is_complete(&self) -> bool {
        self.outcomes.iter().all(|o| o.error.is_none())
    }

    pub fn removed_total(&self) -> usize {
        self.outcomes.iter().map(|o| o.removed).sum()
    }

    pub fn failed_categories(&self) -> Vec<Category> {
        self.outcomes
            .iter()
            .filter(|o| o.error.is_some())
            .map(|o| o.category)
            .collect()
    }
}

/// Sweeps every registered store category for a root domain.
pub struct DomainPurger {
    bus: Rc<ObserverBus>,
    stores: StoreRegistry,
}

impl DomainPurger {
    pub fn new(bus: Rc<ObserverBus>, stores: StoreRegistry) -> Self {
        DomainPurger { bus, stores }
    }

    /// Removes all stored data belonging to `domain` (root-domain match).
    ///
    /// Malformed or empty input simply matches nothing — the cache is
    /// still evicted and the completion notification still fires. Every
    /// category is swept even when an earlier one fails; failures land in
    /// the report instead of aborting the purge.
    pub fn purge(&self, domain: &str) -> PurgeReport {
        info!(domain, "purging domain data");

        let mut outcomes = Vec::with_capacity(Category::ALL.len());
        for category in Category::ALL {
            let result = match category {
                Category::History => self.sweep_history(domain),
                Category::Cache => self.sweep_cache(),
                Category::Cookies => self.sweep_cookies(domain),
                Category::Downloads => self.sweep_downloads(domain),
                Category::Logins => self.sweep_logins(domain),
                Category::Permissions => self.sweep_permissions(domain),
                Category::ContentPrefs => self.sweep_content_prefs(domain),
            };
            let outcome = match result {
                Ok(removed) => CategoryOutcome {
                    category,
                    removed,
                    error: None,
                },
                Err(e) => {
                    error!(domain, category = %category, error = %e, "purge sweep failed");
                    CategoryOutcome {
                        category,
                        removed: 0,
                        error: Some(e),
                    }
                }
            };
            outcomes.push(outcome);
        }

        // Everybody else (extensions, UI listeners) reacts to this.
        self.bus.notify(TOPIC_PURGE_DOMAIN_DATA, None, domain);

        let report = PurgeReport {
            domain: domain.to_string(),
            outcomes,
        };
        info!(
            domain,
            removed = report.removed_total(),
            complete = report.is_complete(),
            "domain purge finished"
        );
        report
    }

    fn sweep_history(&self, domain: &str) -> Result<usize, StoreError> {
        let mut removed = 0;
        for host in self.stores.history.hosts()? {
            if has_root_domain(&host, domain) {
                self.stores.history.remove_pages(&host)?;
                removed += 1;
            }
        }
        Ok(removed)
    }

    // No per-domain granularity in the host cache API: evict everything.
    fn sweep_cache(&self) -> Result<usize, StoreError> {
        self.stores.cache.evict_all()?;
        Ok(0)
    }

    fn sweep_cookies(&self, domain: &str) -> Result<usize, StoreError> {
        let mut removed = 0;
        for cookie in self.stores.cookies.cookies()? {
            if has_root_domain(&cookie.host, domain) {
                self.stores.cookies.remove(&cookie)?;
                removed += 1;
            }
        }
        Ok(removed)
    }

    fn sweep_downloads(&self, domain: &str) -> Result<usize, StoreError> {
        let mut removed = 0;
        for download in self.stores.downloads.downloads()? {
            let matches = host_of(&download.source)
                .is_some_and(|host| has_root_domain(&host, domain));
            if !matches {
                continue;
            }
            if download.active {
                self.stores.downloads.cancel(download.id)?;
            }
            self.stores.downloads.remove(download.id)?;
            removed += 1;
        }
        if removed > 0 {
            // Rebuild the downloads list if the UI is showing.
            self.bus.notify(TOPIC_DOWNLOAD_REMOVED, None, domain);
        }
        Ok(removed)
    }

    fn sweep_logins(&self, domain: &str) -> Result<usize, StoreError> {
        let mut removed = 0;
        for login in self.stores.logins.logins()? {
            if has_root_domain(&login.hostname, domain) {
                self.stores.logins.remove(&login)?;
                removed += 1;
            }
        }
        // Also drop any "never save for this site" marks for the domain.
        for host in self.stores.logins.disabled_hosts()? {
            if has_root_domain(&host, domain) {
                self.stores.logins.set_login_saving_enabled(&host, true)?;
                removed += 1;
            }
        }
        Ok(removed)
    }

    fn sweep_permissions(&self, domain: &str) -> Result<usize, StoreError> {
        let mut removed = 0;
        for permission in self.stores.permissions.permissions()? {
            if has_root_domain(&permission.host, domain) {
                self.stores
                    .permissions
                    .remove(&permission.host, &permission.kind)?;
                removed += 1;
            }
        }
        Ok(removed)
    }

    fn sweep_content_prefs(&self, domain: &str) -> Result<usize, StoreError> {
        let mut removed = 0;
        for group in self.stores.content_prefs.groups()? {
            if !has_root_domain(&group, domain) {
                continue;
            }
            for name in self.stores.content_prefs.pref_names(&group)? {
                self.stores.content_prefs.remove_pref(&group, &name)?;
                removed += 1;
            }
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::*;
    use crate::observers::{BoolFlag, Observer};
    use crate::stores::{Download, LoginStore, Permission};
    use std::cell::RefCell;

    struct Recorder {
        seen: RefCell<Vec<(String, String)>>,
    }

    impl Observer for Recorder {
        fn observe(&self, topic: &str, _subject: Option<&BoolFlag>, data: &str) {
            self.seen
                .borrow_mut()
                .push((topic.to_string(), data.to_string()));
        }
    }

    struct Fixture {
        bus: Rc<ObserverBus>,
        history: Rc<MemoryHistory>,
        cache: Rc<MemoryCache>,
        cookies: Rc<MemoryCookies>,
        downloads: Rc<MemoryDownloads>,
        logins: Rc<MemoryLogins>,
        permissions: Rc<MemoryPermissions>,
        content_prefs: Rc<MemoryContentPrefs>,
        purger: DomainPurger,
    }

    fn fixture() -> Fixture {
        let bus = Rc::new(ObserverBus::new());
        let history = Rc::new(MemoryHistory::with_hosts(&[
            "example.com",
            "www.example.com",
            "sub.example.com",
            "notexample.com",
            "example.com.evil.org",
        ]));
        let cache = Rc::new(MemoryCache::with_entries(42));
        let cookies = Rc::new(MemoryCookies::with_hosts(&[
            "example.com",
            "www.example.com",
            "notexample.com",
        ]));
        let downloads = Rc::new(MemoryDownloads::with_downloads(vec![
            Download {
                id: 1,
                source: "https://www.example.com/a.zip".to_string(),
                active: true,
            },
            Download {
                id: 2,
                source: "https://other.org/b.zip".to_string(),
                active: false,
            },
        ]));
        let logins = Rc::new(MemoryLogins::with_logins(&[
            "sub.example.com",
            "example.com.evil.org",
        ]));
        let permissions = Rc::new(MemoryPermissions::with_grants(vec![
            Permission {
                host: "example.com".to_string(),
                kind: "geolocation".to_string(),
            },
            Permission {
                host: "unrelated.net".to_string(),
                kind: "notifications".to_string(),
            },
        ]));
        let content_prefs = Rc::new(MemoryContentPrefs::with_prefs(&[
            ("www.example.com", "zoom"),
            ("www.example.com", "encoding"),
            ("notexample.com", "zoom"),
        ]));

        let stores = StoreRegistry {
            history: history.clone(),
            cache: cache.clone(),
            cookies: cookies.clone(),
            downloads: downloads.clone(),
            logins: logins.clone(),
            permissions: permissions.clone(),
            content_prefs: content_prefs.clone(),
        };
        let purger = DomainPurger::new(bus.clone(), stores);

        Fixture {
            bus,
            history,
            cache,
            cookies,
            downloads,
            logins,
            permissions,
            content_prefs,
            purger,
        }
    }

    #[test]
    fn test_suffix_boundary_matching_across_stores() {
        let f = fixture();
        let report = f.purger.purge("example.com");

        assert!(report.is_complete());
        assert_eq!(
            f.history.hosts.borrow().as_slice(),
            &["notexample.com", "example.com.evil.org"]
        );
        let cookie_hosts: Vec<_> =
            f.cookies.jar.borrow().iter().map(|c| c.host.clone()).collect();
        assert_eq!(cookie_hosts, vec!["notexample.com"]);
        assert_eq!(
            f.logins.vault.borrow()[0].hostname,
            "example.com.evil.org"
        );
        assert_eq!(f.permissions.grants.borrow()[0].host, "unrelated.net");
        assert_eq!(
            f.content_prefs.prefs.borrow().as_slice(),
            &[("notexample.com".to_string(), "zoom".to_string())]
        );
    }

    #[test]
    fn test_cache_evicted_on_any_purge() {
        let f = fixture();
        f.purger.purge("domain-with-no-data.example");
        assert!(f.cache.is_empty());
    }

    #[test]
    fn test_empty_domain_matches_nothing_but_still_evicts_cache() {
        let f = fixture();
        let report = f.purger.purge("");

        assert!(f.cache.is_empty());
        assert_eq!(f.history.hosts.borrow().len(), 5);
        assert_eq!(report.removed_total(), 0);
    }

    #[test]
    fn test_active_download_cancelled_before_removal() {
        let f = fixture();
        f.purger.purge("example.com");

        assert_eq!(f.downloads.cancelled.borrow().as_slice(), &[1]);
        let remaining: Vec<_> = f.downloads.list.borrow().iter().map(|d| d.id).collect();
        assert_eq!(remaining, vec![2]);
    }

    #[test]
    fn test_completion_notification_fires() {
        let f = fixture();
        let rec = Rc::new(Recorder {
            seen: RefCell::new(Vec::new()),
        });
        f.bus.add_observer(TOPIC_PURGE_DOMAIN_DATA, rec.clone());
        f.bus.add_observer(TOPIC_DOWNLOAD_REMOVED, rec.clone());

        f.purger.purge("example.com");

        let seen = rec.seen.borrow();
        assert!(seen.contains(&(
            TOPIC_PURGE_DOMAIN_DATA.to_string(),
            "example.com".to_string()
        )));
        assert!(seen.contains(&(
            TOPIC_DOWNLOAD_REMOVED.to_string(),
            "example.com".to_string()
        )));
    }

    #[test]
    fn test_download_removed_topic_only_when_something_removed() {
        let f = fixture();
        let rec = Rc::new(Recorder {
            seen: RefCell::new(Vec::new()),
        });
        f.bus.add_observer(TOPIC_DOWNLOAD_REMOVED, rec.clone());

        f.purger.purge("no-downloads-here.net");
        assert!(rec.seen.borrow().is_empty());
    }

    #[test]
    fn test_category_failure_does_not_stop_other_sweeps() {
        let f = fixture();
        f.cookies.poison();
        let rec = Rc::new(Recorder {
            seen: RefCell::new(Vec::new()),
        });
        f.bus.add_observer(TOPIC_PURGE_DOMAIN_DATA, rec.clone());

        let report = f.purger.purge("example.com");

        assert!(!report.is_complete());
        assert_eq!(report.failed_categories(), vec![Category::Cookies]);
        // Later categories were still swept.
        assert!(f.permissions.grants.borrow().iter().all(|p| p.host != "example.com"));
        // Completion notification fires even on partial failure.
        assert_eq!(rec.seen.borrow().len(), 1);
    }

    #[test]
    fn test_disabled_login_hosts_reenabled() {
        let f = fixture();
        f.logins
            .set_login_saving_enabled("www.example.com", false)
            .unwrap();
        f.logins
            .set_login_saving_enabled("unrelated.net", false)
            .unwrap();

        f.purger.purge("example.com");

        assert_eq!(f.logins.disabled.borrow().as_slice(), &["unrelated.net"]);
    }

    #[test]
    fn test_purge_over_empty_registry() {
        let bus = Rc::new(ObserverBus::new());
        let purger = DomainPurger::new(bus, StoreRegistry::in_memory());

        let report = purger.purge("example.com");

        assert!(report.is_complete());
        assert_eq!(report.removed_total(), 0);
        assert_eq!(report.domain, "example.com");
        assert_eq!(report.outcomes.len(), Category::ALL.len());
    }

    #[test]
    fn test_report_counts() {
        let f = fixture();
        let report = f.purger.purge("example.com");

        let removed_for = |category: Category| {
            report
                .outcomes
                .iter()
                .find(|o| o.category == category)
                .unwrap()
                .removed
        };
        assert_eq!(removed_for(Category::History), 3);
        assert_eq!(removed_for(Category::Cookies), 2);
        assert_eq!(removed_for(Category::Downloads), 1);
        assert_eq!(removed_for(Category::Logins), 1);
        assert_eq!(removed_for(Category::Permissions), 1);
        assert_eq!(removed_for(Category::ContentPrefs), 2);
    }
}
