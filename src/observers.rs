//! Bus de notifications par sujet (topic).
//!
//! Version minimaliste du service d'observateurs d'un navigateur : on
//! s'enregistre par topic, on publie avec un drapeau booléen partagé
//! optionnel et une chaîne de données. Le drapeau sert de vote d'annulation
//! (un observateur le lève pour opposer son veto) ou de bit "quitting"
//! pendant les notifications de changement de mode.
//!
//! Le bus est mono-thread (`Rc`, `RefCell`), aligné sur la boucle
//! d'événements de l'hôte.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use tracing::debug;

/// Topic du vote d'annulation précédant un changement de mode.
/// Data: `"enter"` ou `"exit"`. Subject: drapeau de veto.
pub const TOPIC_CANCEL_VOTE: &str = "private-mode-cancel-vote";

/// Topic émis une fois le changement de mode accordé (après le vote,
/// avant les opérations de session). Subject: drapeau "quitting".
pub const TOPIC_CHANGE_GRANTED: &str = "private-mode-change-granted";

/// Topic du changement de mode effectif. Data: `"enter"` ou `"exit"`.
pub const TOPIC_MODE_CHANGED: &str = "private-mode";

/// Topic émis après une purge complète des données d'un domaine.
/// Data: le domaine purgé.
pub const TOPIC_PURGE_DOMAIN_DATA: &str = "purge-domain-data";

/// Topic émis quand la purge a retiré des téléchargements, pour que
/// l'UI de la liste puisse se rafraîchir.
pub const TOPIC_DOWNLOAD_REMOVED: &str = "download-removed";

/// Shared mutable boolean passed as the subject of a notification.
///
/// Observers flip it to cast a cancel vote; the coordinator also uses it
/// to expose its `quitting` bit during mode-change notifications.
#[derive(Debug, Default)]
pub struct BoolFlag(Cell<bool>);

impl BoolFlag {
    pub fn new(value: bool) -> Self {
        BoolFlag(Cell::new(value))
    }

    pub fn get(&self) -> bool {
        self.0.get()
    }

    pub fn set(&self, value: bool) {
        self.0.set(value);
    }
}

/// Récepteur de notifications. Enregistré par topic sur le [`ObserverBus`].
pub trait Observer {
    fn observe(&self, topic: &str, subject: Option<&BoolFlag>, data: &str);
}

/// Topic-keyed observer registry.
///
/// Dispatch walks a snapshot of the registration list, so an observer may
/// register or unregister (itself included) from within its callback.
#[derive(Default)]
pub struct ObserverBus {
    observers: RefCell<HashMap<String, Vec<Rc<dyn Observer>>>>,
}

impl ObserverBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an observer for a topic. The same observer may be
    /// registered for several topics.
    pub fn add_observer(&self, topic: &str, observer: Rc<dyn Observer>) {
        self.observers
            .borrow_mut()
            .entry(topic.to_string())
            .or_default()
            .push(observer);
    }

    /// Unregisters an observer from a topic, matched by pointer identity.
    /// Unknown observers are ignored.
    pub fn remove_observer(&self, topic: &str, observer: &Rc<dyn Observer>) {
        let mut map = self.observers.borrow_mut();
        if let Some(list) = map.get_mut(topic) {
            list.retain(|o| !Rc::ptr_eq(o, observer));
            if list.is_empty() {
                map.remove(topic);
            }
        }
    }

    /// Publishes a notification to every observer of `topic`.
    pub fn notify(&self, topic: &str, subject: Option<&BoolFlag>, data: &str) {
        // Snapshot before dispatch: callbacks may mutate the registry.
        let snapshot: Vec<Rc<dyn Observer>> = self
            .observers
            .borrow()
            .get(topic)
            .map(|list| list.to_vec())
            .unwrap_or_default();

        debug!(topic, data, observers = snapshot.len(), "notify");

        for observer in snapshot {
            observer.observe(topic, subject, data);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Recorder {
        seen: RefCell<Vec<(String, String)>>,
    }

    impl Recorder {
        fn new() -> Rc<Self> {
            Rc::new(Recorder {
                seen: RefCell::new(Vec::new()),
            })
        }
    }

    impl Observer for Recorder {
        fn observe(&self, topic: &str, _subject: Option<&BoolFlag>, data: &str) {
            self.seen
                .borrow_mut()
                .push((topic.to_string(), data.to_string()));
        }
    }

    #[test]
    fn test_notify_reaches_registered_observer() {
        let bus = ObserverBus::new();
        let rec = Recorder::new();
        bus.add_observer("some-topic", rec.clone());

        bus.notify("some-topic", None, "payload");

        assert_eq!(
            rec.seen.borrow().as_slice(),
            &[("some-topic".to_string(), "payload".to_string())]
        );
    }

    #[test]
    fn test_notify_other_topic_not_delivered() {
        let bus = ObserverBus::new();
        let rec = Recorder::new();
        bus.add_observer("topic-a", rec.clone());

        bus.notify("topic-b", None, "");

        assert!(rec.seen.borrow().is_empty());
    }

    #[test]
    fn test_remove_observer() {
        let bus = ObserverBus::new();
        let rec = Recorder::new();
        bus.add_observer("topic", rec.clone());
        let as_dyn: Rc<dyn Observer> = rec.clone();
        bus.remove_observer("topic", &as_dyn);

        bus.notify("topic", None, "");

        assert!(rec.seen.borrow().is_empty());
    }

    #[test]
    fn test_subject_flag_visible_to_observer() {
        struct Vetoer;
        impl Observer for Vetoer {
            fn observe(&self, _topic: &str, subject: Option<&BoolFlag>, _data: &str) {
                subject.unwrap().set(true);
            }
        }

        let bus = ObserverBus::new();
        bus.add_observer("vote", Rc::new(Vetoer));

        let flag = BoolFlag::default();
        bus.notify("vote", Some(&flag), "enter");
        assert!(flag.get());
    }

    #[test]
    fn test_observer_may_unregister_during_dispatch() {
        struct SelfRemover {
            bus: Rc<ObserverBus>,
            me: RefCell<Option<Rc<dyn Observer>>>,
            fired: Cell<u32>,
        }
        impl Observer for SelfRemover {
            fn observe(&self, topic: &str, _subject: Option<&BoolFlag>, _data: &str) {
                self.fired.set(self.fired.get() + 1);
                if let Some(me) = self.me.borrow_mut().take() {
                    self.bus.remove_observer(topic, &me);
                }
            }
        }

        let bus = Rc::new(ObserverBus::new());
        let obs = Rc::new(SelfRemover {
            bus: bus.clone(),
            me: RefCell::new(None),
            fired: Cell::new(0),
        });
        let as_dyn: Rc<dyn Observer> = obs.clone();
        *obs.me.borrow_mut() = Some(as_dyn.clone());
        bus.add_observer("once", as_dyn);

        bus.notify("once", None, "");
        bus.notify("once", None, "");

        assert_eq!(obs.fired.get(), 1);
    }
}
