//! Coordinateur de transition du mode privé.
//!
//! Sérialise toutes les tentatives de basculement du drapeau "privé" et
//! séquence les effets de bord requis :
//!
//! 1. Vote d'annulation (`private-mode-cancel-vote`) — tout observateur
//!    peut opposer son veto, la transition n'a alors pas lieu.
//! 2. Bascule du drapeau, puis `private-mode-change-granted`.
//! 3. Sauvegarde (entrée) ou restauration (sortie) de la session via le
//!    service hôte, avec une session `about:blank` intercalée pour une
//!    séparation nette entre sessions privée et non privée.
//! 4. `private-mode` puis chargement de la session d'arrivée.
//!
//! Deux états {Normal, Privé} ; les deux transitions passent par le point
//! de contrôle vetoable qui peut ramener à l'état d'origine. La réentrance
//! (un observateur rappelant `set_private` depuis son callback) est rejetée
//! avec [`ModeError::TransitionInProgress`], jamais mise en file.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use thiserror::Error;
use tracing::{error, info};

use crate::observers::{
    BoolFlag, ObserverBus, TOPIC_CANCEL_VOTE, TOPIC_CHANGE_GRANTED, TOPIC_MODE_CHANGED,
};
use crate::prefs::{PREF_AUTOSTART, PREF_KEEP_CURRENT_SESSION, PrefStore};
use crate::session::{SessionBlob, SessionStore};
use crate::stores::{AuthStore, StoreError};

/// Échec d'une demande de transition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModeError {
    /// A transition is already in flight (typically a reentrant call from
    /// an observer callback). The request was not queued; the caller may
    /// retry once the current transition has completed.
    #[error("a private-mode transition is already in progress")]
    TransitionInProgress,
}

/// Issue d'une demande de transition acceptée par le coordinateur.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeChange {
    /// Private mode is now active.
    Entered,
    /// Private mode is no longer active.
    Left,
    /// The requested mode was already the current one; nothing fired.
    Unchanged,
    /// An observer cancelled the transition; the mode is unchanged.
    Vetoed,
}

/// Clears the in-progress flag on every exit path, including panics in
/// observer callbacks.
struct TransitionScope<'a> {
    flag: &'a Cell<bool>,
}

impl<'a> TransitionScope<'a> {
    fn enter(flag: &'a Cell<bool>) -> Self {
        flag.set(true);
        TransitionScope { flag }
    }
}

impl Drop for TransitionScope<'_> {
    fn drop(&mut self) {
        self.flag.set(false);
    }
}

/// Single-instance coordinator owning the mode flag and its transitions.
///
/// Methods take `&self` (interior mutability) so observers holding an
/// `Rc` to the coordinator can attempt a reentrant call — and get the
/// reentrancy error instead of a second transition.
pub struct PrivateModeCoordinator {
    bus: Rc<ObserverBus>,
    session: Rc<dyn SessionStore>,
    prefs: Rc<dyn PrefStore>,
    auth: Rc<dyn AuthStore>,

    in_private: Cell<bool>,
    /// Non-private session snapshot, held while private mode is active.
    saved_state: RefCell<Option<SessionBlob>>,
    /// Set by [`shutdown`](Self::shutdown); exposed to observers as the
    /// subject of the mode-change notifications.
    quitting: Cell<bool>,
    /// Whether the current transition snapshots/replaces the session.
    save_session: Cell<bool>,
    /// True only while an autostart-driven enter is in flight.
    auto_start: Cell<bool>,
    auto_started: Cell<bool>,
    changing: Cell<bool>,
}

impl PrivateModeCoordinator {
    pub fn new(
        bus: Rc<ObserverBus>,
        session: Rc<dyn SessionStore>,
        prefs: Rc<dyn PrefStore>,
        auth: Rc<dyn AuthStore>,
    ) -> Self {
        PrivateModeCoordinator {
            bus,
            session,
            prefs,
            auth,
            in_private: Cell::new(false),
            saved_state: RefCell::new(None),
            quitting: Cell::new(false),
            save_session: Cell::new(true),
            auto_start: Cell::new(false),
            auto_started: Cell::new(false),
            changing: Cell::new(false),
        }
    }

    /// Current status of private mode.
    pub fn is_private(&self) -> bool {
        self.in_private.get()
    }

    /// Whether private mode was entered automatically at startup.
    pub fn auto_started(&self) -> bool {
        self.auto_started.get()
    }

    /// Enters or leaves private mode.
    ///
    /// Rejects reentrant calls with [`ModeError::TransitionInProgress`].
    /// A request for the current mode is a no-op (`Unchanged`): no
    /// notifications fire, no session operation happens. Otherwise the
    /// vetoable checkpoint runs first; on veto the mode stays put.
    ///
    /// Session-store failures during the side-effecting sequence are
    /// logged, not propagated — the mode flag keeps whatever state the
    /// sequence reached and the guard is always released.
    pub fn set_private(&self, enabled: bool) -> Result<ModeChange, ModeError> {
        if self.changing.get() {
            return Err(ModeError::TransitionInProgress);
        }
        let _scope = TransitionScope::enter(&self.changing);

        if enabled == self.in_private.get() {
            return Ok(ModeChange::Unchanged);
        }

        let data = if enabled { "enter" } else { "exit" };

        // Vetoable checkpoint. Any observer may cancel; a veto is a normal
        // negative outcome, not an error.
        let cancel = BoolFlag::default();
        self.bus.notify(TOPIC_CANCEL_VOTE, Some(&cancel), data);
        if cancel.get() {
            info!(transition = data, "private-mode transition vetoed");
            return Ok(ModeChange::Vetoed);
        }

        if !enabled {
            self.auto_started.set(false);
        }
        // Flag flips before any "changed" notification fires.
        self.in_private.set(enabled);

        if let Err(e) = self.run_transition(enabled, data) {
            // No rollback: the flag keeps the state the sequence reached.
            error!(
                transition = data,
                error = %e,
                "error while processing the private-mode change request"
            );
        }

        info!(private = enabled, "private-mode transition complete");
        Ok(if enabled {
            ModeChange::Entered
        } else {
            ModeChange::Left
        })
    }

    /// The side-effecting part of a transition, after the flag flip.
    fn run_transition(&self, enabled: bool, data: &str) -> Result<(), StoreError> {
        let quitting = BoolFlag::new(self.quitting.get());

        self.bus.notify(TOPIC_CHANGE_GRANTED, Some(&quitting), data);
        self.before_mode_change(enabled)?;
        self.clear_security_state(enabled)?;
        self.bus.notify(TOPIC_MODE_CHANGED, Some(&quitting), data);
        self.after_mode_change(enabled)
    }

    /// No auth token, HTTP auth session or open connection may outlive the
    /// boundary between the private and non-private sessions, in either
    /// direction. The error console is additionally cleared when leaving,
    /// so nothing logged privately remains readable afterwards.
    fn clear_security_state(&self, entering: bool) -> Result<(), StoreError> {
        self.auth.clear_auth_sessions()?;
        self.auth.drop_open_connections()?;
        if !entering {
            self.auth.clear_console()?;
        }
        Ok(())
    }

    /// Snapshots the session and loads the blank placeholder, so the
    /// transition point is state-clean. Skipped entirely when
    /// auto-starting: there is no session worth saving yet.
    fn before_mode_change(&self, entering: bool) -> Result<(), StoreError> {
        if self.auto_start.get() {
            self.save_session.set(false);
            return Ok(());
        }

        if entering {
            let keep = self
                .prefs
                .get_bool(PREF_KEEP_CURRENT_SESSION)
                .unwrap_or(false);
            self.save_session.set(!keep);

            if self.save_session.get() && self.saved_state.borrow().is_none() {
                let snapshot = self.session.state()?;
                *self.saved_state.borrow_mut() = Some(snapshot);
            }
        }

        if !self.quitting.get() && self.save_session.get() {
            self.session.set_state(&SessionBlob::blank())?;
        }
        Ok(())
    }

    /// Loads the destination session: the restored snapshot on exit, the
    /// private landing page on enter.
    fn after_mode_change(&self, entering: bool) -> Result<(), StoreError> {
        if self.auto_start.get() || !self.save_session.get() {
            return Ok(());
        }

        if entering {
            self.session.set_state(&SessionBlob::private_landing())
        } else if let Some(saved) = self.saved_state.borrow_mut().take() {
            self.session.set_state(&saved)
        } else {
            Ok(())
        }
    }

    /// Enters private mode at startup if the `privacy.autostart` pref is
    /// set. The session is left untouched: nothing to save that early.
    pub fn enter_on_startup(&self) -> Result<ModeChange, ModeError> {
        if !self.prefs.get_bool(PREF_AUTOSTART).unwrap_or(false) {
            return Ok(ModeChange::Unchanged);
        }

        self.auto_start.set(true);
        let result = self.set_private(true);
        self.auto_start.set(false);

        if result == Ok(ModeChange::Entered) {
            self.auto_started.set(true);
            info!("private mode auto-started");
        }
        result
    }

    /// Application shutdown: forces an exit from private mode so the
    /// saved non-private session becomes the state the host persists.
    /// Observers see the quitting bit as the notification subject.
    pub fn shutdown(&self) {
        self.quitting.set(true);
        if self.in_private.get()
            && let Err(e) = self.set_private(false)
        {
            error!(error = %e, "could not leave private mode during shutdown");
        }
    }
}
