//! # SuriVeil — Moteur de navigation privée
//!
//! Sous-système privacy d'un navigateur : coordination du mode privé et
//! purge des données par domaine, orchestrées au-dessus de services hôtes
//! injectés par traits (session, préférences, cookies, téléchargements…).
//! Le crate ne possède aucun de ces services — il ne fait que séquencer
//! leurs appels et diffuser les notifications correspondantes.
//!
//! ## Architecture des modules
//!
//! - [`mode`] : Coordinateur de transition du mode privé — garde de
//!   réentrance, vote d'annulation des observateurs, sauvegarde/restauration
//!   de la session via le service hôte.
//!
//! - [`purge`] : Purge des données stockées pour un domaine racine, une
//!   catégorie de stockage à la fois, avec agrégation des échecs par
//!   catégorie.
//!
//! - [`domain`] : Prédicat de correspondance de domaine racine partagé par
//!   toutes les catégories balayées.
//!
//! - [`observers`] : Bus de notifications par topic — enregistrement,
//!   publication avec drapeau booléen partagé (veto / bit "quitting").
//!
//! - [`session`] : Seam du service de persistance de session ; blobs
//!   opaques, états de transition `about:blank` / `about:private`.
//!
//! - [`stores`] : Seams des magasins par domaine (historique, cache,
//!   cookies, téléchargements, identifiants, permissions, préférences de
//!   contenu).
//!
//! - [`prefs`] : Seam du service de préférences et clés consommées par le
//!   coordinateur.
//!
//! - [`memory`] : Implémentations en mémoire de tous les seams — doubles de
//!   test et backend par défaut pour les intégrateurs.
//!
//! - [`config`] : Configuration TOML (autostart, conservation de session).

pub mod config;
pub mod domain;
pub mod memory;
pub mod mode;
pub mod observers;
pub mod prefs;
pub mod purge;
pub mod session;
pub mod stores;
