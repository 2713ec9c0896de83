//! Prédicat de correspondance de domaine racine.
//!
//! Toutes les catégories de stockage balayées par la purge utilisent le même
//! test : une clé stockée appartient au domaine cible si elle lui est égale,
//! ou si elle se termine par le domaine précédé d'un `.` ou d'un `/`.
//! Jamais de correspondance par sous-chaîne — `notexample.com` ne doit pas
//! matcher `example.com`.

use url::Url;

/// Returns `true` if `domain` is the root domain of `candidate`.
///
/// `has_root_domain("www.mozilla.org", "mozilla.org")` is true;
/// the other way around it is false. An empty domain matches nothing —
/// including an empty candidate, so the degenerate equal-empty-strings
/// case is a non-match here even though it is string equality.
pub fn has_root_domain(candidate: &str, domain: &str) -> bool {
    if domain.is_empty() {
        return false;
    }
    if candidate == domain {
        return true;
    }
    // Suffix match only, with a dot or slash right before the suffix.
    if let Some(prefix) = candidate.strip_suffix(domain) {
        return prefix.ends_with('.') || prefix.ends_with('/');
    }
    false
}

/// Extracts the host of a URL string, if it has one.
///
/// Download records store their full source URL; the purge sweep matches
/// on the host component only.
pub fn host_of(url: &str) -> Option<String> {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_owned))
}
