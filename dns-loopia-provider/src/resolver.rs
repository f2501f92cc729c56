//! Zone resolution
//!
//! Maps a validation hostname such as `_acme-challenge.sub.example.com` onto
//! the zone registered with the provider (`example.com`) and the label
//! relative to it (`_acme-challenge.sub`).

use std::collections::HashSet;

use crate::error::ResolutionError;
use crate::providers::common::normalize_domain_name;
use crate::traits::ZoneLister;
use crate::types::ResolvedZone;

/// Candidate zones for `hostname`, most specific first.
///
/// The leftmost label is stripped repeatedly, so the hostname itself is never
/// a candidate: `_acme-challenge.sub.example.com` yields `sub.example.com`,
/// `example.com`, `com`.
pub fn base_domain_guesses(hostname: &str) -> Vec<String> {
    let name = normalize_domain_name(hostname);
    let labels: Vec<&str> = name.split('.').collect();
    (1..labels.len())
        .map(|i| labels[i..].join("."))
        .filter(|guess| !guess.is_empty())
        .collect()
}

/// `hostname` relative to `base_domain`.
///
/// `base_domain` must be a proper suffix of `hostname` preceded by a dot;
/// anything else is rejected instead of producing a mangled label. The
/// comparison ignores ASCII case and a trailing root dot, and the returned
/// label keeps the caller's casing.
pub fn calculate_subdomain(base_domain: &str, hostname: &str) -> Result<String, ResolutionError> {
    let not_a_suffix = || ResolutionError::NotASuffix {
        hostname: hostname.to_string(),
        base_domain: base_domain.to_string(),
    };

    let name = hostname.trim_end_matches('.');
    let base = base_domain.trim_end_matches('.');
    if base.is_empty() || name.len() <= base.len() + 1 {
        return Err(not_a_suffix());
    }

    let split = name.len() - base.len();
    let suffix = name.get(split..).ok_or_else(not_a_suffix)?;
    let head = name.get(..split).ok_or_else(not_a_suffix)?;

    match head.strip_suffix('.') {
        Some(subdomain) if !subdomain.is_empty() && suffix.eq_ignore_ascii_case(base) => {
            Ok(subdomain.to_string())
        }
        _ => Err(not_a_suffix()),
    }
}

/// Finds the registered zone owning a hostname.
///
/// Zones are fetched anew on every call; nothing is cached.
pub struct ZoneResolver<'a, L: ZoneLister + ?Sized> {
    lister: &'a L,
}

impl<'a, L: ZoneLister + ?Sized> ZoneResolver<'a, L> {
    /// Resolve against the zones listed by `lister`.
    pub fn new(lister: &'a L) -> Self {
        Self { lister }
    }

    /// Resolve `hostname` to its zone and relative subdomain label.
    pub async fn resolve(&self, hostname: &str) -> Result<ResolvedZone, ResolutionError> {
        let guesses = base_domain_guesses(hostname);
        let registered: HashSet<String> = self
            .lister
            .list_zone_names()
            .await?
            .iter()
            .map(|name| normalize_domain_name(name))
            .collect();

        let Some(base_domain) = guesses.iter().find(|guess| registered.contains(*guess)) else {
            return Err(ResolutionError::NoMatchingZone {
                hostname: hostname.to_string(),
                guesses,
            });
        };
        log::debug!("Found base domain for {hostname} using name {base_domain}");

        let subdomain = calculate_subdomain(base_domain, hostname)?;
        Ok(ResolvedZone {
            base_domain: base_domain.clone(),
            subdomain,
        })
    }
}
