// ── Target WLAN discovery ──
//
// On a first run there is no cached WLAN id. The target is found by name,
// trying an ordered list of strategies against a single WLAN listing.

use std::fmt;

use crate::controller::WlanRecord;
use crate::error::RotationError;

/// One way of recognising the target WLAN.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscoveryStrategy {
    /// The configured seed name the WLAN carried before rotation began.
    Seed(String),
    /// An entry of the active rotation, for a WLAN already mid-cycle.
    ActiveName { index: usize, name: String },
}

impl DiscoveryStrategy {
    pub fn name(&self) -> &str {
        match self {
            Self::Seed(name) | Self::ActiveName { name, .. } => name,
        }
    }
}

impl fmt::Display for DiscoveryStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Seed(name) => write!(f, "seed SSID '{name}'"),
            Self::ActiveName { index, name } => write!(f, "active[{index}] '{name}'"),
        }
    }
}

/// Ordered strategies: the seed first (if any), then each active name.
pub fn plan(seed: Option<&str>, active: &[String]) -> Vec<DiscoveryStrategy> {
    seed.map(|s| DiscoveryStrategy::Seed(s.to_owned()))
        .into_iter()
        .chain(
            active
                .iter()
                .enumerate()
                .map(|(index, name)| DiscoveryStrategy::ActiveName {
                    index,
                    name: name.clone(),
                }),
        )
        .collect()
}

/// Apply `strategies` in order to `wlans`; the first strategy with a
/// matching WLAN wins.
///
/// Fails with `TargetNotFound` naming every strategy tried and every WLAN
/// the controller reported.
pub fn resolve<'a>(
    strategies: &'a [DiscoveryStrategy],
    wlans: &'a [WlanRecord],
) -> Result<(&'a WlanRecord, &'a DiscoveryStrategy), RotationError> {
    strategies
        .iter()
        .find_map(|s| wlans.iter().find(|w| w.name == s.name()).map(|w| (w, s)))
        .ok_or_else(|| RotationError::TargetNotFound {
            tried: dedup(strategies.iter().map(DiscoveryStrategy::name)),
            available: wlans.iter().map(|w| w.name.clone()).collect(),
        })
}

fn dedup<'s>(names: impl Iterator<Item = &'s str>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for name in names {
        if !out.iter().any(|n| n == name) {
            out.push(name.to_owned());
        }
    }
    out
}
