//! Server software detection
//!
//! Misskey and its forks answer the same `meta` call; the product name or
//! repository URL is the only reliable way to tell them apart.

use crate::fedi::types::MetaInfo;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Server implementation behind the API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SoftwareVariant {
    Misskey,
    Calckey,
    Firefish,
    Sharkey,
    Foundkey,
    Unknown,
}

/// Fork identifiers, most specific first. Anything else is treated as Misskey.
const FORK_MARKERS: [(&str, SoftwareVariant); 4] = [
    ("sharkey", SoftwareVariant::Sharkey),
    ("calckey", SoftwareVariant::Calckey),
    ("firefish", SoftwareVariant::Firefish),
    ("foundkey", SoftwareVariant::Foundkey),
];

impl SoftwareVariant {
    pub const ALL: [SoftwareVariant; 6] = [
        SoftwareVariant::Misskey,
        SoftwareVariant::Calckey,
        SoftwareVariant::Firefish,
        SoftwareVariant::Sharkey,
        SoftwareVariant::Foundkey,
        SoftwareVariant::Unknown,
    ];

    /// Label value used in the `software` metric label
    pub fn as_str(&self) -> &'static str {
        match self {
            SoftwareVariant::Misskey => "misskey",
            SoftwareVariant::Calckey => "calckey",
            SoftwareVariant::Firefish => "firefish",
            SoftwareVariant::Sharkey => "sharkey",
            SoftwareVariant::Foundkey => "foundkey",
            SoftwareVariant::Unknown => "unknown",
        }
    }
}

impl fmt::Display for SoftwareVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify the server from its `meta` response.
///
/// Both `name` and `repositoryUrl` are matched case-insensitively; a missing
/// field counts as the empty string. Never returns [`SoftwareVariant::Unknown`].
pub fn detect(meta: &MetaInfo) -> SoftwareVariant {
    let name = meta.name.as_deref().unwrap_or_default().to_lowercase();
    let repo = meta
        .repository_url
        .as_deref()
        .unwrap_or_default()
        .to_lowercase();

    FORK_MARKERS
        .iter()
        .find(|(marker, _)| repo.contains(marker) || name.contains(marker))
        .map(|(_, variant)| *variant)
        .unwrap_or(SoftwareVariant::Misskey)
}
