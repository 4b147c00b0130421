//! Generic stream entries.
//!
//! A [`StreamEntry`] is the pre-personalization unit stored in the cache:
//! one candidate, already decorated for display, with the original numeric
//! seeder count and size carried alongside. The decorated text is formatted
//! exactly once, here, at the boundary where a candidate becomes an entry.
//!
//! The numeric fields are the primary data path for sorting. Entries built
//! from bare display text (for example by an out-of-process producer) fall
//! back to re-parsing the decorated title; that path is a compatibility shim,
//! kept narrow on purpose.

use std::sync::LazyLock;

use regex::Regex;

use crate::candidate::Candidate;
use crate::languages::language_label;

/// Placeholder URL marking an entry whose resolution failed upstream.
///
/// A result consisting entirely of these placeholders is never cached
/// (see [`CacheParams::for_streams`](crate::CacheParams::for_streams)).
pub const FAILED_ACCESS: &str = "static://failed-access";

static SEEDERS_TEXT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"👤 (\d+)").expect("invalid seeders pattern"));

static SIZE_TEXT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"💾 ([\d.,]+ \w+)").expect("invalid size pattern"));

/// A display-ready stream entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamEntry {
    /// Addon name plus quality line, e.g. `"Seedbox\n1080p"`.
    pub name: String,
    /// Decorated display title. Embeds the seeder count and size as
    /// icon-prefixed text, plus language labels when present.
    pub title: String,
    /// Resolved URL or placeholder.
    pub url: String,
    seeders: Option<u32>,
    size: Option<u64>,
}

impl StreamEntry {
    /// Builds an entry from bare display text.
    ///
    /// Numeric fields are recovered lazily from the decorated title.
    pub fn new(
        name: impl Into<String>,
        title: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            title: title.into(),
            url: url.into(),
            seeders: None,
            size: None,
        }
    }

    /// Builds an entry from a candidate, decorating the display text once.
    pub fn from_candidate(candidate: &Candidate) -> Self {
        let name = match &candidate.resolution {
            Some(resolution) => format!("Seedbox\n{resolution}"),
            None => "Seedbox".to_string(),
        };
        let mut title = format!(
            "{}\n👤 {} 💾 {} ⚙️ {}",
            candidate.title,
            candidate.seeders,
            format_size(candidate.size.unwrap_or(0)),
            candidate.provider,
        );
        let labels: Vec<&str> = candidate
            .languages
            .iter()
            .filter_map(|tag| language_label(tag))
            .collect();
        if !labels.is_empty() {
            title.push('\n');
            title.push_str(&labels.join(" / "));
        }
        let url = match candidate.file_index {
            Some(index) => format!("magnet:?xt=urn:btih:{}&dn={index}", candidate.info_hash),
            None => format!("magnet:?xt=urn:btih:{}", candidate.info_hash),
        };
        Self {
            name,
            title,
            url,
            seeders: Some(candidate.seeders),
            size: candidate.size,
        }
    }

    /// Seeder count: the carried value, or the decorated-title shim.
    pub fn seeder_count(&self) -> u32 {
        self.seeders.unwrap_or_else(|| extract_seeders(&self.title))
    }

    /// Size in bytes: the carried value, or the decorated-title shim.
    pub fn size_bytes(&self) -> u64 {
        self.size.unwrap_or_else(|| extract_size(&self.title))
    }

    /// The quality description line (second line of the entry name).
    pub fn quality_line(&self) -> Option<&str> {
        self.name.lines().nth(1)
    }

    /// Whether this entry is the failed-access placeholder.
    pub fn is_failed_access(&self) -> bool {
        self.url == FAILED_ACCESS
    }
}

/// Recovers a seeder count from decorated title text.
pub(crate) fn extract_seeders(title: &str) -> u32 {
    SEEDERS_TEXT
        .captures(title)
        .and_then(|captures| captures[1].parse().ok())
        .unwrap_or(0)
}

/// Recovers a size in bytes from decorated title text.
pub(crate) fn extract_size(title: &str) -> u64 {
    SIZE_TEXT
        .captures(title)
        .map(|captures| parse_size(&captures[1]))
        .unwrap_or(0)
}

/// Parses a human-readable size (`"1.5 GB"`) into bytes.
///
/// Units are binary multiples; an unrecognized unit means a scale of 1.
pub(crate) fn parse_size(text: &str) -> u64 {
    let scale: u64 = if text.contains("TB") {
        1024 * 1024 * 1024 * 1024
    } else if text.contains("GB") {
        1024 * 1024 * 1024
    } else if text.contains("MB") {
        1024 * 1024
    } else if text.contains("kB") {
        1024
    } else {
        1
    };
    let number: f64 = text
        .split_whitespace()
        .next()
        .map(|n| n.replace(',', ""))
        .and_then(|n| n.parse().ok())
        .unwrap_or(0.0);
    (number * scale as f64) as u64
}

fn format_size(bytes: u64) -> String {
    const UNITS: [(&str, u64); 4] = [
        ("TB", 1024 * 1024 * 1024 * 1024),
        ("GB", 1024 * 1024 * 1024),
        ("MB", 1024 * 1024),
        ("kB", 1024),
    ];
    for (unit, scale) in UNITS {
        if bytes >= scale {
            return format!("{:.2} {unit}", bytes as f64 / scale as f64);
        }
    }
    format!("{bytes} B")
}
