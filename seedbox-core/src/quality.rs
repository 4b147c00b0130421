//! Quality tier extraction and ordering.
//!
//! A tier is inferred from the entry's quality description line (the second
//! line of the entry name): a `<digits>p` resolution token when present,
//! otherwise marker equivalences (`8K`, `4K`/`UHD`), otherwise externally
//! supplied cam/other patterns, otherwise the raw description text.

use std::cmp::Ordering;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use smol_str::SmolStr;

use crate::entry::StreamEntry;

static RESOLUTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)p").expect("invalid resolution pattern"));

static EIGHT_K: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)8k").expect("invalid 8k pattern"));

static FOUR_K: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)4k|uhd").expect("invalid 4k pattern"));

/// A named quality pattern, e.g. the `cam` exclusion group.
#[derive(Debug, Clone)]
pub struct QualityOption {
    /// Display label doubling as the tier key.
    pub label: SmolStr,
    /// Pattern matched against the quality description line.
    pub pattern: Regex,
}

/// Externally supplied low-priority quality patterns.
///
/// These are a capability object: the service consumes whatever patterns the
/// host configuration exposes. The defaults cover common release markers.
#[derive(Debug, Clone)]
pub struct QualityPatterns {
    /// Camera-sourced releases.
    pub cam: QualityOption,
    /// Everything else that is recognizably low quality.
    pub other: QualityOption,
}

impl Default for QualityPatterns {
    fn default() -> Self {
        Self {
            cam: QualityOption {
                label: SmolStr::new_static("Cam"),
                pattern: Regex::new(r"(?i)\b(cam|camrip|hdcam|hdts|telesync|telecine|ts|tc)\b")
                    .expect("invalid cam pattern"),
            },
            other: QualityOption {
                label: SmolStr::new_static("Other"),
                pattern: Regex::new(r"(?i)\b(screener|scr|dvdscr|r5|vhs|workprint)\b")
                    .expect("invalid other pattern"),
            },
        }
    }
}

/// A quality tier key.
///
/// The derived/implemented ordering is the serving order: sorting tiers
/// ascending yields higher resolutions first, any resolution before any
/// label, and labels alphabetically among themselves.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QualityTier {
    /// A numeric resolution in lines, e.g. `Resolution(1080)` for 1080p.
    Resolution(u32),
    /// A fallback label tier (cam/other/raw description).
    Label(SmolStr),
}

impl Ord for QualityTier {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            // Higher resolution serves first.
            (QualityTier::Resolution(a), QualityTier::Resolution(b)) => b.cmp(a),
            (QualityTier::Resolution(_), QualityTier::Label(_)) => Ordering::Less,
            (QualityTier::Label(_), QualityTier::Resolution(_)) => Ordering::Greater,
            (QualityTier::Label(a), QualityTier::Label(b)) => a.cmp(b),
        }
    }
}

impl PartialOrd for QualityTier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for QualityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QualityTier::Resolution(lines) => write!(f, "{lines}p"),
            QualityTier::Label(label) => write!(f, "{label}"),
        }
    }
}

impl QualityTier {
    /// Infers the tier of a stream entry.
    pub fn of(entry: &StreamEntry, patterns: &QualityPatterns) -> Self {
        let description = entry.quality_line().unwrap_or("");
        if let Some(captures) = RESOLUTION.captures(description)
            && let Ok(lines) = captures[1].parse()
        {
            QualityTier::Resolution(lines)
        } else if EIGHT_K.is_match(description) {
            QualityTier::Resolution(4320)
        } else if FOUR_K.is_match(description) {
            QualityTier::Resolution(2160)
        } else if patterns.cam.pattern.is_match(description) {
            QualityTier::Label(patterns.cam.label.clone())
        } else if patterns.other.pattern.is_match(description) {
            QualityTier::Label(patterns.other.label.clone())
        } else {
            QualityTier::Label(SmolStr::new(description))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(quality_line: &str) -> StreamEntry {
        StreamEntry::new(format!("Seedbox\n{quality_line}"), "t", "u")
    }

    fn tier(quality_line: &str) -> QualityTier {
        QualityTier::of(&entry(quality_line), &QualityPatterns::default())
    }

    #[test]
    fn parses_resolution_tokens() {
        assert_eq!(tier("1080p BluRay"), QualityTier::Resolution(1080));
        assert_eq!(tier("720p"), QualityTier::Resolution(720));
    }

    #[test]
    fn marker_equivalences() {
        assert_eq!(tier("8K HDR"), QualityTier::Resolution(4320));
        assert_eq!(tier("4K remux"), QualityTier::Resolution(2160));
        assert_eq!(tier("UHD disc"), QualityTier::Resolution(2160));
    }

    #[test]
    fn pattern_fallbacks() {
        assert_eq!(tier("HDCAM rip"), QualityTier::Label("Cam".into()));
        assert_eq!(tier("dvdscr copy"), QualityTier::Label("Other".into()));
        assert_eq!(tier("WEBRip"), QualityTier::Label("WEBRip".into()));
    }

    #[test]
    fn missing_quality_line_yields_empty_label() {
        let entry = StreamEntry::new("Seedbox", "t", "u");
        assert_eq!(
            QualityTier::of(&entry, &QualityPatterns::default()),
            QualityTier::Label("".into())
        );
    }

    #[test]
    fn serving_order() {
        let mut tiers = vec![
            QualityTier::Label("Cam".into()),
            QualityTier::Resolution(720),
            QualityTier::Label("AVC".into()),
            QualityTier::Resolution(2160),
            QualityTier::Resolution(1080),
        ];
        tiers.sort();
        assert_eq!(
            tiers,
            vec![
                QualityTier::Resolution(2160),
                QualityTier::Resolution(1080),
                QualityTier::Resolution(720),
                QualityTier::Label("AVC".into()),
                QualityTier::Label("Cam".into()),
            ]
        );
    }

    #[test]
    fn four_k_ranks_between_1080_and_8k() {
        assert!(QualityTier::Resolution(4320) < QualityTier::Resolution(2160));
        assert!(QualityTier::Resolution(2160) < QualityTier::Resolution(1080));
    }
}
