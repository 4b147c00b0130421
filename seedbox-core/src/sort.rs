//! The ranking pipeline.
//!
//! A sequence of pure transforms over an immutable entry list:
//!
//! 1. base order (seeders desc, upload date desc) — applied to candidates
//!    before they become entries;
//! 2. language partition (matching entries first, each partition ranked
//!    independently);
//! 3. seeder-health gating;
//! 4. final sort mode with per-tier or overall limits.
//!
//! Every stage preserves the relative order of entries it does not move, so
//! the repository's seeder ordering flows through untouched wherever a stage
//! declines to re-sort.

use serde::Deserialize;
use smol_str::SmolStr;

use crate::candidate::{Candidate, ContentType};
use crate::entry::StreamEntry;
use crate::languages::contains_language;
use crate::quality::{QualityPatterns, QualityTier};

/// Seeder count at which an entry counts as healthy.
pub const HEALTHY_SEEDERS: u32 = 5;
/// Seeder count at which an entry counts as seeded at all.
pub const SEEDED_SEEDERS: u32 = 1;
/// Healthy entries required to serve the healthy subset alone.
pub const MIN_HEALTHY_COUNT: usize = 50;
/// Entries served when nothing is adequately seeded.
pub const MAX_UNHEALTHY_COUNT: usize = 5;

/// Final sort mode for a request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    /// Group by quality tier, keep seeder order within tiers.
    #[default]
    Quality,
    /// Group by quality tier, size-descending within tiers.
    QualitySize,
    /// Keep seeder order.
    Seeders,
    /// Size descending.
    Size,
}

impl SortMode {
    /// Parses a request parameter; unknown values fall back to the default.
    pub fn parse(raw: &str) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "qualitysize" => SortMode::QualitySize,
            "seeders" => SortMode::Seeders,
            "size" => SortMode::Size,
            _ => SortMode::Quality,
        }
    }
}

/// Per-request personalization.
///
/// Never part of the cache key: options only filter and reorder the cached
/// generic result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOptions {
    /// Final sort mode.
    pub sort: SortMode,
    /// Result limit; applied per tier for quality modes, overall otherwise.
    pub limit: Option<usize>,
    /// Preferred languages, in preference order.
    pub languages: Vec<SmolStr>,
    /// Whether a debrid/moch service is configured for this request.
    pub moch_configured: bool,
}

/// Applies the base order: seeders descending, ties by upload date
/// descending.
pub fn apply_base_order(candidates: &mut [Candidate]) {
    candidates.sort_by(|a, b| {
        b.seeders
            .cmp(&a.seeders)
            .then(b.upload_date.cmp(&a.upload_date))
    });
}

/// Ranks a base-ordered entry list for one request.
pub fn rank_streams(
    streams: Vec<StreamEntry>,
    options: &RequestOptions,
    content_type: ContentType,
    patterns: &QualityPatterns,
) -> Vec<StreamEntry> {
    // The first preference being english skips partitioning entirely:
    // english presence cannot be reliably detected from title text.
    let partition_languages = match options.languages.first() {
        Some(first) if first != "english" => options.languages.as_slice(),
        _ => &[],
    };
    if partition_languages.is_empty() {
        return rank_partition(streams, options, content_type, patterns);
    }
    let (matching, non_matching): (Vec<_>, Vec<_>) = streams
        .into_iter()
        .partition(|stream| contains_language(stream, partition_languages));
    let mut ranked = rank_partition(matching, options, content_type, patterns);
    ranked.extend(rank_partition(non_matching, options, content_type, patterns));
    ranked
}

fn rank_partition(
    streams: Vec<StreamEntry>,
    options: &RequestOptions,
    content_type: ContentType,
    patterns: &QualityPatterns,
) -> Vec<StreamEntry> {
    let gated = gate_by_seeders(streams, content_type, options.moch_configured);
    match options.sort {
        SortMode::Seeders => truncated(gated, options.limit),
        SortMode::Size => sort_by_size(gated, options.limit),
        SortMode::Quality => sort_by_quality(gated, false, options.limit, patterns),
        SortMode::QualitySize => sort_by_quality(gated, true, options.limit, patterns),
    }
}

/// Seeder-health gating.
///
/// Prefers well-seeded entries when they are plentiful, and guarantees a
/// non-empty result when data is scarce. Entries keep their base order.
fn gate_by_seeders(
    streams: Vec<StreamEntry>,
    content_type: ContentType,
    moch_configured: bool,
) -> Vec<StreamEntry> {
    // Series lookups through a debrid service play any entry, seeded or not.
    if content_type == ContentType::Series && moch_configured {
        return streams;
    }
    let healthy = streams
        .iter()
        .filter(|stream| stream.seeder_count() >= HEALTHY_SEEDERS)
        .count();
    if healthy >= MIN_HEALTHY_COUNT {
        return streams
            .into_iter()
            .filter(|stream| stream.seeder_count() >= HEALTHY_SEEDERS)
            .collect();
    }
    let seeded = streams
        .iter()
        .filter(|stream| stream.seeder_count() >= SEEDED_SEEDERS)
        .count();
    if seeded >= MAX_UNHEALTHY_COUNT {
        return streams
            .into_iter()
            .filter(|stream| stream.seeder_count() >= SEEDED_SEEDERS)
            .take(MIN_HEALTHY_COUNT)
            .collect();
    }
    truncated(streams, Some(MAX_UNHEALTHY_COUNT))
}

fn sort_by_size(mut streams: Vec<StreamEntry>, limit: Option<usize>) -> Vec<StreamEntry> {
    // Stable sort: equal sizes keep seeder order.
    streams.sort_by(|a, b| b.size_bytes().cmp(&a.size_bytes()));
    truncated(streams, limit)
}

/// Groups entries by quality tier and concatenates tiers in serving order.
///
/// The limit applies to each tier's slice independently.
fn sort_by_quality(
    streams: Vec<StreamEntry>,
    by_size: bool,
    limit: Option<usize>,
    patterns: &QualityPatterns,
) -> Vec<StreamEntry> {
    let mut tiers: Vec<(QualityTier, Vec<StreamEntry>)> = Vec::new();
    for stream in streams {
        let tier = QualityTier::of(&stream, patterns);
        match tiers.iter_mut().find(|(key, _)| *key == tier) {
            Some((_, bucket)) => bucket.push(stream),
            None => tiers.push((tier, vec![stream])),
        }
    }
    tiers.sort_by(|(a, _), (b, _)| a.cmp(b));
    tiers
        .into_iter()
        .flat_map(|(_, bucket)| {
            if by_size {
                sort_by_size(bucket, limit)
            } else {
                truncated(bucket, limit)
            }
        })
        .collect()
}

fn truncated(mut streams: Vec<StreamEntry>, limit: Option<usize>) -> Vec<StreamEntry> {
    if let Some(limit) = limit {
        streams.truncate(limit);
    }
    streams
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn entry(seeders: u32, quality: &str, size_gb: f64) -> StreamEntry {
        StreamEntry::new(
            format!("Seedbox\n{quality}"),
            format!("title {seeders}\n👤 {seeders} 💾 {size_gb} GB"),
            "u",
        )
    }

    fn seeder_counts(streams: &[StreamEntry]) -> Vec<u32> {
        streams.iter().map(|s| s.seeder_count()).collect()
    }

    #[test]
    fn base_order_sorts_by_seeders_then_upload_date() {
        let now = Utc::now();
        let mut candidates: Vec<Candidate> = [(5, 0i64), (9, 0), (5, 60), (1, 0)]
            .iter()
            .map(|&(seeders, age)| Candidate {
                info_hash: "h".into(),
                provider: "p".into(),
                title: "t".into(),
                size: None,
                upload_date: now - Duration::seconds(age),
                seeders,
                languages: vec![],
                resolution: None,
                file_index: None,
            })
            .collect();
        apply_base_order(&mut candidates);
        let order: Vec<(u32, bool)> = candidates
            .iter()
            .map(|c| (c.seeders, c.upload_date == now))
            .collect();
        // Seeders desc, then newer upload first for the 5-seeder tie.
        assert_eq!(order, vec![(9, true), (5, true), (5, false), (1, true)]);
    }

    #[test]
    fn healthy_branch_keeps_all_healthy_entries() {
        let streams: Vec<_> = (0..60).map(|i| entry(5 + i, "1080p", 1.0)).collect();
        let ranked = rank_streams(
            streams,
            &RequestOptions { sort: SortMode::Seeders, ..Default::default() },
            ContentType::Movie,
            &QualityPatterns::default(),
        );
        assert_eq!(ranked.len(), 60);
    }

    #[test]
    fn seeded_branch_keeps_all_seeded_when_under_cap() {
        let mut streams: Vec<_> = (0..3).map(|_| entry(7, "1080p", 1.0)).collect();
        streams.extend((0..6).map(|_| entry(2, "1080p", 1.0)));
        streams.push(entry(0, "1080p", 1.0));
        let ranked = rank_streams(
            streams,
            &RequestOptions { sort: SortMode::Seeders, ..Default::default() },
            ContentType::Movie,
            &QualityPatterns::default(),
        );
        // 3 healthy < 50, 9 seeded >= 5: every seeded entry survives, the
        // zero-seeder one does not.
        assert_eq!(ranked.len(), 9);
        assert!(ranked.iter().all(|s| s.seeder_count() >= SEEDED_SEEDERS));
    }

    #[test]
    fn unseeded_fallback_keeps_first_five() {
        let streams: Vec<_> = (0..10).map(|_| entry(0, "1080p", 1.0)).collect();
        let ranked = rank_streams(
            streams,
            &RequestOptions { sort: SortMode::Seeders, ..Default::default() },
            ContentType::Movie,
            &QualityPatterns::default(),
        );
        assert_eq!(ranked.len(), MAX_UNHEALTHY_COUNT);
    }

    #[test]
    fn series_with_moch_skips_gating() {
        let streams: Vec<_> = (0..10).map(|_| entry(0, "1080p", 1.0)).collect();
        let ranked = rank_streams(
            streams,
            &RequestOptions {
                sort: SortMode::Seeders,
                moch_configured: true,
                ..Default::default()
            },
            ContentType::Series,
            &QualityPatterns::default(),
        );
        assert_eq!(ranked.len(), 10);
    }

    #[test]
    fn movie_with_moch_still_gates() {
        let streams: Vec<_> = (0..10).map(|_| entry(0, "1080p", 1.0)).collect();
        let ranked = rank_streams(
            streams,
            &RequestOptions {
                sort: SortMode::Seeders,
                moch_configured: true,
                ..Default::default()
            },
            ContentType::Movie,
            &QualityPatterns::default(),
        );
        assert_eq!(ranked.len(), MAX_UNHEALTHY_COUNT);
    }

    #[test]
    fn size_mode_sorts_descending_with_overall_limit() {
        let streams = vec![
            entry(50, "1080p", 1.0),
            entry(40, "1080p", 8.0),
            entry(30, "1080p", 4.0),
        ];
        let ranked = rank_streams(
            streams,
            &RequestOptions {
                sort: SortMode::Size,
                limit: Some(2),
                ..Default::default()
            },
            ContentType::Movie,
            &QualityPatterns::default(),
        );
        assert_eq!(seeder_counts(&ranked), vec![40, 30]);
    }

    #[test]
    fn quality_mode_orders_tiers_and_limits_each() {
        let streams = vec![
            entry(90, "720p", 1.0),
            entry(80, "1080p", 1.0),
            entry(70, "720p", 1.0),
            entry(60, "1080p", 1.0),
            entry(50, "1080p", 1.0),
        ];
        let ranked = rank_streams(
            streams,
            &RequestOptions { limit: Some(2), ..Default::default() },
            ContentType::Movie,
            &QualityPatterns::default(),
        );
        // 1080p tier first, two per tier, seeder order preserved inside.
        assert_eq!(seeder_counts(&ranked), vec![80, 60, 90, 70]);
    }

    #[test]
    fn qualitysize_mode_sorts_within_tiers_by_size() {
        let streams = vec![
            entry(90, "1080p", 1.0),
            entry(80, "1080p", 6.0),
            entry(70, "720p", 9.0),
        ];
        let ranked = rank_streams(
            streams,
            &RequestOptions { sort: SortMode::QualitySize, ..Default::default() },
            ContentType::Movie,
            &QualityPatterns::default(),
        );
        assert_eq!(seeder_counts(&ranked), vec![80, 90, 70]);
    }

    #[test]
    fn resolution_tiers_rank_before_label_tiers() {
        let streams = vec![entry(90, "HDCAM", 1.0), entry(80, "720p", 1.0)];
        let ranked = rank_streams(
            streams,
            &RequestOptions::default(),
            ContentType::Movie,
            &QualityPatterns::default(),
        );
        assert_eq!(seeder_counts(&ranked), vec![80, 90]);
    }

    #[test]
    fn preferred_language_partition_ranks_first() {
        let mut streams = vec![
            entry(90, "1080p", 1.0),
            entry(80, "1080p", 1.0),
        ];
        let mut tagged = entry(10, "720p", 1.0);
        tagged.title.push_str("\n🇯🇵");
        streams.push(tagged);
        let ranked = rank_streams(
            streams,
            &RequestOptions {
                languages: vec!["japanese".into()],
                ..Default::default()
            },
            ContentType::Movie,
            &QualityPatterns::default(),
        );
        // The matching partition serves whole, before better-seeded entries.
        assert_eq!(seeder_counts(&ranked), vec![10, 90, 80]);
    }

    #[test]
    fn english_first_preference_disables_partitioning() {
        let mut flagged = entry(10, "720p", 1.0);
        flagged.title.push_str("\n🇬🇧");
        let streams = vec![entry(90, "1080p", 1.0), flagged];
        let ranked = rank_streams(
            streams,
            &RequestOptions {
                languages: vec!["english".into()],
                ..Default::default()
            },
            ContentType::Movie,
            &QualityPatterns::default(),
        );
        assert_eq!(seeder_counts(&ranked), vec![90, 10]);
    }

    #[test]
    fn sort_mode_parsing_is_case_insensitive_with_default_fallback() {
        assert_eq!(SortMode::parse("SEEDERS"), SortMode::Seeders);
        assert_eq!(SortMode::parse("qualitysize"), SortMode::QualitySize);
        assert_eq!(SortMode::parse("size"), SortMode::Size);
        assert_eq!(SortMode::parse("nonsense"), SortMode::Quality);
    }
}
