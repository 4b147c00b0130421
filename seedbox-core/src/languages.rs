//! Language tag mapping.
//!
//! Maintains an ordered table from internal language tags to canonical
//! display labels. Canonical order is the table's declared order; it drives
//! both [`map_languages`] and the user-facing option list.
//!
//! Membership checks ([`contains_language`]) match the label (emoji or text)
//! against the decorated display title, not the raw tag: language presence
//! is encoded into entry titles at decoration time.

use smol_str::SmolStr;

use crate::entry::StreamEntry;

/// Internal tag to canonical display label, in canonical order.
///
/// The first five entries are textual markers rather than selectable
/// languages; they are skipped by [`language_options`].
pub const LANGUAGE_MAPPING: &[(&str, &str)] = &[
    ("dubbed", "Dubbed"),
    ("multi audio", "Multi Audio"),
    ("multi subs", "Multi Subs"),
    ("dual audio", "Dual Audio"),
    ("english", "🇬🇧"),
    ("japanese", "🇯🇵"),
    ("russian", "🇷🇺"),
    ("italian", "🇮🇹"),
    ("portuguese", "🇵🇹"),
    ("spanish", "🇪🇸"),
    ("latino", "🇲🇽"),
    ("korean", "🇰🇷"),
    ("chinese", "🇨🇳"),
    ("taiwanese", "🇹🇼"),
    ("french", "🇫🇷"),
    ("german", "🇩🇪"),
    ("dutch", "🇳🇱"),
    ("hindi", "🇮🇳"),
    ("telugu", "🇮🇳"),
    ("tamil", "🇮🇳"),
    ("polish", "🇵🇱"),
    ("lithuanian", "🇱🇹"),
    ("czech", "🇨🇿"),
    ("slovakian", "🇸🇰"),
    ("slovenian", "🇸🇮"),
    ("hungarian", "🇭🇺"),
    ("romanian", "🇷🇴"),
    ("croatian", "🇭🇷"),
    ("ukrainian", "🇺🇦"),
    ("greek", "🇬🇷"),
    ("danish", "🇩🇰"),
    ("finnish", "🇫🇮"),
    ("swedish", "🇸🇪"),
    ("norwegian", "🇳🇴"),
    ("turkish", "🇹🇷"),
    ("arabic", "🇸🇦"),
    ("persian", "🇮🇷"),
    ("hebrew", "🇮🇱"),
    ("vietnamese", "🇻🇳"),
    ("indonesian", "🇮🇩"),
    ("thai", "🇹🇭"),
];

// Textual markers plus english, which is never filtered on.
const NON_SELECTABLE: usize = 5;

/// A selectable language for user-facing option lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageOption {
    /// Internal tag, used as the request parameter value.
    pub key: &'static str,
    /// Display label, e.g. `"🇯🇵 Japanese"`.
    pub label: String,
}

/// Looks up the canonical label for an internal tag.
pub fn language_label(tag: &str) -> Option<&'static str> {
    LANGUAGE_MAPPING
        .iter()
        .find(|(known, _)| *known == tag)
        .map(|(_, label)| *label)
}

fn canonical_index(label: &str) -> usize {
    LANGUAGE_MAPPING
        .iter()
        .position(|(_, known)| *known == label)
        .unwrap_or(usize::MAX)
}

/// Maps raw tags to a deduplicated label list.
///
/// Recognized tags come first, in canonical order; unrecognized tags follow,
/// sorted alphabetically.
pub fn map_languages(tags: &[SmolStr]) -> Vec<SmolStr> {
    let mut mapped: Vec<&'static str> = tags
        .iter()
        .filter_map(|tag| language_label(tag))
        .collect();
    mapped.sort_by_key(|label| canonical_index(label));

    let mut unmapped: Vec<&SmolStr> = tags
        .iter()
        .filter(|tag| language_label(tag).is_none())
        .collect();
    unmapped.sort();

    let mut result: Vec<SmolStr> = Vec::with_capacity(mapped.len() + unmapped.len());
    for label in mapped
        .into_iter()
        .map(SmolStr::new_static)
        .chain(unmapped.into_iter().cloned())
    {
        if !result.contains(&label) {
            result.push(label);
        }
    }
    result
}

/// True if the entry's display title contains the label of any given tag.
pub fn contains_language(entry: &StreamEntry, tags: &[SmolStr]) -> bool {
    tags.iter()
        .filter_map(|tag| language_label(tag))
        .any(|label| entry.title.contains(label))
}

/// The selectable language options, in canonical order.
pub fn language_options() -> Vec<LanguageOption> {
    LANGUAGE_MAPPING
        .iter()
        .skip(NON_SELECTABLE)
        .map(|(tag, label)| {
            let mut chars = tag.chars();
            let capitalized = match chars.next() {
                Some(first) => format!("{}{}", first.to_uppercase(), chars.as_str()),
                None => String::new(),
            };
            LanguageOption {
                key: tag,
                label: format!("{label} {capitalized}"),
            }
        })
        .collect()
}
