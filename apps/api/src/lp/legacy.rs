//! Legacy flat LP settings and the micro-formats that live inside them.
//!
//! Older consumers read LP settings as one flat key/value record:
//! - numbered point slots (`pointTitle1`..`pointTitle6`, `pointDesc1`..`pointDesc6`)
//! - a delimited FAQ string (`Q:...|A:...||Q:...|A:...`)
//! - a comma-delimited section order (`hero,points,jobs,...`)
//! - a JSON object encoded as a string for section visibility
//!
//! Nothing outside the migrator should need to know these formats.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use crate::lp::document::FaqItem;
use crate::lp::registry::SectionKind;

pub const MAX_POINT_SLOTS: usize = 6;

/// Field names of the legacy record.
pub mod keys {
    pub const LP_CONTENT: &str = "lpContent";
    pub const HERO_TITLE: &str = "heroTitle";
    pub const HERO_SUBTITLE: &str = "heroSubtitle";
    pub const HERO_IMAGE: &str = "heroImage";
    pub const FAQ: &str = "faq";
    pub const SECTION_ORDER: &str = "sectionOrder";
    pub const SECTION_VISIBILITY: &str = "sectionVisibility";
    pub const DESIGN_PATTERN: &str = "designPattern";
    pub const LAYOUT_STYLE: &str = "layoutStyle";
    pub const CTA_TEXT: &str = "ctaText";
    pub const GTM_ID: &str = "gtmId";
    pub const GA_MEASUREMENT_ID: &str = "gaMeasurementId";
    pub const META_PIXEL_ID: &str = "metaPixelId";
    pub const LINE_TAG_ID: &str = "lineTagId";
    pub const TIKTOK_PIXEL_ID: &str = "tiktokPixelId";
    pub const META_TITLE: &str = "metaTitle";
    pub const META_DESCRIPTION: &str = "metaDescription";
    pub const OGP_IMAGE: &str = "ogpImage";
    pub const UPDATED_AT: &str = "updatedAt";

    /// Fixed keys written by the legacy projection of a document.
    pub const PROJECTED: [&str; 17] = [
        HERO_TITLE,
        HERO_SUBTITLE,
        HERO_IMAGE,
        FAQ,
        SECTION_ORDER,
        SECTION_VISIBILITY,
        DESIGN_PATTERN,
        LAYOUT_STYLE,
        CTA_TEXT,
        GTM_ID,
        GA_MEASUREMENT_ID,
        META_PIXEL_ID,
        LINE_TAG_ID,
        TIKTOK_PIXEL_ID,
        META_TITLE,
        META_DESCRIPTION,
        OGP_IMAGE,
    ];

    pub fn point_title(slot: usize) -> String {
        format!("pointTitle{slot}")
    }

    pub fn point_desc(slot: usize) -> String {
        format!("pointDesc{slot}")
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Flat record
// ────────────────────────────────────────────────────────────────────────────

/// The flat key/value record as persisted. Unknown keys are carried through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LegacySettings(pub Map<String, Value>);

impl LegacySettings {
    pub fn new() -> Self {
        LegacySettings(Map::new())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// String value of `key`. Numbers and booleans are stringified; null and
    /// structured values read as absent.
    pub fn text(&self, key: &str) -> Option<String> {
        match self.0.get(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// Like `text`, but blank values read as absent.
    pub fn non_empty(&self, key: &str) -> Option<String> {
        self.text(key).filter(|s| !s.trim().is_empty())
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), Value::String(value.into()));
    }

    pub fn set_opt(&mut self, key: &str, value: Option<&String>) {
        match value {
            Some(v) => self.set(key, v.clone()),
            None => {
                self.0.remove(key);
            }
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    /// Drops every key the legacy projection owns, point slots included.
    /// Unknown keys stay.
    pub fn clear_projection(&mut self) {
        for key in keys::PROJECTED {
            self.0.remove(key);
        }
        for slot in 1..=MAX_POINT_SLOTS {
            self.0.remove(&keys::point_title(slot));
            self.0.remove(&keys::point_desc(slot));
        }
    }

    /// Writes every key of `other` over this record.
    pub fn merge_from(&mut self, other: LegacySettings) {
        for (k, v) in other.0 {
            self.0.insert(k, v);
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// FAQ string
// ────────────────────────────────────────────────────────────────────────────

const PAIR_DELIMITER: &str = "||";

/// Parses the delimited FAQ string.
///
/// Pairs are separated by `||` or any run of newlines. Within a pair the
/// question follows a case-insensitive `Q:` marker up to `A:`; the answer
/// runs from `A:` to the end of the pair. Pairs missing either marker, or
/// with a blank question, are skipped. Ids are `faq-1`, `faq-2`, ... in parse order.
pub fn parse_legacy_faq(raw: &str) -> Vec<FaqItem> {
    let mut items = Vec::new();
    for pair in split_pairs(raw) {
        let Some((question, answer)) = parse_pair(pair) else {
            continue;
        };
        items.push(FaqItem {
            id: format!("faq-{}", items.len() + 1),
            question,
            answer,
        });
    }
    items
}

fn split_pairs(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(PAIR_DELIMITER)
        .flat_map(|chunk| chunk.split(['\n', '\r']))
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
}

fn parse_pair(pair: &str) -> Option<(String, String)> {
    let q_at = find_marker(pair, b'q', 0, |prev| prev.is_ascii_whitespace() || prev == b'|')?;
    let body = q_at + 2;
    let a_at = find_marker(pair, b'a', body, |prev| prev == b'|')
        .or_else(|| find_marker(pair, b'a', body, |prev| prev.is_ascii_whitespace()))?;

    let question = pair[body..a_at].trim().trim_end_matches('|').trim();
    let answer = pair[a_at + 2..].trim();
    if question.is_empty() {
        return None;
    }
    Some((question.to_string(), answer.to_string()))
}

/// Byte offset of a case-insensitive `<letter>:` marker at or after `from`
/// that starts the scanned range or follows a byte accepted by `boundary`.
/// `A:` inside words such as "Visa:" is not a marker. Markers are ASCII, so
/// the returned offset is always a char boundary.
fn find_marker(
    haystack: &str,
    letter: u8,
    from: usize,
    boundary: impl Fn(u8) -> bool,
) -> Option<usize> {
    let bytes = haystack.as_bytes();
    (from..bytes.len().saturating_sub(1)).find(|&i| {
        bytes[i].to_ascii_lowercase() == letter
            && bytes[i + 1] == b':'
            && (i == from || boundary(bytes[i - 1]))
    })
}

/// Serializes FAQ items back into the delimited legacy string.
pub fn format_legacy_faq(items: &[FaqItem]) -> String {
    items
        .iter()
        .filter(|item| !item.question.trim().is_empty())
        .map(|item| {
            format!(
                "Q:{}|A:{}",
                flatten_line(&item.question),
                flatten_line(&item.answer)
            )
        })
        .collect::<Vec<_>>()
        .join(PAIR_DELIMITER)
}

/// Newlines and `||` would split a pair on re-parse.
fn flatten_line(text: &str) -> String {
    text.split(['\n', '\r'])
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
        .replace(PAIR_DELIMITER, "|")
}

// ────────────────────────────────────────────────────────────────────────────
// Section order string
// ────────────────────────────────────────────────────────────────────────────

/// Resolves the comma-delimited order against the canonical kinds.
///
/// Explicit entries come first (unknown, decorative and repeated tokens are
/// dropped); every canonical kind missing from the list is appended in
/// canonical order. An absent or blank string yields the canonical order.
pub fn resolve_section_order(raw: Option<&str>) -> Vec<SectionKind> {
    let mut resolved: Vec<SectionKind> = Vec::with_capacity(SectionKind::CANONICAL.len());
    if let Some(raw) = raw {
        for token in raw.split(',') {
            match SectionKind::parse(token) {
                Some(kind) if kind.is_canonical() && !resolved.contains(&kind) => {
                    resolved.push(kind)
                }
                Some(_) => {}
                None if token.trim().is_empty() => {}
                None => warn!("Ignoring unknown section type '{}' in legacy order", token.trim()),
            }
        }
    }
    for kind in SectionKind::CANONICAL {
        if !resolved.contains(&kind) {
            resolved.push(kind);
        }
    }
    resolved
}

/// De-duplicated comma-delimited order string.
pub fn format_section_order(kinds: &[SectionKind]) -> String {
    let mut seen: Vec<SectionKind> = Vec::with_capacity(kinds.len());
    for kind in kinds {
        if !seen.contains(kind) {
            seen.push(*kind);
        }
    }
    seen.iter()
        .map(|k| k.as_str())
        .collect::<Vec<_>>()
        .join(",")
}

// ────────────────────────────────────────────────────────────────────────────
// Visibility map
// ────────────────────────────────────────────────────────────────────────────

/// Visibility flags the legacy schema knows about. Field order is the wire order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LegacyVisibility {
    pub points: bool,
    pub jobs: bool,
    pub details: bool,
    pub faq: bool,
}

impl Default for LegacyVisibility {
    fn default() -> Self {
        LegacyVisibility {
            points: true,
            jobs: true,
            details: true,
            faq: true,
        }
    }
}

impl LegacyVisibility {
    /// Parses the JSON-in-a-string map merged over the all-visible defaults.
    /// Invalid JSON or non-boolean entries keep the defaults.
    pub fn parse(raw: Option<&str>) -> Self {
        let mut visibility = LegacyVisibility::default();
        let Some(raw) = raw.filter(|r| !r.trim().is_empty()) else {
            return visibility;
        };
        let map = match serde_json::from_str::<Map<String, Value>>(raw) {
            Ok(map) => map,
            Err(e) => {
                warn!("Invalid legacy section visibility JSON, using defaults: {e}");
                return visibility;
            }
        };
        for (key, value) in map {
            let Some(flag) = value.as_bool() else {
                continue;
            };
            match key.as_str() {
                "points" => visibility.points = flag,
                "jobs" => visibility.jobs = flag,
                "details" => visibility.details = flag,
                "faq" => visibility.faq = flag,
                _ => {}
            }
        }
        visibility
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn qa(items: &[FaqItem]) -> Vec<(&str, &str)> {
        items
            .iter()
            .map(|i| (i.question.as_str(), i.answer.as_str()))
            .collect()
    }

    #[test]
    fn test_parse_faq_double_pipe() {
        let items = parse_legacy_faq("Q:Why?|A:Because.||Q:How?|A:Like this.");
        assert_eq!(qa(&items), vec![("Why?", "Because."), ("How?", "Like this.")]);
        assert_eq!(items[0].id, "faq-1");
        assert_eq!(items[1].id, "faq-2");
    }

    #[test]
    fn test_parse_faq_newline_runs() {
        let items = parse_legacy_faq("Q:One? A:Yes.\n\n\r\nq: Two? a: No.\n");
        assert_eq!(qa(&items), vec![("One?", "Yes."), ("Two?", "No.")]);
    }

    #[test]
    fn test_parse_faq_skips_pairs_missing_a_marker() {
        let items = parse_legacy_faq("Q:Orphan question||Just text||Q:Kept?|A:Yes");
        assert_eq!(qa(&items), vec![("Kept?", "Yes")]);
        assert_eq!(items[0].id, "faq-1");
    }

    #[test]
    fn test_parse_faq_empty_answer_is_kept() {
        let items = parse_legacy_faq("Q:Pending?|A:");
        assert_eq!(qa(&items), vec![("Pending?", "")]);
    }

    #[test]
    fn test_parse_faq_multibyte_text() {
        let items = parse_legacy_faq("Q:勤務地は？|A:東京です。");
        assert_eq!(qa(&items), vec![("勤務地は？", "東京です。")]);
    }

    #[test]
    fn test_parse_faq_empty_input() {
        assert!(parse_legacy_faq("").is_empty());
        assert!(parse_legacy_faq("   \n  ").is_empty());
    }

    #[test]
    fn test_format_faq_reparses_to_same_pairs() {
        let items = parse_legacy_faq("Q:Why?|A:Because.||Q:How?|A:Like this.");
        let raw = format_legacy_faq(&items);
        assert_eq!(raw, "Q:Why?|A:Because.||Q:How?|A:Like this.");
    }

    #[test]
    fn test_parse_faq_ignores_a_colon_inside_words() {
        let items = parse_legacy_faq("Q:Visa: do you sponsor?|A:Yes||Q:Java: or Kotlin? A:Both");
        assert_eq!(
            qa(&items),
            vec![("Visa: do you sponsor?", "Yes"), ("Java: or Kotlin?", "Both")]
        );
    }

    #[test]
    fn test_format_faq_round_trips_colon_words() {
        let items = vec![
            FaqItem {
                id: "faq-1".to_string(),
                question: "Visa: do you sponsor?".to_string(),
                answer: "Yes".to_string(),
            },
            FaqItem {
                id: "faq-2".to_string(),
                question: "What is on the agenda: day one?".to_string(),
                answer: "Onboarding. Java: optional.".to_string(),
            },
        ];
        assert_eq!(parse_legacy_faq(&format_legacy_faq(&items)), items);
    }

    #[test]
    fn test_format_faq_flattens_newlines() {
        let items = vec![FaqItem {
            id: "x".to_string(),
            question: "Multi\nline?".to_string(),
            answer: "First.\nSecond.".to_string(),
        }];
        assert_eq!(format_legacy_faq(&items), "Q:Multi line?|A:First. Second.");
    }

    #[test]
    fn test_resolve_order_appends_missing_canonical_kinds() {
        let order = resolve_section_order(Some("faq,hero"));
        assert_eq!(
            order,
            vec![
                SectionKind::Faq,
                SectionKind::Hero,
                SectionKind::Points,
                SectionKind::Jobs,
                SectionKind::Details,
                SectionKind::Apply
            ]
        );
    }

    #[test]
    fn test_resolve_order_drops_unknown_duplicate_and_decorative() {
        let order = resolve_section_order(Some("apply, banner,apply,gallery,, jobs"));
        assert_eq!(order[0], SectionKind::Apply);
        assert_eq!(order[1], SectionKind::Jobs);
        assert_eq!(order.len(), SectionKind::CANONICAL.len());
    }

    #[test]
    fn test_resolve_order_absent() {
        assert_eq!(resolve_section_order(None), SectionKind::CANONICAL.to_vec());
    }

    #[test]
    fn test_format_order_dedups() {
        let raw = format_section_order(&[
            SectionKind::Hero,
            SectionKind::Points,
            SectionKind::Points,
            SectionKind::Apply,
        ]);
        assert_eq!(raw, "hero,points,apply");
    }

    #[test]
    fn test_visibility_merges_over_defaults() {
        let v = LegacyVisibility::parse(Some(r#"{"faq":false,"unknown":false}"#));
        assert!(!v.faq);
        assert!(v.points && v.jobs && v.details);
    }

    #[test]
    fn test_visibility_invalid_json_keeps_defaults() {
        assert_eq!(
            LegacyVisibility::parse(Some("{not json")),
            LegacyVisibility::default()
        );
    }

    #[test]
    fn test_visibility_json_has_exact_keys() {
        let json = LegacyVisibility {
            jobs: false,
            ..LegacyVisibility::default()
        }
        .to_json();
        assert_eq!(
            json,
            r#"{"points":true,"jobs":false,"details":true,"faq":true}"#
        );
    }

    #[test]
    fn test_legacy_text_reads_numbers_and_skips_null() {
        let settings: LegacySettings = serde_json::from_value(serde_json::json!({
            "heroTitle": 42,
            "heroSubtitle": null
        }))
        .unwrap();
        assert_eq!(settings.text(keys::HERO_TITLE).as_deref(), Some("42"));
        assert_eq!(settings.text(keys::HERO_SUBTITLE), None);
    }
}
