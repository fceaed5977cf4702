//! Legacy ↔ current (v2) LP content migration.
//!
//! `migrate_to_v2` never fails: every malformed field falls back to its
//! default so a document can always be produced. `convert_to_legacy` is lossy
//! for multi-instance kinds; only the first `points` and first `faq` section
//! survive the round trip.

use tracing::{debug, warn};

use crate::lp::document::{
    ContentDocument, FaqData, GlobalSettings, HeroData, MetaSettings, PointItem, PointsData,
    Section, SectionContent, TrackingSettings, DEFAULT_CTA_TEXT, DEFAULT_DESIGN_PATTERN,
    DEFAULT_LAYOUT_STYLE,
};
use crate::lp::legacy::{
    format_legacy_faq, format_section_order, keys, parse_legacy_faq, resolve_section_order,
    LegacySettings, LegacyVisibility, MAX_POINT_SLOTS,
};
use crate::lp::registry::SectionKind;

/// The fresh six-section document: hero, points, jobs, details, faq, apply; all visible.
pub fn create_empty_v2_content() -> ContentDocument {
    let sections = SectionKind::CANONICAL
        .iter()
        .enumerate()
        .map(|(order, kind)| Section::new(*kind, order as u32))
        .collect();
    ContentDocument::new(sections, GlobalSettings::default())
}

/// Migrates a persisted record to the current schema.
///
/// 1. Absent or empty record → `create_empty_v2_content()`.
/// 2. Embedded `lpContent` that parses as version "2.0" → used as-is, except a
///    co-located legacy `faq` string always overwrites the first FAQ section's items.
/// 3. Otherwise the document is rebuilt from the flat legacy fields.
pub fn migrate_to_v2(legacy: Option<&LegacySettings>) -> ContentDocument {
    let Some(legacy) = legacy.filter(|l| !l.is_empty()) else {
        return create_empty_v2_content();
    };

    if let Some(mut doc) = embedded_document(legacy) {
        if let Some(raw_faq) = legacy.text(keys::FAQ) {
            overwrite_faq(&mut doc, &raw_faq);
        }
        return doc;
    }

    rebuild_from_legacy(legacy)
}

fn embedded_document(legacy: &LegacySettings) -> Option<ContentDocument> {
    let raw = legacy.non_empty(keys::LP_CONTENT)?;
    match serde_json::from_str::<ContentDocument>(&raw) {
        Ok(doc) if doc.is_current() => Some(doc),
        Ok(doc) => {
            warn!(
                "Embedded LP content has version '{}', rebuilding from legacy fields",
                doc.version
            );
            None
        }
        Err(e) => {
            warn!("Embedded LP content failed to parse, rebuilding from legacy fields: {e}");
            None
        }
    }
}

/// The legacy FAQ string is the latest source of truth for FAQ content.
fn overwrite_faq(doc: &mut ContentDocument, raw_faq: &str) {
    let items = parse_legacy_faq(raw_faq);
    let Some(section) = doc.first_of_mut(SectionKind::Faq) else {
        debug!("Legacy FAQ present but document has no FAQ section; ignoring");
        return;
    };
    section.visible = !items.is_empty();
    if let SectionContent::Faq { data, .. } = &mut section.content {
        data.items = items;
    }
}

fn rebuild_from_legacy(legacy: &LegacySettings) -> ContentDocument {
    let visibility = LegacyVisibility::parse(legacy.text(keys::SECTION_VISIBILITY).as_deref());
    let order = resolve_section_order(legacy.text(keys::SECTION_ORDER).as_deref());

    let sections = order
        .iter()
        .enumerate()
        .map(|(position, kind)| legacy_section(*kind, position as u32, legacy, &visibility))
        .collect();

    ContentDocument::new(sections, legacy_global_settings(legacy))
}

fn legacy_section(
    kind: SectionKind,
    order: u32,
    legacy: &LegacySettings,
    visibility: &LegacyVisibility,
) -> Section {
    let mut section = Section::new(kind, order);
    match &mut section.content {
        SectionContent::Hero { data, .. } => {
            *data = HeroData {
                title: legacy.text(keys::HERO_TITLE).unwrap_or_default(),
                subtitle: legacy.text(keys::HERO_SUBTITLE).unwrap_or_default(),
                image: legacy.non_empty(keys::HERO_IMAGE),
            };
            section.visible = true;
        }
        SectionContent::Points { data, .. } => {
            data.points = legacy_points(legacy);
            section.visible = visibility.points;
        }
        SectionContent::Jobs { .. } => section.visible = visibility.jobs,
        SectionContent::Details { .. } => section.visible = visibility.details,
        SectionContent::Faq { data, .. } => {
            data.items = legacy
                .text(keys::FAQ)
                .map(|raw| parse_legacy_faq(&raw))
                .unwrap_or_default();
            section.visible = visibility.faq && !data.items.is_empty();
        }
        SectionContent::Apply { .. } => section.visible = true,
        _ => {}
    }
    section
}

/// Slots 1..=6 with a non-empty title, in slot order.
fn legacy_points(legacy: &LegacySettings) -> Vec<PointItem> {
    (1..=MAX_POINT_SLOTS)
        .filter_map(|slot| {
            let title = legacy.non_empty(&keys::point_title(slot))?;
            Some(PointItem {
                title,
                description: legacy.text(&keys::point_desc(slot)).unwrap_or_default(),
            })
        })
        .collect()
}

fn legacy_global_settings(legacy: &LegacySettings) -> GlobalSettings {
    GlobalSettings {
        design_pattern: legacy
            .non_empty(keys::DESIGN_PATTERN)
            .unwrap_or_else(|| DEFAULT_DESIGN_PATTERN.to_string()),
        layout_style: legacy
            .non_empty(keys::LAYOUT_STYLE)
            .unwrap_or_else(|| DEFAULT_LAYOUT_STYLE.to_string()),
        cta_text: legacy
            .non_empty(keys::CTA_TEXT)
            .unwrap_or_else(|| DEFAULT_CTA_TEXT.to_string()),
        tracking: TrackingSettings {
            gtm_id: legacy.non_empty(keys::GTM_ID),
            ga_measurement_id: legacy.non_empty(keys::GA_MEASUREMENT_ID),
            meta_pixel_id: legacy.non_empty(keys::META_PIXEL_ID),
            line_tag_id: legacy.non_empty(keys::LINE_TAG_ID),
            tiktok_pixel_id: legacy.non_empty(keys::TIKTOK_PIXEL_ID),
        },
        meta: MetaSettings {
            title: legacy.non_empty(keys::META_TITLE),
            description: legacy.non_empty(keys::META_DESCRIPTION),
            ogp_image: legacy.non_empty(keys::OGP_IMAGE),
        },
    }
}

// ────────────────────────────────────────────────────────────────────────────
// v2 → legacy projection
// ────────────────────────────────────────────────────────────────────────────

/// Flattens a current document into the legacy record shape.
/// Returns an empty record for an absent or non-"2.0" document.
pub fn convert_to_legacy(doc: Option<&ContentDocument>) -> LegacySettings {
    let mut legacy = LegacySettings::new();
    let Some(doc) = doc.filter(|d| d.is_current()) else {
        return legacy;
    };

    if let Some(SectionContent::Hero { data, .. }) =
        doc.first_of(SectionKind::Hero).map(|s| &s.content)
    {
        legacy.set(keys::HERO_TITLE, data.title.clone());
        legacy.set(keys::HERO_SUBTITLE, data.subtitle.clone());
        legacy.set(keys::HERO_IMAGE, data.image.clone().unwrap_or_default());
    }

    let points = match doc.first_of(SectionKind::Points).map(|s| &s.content) {
        Some(SectionContent::Points { data, .. }) => data.clone(),
        _ => PointsData::default(),
    };
    write_point_slots(&mut legacy, &points.points);

    let faq = match doc.first_of(SectionKind::Faq).map(|s| &s.content) {
        Some(SectionContent::Faq { data, .. }) => data.clone(),
        _ => FaqData::default(),
    };
    legacy.set(keys::FAQ, format_legacy_faq(&faq.items));

    let mut visible: Vec<&Section> = doc.sections.iter().filter(|s| s.visible).collect();
    visible.sort_by_key(|s| s.order);
    let visible_kinds: Vec<SectionKind> = visible.iter().map(|s| s.kind()).collect();
    legacy.set(keys::SECTION_ORDER, format_section_order(&visible_kinds));

    let flag = |kind: SectionKind| doc.first_of(kind).map_or(true, |s| s.visible);
    let visibility = LegacyVisibility {
        points: flag(SectionKind::Points),
        jobs: flag(SectionKind::Jobs),
        details: flag(SectionKind::Details),
        faq: flag(SectionKind::Faq),
    };
    legacy.set(keys::SECTION_VISIBILITY, visibility.to_json());

    write_global_settings(&mut legacy, &doc.global_settings);
    legacy
}

/// Writes slots 1..=6; extra points are dropped, unused slots are blanked.
fn write_point_slots(legacy: &mut LegacySettings, points: &[PointItem]) {
    for slot in 1..=MAX_POINT_SLOTS {
        let (title, description) = points
            .get(slot - 1)
            .map(|p| (p.title.clone(), p.description.clone()))
            .unwrap_or_default();
        legacy.set(keys::point_title(slot), title);
        legacy.set(keys::point_desc(slot), description);
    }
    if points.len() > MAX_POINT_SLOTS {
        debug!(
            "Dropping {} points beyond the {MAX_POINT_SLOTS} legacy slots",
            points.len() - MAX_POINT_SLOTS
        );
    }
}

fn write_global_settings(legacy: &mut LegacySettings, settings: &GlobalSettings) {
    legacy.set(keys::DESIGN_PATTERN, settings.design_pattern.clone());
    legacy.set(keys::LAYOUT_STYLE, settings.layout_style.clone());
    legacy.set(keys::CTA_TEXT, settings.cta_text.clone());

    let tracking = &settings.tracking;
    legacy.set_opt(keys::GTM_ID, tracking.gtm_id.as_ref());
    legacy.set_opt(keys::GA_MEASUREMENT_ID, tracking.ga_measurement_id.as_ref());
    legacy.set_opt(keys::META_PIXEL_ID, tracking.meta_pixel_id.as_ref());
    legacy.set_opt(keys::LINE_TAG_ID, tracking.line_tag_id.as_ref());
    legacy.set_opt(keys::TIKTOK_PIXEL_ID, tracking.tiktok_pixel_id.as_ref());

    let meta = &settings.meta;
    legacy.set_opt(keys::META_TITLE, meta.title.as_ref());
    legacy.set_opt(keys::META_DESCRIPTION, meta.description.as_ref());
    legacy.set_opt(keys::OGP_IMAGE, meta.ogp_image.as_ref());
}
