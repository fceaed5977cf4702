//! Section manager — CRUD and ordering over one in-memory LP document.
//!
//! One manager per editing session. Every mutating call returns an
//! [`EditOutcome`]; rejected or unconfirmed calls leave the document untouched.
//! Each applied mutation invokes the change callback exactly once.

use std::fmt;

use thiserror::Error;
use tracing::{debug, warn};

use crate::lp::document::{normalize_orders, ContentDocument, GlobalSettings, Section};
use crate::lp::legacy::LegacySettings;
use crate::lp::migrator::{create_empty_v2_content, migrate_to_v2};
use crate::lp::patch::{GlobalSettingsPatch, SectionPatch};
use crate::lp::registry::{can_add, can_delete, generate_id, lookup, SectionKind};
use crate::lp::templates::find_template;

// ────────────────────────────────────────────────────────────────────────────
// Outcomes
// ────────────────────────────────────────────────────────────────────────────

/// Why a mutation was refused. Presentation is left to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("Section type '{kind}' allows at most {max} instance(s)")]
    MaxInstancesReached { kind: SectionKind, max: usize },

    #[error("Section type '{kind}' is required and cannot be deleted")]
    RequiredSection { kind: SectionKind },

    #[error("Section '{id}' not found")]
    SectionNotFound { id: String },

    #[error("A '{found}' patch cannot be applied to a '{expected}' section")]
    PatchKindMismatch {
        expected: SectionKind,
        found: SectionKind,
    },

    #[error("Unknown template '{id}'")]
    UnknownTemplate { id: String },
}

impl Rejection {
    pub fn code(&self) -> &'static str {
        match self {
            Rejection::MaxInstancesReached { .. } => "MAX_INSTANCES_REACHED",
            Rejection::RequiredSection { .. } => "REQUIRED_SECTION",
            Rejection::SectionNotFound { .. } => "SECTION_NOT_FOUND",
            Rejection::PatchKindMismatch { .. } => "PATCH_KIND_MISMATCH",
            Rejection::UnknownTemplate { .. } => "UNKNOWN_TEMPLATE",
        }
    }
}

#[must_use]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    Applied,
    Rejected(Rejection),
    /// The mutation is destructive; call again with `confirmed = true`.
    RequiresConfirmation,
}

impl EditOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, EditOutcome::Applied)
    }
}

/// What changed, so the UI can decide what to re-render, open or preview.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeEvent {
    Loaded,
    SectionAdded { id: String },
    SectionDuplicated { source: String, id: String },
    SectionDeleted { id: String },
    VisibilityToggled { id: String, visible: bool },
    SectionEdited { id: String },
    SectionMoved { id: String, to: usize },
    Reordered,
    TemplateApplied { template: String },
    GlobalSettingsUpdated,
}

impl ChangeEvent {
    /// The section whose editor should open after this change, if any.
    pub fn opens_editor(&self) -> Option<&str> {
        match self {
            ChangeEvent::SectionAdded { id } => Some(id),
            _ => None,
        }
    }

    pub fn triggers_preview(&self) -> bool {
        !matches!(self, ChangeEvent::Loaded)
    }
}

pub type ChangeCallback = Box<dyn FnMut(&ChangeEvent) + Send>;

// ────────────────────────────────────────────────────────────────────────────
// Manager
// ────────────────────────────────────────────────────────────────────────────

pub struct SectionManager {
    sections: Vec<Section>,
    global_settings: GlobalSettings,
    on_change: Option<ChangeCallback>,
}

impl fmt::Debug for SectionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SectionManager")
            .field("sections", &self.sections)
            .field("global_settings", &self.global_settings)
            .field("on_change", &self.on_change.is_some())
            .finish()
    }
}

impl Default for SectionManager {
    fn default() -> Self {
        SectionManager::new()
    }
}

impl SectionManager {
    /// A session over the fresh six-section document.
    pub fn new() -> Self {
        SectionManager::from_document(create_empty_v2_content())
    }

    pub fn from_document(doc: ContentDocument) -> Self {
        let mut sections = doc.sections;
        normalize_orders(&mut sections);
        SectionManager {
            sections,
            global_settings: doc.global_settings,
            on_change: None,
        }
    }

    pub fn with_change_callback<F>(mut self, callback: F) -> Self
    where
        F: FnMut(&ChangeEvent) + Send + 'static,
    {
        self.on_change = Some(Box::new(callback));
        self
    }

    /// Replaces the session state with the migrated record.
    pub fn load(&mut self, record: Option<&LegacySettings>) {
        let doc = migrate_to_v2(record);
        self.sections = doc.sections;
        self.global_settings = doc.global_settings;
        normalize_orders(&mut self.sections);
        debug!("Loaded LP document with {} sections", self.sections.len());
        self.emit(ChangeEvent::Loaded);
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn section(&self, id: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.id == id)
    }

    pub fn global_settings(&self) -> &GlobalSettings {
        &self.global_settings
    }

    /// Snapshot for persistence.
    pub fn get_current_document(&self) -> ContentDocument {
        ContentDocument::new(self.sections.clone(), self.global_settings.clone())
    }

    /// Adds a default section of `kind`. Canonical kinds go to the end;
    /// decorative kinds are inserted right before `apply`.
    pub fn add_section(&mut self, kind: SectionKind) -> EditOutcome {
        if !can_add(kind, &self.sections) {
            return reject(max_instances(kind));
        }

        let order = match self.apply_order().filter(|_| !kind.is_canonical()) {
            Some(apply_order) => {
                for section in self.sections.iter_mut().filter(|s| s.order >= apply_order) {
                    section.order += 1;
                }
                apply_order
            }
            None => self.next_order(),
        };
        let section = Section::new(kind, order);
        let id = section.id.clone();
        self.sections.push(section);
        normalize_orders(&mut self.sections);

        debug!("Added {kind} section {id}");
        self.emit(ChangeEvent::SectionAdded { id });
        EditOutcome::Applied
    }

    /// Deep-clones a section under a new id, directly after the original.
    ///
    /// The copy takes the slot right after the original and every later
    /// section shifts down by one, so the following `normalize_orders` always
    /// lands it next to its source.
    pub fn duplicate_section(&mut self, id: &str) -> EditOutcome {
        let Some(original) = self.section(id).cloned() else {
            return reject(not_found(id));
        };
        let kind = original.kind();
        if !can_add(kind, &self.sections) {
            return reject(max_instances(kind));
        }

        let mut copy = original.clone();
        copy.id = generate_id(kind);
        copy.order = original.order + 1;
        for section in self.sections.iter_mut().filter(|s| s.order > original.order) {
            section.order += 1;
        }
        let new_id = copy.id.clone();
        self.sections.push(copy);
        normalize_orders(&mut self.sections);

        debug!("Duplicated section {id} as {new_id}");
        self.emit(ChangeEvent::SectionDuplicated {
            source: id.to_string(),
            id: new_id,
        });
        EditOutcome::Applied
    }

    /// True when deleting `id` is allowed and therefore needs a confirmation.
    pub fn delete_requires_confirmation(&self, id: &str) -> bool {
        self.section(id)
            .is_some_and(|s| can_delete(s, &self.sections))
    }

    pub fn delete_section(&mut self, id: &str, confirmed: bool) -> EditOutcome {
        let Some(section) = self.section(id) else {
            return reject(not_found(id));
        };
        if !can_delete(section, &self.sections) {
            let kind = section.kind();
            return reject(Rejection::RequiredSection { kind });
        }
        if !confirmed {
            return EditOutcome::RequiresConfirmation;
        }

        self.sections.retain(|s| s.id != id);
        normalize_orders(&mut self.sections);

        debug!("Deleted section {id}");
        self.emit(ChangeEvent::SectionDeleted { id: id.to_string() });
        EditOutcome::Applied
    }

    pub fn toggle_visibility(&mut self, id: &str) -> EditOutcome {
        let Some(index) = self.position(id) else {
            return reject(not_found(id));
        };
        let section = &mut self.sections[index];
        section.visible = !section.visible;
        let visible = section.visible;

        self.emit(ChangeEvent::VisibilityToggled {
            id: id.to_string(),
            visible,
        });
        EditOutcome::Applied
    }

    /// Stable-sorts by `order` and renumbers to `0..N-1`. Call after any
    /// externally driven reordering.
    pub fn reorder(&mut self) {
        normalize_orders(&mut self.sections);
        self.emit(ChangeEvent::Reordered);
    }

    /// Moves a section to `to_index` (clamped), e.g. after a drag and drop.
    pub fn move_section(&mut self, id: &str, to_index: usize) -> EditOutcome {
        let Some(from) = self.position(id) else {
            return reject(not_found(id));
        };
        let section = self.sections.remove(from);
        let to = to_index.min(self.sections.len());
        self.sections.insert(to, section);
        for (position, section) in self.sections.iter_mut().enumerate() {
            section.order = position as u32;
        }
        normalize_orders(&mut self.sections);

        self.emit(ChangeEvent::SectionMoved {
            id: id.to_string(),
            to,
        });
        EditOutcome::Applied
    }

    pub fn edit_section(&mut self, id: &str, patch: SectionPatch) -> EditOutcome {
        let Some(index) = self.position(id) else {
            return reject(not_found(id));
        };
        if let Err(rejection) = patch.apply(&mut self.sections[index].content) {
            return reject(rejection);
        }

        self.emit(ChangeEvent::SectionEdited { id: id.to_string() });
        EditOutcome::Applied
    }

    pub fn template_requires_confirmation(&self) -> bool {
        !self.sections.is_empty()
    }

    /// Replaces every section with the template's fresh sections.
    pub fn apply_template(&mut self, template_id: &str, confirmed: bool) -> EditOutcome {
        let Some(template) = find_template(template_id) else {
            return reject(Rejection::UnknownTemplate {
                id: template_id.to_string(),
            });
        };
        if self.template_requires_confirmation() && !confirmed {
            return EditOutcome::RequiresConfirmation;
        }

        self.sections = template.instantiate();
        normalize_orders(&mut self.sections);

        debug!("Applied template {template_id}");
        self.emit(ChangeEvent::TemplateApplied {
            template: template_id.to_string(),
        });
        EditOutcome::Applied
    }

    pub fn update_global_settings(&mut self, patch: GlobalSettingsPatch) -> EditOutcome {
        patch.apply(&mut self.global_settings);
        self.emit(ChangeEvent::GlobalSettingsUpdated);
        EditOutcome::Applied
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.sections.iter().position(|s| s.id == id)
    }

    fn apply_order(&self) -> Option<u32> {
        self.sections
            .iter()
            .find(|s| s.kind() == SectionKind::Apply)
            .map(|s| s.order)
    }

    fn next_order(&self) -> u32 {
        self.sections
            .iter()
            .map(|s| s.order + 1)
            .max()
            .unwrap_or(0)
    }

    fn emit(&mut self, event: ChangeEvent) {
        if let Some(callback) = self.on_change.as_mut() {
            callback(&event);
        }
    }
}

fn reject(rejection: Rejection) -> EditOutcome {
    warn!("Section operation rejected: {rejection}");
    EditOutcome::Rejected(rejection)
}

fn not_found(id: &str) -> Rejection {
    Rejection::SectionNotFound { id: id.to_string() }
}

fn max_instances(kind: SectionKind) -> Rejection {
    let max = lookup(kind).and_then(|d| d.max_instances).unwrap_or(0);
    Rejection::MaxInstancesReached { kind, max }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use crate::lp::document::{orders_are_dense, SectionContent};
    use crate::lp::patch::{HeroPatch, MediaPatch, PointsPatch};
    use crate::lp::registry::count_of;

    fn kinds(manager: &SectionManager) -> Vec<SectionKind> {
        manager.get_current_document().kinds_in_order()
    }

    fn id_of(manager: &SectionManager, kind: SectionKind) -> String {
        manager
            .sections()
            .iter()
            .find(|s| s.kind() == kind)
            .map(|s| s.id.clone())
            .unwrap()
    }

    fn recording() -> (SectionManager, Arc<Mutex<Vec<ChangeEvent>>>) {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        let manager =
            SectionManager::new().with_change_callback(move |e| sink.lock().unwrap().push(e.clone()));
        (manager, events)
    }

    #[test]
    fn test_add_decorative_inserts_before_apply() {
        let mut manager = SectionManager::new();
        assert!(manager.add_section(SectionKind::Gallery).is_applied());

        let gallery = manager
            .sections()
            .iter()
            .find(|s| s.kind() == SectionKind::Gallery)
            .unwrap();
        let apply = manager
            .sections()
            .iter()
            .find(|s| s.kind() == SectionKind::Apply)
            .unwrap();
        assert_eq!(gallery.order, 5);
        assert_eq!(apply.order, 6);
        assert!(orders_are_dense(manager.sections()));
    }

    #[test]
    fn test_add_canonical_appends_at_end() {
        let mut manager = SectionManager::new();
        assert!(manager.add_section(SectionKind::Points).is_applied());
        assert_eq!(kinds(&manager).last(), Some(&SectionKind::Points));
        assert_eq!(manager.sections().len(), 7);
    }

    #[test]
    fn test_add_decorative_without_apply_appends() {
        let mut manager = SectionManager::new();
        let apply = id_of(&manager, SectionKind::Apply);
        manager.sections.retain(|s| s.id != apply);
        assert!(manager.add_section(SectionKind::Video).is_applied());
        assert_eq!(kinds(&manager).last(), Some(&SectionKind::Video));
    }

    #[test]
    fn test_add_beyond_max_instances_is_rejected() {
        let mut manager = SectionManager::new();
        let before = manager.get_current_document();
        assert_eq!(
            manager.add_section(SectionKind::Jobs),
            EditOutcome::Rejected(Rejection::MaxInstancesReached {
                kind: SectionKind::Jobs,
                max: 1
            })
        );
        assert!(!manager.add_section(SectionKind::Hero).is_applied());
        assert_eq!(manager.get_current_document(), before);
        assert_eq!(count_of(SectionKind::Jobs, manager.sections()), 1);
    }

    #[test]
    fn test_duplicate_lands_after_original_with_new_id() {
        let mut manager = SectionManager::new();
        let points = id_of(&manager, SectionKind::Points);
        assert!(manager
            .edit_section(
                &points,
                SectionPatch::Points(PointsPatch {
                    title: Some("Why join".to_string()),
                    ..PointsPatch::default()
                }),
            )
            .is_applied());
        assert!(manager.duplicate_section(&points).is_applied());

        let ordered = manager.get_current_document();
        let mut sorted = ordered.sections.clone();
        sorted.sort_by_key(|s| s.order);
        assert_eq!(sorted[1].id, points);
        assert_eq!(sorted[2].kind(), SectionKind::Points);
        assert_ne!(sorted[2].id, points);
        assert_eq!(sorted[2].content, sorted[1].content);
        assert_eq!(sorted[3].kind(), SectionKind::Jobs);
        assert!(orders_are_dense(manager.sections()));
    }

    #[test]
    fn test_duplicate_copy_is_independent() {
        let mut manager = SectionManager::new();
        assert!(manager.add_section(SectionKind::Gallery).is_applied());
        let gallery = id_of(&manager, SectionKind::Gallery);
        assert!(manager.duplicate_section(&gallery).is_applied());
        let copy = manager
            .sections()
            .iter()
            .find(|s| s.kind() == SectionKind::Gallery && s.id != gallery)
            .map(|s| s.id.clone())
            .unwrap();

        let patch = SectionPatch::Gallery(MediaPatch {
            columns: Some(4),
            ..MediaPatch::default()
        });
        assert!(manager.edit_section(&copy, patch).is_applied());

        match &manager.section(&gallery).unwrap().content {
            SectionContent::Gallery { layout, .. } => assert_eq!(layout.columns, 3),
            other => panic!("unexpected content {other:?}"),
        }
    }

    #[test]
    fn test_duplicate_singleton_is_rejected() {
        let mut manager = SectionManager::new();
        let hero = id_of(&manager, SectionKind::Hero);
        assert!(matches!(
            manager.duplicate_section(&hero),
            EditOutcome::Rejected(Rejection::MaxInstancesReached { .. })
        ));
        assert_eq!(manager.sections().len(), 6);
    }

    #[test]
    fn test_delete_required_is_noop() {
        let mut manager = SectionManager::new();
        for kind in [SectionKind::Hero, SectionKind::Apply] {
            let id = id_of(&manager, kind);
            assert!(!manager.delete_requires_confirmation(&id));
            assert_eq!(
                manager.delete_section(&id, true),
                EditOutcome::Rejected(Rejection::RequiredSection { kind })
            );
        }
        assert_eq!(manager.sections().len(), 6);
    }

    #[test]
    fn test_delete_requires_confirmation_then_removes() {
        let mut manager = SectionManager::new();
        let faq = id_of(&manager, SectionKind::Faq);
        assert!(manager.delete_requires_confirmation(&faq));
        assert_eq!(
            manager.delete_section(&faq, false),
            EditOutcome::RequiresConfirmation
        );
        assert!(manager.section(&faq).is_some());

        assert!(manager.delete_section(&faq, true).is_applied());
        assert!(manager.section(&faq).is_none());
        assert!(orders_are_dense(manager.sections()));
    }

    #[test]
    fn test_optional_kind_can_be_deleted_to_zero() {
        let mut manager = SectionManager::new();
        let points = id_of(&manager, SectionKind::Points);
        assert!(manager.delete_section(&points, true).is_applied());
        assert_eq!(count_of(SectionKind::Points, manager.sections()), 0);
    }

    #[test]
    fn test_unknown_id_is_rejected() {
        let mut manager = SectionManager::new();
        assert!(matches!(
            manager.toggle_visibility("missing"),
            EditOutcome::Rejected(Rejection::SectionNotFound { .. })
        ));
        assert!(matches!(
            manager.delete_section("missing", true),
            EditOutcome::Rejected(Rejection::SectionNotFound { .. })
        ));
    }

    #[test]
    fn test_toggle_visibility_keeps_order() {
        let mut manager = SectionManager::new();
        let jobs = id_of(&manager, SectionKind::Jobs);
        let before = kinds(&manager);
        assert!(manager.toggle_visibility(&jobs).is_applied());
        assert!(!manager.section(&jobs).unwrap().visible);
        assert_eq!(kinds(&manager), before);
        assert!(manager.toggle_visibility(&jobs).is_applied());
        assert!(manager.section(&jobs).unwrap().visible);
    }

    #[test]
    fn test_move_section() {
        let mut manager = SectionManager::new();
        let faq = id_of(&manager, SectionKind::Faq);
        assert!(manager.move_section(&faq, 0).is_applied());
        assert_eq!(kinds(&manager)[0], SectionKind::Faq);
        assert!(manager.move_section(&faq, 99).is_applied());
        assert_eq!(kinds(&manager).last(), Some(&SectionKind::Faq));
        assert!(orders_are_dense(manager.sections()));
    }

    #[test]
    fn test_reorder_normalizes_external_orders() {
        let mut manager = SectionManager::new();
        for (i, section) in manager.sections.iter_mut().enumerate() {
            section.order = 100 - (i as u32) * 10;
        }
        manager.reorder();
        assert_eq!(kinds(&manager)[0], SectionKind::Apply);
        assert!(orders_are_dense(manager.sections()));
    }

    #[test]
    fn test_edit_section_kind_mismatch() {
        let mut manager = SectionManager::new();
        let faq = id_of(&manager, SectionKind::Faq);
        let outcome = manager.edit_section(
            &faq,
            SectionPatch::Hero(HeroPatch {
                title: Some("nope".to_string()),
                ..HeroPatch::default()
            }),
        );
        assert!(matches!(
            outcome,
            EditOutcome::Rejected(Rejection::PatchKindMismatch { .. })
        ));
    }

    #[test]
    fn test_apply_template_requires_confirmation() {
        let mut manager = SectionManager::new();
        assert!(manager.template_requires_confirmation());
        assert_eq!(
            manager.apply_template("visual", false),
            EditOutcome::RequiresConfirmation
        );
        assert_eq!(manager.sections().len(), 6);

        assert!(manager.apply_template("visual", true).is_applied());
        assert_eq!(manager.sections().len(), 8);
        assert_eq!(kinds(&manager)[1], SectionKind::Gallery);
        assert!(orders_are_dense(manager.sections()));
    }

    #[test]
    fn test_apply_template_on_empty_needs_no_confirmation() {
        let mut manager = SectionManager::from_document(ContentDocument::new(
            Vec::new(),
            GlobalSettings::default(),
        ));
        assert!(!manager.template_requires_confirmation());
        assert!(manager.apply_template("minimal", false).is_applied());
        assert_eq!(manager.sections().len(), 4);
    }

    #[test]
    fn test_apply_unknown_template() {
        let mut manager = SectionManager::new();
        assert!(matches!(
            manager.apply_template("brochure", true),
            EditOutcome::Rejected(Rejection::UnknownTemplate { .. })
        ));
    }

    #[test]
    fn test_callback_fires_once_per_applied_mutation() {
        let (mut manager, events) = recording();
        let _ = manager.add_section(SectionKind::Video);
        let _ = manager.add_section(SectionKind::Hero);
        let faq = id_of(&manager, SectionKind::Faq);
        let _ = manager.delete_section(&faq, false);
        let _ = manager.toggle_visibility(&faq);

        let events = events.lock().unwrap();
        assert_eq!(events.len(), 2);
        assert!(events[0].opens_editor().is_some());
        assert!(matches!(events[1], ChangeEvent::VisibilityToggled { visible: false, .. }));
        assert!(events.iter().all(|e| e.triggers_preview()));
    }

    #[test]
    fn test_load_replaces_state_and_emits() {
        let (mut manager, events) = recording();
        let record: LegacySettings =
            serde_json::from_value(serde_json::json!({ "sectionOrder": "apply,hero" })).unwrap();
        manager.load(Some(&record));
        assert_eq!(kinds(&manager)[0], SectionKind::Apply);
        assert_eq!(events.lock().unwrap().as_slice(), &[ChangeEvent::Loaded]);
    }

    #[test]
    fn test_order_stays_dense_across_mixed_operations() {
        let mut manager = SectionManager::new();
        let decorative = [
            SectionKind::Custom,
            SectionKind::Gallery,
            SectionKind::Testimonial,
            SectionKind::Carousel,
            SectionKind::Video,
            SectionKind::Points,
            SectionKind::Faq,
        ];
        let mut seed: u64 = 0x5eed;
        for step in 0..200 {
            seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            let pick = (seed >> 33) as usize;
            let ids: Vec<String> = manager.sections().iter().map(|s| s.id.clone()).collect();
            let target = &ids[pick % ids.len()];
            let _ = match step % 5 {
                0 => manager.add_section(decorative[pick % decorative.len()]),
                1 => manager.duplicate_section(target),
                2 => manager.delete_section(target, true),
                3 => manager.move_section(target, pick % (ids.len() + 2)),
                _ => {
                    manager.reorder();
                    EditOutcome::Applied
                }
            };
            assert!(orders_are_dense(manager.sections()), "gap after step {step}");
            assert_eq!(count_of(SectionKind::Hero, manager.sections()), 1);
            assert_eq!(count_of(SectionKind::Apply, manager.sections()), 1);
        }
    }

    #[test]
    fn test_update_global_settings() {
        let mut manager = SectionManager::new();
        assert!(manager
            .update_global_settings(GlobalSettingsPatch {
                design_pattern: Some("classic".to_string()),
                ..GlobalSettingsPatch::default()
            })
            .is_applied());
        assert_eq!(manager.global_settings().design_pattern, "classic");
        assert_eq!(
            manager.get_current_document().global_settings.design_pattern,
            "classic"
        );
    }
}
