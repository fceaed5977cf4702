//! Section type registry — the static catalog of LP section types and their
//! structural constraints.
//!
//! # Constraints
//! - `hero` and `apply` are required: exactly one instance, never deletable.
//! - `jobs` and `details` are optional singletons.
//! - Every other type is optional and unbounded.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::lp::document::Section;

/// Identifies the kind of a section. Serialized as the lowercase `type` tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionKind {
    Hero,
    Points,
    Jobs,
    Details,
    Faq,
    Apply,
    Custom,
    Gallery,
    Testimonial,
    Carousel,
    Video,
}

impl SectionKind {
    /// The six kinds every legacy page is built from, in canonical order.
    pub const CANONICAL: [SectionKind; 6] = [
        SectionKind::Hero,
        SectionKind::Points,
        SectionKind::Jobs,
        SectionKind::Details,
        SectionKind::Faq,
        SectionKind::Apply,
    ];

    pub const ALL: [SectionKind; 11] = [
        SectionKind::Hero,
        SectionKind::Points,
        SectionKind::Jobs,
        SectionKind::Details,
        SectionKind::Faq,
        SectionKind::Apply,
        SectionKind::Custom,
        SectionKind::Gallery,
        SectionKind::Testimonial,
        SectionKind::Carousel,
        SectionKind::Video,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SectionKind::Hero => "hero",
            SectionKind::Points => "points",
            SectionKind::Jobs => "jobs",
            SectionKind::Details => "details",
            SectionKind::Faq => "faq",
            SectionKind::Apply => "apply",
            SectionKind::Custom => "custom",
            SectionKind::Gallery => "gallery",
            SectionKind::Testimonial => "testimonial",
            SectionKind::Carousel => "carousel",
            SectionKind::Video => "video",
        }
    }

    /// Parses a type tag as it appears in legacy order strings. Unknown tags yield `None`.
    pub fn parse(raw: &str) -> Option<SectionKind> {
        let raw = raw.trim();
        SectionKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(raw))
    }

    /// Canonical kinds are the ones the legacy flat schema knows about.
    /// Everything else is decorative and gets inserted before `apply`.
    pub fn is_canonical(self) -> bool {
        SectionKind::CANONICAL.contains(&self)
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Registry entries
// ────────────────────────────────────────────────────────────────────────────

/// One registry entry. Default payloads are produced fresh by
/// `SectionContent::default_for`, never stored here.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionTypeDescriptor {
    pub id: SectionKind,
    pub name: &'static str,
    pub required: bool,
    /// `None` means unbounded.
    pub max_instances: Option<usize>,
}

static REGISTRY: [SectionTypeDescriptor; 11] = [
    SectionTypeDescriptor {
        id: SectionKind::Hero,
        name: "メインビジュアル",
        required: true,
        max_instances: Some(1),
    },
    SectionTypeDescriptor {
        id: SectionKind::Points,
        name: "募集ポイント",
        required: false,
        max_instances: None,
    },
    SectionTypeDescriptor {
        id: SectionKind::Jobs,
        name: "求人一覧",
        required: false,
        max_instances: Some(1),
    },
    SectionTypeDescriptor {
        id: SectionKind::Details,
        name: "募集要項",
        required: false,
        max_instances: Some(1),
    },
    SectionTypeDescriptor {
        id: SectionKind::Faq,
        name: "よくある質問",
        required: false,
        max_instances: None,
    },
    SectionTypeDescriptor {
        id: SectionKind::Apply,
        name: "応募フォーム",
        required: true,
        max_instances: Some(1),
    },
    SectionTypeDescriptor {
        id: SectionKind::Custom,
        name: "カスタム",
        required: false,
        max_instances: None,
    },
    SectionTypeDescriptor {
        id: SectionKind::Gallery,
        name: "ギャラリー",
        required: false,
        max_instances: None,
    },
    SectionTypeDescriptor {
        id: SectionKind::Testimonial,
        name: "社員の声",
        required: false,
        max_instances: None,
    },
    SectionTypeDescriptor {
        id: SectionKind::Carousel,
        name: "カルーセル",
        required: false,
        max_instances: None,
    },
    SectionTypeDescriptor {
        id: SectionKind::Video,
        name: "動画",
        required: false,
        max_instances: None,
    },
];

/// Returns the full catalog in registry order.
pub fn all_types() -> &'static [SectionTypeDescriptor] {
    &REGISTRY
}

pub fn lookup(kind: SectionKind) -> Option<&'static SectionTypeDescriptor> {
    REGISTRY.iter().find(|d| d.id == kind)
}

/// True iff another section of `kind` fits under its `max_instances` bound.
pub fn can_add(kind: SectionKind, sections: &[Section]) -> bool {
    let Some(descriptor) = lookup(kind) else {
        return false;
    };
    match descriptor.max_instances {
        None => true,
        Some(max) => count_of(kind, sections) < max,
    }
}

/// Deletion is gated on the `required` flag only. A non-required kind may be
/// deleted down to zero instances.
pub fn can_delete(section: &Section, _sections: &[Section]) -> bool {
    lookup(section.kind()).is_some_and(|d| !d.required)
}

/// Fresh section id of the form `<kind>-<12 hex chars>`.
pub fn generate_id(kind: SectionKind) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}-{}", kind.as_str(), &suffix[..12])
}

pub fn count_of(kind: SectionKind, sections: &[Section]) -> usize {
    sections.iter().filter(|s| s.kind() == kind).count()
}
