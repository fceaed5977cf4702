//! Predefined LP templates. Applying one replaces the whole section list.

use serde::Serialize;

use crate::lp::document::Section;
use crate::lp::registry::SectionKind;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub sections: &'static [SectionKind],
}

const TEMPLATES: &[Template] = &[
    Template {
        id: "standard",
        name: "スタンダード",
        description: "Hero, points, jobs, details, FAQ and apply form",
        sections: &SectionKind::CANONICAL,
    },
    Template {
        id: "visual",
        name: "ビジュアル重視",
        description: "Adds a photo gallery and employee testimonials",
        sections: &[
            SectionKind::Hero,
            SectionKind::Gallery,
            SectionKind::Points,
            SectionKind::Jobs,
            SectionKind::Details,
            SectionKind::Testimonial,
            SectionKind::Faq,
            SectionKind::Apply,
        ],
    },
    Template {
        id: "video",
        name: "動画訴求",
        description: "Leads with a video right after the hero",
        sections: &[
            SectionKind::Hero,
            SectionKind::Video,
            SectionKind::Points,
            SectionKind::Jobs,
            SectionKind::Details,
            SectionKind::Faq,
            SectionKind::Apply,
        ],
    },
    Template {
        id: "minimal",
        name: "シンプル",
        description: "Only the hero, the listings and the apply form",
        sections: &[
            SectionKind::Hero,
            SectionKind::Jobs,
            SectionKind::Details,
            SectionKind::Apply,
        ],
    },
];

pub fn all_templates() -> &'static [Template] {
    TEMPLATES
}

pub fn find_template(id: &str) -> Option<&'static Template> {
    TEMPLATES.iter().find(|t| t.id == id)
}

impl Template {
    /// Fresh sections with new ids and `order = 0..N-1`.
    pub fn instantiate(&self) -> Vec<Section> {
        self.sections
            .iter()
            .enumerate()
            .map(|(order, kind)| Section::new(*kind, order as u32))
            .collect()
    }
}
