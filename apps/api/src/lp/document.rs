//! LP content document model (schema version "2.0").
//!
//! A document is an ordered list of typed sections plus global settings.
//! Each section shares the envelope `{id, type, order, visible}`; the `type`
//! tag selects the shape of `data` and `layout`.

use serde::{Deserialize, Serialize};

use crate::lp::registry::{generate_id, SectionKind};

pub const CONTENT_VERSION: &str = "2.0";
pub const DEFAULT_DESIGN_PATTERN: &str = "modern";
pub const DEFAULT_LAYOUT_STYLE: &str = "modern";
pub const DEFAULT_CTA_TEXT: &str = "今すぐ応募する";

// ────────────────────────────────────────────────────────────────────────────
// Payloads
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HeroData {
    pub title: String,
    pub subtitle: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PointItem {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PointsData {
    pub title: String,
    pub points: Vec<PointItem>,
}

impl Default for PointsData {
    fn default() -> Self {
        PointsData {
            title: "募集ポイント".to_string(),
            points: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ColumnsLayout {
    pub columns: u8,
}

impl Default for ColumnsLayout {
    fn default() -> Self {
        ColumnsLayout { columns: 3 }
    }
}

/// Title-only placeholder; the listing itself is filled in at render time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlaceholderData {
    pub title: String,
}

impl PlaceholderData {
    pub fn titled(title: &str) -> Self {
        PlaceholderData {
            title: title.to_string(),
        }
    }
}

impl Default for PlaceholderData {
    fn default() -> Self {
        PlaceholderData::titled("")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FaqItem {
    pub id: String,
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FaqData {
    pub title: String,
    pub items: Vec<FaqItem>,
}

impl Default for FaqData {
    fn default() -> Self {
        FaqData {
            title: "よくある質問".to_string(),
            items: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MediaItem {
    pub url: String,
    pub caption: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MediaData {
    pub title: String,
    pub images: Vec<MediaItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MediaLayout {
    pub columns: u8,
    pub style: String,
}

impl MediaLayout {
    fn gallery() -> Self {
        MediaLayout {
            columns: 3,
            style: "grid".to_string(),
        }
    }

    fn carousel() -> Self {
        MediaLayout {
            columns: 1,
            style: "slide".to_string(),
        }
    }
}

impl Default for MediaLayout {
    fn default() -> Self {
        MediaLayout::gallery()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TestimonialItem {
    pub name: String,
    pub role: String,
    pub quote: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TestimonialData {
    pub title: String,
    pub items: Vec<TestimonialItem>,
}

impl Default for TestimonialData {
    fn default() -> Self {
        TestimonialData {
            title: "社員の声".to_string(),
            items: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StyleLayout {
    pub style: String,
}

impl Default for StyleLayout {
    fn default() -> Self {
        StyleLayout {
            style: "card".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VideoData {
    pub url: String,
    /// Source kind: `youtube`, `vimeo` or `file`.
    #[serde(rename = "type")]
    pub source: String,
    pub description: String,
}

impl Default for VideoData {
    fn default() -> Self {
        VideoData {
            url: String::new(),
            source: "youtube".to_string(),
            description: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VideoLayout {
    pub aspect_ratio: String,
    pub full_width: bool,
}

impl Default for VideoLayout {
    fn default() -> Self {
        VideoLayout {
            aspect_ratio: "16:9".to_string(),
            full_width: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CustomButton {
    pub text: String,
    pub url: String,
    pub style: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CustomData {
    pub title: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub button: Option<CustomButton>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CustomLayout {
    pub variant: String,
}

impl Default for CustomLayout {
    fn default() -> Self {
        CustomLayout {
            variant: "text".to_string(),
        }
    }
}

/// Layout for kinds that have nothing to lay out. Serializes as `{}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NoLayout {}

/// The apply section carries no data; the form is rendered externally.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NoData {}

// ────────────────────────────────────────────────────────────────────────────
// Section content (one variant per kind)
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SectionContent {
    Hero {
        #[serde(default)]
        data: HeroData,
        #[serde(default)]
        layout: NoLayout,
    },
    Points {
        #[serde(default)]
        data: PointsData,
        #[serde(default)]
        layout: ColumnsLayout,
    },
    Jobs {
        #[serde(default)]
        data: PlaceholderData,
        #[serde(default)]
        layout: NoLayout,
    },
    Details {
        #[serde(default)]
        data: PlaceholderData,
        #[serde(default)]
        layout: NoLayout,
    },
    Faq {
        #[serde(default)]
        data: FaqData,
        #[serde(default)]
        layout: NoLayout,
    },
    Apply {
        #[serde(default)]
        data: NoData,
        #[serde(default)]
        layout: NoLayout,
    },
    Custom {
        #[serde(default)]
        data: CustomData,
        #[serde(default)]
        layout: CustomLayout,
    },
    Gallery {
        #[serde(default)]
        data: MediaData,
        #[serde(default)]
        layout: MediaLayout,
    },
    Testimonial {
        #[serde(default)]
        data: TestimonialData,
        #[serde(default)]
        layout: StyleLayout,
    },
    Carousel {
        #[serde(default)]
        data: MediaData,
        #[serde(default = "MediaLayout::carousel")]
        layout: MediaLayout,
    },
    Video {
        #[serde(default)]
        data: VideoData,
        #[serde(default)]
        layout: VideoLayout,
    },
}

impl SectionContent {
    /// Builds a fresh default payload. Every call returns newly owned values,
    /// so sibling instances of one kind never share state.
    pub fn default_for(kind: SectionKind) -> Self {
        match kind {
            SectionKind::Hero => SectionContent::Hero {
                data: HeroData::default(),
                layout: NoLayout::default(),
            },
            SectionKind::Points => SectionContent::Points {
                data: PointsData::default(),
                layout: ColumnsLayout::default(),
            },
            SectionKind::Jobs => SectionContent::Jobs {
                data: PlaceholderData::titled("募集中の求人"),
                layout: NoLayout::default(),
            },
            SectionKind::Details => SectionContent::Details {
                data: PlaceholderData::titled("募集要項"),
                layout: NoLayout::default(),
            },
            SectionKind::Faq => SectionContent::Faq {
                data: FaqData::default(),
                layout: NoLayout::default(),
            },
            SectionKind::Apply => SectionContent::Apply {
                data: NoData::default(),
                layout: NoLayout::default(),
            },
            SectionKind::Custom => SectionContent::Custom {
                data: CustomData::default(),
                layout: CustomLayout::default(),
            },
            SectionKind::Gallery => SectionContent::Gallery {
                data: MediaData {
                    title: "ギャラリー".to_string(),
                    images: Vec::new(),
                },
                layout: MediaLayout::gallery(),
            },
            SectionKind::Testimonial => SectionContent::Testimonial {
                data: TestimonialData::default(),
                layout: StyleLayout::default(),
            },
            SectionKind::Carousel => SectionContent::Carousel {
                data: MediaData::default(),
                layout: MediaLayout::carousel(),
            },
            SectionKind::Video => SectionContent::Video {
                data: VideoData::default(),
                layout: VideoLayout::default(),
            },
        }
    }

    pub fn kind(&self) -> SectionKind {
        match self {
            SectionContent::Hero { .. } => SectionKind::Hero,
            SectionContent::Points { .. } => SectionKind::Points,
            SectionContent::Jobs { .. } => SectionKind::Jobs,
            SectionContent::Details { .. } => SectionKind::Details,
            SectionContent::Faq { .. } => SectionKind::Faq,
            SectionContent::Apply { .. } => SectionKind::Apply,
            SectionContent::Custom { .. } => SectionKind::Custom,
            SectionContent::Gallery { .. } => SectionKind::Gallery,
            SectionContent::Testimonial { .. } => SectionKind::Testimonial,
            SectionContent::Carousel { .. } => SectionKind::Carousel,
            SectionContent::Video { .. } => SectionKind::Video,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Section envelope and document
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub id: String,
    pub order: u32,
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(flatten)]
    pub content: SectionContent,
}

fn default_visible() -> bool {
    true
}

impl Section {
    /// A visible section of `kind` with a fresh id and default payload.
    pub fn new(kind: SectionKind, order: u32) -> Self {
        Section::with_content(SectionContent::default_for(kind), order)
    }

    pub fn with_content(content: SectionContent, order: u32) -> Self {
        Section {
            id: generate_id(content.kind()),
            order,
            visible: true,
            content,
        }
    }

    pub fn kind(&self) -> SectionKind {
        self.content.kind()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TrackingSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gtm_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ga_measurement_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta_pixel_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_tag_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tiktok_pixel_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MetaSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ogp_image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GlobalSettings {
    pub design_pattern: String,
    pub layout_style: String,
    pub cta_text: String,
    pub tracking: TrackingSettings,
    pub meta: MetaSettings,
}

impl Default for GlobalSettings {
    fn default() -> Self {
        GlobalSettings {
            design_pattern: DEFAULT_DESIGN_PATTERN.to_string(),
            layout_style: DEFAULT_LAYOUT_STYLE.to_string(),
            cta_text: DEFAULT_CTA_TEXT.to_string(),
            tracking: TrackingSettings::default(),
            meta: MetaSettings::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentDocument {
    pub version: String,
    pub sections: Vec<Section>,
    #[serde(default)]
    pub global_settings: GlobalSettings,
}

impl ContentDocument {
    pub fn new(sections: Vec<Section>, global_settings: GlobalSettings) -> Self {
        ContentDocument {
            version: CONTENT_VERSION.to_string(),
            sections,
            global_settings,
        }
    }

    pub fn is_current(&self) -> bool {
        self.version == CONTENT_VERSION
    }

    /// First section of `kind` by `order`.
    pub fn first_of(&self, kind: SectionKind) -> Option<&Section> {
        self.sections
            .iter()
            .filter(|s| s.kind() == kind)
            .min_by_key(|s| s.order)
    }

    pub fn first_of_mut(&mut self, kind: SectionKind) -> Option<&mut Section> {
        self.sections
            .iter_mut()
            .filter(|s| s.kind() == kind)
            .min_by_key(|s| s.order)
    }

    /// Section kinds in `order` sequence.
    pub fn kinds_in_order(&self) -> Vec<SectionKind> {
        let mut sorted: Vec<&Section> = self.sections.iter().collect();
        sorted.sort_by_key(|s| s.order);
        sorted.into_iter().map(|s| s.kind()).collect()
    }
}

/// Stable-sorts by current `order`, then reassigns `order = 0..N-1` by position.
pub fn normalize_orders(sections: &mut [Section]) {
    sections.sort_by_key(|s| s.order);
    for (position, section) in sections.iter_mut().enumerate() {
        section.order = position as u32;
    }
}

/// True when the orders occupy exactly `0..N-1` with no gaps or duplicates.
pub fn orders_are_dense(sections: &[Section]) -> bool {
    let mut orders: Vec<u32> = sections.iter().map(|s| s.order).collect();
    orders.sort_unstable();
    orders.iter().enumerate().all(|(i, o)| *o == i as u32)
}
