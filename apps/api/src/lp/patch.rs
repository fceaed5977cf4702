//! Typed partial updates for section payloads and global settings.
//!
//! Every field is optional; absent fields are left untouched. Lists are
//! replaced wholesale in the order given. For nullable fields (images,
//! buttons) an explicit `null` clears the value.

use serde::{Deserialize, Deserializer, Serialize};

use crate::lp::document::{
    CustomButton, FaqItem, GlobalSettings, MediaItem, MetaSettings, PointItem, SectionContent,
    TestimonialItem, TrackingSettings,
};
use crate::lp::manager::Rejection;
use crate::lp::registry::SectionKind;

/// Distinguishes an absent field (`None`) from an explicit `null` (`Some(None)`).
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HeroPatch {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    #[serde(deserialize_with = "nullable")]
    pub image: Option<Option<String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PointsPatch {
    pub title: Option<String>,
    pub columns: Option<u8>,
    pub points: Option<Vec<PointItem>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TitlePatch {
    pub title: Option<String>,
}

/// One FAQ entry as edited. Ids are reassigned on apply.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FaqEntry {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FaqPatch {
    pub title: Option<String>,
    pub items: Option<Vec<FaqEntry>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MediaPatch {
    pub title: Option<String>,
    pub columns: Option<u8>,
    pub style: Option<String>,
    pub images: Option<Vec<MediaItem>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TestimonialPatch {
    pub title: Option<String>,
    pub style: Option<String>,
    pub items: Option<Vec<TestimonialItem>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VideoPatch {
    pub url: Option<String>,
    pub video_type: Option<String>,
    pub description: Option<String>,
    pub aspect_ratio: Option<String>,
    pub full_width: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CustomPatch {
    pub variant: Option<String>,
    pub title: Option<String>,
    pub content: Option<String>,
    #[serde(deserialize_with = "nullable")]
    pub image: Option<Option<String>>,
    #[serde(deserialize_with = "nullable")]
    pub button: Option<Option<CustomButton>>,
}

/// A partial update for one section. The tag must match the section's kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SectionPatch {
    Hero(HeroPatch),
    Points(PointsPatch),
    Jobs(TitlePatch),
    Details(TitlePatch),
    Faq(FaqPatch),
    Custom(CustomPatch),
    Gallery(MediaPatch),
    Testimonial(TestimonialPatch),
    Carousel(MediaPatch),
    Video(VideoPatch),
}

impl SectionPatch {
    pub fn kind(&self) -> SectionKind {
        match self {
            SectionPatch::Hero(_) => SectionKind::Hero,
            SectionPatch::Points(_) => SectionKind::Points,
            SectionPatch::Jobs(_) => SectionKind::Jobs,
            SectionPatch::Details(_) => SectionKind::Details,
            SectionPatch::Faq(_) => SectionKind::Faq,
            SectionPatch::Custom(_) => SectionKind::Custom,
            SectionPatch::Gallery(_) => SectionKind::Gallery,
            SectionPatch::Testimonial(_) => SectionKind::Testimonial,
            SectionPatch::Carousel(_) => SectionKind::Carousel,
            SectionPatch::Video(_) => SectionKind::Video,
        }
    }

    /// Applies the patch in place. A kind mismatch leaves `content` untouched.
    pub fn apply(self, content: &mut SectionContent) -> Result<(), Rejection> {
        let found = self.kind();
        match (self, content) {
            (SectionPatch::Hero(p), SectionContent::Hero { data, .. }) => {
                set(&mut data.title, p.title);
                set(&mut data.subtitle, p.subtitle);
                set(&mut data.image, p.image.map(non_blank));
            }
            (SectionPatch::Points(p), SectionContent::Points { data, layout }) => {
                set(&mut data.title, p.title);
                set(&mut layout.columns, p.columns);
                set(&mut data.points, p.points);
            }
            (SectionPatch::Jobs(p), SectionContent::Jobs { data, .. })
            | (SectionPatch::Details(p), SectionContent::Details { data, .. }) => {
                set(&mut data.title, p.title);
            }
            (SectionPatch::Faq(p), SectionContent::Faq { data, .. }) => {
                set(&mut data.title, p.title);
                if let Some(entries) = p.items {
                    data.items = entries
                        .into_iter()
                        .enumerate()
                        .map(|(i, entry)| FaqItem {
                            id: format!("faq-{}", i + 1),
                            question: entry.question,
                            answer: entry.answer,
                        })
                        .collect();
                }
            }
            (SectionPatch::Custom(p), SectionContent::Custom { data, layout }) => {
                set(&mut layout.variant, p.variant);
                set(&mut data.title, p.title);
                set(&mut data.content, p.content);
                set(&mut data.image, p.image.map(non_blank));
                set(&mut data.button, p.button);
            }
            (SectionPatch::Gallery(p), SectionContent::Gallery { data, layout })
            | (SectionPatch::Carousel(p), SectionContent::Carousel { data, layout }) => {
                set(&mut data.title, p.title);
                set(&mut layout.columns, p.columns);
                set(&mut layout.style, p.style);
                set(&mut data.images, p.images);
            }
            (SectionPatch::Testimonial(p), SectionContent::Testimonial { data, layout }) => {
                set(&mut data.title, p.title);
                set(&mut layout.style, p.style);
                set(&mut data.items, p.items);
            }
            (SectionPatch::Video(p), SectionContent::Video { data, layout }) => {
                set(&mut data.url, p.url);
                set(&mut data.source, p.video_type);
                set(&mut data.description, p.description);
                set(&mut layout.aspect_ratio, p.aspect_ratio);
                set(&mut layout.full_width, p.full_width);
            }
            (_, content) => {
                return Err(Rejection::PatchKindMismatch {
                    expected: content.kind(),
                    found,
                })
            }
        }
        Ok(())
    }
}

fn set<T>(slot: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *slot = value;
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Partial update of the document-wide settings. `tracking` and `meta` are
/// replaced as a whole when present.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GlobalSettingsPatch {
    pub design_pattern: Option<String>,
    pub layout_style: Option<String>,
    pub cta_text: Option<String>,
    pub tracking: Option<TrackingSettings>,
    pub meta: Option<MetaSettings>,
}

impl GlobalSettingsPatch {
    pub fn apply(self, settings: &mut GlobalSettings) {
        set(&mut settings.design_pattern, self.design_pattern);
        set(&mut settings.layout_style, self.layout_style);
        set(&mut settings.cta_text, self.cta_text);
        set(&mut settings.tracking, self.tracking);
        set(&mut settings.meta, self.meta);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_hero_patch_updates_only_given_fields() {
        let mut content = SectionContent::default_for(SectionKind::Hero);
        let patch: SectionPatch = serde_json::from_value(json!({
            "type": "hero",
            "title": "We are hiring",
            "image": "https://cdn.example.com/hero.webp"
        }))
        .unwrap();
        patch.apply(&mut content).unwrap();
        match content {
            SectionContent::Hero { data, .. } => {
                assert_eq!(data.title, "We are hiring");
                assert_eq!(data.subtitle, "");
                assert_eq!(data.image.as_deref(), Some("https://cdn.example.com/hero.webp"));
            }
            other => panic!("unexpected content {other:?}"),
        }
    }

    #[test]
    fn test_null_clears_custom_button() {
        let mut content = SectionContent::default_for(SectionKind::Custom);
        if let SectionContent::Custom { data, .. } = &mut content {
            data.button = Some(CustomButton {
                text: "Apply".to_string(),
                url: "/apply".to_string(),
                style: "primary".to_string(),
            });
        }
        let patch: SectionPatch =
            serde_json::from_value(json!({ "type": "custom", "button": null, "variant": "banner" }))
                .unwrap();
        patch.apply(&mut content).unwrap();
        match content {
            SectionContent::Custom { data, layout } => {
                assert!(data.button.is_none());
                assert_eq!(layout.variant, "banner");
            }
            other => panic!("unexpected content {other:?}"),
        }
    }

    #[test]
    fn test_faq_patch_reassigns_ids_in_order() {
        let mut content = SectionContent::default_for(SectionKind::Faq);
        SectionPatch::Faq(FaqPatch {
            title: None,
            items: Some(vec![
                FaqEntry {
                    question: "Second?".to_string(),
                    answer: "b".to_string(),
                },
                FaqEntry {
                    question: "First?".to_string(),
                    answer: "a".to_string(),
                },
            ]),
        })
        .apply(&mut content)
        .unwrap();
        match content {
            SectionContent::Faq { data, .. } => {
                assert_eq!(data.items[0].id, "faq-1");
                assert_eq!(data.items[0].question, "Second?");
                assert_eq!(data.items[1].id, "faq-2");
            }
            other => panic!("unexpected content {other:?}"),
        }
    }

    #[test]
    fn test_carousel_patch_shares_media_shape() {
        let mut content = SectionContent::default_for(SectionKind::Carousel);
        SectionPatch::Carousel(MediaPatch {
            style: Some("fade".to_string()),
            images: Some(vec![MediaItem {
                url: "a.jpg".to_string(),
                caption: "Office".to_string(),
                alt: Some("office".to_string()),
            }]),
            ..MediaPatch::default()
        })
        .apply(&mut content)
        .unwrap();
        match content {
            SectionContent::Carousel { data, layout } => {
                assert_eq!(layout.style, "fade");
                assert_eq!(layout.columns, 1);
                assert_eq!(data.images.len(), 1);
            }
            other => panic!("unexpected content {other:?}"),
        }
    }

    #[test]
    fn test_video_patch() {
        let mut content = SectionContent::default_for(SectionKind::Video);
        let patch: SectionPatch = serde_json::from_value(json!({
            "type": "video",
            "url": "https://youtu.be/abc",
            "videoType": "youtube",
            "fullWidth": true
        }))
        .unwrap();
        patch.apply(&mut content).unwrap();
        match content {
            SectionContent::Video { data, layout } => {
                assert_eq!(data.url, "https://youtu.be/abc");
                assert!(layout.full_width);
                assert_eq!(layout.aspect_ratio, "16:9");
            }
            other => panic!("unexpected content {other:?}"),
        }
    }

    #[test]
    fn test_kind_mismatch_is_rejected_and_leaves_content() {
        let mut content = SectionContent::default_for(SectionKind::Points);
        let before = content.clone();
        let err = SectionPatch::Hero(HeroPatch {
            title: Some("x".to_string()),
            ..HeroPatch::default()
        })
        .apply(&mut content)
        .unwrap_err();
        assert!(matches!(
            err,
            Rejection::PatchKindMismatch {
                expected: SectionKind::Points,
                found: SectionKind::Hero
            }
        ));
        assert_eq!(content, before);
    }

    #[test]
    fn test_global_settings_patch() {
        let mut settings = GlobalSettings::default();
        GlobalSettingsPatch {
            cta_text: Some("Apply today".to_string()),
            tracking: Some(TrackingSettings {
                gtm_id: Some("GTM-9".to_string()),
                ..TrackingSettings::default()
            }),
            ..GlobalSettingsPatch::default()
        }
        .apply(&mut settings);
        assert_eq!(settings.cta_text, "Apply today");
        assert_eq!(settings.design_pattern, "modern");
        assert_eq!(settings.tracking.gtm_id.as_deref(), Some("GTM-9"));
    }
}
