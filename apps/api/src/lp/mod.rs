// Landing-page content model: section registry, v2 document, legacy migration,
// and the per-session section manager.

pub mod document;
pub mod handlers;
pub mod legacy;
pub mod manager;
pub mod migrator;
pub mod patch;
pub mod registry;
pub mod store;
pub mod templates;

// Re-export the API consumed by the dashboard UI and the HTTP layer.
pub use document::{ContentDocument, GlobalSettings, Section, SectionContent};
pub use legacy::{parse_legacy_faq, LegacySettings};
pub use manager::{ChangeEvent, EditOutcome, Rejection, SectionManager};
pub use migrator::{convert_to_legacy, create_empty_v2_content, migrate_to_v2};
pub use registry::SectionKind;
