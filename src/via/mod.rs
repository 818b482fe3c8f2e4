//! VIA 3 annotation project model
//!
//! In-memory form of the project documents read by the VGG Image Annotator
//! (VIA 3) and its project store. Field names and integer codes match the
//! serialized format exactly.
//!
//! # Structure
//!
//! - **project** - identity, revision placeholders, owned views
//! - **config** - file location prefixes and UI options
//! - **attribute** - declared annotatable properties
//! - **file** / **view** - media and the views that present them
//! - **metadata** - timed or spatial annotations attached to a view
//!
//! # Example
//!
//! ```rust
//! use viasplit::via::{AnnotationDocument, Attribute, Metadata, Project, ViaConfig, View};
//!
//! let mut doc = AnnotationDocument::new(Project::new("demo", "me", None), ViaConfig::default());
//! doc.attribute.insert("1".into(), Attribute::subtitle());
//! doc.view.insert("1".into(), View::single("1"));
//! doc.metadata.insert("1_a".into(), Metadata::segment("1", 0.0, 1.5, "1", "Hello")?);
//!
//! // No file "1" yet, so the metadata entry is dropped
//! let report = doc.sanitize();
//! assert_eq!(report.dropped_metadata, vec!["1_a"]);
//! # Ok::<(), viasplit::ConvertError>(())
//! ```

pub mod codes;
pub mod document;
pub mod project;
pub mod schema;
pub mod value;

pub use codes::{AnchorKind, AttributeType, FileType, Shape, SourceLocation};
pub use document::{sanitize, AnnotationDocument, SanitizeReport};
pub use project::{
    FileConfig, Project, RevisionTimestamp, ViaConfig, PROJECT_ID_PLACEHOLDER,
    REVISION_ID_PLACEHOLDER, REVISION_TIMESTAMP_PLACEHOLDER,
};
pub use schema::{Attribute, MediaFile, Metadata, View};
pub use value::Value;
