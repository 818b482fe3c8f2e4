//! `viasplit` - Caption streams to VIA 3 subtitle annotation projects
//!
//! # Features
//!
//! - **Segmentation**: fixed-size caption windows, optionally aligned to a reference stream
//! - **Project model**: typed VIA 3 documents with referential sanitization
//! - **Assembly**: one media-fragment project per window, ready for the VIA annotator
//! - **Sharing**: optional upload to a VIA project store
//!
//! # Example
//!
//! ```rust
//! use viasplit::{split, Assembler, Caption};
//!
//! let captions = vec![
//!     Caption::new(0.0, 1.2, "Hello"),
//!     Caption::new(1.2, 2.5, "there"),
//!     Caption::new(2.5, 4.0, "everyone"),
//! ];
//!
//! let windows = split(&captions, None, 2)?;
//! let docs = Assembler::new().assemble("https://example.org/talk.mp4", &captions, &windows, "1")?;
//!
//! assert_eq!(docs.len(), 2);
//! assert_eq!(docs[1].file["1"].src, "https://example.org/talk.mp4#t=2.5,4.0");
//! # Ok::<(), viasplit::ConvertError>(())
//! ```

pub mod assemble;
pub mod caption;
pub mod config;
pub mod convert;
pub mod error;
pub mod segment;
pub mod store;
pub mod via;

pub use assemble::{assemble, Assembler, IdGenerator, ProjectTemplate, RandomIds, SequentialIds};
pub use caption::{read_captions, Caption, CaptionFormat};
pub use config::Settings;
pub use convert::{BatchManifest, ConversionRequest, SplitSize};
pub use error::{ConvertError, Result};
pub use segment::{split, Window};
pub use store::{HttpStore, ProjectStore, SharedProject};
pub use via::{sanitize, AnnotationDocument, SanitizeReport};

/// Version of viasplit
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
