//! Document assembly
//!
//! Turns windows over a caption sequence into one subtitle annotation
//! project per window. Every project points at the same video through a
//! `#t=start,end` media fragment, so the annotator only loads its own slice.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;

use crate::caption::Caption;
use crate::error::{ConvertError, Result};
use crate::segment::{round_ms, Window};
use crate::via::{
    AnnotationDocument, Attribute, FileType, MediaFile, Metadata, Project, SourceLocation,
    Value, ViaConfig, View,
};

/// Id of the single file in each assembled project
pub const FILE_ID: &str = "1";
/// Id of the single view in each assembled project
pub const VIEW_ID: &str = "1";
/// Id of the subtitle attribute
pub const SUBTITLE_ATTRIBUTE_ID: &str = "1";

/// Strategy for metadata identifiers
pub trait IdGenerator {
    /// Next id, formatted as `<prefix>_<suffix>`
    fn next_id(&mut self, prefix: &str) -> String;
}

/// Random alphanumeric ids
///
/// Collisions are possible but negligible for subtitle-sized projects. Use
/// [`SequentialIds`] where ids must be unique or reproducible.
#[derive(Debug, Clone)]
pub struct RandomIds {
    length: usize,
}

impl RandomIds {
    #[must_use]
    pub fn new(length: usize) -> Self {
        Self { length }
    }
}

impl Default for RandomIds {
    fn default() -> Self {
        Self::new(8)
    }
}

impl IdGenerator for RandomIds {
    fn next_id(&mut self, prefix: &str) -> String {
        let suffix: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(self.length)
            .map(char::from)
            .collect();
        format!("{prefix}_{suffix}")
    }
}

/// Counter-based ids, deterministic across runs
#[derive(Debug, Clone, Default)]
pub struct SequentialIds {
    next: u64,
}

impl IdGenerator for SequentialIds {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next += 1;
        format!("{prefix}_{:06}", self.next)
    }
}

impl<G: IdGenerator + ?Sized> IdGenerator for Box<G> {
    fn next_id(&mut self, prefix: &str) -> String {
        (**self).next_id(prefix)
    }
}

/// Project-level fields shared by every assembled document
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectTemplate {
    pub name: String,
    pub creator: String,
    pub data_format_version: String,
    /// Fixed creation time; `None` stamps each document when it is built
    pub created: Option<DateTime<Utc>>,
    pub ui: BTreeMap<String, Value>,
}

impl Default for ProjectTemplate {
    fn default() -> Self {
        Self {
            name: "Unnamed VIA Project".to_string(),
            creator: "https://github.com/IMG-PRCSNG/via-utils".to_string(),
            data_format_version: "3.1.1".to_string(),
            created: None,
            ui: default_ui(),
        }
    }
}

/// UI options tuned for subtitle editing
#[must_use]
pub fn default_ui() -> BTreeMap<String, Value> {
    BTreeMap::from([
        ("file_content_align".to_string(), Value::from("center")),
        ("file_metadata_editor_visible".to_string(), Value::from(true)),
        ("spatial_metadata_editor_visible".to_string(), Value::from(true)),
        ("spatial_region_label_attribute_id".to_string(), Value::from("")),
        ("gtimeline_visible_row_count".to_string(), Value::from("4")),
    ])
}

/// Builds subtitle projects from caption windows
pub struct Assembler<G = RandomIds> {
    template: ProjectTemplate,
    ids: G,
}

impl Assembler<RandomIds> {
    /// Assembler with the default template and random ids
    #[must_use]
    pub fn new() -> Self {
        Self::with_ids(ProjectTemplate::default(), RandomIds::default())
    }
}

impl Default for Assembler<RandomIds> {
    fn default() -> Self {
        Self::new()
    }
}

impl<G: IdGenerator> Assembler<G> {
    /// Assembler with a custom template and id strategy
    pub fn with_ids(template: ProjectTemplate, ids: G) -> Self {
        Self { template, ids }
    }

    #[must_use]
    pub fn template(&self) -> &ProjectTemplate {
        &self.template
    }

    /// Build one sanitized project per window
    ///
    /// Each project holds one video file whose source is `video_ref` with a
    /// `#t=start,end` fragment, one view, the subtitle attribute under
    /// `attribute_id`, and a temporal segment for every primary caption the
    /// window covers.
    pub fn assemble(
        &mut self,
        video_ref: &str,
        primary: &[Caption],
        windows: &[Window],
        attribute_id: &str,
    ) -> Result<Vec<AnnotationDocument>> {
        let base = strip_fragment(video_ref);
        let fname = file_name(base);
        let loc = source_location(base);

        windows
            .iter()
            .enumerate()
            .map(|(i, window)| {
                let captions = window.captions(primary).ok_or_else(|| {
                    ConvertError::InvalidInput(format!(
                        "window {i} covers captions {}..={} but only {} exist",
                        window.first,
                        window.last,
                        primary.len()
                    ))
                })?;

                let file = MediaFile {
                    fid: FILE_ID.to_string(),
                    fname: fname.to_string(),
                    kind: FileType::Video,
                    loc,
                    src: media_fragment(base, window),
                };
                self.build(file, captions, attribute_id)
            })
            .collect()
    }

    fn build(
        &mut self,
        file: MediaFile,
        captions: &[Caption],
        attribute_id: &str,
    ) -> Result<AnnotationDocument> {
        let template = &self.template;
        let project = Project::new(&template.name, &template.creator, template.created)
            .with_data_format_version(&template.data_format_version)
            .with_views(vec![VIEW_ID.to_string()]);

        let mut doc = AnnotationDocument::new(project, ViaConfig::with_ui(template.ui.clone()));
        doc.attribute
            .insert(attribute_id.to_string(), Attribute::subtitle());
        doc.view.insert(VIEW_ID.to_string(), View::single(&file.fid));
        doc.file.insert(file.fid.clone(), file);

        for caption in captions {
            let metadata = Metadata::segment(
                VIEW_ID,
                round_ms(caption.start),
                round_ms(caption.end),
                attribute_id,
                caption.text.as_str(),
            )?;
            doc.metadata.insert(self.ids.next_id(VIEW_ID), metadata);
        }

        let report = doc.sanitize();
        if !report.is_clean() {
            tracing::warn!(
                "Assembled project dropped {} metadata entries",
                report.dropped_metadata.len()
            );
        }

        Ok(doc)
    }
}

/// Build sanitized subtitle projects with the default template and random ids
pub fn assemble(
    video_ref: &str,
    primary: &[Caption],
    windows: &[Window],
    attribute_id: &str,
) -> Result<Vec<AnnotationDocument>> {
    Assembler::new().assemble(video_ref, primary, windows, attribute_id)
}

/// `video_ref` without any `#fragment`
fn strip_fragment(video_ref: &str) -> &str {
    video_ref.split_once('#').map_or(video_ref, |(base, _)| base)
}

/// Last path segment of a media reference
fn file_name(base: &str) -> &str {
    base.rsplit('/').next().unwrap_or(base)
}

fn source_location(base: &str) -> SourceLocation {
    if base.starts_with("file://") {
        SourceLocation::UriFile
    } else {
        SourceLocation::UriHttp
    }
}

/// `base#t=start,end` with seconds printed as `2.0`, `12.345`
fn media_fragment(base: &str, window: &Window) -> String {
    format!(
        "{base}#t={},{}",
        format_seconds(window.start),
        format_seconds(window.end)
    )
}

fn format_seconds(seconds: f64) -> String {
    if seconds.fract() == 0.0 {
        format!("{seconds:.1}")
    } else {
        format!("{seconds}")
    }
}
