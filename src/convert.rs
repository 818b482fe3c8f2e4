//! Caption file to VIA project conversion
//!
//! Reads the caption files of a request, splits them, assembles the projects
//! and publishes them to disk and optionally to a project store. A failure
//! in one request or one upload never stops the others.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{info, warn};

use crate::assemble::{Assembler, IdGenerator, SUBTITLE_ATTRIBUTE_ID};
use crate::caption::{self, Caption};
use crate::segment::{self, Window};
use crate::store::ProjectStore;
use crate::via::AnnotationDocument;

/// How many captions go into each project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SplitSize {
    /// A single project with every caption
    #[default]
    Whole,
    /// Fixed number of captions per project
    PerSplit(usize),
    /// Aim for this many projects
    Count(usize),
}

impl SplitSize {
    /// From mutually exclusive `--segments-per-split` / `--num-splits` values
    #[must_use]
    pub fn from_options(per_split: Option<usize>, count: Option<usize>) -> Self {
        match (per_split, count) {
            (Some(n), _) => Self::PerSplit(n),
            (None, Some(k)) => Self::Count(k),
            (None, None) => Self::Whole,
        }
    }

    /// Group size for a chunked stream of `len` captions
    ///
    /// `Count` divides with truncation, so asking for more projects than
    /// there are captions yields 0, which the segmentation engine rejects.
    #[must_use]
    pub fn group_size(self, len: usize) -> usize {
        match self {
            Self::Whole => len,
            Self::PerSplit(n) => n,
            Self::Count(0) => 0,
            Self::Count(k) => len / k,
        }
    }
}

/// One video and its caption files
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionRequest {
    /// Video URL or path the projects point at
    pub video: String,
    /// Primary captions, which become the project metadata
    pub captions: PathBuf,
    /// Reference captions that guide split boundaries
    pub reference: Option<PathBuf>,
    pub split: SplitSize,
}

/// Captions and windows computed for a request
#[derive(Debug, Clone)]
pub struct Segmentation {
    pub primary: Vec<Caption>,
    pub windows: Vec<Window>,
}

/// Read and validate captions, then compute the windows
pub fn segment_files(
    captions: &Path,
    reference: Option<&Path>,
    split: SplitSize,
) -> Result<Segmentation> {
    let primary = read_valid(captions)?;
    let secondary = reference.map(read_valid).transpose()?;

    let chunked = secondary.as_deref().unwrap_or(&primary);
    let group_size = split.group_size(chunked.len());

    let windows = segment::split(&primary, secondary.as_deref(), group_size)?;
    info!(
        "Split {} captions into {} windows (group size {group_size}{})",
        primary.len(),
        windows.len(),
        if secondary.is_some() { ", aligned" } else { "" }
    );

    Ok(Segmentation { primary, windows })
}

fn read_valid(path: &Path) -> Result<Vec<Caption>> {
    let captions = caption::read_captions(path)?;
    caption::validate(&captions).with_context(|| format!("malformed captions in {}", path.display()))?;
    Ok(captions)
}

/// Convert one request into sanitized projects
pub fn run<G: IdGenerator>(
    request: &ConversionRequest,
    assembler: &mut Assembler<G>,
) -> Result<Vec<AnnotationDocument>> {
    let Segmentation { primary, windows } =
        segment_files(&request.captions, request.reference.as_deref(), request.split)?;

    let docs = assembler.assemble(&request.video, &primary, &windows, SUBTITLE_ATTRIBUTE_ID)?;
    Ok(docs)
}

/// Where a published project ended up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Published {
    pub path: PathBuf,
    /// Store id, when the upload succeeded
    pub pid: Option<String>,
}

/// Upload (optionally) and write each project
///
/// Files are named `<pid>.json` after a successful upload and `<n>.json`
/// (1-based) otherwise. Upload failures are logged and do not stop the
/// remaining projects; a failed write does.
pub async fn publish(
    docs: &[AnnotationDocument],
    store: Option<&dyn ProjectStore>,
    out_dir: &Path,
) -> Result<Vec<Published>> {
    tokio::fs::create_dir_all(out_dir)
        .await
        .with_context(|| format!("failed to create {}", out_dir.display()))?;

    let mut published = Vec::with_capacity(docs.len());
    for (i, doc) in docs.iter().enumerate() {
        let n = i + 1;

        let pid = match store {
            Some(store) => match store.create_shared_project(doc).await {
                Ok(shared) if is_safe_file_stem(&shared.pid) => Some(shared.pid),
                Ok(shared) => {
                    warn!("Store returned unusable project id ({n}): {:?}", shared.pid);
                    None
                }
                Err(e) => {
                    warn!("Shared project creation failed ({n}): {e:#}");
                    None
                }
            },
            None => None,
        };

        let name = pid.clone().unwrap_or_else(|| n.to_string());
        let path = out_dir.join(format!("{name}.json"));
        tokio::fs::write(&path, doc.to_json_pretty()?)
            .await
            .with_context(|| format!("failed to write {}", path.display()))?;

        published.push(Published { path, pid });
    }

    Ok(published)
}

/// Whether a store-assigned id can name a file inside the output directory
fn is_safe_file_stem(pid: &str) -> bool {
    !pid.is_empty()
        && pid != "."
        && pid != ".."
        && !pid.contains(['/', '\\', '\0'])
        && matches!(
            Path::new(pid).components().collect::<Vec<_>>().as_slice(),
            [std::path::Component::Normal(_)]
        )
}

/// A batch of conversions read from TOML
///
/// ```toml
/// [[jobs]]
/// video = "https://media.example.org/talk.mp4"
/// captions = "talk.vtt"
/// reference = "talk.lines.vtt"
/// segments_per_split = 20
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct BatchManifest {
    #[serde(default)]
    pub jobs: Vec<BatchJob>,
}

/// One `[[jobs]]` entry
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BatchJob {
    pub video: String,
    pub captions: PathBuf,
    #[serde(default)]
    pub reference: Option<PathBuf>,
    pub segments_per_split: Option<usize>,
    pub num_splits: Option<usize>,
    /// Subdirectory of the output dir; defaults to the job's 1-based index
    pub name: Option<String>,
}

impl BatchManifest {
    /// Load a manifest; relative caption paths resolve against its directory
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let mut manifest: Self = toml::from_str(&content)
            .with_context(|| format!("invalid TOML in {}", path.display()))?;

        let base = path.parent().unwrap_or_else(|| Path::new(""));
        for job in &mut manifest.jobs {
            job.captions = base.join(&job.captions);
            job.reference = job.reference.as_ref().map(|r| base.join(r));
        }
        Ok(manifest)
    }
}

impl BatchJob {
    /// The conversion this job describes
    #[must_use]
    pub fn request(&self) -> ConversionRequest {
        ConversionRequest {
            video: self.video.clone(),
            captions: self.captions.clone(),
            reference: self.reference.clone(),
            split: SplitSize::from_options(self.segments_per_split, self.num_splits),
        }
    }

    /// Output subdirectory name for the job at 1-based position `n`
    #[must_use]
    pub fn output_name(&self, n: usize) -> String {
        self.name.clone().unwrap_or_else(|| n.to_string())
    }
}

/// Outcome of a batch run
#[derive(Debug, Default)]
pub struct BatchSummary {
    pub published: Vec<Published>,
    /// `(job name, error)` for every job that failed
    pub failed: Vec<(String, anyhow::Error)>,
}

/// Run every job, isolating failures per job
pub async fn run_batch<G: IdGenerator>(
    manifest: &BatchManifest,
    assembler: &mut Assembler<G>,
    store: Option<&dyn ProjectStore>,
    out_dir: &Path,
) -> BatchSummary {
    let mut summary = BatchSummary::default();

    for (i, job) in manifest.jobs.iter().enumerate() {
        let name = job.output_name(i + 1);
        let result = match run(&job.request(), assembler) {
            Ok(docs) => publish(&docs, store, &out_dir.join(&name)).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(published) => {
                info!("Job {name}: {} projects", published.len());
                summary.published.extend(published);
            }
            Err(e) => {
                warn!("Job {name} failed: {e:#}");
                summary.failed.push((name, e));
            }
        }
    }

    summary
}
