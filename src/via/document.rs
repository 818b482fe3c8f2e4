//! The VIA 3 project document and its referential-integrity pass

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use super::project::{Project, ViaConfig};
use super::schema::{Attribute, MediaFile, Metadata, View};
use crate::error::{ConvertError, Result};

/// A complete annotation project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationDocument {
    pub project: Project,
    #[serde(default)]
    pub config: ViaConfig,
    pub attribute: BTreeMap<String, Attribute>,
    pub file: BTreeMap<String, MediaFile>,
    pub view: BTreeMap<String, View>,
    pub metadata: BTreeMap<String, Metadata>,
}

/// What a sanitize pass removed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SanitizeReport {
    /// Metadata ids dropped because their view did not resolve to a file
    pub dropped_metadata: Vec<String>,
    /// `(metadata id, attribute id)` values dropped for unknown attributes
    pub dropped_values: Vec<(String, String)>,
}

impl SanitizeReport {
    /// Whether the document was already consistent
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.dropped_metadata.is_empty() && self.dropped_values.is_empty()
    }
}

impl AnnotationDocument {
    /// An empty document for `project`
    #[must_use]
    pub fn new(project: Project, config: ViaConfig) -> Self {
        Self {
            project,
            config,
            attribute: BTreeMap::new(),
            file: BTreeMap::new(),
            view: BTreeMap::new(),
            metadata: BTreeMap::new(),
        }
    }

    /// Parse, validate and sanitize a serialized project
    pub fn from_json(json: &str) -> Result<Self> {
        let mut doc: Self = serde_json::from_str(json)
            .map_err(|e| ConvertError::SchemaViolation(e.to_string()))?;
        doc.sanitize();
        Ok(doc)
    }

    /// Pretty-printed JSON, the format the store and the VIA app read
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Map each view to the file its metadata attaches to
    ///
    /// Views without files are left out.
    #[must_use]
    pub fn view_to_file(&self) -> HashMap<&str, &str> {
        self.view
            .iter()
            .filter_map(|(vid, view)| view.primary_file().map(|fid| (vid.as_str(), fid)))
            .collect()
    }

    /// Drop dangling references
    ///
    /// First removes metadata whose view does not resolve to a known file,
    /// then removes attribute values whose attribute is not declared. Each
    /// pass builds a fresh table, and running it again changes nothing.
    pub fn sanitize(&mut self) -> SanitizeReport {
        let mut report = SanitizeReport::default();

        // Views whose primary file exists
        let resolvable: HashSet<&str> = self
            .view
            .iter()
            .filter(|(_, view)| {
                view.primary_file()
                    .is_some_and(|fid| self.file.contains_key(fid))
            })
            .map(|(vid, _)| vid.as_str())
            .collect();

        let metadata: BTreeMap<String, Metadata> = std::mem::take(&mut self.metadata)
            .into_iter()
            .filter(|(mid, m)| {
                let keep = resolvable.contains(m.vid.as_str());
                if !keep {
                    report.dropped_metadata.push(mid.clone());
                }
                keep
            })
            .collect();

        self.metadata = metadata
            .into_iter()
            .map(|(mid, mut m)| {
                let av = std::mem::take(&mut m.av);
                m.av = av
                    .into_iter()
                    .filter(|(aid, _)| {
                        let keep = self.attribute.contains_key(aid);
                        if !keep {
                            report.dropped_values.push((mid.clone(), aid.clone()));
                        }
                        keep
                    })
                    .collect();
                (mid, m)
            })
            .collect();

        if !report.is_clean() {
            tracing::debug!(
                "Sanitize dropped {} metadata entries and {} attribute values",
                report.dropped_metadata.len(),
                report.dropped_values.len()
            );
        }
        report
    }
}

/// Drop dangling references from `doc`, see [`AnnotationDocument::sanitize`]
pub fn sanitize(doc: &mut AnnotationDocument) -> SanitizeReport {
    doc.sanitize()
}
