//! Attribute, file, view and metadata records
//!
//! Records that carry construction-time invariants (`Attribute`, `Metadata`)
//! validate in their constructors and again when deserialized, so an invalid
//! record cannot exist in a document.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::codes::{AnchorKind, AttributeType, FileType, Shape, SourceLocation};
use super::value::Value;
use crate::error::{ConvertError, Result};

/// An annotatable property declared by the project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawAttribute")]
pub struct Attribute {
    pub aname: String,
    pub anchor_id: AnchorKind,
    #[serde(rename = "type")]
    pub kind: AttributeType,
    pub desc: String,
    options: BTreeMap<String, Value>,
    default_option_id: String,
}

#[derive(Deserialize)]
struct RawAttribute {
    aname: String,
    anchor_id: AnchorKind,
    #[serde(rename = "type", default)]
    kind: AttributeType,
    #[serde(default)]
    desc: String,
    #[serde(default)]
    options: BTreeMap<String, Value>,
    #[serde(default)]
    default_option_id: String,
}

impl TryFrom<RawAttribute> for Attribute {
    type Error = ConvertError;

    fn try_from(raw: RawAttribute) -> Result<Self> {
        Attribute::new(raw.aname, raw.anchor_id, raw.kind, raw.desc)
            .with_options(raw.options, raw.default_option_id)
    }
}

impl Attribute {
    /// Declare an attribute without options
    #[must_use]
    pub fn new(
        aname: impl Into<String>,
        anchor_id: AnchorKind,
        kind: AttributeType,
        desc: impl Into<String>,
    ) -> Self {
        Self {
            aname: aname.into(),
            anchor_id,
            kind,
            desc: desc.into(),
            options: BTreeMap::new(),
            default_option_id: String::new(),
        }
    }

    /// Free-text attribute on temporal segments, as used for subtitles
    #[must_use]
    pub fn subtitle() -> Self {
        Self::new(
            "subtitle",
            AnchorKind::TemporalSegment,
            AttributeType::Text,
            "subtitle text",
        )
    }

    /// Attach options and a default option
    ///
    /// A non-empty `default_option_id` must name one of the options.
    pub fn with_options(
        mut self,
        options: BTreeMap<String, Value>,
        default_option_id: impl Into<String>,
    ) -> Result<Self> {
        let default_option_id = default_option_id.into();
        if !default_option_id.is_empty() && !options.contains_key(&default_option_id) {
            return Err(ConvertError::SchemaViolation(format!(
                "attribute '{}': default option '{default_option_id}' is not one of its options",
                self.aname
            )));
        }
        self.options = options;
        self.default_option_id = default_option_id;
        Ok(self)
    }

    #[must_use]
    pub fn options(&self) -> &BTreeMap<String, Value> {
        &self.options
    }

    #[must_use]
    pub fn default_option_id(&self) -> &str {
        &self.default_option_id
    }
}

/// A media file in the project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaFile {
    pub fid: String,
    pub fname: String,
    #[serde(rename = "type")]
    pub kind: FileType,
    pub loc: SourceLocation,
    pub src: String,
}

/// Files presented together in the annotation tool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct View {
    pub fid_list: Vec<String>,
}

impl View {
    /// A view over a single file
    #[must_use]
    pub fn single(fid: impl Into<String>) -> Self {
        Self {
            fid_list: vec![fid.into()],
        }
    }

    /// The file a view resolves to for metadata purposes
    #[must_use]
    pub fn primary_file(&self) -> Option<&str> {
        self.fid_list.first().map(String::as_str)
    }
}

/// One timed and/or spatial annotation attached to a view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawMetadata")]
pub struct Metadata {
    pub vid: String,
    pub flg: u32,
    z: Vec<f64>,
    xy: Vec<f64>,
    pub av: BTreeMap<String, Value>,
}

#[derive(Deserialize)]
struct RawMetadata {
    vid: String,
    #[serde(default)]
    flg: u32,
    #[serde(default)]
    z: Vec<f64>,
    #[serde(default)]
    xy: Vec<f64>,
    av: BTreeMap<String, Value>,
}

impl TryFrom<RawMetadata> for Metadata {
    type Error = ConvertError;

    fn try_from(raw: RawMetadata) -> Result<Self> {
        let mut metadata = Metadata::new(raw.vid, raw.z, raw.xy, raw.av)?;
        metadata.flg = raw.flg;
        Ok(metadata)
    }
}

impl Metadata {
    /// Create a metadata entry
    ///
    /// `z` must be empty or `[start, end]`. `xy` must be empty or a supported
    /// shape code followed by four geometry values.
    pub fn new(
        vid: impl Into<String>,
        z: Vec<f64>,
        xy: Vec<f64>,
        av: BTreeMap<String, Value>,
    ) -> Result<Self> {
        validate_z(&z)?;
        validate_xy(&xy)?;
        Ok(Self {
            vid: vid.into(),
            flg: 0,
            z,
            xy,
            av,
        })
    }

    /// Temporal segment `[start, end]` with a single attribute value
    pub fn segment(
        vid: impl Into<String>,
        start: f64,
        end: f64,
        attribute_id: impl Into<String>,
        value: impl Into<Value>,
    ) -> Result<Self> {
        let av = BTreeMap::from([(attribute_id.into(), value.into())]);
        Self::new(vid, vec![start, end], Vec::new(), av)
    }

    /// Temporal extent, empty or `[start, end]`
    #[must_use]
    pub fn z(&self) -> &[f64] {
        &self.z
    }

    /// Spatial extent, empty or `[shape, ...geometry]`
    #[must_use]
    pub fn xy(&self) -> &[f64] {
        &self.xy
    }

    /// Region shape, when the entry has a spatial extent
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn shape(&self) -> Option<Shape> {
        self.xy.first().and_then(|&code| Shape::from_code(code as u8))
    }
}

fn validate_z(z: &[f64]) -> Result<()> {
    if z.is_empty() || z.len() == 2 {
        Ok(())
    } else {
        Err(ConvertError::SchemaViolation(format!(
            "z must be empty or [start, end], got {} values",
            z.len()
        )))
    }
}

fn validate_xy(xy: &[f64]) -> Result<()> {
    let Some(&code) = xy.first() else {
        return Ok(());
    };

    if xy.len() != 5 {
        return Err(ConvertError::SchemaViolation(format!(
            "xy must be empty or have 5 values, got {}",
            xy.len()
        )));
    }

    let supported = Shape::ALL.iter().any(|shape| f64::from(shape.code()) == code);
    if !supported {
        let names: Vec<String> = Shape::ALL.iter().map(|s| format!("{s:?}")).collect();
        return Err(ConvertError::SchemaViolation(format!(
            "shape code {code} is not supported, only {names:?}"
        )));
    }

    Ok(())
}
