//! Project identity and configuration sections

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use super::codes::SourceLocation;
use super::value::Value;

/// Placeholder the store replaces with the real project id
pub const PROJECT_ID_PLACEHOLDER: &str = "__VIA_PROJECT_ID__";
/// Placeholder the store replaces with the real revision id
pub const REVISION_ID_PLACEHOLDER: &str = "__VIA_PROJECT_REV_ID__";
/// Placeholder the store replaces with the real revision timestamp
pub const REVISION_TIMESTAMP_PLACEHOLDER: &str = "__VIA_PROJECT_REV_TIMESTAMP__";

/// Data format version written when none is given
pub const DEFAULT_DATA_FORMAT_VERSION: &str = "3.1.0";

/// The `project` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    #[serde(default = "default_pid")]
    pub pid: String,
    #[serde(default = "default_rev")]
    pub rev: String,
    #[serde(default)]
    pub rev_timestamp: RevisionTimestamp,
    #[serde(default)]
    pub pname: String,
    #[serde(default)]
    pub creator: String,
    #[serde(default = "Utc::now", with = "unix_seconds")]
    pub created: DateTime<Utc>,
    #[serde(default = "default_data_format_version")]
    pub data_format_version: String,
    #[serde(default)]
    pub vid_list: Vec<String>,
}

fn default_pid() -> String {
    PROJECT_ID_PLACEHOLDER.to_string()
}

fn default_rev() -> String {
    REVISION_ID_PLACEHOLDER.to_string()
}

fn default_data_format_version() -> String {
    DEFAULT_DATA_FORMAT_VERSION.to_string()
}

impl Project {
    /// Create a project awaiting ids from the store
    ///
    /// `created` defaults to the current UTC time.
    #[must_use]
    pub fn new(
        pname: impl Into<String>,
        creator: impl Into<String>,
        created: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            pid: default_pid(),
            rev: default_rev(),
            rev_timestamp: RevisionTimestamp::Pending,
            pname: pname.into(),
            creator: creator.into(),
            created: created.unwrap_or_else(Utc::now),
            data_format_version: default_data_format_version(),
            vid_list: Vec::new(),
        }
    }

    /// Set the data format version
    #[must_use]
    pub fn with_data_format_version(mut self, version: impl Into<String>) -> Self {
        self.data_format_version = version.into();
        self
    }

    /// Set the views owned by the project
    #[must_use]
    pub fn with_views(mut self, vid_list: Vec<String>) -> Self {
        self.vid_list = vid_list;
        self
    }

    /// Whether the store has not assigned an id yet
    #[must_use]
    pub fn is_unsaved(&self) -> bool {
        self.pid == PROJECT_ID_PLACEHOLDER
    }
}

/// Revision timestamp: a placeholder until the store assigns one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RevisionTimestamp {
    #[default]
    Pending,
    At(DateTime<Utc>),
}

impl Serialize for RevisionTimestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Pending => serializer.serialize_str(REVISION_TIMESTAMP_PLACEHOLDER),
            Self::At(at) => serializer.serialize_i64(unix_seconds::rounded(at)),
        }
    }
}

impl<'de> Deserialize<'de> for RevisionTimestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Seconds(i64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Seconds(secs) => unix_seconds::from_secs(secs).map(Self::At),
            Raw::Text(text) if text == REVISION_TIMESTAMP_PLACEHOLDER => Ok(Self::Pending),
            Raw::Text(text) => text
                .parse::<i64>()
                .map_err(|_| de::Error::custom(format!("invalid revision timestamp: {text}")))
                .and_then(unix_seconds::from_secs)
                .map(Self::At),
        }
    }
}

/// Timestamps as integer Unix seconds, rounded to the nearest second
pub mod unix_seconds {
    use chrono::{DateTime, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn rounded(at: &DateTime<Utc>) -> i64 {
        (at.timestamp_millis() + 500).div_euclid(1000)
    }

    pub(crate) fn from_secs<E: de::Error>(secs: i64) -> Result<DateTime<Utc>, E> {
        DateTime::from_timestamp(secs, 0)
            .ok_or_else(|| E::custom(format!("timestamp out of range: {secs}")))
    }

    pub fn serialize<S: Serializer>(at: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(rounded(at))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        from_secs(i64::deserialize(deserializer)?)
    }
}

/// The `config` section
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ViaConfig {
    #[serde(default)]
    pub file: FileConfig,
    #[serde(default)]
    pub ui: BTreeMap<String, Value>,
}

impl ViaConfig {
    /// Config with the given UI options and empty location prefixes
    #[must_use]
    pub fn with_ui(ui: BTreeMap<String, Value>) -> Self {
        Self {
            file: FileConfig::default(),
            ui,
        }
    }
}

/// File location prefixes, keyed by location type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileConfig {
    pub loc_prefix: BTreeMap<SourceLocation, String>,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            loc_prefix: SourceLocation::ALL
                .iter()
                .map(|&loc| (loc, String::new()))
                .collect(),
        }
    }
}
