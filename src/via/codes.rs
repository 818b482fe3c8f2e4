//! Enumerations with stable integer wire codes
//!
//! The VIA 3 format stores attribute types, file types, file locations and
//! region shapes as integers. Each enum below owns an explicit code table and
//! (de)serializes through it.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

macro_rules! coded_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $code:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $name {
            /// Every variant, in code order
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Integer code used in the serialized project
            #[must_use]
            pub const fn code(self) -> u8 {
                match self {
                    $(Self::$variant => $code),+
                }
            }

            /// Look up a variant by its integer code
            #[must_use]
            pub const fn from_code(code: u8) -> Option<Self> {
                match code {
                    $($code => Some(Self::$variant),)+
                    _ => None,
                }
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_u8(self.code())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let code = u8::deserialize(deserializer)?;
                Self::from_code(code).ok_or_else(|| {
                    de::Error::custom(format!(
                        concat!("unknown ", stringify!($name), " code {}"),
                        code
                    ))
                })
            }
        }
    };
}

coded_enum! {
    /// Value kind of an attribute
    AttributeType {
        /// Free text
        Text = 1,
        /// Single choice among options
        Radio = 3,
        /// Drop-down selection among options
        Select = 4,
    }
}

impl Default for AttributeType {
    fn default() -> Self {
        Self::Text
    }
}

coded_enum! {
    /// Media kind of a file
    FileType {
        Image = 2,
        Video = 4,
        Audio = 8,
    }
}

coded_enum! {
    /// Where a file's `src` points
    SourceLocation {
        /// Picked from the local filesystem by the annotator
        Local = 1,
        /// HTTP(S) URI, relative URIs resolve against the location prefix
        UriHttp = 2,
        /// `file://` URI
        UriFile = 3,
        /// Content embedded in the project
        Inline = 4,
    }
}

coded_enum! {
    /// Spatial region shape, the first element of a metadata `xy`
    Shape {
        /// `[2, x, y, width, height]`
        Rect = 2,
    }
}

/// Which part of a file an attribute annotates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnchorKind {
    /// A spatial region in a still frame
    #[serde(rename = "FILE1_Z0_XY1")]
    SpatialRegion,
    /// A temporal segment with start and end
    #[serde(rename = "FILE1_Z2_XY0")]
    TemporalSegment,
}

impl AnchorKind {
    /// The anchor id string used in the serialized project
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SpatialRegion => "FILE1_Z0_XY1",
            Self::TemporalSegment => "FILE1_Z2_XY0",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_match_wire_format() {
        assert_eq!(AttributeType::Text.code(), 1);
        assert_eq!(AttributeType::Radio.code(), 3);
        assert_eq!(AttributeType::Select.code(), 4);
        assert_eq!(FileType::Image.code(), 2);
        assert_eq!(FileType::Video.code(), 4);
        assert_eq!(FileType::Audio.code(), 8);
        assert_eq!(SourceLocation::Local.code(), 1);
        assert_eq!(SourceLocation::UriHttp.code(), 2);
        assert_eq!(SourceLocation::UriFile.code(), 3);
        assert_eq!(SourceLocation::Inline.code(), 4);
        assert_eq!(Shape::Rect.code(), 2);
    }

    #[test]
    fn test_from_code_covers_all() {
        for &kind in FileType::ALL {
            assert_eq!(FileType::from_code(kind.code()), Some(kind));
        }
        assert_eq!(FileType::from_code(1), None);
        assert_eq!(Shape::from_code(5), None);
    }

    #[test]
    fn test_serialize_as_integer() {
        assert_eq!(serde_json::to_string(&FileType::Video).unwrap(), "4");
        assert_eq!(
            serde_json::from_str::<AttributeType>("3").unwrap(),
            AttributeType::Radio
        );
    }

    #[test]
    fn test_unknown_code_rejected() {
        let err = serde_json::from_str::<AttributeType>("2").unwrap_err();
        assert!(err.to_string().contains("unknown AttributeType code 2"));
    }

    #[test]
    fn test_location_as_map_key() {
        let mut prefixes = std::collections::BTreeMap::new();
        prefixes.insert(SourceLocation::UriHttp, "https://cdn.example.org/".to_string());

        let json = serde_json::to_string(&prefixes).unwrap();
        assert_eq!(json, r#"{"2":"https://cdn.example.org/"}"#);

        let back: std::collections::BTreeMap<SourceLocation, String> =
            serde_json::from_str(&json).unwrap();
        assert_eq!(back, prefixes);
    }

    #[test]
    fn test_anchor_strings() {
        assert_eq!(
            serde_json::to_string(&AnchorKind::TemporalSegment).unwrap(),
            format!("\"{}\"", AnchorKind::TemporalSegment.as_str())
        );
        assert!(serde_json::from_str::<AnchorKind>("\"FILE1_Z1_XY0\"").is_err());
    }
}
