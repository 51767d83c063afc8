use crate::error;
use serde::de::Visitor;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use snafu::ResultExt;
use std::fmt::Formatter;
use std::str::FromStr;

/// A spatial reference authority that is part of a spatial reference definition
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING-KEBAB-CASE")]
pub enum SpatialReferenceAuthority {
    Epsg,
    SrOrg,
    Iau2000,
    Esri,
}

impl std::fmt::Display for SpatialReferenceAuthority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                SpatialReferenceAuthority::Epsg => "EPSG",
                SpatialReferenceAuthority::SrOrg => "SR-ORG",
                SpatialReferenceAuthority::Iau2000 => "IAU2000",
                SpatialReferenceAuthority::Esri => "ESRI",
            }
        )
    }
}

/// A spatial reference consists of an authority and a code
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct SpatialReference {
    authority: SpatialReferenceAuthority,
    code: u32,
}

impl SpatialReference {
    pub fn new(authority: SpatialReferenceAuthority, code: u32) -> Self {
        Self { authority, code }
    }

    pub fn authority(&self) -> &SpatialReferenceAuthority {
        &self.authority
    }

    pub fn code(self) -> u32 {
        self.code
    }

    /// the WGS 84 spatial reference system
    pub fn epsg_4326() -> Self {
        Self::new(SpatialReferenceAuthority::Epsg, 4326)
    }

    /// the Pseudo-Mercator spatial reference system that web map tile services are served in
    pub fn web_mercator() -> Self {
        Self::new(SpatialReferenceAuthority::Epsg, 3857)
    }

    /// Return the srs-string "authority:code"
    #[allow(clippy::trivially_copy_pass_by_ref)]
    pub fn srs_string(&self) -> String {
        format!("{}:{}", self.authority, self.code)
    }

    /// Parses the CRS names that appear in GeoJSON `crs` members.
    ///
    /// Besides the plain `AUTHORITY:CODE` form this accepts OGC URNs
    /// (`urn:ogc:def:crs:EPSG::4326`, `urn:ogc:def:crs:OGC:1.3:CRS84`)
    /// and OGC URIs (`http://www.opengis.net/def/crs/EPSG/0/4326`).
    pub fn from_crs_name(name: &str) -> Result<Self, error::Error> {
        let name = name.trim();

        if name.ends_with("CRS84") {
            return Ok(Self::epsg_4326());
        }

        if let Some(urn) = name.strip_prefix("urn:ogc:def:crs:") {
            // AUTHORITY:[VERSION]:CODE
            let parts: Vec<&str> = urn.split(':').collect();
            return match parts.as_slice() {
                [authority, .., code] => Self::from_authority_and_code(authority, code, name),
                _ => error::InvalidSpatialReferenceString {
                    spatial_reference_string: name,
                }
                .fail(),
            };
        }

        if let Some(uri) = name
            .strip_prefix("http://www.opengis.net/def/crs/")
            .or_else(|| name.strip_prefix("https://www.opengis.net/def/crs/"))
        {
            // AUTHORITY/VERSION/CODE
            let parts: Vec<&str> = uri.split('/').collect();
            return match parts.as_slice() {
                [authority, _version, code] => Self::from_authority_and_code(authority, code, name),
                _ => error::InvalidSpatialReferenceString {
                    spatial_reference_string: name,
                }
                .fail(),
            };
        }

        name.parse()
    }

    fn from_authority_and_code(
        authority: &str,
        code: &str,
        name: &str,
    ) -> Result<Self, error::Error> {
        let authority = authority.parse().map_err(|_| {
            error::Error::InvalidSpatialReferenceString {
                spatial_reference_string: name.into(),
            }
        })?;

        Ok(Self::new(
            authority,
            code.parse::<u32>().context(error::ParseU32)?,
        ))
    }
}

impl std::fmt::Display for SpatialReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.authority, self.code)
    }
}

impl Serialize for SpatialReference {
    fn serialize<S>(&self, serializer: S) -> Result<<S as Serializer>::Ok, <S as Serializer>::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

/// Helper struct for deserializing a `SpatialReference`
struct SpatialReferenceDeserializeVisitor;

impl Visitor<'_> for SpatialReferenceDeserializeVisitor {
    type Value = SpatialReference;

    fn expecting(&self, formatter: &mut Formatter) -> std::fmt::Result {
        formatter.write_str("a spatial reference in the form authority:code")
    }

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        v.parse().map_err(serde::de::Error::custom)
    }
}

impl<'de> Deserialize<'de> for SpatialReference {
    fn deserialize<D>(deserializer: D) -> Result<Self, <D as Deserializer<'de>>::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_str(SpatialReferenceDeserializeVisitor)
    }
}

impl FromStr for SpatialReferenceAuthority {
    type Err = error::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "EPSG" => SpatialReferenceAuthority::Epsg,
            "SR-ORG" => SpatialReferenceAuthority::SrOrg,
            "IAU2000" => SpatialReferenceAuthority::Iau2000,
            "ESRI" => SpatialReferenceAuthority::Esri,
            _ => {
                return Err(error::Error::InvalidSpatialReferenceString {
                    spatial_reference_string: s.into(),
                });
            }
        })
    }
}

impl FromStr for SpatialReference {
    type Err = error::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut split = s.split(':');

        match (split.next(), split.next(), split.next()) {
            (Some(authority), Some(code), None) => Ok(Self::new(
                authority.parse()?,
                code.parse::<u32>().context(error::ParseU32)?,
            )),
            _ => Err(error::Error::InvalidSpatialReferenceString {
                spatial_reference_string: s.into(),
            }),
        }
    }
}
