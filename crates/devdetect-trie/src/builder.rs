//! Writer for hash-trie data files

use crate::format::{ABSENT_VALUE, FORMAT_VERSION, MAGIC, NO_DEFAULT_PROFILE};
use bytes::{BufMut, BytesMut};
use devdetect_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Human-editable description of a data file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataSetSource {
    /// Format version to stamp into the file
    #[serde(default = "default_version")]
    pub version: u16,

    /// Property names, in column order
    pub properties: Vec<String>,

    /// Named device profiles
    pub profiles: Vec<ProfileSpec>,

    /// Profile answering user agents no pattern matches
    #[serde(default)]
    pub default: Option<String>,

    /// Patterns in priority order, earlier entries win
    #[serde(default)]
    pub patterns: Vec<PatternSpec>,
}

/// A device profile: property values shared by every matching user agent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileSpec {
    pub name: String,

    #[serde(default)]
    pub values: BTreeMap<String, String>,
}

/// Substring that maps a user agent onto a profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternSpec {
    pub pattern: String,
    pub profile: String,
}

impl DataSetSource {
    /// Load from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load from file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }
}

/// Builder producing a binary data file image
#[derive(Debug, Clone)]
pub struct DataSetBuilder {
    version: u16,
    properties: Vec<String>,
    profiles: Vec<(String, BTreeMap<String, String>)>,
    patterns: Vec<(String, String)>,
    default_profile: Option<String>,
}

impl DataSetBuilder {
    /// Create a builder for the given property columns
    pub fn new<I, S>(properties: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            version: FORMAT_VERSION,
            properties: properties.into_iter().map(Into::into).collect(),
            profiles: Vec::new(),
            patterns: Vec::new(),
            default_profile: None,
        }
    }

    /// Create a builder from a parsed source document
    pub fn from_source(source: &DataSetSource) -> Self {
        let mut builder = Self::new(source.properties.iter().cloned()).version(source.version);
        for profile in &source.profiles {
            builder = builder.profile(profile.name.clone(), profile.values.clone());
        }
        for pattern in &source.patterns {
            builder = builder.pattern(pattern.pattern.clone(), pattern.profile.clone());
        }
        if let Some(default) = &source.default {
            builder = builder.default_profile(default.clone());
        }
        builder
    }

    /// Override the format version (used to produce files for other engine versions)
    pub fn version(mut self, version: u16) -> Self {
        self.version = version;
        self
    }

    /// Add a named profile with its property values
    pub fn profile<I, K, V>(mut self, name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let values = values
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self.profiles.push((name.into(), values));
        self
    }

    /// Add a pattern, lower priority than every pattern added before it
    pub fn pattern(mut self, pattern: impl Into<String>, profile: impl Into<String>) -> Self {
        self.patterns.push((pattern.into(), profile.into()));
        self
    }

    /// Set the profile used when no pattern matches
    pub fn default_profile(mut self, profile: impl Into<String>) -> Self {
        self.default_profile = Some(profile.into());
        self
    }

    /// Encode the image
    pub fn build(&self) -> Result<Vec<u8>> {
        let mut buf = BytesMut::with_capacity(256);

        buf.put_slice(MAGIC);
        buf.put_u16_le(self.version);

        let property_count = u16::try_from(self.properties.len())
            .map_err(|_| Error::config("too many properties"))?;
        buf.put_u16_le(property_count);
        for property in &self.properties {
            put_str(&mut buf, property)?;
        }

        let profile_count = u32::try_from(self.profiles.len())
            .map_err(|_| Error::config("too many profiles"))?;
        buf.put_u32_le(profile_count);
        for (name, values) in &self.profiles {
            if let Some(unknown) = values.keys().find(|k| !self.properties.contains(*k)) {
                return Err(Error::config(format!(
                    "Profile '{}' sets undeclared property '{}'",
                    name, unknown
                )));
            }
            for property in &self.properties {
                match values.get(property) {
                    Some(value) => put_str(&mut buf, value)?,
                    None => buf.put_u16_le(ABSENT_VALUE),
                }
            }
        }

        let default = match &self.default_profile {
            Some(name) => self.profile_index(name)?,
            None => NO_DEFAULT_PROFILE,
        };
        buf.put_u32_le(default);

        let pattern_count = u32::try_from(self.patterns.len())
            .map_err(|_| Error::config("too many patterns"))?;
        buf.put_u32_le(pattern_count);
        for (pattern, profile) in &self.patterns {
            if pattern.is_empty() {
                return Err(Error::config(format!(
                    "Empty pattern for profile '{}'",
                    profile
                )));
            }
            put_str(&mut buf, pattern)?;
            buf.put_u32_le(self.profile_index(profile)?);
        }

        Ok(buf.to_vec())
    }

    /// Encode the image and write it to `path`
    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<usize> {
        let image = self.build()?;
        std::fs::write(path, &image)?;
        Ok(image.len())
    }

    fn profile_index(&self, name: &str) -> Result<u32> {
        self.profiles
            .iter()
            .position(|(profile, _)| profile == name)
            .map(|index| index as u32)
            .ok_or_else(|| Error::config(format!("Profile '{}' not found", name)))
    }
}

fn put_str(buf: &mut BytesMut, value: &str) -> Result<()> {
    let len = u16::try_from(value.len())
        .ok()
        .filter(|len| *len != ABSENT_VALUE)
        .ok_or_else(|| Error::config(format!("String of {} bytes is too long", value.len())))?;
    buf.put_u16_le(len);
    buf.put_slice(value.as_bytes());
    Ok(())
}

fn default_version() -> u16 {
    FORMAT_VERSION
}
