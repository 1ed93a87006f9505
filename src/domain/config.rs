use std::{io, path::Path};

use serde::{Deserialize, Serialize};

use crate::domain::schema::title_case;

/// Configuration for rendering a corpus.
///
/// This holds the display tables for item types, levels and statuses, the
/// relationship kinds that make up the traceability graph, and the extra
/// display-only options an item may carry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Versions", into = "Versions")]
pub struct Config {
    /// Status used when an item does not declare one.
    default_status: String,

    /// Display titles for item types, e.g. `requirement` -> `Requirement`.
    object_types: Vec<ObjectType>,

    /// Display titles for item levels.
    levels: Vec<Level>,

    /// The relationship kinds, in the order their rows are rendered.
    link_types: Vec<LinkType>,

    /// Known statuses and their badge colours.
    statuses: Vec<Status>,

    /// Display-only item options rendered as extra metadata rows.
    extra_options: Vec<String>,
}

/// A configured item type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectType {
    /// The value of the `:type:` option.
    #[serde(rename = "type")]
    pub kind: String,
    /// The display title. Defaults to the title-cased type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// A configured item level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Level {
    /// The value of the `:level:` option.
    pub level: String,
    /// The display title. Defaults to the title-cased level.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// A configured relationship kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkType {
    /// The directive option that declares this relationship.
    pub option: String,
    /// Label for the inferred inverse relationship, e.g. `satisfied_by`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub incoming: Option<String>,
    /// Label for the declared relationship, e.g. `satisfies`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outgoing: Option<String>,
    /// Free-form styling hint. Carried through configuration untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
}

impl LinkType {
    /// A link type with both labels set.
    #[must_use]
    pub fn new(option: &str, outgoing: &str, incoming: &str) -> Self {
        Self {
            option: option.to_string(),
            incoming: Some(incoming.to_string()),
            outgoing: Some(outgoing.to_string()),
            style: None,
        }
    }
}

/// A configured item status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    /// The value of the `:status:` option.
    pub status: String,
    /// Badge colour, e.g. `#FFEB3B`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// Errors that can occur when loading or saving a [`Config`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file does not exist.
    #[error("config file not found")]
    NotFound,
    /// The configuration file could not be read or written.
    #[error("failed to access config file: {0}")]
    Io(#[from] io::Error),
    /// The configuration file is not valid.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    /// The configuration could not be serialized.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_status: default_status(),
            object_types: Vec::new(),
            levels: Vec::new(),
            link_types: Vec::new(),
            statuses: Vec::new(),
            extra_options: Vec::new(),
        }
    }
}

impl Config {
    /// The name of the configuration file at the root of a corpus.
    pub const FILE_NAME: &'static str = "rigr.toml";

    /// A configuration with the common traceability relationships, item
    /// types, levels and statuses filled in.
    #[must_use]
    pub fn starter() -> Self {
        let object_types = [
            ("requirement", "Requirement"),
            ("specification", "Specification"),
            ("rationale", "Rationale"),
            ("information", "Information"),
            ("parameter", "Parameter"),
        ]
        .into_iter()
        .map(|(kind, title)| ObjectType {
            kind: kind.to_string(),
            title: Some(title.to_string()),
        })
        .collect();

        let levels = [
            ("stakeholder", "Stakeholder"),
            ("system", "System"),
            ("component", "Component"),
            ("software", "Software"),
        ]
        .into_iter()
        .map(|(level, title)| Level {
            level: level.to_string(),
            title: Some(title.to_string()),
        })
        .collect();

        let link_types = vec![
            LinkType::new("satisfies", "satisfies", "satisfied_by"),
            LinkType::new("implements", "implements", "implemented_by"),
            LinkType::new("derives_from", "derives_from", "derives_to"),
            LinkType::new("tests", "tests", "tested_by"),
            LinkType::new("links", "links", "links"),
        ];

        let statuses = [
            ("draft", "#FFEB3B"),
            ("review", "#FF9800"),
            ("approved", "#4CAF50"),
            ("implemented", "#2196F3"),
        ]
        .into_iter()
        .map(|(status, color)| Status {
            status: status.to_string(),
            color: Some(color.to_string()),
        })
        .collect();

        Self {
            default_status: default_status(),
            object_types,
            levels,
            link_types,
            statuses,
            extra_options: ["priority", "complexity", "author", "version", "baseline"]
                .map(String::from)
                .to_vec(),
        }
    }

    /// Loads the configuration from a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotFound`] if the file does not exist, or
    /// another variant if it cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => ConfigError::NotFound,
            _ => ConfigError::Io(e),
        })?;
        Ok(toml::from_str(&content)?)
    }

    /// Saves the configuration to a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be serialized to TOML or if
    /// the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// The status used when an item does not declare one.
    #[must_use]
    pub fn default_status(&self) -> &str {
        &self.default_status
    }

    /// The configured relationship kinds.
    #[must_use]
    pub fn link_types(&self) -> &[LinkType] {
        &self.link_types
    }

    /// Adds a relationship kind.
    pub fn push_link_type(&mut self, link_type: LinkType) {
        self.link_types.push(link_type);
    }

    /// Display-only item options.
    #[must_use]
    pub fn extra_options(&self) -> &[String] {
        &self.extra_options
    }

    /// Display title for an item type.
    ///
    /// Falls back to the title-cased type if it is not configured or has no
    /// title.
    #[must_use]
    pub fn type_title(&self, kind: &str) -> String {
        self.object_types
            .iter()
            .find(|ot| ot.kind == kind)
            .and_then(|ot| ot.title.clone())
            .unwrap_or_else(|| title_case(kind))
    }

    /// Display title for an item level.
    #[must_use]
    pub fn level_title(&self, level: &str) -> String {
        self.levels
            .iter()
            .find(|lv| lv.level == level)
            .and_then(|lv| lv.title.clone())
            .unwrap_or_else(|| title_case(level))
    }

    /// Badge colour for a status, if one is configured.
    #[must_use]
    pub fn status_color(&self, status: &str) -> Option<&str> {
        self.statuses
            .iter()
            .find(|s| s.status == status)
            .and_then(|s| s.color.as_deref())
    }
}

fn default_status() -> String {
    "draft".to_string()
}

/// The serialized versions of the configuration.
/// This allows for future changes to the configuration format and to the domain
/// type without breaking compatibility.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        #[serde(default = "default_status")]
        default_status: String,

        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        extra_options: Vec<String>,

        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        object_types: Vec<ObjectType>,

        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        levels: Vec<Level>,

        /// Relationship kinds. Order is significant: it fixes the order of
        /// the forward rows on every block.
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        link_types: Vec<LinkType>,

        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        statuses: Vec<Status>,
    },
}

impl From<Versions> for Config {
    fn from(versions: Versions) -> Self {
        match versions {
            Versions::V1 {
                default_status,
                extra_options,
                object_types,
                levels,
                link_types,
                statuses,
            } => Self {
                default_status,
                object_types,
                levels,
                link_types,
                statuses,
                extra_options,
            },
        }
    }
}

impl From<Config> for Versions {
    fn from(config: Config) -> Self {
        Self::V1 {
            default_status: config.default_status,
            extra_options: config.extra_options,
            object_types: config.object_types,
            levels: config.levels,
            link_types: config.link_types,
            statuses: config.statuses,
        }
    }
}
