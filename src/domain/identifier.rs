use std::{borrow::Borrow, fmt, hash, ops::Deref, str::FromStr};

use non_empty_string::NonEmptyString;
use serde::{Deserialize, Serialize};

/// The identifier of an item, graphic, or listing.
///
/// Identifiers are opaque: the link graph never inspects their structure.
/// The only guarantee is that they are non-empty once surrounding whitespace
/// has been trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identifier(NonEmptyString);

impl Identifier {
    /// Creates an identifier from a string, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`EmptyIdentifierError`] if nothing remains after trimming.
    pub fn new(s: impl AsRef<str>) -> Result<Self, EmptyIdentifierError> {
        NonEmptyString::new(s.as_ref().trim().to_string())
            .map(Self)
            .map_err(|_| EmptyIdentifierError)
    }

    /// Returns the string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Error returned when an identifier is empty or only whitespace.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("identifier must not be empty")]
pub struct EmptyIdentifierError;

impl hash::Hash for Identifier {
    fn hash<H: hash::Hasher>(&self, state: &mut H) {
        self.as_str().hash(state);
    }
}

impl Borrow<str> for Identifier {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl AsRef<str> for Identifier {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl Deref for Identifier {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        self.as_str()
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Identifier {
    type Err = EmptyIdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<&str> for Identifier {
    type Error = EmptyIdentifierError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl Serialize for Identifier {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Identifier {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::new(s).map_err(serde::de::Error::custom)
    }
}

/// The kind of rendered block an identifier belongs to.
///
/// The link graph is kind-agnostic; the kind only scopes the identifier when
/// locating a block or building its anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    /// A requirement item (`.. item::`).
    Item,
    /// An image or diagram (`.. graphic::`).
    Graphic,
    /// A source code listing (`.. listing::`).
    Listing,
}

impl BlockKind {
    /// The short textual tag used to namespace identifiers of this kind.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Item => "req",
            Self::Graphic => "fig",
            Self::Listing => "code",
        }
    }

    /// The directive name that declares blocks of this kind.
    #[must_use]
    pub const fn directive(self) -> &'static str {
        match self {
            Self::Item => "item",
            Self::Graphic => "graphic",
            Self::Listing => "listing",
        }
    }

    /// Looks up a block kind by directive name.
    #[must_use]
    pub fn from_directive(name: &str) -> Option<Self> {
        match name {
            "item" => Some(Self::Item),
            "graphic" => Some(Self::Graphic),
            "listing" => Some(Self::Listing),
            _ => None,
        }
    }

    /// The HTML anchor for a block of this kind with the given identifier.
    ///
    /// ```
    /// use rigr::domain::{BlockKind, Identifier};
    ///
    /// let id = Identifier::new("REQ-001").unwrap();
    /// assert_eq!(BlockKind::Item.anchor(&id), "req-REQ-001");
    /// assert_eq!(BlockKind::Graphic.anchor(&id), "fig-REQ-001");
    /// ```
    #[must_use]
    pub fn anchor(self, id: &Identifier) -> String {
        format!("{}-{id}", self.tag())
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.directive())
    }
}
