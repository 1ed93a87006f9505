//! The table of relationship kinds.
//!
//! The [`RelationshipSchema`] is built once from configuration before any
//! fragment is parsed, and is read-only afterwards. Every lookup is total: an
//! option key the schema doesn't know still gets a mechanically derived label.

use indexmap::IndexMap;

use crate::domain::config::LinkType;

/// A directional relationship between two items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationshipKind {
    option_key: String,
    forward_label: String,
    inverse_label: String,
}

impl RelationshipKind {
    /// Builds a relationship kind from its configuration, filling in derived
    /// labels where the configuration omits them.
    #[must_use]
    pub fn from_link_type(link_type: &LinkType) -> Self {
        let option_key = link_type.option.trim().to_string();
        let forward_label = link_type
            .outgoing
            .as_deref()
            .filter(|label| !label.trim().is_empty())
            .map_or_else(|| derived_forward_label(&option_key), humanize);
        let inverse_label = link_type
            .incoming
            .as_deref()
            .filter(|label| !label.trim().is_empty())
            .map_or_else(|| derived_inverse_label(&option_key), humanize);

        Self {
            option_key,
            forward_label,
            inverse_label,
        }
    }

    /// The directive option that declares this relationship.
    #[must_use]
    pub fn option_key(&self) -> &str {
        &self.option_key
    }

    /// Display label for the declared direction, e.g. `Satisfies`.
    #[must_use]
    pub fn forward_label(&self) -> &str {
        &self.forward_label
    }

    /// Display label for the inferred direction, e.g. `Satisfied By`.
    #[must_use]
    pub fn inverse_label(&self) -> &str {
        &self.inverse_label
    }
}

/// The set of relationship kinds known to a build.
///
/// Kinds are kept in configuration order, which is also the order forward
/// rows appear on a block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelationshipSchema {
    kinds: IndexMap<String, RelationshipKind>,
}

impl RelationshipSchema {
    /// Builds the schema from configured link types.
    ///
    /// Entries with an empty option are skipped. If an option appears twice,
    /// the later labels win and the earlier position is kept.
    pub fn new<'a>(link_types: impl IntoIterator<Item = &'a LinkType>) -> Self {
        let mut kinds = IndexMap::new();
        for link_type in link_types {
            let kind = RelationshipKind::from_link_type(link_type);
            if kind.option_key.is_empty() {
                tracing::debug!("skipping link type with an empty option");
                continue;
            }
            kinds.insert(kind.option_key.clone(), kind);
        }
        Self { kinds }
    }

    /// Whether the given option key declares a relationship.
    #[must_use]
    pub fn contains(&self, option_key: &str) -> bool {
        self.kinds.contains_key(option_key)
    }

    /// The valid option keys, in configuration order.
    pub fn option_keys(&self) -> impl Iterator<Item = &str> {
        self.kinds.keys().map(String::as_str)
    }

    /// The relationship kinds, in configuration order.
    pub fn kinds(&self) -> impl Iterator<Item = &RelationshipKind> {
        self.kinds.values()
    }

    /// Looks up a relationship kind.
    #[must_use]
    pub fn get(&self, option_key: &str) -> Option<&RelationshipKind> {
        self.kinds.get(option_key)
    }

    /// Display label for the declared direction of a relationship.
    #[must_use]
    pub fn forward_label(&self, option_key: &str) -> String {
        self.get(option_key).map_or_else(
            || derived_forward_label(option_key),
            |kind| kind.forward_label.clone(),
        )
    }

    /// Display label for the inferred direction of a relationship.
    #[must_use]
    pub fn inverse_label(&self, option_key: &str) -> String {
        self.get(option_key).map_or_else(
            || derived_inverse_label(option_key),
            |kind| kind.inverse_label.clone(),
        )
    }

    /// The number of relationship kinds.
    #[must_use]
    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    /// Whether the schema declares no relationships at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}

fn derived_forward_label(option_key: &str) -> String {
    humanize(option_key)
}

fn derived_inverse_label(option_key: &str) -> String {
    format!("{} (Incoming)", humanize(option_key))
}

/// Turns an option key or configured label into a display label.
///
/// Separators become spaces and each word is title-cased.
///
/// ```
/// use rigr::domain::schema::humanize;
///
/// assert_eq!(humanize("satisfied_by"), "Satisfied By");
/// assert_eq!(humanize("derives-from"), "Derives From");
/// ```
#[must_use]
pub fn humanize(key: &str) -> String {
    title_case(&key.trim().replace(['_', '-'], " "))
}

/// Title-cases a string.
///
/// A letter is upper-cased when it follows a non-letter (or starts the
/// string) and lower-cased otherwise.
#[must_use]
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut previous_is_letter = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if previous_is_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            previous_is_letter = true;
        } else {
            out.push(c);
            previous_is_letter = false;
        }
    }
    out
}
