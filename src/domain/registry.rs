//! Build-scoped storage of declared (outgoing) relationships.

use indexmap::IndexMap;
use nonempty::NonEmpty;
use serde::{Serialize, ser::SerializeMap};

use crate::domain::{Identifier, RelationshipSchema};

/// The options declared on one directive, in declaration order.
///
/// Keys are option names without the surrounding colons. A repeated option
/// keeps its first position and its last value.
pub type DeclaredOptions = IndexMap<String, String>;

/// The outgoing relationships declared by one item.
///
/// Maps a relationship's option key to the targets named in its value, in the
/// order they were written. Every stored sequence is non-empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutgoingRecord {
    links: IndexMap<String, NonEmpty<Identifier>>,
}

impl OutgoingRecord {
    /// Extracts the relationships from a directive's options.
    ///
    /// Only options named by the schema are considered, in schema order.
    /// Values are split on commas and each piece is trimmed; empty pieces are
    /// dropped, and a value with no pieces left creates no entry.
    #[must_use]
    pub fn from_options(schema: &RelationshipSchema, options: &DeclaredOptions) -> Self {
        let links = schema
            .option_keys()
            .filter_map(|key| {
                let value = options.get(key)?;
                let targets = NonEmpty::from_vec(split_targets(value))?;
                Some((key.to_string(), targets))
            })
            .collect();
        Self { links }
    }

    /// The targets declared for one relationship kind.
    #[must_use]
    pub fn targets(&self, option_key: &str) -> Option<&NonEmpty<Identifier>> {
        self.links.get(option_key)
    }

    /// Iterates over `(option_key, targets)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &NonEmpty<Identifier>)> {
        self.links.iter().map(|(key, targets)| (key.as_str(), targets))
    }

    /// Whether this record declares no relationships.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// The number of individual links (target occurrences) in this record.
    #[must_use]
    pub fn link_count(&self) -> usize {
        self.links.values().map(NonEmpty::len).sum()
    }
}

impl Serialize for OutgoingRecord {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.links.len()))?;
        for (key, targets) in &self.links {
            map.serialize_entry(key, &targets.iter().collect::<Vec<_>>())?;
        }
        map.end()
    }
}

/// Splits a relationship option value into target identifiers.
///
/// ```
/// use rigr::domain::registry::split_targets;
///
/// let targets = split_targets(" B, A ,, C ");
/// let targets: Vec<&str> = targets.iter().map(|id| id.as_str()).collect();
/// assert_eq!(targets, ["B", "A", "C"]);
/// ```
#[must_use]
pub fn split_targets(value: &str) -> Vec<Identifier> {
    value
        .split(',')
        .filter_map(|piece| Identifier::new(piece).ok())
        .collect()
}

/// The store of every outgoing relationship declared in one build.
///
/// Sources keep the position at which they were first recorded; recording a
/// source again replaces its record in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Registry {
    records: IndexMap<Identifier, OutgoingRecord>,
}

impl Registry {
    /// Stores the record for a source, replacing any earlier one.
    ///
    /// Returns the record that was replaced, if any.
    pub fn insert(&mut self, source: Identifier, record: OutgoingRecord) -> Option<OutgoingRecord> {
        self.records.insert(source, record)
    }

    /// The record for a source.
    #[must_use]
    pub fn get(&self, source: &str) -> Option<&OutgoingRecord> {
        self.records.get(source)
    }

    /// Iterates over sources and their records, in first-recorded order.
    pub fn iter(&self) -> impl Iterator<Item = (&Identifier, &OutgoingRecord)> {
        self.records.iter()
    }

    /// Iterates over every `(source, option_key, target)` triple.
    pub fn triples(&self) -> impl Iterator<Item = (&Identifier, &str, &Identifier)> {
        self.records.iter().flat_map(|(source, record)| {
            record.iter().flat_map(move |(key, targets)| {
                targets.iter().map(move |target| (source, key, target))
            })
        })
    }

    /// The number of recorded sources.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;
    use crate::domain::config::LinkType;

    fn schema() -> RelationshipSchema {
        RelationshipSchema::new(&[
            LinkType::new("satisfies", "satisfies", "satisfied_by"),
            LinkType::new("tests", "tests", "tested_by"),
        ])
    }

    fn options(pairs: &[(&str, &str)]) -> DeclaredOptions {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    fn ids(targets: &NonEmpty<Identifier>) -> Vec<&str> {
        targets.iter().map(Identifier::as_str).collect()
    }

    #[test_case("B, A, C", &["B", "A", "C"]; "order preserved")]
    #[test_case("B, B", &["B", "B"]; "duplicates preserved")]
    #[test_case("R1", &["R1"]; "single")]
    #[test_case("R1,R2", &["R1", "R2"]; "no spaces")]
    #[test_case(" R1 ,, R2 ,", &["R1", "R2"]; "empty pieces dropped")]
    fn record_keeps_declared_targets(value: &str, expected: &[&str]) {
        let record = OutgoingRecord::from_options(&schema(), &options(&[("satisfies", value)]));
        assert_eq!(ids(record.targets("satisfies").unwrap()), expected);
    }

    #[test_case(""; "empty")]
    #[test_case("   "; "whitespace")]
    #[test_case(" , ,"; "separators only")]
    fn blank_values_create_no_entry(value: &str) {
        let record = OutgoingRecord::from_options(&schema(), &options(&[("satisfies", value)]));
        assert!(record.targets("satisfies").is_none());
        assert!(record.is_empty());
    }

    #[test]
    fn unknown_options_are_ignored() {
        let record = OutgoingRecord::from_options(
            &schema(),
            &options(&[("priority", "high"), ("refines", "R9"), ("tests", "R2")]),
        );

        assert_eq!(record.iter().map(|(key, _)| key).collect::<Vec<_>>(), ["tests"]);
    }

    #[test]
    fn record_follows_schema_order() {
        let record = OutgoingRecord::from_options(
            &schema(),
            &options(&[("tests", "T1"), ("satisfies", "S1, S2")]),
        );

        assert_eq!(
            record.iter().map(|(key, _)| key).collect::<Vec<_>>(),
            ["satisfies", "tests"]
        );
        assert_eq!(record.link_count(), 3);
    }

    #[test]
    fn re_recording_replaces_in_place() {
        let schema = schema();
        let mut registry = Registry::default();
        let x = Identifier::new("X").unwrap();
        let y = Identifier::new("Y").unwrap();

        registry.insert(
            x.clone(),
            OutgoingRecord::from_options(&schema, &options(&[("satisfies", "A")])),
        );
        registry.insert(
            y,
            OutgoingRecord::from_options(&schema, &options(&[("satisfies", "A")])),
        );
        let replaced = registry.insert(
            x,
            OutgoingRecord::from_options(&schema, &options(&[("tests", "B")])),
        );

        assert!(replaced.is_some());
        let record = registry.get("X").unwrap();
        assert!(record.targets("satisfies").is_none());
        assert_eq!(ids(record.targets("tests").unwrap()), ["B"]);
        assert_eq!(
            registry.iter().map(|(id, _)| id.as_str()).collect::<Vec<_>>(),
            ["X", "Y"]
        );
    }

    #[test]
    fn triples_flatten_in_order() {
        let schema = schema();
        let mut registry = Registry::default();
        registry.insert(
            Identifier::new("R1").unwrap(),
            OutgoingRecord::from_options(&schema, &options(&[("satisfies", "A, B"), ("tests", "C")])),
        );

        let triples: Vec<_> = registry
            .triples()
            .map(|(s, k, t)| (s.as_str(), k, t.as_str()))
            .collect();
        assert_eq!(
            triples,
            [
                ("R1", "satisfies", "A"),
                ("R1", "satisfies", "B"),
                ("R1", "tests", "C")
            ]
        );
    }

    #[test]
    fn serializes_as_nested_maps() {
        let schema = schema();
        let mut registry = Registry::default();
        registry.insert(
            Identifier::new("R1").unwrap(),
            OutgoingRecord::from_options(&schema, &options(&[("satisfies", "R2, R3")])),
        );

        let json = serde_json::to_value(&registry).unwrap();
        assert_eq!(json, serde_json::json!({ "R1": { "satisfies": ["R2", "R3"] } }));
    }
}
