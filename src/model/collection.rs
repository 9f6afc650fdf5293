//! An ordered bag of functions, tables and events, and the merge over it.

use crate::error::Result;
use crate::model::entity::{ApiEvent, ApiFunction, ApiTable, Declaration};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// API surface from one source, one version, or the union of many.
///
/// Insertion order is kept for deterministic output but carries no meaning.
/// Nothing stops the same declaration being added twice; identity is only
/// resolved by [`ApiCollection::combine`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiCollection {
    #[serde(default)]
    pub functions: Vec<ApiFunction>,
    #[serde(default)]
    pub tables: Vec<ApiTable>,
    #[serde(default)]
    pub events: Vec<ApiEvent>,
}

impl ApiCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_function(&mut self, function: ApiFunction) {
        self.functions.push(function);
    }

    pub fn add_table(&mut self, table: ApiTable) {
        self.tables.push(table);
    }

    pub fn add_event(&mut self, event: ApiEvent) {
        self.events.push(event);
    }

    /// Move every entity of `other` onto the end of this collection without
    /// any identity resolution.
    pub fn append(&mut self, other: ApiCollection) {
        self.functions.extend(other.functions);
        self.tables.extend(other.tables);
        self.events.extend(other.events);
    }

    pub fn len(&self) -> usize {
        self.functions.len() + self.tables.len() + self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fold `other` into a copy of `self`.
    ///
    /// For each incoming entity, the first accumulated entity with the same
    /// name is checked: if it is the same declaration its version is
    /// extended, otherwise the incoming entity is appended as a separate
    /// row. Only that first name match is considered, so a third shape of an
    /// already-diverged name is appended even if it equals the second one.
    pub fn combine(&self, other: &ApiCollection) -> ApiCollection {
        ApiCollection {
            functions: combine_entities(&self.functions, &other.functions),
            tables: combine_entities(&self.tables, &other.tables),
            events: combine_entities(&self.events, &other.events),
        }
    }

    /// Entities whose version covers `release`.
    pub fn filter_for_version(&self, release: &semver::Version) -> ApiCollection {
        ApiCollection {
            functions: retain_valid(&self.functions, release),
            tables: retain_valid(&self.tables, release),
            events: retain_valid(&self.events, release),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load a collection, failing on any entity whose version text is
    /// neither a point nor a range.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

fn combine_entities<T: Declaration>(left: &[T], right: &[T]) -> Vec<T> {
    let mut merged = left.to_vec();
    for entity in right {
        let first_match = merged.iter().position(|e| e.name() == entity.name());
        match first_match {
            Some(i) if merged[i].same_declaration(entity) => {
                merged[i].extend_version(entity.version());
                merged[i].absorb(entity);
                debug!(
                    kind = T::KIND,
                    name = entity.name(),
                    version = %merged[i].version(),
                    "extended"
                );
            }
            Some(_) => {
                debug!(
                    kind = T::KIND,
                    name = entity.name(),
                    version = %entity.version(),
                    "diverged from existing declaration"
                );
                merged.push(entity.clone());
            }
            None => merged.push(entity.clone()),
        }
    }
    merged
}

fn retain_valid<T: Declaration>(entities: &[T], release: &semver::Version) -> Vec<T> {
    entities
        .iter()
        .filter(|e| e.valid_at(release))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::entity::TableKind;
    use crate::model::signature::VariableSignature;
    use crate::model::version::Version;

    fn func(name: &str, version: Version) -> ApiFunction {
        ApiFunction::new(name, None, version)
    }

    fn collection(functions: Vec<ApiFunction>) -> ApiCollection {
        ApiCollection {
            functions,
            ..Default::default()
        }
    }

    #[test]
    fn combine_keeps_left_order_then_new_right() {
        let left = collection(vec![func("A", Version::point(1, 0, 0)), func("B", Version::point(1, 0, 0))]);
        let right = collection(vec![func("C", Version::point(2, 0, 0)), func("A", Version::point(2, 0, 0))]);
        let merged = left.combine(&right);
        let names: Vec<_> = merged.functions.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["A", "B", "C"]);
        assert_eq!(merged.functions[0].version.to_string(), "1.0.0 || 2.0.0");
        assert_eq!(merged.functions[1].version, Version::point(1, 0, 0));
    }

    #[test]
    fn combine_does_not_touch_inputs() {
        let left = collection(vec![func("A", Version::point(1, 0, 0))]);
        let right = collection(vec![func("A", Version::point(2, 0, 0))]);
        let _ = left.combine(&right);
        assert_eq!(left.functions[0].version, Version::point(1, 0, 0));
    }

    #[test]
    fn only_first_name_match_is_tested() {
        let changed = |v| {
            func("A", v).with_parameters(vec![VariableSignature::new("x", "number")])
        };
        let left = collection(vec![func("A", Version::point(1, 0, 0)), changed(Version::point(2, 0, 0))]);
        let right = collection(vec![changed(Version::point(3, 0, 0))]);
        let merged = left.combine(&right);
        assert_eq!(merged.functions.len(), 3);
        assert_eq!(merged.functions[1].version, Version::point(2, 0, 0));
    }

    #[test]
    fn kinds_merge_independently() {
        let mut left = ApiCollection::new();
        left.add_table(ApiTable::new("Foo", None, TableKind::Structure, Version::point(1, 0, 0)));
        let right = collection(vec![func("Foo", Version::point(2, 0, 0))]);
        let merged = left.combine(&right);
        assert_eq!(merged.tables.len(), 1);
        assert_eq!(merged.functions.len(), 1);
        assert!(merged.tables[0].version.is_point());
    }

    #[test]
    fn enum_gaining_members_stays_one_row() {
        let color = |version: Version, members: &[&str]| {
            let mut c = ApiCollection::new();
            c.add_table(
                ApiTable::new("Color", Some("Enum"), TableKind::Enum, version).with_values(
                    members.iter().map(|m| VariableSignature::new(*m, "Color")).collect(),
                ),
            );
            c
        };
        let merged = color(Version::point(1, 0, 0), &["Red"])
            .combine(&color(Version::point(2, 0, 0), &["Red", "Blue"]));

        assert_eq!(merged.tables.len(), 1);
        assert_eq!(merged.tables[0].version.to_string(), "1.0.0 || 2.0.0");
        let members: Vec<&str> = merged.tables[0].values.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(members, ["Red", "Blue"]);
    }

    #[test]
    fn events_extend() {
        let mut left = ApiCollection::new();
        left.add_event(ApiEvent::new("PlayerLogin", "PLAYER_LOGIN", None, Version::point(1, 0, 0)));
        let mut right = ApiCollection::new();
        right.add_event(ApiEvent::new("PlayerLogin", "PLAYER_LOGIN", None, Version::point(2, 0, 0)));
        let merged = left.combine(&right);
        assert_eq!(merged.events.len(), 1);
        assert_eq!(merged.events[0].version.to_string(), "1.0.0 || 2.0.0");
    }

    #[test]
    fn filter_drops_out_of_range() {
        let c = collection(vec![
            func("Old", Version::parse("<2.0.0").unwrap()),
            func("New", Version::parse(">=2.0.0").unwrap()),
        ]);
        let at = c.filter_for_version(&semver::Version::new(2, 1, 0));
        assert_eq!(at.functions.len(), 1);
        assert_eq!(at.functions[0].name, "New");
    }

    #[test]
    fn append_keeps_duplicates() {
        let mut a = collection(vec![func("A", Version::point(1, 0, 0))]);
        a.append(collection(vec![func("A", Version::point(1, 0, 0))]));
        assert_eq!(a.len(), 2);
    }

    #[test]
    fn missing_lists_default_to_empty() {
        let c = ApiCollection::from_json(r#"{"functions":[{"name":"GetTime","version":"1.0.0"}]}"#)
            .unwrap();
        assert_eq!(c.functions[0].ns, crate::model::entity::GLOBAL_NAMESPACE);
        assert!(c.functions[0].parameters.is_empty());
        assert!(c.tables.is_empty());
    }

    #[test]
    fn bad_version_fails_load() {
        let err = ApiCollection::from_json(r#"{"functions":[{"name":"GetTime","version":">>x"}]}"#);
        assert!(err.is_err());
    }
}
