//! Split a collection into the files an emitter writes.

use crate::model::*;
use std::collections::BTreeMap;

/// Partition holding functions of the global namespace.
pub const GLOBAL_PARTITION: &str = "Global";
pub const EVENTS_PARTITION: &str = "Events";

/// Partition name for a table kind.
pub fn table_partition(kind: TableKind) -> &'static str {
    match kind {
        TableKind::Structure => "Structures",
        TableKind::Enum => "Enums",
        TableKind::Constants => "Constants",
    }
}

/// Group entities by output file.
///
/// Functions go by namespace, tables by kind and all events together.
/// Empty partitions are never created; iteration order is by name.
pub fn partition(collection: &ApiCollection) -> BTreeMap<String, ApiCollection> {
    let mut parts: BTreeMap<String, ApiCollection> = BTreeMap::new();

    for function in &collection.functions {
        let name = if function.ns == GLOBAL_NAMESPACE {
            GLOBAL_PARTITION
        } else {
            function.ns.as_str()
        };
        parts.entry(name.to_string()).or_default().add_function(function.clone());
    }
    for table in &collection.tables {
        parts
            .entry(table_partition(table.kind).to_string())
            .or_default()
            .add_table(table.clone());
    }
    for event in &collection.events {
        parts
            .entry(EVENTS_PARTITION.to_string())
            .or_default()
            .add_event(event.clone());
    }
    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_by_namespace_and_kind() {
        let v = Version::point(1, 0, 0);
        let mut c = ApiCollection::new();
        c.add_function(ApiFunction::new("GetTime", None, v.clone()));
        c.add_function(ApiFunction::new("GetInfo", Some("C_Chat"), v.clone()));
        c.add_function(ApiFunction::new("Join", Some("C_Chat"), v.clone()));
        c.add_table(ApiTable::new("Color", None, TableKind::Enum, v.clone()));
        c.add_table(ApiTable::new("Info", None, TableKind::Structure, v.clone()));
        c.add_event(ApiEvent::new("PlayerLogin", "PLAYER_LOGIN", None, v));

        let parts = partition(&c);
        let names: Vec<&str> = parts.keys().map(String::as_str).collect();
        assert_eq!(names, ["C_Chat", "Enums", "Events", "Global", "Structures"]);
        assert_eq!(parts["C_Chat"].functions.len(), 2);
        assert_eq!(parts["Global"].functions[0].name, "GetTime");
        assert!(!parts.contains_key("Constants"));
    }

    #[test]
    fn empty_collection_has_no_partitions() {
        assert!(partition(&ApiCollection::new()).is_empty());
    }
}
