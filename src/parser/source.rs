//! API documentation tables → entities.
//!
//! Each system table in a source file looks like:
//!
//! ```lua
//! local ChatInfo =
//! {
//!     Name = "ChatInfo",
//!     Type = "System",
//!     Namespace = "C_ChatInfo",
//!     Functions = { { Name = "GetChannelInfo", Arguments = { ... }, Returns = { ... } } },
//!     Events = { { Name = "ChannelCountUpdate", LiteralName = "CHANNEL_COUNT_UPDATE", Payload = { ... } } },
//!     Tables = { { Name = "ChatChannelType", Type = "Enumeration", Fields = { ... } } },
//! };
//! ```

use crate::error::{Error, Result};
use crate::model::*;
use crate::parser::lua::{self, LuaTable, LuaValue};
use tracing::debug;

const SYSTEM_KEYS: &[&str] = &["Functions", "Events", "Tables"];

/// Parse a documentation source file, tagging every entity with `release`.
pub fn parse(input: &str, release: &semver::Version) -> Result<ApiCollection> {
    let mut collection = ApiCollection::new();
    let version = Version::Point(release.clone());

    for assignment in lua::parse_assignments(input)? {
        let system = &assignment.table;
        if !SYSTEM_KEYS.iter().any(|key| system.has(key)) {
            debug!(name = %assignment.name, "not a documentation table");
            continue;
        }
        let ns = system.get_str("Namespace");
        let context = system.get_str("Name").unwrap_or(&assignment.name);

        for entry in records(system, "Functions") {
            collection.add_function(function(entry, ns, &version, context)?);
        }
        for entry in records(system, "Events") {
            collection.add_event(event(entry, ns, &version, context)?);
        }
        for entry in records(system, "Tables") {
            collection.add_table(table(entry, ns, &version, context)?);
        }
    }
    Ok(collection)
}

/// Positional table entries under `key`.
fn records<'a>(table: &'a LuaTable, key: &str) -> impl Iterator<Item = &'a LuaTable> {
    table
        .get_table(key)
        .into_iter()
        .flat_map(|t| t.items())
        .filter_map(LuaValue::as_table)
}

fn required_name(entry: &LuaTable, kind: &'static str, context: &str) -> Result<String> {
    entry
        .get_str("Name")
        .map(str::to_string)
        .ok_or_else(|| Error::missing(kind, "Name", format!("in {context}")))
}

/// `Documentation = { "line", "line" }` joined into one paragraph.
fn documentation(entry: &LuaTable) -> Option<String> {
    let lines: Vec<&str> = entry
        .get_table("Documentation")?
        .items()
        .filter_map(LuaValue::as_str)
        .collect();
    if lines.is_empty() {
        None
    } else {
        Some(lines.join(" "))
    }
}

fn function(entry: &LuaTable, ns: Option<&str>, version: &Version, context: &str) -> Result<ApiFunction> {
    let name = required_name(entry, "function", context)?;
    let where_ = format!("{context}.{name}");
    Ok(ApiFunction::new(name, ns, version.clone())
        .with_description(documentation(entry))
        .with_parameters(signatures(entry, "Arguments", &where_)?)
        .with_returns(signatures(entry, "Returns", &where_)?))
}

fn event(entry: &LuaTable, ns: Option<&str>, version: &Version, context: &str) -> Result<ApiEvent> {
    let name = required_name(entry, "event", context)?;
    let literal = entry
        .get_str("LiteralName")
        .ok_or_else(|| Error::missing("event", "LiteralName", format!("{context}.{name}")))?
        .to_string();
    let where_ = format!("{context}.{name}");
    Ok(ApiEvent::new(name, literal, ns, version.clone())
        .with_description(documentation(entry))
        .with_payload(signatures(entry, "Payload", &where_)?))
}

fn table(entry: &LuaTable, ns: Option<&str>, version: &Version, context: &str) -> Result<ApiTable> {
    let name = required_name(entry, "table", context)?;
    let kind = TableKind::from_source_type(entry.get_str("Type").unwrap_or_default());
    let where_ = format!("{context}.{name}");

    let table = ApiTable::new(name, ns, kind, version.clone())
        .with_description(documentation(entry))
        .with_parameters(signatures(entry, "Arguments", &where_)?);

    Ok(match kind {
        // enumeration members live under Fields in the source
        TableKind::Enum => table.with_values(signatures(entry, "Fields", &where_)?),
        TableKind::Constants => table.with_values(signatures(entry, "Values", &where_)?),
        TableKind::Structure => table.with_fields(signatures(entry, "Fields", &where_)?),
    })
}

fn signatures(entry: &LuaTable, key: &str, context: &str) -> Result<Vec<VariableSignature>> {
    records(entry, key).map(|s| signature(s, context)).collect()
}

fn signature(entry: &LuaTable, context: &str) -> Result<VariableSignature> {
    let name = required_name(entry, "signature", context)?;
    let ty = entry
        .get_str("Type")
        .ok_or_else(|| Error::missing("signature", "Type", format!("{context}.{name}")))?;

    let mut sig = VariableSignature::new(name.as_str(), ty)
        .nilable(entry.get_bool("Nilable").unwrap_or(false));
    if let Some(description) = documentation(entry) {
        sig.description = description;
    }
    sig.mixin = entry.get_str("Mixin").map(str::to_string);
    sig.default = entry.get("Default").and_then(literal);
    sig.stride_index = entry
        .get("StrideIndex")
        .and_then(LuaValue::as_integer);
    sig.value = entry
        .get("EnumValue")
        .or_else(|| entry.get("Value"))
        .and_then(literal);
    Ok(sig)
}

fn literal(value: &LuaValue) -> Option<Literal> {
    match value {
        LuaValue::Bool(b) => Some(Literal::Bool(*b)),
        LuaValue::Integer(i) => Some(Literal::Int(*i)),
        LuaValue::Number(n) => Some(Literal::Number(*n)),
        LuaValue::Str(s) | LuaValue::Path(s) => Some(Literal::Str(s.clone())),
        LuaValue::Nil | LuaValue::Table(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHAT_INFO: &str = r#"
local ChatInfo =
{
	Name = "ChatInfo",
	Type = "System",
	Namespace = "C_ChatInfo",

	Functions =
	{
		{
			Name = "GetChannelInfo",
			Type = "Function",
			Documentation = { "Returns channel info.", "May be nil." },

			Arguments =
			{
				{ Name = "channelID", Type = "number", Nilable = false },
				{ Name = "verbose", Type = "bool", Nilable = true, Default = false },
			},

			Returns =
			{
				{ Name = "info", Type = "ChatChannelInfo", Nilable = true },
			},
		},
	},

	Events =
	{
		{
			Name = "ChannelCountUpdate",
			Type = "Event",
			LiteralName = "CHANNEL_COUNT_UPDATE",
			Payload =
			{
				{ Name = "displayIndex", Type = "number", Nilable = false },
			},
		},
	},

	Tables =
	{
		{
			Name = "ChatChannelType",
			Type = "Enumeration",
			NumValues = 2,
			Fields =
			{
				{ Name = "None", Type = "ChatChannelType", EnumValue = 0 },
				{ Name = "Custom", Type = "ChatChannelType", EnumValue = 1 },
			},
		},
		{
			Name = "ChatChannelInfo",
			Type = "Structure",
			Fields =
			{
				{ Name = "name", Type = "cstring", Nilable = false },
				{ Name = "kind", Type = "ChatChannelType", Nilable = false, Default = Enum.ChatChannelType.None },
			},
		},
		{
			Name = "ChatConstants",
			Type = "Constants",
			Values =
			{
				{ Name = "MAX_CHANNELS", Type = "number", Value = 10 },
			},
		},
	},
};

APIDocumentation:AddDocumentationTable(ChatInfo);
"#;

    fn release() -> semver::Version {
        semver::Version::new(10, 2, 7)
    }

    #[test]
    fn parses_functions() {
        let c = parse(CHAT_INFO, &release()).unwrap();
        assert_eq!(c.functions.len(), 1);
        let f = &c.functions[0];
        assert_eq!(f.qualified_name(), "C_ChatInfo.GetChannelInfo");
        assert_eq!(f.description.as_deref(), Some("Returns channel info. May be nil."));
        assert_eq!(f.parameters.len(), 2);
        assert!(f.parameters[1].nilable);
        assert_eq!(f.parameters[1].default, Some(Literal::Bool(false)));
        assert_eq!(f.returns[0].ty, "ChatChannelInfo");
        assert_eq!(f.version, Version::point(10, 2, 7));
    }

    #[test]
    fn parses_events() {
        let c = parse(CHAT_INFO, &release()).unwrap();
        let e = &c.events[0];
        assert_eq!(e.literal_name, "CHANNEL_COUNT_UPDATE");
        assert_eq!(e.ns, "C_ChatInfo");
        assert_eq!(e.payload[0].name, "displayIndex");
    }

    #[test]
    fn parses_table_kinds() {
        let c = parse(CHAT_INFO, &release()).unwrap();
        assert_eq!(c.tables.len(), 3);

        let enumeration = &c.tables[0];
        assert_eq!(enumeration.kind, TableKind::Enum);
        assert!(enumeration.fields.is_empty());
        assert_eq!(enumeration.values[1].value, Some(Literal::Int(1)));

        let structure = &c.tables[1];
        assert_eq!(structure.kind, TableKind::Structure);
        assert_eq!(
            structure.fields[1].default,
            Some(Literal::Str("Enum.ChatChannelType.None".into()))
        );

        let constants = &c.tables[2];
        assert_eq!(constants.kind, TableKind::Constants);
        assert_eq!(constants.values[0].value, Some(Literal::Int(10)));
    }

    #[test]
    fn missing_namespace_is_global() {
        let input = r#"local Sys = { Name = "Sys", Functions = { { Name = "GetTime" } } }"#;
        let c = parse(input, &release()).unwrap();
        assert_eq!(c.functions[0].ns, GLOBAL_NAMESPACE);
        assert!(c.functions[0].parameters.is_empty());
    }

    #[test]
    fn missing_function_name_is_fatal() {
        let input = r#"local Sys = { Name = "Sys", Functions = { { Type = "Function" } } }"#;
        let err = parse(input, &release()).unwrap_err();
        assert!(matches!(
            err,
            Error::MissingField { kind: "function", field: "Name", .. }
        ));
    }

    #[test]
    fn missing_signature_type_is_fatal() {
        let input = r#"local Sys = { Functions = { { Name = "F", Arguments = { { Name = "x" } } } } }"#;
        let err = parse(input, &release()).unwrap_err();
        assert!(err.to_string().contains("Sys.F.x") || err.to_string().contains("F.x"));
    }

    #[test]
    fn non_system_tables_are_skipped() {
        let input = r#"local Colors = { Red = 1 }"#;
        assert!(parse(input, &release()).unwrap().is_empty());
    }

    #[test]
    fn stride_index_is_kept_only_when_whole() {
        let input = r#"local Sys = { Functions = { { Name = "F", Returns = {
            { Name = "a", Type = "number", StrideIndex = 2 },
            { Name = "b", Type = "number", StrideIndex = 2.5 },
        } } } }"#;
        let c = parse(input, &release()).unwrap();
        assert_eq!(c.functions[0].returns[0].stride_index, Some(2));
        assert_eq!(c.functions[0].returns[1].stride_index, None);
    }
}
