//! Functions, tables and events: the three kinds of API declaration.
//!
//! Each entity owns its [`Version`]; the shared version handling lives in
//! the [`Versioned`] trait and identity in [`Declaration`].

use crate::model::signature::{same_signatures, VariableSignature};
use crate::model::version::Version;
use serde::{Deserialize, Serialize};

/// Namespace given to every declaration that has none.
pub const GLOBAL_NAMESPACE: &str = "_G";

/// Map an absent or blank namespace onto [`GLOBAL_NAMESPACE`].
pub fn namespace_or_global(ns: Option<&str>) -> String {
    match ns.map(str::trim) {
        Some(ns) if !ns.is_empty() => ns.to_string(),
        _ => GLOBAL_NAMESPACE.to_string(),
    }
}

fn global_namespace() -> String {
    GLOBAL_NAMESPACE.to_string()
}

/// Anything that carries a validity version.
pub trait Versioned {
    fn version(&self) -> &Version;

    fn set_version(&mut self, version: Version);

    /// Replace the version with its union with `other`.
    fn extend_version(&mut self, other: &Version) {
        let extended = self.version().extend(other);
        self.set_version(extended);
    }

    fn valid_at(&self, release: &semver::Version) -> bool {
        self.version().test(release)
    }
}

/// A named declaration that can be matched against another of its kind.
pub trait Declaration: Versioned + Clone {
    /// Human-readable kind, used in logs.
    const KIND: &'static str;

    fn name(&self) -> &str;

    fn ns(&self) -> &str;

    /// Same declaration observed at a different version: same name, same
    /// namespace, same signature lists compared as sets.
    fn same_declaration(&self, other: &Self) -> bool;

    /// Take over content of a matched declaration that is not part of its
    /// identity. Called after the version has been extended.
    fn absorb(&mut self, _other: &Self) {}
}

macro_rules! impl_versioned {
    ($($ty:ty),+) => {$(
        impl Versioned for $ty {
            fn version(&self) -> &Version {
                &self.version
            }

            fn set_version(&mut self, version: Version) {
                self.version = version;
            }
        }
    )+};
}

/// An event a function can fire, as listed on its documentation page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRef {
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiFunction {
    pub name: String,
    #[serde(default = "global_namespace")]
    pub ns: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub parameters: Vec<VariableSignature>,
    #[serde(default)]
    pub returns: Vec<VariableSignature>,
    #[serde(default)]
    pub events: Vec<EventRef>,
    pub version: Version,
}

impl ApiFunction {
    pub fn new(name: impl Into<String>, ns: Option<&str>, version: Version) -> Self {
        ApiFunction {
            name: name.into(),
            ns: namespace_or_global(ns),
            description: None,
            parameters: Vec::new(),
            returns: Vec::new(),
            events: Vec::new(),
            version,
        }
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    pub fn with_parameters(mut self, parameters: Vec<VariableSignature>) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn with_returns(mut self, returns: Vec<VariableSignature>) -> Self {
        self.returns = returns;
        self
    }

    pub fn with_events(mut self, events: Vec<EventRef>) -> Self {
        self.events = events;
        self
    }

    /// `Namespace.Name`, or just `Name` in the global namespace.
    pub fn qualified_name(&self) -> String {
        qualify(&self.ns, &self.name)
    }
}

impl Declaration for ApiFunction {
    const KIND: &'static str = "function";

    fn name(&self) -> &str {
        &self.name
    }

    fn ns(&self) -> &str {
        &self.ns
    }

    fn same_declaration(&self, other: &Self) -> bool {
        self.name == other.name
            && self.ns == other.ns
            && same_signatures(&self.parameters, &other.parameters)
            && same_signatures(&self.returns, &other.returns)
    }
}

/// How a table's variable lists are read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TableKind {
    /// Plain record type; members in `fields`.
    #[default]
    Structure,
    /// Enumeration; members in `values`.
    Enum,
    /// Bag of named constants; members in `values`.
    Constants,
}

impl TableKind {
    /// Kind named by a documentation table's `Type` entry.
    pub fn from_source_type(ty: &str) -> Self {
        match ty {
            "Enumeration" | "Enum" => TableKind::Enum,
            "Constants" => TableKind::Constants,
            _ => TableKind::Structure,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiTable {
    pub name: String,
    #[serde(default = "global_namespace")]
    pub ns: String,
    #[serde(rename = "type", default)]
    pub kind: TableKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub fields: Vec<VariableSignature>,
    #[serde(default)]
    pub parameters: Vec<VariableSignature>,
    #[serde(default)]
    pub values: Vec<VariableSignature>,
    pub version: Version,
}

impl ApiTable {
    pub fn new(name: impl Into<String>, ns: Option<&str>, kind: TableKind, version: Version) -> Self {
        ApiTable {
            name: name.into(),
            ns: namespace_or_global(ns),
            kind,
            description: None,
            fields: Vec::new(),
            parameters: Vec::new(),
            values: Vec::new(),
            version,
        }
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    pub fn with_fields(mut self, fields: Vec<VariableSignature>) -> Self {
        self.fields = fields;
        self
    }

    pub fn with_parameters(mut self, parameters: Vec<VariableSignature>) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn with_values(mut self, values: Vec<VariableSignature>) -> Self {
        self.values = values;
        self
    }

    /// The member list that `kind` says is meaningful.
    pub fn members(&self) -> &[VariableSignature] {
        match self.kind {
            TableKind::Structure => &self.fields,
            TableKind::Enum | TableKind::Constants => &self.values,
        }
    }
}

impl Declaration for ApiTable {
    const KIND: &'static str = "table";

    fn name(&self) -> &str {
        &self.name
    }

    fn ns(&self) -> &str {
        &self.ns
    }

    fn same_declaration(&self, other: &Self) -> bool {
        self.name == other.name && self.ns == other.ns && same_signatures(&self.fields, &other.fields)
    }

    /// Enum and constant members are not identity, so members first seen in
    /// a later snapshot are appended to the surviving row.
    fn absorb(&mut self, other: &Self) {
        for value in &other.values {
            if !self.values.iter().any(|own| own.name == value.name) {
                self.values.push(value.clone());
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiEvent {
    pub name: String,
    /// The string the game dispatches, e.g. `PLAYER_LOGIN`.
    pub literal_name: String,
    #[serde(default = "global_namespace")]
    pub ns: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub payload: Vec<VariableSignature>,
    pub version: Version,
}

impl ApiEvent {
    pub fn new(
        name: impl Into<String>,
        literal_name: impl Into<String>,
        ns: Option<&str>,
        version: Version,
    ) -> Self {
        ApiEvent {
            name: name.into(),
            literal_name: literal_name.into(),
            ns: namespace_or_global(ns),
            description: None,
            payload: Vec::new(),
            version,
        }
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    pub fn with_payload(mut self, payload: Vec<VariableSignature>) -> Self {
        self.payload = payload;
        self
    }
}

impl Declaration for ApiEvent {
    const KIND: &'static str = "event";

    fn name(&self) -> &str {
        &self.name
    }

    fn ns(&self) -> &str {
        &self.ns
    }

    fn same_declaration(&self, other: &Self) -> bool {
        self.name == other.name
            && self.ns == other.ns
            && self.literal_name == other.literal_name
            && same_signatures(&self.payload, &other.payload)
    }
}

impl_versioned!(ApiFunction, ApiTable, ApiEvent);

/// Join a namespace and a name, leaving global names bare.
pub fn qualify(ns: &str, name: &str) -> String {
    if ns == GLOBAL_NAMESPACE {
        name.to_string()
    } else {
        format!("{}.{}", ns, name)
    }
}
