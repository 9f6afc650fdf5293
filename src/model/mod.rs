//! Version-aware API model: entities, collections and the merge over them.

pub mod builder;
pub mod collection;
pub mod entity;
pub mod range;
pub mod signature;
pub mod version;

pub use builder::ApiBuilder;
pub use collection::ApiCollection;
pub use entity::{
    namespace_or_global, qualify, ApiEvent, ApiFunction, ApiTable, Declaration, EventRef,
    TableKind, Versioned, GLOBAL_NAMESPACE,
};
pub use range::Range;
pub use signature::{same_signatures, Literal, VariableSignature};
pub use version::Version;
