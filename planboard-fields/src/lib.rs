//! Custom property registry and typed value codec
//!
//! `planboard-fields` is a schema-only crate. It owns the definitions of
//! user-defined task attributes ("custom properties") and the codec that turns
//! raw form input into stored values. It knows nothing about tasks themselves;
//! `planboard-tasks` stores the values and performs cascading deletes.
//!
//! # Architecture
//!
//! - **Scoped**: every definition belongs to a [`Scope`] (a project or the global space)
//! - **Typed values**: [`PropertyValue`] is a closed sum type; the [`ValueCodec`] is
//!   the only place raw input becomes a stored value
//! - **YAML on disk (optional)**: one `.yaml` file per definition, written atomically

pub mod codec;
pub mod error;
pub mod registry;
pub mod types;

pub use codec::{display_value, normalize_instant, parse_date_input, CodecMode, ValueCodec};
pub use error::{FieldError, FieldsError, Result};
pub use registry::{PropertyRegistry, PropertyRegistryBuilder};
pub use types::{
    NewProperty, PropertyDef, PropertyId, PropertyPatch, PropertyType, PropertyValue, RawValue,
    Scope,
};
