//! Task commands

mod create;
mod delete;
mod get;
mod list;
mod set_property;
mod update;

pub use create::CreateTask;
pub use delete::DeleteTask;
pub use get::GetTask;
pub use list::{ListTasks, TaskGroups};
pub use set_property::SetPropertyValue;
pub use update::UpdateTask;

use planboard_fields::{FieldError, FieldsError, PropertyDef, PropertyValue, RawValue, ValueCodec};

use crate::error::{Result, TaskError};
use crate::validate::property_field;

/// Decode raw input, turning a strict-mode rejection into a field error.
pub(crate) fn decode_property(
    codec: &ValueCodec,
    def: &PropertyDef,
    raw: &RawValue,
    current: Option<&PropertyValue>,
) -> std::result::Result<Option<PropertyValue>, FieldError> {
    match codec.decode_with_current(def, raw, current) {
        Ok(value) => Ok(value),
        Err(FieldsError::InvalidValue { message, .. }) => {
            Err(FieldError::new(property_field(&def.id), message))
        }
        Err(other) => Err(FieldError::new(property_field(&def.id), other.to_string())),
    }
}

/// Fail with every collected problem, or pass when there are none.
pub(crate) fn ensure_valid(errors: Vec<FieldError>) -> Result<()> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(TaskError::Validation(errors))
    }
}
