//! Custom property commands
//!
//! Definitions live in the [`PropertyRegistry`](planboard_fields::PropertyRegistry);
//! deleting one also strips its values from every task in the scope.

mod create;
mod delete;
mod list;
mod update;

pub use create::CreateProperty;
pub use delete::{CascadeReport, DeleteProperty};
pub use list::ListProperties;
pub use update::UpdateProperty;
