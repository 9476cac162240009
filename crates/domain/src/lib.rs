//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod audit_event;
mod developer_app;
mod operation;
mod resource_path;

pub use audit_event::{classify, resolve_path};
pub use developer_app::{
    ApiProductRef, Credential, DeveloperApp, MASKED_KEY_LENGTH, ProductAction, mask_consumer_key,
};
pub use operation::OperationKind;
pub use resource_path::ResourcePath;
