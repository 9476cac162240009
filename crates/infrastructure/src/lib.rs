//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod access_token_provider;
mod apigee_management_client;
mod in_memory_management_api;

pub use access_token_provider::{
    AccessTokenProvider, DEFAULT_METADATA_HOST, MetadataServerTokenProvider,
    StaticAccessTokenProvider,
};
pub use apigee_management_client::{ApigeeManagementClient, DEFAULT_APIGEE_API_BASE_URL};
pub use in_memory_management_api::InMemoryManagementApi;
