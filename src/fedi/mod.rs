pub mod client;
pub mod schemas;
pub mod types;
pub mod variant;

pub use client::{fetch, ApiClient, ApiResponse, RequestOptions, Transport};
pub use variant::{detect, SoftwareVariant};
