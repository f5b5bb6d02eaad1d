//! Clients for the external services the handler orchestrates
//!
//! Each service sits behind an async trait so the pipeline can run
//! against the real HTTP APIs or in-memory fakes.

pub mod auth;
pub mod detect;
pub mod http;
pub mod vault;

pub use auth::{ACCOUNT_ID_HEADER, AuthContext};
pub use detect::{DeidentifyRequest, DeidentifyResponse, DetectApi, FilePayload, HttpDetect};
pub use http::build_client;
pub use vault::{HttpVault, RedactedUpload, VaultApi};
