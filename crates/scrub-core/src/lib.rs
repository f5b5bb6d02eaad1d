//! Core domain models for scrub
//!
//! This crate contains:
//! - Detection runs and output classification
//! - Detected entities and credit-card extraction
//! - Step tracking and the invocation result object
//! - Invocation envelope decoding and lenient base64
//! - Error taxonomy

pub mod codec;
pub mod entity;
pub mod envelope;
pub mod error;
pub mod format;
pub mod run;
pub mod steps;

pub use codec::decode_base64;
pub use entity::{CardData, DetectedEntity, decode_entities, extract_credit_card};
pub use envelope::{AUTH_HEADER, Invocation, InvocationEnvelope, InvocationRequest};
pub use error::{Error, ErrorKind, Result};
pub use format::infer_data_format;
pub use run::{ClassifiedOutput, OutputArtifact, RunResponse, RunStatus, classify_outputs};
pub use steps::{InvocationResult, Step, StepTracker};
