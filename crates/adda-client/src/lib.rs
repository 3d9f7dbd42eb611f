//! # adda-client
//!
//! `reqwest` implementation of the engagement API port.
//!
//! Every request carries the bearer token from the injected
//! [`IdentityProvider`](adda_core::IdentityProvider) and an explicit timeout.
//! Response bodies are normalized in [`wire`] so the rest of the workspace
//! only ever sees canonical domain types.

mod client;
pub mod wire;

pub use client::HttpEngagementClient;
