//! Integration test utilities for the engagement workspace
//!
//! In-memory fakes for every collaborator port, and an in-process mock of
//! the REST API for exercising the HTTP client end to end.


pub use fakes::*;
pub use mock_server::*;
