//! Integration tests for the disk API adapter
//!
//! Each test spins up a wiremock server and drives a [`DiskRemoteStore`]
//! against it, covering the wire contract and the transport retry behavior.

mod common;
mod test_delete;
mod test_digest;
mod test_listing;
mod test_upload;
