//! updrive Core - Domain logic and business rules
//!
//! This crate contains the hexagonal architecture core with:
//! - **Domain entities** - `LocalSnapshot`, `RemoteListing`, `TrackedState`, `PassReport`
//! - **Port definitions** - The `IRemoteStore` trait implemented by adapter crates
//! - **Configuration** - Typed config with loading, validation and defaults
//!
//! # Architecture
//!
//! The domain module contains pure business logic with no I/O. The single
//! port (`IRemoteStore`) defines the remote-storage interface; the HTTP
//! adapter lives in `updrive-api`, and the reconciliation engine that
//! drives the port lives in `updrive-sync`.

pub mod config;
pub mod domain;
pub mod ports;
