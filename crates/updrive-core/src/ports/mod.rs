//! Port definitions (hexagonal architecture interfaces)
//!
//! The single port of this system is [`IRemoteStore`]: everything the
//! reconciler needs from remote storage. The HTTP adapter in `updrive-api`
//! implements it; tests implement it in memory.

pub mod remote_store;

pub use remote_store::IRemoteStore;
