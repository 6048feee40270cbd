//! Resource operations
//!
//! Each module extends [`crate::client::ArrayClient`] with the calls for
//! one family of array resources. All of them go through the session
//! manager and the result contract in [`crate::envelope`].

pub mod access;
pub mod directory;
pub mod filesystem;
pub mod hypermetro;
pub mod network;
pub mod qos;
pub mod replication;
pub mod share;
pub mod snapshot;
pub mod system;
pub mod tuning;

pub use share::{share_name_by_id, share_path};
pub use snapshot::{check_snapshot_exists, snapshot_id};
