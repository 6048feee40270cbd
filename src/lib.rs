//! NAS Array Client
//!
//! A resilient REST session client for the management API of a NAS storage
//! array. It logs in against one of several candidate endpoints, keeps a
//! token-authenticated session, transparently re-logs in once when the
//! session is lost, and exposes typed operations for filesystems, shares,
//! access rules, snapshots, QoS, tuning, networking, directory services,
//! replication and HyperMetro.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                            Resource Operations                           │
//! │  filesystem · share · access · snapshot · qos · tuning · network · ...   │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                               ArrayClient                                │
//! │        call_checked / call_data / call_list · paginated enumeration      │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                             SessionManager                               │
//! │   login failover · logout · call → detect lost session → re-login once   │
//! │               (one async mutex guards the whole sequence)                │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                          Transport (port trait)                          │
//! │          HttpTransport (reqwest)  ·  scripted transport in tests         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`client`]: Session manager, HTTP transport and pagination
//! - [`resources`]: Resource operations on [`ArrayClient`]
//! - [`envelope`]: Response envelope and result contract
//! - [`domain`]: Array vocabulary and the transport port
//! - [`config`]: Client configuration
//! - [`error`]: Error types and handling

pub mod client;
pub mod config;
pub mod constants;
pub mod domain;
pub mod envelope;
pub mod error;
pub mod resources;

// Re-export commonly used types
pub use client::{ArrayClient, HttpTransport, Session, SessionManager, SessionState};

pub use config::ArrayConfig;

pub use domain::ports::{ArrayRequest, HttpMethod, Transport, TransportRef};

pub use domain::types::{
    AccessRecord, BondPort, DomainType, EthPort, FsList, LogicalPort, NfsAccessOptions,
    Product, QosPolicy, QosSpecs, ShareProtocol, ShareRecord, StoragePool, Vlan,
};

pub use envelope::{Envelope, ErrorInfo, Outcome};

pub use error::{Error, Result};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
