//! Array vocabulary
//!
//! Typed views of the records the array returns. The array encodes almost
//! every field as an upper-case string key with a string value; fields
//! missing from a record fall back to their defaults.

use crate::error::{Error, Result};
use indexmap::IndexSet;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::collections::BTreeMap;
use std::str::FromStr;

// =============================================================================
// Naming
// =============================================================================

/// Array naming rules disallow hyphens
pub fn array_name(name: &str) -> String {
    name.replace('-', "_")
}

// =============================================================================
// Share Protocol
// =============================================================================

/// NAS protocols a share can be exported with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ShareProtocol {
    Nfs,
    Cifs,
}

impl ShareProtocol {
    /// Resource type of the share itself
    pub fn share_url_type(&self) -> &'static str {
        match self {
            ShareProtocol::Nfs => "NFSHARE",
            ShareProtocol::Cifs => "CIFSHARE",
        }
    }

    /// Resource type of the share's access rules
    pub fn access_client_type(&self) -> &'static str {
        match self {
            ShareProtocol::Nfs => "NFS_SHARE_AUTH_CLIENT",
            ShareProtocol::Cifs => "CIFS_SHARE_AUTH_CLIENT",
        }
    }
}

impl FromStr for ShareProtocol {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "NFS" => Ok(ShareProtocol::Nfs),
            "CIFS" => Ok(ShareProtocol::Cifs),
            _ => Err(Error::InvalidInput(format!(
                "Invalid NAS protocol supplied: {}.",
                s
            ))),
        }
    }
}

impl std::fmt::Display for ShareProtocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShareProtocol::Nfs => write!(f, "NFS"),
            ShareProtocol::Cifs => write!(f, "CIFS"),
        }
    }
}

// =============================================================================
// Product
// =============================================================================

/// NAS product families the client can drive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Product {
    V3,
    V5,
    Dorado,
}

impl FromStr for Product {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "V3" => Ok(Product::V3),
            "V5" => Ok(Product::V5),
            "Dorado" => Ok(Product::Dorado),
            "" => Err(Error::InvalidInput("NAS product is not configured.".into())),
            other => Err(Error::InvalidInput(format!(
                "Invalid NAS product '{}', NAS product must be in [V3, V5, Dorado].",
                other
            ))),
        }
    }
}

// =============================================================================
// CIFS Domain Type
// =============================================================================

/// Account domain a CIFS identity is resolved in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomainType {
    Local,
    ActiveDirectory,
}

impl DomainType {
    pub fn code(&self) -> &'static str {
        match self {
            DomainType::Local => "2",
            DomainType::ActiveDirectory => "0",
        }
    }

    /// Domain types to try for an identity, most specific first
    pub fn resolution_order(access_to: &str) -> [DomainType; 2] {
        if access_to.contains('\\') {
            [DomainType::ActiveDirectory, DomainType::Local]
        } else {
            [DomainType::Local, DomainType::ActiveDirectory]
        }
    }
}

// =============================================================================
// Filesystem List
// =============================================================================

/// Ordered, de-duplicated list of filesystem IDs
///
/// Wire encoding is a bracketed, comma-separated list of quoted IDs held in
/// a single string, e.g. `["12","40"]`. An empty list encodes as `[""]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FsList(IndexSet<String>);

impl FsList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parse(encoded: &str) -> Self {
        let inner = encoded.trim();
        let inner = inner.strip_prefix('[').unwrap_or(inner);
        let inner = inner.strip_suffix(']').unwrap_or(inner);

        Self(
            inner
                .split(',')
                .map(|item| item.trim().trim_matches('"').trim())
                .filter(|item| !item.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    pub fn encode(&self) -> String {
        if self.0.is_empty() {
            return "[\"\"]".to_string();
        }
        let items: Vec<String> = self.0.iter().map(|id| format!("\"{}\"", id)).collect();
        format!("[{}]", items.join(","))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.0.contains(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Append `id`, moving it to the end when already present
    pub fn push(&mut self, id: impl Into<String>) {
        let id = id.into();
        self.0.shift_remove(&id);
        self.0.insert(id);
    }

    pub fn remove(&mut self, id: &str) -> bool {
        self.0.shift_remove(id)
    }
}

impl<S: Into<String>> FromIterator<S> for FsList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut list = FsList::new();
        for id in iter {
            list.push(id);
        }
        list
    }
}

impl std::fmt::Display for FsList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.encode())
    }
}

impl Serialize for FsList {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.encode())
    }
}

impl<'de> Deserialize<'de> for FsList {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Encoded(String),
            Items(Vec<String>),
        }

        Ok(match Repr::deserialize(deserializer)? {
            Repr::Encoded(s) => FsList::parse(&s),
            Repr::Items(items) => items.into_iter().filter(|id| !id.is_empty()).collect(),
        })
    }
}

// =============================================================================
// Records
// =============================================================================

/// Share located by its path
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "UPPERCASE")]
pub struct ShareRecord {
    pub id: String,
    pub fsid: String,
    pub sharepath: String,
}

/// Access rule attached to a share
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "UPPERCASE")]
pub struct AccessRecord {
    pub id: String,
    pub name: String,
    /// NFS access level
    pub accessval: Option<String>,
    /// CIFS access level
    pub permission: Option<String>,
}

impl AccessRecord {
    pub fn level(&self) -> Option<&str> {
        self.accessval
            .as_deref()
            .filter(|level| !level.is_empty())
            .or(self.permission.as_deref())
    }
}

/// Optional NFS export flags overriding the defaults
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NfsAccessOptions {
    pub sync: Option<String>,
    pub all_squash: Option<String>,
    pub root_squash: Option<String>,
    pub secure: Option<String>,
}

/// QoS policy (`ioclass`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "UPPERCASE")]
pub struct QosPolicy {
    pub id: String,
    pub name: String,
    pub runningstatus: String,
    pub fslist: FsList,
    pub lunlist: FsList,
    /// Remaining policy attributes (MAXIOPS, LATENCY, ...)
    #[serde(flatten)]
    pub options: BTreeMap<String, Value>,
}

/// QoS option values keyed by upper-case option name
pub type QosSpecs = BTreeMap<String, String>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "UPPERCASE")]
pub struct StoragePool {
    pub id: String,
    pub name: String,
    pub usagetype: String,
    pub userfreecapacity: String,
    pub usertotalcapacity: String,
    pub userconsumedcapacity: String,
    pub tier0capacity: String,
    pub tier1capacity: Option<String>,
    pub tier2capacity: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "UPPERCASE")]
pub struct EthPort {
    pub id: String,
    pub location: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "UPPERCASE")]
pub struct BondPort {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "UPPERCASE")]
pub struct Vlan {
    pub id: String,
    pub portid: String,
    pub tag: String,
}

/// Logical interface (`LIF`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "UPPERCASE")]
pub struct LogicalPort {
    pub id: String,
    pub name: String,
    pub homeportid: String,
    pub ipv4addr: String,
    pub ipv4mask: String,
    pub operationalstatus: String,
}

impl LogicalPort {
    pub fn is_operational(&self) -> bool {
        self.operationalstatus == "true"
    }
}
