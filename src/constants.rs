//! Wire-level constants dictated by the array firmware

use std::time::Duration;

// =============================================================================
// Synthesized Result Codes
// =============================================================================

/// Connection or socket failure, no response from the array
pub const ERROR_CONNECT_TO_SERVER: i64 = -403;

/// Session token rejected by the array
pub const ERROR_UNAUTHORIZED_TO_SERVER: i64 = -401;

/// Response body was not a valid envelope
pub const ERROR_MALFORMED_RESPONSE: i64 = -1;

// =============================================================================
// Array Result Codes
// =============================================================================

pub const MSG_SNAPSHOT_NOT_FOUND: i64 = 1073754118;
pub const ERROR_USER_OR_GROUP_NOT_EXIST: i64 = 1077939723;
pub const ERROR_HYPERMETRO_NOT_EXIST: i64 = 1077674242;
pub const ERROR_REPLICATION_PAIR_NOT_EXIST: i64 = 1077937923;
pub const ERROR_LOGICAL_PORT_EXIST: i64 = 1073813505;

/// Account states that require an operator password change
pub const PWD_EXPIRED_OR_INITIAL: [i64; 2] = [3, 4];

// =============================================================================
// Timeouts
// =============================================================================

pub const SOCKET_TIMEOUT: Duration = Duration::from_secs(30);
pub const LOGIN_SOCKET_TIMEOUT: Duration = Duration::from_secs(120);

// =============================================================================
// Resource Constants
// =============================================================================

/// Window size of every paginated list query
pub const PAGE_SIZE: u64 = 100;

pub const MAX_FS_NUM_IN_QOS: usize = 64;
pub const QOS_NAME_PREFIX: &str = "OpenStack_";
pub const STATUS_QOS_ACTIVE: &str = "2";

/// QoS option keys compared when looking for a reusable policy
pub const OPTS_QOS_VALUE: [&str; 6] = [
    "MAXIOPS",
    "MINIOPS",
    "MINBANDWIDTH",
    "MAXBANDWIDTH",
    "LATENCY",
    "IOTYPE",
];

pub const PORT_TYPE_ETH: &str = "1";
pub const PORT_TYPE_BOND: &str = "7";

/// Storage pool usage type for file systems
pub const POOL_USAGE_TYPE_FILE: &str = "2";

pub const MAX_DNS_SERVERS: usize = 3;

pub const SESSION_PATH: &str = "xx/sessions";
