//! Standard exit codes for CLI operations
//!
//! These exit codes follow Unix conventions and sysexits.h where applicable.

/// General error - unspecified failure
pub const ERROR: i32 = 1;

/// Input error - the instance or configuration file is missing or invalid
pub const INPUT_ERROR: i32 = 2;

/// Composition error - a resource builder rejected the instance
pub const COMPOSITION_ERROR: i32 = 3;

/// Cluster error - the Kubernetes API could not be reached or answered an error
pub const CLUSTER_ERROR: i32 = 4;

/// Timeout - the awaited condition was not met in time
pub const TIMEOUT: i32 = 5;
