//! sysctlkit - kernel tunable management core.
//!
//! This library provides the pieces behind the `sysctlkit` CLI:
//! - `runner` - privileged command execution (the only way tunables are read or written)
//! - `param` - the kernel parameter model
//! - `store` - persisted parameter list over a key-value blob store
//! - `browser` - directory browsing sessions rooted at `/proc/sys`
//! - `apply` - the validate/write/re-read apply protocol
//! - `port` - JSON import/export of parameter sets

pub mod apply;
pub mod browser;
pub mod fs;
pub mod param;
pub mod port;
pub mod runner;
pub mod store;

pub use param::{KernelParam, PROC_SYS_ROOT};
