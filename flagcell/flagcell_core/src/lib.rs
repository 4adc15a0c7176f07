#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

//! # Flagcell Core
//!
//! Boolean flags in two flavours:
//!
//! - [`UnsyncedFlag`]: a plain cell for a single owner
//! - [`SyncedFlag`]: a cell with its own exclusive lock, shareable between threads
//!
//! Both implement [`BooleanFlag`]. The crate also carries the configuration
//! and stress workloads used by the `flagcell_cli` harness.
//!
//! ```
//! use flagcell_core::SyncedFlag;
//! use std::sync::Arc;
//! use std::thread;
//!
//! let flag = Arc::new(SyncedFlag::new());
//! let handles: Vec<_> = (0..3)
//!     .map(|_| {
//!         let flag = Arc::clone(&flag);
//!         thread::spawn(move || flag.flip())
//!     })
//!     .collect();
//! for handle in handles {
//!     handle.join().unwrap();
//! }
//! assert!(flag.is_true());
//! ```

/// Configuration loaded from TOML
pub mod config;

/// Error types
pub mod error;

/// Tracked exclusive lock
pub mod lock;

/// Concurrent workloads for exercising a shared flag
pub mod stress;

/// Lock-guarded flag
pub mod synced;

/// The shared flag interface
pub mod traits;

/// Plain flag
pub mod unsynced;

pub use config::{FlagConfig, HarnessConfig, StressConfig};
pub use error::{FlagError, Result};
pub use lock::{LockStats, StateGuard, StateLock};
pub use stress::{flip_parity, readers_writers, MixedReport, ParityReport};
pub use synced::SyncedFlag;
pub use traits::BooleanFlag;
pub use unsynced::UnsyncedFlag;
