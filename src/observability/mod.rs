//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! KeyManager, TransactionBuilder, TransactionSubmitter produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters, histograms via the metrics facade)
//!
//! Consumers:
//!     → stdout (pretty or JSON lines)
//!     → whatever metrics recorder the embedding application installs
//! ```
//!
//! # Design Decisions
//! - Addresses and hashes are logged; key material never is
//! - No recorder is installed here, so metrics are free until one is

pub mod logging;
pub mod metrics;
