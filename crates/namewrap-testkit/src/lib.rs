//! Namewrap Testing Infrastructure
//!
//! Common fixtures for exercising the wrapper against its collaborators. The
//! bootstrap sequencing a real deployment performs (deploy registry, deploy
//! registrar, deploy wrapper, wire approvals) lives here as an explicit
//! fixture, not as process-wide state anywhere in the core.
//!
//! # Usage
//!
//! ```rust,no_run
//! use namewrap_testkit::Deployment;
//!
//! let d = Deployment::bootstrap("leaf");
//! let alice = d.funded_account("alice");
//! let label = d.register_leaf("wrapped", alice, 84_600);
//! ```

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

/// Deterministic, manually advanced clock
pub mod clock;

/// The standard deployment fixture
pub mod deployment;

pub use clock::TestClock;
pub use deployment::Deployment;

/// Initialize tracing once for a test binary, honoring `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}
