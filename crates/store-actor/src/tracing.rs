//! # Observability & Tracing
//!
//! Tracing infrastructure shared by every store actor and the applications
//! built on them.
//!
//! [`setup_tracing`] initializes structured logging with the `tracing` crate.
//! The compact format hides the crate/module prefix (`with_target(false)`);
//! actors log an `entity_type` field instead, which keeps lines short while
//! still saying which collection they concern.
//!
//! ## What Gets Traced
//!
//! - **Actor lifecycle**: startup, shutdown, and final collection size
//! - **Document operations**: Create, Get, Update, Delete, Action, Watch
//! - **Guarded writes**: guard mismatches at debug level, with both stamps
//! - **Errors**: entity IDs and failure reasons on every failed hook
//!
//! ## Usage
//!
//! ```bash
//! # Compact logs (default)
//! RUST_LOG=info cargo run
//!
//! # Show full payloads with debug logs
//! RUST_LOG=debug cargo run
//!
//! # Filter to one crate
//! RUST_LOG=store_actor=debug cargo run
//! ```
//!
//! Log level is configured entirely through the `RUST_LOG` environment
//! variable; nothing is logged when it is unset.

pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false) // Don't show module paths - we use entity_type instead
        .compact() // Compact format shows spans inline (e.g., "intake:create_lot")
        .init();
}
