//! # System Lifecycle & Orchestration
//!
//! This module manages the runtime lifecycle of the lot system: starting the
//! actor, wiring its collaborators together, running deferred jobs, and
//! coordinating clean shutdown.
//!
//! ## The Orchestration Pattern
//!
//! Individual pieces stay simple; the complexity lives in how they are wired.
//! [`LotSystem`] is the conductor:
//!
//! 1. **Actor Creation** - Instantiate the lot actor and its generic client
//! 2. **Dependency Injection** - Hand the same store channel to the client,
//!    the archiver, and the subscription manager
//! 3. **Deferred Jobs** - Own the [`Archiver`] that schedules conditional
//!    archive writes for completed lots
//! 4. **Graceful Shutdown** - Stop timers, close channels, await the actor
//!
//! ## Why the Archiver Lives Here
//!
//! The auto-archive is the one side effect that outlives the request which
//! caused it. Keeping its scheduler in the lifecycle layer means timers are
//! explicit owned state, visible to shutdown, instead of loose fire-and-forget
//! tasks nobody can cancel.
//!
//! ## Graceful Shutdown
//!
//! The shutdown sequence is ordered around one constraint: every pending
//! archive timer holds a store client.
//!
//! 1. **Stop the archiver** - Abort timers and await the tasks so their
//!    clients are released
//! 2. **Drop remaining clients** - Closes the sender side of the actor channel
//! 3. **Actor detects closure** - `receiver.recv()` returns `None`
//! 4. **Await completion** - The actor logs its final state and exits
//!
//! Clients are clones; callers that kept their own clone keep the channel
//! open, so shutdown waits for them too. Keep the dependency graph acyclic.
//!
//! ## Observability & Tracing
//!
//! [`setup_tracing`] (re-exported from the store layer) initializes
//! structured logging for the whole system.
//!
//! **Usage:**
//! ```bash
//! RUST_LOG=info cargo run      # Compact logs
//! RUST_LOG=debug cargo run     # Full payloads, guard rejections, feed churn
//! ```

pub mod archiver;
pub mod system;

pub use archiver::*;
pub use system::*;

pub use store_actor::setup_tracing;
