//! # Lot Flow Library
//!
//! This library exposes the core modules of the lot lifecycle system for
//! integration testing.

pub mod clients;
pub mod lifecycle;
pub mod lot_actor;
pub mod model;
pub mod watch;
