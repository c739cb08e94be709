//! Type-safe wrappers around [`StoreClient`](store_actor::StoreClient).

pub mod lot_client;

pub use lot_client::*;
