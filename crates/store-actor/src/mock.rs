//! # Mock Store & Testing Guide
//!
//! The `MockStore<T>` type hands out the same `StoreClient<T>` as a real
//! `StoreActor<T>` but operates entirely in-memory against scripted
//! expectations. It lets you unit test client logic (the code *around* the
//! store) fast and deterministically, without spawning any actors.
//!
//! ## When to use Mocks vs Real Actors
//!
//! | Feature | MockStore | Real Actor |
//! |---------|-----------|------------|
//! | **Speed** | Instant (in-memory) | Fast (but involves tokio spawn) |
//! | **Determinism** | 100% Deterministic | Subject to scheduler |
//! | **State** | No real state (expectations) | Real state management |
//! | **Use Case** | Unit testing logic *around* the client | Testing the actor itself or full system |
//! | **Error Injection** | Easy (`return_err`) | Hard (requires specific state) |
//!
//! Expectations are consumed in FIFO order: every request pops the next one,
//! and a request the script did not anticipate panics the mock task. `Watch`
//! requests are deliberately unsupported; subscription plumbing is tested
//! against real actors, where the feed semantics actually live.
//!
//! ## Example
//!
//! ```rust
//! use async_trait::async_trait;
//! use chrono::{DateTime, Utc};
//! use store_actor::mock::MockStore;
//! use store_actor::{Document, StoreError};
//!
//! #[derive(Clone, Debug, PartialEq)]
//! struct Badge { id: u32, label: String, updated_at: DateTime<Utc> }
//! #[derive(Debug)] struct BadgeCreate { label: String }
//! #[derive(Debug)] struct BadgeUpdate;
//! #[derive(Debug)] enum BadgeAction {}
//! #[derive(Debug, thiserror::Error)] #[error("badge error")] struct BadgeError;
//!
//! #[async_trait]
//! impl Document for Badge {
//!     type Id = u32;
//!     type Create = BadgeCreate;
//!     type Update = BadgeUpdate;
//!     type Action = BadgeAction;
//!     type ActionResult = ();
//!     type Context = ();
//!     type Error = BadgeError;
//!
//!     fn from_create_params(id: u32, params: BadgeCreate, at: DateTime<Utc>) -> Result<Self, Self::Error> {
//!         Ok(Self { id, label: params.label, updated_at: at })
//!     }
//!     fn updated_at(&self) -> DateTime<Utc> { self.updated_at }
//!     fn touch(&mut self, at: DateTime<Utc>) { self.updated_at = at; }
//!     async fn on_update(&mut self, _: BadgeUpdate, _: &()) -> Result<(), Self::Error> { Ok(()) }
//!     async fn handle_action(&mut self, _: BadgeAction, _: DateTime<Utc>, _: &()) -> Result<(), Self::Error> {
//!         Ok(())
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     // 1. Script the store
//!     let mut mock = MockStore::<Badge>::new();
//!     mock.expect_create().return_ok(1);
//!     mock.expect_get(1).return_err(StoreError::StoreClosed);
//!
//!     // 2. Drive the client under test
//!     let client = mock.client();
//!     let id = client.create(BadgeCreate { label: "gold".into() }).await.unwrap();
//!     assert_eq!(id, 1);
//!
//!     // Downstream failure is one line to simulate
//!     let result = client.get(1).await;
//!     assert!(matches!(result, Err(StoreError::StoreClosed)));
//!
//!     // 3. Ensure the script ran to completion
//!     mock.verify();
//! }
//! ```
//!
//! ## Mocking Utilities
//!
//! Use [`create_mock_client`] to get a client and a raw request receiver when
//! a test needs to assert on the request payloads themselves, or the fluent
//! [`MockStore`] API when scripted responses are enough.

use crate::client::StoreClient;
use crate::document::Document;
use crate::error::StoreError;
use crate::message::StoreRequest;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

// =============================================================================
// EXPECTATION BUILDER API
// =============================================================================

/// Represents an expected request to the mock store.
///
/// Used internally by `MockStore` to track which requests are expected and
/// what responses should be returned.
enum Expectation<T: Document> {
    Get {
        id: T::Id,
        response: Result<Option<T>, StoreError>,
    },
    Create {
        response: Result<T::Id, StoreError>,
    },
    Update {
        id: T::Id,
        response: Result<T, StoreError>,
    },
    Delete {
        id: T::Id,
        response: Result<(), StoreError>,
    },
    Action {
        id: T::Id,
        response: Result<T::ActionResult, StoreError>,
    },
}

/// A mock store with expectation tracking for fluent testing.
///
/// # Example
/// ```ignore
/// let mut mock = MockStore::<Lot>::new();
/// mock.expect_get(LotId(1)).return_ok(Some(lot));
/// mock.expect_create().return_ok(LotId(2));
///
/// let client = mock.client();
/// // Use client in tests...
/// mock.verify(); // Ensures all expectations were met
/// ```
pub struct MockStore<T: Document> {
    client: StoreClient<T>,
    expectations: Arc<Mutex<VecDeque<Expectation<T>>>>,
    _handle: tokio::task::JoinHandle<()>,
}

impl<T: Document> Default for MockStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Document> MockStore<T> {
    /// Creates a new mock store with no expectations.
    pub fn new() -> Self {
        let (sender, mut receiver) = mpsc::channel::<StoreRequest<T>>(100);
        let expectations = Arc::new(Mutex::new(VecDeque::new()));
        let expectations_clone = expectations.clone();

        // Spawn background task to handle requests
        let handle = tokio::spawn(async move {
            while let Some(request) = receiver.recv().await {
                let mut exps = expectations_clone.lock().unwrap();
                let expectation = exps.pop_front();
                drop(exps); // Release lock before async operations

                match (request, expectation) {
                    (
                        StoreRequest::Get { id: _, respond_to },
                        Some(Expectation::Get { id: _, response }),
                    ) => {
                        let _ = respond_to.send(response);
                    }
                    (
                        StoreRequest::Create {
                            params: _,
                            respond_to,
                        },
                        Some(Expectation::Create { response }),
                    ) => {
                        let _ = respond_to.send(response);
                    }
                    (
                        StoreRequest::Update {
                            id: _,
                            update: _,
                            respond_to,
                        },
                        Some(Expectation::Update { id: _, response }),
                    ) => {
                        let _ = respond_to.send(response);
                    }
                    (
                        StoreRequest::Delete { id: _, respond_to },
                        Some(Expectation::Delete { id: _, response }),
                    ) => {
                        let _ = respond_to.send(response);
                    }
                    (
                        StoreRequest::Action {
                            id: _,
                            action: _,
                            guard: _,
                            respond_to,
                        },
                        Some(Expectation::Action { id: _, response }),
                    ) => {
                        let _ = respond_to.send(response);
                    }
                    _ => {
                        panic!("Unexpected request or expectation mismatch");
                    }
                }
            }
        });

        Self {
            client: StoreClient::new(sender),
            expectations,
            _handle: handle,
        }
    }

    /// Returns the client for use in tests.
    pub fn client(&self) -> StoreClient<T> {
        self.client.clone()
    }

    /// Expects a `get` operation.
    pub fn expect_get(&mut self, id: T::Id) -> GetExpectationBuilder<T> {
        GetExpectationBuilder {
            id,
            expectations: self.expectations.clone(),
        }
    }

    /// Expects a `create` operation.
    pub fn expect_create(&mut self) -> CreateExpectationBuilder<T> {
        CreateExpectationBuilder {
            expectations: self.expectations.clone(),
        }
    }

    /// Expects an `update` operation.
    pub fn expect_update(&mut self, id: T::Id) -> UpdateExpectationBuilder<T> {
        UpdateExpectationBuilder {
            id,
            expectations: self.expectations.clone(),
        }
    }

    /// Expects a `delete` operation.
    pub fn expect_delete(&mut self, id: T::Id) -> DeleteExpectationBuilder<T> {
        DeleteExpectationBuilder {
            id,
            expectations: self.expectations.clone(),
        }
    }

    /// Expects an `action` operation (guarded or not).
    pub fn expect_action(&mut self, id: T::Id) -> ActionExpectationBuilder<T> {
        ActionExpectationBuilder {
            id,
            expectations: self.expectations.clone(),
        }
    }

    /// Verifies that all expectations were met.
    pub fn verify(&self) {
        let exps = self.expectations.lock().unwrap();
        if !exps.is_empty() {
            panic!("Not all expectations were met. {} remaining", exps.len());
        }
    }
}

/// Builder for `get` expectations.
pub struct GetExpectationBuilder<T: Document> {
    id: T::Id,
    expectations: Arc<Mutex<VecDeque<Expectation<T>>>>,
}

impl<T: Document> GetExpectationBuilder<T> {
    /// Sets the expectation to return a successful result.
    pub fn return_ok(self, value: Option<T>) {
        let mut exps = self.expectations.lock().unwrap();
        exps.push_back(Expectation::Get {
            id: self.id,
            response: Ok(value),
        });
    }

    /// Sets the expectation to return an error.
    pub fn return_err(self, error: StoreError) {
        let mut exps = self.expectations.lock().unwrap();
        exps.push_back(Expectation::Get {
            id: self.id,
            response: Err(error),
        });
    }
}

/// Builder for `create` expectations.
pub struct CreateExpectationBuilder<T: Document> {
    expectations: Arc<Mutex<VecDeque<Expectation<T>>>>,
}

impl<T: Document> CreateExpectationBuilder<T> {
    /// Sets the expectation to return a successful result.
    pub fn return_ok(self, id: T::Id) {
        let mut exps = self.expectations.lock().unwrap();
        exps.push_back(Expectation::Create { response: Ok(id) });
    }

    /// Sets the expectation to return an error.
    pub fn return_err(self, error: StoreError) {
        let mut exps = self.expectations.lock().unwrap();
        exps.push_back(Expectation::Create {
            response: Err(error),
        });
    }
}

/// Builder for `update` expectations.
pub struct UpdateExpectationBuilder<T: Document> {
    id: T::Id,
    expectations: Arc<Mutex<VecDeque<Expectation<T>>>>,
}

impl<T: Document> UpdateExpectationBuilder<T> {
    /// Sets the expectation to return a successful result.
    pub fn return_ok(self, value: T) {
        let mut exps = self.expectations.lock().unwrap();
        exps.push_back(Expectation::Update {
            id: self.id,
            response: Ok(value),
        });
    }

    /// Sets the expectation to return an error.
    pub fn return_err(self, error: StoreError) {
        let mut exps = self.expectations.lock().unwrap();
        exps.push_back(Expectation::Update {
            id: self.id,
            response: Err(error),
        });
    }
}

/// Builder for `delete` expectations.
pub struct DeleteExpectationBuilder<T: Document> {
    id: T::Id,
    expectations: Arc<Mutex<VecDeque<Expectation<T>>>>,
}

impl<T: Document> DeleteExpectationBuilder<T> {
    /// Sets the expectation to return a successful result.
    pub fn return_ok(self) {
        let mut exps = self.expectations.lock().unwrap();
        exps.push_back(Expectation::Delete {
            id: self.id,
            response: Ok(()),
        });
    }

    /// Sets the expectation to return an error.
    pub fn return_err(self, error: StoreError) {
        let mut exps = self.expectations.lock().unwrap();
        exps.push_back(Expectation::Delete {
            id: self.id,
            response: Err(error),
        });
    }
}

/// Builder for `action` expectations.
pub struct ActionExpectationBuilder<T: Document> {
    id: T::Id,
    expectations: Arc<Mutex<VecDeque<Expectation<T>>>>,
}

impl<T: Document> ActionExpectationBuilder<T> {
    /// Sets the expectation to return a successful result.
    pub fn return_ok(self, result: T::ActionResult) {
        let mut exps = self.expectations.lock().unwrap();
        exps.push_back(Expectation::Action {
            id: self.id,
            response: Ok(result),
        });
    }

    /// Sets the expectation to return an error.
    pub fn return_err(self, error: StoreError) {
        let mut exps = self.expectations.lock().unwrap();
        exps.push_back(Expectation::Action {
            id: self.id,
            response: Err(error),
        });
    }
}

// =============================================================================
// CHANNEL-LEVEL HELPERS
// =============================================================================

/// Creates a mock client and a receiver for asserting requests.
///
/// # Testing Strategy
/// When a test cares about the *request payloads* a client sends (not just
/// the responses), script handling with `MockStore` is too coarse. This
/// helper hands back the raw request channel so the test can pattern-match
/// each request and answer through its oneshot responder.
///
/// **Note**: Prefer [`MockStore`] when scripted responses are enough.
pub fn create_mock_client<T: Document>(
    buffer_size: usize,
) -> (StoreClient<T>, mpsc::Receiver<StoreRequest<T>>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (StoreClient::new(sender), receiver)
}

/// Helper to verify that the next message is a Create request
pub async fn expect_create<T: Document>(
    receiver: &mut mpsc::Receiver<StoreRequest<T>>,
) -> Option<(
    T::Create,
    tokio::sync::oneshot::Sender<Result<T::Id, StoreError>>,
)> {
    match receiver.recv().await {
        Some(StoreRequest::Create { params, respond_to }) => Some((params, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is a Get request
pub async fn expect_get<T: Document>(
    receiver: &mut mpsc::Receiver<StoreRequest<T>>,
) -> Option<(
    T::Id,
    tokio::sync::oneshot::Sender<Result<Option<T>, StoreError>>,
)> {
    match receiver.recv().await {
        Some(StoreRequest::Get { id, respond_to }) => Some((id, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is an Action request. Returns the
/// guard stamp too, so tests can assert on conditional writes.
pub async fn expect_action<T: Document>(
    receiver: &mut mpsc::Receiver<StoreRequest<T>>,
) -> Option<(
    T::Id,
    T::Action,
    Option<chrono::DateTime<chrono::Utc>>,
    tokio::sync::oneshot::Sender<Result<T::ActionResult, StoreError>>,
)> {
    match receiver.recv().await {
        Some(StoreRequest::Action {
            id,
            action,
            guard,
            respond_to,
        }) => Some((id, action, guard, respond_to)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};

    #[derive(Clone, Debug, PartialEq)]
    struct Badge {
        id: u32,
        label: String,
        updated_at: DateTime<Utc>,
    }

    #[derive(Debug)]
    struct BadgeCreate {
        label: String,
    }

    #[derive(Debug)]
    struct BadgeUpdate;

    #[derive(Debug)]
    enum BadgeAction {}

    #[derive(Debug, thiserror::Error)]
    #[error("Badge error")]
    struct BadgeError;

    #[async_trait]
    impl Document for Badge {
        type Id = u32;
        type Create = BadgeCreate;
        type Update = BadgeUpdate;
        type Action = BadgeAction;
        type ActionResult = ();
        type Context = ();
        type Error = BadgeError;

        fn from_create_params(
            id: u32,
            params: BadgeCreate,
            at: DateTime<Utc>,
        ) -> Result<Self, Self::Error> {
            Ok(Self {
                id,
                label: params.label,
                updated_at: at,
            })
        }

        fn updated_at(&self) -> DateTime<Utc> {
            self.updated_at
        }

        fn touch(&mut self, at: DateTime<Utc>) {
            self.updated_at = at;
        }

        async fn on_update(
            &mut self,
            _update: BadgeUpdate,
            _ctx: &Self::Context,
        ) -> Result<(), Self::Error> {
            Ok(())
        }

        async fn handle_action(
            &mut self,
            _action: BadgeAction,
            _at: DateTime<Utc>,
            _ctx: &Self::Context,
        ) -> Result<(), Self::Error> {
            Ok(())
        }
    }

    impl Badge {
        fn new(id: u32, label: &str) -> Self {
            Self {
                id,
                label: label.to_string(),
                updated_at: Utc::now(),
            }
        }
    }

    #[tokio::test]
    async fn test_channel_level_mock() {
        let (client, mut receiver) = create_mock_client::<Badge>(10);

        // Test Create
        let create_task = tokio::spawn(async move {
            let badge = BadgeCreate {
                label: "gold".to_string(),
            };
            client.create(badge).await
        });

        let (payload, responder) = expect_create(&mut receiver)
            .await
            .expect("Expected Create request");
        assert_eq!(payload.label, "gold");
        responder.send(Ok(1)).unwrap();

        let result = create_task.await.unwrap();
        assert!(matches!(result, Ok(id) if id == 1));
    }

    #[tokio::test]
    async fn test_mock_store_with_expectations() {
        // Create mock with fluent expectation API
        let mut mock = MockStore::<Badge>::new();

        // Set up expectations
        mock.expect_create().return_ok(1);
        mock.expect_get(1).return_ok(Some(Badge::new(1, "gold")));
        mock.expect_delete(1).return_ok();

        let client = mock.client();

        // Execute operations
        let badge = BadgeCreate {
            label: "gold".to_string(),
        };
        let id = client.create(badge).await.unwrap();
        assert_eq!(id, 1);

        let fetched = client.get(1).await.unwrap();
        assert!(fetched.is_some());
        assert_eq!(fetched.unwrap().label, "gold");

        client.delete(1).await.unwrap();

        // Verify all expectations were met
        mock.verify();
    }
}
