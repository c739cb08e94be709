use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use store_actor::{Document, StoreActor, StoreError, WatchFeed};

// --- Test Document ---

#[derive(Clone, Debug, PartialEq)]
struct Memo {
    id: u32,
    body: String,
    pinned: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug)]
struct MemoCreate {
    body: String,
}

#[derive(Debug)]
struct MemoUpdate {
    body: Option<String>,
}

#[derive(Debug)]
enum MemoAction {
    TogglePin,
}

#[derive(Debug, thiserror::Error)]
#[error("Memo error")]
struct MemoError;

#[async_trait]
impl Document for Memo {
    type Id = u32;
    type Create = MemoCreate;
    type Update = MemoUpdate;
    type Action = MemoAction;
    type ActionResult = bool;
    type Context = ();
    type Error = MemoError;

    fn from_create_params(
        id: u32,
        params: MemoCreate,
        at: DateTime<Utc>,
    ) -> Result<Self, Self::Error> {
        Ok(Self {
            id,
            body: params.body,
            pinned: false,
            created_at: at,
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
        update: MemoUpdate,
        _ctx: &Self::Context,
    ) -> Result<(), Self::Error> {
        if let Some(body) = update.body {
            self.body = body;
        }
        Ok(())
    }

    async fn handle_action(
        &mut self,
        action: MemoAction,
        _at: DateTime<Utc>,
        _ctx: &Self::Context,
    ) -> Result<bool, Self::Error> {
        match action {
            MemoAction::TogglePin => {
                self.pinned = !self.pinned;
                Ok(self.pinned)
            }
        }
    }
}

// --- Tests ---

#[tokio::test]
async fn test_store_full_lifecycle() {
    let (actor, client) = StoreActor::new(10);
    tokio::spawn(actor.run(()));

    // 1. Create
    let id: u32 = client
        .create(MemoCreate {
            body: "first".into(),
        })
        .await
        .unwrap();
    assert_eq!(id, 1); // First ID should be 1

    let memo: Memo = client.get(id).await.unwrap().unwrap();
    assert_eq!(memo.body, "first");
    assert_eq!(memo.created_at, memo.updated_at);

    // 2. Update restamps
    let updated = client
        .update(
            id,
            MemoUpdate {
                body: Some("second".into()),
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.body, "second");
    assert!(updated.updated_at > memo.updated_at);
    assert_eq!(updated.created_at, memo.created_at);

    // 3. Action
    let pinned: bool = client
        .perform_action(id, MemoAction::TogglePin)
        .await
        .unwrap();
    assert!(pinned);

    // 4. Delete
    client.delete(id).await.unwrap();
    assert!(client.get(id).await.unwrap().is_none());
    let err = client
        .update(id, MemoUpdate { body: None })
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));
}

#[tokio::test]
async fn test_watch_sees_later_writes() {
    let (actor, client) = StoreActor::new(10);
    tokio::spawn(actor.run(()));

    let first = client
        .create(MemoCreate { body: "a".into() })
        .await
        .unwrap();

    let mut feed: WatchFeed<Memo> = client.watch().await.unwrap();
    assert_eq!(feed.initial.len(), 1);
    assert_eq!(feed.initial[0].id, first);

    // A later create publishes a fresh snapshot with the newest memo first.
    let second = client
        .create(MemoCreate { body: "b".into() })
        .await
        .unwrap();
    let snap = feed.updates.recv().await.unwrap();
    assert_eq!(snap.len(), 2);
    assert_eq!(snap[0].id, second);
    assert_eq!(snap[1].id, first);

    // Touching the older memo moves it back to the front.
    client
        .update(
            first,
            MemoUpdate {
                body: Some("a2".into()),
            },
        )
        .await
        .unwrap();
    let snap = feed.updates.recv().await.unwrap();
    assert_eq!(snap[0].id, first);
    assert_eq!(snap[1].id, second);
}

#[tokio::test]
async fn test_guarded_action_rejects_stale_stamp() {
    let (actor, client) = StoreActor::new(10);
    tokio::spawn(actor.run(()));

    let id = client
        .create(MemoCreate {
            body: "guarded".into(),
        })
        .await
        .unwrap();
    let memo: Memo = client.get(id).await.unwrap().unwrap();

    // Fresh stamp: the guard holds and the action runs.
    let pinned = client
        .perform_action_guarded(id, MemoAction::TogglePin, memo.updated_at)
        .await
        .unwrap();
    assert!(pinned);

    // Same stamp again: the toggle above superseded it.
    let err = client
        .perform_action_guarded(id, MemoAction::TogglePin, memo.updated_at)
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Superseded { .. }));

    // The failed attempt wrote nothing.
    let after = client.get(id).await.unwrap().unwrap();
    assert!(after.pinned);
}

#[tokio::test]
async fn test_guard_failure_publishes_no_snapshot() {
    let (actor, client) = StoreActor::new(10);
    tokio::spawn(actor.run(()));

    let id = client
        .create(MemoCreate {
            body: "quiet".into(),
        })
        .await
        .unwrap();
    let memo: Memo = client.get(id).await.unwrap().unwrap();
    let stale = memo.updated_at - Duration::seconds(1);

    let mut feed = client.watch().await.unwrap();
    let err = client
        .perform_action_guarded(id, MemoAction::TogglePin, stale)
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Superseded { .. }));

    // The actor publishes before responding, so an empty feed here proves
    // the rejected action wrote nothing.
    assert!(matches!(
        feed.updates.try_recv(),
        Err(tokio::sync::broadcast::error::TryRecvError::Empty)
    ));
}
