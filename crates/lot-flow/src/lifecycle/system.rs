use crate::clients::LotClient;
use crate::lifecycle::{Archiver, ArchiverConfig};
use crate::lot_actor;
use crate::watch::LotWatch;
use tracing::{error, info};

/// Configuration for assembling a [`LotSystem`].
#[derive(Debug, Clone, Default)]
pub struct LotSystemConfig {
    /// Deferred auto-archive policy.
    pub archiver: ArchiverConfig,
}

/// The main runtime orchestrator for the lot lifecycle system.
///
/// `LotSystem` is responsible for:
/// - **Lifecycle Management**: Starting and stopping the lot actor and its deferred jobs
/// - **Dependency Wiring**: Handing the same store channel and archive scheduler to every collaborator
/// - **Resource Coordination**: Owning the subscription manager so live views share one feed
///
/// # Architecture
///
/// One actor owns the lot collection; three collaborators share its channel:
/// - **LotClient**: CRUD plus lifecycle verbs (complete step, archive, assignments)
/// - **Archiver**: deferred conditional archive timers for completed lots
/// - **LotWatch**: multiplexes live filtered views onto one store feed
///
/// # Example
///
/// ```ignore
/// let system = LotSystem::new();
///
/// // Use the clients to interact with the actor
/// let id = system.lot_client.create_lot(params).await?;
/// let mut sub = system.watch.subscribe(LotFilter::default()).await?;
///
/// // Gracefully shut down when done
/// system.shutdown().await?;
/// ```
pub struct LotSystem {
    /// Client for lot CRUD and lifecycle operations
    pub lot_client: LotClient,

    /// Subscription manager for live filtered views of the collection
    pub watch: LotWatch,

    /// Deferred auto-archive scheduler (shared with `lot_client`)
    archiver: Archiver,

    /// Task handles for all running actors (used for graceful shutdown)
    handles: Vec<tokio::task::JoinHandle<()>>,
}

impl LotSystem {
    /// Creates a system with the default archive policy.
    pub fn new() -> Self {
        Self::with_config(LotSystemConfig::default())
    }

    /// Creates and initializes a new `LotSystem` with the lot actor running.
    pub fn with_config(config: LotSystemConfig) -> Self {
        // 1. Create the actor (no dependencies)
        let (lot_actor, store_client) = lot_actor::new();

        // 2. Start the actor with injected context (none needed)
        let lot_handle = tokio::spawn(lot_actor.run(()));

        // 3. Wire the collaborators that share the store channel
        let archiver = Archiver::new(store_client.clone(), config.archiver);
        let lot_client = LotClient::new(store_client.clone(), archiver.clone());
        let watch = LotWatch::new(store_client);

        Self {
            lot_client,
            watch,
            archiver,
            handles: vec![lot_handle],
        }
    }

    /// Read-only view of the archive scheduler, for tests and diagnostics.
    pub fn archiver(&self) -> &Archiver {
        &self.archiver
    }

    /// Gracefully shuts down the entire system.
    ///
    /// Deferred archive timers are stopped first: each timer task holds a
    /// store client, so the channel can only close once they are gone. Then
    /// dropping the remaining clients closes the channel and the actor exits
    /// its loop.
    ///
    /// # Returns
    ///
    /// - `Ok(())` if the actor shut down cleanly
    /// - `Err(String)` if the actor task failed or panicked
    pub async fn shutdown(self) -> Result<(), String> {
        info!("Shutting down system...");

        // =====================================================================
        // Step 1: Stop deferred work
        // =====================================================================

        self.archiver.shutdown().await;

        // =====================================================================
        // Step 2: Close all channels by dropping clients
        // =====================================================================

        // Dropping the watch manager ends every live subscription; dropping
        // the clients closes the actor's channel, which it reads as shutdown.
        drop(self.watch);
        drop(self.lot_client);
        drop(self.archiver);

        // =====================================================================
        // Step 3: Wait for all actor tasks to complete
        // =====================================================================

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!("Actor task failed: {:?}", e);
                return Err(format!("Actor task failed: {:?}", e));
            }
        }

        info!("System shutdown complete.");
        Ok(())
    }
}
