//! Background Tasks
//!
//! Follow-up work submitted by the service layer after a transfer commits.
//! The distributor side enqueues onto a bounded in-process queue; the
//! processor drains it on a spawned task. The transfer engine never touches
//! this module.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::store::{Store, StoreError};

pub const TASK_TRANSFER_COMPLETED: &str = "task:transfer_completed";

/// Payload of a `TASK_TRANSFER_COMPLETED` task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayloadTransferCompleted {
    pub transfer_id: i64,
    pub from_account_id: i64,
    pub to_account_id: i64,
    pub amount: i64,
}

/// Queued unit of background work
#[derive(Debug, Clone)]
pub struct Task {
    pub task_type: String,
    pub payload: serde_json::Value,
    pub enqueued_at: DateTime<Utc>,
}

impl Task {
    pub fn new<P: Serialize>(task_type: &str, payload: &P) -> Result<Self, JobError> {
        Ok(Self {
            task_type: task_type.to_string(),
            payload: serde_json::to_value(payload)?,
            enqueued_at: Utc::now(),
        })
    }
}

// =========================================================================
// Distributor
// =========================================================================

/// Producer handle for background tasks. Cheap to clone.
#[derive(Debug, Clone)]
pub struct TaskDistributor {
    sender: mpsc::Sender<Task>,
}

impl TaskDistributor {
    /// Create a distributor and the receiving end to hand to a `TaskProcessor`
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<Task>) {
        let (sender, receiver) = mpsc::channel(capacity);
        (Self { sender }, receiver)
    }

    /// Enqueue without waiting; a full queue is reported, not awaited.
    pub fn distribute(&self, task: Task) -> Result<(), JobError> {
        let task_type = task.task_type.clone();
        self.sender.try_send(task).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => JobError::QueueFull,
            mpsc::error::TrySendError::Closed(_) => JobError::QueueClosed,
        })?;

        tracing::info!(task_type = %task_type, "Enqueued task");
        Ok(())
    }

    pub fn distribute_transfer_completed(
        &self,
        payload: &PayloadTransferCompleted,
    ) -> Result<(), JobError> {
        self.distribute(Task::new(TASK_TRANSFER_COMPLETED, payload)?)
    }
}

// =========================================================================
// Processor
// =========================================================================

/// Consumer loop for background tasks
pub struct TaskProcessor {
    receiver: mpsc::Receiver<Task>,
    store: Store,
}

impl TaskProcessor {
    pub fn new(receiver: mpsc::Receiver<Task>, store: Store) -> Self {
        Self { receiver, store }
    }

    /// Start the processor in the background.
    /// The task ends once every `TaskDistributor` has been dropped and the
    /// queue is drained.
    pub fn start(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            self.run().await;
        })
    }

    async fn run(mut self) {
        tracing::info!("Task processor started");

        while let Some(task) = self.receiver.recv().await {
            if let Err(e) = process_task(&self.store, &task).await {
                tracing::error!(task_type = %task.task_type, error = %e, "Task failed");
            }
        }

        tracing::info!("Task processor stopped");
    }
}

/// Handle one task. Tasks that can never succeed are dropped with `Ok(())`
/// after logging, so a retrying caller would not loop on them.
pub async fn process_task(store: &Store, task: &Task) -> Result<(), JobError> {
    match task.task_type.as_str() {
        TASK_TRANSFER_COMPLETED => {
            let payload: PayloadTransferCompleted = match serde_json::from_value(task.payload.clone()) {
                Ok(payload) => payload,
                Err(e) => {
                    tracing::warn!(error = %e, "Dropping task with malformed payload");
                    return Ok(());
                }
            };
            process_transfer_completed(store, &payload).await
        }
        other => Err(JobError::UnknownTask(other.to_string())),
    }
}

async fn process_transfer_completed(
    store: &Store,
    payload: &PayloadTransferCompleted,
) -> Result<(), JobError> {
    let transfer = match store.get_transfer(payload.transfer_id).await {
        Ok(transfer) => transfer,
        Err(StoreError::TransferNotFound(id)) => {
            tracing::warn!(transfer_id = id, "Transfer does not exist, skipping task");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    // TODO: deliver the notification once an email/webhook sender exists
    tracing::info!(
        task_type = TASK_TRANSFER_COMPLETED,
        transfer_id = transfer.id,
        from_account_id = transfer.from_account_id,
        to_account_id = transfer.to_account_id,
        amount = transfer.amount,
        "Processed task"
    );

    Ok(())
}

/// Task queue errors
#[derive(Debug, thiserror::Error)]
pub enum JobError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Task queue is full")]
    QueueFull,

    #[error("Task queue is closed")]
    QueueClosed,

    #[error("Unknown task type: {0}")]
    UnknownTask(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

// =========================================================================
// Tests
// =========================================================================
