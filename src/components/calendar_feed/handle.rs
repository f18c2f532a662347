use super::actor::{CalendarFeedActor, CalendarFeedActorHandle, FeedSnapshot};
use super::CalendarFeed;
use crate::config::Config;
use crate::error::BoardResult;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Handle for interacting with the calendar feed actor
#[derive(Clone)]
pub struct CalendarFeedHandle {
    actor_handle: CalendarFeedActorHandle,
    _actor_task: Arc<JoinHandle<()>>,
}

impl CalendarFeedHandle {
    /// Create a new CalendarFeedHandle and spawn the actor
    pub fn new(config: Arc<Config>) -> BoardResult<Self> {
        let (mut actor, handle) = CalendarFeedActor::new(config)?;

        let actor_task = tokio::spawn(async move {
            actor.run().await;
        });

        Ok(Self {
            actor_handle: handle,
            _actor_task: Arc::new(actor_task),
        })
    }

    /// Shutdown the actor
    pub async fn shutdown(&self) -> BoardResult<()> {
        self.actor_handle.shutdown().await
    }
}

#[async_trait]
impl CalendarFeed for CalendarFeedHandle {
    async fn fetch_snapshot(&self) -> BoardResult<FeedSnapshot> {
        self.actor_handle.fetch_snapshot().await
    }
}
