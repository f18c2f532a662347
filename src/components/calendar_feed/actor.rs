use super::ics::decode_calendar;
use super::models::RawComponent;
use crate::config::Config;
use crate::error::{feed_error, BoardResult};
use reqwest::Client;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};

/// Decoded feed contents, keyed by UID
pub type FeedSnapshot = BTreeMap<String, RawComponent>;

/// The calendar feed actor that processes messages
pub struct CalendarFeedActor {
    config: Arc<Config>,
    client: Client,
    command_rx: mpsc::Receiver<CalendarFeedCommand>,
}

/// Commands that can be sent to the calendar feed actor
pub enum CalendarFeedCommand {
    FetchSnapshot(oneshot::Sender<BoardResult<FeedSnapshot>>),
    Shutdown,
}

/// Handle for communicating with the calendar feed actor
#[derive(Clone)]
pub struct CalendarFeedActorHandle {
    command_tx: mpsc::Sender<CalendarFeedCommand>,
}

impl CalendarFeedActorHandle {
    /// Download and decode the feed
    pub async fn fetch_snapshot(&self) -> BoardResult<FeedSnapshot> {
        let (response_tx, response_rx) = oneshot::channel();
        self.command_tx
            .send(CalendarFeedCommand::FetchSnapshot(response_tx))
            .await
            .map_err(|e| feed_error(&format!("Actor mailbox error: {}", e)))?;

        response_rx
            .await
            .map_err(|_| feed_error("Response channel closed"))?
    }

    /// Shutdown the actor
    pub async fn shutdown(&self) -> BoardResult<()> {
        let _ = self.command_tx.send(CalendarFeedCommand::Shutdown).await;
        Ok(())
    }
}

impl CalendarFeedActor {
    /// Create a new actor and return its handle
    pub fn new(config: Arc<Config>) -> BoardResult<(Self, CalendarFeedActorHandle)> {
        let (command_tx, command_rx) = mpsc::channel(32);

        let client = Client::builder()
            .timeout(Duration::from_secs(config.feed_timeout_secs))
            .build()
            .map_err(|e| feed_error(&format!("Failed to build HTTP client: {}", e)))?;

        let actor = Self {
            config,
            client,
            command_rx,
        };

        Ok((actor, CalendarFeedActorHandle { command_tx }))
    }

    /// Start the actor's processing loop
    pub async fn run(&mut self) {
        info!("Calendar feed actor started");

        while let Some(cmd) = self.command_rx.recv().await {
            match cmd {
                CalendarFeedCommand::FetchSnapshot(response_tx) => {
                    // Each fetch runs on its own task so a slow feed does not
                    // hold up requests queued behind it.
                    let client = self.client.clone();
                    let url = self.config.calendar_url.clone();
                    tokio::spawn(async move {
                        let result = Self::fetch_snapshot(&client, &url).await;
                        let _ = response_tx.send(result);
                    });
                }
                CalendarFeedCommand::Shutdown => {
                    info!("Calendar feed actor shutting down");
                    break;
                }
            }
        }

        info!("Calendar feed actor shut down");
    }

    /// Fetch the feed body and decode it
    async fn fetch_snapshot(client: &Client, url: &str) -> BoardResult<FeedSnapshot> {
        let response = client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(feed_error(&format!(
                "Calendar feed returned status {}",
                response.status()
            )));
        }

        let body = response.text().await?;
        debug!("Fetched {} bytes of calendar data", body.len());

        decode_calendar(&body)
    }
}
