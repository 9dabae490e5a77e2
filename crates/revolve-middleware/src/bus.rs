//! Typed, topic-based publish/subscribe event bus.
//!
//! Uses [`tokio::sync::broadcast`] channels so that every subscriber receives
//! every message without one subscriber blocking the others. Both sides can
//! be driven synchronously: [`EventBus::publish_to`] never blocks and
//! [`TopicReceiver::try_recv`] drains without waiting, which is how the robot
//! controller consumes requests from inside host callbacks.
//!
//! # Topics
//!
//! | Topic | Path | Traffic |
//! |---|---|---|
//! | [`Topic::BatteryRequest`] | `~/battery_level/request` | get/set battery level requests |
//! | [`Topic::BatteryResponse`] | `~/battery_level/response` | correlated replies |

use revolve_types::{Event, RevolveError};
use tokio::sync::broadcast;
use tracing::warn;

/// Default channel capacity (number of buffered events before old ones are
/// dropped for slow subscribers).
const DEFAULT_CAPACITY: usize = 256;

/// Routing topics on the event bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    /// Inbound battery get/set requests addressed to a robot.
    BatteryRequest,
    /// Outbound battery responses.
    BatteryResponse,
}

impl Topic {
    /// Transport path of the topic, relative to the world namespace.
    pub fn path(&self) -> &'static str {
        match self {
            Topic::BatteryRequest => "~/battery_level/request",
            Topic::BatteryResponse => "~/battery_level/response",
        }
    }
}

/// Shared event bus. Clone it cheaply – all clones share the same underlying
/// broadcast channels.
#[derive(Clone, Debug)]
pub struct EventBus {
    battery_request: broadcast::Sender<Event>,
    battery_response: broadcast::Sender<Event>,
}

impl EventBus {
    /// Create a new bus with the given per-topic channel capacity.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is 0, like [`broadcast::channel`].
    pub fn new(capacity: usize) -> Self {
        let (battery_request, _) = broadcast::channel(capacity);
        let (battery_response, _) = broadcast::channel(capacity);
        Self {
            battery_request,
            battery_response,
        }
    }

    /// Publish `event` to `topic`.
    ///
    /// Returns the number of receivers handed the event. `Ok(0)` means nobody
    /// is listening, which is a normal condition on a pub/sub channel.
    pub fn publish_to(&self, topic: Topic, event: Event) -> Result<usize, RevolveError> {
        let sender = self.topic_sender(topic);
        if sender.receiver_count() == 0 {
            return Ok(0);
        }
        sender
            .send(event)
            .map_err(|e| RevolveError::Channel(format!("publish to {} failed: {e}", topic.path())))
    }

    /// Subscribe to `topic`. Only events published after this call are
    /// delivered.
    pub fn subscribe_to(&self, topic: Topic) -> TopicReceiver {
        TopicReceiver {
            topic,
            receiver: self.topic_sender(topic).subscribe(),
        }
    }

    /// Number of live subscriptions on `topic`.
    pub fn subscriber_count(&self, topic: Topic) -> usize {
        self.topic_sender(topic).receiver_count()
    }

    fn topic_sender(&self, topic: Topic) -> &broadcast::Sender<Event> {
        match topic {
            Topic::BatteryRequest => &self.battery_request,
            Topic::BatteryResponse => &self.battery_response,
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Topic-based receiver
// ---------------------------------------------------------------------------

/// A receiver bound to a single [`Topic`]. Dropping it ends the
/// subscription.
#[derive(Debug)]
pub struct TopicReceiver {
    topic: Topic,
    receiver: broadcast::Receiver<Event>,
}

impl TopicReceiver {
    /// Take the next pending event without waiting.
    ///
    /// Returns `None` when nothing is pending or the bus has shut down. If the
    /// subscriber fell behind, the lag is logged and the oldest retained event
    /// is returned.
    pub fn try_recv(&mut self) -> Option<Event> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => return Some(event),
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    warn!(topic = self.topic.path(), lagged_by = n, "TopicReceiver lagged");
                    continue;
                }
                Err(broadcast::error::TryRecvError::Empty)
                | Err(broadcast::error::TryRecvError::Closed) => return None,
            }
        }
    }

    /// Wait for the next event on this topic.
    ///
    /// Returns:
    /// * `Ok(event)` – a successfully received event.
    /// * `Err(RecvError::Lagged(n))` – `n` messages were dropped.
    /// * `Err(RecvError::Closed)` – the bus has shut down.
    pub async fn recv(&mut self) -> Result<Event, broadcast::error::RecvError> {
        self.receiver.recv().await
    }

    pub fn topic(&self) -> Topic {
        self.topic
    }
}
