//! [`BatteryChannel`] – the battery request/response transport handles of one
//! robot controller.
//!
//! The subscription to [`Topic::BatteryRequest`] and the publisher on
//! [`Topic::BatteryResponse`] are acquired together in
//! [`BatteryChannel::attach`] and released together when the channel is
//! dropped, so several robots can share one bus in the same process.

use revolve_types::{BatteryRequest, BatteryResponse, Event, EventPayload, RevolveError};
use tracing::debug;

use crate::bus::{EventBus, Topic, TopicReceiver};

/// Subscription + publisher pair scoped to a controller's attached lifetime.
#[derive(Debug)]
pub struct BatteryChannel {
    bus: EventBus,
    requests: TopicReceiver,
    source: String,
}

impl BatteryChannel {
    /// Subscribe to battery requests on `bus`. `source` tags every response
    /// envelope published through this channel.
    pub fn attach(bus: &EventBus, source: impl Into<String>) -> Self {
        let source = source.into();
        debug!(source = %source, topic = Topic::BatteryRequest.path(), "battery channel attached");
        Self {
            bus: bus.clone(),
            requests: bus.subscribe_to(Topic::BatteryRequest),
            source,
        }
    }

    /// Next pending battery request, without waiting. Events of other kinds
    /// on the request topic are skipped.
    pub fn next_request(&mut self) -> Option<BatteryRequest> {
        while let Some(event) = self.requests.try_recv() {
            if let EventPayload::BatteryRequest(request) = event.payload {
                return Some(request);
            }
        }
        None
    }

    /// Publish `response` on the response topic.
    pub fn respond(&self, response: BatteryResponse) -> Result<usize, RevolveError> {
        let event = Event::new(self.source.clone(), EventPayload::BatteryResponse(response));
        self.bus.publish_to(Topic::BatteryResponse, event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use revolve_types::GET_BATTERY_LEVEL;

    fn request_event(request: BatteryRequest) -> Event {
        Event::new("test::client", EventPayload::BatteryRequest(request))
    }

    #[test]
    fn receives_requests_and_publishes_responses() {
        let bus = EventBus::default();
        let mut channel = BatteryChannel::attach(&bus, "revolve::spider");
        let mut responses = bus.subscribe_to(Topic::BatteryResponse);

        bus.publish_to(Topic::BatteryRequest, request_event(BatteryRequest::query(5, "spider")))
            .unwrap();
        let request = channel.next_request().expect("request must arrive");
        assert_eq!(request.id, 5);
        assert!(channel.next_request().is_none());

        channel
            .respond(BatteryResponse {
                id: request.id,
                request: request.request.clone(),
                response: "0.5".to_string(),
            })
            .unwrap();
        let event = responses.try_recv().expect("response must be published");
        assert_eq!(event.source, "revolve::spider");
        match event.payload {
            EventPayload::BatteryResponse(r) => {
                assert_eq!(r.id, 5);
                assert_eq!(r.request, GET_BATTERY_LEVEL);
            }
            other => panic!("unexpected payload: {other:?}"),
        }
    }

    #[test]
    fn skips_foreign_payloads_on_request_topic() {
        let bus = EventBus::default();
        let mut channel = BatteryChannel::attach(&bus, "revolve::spider");
        let stray = Event::new(
            "test::client",
            EventPayload::BatteryResponse(BatteryResponse {
                id: 1,
                request: "x".to_string(),
                response: "y".to_string(),
            }),
        );
        bus.publish_to(Topic::BatteryRequest, stray).unwrap();
        bus.publish_to(Topic::BatteryRequest, request_event(BatteryRequest::query(2, "spider")))
            .unwrap();
        assert_eq!(channel.next_request().map(|r| r.id), Some(2));
    }

    #[test]
    fn two_channels_on_one_bus_both_see_requests() {
        let bus = EventBus::default();
        let mut a = BatteryChannel::attach(&bus, "revolve::a");
        let mut b = BatteryChannel::attach(&bus, "revolve::b");
        bus.publish_to(Topic::BatteryRequest, request_event(BatteryRequest::query(9, "a")))
            .unwrap();
        assert!(a.next_request().is_some());
        assert!(b.next_request().is_some());
    }

    #[test]
    fn drop_releases_subscription() {
        let bus = EventBus::default();
        let channel = BatteryChannel::attach(&bus, "revolve::spider");
        assert_eq!(bus.subscriber_count(Topic::BatteryRequest), 1);
        drop(channel);
        assert_eq!(bus.subscriber_count(Topic::BatteryRequest), 0);
    }
}
