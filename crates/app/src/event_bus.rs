//! In-process event bus.
//!
//! Observers (SSE clients, the virtual home) share a tokio broadcast
//! channel: a slow observer lags and misses events, it never slows the
//! engine down. Scene-start requests additionally go through a bounded
//! mpsc queue owned by the trigger listener, so an acknowledged start is
//! never lost to a burst of run status events.

use std::future::Future;
use std::sync::Mutex;

use tokio::sync::{broadcast, mpsc};

use scenehub_domain::error::SceneHubError;
use scenehub_domain::event::{Event, EventType};

use crate::ports::EventPublisher;

/// Event bus with a lossy fan-out side and a lossless trigger queue.
pub struct InProcessEventBus {
    observers: broadcast::Sender<Event>,
    triggers: mpsc::Sender<Event>,
    trigger_queue: Mutex<Option<mpsc::Receiver<Event>>>,
}

impl InProcessEventBus {
    /// Create a bus. `capacity` bounds both the observer channel and the
    /// trigger queue.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero (rejected earlier by the daemon configuration).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (observers, _) = broadcast::channel(capacity);
        let (triggers, queue) = mpsc::channel(capacity);
        Self {
            observers,
            triggers,
            trigger_queue: Mutex::new(Some(queue)),
        }
    }

    /// Observe every event published from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.observers.subscribe()
    }

    /// Take the queue of `action.triggered` events.
    ///
    /// There is a single consumer: the first call gets the queue, later
    /// calls get `None`. Until it is taken, triggers accumulate and
    /// publishers wait once the queue is full.
    pub fn take_triggers(&self) -> Option<mpsc::Receiver<Event>> {
        self.trigger_queue.lock().ok().and_then(|mut slot| slot.take())
    }
}

impl EventPublisher for InProcessEventBus {
    fn publish(&self, event: Event) -> impl Future<Output = Result<(), SceneHubError>> + Send {
        let trigger = (event.event_type == EventType::ActionTriggered)
            .then(|| (self.triggers.clone(), event.clone()));
        // fails only when nobody observes
        let _ = self.observers.send(event);
        async move {
            if let Some((triggers, event)) = trigger {
                if triggers.send(event).await.is_err() {
                    tracing::warn!("trigger queue closed, start request dropped");
                }
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scenehub_domain::id::RunId;

    #[tokio::test]
    async fn should_fan_run_status_out_to_every_observer() {
        let bus = InProcessEventBus::new(16);
        let mut sse = bus.subscribe();
        let mut home = bus.subscribe();

        let finished = Event::new(EventType::SceneRunFinished, serde_json::json!({"scene": "night"}));
        let id = finished.id;
        bus.publish(finished).await.unwrap();

        assert_eq!(sse.recv().await.unwrap().id, id);
        assert_eq!(home.recv().await.unwrap().id, id);
    }

    #[tokio::test]
    async fn should_queue_start_requests_for_the_listener_and_observers() {
        let bus = InProcessEventBus::new(16);
        let mut sse = bus.subscribe();
        let mut triggers = bus.take_triggers().unwrap();

        bus.publish(Event::scene_start("wake-up", RunId::new()))
            .await
            .unwrap();

        assert_eq!(triggers.recv().await.unwrap().as_scene_start().unwrap().scene, "wake-up");
        assert_eq!(sse.recv().await.unwrap().event_type, EventType::ActionTriggered);
    }

    #[tokio::test]
    async fn should_keep_other_events_out_of_trigger_queue() {
        let bus = InProcessEventBus::new(16);
        let mut triggers = bus.take_triggers().unwrap();

        bus.publish(Event::new(EventType::SmsSend, serde_json::json!({"text": "hi"})))
            .await
            .unwrap();
        drop(bus);

        assert!(triggers.recv().await.is_none());
    }

    #[tokio::test]
    async fn should_keep_start_request_when_observers_lag() {
        let bus = InProcessEventBus::new(2);
        let mut observer = bus.subscribe();
        let mut triggers = bus.take_triggers().unwrap();
        let run_id = RunId::new();

        bus.publish(Event::scene_start("wake-up", run_id)).await.unwrap();
        for _ in 0..5 {
            bus.publish(Event::new(EventType::SceneLaneFinished, serde_json::json!({})))
                .await
                .unwrap();
        }

        assert!(matches!(
            observer.recv().await,
            Err(broadcast::error::RecvError::Lagged(_))
        ));
        let request = triggers.recv().await.unwrap().as_scene_start().unwrap();
        assert_eq!(request.run_id, Some(run_id));
    }

    #[tokio::test]
    async fn should_hand_trigger_queue_out_once() {
        let bus = InProcessEventBus::new(4);
        assert!(bus.take_triggers().is_some());
        assert!(bus.take_triggers().is_none());
    }

    #[tokio::test]
    async fn should_publish_without_observers_or_listener() {
        let bus = InProcessEventBus::new(4);
        drop(bus.take_triggers());
        bus.publish(Event::scene_start("wake-up", RunId::new()))
            .await
            .unwrap();
        bus.publish(Event::new(EventType::SceneRunFinished, serde_json::json!({})))
            .await
            .unwrap();
    }
}
