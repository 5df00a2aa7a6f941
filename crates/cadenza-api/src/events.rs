//! In-process broadcast of [`StudioEvent`]s.

use cadenza_core::event::{Envelope, StudioEvent};
use chrono::Utc;
use tokio::sync::broadcast;

/// Fan-out channel for domain events.
///
/// Publishing never blocks and never fails the request: with no subscribers
/// the event is dropped, and slow subscribers see `Lagged`.
#[derive(Clone)]
pub struct EventBus {
  tx: broadcast::Sender<Envelope>,
}

impl EventBus {
  pub fn new(capacity: usize) -> Self {
    let (tx, _) = broadcast::channel(capacity.max(1));
    Self { tx }
  }

  pub fn subscribe(&self) -> broadcast::Receiver<Envelope> { self.tx.subscribe() }

  pub fn emit(&self, event: StudioEvent) {
    let _ = self.tx.send(Envelope { at: Utc::now(), event });
  }
}

impl Default for EventBus {
  fn default() -> Self { Self::new(256) }
}

#[cfg(test)]
mod tests {
  use uuid::Uuid;

  use super::*;

  #[tokio::test]
  async fn subscribers_receive_emitted_events() {
    let bus = EventBus::new(8);
    let mut rx = bus.subscribe();
    let event = StudioEvent::MissionClaimed {
      user_id:    Uuid::new_v4(),
      mission_id: "daily-practice-30".into(),
      xp_earned:  50,
    };
    bus.emit(event.clone());
    assert_eq!(rx.recv().await.unwrap().event, event);
  }

  #[test]
  fn emitting_without_subscribers_is_silent() {
    EventBus::default().emit(StudioEvent::LevelUp {
      user_id:   Uuid::new_v4(),
      old_level: 1,
      new_level: 2,
      xp:        100,
    });
  }
}
