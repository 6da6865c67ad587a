use std::cell::RefCell;

use crate::event::{EventHandler, SceneEvent};

/// Fans [`SceneEvent`]s out to every subscribed handler, in subscription order.
#[derive(Default)]
pub struct EventBus {
    handlers: RefCell<Vec<Box<dyn EventHandler>>>,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("handlers", &self.handler_count())
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handlers added here only see events emitted after this call; use
    /// [`EventBus::attach`] for one that has to catch up first.
    pub fn subscribe(&self, handler: Box<dyn EventHandler>) {
        self.handlers.borrow_mut().push(handler);
    }

    /// Feeds `replay` to `handler` alone, then subscribes it.
    ///
    /// Existing handlers never see the replayed events.
    pub fn attach(&self, mut handler: Box<dyn EventHandler>, replay: impl IntoIterator<Item = SceneEvent>) {
        let mut replayed = 0usize;
        for event in replay {
            handler.handle_event(&event);
            replayed += 1;
        }
        log::debug!("Attached scene handler after replaying {} events", replayed);
        self.subscribe(handler);
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.borrow().len()
    }

    pub fn emit(&self, event: SceneEvent) {
        for handler in self.handlers.borrow_mut().iter_mut() {
            handler.handle_event(&event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    struct Recorder(Arc<Mutex<Vec<SceneEvent>>>);

    impl EventHandler for Recorder {
        fn handle_event(&mut self, event: &SceneEvent) {
            self.0.lock().push(event.clone());
        }
    }

    #[test]
    fn every_handler_sees_every_event() {
        let first = Arc::new(Mutex::new(Vec::new()));
        let second = Arc::new(Mutex::new(Vec::new()));
        let bus = EventBus::new();
        bus.subscribe(Box::new(Recorder(first.clone())));
        bus.subscribe(Box::new(Recorder(second.clone())));

        bus.emit(SceneEvent::Cleared);
        bus.emit(SceneEvent::ComponentRemoved { id: "mems".into() });

        assert_eq!(bus.handler_count(), 2);
        assert_eq!(first.lock().len(), 2);
        assert_eq!(*first.lock(), *second.lock());
    }

    #[test]
    fn attach_replays_to_the_newcomer_only() {
        let early = Arc::new(Mutex::new(Vec::new()));
        let late = Arc::new(Mutex::new(Vec::new()));
        let bus = EventBus::new();
        bus.subscribe(Box::new(Recorder(early.clone())));

        let replay = vec![
            SceneEvent::ComponentRemoved { id: "a".into() },
            SceneEvent::SectionVisibilityChanged {
                section: "U1".into(),
                visible: false,
            },
        ];
        bus.attach(Box::new(Recorder(late.clone())), replay.clone());
        assert!(early.lock().is_empty());
        assert_eq!(*late.lock(), replay);

        bus.emit(SceneEvent::Cleared);
        assert_eq!(early.lock().len(), 1);
        assert_eq!(late.lock().last(), Some(&SceneEvent::Cleared));
        assert_eq!(bus.handler_count(), 2);
    }
}
