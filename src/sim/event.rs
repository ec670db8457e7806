//! In-process publish/subscribe for game events.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use log::warn;

use super::types::{GameEvent, Topic};

/// What a handler returns. An `Err` is logged and counted by the bus.
pub type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

type Handler = Box<dyn FnMut(&GameEvent) -> HandlerResult>;

/// Delivery summary of one [`EventBus::emit`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Dispatch {
    /// Handlers that returned `Ok`.
    pub delivered: usize,
    /// Handlers that returned an error or panicked.
    pub failed: usize,
}

/// Topic-keyed handler registry.
///
/// Handlers for a topic run synchronously in registration order. Each call
/// is isolated, so a failing or panicking handler never stops the ones
/// registered after it. There is no unsubscribe.
#[derive(Default)]
pub struct EventBus {
    handlers: HashMap<Topic, Vec<Handler>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for `topic`.
    pub fn on<F>(&mut self, topic: Topic, handler: F)
    where
        F: FnMut(&GameEvent) -> HandlerResult + 'static,
    {
        self.handlers.entry(topic).or_default().push(Box::new(handler));
    }

    /// Delivers `event` to every handler of its topic.
    pub fn emit(&mut self, event: &GameEvent) -> Dispatch {
        let topic = event.topic();
        let mut dispatch = Dispatch::default();
        let Some(handlers) = self.handlers.get_mut(&topic) else {
            return dispatch;
        };

        for (index, handler) in handlers.iter_mut().enumerate() {
            match panic::catch_unwind(AssertUnwindSafe(|| handler(event))) {
                Ok(Ok(())) => dispatch.delivered += 1,
                Ok(Err(e)) => {
                    warn!("handler #{index} for {topic:?} failed: {e}");
                    dispatch.failed += 1;
                }
                Err(payload) => {
                    warn!(
                        "handler #{index} for {topic:?} panicked: {}",
                        panic_message(payload.as_ref())
                    );
                    dispatch.failed += 1;
                }
            }
        }
        dispatch
    }

    pub fn handler_count(&self, topic: Topic) -> usize {
        self.handlers.get(&topic).map_or(0, Vec::len)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counts: HashMap<&Topic, usize> =
            self.handlers.iter().map(|(t, hs)| (t, hs.len())).collect();
        f.debug_struct("EventBus").field("handlers", &counts).finish()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s
    } else {
        "non-string panic payload"
    }
}
