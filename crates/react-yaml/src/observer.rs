//! Callbacks fired while a turn is being parsed.
//!
//! The [`turn`](crate::turn) driver reports every delta and completion as a
//! [`ParseEvent`]. Implement [`ParseObserver`] to render reasoning live, log,
//! or collect statistics.
//!
//! | Observer | Use case |
//! |----------|----------|
//! | [`NoopObserver`] | Tests or batch runs |
//! | [`LoggingObserver`] | Structured logging via `tracing` |
//! | [`FnObserver`] | Quick closures |
//! | [`CompositeObserver`] | Several observers in order |

use tracing::{debug, trace, warn};

use crate::ActionDocument;

/// Events emitted while driving one parser.
#[derive(Debug)]
pub enum ParseEvent<'a> {
    /// New reasoning text.
    ReasoningDelta(&'a str),
    /// New action-document text.
    ContentDelta(&'a str),
    /// The reasoning section has ended. Carries the full reasoning text.
    ReasoningComplete { reasoning: &'a str },
    /// The action document parsed.
    ActionComplete { document: &'a ActionDocument },
    /// The stream parser never produced a document, but the fence-stripped
    /// raw text did.
    Recovered { document: &'a ActionDocument },
    /// No document could be recovered from the turn.
    Malformed { raw: &'a str },
}

impl ParseEvent<'_> {
    /// Reasoning or content text carried by a delta event.
    pub fn delta_text(&self) -> Option<&str> {
        match self {
            Self::ReasoningDelta(text) | Self::ContentDelta(text) => Some(text),
            _ => None,
        }
    }
}

/// Observer for [`ParseEvent`]s. The default implementation ignores them.
///
/// ```
/// use react_yaml::observer::{ParseEvent, ParseObserver};
///
/// struct Printer;
///
/// impl ParseObserver for Printer {
///     fn on_event(&self, event: &ParseEvent<'_>) {
///         if let ParseEvent::ReasoningDelta(text) = event {
///             print!("{text}");
///         }
///     }
/// }
/// ```
pub trait ParseObserver: Send + Sync {
    fn on_event(&self, event: &ParseEvent<'_>) {
        let _ = event;
    }
}

pub struct NoopObserver;
impl ParseObserver for NoopObserver {}

/// An observer backed by a closure.
pub struct FnObserver<F>(F)
where
    F: Fn(&ParseEvent<'_>) + Send + Sync;

impl<F> FnObserver<F>
where
    F: Fn(&ParseEvent<'_>) + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F> ParseObserver for FnObserver<F>
where
    F: Fn(&ParseEvent<'_>) + Send + Sync,
{
    fn on_event(&self, event: &ParseEvent<'_>) {
        (self.0)(event)
    }
}

/// Dispatches each event to every inner observer in registration order.
///
/// ```
/// use react_yaml::observer::{CompositeObserver, LoggingObserver, NoopObserver};
///
/// let verbose = false;
/// let observer = CompositeObserver::new()
///     .with(LoggingObserver)
///     .with_if(verbose, NoopObserver)
///     .with_opt(None::<NoopObserver>);
/// assert_eq!(observer.len(), 1);
/// ```
pub struct CompositeObserver {
    observers: Vec<Box<dyn ParseObserver>>,
}

impl CompositeObserver {
    pub fn new() -> Self {
        Self {
            observers: Vec::new(),
        }
    }

    pub fn with(mut self, observer: impl ParseObserver + 'static) -> Self {
        self.observers.push(Box::new(observer));
        self
    }

    /// Add `observer` only when `condition` holds.
    pub fn with_if(self, condition: bool, observer: impl ParseObserver + 'static) -> Self {
        if condition { self.with(observer) } else { self }
    }

    /// Add an observer from an `Option`. `None` is a no-op.
    pub fn with_opt(self, observer: Option<impl ParseObserver + 'static>) -> Self {
        match observer {
            Some(o) => self.with(o),
            None => self,
        }
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

impl Default for CompositeObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl ParseObserver for CompositeObserver {
    fn on_event(&self, event: &ParseEvent<'_>) {
        for observer in &self.observers {
            observer.on_event(event);
        }
    }
}

/// Logs events via `tracing`.
pub struct LoggingObserver;

impl ParseObserver for LoggingObserver {
    fn on_event(&self, event: &ParseEvent<'_>) {
        match event {
            ParseEvent::ReasoningDelta(text) => {
                trace!("reasoning delta: {} chars", text.chars().count());
            }
            ParseEvent::ContentDelta(text) => {
                trace!("content delta: {} chars", text.chars().count());
            }
            ParseEvent::ReasoningComplete { reasoning } => {
                let preview: String = reasoning.chars().take(200).collect();
                debug!(
                    "reasoning complete: {preview}{}",
                    if reasoning.chars().count() > 200 { "..." } else { "" }
                );
            }
            ParseEvent::ActionComplete { document } => {
                let keys: Vec<&str> = document.keys().map(String::as_str).collect();
                debug!("action document keys: {}", keys.join(", "));
            }
            ParseEvent::Recovered { document } => {
                warn!(
                    "recovered action document from fenced raw text ({} keys)",
                    document.len()
                );
            }
            ParseEvent::Malformed { raw } => {
                warn!("no action document in turn ({} bytes)", raw.len());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn fn_observer_sees_events() {
        let seen = Arc::new(Mutex::new(String::new()));
        let sink = seen.clone();
        let observer = FnObserver::new(move |event| {
            if let Some(text) = event.delta_text() {
                sink.lock().unwrap().push_str(text);
            }
        });
        observer.on_event(&ParseEvent::ReasoningDelta("ab"));
        observer.on_event(&ParseEvent::ContentDelta("cd"));
        observer.on_event(&ParseEvent::Malformed { raw: "zz" });
        assert_eq!(*seen.lock().unwrap(), "abcd");
    }

    #[test]
    fn composite_dispatches_in_order() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let first = order.clone();
        let second = order.clone();
        let observer = CompositeObserver::new()
            .with(FnObserver::new(move |_| first.lock().unwrap().push(1)))
            .with(LoggingObserver)
            .with(FnObserver::new(move |_| second.lock().unwrap().push(2)));

        observer.on_event(&ParseEvent::ReasoningComplete { reasoning: "r" });
        assert_eq!(*order.lock().unwrap(), vec![1, 2]);
        assert_eq!(observer.len(), 3);
    }

    #[test]
    fn conditional_composition() {
        let observer = CompositeObserver::default()
            .with_if(false, NoopObserver)
            .with_opt(Some(NoopObserver));
        assert_eq!(observer.len(), 1);
        assert!(
            CompositeObserver::new()
                .with_opt(None::<NoopObserver>)
                .is_empty()
        );
    }
}
