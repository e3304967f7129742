//! Lightweight in-process signals.
//!
//! The application exposes a [`Signal`] for each lifecycle event it
//! publishes. Receivers are plain closures; sending calls each of them in
//! connection order.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use crate::context::TemplateContext;
use crate::loader::LoadedTemplate;

type Receiver<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// A list of receivers for payloads of type `T`.
pub struct Signal<T> {
    receivers: RwLock<Vec<Receiver<T>>>,
}

impl<T> Default for Signal<T> {
    fn default() -> Self {
        Self {
            receivers: RwLock::new(Vec::new()),
        }
    }
}

impl<T> Signal<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Connects a receiver.
    pub fn connect<F>(&self, receiver: F)
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.receivers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::new(receiver));
    }

    /// Removes every receiver.
    pub fn disconnect_all(&self) {
        self.receivers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    pub fn receiver_count(&self) -> usize {
        self.receivers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn has_receivers(&self) -> bool {
        self.receiver_count() > 0
    }

    /// Calls every receiver with `payload`. Returns how many were called.
    pub fn send(&self, payload: &T) -> usize {
        // Receivers may connect further receivers; do not hold the lock.
        let receivers = self
            .receivers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        for receiver in &receivers {
            receiver(payload);
        }
        receivers.len()
    }
}

impl<T> fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("receivers", &self.receiver_count())
            .finish()
    }
}

/// Payload of the `template_generated` signal.
#[derive(Debug, Clone)]
pub struct TemplateGenerated {
    /// The loaded template; `None` for inline strings.
    pub template: Option<Arc<LoadedTemplate>>,
    /// The resolved rendering method.
    pub method: String,
    /// The final render context.
    pub context: TemplateContext,
}

impl TemplateGenerated {
    /// The template name, if it was loaded from the search path.
    pub fn template_name(&self) -> Option<&str> {
        self.template.as_deref().map(|t| t.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn send_calls_receivers_in_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let signal: Signal<u32> = Signal::new();
        for tag in ["a", "b"] {
            let seen = seen.clone();
            signal.connect(move |n: &u32| seen.lock().unwrap().push(format!("{tag}{n}")));
        }
        assert_eq!(signal.send(&1), 2);
        assert_eq!(*seen.lock().unwrap(), vec!["a1", "b1"]);
    }

    #[test]
    fn disconnect_all() {
        let signal: Signal<()> = Signal::new();
        signal.connect(|_| {});
        assert!(signal.has_receivers());
        signal.disconnect_all();
        assert_eq!(signal.send(&()), 0);
    }
}
