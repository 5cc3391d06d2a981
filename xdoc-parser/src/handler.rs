//! Push interface between the reader and whatever consumes the document.
//!
//! The reader walks the input once and calls a [`Handler`] for every element
//! boundary and every run of character data, in document order. Each call runs
//! to completion before the next one is made; nothing is buffered apart from
//! the text of the current run.

use crate::{
    error::Error,
    model::{Attributes, Event},
};

/// Receives the structural events of an xdoc document.
///
/// Every method has a no-op default so consumers only implement what they
/// care about.
///
/// # Event order
///
/// 1. `start_document()`
/// 2. `start_element()` / `characters()` / `end_element()`, nested as in the
///    source. Empty elements (`<img/>`) produce a start immediately followed
///    by an end.
/// 3. `end_document()` once the input is exhausted and well-formed.
///
/// Adjacent text, CDATA sections and entity references are merged into a
/// single `characters()` call, so a handler never sees two text calls in a
/// row.
pub trait Handler {
    /// The error type that can be returned while handling events.
    type Error;

    /// Called once before the first element.
    ///
    /// # Errors
    ///
    /// The default implementation never fails.
    fn start_document(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Called once after the last element has been closed.
    ///
    /// # Errors
    ///
    /// The default implementation never fails.
    fn end_document(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Called when an element opens. `name` is the qualified name as written.
    ///
    /// # Errors
    ///
    /// The default implementation never fails.
    fn start_element(&mut self, _name: &str, _attributes: &Attributes) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Called when an element closes.
    ///
    /// # Errors
    ///
    /// The default implementation never fails.
    fn end_element(&mut self, _name: &str) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Called with a run of character data, entities already resolved.
    ///
    /// # Errors
    ///
    /// The default implementation never fails.
    fn characters(&mut self, _text: &str) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// A [`Handler`] that records every event.
#[derive(Debug, Default)]
pub struct EventCollector {
    events: Vec<Event>,
}

impl EventCollector {
    /// Create a collector with no events.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The events recorded so far.
    #[must_use]
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Consume the collector, returning the events in document order.
    #[must_use]
    pub fn into_events(self) -> Vec<Event> {
        self.events
    }
}

impl Handler for EventCollector {
    type Error = Error;

    fn start_element(&mut self, name: &str, attributes: &Attributes) -> Result<(), Self::Error> {
        self.events.push(Event::Start {
            name: name.to_string(),
            attributes: attributes.clone(),
        });
        Ok(())
    }

    fn end_element(&mut self, name: &str) -> Result<(), Self::Error> {
        self.events.push(Event::End {
            name: name.to_string(),
        });
        Ok(())
    }

    fn characters(&mut self, text: &str) -> Result<(), Self::Error> {
        self.events.push(Event::Text {
            content: text.to_string(),
        });
        Ok(())
    }
}
