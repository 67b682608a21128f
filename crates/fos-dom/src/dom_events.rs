//! DOM Events
//!
//! Document lifecycle events and the dispatcher seam. Bubbling and capture
//! belong to whoever installs the dispatcher.

use crate::{Document, DomError, DomResult};

/// DOM event types fired by the core
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomEventType {
    ReadyStateChange,
    DOMContentLoaded,
    Load,
    PageShow,
    /// Created through `create_event` and not yet initialized
    Uninitialized,
}

impl DomEventType {
    /// Event type string as seen by listeners
    pub fn as_str(&self) -> &'static str {
        match self {
            DomEventType::ReadyStateChange => "readystatechange",
            DomEventType::DOMContentLoaded => "DOMContentLoaded",
            DomEventType::Load => "load",
            DomEventType::PageShow => "pageshow",
            DomEventType::Uninitialized => "",
        }
    }
}

/// Event interfaces `create_event` knows how to build
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventInterface {
    Event,
    UiEvent,
    MouseEvent,
    KeyboardEvent,
    FocusEvent,
    CustomEvent,
    MutationEvent,
    MessageEvent,
    ErrorEvent,
    ProgressEvent,
    PageTransitionEvent,
}

impl EventInterface {
    /// Resolve a legacy interface name, ignoring ASCII case
    pub fn from_name(name: &str) -> Option<Self> {
        let interface = match name.to_ascii_lowercase().as_str() {
            "event" | "events" | "htmlevents" => EventInterface::Event,
            "uievent" | "uievents" => EventInterface::UiEvent,
            "mouseevent" | "mouseevents" => EventInterface::MouseEvent,
            "keyboardevent" => EventInterface::KeyboardEvent,
            "focusevent" => EventInterface::FocusEvent,
            "customevent" => EventInterface::CustomEvent,
            "mutationevent" | "mutationevents" => EventInterface::MutationEvent,
            "messageevent" => EventInterface::MessageEvent,
            "errorevent" => EventInterface::ErrorEvent,
            "progressevent" => EventInterface::ProgressEvent,
            "pagetransitionevent" => EventInterface::PageTransitionEvent,
            _ => return None,
        };
        Some(interface)
    }
}

/// DOM event
#[derive(Debug, Clone)]
pub struct DomEvent {
    pub event_type: DomEventType,
    pub interface: EventInterface,
    pub bubbles: bool,
    pub cancelable: bool,
    /// `persisted` flag of page transition events
    pub persisted: bool,
    initialized: bool,
    default_prevented: bool,
    propagation_stopped: bool,
}

impl DomEvent {
    fn lifecycle(event_type: DomEventType, interface: EventInterface, bubbles: bool) -> Self {
        Self {
            event_type,
            interface,
            bubbles,
            cancelable: false,
            persisted: false,
            initialized: true,
            default_prevented: false,
            propagation_stopped: false,
        }
    }

    pub fn ready_state_change() -> Self {
        Self::lifecycle(DomEventType::ReadyStateChange, EventInterface::Event, false)
    }

    pub fn content_loaded() -> Self {
        Self::lifecycle(DomEventType::DOMContentLoaded, EventInterface::Event, true)
    }

    pub fn load() -> Self {
        Self::lifecycle(DomEventType::Load, EventInterface::Event, false)
    }

    pub fn page_show(persisted: bool) -> Self {
        let mut event = Self::lifecycle(DomEventType::PageShow, EventInterface::PageTransitionEvent, false);
        event.persisted = persisted;
        event
    }

    /// Blank event of the given interface, waiting for `init_event`
    pub fn uninitialized(interface: EventInterface) -> Self {
        Self {
            initialized: false,
            ..Self::lifecycle(DomEventType::Uninitialized, interface, false)
        }
    }

    /// Legacy `initEvent`
    pub fn init_event(&mut self, event_type: DomEventType, bubbles: bool, cancelable: bool) {
        self.event_type = event_type;
        self.bubbles = bubbles;
        self.cancelable = cancelable;
        self.initialized = true;
        self.default_prevented = false;
        self.propagation_stopped = false;
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Prevent default action
    pub fn prevent_default(&mut self) {
        if self.cancelable {
            self.default_prevented = true;
        }
    }

    /// Stop propagation
    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }

    pub fn is_propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }
}

/// Receives the events a document fires on itself.
/// Returns `false` when the default action was prevented.
pub trait EventDispatcher {
    fn dispatch_event(&mut self, document: &Document, event: &DomEvent) -> bool;
}

impl Document {
    /// Install the dispatcher that receives document events
    pub fn set_event_dispatcher<D>(&mut self, dispatcher: D)
    where
        D: EventDispatcher + 'static,
    {
        self.dispatcher = Some(Box::new(dispatcher));
    }

    /// Fire `event` at the document. Without a dispatcher nothing listens
    /// and the default action proceeds.
    pub fn dispatch_event(&mut self, event: &DomEvent) -> bool {
        tracing::debug!(event = event.event_type.as_str(), "dispatching document event");
        // Taken out for the call so the dispatcher can read the document
        let Some(mut dispatcher) = self.dispatcher.take() else {
            return true;
        };
        let result = dispatcher.dispatch_event(self, event);
        if self.dispatcher.is_none() {
            self.dispatcher = Some(dispatcher);
        }
        result
    }

    /// Legacy `createEvent`
    pub fn create_event(&self, interface: &str) -> DomResult<DomEvent> {
        EventInterface::from_name(interface)
            .map(DomEvent::uninitialized)
            .ok_or(DomError::NotSupported)
    }
}
