//! The rendering context: the host capabilities the dashboard talks to.
//!
//! The page logic never touches a browser API directly. It works against
//! three small traits so the same code drives the real browser
//! (`crate::web`, wasm only) and the in-memory [crate::dom::VirtualDocument]
//! used by tests:
//!
//! - [Document]: element lookup and mutation, listeners and timers.
//! - [ChartHost]: the charting library.
//! - [PreferenceStore]: persistent key-value storage (browser local storage).
//!
//! Listeners and timers are described with plain enums ([Listener],
//! [ScheduledTask]) instead of closures. The host remembers them and, when
//! the event or timer fires, hands them back to
//! [crate::dashboard::handle_event] or [crate::dashboard::run_task].

use std::time::Duration;

use charming::Chart;

use crate::{Error, dashboard::ChartDefaults};

/// Element lookup and mutation on the host page.
///
/// Selectors are limited to what the dashboard needs: `#id`, `.class`,
/// compound class selectors such as `.dropdown.open` and a descendant
/// combinator between two of those, e.g. `#budget-7 .progress-bar`.
/// Anything else (attribute, pseudo-class or child selectors) is not
/// supported and hosts may treat it as matching nothing.
pub trait Document {
    /// A handle to an element on the page.
    type Element: Clone;

    /// Finds the element with the given `id` attribute.
    fn get_element_by_id(&self, id: &str) -> Option<Self::Element>;

    /// Finds the first element matching `selector` in document order.
    fn query_selector(&self, selector: &str) -> Option<Self::Element>;

    /// Finds every element matching `selector` in document order.
    fn query_selector_all(&self, selector: &str) -> Vec<Self::Element>;

    /// The element that immediately follows `element` under the same parent.
    fn next_element_sibling(&self, element: &Self::Element) -> Option<Self::Element>;

    /// The `<body>` element, if the page has one.
    fn body(&self) -> Option<Self::Element>;

    /// Adds `class` to the element's class list.
    fn add_class(&mut self, element: &Self::Element, class: &str);

    /// Removes `class` from the element's class list.
    fn remove_class(&mut self, element: &Self::Element, class: &str);

    /// Adds `class` if absent and removes it if present.
    ///
    /// Returns whether the class is present afterwards.
    fn toggle_class(&mut self, element: &Self::Element, class: &str) -> bool;

    /// Whether the element's class list contains `class`.
    fn has_class(&self, element: &Self::Element, class: &str) -> bool;

    /// Replaces the text content of the element.
    fn set_text(&mut self, element: &Self::Element, text: &str);

    /// Sets an inline style property, e.g. `("width", "50%")`.
    fn set_style(&mut self, element: &Self::Element, property: &str, value: &str);

    /// Sets the `type` of an input element.
    fn set_input_type(&mut self, element: &Self::Element, input_type: &str);

    /// The current value of an input element (empty for other elements).
    fn input_value(&self, element: &Self::Element) -> String;

    /// Whether a checkbox input is checked.
    fn is_checked(&self, element: &Self::Element) -> bool;

    /// Checks or unchecks a checkbox input.
    fn set_checked(&mut self, element: &Self::Element, checked: bool);

    /// Detaches the element from the page.
    fn remove(&mut self, element: &Self::Element);

    /// Reads a CSS custom property from the document root, trimmed.
    ///
    /// Returns an empty string when the property is not defined.
    fn css_variable(&self, name: &str) -> String;

    /// Registers `listener` for its event on `target`.
    fn listen(&mut self, target: EventTarget<Self::Element>, listener: Listener);

    /// Runs `task` once after `delay`.
    fn set_timeout(&mut self, delay: Duration, task: ScheduledTask<Self::Element>);
}

/// The charting library provided by the host.
pub trait ChartHost {
    /// Whether the charting library is loaded on the page.
    fn is_available(&self) -> bool;

    /// Sets the visual defaults shared by every chart mounted afterwards.
    fn apply_defaults(&mut self, defaults: &ChartDefaults);

    /// Creates a chart inside the element with `element_id`.
    ///
    /// # Errors
    /// Returns [Error::ChartMount] if the host could not create the chart.
    fn mount(&mut self, element_id: &str, chart: Chart) -> Result<(), Error>;
}

/// Persistent string storage that outlives the page.
pub trait PreferenceStore {
    /// Reads the value stored under `key`.
    fn get_item(&self, key: &str) -> Option<String>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set_item(&mut self, key: &str, value: &str);
}

/// Everything the dashboard needs from its host.
pub trait RenderContext: Document + ChartHost + PreferenceStore {}

impl<T: Document + ChartHost + PreferenceStore> RenderContext for T {}

/// Where a listener is attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventTarget<E> {
    /// The whole document, receives events that bubble up from any element.
    Document,
    /// A single element.
    Element(E),
}

/// The browser events the dashboard listens for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// A mouse click or tap.
    Click,
    /// An input gaining focus.
    Focus,
    /// An input losing focus.
    Blur,
    /// A checkbox changing state.
    Change,
}

impl EventKind {
    /// The DOM event name, e.g. `"click"`.
    pub fn name(self) -> &'static str {
        match self {
            EventKind::Click => "click",
            EventKind::Focus => "focus",
            EventKind::Blur => "blur",
            EventKind::Change => "change",
        }
    }
}

/// The behaviours that can be attached to the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Listener {
    /// Switch a date picker to a native date input.
    DatePickerFocus,
    /// Switch an empty date picker back to a text input.
    DatePickerBlur,
    /// Open or close the dropdown following the trigger.
    DropdownToggle,
    /// Close every open dropdown.
    DropdownDismiss,
    /// Apply and persist the theme chosen with the toggle.
    ThemeToggle,
}

impl Listener {
    /// The event this listener reacts to.
    pub fn event(self) -> EventKind {
        match self {
            Listener::DatePickerFocus => EventKind::Focus,
            Listener::DatePickerBlur => EventKind::Blur,
            Listener::DropdownToggle | Listener::DropdownDismiss => EventKind::Click,
            Listener::ThemeToggle => EventKind::Change,
        }
    }
}

/// What a listener asks the host to do with the event after it ran.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventOutcome {
    /// Cancel the browser's default action.
    pub prevent_default: bool,
    /// Stop the event from reaching listeners further up the page.
    pub stop_propagation: bool,
}

/// Deferred work scheduled with [Document::set_timeout].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduledTask<E> {
    /// Start fading out every message banner on the page.
    FadeOutMessages,
    /// Remove a faded message banner.
    RemoveMessage(E),
}
