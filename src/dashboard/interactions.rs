//! Small interactive widgets: date pickers, dropdown menus and message banners.
//!
//! Also home to [handle_event] and [run_task], which hosts call when a
//! listener or timer registered through [Document] fires.

use std::time::Duration;

use crate::{
    context::{Document, EventOutcome, EventTarget, Listener, RenderContext, ScheduledTask},
    dashboard::theme::on_theme_toggled,
};

/// Inputs that show a native date picker while focused.
pub const DATE_PICKER_SELECTOR: &str = ".date-picker";
/// Elements that open the dropdown directly after them.
pub const DROPDOWN_TRIGGER_SELECTOR: &str = ".dropdown-trigger";
/// Dropdown menus that are currently shown.
pub const OPEN_DROPDOWN_SELECTOR: &str = ".dropdown.open";
/// Flash message banners.
pub const MESSAGE_SELECTOR: &str = ".message";

/// The class that shows a dropdown menu.
pub const OPEN_CLASS: &str = "open";
/// The class that starts a message's fade animation.
pub const FADE_OUT_CLASS: &str = "fade-out";

/// How long messages stay on screen before fading.
pub const MESSAGE_DISPLAY_TIME: Duration = Duration::from_secs(5);
/// How long the fade animation takes before a message is removed.
pub const MESSAGE_FADE_TIME: Duration = Duration::from_millis(500);

/// Makes every date picker switch to a date input while focused.
///
/// # Returns
/// The number of listeners attached.
pub fn initialize_date_pickers<D: Document>(document: &mut D) -> usize {
    let pickers = document.query_selector_all(DATE_PICKER_SELECTOR);

    for picker in &pickers {
        document.listen(EventTarget::Element(picker.clone()), Listener::DatePickerFocus);
        document.listen(EventTarget::Element(picker.clone()), Listener::DatePickerBlur);
    }

    pickers.len() * 2
}

/// Makes every dropdown trigger open its menu, and clicks elsewhere close it.
///
/// The document-wide listener is only attached if the page has a trigger.
///
/// # Returns
/// The number of listeners attached.
pub fn initialize_dropdowns<D: Document>(document: &mut D) -> usize {
    let triggers = document.query_selector_all(DROPDOWN_TRIGGER_SELECTOR);
    if triggers.is_empty() {
        return 0;
    }

    for trigger in &triggers {
        document.listen(EventTarget::Element(trigger.clone()), Listener::DropdownToggle);
    }
    document.listen(EventTarget::Document, Listener::DropdownDismiss);

    triggers.len() + 1
}

/// Schedules the fade out of the messages on the page.
///
/// The messages present when the timer fires fade out together after
/// [MESSAGE_DISPLAY_TIME] and are removed [MESSAGE_FADE_TIME] later.
pub fn schedule_message_dismissal<D: Document>(document: &mut D) {
    document.set_timeout(MESSAGE_DISPLAY_TIME, ScheduledTask::FadeOutMessages);
}

/// Runs `listener` for an event on the element or document it was attached to.
pub fn handle_event<C: RenderContext>(
    context: &mut C,
    listener: Listener,
    target: &EventTarget<C::Element>,
) -> EventOutcome {
    match (listener, target) {
        (Listener::DatePickerFocus, EventTarget::Element(picker)) => {
            context.set_input_type(picker, "date");
            EventOutcome::default()
        }
        (Listener::DatePickerBlur, EventTarget::Element(picker)) => {
            if context.input_value(picker).is_empty() {
                context.set_input_type(picker, "text");
            }
            EventOutcome::default()
        }
        (Listener::DropdownToggle, EventTarget::Element(trigger)) => {
            if let Some(dropdown) = context.next_element_sibling(trigger) {
                context.toggle_class(&dropdown, OPEN_CLASS);
            }
            EventOutcome {
                prevent_default: true,
                stop_propagation: true,
            }
        }
        (Listener::DropdownDismiss, _) => {
            for dropdown in context.query_selector_all(OPEN_DROPDOWN_SELECTOR) {
                context.remove_class(&dropdown, OPEN_CLASS);
            }
            EventOutcome::default()
        }
        (Listener::ThemeToggle, EventTarget::Element(toggle)) => {
            on_theme_toggled(context, toggle);
            EventOutcome::default()
        }
        (listener, EventTarget::Document) => {
            tracing::debug!("Ignoring {listener:?} attached to the document.");
            EventOutcome::default()
        }
    }
}

/// Runs a task scheduled with [Document::set_timeout].
pub fn run_task<D: Document>(document: &mut D, task: ScheduledTask<D::Element>) {
    match task {
        ScheduledTask::FadeOutMessages => {
            for message in document.query_selector_all(MESSAGE_SELECTOR) {
                document.add_class(&message, FADE_OUT_CLASS);
                document.set_timeout(MESSAGE_FADE_TIME, ScheduledTask::RemoveMessage(message));
            }
        }
        ScheduledTask::RemoveMessage(message) => document.remove(&message),
    }
}
