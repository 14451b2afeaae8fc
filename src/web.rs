//! The browser host, available when compiled to WebAssembly.
//!
//! [BrowserContext] implements the rendering context on top of `web-sys`:
//! the page's DOM, ECharts through the global `echarts` object and local
//! storage. Listeners become JavaScript closures and timers become `gloo`
//! timeouts; both call back into [dashboard::handle_event] and
//! [dashboard::run_task].
//!
//! [start] runs when the module is loaded and initializes the dashboard with
//! the data embedded in the page.

use std::{cell::RefCell, io, rc::Rc, time::Duration};

use charming::Chart;
use gloo::timers::callback::Timeout;
use js_sys::{Array, Function, JSON, Object, Reflect};
use serde_json::Value;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use wasm_bindgen::{JsCast, JsValue, closure::Closure, prelude::wasm_bindgen};
use web_sys::{Element, HtmlElement, HtmlInputElement, Storage, Window};

use crate::{
    Error,
    context::{ChartHost, Document, EventTarget, Listener, PreferenceStore, ScheduledTask},
    dashboard::{self, ChartDefaults, DASHBOARD_DATA_ID, DashboardData},
    format::js_number_string,
};

/// The rendering context of the current browser page.
///
/// Cloning is cheap, clones share the page and the chart defaults.
#[derive(Debug, Clone)]
pub struct BrowserContext {
    window: Window,
    document: web_sys::Document,
    chart_defaults: Rc<RefCell<Option<Value>>>,
}

impl BrowserContext {
    /// The context of the page this module runs in, if it runs in a page.
    pub fn new() -> Option<Self> {
        let window = web_sys::window()?;
        let document = window.document()?;

        Some(Self {
            window,
            document,
            chart_defaults: Rc::new(RefCell::new(None)),
        })
    }

    /// Reads the dashboard data embedded in the page.
    ///
    /// Falls back to empty data if the page has none or it is malformed.
    pub fn embedded_data(&self) -> DashboardData {
        let Some(json) = self
            .document
            .get_element_by_id(DASHBOARD_DATA_ID)
            .and_then(|element| element.text_content())
        else {
            tracing::debug!("No #{DASHBOARD_DATA_ID} element on the page.");
            return DashboardData::default();
        };

        DashboardData::from_json(&json)
            .inspect_err(|error| tracing::warn!("Ignoring the embedded data: {error}"))
            .unwrap_or_default()
    }

    fn storage(&self) -> Option<Storage> {
        self.window.local_storage().ok().flatten()
    }

    fn echarts(&self) -> Option<JsValue> {
        Reflect::get(&self.window, &JsValue::from_str("echarts"))
            .ok()
            .filter(|echarts| !echarts.is_undefined() && !echarts.is_null())
    }

    fn class_list_change(&self, element: &Element, change: &str, result: Result<(), JsValue>) {
        if let Err(error) = result {
            tracing::warn!("Could not {change} on {}: {error:?}", element.tag_name());
        }
    }
}

impl Document for BrowserContext {
    type Element = Element;

    fn get_element_by_id(&self, id: &str) -> Option<Element> {
        self.document.get_element_by_id(id)
    }

    fn query_selector(&self, selector: &str) -> Option<Element> {
        self.document.query_selector(selector).ok().flatten()
    }

    fn query_selector_all(&self, selector: &str) -> Vec<Element> {
        let Ok(nodes) = self.document.query_selector_all(selector) else {
            tracing::warn!("Invalid selector {selector:?}");
            return Vec::new();
        };

        (0..nodes.length())
            .filter_map(|index| nodes.item(index))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .collect()
    }

    fn next_element_sibling(&self, element: &Element) -> Option<Element> {
        element.next_element_sibling()
    }

    fn body(&self) -> Option<Element> {
        self.document.body().map(Element::from)
    }

    fn add_class(&mut self, element: &Element, class: &str) {
        let result = element.class_list().add_1(class);
        self.class_list_change(element, &format!("add class {class}"), result);
    }

    fn remove_class(&mut self, element: &Element, class: &str) {
        let result = element.class_list().remove_1(class);
        self.class_list_change(element, &format!("remove class {class}"), result);
    }

    fn toggle_class(&mut self, element: &Element, class: &str) -> bool {
        element.class_list().toggle(class).unwrap_or_else(|error| {
            tracing::warn!("Could not toggle class {class}: {error:?}");
            self.has_class(element, class)
        })
    }

    fn has_class(&self, element: &Element, class: &str) -> bool {
        element.class_list().contains(class)
    }

    fn set_text(&mut self, element: &Element, text: &str) {
        element.set_text_content(Some(text));
    }

    fn set_style(&mut self, element: &Element, property: &str, value: &str) {
        let Some(element) = element.dyn_ref::<HtmlElement>() else {
            return;
        };

        if let Err(error) = element.style().set_property(property, value) {
            tracing::warn!("Could not set {property} to {value}: {error:?}");
        }
    }

    fn set_input_type(&mut self, element: &Element, input_type: &str) {
        if let Some(input) = element.dyn_ref::<HtmlInputElement>() {
            input.set_type(input_type);
        }
    }

    fn input_value(&self, element: &Element) -> String {
        element
            .dyn_ref::<HtmlInputElement>()
            .map(HtmlInputElement::value)
            .unwrap_or_default()
    }

    fn is_checked(&self, element: &Element) -> bool {
        element
            .dyn_ref::<HtmlInputElement>()
            .is_some_and(HtmlInputElement::checked)
    }

    fn set_checked(&mut self, element: &Element, checked: bool) {
        if let Some(input) = element.dyn_ref::<HtmlInputElement>() {
            input.set_checked(checked);
        }
    }

    fn remove(&mut self, element: &Element) {
        element.remove();
    }

    fn css_variable(&self, name: &str) -> String {
        let Some(root) = self.document.document_element() else {
            return String::new();
        };

        self.window
            .get_computed_style(&root)
            .ok()
            .flatten()
            .and_then(|style| style.get_property_value(name).ok())
            .map(|value| value.trim().to_owned())
            .unwrap_or_default()
    }

    fn listen(&mut self, target: EventTarget<Element>, listener: Listener) {
        let context = self.clone();
        let handler_target = target.clone();
        let callback = Closure::<dyn FnMut(web_sys::Event)>::new(move |event: web_sys::Event| {
            let mut context = context.clone();
            let outcome = dashboard::handle_event(&mut context, listener, &handler_target);

            if outcome.prevent_default {
                event.prevent_default();
            }
            if outcome.stop_propagation {
                event.stop_propagation();
            }
        });

        let js_target: &web_sys::EventTarget = match &target {
            EventTarget::Document => self.document.as_ref(),
            EventTarget::Element(element) => element.as_ref(),
        };

        match js_target.add_event_listener_with_callback(
            listener.event().name(),
            callback.as_ref().unchecked_ref(),
        ) {
            // The listener lives as long as the page.
            Ok(()) => callback.forget(),
            Err(error) => tracing::warn!("Could not attach {listener:?}: {error:?}"),
        }
    }

    fn set_timeout(&mut self, delay: Duration, task: ScheduledTask<Element>) {
        let context = self.clone();
        let millis = u32::try_from(delay.as_millis()).unwrap_or(u32::MAX);

        Timeout::new(millis, move || {
            let mut context = context;
            dashboard::run_task(&mut context, task);
        })
        .forget();
    }
}

impl ChartHost for BrowserContext {
    fn is_available(&self) -> bool {
        self.echarts().is_some()
    }

    fn apply_defaults(&mut self, defaults: &ChartDefaults) {
        self.chart_defaults.replace(Some(defaults.echarts_option()));
    }

    fn mount(&mut self, element_id: &str, chart: Chart) -> Result<(), Error> {
        let element = self
            .document
            .get_element_by_id(element_id)
            .ok_or_else(|| Error::ChartMount(format!("#{element_id} is not on the page")))?;
        let echarts = self
            .echarts()
            .ok_or_else(|| Error::ChartMount("ECharts is not loaded".to_owned()))?;

        // Formatters are already JavaScript functions in wasm builds of charming.
        let option = serde_wasm_bindgen::to_value(&chart)
            .map_err(|error| Error::ChartMount(error.to_string()))?;

        if let Some(defaults) = self.chart_defaults.borrow().as_ref() {
            let defaults = JSON::parse(&defaults.to_string()).map_err(chart_error)?;
            merge_defaults(&option, &defaults)?;
        }

        let instance = call_method(&echarts, "init", &element)?;
        call_method(&instance, "setOption", &option)?;

        Ok(())
    }
}

impl PreferenceStore for BrowserContext {
    fn get_item(&self, key: &str) -> Option<String> {
        self.storage()?.get_item(key).ok().flatten()
    }

    fn set_item(&mut self, key: &str, value: &str) {
        let Some(storage) = self.storage() else {
            tracing::warn!("Local storage is not available, {key} is not saved.");
            return;
        };

        if let Err(error) = storage.set_item(key, value) {
            tracing::warn!("Could not save {key}: {error:?}");
        }
    }
}

fn chart_error(error: JsValue) -> Error {
    Error::ChartMount(format!("{error:?}"))
}

fn call_method(object: &JsValue, name: &str, argument: &JsValue) -> Result<JsValue, Error> {
    let method: Function = Reflect::get(object, &JsValue::from_str(name))
        .map_err(chart_error)?
        .dyn_into()
        .map_err(chart_error)?;

    method.call1(object, argument).map_err(chart_error)
}

/// Copies every value of `defaults` that `option` does not set itself.
fn merge_defaults(option: &JsValue, defaults: &JsValue) -> Result<(), Error> {
    let Some(defaults) = defaults.dyn_ref::<Object>() else {
        return Ok(());
    };

    for key in Object::keys(defaults).iter() {
        let default = Reflect::get(defaults, &key).map_err(chart_error)?;
        let current = Reflect::get(option, &key).map_err(chart_error)?;

        if current.is_undefined() {
            Reflect::set(option, &key, &default).map_err(chart_error)?;
        } else if is_plain_object(&current) && is_plain_object(&default) {
            merge_defaults(&current, &default)?;
        }
    }

    Ok(())
}

fn is_plain_object(value: &JsValue) -> bool {
    value.is_object() && !Array::is_array(value) && !value.is_function()
}

/// Initializes the dashboard once the module has loaded.
#[wasm_bindgen(start)]
pub fn start() {
    setup_logging();

    let Some(mut context) = BrowserContext::new() else {
        tracing::warn!("Not running in a browser page, nothing to initialize.");
        return;
    };

    let data = context.embedded_data();
    dashboard::initialize(&mut context, &data);
}

/// Updates the progress bar of the budget with `budget_id`.
///
/// Exported so pages can refresh a budget after changing it.
#[wasm_bindgen(js_name = updateBudgetProgress)]
pub fn update_budget_progress(budget_id: JsValue, spent: f64, allocated: f64) {
    let Some(budget_id) = budget_id
        .as_string()
        .or_else(|| budget_id.as_f64().map(js_number_string))
    else {
        tracing::warn!("Budget id {budget_id:?} is neither a string nor a number.");
        return;
    };

    let Some(mut context) = BrowserContext::new() else {
        return;
    };

    if !dashboard::update_budget_progress(&mut context, &budget_id, spent, allocated) {
        tracing::debug!("No progress bar on the page for budget {budget_id}.");
    }
}

fn setup_logging() {
    let console_log = tracing_subscriber::fmt::layer()
        .without_time()
        .with_ansi(false)
        .with_writer(ConsoleWriter::default);

    // A second call, e.g. when the module is loaded twice, keeps the first subscriber.
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::new("info"))
        .with(console_log)
        .try_init();
}

/// Writes formatted log lines to the browser console.
#[derive(Default)]
struct ConsoleWriter {
    buffer: Vec<u8>,
}

impl io::Write for ConsoleWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if !self.buffer.is_empty() {
            let line = String::from_utf8_lossy(&self.buffer);
            web_sys::console::log_1(&JsValue::from_str(line.trim_end()));
            self.buffer.clear();
        }

        Ok(())
    }
}

impl Drop for ConsoleWriter {
    fn drop(&mut self) {
        let _ = io::Write::flush(self);
    }
}
