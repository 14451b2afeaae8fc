//! An in-memory page that implements the rendering context.
//!
//! [VirtualDocument] is a small element tree with class lists, inline
//! styles, input state, local storage, a virtual clock and a recording chart
//! host. It lets the dashboard's page logic run without a browser: events are
//! dispatched with [VirtualDocument::click] and friends, and timers fire when
//! the clock is moved with [VirtualDocument::advance].

use std::{
    collections::{BTreeMap, HashMap, HashSet},
    time::Duration,
};

use charming::Chart;

use crate::{
    Error,
    context::{
        ChartHost, Document, EventKind, EventOutcome, EventTarget, Listener, PreferenceStore,
        ScheduledTask,
    },
    dashboard::{ChartDefaults, Palette, handle_event, run_task},
};

/// A handle to an element of a [VirtualDocument].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Default)]
struct Node {
    tag: String,
    id: Option<String>,
    classes: Vec<String>,
    styles: BTreeMap<String, String>,
    text: String,
    input_type: String,
    value: String,
    checked: bool,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

#[derive(Debug)]
struct Timer {
    due: Duration,
    sequence: u64,
    task: ScheduledTask<NodeId>,
}

/// An element tree with everything the dashboard expects from a browser.
#[derive(Debug)]
pub struct VirtualDocument {
    nodes: Vec<Node>,
    root: NodeId,
    css_variables: HashMap<String, String>,
    listeners: Vec<(EventTarget<NodeId>, Listener)>,
    now: Duration,
    timers: Vec<Timer>,
    timer_sequence: u64,
    storage: HashMap<String, String>,
    chart_library_available: bool,
    chart_defaults: Option<ChartDefaults>,
    charts: Vec<(String, String)>,
    failing_charts: HashSet<String>,
}

impl Default for VirtualDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl VirtualDocument {
    /// Creates a page with an empty `<body>` and a loaded charting library.
    pub fn new() -> Self {
        let mut document = Self::with_root("html");
        document.append_element(document.root, "body", None, &[]);
        document
    }

    fn with_root(tag: &str) -> Self {
        Self {
            nodes: vec![Node {
                tag: tag.to_owned(),
                ..Default::default()
            }],
            root: NodeId(0),
            css_variables: HashMap::new(),
            listeners: Vec::new(),
            now: Duration::ZERO,
            timers: Vec::new(),
            timer_sequence: 0,
            storage: HashMap::new(),
            chart_library_available: true,
            chart_defaults: None,
            charts: Vec::new(),
            failing_charts: HashSet::new(),
        }
    }

    /// The `<body>` element, or the root element for markup without a body.
    pub fn body_element(&self) -> NodeId {
        self.body().unwrap_or(self.root)
    }

    /// Appends a new element as the last child of `parent`.
    pub fn append_element(
        &mut self,
        parent: NodeId,
        tag: &str,
        id: Option<&str>,
        classes: &[&str],
    ) -> NodeId {
        let node_id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            tag: tag.to_owned(),
            id: id.map(str::to_owned),
            classes: classes.iter().map(|class| (*class).to_owned()).collect(),
            input_type: if tag == "input" { "text" } else { "" }.to_owned(),
            parent: Some(parent),
            ..Default::default()
        });
        self.nodes[parent.0].children.push(node_id);
        node_id
    }

    /// Sets a CSS custom property on the document root.
    pub fn set_css_variable(&mut self, name: &str, value: &str) {
        self.css_variables.insert(name.to_owned(), value.to_owned());
    }

    /// Sets the CSS custom properties the charts read their colours from.
    pub fn set_palette(&mut self, palette: &Palette) {
        for (name, value) in palette.css_variables() {
            self.set_css_variable(name, value);
        }
    }

    /// Sets the value of an input element as if the user typed it.
    pub fn set_value(&mut self, element: NodeId, value: &str) {
        self.nodes[element.0].value = value.to_owned();
    }

    /// An inline style property of the element.
    pub fn style(&self, element: NodeId, property: &str) -> Option<String> {
        self.nodes[element.0].styles.get(property).cloned()
    }

    /// The text content of the element and its descendants.
    pub fn text(&self, element: NodeId) -> String {
        let node = &self.nodes[element.0];
        let mut text = node.text.clone();
        for &child in &node.children {
            text.push_str(&self.text(child));
        }
        text
    }

    /// The `type` of an input element.
    pub fn input_type(&self, element: NodeId) -> &str {
        &self.nodes[element.0].input_type
    }

    /// Whether the element is still attached to the page.
    pub fn is_attached(&self, element: NodeId) -> bool {
        let mut current = element;
        loop {
            if current == self.root {
                return true;
            }
            match self.nodes[current.0].parent {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    /// The number of listeners attached to the page.
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// The listeners attached directly to `target`.
    pub fn listeners_on(&self, target: &EventTarget<NodeId>) -> Vec<Listener> {
        self.listeners
            .iter()
            .filter(|(attached_to, _)| attached_to == target)
            .map(|(_, listener)| *listener)
            .collect()
    }

    /// The number of timers that have not fired yet.
    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Removes the charting library from the page.
    pub fn set_chart_library_available(&mut self, available: bool) {
        self.chart_library_available = available;
    }

    /// Makes mounting a chart into `element_id` fail.
    pub fn fail_chart_mount(&mut self, element_id: &str) {
        self.failing_charts.insert(element_id.to_owned());
    }

    /// The defaults the charting library was configured with.
    pub fn chart_defaults(&self) -> Option<&ChartDefaults> {
        self.chart_defaults.as_ref()
    }

    /// The ids of the elements that received a chart, in mount order.
    pub fn mounted_chart_ids(&self) -> Vec<&str> {
        self.charts.iter().map(|(id, _)| id.as_str()).collect()
    }

    /// The ECharts option of the chart mounted into `element_id`.
    pub fn mounted_chart(&self, element_id: &str) -> Option<&str> {
        self.charts
            .iter()
            .find(|(id, _)| id == element_id)
            .map(|(_, options)| options.as_str())
    }

    /// Clicks `element`.
    pub fn click(&mut self, element: NodeId) -> EventOutcome {
        self.dispatch(EventKind::Click, element)
    }

    /// Moves the focus into `element`.
    pub fn focus(&mut self, element: NodeId) -> EventOutcome {
        self.dispatch(EventKind::Focus, element)
    }

    /// Moves the focus out of `element`.
    pub fn blur(&mut self, element: NodeId) -> EventOutcome {
        self.dispatch(EventKind::Blur, element)
    }

    /// Flips a checkbox and fires its change event.
    pub fn toggle_checkbox(&mut self, element: NodeId) -> EventOutcome {
        let checked = self.nodes[element.0].checked;
        self.nodes[element.0].checked = !checked;
        self.dispatch(EventKind::Change, element)
    }

    /// Fires `kind` at `element`.
    ///
    /// Listeners on the element run first, then those on its ancestors and
    /// finally those on the document, unless one of them stops propagation.
    /// Focus and blur events do not bubble.
    pub fn dispatch(&mut self, kind: EventKind, element: NodeId) -> EventOutcome {
        let bubbles = !matches!(kind, EventKind::Focus | EventKind::Blur);
        let mut outcome = EventOutcome::default();

        let mut path = vec![EventTarget::Element(element)];
        if bubbles {
            let mut current = self.nodes[element.0].parent;
            while let Some(node) = current {
                path.push(EventTarget::Element(node));
                current = self.nodes[node.0].parent;
            }
            if self.is_attached(element) {
                path.push(EventTarget::Document);
            }
        }

        for target in path {
            let listeners: Vec<Listener> = self
                .listeners_on(&target)
                .into_iter()
                .filter(|listener| listener.event() == kind)
                .collect();

            for listener in listeners {
                let result = handle_event(self, listener, &target);
                outcome.prevent_default |= result.prevent_default;
                outcome.stop_propagation |= result.stop_propagation;
            }

            if outcome.stop_propagation {
                break;
            }
        }

        outcome
    }

    /// Moves the clock forward, running every timer that falls due on the way.
    pub fn advance(&mut self, by: Duration) {
        let until = self.now + by;

        while let Some(index) = self.next_due_timer(until) {
            let timer = self.timers.remove(index);
            self.now = timer.due;
            run_task(self, timer.task);
        }

        self.now = until;
    }

    fn next_due_timer(&self, until: Duration) -> Option<usize> {
        self.timers
            .iter()
            .enumerate()
            .filter(|(_, timer)| timer.due <= until)
            .min_by_key(|(_, timer)| (timer.due, timer.sequence))
            .map(|(index, _)| index)
    }

    /// Every attached element in document order.
    fn elements(&self) -> Vec<NodeId> {
        let mut elements = Vec::new();
        let mut stack = vec![self.root];

        while let Some(node) = stack.pop() {
            elements.push(node);
            stack.extend(self.nodes[node.0].children.iter().rev());
        }

        elements
    }

    /// Matches the selector subset described on [Document]: tags, `#id` and
    /// `.class` compounds joined by descendant combinators. The dashboard
    /// needs nothing more, so other syntax is rejected by [supported_selector]
    /// rather than half matched.
    fn matches(&self, element: NodeId, selector: &str) -> bool {
        let mut compounds = selector.split_whitespace().rev();
        let Some(last) = compounds.next() else {
            return false;
        };

        if !self.matches_compound(element, last) {
            return false;
        }

        // Descendant combinators only, so matching each ancestor greedily is enough.
        let mut ancestor = self.nodes[element.0].parent;
        for compound in compounds {
            loop {
                let Some(node) = ancestor else {
                    return false;
                };
                ancestor = self.nodes[node.0].parent;
                if self.matches_compound(node, compound) {
                    break;
                }
            }
        }

        true
    }

    fn matches_compound(&self, element: NodeId, compound: &str) -> bool {
        let node = &self.nodes[element.0];
        let tag_end = compound.find(['#', '.']).unwrap_or(compound.len());
        let (tag, mut rest) = compound.split_at(tag_end);

        if !tag.is_empty() && tag != node.tag {
            return false;
        }

        while !rest.is_empty() {
            let (prefix, remainder) = rest.split_at(1);
            let end = remainder.find(['#', '.']).unwrap_or(remainder.len());
            let (name, next) = remainder.split_at(end);

            let matched = match prefix {
                "#" => node.id.as_deref() == Some(name),
                _ => node.classes.iter().any(|class| class == name),
            };
            if !matched {
                return false;
            }

            rest = next;
        }

        true
    }

    fn detach(&mut self, element: NodeId) {
        if let Some(parent) = self.nodes[element.0].parent.take() {
            self.nodes[parent.0].children.retain(|&child| child != element);
        }
    }
}

impl Document for VirtualDocument {
    type Element = NodeId;

    fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.elements()
            .into_iter()
            .find(|node| self.nodes[node.0].id.as_deref() == Some(id))
    }

    fn query_selector(&self, selector: &str) -> Option<NodeId> {
        if !supported_selector(selector) {
            return None;
        }

        self.elements()
            .into_iter()
            .find(|&node| self.matches(node, selector))
    }

    fn query_selector_all(&self, selector: &str) -> Vec<NodeId> {
        if !supported_selector(selector) {
            return Vec::new();
        }

        self.elements()
            .into_iter()
            .filter(|&node| self.matches(node, selector))
            .collect()
    }

    fn next_element_sibling(&self, element: &NodeId) -> Option<NodeId> {
        let parent = self.nodes[element.0].parent?;
        let siblings = &self.nodes[parent.0].children;
        let position = siblings.iter().position(|child| child == element)?;
        siblings.get(position + 1).copied()
    }

    fn body(&self) -> Option<NodeId> {
        self.elements()
            .into_iter()
            .find(|node| self.nodes[node.0].tag == "body")
    }

    fn add_class(&mut self, element: &NodeId, class: &str) {
        let classes = &mut self.nodes[element.0].classes;
        if !classes.iter().any(|existing| existing == class) {
            classes.push(class.to_owned());
        }
    }

    fn remove_class(&mut self, element: &NodeId, class: &str) {
        self.nodes[element.0]
            .classes
            .retain(|existing| existing != class);
    }

    fn toggle_class(&mut self, element: &NodeId, class: &str) -> bool {
        if self.has_class(element, class) {
            self.remove_class(element, class);
            false
        } else {
            self.add_class(element, class);
            true
        }
    }

    fn has_class(&self, element: &NodeId, class: &str) -> bool {
        self.nodes[element.0]
            .classes
            .iter()
            .any(|existing| existing == class)
    }

    fn set_text(&mut self, element: &NodeId, text: &str) {
        let children = std::mem::take(&mut self.nodes[element.0].children);
        for child in children {
            self.nodes[child.0].parent = None;
        }
        self.nodes[element.0].text = text.to_owned();
    }

    fn set_style(&mut self, element: &NodeId, property: &str, value: &str) {
        self.nodes[element.0]
            .styles
            .insert(property.to_owned(), value.to_owned());
    }

    fn set_input_type(&mut self, element: &NodeId, input_type: &str) {
        self.nodes[element.0].input_type = input_type.to_owned();
    }

    fn input_value(&self, element: &NodeId) -> String {
        self.nodes[element.0].value.clone()
    }

    fn is_checked(&self, element: &NodeId) -> bool {
        self.nodes[element.0].checked
    }

    fn set_checked(&mut self, element: &NodeId, checked: bool) {
        self.nodes[element.0].checked = checked;
    }

    fn remove(&mut self, element: &NodeId) {
        self.detach(*element);
    }

    fn css_variable(&self, name: &str) -> String {
        self.css_variables
            .get(name)
            .map(|value| value.trim().to_owned())
            .unwrap_or_default()
    }

    fn listen(&mut self, target: EventTarget<NodeId>, listener: Listener) {
        self.listeners.push((target, listener));
    }

    fn set_timeout(&mut self, delay: Duration, task: ScheduledTask<NodeId>) {
        self.timer_sequence += 1;
        self.timers.push(Timer {
            due: self.now + delay,
            sequence: self.timer_sequence,
            task,
        });
    }
}

impl ChartHost for VirtualDocument {
    fn is_available(&self) -> bool {
        self.chart_library_available
    }

    fn apply_defaults(&mut self, defaults: &ChartDefaults) {
        self.chart_defaults = Some(defaults.clone());
    }

    fn mount(&mut self, element_id: &str, chart: Chart) -> Result<(), Error> {
        if self.failing_charts.contains(element_id) {
            return Err(Error::ChartMount(format!(
                "the chart library rejected #{element_id}"
            )));
        }

        if self.get_element_by_id(element_id).is_none() {
            return Err(Error::ChartMount(format!("#{element_id} is not on the page")));
        }

        self.charts.push((element_id.to_owned(), chart.to_string()));
        Ok(())
    }
}

impl PreferenceStore for VirtualDocument {
    fn get_item(&self, key: &str) -> Option<String> {
        self.storage.get(key).cloned()
    }

    fn set_item(&mut self, key: &str, value: &str) {
        self.storage.insert(key.to_owned(), value.to_owned());
    }
}

#[cfg(test)]
impl VirtualDocument {
    /// Builds a page from server-rendered markup.
    ///
    /// Element ids, classes, inline styles, input state, text and the CSS
    /// custom properties declared in `<style>` elements are carried over.
    pub fn from_html(html: &str) -> Self {
        let html = scraper::Html::parse_document(html);
        let root = html.root_element();
        let mut document = Self::with_root(root.value().name());
        document.copy_children(root, NodeId(0));
        document
    }

    fn copy_children(&mut self, source: scraper::ElementRef, parent: NodeId) {
        for child in source.children() {
            if let Some(text) = child.value().as_text() {
                self.nodes[parent.0].text.push_str(text);
                continue;
            }

            let Some(element) = scraper::ElementRef::wrap(child) else {
                continue;
            };
            let value = element.value();
            let classes: Vec<&str> = value.classes().collect();
            let node = self.append_element(parent, value.name(), value.id(), &classes);

            if let Some(input_type) = value.attr("type") {
                self.nodes[node.0].input_type = input_type.to_owned();
            }
            if let Some(input_value) = value.attr("value") {
                self.nodes[node.0].value = input_value.to_owned();
            }
            self.nodes[node.0].checked = value.attr("checked").is_some();

            for (property, style) in declarations(value.attr("style").unwrap_or_default()) {
                self.nodes[node.0].styles.insert(property, style);
            }

            if value.name() == "style" {
                let css: String = element.text().collect();
                for (name, variable) in declarations(&css) {
                    if name.starts_with("--") {
                        self.css_variables.insert(name, variable);
                    }
                }
            }

            self.copy_children(element, node);
        }
    }
}

/// Whether `selector` only uses syntax [VirtualDocument] understands.
///
/// Attribute selectors, pseudo-classes and the `>`, `+` and `~` combinators
/// are not supported. They match nothing and log a warning.
fn supported_selector(selector: &str) -> bool {
    let supported = !selector.trim().is_empty()
        && selector.chars().all(|c| {
            c.is_ascii_alphanumeric() || c.is_whitespace() || matches!(c, '-' | '_' | '#' | '.')
        });

    if !supported {
        tracing::warn!("Unsupported selector {selector:?} matches nothing.");
    }

    supported
}

/// Splits CSS such as `a: b; c: d` into property-value pairs.
#[cfg(test)]
fn declarations(css: &str) -> Vec<(String, String)> {
    css.split([';', '{', '}'])
        .filter_map(|declaration| declaration.split_once(':'))
        .map(|(property, value)| (property.trim().to_owned(), value.trim().to_owned()))
        .filter(|(property, _)| !property.is_empty() && !property.contains(' '))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_selectors_match_nothing() {
        let mut document = VirtualDocument::new();
        let body = document.body_element();
        let trigger = document.append_element(body, "a", None, &["dropdown-trigger"]);
        document.append_element(body, "ul", None, &["dropdown"]);
        document.set_input_type(&trigger, "checkbox");

        for selector in [
            ".dropdown-trigger + .dropdown",
            "body > ul",
            "a[type=checkbox]",
            "a:hover",
            "",
        ] {
            assert_eq!(document.query_selector(selector), None, "{selector:?}");
            assert!(document.query_selector_all(selector).is_empty(), "{selector:?}");
        }
        assert_eq!(document.query_selector("body .dropdown-trigger"), Some(trigger));
    }

    #[test]
    fn selects_by_id_class_and_descendant() {
        let mut document = VirtualDocument::new();
        let body = document.body_element();
        let card = document.append_element(body, "div", Some("budget-1"), &["card"]);
        let bar = document.append_element(card, "div", None, &["progress-bar", "wide"]);
        let other = document.append_element(body, "div", None, &["progress-bar"]);

        assert_eq!(document.get_element_by_id("budget-1"), Some(card));
        assert_eq!(document.query_selector("#budget-1 .progress-bar"), Some(bar));
        assert_eq!(document.query_selector("body .progress-bar.wide"), Some(bar));
        assert_eq!(document.query_selector_all(".progress-bar"), vec![bar, other]);
        assert_eq!(document.query_selector("#budget-2 .progress-bar"), None);
    }

    #[test]
    fn removed_elements_are_no_longer_found() {
        let mut document = VirtualDocument::new();
        let body = document.body_element();
        let message = document.append_element(body, "div", None, &["message"]);

        document.remove(&message);

        assert!(!document.is_attached(message));
        assert!(document.query_selector(".message").is_none());
    }

    #[test]
    fn next_sibling_is_the_following_element() {
        let mut document = VirtualDocument::new();
        let body = document.body_element();
        let first = document.append_element(body, "a", None, &[]);
        let second = document.append_element(body, "ul", None, &[]);

        assert_eq!(document.next_element_sibling(&first), Some(second));
        assert_eq!(document.next_element_sibling(&second), None);
    }

    #[test]
    fn timers_fire_in_order_when_due() {
        let mut document = VirtualDocument::new();
        let body = document.body_element();
        document.append_element(body, "div", None, &["message"]);
        document.set_timeout(Duration::from_secs(5), ScheduledTask::FadeOutMessages);

        document.advance(Duration::from_millis(4999));
        assert_eq!(document.pending_timers(), 1);

        document.advance(Duration::from_millis(1));
        assert_eq!(document.pending_timers(), 1, "removal should be scheduled");
    }

    #[test]
    fn parses_server_markup() {
        let mut document = VirtualDocument::from_html(
            r#"<!DOCTYPE html>
            <html>
              <head><style>:root { --text-light: #123456; --primary-color: red; }</style></head>
              <body>
                <div id="budget-1"><div class="progress-bar" style="width: 40%"></div></div>
                <input class="date-picker" type="text" value="2024-01-01">
                <input id="toggle" type="checkbox" checked>
              </body>
            </html>"#,
        );

        let bar = document.query_selector("#budget-1 .progress-bar").unwrap();
        assert_eq!(document.style(bar, "width").as_deref(), Some("40%"));
        assert_eq!(document.css_variable("--text-light"), "#123456");
        assert_eq!(document.css_variable("--secondary-color"), "");

        let picker = document.query_selector(".date-picker").unwrap();
        assert_eq!(document.input_type(picker), "text");
        assert_eq!(document.input_value(&picker), "2024-01-01");

        let toggle = document.get_element_by_id("toggle").unwrap();
        assert!(document.is_checked(&toggle));
        document.set_checked(&toggle, false);
        assert!(!document.is_checked(&toggle));
    }

    #[test]
    fn storage_keeps_the_last_value() {
        let mut document = VirtualDocument::new();

        document.set_item("theme", "dark");
        document.set_item("theme", "light");

        assert_eq!(document.get_item("theme").as_deref(), Some("light"));
        assert_eq!(document.get_item("missing"), None);
    }
}
