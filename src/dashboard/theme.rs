//! The light/dark theme toggle and its persisted preference.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::context::{Document, EventTarget, Listener, PreferenceStore};

/// The local storage key holding the chosen theme.
pub const THEME_KEY: &str = "theme";
/// The class on `<body>` that switches the page to the dark palette.
pub const DARK_THEME_CLASS: &str = "dark-theme";
/// The checkbox that switches between the themes.
pub const THEME_TOGGLE_ID: &str = "theme-toggle-checkbox";

/// The colour scheme of the page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// The default theme.
    #[default]
    Light,
    /// Light text on a dark background.
    Dark,
}

impl Theme {
    /// The value stored under [THEME_KEY].
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    /// The theme matching the state of the toggle.
    pub fn from_checked(checked: bool) -> Self {
        if checked { Theme::Dark } else { Theme::Light }
    }

    /// Interprets a stored preference, anything other than `"dark"` is light.
    pub fn from_stored(value: Option<&str>) -> Self {
        value
            .and_then(|value| value.parse().ok())
            .unwrap_or_default()
    }
}

impl Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown theme name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownTheme(pub String);

impl Display for UnknownTheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown theme \"{}\"", self.0)
    }
}

impl std::error::Error for UnknownTheme {}

impl FromStr for Theme {
    type Err = UnknownTheme;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(UnknownTheme(other.to_owned())),
        }
    }
}

/// Attaches the change listener to the theme toggle and restores the saved theme.
///
/// Does nothing if the page has no toggle.
///
/// # Returns
/// Whether a listener was attached.
pub fn initialize_theme_toggle<C>(context: &mut C) -> bool
where
    C: Document + PreferenceStore,
{
    let Some(toggle) = context.get_element_by_id(THEME_TOGGLE_ID) else {
        return false;
    };

    context.listen(EventTarget::Element(toggle.clone()), Listener::ThemeToggle);

    let saved_theme = Theme::from_stored(context.get_item(THEME_KEY).as_deref());
    if saved_theme == Theme::Dark {
        context.set_checked(&toggle, true);
        apply_theme(context, Theme::Dark);
    }

    true
}

/// Applies and saves the theme chosen with `toggle`.
pub fn on_theme_toggled<C>(context: &mut C, toggle: &C::Element)
where
    C: Document + PreferenceStore,
{
    let theme = Theme::from_checked(context.is_checked(toggle));
    apply_theme(context, theme);
    context.set_item(THEME_KEY, theme.as_str());
}

fn apply_theme<D: Document>(document: &mut D, theme: Theme) {
    let Some(body) = document.body() else {
        return;
    };

    match theme {
        Theme::Dark => document.add_class(&body, DARK_THEME_CLASS),
        Theme::Light => document.remove_class(&body, DARK_THEME_CLASS),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{NodeId, VirtualDocument};

    fn page_with_toggle() -> (VirtualDocument, NodeId) {
        let mut document = VirtualDocument::new();
        let body = document.body_element();
        let toggle = document.append_element(body, "input", Some(THEME_TOGGLE_ID), &[]);
        document.set_input_type(&toggle, "checkbox");
        (document, toggle)
    }

    fn is_dark(document: &VirtualDocument) -> bool {
        document.has_class(&document.body_element(), DARK_THEME_CLASS)
    }

    #[test]
    fn parses_known_themes() {
        assert_eq!("dark".parse::<Theme>(), Ok(Theme::Dark));
        assert_eq!("light".parse::<Theme>(), Ok(Theme::Light));
        assert_eq!(
            "Dark".parse::<Theme>(),
            Err(UnknownTheme("Dark".to_owned()))
        );
    }

    #[test]
    fn unknown_stored_theme_is_light() {
        assert_eq!(Theme::from_stored(Some("dark")), Theme::Dark);
        assert_eq!(Theme::from_stored(Some("solarized")), Theme::Light);
        assert_eq!(Theme::from_stored(None), Theme::Light);
    }

    #[test]
    fn restores_saved_dark_theme() {
        let (mut document, toggle) = page_with_toggle();
        document.set_item(THEME_KEY, "dark");

        assert!(initialize_theme_toggle(&mut document));

        assert!(document.is_checked(&toggle));
        assert!(is_dark(&document));
    }

    #[test]
    fn saved_light_theme_leaves_page_alone() {
        let (mut document, toggle) = page_with_toggle();
        document.set_item(THEME_KEY, "light");

        initialize_theme_toggle(&mut document);

        assert!(!document.is_checked(&toggle));
        assert!(!is_dark(&document));
    }

    #[test]
    fn toggling_persists_the_choice() {
        let (mut document, toggle) = page_with_toggle();
        initialize_theme_toggle(&mut document);

        document.toggle_checkbox(toggle);
        assert!(is_dark(&document));
        assert_eq!(document.get_item(THEME_KEY).as_deref(), Some("dark"));

        document.toggle_checkbox(toggle);
        assert!(!is_dark(&document));
        assert_eq!(document.get_item(THEME_KEY).as_deref(), Some("light"));
    }

    #[test]
    fn missing_toggle_attaches_nothing() {
        let mut document = VirtualDocument::new();
        document.set_item(THEME_KEY, "dark");

        assert!(!initialize_theme_toggle(&mut document));

        assert_eq!(document.listener_count(), 0);
        assert!(!is_dark(&document));
    }
}
