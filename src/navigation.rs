//! This file defines the templates and a convenience function for creating the navigation bar.

use maud::{Markup, html};

use crate::{dashboard::THEME_TOGGLE_ID, endpoints};

/// Template for a link in the navigation bar.
///
/// It will change appearance if `is_current` is set to
/// `true`. Only one link should be set as active at any one time.
#[derive(Clone)]
struct Link<'a> {
    url: &'a str,
    title: &'a str,
    is_current: bool,
}

impl Link<'_> {
    fn into_html(self) -> Markup {
        let style = if self.is_current {
            "nav-link nav-link-current"
        } else {
            "nav-link"
        };

        html!( a href=(self.url) class=(style) aria-current=[self.is_current.then_some("page")] { (self.title) } )
    }
}

pub struct NavBar<'a> {
    links: Vec<Link<'a>>,
    account_links: Vec<Link<'a>>,
}

impl NavBar<'_> {
    /// Get the navigation bar.
    ///
    /// If a link matches `active_endpoint`, then that link will be
    /// marked as active and displayed differently in the HTML.
    pub fn new(active_endpoint: &str) -> NavBar<'_> {
        let links = vec![Link {
            url: endpoints::DASHBOARD_VIEW,
            title: "Dashboard",
            is_current: active_endpoint == endpoints::DASHBOARD_VIEW,
        }];

        let account_links = vec![Link {
            url: endpoints::DASHBOARD_API,
            title: "Export data (JSON)",
            is_current: false,
        }];

        NavBar {
            links,
            account_links,
        }
    }

    /// Renders the bar with the account dropdown and the theme toggle.
    ///
    /// The dropdown menu must directly follow its trigger, the page script
    /// opens the trigger's next sibling.
    pub fn into_html(self) -> Markup {
        html!(
            nav class="navbar"
            {
                a href=(endpoints::ROOT) class="brand" { "Spendboard" }

                ul class="nav-links"
                {
                    @for link in self.links {
                        li { (link.into_html()) }
                    }
                }

                div class="nav-actions"
                {
                    label class="theme-toggle" for=(THEME_TOGGLE_ID)
                    {
                        input type="checkbox" id=(THEME_TOGGLE_ID) aria-label="Dark theme";
                        span class="theme-toggle-slider" {}
                    }

                    div class="account"
                    {
                        a href="#" class="dropdown-trigger" aria-haspopup="true" { "Account" }
                        ul class="dropdown"
                        {
                            @for link in self.account_links {
                                li { (link.into_html()) }
                            }
                        }
                    }
                }
            }
        )
    }
}

#[cfg(test)]
mod nav_bar_tests {
    use scraper::{Html, Selector};

    use crate::{endpoints, navigation::NavBar};

    #[test]
    fn set_active_endpoint() {
        let cases = [(endpoints::DASHBOARD_VIEW, true), (endpoints::ROOT, false)];

        for (endpoint, want_active) in cases {
            let html = NavBar::new(endpoint).into_html().into_string();
            let html = Html::parse_fragment(&html);
            let selector = Selector::parse("a.nav-link-current").unwrap();

            assert_eq!(
                html.select(&selector).next().is_some(),
                want_active,
                "unexpected active link for {endpoint}"
            );
        }
    }

    #[test]
    fn dropdown_follows_its_trigger() {
        let html = NavBar::new(endpoints::DASHBOARD_VIEW)
            .into_html()
            .into_string();
        let html = Html::parse_fragment(&html);
        let selector = Selector::parse(".dropdown-trigger + .dropdown").unwrap();

        assert!(html.select(&selector).next().is_some());
    }

    #[test]
    fn has_theme_toggle_checkbox() {
        let html = NavBar::new(endpoints::DASHBOARD_VIEW)
            .into_html()
            .into_string();
        let html = Html::parse_fragment(&html);
        let selector = Selector::parse("input#theme-toggle-checkbox[type=checkbox]").unwrap();

        assert!(html.select(&selector).next().is_some());
    }
}
