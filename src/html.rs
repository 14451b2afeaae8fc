//! Page layout shared by every server-rendered page.

use maud::{DOCTYPE, Markup, PreEscaped, html};

use crate::{dashboard::Palette, endpoints};

/// The stylesheet with the dashboard's styles, including the dark theme.
pub const STYLESHEET: &str = "/static/dashboard.css";
/// The charting library loaded on pages with charts.
pub const ECHARTS_SCRIPT: &str = "/static/echarts.min.js";
/// The JavaScript glue generated for the page's WebAssembly module.
pub const WASM_SCRIPT: &str = "/static/pkg/spendboard.js";

pub enum HeadElement {
    /// The file path or URL to a JavaScript script.
    ScriptLink(String),
    /// JavaScript module source code.
    ModuleSource(PreEscaped<String>),
    Style(PreEscaped<String>),
}

/// Publishes the palette as CSS custom properties on the document root.
///
/// A colour that could end the declaration or the `<style>` element is
/// replaced with the default colour.
pub fn palette_style(palette: &Palette) -> HeadElement {
    let defaults = Palette::default();
    let declarations: String = palette
        .css_variables()
        .iter()
        .zip(defaults.css_variables())
        .map(|(&(name, value), (_, default))| {
            if is_safe_css_value(value) {
                format!("{name}: {value}; ")
            } else {
                tracing::warn!("Ignoring unsafe value {value:?} for {name}, using {default}.");
                format!("{name}: {default}; ")
            }
        })
        .collect();

    HeadElement::Style(PreEscaped(format!(":root {{ {declarations}}}")))
}

fn is_safe_css_value(value: &str) -> bool {
    !value.contains(['<', '>', ';', '{', '}'])
}

/// Loads the WebAssembly module that wires up the page once it has loaded.
pub fn wasm_bootstrap() -> HeadElement {
    HeadElement::ModuleSource(PreEscaped(format!(
        "import init from '{WASM_SCRIPT}'; init();"
    )))
}

/// Embeds `json` in a `<script type="application/json">` element.
///
/// Occurrences of `</` are escaped so the data cannot close the element early.
pub fn json_script(id: &str, json: &str) -> Markup {
    let json = json.replace("</", "<\\/");

    html! {
        script type="application/json" id=(id) { (PreEscaped(json)) }
    }
}

pub fn base(title: &str, head_elements: &[HeadElement], content: &Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en"
        {
            head
            {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) " - Spendboard" }
                link href=(STYLESHEET) rel="stylesheet";

                @for element in head_elements
                {
                    @match element
                    {
                        HeadElement::ScriptLink(path) => script src=(path) {}
                        HeadElement::ModuleSource(text) => script type="module" { (text) }
                        HeadElement::Style(text) => style { (text) }
                    }
                }
            }

            body
            {
                (content)
            }
        }
    }
}

pub fn error_view(title: &str, header: &str, description: &str, fix: &str) -> Markup {
    let content = html!(
        section class="error-page"
        {
            h1 class="error-code" { (header) }
            p class="error-description" { (description) }
            p class="error-fix" { (fix) }

            a href=(endpoints::DASHBOARD_VIEW) class="button"
            {
                "Back to Dashboard"
            }
        }
    );

    base(title, &[], &content)
}

/// A link styled for use inside a paragraph.
pub fn link(url: &str, text: &str) -> Markup {
    html! (
        a href=(url) class="link" { (text) }
    )
}

#[cfg(test)]
mod tests {
    use scraper::{Html, Selector};

    use super::*;
    use crate::test_utils::assert_valid_html;

    #[test]
    fn palette_becomes_root_variables() {
        let HeadElement::Style(css) = palette_style(&Palette::default()) else {
            panic!("expected a style element");
        };

        assert!(css.0.starts_with(":root {"));
        assert!(css.0.contains("--text-light: #6b7280;"));
        assert!(css.0.contains("--secondary-transparent: rgba(247, 37, 133, 0.2);"));
    }

    #[test]
    fn palette_cannot_close_the_style_element() {
        let palette = Palette {
            primary_color: "red</style><script>alert(1)</script>".to_owned(),
            secondary_color: "blue; } body { display: none".to_owned(),
            ..Default::default()
        };

        let HeadElement::Style(css) = palette_style(&palette) else {
            panic!("expected a style element");
        };

        assert!(!css.0.contains('<'));
        assert!(!css.0.contains("display: none"));
        assert!(css.0.contains("--primary-color: #4361ee;"));
        assert!(css.0.contains("--secondary-color: #f72585;"));
        assert!(css.0.contains("--text-light: #6b7280;"));
    }

    #[test]
    fn json_script_cannot_close_itself() {
        let markup = json_script("data", r#"{"text":"</script><b>"}"#).into_string();

        assert!(!markup.contains("</script><b>"));
        assert!(markup.contains(r#"<\/script><b>"#));
    }

    #[test]
    fn base_page_is_valid_html() {
        let page = base(
            "Test",
            &[palette_style(&Palette::default()), wasm_bootstrap()],
            &html!(p { "Hello" }),
        );
        let html = Html::parse_document(&page.into_string());

        assert_valid_html(&html);
        let title = html
            .select(&Selector::parse("title").unwrap())
            .next()
            .unwrap();
        assert_eq!(title.text().collect::<String>(), "Test - Spendboard");
    }
}
