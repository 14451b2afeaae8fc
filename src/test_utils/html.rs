use axum::{body::Body, response::Response};
use scraper::{Html, Selector};

pub(crate) async fn parse_html_document(response: Response<Body>) -> Html {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Could not get response body");

    Html::parse_document(&String::from_utf8_lossy(&body))
}

#[track_caller]
pub(crate) fn assert_valid_html(html: &Html) {
    assert!(
        html.errors.is_empty(),
        "Got HTML parsing errors: {:?}",
        html.errors
    );
}

#[track_caller]
pub(crate) fn assert_exists(html: &Html, selector: &str) {
    let parsed = Selector::parse(selector).expect("Invalid selector");
    assert!(
        html.select(&parsed).next().is_some(),
        "could not find element matching {selector}"
    );
}

/// The text of the first element matching `selector`.
#[track_caller]
pub(crate) fn select_text(html: &Html, selector: &str) -> String {
    let parsed = Selector::parse(selector).expect("Invalid selector");
    html.select(&parsed)
        .next()
        .unwrap_or_else(|| panic!("nothing matches {selector}"))
        .text()
        .collect()
}
