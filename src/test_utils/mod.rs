#![allow(missing_docs)]

pub(crate) mod html;

pub(crate) use html::{assert_exists, assert_valid_html, parse_html_document, select_text};
