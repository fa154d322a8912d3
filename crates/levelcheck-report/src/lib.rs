//! levelcheck-report — Renders assessment reports as HTML and Markdown.

pub mod html;
pub mod markdown;

#[cfg(test)]
pub(crate) mod fixtures;
