//! Page extraction: title, main content text, and outbound links
//!
//! This module handles turning a fetched HTML document into:
//! - A title (ordered selector chain, `"Untitled"` fallback)
//! - Main content text with navigation and other boilerplate removed
//! - The in-scope links worth following, in discovery order
//!
//! All selectors are compiled once, when the [`Extractor`] is built from the
//! `[selectors]` configuration.

use crate::config::{ScopeConfig, SelectorConfig};
use crate::url::{is_url_in_scope, normalize_url};
use crate::{ConfigError, ConfigResult};
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Title used when no title selector yields text
pub const UNTITLED: &str = "Untitled";

/// A parsed HTML page and the URL it was served from
///
/// `scraper::Html` is not `Send`, so a `Document` must be consumed before
/// the owning task reaches its next `.await`.
#[derive(Debug)]
pub struct Document {
    html: Html,
    url: Url,
}

impl Document {
    /// Parses a response body; parsing is lenient and never fails
    pub fn parse(body: &str, url: Url) -> Self {
        Self {
            html: Html::parse_document(body),
            url,
        }
    }

    /// Final URL after redirects, used as the base for relative links
    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn html(&self) -> &Html {
        &self.html
    }
}

/// An ordered list of compiled CSS selectors
#[derive(Debug, Clone)]
pub struct SelectorChain {
    selectors: Vec<Selector>,
}

impl SelectorChain {
    /// Compiles every selector, failing on the first invalid one
    pub fn parse<S: AsRef<str>>(sources: &[S]) -> ConfigResult<Self> {
        let selectors = sources
            .iter()
            .map(|s| compile(s.as_ref()))
            .collect::<ConfigResult<Vec<_>>>()?;
        Ok(Self { selectors })
    }

    pub fn len(&self) -> usize {
        self.selectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selectors.is_empty()
    }

    /// First element, trying selectors in order, for which `accept` holds
    ///
    /// Only the first match of each selector is considered.
    pub fn first_match<'a, F>(&self, html: &'a Html, mut accept: F) -> Option<ElementRef<'a>>
    where
        F: FnMut(ElementRef<'a>) -> bool,
    {
        self.selectors
            .iter()
            .filter_map(|selector| html.select(selector).next())
            .find(|element| accept(*element))
    }

    /// Every match of every selector, selector by selector, in document order
    pub fn select_all<'a>(&'a self, html: &'a Html) -> impl Iterator<Item = ElementRef<'a>> + 'a {
        self.selectors
            .iter()
            .flat_map(move |selector| html.select(selector))
    }

    /// Every match of every selector inside `root`, including nested matches
    fn select_within<'a>(&'a self, root: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> + 'a {
        self.selectors
            .iter()
            .flat_map(move |selector| root.select(selector))
    }
}

fn compile(source: &str) -> ConfigResult<Selector> {
    Selector::parse(source).map_err(|e| ConfigError::InvalidSelector {
        selector: source.to_string(),
        message: e.to_string(),
    })
}

/// Title, content, and link extraction driven by configured selector chains
#[derive(Debug, Clone)]
pub struct Extractor {
    title: SelectorChain,
    content: SelectorChain,
    navigation: SelectorChain,
    boilerplate: SelectorChain,
    body: Selector,
    any_link: Selector,
}

impl Extractor {
    /// Compiles the configured selector lists
    ///
    /// # Errors
    ///
    /// `ConfigError::InvalidSelector` naming the first selector that does
    /// not parse.
    pub fn new(selectors: &SelectorConfig) -> ConfigResult<Self> {
        Ok(Self {
            title: SelectorChain::parse(&selectors.title)?,
            content: SelectorChain::parse(&selectors.content)?,
            navigation: SelectorChain::parse(&selectors.navigation)?,
            boilerplate: SelectorChain::parse(&selectors.boilerplate)?,
            body: compile("body")?,
            any_link: compile("a[href]")?,
        })
    }

    /// Page title: first non-empty match of the title chain, else `"Untitled"`
    ///
    /// Internal whitespace is collapsed so multi-line headings read as one line.
    pub fn extract_title(&self, doc: &Document) -> String {
        let mut title = None;
        self.title.first_match(&doc.html, |element| {
            let text = collapse_whitespace(&element.text().collect::<String>());
            if text.is_empty() {
                false
            } else {
                title = Some(text);
                true
            }
        });
        title.unwrap_or_else(|| UNTITLED.to_string())
    }

    /// Main content text with boilerplate subtrees removed
    ///
    /// The content root is the first content-chain match that still has text
    /// once boilerplate is dropped, falling back to `<body>`. Returns an
    /// empty string for documents without any text.
    pub fn extract_content(&self, doc: &Document) -> String {
        let mut content = None;
        self.content.first_match(&doc.html, |element| {
            let text = self.text_without_boilerplate(element);
            if text.is_empty() {
                false
            } else {
                content = Some(text);
                true
            }
        });

        content
            .or_else(|| {
                doc.html
                    .select(&self.body)
                    .next()
                    .map(|body| self.text_without_boilerplate(body))
            })
            .unwrap_or_default()
    }

    /// Cleaned text of `root`, skipping text inside boilerplate elements
    fn text_without_boilerplate(&self, root: ElementRef<'_>) -> String {
        let excluded: HashSet<_> = self
            .boilerplate
            .select_within(root)
            .map(|e| e.id())
            .collect();

        let mut raw = String::new();
        for node in root.descendants() {
            let Some(text) = node.value().as_text() else {
                continue;
            };
            if excluded.is_empty() || !node.ancestors().any(|a| excluded.contains(&a.id())) {
                raw.push_str(text);
            }
        }

        clean_text(&raw)
    }

    /// Links worth following from this page
    ///
    /// Navigation-chain matches are tried first; only if none of them
    /// survives filtering does every `<a href>` on the page count. Each href
    /// is resolved against the document URL and normalized. It is kept when
    /// it is in scope and not in `visited`, once, in discovery order.
    ///
    /// `visited` is a snapshot: the frontier still decides what gets queued.
    pub fn extract_links(
        &self,
        doc: &Document,
        scope: &ScopeConfig,
        visited: &HashSet<String>,
    ) -> Vec<String> {
        let links = self.filter_links(
            self.navigation.select_all(&doc.html),
            doc.url(),
            scope,
            visited,
        );
        if !links.is_empty() {
            return links;
        }

        tracing::trace!("No navigation links on {}, falling back to all anchors", doc.url());
        self.filter_links(doc.html.select(&self.any_link), doc.url(), scope, visited)
    }

    fn filter_links<'a, I>(
        &self,
        anchors: I,
        base_url: &Url,
        scope: &ScopeConfig,
        visited: &HashSet<String>,
    ) -> Vec<String>
    where
        I: Iterator<Item = ElementRef<'a>>,
    {
        let mut seen = HashSet::new();
        let mut links = Vec::new();

        for anchor in anchors {
            let Some(href) = anchor.value().attr("href") else {
                continue;
            };
            let Some(resolved) = resolve_link(href, base_url) else {
                continue;
            };
            let Ok(normalized) = normalize_url(resolved) else {
                continue;
            };
            if !is_url_in_scope(&normalized, scope) {
                continue;
            }

            let key = normalized.to_string();
            if visited.contains(&key) || !seen.insert(key.clone()) {
                continue;
            }
            links.push(key);
        }

        links
    }
}

/// Resolves an href against the page URL
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: and data: schemes
/// - Empty and fragment-only (same page) hrefs
/// - Hrefs that do not resolve
fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lower = href.to_ascii_lowercase();
    if ["javascript:", "mailto:", "tel:", "data:"]
        .iter()
        .any(|scheme| lower.starts_with(scheme))
    {
        return None;
    }

    base_url.join(href).ok()
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalizes extracted text
///
/// Runs of spaces and tabs become one space, every line is trimmed, and
/// consecutive blank lines collapse to one. Leading and trailing blank lines
/// are dropped.
pub fn clean_text(raw: &str) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut pending_blank = false;

    for line in raw.lines() {
        let line = line
            .split([' ', '\t'])
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        let line = line.trim();

        if line.is_empty() {
            pending_blank = !lines.is_empty();
            continue;
        }
        if pending_blank {
            lines.push(String::new());
            pending_blank = false;
        }
        lines.push(line.to_string());
    }

    lines.join("\n")
}
