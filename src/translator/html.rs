//! Minimal tag-level HTML scanner.
//!
//! Only start tags and a few raw-text elements are understood. Everything
//! outside the tags being rewritten is copied byte-for-byte. Comments and the
//! bodies of `<script>`/`<style>` elements are opaque: tags inside them are
//! never reported.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref HTML_MARKER: Regex = Regex::new(r"(?i)<html").expect("html marker pattern is valid");
    static ref TITLE: Regex =
        Regex::new(r"(?is)<title\b[^>]*>(.*?)</title\s*>").expect("title pattern is valid");
    static ref START_TAG: Regex =
        Regex::new(r#"<([A-Za-z][A-Za-z0-9-]*)((?:[^>"']|"[^"]*"|'[^']*')*)>"#)
            .expect("start tag pattern is valid");
    static ref ATTRIBUTE: Regex = Regex::new(
        r#"([^\s"'>/=]+)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+)))?"#
    )
    .expect("attribute pattern is valid");
    static ref OPAQUE: Regex = Regex::new(
        r#"(?is)<!--.*?-->|(<script\b(?:[^>"']|"[^"]*"|'[^']*')*>).*?</script\s*>|(<style\b(?:[^>"']|"[^"]*"|'[^']*')*>).*?</style\s*>"#
    )
    .expect("opaque span pattern is valid");
    static ref CHARACTER_REFERENCE: Regex =
        Regex::new(r"&(#[0-9]{1,7}|#[xX][0-9A-Fa-f]{1,6}|[A-Za-z]+);")
            .expect("character reference pattern is valid");
}

/// Whether the text is an HTML document
pub fn is_html(text: &str) -> bool {
    HTML_MARKER.is_match(text)
}

/// Trimmed text of the first `<title>` element
pub fn title(html: &str) -> Option<String> {
    TITLE
        .captures(html)
        .map(|caps| caps[1].trim().to_string())
}

/// A parsed start tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HtmlTag {
    name: String,
    attributes: Vec<(String, Option<String>)>,
    self_closing: bool,
}

impl HtmlTag {
    /// Parse a single start tag (`<img src="a.png" />`)
    pub fn parse(tag: &str) -> Option<Self> {
        let caps = START_TAG.captures(tag)?;
        let mut raw = caps[2].trim_end();
        let self_closing = raw.ends_with('/');
        if self_closing {
            raw = raw[..raw.len() - 1].trim_end();
        }

        let attributes = ATTRIBUTE
            .captures_iter(raw)
            .map(|attr| {
                let value = attr
                    .get(2)
                    .or_else(|| attr.get(3))
                    .or_else(|| attr.get(4))
                    .map(|v| decode_entities(v.as_str()));
                (attr[1].to_string(), value)
            })
            .collect();

        Some(Self {
            name: caps[1].to_string(),
            attributes,
            self_closing,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    /// Attribute value. Attributes without value read as an empty string.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_deref().unwrap_or(""))
    }

    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = Some(value.into());
        match self
            .attributes
            .iter_mut()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
        {
            Some((_, existing)) => *existing = value,
            None => self.attributes.push((name.to_string(), value)),
        }
    }

    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        let index = self
            .attributes
            .iter()
            .position(|(key, _)| key.eq_ignore_ascii_case(name))?;
        self.attributes.remove(index).1
    }

    /// Whitespace separated `class` values
    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attr("class").unwrap_or("").split_whitespace()
    }

    pub fn render(&self) -> String {
        let mut out = String::with_capacity(16 + self.attributes.len() * 16);
        out.push('<');
        out.push_str(&self.name);
        for (key, value) in &self.attributes {
            out.push(' ');
            out.push_str(key);
            if let Some(value) = value {
                out.push_str("=\"");
                out.push_str(&encode_attribute(value));
                out.push('"');
            }
        }
        if self.self_closing {
            out.push_str(" /");
        }
        out.push('>');
        out
    }
}

/// Decode the character references of an attribute value. Unknown named
/// references are kept as written.
fn decode_entities(value: &str) -> String {
    if !value.contains('&') {
        return value.to_string();
    }
    CHARACTER_REFERENCE
        .replace_all(value, |caps: &regex::Captures| {
            let name = &caps[1];
            let decoded = match name {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "nbsp" => Some('\u{a0}'),
                _ => match name.strip_prefix('#') {
                    Some(hex) if hex.starts_with(|c: char| c == 'x' || c == 'X') => {
                        u32::from_str_radix(&hex[1..], 16).ok().and_then(char::from_u32)
                    }
                    Some(decimal) => decimal.parse().ok().and_then(char::from_u32),
                    None => None,
                },
            };
            match decoded {
                Some(c) => c.to_string(),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

fn encode_attribute(value: &str) -> String {
    value.replace('&', "&amp;").replace('"', "&quot;")
}

/// Spans whose content is not markup: comments, and the bodies of script and
/// style elements (their start tags stay visible).
fn opaque_ranges(html: &str) -> Vec<(usize, usize)> {
    OPAQUE
        .captures_iter(html)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let start = caps
                .get(1)
                .or_else(|| caps.get(2))
                .map_or(whole.start(), |open| open.end());
            Some((start, whole.end()))
        })
        .collect()
}

fn is_opaque(ranges: &[(usize, usize)], position: usize) -> bool {
    ranges
        .iter()
        .any(|&(start, end)| start <= position && position < end)
}

/// Rewrite every start tag outside comments and raw-text bodies.
///
/// The callback returns `Ok(None)` to keep the tag text unchanged, or the
/// replacement text. The first error aborts the rewrite.
pub fn rewrite_tags<F, E>(html: &str, mut rewrite: F) -> Result<String, E>
where
    F: FnMut(HtmlTag) -> Result<Option<String>, E>,
{
    let mut out = String::with_capacity(html.len());
    let mut last = 0;
    let opaque = opaque_ranges(html);

    for m in START_TAG.find_iter(html) {
        if is_opaque(&opaque, m.start()) {
            continue;
        }
        let Some(tag) = HtmlTag::parse(m.as_str()) else {
            continue;
        };
        if let Some(replacement) = rewrite(tag)? {
            out.push_str(&html[last..m.start()]);
            out.push_str(&replacement);
            last = m.end();
        }
    }

    out.push_str(&html[last..]);
    Ok(out)
}

/// Byte range of an element found in a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub start: usize,
    pub end: usize,
    pub tag: HtmlTag,
    /// Raw text between the start and end tags (`<style>` body)
    pub body: Option<String>,
}

/// `<link>` tags and `<style>` elements in document order, commented-out
/// ones excluded
pub fn stylesheet_elements(html: &str) -> Vec<Element> {
    lazy_static! {
        static ref STYLESHEETS: Regex = Regex::new(
            r#"(?is)(<link\b(?:[^>"']|"[^"]*"|'[^']*')*>)|(<style\b(?:[^>"']|"[^"]*"|'[^']*')*>)(.*?)</style\s*>"#
        )
        .expect("stylesheet pattern is valid");
    }

    let opaque = opaque_ranges(html);
    STYLESHEETS
        .captures_iter(html)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            if is_opaque(&opaque, whole.start()) {
                return None;
            }
            let (tag, body) = match caps.get(1) {
                Some(link) => (HtmlTag::parse(link.as_str())?, None),
                None => (
                    HtmlTag::parse(caps.get(2)?.as_str())?,
                    caps.get(3).map(|b| b.as_str().to_string()),
                ),
            };
            Some(Element {
                start: whole.start(),
                end: whole.end(),
                tag,
                body,
            })
        })
        .collect()
}

/// Remove byte ranges from a document. Ranges must be sorted and disjoint.
pub fn remove_ranges(html: &str, ranges: &[(usize, usize)]) -> String {
    let mut out = String::with_capacity(html.len());
    let mut last = 0;
    for &(start, end) in ranges {
        out.push_str(&html[last..start]);
        last = end;
    }
    out.push_str(&html[last..]);
    out
}
