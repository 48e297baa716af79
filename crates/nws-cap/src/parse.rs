//! Atom + CAP feed parsing.
//!
//! Each Atom `<entry>` becomes one [`Alert`]. Direct children with text
//! content become fields keyed by local name; `<cap:geocode>` blocks of
//! `valueName`/`value` pairs become geocodes. Children with nested
//! structure (`author`, `cap:parameter`) are not kept.

use std::collections::BTreeSet;

use indexmap::IndexMap;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::NsReader;
use tracing::debug;

use crate::alert::Alert;
use crate::error::CapError;

/// Title of the placeholder entry the NWS publishes when a feed is empty.
pub const NO_ACTIVE_ALERTS: &str = "There are no active watches, warnings or advisories";

const ATOM_NS: &[u8] = b"http://www.w3.org/2005/Atom";

/// Parse a feed document into alerts, dropping the "no active alerts" entry.
pub fn parse_feed(xml: &str) -> Result<Vec<Alert>, CapError> {
    let mut reader = NsReader::from_str(xml);

    let mut alerts = Vec::new();
    let mut skipped = 0usize;
    let mut depth = 0usize;
    let mut seen_root = false;
    let mut root_closed = false;
    let mut entry: Option<EntryBuilder> = None;

    loop {
        let (ns, event) = reader.read_resolved_event().map_err(xml_error)?;
        match event {
            Event::Start(e) => {
                ensure_bound(&ns)?;
                ensure_single_root(depth, root_closed)?;
                depth += 1;
                seen_root = true;
                let name = local_name(&e)?;
                match entry.as_mut() {
                    Some(builder) => builder.start(name, depth),
                    None if name == "entry" && is_atom(&ns) => {
                        entry = Some(EntryBuilder::new(depth));
                    }
                    None => {}
                }
            }
            Event::Empty(e) => {
                ensure_bound(&ns)?;
                ensure_single_root(depth, root_closed)?;
                seen_root = true;
                if depth == 0 {
                    root_closed = true;
                }
                if let Some(builder) = entry.as_mut() {
                    builder.empty(&e, depth + 1)?;
                }
            }
            Event::Text(t) => {
                if depth == 0 {
                    ensure_blank(&t)?;
                } else if let Some(builder) = entry.as_mut() {
                    builder.text(&t.unescape().map_err(xml_error)?);
                }
            }
            Event::CData(c) => {
                if depth == 0 {
                    ensure_blank(&c)?;
                } else if let Some(builder) = entry.as_mut() {
                    builder.text(&String::from_utf8_lossy(&c));
                }
            }
            Event::End(_) => {
                match entry.take() {
                    Some(builder) if builder.depth == depth => {
                        let alert = builder.finish();
                        if is_placeholder(&alert) {
                            skipped += 1;
                        } else {
                            alerts.push(alert);
                        }
                    }
                    Some(mut builder) => {
                        builder.end(depth);
                        entry = Some(builder);
                    }
                    None => {}
                }
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    root_closed = true;
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !seen_root {
        return Err(CapError::Xml("document has no root element".to_string()));
    }
    if depth != 0 {
        return Err(CapError::Xml(format!(
            "unexpected end of document ({} unclosed elements)",
            depth
        )));
    }

    debug!(alerts = alerts.len(), skipped, "Parsed CAP feed");
    Ok(alerts)
}

fn is_placeholder(alert: &Alert) -> bool {
    alert.title().map(str::trim) == Some(NO_ACTIVE_ALERTS)
}

fn is_atom(ns: &ResolveResult<'_>) -> bool {
    match ns {
        ResolveResult::Bound(Namespace(uri)) => *uri == ATOM_NS,
        ResolveResult::Unbound => true,
        ResolveResult::Unknown(_) => false,
    }
}

fn ensure_bound(ns: &ResolveResult<'_>) -> Result<(), CapError> {
    match ns {
        ResolveResult::Unknown(prefix) => Err(CapError::Xml(format!(
            "undeclared namespace prefix {:?}",
            String::from_utf8_lossy(prefix)
        ))),
        _ => Ok(()),
    }
}

fn ensure_single_root(depth: usize, root_closed: bool) -> Result<(), CapError> {
    if depth == 0 && root_closed {
        return Err(CapError::Xml("content after root element".to_string()));
    }
    Ok(())
}

/// Only whitespace may appear outside the root element.
fn ensure_blank(content: &[u8]) -> Result<(), CapError> {
    if content.iter().all(u8::is_ascii_whitespace) {
        Ok(())
    } else {
        Err(CapError::Xml("text outside root element".to_string()))
    }
}

fn local_name(e: &BytesStart<'_>) -> Result<String, CapError> {
    let name = e.local_name();
    std::str::from_utf8(name.as_ref())
        .map(str::to_string)
        .map_err(xml_error)
}

fn xml_error(err: impl std::fmt::Display) -> CapError {
    CapError::Xml(err.to_string())
}

/// Accumulates one `<entry>` while its events stream past.
struct EntryBuilder {
    /// Depth of the `<entry>` element itself.
    depth: usize,
    fields: IndexMap<String, String>,
    geocodes: IndexMap<String, BTreeSet<String>>,
    field: Option<(String, String)>,
    in_geocode: bool,
    geocode_name: Option<String>,
    geocode_part: Option<(String, String)>,
}

impl EntryBuilder {
    fn new(depth: usize) -> Self {
        Self {
            depth,
            fields: IndexMap::new(),
            geocodes: IndexMap::new(),
            field: None,
            in_geocode: false,
            geocode_name: None,
            geocode_part: None,
        }
    }

    fn start(&mut self, name: String, depth: usize) {
        if depth == self.depth + 1 {
            if name == "geocode" {
                self.in_geocode = true;
                self.geocode_name = None;
            } else {
                self.field = Some((name, String::new()));
            }
        } else if depth == self.depth + 2 && self.in_geocode {
            self.geocode_part = Some((name, String::new()));
        } else {
            // Structured child: not a scalar field.
            self.field = None;
        }
    }

    fn empty(&mut self, e: &BytesStart<'_>, depth: usize) -> Result<(), CapError> {
        if depth != self.depth + 1 {
            return Ok(());
        }
        let name = local_name(e)?;
        let value = match e.try_get_attribute("href").map_err(xml_error)? {
            Some(href) => href.unescape_value().map_err(xml_error)?.into_owned(),
            None => String::new(),
        };
        self.fields.entry(name).or_insert(value);
        Ok(())
    }

    fn text(&mut self, text: &str) {
        if let Some((_, buf)) = self.geocode_part.as_mut() {
            buf.push_str(text);
        } else if let Some((_, buf)) = self.field.as_mut() {
            buf.push_str(text);
        }
    }

    fn end(&mut self, depth: usize) {
        if depth == self.depth + 2 && self.in_geocode {
            match self.geocode_part.take() {
                Some((part, text)) if part == "valueName" => {
                    self.geocode_name = Some(text.trim().to_string());
                }
                Some((part, text)) if part == "value" => {
                    if let Some(notation) = self.geocode_name.clone() {
                        self.geocodes
                            .entry(notation)
                            .or_default()
                            .extend(text.split_whitespace().map(str::to_string));
                    }
                }
                _ => {}
            }
        } else if depth == self.depth + 1 {
            if self.in_geocode {
                self.in_geocode = false;
                self.geocode_name = None;
            } else if let Some((name, text)) = self.field.take() {
                self.fields.entry(name).or_insert_with(|| text.trim().to_string());
            }
        }
    }

    fn finish(self) -> Alert {
        Alert::from_parts(self.fields, self.geocodes)
    }
}
