//! WebDAV multistatus parsing into a normalized file listing.
//!
//! The NAS answers a PROPFIND with a multistatus XML document describing
//! directory contents. This module extracts the `.json` backup files from it
//! and orders them newest first.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sxd_document::dom::Element;
use sxd_document::parser;
use tracing::warn;

/// One backup file extracted from a multistatus document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileEntry {
    pub name: String,
    /// Origin-relative reference path on the backend.
    pub path: String,
    pub last_modified: Option<DateTime<Utc>>,
    /// Fully qualified URL pointing at the backend.
    pub url: String,
}

/// Parse a multistatus document into file entries, newest first.
///
/// Elements are matched by XML local name, so `d:`, `D:`, `lp1:` and
/// default-namespace documents all parse identically. Only entries whose
/// href ends in `.json` are kept. A malformed or empty document yields an
/// empty listing; this layer does not distinguish parse failure from "no
/// matching files".
pub fn parse_multistatus(xml: &str, backend_base_url: &str) -> Vec<FileEntry> {
    let package = match parser::parse(xml) {
        Ok(package) => package,
        Err(error) => {
            warn!("Unparsable multistatus document: {:?}", error);
            return Vec::new();
        }
    };
    let document = package.as_document();

    let mut entries = Vec::new();
    for child in document.root().children() {
        if let Some(element) = child.element() {
            collect_responses(element, backend_base_url, &mut entries);
        }
    }

    // Newest first; undated entries sink to the end and keep their
    // extraction order relative to each other (sort_by is stable).
    entries.sort_by(|a, b| match (&a.last_modified, &b.last_modified) {
        (Some(a_ts), Some(b_ts)) => b_ts.cmp(a_ts),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
    entries
}

fn collect_responses(element: Element<'_>, backend_base_url: &str, entries: &mut Vec<FileEntry>) {
    if element.name().local_part() == "response" {
        if let Some(entry) = extract_entry(element, backend_base_url) {
            entries.push(entry);
        }
        return;
    }
    for child in element.children() {
        if let Some(element) = child.element() {
            collect_responses(element, backend_base_url, entries);
        }
    }
}

fn extract_entry(response: Element<'_>, backend_base_url: &str) -> Option<FileEntry> {
    let href = find_descendant(response, "href").map(text_content)?;
    if !href.ends_with(".json") {
        return None;
    }

    let last_modified = find_descendant(response, "getlastmodified")
        .map(text_content)
        .and_then(|raw| parse_http_date(raw.trim()));

    let name = href.rsplit('/').next().unwrap_or(&href).to_string();
    Some(FileEntry {
        name,
        url: format!("{backend_base_url}{href}"),
        path: href,
        last_modified,
    })
}

/// First descendant element with the given local name, depth first.
fn find_descendant<'d>(element: Element<'d>, local_name: &str) -> Option<Element<'d>> {
    for child in element.children() {
        if let Some(child_element) = child.element() {
            if child_element.name().local_part() == local_name {
                return Some(child_element);
            }
            if let Some(found) = find_descendant(child_element, local_name) {
                return Some(found);
            }
        }
    }
    None
}

fn text_content(element: Element<'_>) -> String {
    element
        .children()
        .into_iter()
        .filter_map(|child| child.text().map(|t| t.text().to_string()))
        .collect()
}

/// WebDAV servers emit `getlastmodified` as an RFC 2822 HTTP date; some
/// emit RFC 3339. Anything else is treated as unknown.
fn parse_http_date(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(raw)
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .ok()
        .map(|ts| ts.with_timezone(&Utc))
}
