//! Document service: Atom feed listing the caller's quiz spreadsheets.

use quizpoll::{strip_marker, Credential, DocsEntry, DocsEntryKind, ErrorKind, Service};
use serde::Deserialize;
use transport::{RawResponse, RequestSpec};

use crate::api::{malformed, OperationRequest, ServiceApi};
use crate::Operation;

/// Default feed: every document whose title contains `[Q]`.
pub const DEFAULT_FEED_URL: &str =
    "https://docs.google.com/feeds/default/private/full?title=%5BQ%5D";

/// Protocol version header value the feed is requested with.
pub const GDATA_VERSION: &str = "3.0";

const QUIZ_MARKER: &str = "[Q]";

/// Payload of a document-service request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocsRequest {
    /// List the caller's quizzes.
    MyDocuments,
}

impl OperationRequest for DocsRequest {
    fn operation(&self) -> Operation {
        match self {
            DocsRequest::MyDocuments => Operation::FetchMyDocuments,
        }
    }
}

/// Decoded document-service result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocsResponse {
    /// Collections and quizzes, collections first then by title.
    Documents(Vec<DocsEntry>),
}

impl DocsResponse {
    /// Unwraps the listing.
    pub fn into_documents(self) -> Vec<DocsEntry> {
        match self {
            DocsResponse::Documents(entries) => entries,
        }
    }
}

/// Builder/decoder for the document service.
#[derive(Debug, Clone)]
pub struct DocsApi {
    feed_url: String,
}

impl DocsApi {
    /// Creates an API reading `feed_url`.
    pub fn new(feed_url: impl Into<String>) -> Self {
        Self { feed_url: feed_url.into() }
    }

    /// The feed this API reads.
    pub fn feed_url(&self) -> &str {
        &self.feed_url
    }
}

impl Default for DocsApi {
    fn default() -> Self {
        Self::new(DEFAULT_FEED_URL)
    }
}

impl ServiceApi for DocsApi {
    type Request = DocsRequest;
    type Response = DocsResponse;

    fn service(&self) -> Service {
        Service::DocumentService
    }

    fn build(
        &self,
        request: &DocsRequest,
        credential: &Credential,
    ) -> Result<RequestSpec, ErrorKind> {
        Ok(
            RequestSpec::get(request.operation().name(), self.feed_url.clone())
                .with_header("GData-Version", GDATA_VERSION)
                .with_header(
                    "Authorization",
                    format!("GoogleLogin auth={}", credential.expose()),
                )
                .with_header("Content-Type", "application/atom+xml; charset=UTF-8"),
        )
    }

    fn decode(
        &self,
        request: &DocsRequest,
        response: RawResponse,
    ) -> Result<DocsResponse, ErrorKind> {
        let operation = request.operation();
        let feed: Feed =
            quick_xml::de::from_str(&response.body).map_err(|e| malformed(operation, e))?;

        let mut entries = Vec::with_capacity(feed.entries.len());
        for entry in feed.entries {
            let Some(kind) = entry.kind() else {
                continue;
            };
            let id = document_key(&entry.id.value).ok_or_else(|| {
                malformed(operation, format!("unexpected entry id {}", entry.id.value))
            })?;
            if !entry.title.value.contains(QUIZ_MARKER) {
                continue;
            }
            entries.push(DocsEntry {
                kind,
                title: strip_marker(&entry.title.value, QUIZ_MARKER),
                id,
            });
        }
        entries.sort();
        tracing::debug!(
            operation = operation.name(),
            count = entries.len(),
            "decoded document feed"
        );
        Ok(DocsResponse::Documents(entries))
    }
}

// ---------------------------------------------------------------------------
// Atom feed shape. Only the fields the listing needs; everything else in the
// feed is ignored.
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct Feed {
    #[serde(rename = "entry", default)]
    entries: Vec<Entry>,
}

#[derive(Debug, Deserialize)]
struct Entry {
    id: Text,
    title: Text,
    #[serde(rename = "category", default)]
    categories: Vec<Category>,
}

#[derive(Debug, Default, Deserialize)]
struct Text {
    #[serde(rename = "$text", default)]
    value: String,
}

#[derive(Debug, Deserialize)]
struct Category {
    #[serde(rename = "@scheme", default)]
    scheme: String,
    #[serde(rename = "@term", default)]
    term: String,
}

impl Entry {
    /// Folder or spreadsheet, from the `#kind` category. Other kinds yield `None`.
    fn kind(&self) -> Option<DocsEntryKind> {
        let category = self
            .categories
            .iter()
            .find(|c| c.scheme.ends_with("#kind"))
            .or_else(|| self.categories.first())?;
        if category.term.ends_with("folder") {
            Some(DocsEntryKind::Collection)
        } else if category.term.ends_with("spreadsheet") {
            Some(DocsEntryKind::Quiz)
        } else {
            None
        }
    }
}

/// `.../spreadsheet%3Aabc123` → `abc123`.
fn document_key(entry_id: &str) -> Option<String> {
    let segment = entry_id.trim_end_matches('/').rsplit('/').next()?;
    let segment = urlencoding::decode(segment).ok()?;
    let mut parts = segment.split(':');
    let _resource_type = parts.next()?;
    parts.next().filter(|key| !key.is_empty()).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEED: &str = r#"<?xml version='1.0' encoding='UTF-8'?>
<feed xmlns="http://www.w3.org/2005/Atom" xmlns:gd="http://schemas.google.com/g/2005">
  <id>https://docs.google.com/feeds/default/private/full</id>
  <title>Available Documents</title>
  <entry>
    <id>https://docs.google.com/feeds/id/spreadsheet%3Azeta</id>
    <title>[Q] Zoology</title>
    <category scheme="http://schemas.google.com/g/2005/labels" term="http://schemas.google.com/g/2005/labels#viewed" label="viewed"/>
    <category scheme="http://schemas.google.com/g/2005#kind" term="http://schemas.google.com/docs/2007#spreadsheet" label="spreadsheet"/>
  </entry>
  <entry>
    <id>https://docs.google.com/feeds/id/document%3Adoc1</id>
    <title>[Q] Notes</title>
    <category scheme="http://schemas.google.com/g/2005#kind" term="http://schemas.google.com/docs/2007#document" label="document"/>
  </entry>
  <entry>
    <id>https://docs.google.com/feeds/id/folder%3Afold1</id>
    <title>[Q] Term 1</title>
    <category scheme="http://schemas.google.com/g/2005#kind" term="http://schemas.google.com/docs/2007#folder" label="folder"/>
  </entry>
  <entry>
    <id>https://docs.google.com/feeds/id/spreadsheet%3Aplain</id>
    <title>Budget</title>
    <category scheme="http://schemas.google.com/g/2005#kind" term="http://schemas.google.com/docs/2007#spreadsheet" label="spreadsheet"/>
  </entry>
  <entry>
    <id>https://docs.google.com/feeds/id/spreadsheet%3Aalpha</id>
    <title>Algebra [Q]</title>
    <category scheme="http://schemas.google.com/g/2005#kind" term="http://schemas.google.com/docs/2007#spreadsheet" label="spreadsheet"/>
  </entry>
</feed>"#;

    fn token() -> Credential {
        Credential::new("tok").unwrap()
    }

    #[test]
    fn request_carries_protocol_and_auth_headers() {
        let spec = DocsApi::default().build(&DocsRequest::MyDocuments, &token()).unwrap();
        assert_eq!(spec.url, DEFAULT_FEED_URL);
        assert_eq!(spec.header("gdata-version"), Some("3.0"));
        assert_eq!(spec.header("authorization"), Some("GoogleLogin auth=tok"));
        assert_eq!(spec.header("content-type"), Some("application/atom+xml; charset=UTF-8"));
    }

    #[test]
    fn feed_keeps_marked_folders_and_spreadsheets_sorted() {
        let entries = DocsApi::default()
            .decode(&DocsRequest::MyDocuments, RawResponse::new(200, FEED))
            .unwrap()
            .into_documents();
        let listed: Vec<_> = entries
            .iter()
            .map(|e| (e.kind, e.title.as_str(), e.id.as_str()))
            .collect();
        assert_eq!(
            listed,
            [
                (DocsEntryKind::Collection, "Term 1", "fold1"),
                (DocsEntryKind::Quiz, "Algebra", "alpha"),
                (DocsEntryKind::Quiz, "Zoology", "zeta"),
            ]
        );
    }

    #[test]
    fn entry_id_without_type_prefix_is_malformed() {
        let feed = r#"<feed><entry><id>https://docs.google.com/feeds/id/abc</id><title>[Q] x</title>
<category scheme="s#kind" term="t#spreadsheet"/></entry></feed>"#;
        let outcome =
            DocsApi::default().decode(&DocsRequest::MyDocuments, RawResponse::new(200, feed));
        assert_eq!(outcome, Err(ErrorKind::Malformed));
    }

    #[test]
    fn entry_without_id_is_malformed() {
        let feed = "<feed><entry><title>[Q] x</title></entry></feed>";
        let outcome =
            DocsApi::default().decode(&DocsRequest::MyDocuments, RawResponse::new(200, feed));
        assert_eq!(outcome, Err(ErrorKind::Malformed));
    }

    #[test]
    fn empty_feed_lists_nothing() {
        let entries = DocsApi::default()
            .decode(&DocsRequest::MyDocuments, RawResponse::new(200, "<feed></feed>"))
            .unwrap()
            .into_documents();
        assert!(entries.is_empty());
    }

    #[test]
    fn document_key_is_the_part_after_the_type() {
        assert_eq!(document_key("https://h/feeds/id/spreadsheet%3Aabc").as_deref(), Some("abc"));
        assert_eq!(document_key("https://h/feeds/id/folder:f1/").as_deref(), Some("f1"));
        assert_eq!(document_key("https://h/feeds/id/abc"), None);
    }
}
