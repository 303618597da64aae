//! OpenCalais client: submit raw text, get back entity names and topic categories.

use crate::error::AnnotateError;
use serde_json::Value;
use std::time::Duration;

/// Calais rejects larger documents.
pub const MAX_CONTENT_BYTES: usize = 100_000;

/// Entities and topics extracted from one text. Either list may be empty.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Annotation {
    pub entities: Vec<String>,
    pub topics: Vec<String>,
}

/// Anything that can annotate a comment. One call per comment, no partial results.
pub trait Annotator {
    fn analyze(&self, text: &str) -> Result<Annotation, AnnotateError>;
}

pub struct CalaisClient {
    client: reqwest::blocking::Client,
    endpoint: String,
    api_key: String,
    submitter: String,
}

impl CalaisClient {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        submitter: impl Into<String>,
        timeout: Duration,
        user_agent: &str,
    ) -> Result<Self, AnnotateError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            submitter: submitter.into(),
        })
    }

    fn params_xml(&self) -> String {
        format!(
            concat!(
                r#"<c:params xmlns:c="http://s.opencalais.com/1/pred/" xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#">"#,
                r#"<c:processingDirectives c:contentType="TEXT/RAW" c:outputFormat="application/json"></c:processingDirectives>"#,
                r#"<c:userDirectives c:allowDistribution="false" c:allowSearch="false" c:externalID="" c:submitter="{}"></c:userDirectives>"#,
                r#"<c:externalMetadata></c:externalMetadata>"#,
                r#"</c:params>"#
            ),
            xml_escape(&self.submitter)
        )
    }
}

impl Annotator for CalaisClient {
    fn analyze(&self, text: &str) -> Result<Annotation, AnnotateError> {
        let content = crate::util::truncate_on_char_boundary(text, MAX_CONTENT_BYTES);
        let params = self.params_xml();
        let form = [
            ("licenseID", self.api_key.as_str()),
            ("content", content),
            ("paramsXML", params.as_str()),
        ];

        let resp = self.client.post(&self.endpoint).form(&form).send()?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            return Err(AnnotateError::Api { status: status.as_u16(), message: body });
        }

        let body = resp.text()?;
        let value: Value = serde_json::from_str(&body)?;
        parse_response(&value)
    }
}

/// Walk a Calais JSON response: an object keyed by resource URI, where each value
/// carries a `_typeGroup`. Entities contribute `name`, topics contribute `categoryName`.
pub fn parse_response(value: &Value) -> Result<Annotation, AnnotateError> {
    let obj = value
        .as_object()
        .ok_or_else(|| AnnotateError::Parse("response is not a JSON object".to_string()))?;

    let mut out = Annotation::default();
    for (key, item) in obj {
        if key == "doc" {
            continue;
        }
        let group = item.get("_typeGroup").and_then(Value::as_str);
        match group {
            Some("entities") => {
                if let Some(name) = item.get("name").and_then(Value::as_str) {
                    out.entities.push(name.to_string());
                }
            }
            Some("topics") => {
                if let Some(name) = item.get("categoryName").and_then(Value::as_str) {
                    out.topics.push(name.to_string());
                }
            }
            _ => {}
        }
    }
    Ok(out)
}

fn xml_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
