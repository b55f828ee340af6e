use crate::model::Request;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::borrow::Cow;
use std::collections::BTreeMap;

/// A record extracted by a rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Item {
    /// Name of the task that produced the item
    pub task: String,

    /// Name of the rule that produced the item
    pub rule: String,

    /// URL of the page the item came from
    pub url: String,

    /// When the item was captured
    pub captured_at: DateTime<Utc>,

    /// Extracted field values
    pub fields: BTreeMap<String, String>,
}

impl Item {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}

/// Output of applying a rule to fetched content
#[derive(Debug, Clone, Default)]
pub struct ParseResult {
    pub items: Vec<Item>,
    pub requests: Vec<Request>,
}

impl ParseResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_item(&mut self, item: Item) {
        self.items.push(item);
    }

    pub fn add_request(&mut self, request: Request) {
        self.requests.push(request);
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty() && self.requests.is_empty()
    }
}

/// What a rule sees: the fetched body and the request that produced it
#[derive(Debug, Clone, Copy)]
pub struct Context<'a> {
    pub body: &'a [u8],
    pub request: &'a Request,
}

impl<'a> Context<'a> {
    pub fn new(body: &'a [u8], request: &'a Request) -> Self {
        Self { body, request }
    }

    /// The body decoded as UTF-8, with invalid sequences replaced
    pub fn text(&self) -> Cow<'a, str> {
        String::from_utf8_lossy(self.body)
    }

    /// Builds an item stamped with this context's task, rule and URL
    pub fn output<I, K, V>(&self, fields: I) -> Item
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Item {
            task: self.request.task.name.clone(),
            rule: self.request.rule_name.clone(),
            url: self.request.url.clone(),
            captured_at: Utc::now(),
            fields: fields
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Creates a request for a link found in this page
    pub fn follow(&self, url: impl Into<String>, rule_name: impl Into<String>) -> Request {
        self.request.child(url, rule_name)
    }
}
