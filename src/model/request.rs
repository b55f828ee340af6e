use crate::model::task::Task;
use crate::RequestError;
use reqwest::Method;
use sha2::{Digest, Sha256};
use std::fmt;
use std::sync::Arc;
use url::Url;

/// Identity key of a request, derived from its method and URL
///
/// The URL fragment is ignored because it never reaches the server.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Computes the fingerprint for a method and URL pair
    ///
    /// # Example
    ///
    /// ```
    /// use crawl_engine::Fingerprint;
    /// use reqwest::Method;
    ///
    /// let a = Fingerprint::of(&Method::GET, "https://example.com/page#top");
    /// let b = Fingerprint::of(&Method::GET, "https://example.com/page");
    /// assert_eq!(a, b);
    /// ```
    pub fn of(method: &Method, url: &str) -> Self {
        let url = url.split_once('#').map(|(head, _)| head).unwrap_or(url);

        let mut hasher = Sha256::new();
        hasher.update(method.as_str().as_bytes());
        hasher.update(b" ");
        hasher.update(url.as_bytes());
        Self(hex::encode(hasher.finalize()))
    }

    /// Hex-encoded digest
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One unit of crawl work
#[derive(Clone)]
pub struct Request {
    /// Target URL
    pub url: String,

    /// HTTP method
    pub method: Method,

    /// Values above zero are dispatched ahead of everything else
    pub priority: i32,

    /// Owning task
    pub task: Arc<Task>,

    /// Name of the rule in the task's rule tree that parses the response
    pub rule_name: String,

    /// Distance from the root request that led here
    pub depth: u32,

    /// Set on the single automatic re-push after a failed fetch
    pub retried: bool,
}

impl Request {
    /// Creates a depth-0, normal-priority GET request
    pub fn new(task: Arc<Task>, url: impl Into<String>, rule_name: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: Method::GET,
            priority: 0,
            task,
            rule_name: rule_name.into(),
            depth: 0,
            retried: false,
        }
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_depth(mut self, depth: u32) -> Self {
        self.depth = depth;
        self
    }

    /// Creates a request for a link discovered on this request's page
    ///
    /// The child belongs to the same task, sits one level deeper, and has
    /// normal priority.
    pub fn child(&self, url: impl Into<String>, rule_name: impl Into<String>) -> Self {
        Self::new(Arc::clone(&self.task), url, rule_name).with_depth(self.depth + 1)
    }

    /// Whether this request belongs to the priority class
    pub fn is_priority(&self) -> bool {
        self.priority > 0
    }

    /// Whether the owning task bypasses visited-deduplication
    pub fn is_reload(&self) -> bool {
        self.task.options.reload
    }

    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint::of(&self.method, &self.url)
    }

    /// Checks that the request can be dispatched
    ///
    /// # Checks
    ///
    /// 1. Depth does not exceed the task's max depth
    /// 2. URL parses, uses http or https, and has a host
    /// 3. Method is GET, POST or HEAD
    /// 4. The rule name exists in the task's rule tree
    pub fn check(&self) -> Result<(), RequestError> {
        let max_depth = self.task.options.max_depth;
        if self.depth > max_depth {
            return Err(RequestError::DepthExceeded {
                url: self.url.clone(),
                depth: self.depth,
                max_depth,
            });
        }

        let parsed = Url::parse(&self.url).map_err(|e| RequestError::InvalidUrl {
            url: self.url.clone(),
            message: e.to_string(),
        })?;

        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(RequestError::UnsupportedScheme {
                url: self.url.clone(),
                scheme: parsed.scheme().to_string(),
            });
        }

        if parsed.host_str().map_or(true, str::is_empty) {
            return Err(RequestError::MissingHost {
                url: self.url.clone(),
            });
        }

        if ![Method::GET, Method::POST, Method::HEAD].contains(&self.method) {
            return Err(RequestError::UnsupportedMethod {
                url: self.url.clone(),
                method: self.method.to_string(),
            });
        }

        if !self.task.rules.has_rule(&self.rule_name) {
            return Err(RequestError::MissingRule {
                task: self.task.name.clone(),
                rule: self.rule_name.clone(),
            });
        }

        Ok(())
    }

    /// Marks this request as the single automatic retry of a failed fetch
    pub(crate) fn into_retry(mut self) -> Self {
        self.retried = true;
        self
    }
}

impl fmt::Debug for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Request")
            .field("url", &self.url)
            .field("method", &self.method)
            .field("priority", &self.priority)
            .field("task", &self.task.name)
            .field("rule_name", &self.rule_name)
            .field("depth", &self.depth)
            .field("retried", &self.retried)
            .finish()
    }
}
