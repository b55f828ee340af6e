use crate::crawler::Fetcher;
use crate::model::{Context, ParseResult, Request};
use crate::ParseError;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Generates a task's root requests
pub type RootFn = Arc<dyn Fn(&Arc<Task>) -> Result<Vec<Request>, ParseError> + Send + Sync>;

/// Parses fetched content into items and discovered requests
pub type ParseFn = Arc<dyn Fn(&Context<'_>) -> Result<ParseResult, ParseError> + Send + Sync>;

/// Per-task crawl options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskOptions {
    /// Skip visited-deduplication for every request of this task
    pub reload: bool,

    /// Minimum time between two fetches of this task (enforced by the fetcher)
    pub wait_time: Duration,

    /// Requests deeper than this are rejected
    pub max_depth: u32,
}

impl Default for TaskOptions {
    fn default() -> Self {
        Self {
            reload: false,
            wait_time: Duration::ZERO,
            max_depth: 3,
        }
    }
}

/// A named parsing rule
#[derive(Clone)]
pub struct Rule {
    /// Field names this rule puts into its items
    pub item_fields: Vec<String>,
    parse: ParseFn,
}

impl Rule {
    pub fn new<I, S, F>(item_fields: I, parse: F) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: Fn(&Context<'_>) -> Result<ParseResult, ParseError> + Send + Sync + 'static,
    {
        Self {
            item_fields: item_fields.into_iter().map(Into::into).collect(),
            parse: Arc::new(parse),
        }
    }

    pub fn parse(&self, ctx: &Context<'_>) -> Result<ParseResult, ParseError> {
        (self.parse)(ctx)
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("item_fields", &self.item_fields)
            .finish_non_exhaustive()
    }
}

/// Root-request generator plus the rules requests can name
#[derive(Clone)]
pub struct RuleTree {
    root: RootFn,
    trunk: HashMap<String, Rule>,
}

impl RuleTree {
    pub fn new<F>(root: F) -> Self
    where
        F: Fn(&Arc<Task>) -> Result<Vec<Request>, ParseError> + Send + Sync + 'static,
    {
        Self {
            root: Arc::new(root),
            trunk: HashMap::new(),
        }
    }

    pub fn with_rule(mut self, name: impl Into<String>, rule: Rule) -> Self {
        self.trunk.insert(name.into(), rule);
        self
    }

    pub fn rule(&self, name: &str) -> Option<&Rule> {
        self.trunk.get(name)
    }

    pub fn has_rule(&self, name: &str) -> bool {
        self.trunk.contains_key(name)
    }

    /// Rule names in sorted order
    pub fn rule_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.trunk.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for RuleTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleTree")
            .field("rules", &self.rule_names())
            .finish_non_exhaustive()
    }
}

/// A named crawl definition
///
/// Tasks are immutable once registered. A seed may run a task with a
/// different fetcher, which produces a new `Task` value via
/// [`Task::with_fetcher`].
#[derive(Clone)]
pub struct Task {
    pub name: String,
    pub options: TaskOptions,
    pub fetcher: Arc<dyn Fetcher>,
    pub rules: RuleTree,
}

impl Task {
    pub fn new(name: impl Into<String>, fetcher: Arc<dyn Fetcher>, rules: RuleTree) -> Self {
        Self {
            name: name.into(),
            options: TaskOptions::default(),
            fetcher,
            rules,
        }
    }

    pub fn with_options(mut self, options: TaskOptions) -> Self {
        self.options = options;
        self
    }

    /// Returns a copy of this task that fetches through `fetcher`
    pub fn with_fetcher(&self, fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            fetcher,
            ..self.clone()
        }
    }

    /// Runs the root generator; every returned request belongs to `task`
    pub fn root_requests(task: &Arc<Task>) -> Result<Vec<Request>, ParseError> {
        (task.rules.root)(task)
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("name", &self.name)
            .field("options", &self.options)
            .field("rules", &self.rules)
            .finish_non_exhaustive()
    }
}
