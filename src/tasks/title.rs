use crate::crawler::{parse_html, Fetcher};
use crate::model::{ParseResult, Request, Rule, RuleTree, Task, TaskOptions};
use crate::ParseError;
use std::sync::Arc;
use url::Url;

/// Rule that extracts the page title
pub const TITLE_RULE: &str = "parse_title";

/// Item field holding the title
pub const TITLE_FIELD: &str = "title";

/// Builds a task that records the `<title>` of every page it fetches
///
/// Seeds become priority requests. With `follow_links`, every http(s) link
/// on a page is queued one level deeper with the same rule, up to the
/// task's max depth.
///
/// # Example
///
/// ```
/// use crawl_engine::tasks::title_task;
/// use crawl_engine::{HttpFetcher, TaskOptions};
/// use crawl_engine::config::UserAgentConfig;
/// use std::sync::Arc;
///
/// let agent = UserAgentConfig {
///     crawler_name: "CrawlEngine".to_string(),
///     crawler_version: "0.1".to_string(),
///     contact_url: "https://example.com/about".to_string(),
///     contact_email: "ops@example.com".to_string(),
/// };
/// let fetcher = Arc::new(HttpFetcher::new(&agent).unwrap());
/// let task = title_task(
///     "titles",
///     vec!["https://example.com/".to_string()],
///     TaskOptions::default(),
///     false,
///     fetcher,
/// );
/// assert_eq!(task.rules.rule_names(), vec!["parse_title"]);
/// ```
pub fn title_task(
    name: impl Into<String>,
    seeds: Vec<String>,
    options: TaskOptions,
    follow_links: bool,
    fetcher: Arc<dyn Fetcher>,
) -> Task {
    let rules = RuleTree::new(move |task: &Arc<Task>| {
        Ok(seeds
            .iter()
            .map(|seed| Request::new(Arc::clone(task), seed.clone(), TITLE_RULE).with_priority(1))
            .collect())
    })
    .with_rule(
        TITLE_RULE,
        Rule::new([TITLE_FIELD], move |ctx| {
            let base = Url::parse(&ctx.request.url)
                .map_err(|e| ParseError::Document(format!("{}: {}", ctx.request.url, e)))?;
            let page = parse_html(&ctx.text(), &base);

            let mut result = ParseResult::new();
            result.add_item(ctx.output([(TITLE_FIELD, page.title.unwrap_or_default())]));
            if follow_links {
                for link in page.links {
                    result.add_request(ctx.follow(link, TITLE_RULE));
                }
            }
            Ok(result)
        }),
    );

    Task::new(name, fetcher, rules).with_options(options)
}
