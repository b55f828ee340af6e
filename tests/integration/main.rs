//! Integration tests for the crawl engine
//!
//! Engine scenarios run against scripted in-memory fetchers; the HTTP
//! fetcher and the built-in title task run against wiremock servers.

mod support;

mod config_tests;
mod http_tests;
