//! Built-in tasks
//!
//! Ready-made rule trees that need nothing beyond a fetcher and a list of
//! seed URLs. The CLI builds one of these per `[[task]]` config entry.

mod title;

pub use title::{title_task, TITLE_FIELD, TITLE_RULE};
