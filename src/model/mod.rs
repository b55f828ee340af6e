//! Data model shared by every engine component
//!
//! - `Request`: one unit of work and its `Fingerprint`
//! - `Task`: a named crawl definition with options and a rule tree
//! - `ParseResult` / `Item`: what a rule produces from fetched content

mod request;
mod result;
mod task;

pub use request::{Fingerprint, Request};
pub use result::{Context, Item, ParseResult};
pub use task::{ParseFn, RootFn, Rule, RuleTree, Task, TaskOptions};
