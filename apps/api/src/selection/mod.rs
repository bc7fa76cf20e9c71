// Selection: scope inclusion, per-scope ranking under budget, keyword coverage.
// The engine is synchronous and CPU-bound; handlers move it off the async runtime.

pub mod coverage;
pub mod engine;
pub mod handlers;
pub mod scope;
pub mod selector;
