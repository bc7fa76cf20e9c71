// Relevance scoring: six independent dimensions per (fragment, job) pair,
// folded into one composite score. No I/O; every function here is pure.

pub mod cache;
pub mod composite;
pub mod dimensions;
pub mod impact;
pub mod taxonomy;
pub mod weights;
