//! ProdMatch Resolve — decides whether a description is already in the catalog.

pub mod batch;
pub mod distance;
pub mod matcher;

pub use batch::{check_batch, pair_with_clues, BatchError};
pub use distance::cosine_distance;
pub use matcher::{classify, find_closest, Decision, Matcher};
