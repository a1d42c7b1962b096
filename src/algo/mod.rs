pub mod aggregate;
pub mod assemble;
pub mod buckets;
pub mod classifier;
pub mod coverage;
pub mod engine;
pub mod item;
pub mod partition;
pub mod taxonomy;
