mod classify;
mod filter;
mod segment;
#[cfg(test)]
mod tests;

pub use classify::LineClassifier;
pub use filter::EntryFilter;
pub use segment::SegmentationEngine;
