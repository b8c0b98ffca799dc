pub mod aggregator;
pub mod splitter;

#[cfg(test)]
mod aggregator_tests;
