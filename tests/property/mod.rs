//! Property-based tests for query ordering and exam partitioning
