//! Tests for token repository implementations
