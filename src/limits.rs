//! Resource limits applied while parsing.

/// Bounds on the documents the parser accepts.
///
/// The defaults are generous; they exist so that hostile input arriving over
/// a transport cannot exhaust the stack or memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Maximum nesting of objects and arrays. The top-level container is depth 1.
    pub max_nesting_depth: usize,
    /// Maximum raw (still escaped) length of a single string, in bytes.
    pub max_string_length: usize,
}

impl Limits {
    pub const DEFAULT_NESTING_DEPTH: usize = 512;
    pub const DEFAULT_STRING_LENGTH: usize = 16 * 1024 * 1024;

    pub const fn unlimited() -> Self {
        Self {
            max_nesting_depth: usize::MAX,
            max_string_length: usize::MAX,
        }
    }

    pub const fn with_nesting_depth(self, max_nesting_depth: usize) -> Self {
        Self {
            max_nesting_depth,
            ..self
        }
    }

    pub const fn with_string_length(self, max_string_length: usize) -> Self {
        Self {
            max_string_length,
            ..self
        }
    }
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_nesting_depth: Self::DEFAULT_NESTING_DEPTH,
            max_string_length: Self::DEFAULT_STRING_LENGTH,
        }
    }
}
