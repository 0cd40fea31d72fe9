//! ID generation utilities.

use ulid::Ulid;

/// Length of every generated identifier.
pub const ID_LEN: usize = 26;

/// ID generator for entities.
///
/// Ids are lowercase ULIDs: fixed width and ordered by creation time, so
/// sorting ids (or `/`-joined id paths) as plain strings sorts by age.
#[derive(Debug, Clone, Default)]
pub struct IdGenerator {
    _private: (),
}

impl IdGenerator {
    /// Create a new ID generator.
    #[must_use]
    pub const fn new() -> Self {
        Self { _private: () }
    }

    /// Generate a new ULID-based ID.
    #[must_use]
    pub fn generate(&self) -> String {
        Ulid::new().to_string().to_lowercase()
    }
}
