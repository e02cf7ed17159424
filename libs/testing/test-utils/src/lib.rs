//! Shared test infrastructure for the domain crates.
//!
//! - [`TestDatabase`]: disposable PostgreSQL container with the workspace
//!   migrations applied (feature `postgres`, on by default)
//! - [`TestDataBuilder`]: emails and names that stay unique per test
//! - [`assertions`]: assertion helpers with context in the panic message
//!
//! ```rust,no_run
//! use test_utils::{TestDataBuilder, TestDatabase};
//!
//! #[tokio::test]
//! async fn stores_user() {
//!     let db = TestDatabase::new().await;
//!     let data = TestDataBuilder::from_test_name("stores_user");
//!
//!     let email = data.email("main");
//!     let name = data.name("user", "main");
//! }
//! ```

#[cfg(feature = "postgres")]
mod postgres;

#[cfg(feature = "postgres")]
pub use postgres::TestDatabase;

/// Seeded generator for per-test identifiers.
///
/// The same seed always yields the same values, so failures reproduce; two
/// tests with different names never collide on the unique email column.
#[derive(Debug, Clone, Copy)]
pub struct TestDataBuilder {
    seed: u64,
}

impl TestDataBuilder {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Seed from a hash of the test name
    ///
    /// ```
    /// use test_utils::TestDataBuilder;
    ///
    /// let a = TestDataBuilder::from_test_name("creates_user");
    /// let b = TestDataBuilder::from_test_name("creates_user");
    /// assert_eq!(a.email("x"), b.email("x"));
    /// ```
    pub fn from_test_name(name: &str) -> Self {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        name.hash(&mut hasher);
        Self::new(hasher.finish())
    }

    /// `test-<seed>-<suffix>@example.com`
    pub fn email(&self, suffix: &str) -> String {
        format!("test-{}-{}@example.com", self.seed, suffix)
    }

    /// `test-<prefix>-<seed>-<suffix>`, e.g. a display name or post title
    pub fn name(&self, prefix: &str, suffix: &str) -> String {
        format!("test-{}-{}-{}", prefix, self.seed, suffix)
    }
}

pub mod assertions {
    use uuid::Uuid;

    pub fn assert_uuid_eq(actual: Uuid, expected: Uuid, context: &str) {
        assert_eq!(
            actual, expected,
            "{context}: expected UUID {expected}, got {actual}"
        );
    }

    /// Unwraps `value`, panicking with `context` when it is `None`
    pub fn assert_some<T>(value: Option<T>, context: &str) -> T {
        value.unwrap_or_else(|| panic!("{context}: expected Some, got None"))
    }
}
