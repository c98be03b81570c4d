// Test helpers used only by the test-suite. This module is gated behind the
// `test-helpers` cargo feature so it is not included in regular builds.
//
// They give integration tests a unique scratch root with a materialized tree
// and a flat listing of what ended up on disk.

pub mod fixture;

pub use fixture::{list_entries, make_fixture, Fixture};
