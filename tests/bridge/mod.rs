pub mod concurrency;
pub mod lifecycle;
pub mod round_trip;

use std::process;

/// Segment names are process-unique and random so parallel test runs never
/// collide in the shared-memory namespace.
pub fn unique_name(tag: &str) -> String {
    format!(
        "/sysframe-test-{}-{}-{}",
        tag,
        process::id(),
        rand::random::<u32>()
    )
}
