use anyhow::Result;

mod bridge;
use bridge::{concurrency, lifecycle, round_trip};

#[test]
fn test_main() -> Result<()> {
    round_trip::corpus()?;
    round_trip::growth()?;
    round_trip::stale_tail()?;
    round_trip::empty_segment_reads_as_none()?;

    lifecycle::create_flags()?;
    lifecycle::remove_flags()?;
    lifecycle::write_without_create()?;

    concurrency::serialized_writers_and_readers()?;

    Ok(())
}
