use super::unique_name;
use anyhow::Result;
use sysframe::{
    create_memory, read_memory, remove_memory, write_memory, Error, SegmentError, Value,
};

pub fn create_flags() -> Result<()> {
    let name = unique_name("create");

    assert!(create_memory(&name, 0, false)?);
    // The benign race: the segment is already there.
    assert!(!create_memory(&name, 0, false)?);
    assert!(matches!(
        create_memory(&name, 0, true),
        Err(Error::Segment(SegmentError::AlreadyExists(_)))
    ));

    assert!(remove_memory(&name, true)?);
    Ok(())
}

pub fn remove_flags() -> Result<()> {
    let name = unique_name("remove");

    create_memory(&name, 0, false)?;
    assert!(remove_memory(&name, false)?);
    // Already gone: false by default, an error on request.
    assert!(!remove_memory(&name, false)?);
    assert!(matches!(
        remove_memory(&name, true),
        Err(Error::Segment(SegmentError::UnlinkFailed { .. }))
    ));
    Ok(())
}

pub fn write_without_create() -> Result<()> {
    let name = unique_name("nocreate");

    assert!(matches!(
        write_memory(&name, &Value::from(1i64), false),
        Err(Error::Segment(SegmentError::NotFound(_)))
    ));
    assert!(matches!(
        read_memory(&name),
        Err(Error::Segment(SegmentError::NotFound(_)))
    ));

    // With create on, the first write brings the segment into being.
    assert!(write_memory(&name, &Value::from(1i64), true)?);
    assert_eq!(Value::from(1i64), read_memory(&name)?);

    assert!(remove_memory(&name, true)?);
    Ok(())
}
