#[cfg(test)]
mod test {
    use crate::error::SegmentError;
    use crate::segment::{create, open_and_size, remove};
    use std::process;

    /// Segment names are process-unique and random so parallel test runs
    /// never collide in the shared-memory namespace.
    fn test_name(tag: &str) -> String {
        format!(
            "/sysframe-membridge-{}-{}-{}",
            tag,
            process::id(),
            rand::random::<u32>()
        )
    }

    #[test]
    fn create_open_write_reopen_read() {
        let name = test_name("rw");

        assert!(create(&name, 64, false).unwrap());

        {
            let mut seg = open_and_size(&name, 0, false).unwrap();
            assert_eq!(seg.max_size(), 64);
            seg.payload_mut()[..4].copy_from_slice(b"abcd");
        }

        {
            let seg = open_and_size(&name, 0, false).unwrap();
            assert_eq!(&seg.payload()[..4], b"abcd");
        }

        assert!(remove(&name, true).unwrap());
    }

    #[test]
    fn grow_preserves_payload_and_adds_headroom() {
        let name = test_name("grow");

        assert!(create(&name, 8, false).unwrap());
        {
            let mut seg = open_and_size(&name, 0, false).unwrap();
            seg.payload_mut()[..8].copy_from_slice(b"01234567");
        }

        {
            let mut seg = open_and_size(&name, 200, false).unwrap();
            assert_eq!(seg.max_size(), 200 + 32);
            // The old payload survives the resize; the new tail is zeroed.
            assert_eq!(&seg.payload()[..8], b"01234567");
            assert!(seg.payload()[8..].iter().all(|&b| b == 0));
            seg.payload_mut()[..3].copy_from_slice(b"xyz");
        }

        {
            let seg = open_and_size(&name, 0, false).unwrap();
            assert_eq!(seg.max_size(), 232);
            assert_eq!(&seg.payload()[..3], b"xyz");
        }

        assert!(remove(&name, true).unwrap());
    }

    #[test]
    fn create_twice() {
        let name = test_name("dup");

        assert!(create(&name, 0, false).unwrap());
        assert!(!create(&name, 0, false).unwrap());
        assert!(matches!(
            create(&name, 0, true),
            Err(SegmentError::AlreadyExists(_))
        ));

        assert!(remove(&name, true).unwrap());
    }

    #[test]
    fn open_missing() {
        let name = test_name("missing");

        assert!(matches!(
            open_and_size(&name, 0, false),
            Err(SegmentError::NotFound(_))
        ));

        // Auto-create sizes the new segment for the requested payload.
        let seg = open_and_size(&name, 10, true).unwrap();
        assert_eq!(seg.max_size(), 10);
        drop(seg);

        assert!(remove(&name, true).unwrap());
    }

    #[test]
    fn remove_is_idempotent_at_the_callers_option() {
        let name = test_name("rm");

        assert!(create(&name, 0, false).unwrap());
        assert!(remove(&name, false).unwrap());
        assert!(!remove(&name, false).unwrap());
        assert!(matches!(
            remove(&name, true),
            Err(SegmentError::UnlinkFailed { .. })
        ));
    }
}
