//! The shared-segment lifecycle: create, open-and-size, remove.
//!
//! A segment's backing object holds a [`SegmentHeader`] at offset 0 and
//! `max_size` payload bytes after it. The header's mutex is initialized
//! once, at create time, with `PTHREAD_PROCESS_SHARED`; every mapping
//! returned by [`open_and_size`] holds it until the mapping is dropped.

use crate::error::SegmentError;
use std::ffi::CString;
use std::io;
use std::mem;
use std::ptr;
use std::slice;
use tracing::debug;

/// Extra payload capacity added on every grow, amortizing repeated resizes.
const GROW_HEADROOM: usize = 32;

/// Lives at offset 0 of every segment. `max_size` is the payload capacity;
/// the file extent is `HEADER_SIZE + max_size`.
#[repr(C)]
struct SegmentHeader {
    max_size: usize,
    mutex: libc::pthread_mutex_t,
}

const HEADER_SIZE: usize = mem::size_of::<SegmentHeader>();

fn shm_name(name: &str) -> Result<CString, SegmentError> {
    CString::new(name).map_err(|e| SegmentError::OpenFailed {
        name: name.to_string(),
        source: io::Error::new(io::ErrorKind::InvalidInput, e),
    })
}

/// Create a named segment with `prealloc_size` bytes of payload capacity.
///
/// Returns `Ok(false)` when the segment already existed and
/// `error_if_exists` is off; the existing segment is left untouched.
pub(crate) fn create(
    name: &str,
    prealloc_size: usize,
    error_if_exists: bool,
) -> Result<bool, SegmentError> {
    let c_name = shm_name(name)?;

    // SAFETY: c_name is a valid NUL-terminated string.
    let fd = unsafe {
        libc::shm_open(
            c_name.as_ptr(),
            libc::O_CREAT | libc::O_EXCL | libc::O_RDWR,
            0o666,
        )
    };
    if fd == -1 {
        let err = io::Error::last_os_error();
        if err.raw_os_error() == Some(libc::EEXIST) {
            if error_if_exists {
                return Err(SegmentError::AlreadyExists(name.to_string()));
            }
            return Ok(false);
        }
        return Err(SegmentError::OpenFailed {
            name: name.to_string(),
            source: err,
        });
    }

    let unwind = |err: SegmentError| {
        // SAFETY: fd is ours; the object was created by us and is unusable.
        unsafe {
            libc::close(fd);
            libc::shm_unlink(c_name.as_ptr());
        }
        Err(err)
    };

    // SAFETY: fd is open for writing.
    if unsafe { libc::ftruncate(fd, (HEADER_SIZE + prealloc_size) as libc::off_t) } == -1 {
        return unwind(SegmentError::TruncateFailed {
            name: name.to_string(),
            source: io::Error::last_os_error(),
        });
    }

    // SAFETY: mapping HEADER_SIZE bytes of a file at least that long.
    let head_ptr = unsafe {
        libc::mmap(
            ptr::null_mut(),
            HEADER_SIZE,
            libc::PROT_READ | libc::PROT_WRITE,
            libc::MAP_SHARED,
            fd,
            0,
        )
    };
    if head_ptr == libc::MAP_FAILED {
        return unwind(SegmentError::MapFailed {
            name: name.to_string(),
            source: io::Error::last_os_error(),
        });
    }

    // SAFETY: head_ptr maps a zeroed header; the attr calls follow the
    // documented init/set/destroy order.
    let rc = unsafe {
        let header = head_ptr as *mut SegmentHeader;
        let mut attr = mem::MaybeUninit::<libc::pthread_mutexattr_t>::uninit();
        libc::pthread_mutexattr_init(attr.as_mut_ptr());
        libc::pthread_mutexattr_setpshared(attr.as_mut_ptr(), libc::PTHREAD_PROCESS_SHARED);
        let rc = libc::pthread_mutex_init(&mut (*header).mutex, attr.as_ptr());
        libc::pthread_mutexattr_destroy(attr.as_mut_ptr());
        if rc == 0 {
            (*header).max_size = prealloc_size;
        }
        rc
    };
    if rc != 0 {
        // SAFETY: unmapping the mapping made above.
        unsafe {
            libc::munmap(head_ptr, HEADER_SIZE);
        }
        return unwind(SegmentError::MutexInitFailed {
            name: name.to_string(),
            code: rc,
        });
    }

    // SAFETY: the header mapping and fd are no longer needed; the object
    // itself persists until unlinked.
    unsafe {
        libc::munmap(head_ptr, HEADER_SIZE);
        libc::close(fd);
    }

    debug!(name, prealloc_size, "created shared segment");
    Ok(true)
}

/// Open a segment, lock it, and map its full extent, growing the payload
/// capacity to hold `new_size` bytes first if it cannot already.
///
/// On `ENOENT` with `auto_create` set, the segment is created (sized for
/// `new_size`) and opened; losing a create race to another process is fine,
/// the winner's segment is opened instead.
pub(crate) fn open_and_size(
    name: &str,
    new_size: usize,
    auto_create: bool,
) -> Result<MappedSegment, SegmentError> {
    let c_name = shm_name(name)?;

    // SAFETY: c_name is a valid NUL-terminated string.
    let mut fd = unsafe { libc::shm_open(c_name.as_ptr(), libc::O_RDWR, 0o666) };
    if fd == -1 {
        let err = io::Error::last_os_error();
        if err.raw_os_error() != Some(libc::ENOENT) {
            return Err(SegmentError::OpenFailed {
                name: name.to_string(),
                source: err,
            });
        }
        if !auto_create {
            return Err(SegmentError::NotFound(name.to_string()));
        }
        create(name, new_size, false)?;
        // SAFETY: as above.
        fd = unsafe { libc::shm_open(c_name.as_ptr(), libc::O_RDWR, 0o666) };
        if fd == -1 {
            return Err(SegmentError::OpenFailed {
                name: name.to_string(),
                source: io::Error::last_os_error(),
            });
        }
    }

    // Map the header alone first; the capacity is only trustworthy once the
    // mutex is held.
    // SAFETY: every live segment is at least HEADER_SIZE long.
    let head_ptr = unsafe {
        libc::mmap(
            ptr::null_mut(),
            HEADER_SIZE,
            libc::PROT_READ | libc::PROT_WRITE,
            libc::MAP_SHARED,
            fd,
            0,
        )
    };
    if head_ptr == libc::MAP_FAILED {
        let err = io::Error::last_os_error();
        // SAFETY: closing our fd.
        unsafe {
            libc::close(fd);
        }
        return Err(SegmentError::MapFailed {
            name: name.to_string(),
            source: err,
        });
    }
    let header = head_ptr as *mut SegmentHeader;

    // Blocking, no timeout. A process that crashes while holding the lock
    // wedges the segment; operators remove and recreate it.
    // SAFETY: the mutex was initialized process-shared at create time.
    let rc = unsafe { libc::pthread_mutex_lock(&mut (*header).mutex) };
    debug_assert_eq!(rc, 0);

    // Re-read the capacity under the lock; a concurrent grow may have
    // resized the object since we mapped the header.
    // SAFETY: header points at the mapped header.
    let mut max_size = unsafe { (*header).max_size };

    if new_size > max_size {
        max_size = new_size + GROW_HEADROOM;
        // SAFETY: fd is open for writing; growing never invalidates
        // existing mappings.
        if unsafe { libc::ftruncate(fd, (HEADER_SIZE + max_size) as libc::off_t) } == -1 {
            let err = io::Error::last_os_error();
            // SAFETY: releasing what this call acquired, in lock-then-map
            // reverse order.
            unsafe {
                libc::pthread_mutex_unlock(&mut (*header).mutex);
                libc::munmap(head_ptr, HEADER_SIZE);
                libc::close(fd);
            }
            return Err(SegmentError::TruncateFailed {
                name: name.to_string(),
                source: err,
            });
        }
        // SAFETY: header points at the mapped header.
        unsafe {
            (*header).max_size = max_size;
        }
        debug!(name, max_size, "grew shared segment");
    }

    let map_len = HEADER_SIZE + max_size;
    // SAFETY: the object is map_len bytes long and fd stays open until the
    // mapping is established.
    let full_ptr = unsafe {
        libc::mmap(
            ptr::null_mut(),
            map_len,
            libc::PROT_READ | libc::PROT_WRITE,
            libc::MAP_SHARED,
            fd,
            0,
        )
    };
    if full_ptr == libc::MAP_FAILED {
        let err = io::Error::last_os_error();
        // SAFETY: as in the grow failure path.
        unsafe {
            libc::pthread_mutex_unlock(&mut (*header).mutex);
            libc::munmap(head_ptr, HEADER_SIZE);
            libc::close(fd);
        }
        return Err(SegmentError::MapFailed {
            name: name.to_string(),
            source: err,
        });
    }

    // The mutex state lives in the object, not in our mapping, so the lock
    // stays held across dropping the header-only view.
    // SAFETY: the small mapping is replaced by the full one; the fd is no
    // longer needed once mapped.
    unsafe {
        libc::munmap(head_ptr, HEADER_SIZE);
        libc::close(fd);
    }

    Ok(MappedSegment {
        header: full_ptr as *mut SegmentHeader,
        map_len,
    })
}

/// Unlink a named segment. Existing mappings keep working; the name is
/// freed for reuse. Users are not drained; callers coordinate externally.
pub(crate) fn remove(name: &str, throw_error: bool) -> Result<bool, SegmentError> {
    let c_name = shm_name(name)?;
    // SAFETY: c_name is a valid NUL-terminated string.
    if unsafe { libc::shm_unlink(c_name.as_ptr()) } == -1 {
        let err = io::Error::last_os_error();
        if throw_error {
            return Err(SegmentError::UnlinkFailed {
                name: name.to_string(),
                source: err,
            });
        }
        return Ok(false);
    }
    debug!(name, "unlinked shared segment");
    Ok(true)
}

/// A locked, fully mapped segment. The segment mutex is held from
/// [`open_and_size`] until drop; the payload must only be touched through
/// this mapping, and nothing may borrow from it past the drop.
pub(crate) struct MappedSegment {
    header: *mut SegmentHeader,
    map_len: usize,
}

impl MappedSegment {
    pub(crate) fn max_size(&self) -> usize {
        self.map_len - HEADER_SIZE
    }

    pub(crate) fn payload(&self) -> &[u8] {
        // SAFETY: the mapping covers HEADER_SIZE + max_size bytes and the
        // slice borrows self, so it cannot outlive the mapping.
        unsafe {
            slice::from_raw_parts((self.header as *const u8).add(HEADER_SIZE), self.max_size())
        }
    }

    pub(crate) fn payload_mut(&mut self) -> &mut [u8] {
        // SAFETY: as payload(), and the mutex makes the access exclusive
        // across processes.
        unsafe {
            slice::from_raw_parts_mut((self.header as *mut u8).add(HEADER_SIZE), self.max_size())
        }
    }
}

impl Drop for MappedSegment {
    fn drop(&mut self) {
        // The lock is released strictly before the unmap.
        // SAFETY: this mapping locked the mutex in open_and_size and owns
        // the mapping.
        unsafe {
            libc::pthread_mutex_unlock(&mut (*self.header).mutex);
            libc::munmap(self.header as *mut libc::c_void, self.map_len);
        }
    }
}

// SAFETY: the mapping is exclusively owned and the segment mutex serializes
// shared access to the underlying memory.
unsafe impl Send for MappedSegment {}
