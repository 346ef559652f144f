//! Shared-memory body representation (Linux)
//!
//! A `ShareableResourceHandle` owns a sealed memfd holding a cache
//! entry body. The descriptor can be duplicated and handed to another
//! process, which maps the same pages read-only; the body crosses the
//! process boundary without a copy. Sealing guarantees the bytes can
//! never change underneath an existing mapping.

use std::fs::File;
use std::io::{self, Write};
use std::os::fd::{AsRawFd, FromRawFd, OwnedFd, RawFd};

/// OS capability for copy-free body handoff across processes.
#[derive(Debug)]
pub struct ShareableResourceHandle {
    fd: OwnedFd,
    len: usize,
}

impl ShareableResourceHandle {
    /// Allocate a sealed memfd containing `bytes`.
    pub fn allocate(bytes: &[u8]) -> io::Result<Self> {
        const NAME: &[u8] = b"netcache-body\0";

        let raw = unsafe {
            libc::memfd_create(
                NAME.as_ptr().cast(),
                libc::MFD_CLOEXEC | libc::MFD_ALLOW_SEALING,
            )
        };
        if raw < 0 {
            return Err(io::Error::last_os_error());
        }
        let fd = unsafe { OwnedFd::from_raw_fd(raw) };

        let mut file = File::from(fd.try_clone()?);
        file.write_all(bytes)?;

        // Seal size and contents; every mapping, local or remote, sees
        // immutable bytes from here on.
        let seals =
            libc::F_SEAL_SHRINK | libc::F_SEAL_GROW | libc::F_SEAL_WRITE | libc::F_SEAL_SEAL;
        if unsafe { libc::fcntl(fd.as_raw_fd(), libc::F_ADD_SEALS, seals) } < 0 {
            return Err(io::Error::last_os_error());
        }

        Ok(Self {
            fd,
            len: bytes.len(),
        })
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Raw descriptor for transfer over an IPC channel. Ownership stays
    /// with this handle.
    pub fn as_raw_fd(&self) -> RawFd {
        self.fd.as_raw_fd()
    }

    /// Duplicate the handle for handoff to another owner. The kernel
    /// object and its pages are shared, not copied.
    pub fn try_clone(&self) -> io::Result<Self> {
        Ok(Self {
            fd: self.fd.try_clone()?,
            len: self.len,
        })
    }

    /// Map the body read-only into this process.
    pub fn map(&self) -> io::Result<SharedMapping> {
        SharedMapping::new(&self.fd, self.len)
    }
}

/// Read-only view of a mapped handle. The underlying pages are sealed
/// immutable, so concurrent reads from any number of threads are safe.
#[derive(Debug)]
pub struct SharedMapping {
    ptr: *mut libc::c_void,
    len: usize,
}

impl SharedMapping {
    fn new(fd: &OwnedFd, len: usize) -> io::Result<Self> {
        if len == 0 {
            // mmap rejects zero-length mappings
            return Ok(Self {
                ptr: std::ptr::null_mut(),
                len: 0,
            });
        }

        let ptr = unsafe {
            libc::mmap(
                std::ptr::null_mut(),
                len,
                libc::PROT_READ,
                libc::MAP_SHARED,
                fd.as_raw_fd(),
                0,
            )
        };
        if ptr == libc::MAP_FAILED {
            return Err(io::Error::last_os_error());
        }

        Ok(Self { ptr, len })
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl std::ops::Deref for SharedMapping {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        if self.len == 0 {
            return &[];
        }
        unsafe { std::slice::from_raw_parts(self.ptr.cast(), self.len) }
    }
}

impl Drop for SharedMapping {
    fn drop(&mut self) {
        if !self.ptr.is_null() {
            unsafe {
                libc::munmap(self.ptr, self.len);
            }
        }
    }
}

unsafe impl Send for SharedMapping {}
unsafe impl Sync for SharedMapping {}
