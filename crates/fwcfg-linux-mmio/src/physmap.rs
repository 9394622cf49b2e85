//! Physical memory mapping for the register pair
//!
//! Maps the device's register region out of /dev/mem so the selector and
//! data registers can be driven from user space. Requires root (or an
//! equivalent capability) and a kernel that exposes the range.
//!
//! # Safety
//!
//! The caller names a physical address range; nothing here can verify it
//! really is the device. The mapping functions only guarantee page
//! alignment, volatile access, and a clean unmap on drop.

use crate::error::MmioError;

/// A mapped region of physical memory
#[cfg(target_os = "linux")]
pub struct PhysMap {
    /// Pointer to the mapped memory, adjusted past the page-align offset
    ptr: *mut u8,
    /// Size of the underlying mapping
    size: usize,
    /// Physical address (for error reporting and unmap arithmetic)
    phys_addr: u64,
}

#[cfg(target_os = "linux")]
impl PhysMap {
    /// Map `size` bytes of physical memory starting at `phys_addr`.
    ///
    /// The region must be exclusively reserved for this process before
    /// mapping; nothing prevents a second mapping of the same range.
    pub fn new(phys_addr: u64, size: usize) -> Result<Self, MmioError> {
        use std::fs::OpenOptions;
        use std::os::unix::fs::OpenOptionsExt;
        use std::os::unix::io::AsRawFd;

        // O_SYNC keeps the mapping uncached, required for register access
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .custom_flags(libc::O_SYNC)
            .open("/dev/mem")
            .map_err(|source| MmioError::DevMemOpen {
                path: "/dev/mem",
                source,
            })?;

        let page_size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) } as usize;
        let page_mask = page_size - 1;
        let offset = (phys_addr as usize) & page_mask;
        let aligned_addr = phys_addr & !(page_mask as u64);
        let map_size = (size + offset + page_mask) & !page_mask;

        let ptr = unsafe {
            libc::mmap(
                std::ptr::null_mut(),
                map_size,
                libc::PROT_READ | libc::PROT_WRITE,
                libc::MAP_SHARED,
                file.as_raw_fd(),
                aligned_addr as libc::off_t,
            )
        };

        if ptr == libc::MAP_FAILED {
            return Err(MmioError::MemoryMap {
                address: phys_addr,
                size,
            });
        }

        let adjusted_ptr = unsafe { (ptr as *mut u8).add(offset) };

        Ok(Self {
            ptr: adjusted_ptr,
            size: map_size,
            phys_addr,
        })
    }

    /// Read an 8-bit value from the mapped region
    #[inline]
    pub fn read8(&self, offset: usize) -> u8 {
        debug_assert!(offset < self.size);
        unsafe { core::ptr::read_volatile(self.ptr.add(offset)) }
    }

    /// Write a 16-bit value to the mapped region
    #[inline]
    pub fn write16(&self, offset: usize, value: u16) {
        debug_assert!(offset + 2 <= self.size);
        unsafe {
            core::ptr::write_volatile(self.ptr.add(offset) as *mut u16, value);
        }
    }

    /// Get the physical address of this mapping
    pub fn phys_addr(&self) -> u64 {
        self.phys_addr
    }
}

#[cfg(target_os = "linux")]
impl Drop for PhysMap {
    fn drop(&mut self) {
        // Undo the page-align adjustment before unmapping
        let page_size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) } as usize;
        let page_mask = page_size - 1;
        let offset = (self.phys_addr as usize) & page_mask;
        let original_ptr = unsafe { self.ptr.sub(offset) };

        unsafe {
            libc::munmap(original_ptr as *mut libc::c_void, self.size);
        }
    }
}

// Register mappings carry no aliasing assumptions beyond volatility
#[cfg(target_os = "linux")]
unsafe impl Send for PhysMap {}
#[cfg(target_os = "linux")]
unsafe impl Sync for PhysMap {}

// Stub for non-Linux platforms
#[cfg(not(target_os = "linux"))]
pub struct PhysMap {
    _private: (),
}

#[cfg(not(target_os = "linux"))]
impl PhysMap {
    pub fn new(_phys_addr: u64, _size: usize) -> Result<Self, MmioError> {
        Err(MmioError::NotSupported(
            "physical memory mapping only supported on Linux",
        ))
    }

    pub fn read8(&self, _offset: usize) -> u8 {
        0
    }
    pub fn write16(&self, _offset: usize, _value: u16) {}
    pub fn phys_addr(&self) -> u64 {
        0
    }
}
