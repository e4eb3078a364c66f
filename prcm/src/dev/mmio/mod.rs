//! Memory-mapped register windows.
//!
//! A window is the register region of one PRCM instance, mapped once and
//! shared by every reset line that lives in it. All read-modify-write
//! sequences on a window go through [IoWindow::locked], which holds the
//! window's spin lock for the whole sequence, so two lines whose bits share
//! a register never overwrite each other's update.
use crate::{ResetError, debug_ex};
use alloc::{boxed::Box, sync::Arc};
use core::{fmt::Debug, ops::Range};
use spin::Mutex;

pub mod reg;
pub mod sim;

use reg::Register;

/// 32-bit register access relative to the start of a window.
pub trait RegisterIo: Send + Sync {
    fn read32(&self, offset: usize) -> u32;
    fn write32(&self, offset: usize, value: u32);
}

impl<T: RegisterIo + ?Sized> RegisterIo for Arc<T> {
    fn read32(&self, offset: usize) -> u32 {
        (**self).read32(offset)
    }
    fn write32(&self, offset: usize, value: u32) {
        (**self).write32(offset, value)
    }
}

/// Maps the physical range of a `reg` entry into something register accesses can go through.
pub trait IoMapper {
    fn map(&self, range: Range<usize>) -> Result<Box<dyn RegisterIo>, ResetError>;
}

/// Directly accessible device memory, addressed through volatile [Register]s.
pub struct MmioRegion {
    base: usize,
}

impl MmioRegion {
    /// # Safety
    /// `base` must point at device registers that stay mapped for the
    /// lifetime of the region and every offset used must lie inside it.
    pub const unsafe fn new(base: usize) -> MmioRegion {
        MmioRegion { base }
    }
}

impl RegisterIo for MmioRegion {
    fn read32(&self, offset: usize) -> u32 {
        unsafe { Register::<u32>::at(self.base + offset) }.read()
    }
    fn write32(&self, offset: usize, value: u32) {
        unsafe { Register::<u32>::at(self.base + offset) }.write(value)
    }
}

/// Mapper for platforms where device memory is identity mapped.
pub struct IdentityMapper {
    _private: (),
}

impl IdentityMapper {
    /// # Safety
    /// Every `reg` range handed to [IoMapper::map] must be device memory that
    /// is accessible at its physical address.
    pub const unsafe fn new() -> IdentityMapper {
        IdentityMapper { _private: () }
    }
}

impl IoMapper for IdentityMapper {
    fn map(&self, range: Range<usize>) -> Result<Box<dyn RegisterIo>, ResetError> {
        if range.start == 0 || range.start % 4 != 0 {
            return Err(ResetError::AllocationFailure);
        }
        // Guaranteed by the caller of `IdentityMapper::new`.
        Ok(Box::new(unsafe { MmioRegion::new(range.start) }))
    }
}

/// A mapped register window plus the lock serializing access to it.
pub struct IoWindow {
    range: Range<usize>,
    io: Box<dyn RegisterIo>,
    lock: Mutex<()>,
}

impl IoWindow {
    pub fn map(mapper: &dyn IoMapper, range: Range<usize>) -> Result<IoWindow, ResetError> {
        let io = mapper.map(range.clone())?;
        debug_ex!("\tMapped reset registers [{:#x},{:#x}).", range.start, range.end);
        Ok(IoWindow {
            range,
            io,
            lock: Mutex::new(()),
        })
    }

    /// Size of the window in bytes.
    pub fn len(&self) -> usize {
        self.range.len()
    }

    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }

    /// Whether a 32-bit register at `offset` lies inside the window.
    pub fn contains(&self, offset: u32) -> bool {
        (offset as usize)
            .checked_add(4)
            .is_some_and(|end| end <= self.len())
    }

    /// Run `f` with exclusive access to the window's registers.
    pub fn locked<R>(&self, f: impl FnOnce(&dyn RegisterIo) -> R) -> R {
        let _guard = self.lock.lock();
        f(self.io.as_ref())
    }
}

impl Debug for IoWindow {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_fmt(format_args!("IoWindow[{:#x},{:#x})", self.range.start, self.range.end))
    }
}
