use core::{
    cell::UnsafeCell,
    ptr::{read_volatile, write_volatile},
};

/// One memory-mapped register; every access is volatile.
#[repr(transparent)]
pub struct Register<T: Sized + Copy> {
    inner: UnsafeCell<T>,
}

impl<T: Sized + Copy> Register<T> {
    /// View the register at `addr`.
    ///
    /// # Safety
    /// `addr` must be a mapped, suitably aligned device register that stays
    /// mapped for `'a`.
    #[inline(always)]
    pub unsafe fn at<'a>(addr: usize) -> &'a Register<T> {
        unsafe { &*(addr as *const Register<T>) }
    }
    #[inline(always)]
    pub fn read(&self) -> T {
        unsafe { read_volatile(self.inner.get()) }
    }
    #[inline(always)]
    pub fn write(&self, value: T) {
        unsafe {
            write_volatile(self.inner.get(), value);
        }
    }
}
