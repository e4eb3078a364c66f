//! Strong and weak handles for state shared between a controller and the
//! objects that point back at it.
//!
//! - [Handle<T>] owns the object through an [Arc]. A controller keeps exactly one
//!   long-lived handle to its register window; the framework keeps one to each
//!   registered controller.
//! - [HandleRef<T>] is the non-owning side. Reset-line descriptors refer to their
//!   window and consumers refer to their controller through it, so tearing down the
//!   owner is never blocked by them.
//!
//! Call [HandleRef::get_handle] before every use; it returns [None] once the owner
//! has been dropped and **consumers must handle that case explicitly.**
use alloc::sync::{Arc, Weak};
use core::{fmt, ops::Deref};

/// Strong owning handle backed by [Arc<T>].
pub struct Handle<T> {
    inner: Arc<T>,
}

impl<T> Deref for Handle<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.inner
    }
}

impl<T> From<T> for Handle<T> {
    fn from(value: T) -> Self {
        Self {
            inner: Arc::new(value),
        }
    }
}

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.inner.fmt(f)
    }
}

impl<T> Handle<T> {
    /// Create a non-owning [HandleRef<T>] to the same object.
    pub fn create_ref(&self) -> HandleRef<T> {
        HandleRef {
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Whether both handles point at the same object.
    pub fn ptr_eq(this: &Handle<T>, other: &Handle<T>) -> bool {
        Arc::ptr_eq(&this.inner, &other.inner)
    }
}

/// Weak (non-owning) handle backed by [Weak<T>].
pub struct HandleRef<T> {
    inner: Weak<T>,
}

impl<T> Clone for HandleRef<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> fmt::Debug for HandleRef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_fmt(format_args!("HandleRef({:p})", self.inner.as_ptr()))
    }
}

impl<T> HandleRef<T> {
    /// A reference that never upgrades.
    pub const fn dangling() -> HandleRef<T> {
        HandleRef { inner: Weak::new() }
    }

    /// Upgrade into a strong [Handle<T>] if the owner is still alive.
    pub fn get_handle(&self) -> Option<Handle<T>> {
        Weak::upgrade(&self.inner).map(|inner| Handle { inner })
    }

    pub fn ptr_eq(&self, other: &HandleRef<T>) -> bool {
        Weak::ptr_eq(&self.inner, &other.inner)
    }
}
