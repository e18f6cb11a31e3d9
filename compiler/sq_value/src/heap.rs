//! Shared immutable storage for heap-allocated values.

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

/// `Arc` wrapper whose constructor is private to this crate, so every heap
/// value is built through a `Value` factory method.
pub struct Heap<T: ?Sized>(Arc<T>);

impl<T> Heap<T> {
    pub(crate) fn new(value: T) -> Self {
        Heap(Arc::new(value))
    }
}

impl<T: ?Sized> Heap<T> {
    /// Whether both handles share one allocation.
    pub fn ptr_eq(&self, other: &Heap<T>) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Address of the shared allocation, stable for the value's lifetime.
    /// Used as a dedup key when serializing.
    pub fn address(&self) -> usize {
        Arc::as_ptr(&self.0).cast::<()>() as usize
    }
}

impl<T: ?Sized> Clone for Heap<T> {
    fn clone(&self) -> Self {
        Heap(Arc::clone(&self.0))
    }
}

impl<T: ?Sized> Deref for Heap<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T: ?Sized + PartialEq> PartialEq for Heap<T> {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || *self.0 == *other.0
    }
}

impl<T: ?Sized + fmt::Debug> fmt::Debug for Heap<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl<T: ?Sized + fmt::Display> fmt::Display for Heap<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heap_deref() {
        let h = Heap::new(42i64);
        assert_eq!(*h, 42);
    }

    #[test]
    fn test_heap_clone_shares() {
        let h1 = Heap::new(vec![1, 2, 3]);
        let h2 = h1.clone();
        assert!(h1.ptr_eq(&h2));
        assert_eq!(h1.address(), h2.address());
    }

    #[test]
    fn test_heap_displays_its_value() {
        let h = Heap::new(2.5f64);
        assert_eq!(h.to_string(), "2.5");
    }

    #[test]
    fn test_heap_eq_is_structural() {
        let h1 = Heap::new("hello".to_string());
        let h2 = Heap::new("hello".to_string());
        let h3 = Heap::new("world".to_string());
        assert_eq!(h1, h2);
        assert!(!h1.ptr_eq(&h2));
        assert_ne!(h1, h3);
    }
}
