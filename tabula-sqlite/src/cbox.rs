use std::ptr;

/// Owning box around a pointer allocated by sqlite, released through `dealloc`.
pub(crate) struct CBox<T> {
    ptr: *mut T,
    dealloc: fn(*mut T),
}

impl<T> CBox<T> {
    pub(crate) fn new(ptr: *mut T, dealloc: fn(*mut T)) -> Self {
        Self { ptr, dealloc }
    }

    pub(crate) fn get(&self) -> *mut T {
        self.ptr
    }

    /// Out parameter for the sqlite functions allocating the pointer.
    pub(crate) fn as_out(&mut self) -> &mut *mut T {
        &mut self.ptr
    }

    pub(crate) fn is_null(&self) -> bool {
        self.ptr.is_null()
    }

    /// Give up ownership without releasing, leaving the box null.
    pub(crate) fn take(&mut self) -> *mut T {
        std::mem::replace(&mut self.ptr, ptr::null_mut())
    }
}

impl<T> Drop for CBox<T> {
    fn drop(&mut self) {
        if !self.ptr.is_null() {
            (self.dealloc)(self.take());
        }
    }
}

// Sqlite handles are opened in serialized mode and never shared outside the box.
unsafe impl<T> Send for CBox<T> {}
unsafe impl<T> Sync for CBox<T> {}

#[cfg(test)]
mod tests {
    use super::CBox;
    use std::{
        ptr,
        sync::atomic::{AtomicUsize, Ordering},
    };

    static RELEASED: AtomicUsize = AtomicUsize::new(0);

    fn release(ptr: *mut i32) {
        RELEASED.fetch_add(1, Ordering::Relaxed);
        drop(unsafe { Box::from_raw(ptr) });
    }

    #[test]
    fn cbox_raw_pointer() {
        {
            let value = CBox::<i32>::new(ptr::null_mut(), release);
            assert!(value.is_null());
        }
        assert_eq!(RELEASED.load(Ordering::Relaxed), 0);
        {
            let value = CBox::new(Box::into_raw(Box::new(123)), release);
            assert_eq!(unsafe { *value.get() }, 123);
        }
        assert_eq!(RELEASED.load(Ordering::Relaxed), 1);
        let mut value = CBox::new(Box::into_raw(Box::new(5)), release);
        let raw = value.take();
        assert!(value.is_null());
        drop(value);
        assert_eq!(RELEASED.load(Ordering::Relaxed), 1);
        release(raw);
        assert_eq!(RELEASED.load(Ordering::Relaxed), 2);
    }
}
