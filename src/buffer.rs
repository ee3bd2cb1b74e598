// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

// Output buffers handed to the host
//
// Allocated with the C allocator so the host can release them with `free()`.
// Until `into_raw` is called the buffer is ours and is freed on drop.

use crate::error::InvokeError;
use std::mem::ManuallyDrop;
use std::os::raw::c_char;
use std::ptr::NonNull;
use std::slice;

pub struct OutputBuffer {
    ptr: NonNull<u8>,
    len: usize,
}

impl OutputBuffer {
    /// Allocate exactly `len` zeroed bytes (one byte for an empty result, so the
    /// pointer returned to the host is never null).
    pub fn alloc(len: usize) -> Result<Self, InvokeError> {
        let raw = unsafe { libc::calloc(len.max(1), 1) } as *mut u8;
        match NonNull::new(raw) {
            Some(ptr) => Ok(Self { ptr, len }),
            None => {
                log::error!("calloc({}) failed", len.max(1));
                Err(InvokeError::Allocation { len })
            }
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn as_slice(&self) -> &[u8] {
        unsafe { slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        unsafe { slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }

    /// Give up ownership. The caller must eventually pass the pointer to `free()`.
    pub fn into_raw(self) -> (*mut c_char, usize) {
        let this = ManuallyDrop::new(self);
        (this.ptr.as_ptr() as *mut c_char, this.len)
    }
}

impl Drop for OutputBuffer {
    fn drop(&mut self) {
        unsafe { libc::free(self.ptr.as_ptr() as *mut libc::c_void) };
    }
}

impl std::fmt::Debug for OutputBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutputBuffer")
            .field("ptr", &self.ptr)
            .field("len", &self.len)
            .finish()
    }
}
