// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

// Argument charset lookup through the host's component registry
//
// The server exports `mysql_plugin_registry_acquire`; from the registry we
// acquire the `mysql_udf_metadata` service and ask it for the "charset"
// attribute of each string argument. Hosts without the registry leave the
// symbol unresolved, and every string argument is treated as text.

use crate::udf_abi::UdfArgs;
use std::ffi::CStr;
use std::os::raw::{c_char, c_int, c_uint, c_void};
use std::ptr::{self, NonNull};

macro_rules! c_str {
    ($s:expr) => {
        concat!($s, "\0").as_ptr() as *const c_char
    };
}

/// Host service status, 0 on success
type ServiceStatus = c_int;

type RegistryAcquireFn = unsafe extern "C" fn() -> *mut Registry;
type RegistryReleaseFn = unsafe extern "C" fn(*mut Registry) -> c_int;

/// The registry service (matches the host's `SERVICE_TYPE(registry)`)
#[repr(C)]
struct Registry {
    acquire: Option<unsafe extern "C" fn(*const c_char, *mut *mut c_void) -> ServiceStatus>,
    _acquire_related:
        Option<unsafe extern "C" fn(*const c_char, *mut c_void, *mut *mut c_void) -> ServiceStatus>,
    release: Option<unsafe extern "C" fn(*mut c_void) -> ServiceStatus>,
}

/// The metadata service (matches the host's `SERVICE_TYPE(mysql_udf_metadata)`)
#[repr(C)]
struct MetadataService {
    argument_get: Option<
        unsafe extern "C" fn(*mut UdfArgs, *const c_char, c_uint, *mut *mut c_void) -> ServiceStatus,
    >,
    _result_get: *const c_void,
    _argument_set: *const c_void,
    _result_set: *const c_void,
}

/// Source of per-argument charset names
pub trait ArgumentCharsets {
    /// Charset name of string argument `index`, if the host reports one
    ///
    /// # Safety
    /// `args` must be the record the host passed to the current setup call.
    unsafe fn charset(&self, args: &UdfArgs, index: usize) -> Option<String>;
}

impl<T: ArgumentCharsets> ArgumentCharsets for Option<T> {
    unsafe fn charset(&self, args: &UdfArgs, index: usize) -> Option<String> {
        self.as_ref()?.charset(args, index)
    }
}

/// Acquired handle on the host's metadata service, released on drop
pub struct UdfMetadata {
    registry: NonNull<Registry>,
    release_registry: RegistryReleaseFn,
    service: NonNull<MetadataService>,
}

impl UdfMetadata {
    /// Acquire the metadata service, `None` when the host does not provide one
    pub fn acquire() -> Option<Self> {
        unsafe {
            let acquire_sym = libc::dlsym(libc::RTLD_DEFAULT, c_str!("mysql_plugin_registry_acquire"));
            let release_sym = libc::dlsym(libc::RTLD_DEFAULT, c_str!("mysql_plugin_registry_release"));
            if acquire_sym.is_null() || release_sym.is_null() {
                log::debug!("component registry not exported by host, string arguments are text");
                return None;
            }
            let acquire_registry: RegistryAcquireFn = std::mem::transmute(acquire_sym);
            let release_registry: RegistryReleaseFn = std::mem::transmute(release_sym);

            let registry = NonNull::new(acquire_registry())?;
            let acquire = match registry.as_ref().acquire {
                Some(f) => f,
                None => {
                    release_registry(registry.as_ptr());
                    return None;
                }
            };

            let mut handle: *mut c_void = ptr::null_mut();
            let status = acquire(c_str!("mysql_udf_metadata"), &mut handle);
            match NonNull::new(handle as *mut MetadataService) {
                Some(service) if status == 0 => Some(UdfMetadata {
                    registry,
                    release_registry,
                    service,
                }),
                _ => {
                    log::warn!("mysql_udf_metadata service unavailable (status {})", status);
                    release_registry(registry.as_ptr());
                    None
                }
            }
        }
    }
}

impl ArgumentCharsets for UdfMetadata {
    unsafe fn charset(&self, args: &UdfArgs, index: usize) -> Option<String> {
        let argument_get = self.service.as_ref().argument_get?;
        let index = c_uint::try_from(index).ok()?;

        let mut value: *mut c_void = ptr::null_mut();
        let status = argument_get(
            args as *const UdfArgs as *mut UdfArgs,
            c_str!("charset"),
            index,
            &mut value,
        );
        if status != 0 || value.is_null() {
            log::debug!("no charset for argument {} (status {})", index, status);
            return None;
        }

        let name = CStr::from_ptr(value as *const c_char).to_string_lossy().into_owned();
        log::trace!("argument {} charset={}", index, name);
        Some(name)
    }
}

impl Drop for UdfMetadata {
    fn drop(&mut self) {
        unsafe {
            if let Some(release) = self.registry.as_ref().release {
                release(self.service.as_ptr() as *mut c_void);
            }
            (self.release_registry)(self.registry.as_ptr());
        }
    }
}
