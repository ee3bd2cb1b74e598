// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Negative test cases for the `b64u` entry points
//!
//! These tests focus on error handling, invalid inputs, and misbehaving hosts to
//! ensure the function fails gracefully instead of faulting.

#[cfg(test)]
mod negative_tests {
    use crate::tests::{call, env_lock, Charset, HostArgs};
    use crate::*;
    use std::env;
    use std::ffi::CStr;
    use std::os::raw::{c_char, c_int, c_ulong};
    use std::ptr;

    const BINARY: &str = "binary";
    const TEXT: &str = "utf8mb4";

    /// Run setup for string arguments in `charset`. Callers hold `env_lock`.
    unsafe fn setup(init: &mut UdfInit, types: &[c_int], charset: &'static str) -> (c_char, String) {
        let values: Vec<Option<&[u8]>> = vec![None; types.len()];
        let mut args = HostArgs::new(types, &values);
        let mut message = [0 as c_char; UDF_MESSAGE_SIZE];
        let rc = init_with(init, args.as_mut_ptr(), message.as_mut_ptr(), &Charset(charset));
        let text = CStr::from_ptr(message.as_ptr()).to_string_lossy().into_owned();
        (rc, text)
    }

    // =========================================================================
    // SETUP NEGATIVE TESTS
    // =========================================================================
    mod setup_tests {
        use super::*;

        #[test]
        fn test_setup_zero_arguments() {
            let _env = env_lock();
            let mut init = UdfInit::empty();
            unsafe {
                let (rc, message) = setup(&mut init, &[], TEXT);
                assert_eq!(rc, 1);
                assert!(message.contains("requires 1 parameter"), "got: {}", message);
                assert!(init.ptr.is_null(), "no context after failed setup");
                b64u_deinit(&mut init);
            }
        }

        #[test]
        fn test_setup_two_arguments() {
            let _env = env_lock();
            let mut init = UdfInit::empty();
            unsafe {
                let (rc, message) = setup(&mut init, &[STRING_RESULT, STRING_RESULT], BINARY);
                assert_eq!(rc, 1);
                assert!(message.contains("got 2"), "got: {}", message);
                assert!(init.ptr.is_null());
            }
        }

        #[test]
        fn test_setup_row_argument() {
            let _env = env_lock();
            let mut init = UdfInit::empty();
            unsafe {
                let (rc, message) = setup(&mut init, &[ROW_RESULT], TEXT);
                assert_eq!(rc, 1);
                assert!(message.contains("result type 3"), "got: {}", message);
                assert!(init.ptr.is_null());
            }
        }

        #[test]
        fn test_setup_unknown_result_type() {
            let _env = env_lock();
            let mut init = UdfInit::empty();
            let mut args = HostArgs::new(&[9], &[None]);
            unsafe {
                let rc = b64u_init(&mut init, args.as_mut_ptr(), ptr::null_mut());
                assert_eq!(rc, 1);
                assert!(init.ptr.is_null());
                // a rejected call site leaves the argument type alone
                assert_eq!(args.types(), &[9]);
            }
        }

        #[test]
        fn test_setup_null_args_record() {
            let _env = env_lock();
            let mut init = UdfInit::empty();
            let mut message = [0 as c_char; UDF_MESSAGE_SIZE];
            unsafe {
                let rc = b64u_init(&mut init, ptr::null_mut(), message.as_mut_ptr());
                assert_eq!(rc, 1);
                let text = CStr::from_ptr(message.as_ptr()).to_string_lossy();
                assert!(text.contains("null argument record"), "got: {}", text);
            }
        }

        #[test]
        fn test_setup_null_init_record() {
            let _env = env_lock();
            let mut args = HostArgs::new(&[STRING_RESULT], &[None]);
            let mut message = [0 as c_char; UDF_MESSAGE_SIZE];
            unsafe {
                let rc = b64u_init(ptr::null_mut(), args.as_mut_ptr(), message.as_mut_ptr());
                assert_eq!(rc, 1);
                let text = CStr::from_ptr(message.as_ptr()).to_string_lossy();
                assert!(text.contains("null init record"), "got: {}", text);
            }
        }

        #[test]
        fn test_setup_null_type_array() {
            let _env = env_lock();
            let mut init = UdfInit::empty();
            let mut args = HostArgs::new(&[STRING_RESULT], &[None]);
            args.raw.arg_type = ptr::null_mut();
            unsafe {
                let rc = b64u_init(&mut init, args.as_mut_ptr(), ptr::null_mut());
                assert_eq!(rc, 1);
                assert!(init.ptr.is_null());
            }
        }

        #[test]
        fn test_setup_null_message_buffer() {
            let _env = env_lock();
            let mut init = UdfInit::empty();
            let mut args = HostArgs::new(&[], &[]);
            unsafe {
                assert_eq!(b64u_init(&mut init, args.as_mut_ptr(), ptr::null_mut()), 1);
            }
        }
    }

    // =========================================================================
    // INVOKE NEGATIVE TESTS
    // =========================================================================
    mod invoke_tests {
        use super::*;

        #[test]
        fn test_invoke_without_setup() {
            let mut init = UdfInit::empty();
            let mut args = HostArgs::new(&[STRING_RESULT], &[Some(&b"foo"[..])]);
            unsafe {
                let result = call(&mut init, &mut args);
                assert!(result.value.is_none());
                assert_eq!((result.is_null, result.error), (1, 1));
            }
        }

        #[test]
        fn test_invoke_with_changed_arity() {
            let _env = env_lock();
            let mut init = UdfInit::empty();
            unsafe {
                assert_eq!(setup(&mut init, &[STRING_RESULT], BINARY).0, 0);

                let mut args = HostArgs::new(
                    &[STRING_RESULT, STRING_RESULT],
                    &[Some(&b"a"[..]), Some(&b"b"[..])],
                );
                let result = call(&mut init, &mut args);
                assert!(result.value.is_none());
                assert_eq!((result.is_null, result.error), (1, 1));

                let mut args = HostArgs::new(&[STRING_RESULT], &[Some(&b"a"[..])]).with_count(0);
                let result = call(&mut init, &mut args);
                assert_eq!((result.is_null, result.error), (1, 1));

                // runtime arity errors are per call
                let mut args = HostArgs::new(&[STRING_RESULT], &[Some(&b"a"[..])]);
                let result = call(&mut init, &mut args);
                assert_eq!(result.value.as_deref(), Some(&b"YQ"[..]));

                b64u_deinit(&mut init);
            }
        }

        #[test]
        fn test_invoke_null_args_record() {
            let _env = env_lock();
            let mut init = UdfInit::empty();
            let mut length: c_ulong = 0;
            let mut is_null: c_char = 0;
            let mut error: c_char = 0;
            unsafe {
                assert_eq!(setup(&mut init, &[STRING_RESULT], TEXT).0, 0);
                let out = b64u(
                    &mut init,
                    ptr::null_mut(),
                    ptr::null_mut(),
                    &mut length,
                    &mut is_null,
                    &mut error,
                );
                assert!(out.is_null());
                assert_eq!((is_null, error), (1, 1));
                b64u_deinit(&mut init);
            }
        }

        #[test]
        fn test_invoke_null_out_pointers() {
            let _env = env_lock();
            let mut init = UdfInit::empty();
            let mut args = HostArgs::new(&[STRING_RESULT], &[Some(&b"!!"[..])]);
            unsafe {
                assert_eq!(setup(&mut init, &[STRING_RESULT], TEXT).0, 0);
                let out = b64u(
                    &mut init,
                    args.as_mut_ptr(),
                    ptr::null_mut(),
                    ptr::null_mut(),
                    ptr::null_mut(),
                    ptr::null_mut(),
                );
                assert!(out.is_null());
                b64u_deinit(&mut init);
            }
        }

        #[test]
        fn test_decode_invalid_characters() {
            let _env = env_lock();
            let mut init = UdfInit::empty();
            unsafe {
                assert_eq!(setup(&mut init, &[STRING_RESULT], TEXT).0, 0);
                for input in [&b"ab+c"[..], &b"ab/c"[..], &b"Zm9v\n"[..], &b"Zm 9"[..], &b"\xffZm9"[..]] {
                    let mut args = HostArgs::new(&[STRING_RESULT], &[Some(input)]);
                    let result = call(&mut init, &mut args);
                    assert!(result.value.is_none(), "input {:?} decoded", input);
                    assert_eq!((result.is_null, result.error), (1, 0));
                }
                b64u_deinit(&mut init);
            }
        }

        #[test]
        fn test_decode_invalid_lengths() {
            let _env = env_lock();
            let mut init = UdfInit::empty();
            unsafe {
                assert_eq!(setup(&mut init, &[STRING_RESULT], TEXT).0, 0);
                for len in [1usize, 5, 9, 13] {
                    let input = vec![b'Q'; len];
                    let mut args = HostArgs::new(&[STRING_RESULT], &[Some(&input[..])]);
                    let result = call(&mut init, &mut args);
                    assert!(result.value.is_none(), "length {} decoded", len);
                    assert_eq!((result.is_null, result.error), (1, 0));
                }
                b64u_deinit(&mut init);
            }
        }

        #[test]
        fn test_decode_empty_is_not_null() {
            let _env = env_lock();
            let mut init = UdfInit::empty();
            unsafe {
                assert_eq!(setup(&mut init, &[STRING_RESULT], TEXT).0, 0);
                let mut args = HostArgs::new(&[STRING_RESULT], &[Some(&b""[..])]);
                let result = call(&mut init, &mut args);
                assert_eq!(result.value.as_deref(), Some(&b""[..]));
                assert_eq!((result.is_null, result.error), (0, 0));
                b64u_deinit(&mut init);
            }
        }
    }

    // =========================================================================
    // PADDING POLICY TESTS
    // =========================================================================
    mod padding_tests {
        use super::*;

        unsafe fn decode_once(input: &[u8]) -> Option<Vec<u8>> {
            let mut init = UdfInit::empty();
            assert_eq!(setup(&mut init, &[STRING_RESULT], TEXT).0, 0);
            let mut args = HostArgs::new(&[STRING_RESULT], &[Some(input)]);
            let result = call(&mut init, &mut args);
            b64u_deinit(&mut init);
            result.value
        }

        #[test]
        fn test_default_policy_is_lenient() {
            let _env = env_lock();
            env::remove_var(DECODE_PADDING_ENV);

            unsafe {
                assert_eq!(decode_once(b"Zm8="), Some(b"fo".to_vec()));
                assert_eq!(decode_once(b"Zg=="), Some(b"f".to_vec()));
                assert_eq!(decode_once(b"Zg==="), None);
                assert_eq!(decode_once(b"Zm9v=="), None);
                assert_eq!(decode_once(b"=="), None);
            }
        }

        #[test]
        fn test_strict_policy_from_env() {
            let _env = env_lock();
            env::set_var(DECODE_PADDING_ENV, "strict");

            unsafe {
                assert_eq!(decode_once(b"Zm8="), None);
                assert_eq!(decode_once(b"Zm8"), Some(b"fo".to_vec()));
            }

            env::remove_var(DECODE_PADDING_ENV);
        }

        #[test]
        fn test_policy_is_fixed_at_setup() {
            let _env = env_lock();
            env::set_var(DECODE_PADDING_ENV, "strict");

            let mut init = UdfInit::empty();
            unsafe {
                assert_eq!(setup(&mut init, &[STRING_RESULT], TEXT).0, 0);
                env::set_var(DECODE_PADDING_ENV, "lenient");

                let mut args = HostArgs::new(&[STRING_RESULT], &[Some(&b"Zm8="[..])]);
                let result = call(&mut init, &mut args);
                assert!(result.value.is_none());
                b64u_deinit(&mut init);
            }

            env::remove_var(DECODE_PADDING_ENV);
        }
    }

    // =========================================================================
    // TEARDOWN AND CONCURRENCY TESTS
    // =========================================================================
    mod lifecycle_tests {
        use super::*;
        use std::thread;

        #[test]
        fn test_deinit_null_record() {
            unsafe { b64u_deinit(ptr::null_mut()) };
        }

        #[test]
        fn test_double_deinit() {
            let _env = env_lock();
            let mut init = UdfInit::empty();
            unsafe {
                assert_eq!(setup(&mut init, &[STRING_RESULT], BINARY).0, 0);
                b64u_deinit(&mut init);
                assert!(init.ptr.is_null());
                b64u_deinit(&mut init);
            }
        }

        #[test]
        fn test_buffers_outlive_deinit() {
            let _env = env_lock();
            let mut init = UdfInit::empty();
            let mut args = HostArgs::new(&[STRING_RESULT], &[Some(&b"foo"[..])]);
            let mut scratch = [0 as c_char; 255];
            let mut length: c_ulong = 0;
            let mut is_null: c_char = 0;
            let mut error: c_char = 0;
            unsafe {
                assert_eq!(setup(&mut init, &[STRING_RESULT], BINARY).0, 0);
                let out = b64u(
                    &mut init,
                    args.as_mut_ptr(),
                    scratch.as_mut_ptr(),
                    &mut length,
                    &mut is_null,
                    &mut error,
                );
                b64u_deinit(&mut init);

                let bytes = std::slice::from_raw_parts(out as *const u8, length as usize);
                assert_eq!(bytes, b"Zm9v");
                libc::free(out as *mut libc::c_void);
            }
        }

        #[test]
        fn test_concurrent_invocations_share_one_call_site() {
            let _env = env_lock();
            let mut init = UdfInit::empty();
            unsafe {
                assert_eq!(setup(&mut init, &[STRING_RESULT], BINARY).0, 0);
            }
            // the host hands the same record to every worker thread
            let init_addr = &mut init as *mut UdfInit as usize;

            thread::scope(|s| {
                for worker in 0..8u8 {
                    s.spawn(move || {
                        let init = init_addr as *mut UdfInit;
                        for round in 0..32usize {
                            let input = vec![worker; round];
                            let mut args = HostArgs::new(&[STRING_RESULT], &[Some(&input[..])]);
                            let result = unsafe { call(init, &mut args) };
                            let expected = encode_url_safe(&input);
                            assert_eq!(result.value.as_deref(), Some(expected.as_bytes()));
                        }
                    });
                }
            });

            unsafe { b64u_deinit(&mut init) };
        }
    }
}
