//! JNI entry points of the `daemon` native library
//! Loaded by `pfs.android.daemon.Daemon` via `System.loadLibrary("daemon")`

use daemon_core::{DaemonError, StaticLibraryProvider};
use jni::objects::JClass;
use jni::sys::{jint, jobjectArray, JavaVM, JNI_VERSION_1_6};
use jni::JNIEnv;
use std::ffi::c_void;
use thiserror::Error;

pub mod bridge;
pub mod logging;

/// Errors raised while crossing into the JVM
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error(transparent)]
    Core(#[from] DaemonError),

    #[error("JNI call failed: {0}")]
    Jni(#[from] jni::errors::Error),

    #[error("{0} library names do not fit in a Java array")]
    TooLong(usize),
}

impl BridgeError {
    /// Java class this error is thrown as
    pub fn exception_class(&self) -> &'static str {
        match self {
            BridgeError::Core(DaemonError::Allocation { .. }) => "java/lang/OutOfMemoryError",
            BridgeError::TooLong(_) => "java/lang/IllegalStateException",
            BridgeError::Jni(_) => "java/lang/RuntimeException",
        }
    }

    /// The JVM already raised an exception for this failure
    pub fn java_exception_pending(&self) -> bool {
        matches!(self, BridgeError::Jni(jni::errors::Error::JavaException))
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;

#[allow(non_snake_case)]
#[no_mangle]
pub extern "system" fn JNI_OnLoad(_vm: *mut JavaVM, _reserved: *mut c_void) -> jint {
    logging::init(&logging::LogConfig::default());
    tracing::info!("Native library loaded: daemon v{}", env!("CARGO_PKG_VERSION"));
    JNI_VERSION_1_6
}

/// `private static native String[] nativeSupportLibraries()`
#[allow(non_snake_case)]
#[no_mangle]
pub extern "system" fn Java_pfs_android_daemon_Daemon_nativeSupportLibraries<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
) -> jobjectArray {
    bridge::export(&mut env, &StaticLibraryProvider)
}
