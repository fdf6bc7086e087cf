//! Conversion of provider output into Java objects.
//!
//! Only type and ownership conversion happens here. Failures leave a Java
//! exception pending and hand `null` back to the caller; panics are caught
//! so they never unwind into the JVM.

use crate::{BridgeError, Result};
use daemon_core::LibraryProvider;
use jni::objects::{JObject, JObjectArray};
use jni::sys::{jobjectArray, jsize};
use jni::JNIEnv;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::ptr;
use tracing::{debug, error, warn};

const STRING_CLASS: &str = "java/lang/String";
const RUNTIME_EXCEPTION: &str = "java/lang/RuntimeException";

/// Build a `String[]` holding the provider's library names, in order
pub fn support_libraries_array<'local, P>(
    env: &mut JNIEnv<'local>,
    provider: &P,
) -> Result<JObjectArray<'local>>
where
    P: LibraryProvider + ?Sized,
{
    let libs = provider.support_libraries()?;
    let len = jsize::try_from(libs.len()).map_err(|_| BridgeError::TooLong(libs.len()))?;

    let array = env.new_object_array(len, STRING_CLASS, JObject::null())?;
    for (index, name) in (0..len).zip(libs.iter()) {
        let value = env.new_string(name)?;
        env.set_object_array_element(&array, index, &value)?;
        // Local reference table is small on some VMs
        env.delete_local_ref(value)?;
    }

    debug!(libraries = %libs, "Marshaled support libraries");
    Ok(array)
}

/// Run [`support_libraries_array`] for an exported function.
///
/// Returns the raw array on success. On failure returns null with an
/// exception pending: the JVM's own if it raised one, otherwise the class
/// given by [`BridgeError::exception_class`]. The exception is raised
/// before anything is logged, and a panic raised while reporting keeps
/// any exception already pending.
pub fn export<'local, P>(env: &mut JNIEnv<'local>, provider: &P) -> jobjectArray
where
    P: LibraryProvider + ?Sized,
{
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        match support_libraries_array(env, provider) {
            Ok(array) => array.into_raw(),
            Err(err) => {
                if !err.java_exception_pending() {
                    throw(env, err.exception_class(), &err.to_string());
                }
                error!("Failed to marshal support libraries: {}", err);
                ptr::null_mut()
            }
        }
    }));

    match outcome {
        Ok(raw) => raw,
        Err(payload) => {
            let message = panic_message(&*payload);
            // Logging or throwing can panic again; nothing may unwind past here
            let _ = panic::catch_unwind(AssertUnwindSafe(|| {
                throw(env, RUNTIME_EXCEPTION, &message);
                error!("Panic while marshaling support libraries: {}", message);
            }));
            ptr::null_mut()
        }
    }
}

fn throw(env: &mut JNIEnv<'_>, class: &str, message: &str) {
    match env.exception_check() {
        Ok(true) => {
            warn!("Java exception already pending, not throwing {}", class);
            return;
        }
        Ok(false) => {}
        Err(e) => warn!("Exception check failed: {}", e),
    }

    if let Err(e) = env.throw_new(class, message) {
        error!("Failed to throw {}: {}", class, e);
    }
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "native code panicked".to_string()
    }
}
