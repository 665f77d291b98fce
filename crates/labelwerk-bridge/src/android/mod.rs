// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Android platform bridge via JNI.
//
// Requires the Android NDK and the Brother `lmprinter` AAR on the host app's
// classpath. Adapter queries go through `BluetoothManager`/`WifiManager`;
// printing goes through `com.brother.sdk.lmprinter`.
//
// ## Threading
//
// Every call arrives on a tokio blocking worker, which is not a Java thread.
// Workers are attached permanently on first use, and every call runs inside
// a JNI local frame so repeated jobs do not accumulate local references.
// SDK classes are loaded through the activity's class loader because
// `FindClass` on a native thread only sees the system loader.

#![cfg(target_os = "android")]

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, OnceLock};

use jni::objects::{GlobalRef, JClass, JObject, JObjectArray, JString, JValue};
use jni::{JNIEnv, JavaVM};

use labelwerk_core::error::{LabelwerkError, Result};
use labelwerk_core::{ArtifactKind, ConnectionType, OpenChannelCode, PrintErrorCode, PrintSettings};

use crate::traits::*;

// ---------------------------------------------------------------------------
// JNI bootstrap helpers
// ---------------------------------------------------------------------------

const LMPRINTER: &str = "com.brother.sdk.lmprinter";

/// `PackageManager.PERMISSION_GRANTED`.
const PERMISSION_GRANTED: i32 = 0;

/// Android 12 (S) split Bluetooth permissions into SCAN/CONNECT.
const SDK_S: i32 = 31;

/// Local references a single bridge call may create.
const FRAME_CAPACITY: i32 = 64;

static JAVA_VM: OnceLock<JavaVM> = OnceLock::new();

fn java_vm() -> DriverResult<&'static JavaVM> {
    if let Some(vm) = JAVA_VM.get() {
        return Ok(vm);
    }
    let ctx = ndk_context::android_context();
    // SAFETY: `ctx.vm()` returns the `JavaVM*` set by the NDK glue code and
    // stays valid for the lifetime of the process.
    let vm = unsafe { JavaVM::from_raw(ctx.vm().cast()) }
        .map_err(|e| DriverError::Exception(format!("failed to obtain JavaVM: {e}")))?;
    Ok(JAVA_VM.get_or_init(|| vm))
}

/// Attach the current worker thread (once) and return its environment.
fn jni_env() -> DriverResult<JNIEnv<'static>> {
    java_vm()?
        .attach_current_thread_permanently()
        .map_err(|e| DriverError::Exception(format!("failed to attach JNI thread: {e}")))
}

/// The hosting `Activity` (or application context).
fn activity() -> DriverResult<JObject<'static>> {
    let ptr = ndk_context::android_context().context();
    if ptr.is_null() {
        return Err(DriverError::Exception(
            "Android context is null, native activity not initialised".into(),
        ));
    }
    // SAFETY: the NDK guarantees this pointer is a valid global jobject for
    // the hosting Activity.
    Ok(unsafe { JObject::from_raw(ptr.cast()) })
}

impl From<jni::errors::Error> for DriverError {
    fn from(e: jni::errors::Error) -> Self {
        DriverError::Exception(format!("JNI: {e}"))
    }
}

/// Turn a JNI failure into a `DriverError`, clearing any pending Java
/// exception and surfacing its message.
fn jni_err(env: &mut JNIEnv, context: &str, e: jni::errors::Error) -> DriverError {
    if !matches!(e, jni::errors::Error::JavaException) {
        return DriverError::Exception(format!("{context}: {e}"));
    }
    let throwable = match env.exception_occurred() {
        Ok(t) if !t.is_null() => t,
        _ => return DriverError::Exception(format!("{context}: Java exception")),
    };
    let _ = env.exception_clear();
    let message = env
        .call_method(&throwable, "toString", "()Ljava/lang/String;", &[])
        .and_then(|v| v.l())
        .ok()
        .and_then(|obj| java_string(env, obj).ok())
        .unwrap_or_else(|| "Java exception".into());
    DriverError::Exception(format!("{context}: {message}"))
}

fn java_string(env: &mut JNIEnv, obj: JObject) -> std::result::Result<String, jni::errors::Error> {
    let s = JString::from(obj);
    Ok(env.get_string(&s)?.into())
}

/// Load an app class (e.g. `com.brother.sdk.lmprinter.Channel`) through the
/// activity's class loader.
fn load_class<'local>(
    env: &mut JNIEnv<'local>,
    activity: &JObject,
    binary_name: &str,
) -> DriverResult<JClass<'local>> {
    let loader = env
        .call_method(activity, "getClassLoader", "()Ljava/lang/ClassLoader;", &[])
        .and_then(|v| v.l())
        .map_err(|e| jni_err(env, "getClassLoader", e))?;
    let name = env.new_string(binary_name)?;
    let class = env
        .call_method(
            &loader,
            "loadClass",
            "(Ljava/lang/String;)Ljava/lang/Class;",
            &[JValue::Object(&name)],
        )
        .and_then(|v| v.l())
        .map_err(|e| jni_err(env, binary_name, e))?;
    Ok(JClass::from(class))
}

/// `SomeEnum.valueOf(name)` for an SDK enum.
fn enum_value<'local>(
    env: &mut JNIEnv<'local>,
    activity: &JObject,
    binary_name: &str,
    value: &str,
) -> DriverResult<JObject<'local>> {
    let class = load_class(env, activity, binary_name)?;
    let descriptor = format!("(Ljava/lang/String;)L{};", binary_name.replace('.', "/"));
    let name = env.new_string(value)?;
    env.call_static_method(&class, "valueOf", &descriptor, &[JValue::Object(&name)])
        .and_then(|v| v.l())
        .map_err(|e| jni_err(env, &format!("{binary_name}.valueOf({value})"), e))
}

/// `obj.getCode().name()` for the SDK's error result objects.
fn error_code_name(env: &mut JNIEnv, error: &JObject, code_class: &str) -> DriverResult<String> {
    let descriptor = format!("()L{};", code_class.replace('.', "/"));
    let code = env
        .call_method(error, "getCode", &descriptor, &[])
        .and_then(|v| v.l())
        .map_err(|e| jni_err(env, "getCode", e))?;
    let name = env
        .call_method(&code, "name", "()Ljava/lang/String;", &[])
        .and_then(|v| v.l())
        .map_err(|e| jni_err(env, "ErrorCode.name", e))?;
    java_string(env, name).map_err(|e| jni_err(env, "ErrorCode.name", e))
}

fn system_service<'local>(
    env: &mut JNIEnv<'local>,
    activity: &JObject,
    name: &str,
) -> DriverResult<JObject<'local>> {
    let service = env.new_string(name)?;
    env.call_method(
        activity,
        "getSystemService",
        "(Ljava/lang/String;)Ljava/lang/Object;",
        &[JValue::Object(&service)],
    )
    .and_then(|v| v.l())
    .map_err(|e| jni_err(env, "getSystemService", e))
}

/// `BluetoothManager.getAdapter()`; null when the device has no Bluetooth.
fn bluetooth_adapter<'local>(
    env: &mut JNIEnv<'local>,
    activity: &JObject,
) -> DriverResult<JObject<'local>> {
    let manager = system_service(env, activity, "bluetooth")?;
    if manager.is_null() {
        return Ok(manager);
    }
    env.call_method(&manager, "getAdapter", "()Landroid/bluetooth/BluetoothAdapter;", &[])
        .and_then(|v| v.l())
        .map_err(|e| jni_err(env, "BluetoothManager.getAdapter", e))
}

fn sdk_int(env: &mut JNIEnv) -> DriverResult<i32> {
    env.get_static_field("android/os/Build$VERSION", "SDK_INT", "I")
        .and_then(|v| v.i())
        .map_err(|e| jni_err(env, "Build.VERSION.SDK_INT", e))
}

fn permission_granted(
    env: &mut JNIEnv,
    activity: &JObject,
    permission: &str,
) -> DriverResult<bool> {
    let name = env.new_string(permission)?;
    let status = env
        .call_method(
            activity,
            "checkSelfPermission",
            "(Ljava/lang/String;)I",
            &[JValue::Object(&name)],
        )
        .and_then(|v| v.i())
        .map_err(|e| jni_err(env, "checkSelfPermission", e))?;
    Ok(status == PERMISSION_GRANTED)
}

/// Run `f` attached and inside a local frame.
fn with_env<T>(
    f: impl FnOnce(&mut JNIEnv, &JObject) -> DriverResult<T>,
) -> DriverResult<T> {
    let mut env = jni_env()?;
    let activity = activity()?;
    env.with_local_frame(FRAME_CAPACITY, |env| f(env, &activity))
}

// ---------------------------------------------------------------------------
// Bridge struct
// ---------------------------------------------------------------------------

/// Driver and settings objects kept alive for one open channel.
struct AndroidChannel {
    driver: GlobalRef,
    settings: Option<GlobalRef>,
}

/// Android implementation of the Labelwerk platform bridge.
pub struct AndroidBridge {
    next_handle: AtomicU64,
    channels: Mutex<HashMap<u64, AndroidChannel>>,
}

impl Default for AndroidBridge {
    fn default() -> Self {
        Self::new()
    }
}

impl AndroidBridge {
    /// This does not touch JNI; the first JNI call happens lazily.
    pub fn new() -> Self {
        Self {
            next_handle: AtomicU64::new(1),
            channels: Mutex::new(HashMap::new()),
        }
    }

    fn driver_ref(&self, handle: &DriverHandle) -> DriverResult<GlobalRef> {
        self.channels
            .lock()
            .map_err(|_| DriverError::Exception("channel table poisoned".into()))?
            .get(&handle.id())
            .map(|c| c.driver.clone())
            .ok_or_else(|| unknown_handle(handle))
    }

    fn settings_ref(&self, handle: &DriverHandle) -> DriverResult<GlobalRef> {
        self.channels
            .lock()
            .map_err(|_| DriverError::Exception("channel table poisoned".into()))?
            .get(&handle.id())
            .and_then(|c| c.settings.clone())
            .ok_or_else(|| DriverError::Exception("print settings were not applied".into()))
    }
}

impl PlatformBridge for AndroidBridge {
    fn platform_name(&self) -> &str {
        "Android"
    }
}

// ---------------------------------------------------------------------------
// NativeAdapter: BluetoothManager / WifiManager / checkSelfPermission
// ---------------------------------------------------------------------------

fn unknown_handle(handle: &DriverHandle) -> DriverError {
    DriverError::Exception(format!("unknown channel handle {}", handle.id()))
}

fn log_false(what: &str, result: DriverResult<bool>) -> bool {
    result.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Android: {what} query failed");
        false
    })
}

fn query_failed(e: DriverError) -> LabelwerkError {
    LabelwerkError::Bridge(format!("adapter query failed: {e}"))
}

impl AndroidBridge {
    fn query_supported(&self, connection: ConnectionType) -> DriverResult<bool> {
        with_env(|env, activity| match connection {
            ConnectionType::Bluetooth => Ok(!bluetooth_adapter(env, activity)?.is_null()),
            ConnectionType::Wifi => Ok(!system_service(env, activity, "wifi")?.is_null()),
        })
    }

    fn query_enabled(&self, connection: ConnectionType) -> DriverResult<bool> {
        with_env(|env, activity| match connection {
            ConnectionType::Bluetooth => {
                let adapter = bluetooth_adapter(env, activity)?;
                if adapter.is_null() {
                    return Ok(false);
                }
                env.call_method(&adapter, "isEnabled", "()Z", &[])
                    .and_then(|v| v.z())
                    .map_err(|e| jni_err(env, "BluetoothAdapter.isEnabled", e))
            }
            ConnectionType::Wifi => {
                let wifi = system_service(env, activity, "wifi")?;
                if wifi.is_null() {
                    return Ok(false);
                }
                env.call_method(&wifi, "isWifiEnabled", "()Z", &[])
                    .and_then(|v| v.z())
                    .map_err(|e| jni_err(env, "WifiManager.isWifiEnabled", e))
            }
        })
    }

    fn query_permission(&self, connection: ConnectionType) -> DriverResult<bool> {
        with_env(|env, activity| {
            let required: &[&str] = match connection {
                ConnectionType::Bluetooth if sdk_int(env)? >= SDK_S => &[
                    "android.permission.BLUETOOTH_SCAN",
                    "android.permission.BLUETOOTH_CONNECT",
                ],
                ConnectionType::Bluetooth => &[
                    "android.permission.BLUETOOTH",
                    "android.permission.BLUETOOTH_ADMIN",
                ],
                ConnectionType::Wifi => &["android.permission.INTERNET"],
            };
            for permission in required {
                if !permission_granted(env, activity, permission)? {
                    tracing::debug!(permission, "Android: permission not granted");
                    return Ok(false);
                }
            }
            Ok(true)
        })
    }
}

impl NativeAdapter for AndroidBridge {
    fn is_adapter_supported(&self, connection: ConnectionType) -> bool {
        log_false("adapter support", self.query_supported(connection))
    }

    fn is_adapter_enabled(&self, connection: ConnectionType) -> bool {
        log_false("adapter state", self.query_enabled(connection))
    }

    fn has_permission(&self, connection: ConnectionType) -> bool {
        log_false("permission", self.query_permission(connection))
    }

    fn adapter_state(&self, connection: ConnectionType) -> Result<AdapterState> {
        if !self.query_supported(connection).map_err(query_failed)? {
            return Ok(AdapterState::Unsupported);
        }
        if !self.query_permission(connection).map_err(query_failed)? {
            return Ok(AdapterState::PermissionMissing);
        }
        if !self.query_enabled(connection).map_err(query_failed)? {
            return Ok(AdapterState::Disabled);
        }
        Ok(AdapterState::Ready)
    }

    fn paired_devices(&self) -> Result<Vec<PairedDevice>> {
        with_env(|env, activity| {
            let adapter = bluetooth_adapter(env, activity)?;
            if adapter.is_null() {
                return Ok(Vec::new());
            }
            let bonded = env
                .call_method(&adapter, "getBondedDevices", "()Ljava/util/Set;", &[])
                .and_then(|v| v.l())
                .map_err(|e| jni_err(env, "getBondedDevices", e))?;
            if bonded.is_null() {
                return Ok(Vec::new());
            }
            let array = env
                .call_method(&bonded, "toArray", "()[Ljava/lang/Object;", &[])
                .and_then(|v| v.l())
                .map_err(|e| jni_err(env, "Set.toArray", e))?;
            let array = JObjectArray::from(array);
            let len = env.get_array_length(&array)?;

            let mut devices = Vec::with_capacity(len.max(0) as usize);
            for i in 0..len {
                let device = env.get_object_array_element(&array, i)?;
                let name = env
                    .call_method(&device, "getName", "()Ljava/lang/String;", &[])
                    .and_then(|v| v.l())
                    .map_err(|e| jni_err(env, "BluetoothDevice.getName", e))?;
                let name = if name.is_null() {
                    None
                } else {
                    Some(java_string(env, name)?)
                };
                let address = env
                    .call_method(&device, "getAddress", "()Ljava/lang/String;", &[])
                    .and_then(|v| v.l())
                    .map_err(|e| jni_err(env, "BluetoothDevice.getAddress", e))?;
                let address = java_string(env, address)?;
                env.delete_local_ref(device)?;
                devices.push(PairedDevice { name, address });
            }
            tracing::info!(count = devices.len(), "Android: enumerated bonded devices");
            Ok(devices)
        })
        .map_err(|e| LabelwerkError::Bridge(e.to_string()))
    }
}

// ---------------------------------------------------------------------------
// PrinterDriver: com.brother.sdk.lmprinter
// ---------------------------------------------------------------------------

impl PrinterDriver for AndroidBridge {
    fn open_channel(
        &self,
        connection: ConnectionType,
        address: &str,
    ) -> DriverResult<DriverHandle> {
        let driver = with_env(|env, activity| {
            let channel_class = load_class(env, activity, &format!("{LMPRINTER}.Channel"))?;
            let j_address = env.new_string(address)?;
            let channel = match connection {
                ConnectionType::Bluetooth => {
                    let adapter = bluetooth_adapter(env, activity)?;
                    env.call_static_method(
                        &channel_class,
                        "newBluetoothChannel",
                        "(Ljava/lang/String;Landroid/bluetooth/BluetoothAdapter;)Lcom/brother/sdk/lmprinter/Channel;",
                        &[JValue::Object(&j_address), JValue::Object(&adapter)],
                    )
                }
                ConnectionType::Wifi => env.call_static_method(
                    &channel_class,
                    "newWifiChannel",
                    "(Ljava/lang/String;)Lcom/brother/sdk/lmprinter/Channel;",
                    &[JValue::Object(&j_address)],
                ),
            }
            .and_then(|v| v.l())
            .map_err(|e| jni_err(env, "Channel.new*Channel", e))?;

            let generator =
                load_class(env, activity, &format!("{LMPRINTER}.PrinterDriverGenerator"))?;
            let result = env
                .call_static_method(
                    &generator,
                    "openChannel",
                    "(Lcom/brother/sdk/lmprinter/Channel;)Lcom/brother/sdk/lmprinter/PrinterDriverGenerateResult;",
                    &[JValue::Object(&channel)],
                )
                .and_then(|v| v.l())
                .map_err(|e| jni_err(env, "PrinterDriverGenerator.openChannel", e))?;

            let error = env
                .call_method(
                    &result,
                    "getError",
                    "()Lcom/brother/sdk/lmprinter/OpenChannelError;",
                    &[],
                )
                .and_then(|v| v.l())
                .map_err(|e| jni_err(env, "getError", e))?;
            let code = OpenChannelCode::from_sdk_name(&error_code_name(
                env,
                &error,
                &format!("{LMPRINTER}.OpenChannelError$ErrorCode"),
            )?);
            if code != OpenChannelCode::NoError {
                return Err(DriverError::OpenChannel(code));
            }

            let driver = env
                .call_method(
                    &result,
                    "getDriver",
                    "()Lcom/brother/sdk/lmprinter/PrinterDriver;",
                    &[],
                )
                .and_then(|v| v.l())
                .map_err(|e| jni_err(env, "getDriver", e))?;
            Ok(env.new_global_ref(&driver)?)
        })?;

        let id = self.next_handle.fetch_add(1, Ordering::SeqCst);
        self.channels
            .lock()
            .map_err(|_| DriverError::Exception("channel table poisoned".into()))?
            .insert(id, AndroidChannel { driver, settings: None });
        tracing::info!(%connection, address, handle = id, "Android: channel opened");
        Ok(DriverHandle::new(id))
    }

    fn apply_settings(&self, handle: &DriverHandle, settings: &PrintSettings) -> DriverResult<()> {
        let global = with_env(|env, activity| {
            let model_class = format!("{LMPRINTER}.PrinterModel");
            let model = enum_value(env, activity, &model_class, settings.model.sdk_name())?;
            let class = load_class(env, activity, &format!("{LMPRINTER}.setting.QLPrintSettings"))?;
            let ql = env
                .new_object(
                    &class,
                    "(Lcom/brother/sdk/lmprinter/PrinterModel;)V",
                    &[JValue::Object(&model)],
                )
                .map_err(|e| jni_err(env, "new QLPrintSettings", e))?;

            let label = enum_value(
                env,
                activity,
                &format!("{LMPRINTER}.setting.QLPrintSettings$LabelSize"),
                settings.label_size.sdk_name(),
            )?;
            env.call_method(
                &ql,
                "setLabelSize",
                "(Lcom/brother/sdk/lmprinter/setting/QLPrintSettings$LabelSize;)V",
                &[JValue::Object(&label)],
            )
            .map_err(|e| jni_err(env, "setLabelSize", e))?;

            env.call_method(&ql, "setAutoCut", "(Z)V", &[JValue::Bool(settings.auto_cut.into())])
                .map_err(|e| jni_err(env, "setAutoCut", e))?;

            let image_settings = format!("{LMPRINTER}.setting.PrintImageSettings");
            let scale_class = format!("{image_settings}$ScaleMode");
            let scale = enum_value(env, activity, &scale_class, settings.scale_mode.sdk_name())?;
            env.call_method(
                &ql,
                "setScaleMode",
                "(Lcom/brother/sdk/lmprinter/setting/PrintImageSettings$ScaleMode;)V",
                &[JValue::Object(&scale)],
            )
            .map_err(|e| jni_err(env, "setScaleMode", e))?;

            let orientation = enum_value(
                env,
                activity,
                &format!("{image_settings}$Orientation"),
                settings.orientation.sdk_name(),
            )?;
            env.call_method(
                &ql,
                "setPrintOrientation",
                "(Lcom/brother/sdk/lmprinter/setting/PrintImageSettings$Orientation;)V",
                &[JValue::Object(&orientation)],
            )
            .map_err(|e| jni_err(env, "setPrintOrientation", e))?;

            if let Some(halftone) = settings.halftone {
                let halftone_class = format!("{image_settings}$Halftone");
                let halftone = enum_value(env, activity, &halftone_class, halftone.sdk_name())?;
                env.call_method(
                    &ql,
                    "setHalftone",
                    "(Lcom/brother/sdk/lmprinter/setting/PrintImageSettings$Halftone;)V",
                    &[JValue::Object(&halftone)],
                )
                .map_err(|e| jni_err(env, "setHalftone", e))?;
            }

            let copies = i32::try_from(settings.copies).unwrap_or(i32::MAX);
            env.call_method(&ql, "setNumCopies", "(I)V", &[JValue::Int(copies)])
                .map_err(|e| jni_err(env, "setNumCopies", e))?;

            let work_path = env.new_string(settings.work_path.to_string_lossy())?;
            env.call_method(
                &ql,
                "setWorkPath",
                "(Ljava/lang/String;)V",
                &[JValue::Object(&work_path)],
            )
            .map_err(|e| jni_err(env, "setWorkPath", e))?;

            Ok(env.new_global_ref(&ql)?)
        })?;

        let mut channels = self
            .channels
            .lock()
            .map_err(|_| DriverError::Exception("channel table poisoned".into()))?;
        let channel = channels
            .get_mut(&handle.id())
            .ok_or_else(|| unknown_handle(handle))?;
        channel.settings = Some(global);
        Ok(())
    }

    fn print_artifact(
        &self,
        handle: &DriverHandle,
        path: &Path,
        kind: ArtifactKind,
    ) -> DriverResult<()> {
        let driver = self.driver_ref(handle)?;
        let settings = self.settings_ref(handle)?;
        let method = match kind {
            ArtifactKind::Image => "printImage",
            ArtifactKind::Pdf => "printPDF",
        };

        let name = with_env(|env, _activity| {
            let j_path = env.new_string(path.to_string_lossy())?;
            let error = env
                .call_method(
                    &driver,
                    method,
                    "(Ljava/lang/String;Lcom/brother/sdk/lmprinter/setting/PrintImageSettings;)Lcom/brother/sdk/lmprinter/PrintError;",
                    &[JValue::Object(&j_path), JValue::Object(&settings)],
                )
                .and_then(|v| v.l())
                .map_err(|e| jni_err(env, method, e))?;
            error_code_name(env, &error, &format!("{LMPRINTER}.PrintError$ErrorCode"))
        })?;

        match PrintErrorCode::from_sdk_name(&name) {
            PrintErrorCode::NoError => Ok(()),
            code => Err(DriverError::Print(code)),
        }
    }

    fn close_channel(&self, handle: DriverHandle) {
        let channel = match self.channels.lock() {
            Ok(mut channels) => channels.remove(&handle.id()),
            Err(_) => None,
        };
        let Some(channel) = channel else {
            tracing::warn!(handle = handle.id(), "Android: close for unknown channel");
            return;
        };
        let result = with_env(|env, _activity| {
            env.call_method(&channel.driver, "closeChannel", "()V", &[])
                .map_err(|e| jni_err(env, "closeChannel", e))?;
            Ok(())
        });
        match result {
            Ok(()) => tracing::info!(handle = handle.id(), "Android: channel closed"),
            Err(e) => {
                tracing::error!(handle = handle.id(), error = %e, "Android: closeChannel failed")
            }
        }
    }
}
