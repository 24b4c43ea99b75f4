//! JNI backend: hosts one JVM in-process and calls the real SDK.
//!
//! The thread that starts the runtime is attached permanently and is the
//! only thread allowed to use it. Method IDs are resolved once per
//! signature; class references and returned objects are held as global
//! references so they survive local-frame pops.
#![allow(unsafe_code)]

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use carbonr_core::RuntimeConfig;
use jni::objects::{GlobalRef, JClass, JMethodID, JObject, JObjectArray, JStaticMethodID, JString, JValueGen, JValueOwned};
use jni::signature::{Primitive, ReturnType};
use jni::sys::jvalue;
use jni::{InitArgsBuilder, JNIEnv, JNIVersion, JavaVM};
use tracing::{debug, info, warn};

use crate::call::{Arg, Method, MethodKind, ObjectRef, RetKind, Returned};
use crate::error::{BridgeError, Result};
use crate::runtime::ManagedRuntime;

/// HotSpot cannot host a second VM in one process, even after destroy.
static STARTED: AtomicBool = AtomicBool::new(false);

#[derive(Debug, Clone, Copy)]
enum Resolved {
    Instance(JMethodID),
    Static(JStaticMethodID),
}

pub struct JvmRuntime {
    vm: JavaVM,
    classes: HashMap<&'static str, GlobalRef>,
    methods: HashMap<Method, Resolved>,
    slots: HashMap<u64, GlobalRef>,
    next_slot: u64,
    shut_down: bool,
}

impl JvmRuntime {
    /// Start the JVM with `config` and attach the calling thread.
    pub fn start(config: &RuntimeConfig) -> Result<Self> {
        config
            .validate()
            .map_err(|e| BridgeError::Startup(e.to_string()))?;
        if STARTED.swap(true, Ordering::SeqCst) {
            return Err(BridgeError::Startup(
                "a JVM was already started in this process".into(),
            ));
        }
        match Self::launch(config) {
            Ok(rt) => Ok(rt),
            Err(e) => {
                STARTED.store(false, Ordering::SeqCst);
                Err(e)
            }
        }
    }

    fn launch(config: &RuntimeConfig) -> Result<Self> {
        let options = config.to_jvm_options();
        let mut builder = InitArgsBuilder::new().version(JNIVersion::V8);
        for opt in &options {
            builder = builder.option(opt);
        }
        let args = builder
            .ignore_unrecognized(config.ignore_unrecognized)
            .build()
            .map_err(|e| BridgeError::Startup(e.to_string()))?;
        let vm = JavaVM::new(args).map_err(|e| BridgeError::Startup(e.to_string()))?;
        vm.attach_current_thread_permanently()?;
        info!(options = ?options, "JVM started");
        Ok(Self {
            vm,
            classes: HashMap::new(),
            methods: HashMap::new(),
            slots: HashMap::new(),
            next_slot: 0,
            shut_down: false,
        })
    }

    fn invoke(&mut self, target: Option<ObjectRef>, method: &Method, args: &[Arg<'_>]) -> Result<Returned> {
        if self.shut_down {
            return Err(BridgeError::ShutDown);
        }
        let JvmRuntime {
            vm,
            classes,
            methods,
            slots,
            next_slot,
            ..
        } = self;
        let mut env = vm.get_env()?;
        let resolved = resolve(&mut env, classes, methods, method)?;
        debug!(class = method.class, method = method.name, target = ?target.map(|t| t.raw()), "jni call");

        let frame = 16 + 2 * i32::try_from(args.len()).unwrap_or(i32::MAX / 4);
        env.with_local_frame(frame, |env| -> Result<Returned> {
            let jargs = marshal(env, slots, method, args)?;
            let raw = match resolved {
                Resolved::Static(id) => {
                    let class: &JClass = class_ref(env, classes, method.class)?.as_obj().into();
                    unsafe { env.call_static_method_unchecked(class, id, return_type(method.ret), &jargs) }
                }
                Resolved::Instance(id) if method.kind == MethodKind::Constructor => {
                    let class: &JClass = class_ref(env, classes, method.class)?.as_obj().into();
                    unsafe { env.new_object_unchecked(class, id, &jargs) }.map(JValueGen::Object)
                }
                Resolved::Instance(id) => {
                    let t = target.ok_or(BridgeError::BadArguments {
                        method: method.name,
                        message: "instance method without a target".into(),
                    })?;
                    let obj = slots.get(&t.raw()).ok_or(BridgeError::InvalidHandle(t.raw()))?;
                    unsafe { env.call_method_unchecked(obj.as_obj(), id, return_type(method.ret), &jargs) }
                }
            };
            let value = check(env, raw)?;
            convert(env, slots, next_slot, method, value)
        })
    }
}

fn return_type(ret: RetKind) -> ReturnType {
    match ret {
        RetKind::Void => ReturnType::Primitive(Primitive::Void),
        RetKind::Boolean => ReturnType::Primitive(Primitive::Boolean),
        RetKind::Short => ReturnType::Primitive(Primitive::Short),
        RetKind::Int => ReturnType::Primitive(Primitive::Int),
        RetKind::Long => ReturnType::Primitive(Primitive::Long),
        RetKind::Float => ReturnType::Primitive(Primitive::Float),
        RetKind::Double => ReturnType::Primitive(Primitive::Double),
        RetKind::Text | RetKind::Object => ReturnType::Object,
        RetKind::ObjectArray | RetKind::TextArray => ReturnType::Array,
    }
}

fn class_ref<'c>(
    env: &mut JNIEnv<'_>,
    classes: &'c mut HashMap<&'static str, GlobalRef>,
    name: &'static str,
) -> Result<&'c GlobalRef> {
    match classes.entry(name) {
        Entry::Occupied(e) => Ok(e.into_mut()),
        Entry::Vacant(e) => {
            let found = env.find_class(name);
            let local = check(env, found)?;
            let global = env.new_global_ref(&local)?;
            env.delete_local_ref(local)?;
            Ok(e.insert(global))
        }
    }
}

fn resolve(
    env: &mut JNIEnv<'_>,
    classes: &mut HashMap<&'static str, GlobalRef>,
    methods: &mut HashMap<Method, Resolved>,
    method: &Method,
) -> Result<Resolved> {
    if let Some(r) = methods.get(method) {
        return Ok(*r);
    }
    let class: &JClass = class_ref(env, classes, method.class)?.as_obj().into();
    let found = match method.kind {
        MethodKind::Static => env
            .get_static_method_id(class, method.name, method.sig)
            .map(Resolved::Static),
        MethodKind::Instance | MethodKind::Constructor => env
            .get_method_id(class, method.name, method.sig)
            .map(Resolved::Instance),
    };
    let resolved = match found {
        Ok(r) => r,
        Err(_) => {
            if env.exception_check()? {
                env.exception_clear()?;
            }
            return Err(method.no_such_method());
        }
    };
    methods.insert(*method, resolved);
    Ok(resolved)
}

fn marshal(
    env: &mut JNIEnv<'_>,
    slots: &HashMap<u64, GlobalRef>,
    method: &Method,
    args: &[Arg<'_>],
) -> Result<Vec<jvalue>> {
    let mut out = Vec::with_capacity(args.len());
    for arg in args {
        let v = match *arg {
            Arg::Str(s) => jvalue {
                l: env.new_string(s)?.as_raw(),
            },
            Arg::StrArray(items) => {
                let len = i32::try_from(items.len()).map_err(|_| BridgeError::BadArguments {
                    method: method.name,
                    message: format!("{} elements do not fit a Java array", items.len()),
                })?;
                let array = env.new_object_array(len, "java/lang/String", JObject::null())?;
                for (i, item) in items.iter().enumerate() {
                    let s = env.new_string(item)?;
                    env.set_object_array_element(&array, i as i32, &s)?;
                    env.delete_local_ref(s)?;
                }
                jvalue { l: array.as_raw() }
            }
            Arg::Int(i) => jvalue { i },
            Arg::Long(j) => jvalue { j },
            Arg::Bool(b) => jvalue { z: u8::from(b) },
            Arg::Object(r) => {
                let obj = slots.get(&r.raw()).ok_or(BridgeError::InvalidHandle(r.raw()))?;
                jvalue {
                    l: obj.as_obj().as_raw(),
                }
            }
        };
        out.push(v);
    }
    Ok(out)
}

/// Turn a pending Java exception into `BridgeError::Exception` and clear it.
fn check<T>(env: &mut JNIEnv<'_>, result: jni::errors::Result<T>) -> Result<T> {
    match result {
        Ok(v) => Ok(v),
        Err(jni::errors::Error::JavaException) => Err(take_exception(env)?),
        Err(e) => Err(e.into()),
    }
}

fn take_exception(env: &mut JNIEnv<'_>) -> Result<BridgeError> {
    let throwable = env.exception_occurred()?;
    env.exception_clear()?;
    let class = env
        .call_method(&throwable, "getClass", "()Ljava/lang/Class;", &[])?
        .l()?;
    let name = env
        .call_method(&class, "getName", "()Ljava/lang/String;", &[])?
        .l()?;
    let message = env
        .call_method(&throwable, "getMessage", "()Ljava/lang/String;", &[])?
        .l()?;
    let class = read_string(env, name)?.unwrap_or_else(|| "java.lang.Throwable".into());
    let message = read_string(env, message)?.unwrap_or_default();
    debug!(class = %class, message = %message, "java exception");
    Ok(BridgeError::Exception { class, message })
}

fn read_string(env: &mut JNIEnv<'_>, obj: JObject<'_>) -> Result<Option<String>> {
    if obj.is_null() {
        return Ok(None);
    }
    let s = JString::from(obj);
    let text: String = env.get_string(&s)?.into();
    env.delete_local_ref(s)?;
    Ok(Some(text))
}

fn pin(env: &mut JNIEnv<'_>, slots: &mut HashMap<u64, GlobalRef>, next_slot: &mut u64, obj: &JObject<'_>) -> Result<ObjectRef> {
    let global = env.new_global_ref(obj)?;
    *next_slot += 1;
    slots.insert(*next_slot, global);
    Ok(ObjectRef::from_raw(*next_slot))
}

fn null_array(method: &Method) -> BridgeError {
    BridgeError::exception(
        "java.lang.NullPointerException",
        format!("{} returned null", method.name),
    )
}

fn convert(
    env: &mut JNIEnv<'_>,
    slots: &mut HashMap<u64, GlobalRef>,
    next_slot: &mut u64,
    method: &Method,
    value: JValueOwned<'_>,
) -> Result<Returned> {
    let out = match method.ret {
        RetKind::Void => {
            value.v()?;
            Returned::Void
        }
        RetKind::Boolean => Returned::Boolean(value.z()?),
        RetKind::Short => Returned::Short(value.s()?),
        RetKind::Int => Returned::Int(value.i()?),
        RetKind::Long => Returned::Long(value.j()?),
        RetKind::Float => Returned::Float(value.f()?),
        RetKind::Double => Returned::Double(value.d()?),
        RetKind::Text => Returned::Text(read_string(env, value.l()?)?),
        RetKind::Object => {
            let obj = value.l()?;
            if obj.is_null() {
                Returned::Object(None)
            } else {
                Returned::Object(Some(pin(env, slots, next_slot, &obj)?))
            }
        }
        RetKind::ObjectArray => {
            let obj = value.l()?;
            if obj.is_null() {
                return Err(null_array(method));
            }
            let array = JObjectArray::from(obj);
            let len = env.get_array_length(&array)?;
            let mut refs = Vec::with_capacity(len as usize);
            for i in 0..len {
                let elem = env.get_object_array_element(&array, i)?;
                refs.push(pin(env, slots, next_slot, &elem)?);
                env.delete_local_ref(elem)?;
            }
            Returned::ObjectArray(refs)
        }
        RetKind::TextArray => {
            let obj = value.l()?;
            if obj.is_null() {
                return Err(null_array(method));
            }
            let array = JObjectArray::from(obj);
            let len = env.get_array_length(&array)?;
            let mut items = Vec::with_capacity(len as usize);
            for i in 0..len {
                let elem = env.get_object_array_element(&array, i)?;
                if elem.is_null() {
                    items.push(None);
                    continue;
                }
                let rendered = env.call_method(&elem, "toString", "()Ljava/lang/String;", &[]);
                let text = check(env, rendered)?.l()?;
                items.push(read_string(env, text)?);
                env.delete_local_ref(elem)?;
            }
            Returned::TextArray(items)
        }
    };
    Ok(out)
}

impl ManagedRuntime for JvmRuntime {
    fn name(&self) -> &'static str {
        "jvm"
    }

    fn new_object(&mut self, ctor: &Method, args: &[Arg<'_>]) -> Result<ObjectRef> {
        self.invoke(None, ctor, args)?.into_object(ctor)
    }

    fn call_static(&mut self, method: &Method, args: &[Arg<'_>]) -> Result<Returned> {
        self.invoke(None, method, args)
    }

    fn call_method(&mut self, target: ObjectRef, method: &Method, args: &[Arg<'_>]) -> Result<Returned> {
        self.invoke(Some(target), method, args)
    }

    fn release(&mut self, obj: ObjectRef) -> Result<()> {
        if self.shut_down {
            return Err(BridgeError::ShutDown);
        }
        self.slots
            .remove(&obj.raw())
            .map(drop)
            .ok_or(BridgeError::InvalidHandle(obj.raw()))
    }

    fn live_objects(&self) -> usize {
        self.slots.len()
    }

    fn shutdown(&mut self) -> Result<()> {
        if self.shut_down {
            return Err(BridgeError::ShutDown);
        }
        if !self.slots.is_empty() {
            warn!(live = self.slots.len(), "releasing objects still pinned at shutdown");
        }
        self.slots.clear();
        self.classes.clear();
        self.methods.clear();
        self.shut_down = true;
        // SAFETY: every global reference has been dropped above and no other
        // thread uses this VM; nothing touches it after destroy.
        unsafe { self.vm.destroy()? };
        info!("JVM destroyed");
        Ok(())
    }
}
