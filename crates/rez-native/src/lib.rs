#![allow(non_camel_case_types)]
#![allow(clippy::missing_safety_doc)]

use std::sync::OnceLock;

use rez::module::Namespace;
use rez::Value;

#[repr(C)]
#[derive(Copy, Clone)]
pub struct ev_bytes {
    pub ptr: *mut u8,
    pub len: u32,
}

#[repr(C)]
#[derive(Copy, Clone)]
pub union ev_result_bytes_payload {
    pub ok: ev_bytes,
    pub err: u32,
}

#[repr(C)]
#[derive(Copy, Clone)]
pub struct ev_result_bytes {
    pub tag: u32, // 1 = ok, 0 = err, 2 = nil (payload unused)
    pub payload: ev_result_bytes_payload,
}

extern "C" {
    // Provided by the host runtime.
    fn ev_bytes_alloc(len: u32) -> ev_bytes;

    // Must not return.
    fn ev_trap(code: i32) -> !;
}

const EV_TRAP_REZ_INTERNAL: i32 = 9800;
const EV_TRAP_REZ_TOO_LARGE: i32 = 9801;

const REZ_ERR_BAD_DOC_V1: u32 = 61001;
const REZ_ERR_BAD_ARG_V1: u32 = 61002;
const REZ_ERR_TOO_LARGE_V1: u32 = 61003;
const REZ_ERR_INTERNAL_V1: u32 = 61015;

static MODULE: OnceLock<Namespace> = OnceLock::new();

fn module() -> &'static Namespace {
    MODULE.get_or_init(rez::module::open)
}

fn ok_bytes(out: ev_bytes) -> ev_result_bytes {
    ev_result_bytes {
        tag: 1,
        payload: ev_result_bytes_payload { ok: out },
    }
}

fn ok_nil() -> ev_result_bytes {
    ev_result_bytes {
        tag: 2,
        payload: ev_result_bytes_payload { err: 0 },
    }
}

fn err_bytes(code: u32) -> ev_result_bytes {
    ev_result_bytes {
        tag: 0,
        payload: ev_result_bytes_payload { err: code },
    }
}

#[inline]
unsafe fn bytes_as_slice<'a>(b: ev_bytes) -> &'a [u8] {
    if b.len == 0 {
        return &[];
    }
    std::slice::from_raw_parts(b.ptr as *const u8, b.len as usize)
}

#[inline]
unsafe fn alloc_bytes(len: u32) -> ev_bytes {
    let out = ev_bytes_alloc(len);
    if out.len != len {
        ev_trap(EV_TRAP_REZ_INTERNAL);
    }
    out
}

unsafe fn copy_out(v: &[u8]) -> Option<ev_bytes> {
    let len = u32::try_from(v.len()).ok()?;
    let out = alloc_bytes(len);
    if len != 0 {
        std::ptr::copy_nonoverlapping(v.as_ptr(), out.ptr, v.len());
    }
    Some(out)
}

unsafe fn ok_bytes_vec(v: Vec<u8>) -> ev_result_bytes {
    match copy_out(&v) {
        Some(out) => ok_bytes(out),
        None => err_bytes(REZ_ERR_TOO_LARGE_V1),
    }
}

unsafe fn call_v1(export: &str, doc: ev_bytes, max_args: usize) -> ev_result_bytes {
    let args = match rez::wire::decode_doc(bytes_as_slice(doc)) {
        Ok(args) => args,
        Err(_) => return err_bytes(REZ_ERR_BAD_DOC_V1),
    };
    if args.len() > max_args {
        return err_bytes(REZ_ERR_BAD_ARG_V1);
    }
    match module().call(export, &args) {
        Ok(Value::String(s)) => ok_bytes_vec(s),
        Ok(Value::Nil) => ok_nil(),
        Ok(_) => err_bytes(REZ_ERR_INTERNAL_V1),
        Err(_) => err_bytes(REZ_ERR_BAD_ARG_V1),
    }
}

/// `doc` holds exactly one value, a sequence.
#[no_mangle]
pub extern "C" fn rez_concat_v1(doc: ev_bytes) -> ev_result_bytes {
    std::panic::catch_unwind(|| unsafe { call_v1("concat", doc, 1) })
        .unwrap_or_else(|_| err_bytes(REZ_ERR_INTERNAL_V1))
}

/// `doc` holds zero values (result tag 2) or one value.
#[no_mangle]
pub extern "C" fn rez_escape_html_v1(doc: ev_bytes) -> ev_result_bytes {
    std::panic::catch_unwind(|| unsafe { call_v1("escape.html", doc, 1) })
        .unwrap_or_else(|_| err_bytes(REZ_ERR_INTERNAL_V1))
}

/// Escapes raw bytes; no value document involved.
#[no_mangle]
pub extern "C" fn rez_escape_html_bytes_v1(data: ev_bytes) -> ev_bytes {
    let escaped = std::panic::catch_unwind(|| unsafe {
        rez::escape_html_bytes(bytes_as_slice(data))
    });
    unsafe {
        let Ok(escaped) = escaped else {
            ev_trap(EV_TRAP_REZ_INTERNAL);
        };
        match copy_out(&escaped) {
            Some(out) => out,
            None => ev_trap(EV_TRAP_REZ_TOO_LARGE),
        }
    }
}
