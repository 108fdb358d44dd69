//! Safe wrapper around IDispatch for late-bound COM automation.
//!
//! The CSI automation objects are accessed through IDispatch (like VBScript
//! late-binding). This module provides ergonomic helpers for method
//! invocation, plus the VARIANT and SAFEARRAY plumbing the vendor's
//! by-reference signatures need: `GetTableForDisplayArray` and friends return
//! their headers and value buffers through `ref` string-array parameters.

#![cfg(windows)]

use std::ffi::c_void;
use std::mem::ManuallyDrop;
use std::ptr;

use windows::{
    core::{BSTR, GUID, HSTRING, PCWSTR},
    Win32::{
        Foundation::{DISP_E_EXCEPTION, VARIANT_BOOL},
        Globalization::GetSystemDefaultLCID,
        System::{
            Com::{
                CLSIDFromProgID, CoCreateInstance, IDispatch, CLSCTX_LOCAL_SERVER, DISPATCH_METHOD,
                DISPATCH_PROPERTYGET, DISPPARAMS, EXCEPINFO, SAFEARRAY,
            },
            Ole::{
                SafeArrayCreateVector, SafeArrayGetElement, SafeArrayGetLBound,
                SafeArrayGetUBound, SafeArrayPutElement,
            },
            Variant::{
                VARENUM, VARIANT, VT_ARRAY, VT_BOOL, VT_BSTR, VT_BYREF, VT_DISPATCH, VT_EMPTY,
                VT_I2, VT_I4, VT_NULL, VT_VARIANT,
            },
        },
    },
};

// -- VARIANT construction helpers --
// The VARIANT struct wraps inner unions in ManuallyDrop, so we use ptr::write
// to set fields without triggering the DerefMut lint.

/// Create an empty VARIANT.
pub fn variant_empty() -> VARIANT {
    VARIANT::default()
}

/// Create a VARIANT containing a bool.
pub fn variant_bool(val: bool) -> VARIANT {
    unsafe {
        let mut v = VARIANT::default();
        let inner = &mut *v.Anonymous.Anonymous;
        ptr::write(&mut inner.vt, VT_BOOL);
        ptr::write(
            &mut inner.Anonymous.boolVal,
            VARIANT_BOOL(if val { -1 } else { 0 }),
        );
        v
    }
}

/// Create a VARIANT containing an i32.
pub fn variant_i32(val: i32) -> VARIANT {
    unsafe {
        let mut v = VARIANT::default();
        let inner = &mut *v.Anonymous.Anonymous;
        ptr::write(&mut inner.vt, VT_I4);
        ptr::write(&mut inner.Anonymous.lVal, val);
        v
    }
}

/// Create a VARIANT containing a BSTR string.
pub fn variant_str(val: &str) -> VARIANT {
    unsafe {
        let bstr = BSTR::from(val);
        let mut v = VARIANT::default();
        let inner = &mut *v.Anonymous.Anonymous;
        ptr::write(&mut inner.vt, VT_BSTR);
        ptr::write(&mut inner.Anonymous.bstrVal, ManuallyDrop::new(bstr));
        v
    }
}

/// Create a VARIANT holding a SAFEARRAY of BSTR built from the given strings.
pub fn variant_str_array(values: &[String]) -> Result<VARIANT, String> {
    unsafe {
        let psa = SafeArrayCreateVector(VT_BSTR, 0, values.len() as u32);
        if psa.is_null() {
            return Err("SafeArrayCreateVector failed".to_string());
        }
        for (i, value) in values.iter().enumerate() {
            let bstr = BSTR::from(value.as_str());
            let index = i as i32;
            // PutElement copies the BSTR; ours is freed when it drops.
            SafeArrayPutElement(psa, &index, bstr.as_ptr() as *const c_void)
                .map_err(|e| format!("SafeArrayPutElement failed: {e}"))?;
        }
        let mut v = VARIANT::default();
        let inner = &mut *v.Anonymous.Anonymous;
        ptr::write(&mut inner.vt, VARENUM(VT_ARRAY.0 | VT_BSTR.0));
        ptr::write(&mut inner.Anonymous.parray, psa);
        Ok(v)
    }
}

/// Create a VT_BYREF|VT_I4 VARIANT pointing at `slot`.
///
/// The returned VARIANT must not outlive `slot`.
pub fn variant_byref_i32(slot: &mut i32) -> VARIANT {
    unsafe {
        let mut v = VARIANT::default();
        let inner = &mut *v.Anonymous.Anonymous;
        ptr::write(&mut inner.vt, VARENUM(VT_BYREF.0 | VT_I4.0));
        ptr::write(&mut inner.Anonymous.plVal, slot as *mut i32);
        v
    }
}

/// Create a VT_BYREF|VT_VARIANT VARIANT pointing at `slot`, which receives
/// whatever the callee writes back (for the vendor's `ref` array parameters).
///
/// The returned VARIANT must not outlive `slot`.
pub fn variant_byref_variant(slot: &mut VARIANT) -> VARIANT {
    unsafe {
        let mut v = VARIANT::default();
        let inner = &mut *v.Anonymous.Anonymous;
        ptr::write(&mut inner.vt, VARENUM(VT_BYREF.0 | VT_VARIANT.0));
        ptr::write(&mut inner.Anonymous.pvarVal, slot as *mut VARIANT);
        v
    }
}

/// Get the VT type of a VARIANT.
pub fn variant_vt(v: &VARIANT) -> u16 {
    unsafe { v.Anonymous.Anonymous.vt.0 }
}

/// Extract an i32 from a VARIANT.
pub fn variant_get_i32(v: &VARIANT) -> Option<i32> {
    unsafe {
        let vt = v.Anonymous.Anonymous.vt;
        let anon = &v.Anonymous.Anonymous.Anonymous;
        if vt == VT_I4 {
            Some(anon.lVal)
        } else if vt == VT_I2 {
            Some(anon.iVal as i32)
        } else {
            None
        }
    }
}

/// Extract a string from a VARIANT.
pub fn variant_get_string(v: &VARIANT) -> Option<String> {
    unsafe {
        if v.Anonymous.Anonymous.vt == VT_BSTR {
            let bstr = &v.Anonymous.Anonymous.Anonymous.bstrVal;
            Some(bstr.to_string())
        } else {
            None
        }
    }
}

/// Extract an IDispatch from a VARIANT.
pub fn variant_get_dispatch(v: &VARIANT) -> Option<IDispatch> {
    unsafe {
        if v.Anonymous.Anonymous.vt == VT_DISPATCH {
            // pdispVal is ManuallyDrop<Option<IDispatch>>
            let opt_disp: &Option<IDispatch> = &v.Anonymous.Anonymous.Anonymous.pdispVal;
            opt_disp.clone()
        } else {
            None
        }
    }
}

/// Extract a Vec<String> from a VARIANT holding a BSTR SAFEARRAY, directly or
/// behind VT_BYREF indirection. Empty/null VARIANTs give an empty Vec.
pub fn variant_get_string_array(v: &VARIANT) -> Result<Vec<String>, String> {
    unsafe {
        let vt = v.Anonymous.Anonymous.vt;
        if vt == VARENUM(VT_BYREF.0 | VT_VARIANT.0) {
            let referenced: *mut VARIANT = v.Anonymous.Anonymous.Anonymous.pvarVal;
            if referenced.is_null() {
                return Err("BYREF VARIANT points at null".to_string());
            }
            return variant_get_string_array(&*referenced);
        }

        let psa: *mut SAFEARRAY = if vt == VARENUM(VT_ARRAY.0 | VT_BSTR.0) {
            v.Anonymous.Anonymous.Anonymous.parray
        } else if vt == VARENUM(VT_BYREF.0 | VT_ARRAY.0 | VT_BSTR.0) {
            *v.Anonymous.Anonymous.Anonymous.pparray
        } else if vt == VT_EMPTY || vt == VT_NULL {
            return Ok(Vec::new());
        } else {
            return Err(format!(
                "expected a string-array VARIANT, got VT={}",
                vt.0
            ));
        };
        read_bstr_array(psa)
    }
}

unsafe fn read_bstr_array(psa: *mut SAFEARRAY) -> Result<Vec<String>, String> {
    if psa.is_null() {
        return Ok(Vec::new());
    }
    let lbound =
        SafeArrayGetLBound(psa, 1).map_err(|e| format!("SafeArrayGetLBound failed: {e}"))?;
    let ubound =
        SafeArrayGetUBound(psa, 1).map_err(|e| format!("SafeArrayGetUBound failed: {e}"))?;

    let mut out = Vec::with_capacity((ubound - lbound + 1).max(0) as usize);
    for i in lbound..=ubound {
        let mut bstr = BSTR::default();
        SafeArrayGetElement(psa, &i, &mut bstr as *mut BSTR as *mut c_void)
            .map_err(|e| format!("SafeArrayGetElement({i}) failed: {e}"))?;
        out.push(bstr.to_string());
    }
    Ok(out)
}

/// Check if a VARIANT is empty or null.
pub fn variant_is_empty(v: &VARIANT) -> bool {
    unsafe {
        let vt = v.Anonymous.Anonymous.vt;
        vt == VT_EMPTY || vt == VT_NULL
    }
}

// -- DispatchObject --

/// A wrapper around an IDispatch COM object providing ergonomic access.
#[derive(Clone)]
pub struct DispatchObject {
    inner: IDispatch,
}

impl DispatchObject {
    /// Create a COM object from a ProgID string (e.g., "ETABSv1.Helper").
    pub fn create_from_progid(progid: &str) -> Result<Self, String> {
        unsafe {
            let hstr = HSTRING::from(progid);
            let clsid =
                CLSIDFromProgID(&hstr).map_err(|e| format!("CLSIDFromProgID failed: {e}"))?;
            let disp: IDispatch = CoCreateInstance(&clsid, None, CLSCTX_LOCAL_SERVER)
                .map_err(|e| format!("CoCreateInstance failed for '{progid}': {e}"))?;
            Ok(Self { inner: disp })
        }
    }

    /// Wrap an existing IDispatch pointer.
    pub fn from_idispatch(disp: IDispatch) -> Self {
        Self { inner: disp }
    }

    /// Look up the DISPID for a member name.
    fn get_dispid(&self, name: &str) -> Result<i32, String> {
        unsafe {
            let wide: Vec<u16> = name.encode_utf16().chain(std::iter::once(0)).collect();
            let pcwstr = PCWSTR(wide.as_ptr());
            let names = [pcwstr];
            let mut dispid = 0i32;
            self.inner
                .GetIDsOfNames(
                    &GUID::zeroed(),
                    names.as_ptr(),
                    1,
                    GetSystemDefaultLCID(),
                    &mut dispid,
                )
                .map_err(|e| format!("GetIDsOfNames('{name}') failed: {e}"))?;
            Ok(dispid)
        }
    }

    /// Get a property value. Equivalent to VB's `obj.PropertyName`.
    pub fn get_property(&self, name: &str) -> Result<VARIANT, String> {
        let dispid = self.get_dispid(name)?;
        unsafe {
            let params = DISPPARAMS::default();
            let mut result = VARIANT::default();
            let mut except = EXCEPINFO::default();
            self.inner
                .Invoke(
                    dispid,
                    &GUID::zeroed(),
                    GetSystemDefaultLCID(),
                    DISPATCH_PROPERTYGET,
                    &params,
                    Some(&mut result),
                    Some(&mut except),
                    None,
                )
                .map_err(|e| format_invoke_error(e, &except, name))?;
            Ok(result)
        }
    }

    /// Invoke a method with arguments. Arguments should be in natural order
    /// (this function reverses them as required by DISPPARAMS).
    pub fn invoke_method(&self, name: &str, args: &[VARIANT]) -> Result<VARIANT, String> {
        let dispid = self.get_dispid(name)?;
        unsafe {
            // DISPPARAMS requires arguments in reverse order
            let mut reversed: Vec<VARIANT> = args.iter().rev().cloned().collect();
            let params = DISPPARAMS {
                rgvarg: if reversed.is_empty() {
                    std::ptr::null_mut()
                } else {
                    reversed.as_mut_ptr()
                },
                rgdispidNamedArgs: std::ptr::null_mut(),
                cArgs: reversed.len() as u32,
                cNamedArgs: 0,
            };
            let mut result = VARIANT::default();
            let mut except = EXCEPINFO::default();
            self.inner
                .Invoke(
                    dispid,
                    &GUID::zeroed(),
                    GetSystemDefaultLCID(),
                    DISPATCH_METHOD,
                    &params,
                    Some(&mut result),
                    Some(&mut except),
                    None,
                )
                .map_err(|e| format_invoke_error(e, &except, name))?;
            Ok(result)
        }
    }

    /// Get a child object (property that returns an IDispatch).
    pub fn get_child(&self, name: &str) -> Result<DispatchObject, String> {
        let variant = self.get_property(name)?;
        extract_dispatch(&variant, name)
    }

    /// Invoke a method and extract the returned IDispatch object.
    pub fn invoke_child(&self, name: &str, args: &[VARIANT]) -> Result<DispatchObject, String> {
        let variant = self.invoke_method(name, args)?;
        extract_dispatch(&variant, name)
    }
}

/// Extract an IDispatch from a VARIANT, with a descriptive error.
fn extract_dispatch(variant: &VARIANT, context: &str) -> Result<DispatchObject, String> {
    if let Some(disp) = variant_get_dispatch(variant) {
        Ok(DispatchObject::from_idispatch(disp))
    } else if variant_is_empty(variant) {
        Err(format!("'{context}' returned empty/null"))
    } else {
        let vt = variant_vt(variant);
        Err(format!(
            "'{context}' returned non-object VARIANT (VT={vt}), expected VT_DISPATCH"
        ))
    }
}

/// Format an Invoke error, including EXCEPINFO details if available.
fn format_invoke_error(err: windows::core::Error, except: &EXCEPINFO, member_name: &str) -> String {
    let code = err.code().0 as u32;
    if code == DISP_E_EXCEPTION.0 as u32 {
        let desc = if !except.bstrDescription.is_empty() {
            except.bstrDescription.to_string()
        } else {
            String::from("(no description)")
        };
        let source = if !except.bstrSource.is_empty() {
            except.bstrSource.to_string()
        } else {
            String::from("(no source)")
        };
        format!("COM exception in '{member_name}': {desc} (source: {source})")
    } else {
        format!("Invoke('{member_name}') failed: {err}")
    }
}
