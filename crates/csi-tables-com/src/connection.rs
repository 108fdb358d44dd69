//! Connection management for the CSI applications' automation objects.
//!
//! Attaching and launching go through the vendor helper object
//! (`ETABSv1.Helper` / `SAP2000v1.Helper`): `GetObject` finds a running API
//! object, `CreateObjectProgID` + `ApplicationStart` launches a new one. No
//! retries, no timeouts beyond what the COM calls provide natively.

#![cfg(windows)]

use std::sync::Once;

use csi_tables::{Application, ConnectionError, CsiClient};
use windows::Win32::System::Com::{CoInitializeEx, COINIT_APARTMENTTHREADED};

use crate::dispatch::{variant_bool, variant_str, DispatchObject};
use crate::model::SapModel;

static COM_INIT: Once = Once::new();

/// Initialize COM once per process, in STA mode as the CSI objects require.
fn ensure_com_initialized() {
    COM_INIT.call_once(|| unsafe {
        // S_FALSE (already initialized on this thread) is not a failure;
        // real problems surface on the first CoCreateInstance call.
        let _ = CoInitializeEx(None, COINIT_APARTMENTTHREADED);
    });
}

fn helper(app: Application) -> Result<DispatchObject, ConnectionError> {
    ensure_com_initialized();
    DispatchObject::create_from_progid(app.helper_progid()).map_err(|message| {
        ConnectionError::Helper {
            application: app,
            message,
        }
    })
}

/// The running application's API object, via the helper's `GetObject`.
fn running_api_object(app: Application) -> Result<DispatchObject, ConnectionError> {
    let helper = helper(app)?;
    helper
        .invoke_child("GetObject", &[variant_str(app.object_progid())])
        .map_err(|_| ConnectionError::NoRunningInstance { application: app })
}

/// Attach to a currently running instance of the given application.
///
/// Fails with [`ConnectionError`] if no instance is running or no model is
/// open; no model handle is constructed in that case.
pub fn connect(app: Application) -> Result<CsiClient<SapModel>, ConnectionError> {
    let object = running_api_object(app)?;
    let model = object
        .get_child("SapModel")
        .map_err(|_| ConnectionError::NoRunningInstance { application: app })?;
    tracing::info!(application = %app, "attached to running instance");
    Ok(CsiClient::new(SapModel::new(model), app))
}

/// Launch a new instance of the given application and connect to it.
pub fn start(app: Application) -> Result<CsiClient<SapModel>, ConnectionError> {
    let helper = helper(app)?;
    let failed = |message| ConnectionError::StartFailed {
        application: app,
        message,
    };

    let object = helper
        .invoke_child("CreateObjectProgID", &[variant_str(app.object_progid())])
        .map_err(failed)?;
    object.invoke_method("ApplicationStart", &[]).map_err(failed)?;
    let model = object.get_child("SapModel").map_err(failed)?;

    tracing::info!(application = %app, "started new instance");
    Ok(CsiClient::new(SapModel::new(model), app))
}

/// Close the running instance of the given application without saving.
pub fn close(app: Application) -> Result<(), ConnectionError> {
    let object = running_api_object(app)?;
    object
        .invoke_method("ApplicationExit", &[variant_bool(false)])
        .map_err(|message| ConnectionError::Com {
            application: app,
            message,
        })?;
    tracing::info!(application = %app, "instance closed");
    Ok(())
}

/// Connect to a currently running ETABS instance.
pub fn connect_to_etabs() -> Result<CsiClient<SapModel>, ConnectionError> {
    connect(Application::Etabs)
}

/// Connect to a currently running SAP2000 instance.
pub fn connect_to_sap2000() -> Result<CsiClient<SapModel>, ConnectionError> {
    connect(Application::Sap2000)
}

/// Start a new ETABS instance.
pub fn start_etabs() -> Result<CsiClient<SapModel>, ConnectionError> {
    start(Application::Etabs)
}

/// Start a new SAP2000 instance.
pub fn start_sap2000() -> Result<CsiClient<SapModel>, ConnectionError> {
    start(Application::Sap2000)
}

/// Close the running ETABS instance.
pub fn close_etabs() -> Result<(), ConnectionError> {
    close(Application::Etabs)
}

/// Close the running SAP2000 instance.
pub fn close_sap2000() -> Result<(), ConnectionError> {
    close(Application::Sap2000)
}
