//! The client facade: owns the model handle, exposes the results hierarchy
//! and the raw-handle escape hatch.

use crate::error::Result;
use crate::model::{Application, CsiModel, Units};
use crate::results::Results;

/// A connected client for one host application.
///
/// The client owns its model handle exclusively for its lifetime; the
/// connected/not-connected transition happens exactly once, at construction.
/// Dropping the client releases only this local reference — the host
/// application and its model stay open.
///
/// If the host swaps or closes the model mid-session, any subsequent call may
/// fail with a [`TableError`](crate::TableError); no detection is attempted.
///
/// Both ETABS and SAP2000 clients are this one type, parameterized by the
/// backend; construct them with `csi-tables-com`'s `connect_to_etabs`,
/// `connect_to_sap2000`, `start_etabs` or `start_sap2000`.
pub struct CsiClient<M: CsiModel> {
    model: M,
    application: Application,
}

impl<M: CsiModel> CsiClient<M> {
    /// Wrap an already-obtained model handle.
    ///
    /// Usually not called directly; the backend crate's connection functions
    /// return connected clients.
    pub fn new(model: M, application: Application) -> Self {
        tracing::info!(application = %application, "client connected");
        Self { model, application }
    }

    /// The raw model handle, for any automation operation not covered by a
    /// convenience wrapper. The surface is identical for both applications.
    pub fn model(&self) -> &M {
        &self.model
    }

    /// Which host application this client talks to.
    pub fn application(&self) -> Application {
        self.application
    }

    /// Results retrieval operations.
    pub fn results(&self) -> Results<'_, M> {
        Results::new(&self.model)
    }

    /// Initialize a blank model in the given units.
    pub fn new_model(&self, units: Units) -> Result<()> {
        self.model.initialize_new_model(units)
    }

    /// Open a model file and set its present units.
    ///
    /// The file name must have an sdb, $2k, s2k, xlsx, xls, or mdb extension.
    /// The given units override whatever the file carries.
    pub fn open_file(&self, path: &str, units: Units) -> Result<()> {
        self.model.initialize_new_model(Units::default())?;
        self.model.open_file(path)?;
        self.model.set_present_units(units)?;
        Ok(())
    }

    /// Filename of the open model, if it has been saved.
    pub fn model_filename(&self) -> Result<String> {
        self.model.model_filename()
    }
}

impl<M: CsiModel> Drop for CsiClient<M> {
    fn drop(&mut self) {
        // Marks the session boundary; the host's model is not touched.
        tracing::debug!(application = %self.application, "releasing local model handle");
    }
}
