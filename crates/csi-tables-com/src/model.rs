//! `SapModel` — the COM-backed model handle.
//!
//! Implements the core crate's [`CsiModel`] boundary over the vendor's
//! `SapModel` dispatch object. Each trait method is one documented automation
//! call; vendor status codes and COM exceptions surface as [`TableError`]s.

#![cfg(windows)]

use csi_tables::{CsiModel, RawTable, Result, TableError, Units};
use windows::Win32::System::Variant::VARIANT;

use crate::dispatch::{
    variant_bool, variant_byref_i32, variant_byref_variant, variant_get_i32, variant_get_string,
    variant_i32, variant_str, variant_str_array, DispatchObject,
};

/// The opaque handle to the host application's active analysis model.
///
/// Obtained from the connection functions; owned by one
/// [`CsiClient`](csi_tables::CsiClient) for its lifetime. Invalidated if the
/// host closes the model or exits, in which case calls fail with whatever the
/// host reports.
pub struct SapModel {
    dispatch: DispatchObject,
}

impl SapModel {
    pub(crate) fn new(dispatch: DispatchObject) -> Self {
        Self { dispatch }
    }

    /// Raw dispatch access, for automation operations the trait does not
    /// cover (e.g. `Analyze.RunAnalysis`). The surface is identical for ETABS
    /// and SAP2000.
    pub fn dispatch(&self) -> &DispatchObject {
        &self.dispatch
    }

    fn database_tables(&self) -> Result<DispatchObject> {
        self.dispatch
            .get_child("DatabaseTables")
            .map_err(TableError::Api)
    }

    fn output_setup(&self) -> Result<DispatchObject> {
        self.dispatch
            .get_child("Results")
            .and_then(|results| results.get_child("Setup"))
            .map_err(TableError::Api)
    }
}

/// Vendor calls return 0 on success; anything else is a failure code.
fn check_ret(operation: &'static str, result: &VARIANT) -> Result<()> {
    match variant_get_i32(result) {
        Some(0) | None => Ok(()),
        Some(code) => Err(TableError::NonZeroReturn { operation, code }),
    }
}

impl CsiModel for SapModel {
    fn available_tables(&self) -> Result<Vec<String>> {
        let db = self.database_tables()?;

        let mut count = 0i32;
        let mut keys = VARIANT::default();
        let mut names = VARIANT::default();
        let mut import_types = VARIANT::default();

        let ret = db
            .invoke_method(
                "GetAvailableTables",
                &[
                    variant_byref_i32(&mut count),
                    variant_byref_variant(&mut keys),
                    variant_byref_variant(&mut names),
                    variant_byref_variant(&mut import_types),
                ],
            )
            .map_err(TableError::Api)?;
        check_ret("GetAvailableTables", &ret)?;

        crate::dispatch::variant_get_string_array(&keys).map_err(TableError::Api)
    }

    fn table_for_display(&self, table_key: &str, group_name: &str) -> Result<RawTable> {
        tracing::debug!(table_key, group_name, "GetTableForDisplayArray");
        let db = self.database_tables()?;

        let mut field_key_list = VARIANT::default();
        let mut table_version = 0i32;
        let mut fields_included = VARIANT::default();
        let mut number_records = 0i32;
        let mut table_data = VARIANT::default();

        let ret = db
            .invoke_method(
                "GetTableForDisplayArray",
                &[
                    variant_str(table_key),
                    variant_byref_variant(&mut field_key_list),
                    variant_str(group_name),
                    variant_byref_i32(&mut table_version),
                    variant_byref_variant(&mut fields_included),
                    variant_byref_i32(&mut number_records),
                    variant_byref_variant(&mut table_data),
                ],
            )
            .map_err(TableError::Api)?;
        check_ret("GetTableForDisplayArray", &ret)?;

        let fields =
            crate::dispatch::variant_get_string_array(&fields_included).map_err(TableError::Api)?;
        let values =
            crate::dispatch::variant_get_string_array(&table_data).map_err(TableError::Api)?;

        Ok(RawTable {
            table_key: table_key.to_string(),
            fields,
            num_records: number_records.max(0) as usize,
            values,
        })
    }

    fn deselect_all_cases_and_combos(&self) -> Result<()> {
        let setup = self.output_setup()?;
        let ret = setup
            .invoke_method("DeselectAllCasesAndCombosForOutput", &[])
            .map_err(TableError::Api)?;
        check_ret("DeselectAllCasesAndCombosForOutput", &ret)
    }

    fn select_load_cases(&self, names: &[String]) -> Result<()> {
        let db = self.database_tables()?;
        let mut list = variant_str_array(names).map_err(TableError::Api)?;
        let ret = db
            .invoke_method(
                "SetLoadCasesSelectedForDisplay",
                &[variant_byref_variant(&mut list)],
            )
            .map_err(TableError::Api)?;
        check_ret("SetLoadCasesSelectedForDisplay", &ret)
    }

    fn select_load_combinations(&self, names: &[String]) -> Result<()> {
        let db = self.database_tables()?;
        let mut list = variant_str_array(names).map_err(TableError::Api)?;
        let ret = db
            .invoke_method(
                "SetLoadCombinationsSelectedForDisplay",
                &[variant_byref_variant(&mut list)],
            )
            .map_err(TableError::Api)?;
        check_ret("SetLoadCombinationsSelectedForDisplay", &ret)
    }

    fn initialize_new_model(&self, units: Units) -> Result<()> {
        let ret = self
            .dispatch
            .invoke_method("InitializeNewModel", &[variant_i32(units.as_i32())])
            .map_err(TableError::Api)?;
        check_ret("InitializeNewModel", &ret)
    }

    fn open_file(&self, path: &str) -> Result<()> {
        let file = self.dispatch.get_child("File").map_err(TableError::Api)?;
        let ret = file
            .invoke_method("OpenFile", &[variant_str(path)])
            .map_err(TableError::Api)?;
        check_ret("OpenFile", &ret)
    }

    fn set_present_units(&self, units: Units) -> Result<()> {
        let ret = self
            .dispatch
            .invoke_method("SetPresentUnits", &[variant_i32(units.as_i32())])
            .map_err(TableError::Api)?;
        check_ret("SetPresentUnits", &ret)
    }

    fn model_filename(&self) -> Result<String> {
        let ret = self
            .dispatch
            .invoke_method("GetModelFilename", &[variant_bool(true)])
            .map_err(TableError::Api)?;
        variant_get_string(&ret)
            .ok_or_else(|| TableError::Api("GetModelFilename returned a non-string value".into()))
    }
}
