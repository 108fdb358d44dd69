//! The automation boundary: which host application a client talks to, the
//! vendor units enumeration, and the [`CsiModel`] trait that backends
//! implement.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::table::RawTable;

/// Which CSI host application a client talks to.
///
/// ETABS and SAP2000 share an identical `SapModel` automation surface; the
/// only differences are the COM class identifiers used to attach to or launch
/// a process, so those live here as data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Application {
    Etabs,
    Sap2000,
}

impl Application {
    /// Human-readable application name, as the vendor spells it.
    pub fn display_name(&self) -> &'static str {
        match self {
            Application::Etabs => "ETABS",
            Application::Sap2000 => "SAP2000",
        }
    }

    /// ProgID of the vendor helper object used to attach/launch.
    pub fn helper_progid(&self) -> &'static str {
        match self {
            Application::Etabs => "ETABSv1.Helper",
            Application::Sap2000 => "SAP2000v1.Helper",
        }
    }

    /// ProgID of the application's automation API object.
    pub fn object_progid(&self) -> &'static str {
        match self {
            Application::Etabs => "CSI.ETABS.API.ETABSObject",
            Application::Sap2000 => "CSI.SAP2000.API.SapObject",
        }
    }
}

impl fmt::Display for Application {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// The vendor `eUnits` enumeration (force, length, temperature).
///
/// Values match the constants the automation API expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
#[allow(non_camel_case_types)]
pub enum Units {
    lb_in_F = 1,
    lb_ft_F = 2,
    kip_in_F = 3,
    kip_ft_F = 4,
    kN_mm_C = 5,
    kN_m_C = 6,
    kgf_mm_C = 7,
    kgf_m_C = 8,
    N_mm_C = 9,
    N_m_C = 10,
    tonf_mm_C = 11,
    tonf_m_C = 12,
    kN_cm_C = 13,
    kgf_cm_C = 14,
    N_cm_C = 15,
    tonf_cm_C = 16,
}

impl Units {
    /// The raw value the vendor API expects.
    pub fn as_i32(self) -> i32 {
        self as i32
    }
}

impl Default for Units {
    fn default() -> Self {
        Units::kN_m_C
    }
}

/// The host application's automation surface, as consumed by this crate.
///
/// This is a fixed, externally-owned contract: one method per documented
/// vendor operation, no negotiation, no local validation of names. Backends
/// (the COM crate, test mocks) implement it; everything above it —
/// [`Tables`](crate::Tables), [`CsiClient`](crate::CsiClient) — is backend
/// agnostic.
///
/// Host-reported failures come back as
/// [`TableError::Api`](crate::TableError::Api) with the host's own message.
pub trait CsiModel {
    /// Enumerate the table keys available in the open model.
    fn available_tables(&self) -> Result<Vec<String>>;

    /// Fetch one named table: field names, record count, and the flat
    /// row-major value buffer. An empty `group_name` means no restriction.
    fn table_for_display(&self, table_key: &str, group_name: &str) -> Result<RawTable>;

    /// Clear the output selection of load cases and combinations.
    fn deselect_all_cases_and_combos(&self) -> Result<()>;

    /// Restrict table output to the named load cases.
    fn select_load_cases(&self, names: &[String]) -> Result<()>;

    /// Restrict table output to the named load combinations.
    fn select_load_combinations(&self, names: &[String]) -> Result<()>;

    /// Initialize a blank model in the given units.
    fn initialize_new_model(&self, units: Units) -> Result<()>;

    /// Open a model file (.sdb, .$2k, .s2k, .xlsx, .xls or .mdb).
    fn open_file(&self, path: &str) -> Result<()>;

    /// Set the present units of the open model.
    fn set_present_units(&self, units: Units) -> Result<()>;

    /// Filename of the open model, if it has been saved.
    fn model_filename(&self) -> Result<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn units_values_match_vendor_constants() {
        assert_eq!(Units::lb_in_F.as_i32(), 1);
        assert_eq!(Units::kN_m_C.as_i32(), 6);
        assert_eq!(Units::tonf_cm_C.as_i32(), 16);
        assert_eq!(Units::default(), Units::kN_m_C);
    }

    #[test]
    fn application_identifiers() {
        assert_eq!(Application::Etabs.to_string(), "ETABS");
        assert_eq!(Application::Sap2000.to_string(), "SAP2000");
        assert_eq!(Application::Etabs.helper_progid(), "ETABSv1.Helper");
        assert_eq!(
            Application::Sap2000.object_progid(),
            "CSI.SAP2000.API.SapObject"
        );
    }
}
