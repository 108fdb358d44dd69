//! Results retrieval: the `client.results().tables()` hierarchy.

use serde::{Deserialize, Serialize};

use crate::error::{Result, TableError};
use crate::model::CsiModel;
use crate::table::TableData;

/// Vendor table keys for the named convenience methods.
///
/// These exist purely so call sites don't hard-code table-name strings.
pub mod table_keys {
    pub const ELEMENT_FORCES_FRAMES: &str = "Element Forces - Frames";
    pub const ELEMENT_FORCES_BEAMS: &str = "Element Forces - Beams";
    pub const JOINT_DISPLACEMENTS: &str = "Joint Displacements";
    pub const JOINT_REACTIONS: &str = "Joint Reactions";
    pub const BASE_REACTIONS: &str = "Base Reactions";
    pub const MODAL_PERIODS: &str = "Modal Periods And Frequencies";
}

/// Optional restriction on a table request: load cases, load combinations,
/// and an element group. Empty means "no restriction".
///
/// Names are passed straight through to the host, which validates them and
/// reports failures; nothing is checked locally.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableFilter {
    pub load_cases: Vec<String>,
    pub load_combinations: Vec<String>,
    pub group: String,
}

impl TableFilter {
    /// No restriction: all cases, all combinations, all elements.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_cases<I, S>(mut self, cases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.load_cases = cases.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_combinations<I, S>(mut self, combinations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.load_combinations = combinations.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = group.into();
        self
    }
}

/// Results operations, reached via
/// [`CsiClient::results`](crate::CsiClient::results).
pub struct Results<'a, M> {
    model: &'a M,
}

impl<'a, M: CsiModel> Results<'a, M> {
    pub(crate) fn new(model: &'a M) -> Self {
        Self { model }
    }

    /// Table retrieval operations.
    pub fn tables(&self) -> Tables<'a, M> {
        Tables { model: self.model }
    }
}

/// Retrieval of named database tables from the host application.
pub struct Tables<'a, M> {
    model: &'a M,
}

impl<'a, M: CsiModel> Tables<'a, M> {
    /// The table keys available in the open model.
    pub fn available(&self) -> Result<Vec<String>> {
        self.model.available_tables()
    }

    /// Retrieve any table by its vendor key, optionally filtered to one
    /// element group.
    ///
    /// The key is checked against the model's available tables first so an
    /// unrecognized name (or an unanalyzed model with no tables at all) fails
    /// with a descriptive [`TableError`] rather than an opaque host code.
    pub fn get_table(&self, table_key: &str, group_name: &str) -> Result<TableData> {
        let available = self.model.available_tables()?;
        if available.is_empty() {
            return Err(TableError::NoTables);
        }
        if !available.iter().any(|key| key == table_key) {
            return Err(TableError::TableNotFound {
                table_key: table_key.to_string(),
                available: available.len(),
            });
        }

        tracing::debug!(table_key, group_name, "retrieving table");
        let raw = self.model.table_for_display(table_key, group_name)?;
        TableData::from_raw(raw)
    }

    /// Apply a filter's case/combination selection, then fetch the table.
    ///
    /// The selection is always cleared first; empty case/combination lists
    /// issue no select calls, so the host falls back to "all".
    fn get_filtered(&self, table_key: &str, filter: &TableFilter) -> Result<TableData> {
        self.model.deselect_all_cases_and_combos()?;
        if !filter.load_cases.is_empty() {
            self.model.select_load_cases(&filter.load_cases)?;
        }
        if !filter.load_combinations.is_empty() {
            self.model.select_load_combinations(&filter.load_combinations)?;
        }
        self.get_table(table_key, &filter.group)
    }

    /// Frame element forces (`P`, `V2`, `V3`, `T`, `M2`, `M3` columns).
    pub fn element_forces_frames(&self, filter: &TableFilter) -> Result<TableData> {
        self.get_filtered(table_keys::ELEMENT_FORCES_FRAMES, filter)
    }

    /// Beam element forces.
    pub fn element_forces_beams(&self, filter: &TableFilter) -> Result<TableData> {
        self.get_filtered(table_keys::ELEMENT_FORCES_BEAMS, filter)
    }

    /// Joint displacements (`U1`..`U3`, `R1`..`R3` columns).
    pub fn joint_displacements(&self, filter: &TableFilter) -> Result<TableData> {
        self.get_filtered(table_keys::JOINT_DISPLACEMENTS, filter)
    }

    /// Joint reactions.
    pub fn joint_reactions(&self, filter: &TableFilter) -> Result<TableData> {
        self.get_filtered(table_keys::JOINT_REACTIONS, filter)
    }

    /// Base reactions (`FX`..`FZ`, `MX`..`MZ` columns).
    pub fn base_reactions(&self, filter: &TableFilter) -> Result<TableData> {
        self.get_filtered(table_keys::BASE_REACTIONS, filter)
    }

    /// Modal periods and frequencies.
    pub fn modal_periods(&self, filter: &TableFilter) -> Result<TableData> {
        self.get_filtered(table_keys::MODAL_PERIODS, filter)
    }
}
