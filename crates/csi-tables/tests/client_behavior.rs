//! Behavioral tests for the client facade over a scripted model boundary.
//!
//! No host application is involved: `ScriptedModel` plays back canned table
//! payloads and records every selection call, so these tests pin down the
//! defaulting policy, the error kinds, and the claim that ETABS and SAP2000
//! clients behave identically over the same automation surface.

use std::cell::RefCell;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use pretty_assertions::assert_eq;

use csi_tables::{
    table_keys, Application, CsiClient, CsiModel, RawTable, TableData, TableError, TableFilter,
    Units,
};

/// A scripted stand-in for the host application's automation surface.
struct ScriptedModel {
    tables: Vec<RawTable>,
    selected_cases: RefCell<Vec<String>>,
    selected_combos: RefCell<Vec<String>>,
    /// One entry per fetch: the (cases, combos, group) in effect at that call.
    fetches: RefCell<Vec<(Vec<String>, Vec<String>, String)>>,
    dropped: Arc<AtomicBool>,
}

impl ScriptedModel {
    fn with_tables(tables: Vec<RawTable>) -> Self {
        Self {
            tables,
            selected_cases: RefCell::new(Vec::new()),
            selected_combos: RefCell::new(Vec::new()),
            fetches: RefCell::new(Vec::new()),
            dropped: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl CsiModel for ScriptedModel {
    fn available_tables(&self) -> Result<Vec<String>, TableError> {
        Ok(self.tables.iter().map(|t| t.table_key.clone()).collect())
    }

    fn table_for_display(&self, table_key: &str, group_name: &str) -> Result<RawTable, TableError> {
        self.fetches.borrow_mut().push((
            self.selected_cases.borrow().clone(),
            self.selected_combos.borrow().clone(),
            group_name.to_string(),
        ));
        self.tables
            .iter()
            .find(|t| t.table_key == table_key)
            .cloned()
            .ok_or_else(|| TableError::Api(format!("host rejected table '{table_key}'")))
    }

    fn deselect_all_cases_and_combos(&self) -> Result<(), TableError> {
        self.selected_cases.borrow_mut().clear();
        self.selected_combos.borrow_mut().clear();
        Ok(())
    }

    fn select_load_cases(&self, names: &[String]) -> Result<(), TableError> {
        *self.selected_cases.borrow_mut() = names.to_vec();
        Ok(())
    }

    fn select_load_combinations(&self, names: &[String]) -> Result<(), TableError> {
        *self.selected_combos.borrow_mut() = names.to_vec();
        Ok(())
    }

    fn initialize_new_model(&self, _units: Units) -> Result<(), TableError> {
        Ok(())
    }

    fn open_file(&self, path: &str) -> Result<(), TableError> {
        if path.ends_with(".sdb") {
            Ok(())
        } else {
            Err(TableError::Api(format!("cannot open '{path}'")))
        }
    }

    fn set_present_units(&self, _units: Units) -> Result<(), TableError> {
        Ok(())
    }

    fn model_filename(&self) -> Result<String, TableError> {
        Ok("scripted.sdb".to_string())
    }
}

impl Drop for ScriptedModel {
    fn drop(&mut self) {
        self.dropped.store(true, Ordering::SeqCst);
    }
}

fn frame_forces_raw() -> RawTable {
    RawTable {
        table_key: table_keys::ELEMENT_FORCES_FRAMES.to_string(),
        fields: vec!["Frame".into(), "OutputCase".into(), "P".into()],
        num_records: 2,
        values: vec![
            "1".into(),
            "DEAD".into(),
            "-10.0".into(),
            "2".into(),
            "DEAD".into(),
            "4.5".into(),
        ],
    }
}

#[test]
fn facade_path_reaches_table_data() {
    let model = ScriptedModel::with_tables(vec![frame_forces_raw()]);
    let client = CsiClient::new(model, Application::Etabs);

    let table = client
        .results()
        .tables()
        .element_forces_frames(&TableFilter::all())
        .unwrap();

    assert_eq!(table.num_columns(), 3);
    assert_eq!(table.num_rows(), 2);
    assert_eq!(table.column_f64("P").unwrap(), vec![-10.0, 4.5]);
}

#[test]
fn omitted_filters_default_to_all_cases_no_group() {
    let model = ScriptedModel::with_tables(vec![frame_forces_raw()]);
    let client = CsiClient::new(model, Application::Etabs);

    client
        .results()
        .tables()
        .element_forces_frames(&TableFilter::all().with_cases(["DEAD"]))
        .unwrap();

    let fetches = client.model().fetches.borrow();
    assert_eq!(
        *fetches,
        vec![(vec!["DEAD".to_string()], Vec::new(), String::new())]
    );
}

#[test]
fn stale_selection_is_cleared_between_requests() {
    let model = ScriptedModel::with_tables(vec![frame_forces_raw()]);
    let client = CsiClient::new(model, Application::Etabs);
    let results = client.results();

    results
        .tables()
        .element_forces_frames(
            &TableFilter::all()
                .with_cases(["DEAD"])
                .with_combinations(["COMB1"])
                .with_group("Columns"),
        )
        .unwrap();
    results
        .tables()
        .element_forces_frames(&TableFilter::all())
        .unwrap();

    let fetches = client.model().fetches.borrow();
    assert_eq!(fetches.len(), 2);
    assert_eq!(
        fetches[0],
        (
            vec!["DEAD".to_string()],
            vec!["COMB1".to_string()],
            "Columns".to_string()
        )
    );
    // The second request must not inherit the first one's selection.
    assert_eq!(fetches[1], (Vec::new(), Vec::new(), String::new()));
}

#[test]
fn unknown_table_is_a_table_error_not_a_connection_error() {
    let model = ScriptedModel::with_tables(vec![frame_forces_raw()]);
    let client = CsiClient::new(model, Application::Etabs);

    let err = client
        .results()
        .tables()
        .get_table("No Such Table", "")
        .unwrap_err();

    assert!(matches!(
        err,
        TableError::TableNotFound { available: 1, .. }
    ));
    // The fetch never reached the boundary.
    assert!(client.model().fetches.borrow().is_empty());
}

#[test]
fn unanalyzed_model_reports_no_tables() {
    let model = ScriptedModel::with_tables(Vec::new());
    let client = CsiClient::new(model, Application::Sap2000);

    let err = client
        .results()
        .tables()
        .get_table(table_keys::BASE_REACTIONS, "")
        .unwrap_err();

    assert!(matches!(err, TableError::NoTables));
}

#[test]
fn etabs_and_sap2000_clients_agree_on_the_same_payload() {
    let etabs = CsiClient::new(
        ScriptedModel::with_tables(vec![frame_forces_raw()]),
        Application::Etabs,
    );
    let sap = CsiClient::new(
        ScriptedModel::with_tables(vec![frame_forces_raw()]),
        Application::Sap2000,
    );

    let filter = TableFilter::all().with_cases(["DEAD"]);
    let from_etabs = etabs
        .results()
        .tables()
        .element_forces_frames(&filter)
        .unwrap();
    let from_sap = sap
        .results()
        .tables()
        .element_forces_frames(&filter)
        .unwrap();

    assert_eq!(from_etabs, from_sap);
    // Byte-identical, down to the serialized form.
    assert_eq!(
        serde_json::to_vec(&from_etabs).unwrap(),
        serde_json::to_vec(&from_sap).unwrap()
    );
}

fn fetch_missing_table(client: CsiClient<ScriptedModel>) -> Result<TableData, TableError> {
    let table = client.results().tables().get_table("No Such Table", "")?;
    Ok(table)
}

#[test]
fn client_releases_its_model_reference_on_early_error_return() {
    let model = ScriptedModel::with_tables(vec![frame_forces_raw()]);
    let flag = model.dropped.clone();
    let client = CsiClient::new(model, Application::Etabs);

    let err = fetch_missing_table(client).unwrap_err();
    assert!(matches!(err, TableError::TableNotFound { .. }));
    assert!(flag.load(Ordering::SeqCst), "model handle not released");
}

#[test]
fn raw_model_escape_hatch() {
    let model = ScriptedModel::with_tables(vec![frame_forces_raw()]);
    let client = CsiClient::new(model, Application::Etabs);

    // Anything the wrapper doesn't cover goes straight to the handle.
    assert_eq!(client.model().model_filename().unwrap(), "scripted.sdb");
    assert_eq!(client.application(), Application::Etabs);
}

#[test]
fn open_file_sets_units_after_opening() {
    let model = ScriptedModel::with_tables(Vec::new());
    let client = CsiClient::new(model, Application::Etabs);

    client.open_file("tower.sdb", Units::kN_m_C).unwrap();
    let err = client.open_file("tower.bad", Units::kN_m_C).unwrap_err();
    assert!(matches!(err, TableError::Api(_)));
}
