//! Tabular results: the raw payload a host hands back and the reshaped,
//! column-oriented [`TableData`].

use serde::{Deserialize, Serialize};

use crate::error::{Result, TableError};

/// One table exactly as the host's display-array call returns it: field names
/// plus a flat row-major string buffer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTable {
    /// The vendor table key this payload came from.
    pub table_key: String,
    /// Column headers, in table order.
    pub fields: Vec<String>,
    /// Record count as reported by the host.
    pub num_records: usize,
    /// Row-major values: `fields.len()` entries per record.
    pub values: Vec<String>,
}

/// A reshaped result table: ordered named columns, one value per row.
///
/// Row order is exactly as the host returned it; no sort, no dedup. Values
/// stay as the strings the host supplied — the display-array call is untyped —
/// with [`column_f64`](TableData::column_f64) and
/// [`column_i64`](TableData::column_i64) for lenient numeric access.
///
/// Invariant: every column has the same length.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableData {
    columns: Vec<String>,
    data: Vec<Vec<String>>,
}

impl TableData {
    /// A table with no columns and no rows.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Reshape a raw payload into columns, using the header count to split the
    /// flat buffer into rows.
    ///
    /// Fails if the buffer does not divide evenly into rows, or if the host's
    /// reported record count disagrees with the buffer size.
    pub fn from_raw(raw: RawTable) -> Result<Self> {
        let ncols = raw.fields.len();
        if ncols == 0 {
            if raw.values.is_empty() {
                return Ok(Self::empty());
            }
            return Err(TableError::ShapeMismatch {
                table_key: raw.table_key,
                fields: 0,
                values: raw.values.len(),
            });
        }
        if raw.values.len() % ncols != 0 {
            return Err(TableError::ShapeMismatch {
                table_key: raw.table_key,
                fields: ncols,
                values: raw.values.len(),
            });
        }
        let nrows = raw.values.len() / ncols;
        if nrows != raw.num_records {
            return Err(TableError::RecordCountMismatch {
                table_key: raw.table_key,
                reported: raw.num_records,
                computed: nrows,
            });
        }

        let mut data: Vec<Vec<String>> = (0..ncols).map(|_| Vec::with_capacity(nrows)).collect();
        for (i, value) in raw.values.into_iter().enumerate() {
            data[i % ncols].push(value);
        }
        Ok(Self {
            columns: raw.fields,
            data,
        })
    }

    /// Column names, in table order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn num_rows(&self) -> usize {
        self.data.first().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.num_rows() == 0
    }

    /// The values of a named column, in row order.
    pub fn column(&self, name: &str) -> Option<&[String]> {
        let idx = self.columns.iter().position(|c| c == name)?;
        Some(&self.data[idx])
    }

    /// A named column parsed as `f64`. Unparseable cells become `0.0`.
    pub fn column_f64(&self, name: &str) -> Result<Vec<f64>> {
        let values = self
            .column(name)
            .ok_or_else(|| TableError::ColumnNotFound(name.to_string()))?;
        Ok(values
            .iter()
            .map(|v| v.trim().parse::<f64>().unwrap_or(0.0))
            .collect())
    }

    /// A named column parsed as `i64`. Unparseable cells become `0`.
    pub fn column_i64(&self, name: &str) -> Result<Vec<i64>> {
        let values = self
            .column(name)
            .ok_or_else(|| TableError::ColumnNotFound(name.to_string()))?;
        Ok(values
            .iter()
            .map(|v| {
                let v = v.trim();
                v.parse::<i64>()
                    .unwrap_or_else(|_| v.parse::<f64>().map(|f| f as i64).unwrap_or(0))
            })
            .collect())
    }

    /// One row as a slice of cell references, in column order.
    pub fn row(&self, index: usize) -> Option<Vec<&str>> {
        if index >= self.num_rows() {
            return None;
        }
        Some(self.data.iter().map(|col| col[index].as_str()).collect())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    use super::*;

    fn raw(fields: &[&str], num_records: usize, values: &[&str]) -> RawTable {
        RawTable {
            table_key: "Test Table".to_string(),
            fields: fields.iter().map(|s| s.to_string()).collect(),
            num_records,
            values: values.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn reshapes_row_major_buffer_into_columns() {
        let table = TableData::from_raw(raw(
            &["Frame", "OutputCase", "P"],
            2,
            &["1", "DEAD", "-12.5", "2", "DEAD", "3.75"],
        ))
        .unwrap();

        assert_eq!(table.num_columns(), 3);
        assert_eq!(table.num_rows(), 2);
        assert_eq!(table.column("Frame").unwrap(), ["1", "2"]);
        assert_eq!(table.column("OutputCase").unwrap(), ["DEAD", "DEAD"]);
        assert_eq!(table.column("P").unwrap(), ["-12.5", "3.75"]);
        assert_eq!(table.row(1).unwrap(), vec!["2", "DEAD", "3.75"]);
        assert_eq!(table.row(2), None);
    }

    #[test]
    fn zero_records_keeps_headers() {
        let table = TableData::from_raw(raw(&["Joint", "U1"], 0, &[])).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.columns(), ["Joint", "U1"]);
    }

    #[test]
    fn uneven_buffer_is_rejected() {
        let err = TableData::from_raw(raw(&["A", "B"], 2, &["1", "2", "3"])).unwrap_err();
        assert!(matches!(
            err,
            TableError::ShapeMismatch {
                fields: 2,
                values: 3,
                ..
            }
        ));
    }

    #[test]
    fn disagreeing_record_count_is_rejected() {
        let err = TableData::from_raw(raw(&["A", "B"], 3, &["1", "2", "3", "4"])).unwrap_err();
        assert!(matches!(
            err,
            TableError::RecordCountMismatch {
                reported: 3,
                computed: 2,
                ..
            }
        ));
    }

    #[test]
    fn values_without_fields_are_rejected() {
        let err = TableData::from_raw(raw(&[], 1, &["stray"])).unwrap_err();
        assert!(matches!(err, TableError::ShapeMismatch { fields: 0, .. }));
    }

    #[test]
    fn numeric_columns_coerce_leniently() {
        let table = TableData::from_raw(raw(
            &["Frame", "P"],
            3,
            &["1", "-12.5", "2", "n/a", "17", " 3.75 "],
        ))
        .unwrap();

        assert_eq!(table.column_f64("P").unwrap(), vec![-12.5, 0.0, 3.75]);
        assert_eq!(table.column_i64("Frame").unwrap(), vec![1, 2, 17]);
        assert!(matches!(
            table.column_f64("V2").unwrap_err(),
            TableError::ColumnNotFound(_)
        ));
    }

    proptest! {
        #[test]
        fn reshape_preserves_dimensions(ncols in 1usize..12, nrows in 0usize..64) {
            let fields: Vec<String> = (0..ncols).map(|c| format!("F{c}")).collect();
            let values: Vec<String> = (0..ncols * nrows).map(|i| i.to_string()).collect();
            let table = TableData::from_raw(RawTable {
                table_key: "Any".to_string(),
                fields: fields.clone(),
                num_records: nrows,
                values,
            })
            .unwrap();

            prop_assert_eq!(table.num_columns(), ncols);
            prop_assert_eq!(table.num_rows(), nrows);
            for name in &fields {
                prop_assert_eq!(table.column(name).unwrap().len(), nrows);
            }
        }
    }
}
