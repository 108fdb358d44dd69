//! # csi-tables
//!
//! Result-table retrieval for the CSI structural analysis applications
//! (ETABS and SAP2000) through their shared automation API.
//!
//! The two applications expose an identical `SapModel` automation surface, so
//! this crate models the boundary once as the [`CsiModel`] trait and keeps a
//! single client implementation; the Windows COM backend lives in the
//! `csi-tables-com` crate, which attaches to (or launches) a running host and
//! hands a connected [`CsiClient`] back.
//!
//! The client issues one automation call per request, reshapes the returned
//! headers and flat value buffer into a column-oriented [`TableData`], and
//! returns it. There is no caching, no retry, and no background work.
//!
//! # Example
//!
//! ```rust,ignore
//! use csi_tables::TableFilter;
//!
//! let client = csi_tables_com::connect_to_etabs()?;
//! let forces = client
//!     .results()
//!     .tables()
//!     .element_forces_frames(&TableFilter::all().with_cases(["DEAD", "LIVE"]))?;
//! println!("{} rows", forces.num_rows());
//! ```

pub mod client;
pub mod error;
pub mod model;
pub mod results;
pub mod table;

// Re-exports for convenience
pub use client::CsiClient;
pub use error::{ConnectionError, Result, TableError};
pub use model::{Application, CsiModel, Units};
pub use results::{table_keys, Results, TableFilter, Tables};
pub use table::{RawTable, TableData};
