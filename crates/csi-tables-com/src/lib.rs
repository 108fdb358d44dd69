//! Windows COM backend for the `csi-tables` client.
//!
//! Attaches to (or launches) a running ETABS or SAP2000 instance through the
//! vendor's helper objects and drives its `SapModel` automation surface via
//! IDispatch late binding.
//!
//! # Architecture
//!
//! ```text
//! Your Rust code
//!     └── CsiClient<SapModel> (csi-tables)
//!           └── SapModel / DispatchObject (this crate)
//!                 └── COM: CSI.ETABS.API.ETABSObject or CSI.SAP2000.API.SapObject
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! # #[cfg(windows)]
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use csi_tables::TableFilter;
//!
//! let client = csi_tables_com::connect_to_etabs()?;
//! let forces = client
//!     .results()
//!     .tables()
//!     .element_forces_frames(&TableFilter::all().with_cases(["DEAD"]))?;
//! println!("{} rows of frame forces", forces.num_rows());
//! # Ok(())
//! # }
//! # #[cfg(not(windows))]
//! # fn main() {}
//! ```
//!
//! On non-Windows targets this crate compiles to re-exports only; the COM
//! modules are `#[cfg(windows)]`.

#[cfg(windows)]
mod connection;
#[cfg(windows)]
pub mod dispatch;
#[cfg(windows)]
mod model;

#[cfg(windows)]
pub use connection::{
    close, close_etabs, close_sap2000, connect, connect_to_etabs, connect_to_sap2000, start,
    start_etabs, start_sap2000,
};
#[cfg(windows)]
pub use dispatch::DispatchObject;
#[cfg(windows)]
pub use model::SapModel;

pub use csi_tables::{
    Application, ConnectionError, CsiClient, CsiModel, TableData, TableError, TableFilter, Units,
};
