//! Pass Prediction Library
//!
//! Finds when satellites rise over, culminate above and set below a ground
//! station. Each satellite is searched lazily through [`PassIter`];
//! [`PassPredictor`] runs many satellites on the rayon pool and merges the
//! results into one AOS-ordered list.

pub mod batch;
pub mod catalog;
pub mod config;
pub mod error;
pub mod pass;
pub mod search;

pub use batch::{filter_passes, PassPredictor};
pub use catalog::load_satellites;
pub use config::PassSearchConfig;
pub use error::{PassError, Result};
pub use pass::Pass;
pub use search::{will_be_seen, PassIter, SearchState};
