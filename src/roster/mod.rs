//! Student roster engine: record store, validation and the edit/search
//! controller the IPC handlers drive.

mod controller;
mod model;
mod store;
mod validate;

pub use controller::{RecordController, SubmitOutcome};
pub use model::{StudentFields, StudentRecord, StudentRow};
pub use store::{Backend, RecordStore};
