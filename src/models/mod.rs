pub mod lead;

pub use lead::{CreateLeadRequest, Lead};
