pub mod lead_store;
pub mod router;
