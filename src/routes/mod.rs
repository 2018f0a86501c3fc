pub mod leads;
pub mod stats;
pub mod wsroute;
