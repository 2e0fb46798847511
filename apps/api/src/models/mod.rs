pub mod analysis;
pub mod history;
