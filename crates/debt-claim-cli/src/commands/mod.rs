pub mod audit;
pub mod batch;
pub mod calculate;
pub mod rates;
