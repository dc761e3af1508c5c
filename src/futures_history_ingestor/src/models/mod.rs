pub mod chunk;
pub mod dataset;
pub mod date_range;
pub mod table;
pub mod timeframe;
