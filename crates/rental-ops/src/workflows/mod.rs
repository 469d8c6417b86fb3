pub mod cleanings;
pub mod import;
pub mod turnover;
