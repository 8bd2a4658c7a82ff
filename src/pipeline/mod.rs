pub mod aggregate;
pub mod derived;
pub mod export;
pub mod percent_change;
pub mod reshape;
