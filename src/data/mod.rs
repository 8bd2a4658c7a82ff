pub mod images;
pub mod measurement;
pub mod reference;
