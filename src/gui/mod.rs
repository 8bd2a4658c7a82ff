pub mod data_table;
pub mod image_browser;
pub mod sample_view;
pub mod summary_view;
pub mod theme;
pub mod toolbar;
