//! Input loading: spreadsheet tables and cortical surface assets.

pub mod surface;
pub mod table;
