pub mod controller;
pub mod detail;
pub mod entry_list;
pub mod selection;
