//! Data layer: typed values and records, the raw-export converter, and the
//! `TableauData` query collection.

pub mod converter;
pub mod datatable;
pub mod datavalue_compare;
pub mod group_by;
pub mod tableau_data;
