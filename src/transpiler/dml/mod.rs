//! DML (Data Manipulation Language) SQL generation.
//!
//! Only reads are produced; see `select`.

pub mod select;
