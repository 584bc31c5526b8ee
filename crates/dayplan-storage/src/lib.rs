//! On-disk storage backends for dayplan.

pub mod file_store;
