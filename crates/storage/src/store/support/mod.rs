#![forbid(unsafe_code)]

mod schema;

pub(super) use schema::{SCHEMA_VERSION, schema_version, setup_sqlite_schema};
