#![forbid(unsafe_code)]

mod indexes;
mod tables;

pub(super) fn full_schema_sql() -> String {
    let mut sql = String::new();
    sql.push_str(tables::SQL);
    sql.push_str(indexes::SQL);
    sql
}
