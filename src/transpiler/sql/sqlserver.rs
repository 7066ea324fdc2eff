use super::super::traits::SqlGenerator;

pub struct SqlServerGenerator;

impl SqlGenerator for SqlServerGenerator {
    fn name(&self) -> &'static str {
        "SQL Server"
    }

    fn quote_identifier(&self, id: &str) -> String {
        format!("[{}]", id.replace(']', "]]"))
    }

    fn placeholder(&self, index: usize) -> String {
        format!("@p{}", index)
    }

    fn limit_offset(&self, limit: Option<u64>, offset: Option<u64>, has_order: bool) -> String {
        if limit.is_none() && offset.is_none() {
            return String::new();
        }

        // OFFSET/FETCH is only legal after an ORDER BY
        let mut sql = String::new();
        if !has_order {
            sql.push_str("ORDER BY (SELECT NULL) ");
        }
        sql.push_str(&format!("OFFSET {} ROWS", offset.unwrap_or(0)));
        if let Some(n) = limit {
            sql.push_str(&format!(" FETCH NEXT {} ROWS ONLY", n));
        }
        sql
    }
}
