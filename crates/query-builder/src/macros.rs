/// Builds a [`TableRef`](crate::ast::common::TableRef) from anything
/// displayable: `table_ref!("users")`, `table_ref!(model.table)`.
#[macro_export]
macro_rules! table_ref {
    ($name:expr) => {
        $crate::ast::common::TableRef {
            name: $name.to_string(),
        }
    };
}
