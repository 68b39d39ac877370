pub mod actor;
pub mod config;
pub mod link;
pub mod login;
pub mod login_token;

use sea_orm::sea_query::{Expr, SimpleExpr};
use serde_json::{Map, Value};

/// SQLite JSON path addressing `keys`, each one quoted so dots and other
/// punctuation are taken literally. Keys must not contain `"`.
fn json_path(keys: &[&str]) -> String {
    debug_assert!(keys.iter().all(|k| !k.contains('"')));

    keys.iter().fold(String::from("$"), |mut path, key| {
        path.push_str(".\"");
        path.push_str(key);
        path.push('"');
        path
    })
}

/// New value for a `data` column with `value` written at `path`.
///
/// The merge happens inside the UPDATE itself (`json_set`), so concurrent
/// writers never read the document first and cannot lose each other's keys.
/// Missing parents are created. An empty path replaces the whole document.
pub(crate) fn data_update(path: &[&str], value: &Value) -> SimpleExpr {
    if path.is_empty() {
        return Expr::value(value.clone());
    }

    Expr::cust_with_values(
        r#"json_set(COALESCE("data", '{}'), ?, json(?))"#,
        [json_path(path), value.to_string()],
    )
}

pub(crate) fn empty_document() -> Value {
    Value::Object(Map::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_quotes_every_key() {
        assert_eq!(json_path(&["lastFailedLogin"]), r#"$."lastFailedLogin""#);
        assert_eq!(json_path(&["profile", "a.b"]), r#"$."profile"."a.b""#);
        assert_eq!(json_path(&[]), "$");
    }
}
