// Loading tables from the JSON document the grammar compiler writes:
//
//   { "start": 0,
//     "states": [u32...], "actions": [u16...], "gotos": [u16...],
//     "specializations": [u16...],             (optional)
//     "terms": ["name", ...],                  (optional)
//     "nested": [{ "name": "...", "end": u16, "placeholder": u16,
//                  "grammar": { ... } }] }     (optional)
//
// The arrays are taken as-is and validated like any other table.

use serde_json::Value;

use crate::builder::{OwnedNested, OwnedTables};
use crate::errors::{Error, Result};

impl OwnedTables {
    pub fn from_json(text: &str) -> Result<OwnedTables> {
        let document: Value = serde_json::from_str(text).map_err(|e| Error::Json(e.to_string()))?;
        from_value(&document)
    }
}

fn from_value(document: &Value) -> Result<OwnedTables> {
    let start = number(document, "start")?;
    let start = u16::try_from(start).map_err(|_| out_of_range("start", start))?;

    let mut nested = Vec::new();
    if let Some(list) = document.get("nested") {
        let list = list
            .as_array()
            .ok_or_else(|| Error::Json("\"nested\" is not an array".to_string()))?;
        for entry in list {
            let grammar = entry
                .get("grammar")
                .ok_or_else(|| Error::Json("nested grammar without \"grammar\"".to_string()))?;
            nested.push(OwnedNested {
                name: entry
                    .get("name")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
                tables: from_value(grammar)?,
                end: cell(entry, "end")?,
                placeholder: cell(entry, "placeholder")?,
            });
        }
    }

    let tables = OwnedTables::new(
        start,
        words(document, "states")?,
        cells(document, "actions", true)?,
        cells(document, "gotos", true)?,
        cells(document, "specializations", false)?,
        nested,
    )?;

    let names = match document.get("terms").and_then(Value::as_array) {
        Some(terms) => terms
            .iter()
            .map(|t| t.as_str().unwrap_or_default().to_string())
            .collect(),
        None => Vec::new(),
    };
    Ok(tables.with_names(names))
}

fn out_of_range(key: &str, value: u64) -> Error {
    Error::Json(format!("\"{}\" value {} is out of range", key, value))
}

fn number(document: &Value, key: &str) -> Result<u64> {
    document
        .get(key)
        .and_then(Value::as_u64)
        .ok_or_else(|| Error::Json(format!("missing or non-integer \"{}\"", key)))
}

fn cell(document: &Value, key: &str) -> Result<u16> {
    let n = number(document, key)?;
    u16::try_from(n).map_err(|_| out_of_range(key, n))
}

fn array<'a>(document: &'a Value, key: &str, required: bool) -> Result<&'a [Value]> {
    match document.get(key) {
        Some(Value::Array(values)) => Ok(values),
        Some(_) => Err(Error::Json(format!("\"{}\" is not an array", key))),
        None if required => Err(Error::Json(format!("missing \"{}\"", key))),
        None => Ok(&[]),
    }
}

fn cells(document: &Value, key: &str, required: bool) -> Result<Vec<u16>> {
    array(document, key, required)?
        .iter()
        .map(|v| {
            let n = v
                .as_u64()
                .ok_or_else(|| Error::Json(format!("non-integer in \"{}\"", key)))?;
            u16::try_from(n).map_err(|_| out_of_range(key, n))
        })
        .collect()
}

fn words(document: &Value, key: &str) -> Result<Vec<u32>> {
    array(document, key, true)?
        .iter()
        .map(|v| {
            let n = v
                .as_u64()
                .ok_or_else(|| Error::Json(format!("non-integer in \"{}\"", key)))?;
            u32::try_from(n).map_err(|_| out_of_range(key, n))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::Action;
    use crate::errors::TableKind;

    const DOCUMENT: &str = r#"{
        "start": 0,
        "terms": ["", "", "", "A", "", "X"],
        "states": [0, 0, 0,  0, 4, 3,  2, 8, 3],
        "actions": [3, 1, 0, 65535,  0, 5, 9, 65535,  65535],
        "gotos": [5, 2, 65535, 65535]
    }"#;

    #[test]
    fn loads_and_validates() {
        let owned = OwnedTables::from_json(DOCUMENT).unwrap();
        assert_eq!(owned.names()[5], "X");

        let tables = owned.view();
        assert_eq!(tables.action(0, 3), Ok(Some(Action::shift(1))));
        // high cell 9 = reduce flag | depth 1
        assert_eq!(tables.action(1, 0), Ok(Some(Action::reduce(5, 1))));
        assert_eq!(tables.goto(0, 5), Ok(Some(2)));
    }

    #[test]
    fn reports_shape_errors() {
        assert!(matches!(OwnedTables::from_json("{"), Err(Error::Json(_))));
        assert!(matches!(
            OwnedTables::from_json(r#"{"start": 0, "states": [0, 0, 0], "gotos": [65535]}"#),
            Err(Error::Json(_))
        ));
        assert!(matches!(
            OwnedTables::from_json(
                r#"{"start": 0, "states": [0, 0, 0], "actions": [70000], "gotos": [65535]}"#
            ),
            Err(Error::Json(_))
        ));
    }

    #[test]
    fn table_errors_pass_through() {
        let err = OwnedTables::from_json(
            r#"{"start": 0, "states": [0, 0, 0], "actions": [3, 1], "gotos": [65535]}"#,
        )
        .unwrap_err();
        assert_eq!(
            err,
            Error::OddCells {
                table: TableKind::Actions,
                offset: 1
            }
        );
    }

    #[test]
    fn nested_grammars() {
        let text = format!(
            r#"{{"start": 0, "states": [4, 0, 0], "actions": [65535], "gotos": [65535],
                "nested": [{{"name": "inner", "end": 7, "placeholder": 9, "grammar": {}}}]}}"#,
            DOCUMENT
        );
        let owned = OwnedTables::from_json(&text).unwrap();
        let tables = owned.view();
        let inner = tables.nested(0).unwrap();
        assert_eq!(inner.name, "inner");
        assert_eq!((inner.end, inner.placeholder), (7, 9));
        assert_eq!(inner.tables.state_count(), 3);
        assert_eq!(tables.descriptor(0).unwrap().nest_index(), Some(0));
    }
}
