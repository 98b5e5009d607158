//! Checked access to the JSON objects tiles are persisted as.

use serde_json::{Map, Value};

use crate::geometry::{Point, Rect, Size};

pub type JsonObject = Map<String, Value>;

/// Why a JSON object could not be applied to a tile or scene.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ImportError {
    #[error("missing key '{0}'")]
    MissingKey(String),

    #[error("key '{key}' should be {expected}")]
    WrongType { key: String, expected: &'static str },

    #[error("tile #{index} ({tag}) could not be imported: {source}")]
    Child {
        index: usize,
        tag: String,
        #[source]
        source: Box<ImportError>,
    },
}

impl ImportError {
    fn wrong_type(key: &str, expected: &'static str) -> Self {
        ImportError::WrongType {
            key: key.to_string(),
            expected,
        }
    }
}

pub(crate) fn field<'a>(obj: &'a JsonObject, key: &str) -> Result<&'a Value, ImportError> {
    obj.get(key)
        .ok_or_else(|| ImportError::MissingKey(key.to_string()))
}

pub(crate) fn object<'a>(obj: &'a JsonObject, key: &str) -> Result<&'a JsonObject, ImportError> {
    field(obj, key)?
        .as_object()
        .ok_or_else(|| ImportError::wrong_type(key, "an object"))
}

pub(crate) fn array<'a>(obj: &'a JsonObject, key: &str) -> Result<&'a Vec<Value>, ImportError> {
    field(obj, key)?
        .as_array()
        .ok_or_else(|| ImportError::wrong_type(key, "an array"))
}

pub(crate) fn string<'a>(obj: &'a JsonObject, key: &str) -> Result<&'a str, ImportError> {
    field(obj, key)?
        .as_str()
        .ok_or_else(|| ImportError::wrong_type(key, "a string"))
}

pub(crate) fn number(obj: &JsonObject, key: &str) -> Result<f64, ImportError> {
    field(obj, key)?
        .as_f64()
        .ok_or_else(|| ImportError::wrong_type(key, "a number"))
}

pub(crate) fn rect_to_json(rect: &Rect) -> JsonObject {
    let mut obj = JsonObject::new();
    obj.insert("x".into(), rect.x.into());
    obj.insert("y".into(), rect.y.into());
    obj.insert("width".into(), rect.width.into());
    obj.insert("height".into(), rect.height.into());
    obj
}

pub(crate) fn rect_from_json(obj: &JsonObject) -> Result<Rect, ImportError> {
    Ok(Rect::new(
        number(obj, "x")?,
        number(obj, "y")?,
        number(obj, "width")?,
        number(obj, "height")?,
    ))
}

pub(crate) fn point_to_json(p: Point) -> JsonObject {
    let mut obj = JsonObject::new();
    obj.insert("x".into(), p.x.into());
    obj.insert("y".into(), p.y.into());
    obj
}

pub(crate) fn point_from_json(obj: &JsonObject) -> Result<Point, ImportError> {
    Ok(Point::new(number(obj, "x")?, number(obj, "y")?))
}

pub(crate) fn size_to_json(s: Size) -> JsonObject {
    let mut obj = JsonObject::new();
    obj.insert("width".into(), s.width.into());
    obj.insert("height".into(), s.height.into());
    obj
}

pub(crate) fn size_from_json(obj: &JsonObject) -> Result<Size, ImportError> {
    Ok(Size::new(number(obj, "width")?, number(obj, "height")?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn as_object(v: Value) -> JsonObject {
        v.as_object().cloned().expect("object")
    }

    #[test]
    fn test_missing_and_wrong_type_are_distinguished() {
        let obj = as_object(json!({ "name": 3 }));

        assert_eq!(
            string(&obj, "title"),
            Err(ImportError::MissingKey("title".into()))
        );
        assert!(matches!(
            string(&obj, "name"),
            Err(ImportError::WrongType { expected: "a string", .. })
        ));
    }

    #[test]
    fn test_integers_are_accepted_as_numbers() {
        let obj = as_object(json!({ "x": 1, "y": 2.5, "width": 100, "height": 50 }));
        let rect = rect_from_json(&obj).expect("rect");
        assert_eq!(rect, Rect::new(1.0, 2.5, 100.0, 50.0));
    }

    #[test]
    fn test_rect_json_has_four_fields() {
        let obj = rect_to_json(&Rect::new(-5.0, 0.0, 640.0, 480.0));
        assert_eq!(obj.len(), 4);
        assert_eq!(obj["width"], json!(640.0));
        assert_eq!(rect_from_json(&obj), Ok(Rect::new(-5.0, 0.0, 640.0, 480.0)));
    }

    #[test]
    fn test_child_error_message_names_index_and_tag() {
        let err = ImportError::Child {
            index: 2,
            tag: "Tile::NestedTile".into(),
            source: Box::new(ImportError::MissingKey("contents".into())),
        };
        let msg = err.to_string();
        assert!(msg.contains("#2"));
        assert!(msg.contains("Tile::NestedTile"));
        assert!(msg.contains("contents"));
    }
}
