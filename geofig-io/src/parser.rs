use std::borrow::Cow;
use std::fmt;

use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use serde_json::{Map, Value};
use tracing::debug;

use geofig_core::figure::{AdjacencySpec, Figure, FigureBuilder, PointSpec};

use crate::ParseError;
use crate::comments::strip_comments;

const ROOT_KEY: &str = "Figure";
const DESCRIPTION_KEY: &str = "Description";
const POINTS_KEY: &str = "Points";
const SEGMENTS_KEY: &str = "Segments";

/// 将通用 JSON 值转换为 [`Figure`]。解析要么完整成功，要么整体失败。
#[derive(Debug, Clone, Copy)]
pub struct FigureParser {
    builder: FigureBuilder,
    strip_comments: bool,
}

impl Default for FigureParser {
    fn default() -> Self {
        Self {
            builder: FigureBuilder::new(),
            strip_comments: true,
        }
    }
}

impl FigureParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// 控制 [`FigureParser::parse_str`] 是否先移除 `//` 行注释。
    pub fn with_comment_stripping(mut self, enabled: bool) -> Self {
        self.strip_comments = enabled;
        self
    }

    /// 从原始文本解析。JSON 语法错误与重复的对象键在此归类为结构错误，不会原样抛出。
    pub fn parse_str(&self, text: &str) -> Result<Figure, ParseError> {
        let source = if self.strip_comments {
            Cow::Owned(strip_comments(text))
        } else {
            Cow::Borrowed(text)
        };
        let StrictValue(root) =
            serde_json::from_str(&source).map_err(|err| ParseError::Syntax {
                line: err.line(),
                column: err.column(),
                message: err.to_string(),
            })?;
        self.parse(&root)
    }

    pub fn parse(&self, root: &Value) -> Result<Figure, ParseError> {
        let root = expect_object(root, "$")?;
        let figure = required(root, "$", ROOT_KEY, "object")?;
        let figure = expect_object(figure, "$.Figure")?;

        let description = expect_str(
            required(figure, "$.Figure", DESCRIPTION_KEY, "string")?,
            "$.Figure.Description",
        )?;
        let points = parse_points(required(figure, "$.Figure", POINTS_KEY, "array")?)?;
        let adjacency = parse_segments(required(figure, "$.Figure", SEGMENTS_KEY, "array")?)?;
        debug!(
            points = points.len(),
            adjacency = adjacency.len(),
            "已提取图形 JSON 结构"
        );

        Ok(self.builder.build(description, points, adjacency)?)
    }
}

fn parse_points(value: &Value) -> Result<Vec<PointSpec>, ParseError> {
    let entries = expect_array(value, "$.Figure.Points")?;
    let mut points = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        let path = format!("$.Figure.Points[{index}]");
        let object = expect_object(entry, &path)?;
        let name = expect_str(
            required(object, &path, "name", "string")?,
            &format!("{path}.name"),
        )?;
        let x = expect_number(required(object, &path, "x", "number")?, &format!("{path}.x"))?;
        let y = expect_number(required(object, &path, "y", "number")?, &format!("{path}.y"))?;
        points.push(PointSpec::new(name, x, y));
    }
    Ok(points)
}

fn parse_segments(value: &Value) -> Result<Vec<AdjacencySpec>, ParseError> {
    let entries = expect_array(value, "$.Figure.Segments")?;
    let mut adjacency = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        let path = format!("$.Figure.Segments[{index}]");
        let object = expect_object(entry, &path)?;
        let mut keys = object.iter();
        let (from, targets) = match (keys.next(), keys.next()) {
            (Some(pair), None) => pair,
            _ => {
                return Err(ParseError::Malformed {
                    path,
                    expected: "object with exactly one key",
                    found: format!("object with {} keys", object.len()),
                });
            }
        };

        let list_path = format!("{path}.{from}");
        let targets = expect_array(targets, &list_path)?;
        let mut to = Vec::with_capacity(targets.len());
        for (position, target) in targets.iter().enumerate() {
            to.push(expect_str(target, &format!("{list_path}[{position}]"))?.to_string());
        }
        adjacency.push(AdjacencySpec {
            from: from.clone(),
            to,
        });
    }
    Ok(adjacency)
}

/// 与 [`Value`] 相同，但同一对象内出现重复键时报错，而不是静默保留最后一个。
struct StrictValue(Value);

impl<'de> Deserialize<'de> for StrictValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(StrictVisitor).map(StrictValue)
    }
}

struct StrictVisitor;

impl<'de> Visitor<'de> for StrictVisitor {
    type Value = Value;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("any JSON value")
    }

    fn visit_bool<E: de::Error>(self, value: bool) -> Result<Value, E> {
        Ok(Value::Bool(value))
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Value, E> {
        Ok(Value::from(value))
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Value, E> {
        Ok(Value::from(value))
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<Value, E> {
        Ok(Value::from(value))
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Value, E> {
        Ok(Value::String(value.to_owned()))
    }

    fn visit_string<E: de::Error>(self, value: String) -> Result<Value, E> {
        Ok(Value::String(value))
    }

    fn visit_none<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_unit<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_some<D>(self, deserializer: D) -> Result<Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        StrictValue::deserialize(deserializer).map(|StrictValue(value)| value)
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut items = Vec::new();
        while let Some(StrictValue(item)) = seq.next_element()? {
            items.push(item);
        }
        Ok(Value::Array(items))
    }

    fn visit_map<A>(self, mut map: A) -> Result<Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut object = Map::new();
        while let Some(key) = map.next_key::<String>()? {
            if object.contains_key(&key) {
                return Err(de::Error::custom(format_args!("duplicate key `{key}`")));
            }
            let StrictValue(value) = map.next_value()?;
            object.insert(key, value);
        }
        Ok(Value::Object(object))
    }
}

fn required<'a>(
    object: &'a Map<String, Value>,
    path: &str,
    key: &str,
    expected: &'static str,
) -> Result<&'a Value, ParseError> {
    object.get(key).ok_or_else(|| ParseError::Malformed {
        path: format!("{path}.{key}"),
        expected,
        found: "nothing".to_string(),
    })
}

fn expect_object<'a>(value: &'a Value, path: &str) -> Result<&'a Map<String, Value>, ParseError> {
    value
        .as_object()
        .ok_or_else(|| mismatch(path, "object", value))
}

fn expect_array<'a>(value: &'a Value, path: &str) -> Result<&'a Vec<Value>, ParseError> {
    value
        .as_array()
        .ok_or_else(|| mismatch(path, "array", value))
}

fn expect_str<'a>(value: &'a Value, path: &str) -> Result<&'a str, ParseError> {
    value
        .as_str()
        .ok_or_else(|| mismatch(path, "string", value))
}

fn expect_number(value: &Value, path: &str) -> Result<f64, ParseError> {
    value
        .as_f64()
        .ok_or_else(|| mismatch(path, "number", value))
}

fn mismatch(path: &str, expected: &'static str, found: &Value) -> ParseError {
    ParseError::Malformed {
        path: path.to_string(),
        expected,
        found: json_type(found).to_string(),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
