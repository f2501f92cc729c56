//! XML-RPC 编解码
//!
//! 请求参数与响应值统一使用 `serde_json::Value` 表示，业务层再通过 serde
//! 转换为具体类型，避免为每个远程方法手写 XML 解析。


use quick_xml::Reader;
use quick_xml::escape::escape;
use quick_xml::events::{BytesStart, Event};
use serde_json::{Map, Number, Value};
use thiserror::Error;

/// Malformed or unexpected XML-RPC document.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct CodecError(pub String);

impl CodecError {
    fn new(detail: impl Into<String>) -> Self {
        Self(detail.into())
    }
}

type CodecResult<T> = std::result::Result<T, CodecError>;

/// A decoded `methodResponse`.
#[derive(Debug, Clone, PartialEq)]
pub enum MethodResponse {
    /// `<params>` carrying a single return value.
    Success(Value),
    /// `<fault>` struct.
    Fault {
        /// `faultCode` member.
        code: i64,
        /// `faultString` member.
        message: String,
    },
}

// ============ Encoding ============

/// Serialize a `methodCall` document.
pub fn encode_method_call(method: &str, params: &[Value]) -> String {
    let mut xml = String::from(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    xml.push_str("<methodCall><methodName>");
    xml.push_str(&escape(method));
    xml.push_str("</methodName><params>");
    for param in params {
        xml.push_str("<param>");
        write_value(&mut xml, param);
        xml.push_str("</param>");
    }
    xml.push_str("</params></methodCall>");
    xml
}

fn write_value(xml: &mut String, value: &Value) {
    xml.push_str("<value>");
    match value {
        Value::Null => xml.push_str("<nil/>"),
        Value::Bool(b) => xml.push_str(&format!("<boolean>{}</boolean>", u8::from(*b))),
        Value::Number(n) => xml.push_str(&number_element(n)),
        Value::String(s) => xml.push_str(&format!("<string>{}</string>", escape(s.as_str()))),
        Value::Array(items) => {
            xml.push_str("<array><data>");
            for item in items {
                write_value(xml, item);
            }
            xml.push_str("</data></array>");
        }
        Value::Object(members) => {
            xml.push_str("<struct>");
            for (name, member) in members {
                xml.push_str(&format!("<member><name>{}</name>", escape(name.as_str())));
                write_value(xml, member);
                xml.push_str("</member>");
            }
            xml.push_str("</struct>");
        }
    }
    xml.push_str("</value>");
}

fn number_element(n: &Number) -> String {
    // 标准 XML-RPC 只有 32 位 <int>；更大的整数按十进制字符串发送，避免 <double> 丢精度
    match n.as_i64().map(i32::try_from) {
        Some(Ok(i)) => format!("<int>{i}</int>"),
        _ if n.is_f64() => format!("<double>{n}</double>"),
        _ => format!("<string>{n}</string>"),
    }
}

// ============ Decoding ============

/// Minimal element tree; text holds the concatenated direct text content.
#[derive(Debug, Default)]
struct Element {
    name: String,
    text: String,
    children: Vec<Element>,
}

impl Element {
    fn named(start: &BytesStart<'_>) -> CodecResult<Self> {
        let name = std::str::from_utf8(start.name().as_ref())
            .map_err(|e| CodecError::new(format!("invalid element name: {e}")))?
            .to_string();
        Ok(Self {
            name,
            ..Self::default()
        })
    }

    fn child(&self, name: &str) -> Option<&Self> {
        self.children.iter().find(|c| c.name == name)
    }

    fn require_child(&self, name: &str) -> CodecResult<&Self> {
        self.child(name)
            .ok_or_else(|| CodecError::new(format!("<{}> is missing <{name}>", self.name)))
    }
}

fn parse_document(xml: &str) -> CodecResult<Element> {
    let mut reader = Reader::from_str(xml);
    let mut stack = vec![Element::default()];

    loop {
        let event = reader
            .read_event()
            .map_err(|e| CodecError::new(format!("malformed XML: {e}")))?;
        match event {
            Event::Start(start) => stack.push(Element::named(&start)?),
            Event::Empty(start) => {
                let element = Element::named(&start)?;
                if let Some(parent) = stack.last_mut() {
                    parent.children.push(element);
                }
            }
            Event::Text(text) => {
                let text = text
                    .unescape()
                    .map_err(|e| CodecError::new(format!("invalid text: {e}")))?;
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&text);
                }
            }
            Event::CData(data) => {
                let data = data.into_inner();
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&String::from_utf8_lossy(&data));
                }
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| CodecError::new("unbalanced end tag"))?;
                let parent = stack
                    .last_mut()
                    .ok_or_else(|| CodecError::new("unbalanced end tag"))?;
                parent.children.push(element);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if stack.len() != 1 {
        return Err(CodecError::new("unexpected end of document"));
    }
    stack
        .pop()
        .and_then(|document| document.children.into_iter().next())
        .ok_or_else(|| CodecError::new("empty document"))
}

/// Parse a `methodResponse` document.
pub fn decode_method_response(xml: &str) -> CodecResult<MethodResponse> {
    let root = parse_document(xml)?;
    if root.name != "methodResponse" {
        return Err(CodecError::new(format!(
            "expected <methodResponse>, found <{}>",
            root.name
        )));
    }

    if let Some(fault) = root.child("fault") {
        let value = decode_value(fault.require_child("value")?)?;
        let code = value
            .get("faultCode")
            .and_then(Value::as_i64)
            .ok_or_else(|| CodecError::new("fault without integer faultCode"))?;
        let message = value
            .get("faultString")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        return Ok(MethodResponse::Fault { code, message });
    }

    let value = root
        .require_child("params")?
        .require_child("param")?
        .require_child("value")?;
    decode_value(value).map(MethodResponse::Success)
}

fn decode_value(value: &Element) -> CodecResult<Value> {
    // 没有类型标签的 <value> 按字符串处理
    let Some(typed) = value.children.first() else {
        return Ok(Value::String(value.text.clone()));
    };

    let scalar = typed.text.trim();
    match typed.name.as_str() {
        "int" | "i4" | "i8" => scalar
            .parse::<i64>()
            .map(Value::from)
            .map_err(|e| CodecError::new(format!("invalid <{}> '{scalar}': {e}", typed.name))),
        "boolean" => match scalar {
            "1" => Ok(Value::Bool(true)),
            "0" => Ok(Value::Bool(false)),
            other => Err(CodecError::new(format!("invalid <boolean> '{other}'"))),
        },
        "double" => {
            let f = scalar
                .parse::<f64>()
                .map_err(|e| CodecError::new(format!("invalid <double> '{scalar}': {e}")))?;
            Number::from_f64(f)
                .map(Value::Number)
                .ok_or_else(|| CodecError::new(format!("non-finite <double> '{scalar}'")))
        }
        "string" => Ok(Value::String(typed.text.clone())),
        "dateTime.iso8601" | "base64" => Ok(Value::String(scalar.to_string())),
        "nil" => Ok(Value::Null),
        "array" => typed
            .require_child("data")?
            .children
            .iter()
            .filter(|c| c.name == "value")
            .map(decode_value)
            .collect::<CodecResult<Vec<_>>>()
            .map(Value::Array),
        "struct" => {
            let mut members = Map::new();
            for member in typed.children.iter().filter(|c| c.name == "member") {
                let name = member.require_child("name")?.text.clone();
                let member_value = decode_value(member.require_child("value")?)?;
                members.insert(name, member_value);
            }
            Ok(Value::Object(members))
        }
        other => Err(CodecError::new(format!("unsupported value type <{other}>"))),
    }
}
