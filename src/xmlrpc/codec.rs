//! XML-RPC wire codec
//!
//! A call is a `methodCall` document:
//! ```text
//! <?xml version="1.0"?>
//! <methodCall>
//!   <methodName>testgroup_get_status</methodName>
//!   <params><param><value><int>42</int></value></param></params>
//! </methodCall>
//! ```
//! and the reply is a `methodResponse` holding either one param or a fault.

use std::fmt::Write as _;

use quick_xml::escape::escape;
use quick_xml::events::Event;
use quick_xml::Reader;

use crate::common::{Error, Result};

use super::Value;

/// Encode a method call with its positional parameters
pub fn encode_call(method: &str, params: &[Value]) -> String {
    let mut out = String::from("<?xml version=\"1.0\"?>\n<methodCall>");
    let _ = write!(out, "<methodName>{}</methodName><params>", escape(method));
    for param in params {
        out.push_str("<param>");
        write_value(&mut out, param);
        out.push_str("</param>");
    }
    out.push_str("</params></methodCall>\n");
    out
}

fn write_value(out: &mut String, value: &Value) {
    out.push_str("<value>");
    match value {
        Value::Int(i) => {
            // Plain <int> is 32-bit; wider ids need the i8 extension
            if i32::try_from(*i).is_ok() {
                let _ = write!(out, "<int>{}</int>", i);
            } else {
                let _ = write!(out, "<i8>{}</i8>", i);
            }
        }
        Value::Boolean(b) => {
            let _ = write!(out, "<boolean>{}</boolean>", if *b { 1 } else { 0 });
        }
        Value::String(s) => {
            let _ = write!(out, "<string>{}</string>", escape(s.as_str()));
        }
        Value::Double(d) => {
            let _ = write!(out, "<double>{}</double>", d);
        }
        Value::DateTime(s) => {
            let _ = write!(out, "<dateTime.iso8601>{}</dateTime.iso8601>", escape(s.as_str()));
        }
        Value::Base64(s) => {
            let _ = write!(out, "<base64>{}</base64>", s);
        }
        Value::Array(items) => {
            out.push_str("<array><data>");
            for item in items {
                write_value(out, item);
            }
            out.push_str("</data></array>");
        }
        Value::Struct(members) => {
            out.push_str("<struct>");
            for (name, member) in members {
                let _ = write!(out, "<member><name>{}</name>", escape(name.as_str()));
                write_value(out, member);
                out.push_str("</member>");
            }
            out.push_str("</struct>");
        }
        Value::Nil => out.push_str("<nil/>"),
    }
    out.push_str("</value>");
}

/// Minimal element tree built from the reader's events
#[derive(Debug, Default)]
struct Element {
    name: String,
    text: String,
    children: Vec<Element>,
}

impl Element {
    fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    fn require(&self, name: &str) -> Result<&Element> {
        self.child(name).ok_or_else(|| {
            Error::XmlRpc(format!("<{}> is missing a <{}> element", self.name, name))
        })
    }
}

fn xml_error(e: impl std::fmt::Display) -> Error {
    Error::XmlRpc(e.to_string())
}

fn parse_tree(xml: &str) -> Result<Element> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event().map_err(xml_error)? {
            Event::Start(e) => stack.push(Element {
                name: String::from_utf8_lossy(e.local_name().as_ref()).into_owned(),
                ..Element::default()
            }),
            Event::Empty(e) => {
                let element = Element {
                    name: String::from_utf8_lossy(e.local_name().as_ref()).into_owned(),
                    ..Element::default()
                };
                match stack.last_mut() {
                    Some(parent) => parent.children.push(element),
                    None => root = Some(element),
                }
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| Error::XmlRpc("Unbalanced closing tag".to_string()))?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(element),
                    None => root = Some(element),
                }
            }
            Event::Text(t) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&t.unescape().map_err(xml_error)?);
                }
            }
            Event::CData(c) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&String::from_utf8_lossy(&c.into_inner()));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(Error::XmlRpc("Document ended inside an element".to_string()));
    }
    root.ok_or_else(|| Error::XmlRpc("Empty document".to_string()))
}

fn parse_value(element: &Element) -> Result<Value> {
    // An untyped <value> is a string
    let Some(typed) = element.children.first() else {
        return Ok(Value::String(element.text.clone()));
    };

    let text = typed.text.trim();
    match typed.name.as_str() {
        "int" | "i4" | "i8" => text
            .parse()
            .map(Value::Int)
            .map_err(|_| Error::XmlRpc(format!("Invalid integer: {}", text))),
        "boolean" => match text {
            "1" | "true" => Ok(Value::Boolean(true)),
            "0" | "false" => Ok(Value::Boolean(false)),
            other => Err(Error::XmlRpc(format!("Invalid boolean: {}", other))),
        },
        "string" => Ok(Value::String(typed.text.clone())),
        "double" => text
            .parse()
            .map(Value::Double)
            .map_err(|_| Error::XmlRpc(format!("Invalid double: {}", text))),
        "dateTime.iso8601" => Ok(Value::DateTime(text.to_string())),
        "base64" => Ok(Value::Base64(
            typed.text.chars().filter(|c| !c.is_whitespace()).collect(),
        )),
        "nil" => Ok(Value::Nil),
        "array" => typed
            .require("data")?
            .children
            .iter()
            .filter(|c| c.name == "value")
            .map(parse_value)
            .collect::<Result<Vec<_>>>()
            .map(Value::Array),
        "struct" => {
            let mut members = std::collections::BTreeMap::new();
            for member in typed.children.iter().filter(|c| c.name == "member") {
                let name = member.require("name")?.text.clone();
                let value = parse_value(member.require("value")?)?;
                members.insert(name, value);
            }
            Ok(Value::Struct(members))
        }
        other => Err(Error::XmlRpc(format!("Unsupported value type <{}>", other))),
    }
}

/// Parse a `methodResponse` document
///
/// Returns the single response parameter, or `Error::Fault` when the service
/// answered with a fault.
pub fn parse_response(xml: &str) -> Result<Value> {
    let root = parse_tree(xml)?;
    if root.name != "methodResponse" {
        return Err(Error::XmlRpc(format!(
            "Expected <methodResponse>, got <{}>",
            root.name
        )));
    }

    if let Some(fault) = root.child("fault") {
        let detail = parse_value(fault.require("value")?)?;
        let code = detail.get("faultCode").and_then(Value::as_i64).unwrap_or(0);
        let message = detail
            .get("faultString")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string();
        return Err(Error::Fault { code, message });
    }

    let params = root.require("params")?;
    match params.child("param") {
        Some(param) => parse_value(param.require("value")?),
        // A procedure without a return value
        None => Ok(Value::Nil),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_encode_call_without_params() {
        let xml = encode_call("genalyzer_list", &[]);
        assert_eq!(
            xml,
            "<?xml version=\"1.0\"?>\n<methodCall><methodName>genalyzer_list</methodName><params></params></methodCall>\n"
        );
    }

    #[test]
    fn test_encode_call_with_nil_and_int() {
        let xml = encode_call("testing_get_results", &[Value::Int(17), Value::Nil]);
        assert!(xml.contains(
            "<params><param><value><int>17</int></value></param><param><value><nil/></value></param></params>"
        ));
    }

    #[test]
    fn test_encode_wide_int_uses_i8() {
        let xml = encode_call("testgroup_get_status", &[Value::Int(5_000_000_000)]);
        assert!(xml.contains("<i8>5000000000</i8>"));
    }

    #[test]
    fn test_encode_escapes_text() {
        let mut members = BTreeMap::new();
        members.insert("name".to_string(), Value::String("a<b & c".to_string()));
        let xml = encode_call("testgroup_create", &[Value::Struct(members)]);
        assert!(xml.contains("<member><name>name</name><value><string>a&lt;b &amp; c</string></value></member>"));
    }

    #[test]
    fn test_parse_scalar_response() {
        let xml = r#"<?xml version="1.0"?>
<methodResponse>
  <params>
    <param><value><int>42</int></value></param>
  </params>
</methodResponse>"#;
        assert_eq!(parse_response(xml).unwrap(), Value::Int(42));
    }

    #[test]
    fn test_parse_array_of_structs() {
        let xml = r#"<?xml version="1.0"?>
<methodResponse><params><param><value><array><data>
  <value><struct>
    <member><name>name</name><value><string>probeA</string></value></member>
    <member><name>id</name><value><i4>7</i4></value></member>
  </struct></value>
  <value><struct>
    <member><name>name</name><value>probe &amp; B</value></member>
    <member><name>id</name><value><int>8</int></value></member>
  </struct></value>
</data></array></value></param></params></methodResponse>"#;
        let value = parse_response(xml).unwrap();
        let Value::Array(items) = value else {
            panic!("expected array");
        };
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].get("name").and_then(Value::as_str), Some("probeA"));
        assert_eq!(items[0].get("id").and_then(Value::as_i64), Some(7));
        assert_eq!(items[1].get("name").and_then(Value::as_str), Some("probe & B"));
    }

    #[test]
    fn test_parse_string_keeps_whitespace() {
        let xml = "<methodResponse><params><param><value><string>  padded </string></value></param></params></methodResponse>";
        assert_eq!(
            parse_response(xml).unwrap(),
            Value::String("  padded ".to_string())
        );
    }

    #[test]
    fn test_parse_fault() {
        let xml = r#"<?xml version="1.0"?>
<methodResponse><fault><value><struct>
  <member><name>faultCode</name><value><int>403</int></value></member>
  <member><name>faultString</name><value><string>Permission denied</string></value></member>
</struct></value></fault></methodResponse>"#;
        match parse_response(xml) {
            Err(Error::Fault { code, message }) => {
                assert_eq!(code, 403);
                assert_eq!(message, "Permission denied");
            }
            other => panic!("expected fault, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_empty_params_is_nil() {
        let xml = "<methodResponse><params/></methodResponse>";
        assert_eq!(parse_response(xml).unwrap(), Value::Nil);
    }

    #[test]
    fn test_parse_rejects_other_documents() {
        let err = parse_response("<html><body>Login</body></html>").unwrap_err();
        assert!(matches!(err, Error::XmlRpc(_)));
    }

    #[test]
    fn test_parse_rejects_truncated_document() {
        let err = parse_response("<methodResponse><params><param>").unwrap_err();
        assert!(matches!(err, Error::XmlRpc(_)));
    }

    #[test]
    fn test_encoded_call_parses_as_xml() {
        let call = encode_call("testgroup_delete", &[Value::Array(vec![Value::Int(42)])]);
        let tree = parse_tree(&call).unwrap();
        assert_eq!(tree.name, "methodCall");
        assert_eq!(tree.require("methodName").unwrap().text, "testgroup_delete");
    }
}
