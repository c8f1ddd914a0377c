/*
 * @Author       : 老董
 * @Description  : AttributeProto 解析测试
 */

use crate::assert_err;
use crate::graph::{AttrValue, GraphError};
use crate::onnx::reader::parse_attribute;
use crate::onnx::writer::{ProtoWriter, encode_attribute};
use approx::assert_abs_diff_eq;

/// FLOAT 属性往返
#[test]
fn test_parse_float_attribute() {
    let bytes = encode_attribute("alpha", &AttrValue::Float(1.0));
    let (name, value) = parse_attribute(&bytes).unwrap();
    assert_eq!(name, "alpha");
    match value {
        AttrValue::Float(v) => assert_abs_diff_eq!(v, 1.0),
        other => panic!("预期 Float，实际得到 {other:?}"),
    }
}

/// INT 属性往返
#[test]
fn test_parse_int_attribute() {
    let bytes = encode_attribute("transB", &AttrValue::Int(0));
    let (name, value) = parse_attribute(&bytes).unwrap();
    assert_eq!(name, "transB");
    assert_eq!(value, AttrValue::Int(0));
}

/// INTS 属性往返（packed 编码）
#[test]
fn test_parse_ints_attribute() {
    let bytes = encode_attribute("pads", &AttrValue::Ints(vec![1, 1, 1, 1]));
    let (name, value) = parse_attribute(&bytes).unwrap();
    assert_eq!(name, "pads");
    assert_eq!(value, AttrValue::Ints(vec![1, 1, 1, 1]));
}

/// STRING 属性往返
#[test]
fn test_parse_string_attribute() {
    let bytes = encode_attribute("auto_pad", &AttrValue::String("NOTSET".to_string()));
    let (_, value) = parse_attribute(&bytes).unwrap();
    assert_eq!(value, AttrValue::String("NOTSET".to_string()));
}

/// 非 packed 的 repeated ints（逐个 varint 字段）也能解析
#[test]
fn test_parse_unpacked_ints() {
    let mut writer = ProtoWriter::new();
    writer.write_string_field(1, "strides");
    writer.write_varint_field(8, 1);
    writer.write_varint_field(8, 1);
    writer.write_varint_field(20, 7); // INTS
    let (name, value) = parse_attribute(&writer.into_bytes()).unwrap();
    assert_eq!(name, "strides");
    assert_eq!(value, AttrValue::Ints(vec![1, 1]));
}

/// 无 type 字段时按出现的值字段推断
#[test]
fn test_parse_attribute_without_type_field() {
    let mut writer = ProtoWriter::new();
    writer.write_string_field(1, "transB");
    writer.write_varint_field(3, 1);
    let (_, value) = parse_attribute(&writer.into_bytes()).unwrap();
    assert_eq!(value, AttrValue::Int(1));
}

/// 张量类型的属性（t=5）合法但不支持
#[test]
fn test_parse_tensor_attribute_unsupported() {
    let mut writer = ProtoWriter::new();
    writer.write_string_field(1, "value");
    writer.write_bytes_field(5, &[]);
    assert_err!(
        parse_attribute(&writer.into_bytes()),
        GraphError::Unsupported(msg) if msg.contains("value")
    );
}

/// 没有任何值字段的属性报解析错误
#[test]
fn test_parse_empty_attribute() {
    let mut writer = ProtoWriter::new();
    writer.write_string_field(1, "empty");
    assert_err!(parse_attribute(&writer.into_bytes()), GraphError::Parse { .. });
}
