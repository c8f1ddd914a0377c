/*
 * @Author       : 老董
 * @Description  : TensorProto 解析测试
 */

use crate::assert_err;
use crate::graph::{ConstTensor, DataType, GraphError};
use crate::onnx::reader::parse_tensor;
use crate::onnx::writer::{ProtoWriter, encode_tensor};
use approx::assert_abs_diff_eq;

/// float_data（packed）路径往返
#[test]
fn test_parse_tensor_float_data() {
    let tensor = ConstTensor::full("C1", &[2, 3], 2.0);
    let parsed = parse_tensor(&encode_tensor(&tensor)).unwrap();

    assert_eq!(parsed.name(), "C1");
    assert_eq!(parsed.data_type(), DataType::Float32);
    assert_eq!(parsed.dims(), &[2, 3]);
    assert_eq!(parsed.data().len(), 6);
    for &v in parsed.data() {
        assert_abs_diff_eq!(v, 2.0);
    }
    assert_eq!(parsed, tensor);
}

/// raw_data 路径：小端字节块按 4 字节切成 f32
#[test]
fn test_parse_tensor_raw_data() {
    let mut writer = ProtoWriter::new();
    writer.write_packed_varints(1, &[2]);
    writer.write_varint_field(2, 1); // FLOAT
    writer.write_string_field(8, "W");
    let mut raw = Vec::new();
    raw.extend_from_slice(&0.5f32.to_le_bytes());
    raw.extend_from_slice(&(-1.5f32).to_le_bytes());
    writer.write_bytes_field(9, &raw);

    let parsed = parse_tensor(&writer.into_bytes()).unwrap();
    assert_eq!(parsed.name(), "W");
    assert_eq!(parsed.dims(), &[2]);
    assert_abs_diff_eq!(parsed.data()[0], 0.5);
    assert_abs_diff_eq!(parsed.data()[1], -1.5);
}

/// raw_data 长度不是 4 的倍数报解析错误
#[test]
fn test_parse_tensor_bad_raw_data_length() {
    let mut writer = ProtoWriter::new();
    writer.write_packed_varints(1, &[1]);
    writer.write_varint_field(2, 1);
    writer.write_string_field(8, "W");
    writer.write_bytes_field(9, &[0x00, 0x00, 0x80]);
    assert_err!(parse_tensor(&writer.into_bytes()), GraphError::Parse { .. });
}

/// 非 FLOAT 初始化器（如 INT64）合法但不支持
#[test]
fn test_parse_tensor_int64_unsupported() {
    let mut writer = ProtoWriter::new();
    writer.write_packed_varints(1, &[2]);
    writer.write_varint_field(2, 7); // INT64
    writer.write_string_field(8, "idx");
    assert_err!(
        parse_tensor(&writer.into_bytes()),
        GraphError::Unsupported(msg) if msg.contains("idx")
    );
}

/// 未知元素类型编码报 Unsupported
#[test]
fn test_parse_tensor_unknown_data_type() {
    let mut writer = ProtoWriter::new();
    writer.write_varint_field(2, 42);
    writer.write_string_field(8, "odd");
    assert_err!(parse_tensor(&writer.into_bytes()), GraphError::Unsupported { .. });
}
