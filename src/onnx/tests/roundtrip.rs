/*
 * @Author       : 老董
 * @Description  : 整模型 编码 → 解析 往返测试
 */

use crate::builder::build_fixture;
use crate::graph::{Graph, Model};
use crate::onnx::{encode_model, parse_model};

/// 夹具模型整体往返：解析结果与原模型逐字段相等
#[test]
fn test_model_roundtrip_equality() {
    let model = build_fixture();
    let bytes = encode_model(&model);
    assert!(!bytes.is_empty());

    let parsed = parse_model(&bytes).unwrap();
    assert_eq!(parsed, model);
}

/// 往返后的模型再次校验仍然零错误
#[test]
fn test_roundtrip_still_validates() {
    let model = build_fixture();
    let parsed = parse_model(&encode_model(&model)).unwrap();
    assert!(parsed.validate().is_ok());

    // 关键结构逐项核对
    let graph = parsed.graph();
    assert_eq!(graph.name(), "six_ops_fixed");
    assert_eq!(graph.nodes_count(), 6);
    assert_eq!(graph.inputs().len(), 2);
    assert_eq!(graph.outputs().len(), 2);
    assert_eq!(graph.initializers().len(), 7);
    assert_eq!(graph.value_infos().len(), 4);
    assert_eq!(parsed.producer_name(), "test");
    assert_eq!(parsed.opset_version(), 16);
    assert_eq!(parsed.ir_version(), 8);
}

/// 空图模型也能往返
#[test]
fn test_empty_graph_roundtrip() {
    let model = Model::new(Graph::with_name("empty"), "test", 16);
    let parsed = parse_model(&encode_model(&model)).unwrap();
    assert_eq!(parsed, model);
}

/// 损坏的字节流报错而非 panic
#[test]
fn test_parse_garbage_fails() {
    assert!(parse_model(&[0xde, 0xad, 0xbe, 0xef]).is_err());
    assert!(parse_model(&[0x80]).is_err());
}
