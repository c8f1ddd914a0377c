/*
 * @Author       : 老董
 * @Description  : NodeProto 解析测试
 */

use crate::assert_err;
use crate::graph::{Conv, Gemm, GraphError, OpKind, OpNode, Relu};
use crate::onnx::reader::parse_node;
use crate::onnx::writer::{ProtoWriter, encode_node};

/// 带属性的 Conv 节点往返：op_type + 属性落回封闭的算子枚举
#[test]
fn test_parse_conv_node() {
    let node = OpNode::new(
        "conv",
        Conv {
            kernel_shape: (3, 3),
            pads: [1, 1, 1, 1],
            strides: (1, 1),
        },
        &["X1", "W_conv", "B_conv"],
        &["Y1"],
    );
    let parsed = parse_node(&encode_node(&node)).unwrap();
    assert_eq!(parsed, node);
}

/// 无属性节点往返
#[test]
fn test_parse_relu_node() {
    let node = OpNode::new("relu", Relu, &["Y1"], &["Z1"]);
    let parsed = parse_node(&encode_node(&node)).unwrap();
    assert_eq!(parsed.name(), "relu");
    assert_eq!(parsed.op(), &OpKind::Relu(Relu));
    assert_eq!(parsed.inputs(), &["Y1"]);
    assert_eq!(parsed.outputs(), &["Z1"]);
}

/// Gemm 的浮点/整型属性往返
#[test]
fn test_parse_gemm_node() {
    let node = OpNode::new(
        "gemm",
        Gemm {
            alpha: 1.0,
            beta: 1.0,
            trans_b: false,
        },
        &["Y2", "W_gemm", "B_gemm"],
        &["Out2"],
    );
    let parsed = parse_node(&encode_node(&node)).unwrap();
    assert_eq!(parsed, node);
}

/// 不在算子词汇表内的 op_type 报 Unsupported
#[test]
fn test_parse_unknown_op_type() {
    let mut writer = ProtoWriter::new();
    writer.write_string_field(1, "X");
    writer.write_string_field(2, "Y");
    writer.write_string_field(3, "softmax");
    writer.write_string_field(4, "Softmax");
    assert_err!(
        parse_node(&writer.into_bytes()),
        GraphError::Unsupported(msg) if msg.contains("Softmax")
    );
}

/// Conv 节点缺少必需属性报 MissingAttribute
#[test]
fn test_parse_conv_missing_attrs() {
    let mut writer = ProtoWriter::new();
    writer.write_string_field(1, "X1");
    writer.write_string_field(2, "Y1");
    writer.write_string_field(3, "conv");
    writer.write_string_field(4, "Conv");
    assert_err!(
        parse_node(&writer.into_bytes()),
        GraphError::MissingAttribute { node, .. } if node == "conv"
    );
}
