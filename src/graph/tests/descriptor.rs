/*
 * @Author       : 老董
 * @Description  : 图描述符与 JSON 导出测试
 */

use crate::builder::build_fixture;
use crate::graph::GraphDescriptor;

/// 夹具模型的描述符内容
#[test]
fn test_describe_fixture() {
    let model = build_fixture();
    let desc = model.describe();

    assert_eq!(desc.name, "six_ops_fixed");
    assert_eq!(desc.producer.as_deref(), Some("test"));
    assert_eq!(desc.opset_version, Some(16));
    assert_eq!(desc.inputs.len(), 2);
    assert_eq!(desc.outputs.len(), 2);
    assert_eq!(desc.initializers.len(), 7);
    assert_eq!(desc.nodes.len(), 6);

    // 节点按声明顺序记录
    let op_types: Vec<&str> = desc.nodes.iter().map(|n| n.op_type.as_str()).collect();
    assert_eq!(op_types, ["Conv", "Relu", "Add", "Mul", "MatMul", "Gemm"]);

    // 输出形状来自 value_info / 图输出标注
    assert_eq!(desc.nodes[0].output_shape.as_deref(), Some(&[1, 16, 32, 32][..]));
    assert_eq!(desc.nodes[5].output_shape.as_deref(), Some(&[1, 64][..]));
}

/// 常量参数总量 = 所有初始化器元素个数之和
#[test]
fn test_total_params() {
    let desc = build_fixture().describe();
    // C1 + C2 + W_conv + B_conv + W_matmul + W_gemm + B_gemm
    let expected = 16384 + 16384 + 432 + 16 + 32768 + 8192 + 64;
    assert_eq!(desc.total_params(), expected);
}

/// JSON 导出后解析回来内容一致
#[test]
fn test_json_roundtrip() {
    let desc = build_fixture().describe();
    let json = desc.to_json().unwrap();
    assert!(json.contains("six_ops_fixed"));

    let parsed = GraphDescriptor::from_json(&json).unwrap();
    assert_eq!(parsed.name, desc.name);
    assert_eq!(parsed.nodes.len(), desc.nodes.len());
    assert_eq!(parsed.total_params(), desc.total_params());
    assert_eq!(parsed.nodes[2].name, "add");
    assert_eq!(parsed.nodes[2].inputs, ["Z1", "C1"]);
}
