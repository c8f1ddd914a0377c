/*
 * @Author       : 老董
 * @Date         : 2026-05-17
 * @Description  : 固定测试模型的构建器
 *
 * 构建一个包含两条独立支路的小模型（用作下游工具的测试夹具）：
 * - 卷积支路：X1 → Conv → Relu → Add(C1) → Mul(C2) → Out1
 * - 矩阵支路：X2 → MatMul(W_matmul) → Gemm(W_gemm, B_gemm) → Out2
 *
 * 流程严格为"构建 → 校验 → 写出"，校验失败时不写任何文件。
 */

use crate::graph::{
    Add, ConstTensor, Conv, DataType, Gemm, Graph, GraphError, MatMul, Model, Mul, OpNode, Relu,
    TensorMeta,
};
use std::path::Path;

/// 默认输出路径
pub const DEFAULT_OUTPUT_PATH: &str = "models/test.onnx";

/// 构建固定的双支路测试模型（图名 `six_ops_fixed`，opset 16）
pub fn build_fixture() -> Model {
    let mut graph = Graph::with_name("six_ops_fixed");
    let float = DataType::Float32;

    // ========== 卷积支路 ==========

    // 1. 形状声明
    graph.add_input(TensorMeta::new("X1", float, &[1, 3, 32, 32]));
    graph.add_output(TensorMeta::new("Out1", float, &[1, 16, 32, 32]));
    graph.add_value_info(TensorMeta::new("Y1", float, &[1, 16, 32, 32]));
    graph.add_value_info(TensorMeta::new("Z1", float, &[1, 16, 32, 32]));
    graph.add_value_info(TensorMeta::new("A1", float, &[1, 16, 32, 32]));

    // 2. 常量物化（确定性填充，无随机性）
    graph.add_initializer(ConstTensor::full("C1", &[1, 16, 32, 32], 2.0));
    graph.add_initializer(ConstTensor::full("C2", &[1, 16, 32, 32], 0.5));
    graph.add_initializer(ConstTensor::ones("W_conv", &[16, 3, 3, 3]));
    graph.add_initializer(ConstTensor::zeros("B_conv", &[16]));

    // 3. 节点声明（顺序即依赖顺序）
    graph.add_node(OpNode::new(
        "conv",
        Conv {
            kernel_shape: (3, 3),
            pads: [1, 1, 1, 1], // same-padding：stride 1 时空间维度保持不变
            strides: (1, 1),
        },
        &["X1", "W_conv", "B_conv"],
        &["Y1"],
    ));
    graph.add_node(OpNode::new("relu", Relu, &["Y1"], &["Z1"]));
    graph.add_node(OpNode::new("add", Add, &["Z1", "C1"], &["A1"]));
    graph.add_node(OpNode::new("mul", Mul, &["A1", "C2"], &["Out1"]));

    // ========== 矩阵支路 ==========

    graph.add_input(TensorMeta::new("X2", float, &[1, 256]));
    graph.add_output(TensorMeta::new("Out2", float, &[1, 64]));
    graph.add_value_info(TensorMeta::new("Y2", float, &[1, 128]));

    graph.add_initializer(ConstTensor::full("W_matmul", &[256, 128], 0.1));
    graph.add_initializer(ConstTensor::full("W_gemm", &[128, 64], 0.2));
    graph.add_initializer(ConstTensor::full("B_gemm", &[64], 0.05));

    graph.add_node(OpNode::new(
        "matmul",
        MatMul,
        &["X2", "W_matmul"],
        &["Y2"],
    ));
    graph.add_node(OpNode::new(
        "gemm",
        Gemm {
            alpha: 1.0,
            beta: 1.0,
            trans_b: false,
        },
        &["Y2", "W_gemm", "B_gemm"],
        &["Out2"],
    ));

    Model::new(graph, "test", 16)
}

/// 构建 → 校验 → 写出
///
/// 校验失败或路径不可写时返回错误；成功时返回已写出的模型。
pub fn build_and_save<P: AsRef<Path>>(path: P) -> Result<Model, GraphError> {
    let model = build_fixture();
    model.validate()?;
    model.save(path)?;
    Ok(model)
}
