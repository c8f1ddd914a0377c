/*
 * @Author       : 老董
 * @Description  : 端到端测试：构建 → 校验 → 写盘 → 读回
 */

use only_onnx::builder::{build_and_save, build_fixture};
use only_onnx::graph::{GraphError, Model};
use only_onnx::utils::macro_for_unit_test::get_file_size_in_byte;

/// 端到端场景：双支路模型构建、校验零错误、写出非空文件、读回等价
#[test]
fn test_build_save_load_end_to_end() {
    let dir = tempfile::tempdir().expect("创建临时目录失败");
    let path = dir.path().join("test.onnx");

    // 1. 构建 + 校验 + 写盘
    let model = build_and_save(&path).expect("构建/写盘失败");
    assert!(path.exists());
    assert!(get_file_size_in_byte(&path).expect("读取文件大小失败") > 0);

    // 2. 读回并与原模型比对
    let loaded = Model::load(&path).expect("读回失败");
    assert_eq!(loaded, model);

    // 3. 读回的模型再次校验仍通过
    loaded.validate().expect("读回的模型校验失败");

    // 4. 关键形状：卷积支路输出 [1,16,32,32]，矩阵支路输出 [1,64]
    let outputs = loaded.graph().outputs();
    assert_eq!(outputs[0].name(), "Out1");
    assert_eq!(outputs[0].dims(), &[1, 16, 32, 32]);
    assert_eq!(outputs[1].name(), "Out2");
    assert_eq!(outputs[1].dims(), &[1, 64]);
}

/// 目标路径的父目录不存在：报 IO 错误且不写任何文件
#[test]
fn test_save_to_missing_directory_fails() {
    let dir = tempfile::tempdir().expect("创建临时目录失败");
    let path = dir.path().join("no_such_dir").join("test.onnx");

    let result = build_and_save(&path);
    assert!(matches!(result, Err(GraphError::Io(_))));
    assert!(!path.exists());
}

/// 描述符与 DOT 导出在完整模型上可用
#[test]
fn test_describe_and_dot_on_fixture() {
    let model = build_fixture();

    let desc = model.describe();
    assert_eq!(desc.nodes.len(), 6);
    let json = desc.to_json().expect("JSON 导出失败");
    assert!(json.contains("six_ops_fixed"));

    let dot = model.graph().to_dot();
    assert!(dot.contains("digraph Model"));
    assert!(dot.contains("op_gemm"));
}
