/*
 * @Author       : 老董
 * @Date         : 2026-05-17
 * @Description  : 命令行入口：构建固定测试模型并写盘
 *
 * 用法：only_onnx [输出路径]
 * 不带参数时写到 models/test.onnx（目录需已存在）。
 */

use only_onnx::builder::{self, DEFAULT_OUTPUT_PATH};

fn main() {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_OUTPUT_PATH.to_string());

    match builder::build_and_save(&path) {
        Ok(model) => {
            let desc = model.describe();
            println!(
                "模型已写入 {path}（{} 个节点，{} 个常量参数）",
                desc.nodes.len(),
                desc.total_params()
            );
        }
        Err(e) => {
            eprintln!("模型构建失败：{e}");
            std::process::exit(1);
        }
    }
}
