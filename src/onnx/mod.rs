/*
 * @Author       : 老董
 * @Date         : 2026-05-15
 * @Description  : ONNX 模型文件 I/O（save/load）
 *
 * 与 writer.rs / reader.rs 的区别：
 * - writer.rs / reader.rs：底层 wire 编码/解析（字段级读写）
 * - mod.rs：高层模型 I/O（整文件的读出/写入 + 错误归并）
 */

mod reader;
mod writer;

pub use reader::parse_model;
pub use writer::encode_model;

use crate::graph::{GraphError, Model};
use std::path::Path;

impl Model {
    /// 将模型序列化为 ONNX 二进制并写入 `path`
    ///
    /// 文档在内存中完整编码后一次写出；路径不可写时报 `Io`，
    /// 此时不会留下部分写入的文件。
    ///
    /// 注意：`save` 本身不做校验，调用方应遵循"构建 → validate → save"
    /// 的流程（[`crate::builder::build_and_save`] 即如此）。
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), GraphError> {
        let bytes = encode_model(self);
        std::fs::write(path.as_ref(), bytes)?;
        Ok(())
    }

    /// 从 ONNX 文件读回模型
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, GraphError> {
        let bytes = std::fs::read(path.as_ref())?;
        parse_model(&bytes)
    }
}

#[cfg(test)]
mod tests;
