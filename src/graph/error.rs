/*
 * @Author       : 老董
 * @Date         : 2026-05-11
 * @Description  : Graph 模块的错误类型
 *
 * 错误分为四族（与 ONNX 加载器的异常分类一致）：
 * - 校验错误：图结构/语义不一致（悬空引用、形状不匹配、重名……）
 * - 解析错误：wire 格式损坏
 * - 不支持错误：合法但本库不处理的 ONNX 特性
 * - IO 错误：目标路径不可读/写
 */

use thiserror::Error;

/// Graph 操作错误类型
#[derive(Error, Debug)]
pub enum GraphError {
    // ========== 校验错误 ==========
    #[error("张量名重复：{0}")]
    DuplicateTensorName(String),

    #[error("节点名重复：{0}")]
    DuplicateNodeName(String),

    #[error("节点{node}的输入{tensor}未在图输入、初始化器或先前节点的输出中声明")]
    DanglingInput { node: String, tensor: String },

    #[error("形状不匹配：预期{expected:?}，实际{got:?}（{message}）")]
    ShapeMismatch {
        expected: Vec<usize>,
        got: Vec<usize>,
        message: String,
    },

    #[error("初始化器{tensor}的数据长度不匹配：形状要求{expected}个元素，实际{got}个")]
    DataLengthMismatch {
        tensor: String,
        expected: usize,
        got: usize,
    },

    #[error("节点{node}缺少必需属性{attribute}")]
    MissingAttribute { node: String, attribute: String },

    #[error("图输出{0}没有被任何节点生产")]
    OutputNotProduced(String),

    #[error("无效操作：{0}")]
    InvalidOperation(String),

    // ========== 解析/支持性错误 ==========
    #[error("解析错误：{0}")]
    Parse(String),

    #[error("不支持：{0}")]
    Unsupported(String),

    // ========== IO 错误 ==========
    #[error("IO 错误：{0}")]
    Io(#[from] std::io::Error),
}
