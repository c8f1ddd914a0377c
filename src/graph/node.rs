/*
 * @Author       : 老董
 * @Date         : 2026-05-12
 * @Description  : 算子节点（按名称引用输入/输出张量）
 */

use super::ops::{OpKind, TraitOp};

/// 图中的一个算子节点
///
/// 输入/输出都是张量名；名称能否解析由图校验负责。
#[derive(Debug, Clone, PartialEq)]
pub struct OpNode {
    name: String,
    op: OpKind,
    inputs: Vec<String>,
    outputs: Vec<String>,
}

impl OpNode {
    pub fn new(name: &str, op: impl Into<OpKind>, inputs: &[&str], outputs: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            op: op.into(),
            inputs: inputs.iter().map(|s| (*s).to_string()).collect(),
            outputs: outputs.iter().map(|s| (*s).to_string()).collect(),
        }
    }

    /// 加载路径使用的构造（输入/输出已是 String）
    pub fn from_parts(name: String, op: OpKind, inputs: Vec<String>, outputs: Vec<String>) -> Self {
        Self {
            name,
            op,
            inputs,
            outputs,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub const fn op(&self) -> &OpKind {
        &self.op
    }

    pub fn op_type(&self) -> &'static str {
        self.op.op_type()
    }

    pub fn inputs(&self) -> &[String] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[String] {
        &self.outputs
    }
}
