/*
 * @Author       : 老董
 * @Date         : 2026-05-13
 * @Description  : 图描述符（Graph Descriptor）
 *                 可序列化的摘要表示，用于 JSON 导出、可视化和调试输出
 */

use super::core::{Graph, Model};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 图的可序列化描述
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphDescriptor {
    /// 格式版本（用于向后兼容）
    pub version: String,
    /// 图名称
    pub name: String,
    /// 生产者标识
    #[serde(skip_serializing_if = "Option::is_none")]
    pub producer: Option<String>,
    /// 算子集版本
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opset_version: Option<i64>,
    /// 图输入
    pub inputs: Vec<ValueDescriptor>,
    /// 图输出
    pub outputs: Vec<ValueDescriptor>,
    /// 常量张量（只记录名称与形状，不含数据）
    pub initializers: Vec<ValueDescriptor>,
    /// 所有节点描述（按声明顺序）
    pub nodes: Vec<NodeDescriptor>,
}

/// 命名张量描述（名称 + 形状）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValueDescriptor {
    pub name: String,
    pub dims: Vec<usize>,
}

/// 节点描述
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeDescriptor {
    /// 节点名称
    pub name: String,
    /// 算子类型（ONNX op_type 字符串）
    pub op_type: String,
    /// 输入张量名
    pub inputs: Vec<String>,
    /// 输出张量名
    pub outputs: Vec<String>,
    /// 输出形状（有 value_info/图输出标注时记录）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_shape: Option<Vec<usize>>,
}

impl GraphDescriptor {
    /// 常量参数总量（所有初始化器元素个数之和）
    pub fn total_params(&self) -> usize {
        self.initializers
            .iter()
            .map(|t| t.dims.iter().product::<usize>())
            .sum()
    }

    /// 转换为 JSON 字符串
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// 从 JSON 字符串解析
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl Graph {
    /// 生成当前图的描述符
    pub fn describe(&self) -> GraphDescriptor {
        // 标注形状查找表：value_info + 图输出
        let mut annotations: HashMap<&str, &[usize]> = HashMap::new();
        for meta in self.value_infos() {
            annotations.insert(meta.name(), meta.dims());
        }
        for meta in self.outputs() {
            annotations.insert(meta.name(), meta.dims());
        }

        let value_of = |name: &str, dims: &[usize]| ValueDescriptor {
            name: name.to_string(),
            dims: dims.to_vec(),
        };

        GraphDescriptor {
            version: env!("CARGO_PKG_VERSION").to_string(),
            name: self.name().to_string(),
            producer: None,
            opset_version: None,
            inputs: self
                .inputs()
                .iter()
                .map(|m| value_of(m.name(), m.dims()))
                .collect(),
            outputs: self
                .outputs()
                .iter()
                .map(|m| value_of(m.name(), m.dims()))
                .collect(),
            initializers: self
                .initializers()
                .iter()
                .map(|t| value_of(t.name(), t.dims()))
                .collect(),
            nodes: self
                .nodes()
                .iter()
                .map(|node| NodeDescriptor {
                    name: node.name().to_string(),
                    op_type: node.op_type().to_string(),
                    inputs: node.inputs().to_vec(),
                    outputs: node.outputs().to_vec(),
                    output_shape: node
                        .outputs()
                        .first()
                        .and_then(|out| annotations.get(out.as_str()))
                        .map(|dims| dims.to_vec()),
                })
                .collect(),
        }
    }
}

impl Model {
    /// 生成模型描述符（附带文档级元数据）
    pub fn describe(&self) -> GraphDescriptor {
        let mut descriptor = self.graph().describe();
        descriptor.producer = Some(self.producer_name().to_string());
        descriptor.opset_version = Some(self.opset_version());
        descriptor
    }
}
