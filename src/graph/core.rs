/*
 * @Author       : 老董
 * @Date         : 2026-05-12
 * @Description  : Graph/Model 核心结构 + 生产者/消费者连接
 *
 * 所有权严格成树：Model 独占 Graph，Graph 独占节点/常量/元信息；
 * 张量之间只通过名称引用形成 DAG，不存在环或反向引用。
 */

use super::error::GraphError;
use super::node::OpNode;
use super::types::{ConstTensor, TensorMeta};
use std::collections::HashMap;

/// 当前写出的 ONNX IR 版本（对应 opset 16 时代的 IR 8）
pub const IR_VERSION: i64 = 8;

/// 默认算子集版本
pub const DEFAULT_OPSET_VERSION: i64 = 16;

/// 计算图：有序节点列表 + 输入/输出声明 + 常量 + 中间形状标注
#[derive(Debug, Clone, PartialEq)]
pub struct Graph {
    name: String,
    nodes: Vec<OpNode>,
    inputs: Vec<TensorMeta>,
    outputs: Vec<TensorMeta>,
    initializers: Vec<ConstTensor>,
    value_infos: Vec<TensorMeta>,
}

impl Graph {
    pub fn with_name(name: &str) -> Self {
        Self {
            name: name.to_string(),
            nodes: Vec::new(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            initializers: Vec::new(),
            value_infos: Vec::new(),
        }
    }

    // ========== 构建 ==========
    //
    // add_* 只做追加，不做检查；所有一致性问题统一由 validate() 报告。
    // 节点的声明顺序必须符合依赖顺序（先声明生产者，后声明消费者）。

    pub fn add_input(&mut self, meta: TensorMeta) {
        self.inputs.push(meta);
    }

    pub fn add_output(&mut self, meta: TensorMeta) {
        self.outputs.push(meta);
    }

    pub fn add_initializer(&mut self, tensor: ConstTensor) {
        self.initializers.push(tensor);
    }

    /// 标注一个中间张量的形状（校验时与推断结果精确比对）
    pub fn add_value_info(&mut self, meta: TensorMeta) {
        self.value_infos.push(meta);
    }

    pub fn add_node(&mut self, node: OpNode) {
        self.nodes.push(node);
    }

    // ========== 访问器 ==========

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn nodes(&self) -> &[OpNode] {
        &self.nodes
    }

    pub fn nodes_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn inputs(&self) -> &[TensorMeta] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[TensorMeta] {
        &self.outputs
    }

    pub fn initializers(&self) -> &[ConstTensor] {
        &self.initializers
    }

    pub fn value_infos(&self) -> &[TensorMeta] {
        &self.value_infos
    }

    // ========== 连接关系 ==========

    /// 基于当前节点构建张量的生产者/消费者映射
    ///
    /// 同一张量被多个节点生产（歧义绑定）时返回错误。
    pub fn build_connections(&self) -> Result<Connections, GraphError> {
        let mut producer = HashMap::new();
        let mut consumers: HashMap<String, Vec<String>> = HashMap::new();

        for node in &self.nodes {
            for output in node.outputs() {
                if producer
                    .insert(output.clone(), node.name().to_string())
                    .is_some()
                {
                    return Err(GraphError::DuplicateTensorName(format!(
                        "张量{output}被多个节点生产"
                    )));
                }
            }
            for input in node.inputs() {
                consumers
                    .entry(input.clone())
                    .or_default()
                    .push(node.name().to_string());
            }
        }

        Ok(Connections {
            producer,
            consumers,
        })
    }
}

/// 张量名 → 生产/消费它的节点名
#[derive(Debug, Default)]
pub struct Connections {
    /// 每个张量至多一个生产者
    pub producer: HashMap<String, String>,
    /// 消费该张量的节点列表（按节点声明顺序）
    pub consumers: HashMap<String, Vec<String>>,
}

/// 模型文档：一个 Graph + 文档级元数据
///
/// 生命周期：构建一次、校验一次、序列化一次，之后即丢弃，不做任何变更。
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    ir_version: i64,
    opset_version: i64,
    producer_name: String,
    graph: Graph,
}

impl Model {
    pub fn new(graph: Graph, producer_name: &str, opset_version: i64) -> Self {
        Self {
            ir_version: IR_VERSION,
            opset_version,
            producer_name: producer_name.to_string(),
            graph,
        }
    }

    /// 加载路径使用的构造（保留文件中的 ir_version）
    pub fn from_parts(
        ir_version: i64,
        opset_version: i64,
        producer_name: String,
        graph: Graph,
    ) -> Self {
        Self {
            ir_version,
            opset_version,
            producer_name,
            graph,
        }
    }

    pub const fn ir_version(&self) -> i64 {
        self.ir_version
    }

    pub const fn opset_version(&self) -> i64 {
        self.opset_version
    }

    pub fn producer_name(&self) -> &str {
        &self.producer_name
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }
}
