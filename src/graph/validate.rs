/*
 * @Author       : 老董
 * @Date         : 2026-05-13
 * @Description  : 图/模型的结构与语义校验
 *
 * 单趟校验，按节点声明顺序推进：
 * 1. 张量名在 {图输入, 初始化器, 节点输出} 间全局唯一
 * 2. 节点输入只能引用图输入、初始化器或更早节点的输出（无前向引用，自然无环）
 * 3. 初始化器数据长度 == 形状各维之积
 * 4. 每算子形状推断成功，且与 value_info/图输出的标注精确一致
 * 5. 图输出必须由恰好一个节点生产
 */

use super::core::{Graph, Model};
use super::error::GraphError;
use super::ops::TraitOp;
use std::collections::{HashMap, HashSet};

impl Graph {
    pub fn validate(&self) -> Result<(), GraphError> {
        // 生产者映射：同一张量被多个节点生产（歧义绑定）在此先报错
        let connections = self.build_connections()?;

        // 标注形状：中间张量 value_info + 图输出声明
        let mut annotations: HashMap<&str, &[usize]> = HashMap::new();
        for meta in self.value_infos() {
            annotations.insert(meta.name(), meta.dims());
        }
        for meta in self.outputs() {
            annotations.insert(meta.name(), meta.dims());
        }

        // 1. 图输入与初始化器构成初始可用集（重名即报错）
        let mut available: HashMap<String, Vec<usize>> = HashMap::new();
        for meta in self.inputs() {
            check_dims_positive(meta.name(), meta.dims())?;
            if available
                .insert(meta.name().to_string(), meta.dims().to_vec())
                .is_some()
            {
                return Err(GraphError::DuplicateTensorName(meta.name().to_string()));
            }
        }
        for tensor in self.initializers() {
            check_dims_positive(tensor.name(), tensor.dims())?;
            // 初始化器数据长度必须与形状一致
            let expected = tensor.element_count();
            if tensor.data().len() != expected {
                return Err(GraphError::DataLengthMismatch {
                    tensor: tensor.name().to_string(),
                    expected,
                    got: tensor.data().len(),
                });
            }
            if available
                .insert(tensor.name().to_string(), tensor.dims().to_vec())
                .is_some()
            {
                return Err(GraphError::DuplicateTensorName(tensor.name().to_string()));
            }
        }

        // 2. 按声明顺序逐节点校验
        let mut node_names = HashSet::new();
        for node in self.nodes() {
            if !node_names.insert(node.name()) {
                return Err(GraphError::DuplicateNodeName(node.name().to_string()));
            }

            // 2.1 输入个数符合算子的元数约定
            let (min_arity, max_arity) = node.op().input_arity();
            if node.inputs().len() < min_arity || node.inputs().len() > max_arity {
                return Err(GraphError::InvalidOperation(format!(
                    "{}节点{}需要{min_arity}~{max_arity}个输入，实际{}个",
                    node.op_type(),
                    node.name(),
                    node.inputs().len()
                )));
            }
            if node.outputs().len() != 1 {
                return Err(GraphError::InvalidOperation(format!(
                    "{}节点{}必须恰有 1 个输出，实际{}个",
                    node.op_type(),
                    node.name(),
                    node.outputs().len()
                )));
            }

            // 2.2 输入名逐个解析（悬空或前向引用都在此暴露）
            let mut input_shapes: Vec<&[usize]> = Vec::with_capacity(node.inputs().len());
            for input in node.inputs() {
                match available.get(input.as_str()) {
                    Some(dims) => input_shapes.push(dims),
                    None => {
                        return Err(GraphError::DanglingInput {
                            node: node.name().to_string(),
                            tensor: input.clone(),
                        });
                    }
                }
            }

            // 2.3 形状推断 + 与标注精确比对
            let inferred = node.op().infer_output_shape(node.name(), &input_shapes)?;
            let output = &node.outputs()[0];
            if let Some(&annotated) = annotations.get(output.as_str()) {
                if annotated != inferred.as_slice() {
                    return Err(GraphError::ShapeMismatch {
                        expected: annotated.to_vec(),
                        got: inferred,
                        message: format!(
                            "节点{}的输出{output}与声明的形状不一致",
                            node.name()
                        ),
                    });
                }
            }

            // 2.4 输出进入可用集（与任何已有声明重名即报错）
            if available.insert(output.clone(), inferred).is_some() {
                return Err(GraphError::DuplicateTensorName(output.clone()));
            }
        }

        // 3. 图输出必须由节点生产（生产者映射中有且仅有一条记录）
        for meta in self.outputs() {
            if !connections.producer.contains_key(meta.name()) {
                return Err(GraphError::OutputNotProduced(meta.name().to_string()));
            }
        }

        Ok(())
    }
}

impl Model {
    /// 校验整个模型文档（当前即图校验；文档级元数据无额外约束）
    pub fn validate(&self) -> Result<(), GraphError> {
        self.graph().validate()
    }
}

fn check_dims_positive(name: &str, dims: &[usize]) -> Result<(), GraphError> {
    if dims.iter().any(|&d| d == 0) {
        return Err(GraphError::InvalidOperation(format!(
            "张量{name}的形状{dims:?}含零维（形状必须全为正整数）"
        )));
    }
    Ok(())
}
