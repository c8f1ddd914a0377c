/*
 * @Author       : 老董
 * @Date         : 2026-05-11
 * @Description  : 计算图数据模型：类型、算子、节点、图/模型与校验
 */

mod core;
mod descriptor;
mod dot;
mod error;
mod node;
mod ops;
mod types;
mod validate;

pub use self::core::{Connections, DEFAULT_OPSET_VERSION, Graph, IR_VERSION, Model};
pub use descriptor::{GraphDescriptor, NodeDescriptor, ValueDescriptor};
pub use error::GraphError;
pub use node::OpNode;
pub use ops::{Add, AttrValue, Conv, Gemm, MatMul, Mul, OpKind, Relu, TraitOp};
pub use types::{ConstTensor, DataType, TensorMeta};

#[cfg(test)]
mod tests;
