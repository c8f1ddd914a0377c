/*
 * @Author       : 老董
 * @Date         : 2026-05-11
 * @Description  : 张量元信息与常量张量
 */

use ndarray::{ArrayD, IxDyn};
use serde::{Deserialize, Serialize};

/// 张量元素类型
///
/// 构建器只生产 `Float32`；`Int32`/`Int64` 保留给加载路径
/// （ONNX 文件中合法出现，但本库不支持其初始化器数据）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataType {
    Float32,
    Int32,
    Int64,
}

impl DataType {
    /// ONNX `TensorProto.DataType` 枚举值
    pub const fn onnx_code(self) -> i64 {
        match self {
            Self::Float32 => 1,
            Self::Int32 => 6,
            Self::Int64 => 7,
        }
    }

    /// 从 ONNX 枚举值解析（未知值返回 None）
    pub const fn from_onnx_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(Self::Float32),
            6 => Some(Self::Int32),
            7 => Some(Self::Int64),
            _ => None,
        }
    }
}

/// 张量元信息（名称 + 元素类型 + 固定形状）
///
/// 用于图输入/输出声明和中间张量的形状标注。创建后不可变。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TensorMeta {
    name: String,
    data_type: DataType,
    dims: Vec<usize>,
}

impl TensorMeta {
    pub fn new(name: &str, data_type: DataType, dims: &[usize]) -> Self {
        Self {
            name: name.to_string(),
            data_type,
            dims: dims.to_vec(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub const fn data_type(&self) -> DataType {
        self.data_type
    }

    pub fn dims(&self) -> &[usize] {
        &self.dims
    }
}

/// 内嵌在模型中的常量张量（权重/偏置/逐元素常量）
///
/// 数据为按行展平的序列，长度必须等于形状各维之积（由图校验兜底检查）。
#[derive(Debug, Clone, PartialEq)]
pub struct ConstTensor {
    name: String,
    data_type: DataType,
    dims: Vec<usize>,
    data: Vec<f32>,
}

impl ConstTensor {
    /// 从现成的展平数据创建（加载路径使用，长度不在此处检查）
    pub fn from_parts(name: &str, data_type: DataType, dims: Vec<usize>, data: Vec<f32>) -> Self {
        Self {
            name: name.to_string(),
            data_type,
            dims,
            data,
        }
    }

    /// 以固定标量填充创建
    pub fn full(name: &str, dims: &[usize], value: f32) -> Self {
        let data = ArrayD::from_elem(IxDyn(dims), value).into_raw_vec();
        Self {
            name: name.to_string(),
            data_type: DataType::Float32,
            dims: dims.to_vec(),
            data,
        }
    }

    /// 全 1 填充
    pub fn ones(name: &str, dims: &[usize]) -> Self {
        Self::full(name, dims, 1.0)
    }

    /// 全 0 填充
    pub fn zeros(name: &str, dims: &[usize]) -> Self {
        Self::full(name, dims, 0.0)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub const fn data_type(&self) -> DataType {
        self.data_type
    }

    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// 形状各维之积（数据应有的元素个数）
    pub fn element_count(&self) -> usize {
        self.dims.iter().product()
    }
}
