/*
 * @Author       : 老董
 * @Date         : 2026-05-12
 * @Description  : 算子词汇表 + 每算子的形状推断规则
 *
 * 设计决策：
 * - 算子集合是封闭的 tagged enum，每个变体只携带该算子必需的属性字段，
 *   不存在"算子不认识的属性"这种状态
 * - 形状推断采用精确匹配：Add/Mul 不做广播（本库构建的模型两操作数恒同形）
 * - Gemm 的偏置 C 接受 [n] 或 [m, n]
 */

use super::error::GraphError;
use enum_dispatch::enum_dispatch;

/// ONNX 属性值（写入/读取 AttributeProto 时的中间表示）
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Float(f32),
    Int(i64),
    Floats(Vec<f32>),
    Ints(Vec<i64>),
    String(String),
}

#[enum_dispatch]
#[derive(Debug, Clone, PartialEq)]
pub enum OpKind {
    Conv(Conv),
    Relu(Relu),
    Add(Add),
    Mul(Mul),
    MatMul(MatMul),
    Gemm(Gemm),
}

/// 算子行为接口（经 enum_dispatch 静态分发）
#[enum_dispatch(OpKind)]
pub trait TraitOp {
    /// ONNX 的 op_type 字符串
    fn op_type(&self) -> &'static str;

    /// 合法输入个数范围 [min, max]
    fn input_arity(&self) -> (usize, usize);

    /// 形状推断：由输入形状推出（唯一的）输出形状
    ///
    /// `node_name` 仅用于错误信息定位
    fn infer_output_shape(
        &self,
        node_name: &str,
        inputs: &[&[usize]],
    ) -> Result<Vec<usize>, GraphError>;

    /// 写入 ONNX 时要生成的属性列表（默认无属性）
    fn attributes(&self) -> Vec<(&'static str, AttrValue)> {
        Vec::new()
    }
}

impl OpKind {
    /// 从 op_type 字符串和属性列表重建算子（加载路径）
    ///
    /// - 未知 op_type => `Unsupported`
    /// - 缺少必需属性 => `MissingAttribute`
    pub fn from_attrs(
        op_type: &str,
        node_name: &str,
        attrs: &[(String, AttrValue)],
    ) -> Result<Self, GraphError> {
        match op_type {
            "Conv" => Ok(Conv::from_attrs(node_name, attrs)?.into()),
            "Relu" => Ok(Relu.into()),
            "Add" => Ok(Add.into()),
            "Mul" => Ok(Mul.into()),
            "MatMul" => Ok(MatMul.into()),
            "Gemm" => Ok(Gemm::from_attrs(node_name, attrs)?.into()),
            other => Err(GraphError::Unsupported(format!(
                "节点{node_name}的算子类型{other}不在支持的算子词汇表内"
            ))),
        }
    }
}

// ========== 属性查找辅助 ==========

fn require_attr<'a>(
    node_name: &str,
    attrs: &'a [(String, AttrValue)],
    key: &str,
) -> Result<&'a AttrValue, GraphError> {
    attrs
        .iter()
        .find(|(name, _)| name == key)
        .map(|(_, value)| value)
        .ok_or_else(|| GraphError::MissingAttribute {
            node: node_name.to_string(),
            attribute: key.to_string(),
        })
}

fn require_ints(
    node_name: &str,
    attrs: &[(String, AttrValue)],
    key: &str,
    expected_len: usize,
) -> Result<Vec<usize>, GraphError> {
    match require_attr(node_name, attrs, key)? {
        AttrValue::Ints(values) if values.len() == expected_len => values
            .iter()
            .map(|&v| {
                usize::try_from(v).map_err(|_| {
                    GraphError::InvalidOperation(format!(
                        "节点{node_name}的属性{key}含负值{v}"
                    ))
                })
            })
            .collect(),
        other => Err(GraphError::InvalidOperation(format!(
            "节点{node_name}的属性{key}应为{expected_len}个整数，实际为{other:?}"
        ))),
    }
}

fn require_float(
    node_name: &str,
    attrs: &[(String, AttrValue)],
    key: &str,
) -> Result<f32, GraphError> {
    match require_attr(node_name, attrs, key)? {
        AttrValue::Float(v) => Ok(*v),
        other => Err(GraphError::InvalidOperation(format!(
            "节点{node_name}的属性{key}应为浮点数，实际为{other:?}"
        ))),
    }
}

fn require_int(
    node_name: &str,
    attrs: &[(String, AttrValue)],
    key: &str,
) -> Result<i64, GraphError> {
    match require_attr(node_name, attrs, key)? {
        AttrValue::Int(v) => Ok(*v),
        other => Err(GraphError::InvalidOperation(format!(
            "节点{node_name}的属性{key}应为整数，实际为{other:?}"
        ))),
    }
}

// ========== Conv ==========

/// 2D 卷积
///
/// 输入：[输入, 卷积核] 或 [输入, 卷积核, 偏置]
/// - 输入: [N, C_in, H, W]
/// - 卷积核: [C_out, C_in, kH, kW]
/// - 偏置: [C_out]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conv {
    /// (kH, kW)，必须与卷积核张量的后两维一致
    pub kernel_shape: (usize, usize),
    /// ONNX 顺序 [上, 左, 下, 右]
    pub pads: [usize; 4],
    /// (sH, sW)
    pub strides: (usize, usize),
}

impl Conv {
    fn from_attrs(node_name: &str, attrs: &[(String, AttrValue)]) -> Result<Self, GraphError> {
        let kernel = require_ints(node_name, attrs, "kernel_shape", 2)?;
        let pads = require_ints(node_name, attrs, "pads", 4)?;
        let strides = require_ints(node_name, attrs, "strides", 2)?;
        Ok(Self {
            kernel_shape: (kernel[0], kernel[1]),
            pads: [pads[0], pads[1], pads[2], pads[3]],
            strides: (strides[0], strides[1]),
        })
    }
}

impl TraitOp for Conv {
    fn op_type(&self) -> &'static str {
        "Conv"
    }

    fn input_arity(&self) -> (usize, usize) {
        (2, 3)
    }

    fn infer_output_shape(
        &self,
        node_name: &str,
        inputs: &[&[usize]],
    ) -> Result<Vec<usize>, GraphError> {
        let input = inputs[0];
        let weight = inputs[1];

        // 1. 输入/卷积核必须是 4D
        if input.len() != 4 {
            return Err(GraphError::ShapeMismatch {
                expected: vec![0, 0, 0, 0],
                got: input.to_vec(),
                message: format!("节点{node_name}的输入必须是 4D [N, C_in, H, W]"),
            });
        }
        if weight.len() != 4 {
            return Err(GraphError::ShapeMismatch {
                expected: vec![0, 0, 0, 0],
                got: weight.to_vec(),
                message: format!("节点{node_name}的卷积核必须是 4D [C_out, C_in, kH, kW]"),
            });
        }

        let (batch, c_in, h, w) = (input[0], input[1], input[2], input[3]);
        let (c_out, weight_c_in, kh, kw) = (weight[0], weight[1], weight[2], weight[3]);

        // 2. 通道数与 kernel_shape 属性必须与卷积核张量一致
        if weight_c_in != c_in {
            return Err(GraphError::ShapeMismatch {
                expected: vec![c_out, c_in, kh, kw],
                got: weight.to_vec(),
                message: format!(
                    "节点{node_name}的卷积核输入通道数{weight_c_in}与输入通道数{c_in}不一致"
                ),
            });
        }
        if (kh, kw) != self.kernel_shape {
            return Err(GraphError::ShapeMismatch {
                expected: vec![self.kernel_shape.0, self.kernel_shape.1],
                got: vec![kh, kw],
                message: format!("节点{node_name}的 kernel_shape 属性与卷积核张量不一致"),
            });
        }

        // 3. 偏置（若有）必须是 [C_out]
        if let Some(bias) = inputs.get(2) {
            if *bias != [c_out] {
                return Err(GraphError::ShapeMismatch {
                    expected: vec![c_out],
                    got: bias.to_vec(),
                    message: format!("节点{node_name}的偏置必须是 [C_out]"),
                });
            }
        }

        // 4. 空间维度：H' = (H + pad上 + pad下 - kH) / sH + 1
        let [pad_top, pad_left, pad_bottom, pad_right] = self.pads;
        let (sh, sw) = self.strides;
        if h + pad_top + pad_bottom < kh || w + pad_left + pad_right < kw {
            return Err(GraphError::ShapeMismatch {
                expected: vec![kh, kw],
                got: vec![h, w],
                message: format!("节点{node_name}的卷积核大于填充后的输入"),
            });
        }
        let h_out = (h + pad_top + pad_bottom - kh) / sh + 1;
        let w_out = (w + pad_left + pad_right - kw) / sw + 1;

        Ok(vec![batch, c_out, h_out, w_out])
    }

    fn attributes(&self) -> Vec<(&'static str, AttrValue)> {
        vec![
            (
                "kernel_shape",
                AttrValue::Ints(vec![self.kernel_shape.0 as i64, self.kernel_shape.1 as i64]),
            ),
            (
                "pads",
                AttrValue::Ints(self.pads.iter().map(|&p| p as i64).collect()),
            ),
            (
                "strides",
                AttrValue::Ints(vec![self.strides.0 as i64, self.strides.1 as i64]),
            ),
        ]
    }
}

// ========== Relu ==========

/// 逐元素 ReLU（形状保持）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Relu;

impl TraitOp for Relu {
    fn op_type(&self) -> &'static str {
        "Relu"
    }

    fn input_arity(&self) -> (usize, usize) {
        (1, 1)
    }

    fn infer_output_shape(
        &self,
        _node_name: &str,
        inputs: &[&[usize]],
    ) -> Result<Vec<usize>, GraphError> {
        Ok(inputs[0].to_vec())
    }
}

// ========== Add / Mul ==========

/// 逐元素加法（两操作数形状必须完全相同，不做广播）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Add;

/// 逐元素乘法（两操作数形状必须完全相同，不做广播）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mul;

fn infer_elementwise(
    op_type: &str,
    node_name: &str,
    inputs: &[&[usize]],
) -> Result<Vec<usize>, GraphError> {
    let (lhs, rhs) = (inputs[0], inputs[1]);
    if lhs != rhs {
        return Err(GraphError::ShapeMismatch {
            expected: lhs.to_vec(),
            got: rhs.to_vec(),
            message: format!("{op_type}节点{node_name}的两个操作数形状必须完全相同"),
        });
    }
    Ok(lhs.to_vec())
}

impl TraitOp for Add {
    fn op_type(&self) -> &'static str {
        "Add"
    }

    fn input_arity(&self) -> (usize, usize) {
        (2, 2)
    }

    fn infer_output_shape(
        &self,
        node_name: &str,
        inputs: &[&[usize]],
    ) -> Result<Vec<usize>, GraphError> {
        infer_elementwise("Add", node_name, inputs)
    }
}

impl TraitOp for Mul {
    fn op_type(&self) -> &'static str {
        "Mul"
    }

    fn input_arity(&self) -> (usize, usize) {
        (2, 2)
    }

    fn infer_output_shape(
        &self,
        node_name: &str,
        inputs: &[&[usize]],
    ) -> Result<Vec<usize>, GraphError> {
        infer_elementwise("Mul", node_name, inputs)
    }
}

// ========== MatMul ==========

/// 矩阵乘法 [m, k] × [k, n] → [m, n]（仅支持 2D）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatMul;

impl TraitOp for MatMul {
    fn op_type(&self) -> &'static str {
        "MatMul"
    }

    fn input_arity(&self) -> (usize, usize) {
        (2, 2)
    }

    fn infer_output_shape(
        &self,
        node_name: &str,
        inputs: &[&[usize]],
    ) -> Result<Vec<usize>, GraphError> {
        let (lhs, rhs) = (inputs[0], inputs[1]);
        if lhs.len() != 2 || rhs.len() != 2 {
            return Err(GraphError::ShapeMismatch {
                expected: vec![0, 0],
                got: if lhs.len() == 2 { rhs.to_vec() } else { lhs.to_vec() },
                message: format!("MatMul节点{node_name}的两个操作数都必须是 2D 矩阵"),
            });
        }
        if lhs[1] != rhs[0] {
            return Err(GraphError::ShapeMismatch {
                expected: vec![lhs[1], rhs[1]],
                got: rhs.to_vec(),
                message: format!(
                    "MatMul节点{node_name}的内维不一致：{} != {}",
                    lhs[1], rhs[0]
                ),
            });
        }
        Ok(vec![lhs[0], rhs[1]])
    }
}

// ========== Gemm ==========

/// 仿射变换 Y = alpha·A·B + beta·C
///
/// - A: [m, k]
/// - B: [k, n]（trans_b 时为 [n, k]）
/// - C: [n] 或 [m, n]
#[derive(Debug, Clone, PartialEq)]
pub struct Gemm {
    pub alpha: f32,
    pub beta: f32,
    pub trans_b: bool,
}

impl Gemm {
    fn from_attrs(node_name: &str, attrs: &[(String, AttrValue)]) -> Result<Self, GraphError> {
        Ok(Self {
            alpha: require_float(node_name, attrs, "alpha")?,
            beta: require_float(node_name, attrs, "beta")?,
            trans_b: require_int(node_name, attrs, "transB")? != 0,
        })
    }
}

impl TraitOp for Gemm {
    fn op_type(&self) -> &'static str {
        "Gemm"
    }

    fn input_arity(&self) -> (usize, usize) {
        (2, 3)
    }

    fn infer_output_shape(
        &self,
        node_name: &str,
        inputs: &[&[usize]],
    ) -> Result<Vec<usize>, GraphError> {
        let (a, b) = (inputs[0], inputs[1]);
        if a.len() != 2 || b.len() != 2 {
            return Err(GraphError::ShapeMismatch {
                expected: vec![0, 0],
                got: if a.len() == 2 { b.to_vec() } else { a.to_vec() },
                message: format!("Gemm节点{node_name}的 A、B 都必须是 2D 矩阵"),
            });
        }

        let (m, k) = (a[0], a[1]);
        let (b_k, n) = if self.trans_b { (b[1], b[0]) } else { (b[0], b[1]) };
        if k != b_k {
            return Err(GraphError::ShapeMismatch {
                expected: vec![k, n],
                got: b.to_vec(),
                message: format!("Gemm节点{node_name}的内维不一致：{k} != {b_k}"),
            });
        }

        // C 接受 [n] 或 [m, n]
        if let Some(c) = inputs.get(2) {
            if *c != [n] && *c != [m, n] {
                return Err(GraphError::ShapeMismatch {
                    expected: vec![n],
                    got: c.to_vec(),
                    message: format!("Gemm节点{node_name}的偏置 C 必须是 [n] 或 [m, n]"),
                });
            }
        }

        Ok(vec![m, n])
    }

    fn attributes(&self) -> Vec<(&'static str, AttrValue)> {
        vec![
            ("alpha", AttrValue::Float(self.alpha)),
            ("beta", AttrValue::Float(self.beta)),
            ("transB", AttrValue::Int(i64::from(self.trans_b))),
        ]
    }
}
