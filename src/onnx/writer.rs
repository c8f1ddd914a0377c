/*
 * @Author       : 老董
 * @Date         : 2026-05-15
 * @Description  : ONNX protobuf wire 编码器（手写，不依赖 protobuf 库）
 *
 * 约定：
 * - 嵌套消息先编码到子缓冲，再以 length-delimited 写入父缓冲
 * - repeated int64/float 按 proto3 默认写成 packed
 * - 浮点数据写入 TensorProto.float_data（与生成本模型的参考脚本一致，
 *   不写 raw_data）
 */

use crate::graph::{AttrValue, ConstTensor, Graph, Model, OpNode, TensorMeta, TraitOp};

// ========== wire type 常量 ==========

pub(crate) const WIRE_VARINT: u32 = 0;
pub(crate) const WIRE_FIXED64: u32 = 1;
pub(crate) const WIRE_LEN: u32 = 2;
pub(crate) const WIRE_FIXED32: u32 = 5;

/// protobuf 字段写入器（追加式字节缓冲）
pub(crate) struct ProtoWriter {
    buf: Vec<u8>,
}

impl ProtoWriter {
    pub(crate) const fn new() -> Self {
        Self { buf: Vec::new() }
    }

    pub(crate) fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    pub(crate) fn write_varint(&mut self, mut value: u64) {
        loop {
            let byte = (value & 0x7f) as u8;
            value >>= 7;
            if value == 0 {
                self.buf.push(byte);
                return;
            }
            self.buf.push(byte | 0x80);
        }
    }

    pub(crate) fn write_key(&mut self, field_number: u32, wire_type: u32) {
        self.write_varint((u64::from(field_number) << 3) | u64::from(wire_type));
    }

    /// varint 字段（int64/enum/bool；负数场景本库不出现）
    pub(crate) fn write_varint_field(&mut self, field_number: u32, value: u64) {
        self.write_key(field_number, WIRE_VARINT);
        self.write_varint(value);
    }

    pub(crate) fn write_bytes_field(&mut self, field_number: u32, data: &[u8]) {
        self.write_key(field_number, WIRE_LEN);
        self.write_varint(data.len() as u64);
        self.buf.extend_from_slice(data);
    }

    pub(crate) fn write_string_field(&mut self, field_number: u32, value: &str) {
        self.write_bytes_field(field_number, value.as_bytes());
    }

    pub(crate) fn write_fixed32_field(&mut self, field_number: u32, value: u32) {
        self.write_key(field_number, WIRE_FIXED32);
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    /// packed repeated varint（如 TensorProto.dims、AttributeProto.ints）
    pub(crate) fn write_packed_varints(&mut self, field_number: u32, values: &[i64]) {
        if values.is_empty() {
            return;
        }
        let mut inner = Self::new();
        for &v in values {
            inner.write_varint(v as u64);
        }
        self.write_bytes_field(field_number, &inner.buf);
    }

    /// packed repeated float（如 TensorProto.float_data）
    pub(crate) fn write_packed_floats(&mut self, field_number: u32, values: &[f32]) {
        if values.is_empty() {
            return;
        }
        let mut inner = Vec::with_capacity(values.len() * 4);
        for &v in values {
            inner.extend_from_slice(&v.to_bits().to_le_bytes());
        }
        self.write_bytes_field(field_number, &inner);
    }
}

// ========== 各消息的编码 ==========
// 字段编号遵循 onnx.proto3

/// TensorProto: dims=1, data_type=2, float_data=4, name=8
pub(crate) fn encode_tensor(tensor: &ConstTensor) -> Vec<u8> {
    let mut w = ProtoWriter::new();
    let dims: Vec<i64> = tensor.dims().iter().map(|&d| d as i64).collect();
    w.write_packed_varints(1, &dims);
    w.write_varint_field(2, tensor.data_type().onnx_code() as u64);
    w.write_packed_floats(4, tensor.data());
    w.write_string_field(8, tensor.name());
    w.into_bytes()
}

/// ValueInfoProto: name=1, type=2
/// TypeProto.tensor_type=1 → Tensor{elem_type=1, shape=2}
/// TensorShapeProto.dim=1 → Dimension.dim_value=1
pub(crate) fn encode_value_info(meta: &TensorMeta) -> Vec<u8> {
    let mut shape = ProtoWriter::new();
    for &dim in meta.dims() {
        let mut d = ProtoWriter::new();
        d.write_varint_field(1, dim as u64);
        shape.write_bytes_field(1, &d.into_bytes());
    }

    let mut tensor_type = ProtoWriter::new();
    tensor_type.write_varint_field(1, meta.data_type().onnx_code() as u64);
    tensor_type.write_bytes_field(2, &shape.into_bytes());

    let mut type_proto = ProtoWriter::new();
    type_proto.write_bytes_field(1, &tensor_type.into_bytes());

    let mut w = ProtoWriter::new();
    w.write_string_field(1, meta.name());
    w.write_bytes_field(2, &type_proto.into_bytes());
    w.into_bytes()
}

/// AttributeProto: name=1, f=2, i=3, floats=7, ints=8, s=4, type=20
pub(crate) fn encode_attribute(name: &str, value: &AttrValue) -> Vec<u8> {
    let mut w = ProtoWriter::new();
    w.write_string_field(1, name);
    match value {
        AttrValue::Float(v) => {
            w.write_fixed32_field(2, v.to_bits());
            w.write_varint_field(20, 1); // FLOAT
        }
        AttrValue::Int(v) => {
            w.write_varint_field(3, *v as u64);
            w.write_varint_field(20, 2); // INT
        }
        AttrValue::String(v) => {
            w.write_string_field(4, v);
            w.write_varint_field(20, 3); // STRING
        }
        AttrValue::Floats(values) => {
            w.write_packed_floats(7, values);
            w.write_varint_field(20, 6); // FLOATS
        }
        AttrValue::Ints(values) => {
            w.write_packed_varints(8, values);
            w.write_varint_field(20, 7); // INTS
        }
    }
    w.into_bytes()
}

/// NodeProto: input=1, output=2, name=3, op_type=4, attribute=5
pub(crate) fn encode_node(node: &OpNode) -> Vec<u8> {
    let mut w = ProtoWriter::new();
    for input in node.inputs() {
        w.write_string_field(1, input);
    }
    for output in node.outputs() {
        w.write_string_field(2, output);
    }
    w.write_string_field(3, node.name());
    w.write_string_field(4, node.op_type());
    for (attr_name, attr_value) in node.op().attributes() {
        w.write_bytes_field(5, &encode_attribute(attr_name, &attr_value));
    }
    w.into_bytes()
}

/// GraphProto: node=1, name=2, initializer=5, input=11, output=12, value_info=13
pub(crate) fn encode_graph(graph: &Graph) -> Vec<u8> {
    let mut w = ProtoWriter::new();
    for node in graph.nodes() {
        w.write_bytes_field(1, &encode_node(node));
    }
    w.write_string_field(2, graph.name());
    for tensor in graph.initializers() {
        w.write_bytes_field(5, &encode_tensor(tensor));
    }
    for meta in graph.inputs() {
        w.write_bytes_field(11, &encode_value_info(meta));
    }
    for meta in graph.outputs() {
        w.write_bytes_field(12, &encode_value_info(meta));
    }
    for meta in graph.value_infos() {
        w.write_bytes_field(13, &encode_value_info(meta));
    }
    w.into_bytes()
}

/// ModelProto: ir_version=1, producer_name=2, graph=7, opset_import=8
/// OperatorSetIdProto: domain=1, version=2
pub fn encode_model(model: &Model) -> Vec<u8> {
    let mut w = ProtoWriter::new();
    w.write_varint_field(1, model.ir_version() as u64);
    w.write_string_field(2, model.producer_name());
    w.write_bytes_field(7, &encode_graph(model.graph()));

    let mut opset = ProtoWriter::new();
    opset.write_string_field(1, ""); // 默认域
    opset.write_varint_field(2, model.opset_version() as u64);
    w.write_bytes_field(8, &opset.into_bytes());

    w.into_bytes()
}
