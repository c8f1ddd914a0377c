/*
 * @Author       : 老董
 * @Date         : 2026-05-16
 * @Description  : ONNX protobuf wire 解析器（手写，不依赖 protobuf 库）
 *
 * 解析策略：
 * - 未知字段一律跳过（前向兼容）
 * - 张量数据同时接受 float_data（packed/非 packed）与 raw_data
 * - 符号维度（dim_param）、非 FLOAT 初始化器、图/张量属性等合法但
 *   本库不处理的特性报 Unsupported
 */

use crate::graph::{
    AttrValue, ConstTensor, DataType, DEFAULT_OPSET_VERSION, Graph, GraphError, Model, OpKind,
    OpNode, TensorMeta,
};

use super::writer::{WIRE_FIXED32, WIRE_FIXED64, WIRE_LEN, WIRE_VARINT};

/// protobuf 字段读取器（带边界检查的游标）
pub(crate) struct ProtoReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ProtoReader<'a> {
    pub(crate) const fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub(crate) const fn eof(&self) -> bool {
        self.pos >= self.data.len()
    }

    pub(crate) const fn position(&self) -> usize {
        self.pos
    }

    fn check_bound(&self, needed: usize) -> Result<(), GraphError> {
        // pos <= data.len() 恒成立；needed 来自字节流，可能是任意大的声称长度
        let remaining = self.data.len() - self.pos;
        if needed > remaining {
            return Err(GraphError::Parse(format!(
                "缓冲区越界：位置{}需要{needed}字节，仅剩{remaining}字节",
                self.pos
            )));
        }
        Ok(())
    }

    pub(crate) fn read_varint(&mut self) -> Result<u64, GraphError> {
        let mut value: u64 = 0;
        let mut shift = 0u32;
        loop {
            self.check_bound(1)?;
            let byte = self.data[self.pos];
            self.pos += 1;
            if shift >= 64 {
                return Err(GraphError::Parse("varint 超过 10 字节".to_string()));
            }
            value |= u64::from(byte & 0x7f) << shift;
            if byte & 0x80 == 0 {
                return Ok(value);
            }
            shift += 7;
        }
    }

    /// 读取字段键，返回 (字段编号, wire type)
    pub(crate) fn read_key(&mut self) -> Result<(u32, u32), GraphError> {
        let key = self.read_varint()?;
        let field_number = (key >> 3) as u32;
        let wire_type = (key & 0x7) as u32;
        if field_number == 0 {
            return Err(GraphError::Parse("字段编号为 0".to_string()));
        }
        Ok((field_number, wire_type))
    }

    pub(crate) fn read_length_delimited(&mut self) -> Result<&'a [u8], GraphError> {
        let len = self.read_varint()? as usize;
        self.check_bound(len)?;
        let slice = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    pub(crate) fn read_string(&mut self) -> Result<String, GraphError> {
        let bytes = self.read_length_delimited()?;
        String::from_utf8(bytes.to_vec())
            .map_err(|e| GraphError::Parse(format!("字符串不是合法 UTF-8：{e}")))
    }

    pub(crate) fn read_fixed32(&mut self) -> Result<u32, GraphError> {
        self.check_bound(4)?;
        let mut bytes = [0u8; 4];
        bytes.copy_from_slice(&self.data[self.pos..self.pos + 4]);
        self.pos += 4;
        Ok(u32::from_le_bytes(bytes))
    }

    pub(crate) fn read_fixed64(&mut self) -> Result<u64, GraphError> {
        self.check_bound(8)?;
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&self.data[self.pos..self.pos + 8]);
        self.pos += 8;
        Ok(u64::from_le_bytes(bytes))
    }

    /// 跳过一个指定 wire type 的字段值
    pub(crate) fn skip_field(&mut self, wire_type: u32) -> Result<(), GraphError> {
        match wire_type {
            WIRE_VARINT => {
                self.read_varint()?;
            }
            WIRE_FIXED64 => {
                self.read_fixed64()?;
            }
            WIRE_LEN => {
                self.read_length_delimited()?;
            }
            WIRE_FIXED32 => {
                self.read_fixed32()?;
            }
            other => {
                // 组（3/4）早已废弃
                return Err(GraphError::Parse(format!("不支持的 wire type：{other}")));
            }
        }
        Ok(())
    }
}

// ========== 各消息的解析 ==========
// 字段编号遵循 onnx.proto3

/// 解析 packed repeated varint（同时兼容非 packed 的单个值）
fn read_packed_varints(reader: &mut ProtoReader) -> Result<Vec<i64>, GraphError> {
    let bytes = reader.read_length_delimited()?;
    let mut inner = ProtoReader::new(bytes);
    let mut values = Vec::new();
    while !inner.eof() {
        values.push(inner.read_varint()? as i64);
    }
    Ok(values)
}

/// 解析 packed repeated float
fn read_packed_floats(reader: &mut ProtoReader) -> Result<Vec<f32>, GraphError> {
    let bytes = reader.read_length_delimited()?;
    if bytes.len() % 4 != 0 {
        return Err(GraphError::Parse(format!(
            "packed float 长度{}不是 4 的倍数",
            bytes.len()
        )));
    }
    let mut inner = ProtoReader::new(bytes);
    let mut values = Vec::with_capacity(bytes.len() / 4);
    while !inner.eof() {
        values.push(f32::from_bits(inner.read_fixed32()?));
    }
    Ok(values)
}

/// TensorProto → ConstTensor
pub(crate) fn parse_tensor(data: &[u8]) -> Result<ConstTensor, GraphError> {
    let mut reader = ProtoReader::new(data);
    let mut name = String::new();
    let mut dims: Vec<i64> = Vec::new();
    let mut data_type_code: i64 = 0;
    let mut float_data: Vec<f32> = Vec::new();
    let mut raw_data: Option<Vec<u8>> = None;

    while !reader.eof() {
        let (field_number, wire_type) = reader.read_key()?;
        match (field_number, wire_type) {
            // dims=1：packed 或逐个 varint
            (1, WIRE_LEN) => dims.extend(read_packed_varints(&mut reader)?),
            (1, WIRE_VARINT) => dims.push(reader.read_varint()? as i64),
            // data_type=2
            (2, WIRE_VARINT) => data_type_code = reader.read_varint()? as i64,
            // float_data=4：packed 或逐个 fixed32
            (4, WIRE_LEN) => float_data.extend(read_packed_floats(&mut reader)?),
            (4, WIRE_FIXED32) => float_data.push(f32::from_bits(reader.read_fixed32()?)),
            // name=8
            (8, WIRE_LEN) => name = reader.read_string()?,
            // raw_data=9
            (9, WIRE_LEN) => raw_data = Some(reader.read_length_delimited()?.to_vec()),
            (_, wire) => reader.skip_field(wire)?,
        }
    }

    let data_type = DataType::from_onnx_code(data_type_code).ok_or_else(|| {
        GraphError::Unsupported(format!("张量{name}的元素类型编码{data_type_code}"))
    })?;
    if data_type != DataType::Float32 {
        return Err(GraphError::Unsupported(format!(
            "张量{name}的初始化器数据类型{data_type:?}（仅支持 Float32）"
        )));
    }

    // raw_data 与 float_data 二选一
    if let Some(raw) = raw_data {
        if !float_data.is_empty() {
            return Err(GraphError::Parse(format!(
                "张量{name}同时携带 raw_data 与 float_data"
            )));
        }
        if raw.len() % 4 != 0 {
            return Err(GraphError::Parse(format!(
                "张量{name}的 raw_data 长度{}不是 4 的倍数",
                raw.len()
            )));
        }
        float_data = raw
            .chunks_exact(4)
            .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect();
    }

    let dims = convert_dims(&name, &dims)?;
    Ok(ConstTensor::from_parts(&name, data_type, dims, float_data))
}

/// ValueInfoProto → TensorMeta
pub(crate) fn parse_value_info(data: &[u8]) -> Result<TensorMeta, GraphError> {
    let mut reader = ProtoReader::new(data);
    let mut name = String::new();
    let mut data_type = None;
    let mut dims: Vec<i64> = Vec::new();

    while !reader.eof() {
        let (field_number, wire_type) = reader.read_key()?;
        match (field_number, wire_type) {
            (1, WIRE_LEN) => name = reader.read_string()?,
            // type=2 → TypeProto
            (2, WIRE_LEN) => {
                let type_bytes = reader.read_length_delimited()?;
                parse_type_proto(type_bytes, &mut data_type, &mut dims)?;
            }
            (_, wire) => reader.skip_field(wire)?,
        }
    }

    let data_type = data_type.ok_or_else(|| {
        GraphError::Parse(format!("值信息{name}缺少张量类型"))
    })?;
    let dims = convert_dims(&name, &dims)?;
    Ok(TensorMeta::new(&name, data_type, &dims))
}

/// TypeProto.tensor_type=1 → Tensor{elem_type=1, shape=2}
fn parse_type_proto(
    data: &[u8],
    data_type: &mut Option<DataType>,
    dims: &mut Vec<i64>,
) -> Result<(), GraphError> {
    let mut reader = ProtoReader::new(data);
    while !reader.eof() {
        let (field_number, wire_type) = reader.read_key()?;
        match (field_number, wire_type) {
            (1, WIRE_LEN) => {
                let tensor_bytes = reader.read_length_delimited()?;
                let mut tensor_reader = ProtoReader::new(tensor_bytes);
                while !tensor_reader.eof() {
                    let (f, w) = tensor_reader.read_key()?;
                    match (f, w) {
                        (1, WIRE_VARINT) => {
                            let code = tensor_reader.read_varint()? as i64;
                            *data_type = Some(DataType::from_onnx_code(code).ok_or_else(|| {
                                GraphError::Unsupported(format!("元素类型编码{code}"))
                            })?);
                        }
                        (2, WIRE_LEN) => {
                            let shape_bytes = tensor_reader.read_length_delimited()?;
                            parse_tensor_shape(shape_bytes, dims)?;
                        }
                        (_, w) => tensor_reader.skip_field(w)?,
                    }
                }
            }
            (_, wire) => reader.skip_field(wire)?,
        }
    }
    Ok(())
}

/// TensorShapeProto.dim=1 → Dimension{dim_value=1, dim_param=2}
fn parse_tensor_shape(data: &[u8], dims: &mut Vec<i64>) -> Result<(), GraphError> {
    let mut reader = ProtoReader::new(data);
    while !reader.eof() {
        let (field_number, wire_type) = reader.read_key()?;
        match (field_number, wire_type) {
            (1, WIRE_LEN) => {
                let dim_bytes = reader.read_length_delimited()?;
                let mut dim_reader = ProtoReader::new(dim_bytes);
                while !dim_reader.eof() {
                    let (f, w) = dim_reader.read_key()?;
                    match (f, w) {
                        (1, WIRE_VARINT) => dims.push(dim_reader.read_varint()? as i64),
                        (2, WIRE_LEN) => {
                            let param = dim_reader.read_string()?;
                            return Err(GraphError::Unsupported(format!(
                                "符号维度 dim_param=\"{param}\"（本库只处理固定形状）"
                            )));
                        }
                        (_, w) => dim_reader.skip_field(w)?,
                    }
                }
            }
            (_, wire) => reader.skip_field(wire)?,
        }
    }
    Ok(())
}

/// AttributeProto → (属性名, 属性值)
pub(crate) fn parse_attribute(data: &[u8]) -> Result<(String, AttrValue), GraphError> {
    let mut reader = ProtoReader::new(data);
    let mut name = String::new();
    let mut type_code: Option<i64> = None;
    let mut float_value: Option<f32> = None;
    let mut int_value: Option<i64> = None;
    let mut string_value: Option<String> = None;
    let mut floats_value: Vec<f32> = Vec::new();
    let mut ints_value: Vec<i64> = Vec::new();

    while !reader.eof() {
        let (field_number, wire_type) = reader.read_key()?;
        match (field_number, wire_type) {
            (1, WIRE_LEN) => name = reader.read_string()?,
            (2, WIRE_FIXED32) => float_value = Some(f32::from_bits(reader.read_fixed32()?)),
            (3, WIRE_VARINT) => int_value = Some(reader.read_varint()? as i64),
            (4, WIRE_LEN) => string_value = Some(reader.read_string()?),
            // 张量/图属性合法但不在本库的处理范围
            (5 | 6 | 10 | 11, WIRE_LEN) => {
                return Err(GraphError::Unsupported(format!(
                    "属性{name}携带张量/图类型的值"
                )));
            }
            (7, WIRE_LEN) => floats_value.extend(read_packed_floats(&mut reader)?),
            (7, WIRE_FIXED32) => floats_value.push(f32::from_bits(reader.read_fixed32()?)),
            (8, WIRE_LEN) => ints_value.extend(read_packed_varints(&mut reader)?),
            (8, WIRE_VARINT) => ints_value.push(reader.read_varint()? as i64),
            (20, WIRE_VARINT) => type_code = Some(reader.read_varint()? as i64),
            (_, wire) => reader.skip_field(wire)?,
        }
    }

    // 有 type 字段按 type 取值；否则按出现的值字段推断
    let value = match type_code {
        Some(1) => AttrValue::Float(float_value.ok_or_else(|| {
            GraphError::Parse(format!("FLOAT 属性{name}缺少 f 字段"))
        })?),
        Some(2) => AttrValue::Int(int_value.ok_or_else(|| {
            GraphError::Parse(format!("INT 属性{name}缺少 i 字段"))
        })?),
        Some(3) => AttrValue::String(string_value.ok_or_else(|| {
            GraphError::Parse(format!("STRING 属性{name}缺少 s 字段"))
        })?),
        Some(6) => AttrValue::Floats(floats_value),
        Some(7) => AttrValue::Ints(ints_value),
        Some(other) => {
            return Err(GraphError::Unsupported(format!(
                "属性{name}的类型编码{other}"
            )));
        }
        None => {
            if let Some(v) = float_value {
                AttrValue::Float(v)
            } else if let Some(v) = int_value {
                AttrValue::Int(v)
            } else if let Some(v) = string_value {
                AttrValue::String(v)
            } else if !ints_value.is_empty() {
                AttrValue::Ints(ints_value)
            } else if !floats_value.is_empty() {
                AttrValue::Floats(floats_value)
            } else {
                return Err(GraphError::Parse(format!("属性{name}没有携带任何值")));
            }
        }
    };

    Ok((name, value))
}

/// NodeProto → OpNode（op_type + 属性在此处落回封闭的算子枚举）
pub(crate) fn parse_node(data: &[u8]) -> Result<OpNode, GraphError> {
    let mut reader = ProtoReader::new(data);
    let mut name = String::new();
    let mut op_type = String::new();
    let mut inputs: Vec<String> = Vec::new();
    let mut outputs: Vec<String> = Vec::new();
    let mut attrs: Vec<(String, AttrValue)> = Vec::new();

    while !reader.eof() {
        let (field_number, wire_type) = reader.read_key()?;
        match (field_number, wire_type) {
            (1, WIRE_LEN) => inputs.push(reader.read_string()?),
            (2, WIRE_LEN) => outputs.push(reader.read_string()?),
            (3, WIRE_LEN) => name = reader.read_string()?,
            (4, WIRE_LEN) => op_type = reader.read_string()?,
            (5, WIRE_LEN) => {
                let attr_bytes = reader.read_length_delimited()?;
                attrs.push(parse_attribute(attr_bytes)?);
            }
            (_, wire) => reader.skip_field(wire)?,
        }
    }

    let op = OpKind::from_attrs(&op_type, &name, &attrs)?;
    Ok(OpNode::from_parts(name, op, inputs, outputs))
}

/// GraphProto → Graph
pub(crate) fn parse_graph(data: &[u8]) -> Result<Graph, GraphError> {
    let mut reader = ProtoReader::new(data);
    let mut name = String::new();
    let mut nodes = Vec::new();
    let mut initializers = Vec::new();
    let mut inputs = Vec::new();
    let mut outputs = Vec::new();
    let mut value_infos = Vec::new();

    while !reader.eof() {
        let (field_number, wire_type) = reader.read_key()?;
        match (field_number, wire_type) {
            (1, WIRE_LEN) => nodes.push(parse_node(reader.read_length_delimited()?)?),
            (2, WIRE_LEN) => name = reader.read_string()?,
            (5, WIRE_LEN) => initializers.push(parse_tensor(reader.read_length_delimited()?)?),
            (11, WIRE_LEN) => inputs.push(parse_value_info(reader.read_length_delimited()?)?),
            (12, WIRE_LEN) => outputs.push(parse_value_info(reader.read_length_delimited()?)?),
            (13, WIRE_LEN) => value_infos.push(parse_value_info(reader.read_length_delimited()?)?),
            (_, wire) => reader.skip_field(wire)?,
        }
    }

    let mut graph = Graph::with_name(&name);
    for meta in inputs {
        graph.add_input(meta);
    }
    for meta in outputs {
        graph.add_output(meta);
    }
    for tensor in initializers {
        graph.add_initializer(tensor);
    }
    for meta in value_infos {
        graph.add_value_info(meta);
    }
    for node in nodes {
        graph.add_node(node);
    }
    Ok(graph)
}

/// ModelProto → Model
pub fn parse_model(data: &[u8]) -> Result<Model, GraphError> {
    let mut reader = ProtoReader::new(data);
    let mut ir_version: i64 = 0;
    let mut producer_name = String::new();
    let mut graph: Option<Graph> = None;
    let mut opset_version: Option<i64> = None;

    while !reader.eof() {
        let (field_number, wire_type) = reader.read_key()?;
        match (field_number, wire_type) {
            (1, WIRE_VARINT) => ir_version = reader.read_varint()? as i64,
            (2, WIRE_LEN) => producer_name = reader.read_string()?,
            (7, WIRE_LEN) => graph = Some(parse_graph(reader.read_length_delimited()?)?),
            // opset_import=8 → OperatorSetIdProto{domain=1, version=2}
            (8, WIRE_LEN) => {
                let opset_bytes = reader.read_length_delimited()?;
                let mut opset_reader = ProtoReader::new(opset_bytes);
                let mut domain = String::new();
                let mut version: i64 = 0;
                while !opset_reader.eof() {
                    let (f, w) = opset_reader.read_key()?;
                    match (f, w) {
                        (1, WIRE_LEN) => domain = opset_reader.read_string()?,
                        (2, WIRE_VARINT) => version = opset_reader.read_varint()? as i64,
                        (_, w) => opset_reader.skip_field(w)?,
                    }
                }
                // 只认默认域的算子集
                if domain.is_empty() && opset_version.is_none() {
                    opset_version = Some(version);
                }
            }
            (_, wire) => reader.skip_field(wire)?,
        }
    }

    let graph = graph.ok_or_else(|| GraphError::Parse("模型缺少 graph 字段".to_string()))?;
    Ok(Model::from_parts(
        ir_version,
        opset_version.unwrap_or(DEFAULT_OPSET_VERSION),
        producer_name,
        graph,
    ))
}

fn convert_dims(name: &str, dims: &[i64]) -> Result<Vec<usize>, GraphError> {
    dims.iter()
        .map(|&d| {
            usize::try_from(d).map_err(|_| {
                GraphError::Parse(format!("张量{name}的维度{d}为负"))
            })
        })
        .collect()
}
