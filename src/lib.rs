//! # Only ONNX
//!
//! `only_onnx`用纯rust程序化地构建一个小型神经网络计算图（卷积支路 + 矩阵乘支路），
//! 做结构/语义校验后序列化为标准的ONNX交换格式写盘，作为下游工具的测试夹具；
//! 同时提供把写出的`.onnx`文件读回内存图的加载器（手写protobuf wire编解码，
//! 不依赖protobuf库）和Graphviz DOT导出。
//!

pub mod builder;
pub mod graph;
pub mod onnx;
pub mod utils;
