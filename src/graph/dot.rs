/*
 * @Author       : 老董
 * @Date         : 2026-05-14
 * @Description  : Graphviz DOT 可视化
 */

use super::core::Graph;
use std::collections::HashMap;

impl Graph {
    /// 生成 Graphviz DOT 格式的图描述字符串
    ///
    /// 返回的字符串可用于：
    /// - 在线预览：<https://dreampuf.github.io/GraphvizOnline/>
    /// - `dot -Tpng` 等本地渲染
    ///
    /// # 节点样式
    /// - **图输入**: 椭圆形，浅蓝色
    /// - **初始化器**: 矩形，浅绿色
    /// - **算子节点**: 圆角矩形，浅黄色
    /// - **图输出**: 双椭圆，浅红色
    ///
    /// 边标签为流经该边的张量名。
    pub fn to_dot(&self) -> String {
        let desc = self.describe();
        // 生产者映射与校验共用；歧义生产时退化为空映射
        let connections = self.build_connections().unwrap_or_default();
        let mut dot = String::new();

        // 图头部
        dot.push_str("digraph Model {\n");
        dot.push_str("    rankdir=TB;\n");
        dot.push_str("    node [fontname=\"Microsoft YaHei,SimHei,Arial\"];\n");
        dot.push_str("    edge [fontname=\"Microsoft YaHei,SimHei,Arial\"];\n");
        dot.push('\n');

        // 张量名 → DOT 节点 id（图输入/初始化器各占一个节点，中间张量归属其生产者）
        let mut source_of: HashMap<&str, String> = HashMap::new();

        for input in &desc.inputs {
            let id = format!("input_{}", input.name);
            dot.push_str(&format!(
                "    \"{id}\" [shape=ellipse, style=filled, fillcolor=lightblue, label=\"{}\\n{:?}\"];\n",
                input.name, input.dims
            ));
            source_of.insert(&input.name, id);
        }
        for init in &desc.initializers {
            let id = format!("init_{}", init.name);
            dot.push_str(&format!(
                "    \"{id}\" [shape=box, style=filled, fillcolor=lightgreen, label=\"{}\\n{:?}\"];\n",
                init.name, init.dims
            ));
            source_of.insert(&init.name, id);
        }
        for node in &desc.nodes {
            let id = format!("op_{}", node.name);
            let shape_note = node
                .output_shape
                .as_ref()
                .map(|dims| format!("\\n{dims:?}"))
                .unwrap_or_default();
            dot.push_str(&format!(
                "    \"{id}\" [shape=box, style=\"rounded,filled\", fillcolor=lightyellow, label=\"{}\\n{}{shape_note}\"];\n",
                node.name, node.op_type
            ));
        }
        // 中间张量归属其生产者
        for (tensor, producer) in &connections.producer {
            source_of.insert(tensor, format!("op_{producer}"));
        }
        for output in &desc.outputs {
            dot.push_str(&format!(
                "    \"output_{}\" [shape=doublecircle, style=filled, fillcolor=lightcoral, label=\"{}\\n{:?}\"];\n",
                output.name, output.name, output.dims
            ));
        }
        dot.push('\n');

        // 边：张量源 → 消费节点，标签为张量名
        for node in &desc.nodes {
            for input in &node.inputs {
                if let Some(src) = source_of.get(input.as_str()) {
                    dot.push_str(&format!(
                        "    \"{src}\" -> \"op_{}\" [label=\"{input}\"];\n",
                        node.name
                    ));
                }
            }
        }
        for output in &desc.outputs {
            if let Some(src) = source_of.get(output.name.as_str()) {
                dot.push_str(&format!(
                    "    \"{src}\" -> \"output_{}\" [label=\"{}\"];\n",
                    output.name, output.name
                ));
            }
        }

        dot.push_str("}\n");
        dot
    }
}
