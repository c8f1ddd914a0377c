mod parse_attribute;
mod parse_node;
mod parse_tensor;
mod roundtrip;
