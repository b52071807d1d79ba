//! Hand-assembled ONNX fixtures.
//!
//! Writes the protobuf of a graph shaped like a `skl2onnx` binary classifier
//! export (`float_input` -> `label`, `probabilities`) whose fraud probability
//! is `sigmoid(slope * (x[amount] - pivot))`. Ties go to class 0.

use std::path::{Path, PathBuf};

const AMOUNT_COLUMN: i64 = 29;

// TensorProto.DataType
const FLOAT: i64 = 1;
const INT64: i64 = 7;

// AttributeProto.AttributeType
const ATTR_INT: i64 = 2;

fn varint(out: &mut Vec<u8>, mut value: u64) {
    while value >= 0x80 {
        out.push((value as u8) | 0x80);
        value >>= 7;
    }
    out.push(value as u8);
}

fn int_field(out: &mut Vec<u8>, field: u64, value: i64) {
    varint(out, field << 3);
    varint(out, value as u64);
}

fn bytes_field(out: &mut Vec<u8>, field: u64, bytes: &[u8]) {
    varint(out, (field << 3) | 2);
    varint(out, bytes.len() as u64);
    out.extend_from_slice(bytes);
}

fn str_field(out: &mut Vec<u8>, field: u64, value: &str) {
    bytes_field(out, field, value.as_bytes());
}

fn initializer(name: &str, data_type: i64, raw: Vec<u8>) -> Vec<u8> {
    let mut tensor = Vec::new();
    int_field(&mut tensor, 1, 1); // dims: [1]
    int_field(&mut tensor, 2, data_type);
    str_field(&mut tensor, 8, name);
    bytes_field(&mut tensor, 9, &raw);
    tensor
}

fn float_initializer(name: &str, value: f32) -> Vec<u8> {
    initializer(name, FLOAT, value.to_le_bytes().to_vec())
}

fn int_attribute(name: &str, value: i64) -> Vec<u8> {
    let mut attribute = Vec::new();
    str_field(&mut attribute, 1, name);
    int_field(&mut attribute, 3, value);
    int_field(&mut attribute, 20, ATTR_INT);
    attribute
}

fn node(op_type: &str, inputs: &[&str], output: &str, attributes: &[Vec<u8>]) -> Vec<u8> {
    let mut node = Vec::new();
    for input in inputs {
        str_field(&mut node, 1, input);
    }
    str_field(&mut node, 2, output);
    str_field(&mut node, 3, output);
    str_field(&mut node, 4, op_type);
    for attribute in attributes {
        bytes_field(&mut node, 5, attribute);
    }
    node
}

enum Dim {
    Batch,
    Fixed(i64),
}

fn value_info(name: &str, elem_type: i64, dims: &[Dim]) -> Vec<u8> {
    let mut shape = Vec::new();
    for dim in dims {
        let mut dimension = Vec::new();
        match dim {
            Dim::Batch => str_field(&mut dimension, 2, "N"),
            Dim::Fixed(size) => int_field(&mut dimension, 1, *size),
        }
        bytes_field(&mut shape, 1, &dimension);
    }

    let mut tensor_type = Vec::new();
    int_field(&mut tensor_type, 1, elem_type);
    bytes_field(&mut tensor_type, 2, &shape);

    let mut type_proto = Vec::new();
    bytes_field(&mut type_proto, 1, &tensor_type);

    let mut info = Vec::new();
    str_field(&mut info, 1, name);
    bytes_field(&mut info, 2, &type_proto);
    info
}

/// Serialized `ModelProto` bytes of the amount classifier.
pub fn amount_classifier(pivot: f32, slope: f32) -> Vec<u8> {
    let nodes = [
        node(
            "Gather",
            &["float_input", "amount_column"],
            "amount",
            &[int_attribute("axis", 1)],
        ),
        node("Sub", &["amount", "pivot"], "centered", &[]),
        node("Mul", &["centered", "slope"], "logit", &[]),
        node("Sigmoid", &["logit"], "p_fraud", &[]),
        node("Sub", &["one", "p_fraud"], "p_safe", &[]),
        node(
            "Concat",
            &["p_safe", "p_fraud"],
            "probabilities",
            &[int_attribute("axis", 1)],
        ),
        node(
            "ArgMax",
            &["probabilities"],
            "label",
            &[int_attribute("axis", 1), int_attribute("keepdims", 0)],
        ),
    ];
    let initializers = [
        initializer("amount_column", INT64, AMOUNT_COLUMN.to_le_bytes().to_vec()),
        float_initializer("pivot", pivot),
        float_initializer("slope", slope),
        float_initializer("one", 1.0),
    ];

    let mut graph = Vec::new();
    for node in &nodes {
        bytes_field(&mut graph, 1, node);
    }
    str_field(&mut graph, 2, "amount_classifier");
    for tensor in &initializers {
        bytes_field(&mut graph, 5, tensor);
    }
    bytes_field(
        &mut graph,
        11,
        &value_info("float_input", FLOAT, &[Dim::Batch, Dim::Fixed(30)]),
    );
    bytes_field(&mut graph, 12, &value_info("label", INT64, &[Dim::Batch]));
    bytes_field(
        &mut graph,
        12,
        &value_info("probabilities", FLOAT, &[Dim::Batch, Dim::Fixed(2)]),
    );

    let mut opset = Vec::new();
    int_field(&mut opset, 2, 13);

    let mut model = Vec::new();
    int_field(&mut model, 1, 8); // ir_version
    str_field(&mut model, 2, "fraud-scorer-tests");
    bytes_field(&mut model, 7, &graph);
    bytes_field(&mut model, 8, &opset);
    model
}

pub fn write_amount_classifier(dir: &Path, name: &str, pivot: f32, slope: f32) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, amount_classifier(pivot, slope)).unwrap();
    path
}
