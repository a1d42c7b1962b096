use nu_protocol::{PipelineData, Record, Span, Value};

/// Convert pipeline input into the JSON shape `item::parse_source` accepts.
///
/// Handles:
///   - Single record (e.g. `open kanji.json` with an `items` column) → object
///   - Table (list of records) → array of objects
///   - Stream of records → array of objects
///   - Empty/Nothing → null
pub fn input_to_json(input: PipelineData) -> serde_json::Value {
    match input {
        PipelineData::Value(value, _) => nu_to_json(&value),
        other => {
            let values: Vec<Value> = other.into_iter().collect();
            serde_json::Value::Array(values.iter().map(nu_to_json).collect())
        }
    }
}

/// Convert a nu_protocol::Value to a serde_json::Value
pub fn nu_to_json(val: &Value) -> serde_json::Value {
    match val {
        Value::Nothing { .. } => serde_json::Value::Null,
        Value::Bool { val, .. } => serde_json::Value::Bool(*val),
        Value::Int { val, .. } => serde_json::json!(*val),
        Value::Float { val, .. } => serde_json::json!(*val),
        Value::String { val, .. } => serde_json::Value::String(val.clone()),
        Value::List { vals, .. } => serde_json::Value::Array(vals.iter().map(nu_to_json).collect()),
        Value::Record { val, .. } => {
            let mut map = serde_json::Map::new();
            for (k, v) in val.iter() {
                map.insert(k.clone(), nu_to_json(v));
            }
            serde_json::Value::Object(map)
        }
        other => other
            .coerce_string()
            .map(serde_json::Value::String)
            .unwrap_or(serde_json::Value::Null),
    }
}

/// Convert a serde_json::Value to a nu_protocol::Value
pub fn json_to_nu(val: &serde_json::Value, span: Span) -> Value {
    match val {
        serde_json::Value::Null => Value::nothing(span),
        serde_json::Value::Bool(b) => Value::bool(*b, span),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::int(i, span)
            } else if let Some(f) = n.as_f64() {
                Value::float(f, span)
            } else {
                Value::string(n.to_string(), span)
            }
        }
        serde_json::Value::String(s) => Value::string(s, span),
        serde_json::Value::Array(arr) => {
            Value::list(arr.iter().map(|v| json_to_nu(v, span)).collect(), span)
        }
        serde_json::Value::Object(map) => {
            let mut record = Record::new();
            for (k, v) in map {
                record.push(k, json_to_nu(v, span));
            }
            Value::record(record, span)
        }
    }
}
