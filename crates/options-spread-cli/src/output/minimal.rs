use serde_json::Value;

/// Print just the key answer value from the output.
///
/// Screen results reduce to the best trade's expected result; pricing
/// results to the theoretical value. Everything else falls back to the
/// first field.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    // ranked screen: trades[0] is the best by construction
    if let Some(best) = result_obj
        .get("trades")
        .and_then(|t| t.as_array())
        .and_then(|a| a.first())
    {
        if let Some(er) = best.get("expected_result") {
            println!("{}", format_minimal(er));
            return;
        }
    }

    // single-option quote
    if let Some(val) = result_obj.get("leg").and_then(|l| l.get("theoretical_value")) {
        println!("{}", format_minimal(val));
        return;
    }

    if let Value::Object(map) = result_obj {
        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, format_minimal(val));
            return;
        }
    }

    println!("{}", format_minimal(result_obj));
}

fn format_minimal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
