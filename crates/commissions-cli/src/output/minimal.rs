use serde_json::Value;

/// Print just the headline figures from a deal result, one per line.
pub fn print_minimal(value: &Value) {
    let headline_keys = [
        "net_payout",
        "finalis_commissions",
        "implied_total",
        "debt_collected",
        "advance_fees_created",
        "amount_not_charged_due_to_cap",
    ];

    let Some(calculations) = value.get("calculations").and_then(Value::as_object) else {
        // not a deal result, fall back to raw JSON
        println!("{}", value);
        return;
    };

    for key in &headline_keys {
        if let Some(entry) = calculations.get(*key) {
            println!("{}: {}", key, format_minimal(entry));
        }
    }
    if let Some(tracking) = value.get("payg_tracking").and_then(Value::as_object) {
        if let Some(coverage) = tracking.get("arr_coverage_percentage") {
            println!("arr_coverage_percentage: {}", format_minimal(coverage));
        }
    }
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
