//! Purpose: Render pretty JSON with optional ANSI colorization for CLI output.
//! Exports: colorize_json.
//! Role: Small, pure formatter used by CLI emission paths.
//! Invariants: When color is disabled, output equals serde_json::to_string_pretty of the JSON view.
//! Invariants: ANSI escapes appear only when explicitly enabled.
//! Invariants: Members whose key text repeats an earlier key are skipped, as in the JSON view.
use std::collections::HashSet;

use jsonlens::api::{DynamicValue, Map, Number};

const INDENT: &str = "  ";

// Conservative 8/16-color palette for broad terminal compatibility.
const COLOR_KEY: &str = "36";
const COLOR_STRING: &str = "32";
const COLOR_NUMBER: &str = "33";
const COLOR_BOOL: &str = "35";
const COLOR_NULL: &str = "39";
const COLOR_PUNCT: &str = "39";

pub fn colorize_json(value: &DynamicValue, use_color: bool) -> String {
    let mut out = String::new();
    write_value(value, 0, use_color, &mut out);
    out
}

fn write_value(value: &DynamicValue, indent: usize, use_color: bool, out: &mut String) {
    match value {
        DynamicValue::Null => push_colored("null", COLOR_NULL, use_color, out),
        DynamicValue::Bool(val) => {
            let text = if *val { "true" } else { "false" };
            push_colored(text, COLOR_BOOL, use_color, out);
        }
        DynamicValue::Number(num) => match number_text(*num) {
            Some(text) => push_colored(&text, COLOR_NUMBER, use_color, out),
            None => push_colored("null", COLOR_NULL, use_color, out),
        },
        DynamicValue::String(text) => {
            push_colored(&quoted(text), COLOR_STRING, use_color, out);
        }
        DynamicValue::Array(items) => write_array(items, indent, use_color, out),
        DynamicValue::Map(map) => write_object(map, indent, use_color, out),
    }
}

fn number_text(num: Number) -> Option<String> {
    match num {
        Number::PosInt(n) => Some(n.to_string()),
        Number::NegInt(n) => Some(n.to_string()),
        Number::Float(n) => serde_json::Number::from_f64(n).map(|n| n.to_string()),
    }
}

fn quoted(text: &str) -> String {
    serde_json::to_string(text).unwrap_or_else(|_| "\"\"".to_string())
}

fn write_array(items: &[DynamicValue], indent: usize, use_color: bool, out: &mut String) {
    if items.is_empty() {
        push_colored("[]", COLOR_PUNCT, use_color, out);
        return;
    }
    push_colored("[", COLOR_PUNCT, use_color, out);
    out.push('\n');
    for (idx, item) in items.iter().enumerate() {
        push_indent(indent + 1, out);
        write_value(item, indent + 1, use_color, out);
        if idx + 1 < items.len() {
            push_colored(",", COLOR_PUNCT, use_color, out);
        }
        out.push('\n');
    }
    push_indent(indent, out);
    push_colored("]", COLOR_PUNCT, use_color, out);
}

fn write_object(map: &Map, indent: usize, use_color: bool, out: &mut String) {
    if map.is_empty() {
        push_colored("{}", COLOR_PUNCT, use_color, out);
        return;
    }
    let mut seen = HashSet::new();
    let members: Vec<(String, &DynamicValue)> = map
        .iter()
        .map(|(key, value)| (key.to_string(), value))
        .filter(|(name, _)| seen.insert(name.clone()))
        .collect();
    push_colored("{", COLOR_PUNCT, use_color, out);
    out.push('\n');
    let len = members.len();
    for (idx, (name, value)) in members.into_iter().enumerate() {
        push_indent(indent + 1, out);
        push_colored(&quoted(&name), COLOR_KEY, use_color, out);
        push_colored(":", COLOR_PUNCT, use_color, out);
        out.push(' ');
        write_value(value, indent + 1, use_color, out);
        if idx + 1 < len {
            push_colored(",", COLOR_PUNCT, use_color, out);
        }
        out.push('\n');
    }
    push_indent(indent, out);
    push_colored("}", COLOR_PUNCT, use_color, out);
}

fn push_indent(level: usize, out: &mut String) {
    for _ in 0..level {
        out.push_str(INDENT);
    }
}

fn push_colored(text: &str, color: &str, use_color: bool, out: &mut String) {
    if !use_color {
        out.push_str(text);
        return;
    }
    out.push_str("\u{1b}[");
    out.push_str(color);
    out.push('m');
    out.push_str(text);
    out.push_str("\u{1b}[0m");
}

#[cfg(test)]
mod tests {
    use super::colorize_json;
    use jsonlens::api::{DynamicValue, Key, Map};
    use serde_json::json;

    #[test]
    fn colorize_json_matches_pretty_when_disabled() {
        let value = DynamicValue::from(json!({
            "arr": [1, -2, 2.5, true, null],
            "nested": { "x": "y" },
            "empty": []
        }));
        let plain = colorize_json(&value, false);
        let pretty = serde_json::to_string_pretty(&value.to_json()).expect("pretty");
        assert_eq!(plain, pretty);
    }

    #[test]
    fn colorize_json_emits_ansi_when_enabled() {
        let value = DynamicValue::from(json!({"k":"v","n":1,"b":true,"z":null}));
        let colored = colorize_json(&value, true);
        assert!(colored.contains("\u{1b}[36m\"k\"\u{1b}[0m"));
        assert!(colored.contains("\u{1b}[32m\"v\"\u{1b}[0m"));
        assert!(colored.contains("\u{1b}[33m1\u{1b}[0m"));
        assert!(colored.contains("\u{1b}[35mtrue\u{1b}[0m"));
        assert!(colored.contains("\u{1b}[39mnull\u{1b}[0m"));
    }

    #[test]
    fn numeric_keys_render_quoted() {
        let mut map = Map::new();
        map.insert(Key::Int(7), DynamicValue::from("seven"));
        let plain = colorize_json(&DynamicValue::Map(map), false);
        assert_eq!(plain, "{\n  \"7\": \"seven\"\n}");

        let mut map = Map::new();
        map.insert(Key::Int(7), DynamicValue::from("int"));
        map.insert(Key::from("7"), DynamicValue::from("str"));
        let value = DynamicValue::Map(map);
        let plain = colorize_json(&value, false);
        let pretty = serde_json::to_string_pretty(&value.to_json()).expect("pretty");
        assert_eq!(plain, pretty);
    }
}
