//! Decision parsing
//!
//! The decision reply is line-oriented:
//!
//! ```text
//! CALL_TOOL
//! 工具名称: maps_geo
//! 参数: {"address": "北京市海淀区"}
//! 原因: 需要先获取坐标
//! ```
//!
//! or `GENERATE_FINAL_RESPONSE`. Anything else, including replies that
//! contain both directives, `NEED_MORE_INFO`, or a `CALL_TOOL` without a
//! tool name, is read as a finish so the loop always moves toward an end.

use super::types::Decision;
use serde_json::{json, Value};

const CALL_TOOL: &str = "CALL_TOOL";
const FINISH: &str = "GENERATE_FINAL_RESPONSE";

const TOOL_LABELS: [&str; 4] = ["工具名称", "tool_name", "工具", "tool"];
const ARGS_LABELS: [&str; 3] = ["参数", "arguments", "args"];
const REASON_LABELS: [&str; 2] = ["原因", "reason"];

/// Parse an LLM decision reply
pub fn parse_decision(text: &str) -> Decision {
    let wants_call = text.contains(CALL_TOOL);
    let wants_finish = text.contains(FINISH);
    let lines: Vec<&str> = text.lines().collect();
    let reason = find_field(&lines, &REASON_LABELS).map(|(_, v)| v.to_string());

    if !wants_call || wants_finish {
        return Decision::Finish {
            reason: reason.filter(|r| !r.is_empty()),
        };
    }

    let tool_name = find_field(&lines, &TOOL_LABELS)
        .map(|(_, v)| clean_tool_name(v))
        .filter(|name| !name.is_empty());

    let Some(tool_name) = tool_name else {
        return Decision::Finish { reason: None };
    };

    let arguments = match find_field(&lines, &ARGS_LABELS) {
        Some((index, first)) => parse_arguments(first, &lines[index + 1..]),
        None => json!({}),
    };

    Decision::CallTool {
        tool_name,
        arguments,
        reason: reason.filter(|r| !r.is_empty()),
    }
}

/// First line carrying one of `labels`, with its index and value
fn find_field<'a>(lines: &[&'a str], labels: &[&str]) -> Option<(usize, &'a str)> {
    lines
        .iter()
        .enumerate()
        .find_map(|(i, line)| labelled_value(*line, labels).map(|v| (i, v)))
}

/// `"工具名称: maps_geo"` → `Some("maps_geo")` for a matching label
fn labelled_value<'a>(line: &'a str, labels: &[&str]) -> Option<&'a str> {
    let line = line
        .trim()
        .trim_start_matches(['-', '*', ' '])
        .trim_start_matches("**");

    labels.iter().find_map(|label| {
        let head = line.get(..label.len())?;
        if !head.eq_ignore_ascii_case(label) {
            return None;
        }
        let rest = line[label.len()..].trim_start_matches("**").trim_start();
        rest.strip_prefix(':')
            .or_else(|| rest.strip_prefix('：'))
            .map(str::trim)
    })
}

fn is_label_line(line: &str) -> bool {
    [&TOOL_LABELS[..], &ARGS_LABELS[..], &REASON_LABELS[..]]
        .iter()
        .any(|labels| labelled_value(line, labels).is_some())
}

fn clean_tool_name(raw: &str) -> String {
    raw.trim()
        .trim_matches(|c: char| matches!(c, '`' | '*' | '"' | '\'') || c.is_whitespace())
        .to_string()
}

/// JSON object arguments, possibly spread over following lines or put in a
/// fenced block under the label. Non-JSON text becomes `{"query": text}`.
fn parse_arguments(first: &str, following: &[&str]) -> Value {
    let first = first.trim();

    if first.is_empty() || is_fence(first) {
        let start = following.iter().position(|line| {
            let line = line.trim();
            !line.is_empty() && !is_fence(line)
        });
        return start
            .filter(|&i| following[i].trim_start().starts_with('{'))
            .and_then(|i| collect_object(following[i].trim(), &following[i + 1..]))
            .unwrap_or_else(|| json!({}));
    }

    let first = first.trim_matches('`').trim();
    if first.starts_with('{') {
        if let Some(value) = collect_object(first, following) {
            return value;
        }
    }

    if first.is_empty() {
        json!({})
    } else {
        json!({ "query": first })
    }
}

/// Grow `first` line by line until it parses as an object
fn collect_object(first: &str, following: &[&str]) -> Option<Value> {
    let mut buffer = first.to_string();
    if let Some(value) = json_object(&buffer) {
        return Some(value);
    }
    for line in following {
        if is_label_line(line) || is_fence(line.trim_start()) {
            break;
        }
        buffer.push('\n');
        buffer.push_str(line);
        if let Some(value) = json_object(&buffer) {
            return Some(value);
        }
    }
    None
}

fn is_fence(line: &str) -> bool {
    line.starts_with("```")
}

fn json_object(text: &str) -> Option<Value> {
    match serde_json::from_str::<Value>(text.trim()) {
        Ok(value @ Value::Object(_)) => Some(value),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestrator::DecisionKind;

    #[test]
    fn test_call_tool_chinese_labels() {
        let decision = parse_decision(
            "```\nCALL_TOOL\n工具名称: maps_geo\n参数: {\"address\": \"北京市海淀区\", \"city\": \"北京\"}\n原因: 需要先获取坐标\n```",
        );
        assert_eq!(
            decision,
            Decision::CallTool {
                tool_name: "maps_geo".to_string(),
                arguments: json!({"address": "北京市海淀区", "city": "北京"}),
                reason: Some("需要先获取坐标".to_string()),
            }
        );
    }

    #[test]
    fn test_call_tool_english_labels_and_fullwidth_colon() {
        let decision = parse_decision(
            "CALL_TOOL\ntool： `maps_text_search`\nargs: {\"keywords\": \"酒店\"}\nreason: find hotels",
        );
        match decision {
            Decision::CallTool {
                tool_name,
                arguments,
                reason,
            } => {
                assert_eq!(tool_name, "maps_text_search");
                assert_eq!(arguments["keywords"], "酒店");
                assert_eq!(reason.as_deref(), Some("find hotels"));
            }
            other => panic!("expected CallTool, got {:?}", other),
        }
    }

    #[test]
    fn test_multiline_arguments() {
        let decision = parse_decision(
            "CALL_TOOL\n**工具名称**: maps_around_search\n参数: {\n  \"location\": \"116.31,39.99\",\n  \"keywords\": \"地铁站\"\n}\n原因: 周边交通",
        );
        let Decision::CallTool { arguments, .. } = decision else {
            panic!("expected CallTool");
        };
        assert_eq!(arguments, json!({"location": "116.31,39.99", "keywords": "地铁站"}));
    }

    #[test]
    fn test_non_json_arguments_become_query() {
        let decision = parse_decision("CALL_TOOL\n工具名称: maps_geo\n参数: 北京市海淀区");
        let Decision::CallTool { arguments, .. } = decision else {
            panic!("expected CallTool");
        };
        assert_eq!(arguments, json!({"query": "北京市海淀区"}));
    }

    #[test]
    fn test_finish() {
        let decision = parse_decision("GENERATE_FINAL_RESPONSE\n原因: 数据已经足够");
        assert_eq!(
            decision,
            Decision::Finish {
                reason: Some("数据已经足够".to_string())
            }
        );
    }

    #[test]
    fn test_unusable_replies_finish() {
        for reply in [
            "",
            "我觉得可以了",
            "NEED_MORE_INFO\n需要的信息: 预算",
            "CALL_TOOL\n参数: {\"address\": \"北京\"}",
            "CALL_TOOL\n工具名称: maps_geo\n或者直接 GENERATE_FINAL_RESPONSE",
        ] {
            assert_eq!(
                parse_decision(reply).kind(),
                DecisionKind::Finish,
                "reply: {:?}",
                reply
            );
        }
    }

    #[test]
    fn test_fenced_arguments_under_label() {
        let decision = parse_decision(
            "CALL_TOOL\n工具名称: maps_geo\n参数:\n```json\n{\n  \"address\": \"北京市朝阳区国贸\",\n  \"city\": \"北京\"\n}\n```\n原因: 获取工作地坐标",
        );
        assert_eq!(
            decision,
            Decision::CallTool {
                tool_name: "maps_geo".to_string(),
                arguments: json!({"address": "北京市朝阳区国贸", "city": "北京"}),
                reason: Some("获取工作地坐标".to_string()),
            }
        );
    }

    #[test]
    fn test_missing_arguments_default_to_empty_object() {
        let decision = parse_decision("CALL_TOOL\n工具名称: maps_geo");
        let Decision::CallTool { arguments, .. } = decision else {
            panic!("expected CallTool");
        };
        assert_eq!(arguments, json!({}));
    }
}
