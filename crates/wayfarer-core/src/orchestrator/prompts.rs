//! Prompt builders for the decision and synthesis calls

use super::config::TurnContext;
use super::evidence;
use super::types::OrchestrationState;
use crate::intent::{Intent, Scenario};
use serde_json::Value;
use std::collections::BTreeMap;
use wayfarer_tools::ToolCallResult;

/// Marker line the decision prompt always carries
pub const DECISION_MARKER: &str = "请决定下一步行动";

/// Marker line the synthesis prompt always carries
pub const SYNTHESIS_MARKER: &str = "收集到的详细数据";

pub(crate) fn decision_prompt(
    state: &OrchestrationState,
    ctx: &TurnContext,
    tool_menu: &str,
    max_iterations: usize,
) -> String {
    let history = if ctx.history.trim().is_empty() {
        String::new()
    } else {
        format!("对话上下文:\n{}\n\n", ctx.history)
    };

    format!(
        r#"{history}当前分析状态:
{status}

已执行的工具调用 ({used}/{max_iterations}):
{calls}

已收集的数据:
{digest}

可用工具:
{tool_menu}

根据当前状态和用户需求: "{query}"

{DECISION_MARKER}：
1. 如果需要调用工具，请回答：
CALL_TOOL
工具名称: tool_name
参数: {{"param": "value"}}
原因: 调用原因

2. 如果信息收集完毕，可以生成最终分析，请回答：
GENERATE_FINAL_RESPONSE
原因: 说明为什么可以生成最终回答

路线类工具需要 "经度,纬度" 格式的坐标，请先用 maps_geo 获取地址坐标。"#,
        status = analysis_status(state, ctx),
        used = state.iteration_count,
        calls = call_history(&state.results),
        digest = evidence::digest(&state.results),
        query = ctx.query,
    )
}

fn analysis_status(state: &OrchestrationState, ctx: &TurnContext) -> String {
    let intent = &state.intent;
    let mut lines = vec![
        format!("用户查询: {}", ctx.query),
        format!("分析类型: {} ({})", intent.scenario.label(), intent.scenario.tag()),
    ];
    if !intent.entities.is_empty() {
        lines.push(format!("关键信息: {}", entities_line(&intent.entities)));
    }
    if !intent.recommended_tool_hints.is_empty() {
        let hints = intent.recommended_tool_hints.join(", ");
        lines.push(format!("建议工具: {}", hints));
    }
    if let Some(preferences) = &ctx.preferences {
        lines.push(format!("用户偏好: {}", preferences));
    }
    if !ctx.constraints.is_empty() {
        lines.push(format!("约束条件: {}", constraints_line(&ctx.constraints)));
    }

    if state.results.is_empty() {
        lines.push("尚未执行任何工具调用".to_string());
    } else {
        lines.push(format!("已执行工具调用: {}次", state.results.len()));
        lines.push(format!("成功调用: {}次", state.successful_calls()));
    }
    lines.join("\n")
}

fn call_history(results: &[ToolCallResult]) -> String {
    if results.is_empty() {
        return "无".to_string();
    }
    let mut lines = Vec::new();
    for (i, result) in results.iter().enumerate() {
        let status = if result.is_success() { "成功" } else { "失败" };
        lines.push(format!("{}. {} - {}", i + 1, result.tool_name, status));
        lines.push(format!("   参数: {}", result.arguments));
        lines.push(format!(
            "   原因: {}",
            result.reason.as_deref().unwrap_or("未说明")
        ));
        if let (Some(category), Some(detail)) = (result.category, &result.error_detail) {
            lines.push(format!("   错误: [{}] {}", category, detail));
        }
    }
    lines.join("\n")
}

pub(crate) fn synthesis_prompt(
    intent: &Intent,
    ctx: &TurnContext,
    results: &[ToolCallResult],
) -> String {
    let base = format!(
        r#"用户查询: "{query}"
分析类型: {label}
关键信息: {entities}
用户偏好: {preferences}
约束条件: {constraints}

{SYNTHESIS_MARKER}:
{digest}"#,
        query = ctx.query,
        label = intent.scenario.label(),
        entities = entities_line(&intent.entities),
        preferences = ctx.preferences.as_deref().unwrap_or("无"),
        constraints = constraints_line(&ctx.constraints),
        digest = evidence::digest(results),
    );

    let outline = match intent.scenario {
        Scenario::RoutePlanning => format!(
            r#"请基于上述数据生成详细的路线规划分析报告：

## {title}分析报告

**1. 出行需求分析**
**2. 推荐方案**：每个方案列出出行方式、总时长、总距离、费用、详细换乘步骤和优势
**3. 方案对比**：用表格比较时长、费用、换乘次数
**4. 注意事项**：班次时间、实时路况等提醒"#,
            title = ctx.query.replace(['?', '？'], "")
        ),
        Scenario::RentalHousing => r#"请基于上述数据生成详细的租房位置分析报告：

## 租房位置分析报告

**1. 需求分析**：工作地点、预算、偏好
**2. 推荐区域**：每个区域给出推荐理由、区域特点、预估租金、到各工作地点的通勤路线与时间、周边设施
**3. 找房步骤**
**4. 注意事项**"#
            .to_string(),
        Scenario::TravelPlanning => r#"请基于上述数据生成详细的旅游行程规划报告：

## 旅游行程规划报告

**1. 需求分析**：目的地、时间、预算、偏好
**2. 每日行程**：上午、下午、晚上的具体安排、交通方式和预算
**3. 美食与住宿推荐**：基于搜索数据
**4. 注意事项**：天气、交通、安全"#
            .to_string(),
        _ => format!(
            r#"请基于上述数据生成详细、实用的分析报告：

## {label}报告

**1. 需求分析**
**2. 基于数据的推荐**：包含具体数字、地点、时间
**3. 执行步骤**
**4. 注意事项**"#,
            label = intent.scenario.label()
        ),
    };

    format!(
        "{}\n\n{}\n\n请确保所有内容都基于实际收集到的数据，数据不足时请明确说明。",
        base, outline
    )
}

/// Generic report used when a turn aborts
pub(crate) fn fallback_report(
    intent: &Intent,
    ctx: &TurnContext,
    results: &[ToolCallResult],
) -> String {
    let collected: Vec<String> = evidence::group(results)
        .into_iter()
        .map(|(kind, items)| format!("- {}: {}条数据", kind.as_str(), items.len()))
        .collect();

    format!(
        r#"## {label}报告

**查询内容**: {query}

**数据收集状况**:
{collected}

**分析结果**:
由于技术原因，无法生成详细的分析报告。建议您检查查询信息是否准确，稍后重试。"#,
        label = intent.scenario.label(),
        query = ctx.query,
        collected = if collected.is_empty() {
            "- 暂未收集到数据".to_string()
        } else {
            collected.join("\n")
        },
    )
}

fn entities_line(entities: &BTreeMap<String, String>) -> String {
    if entities.is_empty() {
        return "无".to_string();
    }
    entities
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join(", ")
}

fn constraints_line(constraints: &BTreeMap<String, Value>) -> String {
    if constraints.is_empty() {
        return "无".to_string();
    }
    constraints
        .iter()
        .map(|(k, v)| match v {
            Value::String(s) => format!("{}={}", k, s),
            other => format!("{}={}", k, other),
        })
        .collect::<Vec<_>>()
        .join(", ")
}
