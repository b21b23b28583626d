//! Intent classifier
//!
//! One LLM call per request. Every failure path (provider error, timeout,
//! unparseable reply, unknown scenario label) degrades to
//! `Intent::unclassified()` instead of failing the turn.

use super::scenario::Scenario;
use super::{clamp_confidence, template_hints, Intent};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{info, instrument, warn};
use wayfarer_llm::{CompletionRequest, LlmProvider};
use wayfarer_tools::MapTool;

const MONEY_MARKERS: [&str; 7] = ["元", "预算", "budget", "¥", "￥", "租金", "价格"];

/// Classifies raw text into an `Intent`
pub struct IntentClassifier {
    llm: Arc<dyn LlmProvider>,
    timeout: Duration,
    model: Option<String>,
}

impl IntentClassifier {
    /// Create a classifier with a per-call timeout
    #[must_use]
    pub fn new(llm: Arc<dyn LlmProvider>, timeout: Duration) -> Self {
        Self {
            llm,
            timeout,
            model: None,
        }
    }

    /// Use a specific model instead of the provider default
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Classify `text`; never fails
    #[instrument(skip(self, text), fields(chars = text.chars().count()))]
    pub async fn classify(&self, text: &str) -> Intent {
        let mut request =
            CompletionRequest::prompt(classification_prompt(text)).with_temperature(0.1);
        if let Some(model) = &self.model {
            request.model = model.clone();
        }

        let reply = match timeout(self.timeout, self.llm.complete(request)).await {
            Ok(Ok(response)) => response.content,
            Ok(Err(e)) => {
                warn!(error = %e, "Intent classification call failed, using unclassified");
                return Intent::unclassified();
            }
            Err(_) => {
                warn!(
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Intent classification timed out, using unclassified"
                );
                return Intent::unclassified();
            }
        };

        match parse_intent(&reply) {
            Some(intent) => {
                info!(
                    scenario = %intent.scenario,
                    confidence = intent.confidence,
                    entities = intent.entities.len(),
                    "Intent classified"
                );
                intent
            }
            None => {
                warn!(
                    reply_len = reply.len(),
                    "Unparseable classifier reply, using unclassified"
                );
                Intent::unclassified()
            }
        }
    }
}

fn classification_prompt(text: &str) -> String {
    let scenarios = Scenario::CLASSIFIED
        .iter()
        .enumerate()
        .map(|(i, s)| scenario_line(i + 1, s))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"请分析以下用户查询的意图和需求类型：

用户查询: "{text}"

支持的分析类型和关键词：
{scenarios}

请只返回JSON：
{{
    "analysis_type": "最匹配的分析类型",
    "confidence": 0.0-1.0,
    "key_entities": ["提取的关键实体"],
    "location_info": ["提取的地点信息"],
    "constraints": ["预算、时间等约束"],
    "recommended_tools": ["建议使用的工具"],
    "analysis_plan": ["分析步骤"]
}}"#
    )
}

fn scenario_line(rank: usize, scenario: &Scenario) -> String {
    let (label, tag) = (scenario.label(), scenario.tag());
    let keywords = scenario.keywords().join("、");
    format!("{rank}. {label} ({tag}): {keywords}")
}

#[derive(Debug, Deserialize)]
struct RawIntent {
    #[serde(default)]
    analysis_type: String,
    #[serde(default)]
    scenario: Option<String>,
    #[serde(default)]
    confidence: Option<Value>,
    #[serde(default, deserialize_with = "string_list")]
    key_entities: Vec<String>,
    #[serde(default, deserialize_with = "string_list")]
    location_info: Vec<String>,
    #[serde(default, deserialize_with = "string_list")]
    constraints: Vec<String>,
    #[serde(default, deserialize_with = "string_list")]
    recommended_tools: Vec<String>,
    #[serde(default, deserialize_with = "string_list")]
    analysis_plan: Vec<String>,
}

/// Accepts null, a single string, or an array of scalars
fn string_list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    let scalar = |v: Value| match v {
        Value::Null => None,
        Value::String(s) => Some(s.trim().to_string()),
        other => Some(other.to_string()),
    };
    let items = match Value::deserialize(deserializer)? {
        Value::Array(items) => items.into_iter().filter_map(scalar).collect(),
        other => scalar(other).into_iter().collect::<Vec<_>>(),
    };
    Ok(items.into_iter().filter(|s| !s.is_empty()).collect())
}

/// Strip an optional ```json fence and cut out the outermost object
fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| &text[start..=end])
}

/// Parse a classifier reply; `None` when it is not usable
pub fn parse_intent(text: &str) -> Option<Intent> {
    let raw: RawIntent = serde_json::from_str(extract_json_object(text)?).ok()?;

    let scenario = raw
        .scenario
        .as_deref()
        .and_then(Scenario::from_label)
        .or_else(|| Scenario::from_label(&raw.analysis_type))?;

    let confidence = match &raw.confidence {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0) as f32,
        Some(Value::String(s)) => s.trim().parse::<f32>().unwrap_or(0.0),
        _ => 0.8,
    };

    let mut intent = Intent::new(scenario, clamp_confidence(confidence));

    for (slot, location) in ('a'..='z').zip(raw.location_info) {
        intent.entities.insert(format!("location_{slot}"), location);
    }
    for (i, entity) in raw.key_entities.into_iter().enumerate() {
        intent.entities.insert(format!("entity_{}", i + 1), entity);
    }
    if let Some(budget) = raw
        .constraints
        .iter()
        .find(|c| MONEY_MARKERS.iter().any(|m| c.to_lowercase().contains(m)))
    {
        intent.entities.insert("budget".to_string(), budget.clone());
    }
    for (i, constraint) in raw.constraints.into_iter().enumerate() {
        let key = format!("constraint_{}", i + 1);
        intent.entities.insert(key, constraint);
    }

    let mut hints: Vec<String> = Vec::new();
    for name in &raw.recommended_tools {
        if let Some(tool) = MapTool::from_name(name) {
            let name = tool.name().to_string();
            if !hints.contains(&name) {
                hints.push(name);
            }
        }
    }
    intent.recommended_tool_hints = if hints.is_empty() {
        template_hints(scenario)
    } else {
        hints
    };
    intent.analysis_plan = raw.analysis_plan;

    Some(intent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wayfarer_llm::{Error as LlmError, MockProvider};

    const RENTAL_REPLY: &str = r#"```json
{
    "analysis_type": "租房位置分析",
    "confidence": 0.92,
    "key_entities": ["通勤方便的房子"],
    "location_info": ["北京海淀区", "北京朝阳区"],
    "constraints": ["预算5000-8000元"],
    "recommended_tools": ["maps_geo", "maps_direction_transit_integrated"],
    "analysis_plan": ["定位两个工作地点", "比较通勤"]
}
```"#;

    fn classifier(mock: MockProvider) -> IntentClassifier {
        IntentClassifier::new(Arc::new(mock), Duration::from_secs(5))
    }

    #[test]
    fn test_parse_fenced_rental_reply() {
        let intent = parse_intent(RENTAL_REPLY).unwrap();
        assert_eq!(intent.scenario, Scenario::RentalHousing);
        assert!((intent.confidence - 0.92).abs() < 1e-6);
        assert_eq!(intent.entities["location_a"], "北京海淀区");
        assert_eq!(intent.entities["location_b"], "北京朝阳区");
        assert_eq!(intent.entities["budget"], "预算5000-8000元");
        assert_eq!(intent.entities["constraint_1"], "预算5000-8000元");
        assert_eq!(
            intent.recommended_tool_hints,
            vec!["maps_geo", "maps_direction_transit_integrated"]
        );
        assert_eq!(intent.analysis_plan.len(), 2);
    }

    #[test]
    fn test_parse_lenient_shapes() {
        let intent = parse_intent(
            r#"{"scenario": "poi-search", "confidence": "1.4", "location_info": "三里屯", "recommended_tools": ["maps_weather"]}"#,
        )
        .unwrap();
        assert_eq!(intent.scenario, Scenario::PoiSearch);
        assert_eq!(intent.confidence, 1.0);
        assert_eq!(intent.entities["location_a"], "三里屯");
        assert_eq!(
            intent.recommended_tool_hints,
            vec!["maps_around_search", "maps_text_search"]
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_intent("I think this is about housing.").is_none());
        assert!(parse_intent(r#"{"analysis_type": "天气查询", "confidence": 0.9}"#).is_none());
        assert!(parse_intent("{not json}").is_none());
    }

    #[tokio::test]
    async fn test_classify_unparseable_degrades() {
        let intent = classifier(MockProvider::new().with_response("抱歉，我无法理解。"))
            .classify("随便说点什么")
            .await;
        assert_eq!(intent.scenario, Scenario::Unclassified);
        assert_eq!(intent.confidence, 0.0);
        assert!(intent.entities.is_empty());
    }

    #[tokio::test]
    async fn test_classify_llm_error_degrades() {
        let mock = MockProvider::new();
        mock.push_error(LlmError::ServerError("503".into()));
        let intent = classifier(mock).classify("从上海到杭州怎么走").await;
        assert_eq!(intent, Intent::unclassified());
    }

    #[tokio::test]
    async fn test_classify_timeout_degrades() {
        let mock = MockProvider::new()
            .with_response(RENTAL_REPLY)
            .with_delay(Duration::from_millis(200));
        let intent = IntentClassifier::new(Arc::new(mock), Duration::from_millis(10))
            .classify("我想租房")
            .await;
        assert_eq!(intent.scenario, Scenario::Unclassified);
    }

    #[tokio::test]
    async fn test_classify_single_call_with_scenarios_in_prompt() {
        let mock = Arc::new(MockProvider::new().with_response(RENTAL_REPLY));
        let classifier = IntentClassifier::new(mock.clone(), Duration::from_secs(5));

        let intent = classifier
            .classify("我在北京海淀区和朝阳区都有工作，想找一个通勤方便的房子")
            .await;

        assert_eq!(intent.scenario, Scenario::RentalHousing);
        assert_eq!(mock.call_count(), 1);
        let prompt = &mock.prompts()[0];
        for scenario in Scenario::CLASSIFIED {
            assert!(prompt.contains(scenario.label()));
        }
    }
}
