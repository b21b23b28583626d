//! Evidence digest
//!
//! Renders successful tool payloads as compact text for the decision and
//! synthesis prompts. Results are grouped by kind in first-seen order and
//! each kind contributes at most three items.

use serde_json::Value;
use wayfarer_tools::{MapTool, ToolCallResult};

const ITEMS_PER_KIND: usize = 3;
const POIS_SHOWN: usize = 5;
const NAMES_SHOWN: usize = 3;
const MIN_WALK_METERS: u64 = 100;
const OTHER_PREVIEW_CHARS: usize = 200;

/// Evidence grouping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EvidenceKind {
    /// Geocoding results
    Coordinates,
    /// Walking or transit routes
    Routes,
    /// Around-search POIs
    NearbyPois,
    /// Keyword search POIs
    SearchResults,
    /// Anything else
    OtherData,
}

impl EvidenceKind {
    /// Kind for a tool name
    #[must_use]
    pub fn of(tool_name: &str) -> Self {
        match MapTool::from_name(tool_name) {
            Some(MapTool::Geocode) => Self::Coordinates,
            Some(MapTool::TransitRoute | MapTool::WalkingRoute) => Self::Routes,
            Some(MapTool::AroundSearch) => Self::NearbyPois,
            Some(MapTool::TextSearch) => Self::SearchResults,
            None => Self::OtherData,
        }
    }

    /// Group name
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Coordinates => "coordinates",
            Self::Routes => "routes",
            Self::NearbyPois => "nearby_pois",
            Self::SearchResults => "search_results",
            Self::OtherData => "other_data",
        }
    }
}

/// Successful payloads grouped by kind, in first-seen order
#[must_use]
pub fn group(results: &[ToolCallResult]) -> Vec<(EvidenceKind, Vec<&Value>)> {
    let mut groups: Vec<(EvidenceKind, Vec<&Value>)> = Vec::new();
    for result in results.iter().filter(|r| r.is_success()) {
        let Some(payload) = result.payload.as_ref() else {
            continue;
        };
        let kind = EvidenceKind::of(&result.tool_name);
        match groups.iter_mut().find(|(k, _)| *k == kind) {
            Some((_, items)) => items.push(payload),
            None => groups.push((kind, vec![payload])),
        }
    }
    groups
}

/// Full digest text
#[must_use]
pub fn digest(results: &[ToolCallResult]) -> String {
    let sections: Vec<String> = group(results)
        .into_iter()
        .map(|(kind, items)| {
            let mut section = format!(
                "=== {} 数据 ({}条) ===",
                kind.as_str().to_uppercase(),
                items.len()
            );
            for (i, item) in items.iter().take(ITEMS_PER_KIND).enumerate() {
                section.push_str(&format!("\n第{}条数据: {}", i + 1, summarize(kind, item)));
            }
            section
        })
        .collect();

    if sections.is_empty() {
        "暂无详细数据".to_string()
    } else {
        sections.join("\n\n")
    }
}

/// One-line key facts of a payload
#[must_use]
pub fn summarize(kind: EvidenceKind, payload: &Value) -> String {
    let summary = match kind {
        EvidenceKind::Coordinates => summarize_geocode(payload),
        EvidenceKind::Routes => summarize_route(payload),
        EvidenceKind::NearbyPois => summarize_pois(payload),
        EvidenceKind::SearchResults => summarize_search(payload),
        EvidenceKind::OtherData => None,
    };
    summary.unwrap_or_else(|| preview(kind, payload))
}

fn summarize_geocode(payload: &Value) -> Option<String> {
    let first = payload.get("results")?.as_array()?.first()?;
    Some(format!(
        "地址: {}, 坐标: {}, 城市: {}",
        text_or(first.get("formatted_address"), "未知地址"),
        text_or(first.get("location"), "未知坐标"),
        text_or(first.get("city"), "未知城市"),
    ))
}

fn summarize_route(payload: &Value) -> Option<String> {
    // Amap answers either with the route at the top level or under `routes[0]`.
    let route = payload
        .get("routes")
        .and_then(Value::as_array)
        .and_then(|r| r.first())
        .unwrap_or(payload);

    if let Some(transit) = route
        .get("transits")
        .and_then(Value::as_array)
        .and_then(|t| t.first())
    {
        let duration = number(transit.get("duration")).or_else(|| number(route.get("duration")));
        let distance = number(route.get("distance")).or_else(|| number(transit.get("distance")));
        let legs = transit_legs(transit);
        return Some(format!(
            "总时长: {}, 总距离: {}, 费用: {}元, 路线: {}",
            minutes(duration),
            kilometers(distance),
            text_or(transit.get("cost"), "未知"),
            if legs.is_empty() {
                "路线详情缺失".to_string()
            } else {
                legs.join(" → ")
            }
        ));
    }

    let path = route
        .get("paths")
        .and_then(Value::as_array)
        .and_then(|p| p.first())?;
    let duration = number(path.get("duration")).or_else(|| number(route.get("duration")));
    let distance = number(path.get("distance")).or_else(|| number(route.get("distance")));
    Some(format!(
        "步行时长: {}, 距离: {}",
        minutes(duration),
        kilometers(distance)
    ))
}

fn transit_legs(transit: &Value) -> Vec<String> {
    let Some(segments) = transit.get("segments").and_then(Value::as_array) else {
        return Vec::new();
    };
    let mut legs = Vec::new();
    for segment in segments {
        if let Some(walk) = number(segment.pointer("/walking/distance")) {
            if walk > MIN_WALK_METERS {
                legs.push(format!("步行{}米", walk));
            }
        }
        if let Some(line) = segment
            .pointer("/bus/buslines/0/name")
            .and_then(Value::as_str)
        {
            legs.push(format!("乘坐{}", line));
        }
    }
    legs
}

fn summarize_pois(payload: &Value) -> Option<String> {
    let pois = payload.get("pois")?.as_array()?;
    if pois.is_empty() {
        return Some("未找到相关地点".to_string());
    }
    let shown: Vec<String> = pois
        .iter()
        .take(POIS_SHOWN)
        .map(|poi| {
            let distance = match number(poi.get("distance")) {
                Some(m) => format!("{}米", m),
                None => "未知".to_string(),
            };
            format!(
                "{}({}) - {} - 距离{}",
                text_or(poi.get("name"), "未知名称"),
                text_or(poi.get("type"), "未知类型"),
                text_or(poi.get("address"), "未知地址"),
                distance
            )
        })
        .collect();
    Some(format!("找到{}个地点: {}", pois.len(), shown.join("; ")))
}

fn summarize_search(payload: &Value) -> Option<String> {
    let pois = payload.get("pois")?.as_array()?;
    if pois.is_empty() {
        return Some("未搜索到结果".to_string());
    }
    let names: Vec<String> = pois
        .iter()
        .take(NAMES_SHOWN)
        .map(|poi| text_or(poi.get("name"), "未知"))
        .collect();
    Some(format!(
        "搜索到{}个结果，包括: {}等",
        pois.len(),
        names.join(", ")
    ))
}

fn preview(kind: EvidenceKind, payload: &Value) -> String {
    let raw = match payload {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    let mut text: String = raw.chars().take(OTHER_PREVIEW_CHARS).collect();
    if raw.chars().count() > OTHER_PREVIEW_CHARS {
        text.push_str("...");
    }
    format!("数据类型: {}, 内容: {}", kind.as_str(), text)
}

/// Amap sends most scalars as strings and uses `[]` for missing values
fn text_or(value: Option<&Value>, default: &str) -> String {
    match value {
        Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => default.to_string(),
    }
}

fn number(value: Option<&Value>) -> Option<u64> {
    match value? {
        Value::Number(n) => n.as_u64().or_else(|| n.as_f64().map(|f| f.max(0.0) as u64)),
        Value::String(s) => s.trim().parse::<f64>().ok().map(|f| f.max(0.0) as u64),
        _ => None,
    }
}

fn minutes(seconds: Option<u64>) -> String {
    seconds.map_or_else(|| "未知".to_string(), |s| format!("{}分钟", s / 60))
}

fn kilometers(meters: Option<u64>) -> String {
    meters.map_or_else(
        || "未知".to_string(),
        |m| format!("{:.1}公里", m as f64 / 1000.0),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wayfarer_tools::{Error as ToolError, MockExecutor};

    fn ok(tool: MapTool) -> ToolCallResult {
        let payload = MockExecutor::sample_payload(tool);
        ToolCallResult::success(tool.name(), json!({}), payload, 5)
    }

    #[test]
    fn test_geocode_summary() {
        let text = summarize(
            EvidenceKind::Coordinates,
            &MockExecutor::sample_payload(MapTool::Geocode),
        );
        assert_eq!(
            text,
            "地址: 北京市海淀区中关村, 坐标: 116.310003,39.991957, 城市: 北京市"
        );
    }

    #[test]
    fn test_transit_summary() {
        let text = summarize(
            EvidenceKind::Routes,
            &MockExecutor::sample_payload(MapTool::TransitRoute),
        );
        assert_eq!(
            text,
            "总时长: 45分钟, 总距离: 15.2公里, 费用: 5元, 路线: 步行320米 → 乘坐地铁10号线(内环)"
        );
    }

    #[test]
    fn test_walking_summary_under_routes_key() {
        let payload = json!({"routes": [{"distance": "2400", "paths": [{"duration": "1800"}]}]});
        assert_eq!(
            summarize(EvidenceKind::Routes, &payload),
            "步行时长: 30分钟, 距离: 2.4公里"
        );
    }

    #[test]
    fn test_short_walks_hidden() {
        let payload = json!({
            "transits": [{
                "duration": 600,
                "cost": "2",
                "segments": [
                    {"walking": {"distance": "80"}, "bus": {"buslines": [{"name": "302路"}]}}
                ]
            }]
        });
        let text = summarize(EvidenceKind::Routes, &payload);
        assert!(text.contains("路线: 乘坐302路"));
        assert!(!text.contains("步行80米"));
        assert!(text.contains("总距离: 未知"));
    }

    #[test]
    fn test_poi_and_search_summaries() {
        let pois = summarize(
            EvidenceKind::NearbyPois,
            &MockExecutor::sample_payload(MapTool::AroundSearch),
        );
        assert!(pois.starts_with("找到2个地点: 中关村地铁站(交通设施服务;地铁站;地铁站) - 海淀区中关村大街 - 距离320米"));

        let search = summarize(
            EvidenceKind::SearchResults,
            &MockExecutor::sample_payload(MapTool::TextSearch),
        );
        assert_eq!(
            search,
            "搜索到2个结果，包括: 如家酒店(中关村店), 汉庭酒店(人民大学店)等"
        );
    }

    #[test]
    fn test_digest_groups_and_caps() {
        let mut results = vec![ok(MapTool::Geocode), ok(MapTool::TextSearch)];
        for _ in 0..4 {
            results.push(ok(MapTool::Geocode));
        }
        results.push(ToolCallResult::failure(
            "maps_around_search",
            json!({}),
            &ToolError::Timeout(30_000),
            30_000,
        ));

        let text = digest(&results);
        assert!(text.starts_with("=== COORDINATES 数据 (5条) ==="));
        assert!(text.contains("第3条数据"));
        assert!(!text.contains("第4条数据: 地址"));
        assert!(text.contains("=== SEARCH_RESULTS 数据 (1条) ==="));
        assert!(!text.contains("NEARBY_POIS"));
    }

    #[test]
    fn test_empty_digest() {
        assert_eq!(digest(&[]), "暂无详细数据");
    }

    #[test]
    fn test_unexpected_shape_falls_back_to_preview() {
        let text = summarize(EvidenceKind::Coordinates, &Value::from("plain text"));
        assert_eq!(text, "数据类型: coordinates, 内容: plain text");
    }
}
