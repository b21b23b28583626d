//! Amap - The closed set of mapping tools
//!
//! Every tool the LLM may request is one `MapTool` variant. Arguments are
//! checked against the variant's `ToolSpec` and then decoded into a typed
//! struct, so an executor only ever sees well-formed `ToolArgs`.

use crate::error::{Error, Result};
use crate::spec::{ParamSpec, ParamType, ToolSpec};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Default radius for around search, in meters
pub const DEFAULT_AROUND_RADIUS: &str = "3000";

/// Mapping tools exposed by the Amap MCP server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MapTool {
    /// Address to coordinates
    #[serde(rename = "maps_geo")]
    Geocode,
    /// Public transit route between two coordinates
    #[serde(rename = "maps_direction_transit_integrated")]
    TransitRoute,
    /// Walking route between two coordinates
    #[serde(rename = "maps_direction_walking")]
    WalkingRoute,
    /// POIs around a coordinate
    #[serde(rename = "maps_around_search")]
    AroundSearch,
    /// Keyword POI search
    #[serde(rename = "maps_text_search")]
    TextSearch,
}

impl MapTool {
    /// All tools in stable menu order
    pub const ALL: [MapTool; 5] = [
        MapTool::Geocode,
        MapTool::TransitRoute,
        MapTool::WalkingRoute,
        MapTool::AroundSearch,
        MapTool::TextSearch,
    ];

    /// Wire name
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Geocode => "maps_geo",
            Self::TransitRoute => "maps_direction_transit_integrated",
            Self::WalkingRoute => "maps_direction_walking",
            Self::AroundSearch => "maps_around_search",
            Self::TextSearch => "maps_text_search",
        }
    }

    /// Resolve a wire name
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim().trim_matches('`').trim_matches('*');
        Self::ALL.into_iter().find(|t| t.name() == name)
    }

    /// Whether the tool returns route data
    #[must_use]
    pub fn is_route(&self) -> bool {
        matches!(self, Self::TransitRoute | Self::WalkingRoute)
    }

    /// Parameter schema
    #[must_use]
    pub fn spec(&self) -> ToolSpec {
        match self {
            Self::Geocode => ToolSpec::new(
                self.name(),
                "将详细的结构化地址转换为经纬度坐标，支持地标性名胜景区、建筑物名称解析",
            )
            .with_param(required("address", "待解析的结构化地址信息"))
            .with_param(optional("city", "指定查询的城市")),

            Self::TransitRoute => ToolSpec::new(
                self.name(),
                "公交路径规划，根据起终点坐标规划综合各类公共交通方式（火车、公交、地铁）的通勤方案",
            )
            .with_param(required("origin", "出发点经纬度，格式为 经度,纬度"))
            .with_param(required("destination", "目的地经纬度，格式为 经度,纬度"))
            .with_param(required("city", "公共交通规划起点城市"))
            .with_param(required("cityd", "公共交通规划终点城市")),

            Self::WalkingRoute => ToolSpec::new(
                self.name(),
                "步行路径规划，根据起终点经纬度规划100km以内的步行通勤方案",
            )
            .with_param(required("origin", "出发点经纬度，格式为 经度,纬度"))
            .with_param(required("destination", "目的地经纬度，格式为 经度,纬度")),

            Self::AroundSearch => ToolSpec::new(
                self.name(),
                "周边搜索，根据中心点经纬度和关键词搜索周边的POI",
            )
            .with_param(required("location", "中心点经纬度，格式为 经度,纬度"))
            .with_param(optional("keywords", "搜索关键词"))
            .with_param(optional("radius", "搜索半径（米），默认3000")),

            Self::TextSearch => ToolSpec::new(
                self.name(),
                "关键词搜索，根据用户传入关键词搜索出相关的POI",
            )
            .with_param(required("keywords", "搜索关键词"))
            .with_param(optional("city", "查询城市"))
            .with_param(optional(
                "citylimit",
                "是否强制限制在设置的城市内搜索，默认false",
            )),
        }
    }

    /// Validate `arguments` against the tool's `ToolSpec` and decode the typed shape
    pub fn decode(&self, arguments: &Value) -> Result<ToolArgs> {
        let normalized = self.spec().validate(arguments)?;

        Ok(match self {
            Self::Geocode => ToolArgs::Geocode(self.typed(normalized)?),
            Self::TransitRoute => {
                let args: TransitRouteArgs = self.typed(normalized)?;
                self.check_coordinate("origin", &args.origin)?;
                self.check_coordinate("destination", &args.destination)?;
                ToolArgs::TransitRoute(args)
            }
            Self::WalkingRoute => {
                let args: WalkingRouteArgs = self.typed(normalized)?;
                self.check_coordinate("origin", &args.origin)?;
                self.check_coordinate("destination", &args.destination)?;
                ToolArgs::WalkingRoute(args)
            }
            Self::AroundSearch => {
                let args: AroundSearchArgs = self.typed(normalized)?;
                self.check_coordinate("location", &args.location)?;
                ToolArgs::AroundSearch(args)
            }
            Self::TextSearch => ToolArgs::TextSearch(self.typed(normalized)?),
        })
    }

    fn typed<T: DeserializeOwned>(&self, normalized: Value) -> Result<T> {
        serde_json::from_value(normalized).map_err(|e| Error::invalid(self.name(), e.to_string()))
    }

    fn check_coordinate(&self, field: &str, value: &str) -> Result<()> {
        if is_coordinate(value) {
            Ok(())
        } else {
            Err(Error::invalid(
                self.name(),
                format!(
                    "field `{}` must be `longitude,latitude` (got `{}`); geocode the address with maps_geo first",
                    field, value
                ),
            ))
        }
    }
}

impl std::fmt::Display for MapTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

fn required(name: &str, description: &str) -> ParamSpec {
    ParamSpec::required(name, ParamType::String, description)
}

fn optional(name: &str, description: &str) -> ParamSpec {
    ParamSpec::optional(name, ParamType::String, description)
}

/// `"116.310003,39.991957"` style coordinate
fn is_coordinate(value: &str) -> bool {
    let mut parts = value.split(',').map(str::trim);
    match (parts.next(), parts.next(), parts.next()) {
        (Some(lng), Some(lat), None) => {
            matches!(lng.parse::<f64>(), Ok(v) if (-180.0..=180.0).contains(&v))
                && matches!(lat.parse::<f64>(), Ok(v) if (-90.0..=90.0).contains(&v))
        }
        _ => false,
    }
}

/// `maps_geo` arguments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeArgs {
    /// Structured address
    pub address: String,
    /// City hint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
}

/// `maps_direction_transit_integrated` arguments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitRouteArgs {
    /// Origin `lng,lat`
    pub origin: String,
    /// Destination `lng,lat`
    pub destination: String,
    /// Origin city
    pub city: String,
    /// Destination city
    pub cityd: String,
}

/// `maps_direction_walking` arguments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalkingRouteArgs {
    /// Origin `lng,lat`
    pub origin: String,
    /// Destination `lng,lat`
    pub destination: String,
}

/// `maps_around_search` arguments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AroundSearchArgs {
    /// Center `lng,lat`
    pub location: String,
    /// Keywords
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<String>,
    /// Radius in meters
    #[serde(default = "default_radius")]
    pub radius: String,
}

fn default_radius() -> String {
    DEFAULT_AROUND_RADIUS.to_string()
}

/// `maps_text_search` arguments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextSearchArgs {
    /// Keywords
    pub keywords: String,
    /// City
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    /// Restrict results to `city`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub citylimit: Option<String>,
}

/// Validated arguments, one variant per tool
#[derive(Debug, Clone, PartialEq)]
pub enum ToolArgs {
    /// `maps_geo`
    Geocode(GeocodeArgs),
    /// `maps_direction_transit_integrated`
    TransitRoute(TransitRouteArgs),
    /// `maps_direction_walking`
    WalkingRoute(WalkingRouteArgs),
    /// `maps_around_search`
    AroundSearch(AroundSearchArgs),
    /// `maps_text_search`
    TextSearch(TextSearchArgs),
}

impl ToolArgs {
    /// Tool these arguments belong to
    #[must_use]
    pub fn tool(&self) -> MapTool {
        match self {
            Self::Geocode(_) => MapTool::Geocode,
            Self::TransitRoute(_) => MapTool::TransitRoute,
            Self::WalkingRoute(_) => MapTool::WalkingRoute,
            Self::AroundSearch(_) => MapTool::AroundSearch,
            Self::TextSearch(_) => MapTool::TextSearch,
        }
    }

    /// Wire arguments for `tools/call`
    #[must_use]
    pub fn to_arguments(&self) -> Value {
        let encoded = match self {
            Self::Geocode(a) => serde_json::to_value(a),
            Self::TransitRoute(a) => serde_json::to_value(a),
            Self::WalkingRoute(a) => serde_json::to_value(a),
            Self::AroundSearch(a) => serde_json::to_value(a),
            Self::TextSearch(a) => serde_json::to_value(a),
        };
        // Plain string-field structs always encode.
        encoded.unwrap_or(Value::Null)
    }
}
