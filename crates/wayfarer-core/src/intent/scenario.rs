//! Scenario templates

use serde::{Deserialize, Serialize};
use wayfarer_tools::MapTool;

/// Fixed set of request scenarios
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Scenario {
    /// Finding a place to rent near one or more workplaces
    RentalHousing,
    /// Multi-day trip itineraries
    TravelPlanning,
    /// Getting from A to B
    RoutePlanning,
    /// Places near a location or matching a keyword
    PoiSearch,
    /// Hotels and other lodging
    Accommodation,
    /// Nothing matched, or classification failed
    Unclassified,
}

impl Scenario {
    /// Classified scenarios in menu order
    pub const CLASSIFIED: [Scenario; 5] = [
        Scenario::RentalHousing,
        Scenario::TravelPlanning,
        Scenario::RoutePlanning,
        Scenario::PoiSearch,
        Scenario::Accommodation,
    ];

    /// Kebab-case tag
    #[must_use]
    pub fn tag(&self) -> &'static str {
        match self {
            Self::RentalHousing => "rental-housing",
            Self::TravelPlanning => "travel-planning",
            Self::RoutePlanning => "route-planning",
            Self::PoiSearch => "poi-search",
            Self::Accommodation => "accommodation",
            Self::Unclassified => "unclassified",
        }
    }

    /// Snake-case template key
    #[must_use]
    pub fn key(&self) -> &'static str {
        match self {
            Self::RentalHousing => "rental_housing",
            Self::TravelPlanning => "travel_planning",
            Self::RoutePlanning => "route_planning",
            Self::PoiSearch => "poi_search",
            Self::Accommodation => "accommodation",
            Self::Unclassified => "general",
        }
    }

    /// Analysis label shown to users and the LLM
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::RentalHousing => "租房位置分析",
            Self::TravelPlanning => "旅游行程规划",
            Self::RoutePlanning => "路线规划",
            Self::PoiSearch => "地点搜索",
            Self::Accommodation => "住宿推荐",
            Self::Unclassified => "通用分析",
        }
    }

    /// Trigger words listed in the classification prompt
    #[must_use]
    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            Self::RentalHousing => &["租房", "找房", "住房", "房子", "租赁", "居住"],
            Self::TravelPlanning => &["旅游", "旅行", "攻略", "景点", "行程", "度假"],
            Self::RoutePlanning => &["路线", "导航", "出行方式", "交通", "到达"],
            Self::PoiSearch => &["附近", "周边", "找", "搜索", "推荐"],
            Self::Accommodation => &["酒店", "住宿", "客栈", "民宿", "宾馆"],
            Self::Unclassified => &[],
        }
    }

    /// Tools the scenario usually needs
    #[must_use]
    pub fn required_tools(&self) -> &'static [MapTool] {
        match self {
            Self::RentalHousing => &[
                MapTool::Geocode,
                MapTool::AroundSearch,
                MapTool::TransitRoute,
            ],
            Self::TravelPlanning => &[MapTool::TextSearch, MapTool::AroundSearch],
            Self::RoutePlanning => &[
                MapTool::Geocode,
                MapTool::WalkingRoute,
                MapTool::TransitRoute,
            ],
            Self::PoiSearch => &[MapTool::AroundSearch, MapTool::TextSearch],
            Self::Accommodation => &[MapTool::TextSearch, MapTool::AroundSearch],
            Self::Unclassified => &[MapTool::TextSearch],
        }
    }

    /// Follow-up prompts offered after a chat reply
    #[must_use]
    pub fn suggestions(&self) -> &'static [&'static str] {
        match self {
            Self::RentalHousing => &[
                "帮我比较这几个区域的通勤时间",
                "这些区域附近有哪些超市和地铁站？",
                "预算有限的话还有哪些选择？",
            ],
            Self::TravelPlanning => &[
                "帮我推荐当地的特色美食",
                "景点之间怎么安排交通最方便？",
                "推荐几家交通方便的酒店",
            ],
            Self::RoutePlanning => &[
                "有没有更省钱的路线？",
                "步行过去需要多久？",
                "目的地附近有什么吃饭的地方？",
            ],
            Self::PoiSearch => &[
                "离我最近的是哪一家？",
                "帮我规划去那里的路线",
                "附近还有类似的地方吗？",
            ],
            Self::Accommodation => &[
                "这些酒店附近有地铁站吗？",
                "从酒店到主要景点怎么走？",
                "有没有更便宜的住宿选择？",
            ],
            Self::Unclassified => &[
                "我在北京海淀区工作，想找房子",
                "帮我规划成都3天2夜旅游攻略",
                "从上海到杭州怎么走最快",
            ],
        }
    }

    /// Resolve a classifier label: tag, key, Chinese label, or a fragment of the label
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        if label.is_empty() {
            return None;
        }
        let lower = label.to_lowercase();
        let all = Self::CLASSIFIED
            .into_iter()
            .chain(std::iter::once(Self::Unclassified));

        for scenario in all {
            if lower == scenario.tag() || lower == scenario.key() || label == scenario.label() {
                return Some(scenario);
            }
        }
        if lower == "unclassified" || lower == "general" {
            return Some(Self::Unclassified);
        }
        Self::CLASSIFIED
            .into_iter()
            .find(|s| s.label().contains(label) || label.contains(s.label()))
    }
}

impl std::fmt::Display for Scenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}
