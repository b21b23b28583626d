//! Fixed catalog data: example queries, usage examples, data sources

use super::types::UsageExample;

/// Upstream services named in capability listings
pub const DATA_SOURCES: [&str; 2] = ["高德地图API", "Gemini LLM"];

/// Short sample requests
pub const EXAMPLE_QUERIES: [&str; 5] = [
    "我在北京海淀区工作，想找房子",
    "帮我规划成都3天2夜旅游攻略",
    "从上海到杭州怎么走最快",
    "我附近有什么好吃的餐厅",
    "深圳南山区有什么好酒店",
];

/// One detailed example per category
#[must_use]
pub fn usage_examples() -> Vec<UsageExample> {
    vec![
        UsageExample {
            category: "租房需求",
            query: "我在北京海淀区和朝阳区都有工作，想找一个通勤方便的房子，预算5000-8000元",
            expected_analysis: vec!["地理位置分析", "交通路线规划", "房源搜索", "成本分析"],
        },
        UsageExample {
            category: "旅游规划",
            query: "我想去成都玩3天，喜欢美食和历史文化，预算3000元，帮我规划一下行程",
            expected_analysis: vec!["景点推荐", "美食攻略", "住宿建议", "行程规划", "预算分配"],
        },
        UsageExample {
            category: "路线规划",
            query: "从上海到杭州最经济的出行方式是什么？包括时间和费用对比",
            expected_analysis: vec!["交通方式对比", "费用计算", "时间分析", "路线推荐"],
        },
        UsageExample {
            category: "商务出行",
            query: "下周要去深圳出差2天，需要住在会展中心附近，要求商务酒店，预算500元/晚",
            expected_analysis: vec!["酒店搜索", "位置分析", "商务设施", "预订建议"],
        },
        UsageExample {
            category: "周边探索",
            query: "我在广州天河区，想找周末可以去的好玩地方，不要太远，适合拍照",
            expected_analysis: vec!["周边景点", "交通便利性", "特色分析", "摄影推荐"],
        },
    ]
}
