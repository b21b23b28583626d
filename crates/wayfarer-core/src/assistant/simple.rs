//! Simple-question detection and direct replies

use regex::RegexSet;
use std::sync::LazyLock;

/// Reply used when the direct LLM reply fails
pub const FALLBACK_GREETING: &str =
    "您好！我是您的智能出行助手，可以帮您分析租房位置、规划旅游行程、搜索地点等。请告诉我您的需求！";

static SIMPLE_QUESTION: LazyLock<RegexSet> = LazyLock::new(|| {
    RegexSet::new([
        r"(?i)^(你好|hello|hi)",
        r"(?i)^(谢谢|thank)",
        r"(?i)^(再见|bye)",
        r"你是|什么是|如何使用",
        r"支持.*吗",
        r"可以.*吗",
    ])
    .expect("SIMPLE_QUESTION patterns are compile-time constants")
});

/// Greetings, thanks, goodbyes and questions about the assistant itself
pub fn is_simple_question(message: &str) -> bool {
    SIMPLE_QUESTION.is_match(message.trim())
}

pub(crate) fn simple_chat_prompt(message: &str, context: &str) -> String {
    format!(
        r#"对话上下文:
{context}

用户消息: {message}

请作为一个智能出行助手，简洁友好地回复用户。如果用户询问功能，请介绍你能帮助用户进行：
- 租房位置分析
- 旅游行程规划
- 路线规划
- 地点搜索
- 住宿推荐
等出行相关服务。"#
    )
}
