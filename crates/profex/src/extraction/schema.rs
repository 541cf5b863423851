//! Extraction model configuration: response schema, prompt, input bounds.

use serde_json::{json, Value};

/// Default generation model.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Sampling temperature. Extraction wants near-deterministic output.
pub const TEMPERATURE: f32 = 0.1;

/// Input cap in characters. Longer sheet text is cut before prompting.
pub const MAX_INPUT_CHARS: usize = 20_000;

/// Extraction fields with their schema descriptions, in schema order.
const SCHEMA_FIELDS: &[(&str, &str)] = &[
    ("name", "学员姓名"),
    ("gender", "性别"),
    ("packageName", "所报套餐名称"),
    ("singleCourse", "单独报名课程及课时 (非套餐)"),
    ("phone", "学生电话"),
    ("parentPhone", "家长电话"),
    ("school", "学校"),
    ("grade", "年级"),
    ("targetCountry", "留学意向国家"),
    ("targetDegree", "留学阶段"),
    ("targetScore", "目标分数"),
    ("submissionTime", "递交成绩时间"),
    ("currentScore", "雅思/托福实考成绩"),
    ("accountInfo", "雅思/托福账号"),
    ("entryTestScore", "入学测试成绩"),
    ("cetScore", "大学四/六级成绩"),
    ("origin", "生源地"),
    ("isFullTime", "是否脱产"),
    ("enrollmentDate", "报名日期"),
    ("enrollmentAmount", "报名金额"),
    ("discount", "报名折扣"),
    ("isKOL", "是否为KOL"),
    ("coursePlan", "课程规划方案 (summary of text)"),
    ("studentPersonality", "学员情况介绍/学员性格 (summary of text)"),
    ("classTimePreference", "方便上课的时间"),
    ("examPlan", "大体考试时间计划"),
    ("specialRequests", "家长/学生的特殊要求"),
    ("campus", "校区"),
    ("consultant", "顾问"),
    ("studyManager", "学管"),
];

/// Fields the model should always try to fill. A hint to the model only;
/// replies are not validated against it.
const REQUIRED_FIELDS: &[&str] = &["name", "school"];

/// Builds the structured-output schema sent with every request.
pub fn response_schema() -> Value {
    let mut properties = serde_json::Map::new();
    for (field, description) in SCHEMA_FIELDS {
        properties.insert(
            (*field).to_string(),
            json!({ "type": "STRING", "description": description }),
        );
    }
    json!({
        "type": "OBJECT",
        "properties": Value::Object(properties),
        "required": REQUIRED_FIELDS,
    })
}

/// Cuts sheet text to the input cap, counting characters.
pub fn truncate_input(csv_data: &str) -> &str {
    match csv_data.char_indices().nth(MAX_INPUT_CHARS) {
        Some((byte_index, _)) => &csv_data[..byte_index],
        None => csv_data,
    }
}

/// Renders the extraction prompt around the (truncated) sheet text.
pub fn build_prompt(csv_data: &str) -> String {
    format!(
        r#"You are a data extraction specialist.
I will provide the text content of a "Student Handover Form" (Excel export).

Extract ALL personal information fields defined in the schema.
The data comes from a spreadsheet, so labels might be separated from values by commas or newlines.

Notes:
1. If a field is explicitly "无" (None), return "无".
2. If a field is missing, return null.
3. For long text blocks like "Student Personality" or "Course Plan", keep the original text but clean up excessive newlines.
4. "Current Score" might be labeled as "雅思/托福实考成绩".

Here is the data:
---
{}
---"#,
        truncate_input(csv_data)
    )
}
