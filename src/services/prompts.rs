//! Prompt templates and the style / scene catalogs they draw from.

use crate::models::{Platform, PropertyInfo};

pub const IMAGE_FEATURES_FALLBACK: &str = "现代简约风格，采光良好，空间布局合理";

pub const PHOTO_ANALYSIS_PROMPT: &str =
    "分析这些房源照片的装修材质、风格、采光、空间特征，用一句话总结（50字内）";

pub const COPYWRITER_SYSTEM_PROMPT: &str = "你是专业的房产营销文案专家";

pub const STORYTELLER_SYSTEM_PROMPT: &str = "你是房产文案专家";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Style {
    pub key: &'static str,
    pub name: &'static str,
    pub english: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scene {
    pub key: &'static str,
    pub persona: &'static str,
    pub keywords: &'static str,
}

pub const STYLES: [Style; 8] = [
    Style {
        key: "japandi",
        name: "日式侘寂风格",
        english: "Japandi style, natural wood tones, zen minimalist, cream and earth colors",
    },
    Style {
        key: "cream",
        name: "奶油风",
        english: "cream style, soft beige ivory tones, cozy warm, gentle curves, modern",
    },
    Style {
        key: "minimalist",
        name: "现代极简",
        english: "modern minimalist, black white gray, sleek furniture, clean lines",
    },
    Style {
        key: "nordic",
        name: "北欧风",
        english: "Scandinavian style, white walls, light wood, bright airy",
    },
    Style {
        key: "french",
        name: "法式轻奢",
        english: "French luxury, elegant moldings, gold accents, romantic",
    },
    Style {
        key: "industrial",
        name: "工业风",
        english: "industrial style, exposed concrete, metal elements, vintage",
    },
    Style {
        key: "chinese",
        name: "新中式",
        english: "new Chinese style, traditional elements, dark wood, ink painting",
    },
    Style {
        key: "american",
        name: "美式乡村",
        english: "American country style, warm cozy, distressed wood, vintage",
    },
];

pub const SCENES: [Scene; 3] = [
    Scene {
        key: "single",
        persona: "独居青年",
        keywords: "Chill、自由、开放厨房、阅读角、绿植、咖啡时光、窝在沙发追剧",
    },
    Scene {
        key: "couple",
        persona: "新婚夫妻",
        keywords: "浪漫、双人空间、温馨、周末早餐、一起做饭、电影之夜",
    },
    Scene {
        key: "family",
        persona: "三口之家",
        keywords: "安全、儿童友好、储物空间、学习区、亲子时光、成长陪伴",
    },
];

/// Unknown or missing keys resolve to the cream style.
pub fn resolve_style(key: Option<&str>) -> Style {
    key.and_then(|k| STYLES.iter().find(|s| s.key == k))
        .copied()
        .unwrap_or(STYLES[1])
}

/// Unknown or missing keys resolve to the single-occupant scene.
pub fn resolve_scene(key: Option<&str>) -> Scene {
    key.and_then(|k| SCENES.iter().find(|s| s.key == k))
        .copied()
        .unwrap_or(SCENES[0])
}

fn property_block(info: &PropertyInfo, image_features: &str) -> String {
    let highlights = if info.highlights.is_empty() {
        "无".to_string()
    } else {
        info.highlights.join("、")
    };

    format!(
        "【房源信息】\n户型：{}\n面积：{}平米\n小区：{}\n价格：{}万\n亮点：{}\n图片分析：{}",
        info.house_type, info.area, info.community_name, info.price, highlights, image_features
    )
}

pub fn selling_points_prompt(info: &PropertyInfo, image_features: &str) -> String {
    format!(
        "你是专业房产文案专家。根据以下信息提炼5个核心卖点。\n\n{}\n\n\
         【输出要求】每行一个卖点，以“• ”开头，每条不超过15字，不要输出其他内容。",
        property_block(info, image_features)
    )
}

pub fn platform_prompt(platform: Platform, info: &PropertyInfo, image_features: &str) -> String {
    let requirement = match platform {
        Platform::Beike => "300-500字专业房源描述，结构清晰，突出户型、配套与交通，直接可发布到贝壳",
        Platform::Xiaohongshu => "200-400字感性文案，带emoji和#话题标签，直接可发布到小红书",
        Platform::Moments => "100-200字简洁文案，直接可发布到微信朋友圈",
    };

    format!(
        "你是专业房产文案专家。根据以下信息生成可直接复制使用的{}文案。\n\n{}\n\n\
         【输出要求】{}。只输出文案正文，不要标题或解释。",
        platform.label(),
        property_block(info, image_features),
        requirement
    )
}

pub fn room_suggestions_prompt(style: &Style) -> String {
    format!(
        r#"【任务说明】
你是一位专业的室内设计师，请仔细分析用户上传的户型图图片，识别图中的所有房间，并为每个房间生成软装设计建议。

【设计风格】
{style}

【分析步骤】
1. 首先识别图片中的户型结构，包括：客厅、卧室、厨房、卫生间、阳台等
2. 分析每个房间的面积和采光情况
3. 根据指定风格，为每个房间生成具体的软装建议

【输出要求】
请严格按照以下JSON格式输出，不要添加任何其他文字或解释：

{{
  "analysis": "这是一个XX平米的户型，包含X室X厅X卫。整体格局方正/紧凑，采光良好/一般。（50-80字的整体分析）",
  "rooms": [
    {{
      "name": "客厅",
      "suggestions": {{
        "布局": "沙发靠墙摆放，茶几选择圆形款式，电视柜采用悬浮式设计（20-30字）",
        "配色": "主色调采用米白色，搭配原木色家具，用绿植点缀（20-30字）",
        "材质": "布艺沙发、实木茶几、棉麻窗帘（10-20字）",
        "氛围": "主灯选暖光吊灯，辅以落地灯营造温馨感（10-20字）"
      }}
    }}
  ]
}}

【注意事项】
- 只输出JSON，不要有任何前缀或后缀文字
- rooms数组中必须包含图中识别到的所有房间
- 每个建议要具体可执行，不要空泛
- 如果图片模糊或无法识别，analysis中说明原因"#,
        style = style.name
    )
}

pub fn story_prompt(analysis: &str, style: &Style, scene: &Scene) -> String {
    format!(
        r#"根据以下户型和软装信息，为{persona}写200-300字生活场景描述。

户型信息：{analysis}
软装风格：{style}
目标人群：{persona}
场景关键词：{keywords}

要求：
1. 用第二人称"你"
2. 包含具体时间、动作、感受
3. 结合场景关键词描述典型生活片段
4. 语言温暖有画面感
5. 不用特殊符号

直接输出文字"#,
        persona = scene.persona,
        analysis = analysis,
        style = style.name,
        keywords = scene.keywords
    )
}

pub fn render_prompt(style_en: &str) -> String {
    format!(
        "Transform this floor plan into a 3D bird's eye view interior design render. \
         Keep the exact same room layout and proportions. Add {} furniture and decor. \
         Top-down perspective showing all rooms with furniture, professional architectural \
         visualization, warm natural lighting, 8K quality. Generate an image based on this floor plan.",
        style_en
    )
}
