//! Pure projections from records to display rows.
//!
//! Everything here is a function from data to a serializable view; no state,
//! no side effects. The public pages and the admin tables both render through
//! this module so any accepted mutation re-renders every affected view the
//! same way.

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::{BlogPost, Guide, Tool};

const TOOL_ICON_FALLBACK: &str = "🛠️";
const ADMIN_EXCERPT_LEN: usize = 60;
const GUIDE_EXCERPT_LEN: usize = 140;
const BLOG_EXCERPT_LEN: usize = 160;

/// A rendered public page: cards plus banner/empty states.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageView<T: Serialize> {
    pub count: usize,
    /// Error banner text when the one-shot data load failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Empty-state notice when the filter matched nothing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub empty_notice: Option<String>,
    pub cards: Vec<T>,
}

impl<T: Serialize> PageView<T> {
    pub fn ok(cards: Vec<T>, empty_notice: &str) -> Self {
        let empty_notice = if cards.is_empty() {
            Some(empty_notice.to_string())
        } else {
            None
        };
        Self {
            count: cards.len(),
            error: None,
            empty_notice,
            cards,
        }
    }

    pub fn failed(message: &str) -> Self {
        Self {
            count: 0,
            error: Some(message.to_string()),
            empty_notice: None,
            cards: Vec::new(),
        }
    }
}

/// Public tool card.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCard {
    pub icon: String,
    pub name: String,
    pub category_label: String,
    pub description: String,
    pub platforms: Vec<String>,
    pub difficulty: String,
    pub license: String,
    pub download: String,
    pub featured: bool,
}

pub fn tool_card(tool: &Tool) -> ToolCard {
    ToolCard {
        icon: if tool.icon.is_empty() {
            TOOL_ICON_FALLBACK.to_string()
        } else {
            tool.icon.clone()
        },
        name: tool.name.clone(),
        category_label: category_label(&tool.category),
        description: tool.description.clone(),
        platforms: tool.platform.clone(),
        difficulty: tool.difficulty.clone(),
        license: tool.license.clone(),
        download: tool.download.clone(),
        featured: tool.featured,
    }
}

/// Public guide card.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GuideCard {
    pub title: String,
    pub excerpt: String,
    pub link: String,
}

pub fn guide_card(guide: &Guide) -> GuideCard {
    let source = if guide.excerpt.is_empty() {
        &guide.content
    } else {
        &guide.excerpt
    };
    GuideCard {
        title: guide.title.clone(),
        excerpt: format!("{}...", truncate(source, GUIDE_EXCERPT_LEN)),
        link: format!("guide-detail.html?id={}", guide.id),
    }
}

/// Public blog card.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogCard {
    pub title: String,
    pub date_label: String,
    pub read_minutes: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub excerpt: String,
    pub tags: Vec<String>,
    pub link: String,
}

pub fn blog_card(post: &BlogPost) -> BlogCard {
    let source = if post.excerpt.is_empty() {
        &post.content
    } else {
        &post.excerpt
    };
    BlogCard {
        title: post.title.clone(),
        date_label: format_date(post.date.as_deref()),
        read_minutes: estimate_read_minutes(&post.content),
        category: post.category.clone(),
        excerpt: format!("{}...", truncate(source, BLOG_EXCERPT_LEN)),
        tags: post.tags.clone(),
        link: format!("blog-detail.html?id={}", post.id),
    }
}

/// Home page sections: up to six featured tools and three latest guides.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeView {
    pub featured_tools: Vec<ToolCard>,
    pub latest_guides: Vec<GuideCard>,
}

pub fn home_view(tools: &[Tool], guides: &[Guide]) -> HomeView {
    HomeView {
        featured_tools: tools
            .iter()
            .filter(|t| t.featured)
            .take(6)
            .map(tool_card)
            .collect(),
        latest_guides: guides.iter().take(3).map(guide_card).collect(),
    }
}

/// Admin table row for the tools section.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolRow {
    pub id: i64,
    /// Icon-prefixed display name.
    pub name: String,
    pub category: String,
    pub platforms: String,
    pub tags: String,
    pub featured: &'static str,
}

pub fn tool_rows(records: &[Tool]) -> Vec<ToolRow> {
    records
        .iter()
        .map(|tool| ToolRow {
            id: tool.id,
            name: if tool.icon.is_empty() {
                tool.name.clone()
            } else {
                format!("{} {}", tool.icon, tool.name)
            },
            category: tool.category.clone(),
            platforms: tool.platform.join(", "),
            tags: tool.tags.join(", "),
            featured: if tool.featured { "Yes" } else { "No" },
        })
        .collect()
}

/// Admin table row shared by the guides and blog sections.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryRow {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub excerpt: String,
}

pub fn guide_rows(records: &[Guide]) -> Vec<EntryRow> {
    records
        .iter()
        .map(|guide| EntryRow {
            id: guide.id,
            title: guide.title.clone(),
            slug: guide.slug.clone(),
            excerpt: admin_excerpt(&guide.excerpt),
        })
        .collect()
}

pub fn post_rows(records: &[BlogPost]) -> Vec<EntryRow> {
    records
        .iter()
        .map(|post| EntryRow {
            id: post.id,
            title: post.title.clone(),
            slug: post.slug.clone(),
            excerpt: admin_excerpt(&post.excerpt),
        })
        .collect()
}

/// Display label for a tool category key; unknown keys pass through.
pub fn category_label(category: &str) -> String {
    match category {
        "developer" => "Developer Tool",
        "design" => "Design Tool",
        "windows" => "Windows Utility",
        "ai" => "AI Tool",
        "security" => "Security Tool",
        "mobile" => "Mobile App",
        "productivity" => "Productivity",
        other => other,
    }
    .to_string()
}

/// Reading time estimate at 200 words per minute, at least one minute.
pub fn estimate_read_minutes(content: &str) -> u32 {
    let words = content.split_whitespace().count() as u32;
    words.div_ceil(200).max(1)
}

/// "Mar 1, 2024"-style label; anything unparseable renders as "No date".
pub fn format_date(date: Option<&str>) -> String {
    let Some(raw) = date else {
        return "No date".to_string();
    };
    let parsed = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            chrono::DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|dt| dt.date_naive())
        });
    match parsed {
        Some(date) => date.format("%b %-d, %Y").to_string(),
        None => "No date".to_string(),
    }
}

fn admin_excerpt(text: &str) -> String {
    let short = truncate(text, ADMIN_EXCERPT_LEN);
    if text.chars().count() > ADMIN_EXCERPT_LEN {
        format!("{}...", short)
    } else {
        short
    }
}

fn truncate(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}
