//! Pure filtering and ordering for collection views.
//!
//! Shared by the public pages and the admin tables. Query matching is a
//! case-insensitive substring test against a fixed per-collection field set;
//! all sorting is stable, so records with equal keys keep their input order.

use chrono::{Datelike, NaiveDate};

use crate::models::{BlogPost, Guide, Tool};

/// Sort orders for the tools views.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ToolSort {
    /// Featured first, alphabetical by name among ties.
    #[default]
    Featured,
    NameAsc,
    NameDesc,
    /// beginner < intermediate < advanced < unrecognized.
    Difficulty,
}

impl ToolSort {
    /// Unknown keys fall back to the default ordering.
    pub fn parse(key: &str) -> Self {
        match key {
            "name-asc" => ToolSort::NameAsc,
            "name-desc" => ToolSort::NameDesc,
            "difficulty" => ToolSort::Difficulty,
            _ => ToolSort::Featured,
        }
    }
}

/// Sort orders for the blog views.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PostSort {
    #[default]
    Newest,
    Oldest,
    TitleAsc,
    TitleDesc,
}

impl PostSort {
    pub fn parse(key: &str) -> Self {
        match key {
            "oldest" => PostSort::Oldest,
            "title-asc" => PostSort::TitleAsc,
            "title-desc" => PostSort::TitleDesc,
            _ => PostSort::Newest,
        }
    }
}

/// View options for the tools collection.
#[derive(Debug, Clone)]
pub struct ToolQuery {
    pub query: String,
    /// Exact category match; "all" (or empty) bypasses the filter.
    pub category: String,
    pub sort: ToolSort,
    pub featured_only: bool,
}

impl Default for ToolQuery {
    fn default() -> Self {
        Self {
            query: String::new(),
            category: "all".to_string(),
            sort: ToolSort::default(),
            featured_only: false,
        }
    }
}

/// View options for the blog collection.
#[derive(Debug, Clone)]
pub struct PostQuery {
    pub query: String,
    pub category: String,
    pub sort: PostSort,
}

impl Default for PostQuery {
    fn default() -> Self {
        Self {
            query: String::new(),
            category: "all".to_string(),
            sort: PostSort::default(),
        }
    }
}

/// Filtered, ordered view of the tools collection.
pub fn filter_tools(records: &[Tool], opts: &ToolQuery) -> Vec<Tool> {
    let needle = opts.query.trim().to_lowercase();
    let mut out: Vec<Tool> = records
        .iter()
        .filter(|tool| {
            let matches_category = bypass_category(&opts.category) || tool.category == opts.category;
            let matches_query = needle.is_empty()
                || contains(&tool.name, &needle)
                || tool.tags.iter().any(|t| contains(t, &needle))
                || tool.platform.iter().any(|p| contains(p, &needle));
            let matches_featured = !opts.featured_only || tool.featured;
            matches_category && matches_query && matches_featured
        })
        .cloned()
        .collect();
    sort_tools(&mut out, opts.sort);
    out
}

/// Filtered view of the guides collection (no sort keys on guides).
pub fn filter_guides(records: &[Guide], query: &str) -> Vec<Guide> {
    let needle = query.trim().to_lowercase();
    records
        .iter()
        .filter(|guide| {
            needle.is_empty()
                || contains(&guide.title, &needle)
                || contains(&guide.slug, &needle)
                || contains(&guide.excerpt, &needle)
                || contains(&guide.content, &needle)
        })
        .cloned()
        .collect()
}

/// Filtered, ordered view of the blog collection.
pub fn filter_posts(records: &[BlogPost], opts: &PostQuery) -> Vec<BlogPost> {
    let needle = opts.query.trim().to_lowercase();
    let mut out: Vec<BlogPost> = records
        .iter()
        .filter(|post| {
            let matches_query = needle.is_empty()
                || contains(&post.title, &needle)
                || contains(&post.slug, &needle)
                || contains(&post.excerpt, &needle)
                || contains(&post.content, &needle)
                || post.tags.iter().any(|t| contains(t, &needle));
            let matches_category = bypass_category(&opts.category)
                || post.category.as_deref() == Some(opts.category.as_str());
            matches_query && matches_category
        })
        .cloned()
        .collect();
    sort_posts(&mut out, opts.sort);
    out
}

pub fn sort_tools(list: &mut [Tool], sort: ToolSort) {
    match sort {
        ToolSort::NameAsc => list.sort_by_key(|t| t.name.to_lowercase()),
        ToolSort::NameDesc => {
            list.sort_by(|a, b| b.name.to_lowercase().cmp(&a.name.to_lowercase()))
        }
        ToolSort::Difficulty => list.sort_by_key(|t| difficulty_rank(&t.difficulty)),
        ToolSort::Featured => list.sort_by(|a, b| {
            b.featured
                .cmp(&a.featured)
                .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
        }),
    }
}

pub fn sort_posts(list: &mut [BlogPost], sort: PostSort) {
    match sort {
        PostSort::Newest => list.sort_by_key(|p| std::cmp::Reverse(date_value(p))),
        PostSort::Oldest => list.sort_by_key(date_value),
        PostSort::TitleAsc => list.sort_by_key(|p| p.title.to_lowercase()),
        PostSort::TitleDesc => {
            list.sort_by(|a, b| b.title.to_lowercase().cmp(&a.title.to_lowercase()))
        }
    }
}

/// Ordinal rank for a difficulty label; unrecognized levels sort last.
pub fn difficulty_rank(level: &str) -> usize {
    match level.to_lowercase().as_str() {
        "beginner" => 0,
        "intermediate" => 1,
        "advanced" => 2,
        _ => usize::MAX,
    }
}

fn bypass_category(category: &str) -> bool {
    category.is_empty() || category == "all"
}

fn contains(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

/// Days since the epoch for sorting; a missing or unparseable date sorts
/// as earliest.
fn date_value(post: &BlogPost) -> i64 {
    let Some(raw) = post.date.as_deref() else {
        return i64::MIN;
    };
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.num_days_from_ce() as i64;
    }
    if let Ok(parsed) = chrono::DateTime::parse_from_rfc3339(raw) {
        return parsed.date_naive().num_days_from_ce() as i64;
    }
    i64::MIN
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tool(name: &str, featured: bool) -> Tool {
        Tool {
            name: name.to_string(),
            featured,
            ..Tool::default()
        }
    }

    fn post(title: &str, date: Option<&str>) -> BlogPost {
        BlogPost {
            title: title.to_string(),
            date: date.map(String::from),
            ..BlogPost::default()
        }
    }

    #[test]
    fn test_empty_input_yields_empty_output() {
        assert!(filter_tools(&[], &ToolQuery::default()).is_empty());
        assert!(filter_guides(&[], "anything").is_empty());
        assert!(filter_posts(&[], &PostQuery::default()).is_empty());
    }

    #[test]
    fn test_featured_sort_scenario() {
        let records = vec![
            tool("Alpha", false),
            tool("Beta", true),
            tool("Gamma", true),
        ];
        let sorted = filter_tools(&records, &ToolQuery::default());
        let names: Vec<&str> = sorted.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Beta", "Gamma", "Alpha"]);
    }

    #[test]
    fn test_blank_query_and_all_category_return_everything() {
        let records = vec![tool("Alpha", false), tool("Beta", true)];
        let opts = ToolQuery {
            query: "".to_string(),
            category: "all".to_string(),
            sort: ToolSort::Featured,
            featured_only: false,
        };
        assert_eq!(filter_tools(&records, &opts).len(), 2);
    }

    #[test]
    fn test_query_matches_name_tags_and_platform_case_insensitively() {
        let mut by_tag = tool("Editor", false);
        by_tag.tags = vec!["Productivity".to_string()];
        let mut by_platform = tool("Player", false);
        by_platform.platform = vec!["Windows".to_string()];
        let records = vec![by_tag, by_platform, tool("Other", false)];

        let opts = ToolQuery {
            query: "WIND".to_string(),
            ..ToolQuery::default()
        };
        let hits = filter_tools(&records, &opts);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Player");

        let opts = ToolQuery {
            query: "productivity".to_string(),
            ..ToolQuery::default()
        };
        assert_eq!(filter_tools(&records, &opts)[0].name, "Editor");
    }

    #[test]
    fn test_query_does_not_match_description() {
        let mut record = tool("Quiet", false);
        record.description = "hidden keyword".to_string();
        let opts = ToolQuery {
            query: "hidden".to_string(),
            ..ToolQuery::default()
        };
        assert!(filter_tools(&[record], &opts).is_empty());
    }

    #[test]
    fn test_category_filter_and_featured_only() {
        let mut dev = tool("DevKit", true);
        dev.category = "developer".to_string();
        let mut design = tool("Sketch", false);
        design.category = "design".to_string();
        let records = vec![dev, design];

        let opts = ToolQuery {
            category: "developer".to_string(),
            ..ToolQuery::default()
        };
        assert_eq!(filter_tools(&records, &opts).len(), 1);

        let opts = ToolQuery {
            featured_only: true,
            ..ToolQuery::default()
        };
        let hits = filter_tools(&records, &opts);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "DevKit");
    }

    #[test]
    fn test_difficulty_sort_puts_unrecognized_last() {
        let mut a = tool("A", false);
        a.difficulty = "advanced".to_string();
        let mut b = tool("B", false);
        b.difficulty = "Beginner".to_string();
        let mut c = tool("C", false);
        c.difficulty = "mystery".to_string();
        let mut d = tool("D", false);
        d.difficulty = "intermediate".to_string();

        let opts = ToolQuery {
            sort: ToolSort::Difficulty,
            ..ToolQuery::default()
        };
        let sorted = filter_tools(&[a, b, c, d], &opts);
        let names: Vec<&str> = sorted.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["B", "D", "A", "C"]);
    }

    #[test]
    fn test_sort_is_stable_for_tied_keys() {
        let mut first = tool("Zed", false);
        first.difficulty = "beginner".to_string();
        let mut second = tool("Ace", false);
        second.difficulty = "beginner".to_string();

        let opts = ToolQuery {
            sort: ToolSort::Difficulty,
            ..ToolQuery::default()
        };
        let sorted = filter_tools(&[first, second], &opts);
        // Equal rank: input order preserved, no alphabetical tie-break.
        assert_eq!(sorted[0].name, "Zed");
        assert_eq!(sorted[1].name, "Ace");
    }

    #[test]
    fn test_name_sorts() {
        let records = vec![tool("beta", false), tool("Alpha", false)];
        let asc = ToolQuery {
            sort: ToolSort::NameAsc,
            ..ToolQuery::default()
        };
        assert_eq!(filter_tools(&records, &asc)[0].name, "Alpha");
        let desc = ToolQuery {
            sort: ToolSort::NameDesc,
            ..ToolQuery::default()
        };
        assert_eq!(filter_tools(&records, &desc)[0].name, "beta");
    }

    #[test]
    fn test_guide_query_covers_slug_and_content() {
        let guide = Guide {
            title: "Setup".to_string(),
            slug: "first-steps".to_string(),
            content: "install the toolchain".to_string(),
            ..Guide::default()
        };
        assert_eq!(filter_guides(&[guide.clone()], "first-steps").len(), 1);
        assert_eq!(filter_guides(&[guide.clone()], "TOOLCHAIN").len(), 1);
        assert!(filter_guides(&[guide], "missing").is_empty());
    }

    #[test]
    fn test_post_sort_newest_with_missing_date_earliest() {
        let records = vec![
            post("Old", Some("2023-01-10")),
            post("Undated", None),
            post("New", Some("2024-06-01")),
        ];
        let sorted = filter_posts(&records, &PostQuery::default());
        let titles: Vec<&str> = sorted.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["New", "Old", "Undated"]);

        let opts = PostQuery {
            sort: PostSort::Oldest,
            ..PostQuery::default()
        };
        let sorted = filter_posts(&records, &opts);
        let titles: Vec<&str> = sorted.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["Undated", "Old", "New"]);
    }

    #[test]
    fn test_post_title_sorts_and_category_filter() {
        let mut tagged = post("Zulu", Some("2024-01-01"));
        tagged.category = Some("news".to_string());
        let records = vec![tagged, post("Alpha", Some("2024-01-02"))];

        let opts = PostQuery {
            sort: PostSort::TitleAsc,
            ..PostQuery::default()
        };
        assert_eq!(filter_posts(&records, &opts)[0].title, "Alpha");

        let opts = PostQuery {
            category: "news".to_string(),
            ..PostQuery::default()
        };
        let hits = filter_posts(&records, &opts);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "Zulu");
    }

    #[test]
    fn test_unknown_sort_keys_fall_back_to_defaults() {
        assert_eq!(ToolSort::parse("bogus"), ToolSort::Featured);
        assert_eq!(ToolSort::parse("name-desc"), ToolSort::NameDesc);
        assert_eq!(PostSort::parse("bogus"), PostSort::Newest);
        assert_eq!(PostSort::parse("title-desc"), PostSort::TitleDesc);
    }
}
