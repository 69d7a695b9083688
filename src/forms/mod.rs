//! Form-field translation for the admin panel.
//!
//! Drafts carry the fields exactly as the admin forms post them (strings,
//! comma-separated lists, a checkbox bool) and validate on the way into a
//! record. The inverse direction populates a draft from a record for editing.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::errors::AppError;
use crate::models::{BlogPost, Guide, Tool};

/// Derives a URL-safe slug: lowercased, punctuation stripped, whitespace to
/// hyphens, repeated hyphens collapsed.
pub fn slugify(input: &str) -> String {
    let lowered = input.to_lowercase();
    let mut slug = String::with_capacity(lowered.len());
    let mut last_hyphen = false;
    for ch in lowered.trim().chars() {
        let mapped = if ch.is_whitespace() { '-' } else { ch };
        if mapped == '-' {
            if !last_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            last_hyphen = true;
        } else if mapped.is_ascii_lowercase() || mapped.is_ascii_digit() {
            slug.push(mapped);
            last_hyphen = false;
        }
        // Anything else is punctuation: dropped.
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

/// Syntactic check that a link is an absolute http/https URL.
pub fn is_valid_url(raw: &str) -> bool {
    match Url::parse(raw) {
        Ok(url) => matches!(url.scheme(), "http" | "https"),
        Err(_) => false,
    }
}

/// Splits a comma-separated field into trimmed, non-empty items in order.
fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(String::from)
        .collect()
}

fn join_list(items: &[String]) -> String {
    items.join(", ")
}

fn none_if_empty(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Tool form fields as posted by the admin panel.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolDraft {
    pub name: String,
    pub category: String,
    /// Comma-separated platform list.
    pub platforms: String,
    /// Comma-separated tag list.
    pub tags: String,
    pub difficulty: String,
    pub license: String,
    pub icon: String,
    pub download: String,
    pub description: String,
    pub featured: bool,
}

impl ToolDraft {
    /// Validates and builds a record. The repository assigns or fixes the id.
    pub fn into_record(self) -> Result<Tool, AppError> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::Validation("Name is required".to_string()));
        }
        let download = self.download.trim().to_string();
        if download.is_empty() {
            return Err(AppError::Validation("Download URL is required".to_string()));
        }
        if !is_valid_url(&download) {
            return Err(AppError::Validation(
                "Download URL must be http/https".to_string(),
            ));
        }
        Ok(Tool {
            id: 0,
            name,
            category: self.category.trim().to_string(),
            platform: split_list(&self.platforms),
            tags: split_list(&self.tags),
            difficulty: self.difficulty.trim().to_string(),
            license: self.license.trim().to_string(),
            icon: self.icon.trim().to_string(),
            download,
            description: self.description.trim().to_string(),
            featured: self.featured,
        })
    }

    /// Populates form fields from a record (load-for-edit).
    pub fn from_record(tool: &Tool) -> Self {
        Self {
            name: tool.name.clone(),
            category: tool.category.clone(),
            platforms: join_list(&tool.platform),
            tags: join_list(&tool.tags),
            difficulty: tool.difficulty.clone(),
            license: tool.license.clone(),
            icon: tool.icon.clone(),
            download: tool.download.clone(),
            description: tool.description.clone(),
            featured: tool.featured,
        }
    }
}

/// Guide form fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GuideDraft {
    pub title: String,
    pub slug: String,
    pub excerpt: String,
    pub content: String,
}

impl GuideDraft {
    pub fn into_record(self) -> Result<Guide, AppError> {
        let title = self.title.trim().to_string();
        if title.is_empty() {
            return Err(AppError::Validation("Title is required".to_string()));
        }
        let slug = resolve_slug(&self.slug, &title)?;
        Ok(Guide {
            id: 0,
            title,
            slug,
            excerpt: self.excerpt.trim().to_string(),
            content: self.content.trim().to_string(),
        })
    }

    pub fn from_record(guide: &Guide) -> Self {
        Self {
            title: guide.title.clone(),
            slug: guide.slug.clone(),
            excerpt: guide.excerpt.clone(),
            content: guide.content.clone(),
        }
    }
}

/// Blog post form fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PostDraft {
    pub title: String,
    pub slug: String,
    pub excerpt: String,
    pub content: String,
    pub category: String,
    /// ISO date string, optional.
    pub date: String,
    /// Comma-separated tag list.
    pub tags: String,
}

impl PostDraft {
    pub fn into_record(self) -> Result<BlogPost, AppError> {
        let title = self.title.trim().to_string();
        if title.is_empty() {
            return Err(AppError::Validation("Title is required".to_string()));
        }
        let slug = resolve_slug(&self.slug, &title)?;
        Ok(BlogPost {
            id: 0,
            title,
            slug,
            excerpt: self.excerpt.trim().to_string(),
            content: self.content.trim().to_string(),
            category: none_if_empty(&self.category),
            date: none_if_empty(&self.date),
            tags: split_list(&self.tags),
        })
    }

    pub fn from_record(post: &BlogPost) -> Self {
        Self {
            title: post.title.clone(),
            slug: post.slug.clone(),
            excerpt: post.excerpt.clone(),
            content: post.content.clone(),
            category: post.category.clone().unwrap_or_default(),
            date: post.date.clone().unwrap_or_default(),
            tags: join_list(&post.tags),
        }
    }
}

/// An empty slug field derives from the title; a filled one is kept as typed.
fn resolve_slug(raw: &str, title: &str) -> Result<String, AppError> {
    let slug = raw.trim();
    let slug = if slug.is_empty() {
        slugify(title)
    } else {
        slug.to_string()
    };
    if slug.is_empty() {
        return Err(AppError::Validation("Slug is required".to_string()));
    }
    Ok(slug)
}

/// Per-collection edit mode: which record id is being edited, if any, plus
/// the slug field's auto-fill state for the session.
#[derive(Debug, Default)]
pub struct EditSession {
    editing: Option<i64>,
    slug: String,
    slug_touched: bool,
}

impl EditSession {
    pub fn editing(&self) -> Option<i64> {
        self.editing
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    /// Loads an existing record into the form.
    pub fn begin_edit(&mut self, id: i64, slug: &str) {
        self.editing = Some(id);
        self.slug = slug.to_string();
        self.slug_touched = false;
    }

    /// The user typed into the slug field; auto-fill stays off for the rest
    /// of this edit session.
    pub fn set_slug(&mut self, value: &str) {
        self.slug = value.trim().to_string();
        self.slug_touched = true;
    }

    /// A title keystroke. The slug auto-fills only while the field is empty
    /// or the record is new and the user has not taken over.
    pub fn title_changed(&mut self, title: &str) {
        let auto = self.slug.trim().is_empty() || (self.editing.is_none() && !self.slug_touched);
        if auto {
            self.slug = slugify(title);
        }
    }

    /// Saving targets the edited id when in edit mode, otherwise creates.
    pub fn save_target(&self) -> Option<i64> {
        self.editing
    }

    /// Canceling or completing a save always clears edit mode and blanks
    /// the form state.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Edit state for all three admin sections, tracked independently.
#[derive(Debug, Default)]
pub struct AdminForms {
    pub tools: EditSession,
    pub guides: EditSession,
    pub blog: EditSession,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_scenario() {
        assert_eq!(slugify("My First Guide!"), "my-first-guide");
    }

    #[test]
    fn test_slugify_collapses_and_strips() {
        assert_eq!(slugify("  Hello   World  "), "hello-world");
        assert_eq!(slugify("a - b"), "a-b");
        assert_eq!(slugify("C++ & Rust: 101"), "c-rust-101");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn test_url_validation() {
        assert!(is_valid_url("https://example.com/download"));
        assert!(is_valid_url("http://example.com"));
        assert!(!is_valid_url("ftp://example.com/file"));
        assert!(!is_valid_url("example.com/no-scheme"));
        assert!(!is_valid_url(""));
    }

    #[test]
    fn test_tool_draft_round_trip() {
        let draft = ToolDraft {
            name: "  Hexa  ".to_string(),
            category: "developer".to_string(),
            platforms: "Windows, macOS , ,Linux".to_string(),
            tags: "editor,hex".to_string(),
            difficulty: "beginner".to_string(),
            license: "MIT".to_string(),
            icon: "🔧".to_string(),
            download: "https://example.com/hexa".to_string(),
            description: "A hex editor".to_string(),
            featured: true,
        };
        let record = draft.into_record().unwrap();
        assert_eq!(record.name, "Hexa");
        assert_eq!(record.platform, vec!["Windows", "macOS", "Linux"]);
        assert_eq!(record.tags, vec!["editor", "hex"]);
        assert!(record.featured);

        let back = ToolDraft::from_record(&record);
        assert_eq!(back.platforms, "Windows, macOS, Linux");
        assert_eq!(back.tags, "editor, hex");
    }

    #[test]
    fn test_tool_draft_validation() {
        let missing_name = ToolDraft {
            download: "https://example.com".to_string(),
            ..ToolDraft::default()
        };
        assert!(matches!(
            missing_name.into_record(),
            Err(AppError::Validation(_))
        ));

        let missing_url = ToolDraft {
            name: "Named".to_string(),
            ..ToolDraft::default()
        };
        assert!(matches!(
            missing_url.into_record(),
            Err(AppError::Validation(_))
        ));

        let bad_scheme = ToolDraft {
            name: "Named".to_string(),
            download: "ftp://example.com".to_string(),
            ..ToolDraft::default()
        };
        assert!(matches!(
            bad_scheme.into_record(),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_guide_draft_autofills_slug_from_title() {
        let draft = GuideDraft {
            title: "My First Guide!".to_string(),
            ..GuideDraft::default()
        };
        let record = draft.into_record().unwrap();
        assert_eq!(record.slug, "my-first-guide");

        let custom = GuideDraft {
            title: "My First Guide!".to_string(),
            slug: "custom-slug".to_string(),
            ..GuideDraft::default()
        };
        assert_eq!(custom.into_record().unwrap().slug, "custom-slug");
    }

    #[test]
    fn test_guide_draft_requires_title_and_slug() {
        let untitled = GuideDraft::default();
        assert!(matches!(
            untitled.into_record(),
            Err(AppError::Validation(_))
        ));

        // Punctuation-only title derives an empty slug.
        let unsluggable = GuideDraft {
            title: "!!!".to_string(),
            ..GuideDraft::default()
        };
        assert!(matches!(
            unsluggable.into_record(),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_post_draft_optional_fields() {
        let draft = PostDraft {
            title: "Release Notes".to_string(),
            date: "2024-03-01".to_string(),
            tags: "release, changelog".to_string(),
            ..PostDraft::default()
        };
        let record = draft.into_record().unwrap();
        assert_eq!(record.slug, "release-notes");
        assert_eq!(record.category, None);
        assert_eq!(record.date.as_deref(), Some("2024-03-01"));
        assert_eq!(record.tags, vec!["release", "changelog"]);
    }

    #[test]
    fn test_edit_session_autofill_rules() {
        // New record: slug follows the title while untouched.
        let mut session = EditSession::default();
        session.title_changed("First Title");
        assert_eq!(session.slug(), "first-title");
        session.title_changed("Second Title");
        assert_eq!(session.slug(), "second-title");

        // Manual edit stops the auto-fill for the session.
        session.set_slug("hand-picked");
        session.title_changed("Third Title");
        assert_eq!(session.slug(), "hand-picked");

        // Clearing the field brings auto-fill back.
        session.set_slug("");
        session.title_changed("Fourth Title");
        assert_eq!(session.slug(), "fourth-title");
    }

    #[test]
    fn test_edit_session_keeps_existing_slug_when_editing() {
        let mut session = EditSession::default();
        session.begin_edit(42, "existing-slug");
        session.title_changed("Renamed Record");
        assert_eq!(session.slug(), "existing-slug");
        assert_eq!(session.save_target(), Some(42));

        session.clear();
        assert_eq!(session.save_target(), None);
        assert_eq!(session.slug(), "");
    }

    #[test]
    fn test_admin_forms_track_sections_independently() {
        let mut forms = AdminForms::default();
        forms.tools.begin_edit(1, "");
        forms.blog.begin_edit(2, "post");
        assert_eq!(forms.tools.save_target(), Some(1));
        assert_eq!(forms.guides.save_target(), None);
        assert_eq!(forms.blog.save_target(), Some(2));
    }
}
