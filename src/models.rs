use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A `(value, label)` pair used to populate selection inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Choice {
    pub value: &'static str,
    pub label: &'static str,
}

macro_rules! choice_enum {
    ($(#[$meta:meta])* $name:ident { $($(#[$vmeta:meta])* $variant:ident => ($value:literal, $label:literal)),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
        #[serde(rename_all = "snake_case")]
        #[sqlx(type_name = "TEXT", rename_all = "snake_case")]
        pub enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $value),+
                }
            }

            pub fn label(&self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }

            pub fn parse(value: &str) -> Option<Self> {
                match value {
                    $($value => Some($name::$variant),)+
                    _ => None,
                }
            }

            pub fn choices() -> Vec<Choice> {
                Self::ALL
                    .iter()
                    .map(|c| Choice { value: c.as_str(), label: c.label() })
                    .collect()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

choice_enum!(Severity {
    Low => ("low", "Low"),
    Medium => ("medium", "Medium"),
    High => ("high", "High"),
    Critical => ("critical", "Critical"),
});

choice_enum!(
    #[derive(Default)]
    Category {
        Ui => ("ui", "UI"),
        Backend => ("backend", "Backend"),
        Performance => ("performance", "Performance"),
        Security => ("security", "Security"),
        #[default]
        Other => ("other", "Other"),
    }
);

choice_enum!(
    #[derive(Default)]
    BugStatus {
        #[default]
        Open => ("open", "Open"),
        InProgress => ("in_progress", "In Progress"),
        Resolved => ("resolved", "Resolved"),
        Closed => ("closed", "Closed"),
    }
);

choice_enum!(Subject {
    General => ("general", "General Inquiry"),
    Bug => ("bug", "Report a Bug"),
    Tool => ("tool", "Tool Suggestion"),
    Media => ("media", "Media Inquiry"),
    Other => ("other", "Other"),
});

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Bug {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub severity: Severity,
    pub category: Category,
    pub status: BugStatus,
    pub created_at: DateTime<Utc>,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: String,
    pub splab_number: Option<String>,
    pub logs: String,
    pub tools_used: String,
}

impl Bug {
    pub fn log_entries(&self) -> Vec<&str> {
        non_blank_lines(&self.logs)
    }

    pub fn tools(&self) -> Vec<&str> {
        non_blank_lines(&self.tools_used)
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct BugMedia {
    pub id: i64,
    pub bug_id: i64,
    pub file: String,
    pub uploaded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct BugCodeFile {
    pub id: i64,
    pub bug_id: i64,
    pub file: String,
    pub uploaded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct BugWebsite {
    pub id: i64,
    pub bug_id: i64,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct SuccessfulFixed {
    pub id: i64,
    pub bug_id: i64,
    pub splf_number: Option<String>,
    pub description: String,
    pub fixed_at: DateTime<Utc>,
    pub evidence_media: Option<String>,
    pub evidence_code: Option<String>,
    /// Mirror of the parent bug's category, rewritten on every save.
    pub category: Category,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: String,
}

/// A fix joined with the bug it resolves.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct FixWithBug {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub fix: SuccessfulFixed,
    pub bug_title: String,
    pub bug_splab_number: Option<String>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ContactMessage {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub subject: Subject,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

/// A bug with all of its evidence and fixes.
#[derive(Debug, Serialize)]
pub struct BugDetail {
    #[serde(flatten)]
    pub bug: Bug,
    pub log_entries: Vec<String>,
    pub tools: Vec<String>,
    pub media_files: Vec<BugMedia>,
    pub code_files: Vec<BugCodeFile>,
    pub websites: Vec<BugWebsite>,
    pub successful_fixes: Vec<SuccessfulFixed>,
}

/// A fully buffered uploaded file.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct NewBug {
    pub title: String,
    pub description: String,
    pub severity: Severity,
    pub category: Category,
    pub status: BugStatus,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub logs: String,
    pub tools_used: String,
    pub media_files: Vec<UploadedFile>,
    pub code_files: Vec<UploadedFile>,
    pub websites: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct NewFix {
    pub bug_id: i64,
    pub description: String,
    pub status: BugStatus,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub evidence_media: Option<UploadedFile>,
    pub evidence_code: Option<UploadedFile>,
}

#[derive(Debug, Clone)]
pub struct NewContactMessage {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub subject: Subject,
    pub message: String,
}

/// Administrative edit of a bug. `None` leaves the column untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BugPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub severity: Option<Severity>,
    pub category: Option<Category>,
    pub status: Option<BugStatus>,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub logs: Option<String>,
    pub tools_used: Option<String>,
}

/// Administrative edit of a fix. The category is never part of it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FixPatch {
    pub description: Option<String>,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginPayload {
    pub username: String,
    pub password: String,
}

pub fn non_blank_lines(text: &str) -> Vec<&str> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect()
}
