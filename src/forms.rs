//! Validation and normalization of submitted forms.
//!
//! Every form reports all failing fields at once and never touches storage;
//! the handlers persist only what a successful `validate` returns.

use std::collections::BTreeMap;

use actix_multipart::form::MultipartForm;
use actix_multipart::form::bytes::Bytes;
use actix_multipart::form::text::Text;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::errors::{AppError, AppResult};
use crate::models::{
    Bug, BugPatch, BugStatus, Category, FixPatch, NewBug, NewContactMessage, NewFix, Severity,
    Subject, UploadedFile, non_blank_lines,
};

pub const REQUIRED: &str = "This field is required.";
pub const INVALID_EMAIL: &str = "Enter a valid email address.";
pub const BUG_NOT_FOUND: &str = "bug not found";

const TITLE_MAX: usize = 200;
const NAME_MAX: usize = 100;
const PHONE_MAX: usize = 20;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)*\.[A-Za-z]{2,63}$")
        .expect("email pattern compiles")
});

pub fn is_valid_email(value: &str) -> bool {
    value.len() <= 320 && !value.contains("..") && EMAIL_RE.is_match(value)
}

/// Field name to its error messages, in field-name order.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct FieldErrors(BTreeMap<&'static str, Vec<String>>);

impl FieldErrors {
    pub fn add<M: Into<String>>(&mut self, field: &'static str, message: M) {
        self.0.entry(field).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.0.keys().copied()
    }
}

#[derive(Default)]
struct Cleaner {
    errors: FieldErrors,
}

impl Cleaner {
    fn required(&mut self, field: &'static str, value: &Option<String>, max_len: Option<usize>) -> String {
        let value = value.as_deref().map(str::trim).unwrap_or_default();
        if value.is_empty() {
            self.errors.add(field, REQUIRED);
            return String::new();
        }
        if let Some(max) = max_len {
            let len = value.chars().count();
            if len > max {
                self.errors.add(
                    field,
                    format!("Ensure this value has at most {} characters (it has {}).", max, len),
                );
            }
        }
        value.to_string()
    }

    fn email(&mut self, field: &'static str, value: &Option<String>) -> String {
        let value = self.required(field, value, None);
        if !value.is_empty() && !is_valid_email(&value) {
            self.errors.add(field, INVALID_EMAIL);
        }
        value
    }

    fn choice<T>(&mut self, field: &'static str, value: &Option<String>, parse: fn(&str) -> Option<T>) -> Option<T> {
        let raw = self.required(field, value, None);
        if raw.is_empty() {
            return None;
        }
        let parsed = parse(&raw);
        if parsed.is_none() {
            self.errors.add(
                field,
                format!("Select a valid choice. {} is not one of the available choices.", raw),
            );
        }
        parsed
    }

    fn finish<F: Serialize>(self, form: &F) -> AppResult<()> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(AppError::validation(self.errors, form))
        }
    }
}

fn optional_text(value: &Option<String>) -> String {
    value.as_deref().map(str::trim).unwrap_or_default().to_string()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContactForm {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub subject: Option<String>,
    pub message: Option<String>,
}

impl ContactForm {
    pub fn validate(&self) -> AppResult<NewContactMessage> {
        let mut c = Cleaner::default();
        let name = c.required("name", &self.name, Some(NAME_MAX));
        let email = c.email("email", &self.email);
        let phone = c.required("phone", &self.phone, Some(PHONE_MAX));
        let subject = c.choice("subject", &self.subject, Subject::parse);
        let message = c.required("message", &self.message, None);
        c.finish(self)?;

        Ok(NewContactMessage {
            name,
            email,
            phone,
            subject: subject.unwrap_or(Subject::General),
            message,
        })
    }
}

/// Combined bug + evidence submission.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BugForm {
    pub bug_title: Option<String>,
    pub bug_description: Option<String>,
    pub bug_severity: Option<String>,
    pub bug_category: Option<String>,
    pub bug_status: Option<String>,
    pub logs: Option<String>,
    pub tools_used: Option<String>,
    pub websites: Option<String>,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    #[serde(skip)]
    pub media_files: Vec<UploadedFile>,
    #[serde(skip)]
    pub code_files: Vec<UploadedFile>,
}

impl BugForm {
    pub fn validate(self) -> AppResult<NewBug> {
        let mut c = Cleaner::default();
        let title = c.required("bug_title", &self.bug_title, Some(TITLE_MAX));
        let description = c.required("bug_description", &self.bug_description, None);
        let severity = c.choice("bug_severity", &self.bug_severity, Severity::parse);
        let category = c.choice("bug_category", &self.bug_category, Category::parse);
        let status = c.choice("bug_status", &self.bug_status, BugStatus::parse);
        let full_name = c.required("full_name", &self.full_name, Some(NAME_MAX));
        let email = c.email("email", &self.email);
        let phone = c.required("phone", &self.phone, Some(PHONE_MAX));
        c.finish(&self)?;

        let websites = self
            .websites
            .as_deref()
            .map(non_blank_lines)
            .unwrap_or_default()
            .into_iter()
            .map(str::to_string)
            .collect();

        Ok(NewBug {
            title,
            description,
            severity: severity.unwrap_or(Severity::Low),
            category: category.unwrap_or_default(),
            status: status.unwrap_or_default(),
            full_name,
            email,
            phone,
            logs: optional_text(&self.logs),
            tools_used: optional_text(&self.tools_used),
            media_files: self.media_files,
            code_files: self.code_files,
            websites,
        })
    }
}

/// Fix submission. Also bound from the query string to prefill the form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FixForm {
    pub bug: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    #[serde(skip)]
    pub evidence_media: Option<UploadedFile>,
    #[serde(skip)]
    pub evidence_code: Option<UploadedFile>,
}

impl FixForm {
    /// The submitted bug reference, if it is a well-formed id.
    pub fn bug_id(&self) -> Option<i64> {
        self.bug.as_deref().and_then(|raw| raw.trim().parse().ok())
    }

    /// `bug` is the result of looking up [`FixForm::bug_id`].
    pub fn validate(self, bug: Option<&Bug>) -> AppResult<NewFix> {
        let mut c = Cleaner::default();
        let bug_id = match (self.bug.as_deref().map(str::trim), bug) {
            (None, _) | (Some(""), _) => {
                c.errors.add("bug", REQUIRED);
                None
            }
            (Some(_), None) => {
                c.errors.add("bug", BUG_NOT_FOUND);
                None
            }
            (Some(_), Some(bug)) => Some(bug.id),
        };
        let description = c.required("description", &self.description, None);
        let status = c.choice("status", &self.status, BugStatus::parse);
        let full_name = c.required("full_name", &self.full_name, Some(NAME_MAX));
        let email = c.email("email", &self.email);
        let phone = c.required("phone", &self.phone, Some(PHONE_MAX));
        c.finish(&self)?;

        Ok(NewFix {
            bug_id: bug_id.unwrap_or_default(),
            description,
            status: status.unwrap_or_default(),
            full_name,
            email,
            phone,
            evidence_media: self.evidence_media,
            evidence_code: self.evidence_code,
        })
    }
}

/// Supplied text fields must not be blank; a supplied email must be valid.
/// Only supplied fields are checked. A blank `full_name` or `email` clears it.
pub fn validate_bug_patch(patch: &BugPatch) -> AppResult<()> {
    let mut c = Cleaner::default();
    if patch.title.is_some() {
        c.required("title", &patch.title, Some(TITLE_MAX));
    }
    if patch.description.is_some() {
        c.required("description", &patch.description, None);
    }
    if patch.phone.is_some() {
        c.required("phone", &patch.phone, Some(PHONE_MAX));
    }
    if patch.email.as_deref().is_some_and(|v| !v.trim().is_empty()) {
        c.email("email", &patch.email);
    }
    c.finish(patch)
}

pub fn validate_fix_patch(patch: &FixPatch) -> AppResult<()> {
    let mut c = Cleaner::default();
    if patch.description.is_some() {
        c.required("description", &patch.description, None);
    }
    if patch.phone.is_some() {
        c.required("phone", &patch.phone, Some(PHONE_MAX));
    }
    if patch.email.as_deref().is_some_and(|v| !v.trim().is_empty()) {
        c.email("email", &patch.email);
    }
    c.finish(patch)
}

#[derive(MultipartForm)]
pub struct BugUpload {
    pub bug_title: Option<Text<String>>,
    pub bug_description: Option<Text<String>>,
    pub bug_severity: Option<Text<String>>,
    pub bug_category: Option<Text<String>>,
    pub bug_status: Option<Text<String>>,
    pub logs: Option<Text<String>>,
    pub tools_used: Option<Text<String>>,
    pub websites: Option<Text<String>>,
    pub full_name: Option<Text<String>>,
    pub email: Option<Text<String>>,
    pub phone: Option<Text<String>>,
    pub media_files: Vec<Bytes>,
    pub code_files: Vec<Bytes>,
}

impl From<BugUpload> for BugForm {
    fn from(upload: BugUpload) -> Self {
        Self {
            bug_title: text(upload.bug_title),
            bug_description: text(upload.bug_description),
            bug_severity: text(upload.bug_severity),
            bug_category: text(upload.bug_category),
            bug_status: text(upload.bug_status),
            logs: text(upload.logs),
            tools_used: text(upload.tools_used),
            websites: text(upload.websites),
            full_name: text(upload.full_name),
            email: text(upload.email),
            phone: text(upload.phone),
            media_files: upload.media_files.into_iter().filter_map(file).collect(),
            code_files: upload.code_files.into_iter().filter_map(file).collect(),
        }
    }
}

#[derive(MultipartForm)]
pub struct FixUpload {
    pub bug: Option<Text<String>>,
    pub description: Option<Text<String>>,
    pub status: Option<Text<String>>,
    pub full_name: Option<Text<String>>,
    pub email: Option<Text<String>>,
    pub phone: Option<Text<String>>,
    pub evidence_media: Option<Bytes>,
    pub evidence_code: Option<Bytes>,
}

impl From<FixUpload> for FixForm {
    fn from(upload: FixUpload) -> Self {
        Self {
            bug: text(upload.bug),
            description: text(upload.description),
            status: text(upload.status),
            full_name: text(upload.full_name),
            email: text(upload.email),
            phone: text(upload.phone),
            evidence_media: upload.evidence_media.and_then(file),
            evidence_code: upload.evidence_code.and_then(file),
        }
    }
}

fn text(field: Option<Text<String>>) -> Option<String> {
    field.map(Text::into_inner)
}

/// Browsers send an empty, unnamed part for an untouched file input.
fn file(part: Bytes) -> Option<UploadedFile> {
    let file_name = part.file_name.unwrap_or_default();
    if file_name.is_empty() && part.data.is_empty() {
        return None;
    }
    Some(UploadedFile {
        file_name,
        data: part.data.to_vec(),
    })
}
