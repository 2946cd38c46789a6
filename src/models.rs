use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};

pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

// --- Jobs ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    #[default]
    Applying,
    Applied,
    Interviewing,
    Rejected,
    Ghosted,
}

impl JobStatus {
    pub const ALL: [JobStatus; 5] = [
        JobStatus::Applying,
        JobStatus::Applied,
        JobStatus::Interviewing,
        JobStatus::Rejected,
        JobStatus::Ghosted,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Applying => "applying",
            JobStatus::Applied => "applied",
            JobStatus::Interviewing => "interviewing",
            JobStatus::Rejected => "rejected",
            JobStatus::Ghosted => "ghosted",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for JobStatus {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        JobStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| StoreError::Invalid(format!("unknown job status '{}'", s)))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub status: JobStatus,
    #[serde(default)]
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Job {
    /// Builds a fresh job record. The title must contain something other than whitespace.
    pub fn new(
        title: &str,
        description: &str,
        url: &str,
        status: JobStatus,
        notes: &str,
    ) -> StoreResult<Self> {
        let title = title.trim();
        if title.is_empty() {
            return Err(StoreError::Invalid("job title must not be empty".to_string()));
        }
        let now = Utc::now();
        Ok(Self {
            id: new_id(),
            title: title.to_string(),
            description: description.to_string(),
            url: url.to_string(),
            status,
            notes: notes.to_string(),
            created_at: now,
            updated_at: now,
        })
    }
}

/// Partial job fields; `None` leaves the stored value alone.
#[derive(Debug, Clone, Default)]
pub struct JobUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    pub status: Option<JobStatus>,
    pub notes: Option<String>,
}

impl JobUpdate {
    pub fn status(status: JobStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.url.is_none()
            && self.status.is_none()
            && self.notes.is_none()
    }

    pub fn validate(&self) -> StoreResult<()> {
        match &self.title {
            Some(title) if title.trim().is_empty() => {
                Err(StoreError::Invalid("job title must not be empty".to_string()))
            }
            _ => Ok(()),
        }
    }

    pub fn apply(&self, job: &mut Job, now: DateTime<Utc>) {
        if let Some(title) = &self.title {
            job.title = title.trim().to_string();
        }
        if let Some(description) = &self.description {
            job.description = description.clone();
        }
        if let Some(url) = &self.url {
            job.url = url.clone();
        }
        if let Some(status) = self.status {
            job.status = status;
        }
        if let Some(notes) = &self.notes {
            job.notes = notes.clone();
        }
        // Never let a skewed clock move updatedAt behind createdAt.
        job.updated_at = now.max(job.created_at);
    }
}

// --- Tags ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TagColor {
    Blue,
    Green,
    Yellow,
    Red,
    Purple,
    Orange,
    Cyan,
    Lime,
    Pink,
    Gray,
}

impl TagColor {
    pub const PALETTE: [TagColor; 10] = [
        TagColor::Blue,
        TagColor::Green,
        TagColor::Yellow,
        TagColor::Red,
        TagColor::Purple,
        TagColor::Orange,
        TagColor::Cyan,
        TagColor::Lime,
        TagColor::Pink,
        TagColor::Gray,
    ];

    pub fn hex(&self) -> &'static str {
        match self {
            TagColor::Blue => "#3B82F6",
            TagColor::Green => "#10B981",
            TagColor::Yellow => "#F59E0B",
            TagColor::Red => "#EF4444",
            TagColor::Purple => "#8B5CF6",
            TagColor::Orange => "#F97316",
            TagColor::Cyan => "#06B6D4",
            TagColor::Lime => "#84CC16",
            TagColor::Pink => "#EC4899",
            TagColor::Gray => "#6B7280",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            TagColor::Blue => "blue",
            TagColor::Green => "green",
            TagColor::Yellow => "yellow",
            TagColor::Red => "red",
            TagColor::Purple => "purple",
            TagColor::Orange => "orange",
            TagColor::Cyan => "cyan",
            TagColor::Lime => "lime",
            TagColor::Pink => "pink",
            TagColor::Gray => "gray",
        }
    }
}

impl FromStr for TagColor {
    type Err = StoreError;

    /// Accepts either the palette hex code or the color name, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        TagColor::PALETTE
            .into_iter()
            .find(|color| color.hex().eq_ignore_ascii_case(s) || color.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| StoreError::Invalid(format!("'{}' is not a palette color", s)))
    }
}

impl TryFrom<String> for TagColor {
    type Error = StoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TagColor> for String {
    fn from(color: TagColor) -> Self {
        color.hex().to_string()
    }
}

impl fmt::Display for TagColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.hex())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    pub id: String,
    pub name: String,
    pub color: TagColor,
    pub created_at: DateTime<Utc>,
}

impl Tag {
    pub fn new(name: &str, color: TagColor) -> StoreResult<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StoreError::Invalid("tag name must not be empty".to_string()));
        }
        Ok(Self {
            id: new_id(),
            name: name.to_string(),
            color,
            created_at: Utc::now(),
        })
    }
}

// --- Resumes ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResumeFileType {
    Pdf,
    Docx,
    Doc,
    Txt,
}

impl ResumeFileType {
    pub const SUPPORTED: [ResumeFileType; 4] = [
        ResumeFileType::Pdf,
        ResumeFileType::Docx,
        ResumeFileType::Doc,
        ResumeFileType::Txt,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResumeFileType::Pdf => "pdf",
            ResumeFileType::Docx => "docx",
            ResumeFileType::Doc => "doc",
            ResumeFileType::Txt => "txt",
        }
    }

    /// Maps a file extension (with or without the leading dot) to a supported type.
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.trim_start_matches('.');
        ResumeFileType::SUPPORTED
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(ext))
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }
}

impl fmt::Display for ResumeFileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resume {
    pub id: String,
    pub title: String,
    pub file_name: String,
    pub file_path: String, // absolute, inside the selected folder
    pub file_type: ResumeFileType,
    #[serde(default)]
    pub tag_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A resume before it has been given an id and timestamps.
#[derive(Debug, Clone, PartialEq)]
pub struct NewResume {
    pub title: String,
    pub file_name: String,
    pub file_path: String,
    pub file_type: ResumeFileType,
    pub tag_id: Option<String>,
}

impl NewResume {
    pub fn into_resume(self, now: DateTime<Utc>) -> Resume {
        Resume {
            id: new_id(),
            title: self.title,
            file_name: self.file_name,
            file_path: self.file_path,
            file_type: self.file_type,
            tag_id: self.tag_id,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ResumeUpdate {
    pub title: Option<String>,
    /// `Some(None)` clears the tag.
    pub tag_id: Option<Option<String>>,
}

impl ResumeUpdate {
    pub fn apply(&self, resume: &mut Resume, now: DateTime<Utc>) {
        if let Some(title) = &self.title {
            resume.title = title.trim().to_string();
        }
        if let Some(tag_id) = &self.tag_id {
            resume.tag_id = tag_id.clone();
        }
        resume.updated_at = now.max(resume.created_at);
    }
}

/// The whole persisted resume document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeDocument {
    #[serde(default)]
    pub resumes: Vec<Resume>,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub selected_folder: Option<String>,
}

/// A candidate file found by a folder scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectedFile {
    pub file_name: String,
    pub display_name: String,
    pub file_path: String,
    pub file_type: ResumeFileType,
    pub size: u64,
    pub modified_date: DateTime<Utc>,
}

impl DetectedFile {
    pub fn to_new_resume(&self) -> NewResume {
        NewResume {
            title: self.display_name.clone(),
            file_name: self.file_name.clone(),
            file_path: self.file_path.clone(),
            file_type: self.file_type,
            tag_id: None,
        }
    }
}

/// "My_Resume_2024.pdf" -> "My Resume 2024"
pub fn display_name(file_name: &str) -> String {
    let stem = match file_name.rfind('.') {
        Some(idx) if idx > 0 => &file_name[..idx],
        _ => file_name,
    };
    stem.replace('_', " ")
}
