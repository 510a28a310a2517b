//! Resources: the lecture material each specialist is bound to
//!
//! A deployment has a fixed, contiguous range of resource ids `0..count`.
//! Each id also belongs to a category (the language a lecture teaches),
//! which is a pure function of the sub-range it falls in.
//!
//! Content comes from a [`ResourceLoader`]. [`DirectoryLoader`] reads the
//! usual course checkout layout:
//!
//! ```text
//! <root>/l0/lecture.md
//! <root>/l1/slides.tex
//! <root>/l1/img/...
//! ```

use crate::types::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// A named, inclusive sub-range of resource ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRange {
    pub name: String,
    pub first: u32,
    pub last: u32,
}

impl CategoryRange {
    pub fn new(name: impl Into<String>, first: u32, last: u32) -> Self {
        Self {
            name: name.into(),
            first,
            last,
        }
    }

    pub fn contains(&self, id: u32) -> bool {
        self.first <= id && id <= self.last
    }
}

/// The id space of a deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceLayout {
    count: u32,
    categories: Vec<CategoryRange>,
}

impl ResourceLayout {
    pub fn new(count: u32, categories: Vec<CategoryRange>) -> Self {
        Self { count, categories }
    }

    /// Number of resources.
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Whether `id` names a resource. Accepts raw model output, so it is signed.
    pub fn is_valid(&self, id: i64) -> bool {
        id >= 0 && id < i64::from(self.count)
    }

    /// All valid ids in ascending order.
    pub fn ids(&self) -> std::ops::Range<u32> {
        0..self.count
    }

    /// Inclusive `(first, last)` bounds, or `None` for an empty layout.
    pub fn bounds(&self) -> Option<(u32, u32)> {
        self.count.checked_sub(1).map(|last| (0, last))
    }

    /// Category of a valid id; the first matching sub-range wins.
    pub fn category(&self, id: u32) -> Option<&str> {
        if !self.is_valid(i64::from(id)) {
            return None;
        }
        self.categories
            .iter()
            .find(|c| c.contains(id))
            .map(|c| c.name.as_str())
    }

    /// Human-readable description of the valid range, e.g. `0-28`.
    pub fn describe_range(&self) -> String {
        match self.bounds() {
            Some((first, last)) => format!("{}-{}", first, last),
            None => "none".to_string(),
        }
    }

    /// What the coordinator model is told when it names an unknown id.
    pub fn invalid_id_message(&self, id: i64) -> String {
        format!(
            "{} is not a valid lecture number. Valid numbers are {}.",
            id,
            self.describe_range()
        )
    }

    /// Human-readable category summary, e.g. `0-10 are C, 11-28 are C++`.
    pub fn describe_categories(&self) -> String {
        self.categories
            .iter()
            .map(|c| format!("{}-{} are {}", c.first, c.last, c.name))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// One loaded unit of source content. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    pub id: u32,
    pub category: Option<String>,
    pub content: String,
    /// Absolute location of auxiliary media (images), if the resource has any.
    pub media_dir: Option<PathBuf>,
}

impl Resource {
    pub fn has_media(&self) -> bool {
        self.media_dir.is_some()
    }
}

/// Source of resource content.
pub trait ResourceLoader: Send + Sync {
    fn load(&self, id: u32) -> Result<Resource>;
}

/// Loads resources from `<root>/l<id>/`.
pub struct DirectoryLoader {
    root: PathBuf,
    layout: ResourceLayout,
}

impl DirectoryLoader {
    pub fn new(root: impl Into<PathBuf>, layout: ResourceLayout) -> Self {
        Self {
            root: root.into(),
            layout,
        }
    }

    pub fn resource_dir(&self, id: u32) -> PathBuf {
        self.root.join(format!("l{}", id))
    }

    /// The single `.md` file of a resource folder, else the single `.tex` file.
    fn main_file(dir: &Path) -> Result<PathBuf> {
        for extension in ["md", "tex"] {
            let mut matches = files_with_extension(dir, extension)?;
            match matches.len() {
                0 => continue,
                1 => return Ok(matches.remove(0)),
                _ => {
                    return Err(AppError::Resource(format!(
                        "Multiple .{} files found in {}",
                        extension,
                        dir.display()
                    )))
                }
            }
        }
        Err(AppError::Resource(format!(
            "No .md or .tex files found in {}",
            dir.display()
        )))
    }

    fn media_dir(dir: &Path) -> Option<PathBuf> {
        ["img", "image"]
            .iter()
            .map(|name| dir.join(name))
            .find(|candidate| candidate.exists())
            .map(|_| fs::canonicalize(dir).unwrap_or_else(|_| dir.to_path_buf()))
    }
}

fn files_with_extension(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir)
        .map_err(|e| AppError::Resource(format!("Failed to read {}: {}", dir.display(), e)))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry
            .map_err(|e| AppError::Resource(format!("Failed to read {}: {}", dir.display(), e)))?
            .path();
        if path.is_file() && path.extension().and_then(|e| e.to_str()) == Some(extension) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

impl ResourceLoader for DirectoryLoader {
    fn load(&self, id: u32) -> Result<Resource> {
        if !self.layout.is_valid(i64::from(id)) {
            return Err(AppError::InvalidInput(
                self.layout.invalid_id_message(i64::from(id)),
            ));
        }

        let dir = self.resource_dir(id);
        let main_file = Self::main_file(&dir)?;
        let content = fs::read_to_string(&main_file).map_err(|e| {
            AppError::Resource(format!("Failed to read {}: {}", main_file.display(), e))
        })?;

        Ok(Resource {
            id,
            category: self.layout.category(id).map(str::to_string),
            content,
            media_dir: Self::media_dir(&dir),
        })
    }
}
