use crate::types::{AppError, Result};
use regex::Regex;
use std::fs;
use std::path::Path;

/// Ordered `(id, title)` pairs taken from the course README.
///
/// Lines of the form `- Lecture 3: Pointers and arrays` are collected in
/// document order. Ids must run `0, 1, 2, ...` without gaps; the number of
/// entries is the number of resources in the deployment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TitleIndex {
    titles: Vec<String>,
}

impl TitleIndex {
    pub fn from_titles(titles: Vec<String>) -> Self {
        Self { titles }
    }

    pub fn parse(text: &str) -> Result<Self> {
        let pattern = Regex::new(r"(?m)^\s*- Lecture (\d+): (.+?)\s*$")
            .map_err(|e| AppError::Internal(format!("Invalid title pattern: {}", e)))?;

        let mut titles = Vec::new();
        for caps in pattern.captures_iter(text) {
            let id: usize = caps[1]
                .parse()
                .map_err(|e| AppError::Catalog(format!("Bad lecture number '{}': {}", &caps[1], e)))?;
            if id != titles.len() {
                return Err(AppError::Catalog(format!(
                    "Title index is not contiguous: expected lecture {}, found lecture {}",
                    titles.len(),
                    id
                )));
            }
            titles.push(caps[2].to_string());
        }
        Ok(Self { titles })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| {
            AppError::Catalog(format!("Failed to read title index {}: {}", path.display(), e))
        })?;
        Self::parse(&text)
    }

    pub fn len(&self) -> usize {
        self.titles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }

    pub fn title(&self, id: u32) -> Option<&str> {
        self.titles.get(id as usize).map(String::as_str)
    }
}
