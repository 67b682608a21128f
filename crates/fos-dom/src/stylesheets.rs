//! Style sheet list
//!
//! The document only tracks sheet titles and their disabled flag; parsing
//! and cascade live in the style engine.

use crate::Document;

/// A sheet as seen by the document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleSheet {
    /// Alternate style sheet set name, if any
    pub title: Option<String>,
    pub disabled: bool,
    /// Where the sheet came from (`href`), empty for inline sheets
    pub href: String,
}

impl StyleSheet {
    pub fn new(title: Option<&str>) -> Self {
        Self {
            title: title.filter(|t| !t.is_empty()).map(str::to_string),
            disabled: false,
            href: String::new(),
        }
    }

    pub fn with_href(mut self, href: &str) -> Self {
        self.href = href.to_string();
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct StyleSheetList {
    sheets: Vec<StyleSheet>,
}

impl StyleSheetList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, sheet: StyleSheet) -> usize {
        self.sheets.push(sheet);
        self.sheets.len() - 1
    }

    pub fn len(&self) -> usize {
        self.sheets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&StyleSheet> {
        self.sheets.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &StyleSheet> {
        self.sheets.iter()
    }

    /// Distinct titles in first-seen order
    pub fn titles(&self) -> Vec<String> {
        let mut titles: Vec<String> = Vec::new();
        for title in self.sheets.iter().filter_map(|s| s.title.as_ref()) {
            if !titles.contains(title) {
                titles.push(title.clone());
            }
        }
        titles
    }

    /// Enable the sheets titled `name`, disable the other titled ones.
    /// Untitled sheets are left alone.
    fn enable_set(&mut self, name: &str) {
        for sheet in &mut self.sheets {
            if let Some(title) = &sheet.title {
                sheet.disabled = title != name;
            }
        }
    }
}

impl Document {
    pub fn style_sheets(&self) -> &StyleSheetList {
        &self.style_sheets
    }

    /// Register a sheet with the document. The first titled sheet fixes
    /// the preferred set when none was declared.
    pub fn add_style_sheet(&mut self, sheet: StyleSheet) -> usize {
        if self.preferred_style_sheet_set.is_none() {
            self.preferred_style_sheet_set = sheet.title.clone();
        }
        self.style_sheets.push(sheet)
    }

    /// Switch to the alternate style sheet set `name`
    pub fn enable_style_sheets_for_set(&mut self, name: &str) {
        tracing::debug!(set = name, "enabling style sheet set");
        self.style_sheets.enable_set(name);
        self.selected_style_sheet_set = Some(name.to_string());
        self.last_style_sheet_set = Some(name.to_string());
    }

    pub fn style_sheet_sets(&self) -> Vec<String> {
        self.style_sheets.titles()
    }

    pub fn preferred_style_sheet_set(&self) -> Option<&str> {
        self.preferred_style_sheet_set.as_deref()
    }

    pub fn selected_style_sheet_set(&self) -> Option<&str> {
        self.selected_style_sheet_set.as_deref()
    }

    pub fn last_style_sheet_set(&self) -> Option<&str> {
        self.last_style_sheet_set.as_deref()
    }

    /// Select a set by name. Names that match no sheet title are ignored.
    pub fn set_selected_style_sheet_set(&mut self, name: &str) {
        if self.style_sheets.iter().any(|s| s.title.as_deref() == Some(name)) {
            self.enable_style_sheets_for_set(name);
        }
    }
}
