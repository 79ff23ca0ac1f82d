//! A page's driver field paired with the rule table that governs it

use super::effect::ControlId;
use super::table::RuleTable;

/// One driver field and its rules, as declared for a page
#[derive(Debug, Clone)]
pub struct Page {
    pub name: String,
    pub driver: ControlId,
    pub rules: RuleTable,
}

impl Page {
    pub fn new(name: impl Into<String>, driver: impl Into<ControlId>, rules: RuleTable) -> Self {
        Self {
            name: name.into(),
            driver: driver.into(),
            rules,
        }
    }
}

/// Named pages in declaration order
#[derive(Debug, Clone, Default)]
pub struct PageSet {
    pages: Vec<Page>,
}

impl PageSet {
    pub fn new(pages: Vec<Page>) -> Self {
        let mut set = Self::default();
        set.extend(pages);
        set
    }

    pub fn get(&self, name: &str) -> Option<&Page> {
        self.pages.iter().find(|p| p.name == name)
    }

    /// Add pages, replacing any existing page of the same name in place
    pub fn extend(&mut self, pages: impl IntoIterator<Item = Page>) {
        for page in pages {
            match self.pages.iter_mut().find(|p| p.name == page.name) {
                Some(existing) => *existing = page,
                None => self.pages.push(page),
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Page> {
        self.pages.iter()
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}
