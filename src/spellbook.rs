use fnv::FnvHashMap;
use tracing::debug;
use crate::error::{Error, Result};
use crate::spell::check::match_kind;
use crate::spell::level::{self, Options, Outcome};
use crate::spell::{tree, Rule};

/// Name of the page evaluation starts from.
pub const ROOT_PAGE: &str = "";

/// A set of rules, grouped in named pages.
///
/// Rules are appended once while the spellbook is built and only read
/// afterwards, so a spellbook can be shared freely between threads.
#[derive(Debug, Clone, Default)]
pub struct Spellbook {
    pages: FnvHashMap<String, Vec<Rule>>,
}

impl Spellbook {
    pub fn new() -> Spellbook {
        Spellbook::default()
    }

    /// Appends a rule to the given page, creating the page if needed.
    pub fn add_rule(&mut self, page: &str, rule: Rule) {
        self.pages.entry(page.to_string()).or_insert_with(Vec::new).push(rule);
    }

    /// Rules of a page, in declaration order.
    pub fn page(&self, name: &str) -> Option<&[Rule]> {
        self.pages.get(name).map(|rules| rules.as_slice())
    }

    /// Names of all pages, sorted.
    pub fn pages(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.pages.keys().map(|k| k.as_str()).collect();
        names.sort();
        names
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Checks that every rule below level 0 has a parent it can descend
    /// from. A rule that fails this can never be evaluated.
    pub fn validate(&self) -> Result<()> {
        for name in self.pages() {
            let rules = &self.pages[name];
            if let Some(&index) = tree::orphans(rules).first() {
                return Err(Error::OrphanRule {
                    page: name.to_string(),
                    index: index,
                    level: rules[index].level,
                });
            }
        }
        Ok(())
    }

    /// Evaluates a page (the root page if `None`) against `buffer`.
    pub fn identify_with(&self, page: Option<&str>, buffer: &[u8], options: &Options) -> Result<Outcome> {
        let name = page.unwrap_or(ROOT_PAGE);
        let rules = match self.pages.get(name) {
            Some(rules) => rules,
            None => return Err(Error::UnknownPage(name.to_string())),
        };

        let outcome = level::evaluate(rules, buffer, options, match_kind)?;
        debug!(page = name, len = buffer.len(), matched = outcome.matched, "page evaluated");
        Ok(outcome)
    }

    /// Description of `buffer` according to a page, or `None` if no level 0
    /// rule matched.
    pub fn identify(&self, page: Option<&str>, buffer: &[u8]) -> Result<Option<Vec<u8>>> {
        let outcome = self.identify_with(page, buffer, &Options::default())?;
        if !outcome.matched {
            return Ok(None);
        }
        Ok(Some(outcome.description))
    }
}

/// Same as `Spellbook::identify`.
pub fn identify(spellbook: &Spellbook, page: Option<&str>, buffer: &[u8]) -> Result<Option<Vec<u8>>> {
    spellbook.identify(page, buffer)
}
