//! Navigation tree construction.
//!
//! # Data Flow
//! ```text
//! pages (flat, parent by name)
//!     → MenuIndex::new       (pass 1: name index, parent → children, cycle check)
//!     → MenuIndex::tree      (pass 2: depth-first from roots, per language)
//!     → NavEntry             (immutable snapshot)
//! ```
//!
//! # Design Decisions
//! - A page whose parent does not exist is left out, as is its subtree
//! - A parent cycle is reported as `MenuError::Cycle`; its pages are left out
//! - The builder fixes structure only; display order comes from `sorted_children`

use std::collections::{BTreeMap, HashMap};

use crate::site::catalog::MessageResolver;
use crate::site::model::Page;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MenuError {
    #[error("pages form a parent cycle: {}", .pages.join(" -> "))]
    Cycle { pages: Vec<String> },
}

/// How hrefs are written for the language being rendered.
#[derive(Debug, Clone, Copy)]
pub struct LinkStyle<'a> {
    pub language: &'a str,
    pub default_language: &'a str,
}

impl LinkStyle<'_> {
    pub fn href(&self, path: &str) -> String {
        if self.language == self.default_language {
            return path.to_string();
        }
        if path == "/" {
            format!("/{}/", self.language)
        } else {
            format!("/{}{}", self.language, path)
        }
    }
}

/// One node of the navigation tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavEntry {
    /// Page name; empty for the synthetic root.
    pub name: String,
    pub label: String,
    pub href: String,
    pub weight: i32,
    pub icon: Option<String>,
    /// Children keyed by their configured label.
    pub children: BTreeMap<String, NavEntry>,
}

impl NavEntry {
    /// Children in display order: weight, then label.
    pub fn sorted_children(&self) -> Vec<&NavEntry> {
        let mut children: Vec<&NavEntry> = self.children.values().collect();
        children.sort_by(|a, b| a.weight.cmp(&b.weight).then_with(|| a.label.cmp(&b.label)));
        children
    }

    pub fn find(&self, name: &str) -> Option<&NavEntry> {
        if self.name == name {
            return Some(self);
        }
        self.children.values().find_map(|c| c.find(name))
    }

    /// Entries from the top level down to `name`, inclusive. Empty if absent.
    pub fn trail(&self, name: &str) -> Vec<&NavEntry> {
        let mut trail = Vec::new();
        for child in self.children.values() {
            if child.collect_trail(name, &mut trail) {
                break;
            }
        }
        trail
    }

    fn collect_trail<'a>(&'a self, name: &str, trail: &mut Vec<&'a NavEntry>) -> bool {
        trail.push(self);
        if self.name == name || self.children.values().any(|c| c.collect_trail(name, trail)) {
            return true;
        }
        trail.pop();
        false
    }

    pub fn len(&self) -> usize {
        self.children.values().map(|c| 1 + c.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

/// Parent/child index over a page snapshot.
#[derive(Debug)]
pub struct MenuIndex<'p> {
    pages: &'p [Page],
    roots: Vec<usize>,
    children: Vec<Vec<usize>>,
    errors: Vec<MenuError>,
}

impl<'p> MenuIndex<'p> {
    pub fn new(pages: &'p [Page]) -> Self {
        let by_name: HashMap<&str, usize> = pages
            .iter()
            .enumerate()
            .map(|(i, p)| (p.name.as_str(), i))
            .collect();
        let parent_of = |i: usize| -> Option<usize> {
            pages[i].parent.as_deref().and_then(|p| by_name.get(p).copied())
        };

        let mut roots = Vec::new();
        let mut children = vec![Vec::new(); pages.len()];
        for (i, page) in pages.iter().enumerate() {
            match page.parent.as_deref() {
                None => roots.push(i),
                Some(parent) if parent == page.name => {}
                Some(_) => {
                    if let Some(p) = parent_of(i) {
                        children[p].push(i);
                    }
                }
            }
        }

        // Walk each ancestry once; a node seen twice on the same walk closes a cycle.
        let mut errors = Vec::new();
        let mut settled = vec![false; pages.len()];
        for start in 0..pages.len() {
            let mut trail: Vec<usize> = Vec::new();
            let mut position: HashMap<usize, usize> = HashMap::new();
            let mut current = Some(start);
            while let Some(node) = current {
                if settled[node] {
                    break;
                }
                if let Some(&at) = position.get(&node) {
                    let mut cycle = trail[at..].to_vec();
                    let min = (0..cycle.len()).min_by_key(|&k| cycle[k]).unwrap_or(0);
                    cycle.rotate_left(min);
                    errors.push(MenuError::Cycle {
                        pages: cycle.iter().map(|&k| pages[k].name.clone()).collect(),
                    });
                    break;
                }
                position.insert(node, trail.len());
                trail.push(node);
                current = parent_of(node);
            }
            for node in trail {
                settled[node] = true;
            }
        }

        Self {
            pages,
            roots,
            children,
            errors,
        }
    }

    pub fn errors(&self) -> &[MenuError] {
        &self.errors
    }

    /// Build the tree for one language.
    pub fn tree(&self, style: LinkStyle<'_>, messages: &dyn MessageResolver) -> NavEntry {
        let mut root = NavEntry {
            href: style.href("/"),
            ..NavEntry::default()
        };
        for &i in &self.roots {
            let entry = self.entry(i, style, messages);
            root.children.insert(self.pages[i].label().to_string(), entry);
        }
        root
    }

    fn entry(&self, i: usize, style: LinkStyle<'_>, messages: &dyn MessageResolver) -> NavEntry {
        let page = &self.pages[i];
        let mut entry = NavEntry {
            name: page.name.clone(),
            label: messages.message(page.label()).into_owned(),
            href: style.href(&page.path),
            weight: page.nav.weight,
            icon: page.nav.icon.clone(),
            children: BTreeMap::new(),
        };
        for &c in &self.children[i] {
            let child = self.entry(c, style, messages);
            entry.children.insert(self.pages[c].label().to_string(), child);
        }
        entry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::site::catalog::Catalog;
    use crate::site::model::TranslationResource;

    const EN: LinkStyle<'static> = LinkStyle {
        language: "en",
        default_language: "en",
    };

    fn build(pages: &[Page]) -> (NavEntry, Vec<MenuError>) {
        let catalog = Catalog::default();
        let index = MenuIndex::new(pages);
        (index.tree(EN, &catalog.localized("en")), index.errors().to_vec())
    }

    #[test]
    fn test_roots_and_children() {
        let pages = vec![
            Page::new("about", "/about"),
            Page::new("home", "/"),
            Page::new("team", "/about/team").with_parent("about"),
        ];
        let (root, errors) = build(&pages);
        assert!(errors.is_empty());
        assert_eq!(root.children.len(), 2);
        assert_eq!(root.len(), 3);

        let about = root.find("about").unwrap();
        assert_eq!(about.children["team"].href, "/about/team");
        assert_eq!(about.weight, 0);
        assert!(about.icon.is_none());

        let trail: Vec<&str> = root.trail("team").iter().map(|e| e.name.as_str()).collect();
        assert_eq!(trail, vec!["about", "team"]);
    }

    #[test]
    fn test_missing_parent_is_omitted() {
        let pages = vec![
            Page::new("home", "/"),
            Page::new("lost", "/lost").with_parent("nowhere"),
            Page::new("lost-child", "/lost/child").with_parent("lost"),
        ];
        let (root, errors) = build(&pages);
        assert!(errors.is_empty());
        assert_eq!(root.len(), 1);
        assert!(root.find("lost").is_none());
        assert!(root.find("lost-child").is_none());
    }

    #[test]
    fn test_cycle_is_reported_not_followed() {
        let pages = vec![
            Page::new("a", "/a").with_parent("b"),
            Page::new("b", "/b").with_parent("a"),
            Page::new("c", "/c").with_parent("a"),
            Page::new("home", "/"),
            Page::new("me", "/me").with_parent("me"),
        ];
        let (root, errors) = build(&pages);
        assert_eq!(root.len(), 1);
        assert_eq!(
            errors,
            vec![
                MenuError::Cycle { pages: vec!["a".into(), "b".into()] },
                MenuError::Cycle { pages: vec!["me".into()] },
            ]
        );
    }

    #[test]
    fn test_sorted_by_weight() {
        let pages = vec![
            Page::new("a", "/a").with_weight(10),
            Page::new("b", "/b").with_weight(-1),
            Page::new("c", "/c"),
        ];
        let (root, _) = build(&pages);
        let order: Vec<&str> = root.sorted_children().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(order, vec!["b", "c", "a"]);
    }

    #[test]
    fn test_localized_hrefs_and_labels() {
        let pages = vec![
            Page::new("home", "/").with_title("nav.home"),
            Page::new("about", "/about").with_title("nav.about").with_parent("home"),
        ];
        let catalog = Catalog::build(&[TranslationResource::new("r")
            .with_message("fr", "nav.home", "Accueil")
            .with_message("fr", "nav.about", "À propos")]);
        let style = LinkStyle {
            language: "fr",
            default_language: "en",
        };
        let root = MenuIndex::new(&pages).tree(style, &catalog.localized("fr"));
        assert_eq!(root.href, "/fr/");

        let home = root.find("home").unwrap();
        assert_eq!(home.label, "Accueil");
        assert_eq!(home.href, "/fr/");
        assert_eq!(home.children["nav.about"].href, "/fr/about");
        assert_eq!(home.children["nav.about"].label, "À propos");
    }
}
