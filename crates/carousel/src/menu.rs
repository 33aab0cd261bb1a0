use crate::config::{Config, EntryConfig};
use derive_more::Display;
use ringmenu::Entry;

/// A ring entry built from the `[[entries]]` config tables.
#[derive(Debug, Clone, PartialEq, Display)]
#[display("{label}")]
pub struct MenuEntry {
    pub label: String,
    pub children: Vec<MenuEntry>,
}

impl Entry for MenuEntry {
    fn children(&self) -> &[Self] {
        &self.children
    }
}

impl From<&EntryConfig> for MenuEntry {
    fn from(entry: &EntryConfig) -> Self {
        Self {
            label: entry.label.clone(),
            children: entry.children.iter().map(Self::from).collect(),
        }
    }
}

pub fn entries(config: &Config) -> Vec<MenuEntry> {
    config.entries.iter().map(MenuEntry::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(label: &str) -> MenuEntry {
        MenuEntry {
            label: label.to_string(),
            children: Vec::new(),
        }
    }

    #[test]
    fn test_nested_entries_become_children() {
        let config = Config {
            entries: vec![
                EntryConfig {
                    label: "Apps".into(),
                    children: vec![EntryConfig {
                        label: "Mail".into(),
                        children: Vec::new(),
                    }],
                },
                EntryConfig {
                    label: "Lock".into(),
                    children: Vec::new(),
                },
            ],
            ..Config::default()
        };

        let menu = entries(&config);
        assert_eq!(menu.len(), 2);
        assert_eq!(menu[0].children(), &[leaf("Mail")]);
        assert!(menu[1].children().is_empty());
        assert_eq!(menu[0].to_string(), "Apps");
    }
}
