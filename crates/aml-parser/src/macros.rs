use crate::cst::MacroRules;

/// Macro definitions by name, in insertion order.
///
/// Redefining a name appends another definition instead of replacing the
/// earlier one; lookups see the oldest definition first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MacroTable {
    entries: Vec<(String, Vec<MacroRules>)>,
}

impl MacroTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, rules: MacroRules) {
        match self
            .entries
            .iter_mut()
            .find(|(name, _)| name == rules.name())
        {
            Some((_, defs)) => defs.push(rules),
            None => self.entries.push((rules.name().to_string(), vec![rules])),
        }
    }

    /// All definitions recorded for `name`.
    pub fn get(&self, name: &str) -> &[MacroRules] {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, defs)| defs.as_slice())
            .unwrap_or_default()
    }

    /// First `Some` produced by `target` over the definitions of `name`.
    pub fn lookup<U>(&self, name: &str, target: impl FnMut(&MacroRules) -> Option<U>) -> Option<U> {
        self.get(name).iter().find_map(target)
    }

    pub fn contains(&self, name: &str) -> bool {
        !self.get(name).is_empty()
    }

    /// Defined names in first-definition order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// Total number of definitions.
    pub fn len(&self) -> usize {
        self.entries.iter().map(|(_, defs)| defs.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cst::Node;
    use crate::Parser;
    use pretty_assertions::assert_eq;

    fn definitions(source: &str) -> Vec<MacroRules> {
        Parser::parse_source(source)
            .into_iter()
            .filter_map(|node| match node {
                Node::MacroRules(rules) => Some(rules),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_insertion_order_is_preserved() {
        let mut table = MacroTable::new();
        for def in definitions(
            "\\macroRules![\\a]{ [] => {one} }\\macroRules![\\b]{}\\macroRules![\\a]{ [] => {two} [] => {three} }",
        ) {
            table.insert(def);
        }
        assert_eq!(table.len(), 3);
        assert_eq!(table.names().collect::<Vec<_>>(), vec!["\\a", "\\b"]);
        assert_eq!(table.get("\\a").len(), 2);
        assert_eq!(table.get("\\a")[1].rules.len(), 2);
    }

    #[test]
    fn test_lookup_scans_oldest_first() {
        let mut table = MacroTable::new();
        for def in definitions("\\macroRules![\\a]{}\\macroRules![\\a]{ [] => {x} }") {
            table.insert(def);
        }
        let first_with_rules = table.lookup("\\a", |def| def.rules.first().map(|r| r.arrow.span));
        assert!(first_with_rules.is_some());
        let first_any = table.lookup("\\a", |def| Some(def.rules.len()));
        assert_eq!(first_any, Some(0));
    }

    #[test]
    fn test_missing_name() {
        let table = MacroTable::new();
        assert!(table.get("\\nope").is_empty());
        assert!(!table.contains("\\nope"));
        assert!(table.is_empty());
    }
}
