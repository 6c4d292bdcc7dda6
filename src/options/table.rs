//! Ordered option tables.

use super::spec::OptionSpec;
use crate::errors::DeclarationError;

/// Options of a task or command set, in declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptionTable {
    specs: Vec<OptionSpec>,
}

impl OptionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a new option; a second declaration of the same name is an error.
    pub fn insert(&mut self, spec: OptionSpec, owner: &str) -> Result<(), DeclarationError> {
        spec.validate()?;
        if self.get(&spec.name).is_some() {
            return Err(DeclarationError::DuplicateOption {
                option: spec.name,
                owner: owner.to_string(),
            });
        }
        self.specs.push(spec);
        Ok(())
    }

    /// Add or replace an option in place, keeping its original position.
    pub fn upsert(&mut self, spec: OptionSpec) -> Result<(), DeclarationError> {
        spec.validate()?;
        match self.specs.iter_mut().find(|s| s.name == spec.name) {
            Some(existing) => *existing = spec,
            None => self.specs.push(spec),
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&OptionSpec> {
        let name = name.replace('-', "_");
        self.specs.iter().find(|s| s.name == name)
    }

    /// Find the option a switch token (`--name`, `-n`, alias) refers to.
    pub fn find_switch(&self, switch: &str) -> Option<&OptionSpec> {
        self.specs.iter().find(|s| s.matches_switch(switch))
    }

    /// Overlay `other` on top of this table; entries in `other` win.
    pub fn merged_with(&self, other: &OptionTable) -> OptionTable {
        let mut merged = self.clone();
        for spec in &other.specs {
            match merged.specs.iter_mut().find(|s| s.name == spec.name) {
                Some(existing) => *existing = spec.clone(),
                None => merged.specs.push(spec.clone()),
            }
        }
        merged
    }

    pub fn iter(&self) -> impl Iterator<Item = &OptionSpec> {
        self.specs.iter()
    }

    /// Required options, sorted by name.
    pub fn required(&self) -> Vec<&OptionSpec> {
        let mut required: Vec<&OptionSpec> = self.specs.iter().filter(|s| s.required).collect();
        required.sort_by(|a, b| a.name.cmp(&b.name));
        required
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_rejects_duplicates() {
        let mut table = OptionTable::new();
        table.insert(OptionSpec::boolean("force"), "install").unwrap();
        let err = table
            .insert(OptionSpec::string("force"), "install")
            .unwrap_err();
        assert!(matches!(err, DeclarationError::DuplicateOption { .. }));
    }

    #[test]
    fn test_upsert_replaces_in_place() {
        let mut table = OptionTable::new();
        table.insert(OptionSpec::boolean("a"), "t").unwrap();
        table.insert(OptionSpec::boolean("b"), "t").unwrap();
        table.upsert(OptionSpec::string("a").required()).unwrap();
        let names: Vec<&str> = table.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["a", "b"]);
        assert!(table.get("a").unwrap().required);
    }

    #[test]
    fn test_merged_with_prefers_overlay() {
        let mut base = OptionTable::new();
        base.insert(OptionSpec::boolean("verbose"), "class").unwrap();
        base.insert(OptionSpec::string("color"), "class").unwrap();
        let mut overlay = OptionTable::new();
        overlay.insert(OptionSpec::numeric("color"), "task").unwrap();

        let merged = base.merged_with(&overlay);
        assert_eq!(merged.len(), 2);
        assert_eq!(
            merged.get("color").unwrap().kind,
            crate::options::OptionKind::Numeric
        );
    }

    #[test]
    fn test_required_is_sorted() {
        let mut table = OptionTable::new();
        table.insert(OptionSpec::string("zeta").required(), "t").unwrap();
        table.insert(OptionSpec::string("alpha").required(), "t").unwrap();
        table.insert(OptionSpec::string("mid"), "t").unwrap();
        let names: Vec<&str> = table.required().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["alpha", "zeta"]);
    }
}
