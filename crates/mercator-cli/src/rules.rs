//! Marketplace rule-table loading.

use std::path::Path;

use mercator::StaticRequirementTable;

/// Rule table shipped with the binary.
const DEFAULT_RULES: &str = include_str!("../rules/marketplaces.json");

/// Load a rule table from a file, or the built-in one.
pub fn load(path: Option<&Path>) -> Result<StaticRequirementTable, Box<dyn std::error::Error>> {
    match path {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .map_err(|e| format!("Cannot read rules {}: {}", path.display(), e))?;
            Ok(StaticRequirementTable::from_json(&json)?)
        }
        None => Ok(StaticRequirementTable::from_json(DEFAULT_RULES)?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mercator::{CanonicalField, RequirementTable};

    #[test]
    fn test_default_rules_parse() {
        let table = load(None).unwrap();
        assert_eq!(table.marketplaces(), vec!["amazon", "ebay", "generic"]);

        let amazon = table.lookup("Amazon").unwrap();
        let title = amazon.requirement_for(CanonicalField::Title).unwrap();
        assert_eq!(title.max_length, Some(200));
        assert!(!amazon.requirement_for(CanonicalField::Images).unwrap().required);
    }
}
