//! Load distribution rules from TOML files
//!
//! Rule files hold `[[rule]]` tables:
//!
//! ```toml
//! [[rule]]
//! namespace = "death"              # optional, defaults to "regular"
//! category = "Perk"                # optional; omit for generic entries
//! content = "IronWill"
//! names = ["Bandit", "-Chief"]     # '-' prefix excludes
//! has = ["BanditFaction"]          # content the character must (not) have
//! level = { min = 10, max = 25 }   # either bound optional
//! traits = { female = true }
//! chance = 75.0                    # optional, defaults to 100
//! index = 2                        # or: count = 3 / count = { min = 1, max = 3 }
//! linked_to = ["FrostCloak"]       # optional: linked distribution parents
//! ```
//!
//! Malformed entries are skipped with a diagnostic; the rest of the file
//! still loads. Only unreadable files and invalid TOML are errors.

use std::fs;
use std::path::Path;

use crate::core::error::{BestowError, Result};
use crate::core::types::RuleNamespace;
use crate::rules::rule::{
    ContentCategory, LevelRange, RawContentFilter, RawRule, SelectionSpec, StringFilter,
    TraitFilter,
};

/// Load all rules from a TOML file.
pub fn load_rules(path: &Path) -> Result<Vec<RawRule>> {
    let content = fs::read_to_string(path).map_err(|source| BestowError::RuleFile {
        path: path.display().to_string(),
        source,
    })?;
    parse_rules(&content)
}

/// Parse rules from TOML text.
pub fn parse_rules(content: &str) -> Result<Vec<RawRule>> {
    let toml: toml::Value = content.parse()?;

    let mut rules = Vec::new();

    if let Some(entries) = toml.get("rule").and_then(|v| v.as_array()) {
        for entry in entries {
            match parse_rule(entry) {
                Ok(rule) => rules.push(rule),
                Err(reason) => {
                    tracing::warn!("Skipping malformed rule entry: {}", reason);
                }
            }
        }
    }

    Ok(rules)
}

fn parse_rule(value: &toml::Value) -> std::result::Result<RawRule, String> {
    let content = value
        .get("content")
        .and_then(|v| v.as_str())
        .ok_or("missing content")?
        .to_string();

    let namespace = match value.get("namespace").and_then(|v| v.as_str()) {
        None | Some("regular") => RuleNamespace::Regular,
        Some("death") => RuleNamespace::Death,
        Some(other) => return Err(format!("unknown namespace '{other}'")),
    };

    let category = match value.get("category").and_then(|v| v.as_str()) {
        Some(name) => {
            Some(parse_category(name).ok_or_else(|| format!("unknown category '{name}'"))?)
        }
        None => None,
    };

    let names = value
        .get("names")
        .and_then(|v| v.as_array())
        .map(|list| parse_string_filters(list))
        .transpose()?
        .unwrap_or_default();

    let content_filters = value
        .get("has")
        .and_then(|v| v.as_array())
        .map(|list| parse_content_filters(list))
        .transpose()?
        .unwrap_or_default();

    let levels = value.get("level").map(parse_level_range).transpose()?;
    let traits = value
        .get("traits")
        .map(parse_traits)
        .transpose()?
        .unwrap_or_default();

    let chance = match value.get("chance") {
        None => 100.0,
        Some(v) => {
            let chance = v
                .as_float()
                .or_else(|| v.as_integer().map(|n| n as f64))
                .ok_or("chance must be a number")? as f32;
            if !(0.0..=100.0).contains(&chance) {
                return Err(format!("chance {chance} outside 0..=100"));
            }
            chance
        }
    };

    let selection = parse_selection(value)?;

    let linked_to = value
        .get("linked_to")
        .and_then(|v| v.as_array())
        .map(|list| {
            list.iter()
                .map(|v| {
                    v.as_str()
                        .map(str::to_string)
                        .ok_or("linked_to entries must be strings".to_string())
                })
                .collect::<std::result::Result<Vec<_>, _>>()
        })
        .transpose()?
        .unwrap_or_default();

    Ok(RawRule {
        namespace,
        category,
        content,
        names,
        content_filters,
        levels,
        traits,
        selection,
        chance,
        linked_to,
    })
}

fn parse_category(name: &str) -> Option<ContentCategory> {
    match name {
        "Keyword" => Some(ContentCategory::Keyword),
        "Faction" => Some(ContentCategory::Faction),
        "Perk" => Some(ContentCategory::Perk),
        "Spell" => Some(ContentCategory::Spell),
        "LeveledSpell" => Some(ContentCategory::LeveledSpell),
        "Package" => Some(ContentCategory::Package),
        "Outfit" => Some(ContentCategory::Outfit),
        "SleepOutfit" => Some(ContentCategory::SleepOutfit),
        "Item" => Some(ContentCategory::Item),
        "Skin" => Some(ContentCategory::Skin),
        _ => None,
    }
}

fn parse_string_filters(list: &[toml::Value]) -> std::result::Result<Vec<StringFilter>, String> {
    list.iter()
        .map(|v| {
            let s = v.as_str().ok_or("names entries must be strings")?;
            Ok(match s.strip_prefix('-') {
                Some(needle) => StringFilter::reject(needle),
                None => StringFilter::require(s),
            })
        })
        .collect()
}

fn parse_content_filters(
    list: &[toml::Value],
) -> std::result::Result<Vec<RawContentFilter>, String> {
    list.iter()
        .map(|v| {
            let s = v.as_str().ok_or("has entries must be strings")?;
            Ok(match s.strip_prefix('-') {
                Some(name) => RawContentFilter {
                    name: name.to_string(),
                    exclude: true,
                },
                None => RawContentFilter {
                    name: s.to_string(),
                    exclude: false,
                },
            })
        })
        .collect()
}

fn parse_level_range(value: &toml::Value) -> std::result::Result<LevelRange, String> {
    let table = value.as_table().ok_or("level must be a table")?;

    let min = match table.get("min") {
        None => 0,
        Some(v) => v.as_integer().ok_or("level.min must be an integer")? as u16,
    };
    let max = match table.get("max") {
        None => u16::MAX,
        Some(v) => v.as_integer().ok_or("level.max must be an integer")? as u16,
    };

    if min > max {
        return Err(format!("level range {min}..{max} is inverted"));
    }

    Ok(LevelRange { min, max })
}

fn parse_traits(value: &toml::Value) -> std::result::Result<TraitFilter, String> {
    let table = value.as_table().ok_or("traits must be a table")?;

    let flag = |key: &str| -> std::result::Result<Option<bool>, String> {
        match table.get(key) {
            None => Ok(None),
            Some(v) => v
                .as_bool()
                .map(Some)
                .ok_or_else(|| format!("traits.{key} must be a boolean")),
        }
    };

    Ok(TraitFilter {
        female: flag("female")?,
        unique: flag("unique")?,
        summonable: flag("summonable")?,
        child: flag("child")?,
    })
}

fn parse_selection(value: &toml::Value) -> std::result::Result<SelectionSpec, String> {
    if value.get("index").is_some() && value.get("count").is_some() {
        return Err("rule specifies both index and count".into());
    }

    if let Some(v) = value.get("index") {
        let index = v.as_integer().ok_or("index must be an integer")?;
        if index < 0 {
            return Err(format!("index {index} must not be negative"));
        }
        return Ok(SelectionSpec::Index(index as u32));
    }

    match value.get("count") {
        None => Ok(SelectionSpec::exact_count(1)),
        Some(v) => {
            if let Some(n) = v.as_integer() {
                if n < 0 {
                    return Err(format!("count {n} must not be negative"));
                }
                return Ok(SelectionSpec::exact_count(n as u32));
            }

            let table = v.as_table().ok_or("count must be an integer or a table")?;
            let min = table
                .get("min")
                .and_then(|v| v.as_integer())
                .ok_or("count.min must be an integer")?;
            let max = table
                .get("max")
                .and_then(|v| v.as_integer())
                .ok_or("count.max must be an integer")?;
            if min < 0 || max < min {
                return Err(format!("count range {min}..{max} is invalid"));
            }

            Ok(SelectionSpec::RandomCount {
                min: min as u32,
                max: max as u32,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_rule() {
        let toml_str = r#"
[[rule]]
namespace = "death"
category = "Perk"
content = "IronWill"
names = ["Bandit", "-Chief"]
has = ["BanditFaction", "-GuardFaction"]
level = { min = 10, max = 25 }
traits = { female = true }
chance = 75.0
index = 2
"#;
        let rules = parse_rules(toml_str).unwrap();
        assert_eq!(rules.len(), 1);

        let rule = &rules[0];
        assert_eq!(rule.namespace, RuleNamespace::Death);
        assert_eq!(rule.category, Some(ContentCategory::Perk));
        assert_eq!(rule.content, "IronWill");
        assert_eq!(rule.names.len(), 2);
        assert!(!rule.names[0].exclude);
        assert!(rule.names[1].exclude);
        assert_eq!(rule.names[1].needle, "Chief");
        assert_eq!(rule.content_filters.len(), 2);
        assert!(rule.content_filters[1].exclude);
        assert_eq!(rule.levels, Some(LevelRange { min: 10, max: 25 }));
        assert_eq!(rule.traits.female, Some(true));
        assert!((rule.chance - 75.0).abs() < f32::EPSILON);
        assert_eq!(rule.selection, SelectionSpec::Index(2));
    }

    #[test]
    fn test_defaults() {
        let toml_str = r#"
[[rule]]
content = "Firebolt"
"#;
        let rules = parse_rules(toml_str).unwrap();
        let rule = &rules[0];

        assert_eq!(rule.namespace, RuleNamespace::Regular);
        assert_eq!(rule.category, None);
        assert!((rule.chance - 100.0).abs() < f32::EPSILON);
        assert_eq!(rule.selection, SelectionSpec::exact_count(1));
        assert!(rule.names.is_empty());
        assert!(rule.linked_to.is_empty());
    }

    #[test]
    fn test_count_range() {
        let toml_str = r#"
[[rule]]
category = "Item"
content = "HealingDraught"
count = { min = 1, max = 3 }
"#;
        let rules = parse_rules(toml_str).unwrap();
        assert_eq!(
            rules[0].selection,
            SelectionSpec::RandomCount { min: 1, max: 3 }
        );
    }

    #[test]
    fn test_open_level_bounds() {
        let toml_str = r#"
[[rule]]
category = "Perk"
content = "IronWill"
level = { min = 10 }
"#;
        let rules = parse_rules(toml_str).unwrap();
        assert_eq!(rules[0].levels, Some(LevelRange::at_least(10)));
    }

    #[test]
    fn test_malformed_entry_is_skipped() {
        let toml_str = r#"
[[rule]]
category = "Perk"

[[rule]]
category = "Perk"
content = "IronWill"
"#;
        // First entry is missing its content and is dropped; the second loads.
        let rules = parse_rules(toml_str).unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].content, "IronWill");
    }

    #[test]
    fn test_conflicting_selection_rejected() {
        let toml_str = r#"
[[rule]]
category = "Item"
content = "Gold"
index = 1
count = 3
"#;
        let rules = parse_rules(toml_str).unwrap();
        assert!(rules.is_empty());
    }

    #[test]
    fn test_out_of_range_chance_rejected() {
        let toml_str = r#"
[[rule]]
category = "Perk"
content = "IronWill"
chance = 120.0
"#;
        let rules = parse_rules(toml_str).unwrap();
        assert!(rules.is_empty());
    }

    #[test]
    fn test_linked_to_parsing() {
        let toml_str = r#"
[[rule]]
category = "Keyword"
content = "FrostTouched"
linked_to = ["FrostCloak", "FrostScaling"]
"#;
        let rules = parse_rules(toml_str).unwrap();
        assert_eq!(rules[0].linked_to, vec!["FrostCloak", "FrostScaling"]);
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        assert!(parse_rules("not [ valid toml").is_err());
    }
}
