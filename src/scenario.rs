use crate::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::read_to_string;
use std::path::Path;

/// Everything about the model that is not a cost: storage bounds and
/// the rules restricting which combinations of sites may be opened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scenario {
    pub capacity: Capacity,
    pub rules: Vec<SelectionRule>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Capacity {
    pub min: u32,
    pub max: u32,
    pub mode: CapacityMode,
}

/// How the storage bounds relate to the selection indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapacityMode {
    /// `min * selected <= storage <= max * selected`: closed sites store nothing.
    #[default]
    Linked,
    /// `min <= storage <= max` at every site, opened or not.
    Unconditional,
}

/// Every `step`th 0-based site index in `start..end`. A missing `end`
/// runs through the last loaded site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteRange {
    pub start: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<usize>,
    #[serde(default = "default_step")]
    pub step: usize,
}
fn default_step() -> usize {
    1
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relation {
    AtLeast,
    AtMost,
    Exactly,
}

/// Right-hand side of a rule: a fixed number of sites, or the number of
/// sites selected in another range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Bound {
    Count(u32),
    Sites(SiteRange),
}

/// "The number of selected sites in `sites` is `relation` `rhs`".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionRule {
    pub name: String,
    pub sites: SiteRange,
    pub relation: Relation,
    pub rhs: Bound,
}

impl Default for Capacity {
    fn default() -> Self {
        Capacity {
            min: 175_000,
            max: 375_000,
            mode: CapacityMode::Linked,
        }
    }
}

impl Default for Scenario {
    fn default() -> Self {
        Scenario::regional_warehouses()
    }
}

impl SiteRange {
    pub const fn new(start: usize, end: usize) -> SiteRange {
        SiteRange {
            start,
            end: Some(end),
            step: 1,
        }
    }

    /// From `start` through the last site, every `step`th index.
    pub const fn tail(start: usize, step: usize) -> SiteRange {
        SiteRange {
            start,
            end: None,
            step,
        }
    }

    /// Indices covered when `sites` sites are loaded.
    pub fn indices(&self, sites: usize) -> impl Iterator<Item = usize> {
        let end = self.end.unwrap_or(sites).min(sites);
        (self.start..end).step_by(self.step.max(1))
    }

    fn validate(&self, rule: &str, sites: usize) -> Result<(), Error> {
        if self.step == 0 {
            return Err(Error::InvalidRule {
                rule: rule.to_owned(),
                reason: "step must be at least 1".to_owned(),
            });
        }
        if let Some(end) = self.end {
            if end > sites {
                return Err(Error::RuleOutOfRange {
                    rule: rule.to_owned(),
                    index: end - 1,
                    sites,
                });
            }
            if self.start >= end {
                return Err(Error::InvalidRule {
                    rule: rule.to_owned(),
                    reason: format!("range {self} selects no sites"),
                });
            }
        }
        if self.start >= sites {
            return Err(Error::RuleOutOfRange {
                rule: rule.to_owned(),
                index: self.start,
                sites,
            });
        }
        Ok(())
    }
}

impl fmt::Display for SiteRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..", self.start)?;
        if let Some(end) = self.end {
            write!(f, "{end}")?;
        }
        if self.step != 1 {
            write!(f, " step {}", self.step)?;
        }
        Ok(())
    }
}

impl Relation {
    pub fn symbol(self) -> &'static str {
        match self {
            Relation::AtLeast => ">=",
            Relation::AtMost => "<=",
            Relation::Exactly => "==",
        }
    }
}

impl SelectionRule {
    pub fn new(name: &str, sites: SiteRange, relation: Relation, rhs: Bound) -> Self {
        SelectionRule {
            name: name.to_owned(),
            sites,
            relation,
            rhs,
        }
    }
}

impl Scenario {
    /// Rules of the "Regional Warehouses" exercise.
    pub fn regional_warehouses() -> Scenario {
        use Relation::*;

        let rules = vec![
            SelectionRule::new(
                "MinimumWarehouses_6_16",
                SiteRange::new(6, 17),
                AtLeast,
                Bound::Count(4),
            ),
            SelectionRule::new(
                "MaximumEvenWarehouses",
                SiteRange::tail(2, 2),
                AtMost,
                Bound::Count(6),
            ),
            SelectionRule::new(
                "Site1_2_Exclusion",
                SiteRange::new(0, 2),
                AtMost,
                Bound::Count(1),
            ),
            SelectionRule::new(
                "Sites19_22_Exclusion",
                SiteRange::new(19, 23),
                AtMost,
                Bound::Count(1),
            ),
            SelectionRule::new(
                "Sites1_5_Selection",
                SiteRange::new(1, 6),
                AtMost,
                Bound::Count(5),
            ),
            SelectionRule::new(
                "OddSites_Selection",
                SiteRange::tail(21, 2),
                AtLeast,
                Bound::Count(1),
            ),
            SelectionRule::new(
                "EqualWarehouseCounts",
                SiteRange::new(1, 15),
                Exactly,
                Bound::Sites(SiteRange::tail(15, 1)),
            ),
            SelectionRule::new(
                "EqualUnitCounts",
                SiteRange::new(1, 10),
                Exactly,
                Bound::Sites(SiteRange::tail(19, 1)),
            ),
        ];

        Scenario {
            capacity: Capacity::default(),
            rules,
        }
    }

    pub fn from_yaml_path(path: impl AsRef<Path>) -> Result<Scenario, Error> {
        let buf = read_to_string(path)?;
        Ok(serde_yaml::from_str(&buf)?)
    }

    /// Check bounds and ranges against the number of loaded sites.
    pub fn validate(&self, sites: usize) -> Result<(), Error> {
        let Capacity { min, max, .. } = self.capacity;
        if min > max {
            return Err(Error::InvalidCapacity { min, max });
        }

        for rule in &self.rules {
            rule.sites.validate(&rule.name, sites)?;
            if let Bound::Sites(other) = &rule.rhs {
                other.validate(&rule.name, sites)?;
            }
        }
        Ok(())
    }
}
