use crate::model::Values;
use crate::sites::Site;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Selection values above this count as an opened site.
const SELECTED_THRESHOLD: f64 = 0.5;

/// The chosen sites and what the choice costs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub selected: Vec<Assignment>,
    #[serde(rename = "totalCost")]
    pub total_cost: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    /// 1-based, as sites are numbered in the cost table.
    pub site: usize,
    pub storage: u64,
}

impl Plan {
    /// Round the solver's values and price them.
    ///
    /// Storage is charged at every site, opened or not, so a scenario that
    /// bounds storage unconditionally pays for the idle sites too.
    pub fn from_values(sites: &[Site], values: &Values) -> Plan {
        let storage: Vec<u64> = values.storage.iter().map(|v| v.round() as u64).collect();

        let selected: Vec<Assignment> = values
            .selection
            .iter()
            .enumerate()
            .filter(|&(_, &y)| y > SELECTED_THRESHOLD)
            .map(|(i, _)| Assignment {
                site: i + 1,
                storage: storage[i],
            })
            .collect();

        let fixed = selected.iter().fold(0.0, |sum, a| sum + sites[a.site - 1].fixed);
        let total_cost = sites
            .iter()
            .zip(&storage)
            .fold(fixed, |sum, (site, &units)| sum + site.variable * units as f64);

        Plan {
            selected,
            total_cost,
        }
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Selected sites and their storage units:")?;
        for a in &self.selected {
            writeln!(f, "Site {} is chosen with {} units stored.", a.site, a.storage)?;
        }
        write!(f, "Total cost: {}", self.total_cost)
    }
}
