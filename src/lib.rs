//! Choose which candidate sites to open as regional warehouses, and how
//! much to store at each, by solving a small mixed-integer linear program.
//!
//! Costs come from a table with one row per site; the rules limiting which
//! combinations of sites may be opened come from a [`Scenario`].

pub mod config;
mod error;
pub mod model;
pub mod plan;
pub mod scenario;
pub mod sites;

pub use error::Error;
pub use model::Formulation;
pub use plan::{Assignment, Plan};
pub use scenario::Scenario;
pub use sites::Site;

use log::{info, warn};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Problem {
    pub sites: Vec<Site>,
    #[serde(default)]
    pub scenario: Scenario,
}

impl Problem {
    pub fn solve(&self) -> Result<Plan, Error> {
        let formulation = Formulation::build(&self.sites, &self.scenario)?;
        let values = formulation.solve()?;
        let plan = Plan::from_values(&self.sites, &values);

        if plan.selected.is_empty() {
            warn!("No site was opened; the scenario does not require any warehouse");
        }

        info!(
            "Opened {} of {} sites, total cost {}",
            plan.selected.len(),
            self.sites.len(),
            plan.total_cost
        );
        Ok(plan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::fs::{read_dir, read_to_string};
    use std::path::Path;

    #[derive(Deserialize)]
    struct Expected {
        plan: Plan,
    }

    // Solve the problem above the `plan:` marker and compare with the plan below it
    fn run_test_file(test_file: &Path) {
        println!("Running test for file: {:?}", test_file);

        let failure_message = format!("Failed to read test file: {}", test_file.display());
        let yaml_content = read_to_string(test_file).expect(&failure_message);

        let parts: Vec<&str> = yaml_content.split("plan:").collect();

        let failure_message = format!("Failed to parse input YAML: {}", test_file.display());
        let input_yaml = parts.first().expect("No input found in test file").trim();
        let input: Problem = serde_yaml::from_str(input_yaml).expect(&failure_message);

        let failure_message = format!("Missing expected plan: {}", test_file.display());
        let expected_yaml = format!("plan:{}", parts.get(1).expect(&failure_message));

        let failure_message = format!("Failed to solve test file: {}", test_file.display());
        let plan = input.solve().expect(&failure_message);
        let received_plan = serde_yaml::to_string(&plan).expect(&failure_message);

        // Round-trip the expected plan so both sides share one YAML layout
        let failure_message = format!("Failed to parse expected YAML: {}", test_file.display());
        let expected_unnormalized: Expected =
            serde_yaml::from_str(&expected_yaml).expect(&failure_message);
        let failure_message = format!("Failed to normalize expected YAML: {}", test_file.display());
        let expected_plan =
            serde_yaml::to_string(&expected_unnormalized.plan).expect(&failure_message);

        println!("expected: {}", expected_plan);
        println!("received: {}", received_plan);

        assert_eq!(
            expected_plan.trim(),
            received_plan.trim(),
            "{}",
            test_file.display()
        );
    }

    #[test]
    fn run_all_test_files() {
        let test_data_dir = Path::new("test_data");
        let mut entries: Vec<_> = read_dir(test_data_dir)
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .filter(|path| {
                path.is_file() && path.extension().map(|ext| ext == "yaml").unwrap_or(false)
            })
            .collect();

        // Fixtures are numbered; run them in that order
        entries.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

        for path in entries {
            run_test_file(&path);
        }
    }

    #[test]
    fn uniform_costs_open_the_fewest_sites_the_rules_allow() {
        let problem = Problem {
            sites: vec![
                Site {
                    fixed: 1000.0,
                    variable: 1.0,
                };
                27
            ],
            scenario: Scenario::regional_warehouses(),
        };
        let plan = problem.solve().unwrap();

        // e.g. sites 2, 11, 12, 16, 17 and 22 satisfy every regional rule
        assert_eq!(plan.selected.len(), 6);
        assert!(plan.selected.iter().all(|a| a.storage == 175_000));
        assert_relative_eq!(plan.total_cost, 6.0 * 1000.0 + 6.0 * 175_000.0);
    }

    #[test]
    fn regional_plan_satisfies_every_rule() {
        let sites: Vec<Site> = (0..27)
            .map(|i| Site {
                fixed: 2_000_000.0 + 37_000.0 * ((i * 7) % 11) as f64,
                variable: 2.0 + (i % 5) as f64 * 0.25,
            })
            .collect();
        let problem = Problem {
            sites,
            scenario: Scenario::regional_warehouses(),
        };
        let plan = problem.solve().unwrap();

        let mut y = [0u32; 27];
        for a in &plan.selected {
            y[a.site - 1] = 1;
            assert!((175_000..=375_000).contains(&a.storage));
        }
        let count = |range: std::ops::Range<usize>, step: usize| -> u32 {
            range.step_by(step).map(|i| y[i]).sum()
        };

        assert!(count(6..17, 1) >= 4);
        assert!(count(2..27, 2) <= 6);
        assert!(count(0..2, 1) <= 1);
        assert!(count(19..23, 1) <= 1);
        assert!(count(21..27, 2) >= 1);
        assert_eq!(count(1..15, 1), count(15..27, 1));
        assert_eq!(count(1..10, 1), count(19..27, 1));
    }

    #[test]
    fn short_cost_table_is_rejected_before_solving() {
        let problem = Problem {
            sites: vec![
                Site {
                    fixed: 1.0,
                    variable: 1.0,
                };
                12
            ],
            scenario: Scenario::default(),
        };
        assert!(matches!(problem.solve(), Err(Error::RuleOutOfRange { .. })));
    }

    #[test]
    fn empty_site_list_is_rejected() {
        let problem = Problem {
            sites: vec![],
            scenario: Scenario {
                rules: vec![],
                ..Scenario::default()
            },
        };
        assert!(matches!(problem.solve(), Err(Error::EmptyCostTable)));
    }

    #[test]
    fn unconstrained_scenario_opens_nothing() {
        let problem = Problem {
            sites: vec![
                Site {
                    fixed: 500.0,
                    variable: 2.0,
                };
                3
            ],
            scenario: Scenario {
                rules: vec![],
                ..Scenario::default()
            },
        };
        let plan = problem.solve().unwrap();

        assert!(plan.selected.is_empty());
        assert!(plan.total_cost == 0.0 && plan.total_cost.is_sign_positive());
    }
}
