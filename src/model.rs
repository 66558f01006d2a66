use crate::scenario::{Bound, Capacity, CapacityMode, Relation, Scenario, SelectionRule};
use crate::sites::{Site, validate_sites};
use crate::Error;
use good_lp::solvers::microlp::microlp;
use good_lp::{
    Constraint, Expression, ProblemVariables, ResolutionError, Solution, SolverModel, Variable,
    variable, variables,
};
use log::{debug, info};
use std::collections::BTreeMap;
use std::fmt;

/// A decision variable, addressed by site index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Term {
    /// Units stored at the site (non-negative integer).
    Storage(usize),
    /// 1 if the site is opened (binary).
    Selection(usize),
}

impl Term {
    pub fn site(self) -> usize {
        match self {
            Term::Storage(i) | Term::Selection(i) => i,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LinearConstraint {
    pub name: String,
    pub terms: Vec<(Term, f64)>,
    pub relation: Relation,
    pub rhs: i64,
}

impl LinearConstraint {
    fn new(
        name: impl Into<String>,
        terms: impl IntoIterator<Item = (Term, f64)>,
        relation: Relation,
        rhs: i64,
    ) -> Self {
        LinearConstraint {
            name: name.into(),
            terms: merge_terms(terms),
            relation,
            rhs,
        }
    }
}

impl fmt::Display for LinearConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:", self.name)?;
        for (term, coefficient) in &self.terms {
            match term {
                Term::Storage(i) => write!(f, " {coefficient:+} x[{i}]")?,
                Term::Selection(i) => write!(f, " {coefficient:+} y[{i}]")?,
            }
        }
        write!(f, " {} {}", self.relation.symbol(), self.rhs)
    }
}

/// Solver-independent MILP: minimise `objective` subject to `constraints`,
/// with one storage and one selection variable per site.
#[derive(Debug, Clone, PartialEq)]
pub struct Formulation {
    pub sites: usize,
    pub objective: Vec<(Term, f64)>,
    pub constraints: Vec<LinearConstraint>,
}

/// Raw per-site values read back from the solver.
#[derive(Debug, Clone, PartialEq)]
pub struct Values {
    pub storage: Vec<f64>,
    pub selection: Vec<f64>,
}

impl Formulation {
    pub fn build(sites: &[Site], scenario: &Scenario) -> Result<Formulation, Error> {
        validate_sites(sites)?;
        scenario.validate(sites.len())?;

        let objective = create_objective_function(sites);

        let mut constraints = constrain_storage_capacities(sites.len(), &scenario.capacity);
        constraints.extend(constrain_selection_rules(sites.len(), &scenario.rules));

        info!(
            "Built model with {} variables and {} constraints",
            2 * sites.len(),
            constraints.len()
        );
        for c in &constraints {
            debug!("{}", c);
        }

        Ok(Formulation {
            sites: sites.len(),
            objective,
            constraints,
        })
    }

    /// Hand the model to the solver once and read back every variable.
    pub fn solve(&self) -> Result<Values, Error> {
        let (variables, storage, selection) = init_variables(self.sites);
        let lookup = |term: Term| match term {
            Term::Storage(i) => storage[i],
            Term::Selection(i) => selection[i],
        };

        let objective = to_expression(&self.objective, lookup);
        let model = create_model(variables, objective);
        let model = self
            .constraints
            .iter()
            .fold(model, |m, c| m.with(to_constraint(c, lookup)));

        info!("Solving with microlp");
        let solution = model.solve()?;
        info!("Solver finished");

        Ok(Values {
            storage: storage.iter().map(|&v| solution.value(v)).collect(),
            selection: selection.iter().map(|&v| solution.value(v)).collect(),
        })
    }
}

fn init_variables(sites: usize) -> (ProblemVariables, Vec<Variable>, Vec<Variable>) {
    let mut problem_vars = variables!();
    let storage = problem_vars.add_vector(variable().integer().min(0), sites);
    let selection = problem_vars.add_vector(variable().binary(), sites);
    (problem_vars, storage, selection)
}

/// sum(fixed[i] * y[i]) + sum(variable[i] * x[i])
fn create_objective_function(sites: &[Site]) -> Vec<(Term, f64)> {
    let fixed = sites
        .iter()
        .enumerate()
        .map(|(i, site)| (Term::Selection(i), site.fixed));
    let variable = sites
        .iter()
        .enumerate()
        .map(|(i, site)| (Term::Storage(i), site.variable));
    fixed.chain(variable).collect()
}

/// Two bounds per site on the storage amount.
fn constrain_storage_capacities(sites: usize, capacity: &Capacity) -> Vec<LinearConstraint> {
    let (min, max) = (i64::from(capacity.min), i64::from(capacity.max));

    (0..sites)
        .flat_map(|i| {
            let lower = format!("StorageCapacity_Lower_{i}");
            let upper = format!("StorageCapacity_Upper_{i}");
            let x = (Term::Storage(i), 1.0);
            match capacity.mode {
                CapacityMode::Unconditional => [
                    LinearConstraint::new(lower, [x], Relation::AtLeast, min),
                    LinearConstraint::new(upper, [x], Relation::AtMost, max),
                ],
                // x - min*y >= 0 and x - max*y <= 0
                CapacityMode::Linked => [
                    LinearConstraint::new(
                        lower,
                        [x, (Term::Selection(i), -(min as f64))],
                        Relation::AtLeast,
                        0,
                    ),
                    LinearConstraint::new(
                        upper,
                        [x, (Term::Selection(i), -(max as f64))],
                        Relation::AtMost,
                        0,
                    ),
                ],
            }
        })
        .collect()
}

fn constrain_selection_rules(sites: usize, rules: &[SelectionRule]) -> Vec<LinearConstraint> {
    rules
        .iter()
        .map(|rule| {
            let counted = rule
                .sites
                .indices(sites)
                .map(|i| (Term::Selection(i), 1.0));

            match rule.rhs {
                Bound::Count(count) => {
                    LinearConstraint::new(&rule.name, counted, rule.relation, i64::from(count))
                }
                // left - right (relation) 0
                Bound::Sites(other) => {
                    let subtracted = other.indices(sites).map(|i| (Term::Selection(i), -1.0));
                    LinearConstraint::new(&rule.name, counted.chain(subtracted), rule.relation, 0)
                }
            }
        })
        .collect()
}

/// Sort terms by variable, add up duplicates and drop the ones that cancel.
fn merge_terms(terms: impl IntoIterator<Item = (Term, f64)>) -> Vec<(Term, f64)> {
    let mut merged = BTreeMap::new();
    for (term, coefficient) in terms {
        *merged.entry(term).or_insert(0.0) += coefficient;
    }
    merged.into_iter().filter(|&(_, c)| c != 0.0).collect()
}

fn to_expression(terms: &[(Term, f64)], lookup: impl Fn(Term) -> Variable) -> Expression {
    terms
        .iter()
        .fold(Expression::from(0.0), |sum, &(term, coefficient)| {
            sum + lookup(term) * coefficient
        })
}

fn to_constraint(c: &LinearConstraint, lookup: impl Fn(Term) -> Variable) -> Constraint {
    let lhs = to_expression(&c.terms, lookup);
    let rhs = c.rhs as f64;
    match c.relation {
        Relation::AtLeast => lhs.geq(rhs),
        Relation::AtMost => lhs.leq(rhs),
        Relation::Exactly => lhs.eq(rhs),
    }
}

/// Create a minimisation model with the given objective function
fn create_model(
    variables: ProblemVariables,
    objective: Expression,
) -> impl SolverModel<Error = ResolutionError> {
    variables.minimise(objective).using(microlp)
}
