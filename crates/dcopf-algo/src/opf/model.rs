use super::constraints::{flow_law, flow_limits, power_balance, slack_angle};
use super::objective::dispatch_cost;
use super::storage::storage_dynamics;
use super::types::TerminalStorage;
use super::variables::VariableRegistry;
use dcopf_core::Topology;
use good_lp::{variables, Constraint, Expression, ProblemVariables};
use tracing::debug;

/// Fully assembled linear program for one horizon.
///
/// A model is built per invocation and consumed by the solver; nothing in it
/// is shared between runs.
pub struct DcopfModel {
    vars: ProblemVariables,
    registry: VariableRegistry,
    constraints: Vec<Constraint>,
    objective: Expression,
}

impl DcopfModel {
    pub fn build(topology: &Topology, terminal: TerminalStorage) -> Self {
        let mut vars = variables!();
        let registry = VariableRegistry::allocate(&mut vars, topology);

        let mut constraints = flow_law(topology, &registry);
        constraints.extend(slack_angle(topology, &registry));
        constraints.extend(flow_limits(topology, &registry));
        constraints.extend(storage_dynamics(topology, &registry, terminal));
        constraints.extend(power_balance(topology, &registry));

        let objective = dispatch_cost(topology, &registry);

        debug!(
            variables = registry.len(),
            constraints = constraints.len(),
            ?terminal,
            "assembled DC-OPF model"
        );

        Self {
            vars,
            registry,
            constraints,
            objective,
        }
    }

    pub fn variable_count(&self) -> usize {
        self.registry.len()
    }

    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    pub(crate) fn into_parts(
        self,
    ) -> (ProblemVariables, VariableRegistry, Vec<Constraint>, Expression) {
        (self.vars, self.registry, self.constraints, self.objective)
    }
}
