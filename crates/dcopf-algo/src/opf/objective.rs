use super::variables::{SolvedValues, VariableRegistry};
use dcopf_core::Topology;
use good_lp::Expression;

/// Linear dispatch cost `Σ_g Σ_t gencost(g,t) · GEN[g,t]`.
///
/// Storage carries no cost term.
pub fn dispatch_cost(topology: &Topology, registry: &VariableRegistry) -> Expression {
    let mut cost = Expression::from(0.0);
    for gen in topology.generators() {
        for t in 0..topology.time().len() {
            if let (Some(offer), Some(&var)) = (topology.offer(*gen, t), registry.gen(*gen, t)) {
                cost += offer.cost * var;
            }
        }
    }
    cost
}

/// The same sum evaluated on solved values.
pub fn evaluate_cost(topology: &Topology, values: &SolvedValues) -> f64 {
    topology
        .generators()
        .iter()
        .flat_map(|gen| (0..topology.time().len()).map(move |t| (*gen, t)))
        .filter_map(|(gen, t)| {
            let offer = topology.offer(gen, t)?;
            let output = values.gen(gen, t).copied()?;
            Some(offer.cost * output)
        })
        .sum()
}
