//! Solution rendering: fixed-width table or JSON.

use fp_solver::{ControlSolution, NodeSolution, ThrottleStatus};
use serde::Serialize;
use std::io::Write;

#[derive(Debug, Serialize)]
pub struct Report<'a> {
    pub case: &'a str,
    pub total_iterations: usize,
    pub max_residual: f64,
    pub saturated_nodes: Vec<SaturatedRow>,
    pub nodes: Vec<NodeRow>,
}

#[derive(Debug, Serialize)]
pub struct SaturatedRow {
    pub node: usize,
    pub bound: &'static str,
}

#[derive(Debug, Serialize)]
pub struct NodeRow {
    pub altitude_m: f64,
    pub tas_mps: f64,
    pub mach: f64,
    pub alpha_deg: Option<f64>,
    pub gamma_deg: Option<f64>,
    pub gamma_rate_radpm: Option<f64>,
    pub thrust_required_n: f64,
    pub thrust_delivered_n: Option<f64>,
    pub throttle: Option<f64>,
    pub throttle_status: Option<&'static str>,
    pub lift_n: f64,
    pub drag_n: f64,
    pub load_factor: f64,
    pub normal_force_n: f64,
    pub fuselage_pitch_deg: f64,
    pub fuel_flow_kgps: Option<f64>,
    pub dmass_dr_kgpm: Option<f64>,
    pub dt_dr_spm: f64,
    pub iterations: usize,
    pub residual: f64,
}

impl NodeRow {
    fn from_solution(n: &NodeSolution) -> Self {
        Self {
            altitude_m: n.condition.altitude.value,
            tas_mps: n.condition.tas.value,
            mach: n.condition.mach,
            alpha_deg: n.alpha.map(|a| a.value.to_degrees()),
            gamma_deg: n.flight_path_angle.map(|g| g.value.to_degrees()),
            gamma_rate_radpm: n.flight_path_angle_rate,
            thrust_required_n: n.thrust_required.value,
            thrust_delivered_n: n.thrust_delivered.map(|t| t.value),
            throttle: n.throttle,
            throttle_status: n.throttle_status.map(status_str),
            lift_n: n.lift.value,
            drag_n: n.drag.value,
            load_factor: n.load_factor,
            normal_force_n: n.normal_force.value,
            fuselage_pitch_deg: n.fuselage_pitch.value.to_degrees(),
            fuel_flow_kgps: n.fuel_flow.map(|f| f.value),
            dmass_dr_kgpm: n.dmass_dr,
            dt_dr_spm: n.dt_dr,
            iterations: n.iterations,
            residual: n.residual.max_norm(),
        }
    }
}

fn status_str(status: ThrottleStatus) -> &'static str {
    match status {
        ThrottleStatus::Balanced => "balanced",
        ThrottleStatus::Saturated { bound } => bound.as_str(),
    }
}

impl<'a> Report<'a> {
    pub fn new(case: &'a str, solution: &ControlSolution) -> Self {
        Self {
            case,
            total_iterations: solution.total_iterations,
            max_residual: solution.max_residual,
            saturated_nodes: solution
                .saturated_nodes()
                .into_iter()
                .map(|(node, bound)| SaturatedRow {
                    node,
                    bound: bound.as_str(),
                })
                .collect(),
            nodes: solution.nodes.iter().map(NodeRow::from_solution).collect(),
        }
    }

    pub fn write_table(&self, out: &mut impl Write) -> std::io::Result<()> {
        writeln!(out, "Case: {}", self.case)?;
        writeln!(
            out,
            "{:>4} {:>9} {:>8} {:>7} {:>8} {:>12} {:>12} {:>8} {:>9} {:>12} {:>4} {:>10}",
            "node",
            "h [m]",
            "V [m/s]",
            "alpha",
            "gamma",
            "T_req [N]",
            "T_del [N]",
            "throttle",
            "status",
            "dm/dr [kg/m]",
            "it",
            "residual"
        )?;
        for (i, n) in self.nodes.iter().enumerate() {
            writeln!(
                out,
                "{:>4} {:>9.1} {:>8.2} {:>7} {:>8} {:>12.1} {:>12} {:>8} {:>9} {:>12} {:>4} {:>10.2e}",
                i,
                n.altitude_m,
                n.tas_mps,
                opt(n.alpha_deg, 3),
                opt(n.gamma_deg, 3),
                n.thrust_required_n,
                opt(n.thrust_delivered_n, 1),
                opt(n.throttle, 4),
                n.throttle_status.unwrap_or("-"),
                opt_exp(n.dmass_dr_kgpm, 4),
                n.iterations,
                n.residual
            )?;
        }
        writeln!(
            out,
            "Total iterations: {}, max residual: {:.2e}",
            self.total_iterations, self.max_residual
        )?;
        for s in &self.saturated_nodes {
            writeln!(out, "! node {} saturated at {} throttle", s.node, s.bound)?;
        }
        Ok(())
    }
}

fn opt(value: Option<f64>, precision: usize) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.precision$}"))
}

fn opt_exp(value: Option<f64>, precision: usize) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.precision$e}"))
}
