/// Trapezoidal profile generator. Out of scope per §1 — this crate only
/// ever calls `plan_trapezoidal` and lets the controller's `Trajectory`
/// control mode consume whatever profile results.
pub trait TrapezoidalTrajectory: Send {
    #[allow(clippy::too_many_arguments)]
    fn plan_trapezoidal(
        &mut self,
        goal_pos: f64,
        current_pos: f64,
        current_vel: f64,
        v_max: f64,
        a_max: f64,
        d_max: f64,
    );
}
