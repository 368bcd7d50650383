/// Motor PWM drive, current sensing and gate-driver hardware. Out of scope
/// per §1; this crate only depends on the capability set below.
///
/// `disarm` is not in the spec's bare list of consumed operations (§6 lists
/// `setup`, `arm`, `run_calibration`, `update`, `do_checks` plus the
/// `armed_state`/`is_calibrated` observables) but §5 requires `run_idle_loop`
/// to disarm PWM "unconditionally and synchronously" on entry to Idle, which
/// is not expressible through `arm`'s return value alone — so it is added
/// here as the obvious counterpart to `arm`.
pub trait Motor: Send {
    fn setup(&mut self) -> bool;
    fn arm(&mut self) -> bool;
    fn disarm(&mut self);
    fn run_calibration(&mut self) -> bool;
    /// Commands a stator current vector. `phase` is electrical angle in
    /// radians. Returns `false` on a hardware fault.
    fn update(&mut self, i_mag: f64, phase: f64) -> bool;
    /// Returns `true` iff the motor has no outstanding fault.
    fn do_checks(&mut self) -> bool;
    fn armed_state(&self) -> bool;
    fn is_calibrated(&self) -> bool;
}
