/// Configuration consumed from the debounced GPIO endstop collaborator
/// (§6). Owned by the endstop implementation; the Axis only reads it.
#[derive(Debug, Clone, Copy)]
pub struct EndstopConfig {
    pub enabled: bool,
    /// `false` means this endstop is a soft-stop: the homing phase treats a
    /// sustained zero-velocity window as the detection signal instead of a
    /// physical assertion (§4.3).
    pub physical_endstop: bool,
    pub min_ms_homing: u32,
    pub offset: i64,
    /// Percent of travel, `0` disables percentage-based homing.
    pub home_percentage: f64,
}

/// Debounced GPIO endstop. Out of scope per §1.
pub trait Endstop: Send {
    /// Samples and debounces the underlying GPIO; may consume loop-counter
    /// state set by an earlier update in the same tick (§4.4 update
    /// ordering).
    fn update(&mut self, loop_counter: u64);
    fn get_endstop_state(&self) -> bool;
    fn config(&self) -> &EndstopConfig;
    fn offset_from_home(&self) -> i64;
    fn set_offset_from_home(&mut self, offset: i64);
}
