/// Quadrature/SPI encoder decoding. Out of scope per §1.
pub trait Encoder: Send {
    fn setup(&mut self) -> bool;
    /// Samples the encoder and advances its internal estimate by one tick.
    fn update(&mut self);
    /// Returns `true` iff the encoder has no outstanding fault.
    fn do_checks(&mut self) -> bool;
    fn run_index_search(&mut self) -> bool;
    fn run_offset_calibration(&mut self) -> bool;
    /// Rewrites the offset-applied position. Used by homing to zero the
    /// reported position at a known mechanical offset.
    fn set_linear_count(&mut self, count: i64);
    fn pos_estimate(&self) -> f64;
    fn vel_estimate(&self) -> f64;
    fn phase(&self) -> f64;
    /// Raw unsigned accumulated count before offset/wrap.
    fn shadow_count(&self) -> i64;
    fn is_ready(&self) -> bool;
    fn cpr(&self) -> u32;
    fn use_index(&self) -> bool;
}
