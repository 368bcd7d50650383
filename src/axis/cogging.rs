//! Anti-cogging map (§3, §9): a feed-forward table that cancels reluctance
//! torque ripple, added on top of the controller's commanded current. The
//! source allocates a CPR-sized float buffer on first entry into a control
//! loop and tolerates allocation failure by skipping the feature entirely
//! rather than failing the axis — modeled here with `try_reserve_exact`
//! instead of a plain `Vec` push, which would abort the process on the
//! embedded targets this is meant to run on.

use super::Axis;
use crate::util::cogging_index;

impl Axis {
    /// Allocates the map on first call; a no-op on every call after that,
    /// successful or not.
    pub(super) fn ensure_cogging_map(&mut self) {
        if self.cogging_map.is_some() {
            return;
        }
        let cpr = self.encoder.cpr() as usize;
        if cpr == 0 {
            return;
        }
        let mut buf: Vec<f64> = Vec::new();
        if buf.try_reserve_exact(cpr).is_err() {
            return;
        }
        buf.resize(cpr, 0.0);
        self.cogging_map = Some(buf.into_boxed_slice());
    }

    /// Feed-forward current at `pos`, or `0.0` if no map was allocated.
    pub(super) fn cogging_feedforward(&self, pos: f64) -> f64 {
        match &self.cogging_map {
            Some(map) if !map.is_empty() => map[cogging_index(pos, map.len() as u32)],
            _ => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests_support::new_test_axis;

    #[test]
    fn allocates_once_sized_by_cpr_and_is_idempotent() {
        let (mut axis, _handle) = new_test_axis();
        assert_eq!(axis.cogging_feedforward(0.0), 0.0);

        axis.ensure_cogging_map();
        let cpr = axis.encoder.cpr() as usize;
        let map = axis.cogging_map.as_ref().expect("map allocated");
        assert_eq!(map.len(), cpr);
        let first_ptr = map.as_ptr();

        axis.ensure_cogging_map();
        assert_eq!(
            axis.cogging_map.as_ref().unwrap().as_ptr(),
            first_ptr,
            "second call must not reallocate"
        );
    }

    #[test]
    fn feedforward_reads_back_a_written_bucket() {
        let (mut axis, _handle) = new_test_axis();
        axis.ensure_cogging_map();
        let cpr = axis.cogging_map.as_ref().unwrap().len();
        axis.cogging_map.as_mut().unwrap()[5 % cpr] = 0.42;
        assert_eq!(axis.cogging_feedforward(5.0), 0.42);
    }
}
