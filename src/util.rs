// needed since anyhow::ensure makes everything into an anyhow::Error
macro_rules! ensure_own {
    ($condition:expr, $err:expr) => {{
        if !($condition) {
            return Err($err.into());
        }
    }};
}

// needed since anyhow::bail makes everything into an anyhow::Error
macro_rules! bail_own {
    ($err:expr) => {{
        return Err($err.into());
    }};
}

pub(crate) use {bail_own, ensure_own};

/// Wraps a continuous position estimate into `[0, cpr)`, the bucket domain
/// the anti-cogging map is indexed over. `cpr == 0` (no encoder bound yet)
/// maps everything to bucket 0.
pub(crate) fn cogging_index(pos: f64, cpr: u32) -> usize {
    if cpr == 0 {
        return 0;
    }
    pos.rem_euclid(cpr as f64) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cogging_index_wraps_negative_and_large_positions() {
        assert_eq!(cogging_index(-1.0, 8192), 8191);
        assert_eq!(cogging_index(8192.0 + 3.0, 8192), 3);
        assert_eq!(cogging_index(5.0, 0), 0);
    }
}
