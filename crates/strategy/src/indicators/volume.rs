/// Bar-over-bar relative volume change: `(v[i] - v[i-1]) / v[i-1]`.
///
/// The first bar has no predecessor and is `None`. A zero previous volume
/// yields `+inf` when the current volume is positive and `None` when both are
/// zero, so the result is never NaN.
pub fn volume_change(volumes: &[f64]) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(volumes.len());
    if volumes.is_empty() {
        return out;
    }
    out.push(None);
    out.extend(volumes.windows(2).map(|w| {
        let (prev, curr) = (w[0], w[1]);
        if prev == 0.0 {
            if curr > 0.0 {
                Some(f64::INFINITY)
            } else {
                None
            }
        } else {
            Some((curr - prev) / prev)
        }
    }));
    out
}
