/// Exponentially spaced search offsets from `min_offset` up to `max_offset`.
///
/// `offset_k = min * (max/min)^(k/(attempts-1))`, rounded up to one decimal,
/// with the last value exactly `max_offset`. Dense near zero, where most drift
/// lives, and sparse near the cap. Repeated values after rounding are dropped.
///
/// `expansion_offsets(0.5, 20.0, 5)` gives `[0.5, 1.3, 3.2, 8.0, 20.0]`.
pub fn expansion_offsets(min_offset: f64, max_offset: f64, attempts: usize) -> Vec<f64> {
    if attempts <= 1 || max_offset <= min_offset {
        return vec![max_offset];
    }

    let growth = (max_offset / min_offset).powf(1.0 / (attempts - 1) as f64);
    let mut offsets: Vec<f64> = (0..attempts - 1)
        .map(|k| {
            let raw = min_offset * growth.powi(k as i32) * 10.0;
            // guard against 5.0000000001 rounding up to 5.1
            (raw - 1e-9).ceil() / 10.0
        })
        .filter(|offset| *offset < max_offset)
        .collect();
    offsets.push(max_offset);
    offsets.dedup();
    offsets
}
