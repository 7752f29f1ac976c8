//! "Nice" evaluation grids
//!
//! KDE curves are sampled and histograms are binned on human-friendly
//! values: steps of 1, 2 or 5 times a power of ten, chosen so that roughly
//! `count` values cover the domain.

use crate::error::{Result, StatsError};

const E10: f64 = 7.071_067_811_865_476; // sqrt(50)
const E5: f64 = 3.162_277_660_168_379_5; // sqrt(10)
const E2: f64 = std::f64::consts::SQRT_2;

/// Half-up rounding, so that `-2.5` rounds to `-2` like the tick grids
/// produced elsewhere in the charting stack
fn round_half_up(x: f64) -> f64 {
    (x + 0.5).floor()
}

/// Integer tick range `[i1, i2]` and signed increment
///
/// A negative increment `-m` means ticks are `i / m` (used for sub-unit
/// steps to avoid accumulating binary fractions).
fn tick_range(start: f64, stop: f64, count: f64) -> (f64, f64, f64) {
    let step = (stop - start) / count.max(0.0);
    let power = step.log10().floor();
    let error = step / 10f64.powf(power);
    let factor = if error >= E10 {
        10.0
    } else if error >= E5 {
        5.0
    } else if error >= E2 {
        2.0
    } else {
        1.0
    };

    let (mut i1, mut i2, inc);
    if power < 0.0 {
        let m = 10f64.powf(-power) / factor;
        i1 = round_half_up(start * m);
        i2 = round_half_up(stop * m);
        if i1 / m < start {
            i1 += 1.0;
        }
        if i2 / m > stop {
            i2 -= 1.0;
        }
        inc = -m;
    } else {
        let m = 10f64.powf(power) * factor;
        i1 = round_half_up(start / m);
        i2 = round_half_up(stop / m);
        if i1 * m < start {
            i1 += 1.0;
        }
        if i2 * m > stop {
            i2 -= 1.0;
        }
        inc = m;
    }

    if i2 < i1 && (0.5..2.0).contains(&count) {
        return tick_range(start, stop, count * 2.0);
    }
    (i1, i2, inc)
}

/// Step between consecutive ticks for `count` ticks over `[start, stop]`
pub fn tick_step(start: f64, stop: f64, count: usize) -> f64 {
    let (lo, hi) = if stop < start { (stop, start) } else { (start, stop) };
    let (_, _, inc) = tick_range(lo, hi, count as f64);
    if inc < 0.0 {
        1.0 / -inc
    } else {
        inc
    }
}

/// Approximately `count` nice values covering `[start, stop]`
///
/// - `count == 0` or a non-finite bound yields no ticks
/// - `start == stop` yields `[start]`
/// - a reversed domain yields descending ticks
pub fn ticks(start: f64, stop: f64, count: usize) -> Vec<f64> {
    if count == 0 || !start.is_finite() || !stop.is_finite() {
        return Vec::new();
    }
    if start == stop {
        return vec![start];
    }

    let reverse = stop < start;
    let (i1, i2, inc) = if reverse {
        tick_range(stop, start, count as f64)
    } else {
        tick_range(start, stop, count as f64)
    };
    if !(i2 >= i1) {
        return Vec::new();
    }

    let n = (i2 - i1) as usize + 1;
    let value = |i: f64| if inc < 0.0 { i / -inc } else { i * inc };
    (0..n)
        .map(|k| {
            let i = if reverse { i2 - k as f64 } else { i1 + k as f64 };
            value(i)
        })
        .collect()
}

/// `n` evenly spaced values from `start` to `stop` inclusive
pub fn linspace(start: f64, stop: f64, n: usize) -> Result<Vec<f64>> {
    if !start.is_finite() || !stop.is_finite() {
        return Err(StatsError::InvalidDomain { start, stop });
    }
    Ok(match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (n - 1) as f64;
            (0..n)
                .map(|i| if i == n - 1 { stop } else { start + step * i as f64 })
                .collect()
        }
    })
}
