/// Upper bound on tick marks for one axis.
const MAX_TICKS: usize = 100;

/// Linear value axis with "nice number" ticks and data → pixel mapping.
#[derive(Debug, Clone)]
pub struct Axis {
    pub min: f64,
    pub max: f64,
    pub ticks: Vec<(f64, String)>,
}

impl Axis {
    pub fn auto_linear(data_min: f64, data_max: f64, target_ticks: usize) -> Self {
        let (nice_min, nice_max, step) = nice_range(data_min, data_max, target_ticks);
        let n = (((nice_max - nice_min) / step).round() as usize).min(MAX_TICKS - 1);
        let ticks = (0..=n)
            .map(|i| {
                let v = nice_min + i as f64 * step;
                (v, format_tick(v, step))
            })
            .collect();
        Self {
            min: nice_min,
            max: nice_max,
            ticks,
        }
    }

    /// Map a data value into `[px_min, px_max]`. Pass the pixel bounds
    /// reversed for a y axis.
    pub fn data_to_pixel(&self, value: f64, px_min: f64, px_max: f64) -> f64 {
        let frac = (value - self.min) / (self.max - self.min);
        px_min + frac * (px_max - px_min)
    }
}

fn nice_range(data_min: f64, data_max: f64, target_ticks: usize) -> (f64, f64, f64) {
    if !data_min.is_finite() || !data_max.is_finite() {
        return flat_range(0.0);
    }
    if (data_max - data_min).abs() < 1e-15 {
        return flat_range(data_min);
    }
    let range = data_max - data_min;
    let rough_step = range / (target_ticks.max(2) - 1) as f64;
    let step = nice_step(rough_step);
    let nice_min = (data_min / step).floor() * step;
    let nice_max = (data_max / step).ceil() * step;
    // A step below float resolution at this magnitude cannot separate ticks.
    if step <= nice_min.abs().max(nice_max.abs()) * f64::EPSILON || nice_min >= nice_max {
        return flat_range(data_min + range / 2.0);
    }
    (nice_min, nice_max, step)
}

/// Three ticks around `center`, padded wide enough to stay distinct at
/// large magnitudes.
fn flat_range(center: f64) -> (f64, f64, f64) {
    let pad = (center.abs() * 1e-9).max(1.0);
    (center - pad, center + pad, pad)
}

fn nice_step(rough: f64) -> f64 {
    let exp = rough.abs().log10().floor();
    let frac = rough / 10.0_f64.powf(exp);
    let nice_frac = if frac <= 1.5 {
        1.0
    } else if frac <= 3.5 {
        2.0
    } else if frac <= 7.5 {
        5.0
    } else {
        10.0
    };
    nice_frac * 10.0_f64.powf(exp)
}

fn format_tick(value: f64, step: f64) -> String {
    let decimals = if step >= 1.0 {
        0
    } else {
        (-step.log10().floor()) as usize
    };
    // Snap values within rounding noise of zero so "-0" never shows.
    let v = if value.abs() < step * 0.01 { 0.0 } else { value };
    if decimals == 0 {
        format!("{}", v.round() as i64)
    } else {
        format!("{:.prec$}", v, prec = decimals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auto_linear_covers_data() {
        let ax = Axis::auto_linear(0.0, 10.0, 6);
        assert!(!ax.ticks.is_empty());
        assert!(ax.min <= 0.0);
        assert!(ax.max >= 10.0);
    }

    #[test]
    fn test_data_to_pixel() {
        let ax = Axis::auto_linear(0.0, 100.0, 5);
        let px = ax.data_to_pixel(50.0, 0.0, 500.0);
        assert!((px - 250.0).abs() < 1.0);
    }

    #[test]
    fn test_nice_step_values() {
        assert!((nice_step(3.2) - 2.0).abs() < 1e-9);
        assert!((nice_step(0.7) - 0.5).abs() < 1e-9);
        assert!((nice_step(15.0) - 10.0).abs() < 1e-9);
        assert!((nice_step(4.5) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_flat_range_still_has_ticks() {
        let ax = Axis::auto_linear(3.0, 3.0, 5);
        assert!(ax.min < 3.0 && ax.max > 3.0);
        assert_eq!(format_tick(-0.0001, 0.1), "0.0");
    }

    #[test]
    fn test_huge_values_have_bounded_ticks() {
        let ax = Axis::auto_linear(1e17, 1e17 + 32.0, 6);
        assert!(!ax.ticks.is_empty());
        assert!(ax.ticks.len() <= MAX_TICKS);
        assert!(ax.min < ax.max);
        assert!(ax.min <= 1e17 && ax.max >= 1e17 + 32.0);
        let px = ax.data_to_pixel(1e17, 0.0, 500.0);
        assert!(px.is_finite());
    }

    #[test]
    fn test_tick_count_is_capped() {
        let ax = Axis::auto_linear(0.0, 1000.0, 10_000);
        assert!(ax.ticks.len() <= MAX_TICKS);
        assert_eq!(ax.ticks[0].0, ax.min);

        let ax = Axis::auto_linear(f64::NAN, 5.0, 6);
        assert!(ax.min < ax.max);
        assert_eq!(ax.ticks.len(), 3);
    }
}
