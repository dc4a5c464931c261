//! Screen-space kernel density for the heatmap layer.

use crate::models::ScreenPoint;

/// Cells below this density are not drawn.
pub const MIN_DENSITY: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DensityCell {
    pub center: ScreenPoint,
    pub density: f64,
}

/// Accumulate weighted Gaussian kernels onto a `cell`-pixel grid covering
/// `width` x `height`, scale by `intensity`, and clamp to [0, 1].
///
/// `radius` is where a kernel has fallen off to roughly 1% of its peak.
pub fn density_grid(
    points: &[(ScreenPoint, f64)],
    radius: f64,
    cell: f64,
    intensity: f64,
    width: f64,
    height: f64,
) -> Vec<DensityCell> {
    if radius <= 0.0 || cell <= 0.0 || width <= 0.0 || height <= 0.0 {
        return Vec::new();
    }
    let cols = (width / cell).ceil() as usize;
    let rows = (height / cell).ceil() as usize;
    let mut grid = vec![0.0_f64; cols * rows];
    let reach = (radius / cell).ceil() as i64;

    for &(p, weight) in points {
        if weight <= 0.0 {
            continue;
        }
        let pc = (p.x / cell).floor() as i64;
        let pr = (p.y / cell).floor() as i64;
        for r in (pr - reach).max(0)..=(pr + reach).min(rows as i64 - 1) {
            for c in (pc - reach).max(0)..=(pc + reach).min(cols as i64 - 1) {
                let center = cell_center(c as usize, r as usize, cell);
                let d = center.distance(p) / radius;
                if d > 1.0 {
                    continue;
                }
                grid[r as usize * cols + c as usize] += weight * (-4.5 * d * d).exp();
            }
        }
    }

    grid.iter()
        .enumerate()
        .filter_map(|(i, &sum)| {
            let density = (sum * intensity).clamp(0.0, 1.0);
            (density >= MIN_DENSITY).then(|| DensityCell {
                center: cell_center(i % cols, i / cols, cell),
                density,
            })
        })
        .collect()
}

fn cell_center(col: usize, row: usize, cell: f64) -> ScreenPoint {
    ScreenPoint::new((col as f64 + 0.5) * cell, (row as f64 + 0.5) * cell)
}
