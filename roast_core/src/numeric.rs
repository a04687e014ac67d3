//! Small dense numerical helpers: medians, NaN-aware means, least squares,
//! polynomial fitting and Savitzky-Golay derivative coefficients.
//!
//! Systems here are tiny (polynomial order + 1 unknowns), so plain Gaussian
//! elimination with partial pivoting in `f64` is sufficient.

use crate::error::NumericError;

/// Median of the finite values in `v`.
pub fn median(v: &[f64]) -> Option<f64> {
    let mut xs: Vec<f64> = v.iter().copied().filter(|x| x.is_finite()).collect();
    if xs.is_empty() {
        return None;
    }
    xs.sort_by(f64::total_cmp);
    let mid = xs.len() / 2;
    Some(if xs.len() % 2 == 0 {
        (xs[mid - 1] + xs[mid]) / 2.0
    } else {
        xs[mid]
    })
}

/// Mean of the non-`NaN` values; `None` when there are none.
pub fn nan_mean(v: &[f64]) -> Option<f64> {
    let (sum, n) = v
        .iter()
        .filter(|x| !x.is_nan())
        .fold((0.0f64, 0usize), |(s, n), x| (s + x, n + 1));
    (n > 0).then(|| sum / n as f64)
}

/// Solve `a * x = b` for several right-hand sides at once.
///
/// `a` is `n x n`, `b` is `n x m`; returns `x` as `n x m`.
pub fn solve(mut a: Vec<Vec<f64>>, mut b: Vec<Vec<f64>>) -> Result<Vec<Vec<f64>>, NumericError> {
    let n = a.len();
    if b.len() != n || a.iter().any(|row| row.len() != n) {
        return Err(NumericError::Singular);
    }
    let scale = a
        .iter()
        .flat_map(|r| r.iter())
        .fold(0.0f64, |m, v| m.max(v.abs()));
    let tiny = scale * 1e-13;

    for col in 0..n {
        let pivot = (col..n)
            .max_by(|&i, &j| a[i][col].abs().total_cmp(&a[j][col].abs()))
            .ok_or(NumericError::Singular)?;
        if !(a[pivot][col].abs() > tiny) {
            return Err(NumericError::Singular);
        }
        a.swap(col, pivot);
        b.swap(col, pivot);
        for row in (col + 1)..n {
            let f = a[row][col] / a[col][col];
            if f == 0.0 {
                continue;
            }
            for k in col..n {
                a[row][k] -= f * a[col][k];
            }
            for k in 0..b[row].len() {
                b[row][k] -= f * b[col][k];
            }
        }
    }

    let m = b.first().map_or(0, Vec::len);
    let mut x = vec![vec![0.0; m]; n];
    for row in (0..n).rev() {
        for k in 0..m {
            let mut acc = b[row][k];
            for j in (row + 1)..n {
                acc -= a[row][j] * x[j][k];
            }
            x[row][k] = acc / a[row][row];
        }
    }
    if x.iter().flatten().any(|v| !v.is_finite()) {
        return Err(NumericError::Singular);
    }
    Ok(x)
}

/// Least-squares polynomial fitted on centred and scaled abscissae.
#[derive(Debug, Clone, PartialEq)]
pub struct Polynomial {
    /// Coefficients in ascending powers of `(x - shift) / scale`.
    coeffs: Vec<f64>,
    shift: f64,
    scale: f64,
}

impl Polynomial {
    pub fn eval(&self, x: f64) -> f64 {
        let t = (x - self.shift) / self.scale;
        self.coeffs.iter().rev().fold(0.0, |acc, c| acc * t + c)
    }

    /// Effective degree (may be lower than requested for sparse inputs).
    pub fn degree(&self) -> usize {
        self.coeffs.len().saturating_sub(1)
    }
}

/// Fit `y ~ p(x)` of the given degree by least squares.
///
/// Pairs with a non-finite coordinate are skipped. The degree is lowered to
/// `distinct_x - 1` when there are too few distinct abscissae.
pub fn polyfit(x: &[f64], y: &[f64], degree: usize) -> Result<Polynomial, NumericError> {
    let pts: Vec<(f64, f64)> = x
        .iter()
        .zip(y)
        .map(|(a, b)| (*a, *b))
        .filter(|(a, b)| a.is_finite() && b.is_finite())
        .collect();
    if pts.is_empty() {
        return Err(NumericError::NotEnoughPoints { need: 1, got: 0 });
    }
    let mut xs: Vec<f64> = pts.iter().map(|p| p.0).collect();
    xs.sort_by(f64::total_cmp);
    xs.dedup();
    let degree = degree.min(xs.len() - 1);

    let shift = pts.iter().map(|p| p.0).sum::<f64>() / pts.len() as f64;
    let spread = pts.iter().fold(0.0f64, |m, p| m.max((p.0 - shift).abs()));
    let scale = if spread > 0.0 { spread } else { 1.0 };

    let k = degree + 1;
    let mut ata = vec![vec![0.0; k]; k];
    let mut aty = vec![vec![0.0; 1]; k];
    for (px, py) in &pts {
        let t = (px - shift) / scale;
        let powers: Vec<f64> = (0..k).map(|e| t.powi(e as i32)).collect();
        for r in 0..k {
            aty[r][0] += powers[r] * py;
            for c in 0..k {
                ata[r][c] += powers[r] * powers[c];
            }
        }
    }
    let sol = solve(ata, aty)?;
    Ok(Polynomial {
        coeffs: sol.into_iter().map(|r| r[0]).collect(),
        shift,
        scale,
    })
}

/// `k! / (k - d)!`
fn falling_factorial(k: usize, d: usize) -> f64 {
    ((k - d + 1)..=k).fold(1.0, |acc, v| acc * v as f64)
}

/// Savitzky-Golay coefficient table for one window geometry.
///
/// `rows[o]` holds the weights that, dotted with a window of `window_length`
/// samples, yield the `deriv`-th derivative (per sample index) of the local
/// polynomial evaluated at window offset `o`.
#[derive(Debug, Clone)]
pub struct SavgolKernel {
    window_length: usize,
    rows: Vec<Vec<f64>>,
}

impl SavgolKernel {
    pub fn new(window_length: usize, polyorder: usize, deriv: u32) -> Result<Self, NumericError> {
        if polyorder >= window_length {
            return Err(NumericError::PolyorderTooLarge {
                polyorder,
                window_length,
            });
        }
        let d = deriv as usize;
        let half = (window_length / 2) as f64;
        let k = polyorder + 1;
        if d > polyorder {
            return Ok(Self {
                window_length,
                rows: vec![vec![0.0; window_length]; window_length],
            });
        }

        // Vandermonde on centred offsets j - half.
        let offsets: Vec<f64> = (0..window_length).map(|j| j as f64 - half).collect();
        let mut vtv = vec![vec![0.0; k]; k];
        let mut vt = vec![vec![0.0; window_length]; k];
        for (j, &x) in offsets.iter().enumerate() {
            for r in 0..k {
                vt[r][j] = x.powi(r as i32);
            }
        }
        for r in 0..k {
            for c in 0..k {
                vtv[r][c] = (0..window_length).map(|j| vt[r][j] * vt[c][j]).sum();
            }
        }
        // Rows of pinv: coefficient a_r = pinv[r] . window
        let pinv = solve(vtv, vt)?;

        let rows = offsets
            .iter()
            .map(|&x0| {
                (0..window_length)
                    .map(|j| {
                        (d..k)
                            .map(|r| pinv[r][j] * falling_factorial(r, d) * x0.powi((r - d) as i32))
                            .sum()
                    })
                    .collect()
            })
            .collect();
        Ok(Self {
            window_length,
            rows,
        })
    }

    /// Apply to a dense signal using polynomial interpolation at both edges.
    /// Requires `y.len() >= window_length`.
    pub fn apply(&self, y: &[f64]) -> Result<Vec<f64>, NumericError> {
        let w = self.window_length;
        let n = y.len();
        if n < w {
            return Err(NumericError::NotEnoughPoints { need: w, got: n });
        }
        let half = w / 2;
        let dot = |row: &[f64], start: usize| -> f64 {
            row.iter().zip(&y[start..start + w]).map(|(c, v)| c * v).sum()
        };
        let out = (0..n)
            .map(|i| {
                if i < half {
                    dot(&self.rows[i], 0)
                } else if i + half >= n {
                    dot(&self.rows[i + w - n], n - w)
                } else {
                    dot(&self.rows[half], i - half)
                }
            })
            .collect();
        Ok(out)
    }
}

/// Linear interpolation over `NaN` gaps followed by edge back/forward fill.
/// An all-`NaN` input is returned unchanged.
pub fn fill_gaps(v: &[f64]) -> Vec<f64> {
    let known: Vec<usize> = (0..v.len()).filter(|&i| !v[i].is_nan()).collect();
    let (Some(&first), Some(&last)) = (known.first(), known.last()) else {
        return v.to_vec();
    };
    let mut out = v.to_vec();
    for slot in out.iter_mut().take(first) {
        *slot = v[first];
    }
    for slot in out.iter_mut().skip(last + 1) {
        *slot = v[last];
    }
    for pair in known.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        let span = (b - a) as f64;
        for i in (a + 1)..b {
            let frac = (i - a) as f64 / span;
            out[i] = v[a] + (v[b] - v[a]) * frac;
        }
    }
    out
}
