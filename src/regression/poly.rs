use tracing::warn;
use crate::regression::solver::solve_linear_system;

/// Largest polynomial degree tried by the best-fit search. The normal
/// equations use a raw monomial basis, which is ill-conditioned past
/// degree ~6 on non-normalised keys; a Chebyshev basis would be needed
/// to push further.
pub const MAX_POLY_DEGREE: usize = 6;

/// Evaluate a polynomial (coefficients in ascending order) by Horner.
pub fn eval_polynomial(coeffs: &[f64], x: f64) -> f64 {
    let mut r = 0.0;
    for &c in coeffs.iter().rev() {
        r = r * x + c;
    }
    r
}

/// Fit the best polynomial of degree 1..=max_degree by least squares,
/// scored by mean-squared error on the inputs. Degrees whose normal
/// equations turn out singular are skipped; if every degree fails the
/// identity coefficients [0, 1] are returned.
pub fn fit_best_polynomial(xs: &[f64], ys: &[f64], max_degree: usize) -> Vec<f64> {
    debug_assert_eq!(xs.len(), ys.len());
    let n = xs.len();
    let mut best = vec![0.0, 1.0];
    let mut best_mse = f64::INFINITY;
    let mut fitted_any = false;

    for d in 1..=max_degree {
        let m = d + 1;
        let mut ata = vec![vec![0.0; m]; m];
        let mut aty = vec![0.0; m];

        // Accumulate AᵀA and Aᵀy with a running power per sample
        let mut xp = vec![0.0; m];
        for i in 0..n {
            xp[0] = 1.0;
            for k in 1..m {
                xp[k] = xp[k - 1] * xs[i];
            }
            for r in 0..m {
                aty[r] += xp[r] * ys[i];
                for c in 0..m {
                    ata[r][c] += xp[r] * xp[c];
                }
            }
        }

        let coeffs = match solve_linear_system(&mut ata, &mut aty) {
            Ok(c) => c,
            Err(_) => continue,
        };

        let mut sse = 0.0;
        for i in 0..n {
            let diff = ys[i] - eval_polynomial(&coeffs, xs[i]);
            sse += diff * diff;
        }
        let mse = sse / n as f64;

        if mse < best_mse {
            best_mse = mse;
            best = coeffs;
            fitted_any = true;
        }
    }

    if !fitted_any {
        warn!(
            samples = n,
            max_degree, "All polynomial degrees singular, falling back to identity coefficients"
        );
    }
    best
}
