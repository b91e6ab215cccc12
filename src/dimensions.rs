//! Pure calculation of output dimensions from source size and bounds.
//!
//! All functions here are pure and testable without any I/O or images.

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum DimensionError {
    #[error("source dimensions must be positive, got {width}x{height}")]
    EmptySource { width: u32, height: u32 },
}

/// Compute output dimensions for a resize constrained by optional bounds.
///
/// A bound of `0` means "unconstrained" on that axis. Rules, in order:
///
/// 1. Both bounds zero: output equals input (the pipeline still re-encodes).
/// 2. Only one bound given: scale the bounded axis to it, derive the other
///    from the source aspect ratio.
/// 3. Both bounds given: scale the longer source edge to its bound first;
///    a square source takes the tighter of the two bounds on both axes.
/// 4. Clamp-and-recompute: if the derived value still exceeds its bound,
///    re-derive from the exceeded bound so neither output exceeds either
///    bound.
///
/// All derived values are rounded to the nearest pixel.
///
/// # Examples
/// ```
/// # use shrinkray::dimensions::resolve;
/// // No bounds: identity
/// assert_eq!(resolve(200, 100, 0, 0), Ok((200, 100)));
///
/// // Width bound only: height follows the aspect ratio
/// assert_eq!(resolve(100, 100, 50, 0), Ok((50, 50)));
/// ```
pub fn resolve(
    src_w: u32,
    src_h: u32,
    max_w: u32,
    max_h: u32,
) -> Result<(u32, u32), DimensionError> {
    if src_w == 0 || src_h == 0 {
        return Err(DimensionError::EmptySource {
            width: src_w,
            height: src_h,
        });
    }

    if max_w == 0 && max_h == 0 {
        return Ok((src_w, src_h));
    }

    let (src_w_f, src_h_f) = (src_w as f64, src_h as f64);
    let mut new_w = max_w as f64;
    let mut new_h = max_h as f64;

    if max_w == 0 {
        new_w = (src_w_f * (max_h as f64 / src_h_f)).round();
    } else if max_h == 0 {
        new_h = (src_h_f * (max_w as f64 / src_w_f)).round();
    } else if src_w > src_h {
        new_h = (src_h_f * (new_w / src_w_f)).round();
    } else if src_h > src_w {
        new_w = (src_w_f * (new_h / src_h_f)).round();
    } else {
        // Square source: the tighter bound wins on both axes.
        if max_w > max_h {
            new_w = max_h as f64;
        } else if max_h > max_w {
            new_h = max_w as f64;
        }
    }

    // A bound can still be exceeded when the aspect ratios disagree with the
    // longer-edge choice above; re-derive from the exceeded bound.
    if max_w != 0 && new_w > max_w as f64 {
        new_w = max_w as f64;
        new_h = (src_h_f * (new_w / src_w_f)).round();
    }
    if max_h != 0 && new_h > max_h as f64 {
        new_h = max_h as f64;
        new_w = (src_w_f * (new_h / src_h_f)).round();
    }

    Ok((new_w as u32, new_h as u32))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_bounds_is_identity() {
        assert_eq!(resolve(200, 100, 0, 0), Ok((200, 100)));
        assert_eq!(resolve(1, 1, 0, 0), Ok((1, 1)));
    }

    #[test]
    fn zero_source_rejected() {
        assert_eq!(
            resolve(0, 100, 50, 0),
            Err(DimensionError::EmptySource {
                width: 0,
                height: 100
            })
        );
        assert!(resolve(100, 0, 0, 0).is_err());
        assert!(resolve(0, 0, 10, 10).is_err());
    }

    #[test]
    fn height_bound_only_scales_width() {
        // 400x200 bounded to height 100 → 200x100
        assert_eq!(resolve(400, 200, 0, 100), Ok((200, 100)));
    }

    #[test]
    fn width_bound_only_scales_height() {
        // 400x200 bounded to width 100 → 100x50
        assert_eq!(resolve(400, 200, 100, 0), Ok((100, 50)));
    }

    #[test]
    fn landscape_derives_height_from_width_bound() {
        // Wider than tall: width bound drives
        assert_eq!(resolve(2000, 1000, 500, 400), Ok((500, 250)));
    }

    #[test]
    fn portrait_derives_width_from_height_bound() {
        assert_eq!(resolve(1000, 2000, 400, 500), Ok((250, 500)));
    }

    #[test]
    fn square_takes_tighter_bound() {
        assert_eq!(resolve(100, 100, 80, 50), Ok((50, 50)));
        assert_eq!(resolve(100, 100, 50, 80), Ok((50, 50)));
        assert_eq!(resolve(100, 100, 50, 50), Ok((50, 50)));
    }

    #[test]
    fn clamp_recomputes_when_first_pass_exceeds() {
        // 1000x900 (landscape) bounded to 800x300: width-first gives
        // 800x720, height exceeds the bound → re-derived as 333x300.
        assert_eq!(resolve(1000, 900, 800, 300), Ok((333, 300)));
    }

    #[test]
    fn neither_output_exceeds_its_bound() {
        let cases = [
            (1000u32, 900u32, 800u32, 300u32),
            (900, 1000, 300, 800),
            (3000, 100, 200, 90),
            (100, 3000, 90, 200),
            (1920, 1080, 100, 100),
            (640, 480, 640, 480),
        ];
        for (sw, sh, mw, mh) in cases {
            let (w, h) = resolve(sw, sh, mw, mh).unwrap();
            assert!(w <= mw, "{sw}x{sh} bounded {mw}x{mh} gave width {w}");
            assert!(h <= mh, "{sw}x{sh} bounded {mw}x{mh} gave height {h}");
        }
    }

    #[test]
    fn aspect_ratio_preserved_within_rounding() {
        let cases = [
            (2000u32, 1500u32, 800u32, 0u32),
            (1500, 2000, 0, 800),
            (1234, 567, 321, 0),
            (567, 1234, 0, 321),
        ];
        for (sw, sh, mw, mh) in cases {
            let (w, h) = resolve(sw, sh, mw, mh).unwrap();
            let expected_h = (sh as f64 * w as f64 / sw as f64).round();
            assert!(
                (h as f64 - expected_h).abs() <= 1.0,
                "{sw}x{sh} → {w}x{h}: off-aspect"
            );
        }
    }

    #[test]
    fn resolve_is_idempotent() {
        let cases = [
            (2000u32, 1500u32, 800u32, 600u32),
            (100, 100, 50, 0),
            (1000, 900, 800, 300),
            (640, 480, 0, 0),
        ];
        for (sw, sh, mw, mh) in cases {
            let (w, h) = resolve(sw, sh, mw, mh).unwrap();
            assert_eq!(
                resolve(w, h, mw, mh),
                Ok((w, h)),
                "resolve drifted for {sw}x{sh} bounded {mw}x{mh}"
            );
        }
    }

    #[test]
    fn upscaling_is_allowed() {
        // Bounds larger than the source scale up; only zero means "leave alone".
        assert_eq!(resolve(100, 50, 200, 0), Ok((200, 100)));
    }
}
