//! Property-based tests for alpha compositing.

use proptest::prelude::*;
use termstage::color::blend_channel;
use termstage::{ALPHA_THRESHOLD, Canvas, Cell, Rgb};

fn rgb_strategy() -> impl Strategy<Value = Rgb> {
    (any::<u8>(), any::<u8>(), any::<u8>()).prop_map(|(r, g, b)| Rgb::new(r, g, b))
}

fn cell_strategy() -> impl Strategy<Value = Cell> {
    (
        prop::char::range('!', '~'),
        rgb_strategy(),
        rgb_strategy(),
        any::<u8>(),
    )
        .prop_map(|(ch, fg, bg, alpha)| Cell::new(ch, fg, bg).with_alpha(alpha))
}

/// Reference blend computed in floating point.
fn reference(dest: u8, src: u8, alpha: u8) -> f64 {
    let a = f64::from(alpha) / 255.0;
    f64::from(dest) * (1.0 - a) + f64::from(src) * a
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn blend_matches_rounded_formula(dest: u8, src: u8, alpha: u8) {
        let got = f64::from(blend_channel(dest, src, alpha));
        prop_assert!((got - reference(dest, src, alpha)).abs() <= 0.5 + 1e-9);
    }

    #[test]
    fn blend_endpoints(dest: u8, src: u8) {
        prop_assert_eq!(blend_channel(dest, src, 0), dest);
        prop_assert_eq!(blend_channel(dest, src, 255), src);
    }

    #[test]
    fn blend_stays_between_inputs(dest: u8, src: u8, alpha: u8) {
        let got = blend_channel(dest, src, alpha);
        prop_assert!(got >= dest.min(src) && got <= dest.max(src));
    }

    #[test]
    fn composite_replaces_glyph_only_above_threshold(dest in cell_strategy(), src in cell_strategy()) {
        let mut out = dest;
        src.composite_onto(&mut out);

        let expected = if src.alpha > ALPHA_THRESHOLD { src.ch } else { dest.ch };
        prop_assert_eq!(out.ch, expected);
        prop_assert_eq!(out.bg, Rgb::blend(dest.bg, src.bg, src.alpha));
        prop_assert_eq!(out.fg, Rgb::blend(dest.fg, src.fg, src.alpha));
        prop_assert_eq!(out.alpha, dest.alpha);
    }

    #[test]
    fn opaque_alpha_blit_equals_plain_blit(
        cells in prop::collection::vec(cell_strategy(), 6),
        x in -3i32..5,
        y in -3i32..5,
    ) {
        let mut src = Canvas::new(3, 2);
        for (i, cell) in cells.into_iter().enumerate() {
            src.set(i as u32 % 3, i as u32 / 3, cell.with_alpha(255));
        }
        let base = Canvas::filled(4, 4, Cell::new('.', Rgb::GRAY, Rgb::BLUE));

        let mut plain = base.clone();
        plain.blit(&src, x, y, false);
        let mut blended = base;
        blended.blit(&src, x, y, true);

        for ((_, _, p), (_, _, b)) in plain.iter_cells().zip(blended.iter_cells()) {
            prop_assert_eq!(p.ch, b.ch);
            prop_assert_eq!(p.fg, b.fg);
            prop_assert_eq!(p.bg, b.bg);
        }
    }
}
