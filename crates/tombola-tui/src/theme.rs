#![forbid(unsafe_code)]

//! Colors for the wheel and chrome.

use crossterm::style::Color;

/// Pastel segment palette, cycled by expanded-list index.
pub const SEGMENT_PALETTE: [Color; 11] = [
    Color::Rgb { r: 0xEC, g: 0xE9, b: 0xF9 },
    Color::Rgb { r: 0xDD, g: 0xD8, b: 0xF0 },
    Color::Rgb { r: 0xFD, g: 0xE4, b: 0xCF },
    Color::Rgb { r: 0xFF, g: 0xCF, b: 0xD2 },
    Color::Rgb { r: 0xF1, g: 0xC0, b: 0xE8 },
    Color::Rgb { r: 0xCF, g: 0xBA, b: 0xF0 },
    Color::Rgb { r: 0xA3, g: 0xC4, b: 0xF3 },
    Color::Rgb { r: 0x90, g: 0xDB, b: 0xF4 },
    Color::Rgb { r: 0x8E, g: 0xEC, b: 0xF5 },
    Color::Rgb { r: 0x98, g: 0xF5, b: 0xE1 },
    Color::Rgb { r: 0xB9, g: 0xFB, b: 0xC0 },
];

/// Rainbow stops for boosted segments. The pink and yellow stops are
/// doubled so the ramp lingers on them.
const RAINBOW_STOPS: [(u8, u8, u8); 7] = [
    (155, 246, 255),
    (198, 198, 237),
    (241, 151, 220),
    (241, 151, 220),
    (255, 202, 40),
    (255, 202, 40),
    (205, 224, 147),
];

/// Flat color for a segment by expanded index.
#[inline]
pub fn segment_color(index: usize) -> Color {
    SEGMENT_PALETTE[index % SEGMENT_PALETTE.len()]
}

/// Time-animated rainbow color for boosted segments. `time` is seconds;
/// `offset` staggers adjacent segments.
pub fn rainbow_color(time: f64, offset: f64) -> Color {
    let stops = RAINBOW_STOPS.len() as f64;
    let position = ((time + offset) * 0.5).rem_euclid(stops);
    let index = position as usize % RAINBOW_STOPS.len();
    let next = (index + 1) % RAINBOW_STOPS.len();
    let blend = position - position.floor();

    let lerp = |a: u8, b: u8| -> u8 {
        (f64::from(a) + (f64::from(b) - f64::from(a)) * blend).round() as u8
    };
    let (r0, g0, b0) = RAINBOW_STOPS[index];
    let (r1, g1, b1) = RAINBOW_STOPS[next];
    Color::Rgb {
        r: lerp(r0, r1),
        g: lerp(g0, g1),
        b: lerp(b0, b1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_cycles() {
        assert_eq!(segment_color(0), segment_color(SEGMENT_PALETTE.len()));
    }

    #[test]
    fn rainbow_stays_in_range_over_time() {
        // Just exercise a long sweep; the lerp math must never panic or
        // index out of bounds.
        let mut t = 0.0;
        while t < 100.0 {
            let _ = rainbow_color(t, 0.1);
            t += 0.37;
        }
    }

    #[test]
    fn rainbow_hits_first_stop_at_zero() {
        let Color::Rgb { r, g, b } = rainbow_color(0.0, 0.0) else {
            panic!("expected rgb");
        };
        assert_eq!((r, g, b), RAINBOW_STOPS[0]);
    }
}
