/// Saturation and lightness shared by every task color
const SATURATION: u8 = 70;
const LIGHTNESS: u8 = 50;

/// Rolling 32-bit hash over the UTF-16 code units of `name`.
///
/// Each step computes `code + ((hash << 5) - hash)` with signed wraparound,
/// so the result is identical on every platform.
pub fn name_hash(name: &str) -> i32 {
    name.encode_utf16().fold(0i32, |hash, unit| {
        (unit as i32).wrapping_add(hash.wrapping_shl(5).wrapping_sub(hash))
    })
}

/// Hue in `[0, 360)` for a task name
pub fn hue_for(name: &str) -> u16 {
    name_hash(name).rem_euclid(360) as u16
}

/// Deterministic HSL color string for a task name, e.g. `hsl(76, 70%, 50%)`
pub fn color_for(name: &str) -> String {
    format!("hsl({}, {}%, {}%)", hue_for(name), SATURATION, LIGHTNESS)
}

/// Convert a hue at the fixed saturation/lightness into RGB for terminal rendering
pub fn hue_to_rgb(hue: u16) -> (u8, u8, u8) {
    let s = SATURATION as f64 / 100.0;
    let l = LIGHTNESS as f64 / 100.0;
    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let h = (hue % 360) as f64 / 60.0;
    let x = c * (1.0 - (h % 2.0 - 1.0).abs());
    let (r, g, b) = match h as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = l - c / 2.0;
    let to_byte = |v: f64| ((v + m) * 255.0).round() as u8;
    (to_byte(r), to_byte(g), to_byte(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_hash_small_inputs() {
        assert_eq!(name_hash(""), 0);
        assert_eq!(name_hash("a"), 97);
        assert_eq!(name_hash("ab"), 3105);
    }

    #[test]
    fn test_name_hash_wraps_like_i32() {
        assert_eq!(name_hash("Writing"), -1_027_305_284);
        assert_eq!(name_hash("Reading"), -1_549_900_180);
    }

    #[test]
    fn test_hue_is_sign_corrected() {
        assert_eq!(hue_for("Writing"), 76);
        assert_eq!(hue_for("Reading"), 260);
        assert_eq!(hue_for("写作"), 75);
    }

    #[test]
    fn test_color_for_is_stable() {
        assert_eq!(color_for("Writing"), "hsl(76, 70%, 50%)");
        assert_eq!(color_for("Writing"), color_for("Writing"));
    }

    #[test]
    fn test_hue_to_rgb_primaries() {
        assert_eq!(hue_to_rgb(0), (217, 38, 38));
        assert_eq!(hue_to_rgb(120), (38, 217, 38));
        assert_eq!(hue_to_rgb(240), (38, 38, 217));
    }
}
