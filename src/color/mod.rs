use smart_leds::RGB8;

pub type Rgb = RGB8;

/// Gray level with all components set to `level`
pub const fn gray(level: u8) -> Rgb {
    Rgb {
        r: level,
        g: level,
        b: level,
    }
}

pub const BLACK: Rgb = gray(0);
