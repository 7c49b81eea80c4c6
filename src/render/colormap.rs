//! Colour palettes and value-to-colour scales.

/// 24-bit colour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const fn from_hex(hex: u32) -> Self {
        Rgb((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

/// matplotlib `tab20b`
pub const TAB20B: [u32; 20] = [
    0x393b79, 0x5254a3, 0x6b6ecf, 0x9c9ede, 0x637939, 0x8ca252, 0xb5cf6b, 0xcedb9c, 0x8c6d31,
    0xbd9e39, 0xe7ba52, 0xe7cb94, 0x843c39, 0xad494a, 0xd6616b, 0xe7969c, 0x7b4173, 0xa55194,
    0xce6dbd, 0xde9ed6,
];

/// ColorBrewer `BuPu`, 6 classes
pub const BUPU_6: [u32; 6] = [0xedf8fb, 0xbfd3e6, 0x9ebcda, 0x8c96c6, 0x8856a7, 0x810f7c];

/// Discrete palette sampled over a continuous value range.
#[derive(Debug, Clone, Copy)]
pub struct ListedColormap<'a> {
    colors: &'a [u32],
    min: f64,
    max: f64,
}

impl<'a> ListedColormap<'a> {
    pub fn new(colors: &'a [u32], min: f64, max: f64) -> Self {
        Self { colors, min, max }
    }

    pub fn color(&self, value: f64) -> Rgb {
        let t = if self.max > self.min {
            ((value - self.min) / (self.max - self.min)).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let n = self.colors.len();
        let i = ((t * n as f64) as usize).min(n - 1);
        Rgb::from_hex(self.colors[i])
    }
}

/// Equal-interval classes, one colour per class.
#[derive(Debug, Clone, PartialEq)]
pub struct GraduatedScale {
    /// Lower bound of each class plus the overall maximum
    pub thresholds: Vec<f64>,
    pub colors: Vec<Rgb>,
}

impl GraduatedScale {
    pub fn equal_interval(palette: &[u32], min: f64, max: f64) -> Self {
        let classes = palette.len();
        let step = (max - min) / classes as f64;
        let thresholds = (0..=classes).map(|i| min + step * i as f64).collect();
        Self {
            thresholds,
            colors: palette.iter().map(|c| Rgb::from_hex(*c)).collect(),
        }
    }

    /// Class index; the top class includes the maximum
    pub fn class(&self, value: f64) -> usize {
        let classes = self.colors.len();
        (1..classes)
            .rev()
            .find(|&i| value >= self.thresholds[i])
            .unwrap_or(0)
    }

    pub fn color(&self, value: f64) -> Rgb {
        self.colors[self.class(value)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex() {
        assert_eq!(Rgb::from_hex(0x810f7c), Rgb(0x81, 0x0f, 0x7c));
        assert_eq!(Rgb(0x39, 0x3b, 0x79).to_hex(), "#393b79");
    }

    #[test]
    fn test_listed_colormap_ends() {
        let cmap = ListedColormap::new(&TAB20B, 0.0, 100.0);
        assert_eq!(cmap.color(0.0), Rgb::from_hex(TAB20B[0]));
        assert_eq!(cmap.color(100.0), Rgb::from_hex(TAB20B[19]));
        assert_eq!(cmap.color(52.0), Rgb::from_hex(TAB20B[10]));
    }

    #[test]
    fn test_listed_colormap_flat_range() {
        let cmap = ListedColormap::new(&TAB20B, 3.0, 3.0);
        assert_eq!(cmap.color(3.0), Rgb::from_hex(TAB20B[0]));
    }

    #[test]
    fn test_graduated_classes() {
        let scale = GraduatedScale::equal_interval(&BUPU_6, 0.0, 60.0);
        assert_eq!(scale.thresholds, vec![0.0, 10.0, 20.0, 30.0, 40.0, 50.0, 60.0]);
        assert_eq!(scale.class(0.0), 0);
        assert_eq!(scale.class(9.9), 0);
        assert_eq!(scale.class(10.0), 1);
        assert_eq!(scale.class(60.0), 5);
        assert_eq!(scale.color(55.0), Rgb::from_hex(0x810f7c));
    }
}
