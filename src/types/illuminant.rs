//! Calibration illuminants
//!
//! DNG calibration tags identify the light source each color matrix was
//! measured under, using the EXIF LightSource code space. Each defined
//! illuminant maps to a chromaticity in CIE 1931 (x, y) space.

/// Standard illuminant codes used by the DNG calibration tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u16)]
pub enum Illuminant {
    #[default]
    Unknown = 0,
    Daylight = 1,
    Fluorescent = 2,
    Tungsten = 3,
    Flash = 4,
    FineWeather = 9,
    CloudyWeather = 10,
    Shade = 11,
    DaylightFluorescent = 12,
    DayWhiteFluorescent = 13,
    CoolWhiteFluorescent = 14,
    WhiteFluorescent = 15,
    StandardA = 17,
    StandardB = 18,
    StandardC = 19,
    D55 = 20,
    D65 = 21,
    D75 = 22,
    D50 = 23,
    IsoStudioTungsten = 24,
}

impl Illuminant {
    /// Decode an on-wire code. Unlisted codes map to `Unknown`.
    pub fn from_code(code: u16) -> Self {
        use Illuminant::*;
        match code {
            1 => Daylight,
            2 => Fluorescent,
            3 => Tungsten,
            4 => Flash,
            9 => FineWeather,
            10 => CloudyWeather,
            11 => Shade,
            12 => DaylightFluorescent,
            13 => DayWhiteFluorescent,
            14 => CoolWhiteFluorescent,
            15 => WhiteFluorescent,
            17 => StandardA,
            18 => StandardB,
            19 => StandardC,
            20 => D55,
            21 => D65,
            22 => D75,
            23 => D50,
            24 => IsoStudioTungsten,
            _ => Unknown,
        }
    }

    pub fn code(self) -> u16 {
        self as u16
    }

    /// CIE 1931 (x, y) chromaticity of the illuminant's white point.
    pub fn chromaticity(self) -> (f64, f64) {
        use Illuminant::*;
        match self {
            Unknown => (0.3333, 0.3333),
            Daylight | D65 | FineWeather => (0.31272, 0.32903),
            CloudyWeather | Shade | D75 => (0.29902, 0.31485),
            DaylightFluorescent | DayWhiteFluorescent => (0.31310, 0.33727),
            Fluorescent | CoolWhiteFluorescent => (0.37208, 0.37529),
            WhiteFluorescent => (0.40910, 0.39430),
            Tungsten | IsoStudioTungsten | StandardA => (0.44757, 0.40745),
            StandardB => (0.34842, 0.35161),
            StandardC => (0.31006, 0.31616),
            Flash | D55 => (0.33242, 0.34743),
            D50 => (0.34567, 0.35850),
        }
    }

    pub fn name(self) -> &'static str {
        use Illuminant::*;
        match self {
            Unknown => "Unknown",
            Daylight => "Daylight",
            Fluorescent => "Fluorescent",
            Tungsten => "Tungsten (Incandescent)",
            Flash => "Flash",
            FineWeather => "Fine Weather",
            CloudyWeather => "Cloudy Weather",
            Shade => "Shade",
            DaylightFluorescent => "Daylight Fluorescent",
            DayWhiteFluorescent => "Day White Fluorescent",
            CoolWhiteFluorescent => "Cool White Fluorescent",
            WhiteFluorescent => "White Fluorescent",
            StandardA => "Standard Light A",
            StandardB => "Standard Light B",
            StandardC => "Standard Light C",
            D55 => "D55",
            D65 => "D65",
            D75 => "D75",
            D50 => "D50",
            IsoStudioTungsten => "ISO Studio Tungsten",
        }
    }
}

impl std::fmt::Display for Illuminant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_roundtrip() {
        for code in 0..=30u16 {
            let ill = Illuminant::from_code(code);
            if ill != Illuminant::Unknown {
                assert_eq!(ill.code(), code);
            }
        }
    }

    #[test]
    fn test_d65_chromaticity() {
        let (x, y) = Illuminant::D65.chromaticity();
        assert_eq!((x, y), (0.31272, 0.32903));
        assert_eq!(Illuminant::Daylight.chromaticity(), (x, y));
    }

    #[test]
    fn test_unknown_codes_collapse() {
        assert_eq!(Illuminant::from_code(5), Illuminant::Unknown);
        assert_eq!(Illuminant::from_code(255), Illuminant::Unknown);
    }

    #[test]
    fn test_chromaticities_are_plausible() {
        for code in 0..=24u16 {
            let (x, y) = Illuminant::from_code(code).chromaticity();
            assert!(x > 0.25 && x < 0.5, "x out of range for code {}", code);
            assert!(y > 0.25 && y < 0.45, "y out of range for code {}", code);
        }
    }
}
