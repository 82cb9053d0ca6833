use crate::palette_resolver::{ByteSource, PaletteSelection, PaletteSource};
use crate::PaletteError;

type Result<T> = std::result::Result<T, PaletteError>;

const JASC_HEADER: &str = "JASC-PAL";
const MIN_BINARY_COLORS: usize = 16;
const MAX_COLORS: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    pub colors: Vec<[u8; 3]>,
}

impl Palette {
    pub fn grayscale() -> Self {
        Palette {
            colors: (0..MAX_COLORS).map(|i| [i as u8; 3]).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.starts_with(JASC_HEADER.as_bytes()) {
            Palette::from_jasc(&String::from_utf8_lossy(bytes))
        } else {
            Palette::from_binary(bytes)
        }
    }

    /// Raw RGB triples. Palettes whose components all fit in six bits are
    /// scaled up by four.
    pub fn from_binary(bytes: &[u8]) -> Result<Self> {
        if bytes.len() % 3 != 0 || bytes.len() / 3 < MIN_BINARY_COLORS {
            return Err(PaletteError::Unrecognized(bytes.len()));
        }
        let bytes = &bytes[..bytes.len().min(MAX_COLORS * 3)];
        let six_bit = bytes.iter().all(|b| *b <= 63);
        let colors = bytes
            .chunks_exact(3)
            .map(|rgb| {
                if six_bit {
                    [rgb[0] * 4, rgb[1] * 4, rgb[2] * 4]
                } else {
                    [rgb[0], rgb[1], rgb[2]]
                }
            })
            .collect();
        Ok(Palette { colors })
    }

    /// `JASC-PAL`, a version line, a count line, then one `R G B` line per
    /// color.
    pub fn from_jasc(text: &str) -> Result<Self> {
        let mut lines = text.lines().map(str::trim).enumerate();
        match lines.next() {
            Some((_, JASC_HEADER)) => {}
            _ => return Err(PaletteError::MalformedText(1)),
        }
        lines.next().ok_or(PaletteError::MalformedText(2))?;
        let count: usize = match lines.next() {
            Some((_, line)) => line.parse().map_err(|_| PaletteError::MalformedText(3))?,
            None => return Err(PaletteError::MalformedText(3)),
        };
        let mut colors = Vec::with_capacity(count.min(MAX_COLORS));
        for _ in 0..count {
            let (number, line) = lines
                .next()
                .ok_or(PaletteError::MalformedText(colors.len() + 4))?;
            let components: Vec<u8> = line
                .split_whitespace()
                .map(|c| c.parse::<u8>())
                .collect::<std::result::Result<_, _>>()
                .map_err(|_| PaletteError::MalformedText(number + 1))?;
            if components.len() != 3 {
                return Err(PaletteError::MalformedText(number + 1));
            }
            colors.push([components[0], components[1], components[2]]);
        }
        Ok(Palette { colors })
    }

    /// Produces the colors a resolver decision points at. Embedded
    /// selections have nothing to load; the asset carries its own colors.
    pub fn load(selection: &PaletteSelection, source: &dyn ByteSource) -> Result<Self> {
        match (selection.source, &selection.resolved_path) {
            (PaletteSource::FallbackGrayscale, _) => Ok(Palette::grayscale()),
            (PaletteSource::Manual, Some(path)) | (PaletteSource::Rule, Some(path)) => {
                Palette::from_bytes(&source.read(path)?)
            }
            (other, _) => Err(PaletteError::NothingToLoad(format!("{:?}", other))),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use maplit::hashmap;
    use std::collections::HashMap;

    struct MemorySource(HashMap<String, Vec<u8>>);

    impl ByteSource for MemorySource {
        fn read(&self, path: &str) -> std::io::Result<Vec<u8>> {
            self.0
                .get(path)
                .cloned()
                .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::NotFound, path.to_string()))
        }
    }

    #[test]
    fn grayscale_ramp() {
        let palette = Palette::grayscale();
        assert_eq!(256, palette.len());
        assert_eq!([0, 0, 0], palette.colors[0]);
        assert_eq!([200, 200, 200], palette.colors[200]);
        assert_eq!([255, 255, 255], palette.colors[255]);
    }

    #[test]
    fn six_bit_binary_is_scaled() {
        let mut raw = vec![0u8; 768];
        raw[3] = 63;
        raw[4] = 1;
        let palette = Palette::from_binary(&raw).unwrap();
        assert_eq!(256, palette.len());
        assert_eq!([252, 4, 0], palette.colors[1]);
    }

    #[test]
    fn eight_bit_binary_is_kept() {
        let mut raw = vec![0u8; 48];
        raw[0] = 255;
        raw[5] = 10;
        let palette = Palette::from_binary(&raw).unwrap();
        assert_eq!(16, palette.len());
        assert_eq!([255, 0, 0], palette.colors[0]);
        assert_eq!([0, 0, 10], palette.colors[1]);
    }

    #[test]
    fn binary_rejects_odd_sizes() {
        assert!(matches!(
            Palette::from_binary(&[0u8; 47]),
            Err(PaletteError::Unrecognized(47))
        ));
        assert!(matches!(
            Palette::from_binary(&[0u8; 45]),
            Err(PaletteError::Unrecognized(45))
        ));
    }

    #[test]
    fn jasc_text() {
        let palette = Palette::from_bytes(b"JASC-PAL\r\n0100\r\n2\r\n255 0 0\r\n0 128 255\r\n").unwrap();
        assert_eq!(vec![[255, 0, 0], [0, 128, 255]], palette.colors);
    }

    #[test]
    fn jasc_bad_line() {
        assert!(matches!(
            Palette::from_jasc("JASC-PAL\n0100\n2\n1 2 3\n4 five 6\n"),
            Err(PaletteError::MalformedText(5))
        ));
        assert!(matches!(
            Palette::from_jasc("JASC-PAL\n0100\n2\n1 2 3\n"),
            Err(PaletteError::MalformedText(5))
        ));
    }

    #[test]
    fn load_from_selection() {
        let source = MemorySource(hashmap! {
            "unittem.pal".to_string() => vec![1u8; 768],
        });
        let selection = PaletteSelection {
            source: PaletteSource::Rule,
            reason: "test".to_string(),
            resolved_path: Some("unittem.pal".to_string()),
        };
        let palette = Palette::load(&selection, &source).unwrap();
        assert_eq!([4, 4, 4], palette.colors[0]);

        let gray = PaletteSelection {
            source: PaletteSource::FallbackGrayscale,
            reason: "test".to_string(),
            resolved_path: None,
        };
        assert_eq!(Palette::grayscale(), Palette::load(&gray, &source).unwrap());

        let embedded = PaletteSelection {
            source: PaletteSource::Embedded,
            reason: "test".to_string(),
            resolved_path: None,
        };
        assert!(matches!(
            Palette::load(&embedded, &source),
            Err(PaletteError::NothingToLoad(_))
        ));
    }
}
