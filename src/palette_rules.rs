use crate::file_type::extension_of;
use crate::FileType;
use glob::{MatchOptions, Pattern, PatternError};
use std::cmp::Reverse;
use std::sync::OnceLock;
use strum_macros::{Display, EnumString};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, EnumString, Display)]
pub enum AssetKind {
    #[strum(serialize = "shp")]
    Shp,
    #[strum(serialize = "vxl")]
    Vxl,
    #[strum(serialize = "tmp")]
    Tmp,
    #[strum(serialize = "pcx")]
    Pcx,
}

impl AssetKind {
    pub fn from_file_type(file_type: FileType) -> Option<Self> {
        match file_type {
            FileType::ShpTs | FileType::ShpTd => Some(AssetKind::Shp),
            FileType::Vxl => Some(AssetKind::Vxl),
            FileType::TmpTs | FileType::TmpTd => Some(AssetKind::Tmp),
            FileType::Pcx => Some(AssetKind::Pcx),
            _ => None,
        }
    }

    /// Theater extensions count as tiles.
    pub fn from_path(path: &str) -> Option<Self> {
        match extension_of(path)?.as_str() {
            "shp" => Some(AssetKind::Shp),
            "vxl" => Some(AssetKind::Vxl),
            "tmp" | "tem" | "sno" | "urb" | "des" | "lun" | "ubn" => Some(AssetKind::Tmp),
            "pcx" => Some(AssetKind::Pcx),
            _ => None,
        }
    }

    pub fn fallback_prefix(&self) -> Option<&'static str> {
        match self {
            AssetKind::Shp | AssetKind::Vxl => Some("unit"),
            AssetKind::Tmp => Some("iso"),
            AssetKind::Pcx => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaletteRule {
    pub kind: AssetKind,
    pub palette: &'static str,
    pub pattern: Option<&'static str>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

const fn rule(kind: AssetKind, palette: &'static str, pattern: Option<&'static str>) -> PaletteRule {
    PaletteRule {
        kind,
        palette,
        pattern,
        width: None,
        height: None,
    }
}

const fn sized(kind: AssetKind, palette: &'static str, width: u32, height: u32) -> PaletteRule {
    PaletteRule {
        kind,
        palette,
        pattern: None,
        width: Some(width),
        height: Some(height),
    }
}

pub static DEFAULT_RULES: &[PaletteRule] = &[
    rule(AssetKind::Shp, "cameo.pal", Some("*icon.shp")),
    rule(AssetKind::Shp, "cameo.pal", Some("*uico.shp")),
    sized(AssetKind::Shp, "cameo.pal", 60, 48),
    rule(AssetKind::Shp, "mousepal.pal", Some("mouse.shp")),
    rule(AssetKind::Shp, "sidebar.pal", Some("sidec*.shp")),
    rule(AssetKind::Shp, "sidebar.pal", Some("side?.shp")),
    rule(AssetKind::Shp, "sidebar.pal", Some("tabs.shp")),
    rule(AssetKind::Shp, "uibkgd.pal", Some("ls*.shp")),
    rule(AssetKind::Shp, "anim.pal", Some("*anim*.shp")),
    rule(AssetKind::Shp, "lib.pal", Some("lib*.shp")),
    rule(AssetKind::Shp, "unittem.pal", Some("*.shp")),
    rule(AssetKind::Vxl, "unittem.pal", None),
    rule(AssetKind::Tmp, "isotem.pal", Some("*.tem")),
    rule(AssetKind::Tmp, "isosno.pal", Some("*.sno")),
    rule(AssetKind::Tmp, "isourb.pal", Some("*.urb")),
    rule(AssetKind::Tmp, "isodes.pal", Some("*.des")),
    rule(AssetKind::Tmp, "isolun.pal", Some("*.lun")),
    rule(AssetKind::Tmp, "isoubn.pal", Some("*.ubn")),
    rule(AssetKind::Pcx, "palette.pal", Some("ls*.pcx")),
];

#[derive(Debug, Clone)]
struct CompiledRule {
    rule: PaletteRule,
    pattern: Option<Pattern>,
    literals: usize,
    wildcards: usize,
}

/// Wildcard characters and bracket classes each count once.
fn pattern_density(pattern: &str) -> (usize, usize) {
    let mut literals = 0;
    let mut wildcards = 0;
    let mut in_class = false;
    for c in pattern.chars() {
        match c {
            '[' if !in_class => {
                in_class = true;
                wildcards += 1;
            }
            ']' if in_class => in_class = false,
            _ if in_class => {}
            '*' | '?' => wildcards += 1,
            _ => literals += 1,
        }
    }
    (literals, wildcards)
}

const NAME_MATCH: MatchOptions = MatchOptions {
    case_sensitive: false,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

#[derive(Debug, Clone)]
pub struct PaletteRules {
    rules: Vec<CompiledRule>,
}

impl PaletteRules {
    pub fn compile(rules: &[PaletteRule]) -> Result<Self, PatternError> {
        let mut compiled = Vec::with_capacity(rules.len());
        for rule in rules {
            let pattern = match rule.pattern {
                Some(pattern) => Some(Pattern::new(pattern)?),
                None => None,
            };
            let (literals, wildcards) = rule.pattern.map(pattern_density).unwrap_or((0, 0));
            compiled.push(CompiledRule {
                rule: *rule,
                pattern,
                literals,
                wildcards,
            });
        }
        Ok(PaletteRules { rules: compiled })
    }

    pub fn builtin() -> &'static PaletteRules {
        static BUILTIN: OnceLock<PaletteRules> = OnceLock::new();
        BUILTIN.get_or_init(|| {
            PaletteRules::compile(DEFAULT_RULES).expect("built-in palette patterns are valid")
        })
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rules that apply to the asset, most specific first. Exact
    /// dimensions rank above a pattern, a pattern above none, then more
    /// literal characters, fewer wildcards and earlier declaration.
    pub fn candidates(
        &self,
        kind: AssetKind,
        file_name: &str,
        dimensions: Option<(u32, u32)>,
    ) -> Vec<&PaletteRule> {
        let mut scored: Vec<(usize, &CompiledRule)> = self
            .rules
            .iter()
            .enumerate()
            .filter(|(_, compiled)| compiled.applies(kind, file_name, dimensions))
            .collect();
        scored.sort_by(|(a_index, a), (b_index, b)| {
            b.rank()
                .cmp(&a.rank())
                .then_with(|| a_index.cmp(b_index))
        });
        scored.into_iter().map(|(_, compiled)| &compiled.rule).collect()
    }
}

impl CompiledRule {
    fn applies(&self, kind: AssetKind, file_name: &str, dimensions: Option<(u32, u32)>) -> bool {
        if self.rule.kind != kind {
            return false;
        }
        if let Some(pattern) = &self.pattern {
            if !pattern.matches_with(file_name, NAME_MATCH) {
                return false;
            }
        }
        let (width, height) = match dimensions {
            Some((width, height)) => (Some(width), Some(height)),
            None => (None, None),
        };
        let fits = |wanted: Option<u32>, actual: Option<u32>| match wanted {
            Some(wanted) => actual == Some(wanted),
            None => true,
        };
        fits(self.rule.width, width) && fits(self.rule.height, height)
    }

    fn has_dimensions(&self) -> bool {
        self.rule.width.is_some() || self.rule.height.is_some()
    }

    fn rank(&self) -> (bool, bool, usize, Reverse<usize>) {
        (
            self.has_dimensions(),
            self.pattern.is_some(),
            self.literals,
            Reverse(self.wildcards),
        )
    }
}
