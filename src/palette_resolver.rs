use crate::file_type::{base_name, extension_of, stem_of, Theater};
use crate::palette_rules::{AssetKind, PaletteRules};
use log::debug;
use rustc_hash::FxHashMap;

pub const ULTIMATE_FALLBACKS: [&str; 2] = ["unittem.pal", "temperat.pal"];

/// Name to path lookup over resources that take priority over the
/// archive-derived palettes, e.g. an active mod directory.
pub trait ResourceIndex {
    fn resolve_path_by_name(&self, file_name: &str) -> Option<String>;
    fn list_palette_paths(&self) -> Vec<String>;
}

pub trait ByteSource {
    fn read(&self, path: &str) -> std::io::Result<Vec<u8>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaletteSource {
    Manual,
    Embedded,
    Rule,
    FallbackGrayscale,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaletteSelection {
    pub source: PaletteSource,
    pub reason: String,
    /// Set for `Manual` and `Rule` selections only.
    pub resolved_path: Option<String>,
}

impl PaletteSelection {
    fn new(source: PaletteSource, reason: String, resolved_path: Option<String>) -> Self {
        PaletteSelection {
            source,
            reason,
            resolved_path,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaletteRequest {
    pub asset_path: String,
    pub kind: AssetKind,
    pub manual_override: Option<String>,
    pub embedded_available: bool,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl PaletteRequest {
    pub fn new(asset_path: &str, kind: AssetKind) -> Self {
        PaletteRequest {
            asset_path: asset_path.to_string(),
            kind,
            manual_override: None,
            embedded_available: false,
            width: None,
            height: None,
        }
    }

    pub fn with_manual(mut self, path: &str) -> Self {
        self.manual_override = Some(path.to_string());
        self
    }

    pub fn with_embedded(mut self, embedded: bool) -> Self {
        self.embedded_available = embedded;
        self
    }

    pub fn with_dimensions(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    fn dimensions(&self) -> Option<(u32, u32)> {
        match (self.width, self.height) {
            (Some(width), Some(height)) => Some((width, height)),
            _ => None,
        }
    }
}

/// Palette paths keyed by lower-cased file name. The first path listed for
/// a name wins.
struct BaseIndex<'p> {
    by_name: FxHashMap<String, &'p str>,
}

impl<'p> BaseIndex<'p> {
    fn new(paths: &'p [String]) -> Self {
        let mut by_name = FxHashMap::default();
        for path in paths {
            by_name
                .entry(base_name(path).to_ascii_lowercase())
                .or_insert(path.as_str());
        }
        BaseIndex { by_name }
    }

    fn get(&self, file_name: &str) -> Option<&'p str> {
        self.by_name.get(&file_name.to_ascii_lowercase()).copied()
    }
}

pub struct PaletteResolver<'a> {
    rules: &'a PaletteRules,
    overlay: Option<&'a dyn ResourceIndex>,
}

impl<'a> Default for PaletteResolver<'a> {
    fn default() -> Self {
        PaletteResolver::new()
    }
}

impl<'a> PaletteResolver<'a> {
    pub fn new() -> Self {
        PaletteResolver {
            rules: PaletteRules::builtin(),
            overlay: None,
        }
    }

    pub fn with_rules(mut self, rules: &'a PaletteRules) -> Self {
        self.rules = rules;
        self
    }

    pub fn with_overlay(mut self, overlay: &'a dyn ResourceIndex) -> Self {
        self.overlay = Some(overlay);
        self
    }

    fn lookup(&self, base: &BaseIndex, file_name: &str) -> Option<String> {
        self.overlay
            .and_then(|overlay| overlay.resolve_path_by_name(file_name))
            .or_else(|| base.get(file_name).map(str::to_string))
    }

    fn same_stem(&self, available: &[String], stem: &str) -> Option<String> {
        let overlay_paths = self
            .overlay
            .map(|overlay| overlay.list_palette_paths())
            .unwrap_or_default();
        overlay_paths
            .iter()
            .chain(available.iter())
            .find(|path| stem_of(path).eq_ignore_ascii_case(stem))
            .cloned()
    }

    /// Generic names first, then the theater variant, then the two
    /// palettes every game ships.
    fn fallback_names(kind: AssetKind, theater: Option<Theater>) -> Vec<String> {
        let mut names = Vec::new();
        if let Some(prefix) = kind.fallback_prefix() {
            names.push(format!("{}.pal", prefix));
            if let Some(theater) = theater {
                names.push(format!("{}{}.pal", prefix, theater.suffix()));
            }
        }
        names.extend(ULTIMATE_FALLBACKS.iter().map(|n| n.to_string()));
        names
    }

    pub fn resolve(&self, request: &PaletteRequest, available: &[String]) -> PaletteSelection {
        let selection = self.select(request, available);
        debug!(
            "Palette for '{}': {:?} ({})",
            request.asset_path, selection.source, selection.reason
        );
        selection
    }

    fn select(&self, request: &PaletteRequest, available: &[String]) -> PaletteSelection {
        if let Some(manual) = &request.manual_override {
            return PaletteSelection::new(
                PaletteSource::Manual,
                "manual override".to_string(),
                Some(manual.clone()),
            );
        }
        if request.embedded_available {
            return PaletteSelection::new(
                PaletteSource::Embedded,
                "asset carries its own palette".to_string(),
                None,
            );
        }

        let file_name = base_name(&request.asset_path);
        let stem = stem_of(&request.asset_path);
        if let Some(path) = self.same_stem(available, stem) {
            return PaletteSelection::new(
                PaletteSource::Rule,
                format!("same stem as '{}'", file_name),
                Some(path),
            );
        }

        let base = BaseIndex::new(available);
        for rule in self
            .rules
            .candidates(request.kind, file_name, request.dimensions())
        {
            if let Some(path) = self.lookup(&base, rule.palette) {
                let reason = match rule.pattern {
                    Some(pattern) => format!("rule '{}' for {}", pattern, request.kind),
                    None => format!("default rule for {}", request.kind),
                };
                return PaletteSelection::new(PaletteSource::Rule, reason, Some(path));
            }
        }

        let theater = extension_of(file_name).and_then(|e| Theater::from_extension(&e));
        for name in PaletteResolver::fallback_names(request.kind, theater) {
            if let Some(path) = self.lookup(&base, &name) {
                return PaletteSelection::new(
                    PaletteSource::Rule,
                    format!("fallback '{}'", name),
                    Some(path),
                );
            }
        }

        PaletteSelection::new(
            PaletteSource::FallbackGrayscale,
            "no palette found".to_string(),
            None,
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::palette_rules::PaletteRule;
    use maplit::hashmap;
    use std::collections::HashMap;

    struct Overlay(HashMap<&'static str, &'static str>);

    impl ResourceIndex for Overlay {
        fn resolve_path_by_name(&self, file_name: &str) -> Option<String> {
            self.0.get(file_name).map(|p| p.to_string())
        }

        fn list_palette_paths(&self) -> Vec<String> {
            self.0.values().map(|p| p.to_string()).collect()
        }
    }

    fn paths(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn manual_beats_embedded() {
        let request = PaletteRequest::new("gtcnst.shp", AssetKind::Shp)
            .with_manual("mods/custom.pal")
            .with_embedded(true);
        let selection = PaletteResolver::new().resolve(&request, &paths(&["unittem.pal"]));
        assert_eq!(PaletteSource::Manual, selection.source);
        assert_eq!(Some("mods/custom.pal".to_string()), selection.resolved_path);
    }

    #[test]
    fn embedded_has_no_path() {
        let request = PaletteRequest::new("title.pcx", AssetKind::Pcx).with_embedded(true);
        let selection = PaletteResolver::new().resolve(&request, &[]);
        assert_eq!(PaletteSource::Embedded, selection.source);
        assert_eq!(None, selection.resolved_path);
    }

    #[test]
    fn same_stem_beats_rules() {
        let request = PaletteRequest::new("cache.mix/gtcnst.shp", AssetKind::Shp);
        let available = paths(&["cache.mix/unittem.pal", "cache.mix/GTCNST.PAL"]);
        let selection = PaletteResolver::new().resolve(&request, &available);
        assert_eq!(PaletteSource::Rule, selection.source);
        assert_eq!(Some("cache.mix/GTCNST.PAL".to_string()), selection.resolved_path);
    }

    #[test]
    fn rule_table_picks_most_specific() {
        let request = PaletteRequest::new("sidec01.shp", AssetKind::Shp);
        let available = paths(&["unittem.pal", "sidebar.pal"]);
        let selection = PaletteResolver::new().resolve(&request, &available);
        assert_eq!(Some("sidebar.pal".to_string()), selection.resolved_path);
    }

    #[test]
    fn unavailable_rule_falls_to_next() {
        let request = PaletteRequest::new("sidec01.shp", AssetKind::Shp);
        let selection = PaletteResolver::new().resolve(&request, &paths(&["unittem.pal"]));
        assert_eq!(Some("unittem.pal".to_string()), selection.resolved_path);
    }

    #[test]
    fn dimensions_beat_table_order() {
        let rules = PaletteRules::compile(&[
            PaletteRule {
                kind: AssetKind::Shp,
                palette: "unittem.pal",
                pattern: Some("*.shp"),
                width: None,
                height: None,
            },
            PaletteRule {
                kind: AssetKind::Shp,
                palette: "cameo.pal",
                pattern: None,
                width: Some(60),
                height: Some(48),
            },
        ])
        .unwrap();
        let request = PaletteRequest::new("htnk.shp", AssetKind::Shp).with_dimensions(60, 48);
        let available = paths(&["unittem.pal", "cameo.pal"]);
        let selection = PaletteResolver::new()
            .with_rules(&rules)
            .resolve(&request, &available);
        assert_eq!(Some("cameo.pal".to_string()), selection.resolved_path);
    }

    #[test]
    fn overlay_beats_base_index() {
        let overlay = Overlay(hashmap! { "unittem.pal" => "mods/unittem.pal" });
        let request = PaletteRequest::new("htnk.vxl", AssetKind::Vxl);
        let available = paths(&["ra2.mix/cache.mix/unittem.pal"]);
        let selection = PaletteResolver::new()
            .with_overlay(&overlay)
            .resolve(&request, &available);
        assert_eq!(Some("mods/unittem.pal".to_string()), selection.resolved_path);
    }

    #[test]
    fn overlay_same_stem() {
        let overlay = Overlay(hashmap! { "htnk.pal" => "mods/htnk.pal" });
        let request = PaletteRequest::new("htnk.vxl", AssetKind::Vxl);
        let selection = PaletteResolver::new()
            .with_overlay(&overlay)
            .resolve(&request, &paths(&["unittem.pal"]));
        assert_eq!(Some("mods/htnk.pal".to_string()), selection.resolved_path);
    }

    #[test]
    fn theater_fallback() {
        let request = PaletteRequest::new("tree01.sno", AssetKind::Shp);
        let available = paths(&["unitsno.pal", "temperat.pal"]);
        let selection = PaletteResolver::new().resolve(&request, &available);
        assert_eq!(PaletteSource::Rule, selection.source);
        assert_eq!(Some("unitsno.pal".to_string()), selection.resolved_path);
    }

    #[test]
    fn tile_uses_its_theater_palette() {
        let request = PaletteRequest::new("clear01.sno", AssetKind::Tmp);
        let available = paths(&["isotem.pal", "isosno.pal"]);
        let selection = PaletteResolver::new().resolve(&request, &available);
        assert_eq!(PaletteSource::Rule, selection.source);
        assert_eq!(Some("isosno.pal".to_string()), selection.resolved_path);
    }

    #[test]
    fn tile_without_theater_palette_falls_back() {
        let request = PaletteRequest::new("clear01.des", AssetKind::Tmp);
        let available = paths(&["isotem.pal", "unittem.pal"]);
        let selection = PaletteResolver::new().resolve(&request, &available);
        assert_eq!(Some("unittem.pal".to_string()), selection.resolved_path);
    }

    #[test]
    fn ultimate_fallback() {
        let request = PaletteRequest::new("title.pcx", AssetKind::Pcx);
        let selection = PaletteResolver::new().resolve(&request, &paths(&["temperat.pal"]));
        assert_eq!(Some("temperat.pal".to_string()), selection.resolved_path);
    }

    #[test]
    fn grayscale_when_nothing_resolves() {
        let request = PaletteRequest::new("htnk.vxl", AssetKind::Vxl);
        let selection = PaletteResolver::new().resolve(&request, &[]);
        assert_eq!(PaletteSource::FallbackGrayscale, selection.source);
        assert_eq!(None, selection.resolved_path);
    }

    #[test]
    fn fallback_order() {
        assert_eq!(
            vec!["iso.pal", "isodes.pal", "unittem.pal", "temperat.pal"],
            PaletteResolver::fallback_names(AssetKind::Tmp, Some(Theater::Desert))
        );
    }
}
