use crate::file_type::{base_name, extension_of};
use crate::palette_resolver::{ByteSource, ResourceIndex};
use crate::OverlayError;
use log::debug;
use normpath::PathExt;
use rustc_hash::FxHashMap;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

type Result<T> = std::result::Result<T, OverlayError>;

/// Loose files stacked in directories, e.g. a mod folder over an extracted
/// game folder. Later layers win, and the last layer takes writes.
#[derive(Debug, Clone)]
pub struct LayeredOverlay {
    layers: Vec<PathBuf>,
    by_name: FxHashMap<String, String>,
}

fn relative_path(layer: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(layer).ok()?;
    Some(relative.to_string_lossy().replace('\\', "/"))
}

impl LayeredOverlay {
    pub fn new(layers: Vec<String>) -> Result<Self> {
        if layers.is_empty() {
            return Err(OverlayError::NoLayers);
        }
        let mut normalized = Vec::with_capacity(layers.len());
        for layer in &layers {
            normalized.push(Path::new(layer).normalize()?.into_path_buf());
        }
        let mut overlay = LayeredOverlay {
            layers: normalized,
            by_name: FxHashMap::default(),
        };
        overlay.refresh()?;
        Ok(overlay)
    }

    /// Rebuilds the file name index after files changed on disk.
    pub fn refresh(&mut self) -> Result<()> {
        let mut by_name = FxHashMap::default();
        for layer in &self.layers {
            for path in LayeredOverlay::list_layer(layer, "**/*")? {
                by_name.insert(base_name(&path).to_ascii_lowercase(), path);
            }
        }
        debug!("Indexed {} overlay files in {} layers", by_name.len(), self.layers.len());
        self.by_name = by_name;
        Ok(())
    }

    fn list_layer(layer: &Path, pattern: &str) -> Result<Vec<String>> {
        if !layer.is_dir() {
            return Ok(Vec::new());
        }
        let full = format!(
            "{}/{}",
            glob::Pattern::escape(&layer.to_string_lossy()),
            pattern
        );
        Ok(glob::glob(&full)?
            .filter_map(|entry| entry.ok())
            .filter(|path| path.is_file())
            .filter_map(|path| relative_path(layer, &path))
            .collect())
    }

    /// Relative paths matching `pattern` in any layer, sorted.
    pub fn list(&self, pattern: Option<&str>) -> Result<Vec<String>> {
        let pattern = pattern.unwrap_or("**/*");
        let mut result = BTreeSet::new();
        for layer in &self.layers {
            result.extend(LayeredOverlay::list_layer(layer, pattern)?);
        }
        Ok(result.into_iter().collect())
    }

    pub fn read(&self, path: &str) -> Result<Vec<u8>> {
        for layer in self.layers.iter().rev() {
            let full = layer.join(path);
            if full.is_file() {
                return std::fs::read(&full)
                    .map_err(|err| OverlayError::ReadError(path.to_string(), err.to_string()));
            }
        }
        Err(OverlayError::FileNotFound(path.to_string()))
    }

    pub fn write(&mut self, path: &str, bytes: &[u8]) -> Result<()> {
        let layer = match self.layers.last() {
            Some(layer) => layer,
            None => return Err(OverlayError::NoLayers),
        };
        let full = layer.join(path);
        if let Some(parent) = full.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&full, bytes)
            .map_err(|err| OverlayError::WriteError(path.to_string(), err.to_string()))?;
        self.by_name
            .insert(base_name(path).to_ascii_lowercase(), path.replace('\\', "/"));
        Ok(())
    }
}

impl ResourceIndex for LayeredOverlay {
    fn resolve_path_by_name(&self, file_name: &str) -> Option<String> {
        self.by_name.get(&file_name.to_ascii_lowercase()).cloned()
    }

    fn list_palette_paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self
            .by_name
            .values()
            .filter(|path| extension_of(path).as_deref() == Some("pal"))
            .cloned()
            .collect();
        paths.sort();
        paths
    }
}

impl ByteSource for LayeredOverlay {
    fn read(&self, path: &str) -> std::io::Result<Vec<u8>> {
        LayeredOverlay::read(self, path).map_err(|err| match err {
            OverlayError::IOError(err) => err,
            OverlayError::FileNotFound(path) => {
                std::io::Error::new(std::io::ErrorKind::NotFound, path)
            }
            other => std::io::Error::new(std::io::ErrorKind::Other, other.to_string()),
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::palette_resolver::{PaletteRequest, PaletteResolver, PaletteSource};
    use crate::palette_rules::AssetKind;
    use crate::Palette;

    fn layer_path(dir: &tempfile::TempDir) -> String {
        dir.path().to_string_lossy().to_string()
    }

    #[test]
    fn no_layers() {
        assert!(matches!(LayeredOverlay::new(vec![]), Err(OverlayError::NoLayers)));
    }

    #[test]
    fn later_layers_win() {
        let base = tempfile::tempdir().unwrap();
        let modded = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(base.path().join("pal")).unwrap();
        std::fs::write(base.path().join("pal/unittem.pal"), vec![1u8; 768]).unwrap();
        std::fs::write(base.path().join("rules.ini"), "[General]").unwrap();
        std::fs::write(modded.path().join("rules.ini"), "[Modded]").unwrap();

        let overlay = LayeredOverlay::new(vec![layer_path(&base), layer_path(&modded)]).unwrap();
        assert_eq!(b"[Modded]".to_vec(), overlay.read("rules.ini").unwrap());
        assert_eq!(vec![1u8; 768], overlay.read("pal/unittem.pal").unwrap());
        assert!(matches!(
            overlay.read("art.ini"),
            Err(OverlayError::FileNotFound(_))
        ));
        assert_eq!(
            vec!["pal/unittem.pal".to_string(), "rules.ini".to_string()],
            overlay.list(None).unwrap()
        );
        assert_eq!(
            vec!["pal/unittem.pal".to_string()],
            overlay.list(Some("**/*.pal")).unwrap()
        );
    }

    #[test]
    fn resolves_names_case_insensitively() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("UNITSNO.PAL"), vec![0u8; 768]).unwrap();
        let overlay = LayeredOverlay::new(vec![layer_path(&dir)]).unwrap();
        assert_eq!(Some("UNITSNO.PAL".to_string()), overlay.resolve_path_by_name("unitsno.pal"));
        assert_eq!(vec!["UNITSNO.PAL".to_string()], overlay.list_palette_paths());
        assert_eq!(None, overlay.resolve_path_by_name("isosno.pal"));
    }

    #[test]
    fn write_goes_to_last_layer() {
        let base = tempfile::tempdir().unwrap();
        let modded = tempfile::tempdir().unwrap();
        let mut overlay = LayeredOverlay::new(vec![layer_path(&base), layer_path(&modded)]).unwrap();
        overlay.write("pal/isotem.pal", &[2u8; 768]).unwrap();
        assert!(modded.path().join("pal/isotem.pal").exists());
        assert!(!base.path().join("pal/isotem.pal").exists());
        assert_eq!(Some("pal/isotem.pal".to_string()), overlay.resolve_path_by_name("ISOTEM.PAL"));
    }

    #[test]
    fn feeds_the_palette_resolver() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("unittem.pal"), vec![10u8; 768]).unwrap();
        let overlay = LayeredOverlay::new(vec![layer_path(&dir)]).unwrap();
        let request = PaletteRequest::new("htnk.vxl", AssetKind::Vxl);
        let available = vec!["ra2.mix/cache.mix/unittem.pal".to_string()];
        let selection = PaletteResolver::new()
            .with_overlay(&overlay)
            .resolve(&request, &available);
        assert_eq!(PaletteSource::Rule, selection.source);
        assert_eq!(Some("unittem.pal".to_string()), selection.resolved_path);
        let palette = Palette::load(&selection, &overlay).unwrap();
        assert_eq!([40, 40, 40], palette.colors[0]);
    }
}
