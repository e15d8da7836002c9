//! Path Map: source selectors, build destinations and watch selectors.
//!
//! ```text
//! #src/                          <build>/
//! ├── *.html  (not _*.html)  →   ├── *.html
//! ├── scss/style.scss        →   ├── css/style.css
//! ├── js/main.js             →   ├── js/script.min.js
//! ├── fonts/*.ttf            →   ├── fonts/*.woff, *.woff2
//! ├── img/**/*.{ext}         →   ├── img/**
//! └── sprites/*.svg          →   └── img/icons/icons.svg
//! ```
//!
//! Both sides of the table are derived from one exhaustive match per
//! direction, so no asset class can have a destination without a source.

use std::path::{Path, PathBuf};

use crate::utils::glob::Selector;

/// Image extensions picked up by the images task.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "png", "svg", "gif", "ico", "webp"];

/// Unit of task and pattern granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AssetClass {
    Markup,
    Styles,
    Scripts,
    Fonts,
    Images,
    Sprites,
}

impl AssetClass {
    pub const ALL: [Self; 6] = [
        Self::Markup,
        Self::Styles,
        Self::Scripts,
        Self::Fonts,
        Self::Images,
        Self::Sprites,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Markup => "html",
            Self::Styles => "css",
            Self::Scripts => "js",
            Self::Fonts => "fonts",
            Self::Images => "images",
            Self::Sprites => "sprites",
        }
    }
}

/// Directory layout of one project.
#[derive(Debug, Clone)]
pub struct PathMap {
    source: PathBuf,
    build: PathBuf,
}

impl PathMap {
    pub fn new(source: &Path, build: &Path) -> Self {
        Self {
            source: source.to_path_buf(),
            build: build.to_path_buf(),
        }
    }

    pub fn source_root(&self) -> &Path {
        &self.source
    }

    pub fn build_root(&self) -> &Path {
        &self.build
    }

    /// Recursive-delete target of the clean task.
    pub fn clean(&self) -> &Path {
        &self.build
    }

    /// Source selector of an asset class.
    pub fn src(&self, class: AssetClass) -> Selector {
        let s = &self.source;
        match class {
            AssetClass::Markup => Selector::new(s, ["*.html", "!_*.html"]),
            AssetClass::Styles => Selector::new(&s.join("scss"), ["style.scss"]),
            AssetClass::Scripts => Selector::new(&s.join("js"), ["main.js"]),
            AssetClass::Fonts => Selector::new(&self.source_fonts(), ["*.ttf"]),
            AssetClass::Images => Selector::new(&s.join("img"), image_patterns()),
            AssetClass::Sprites => Selector::new(&s.join("sprites"), ["*.svg"]),
        }
    }

    /// Build destination directory of an asset class.
    pub fn dest(&self, class: AssetClass) -> PathBuf {
        let b = &self.build;
        match class {
            AssetClass::Markup => b.clone(),
            AssetClass::Styles => b.join("css"),
            AssetClass::Scripts => b.join("js"),
            AssetClass::Fonts => b.join("fonts"),
            AssetClass::Images | AssetClass::Sprites => b.join("img"),
        }
    }

    /// Watch selector; `None` for classes excluded from live editing.
    pub fn watch(&self, class: AssetClass) -> Option<Selector> {
        let s = &self.source;
        match class {
            AssetClass::Markup => Some(Selector::new(s, ["**/*.html"])),
            AssetClass::Styles => Some(Selector::new(s, ["scss/**/*.scss"])),
            AssetClass::Scripts => Some(Selector::new(s, ["js/**/*.js"])),
            AssetClass::Images => Some(self.src(AssetClass::Images)),
            AssetClass::Fonts | AssetClass::Sprites => None,
        }
    }

    /// Entry stylesheet.
    pub fn styles_entry(&self) -> PathBuf {
        self.source.join("scss").join("style.scss")
    }

    /// Entry script.
    pub fn scripts_entry(&self) -> PathBuf {
        self.source.join("js").join("main.js")
    }

    pub fn source_fonts(&self) -> PathBuf {
        self.source.join("fonts")
    }

    /// OpenType sources for otf2ttf.
    pub fn otf(&self) -> Selector {
        Selector::new(&self.source_fonts(), ["*.otf"])
    }

    /// Destination of otf2ttf, inside the source tree.
    pub fn ttf_out(&self) -> PathBuf {
        self.source_fonts().join("TTF")
    }

    /// Sprite sheet location.
    pub fn sprite_sheet(&self) -> PathBuf {
        self.dest(AssetClass::Sprites).join("icons").join("icons.svg")
    }

    /// Browsable sprite example page (development only).
    pub fn sprite_example(&self) -> PathBuf {
        self.dest(AssetClass::Sprites)
            .join("stack")
            .join("sprite.stack.html")
    }
}

fn image_patterns() -> Vec<String> {
    IMAGE_EXTENSIONS
        .iter()
        .map(|ext| format!("**/*.{ext}"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn map() -> PathMap {
        PathMap::new(Path::new("/p/#src"), Path::new("/p/p"))
    }

    #[test]
    fn test_build_destinations() {
        let map = map();
        assert_eq!(map.dest(AssetClass::Markup), PathBuf::from("/p/p"));
        assert_eq!(map.dest(AssetClass::Styles), PathBuf::from("/p/p/css"));
        assert_eq!(map.dest(AssetClass::Scripts), PathBuf::from("/p/p/js"));
        assert_eq!(map.dest(AssetClass::Fonts), PathBuf::from("/p/p/fonts"));
        assert_eq!(map.dest(AssetClass::Images), PathBuf::from("/p/p/img"));
        assert_eq!(map.clean(), Path::new("/p/p"));
    }

    #[test]
    fn test_every_destination_has_source() {
        let map = map();
        for class in AssetClass::ALL {
            assert!(map.src(class).base().starts_with("/p/#src"), "{class:?}");
        }
    }

    #[test]
    fn test_watch_excludes_fonts_and_sprites() {
        let map = map();
        assert!(map.watch(AssetClass::Fonts).is_none());
        assert!(map.watch(AssetClass::Sprites).is_none());
        assert!(map.watch(AssetClass::Markup).is_some());
    }

    #[test]
    fn test_watch_matches_partials() {
        let map = map();
        let watch = map.watch(AssetClass::Markup).unwrap();
        assert!(watch.matches(Path::new("/p/#src/_header.html")));
        assert!(watch.matches(Path::new("/p/#src/html/blocks/card.html")));

        let styles = map.watch(AssetClass::Styles).unwrap();
        assert!(styles.matches(Path::new("/p/#src/scss/base/_vars.scss")));
        assert!(!styles.matches(Path::new("/p/#src/main.scss")));
    }

    #[test]
    fn test_image_selector_extensions() {
        let dir = TempDir::new().unwrap();
        let img = dir.path().join("img/icons");
        fs::create_dir_all(&img).unwrap();
        for name in ["a.png", "b.jpg", "c.svg", "d.txt", "e.psd"] {
            fs::write(img.join(name), "").unwrap();
        }

        let map = PathMap::new(dir.path(), &dir.path().join("out"));
        let files = map.src(AssetClass::Images).files();
        assert_eq!(files.len(), 3);
        assert!(files.iter().all(|f| f.relative.starts_with("icons")));
    }

    #[test]
    fn test_sprite_paths() {
        let map = map();
        assert_eq!(map.sprite_sheet(), PathBuf::from("/p/p/img/icons/icons.svg"));
        assert_eq!(
            map.sprite_example(),
            PathBuf::from("/p/p/img/stack/sprite.stack.html")
        );
        assert_eq!(map.ttf_out(), PathBuf::from("/p/#src/fonts/TTF"));
    }
}
