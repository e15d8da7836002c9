//! Embedded assets, compiled into the binary.
//!
//! - `serve::LIVERELOAD_JS` - browser client for the live-reload channel
//! - `sprite::EXAMPLE_HTML` - page listing the icons of a sprite sheet

mod template;

pub use template::{Template, TemplateVars};

pub mod serve {
    use super::{Template, TemplateVars};

    /// Variables for livereload.js.
    pub struct LivereloadVars {
        pub ws_port: u16,
    }

    impl TemplateVars for LivereloadVars {
        fn apply(&self, content: &str) -> String {
            content.replace("__ASSETLINE_WS_PORT__", &self.ws_port.to_string())
        }
    }

    /// Live-reload client with WebSocket port injection.
    pub const LIVERELOAD_JS: Template<LivereloadVars> =
        Template::new(include_str!("serve/livereload.js"));
}

pub mod sprite {
    use super::{Template, TemplateVars};

    /// Variables for sprite.stack.html.
    pub struct ExampleVars {
        /// Sheet path relative to the example page.
        pub sheet: &'static str,
        /// Pre-rendered `<li>` entries.
        pub items: String,
        pub count: usize,
    }

    impl TemplateVars for ExampleVars {
        fn apply(&self, content: &str) -> String {
            content
                .replace("__SHEET__", self.sheet)
                .replace("__ITEMS__", &self.items)
                .replace("__COUNT__", &self.count.to_string())
        }
    }

    /// Sprite example page template.
    pub const EXAMPLE_HTML: Template<ExampleVars> =
        Template::new(include_str!("sprite/stack.html"));
}
