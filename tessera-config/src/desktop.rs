use crate::appearance::{Color, DEFAULT_DECORATION_COLOR, DEFAULT_SUGGESTION_COLOR};

#[derive(knuffel::Decode, Debug, Clone, PartialEq)]
pub struct Desktop {
    /// Keep every eligible toplevel maximized, as on a phone.
    #[knuffel(child)]
    pub auto_maximize: bool,
    /// Shrink oversized toplevels so that they fit the output.
    #[knuffel(child)]
    pub scale_to_fit: bool,
    /// Distance from an output edge, in logical pixels, at which an interactive move suggests
    /// maximizing or tiling.
    #[knuffel(child, unwrap(argument), default = 20)]
    pub edge_snap_threshold: u16,
    #[knuffel(child, unwrap(argument, str), default = DEFAULT_SUGGESTION_COLOR)]
    pub suggestion_color: Color,
}

impl Default for Desktop {
    fn default() -> Self {
        Self {
            auto_maximize: false,
            scale_to_fit: false,
            edge_snap_threshold: 20,
            suggestion_color: DEFAULT_SUGGESTION_COLOR,
        }
    }
}

#[derive(knuffel::Decode, Debug, Clone, Copy, PartialEq)]
pub struct Decoration {
    #[knuffel(child, unwrap(argument), default = 12)]
    pub titlebar_height: u16,
    #[knuffel(child, unwrap(argument), default = 4)]
    pub border_width: u16,
    #[knuffel(child, unwrap(argument, str), default = DEFAULT_DECORATION_COLOR)]
    pub color: Color,
}

impl Default for Decoration {
    fn default() -> Self {
        Self {
            titlebar_height: 12,
            border_width: 4,
            color: DEFAULT_DECORATION_COLOR,
        }
    }
}

/// Per-application overrides, matched against the munged app id.
#[derive(knuffel::Decode, Debug, Clone, PartialEq, Eq)]
pub struct Application {
    #[knuffel(argument)]
    pub app_id: String,
    #[knuffel(child)]
    pub scale_to_fit: bool,
}

/// Turns an app id into the form used as an application settings key.
///
/// Everything except ASCII alphanumerics and `-` becomes `-`, then the result is lowercased.
pub fn munge_app_id(app_id: &str) -> String {
    app_id
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn munge() {
        assert_eq!(munge_app_id("org.gnome.Maps"), "org-gnome-maps");
        assert_eq!(munge_app_id("Foo_Bar-2"), "foo-bar-2");
        assert_eq!(munge_app_id(""), "");
    }
}
