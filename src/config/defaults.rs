//! Default values for configuration fields.
//!
//! These functions are used by serde for default deserialization.

// ============================================================================
// Common Defaults
// ============================================================================

pub fn r#true() -> bool {
    true
}

// ============================================================================
// [build] Section Defaults
// ============================================================================

pub mod build {
    use std::path::PathBuf;

    pub fn root() -> Option<PathBuf> {
        None
    }

    pub fn source() -> PathBuf {
        "source".into()
    }

    pub fn output() -> PathBuf {
        "build".into()
    }

    pub fn vendor() -> Vec<PathBuf> {
        vec!["css/bootstrap".into(), "js/bootstrap".into()]
    }

    pub fn style_entry() -> PathBuf {
        "scss/main.scss".into()
    }

    pub fn icons() -> PathBuf {
        "img/icons-sprite".into()
    }

    pub fn fonts() -> PathBuf {
        "fonts".into()
    }

    pub fn jpeg_quality() -> u8 {
        80
    }
}

// ============================================================================
// [serve] Section Defaults
// ============================================================================

pub mod serve {
    pub fn interface() -> String {
        "127.0.0.1".into()
    }

    pub fn port() -> u16 {
        3000
    }
}

// ============================================================================
// [lint] Section Defaults
// ============================================================================

pub mod lint {
    use std::path::PathBuf;

    pub fn exclude() -> Vec<PathBuf> {
        vec!["bootstrap".into()]
    }
}
