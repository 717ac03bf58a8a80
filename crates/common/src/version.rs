use std::fmt;

use serde::Serialize;

/// Compile-time build metadata, populated by `build.rs`.
#[derive(Debug, Clone, Serialize)]
pub struct BuildInfo {
    pub build_profile: &'static str,
    pub build_features: &'static str,
    pub build_timestamp: &'static str,
    pub version: &'static str,
}

pub fn build_info() -> BuildInfo {
    BuildInfo {
        build_profile: env!("BUILD_PROFILE"),
        build_features: env!("BUILD_FEATURES"),
        build_timestamp: env!("BUILD_TIMESTAMP"),
        version: env!("REPO_VERSION"),
    }
}

impl fmt::Display for BuildInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "vanish {} ({} build, features: {}, built {})",
            self.version, self.build_profile, self.build_features, self.build_timestamp
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_info_display() {
        let info = build_info();
        let rendered = info.to_string();
        assert!(rendered.starts_with("vanish "));
        assert!(rendered.contains(info.build_profile));
    }
}
