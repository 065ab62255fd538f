/// How calls are written in the current context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParserMode {
    /// `name arg arg` command-style calls are allowed.
    #[default]
    Command,
    /// Every call must be written `name(arg, arg)`.
    Strict,
}

/// Language features gated by version or switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feature {
    /// `let` and `const` declarations.
    LetConst,
    /// `enum` declarations.
    Enum,
    /// `export` prefixes.
    Export,
    /// `cmd!` zero-argument call sugar.
    BangCall,
}

/// Parser configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserOptions {
    /// Language version, as a year.
    pub version: u32,
    /// Top-level call mode.
    pub mode: ParserMode,
    /// Allow `export` (also needs version 2022).
    pub enable_export: bool,
    /// Enable syntax still under evaluation.
    pub experimental_features: bool,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            version: 2022,
            mode: ParserMode::Command,
            enable_export: false,
            experimental_features: false,
        }
    }
}

impl ParserOptions {
    /// Whether `feature` is available under these options.
    pub fn supports(&self, feature: Feature) -> bool {
        match feature {
            Feature::LetConst => self.version >= 2021,
            Feature::Enum => self.version >= 2022,
            Feature::Export => self.version >= 2022 && self.enable_export,
            Feature::BangCall => self.experimental_features,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_gates() {
        let old = ParserOptions {
            version: 2020,
            ..Default::default()
        };
        assert!(!old.supports(Feature::LetConst));
        assert!(!old.supports(Feature::Enum));

        let mid = ParserOptions {
            version: 2021,
            ..Default::default()
        };
        assert!(mid.supports(Feature::LetConst));
        assert!(!mid.supports(Feature::Enum));

        let current = ParserOptions::default();
        assert!(current.supports(Feature::Enum));
        assert!(!current.supports(Feature::Export));
        assert!(!current.supports(Feature::BangCall));
    }

    #[test]
    fn export_needs_switch_and_version() {
        let exported = ParserOptions {
            enable_export: true,
            ..Default::default()
        };
        assert!(exported.supports(Feature::Export));

        let too_old = ParserOptions {
            version: 2021,
            enable_export: true,
            ..Default::default()
        };
        assert!(!too_old.supports(Feature::Export));
    }
}
