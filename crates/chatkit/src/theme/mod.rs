//! Design tokens and scoped override resolution.
//!
//! Tokens are plain values threaded explicitly through the render tree. A
//! [`ThemeScope`] is a chain of partial layers over a base record: the innermost layer
//! that sets a field wins, and unset fields fall through to the outer layers and
//! finally to the base.

pub mod preset;
pub mod tokens;

pub use preset::ThemePreset;
pub use tokens::{
    AnimationOverrides, AnimationTokens, Color, ColorOverrides, ColorTokens, DesignTokens,
    LayoutOverrides, LayoutTokens, SpacingOverrides, SpacingTokens, TokenOverrides,
    TypographyOverrides, TypographyTokens,
};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ThemeScope {
    base: DesignTokens,
    layers: Vec<TokenOverrides>,
}

impl ThemeScope {
    /// Scope over the global defaults.
    pub fn root() -> Self {
        Self::default()
    }

    pub fn from_tokens(base: DesignTokens) -> Self {
        Self {
            base,
            layers: Vec::new(),
        }
    }

    pub fn from_preset(preset: ThemePreset) -> Self {
        Self::root().child(preset.overrides())
    }

    /// Nested scope whose layer takes precedence over everything in `self`.
    pub fn child(&self, overrides: TokenOverrides) -> Self {
        let mut scope = self.clone();
        if !overrides.is_empty() {
            scope.layers.push(overrides);
        }
        scope
    }

    pub fn depth(&self) -> usize {
        self.layers.len()
    }

    /// Resolves to an independent token record.
    pub fn resolve(&self) -> DesignTokens {
        let mut tokens = self.base.clone();
        for layer in &self.layers {
            layer.apply_to(&mut tokens);
        }
        tokens
    }

    /// Flattens every layer into one override record, innermost winning.
    pub fn flattened_overrides(&self) -> TokenOverrides {
        self.layers
            .iter()
            .fold(TokenOverrides::default(), |outer, inner| outer.layered(inner))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn innermost_override_wins() {
        let mut outer = TokenOverrides::default();
        outer.spacing.md = Some(20.0);
        outer.colors.primary = Some(Color::rgb(0x111111));

        let mut inner = TokenOverrides::default();
        inner.spacing.md = Some(16.0);

        let tokens = ThemeScope::root().child(outer).child(inner).resolve();
        let mut expected = DesignTokens::default();
        expected.spacing.md = 16.0;
        expected.colors.primary = Color::rgb(0x111111);
        assert_eq!(tokens, expected);
    }

    #[test]
    fn single_override_leaves_every_other_token_alone() {
        let mut local = TokenOverrides::default();
        local.typography.body_size = Some(18.0);

        let tokens = ThemeScope::root().child(local).resolve();
        let mut expected = DesignTokens::default();
        expected.typography.body_size = 18.0;
        assert_eq!(tokens, expected);
    }

    #[test]
    fn preset_scope_accepts_local_overrides() {
        let mut local = TokenOverrides::default();
        local.layout.bubble_corner_radius = Some(4.0);

        let tokens = ThemeScope::from_preset(ThemePreset::Dark)
            .child(local)
            .resolve();
        assert_eq!(tokens.colors, ThemePreset::Dark.tokens().colors);
        assert_eq!(tokens.layout.bubble_corner_radius, 4.0);
    }

    #[test]
    fn resolved_tokens_are_independent_copies() {
        let scope = ThemeScope::root();
        let mut first = scope.resolve();
        first.spacing.md = 99.0;
        assert_eq!(scope.resolve(), DesignTokens::default());
    }

    #[test]
    fn empty_layers_are_not_recorded() {
        let scope = ThemeScope::from_preset(ThemePreset::Light);
        assert_eq!(scope.depth(), 0);
    }

    #[test]
    fn flattened_overrides_match_resolution() {
        let mut outer = TokenOverrides::default();
        outer.animation.quick_ms = Some(90);
        let scope = ThemeScope::from_preset(ThemePreset::Green).child(outer);

        let mut tokens = DesignTokens::default();
        scope.flattened_overrides().apply_to(&mut tokens);
        assert_eq!(tokens, scope.resolve());
    }
}
