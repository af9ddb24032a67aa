use chatkit::{Color, ThemePreset};
use gpui::*;
use gpui_component::{Theme, ThemeMode};

/// Converts a packed token color into gpui's color space.
pub fn hsla(color: Color) -> Hsla {
    rgba(color.0).into()
}

/// gpui-component mode matching a preset, so stock widgets blend with the tokens.
pub fn theme_mode(preset: ThemePreset) -> ThemeMode {
    if preset.is_dark() {
        ThemeMode::Dark
    } else {
        ThemeMode::Light
    }
}

pub fn apply_preset(preset: ThemePreset, window: Option<&mut Window>, cx: &mut App) {
    tracing::debug!("switching component theme for preset {preset}");
    Theme::change(theme_mode(preset), window, cx);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[::core::prelude::v1::test]
    fn token_colors_keep_alpha() {
        let opaque = hsla(Color::rgb(0xffffff));
        assert_eq!(opaque.a, 1.0);
        assert_eq!(opaque.l, 1.0);

        let translucent = hsla(Color::rgb(0x000000).with_alpha(0.0));
        assert_eq!(translucent.a, 0.0);
    }

    #[::core::prelude::v1::test]
    fn only_dark_preset_switches_component_mode() {
        for preset in ThemePreset::ALL {
            let expected = if preset == ThemePreset::Dark {
                ThemeMode::Dark
            } else {
                ThemeMode::Light
            };
            assert_eq!(theme_mode(preset), expected);
        }
    }
}
