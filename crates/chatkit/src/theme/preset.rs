use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ChatKitError, ChatKitResult, UnknownPresetSnafu};
use crate::theme::tokens::{
    AnimationOverrides, Color, ColorOverrides, DesignTokens, LayoutOverrides, SpacingOverrides,
    TokenOverrides,
};

/// Named token layers shipped with the library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemePreset {
    #[default]
    Light,
    Dark,
    Minimal,
    Blue,
    Green,
}

impl ThemePreset {
    pub const ALL: [ThemePreset; 5] = [
        Self::Light,
        Self::Dark,
        Self::Minimal,
        Self::Blue,
        Self::Green,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
            Self::Minimal => "minimal",
            Self::Blue => "blue",
            Self::Green => "green",
        }
    }

    pub fn is_dark(self) -> bool {
        matches!(self, Self::Dark)
    }

    /// The partial layer this preset puts on top of the defaults.
    pub fn overrides(self) -> TokenOverrides {
        match self {
            Self::Light => TokenOverrides::default(),
            Self::Dark => TokenOverrides {
                colors: dark_colors(),
                ..Default::default()
            },
            Self::Minimal => TokenOverrides {
                colors: ColorOverrides {
                    primary: Some(Color::rgb(0x1c1c1e)),
                    current_user_bubble: Some(Color::rgb(0xf2f2f7)),
                    current_user_text: Some(Color::rgb(0x1c1c1e)),
                    other_user_bubble: Some(Color::rgb(0xffffff)),
                    reaction_selected: Some(Color::rgb(0xe5e5ea)),
                    ..Default::default()
                },
                spacing: SpacingOverrides {
                    bubble_padding_x: Some(10.0),
                    bubble_padding_y: Some(6.0),
                    ..Default::default()
                },
                layout: LayoutOverrides {
                    bubble_corner_radius: Some(6.0),
                    show_avatars: Some(false),
                    ..Default::default()
                },
                animation: AnimationOverrides {
                    message_appear_ms: Some(0),
                    ..Default::default()
                },
                ..Default::default()
            },
            Self::Blue => TokenOverrides {
                colors: ColorOverrides {
                    primary: Some(Color::rgb(0x0a84ff)),
                    current_user_bubble: Some(Color::rgb(0x0a84ff)),
                    surface: Some(Color::rgb(0xeef5ff)),
                    reaction_selected: Some(Color::rgb(0xd6e8ff)),
                    ..Default::default()
                },
                ..Default::default()
            },
            Self::Green => TokenOverrides {
                colors: ColorOverrides {
                    primary: Some(Color::rgb(0x34c759)),
                    current_user_bubble: Some(Color::rgb(0x34c759)),
                    surface: Some(Color::rgb(0xeefaf1)),
                    reaction_selected: Some(Color::rgb(0xd4f5dc)),
                    ..Default::default()
                },
                ..Default::default()
            },
        }
    }

    pub fn tokens(self) -> DesignTokens {
        let mut tokens = DesignTokens::default();
        self.overrides().apply_to(&mut tokens);
        tokens
    }
}

fn dark_colors() -> ColorOverrides {
    ColorOverrides {
        primary: Some(Color::rgb(0x0a84ff)),
        on_primary: Some(Color::rgb(0xffffff)),
        background: Some(Color::rgb(0x000000)),
        surface: Some(Color::rgb(0x1c1c1e)),
        text_primary: Some(Color::rgb(0xffffff)),
        text_secondary: Some(Color::rgb(0x98989d)),
        current_user_bubble: Some(Color::rgb(0x0a84ff)),
        current_user_text: Some(Color::rgb(0xffffff)),
        other_user_bubble: Some(Color::rgb(0x2c2c2e)),
        other_user_text: Some(Color::rgb(0xffffff)),
        system_text: Some(Color::rgb(0x98989d)),
        border: Some(Color::rgb(0x38383a)),
        error: Some(Color::rgb(0xff453a)),
        typing_indicator: Some(Color::rgb(0x98989d)),
        reaction_background: Some(Color::rgb(0x2c2c2e)),
        reaction_selected: Some(Color::rgb(0x0a3d7a)),
    }
}

impl fmt::Display for ThemePreset {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.name())
    }
}

impl FromStr for ThemePreset {
    type Err = ChatKitError;

    fn from_str(raw: &str) -> ChatKitResult<Self> {
        let normalized = raw.trim();
        Self::ALL
            .into_iter()
            .find(|preset| preset.name().eq_ignore_ascii_case(normalized))
            .ok_or_else(|| {
                UnknownPresetSnafu {
                    stage: "parse-theme-preset",
                    name: normalized.to_string(),
                }
                .build()
            })
    }
}
