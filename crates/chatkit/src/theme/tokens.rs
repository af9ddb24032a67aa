use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{ChatKitError, ChatKitResult, InvalidColorSnafu};

/// Packed `0xRRGGBBAA` color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color(pub u32);

impl Color {
    /// Opaque color from `0xRRGGBB`.
    pub const fn rgb(hex: u32) -> Self {
        Self((hex << 8) | 0xff)
    }

    pub const fn rgba(hex: u32) -> Self {
        Self(hex)
    }

    pub const fn alpha(self) -> u8 {
        (self.0 & 0xff) as u8
    }

    pub fn with_alpha(self, alpha: f32) -> Self {
        let alpha = (alpha.clamp(0.0, 1.0) * 255.0).round() as u32;
        Self((self.0 & 0xffff_ff00) | alpha)
    }

    pub fn parse(raw: &str) -> ChatKitResult<Self> {
        let invalid = || {
            InvalidColorSnafu {
                stage: "parse-color",
                raw: raw.to_string(),
            }
            .build()
        };

        let digits = raw.trim().strip_prefix('#').ok_or_else(invalid)?;
        // from_str_radix tolerates a leading sign.
        if !digits.bytes().all(|byte| byte.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let value = u32::from_str_radix(digits, 16).map_err(|_| invalid())?;
        match digits.len() {
            6 => Ok(Self::rgb(value)),
            8 => Ok(Self::rgba(value)),
            _ => Err(invalid()),
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.alpha() == 0xff {
            write!(formatter, "#{:06x}", self.0 >> 8)
        } else {
            write!(formatter, "#{:08x}", self.0)
        }
    }
}

impl FromStr for Color {
    type Err = ChatKitError;

    fn from_str(raw: &str) -> ChatKitResult<Self> {
        Self::parse(raw)
    }
}

impl Serialize for Color {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

// Each group gets a fully-defaulted token record plus a matching all-`Option` override
// record, so a new field only has to be declared once.
macro_rules! define_token_group {
    (
        $(#[$meta:meta])*
        $tokens:ident, $overrides:ident {
            $($(#[$field_meta:meta])* $field:ident: $ty:ty = $default:expr),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
        #[serde(default)]
        pub struct $tokens {
            $($(#[$field_meta])* pub $field: $ty,)+
        }

        impl Default for $tokens {
            fn default() -> Self {
                Self {
                    $($field: $default,)+
                }
            }
        }

        /// Partial record; `None` falls through to the enclosing scope.
        #[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
        #[serde(default)]
        pub struct $overrides {
            $(
                #[serde(skip_serializing_if = "Option::is_none")]
                pub $field: Option<$ty>,
            )+
        }

        impl $overrides {
            pub fn is_empty(&self) -> bool {
                true $(&& self.$field.is_none())+
            }

            /// Writes every set field onto `tokens`.
            pub fn apply_to(&self, tokens: &mut $tokens) {
                $(
                    if let Some(value) = &self.$field {
                        tokens.$field = value.clone();
                    }
                )+
            }

            /// Combines two layers; fields set in `inner` win.
            pub fn layered(&self, inner: &Self) -> Self {
                Self {
                    $($field: inner.$field.clone().or_else(|| self.$field.clone()),)+
                }
            }
        }
    };
}

define_token_group!(
    /// Color palette. Defaults form the light appearance.
    ColorTokens, ColorOverrides {
        primary: Color = Color::rgb(0x007aff),
        on_primary: Color = Color::rgb(0xffffff),
        background: Color = Color::rgb(0xffffff),
        surface: Color = Color::rgb(0xf2f2f7),
        text_primary: Color = Color::rgb(0x000000),
        text_secondary: Color = Color::rgb(0x8e8e93),
        current_user_bubble: Color = Color::rgb(0x007aff),
        current_user_text: Color = Color::rgb(0xffffff),
        other_user_bubble: Color = Color::rgb(0xe9e9eb),
        other_user_text: Color = Color::rgb(0x000000),
        system_text: Color = Color::rgb(0x8e8e93),
        border: Color = Color::rgb(0xd1d1d6),
        error: Color = Color::rgb(0xff3b30),
        typing_indicator: Color = Color::rgb(0x8e8e93),
        reaction_background: Color = Color::rgb(0xf2f2f7),
        reaction_selected: Color = Color::rgb(0xcce4ff),
    }
);

define_token_group!(
    /// Spacing scale in logical pixels.
    SpacingTokens, SpacingOverrides {
        xxs: f32 = 2.0,
        xs: f32 = 4.0,
        sm: f32 = 8.0,
        md: f32 = 12.0,
        lg: f32 = 16.0,
        xl: f32 = 24.0,
        message_gap: f32 = 8.0,
        bubble_padding_x: f32 = 14.0,
        bubble_padding_y: f32 = 10.0,
    }
);

define_token_group!(
    TypographyTokens, TypographyOverrides {
        font_family: Option<String> = None,
        body_size: f32 = 15.0,
        caption_size: f32 = 12.0,
        timestamp_size: f32 = 11.0,
        title_size: f32 = 17.0,
        /// Multiplier on `body_size`.
        line_height: f32 = 1.35,
    }
);

define_token_group!(
    LayoutTokens, LayoutOverrides {
        bubble_corner_radius: f32 = 18.0,
        bubble_max_width: f32 = 540.0,
        avatar_size: f32 = 32.0,
        show_avatars: bool = true,
        input_min_height: f32 = 40.0,
        input_max_lines: usize = 6,
        reaction_chip_height: f32 = 24.0,
        attachment_thumbnail_size: f32 = 160.0,
    }
);

define_token_group!(
    /// Durations in milliseconds.
    AnimationTokens, AnimationOverrides {
        quick_ms: u64 = 150,
        standard_ms: u64 = 250,
        message_appear_ms: u64 = 200,
        typing_dot_period_ms: u64 = 1200,
    }
);

/// Every design constant the surface renders with.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DesignTokens {
    pub colors: ColorTokens,
    pub spacing: SpacingTokens,
    pub typography: TypographyTokens,
    pub layout: LayoutTokens,
    pub animation: AnimationTokens,
}

/// Partial [`DesignTokens`] for one scope.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenOverrides {
    pub colors: ColorOverrides,
    pub spacing: SpacingOverrides,
    pub typography: TypographyOverrides,
    pub layout: LayoutOverrides,
    pub animation: AnimationOverrides,
}

impl TokenOverrides {
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
            && self.spacing.is_empty()
            && self.typography.is_empty()
            && self.layout.is_empty()
            && self.animation.is_empty()
    }

    pub fn apply_to(&self, tokens: &mut DesignTokens) {
        self.colors.apply_to(&mut tokens.colors);
        self.spacing.apply_to(&mut tokens.spacing);
        self.typography.apply_to(&mut tokens.typography);
        self.layout.apply_to(&mut tokens.layout);
        self.animation.apply_to(&mut tokens.animation);
    }

    pub fn layered(&self, inner: &Self) -> Self {
        Self {
            colors: self.colors.layered(&inner.colors),
            spacing: self.spacing.layered(&inner.spacing),
            typography: self.typography.layered(&inner.typography),
            layout: self.layout.layered(&inner.layout),
            animation: self.animation.layered(&inner.animation),
        }
    }
}
