use crate::model::Reaction;

/// Default quick-react set used when the host does not pass one.
pub const DEFAULT_REACTIONS: [&str; 6] = ["👍", "❤️", "😂", "😮", "😢", "👎"];

/// The glyphs offered as quick-react options, in display order.
///
/// Duplicates and blank entries are dropped while keeping first occurrences, so a
/// sloppy configuration list never produces two identical buttons.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReactionPalette {
    glyphs: Vec<String>,
}

impl ReactionPalette {
    pub fn new<I, S>(glyphs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique: Vec<String> = Vec::new();
        for glyph in glyphs {
            let glyph = glyph.into().trim().to_string();
            if glyph.is_empty() || unique.contains(&glyph) {
                continue;
            }
            unique.push(glyph);
        }

        Self { glyphs: unique }
    }

    pub fn glyphs(&self) -> &[String] {
        &self.glyphs
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    pub fn offers(&self, emoji: &str) -> bool {
        self.glyphs.iter().any(|glyph| glyph == emoji)
    }

    /// Quick-react options for one message, each flagged when the current user already
    /// picked it.
    pub fn options_for(&self, reactions: &[Reaction]) -> Vec<QuickReaction> {
        self.glyphs
            .iter()
            .map(|glyph| QuickReaction {
                emoji: glyph.clone(),
                is_selected: reactions
                    .iter()
                    .any(|reaction| reaction.emoji == *glyph && reaction.is_selected),
            })
            .collect()
    }
}

impl Default for ReactionPalette {
    fn default() -> Self {
        Self::new(DEFAULT_REACTIONS)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuickReaction {
    pub emoji: String,
    pub is_selected: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicates_and_blanks_are_dropped_in_order() {
        let palette = ReactionPalette::new(["👍", "👎", "👍", " ", "🎉", "👎"]);
        assert_eq!(palette.glyphs(), ["👍", "👎", "🎉"]);
    }

    #[test]
    fn offers_only_configured_glyphs() {
        let palette = ReactionPalette::new(["👍", "👎"]);
        assert!(palette.offers("👍"));
        assert!(!palette.offers("🎉"));
    }

    #[test]
    fn options_mark_current_user_selection() {
        let palette = ReactionPalette::new(["👍", "👎"]);
        let reactions = vec![
            Reaction::new("r1", "👍", 3, true),
            Reaction::new("r2", "👎", 1, false),
        ];

        let options = palette.options_for(&reactions);
        assert_eq!(options.len(), 2);
        assert!(options[0].is_selected);
        assert!(!options[1].is_selected);
    }
}
