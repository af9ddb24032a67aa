use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, HashSet};
use std::hash::{Hash, Hasher};
use std::ops::Range;
use std::rc::Rc;
use std::sync::Arc;

use chatkit::presentation::format_byte_size;
use chatkit::{
    AttachmentId, AttachmentPayload, AttachmentSummary, DesignTokens, ImageData, ImageEncoding,
    MessageId, MessageRow, ScrollObservation, Sender,
};
use gpui::prelude::FluentBuilder as _;
use gpui::*;
use gpui_component::{
    Sizable,
    button::{Button, ButtonVariants},
    h_flex,
    label::Label,
    v_flex, v_virtual_list,
};

use crate::chat::events::{ReactionToggled, RetryRequested, ViewportScrolled};
use crate::chat::scroll_manager::{ScrollManager, first_visible_row, row_top};
use crate::theme::hsla;

const DEFAULT_CONTENT_WIDTH: Pixels = px(680.);
const CONTENT_WIDTH_CHANGE_EPSILON: f32 = 1.0;
const META_ROW_HEIGHT: Pixels = px(16.);
const SEPARATOR_HEIGHT: Pixels = px(24.);
const QUICK_REACTION_ROW_HEIGHT: Pixels = px(22.);
const THINKING_HEADER_HEIGHT: Pixels = px(20.);
const LINK_CARD_HEIGHT: Pixels = px(64.);
const GENERIC_CHIP_HEIGHT: Pixels = px(36.);
const ESTIMATED_CHAR_WIDTH: f32 = 7.0;

struct SizeCacheEntry {
    layout_hash: u64,
    height: Pixels,
    measured: bool,
}

/// Rows, tokens and follow request for one composed frame.
pub struct ListUpdate {
    pub rows: Vec<MessageRow>,
    pub tokens: DesignTokens,
    pub follow_tail: bool,
}

pub struct MessageList {
    rows: Vec<MessageRow>,
    tokens: DesignTokens,
    item_sizes: Rc<Vec<Size<Pixels>>>,
    scroll_manager: ScrollManager,
    size_cache: HashMap<MessageId, SizeCacheEntry>,
    image_cache: HashMap<AttachmentId, Arc<Image>>,
    expanded_thoughts: HashSet<MessageId>,
    content_width: Option<Pixels>,
}

impl EventEmitter<RetryRequested> for MessageList {}
impl EventEmitter<ReactionToggled> for MessageList {}
impl EventEmitter<ViewportScrolled> for MessageList {}

impl MessageList {
    pub fn new(tokens: DesignTokens, _cx: &mut Context<Self>) -> Self {
        Self {
            rows: Vec::new(),
            tokens,
            item_sizes: Rc::new(Vec::new()),
            scroll_manager: ScrollManager::new(),
            size_cache: HashMap::new(),
            image_cache: HashMap::new(),
            expanded_thoughts: HashSet::new(),
            content_width: None,
        }
    }

    pub fn rows(&self) -> &[MessageRow] {
        &self.rows
    }

    /// Takes over a composed frame. Unchanged frames do not trigger a redraw.
    pub fn apply_frame(&mut self, update: ListUpdate, cx: &mut Context<Self>) {
        let ListUpdate {
            rows,
            tokens,
            follow_tail,
        } = update;

        if follow_tail {
            self.scroll_manager.request_scroll_to_bottom();
        }

        if rows == self.rows && tokens == self.tokens {
            if follow_tail {
                cx.notify();
            }
            return;
        }

        if tokens != self.tokens {
            self.tokens = tokens;
            for entry in self.size_cache.values_mut() {
                entry.measured = false;
            }
        }
        self.rows = rows;
        self.refresh_image_cache();
        self.rebuild_item_sizes();
        cx.notify();
    }

    /// Moves the viewport so `message_id` sits at the top. Returns `false` for ids not
    /// in the current rows.
    pub fn scroll_to_message(&mut self, message_id: &MessageId, cx: &mut Context<Self>) -> bool {
        let Some(index) = self.rows.iter().position(|row| &row.id == message_id) else {
            return false;
        };

        let heights = self.row_heights();
        self.scroll_manager
            .request_scroll_top(row_top(&heights, self.row_gap(), index));
        cx.notify();
        true
    }

    pub fn reset_scroll_tracking(&mut self, cx: &mut Context<Self>) {
        self.scroll_manager.reset();
        cx.notify();
    }

    fn row_gap(&self) -> Pixels {
        px(self.tokens.spacing.message_gap)
    }

    fn row_heights(&self) -> Vec<Pixels> {
        self.item_sizes.iter().map(|size| size.height).collect()
    }

    fn report_viewport_movement(&mut self, cx: &mut Context<Self>) {
        let Some(movement) = self.scroll_manager.observe() else {
            return;
        };

        let scroll_top = movement.scroll_top - self.tokens.spacing.md;
        let first_visible = first_visible_row(&self.row_heights(), self.row_gap(), scroll_top)
            .and_then(|(index, offset)| self.rows.get(index).map(|row| (row.id.clone(), offset)));

        cx.emit(ViewportScrolled {
            observation: ScrollObservation {
                direction: movement.direction,
                distance_from_bottom: movement.distance_from_bottom,
                first_visible,
            },
        });
    }

    fn toggle_thoughts(&mut self, message_id: &MessageId, cx: &mut Context<Self>) {
        if !self.expanded_thoughts.remove(message_id) {
            self.expanded_thoughts.insert(message_id.clone());
        }
        if let Some(entry) = self.size_cache.get_mut(message_id) {
            entry.measured = false;
        }
        self.rebuild_item_sizes();
        cx.notify();
    }

    fn refresh_image_cache(&mut self) {
        let mut active_ids = HashSet::new();
        for row in &self.rows {
            for attachment in &row.attachments {
                let AttachmentPayload::Image { image, thumbnail } = &attachment.payload else {
                    continue;
                };
                let shown = thumbnail.as_ref().unwrap_or(image);
                self.image_cache
                    .entry(attachment.id.clone())
                    .or_insert_with(|| Arc::new(gpui_image(shown)));
                active_ids.insert(attachment.id.clone());
            }
        }

        self.image_cache.retain(|id, _| active_ids.contains(id));
    }

    fn update_content_width(&mut self, cx: &mut Context<Self>) {
        let list_width = self.scroll_manager.bounds().size.width;
        if list_width <= Pixels::ZERO {
            return;
        }

        let padding = px(self.tokens.spacing.lg) * 2.;
        let next_content_width = max_pixels(px(1.), list_width - padding);
        let width_changed = self.content_width.is_none_or(|current| {
            (f32::from(current) - f32::from(next_content_width)).abs()
                > CONTENT_WIDTH_CHANGE_EPSILON
        });

        if width_changed {
            self.content_width = Some(next_content_width);

            // Cached heights were measured for the old width.
            for entry in self.size_cache.values_mut() {
                entry.measured = false;
            }

            self.rebuild_item_sizes();
            cx.notify();
        }
    }

    fn rebuild_item_sizes(&mut self) {
        let content_width = self.content_width.unwrap_or(DEFAULT_CONTENT_WIDTH);
        let mut active_ids = HashSet::with_capacity(self.rows.len());
        let mut sizes = Vec::with_capacity(self.rows.len());

        for row in &self.rows {
            let expanded = self.expanded_thoughts.contains(&row.id);
            let next_hash = layout_hash(row, expanded);
            let estimated_height = estimate_row_height(row, expanded, &self.tokens, content_width);

            let entry = self.size_cache.entry(row.id.clone()).or_insert(SizeCacheEntry {
                layout_hash: next_hash,
                height: estimated_height,
                measured: false,
            });

            if entry.layout_hash != next_hash {
                entry.layout_hash = next_hash;
                entry.height = estimated_height;
                entry.measured = false;
            } else if !entry.measured {
                entry.height = estimated_height;
            }

            sizes.push(size(px(0.), entry.height));
            active_ids.insert(row.id.clone());
        }

        self.size_cache.retain(|id, _| active_ids.contains(id));
        self.expanded_thoughts.retain(|id| active_ids.contains(id));
        self.item_sizes = Rc::new(sizes);
    }

    fn measure_visible_items(
        &mut self,
        visible_range: Range<usize>,
        window: &mut Window,
        cx: &mut Context<Self>,
    ) {
        if self.rows.is_empty() {
            return;
        }

        let content_width = self.content_width.unwrap_or(DEFAULT_CONTENT_WIDTH);
        let available_space = size(
            AvailableSpace::Definite(content_width),
            AvailableSpace::MinContent,
        );
        let mut updated = false;

        for index in visible_range {
            let Some(row) = self.rows.get(index).cloned() else {
                continue;
            };

            let mut element = self.render_row(&row, cx);
            let measured_height = element.layout_as_root(available_space, window, cx).height;
            let Some(entry) = self.size_cache.get_mut(&row.id) else {
                continue;
            };
            if !entry.measured || pixels_changed(entry.height, measured_height) {
                entry.height = measured_height;
                updated = true;
            }
            entry.measured = true;
        }

        if updated {
            self.rebuild_item_sizes();
            cx.notify();
        }
    }

    fn render_row(&self, row: &MessageRow, cx: &mut Context<Self>) -> AnyElement {
        let tokens = &self.tokens;
        let colors = &tokens.colors;
        let caption_size = px(tokens.typography.caption_size);

        let body = match row.sender {
            Sender::System => h_flex()
                .w_full()
                .justify_center()
                .when_some(row.text.clone(), |el, text| {
                    el.child(
                        Label::new(text)
                            .text_size(caption_size)
                            .text_color(hsla(colors.system_text)),
                    )
                })
                .into_any_element(),
            Sender::CurrentUser | Sender::OtherUser => self.render_bubble_column(row, cx),
        };

        v_flex()
            .w_full()
            .gap(px(tokens.spacing.xs))
            .when_some(row.day_separator.clone(), |column, label| {
                column.child(
                    h_flex().w_full().justify_center().child(
                        Label::new(label)
                            .text_size(caption_size)
                            .text_color(hsla(colors.text_secondary)),
                    ),
                )
            })
            .child(body)
            .into_any_element()
    }

    fn render_bubble_column(&self, row: &MessageRow, cx: &mut Context<Self>) -> AnyElement {
        let tokens = &self.tokens;
        let colors = &tokens.colors;
        let is_own = row.sender == Sender::CurrentUser;
        let (bubble_color, text_color) = if is_own {
            (colors.current_user_bubble, colors.current_user_text)
        } else {
            (colors.other_user_bubble, colors.other_user_text)
        };

        let bubble = v_flex()
            .max_w(px(tokens.layout.bubble_max_width))
            .px(px(tokens.spacing.bubble_padding_x))
            .py(px(tokens.spacing.bubble_padding_y))
            .gap(px(tokens.spacing.sm))
            .rounded(px(tokens.layout.bubble_corner_radius))
            .bg(hsla(bubble_color))
            .text_color(hsla(text_color))
            .children(
                row.attachments
                    .iter()
                    .map(|attachment| self.render_attachment(&row.id, attachment, cx)),
            )
            .when_some(row.text.clone(), |bubble, text| {
                bubble.child(Label::new(text).text_size(px(tokens.typography.body_size)))
            });

        v_flex()
            .w_full()
            .gap(px(tokens.spacing.xxs))
            .map(|column| if is_own { column.items_end() } else { column.items_start() })
            .when_some(row.thinking.as_ref(), |column, _| {
                column.child(self.render_thinking_session(row, cx))
            })
            .child(bubble)
            .when(!row.reactions.is_empty(), |column| {
                column.child(self.render_reaction_chips(row, cx))
            })
            .child(self.render_meta_line(row, cx))
            .when(!row.quick_reactions.is_empty(), |column| {
                column.child(self.render_quick_reactions(row, cx))
            })
            .into_any_element()
    }

    fn render_meta_line(&self, row: &MessageRow, cx: &mut Context<Self>) -> impl IntoElement {
        let tokens = &self.tokens;
        let colors = &tokens.colors;
        let timestamp_size = px(tokens.typography.timestamp_size);
        let glyph_color = if row.show_retry {
            colors.error
        } else {
            colors.text_secondary
        };

        h_flex()
            .gap(px(tokens.spacing.xs))
            .items_center()
            .child(
                Label::new(row.timestamp_label.clone())
                    .text_size(timestamp_size)
                    .text_color(hsla(colors.text_secondary)),
            )
            .when_some(row.status_glyph, |line, glyph| {
                line.child(
                    Label::new(glyph)
                        .text_size(timestamp_size)
                        .text_color(hsla(glyph_color)),
                )
            })
            .when(row.show_retry, |line| {
                let message_id = row.id.clone();
                line.child(
                    Button::new(SharedString::from(format!("retry-{}", row.id)))
                        .xsmall()
                        .danger()
                        .child("Retry")
                        .on_click(cx.listener(move |_, _, _window, cx| {
                            tracing::debug!("retry requested for {message_id}");
                            cx.emit(RetryRequested {
                                message_id: message_id.clone(),
                            });
                        })),
                )
            })
    }

    fn render_reaction_chips(&self, row: &MessageRow, cx: &mut Context<Self>) -> impl IntoElement {
        let tokens = &self.tokens;

        h_flex()
            .flex_wrap()
            .gap(px(tokens.spacing.xs))
            .children(row.reactions.iter().map(|reaction| {
                let message_id = row.id.clone();
                let emoji = reaction.emoji.clone();
                let background = if reaction.is_selected {
                    tokens.colors.reaction_selected
                } else {
                    tokens.colors.reaction_background
                };

                div()
                    .id(SharedString::from(format!("reaction-{}-{}", row.id, reaction.emoji)))
                    .h(px(tokens.layout.reaction_chip_height))
                    .px(px(tokens.spacing.sm))
                    .flex()
                    .items_center()
                    .rounded_full()
                    .bg(hsla(background))
                    .cursor_pointer()
                    .child(
                        Label::new(format!("{} {}", reaction.emoji, reaction.count))
                            .text_size(px(tokens.typography.caption_size))
                            .text_color(hsla(tokens.colors.text_primary)),
                    )
                    .on_click(cx.listener(move |_, _, _window, cx| {
                        cx.emit(ReactionToggled {
                            message_id: message_id.clone(),
                            emoji: emoji.clone(),
                        });
                    }))
            }))
    }

    fn render_quick_reactions(&self, row: &MessageRow, cx: &mut Context<Self>) -> impl IntoElement {
        h_flex()
            .gap(px(self.tokens.spacing.xxs))
            .children(row.quick_reactions.iter().map(|option| {
                let message_id = row.id.clone();
                let emoji = option.emoji.clone();

                Button::new(SharedString::from(format!("quick-{}-{}", row.id, option.emoji)))
                    .xsmall()
                    .when(option.is_selected, |button| button.primary())
                    .when(!option.is_selected, |button| button.ghost())
                    .child(option.emoji.clone())
                    .on_click(cx.listener(move |_, _, _window, cx| {
                        cx.emit(ReactionToggled {
                            message_id: message_id.clone(),
                            emoji: emoji.clone(),
                        });
                    }))
            }))
    }

    fn render_thinking_session(&self, row: &MessageRow, cx: &mut Context<Self>) -> AnyElement {
        let Some(session) = row.thinking.as_ref() else {
            return div().into_any_element();
        };
        let tokens = &self.tokens;
        let secondary = hsla(tokens.colors.text_secondary);
        let caption_size = px(tokens.typography.caption_size);
        let expanded = self.expanded_thoughts.contains(&row.id);
        let message_id = row.id.clone();

        v_flex()
            .gap(px(tokens.spacing.xxs))
            .child(
                div()
                    .id(SharedString::from(format!("thoughts-{}", row.id)))
                    .cursor_pointer()
                    .child(
                        Label::new(thinking_summary(
                            session.thoughts().len(),
                            session.duration().num_seconds(),
                            expanded,
                        ))
                        .text_size(caption_size)
                        .text_color(secondary),
                    )
                    .on_click(cx.listener(move |this, _, _window, cx| {
                        this.toggle_thoughts(&message_id, cx);
                    })),
            )
            .when(expanded, |column| {
                column.children(session.thoughts().iter().map(|thought| {
                    div()
                        .pl(px(tokens.spacing.sm))
                        .border_l_1()
                        .border_color(hsla(tokens.colors.border))
                        .child(
                            Label::new(thought.content.clone())
                                .text_size(caption_size)
                                .text_color(secondary),
                        )
                }))
            })
            .into_any_element()
    }

    fn render_attachment(
        &self,
        message_id: &MessageId,
        attachment: &AttachmentSummary,
        cx: &mut Context<Self>,
    ) -> AnyElement {
        let tokens = &self.tokens;
        let caption_size = px(tokens.typography.caption_size);
        let thumbnail_size = px(tokens.layout.attachment_thumbnail_size);

        match &attachment.payload {
            AttachmentPayload::Image { .. } => match self.image_cache.get(&attachment.id) {
                Some(image) => img(image.clone())
                    .size(thumbnail_size)
                    .rounded(px(tokens.layout.bubble_corner_radius / 2.))
                    .into_any_element(),
                None => generic_chip(attachment, tokens).into_any_element(),
            },
            AttachmentPayload::Link {
                url,
                title,
                summary,
            } => {
                let target = url.to_string();
                v_flex()
                    .id(SharedString::from(format!(
                        "link-{}-{}",
                        message_id, attachment.id
                    )))
                    .w(thumbnail_size * 2.)
                    .p(px(tokens.spacing.sm))
                    .gap(px(tokens.spacing.xxs))
                    .rounded(px(tokens.spacing.sm))
                    .border_1()
                    .border_color(hsla(tokens.colors.border))
                    .bg(hsla(tokens.colors.surface))
                    .cursor_pointer()
                    .child(
                        Label::new(title.clone().unwrap_or_else(|| attachment.display_name.clone()))
                            .text_size(px(tokens.typography.body_size))
                            .text_color(hsla(tokens.colors.text_primary)),
                    )
                    .when_some(summary.clone(), |card, summary| {
                        card.child(
                            Label::new(summary)
                                .text_size(caption_size)
                                .text_color(hsla(tokens.colors.text_secondary)),
                        )
                    })
                    .child(
                        Label::new(target.clone())
                            .text_size(caption_size)
                            .text_color(hsla(tokens.colors.primary)),
                    )
                    .on_click(cx.listener(move |_, _, _window, cx| {
                        cx.open_url(&target);
                    }))
                    .into_any_element()
            }
            AttachmentPayload::Generic => generic_chip(attachment, tokens).into_any_element(),
        }
    }
}

impl Render for MessageList {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        self.update_content_width(cx);
        self.report_viewport_movement(cx);
        self.scroll_manager.apply_pending_scroll();

        let tokens = &self.tokens;
        v_flex()
            .size_full()
            .min_h_0()
            .bg(hsla(tokens.colors.background))
            .when_some(tokens.typography.font_family.clone(), |list, family| {
                list.font_family(family)
            })
            .child(
                v_virtual_list(
                    cx.entity().clone(),
                    "message-list",
                    self.item_sizes.clone(),
                    |this, visible_range, window, cx| {
                        // Measure only visible rows so long histories keep O(visible) layout work.
                        this.update_content_width(cx);
                        this.measure_visible_items(visible_range.clone(), window, cx);
                        visible_range
                            .filter_map(|index| {
                                this.rows
                                    .get(index)
                                    .cloned()
                                    .map(|row| this.render_row(&row, cx))
                            })
                            .collect::<Vec<_>>()
                    },
                )
                .size_full()
                .px(px(tokens.spacing.lg))
                .py(px(tokens.spacing.md))
                .gap(px(tokens.spacing.message_gap))
                .track_scroll(self.scroll_manager.handle()),
            )
    }
}

fn generic_chip(attachment: &AttachmentSummary, tokens: &DesignTokens) -> impl IntoElement {
    let label = match attachment.size_bytes {
        Some(size_bytes) => format!(
            "{} · {}",
            attachment.display_name,
            format_byte_size(size_bytes)
        ),
        None => attachment.display_name.clone(),
    };

    h_flex()
        .px(px(tokens.spacing.sm))
        .py(px(tokens.spacing.xs))
        .rounded(px(tokens.spacing.sm))
        .bg(hsla(tokens.colors.surface))
        .child(
            Label::new(label)
                .text_size(px(tokens.typography.caption_size))
                .text_color(hsla(tokens.colors.text_primary)),
        )
}

fn gpui_image(data: &ImageData) -> Image {
    let format = match data.encoding {
        ImageEncoding::Png => ImageFormat::Png,
        ImageEncoding::Jpeg => ImageFormat::Jpeg,
        ImageEncoding::Gif => ImageFormat::Gif,
        ImageEncoding::Webp => ImageFormat::Webp,
    };
    Image::from_bytes(format, data.bytes.to_vec())
}

fn thinking_summary(step_count: usize, seconds: i64, expanded: bool) -> String {
    let marker = if expanded { "▾" } else { "▸" };
    let steps = if step_count == 1 { "step" } else { "steps" };
    if seconds > 0 {
        format!("{marker} Thought for {seconds}s · {step_count} {steps}")
    } else {
        format!("{marker} Thought · {step_count} {steps}")
    }
}

fn layout_hash(row: &MessageRow, thoughts_expanded: bool) -> u64 {
    let mut hasher = DefaultHasher::new();

    row.id.hash(&mut hasher);
    row.sender.hash(&mut hasher);
    row.status.hash(&mut hasher);
    row.day_separator.hash(&mut hasher);
    row.text.hash(&mut hasher);
    row.reactions.hash(&mut hasher);
    row.quick_reactions.len().hash(&mut hasher);
    row.show_retry.hash(&mut hasher);
    for attachment in &row.attachments {
        attachment.id.hash(&mut hasher);
    }
    row.thinking
        .as_ref()
        .map(|session| session.thoughts().len())
        .hash(&mut hasher);
    thoughts_expanded.hash(&mut hasher);

    hasher.finish()
}

fn estimate_row_height(
    row: &MessageRow,
    thoughts_expanded: bool,
    tokens: &DesignTokens,
    content_width: Pixels,
) -> Pixels {
    let line_height = px(tokens.typography.body_size * tokens.typography.line_height);
    let caption_line = px(tokens.typography.caption_size * tokens.typography.line_height);
    let small_gap = px(tokens.spacing.xxs);
    let mut total = Pixels::ZERO;

    if row.day_separator.is_some() {
        total += SEPARATOR_HEIGHT + px(tokens.spacing.xs);
    }

    if row.sender == Sender::System {
        let text = row.text.as_deref().unwrap_or_default();
        return total + estimate_text_height(text, content_width, caption_line);
    }

    let bubble_width = min_pixels(content_width, px(tokens.layout.bubble_max_width));
    let text_width = max_pixels(px(1.), bubble_width - px(tokens.spacing.bubble_padding_x) * 2.);
    let mut bubble = px(tokens.spacing.bubble_padding_y) * 2.;
    if let Some(text) = &row.text {
        bubble += estimate_text_height(text, text_width, line_height);
    }
    for attachment in &row.attachments {
        bubble += match attachment.payload {
            AttachmentPayload::Image { .. } => px(tokens.layout.attachment_thumbnail_size),
            AttachmentPayload::Link { .. } => LINK_CARD_HEIGHT,
            AttachmentPayload::Generic => GENERIC_CHIP_HEIGHT,
        } + px(tokens.spacing.sm);
    }
    total += bubble + small_gap + META_ROW_HEIGHT;

    if !row.reactions.is_empty() {
        total += px(tokens.layout.reaction_chip_height) + small_gap;
    }
    if !row.quick_reactions.is_empty() {
        total += QUICK_REACTION_ROW_HEIGHT + small_gap;
    }
    if let Some(session) = &row.thinking {
        total += THINKING_HEADER_HEIGHT + small_gap;
        if thoughts_expanded {
            total += caption_line * session.thoughts().len();
        }
    }

    total
}

fn estimate_text_height(content: &str, width: Pixels, line_height: Pixels) -> Pixels {
    if content.is_empty() {
        return line_height;
    }

    let chars_per_line = (f32::from(width) / ESTIMATED_CHAR_WIDTH).floor().max(1.0) as usize;

    let mut line_count = 0usize;
    for line in content.lines() {
        let char_count = line.chars().count().max(1);
        line_count += char_count.div_ceil(chars_per_line);
    }

    // Account for the trailing empty line when content ends with a newline.
    if content.ends_with('\n') {
        line_count += 1;
    }

    line_height * line_count.max(1)
}

fn max_pixels(a: Pixels, b: Pixels) -> Pixels {
    if f32::from(a) >= f32::from(b) { a } else { b }
}

fn min_pixels(a: Pixels, b: Pixels) -> Pixels {
    if f32::from(a) <= f32::from(b) { a } else { b }
}

fn pixels_changed(a: Pixels, b: Pixels) -> bool {
    (f32::from(a) - f32::from(b)).abs() > 0.5
}

#[cfg(test)]
mod tests {
    use chatkit::{MessageStatus, QuickReaction, Reaction};

    use super::*;

    fn row(index: usize, sender: Sender) -> MessageRow {
        let timestamp = chrono::DateTime::<chrono::Utc>::MIN_UTC;
        MessageRow {
            id: MessageId::new(format!("m{index}")),
            sender,
            status: MessageStatus::Sent,
            timestamp,
            timestamp_label: "09:00".to_string(),
            day_separator: None,
            text: Some(format!("message-{index}: virtualization fixture payload")),
            attachments: Vec::new(),
            reactions: Vec::new(),
            quick_reactions: Vec::new(),
            show_retry: false,
            status_glyph: None,
            thinking: None,
        }
    }

    #[::core::prelude::v1::test]
    fn large_history_keeps_row_metrics_deterministic() {
        let tokens = DesignTokens::default();
        let content_width = px(680.);
        let mut rows = (0..2_000)
            .map(|index| {
                let sender = if index % 2 == 0 {
                    Sender::CurrentUser
                } else {
                    Sender::OtherUser
                };
                row(index, sender)
            })
            .collect::<Vec<_>>();

        let hashes_before = rows
            .iter()
            .map(|row| layout_hash(row, false))
            .collect::<Vec<_>>();
        assert!(
            rows.iter()
                .all(|row| estimate_row_height(row, false, &tokens, content_width) > Pixels::ZERO)
        );

        if let Some(last) = rows.last_mut() {
            last.status = MessageStatus::Failed;
            last.show_retry = true;
        }
        let hashes_after = rows
            .iter()
            .map(|row| layout_hash(row, false))
            .collect::<Vec<_>>();

        assert_eq!(hashes_before[..1_999], hashes_after[..1_999]);
        assert_ne!(hashes_before[1_999], hashes_after[1_999]);
    }

    #[::core::prelude::v1::test]
    fn reactions_and_separators_grow_estimates() {
        let tokens = DesignTokens::default();
        let width = px(680.);
        let plain = row(1, Sender::OtherUser);

        let mut decorated = plain.clone();
        decorated.day_separator = Some("Today".to_string());
        decorated.reactions = vec![Reaction::new("r", "👍", 2, true)];
        decorated.quick_reactions = vec![QuickReaction {
            emoji: "👍".to_string(),
            is_selected: true,
        }];

        assert!(
            estimate_row_height(&decorated, false, &tokens, width)
                > estimate_row_height(&plain, false, &tokens, width)
        );
        assert_ne!(layout_hash(&plain, false), layout_hash(&decorated, false));
    }

    #[::core::prelude::v1::test]
    fn expanding_thoughts_changes_layout_identity() {
        let plain = row(1, Sender::OtherUser);
        assert_ne!(layout_hash(&plain, false), layout_hash(&plain, true));
    }

    #[::core::prelude::v1::test]
    fn thinking_summary_reads_naturally() {
        assert_eq!(thinking_summary(1, 0, false), "▸ Thought · 1 step");
        assert_eq!(thinking_summary(3, 12, true), "▾ Thought for 12s · 3 steps");
    }
}
