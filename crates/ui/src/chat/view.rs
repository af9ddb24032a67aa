use std::cell::RefCell;
use std::rc::Rc;

use chatkit::settings::DEFAULT_INPUT_PLACEHOLDER;
use chatkit::{
    AttachmentAction, AttachmentId, AttachmentSummary, ChatDataSource, ChatSlots, ChatSurface,
    DesignTokens, MessageId, ReactionPalette, Subscription, SurfaceFrame, SurfaceSettings,
    ThemePreset, ThemeScope, ThinkingThought,
};
use futures::StreamExt as _;
use futures::channel::mpsc;
use gpui::prelude::FluentBuilder as _;
use gpui::*;
use gpui_component::{
    IconName, Sizable,
    button::{Button, ButtonVariants},
    h_flex,
    label::Label,
    v_flex,
};

use crate::chat::events::{
    InputStateChanged, ReactionToggled, RetryRequested, Submit, ViewportScrolled,
};
use crate::chat::message_input::MessageInput;
use crate::chat::message_list::{ListUpdate, MessageList};
use crate::theme::{apply_preset, hsla};

/// Live thoughts beyond this many are collapsed into the panel header.
const VISIBLE_LIVE_THOUGHTS: usize = 3;

/// Coordinator for one chat surface: owns the headless [`ChatSurface`], the message
/// list and the input, and turns their events into data-source actions.
///
/// The host keeps ownership of `D`. Host mutations reach the view through the source's
/// change notifier and schedule a redraw.
pub struct ChatView<D>
where
    D: ChatDataSource + 'static,
{
    surface: ChatSurface<D, AnyElement>,
    message_list: Entity<MessageList>,
    message_input: Entity<MessageInput>,
    attachment_actions: Vec<AttachmentAction<D::Attachment>>,
    attachment_task: Option<Task<()>>,
    _change_pump: Task<()>,
    _source_subscription: Subscription,
}

impl<D> ChatView<D>
where
    D: ChatDataSource + 'static,
    D::Attachment: 'static,
{
    pub fn new(
        source: &Rc<RefCell<D>>,
        palette: ReactionPalette,
        slots: ChatSlots<AnyElement>,
        window: &mut Window,
        cx: &mut Context<Self>,
    ) -> Self {
        let surface = ChatSurface::new(source, palette, slots);
        Self::with_surface(source, surface, DEFAULT_INPUT_PLACEHOLDER, window, cx)
    }

    /// Builds a view configured from persisted surface settings.
    pub fn from_settings(
        source: &Rc<RefCell<D>>,
        settings: &SurfaceSettings,
        slots: ChatSlots<AnyElement>,
        window: &mut Window,
        cx: &mut Context<Self>,
    ) -> Self {
        let mut surface = ChatSurface::new(source, settings.palette(), slots);
        surface.set_theme_scope(settings.theme_scope());
        apply_preset(settings.preset, Some(window), cx);

        Self::with_surface(
            source,
            surface,
            settings.input_placeholder.clone(),
            window,
            cx,
        )
    }

    fn with_surface(
        source: &Rc<RefCell<D>>,
        surface: ChatSurface<D, AnyElement>,
        placeholder: impl Into<SharedString>,
        window: &mut Window,
        cx: &mut Context<Self>,
    ) -> Self {
        let tokens = surface.tokens();
        let max_lines = tokens.layout.input_max_lines;
        let message_list = cx.new(|cx| MessageList::new(tokens, cx));
        let message_input = cx.new(|cx| MessageInput::new(placeholder, max_lines, window, cx));

        // The notifier fires inside the host's own mutation, so it only queues a wake-up.
        let (change_tx, mut change_rx) = mpsc::unbounded::<()>();
        let source_subscription = source.borrow().subscribe(Box::new(move || {
            let _ = change_tx.unbounded_send(());
        }));
        let change_pump = cx.spawn(async move |this, cx| {
            while change_rx.next().await.is_some() {
                // Coalesce bursts of host mutations into one redraw.
                while let Ok(Some(())) = change_rx.try_next() {}
                if this.update(cx, |_, cx| cx.notify()).is_err() {
                    break;
                }
            }
        });

        cx.subscribe_in(
            &message_input,
            window,
            |this, _, event: &Submit, window, cx| {
                this.handle_submit(event, window, cx);
            },
        )
        .detach();

        cx.subscribe(&message_input, |_, _, _event: &InputStateChanged, cx| {
            cx.notify();
        })
        .detach();

        cx.subscribe(&message_list, |this, _, event: &RetryRequested, cx| {
            if this.surface.retry(&event.message_id) {
                cx.notify();
            }
        })
        .detach();

        cx.subscribe(&message_list, |this, _, event: &ReactionToggled, cx| {
            if this.surface.toggle_reaction(&event.message_id, &event.emoji) {
                cx.notify();
            }
        })
        .detach();

        cx.subscribe(&message_list, |this, _, event: &ViewportScrolled, cx| {
            this.surface.user_scrolled(event.observation.clone());
            cx.notify();
        })
        .detach();

        Self {
            surface,
            message_list,
            message_input,
            attachment_actions: Vec::new(),
            attachment_task: None,
            _change_pump: change_pump,
            _source_subscription: source_subscription,
        }
    }

    /// Adds a picker shown beside the input. Picked results are staged and go out with
    /// the next send.
    pub fn add_attachment_action(
        &mut self,
        action: AttachmentAction<D::Attachment>,
        cx: &mut Context<Self>,
    ) {
        self.attachment_actions.push(action);
        cx.notify();
    }

    pub fn tokens(&self) -> DesignTokens {
        self.surface.tokens()
    }

    pub fn set_theme(&mut self, tokens: DesignTokens, cx: &mut Context<Self>) {
        self.surface.set_theme(tokens);
        cx.notify();
    }

    pub fn set_preset(&mut self, preset: ThemePreset, window: &mut Window, cx: &mut Context<Self>) {
        self.surface.set_preset(preset);
        apply_preset(preset, Some(window), cx);
        cx.notify();
    }

    pub fn set_theme_scope(&mut self, scope: ThemeScope, cx: &mut Context<Self>) {
        self.surface.set_theme_scope(scope);
        cx.notify();
    }

    /// Jumps to `message_id` and keeps it anchored while new messages arrive. Unknown ids
    /// leave the viewport alone.
    pub fn scroll_to_message(&mut self, message_id: &MessageId, cx: &mut Context<Self>) -> bool {
        if !self.surface.scroll_to_message(message_id) {
            return false;
        }

        self.message_list
            .update(cx, |list, cx| list.scroll_to_message(message_id, cx))
    }

    pub fn scroll_to_bottom(&mut self, cx: &mut Context<Self>) {
        self.surface.scroll_to_bottom();
        self.message_list
            .update(cx, |list, cx| list.reset_scroll_tracking(cx));
        cx.notify();
    }

    fn handle_submit(&mut self, event: &Submit, window: &mut Window, cx: &mut Context<Self>) {
        if !self.surface.send(&event.content) {
            return;
        }

        self.message_input
            .update(cx, |input, cx| input.clear(window, cx));
        cx.notify();
    }

    fn run_attachment_action(&mut self, index: usize, cx: &mut Context<Self>) {
        let Some(action) = self.attachment_actions.get(index).cloned() else {
            return;
        };

        tracing::debug!("running attachment action '{}'", action.title());
        // Replacing the task drops a picker that is still open.
        self.attachment_task = Some(cx.spawn(async move |this, cx| {
            let outcome = action.trigger().await;
            let _ = this.update(cx, |this, cx| {
                if this.surface.stage_attachment(outcome) {
                    cx.notify();
                }
            });
        }));
    }

    fn unstage_attachment(&mut self, attachment_id: &AttachmentId, cx: &mut Context<Self>) {
        self.surface.unstage_attachment(attachment_id);
        cx.notify();
    }

    fn render_status_line(
        &self,
        is_typing: bool,
        thinking: Option<&[ThinkingThought]>,
        tokens: &DesignTokens,
    ) -> Option<AnyElement> {
        if !is_typing && thinking.is_none() {
            return None;
        }

        let caption_size = px(tokens.typography.caption_size);
        let indicator = hsla(tokens.colors.typing_indicator);

        let element = v_flex()
            .w_full()
            .px(px(tokens.spacing.lg))
            .py(px(tokens.spacing.xs))
            .gap(px(tokens.spacing.xxs))
            .when(is_typing, |column| {
                column.child(
                    Label::new("Typing…")
                        .text_size(caption_size)
                        .text_color(indicator),
                )
            })
            .when_some(thinking, |column, thoughts| {
                let hidden = thoughts.len().saturating_sub(VISIBLE_LIVE_THOUGHTS);
                column
                    .child(
                        Label::new(thinking_header(thoughts.len()))
                            .text_size(caption_size)
                            .text_color(indicator),
                    )
                    .when(hidden > 0, |column| {
                        column.child(
                            Label::new(format!("+{hidden} earlier"))
                                .text_size(caption_size)
                                .text_color(hsla(tokens.colors.text_secondary)),
                        )
                    })
                    .children(thoughts.iter().skip(hidden).map(|thought| {
                        div()
                            .pl(px(tokens.spacing.sm))
                            .border_l_1()
                            .border_color(hsla(tokens.colors.border))
                            .child(
                                Label::new(thought.content.clone())
                                    .text_size(caption_size)
                                    .text_color(hsla(tokens.colors.text_secondary)),
                            )
                    }))
            })
            .into_any_element();

        Some(element)
    }

    fn render_staged_attachments(
        &self,
        staged: &[AttachmentSummary],
        tokens: &DesignTokens,
        cx: &mut Context<Self>,
    ) -> AnyElement {
        h_flex()
            .w_full()
            .flex_wrap()
            .px(px(tokens.spacing.lg))
            .gap(px(tokens.spacing.xs))
            .children(staged.iter().map(|attachment| {
                let attachment_id = attachment.id.clone();
                Button::new(SharedString::from(format!("staged-{}", attachment.id)))
                    .xsmall()
                    .ghost()
                    .icon(IconName::Close)
                    .child(attachment.display_name.clone())
                    .on_click(cx.listener(move |this, _, _window, cx| {
                        this.unstage_attachment(&attachment_id, cx);
                    }))
            }))
            .into_any_element()
    }

    fn render_input_bar(
        &self,
        accessory: Option<AnyElement>,
        tokens: &DesignTokens,
        cx: &mut Context<Self>,
    ) -> AnyElement {
        h_flex()
            .w_full()
            .items_end()
            .px(px(tokens.spacing.lg))
            .py(px(tokens.spacing.md))
            .gap(px(tokens.spacing.sm))
            .min_h(px(tokens.layout.input_min_height))
            .border_t_1()
            .border_color(hsla(tokens.colors.border))
            .bg(hsla(tokens.colors.surface))
            .when_some(accessory, |bar, accessory| bar.child(accessory))
            .children(
                self.attachment_actions
                    .iter()
                    .enumerate()
                    .map(|(index, action)| {
                        Button::new(("attachment-action", index))
                            .small()
                            .ghost()
                            .icon(action_icon(action.icon()))
                            .tooltip(action.title().to_string())
                            .on_click(cx.listener(move |this, _, _window, cx| {
                                this.run_attachment_action(index, cx);
                            }))
                    }),
            )
            .child(self.message_input.clone())
            .into_any_element()
    }
}

impl<D> Render for ChatView<D>
where
    D: ChatDataSource + 'static,
    D::Attachment: 'static,
{
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let input = self.message_input.read(cx).snapshot(cx);
        let SurfaceFrame {
            tokens,
            rows,
            is_typing,
            thinking,
            follow_tail,
            staged_attachments,
            accessory,
            input_accessory,
            suggestions,
            ..
        } = self.surface.compose(&input);

        self.message_list.update(cx, |list, cx| {
            list.apply_frame(
                ListUpdate {
                    rows,
                    tokens: tokens.clone(),
                    follow_tail,
                },
                cx,
            );
        });

        let status_line = self.render_status_line(is_typing, thinking.as_deref(), &tokens);
        let staged = (!staged_attachments.is_empty())
            .then(|| self.render_staged_attachments(&staged_attachments, &tokens, cx));
        let input_bar = self.render_input_bar(accessory, &tokens, cx);

        v_flex()
            .size_full()
            .bg(hsla(tokens.colors.background))
            .text_color(hsla(tokens.colors.text_primary))
            .child(
                div()
                    .flex_1()
                    .min_h_0()
                    .child(self.message_list.clone()),
            )
            .children(status_line)
            .when_some(suggestions, |surface, suggestions| {
                surface.child(div().w_full().px(px(tokens.spacing.lg)).child(suggestions))
            })
            .when_some(input_accessory, |surface, bar| {
                surface.child(div().w_full().child(bar))
            })
            .children(staged)
            .child(input_bar)
    }
}

/// Maps an attachment action's icon name onto the bundled icon set. Unknown names
/// fall back to a plus sign.
fn action_icon(name: Option<&str>) -> IconName {
    match name.map(|name| name.trim().to_ascii_lowercase()).as_deref() {
        Some("link" | "url" | "external-link") => IconName::ExternalLink,
        Some("globe" | "web") => IconName::Globe,
        Some("file" | "document") => IconName::File,
        Some("folder" | "directory") => IconName::Folder,
        Some("inbox" | "import") => IconName::Inbox,
        _ => IconName::Plus,
    }
}

fn thinking_header(step_count: usize) -> String {
    match step_count {
        0 => "Thinking…".to_string(),
        1 => "Thinking… 1 step".to_string(),
        count => format!("Thinking… {count} steps"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[::core::prelude::v1::test]
    fn thinking_header_counts_steps() {
        assert_eq!(thinking_header(0), "Thinking…");
        assert_eq!(thinking_header(1), "Thinking… 1 step");
        assert_eq!(thinking_header(4), "Thinking… 4 steps");
    }

    #[::core::prelude::v1::test]
    fn attachment_action_icons_follow_their_names() {
        assert!(matches!(action_icon(Some("link")), IconName::ExternalLink));
        assert!(matches!(action_icon(Some(" Folder ")), IconName::Folder));
        assert!(matches!(action_icon(Some("file")), IconName::File));
        assert!(matches!(action_icon(Some("sparkles")), IconName::Plus));
        assert!(matches!(action_icon(None), IconName::Plus));
    }
}
