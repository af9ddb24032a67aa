use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use chatkit::{
    AttachmentAction, ChatDataProvider, ChatSlots, DeliveryOutcome, InMemoryChatSource,
    LinkAttachment, LinkPreview, MessageId, MessageStatus, Reaction, Sender, SettingsStore,
    StandardAttachment, StandardMessage,
};
use chrono::Utc;
use gpui::*;
use gpui_component::Root;
use gpui_component::label::Label;
use url::Url;

use chatkit_ui::ChatView;

const DELIVERY_TICK_MS: u64 = 1200;

/// Demo entry point.
///
/// Bootstraps the GPUI application with:
/// 1. Asset loading via gpui-component-assets
/// 2. gpui-component initialization (required for Root and themes)
/// 3. Surface settings from the user config directory
/// 4. An in-memory conversation whose outgoing messages get delivered on a timer
fn main() {
    tracing_subscriber::fmt::init();

    let app = Application::new().with_assets(gpui_component_assets::Assets);

    app.run(|cx| {
        gpui_component::init(cx);

        let settings_store = SettingsStore::load();
        let settings = settings_store.settings();
        tracing::info!(
            "loaded surface settings from {}",
            settings_store.config_path().display()
        );

        let source = Rc::new(RefCell::new(InMemoryChatSource::with_messages(
            seed_messages(),
        )));
        spawn_delivery_loop(source.clone(), cx);

        cx.spawn(async move |cx| {
            cx.update(|cx| {
                let options = WindowOptions {
                    window_bounds: Some(WindowBounds::Windowed(Bounds::centered(
                        None,
                        size(px(720.), px(820.)),
                        cx,
                    ))),
                    titlebar: Some(TitlebarOptions {
                        title: Some("chatkit".into()),
                        ..Default::default()
                    }),
                    ..Default::default()
                };

                let source = source.clone();
                let settings = settings.clone();
                cx.open_window(options, move |window, cx| {
                    let view = cx.new(|cx| {
                        ChatView::from_settings(&source, &settings, demo_slots(), window, cx)
                    });
                    view.update(cx, |view, cx| {
                        view.add_attachment_action(share_link_action(), cx);
                    });

                    // Root is required by gpui-component for overlays and theming.
                    cx.new(|cx| Root::new(view, window, cx))
                })
                .expect("failed to open main window");

                cx.activate(true);
            })
        })
        .detach();
    });
}

fn seed_messages() -> Vec<StandardMessage> {
    let yesterday = Utc::now() - chrono::Duration::days(1);
    let mut messages = vec![
        StandardMessage::new("seed-1", Sender::System, MessageStatus::Sent, yesterday)
            .with_text("Conversation started"),
        StandardMessage::new("seed-2", Sender::OtherUser, MessageStatus::Read, yesterday)
            .with_text("Hey! Did you get a chance to look at the new layout?")
            .with_reactions(vec![Reaction::new("seed-2-👍", "👍", 1, true)]),
        StandardMessage::text(
            "seed-3",
            Sender::CurrentUser,
            MessageStatus::Read,
            "Yes, the bubbles finally line up. Sending the reference now.",
        ),
        StandardMessage::text(
            "seed-4",
            Sender::CurrentUser,
            MessageStatus::Failed,
            "This one never made it. Try the retry button.",
        ),
    ];

    if let Ok(url) = Url::parse("https://www.zed.dev/") {
        let link = LinkAttachment::new("seed-link", url).with_preview(LinkPreview {
            title: Some("Zed".to_string()),
            summary: Some("A high-performance code editor built on gpui.".to_string()),
            image_url: None,
        });
        messages.insert(
            3,
            StandardMessage::new("seed-5", Sender::OtherUser, MessageStatus::Read, Utc::now())
                .with_attachments(vec![link.into()]),
        );
    }

    messages
}

fn demo_slots() -> ChatSlots<AnyElement> {
    ChatSlots::new()
        .input_accessory(|| {
            Some(
                Label::new("Shift+Enter inserts a new line")
                    .text_xs()
                    .px_4()
                    .into_any_element(),
            )
        })
        .suggestions(|text| {
            text.starts_with('/').then(|| {
                Label::new("/shrug  ¯\\_(ツ)_/¯")
                    .text_xs()
                    .px_2()
                    .into_any_element()
            })
        })
}

fn share_link_action() -> AttachmentAction<StandardAttachment> {
    let next_id = Rc::new(Cell::new(1u32));
    AttachmentAction::new("Share link", move || {
        let id = next_id.replace(next_id.get() + 1);
        async move {
            let url = Url::parse("https://github.com/zed-industries/zed").ok()?;
            Some(StandardAttachment::from(LinkAttachment::new(
                format!("shared-link-{id}"),
                url,
            )))
        }
    })
    .with_icon("link")
}

/// Plays the remote side: pending messages are delivered, or fail when they mention
/// "fail". A delivery is answered on the following tick after a short thinking trace.
fn spawn_delivery_loop(source: Rc<RefCell<InMemoryChatSource>>, cx: &mut App) {
    cx.spawn(async move |cx| {
        let mut reply_index = 0u32;
        let mut pending_reply: Option<MessageId> = None;
        loop {
            cx.background_executor()
                .timer(Duration::from_millis(DELIVERY_TICK_MS))
                .await;

            if let Some(reply_id) = pending_reply.take() {
                let mut source = source.borrow_mut();
                source.push_thought("Drafting a short answer");
                source.set_typing(false);
                source.push_message(StandardMessage::text(
                    reply_id.clone(),
                    Sender::OtherUser,
                    MessageStatus::Sent,
                    "Got it!",
                ));
                source.finish_thinking(&reply_id);
            }

            let pending = source
                .borrow()
                .messages()
                .iter()
                .filter(|message| message.status == MessageStatus::Sending)
                .map(|message| {
                    let fails = message
                        .text
                        .as_deref()
                        .is_some_and(|text| text.to_lowercase().contains("fail"));
                    (message.id.clone(), fails)
                })
                .collect::<Vec<_>>();

            for (message_id, fails) in pending {
                let mut source = source.borrow_mut();
                if fails {
                    source.mark_delivery(&message_id, DeliveryOutcome::Failed);
                    continue;
                }

                source.mark_delivery(&message_id, DeliveryOutcome::Delivered);
                if pending_reply.is_none() {
                    reply_index += 1;
                    pending_reply = Some(MessageId::new(format!("reply-{reply_index}")));
                    source.set_typing(true);
                    source.begin_thinking();
                    source.push_thought("Reading the message");
                }
            }
        }
    })
    .detach();
}
