use std::fmt;
use std::rc::Rc;

type SlotProducer<E> = Rc<dyn Fn() -> Option<E>>;
type SuggestionProducer<E> = Rc<dyn Fn(&str) -> Option<E>>;

/// Optional extension regions composed into the fixed chat layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotKind {
    /// Fixed control beside the input, e.g. an attach button.
    Accessory,
    /// Bar pinned above the keyboard, present only while the input has focus.
    InputAccessory,
    /// Overlay keyed by the current input text.
    Suggestions,
}

/// Host-supplied content producers. `E` is whatever the renderer draws, e.g. a gpui
/// `AnyElement`.
///
/// Producers are deferred: nothing runs until a render pass asks for the region. An
/// absent producer, or one that returns `None`, means the region takes no space.
pub struct ChatSlots<E> {
    accessory: Option<SlotProducer<E>>,
    input_accessory: Option<SlotProducer<E>>,
    suggestions: Option<SuggestionProducer<E>>,
}

impl<E> ChatSlots<E> {
    pub fn new() -> Self {
        Self {
            accessory: None,
            input_accessory: None,
            suggestions: None,
        }
    }

    pub fn accessory(mut self, producer: impl Fn() -> Option<E> + 'static) -> Self {
        self.accessory = Some(Rc::new(producer));
        self
    }

    pub fn input_accessory(mut self, producer: impl Fn() -> Option<E> + 'static) -> Self {
        self.input_accessory = Some(Rc::new(producer));
        self
    }

    pub fn suggestions(mut self, producer: impl Fn(&str) -> Option<E> + 'static) -> Self {
        self.suggestions = Some(Rc::new(producer));
        self
    }

    pub fn is_configured(&self, kind: SlotKind) -> bool {
        match kind {
            SlotKind::Accessory => self.accessory.is_some(),
            SlotKind::InputAccessory => self.input_accessory.is_some(),
            SlotKind::Suggestions => self.suggestions.is_some(),
        }
    }

    pub(crate) fn produce_accessory(&self) -> Option<E> {
        self.accessory.as_ref().and_then(|producer| producer())
    }

    pub(crate) fn produce_input_accessory(&self, input_focused: bool) -> Option<E> {
        if !input_focused {
            return None;
        }
        self.input_accessory.as_ref().and_then(|producer| producer())
    }

    pub(crate) fn produce_suggestions(&self, text: &str) -> Option<E> {
        self.suggestions.as_ref().and_then(|producer| producer(text))
    }
}

impl<E> Default for ChatSlots<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Clone for ChatSlots<E> {
    fn clone(&self) -> Self {
        Self {
            accessory: self.accessory.clone(),
            input_accessory: self.input_accessory.clone(),
            suggestions: self.suggestions.clone(),
        }
    }
}

impl<E> fmt::Debug for ChatSlots<E> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("ChatSlots")
            .field("accessory", &self.accessory.is_some())
            .field("input_accessory", &self.input_accessory.is_some())
            .field("suggestions", &self.suggestions.is_some())
            .finish()
    }
}
