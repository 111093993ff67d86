//! Events emitted by components.

use serde::Serialize;

/// Length details carried by `char-count` and `max-length`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LengthDetail {
    pub value: String,
    pub length: usize,
    pub max_length: Option<usize>,
}

/// The component event contract.
///
/// Serializes with a `type` tag holding the event name, e.g.
/// `{"type":"change","value":"Hi"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum EditableEvent {
    Input { value: String },
    Change { value: String },
    CharCount(LengthDetail),
    MaxLength(LengthDetail),
    SlottedElementMissing,
    FontLoadError {
        #[serde(rename = "fontName")]
        font_name: String,
        error: String,
    },
}

impl EditableEvent {
    /// The event's wire name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Input { .. } => "input",
            Self::Change { .. } => "change",
            Self::CharCount(_) => "char-count",
            Self::MaxLength(_) => "max-length",
            Self::SlottedElementMissing => "slotted-element-missing",
            Self::FontLoadError { .. } => "font-load-error",
        }
    }
}

/// Outbox of events awaiting the host.
#[derive(Debug, Default)]
pub(crate) struct EventQueue {
    pending: Vec<EditableEvent>,
}

impl EventQueue {
    pub(crate) fn push(&mut self, event: EditableEvent) {
        tracing::trace!(event = event.name(), "emit");
        self.pending.push(event);
    }

    pub(crate) fn drain(&mut self) -> Vec<EditableEvent> {
        std::mem::take(&mut self.pending)
    }

    pub(crate) fn peek(&self) -> &[EditableEvent] {
        &self.pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_format() {
        let change = serde_json::to_string(&EditableEvent::Change { value: "Hi".into() }).unwrap();
        assert_eq!(change, r#"{"type":"change","value":"Hi"}"#);

        let count = serde_json::to_string(&EditableEvent::CharCount(LengthDetail {
            value: "ab".into(),
            length: 2,
            max_length: Some(5),
        }))
        .unwrap();
        assert_eq!(count, r#"{"type":"char-count","value":"ab","length":2,"maxLength":5}"#);

        let font = serde_json::to_string(&EditableEvent::FontLoadError {
            font_name: "Lobster".into(),
            error: "404".into(),
        })
        .unwrap();
        assert_eq!(font, r#"{"type":"font-load-error","fontName":"Lobster","error":"404"}"#);

        let missing = serde_json::to_string(&EditableEvent::SlottedElementMissing).unwrap();
        assert_eq!(missing, r#"{"type":"slotted-element-missing"}"#);
    }

    #[test]
    fn names_match_wire_tags() {
        assert_eq!(EditableEvent::SlottedElementMissing.name(), "slotted-element-missing");
        assert_eq!(EditableEvent::Input { value: String::new() }.name(), "input");
    }
}
