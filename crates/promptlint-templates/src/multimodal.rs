use serde::Deserialize;
use serde::Serialize;

pub const MARKER_OPEN: &str = "<multimodal-variable>";
pub const MARKER_CLOSE: &str = "</multimodal-variable>";

/// Characters a marker name may not contain.
const LINE_TERMINATORS: [char; 4] = ['\n', '\r', '\u{2028}', '\u{2029}'];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContentType {
    #[serde(rename = "text")]
    Text,
    #[serde(rename = "multi_part_variable")]
    MultimodalVariable,
}

/// One piece of multimodal message content.
///
/// For a [`ContentType::MultimodalVariable`] part, `text` is the variable
/// name without its markers.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentPart {
    #[serde(rename = "type")]
    pub kind: ContentType,
    pub text: String,
}

impl ContentPart {
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            kind: ContentType::Text,
            text: text.into(),
        }
    }

    #[must_use]
    pub fn variable(name: impl Into<String>) -> Self {
        Self {
            kind: ContentType::MultimodalVariable,
            text: name.into(),
        }
    }
}

/// The inline marker for a multimodal variable.
#[must_use]
pub fn marker(name: &str) -> String {
    format!("{MARKER_OPEN}{name}{MARKER_CLOSE}")
}

/// Next marker at or after `from`: `(marker start, name range, marker end)`.
///
/// The earliest close after an opener ends it. A name crossing a line
/// break does not match; the search resumes just past that opener.
fn find_marker(text: &str, mut from: usize) -> Option<(usize, usize, usize, usize)> {
    loop {
        let open = from + text.get(from..)?.find(MARKER_OPEN)?;
        let name_start = open + MARKER_OPEN.len();
        let name_end = name_start + text[name_start..].find(MARKER_CLOSE)?;

        if text[name_start..name_end].contains(LINE_TERMINATORS) {
            from = open + 1;
            continue;
        }
        return Some((open, name_start, name_end, name_end + MARKER_CLOSE.len()));
    }
}

/// Split `text` into text and multimodal-variable parts.
///
/// Returns an empty vector when `text` holds no complete marker, meaning
/// the text is plain and should be kept as is. Empty text parts are never
/// produced; unterminated markers stay in the surrounding text.
#[must_use]
pub fn split(text: &str) -> Vec<ContentPart> {
    let mut parts = Vec::new();
    let mut cursor = 0;

    while let Some((open, name_start, name_end, close_end)) = find_marker(text, cursor) {
        if open > cursor {
            parts.push(ContentPart::text(&text[cursor..open]));
        }
        parts.push(ContentPart::variable(&text[name_start..name_end]));
        cursor = close_end;
    }

    if !parts.is_empty() && cursor < text.len() {
        parts.push(ContentPart::text(&text[cursor..]));
    }

    parts
}

/// Inverse of [`split`]: text parts verbatim, variables re-wrapped.
#[must_use]
pub fn join(parts: &[ContentPart]) -> String {
    parts.iter().fold(String::new(), |mut out, part| {
        match part.kind {
            ContentType::Text => out.push_str(&part.text),
            ContentType::MultimodalVariable => {
                out.push_str(MARKER_OPEN);
                out.push_str(&part.text);
                out.push_str(MARKER_CLOSE);
            }
        }
        out
    })
}
