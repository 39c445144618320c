//! HTML rendering of editable fields and the commit/cancel wiring behind
//! an open editor. DOM scanning and event binding are left to the host page.

use maud::{Markup, html};

use crate::{edit_mode::EditModeController, store::ContentStore};

// ── Keyboard shortcut ─────────────────────────────────────────────────────────

/// A key press as reported by the host (`key` is the `KeyboardEvent.key`).
#[derive(Debug, Clone, Default)]
pub struct KeyChord {
    pub key: String,
    pub ctrl: bool,
    pub meta: bool,
    pub shift: bool,
}

impl KeyChord {
    /// Ctrl+Shift+E, or Cmd+Shift+E on macOS.
    pub fn is_toggle_shortcut(&self) -> bool {
        (self.ctrl || self.meta) && self.shift && self.key.eq_ignore_ascii_case("e")
    }
}

// ── List drafts ───────────────────────────────────────────────────────────────

/// Turn textarea text into list items: one per line, trimmed, blanks dropped.
pub fn parse_list_draft(draft: &str) -> Vec<String> {
    draft
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn list_draft(items: &[String]) -> String {
    items.join("\n")
}

/// Parse a `|`-separated default such as `data-editable-default="a | b"`.
pub fn split_default_list(raw: &str) -> Vec<String> {
    raw.split('|')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

// ── Field rendering ───────────────────────────────────────────────────────────

/// Current text of a field, falling back to `default`.
pub fn field_text(store: &ContentStore, id: &str, default: &str) -> String {
    store.get_as(id, default.to_string())
}

/// Current items of a list field. An empty stored list shows the default.
pub fn list_items(store: &ContentStore, id: &str, default: &[String]) -> Vec<String> {
    let items: Vec<String> = store.get_as(id, default.to_vec());
    if items.is_empty() { default.to_vec() } else { items }
}

pub fn render_field(
    store: &ContentStore,
    mode: &EditModeController,
    id: &str,
    default: &str,
    multiline: bool,
) -> Markup {
    let value = field_text(store, id, default);
    if !mode.is_editing() {
        return html! { (value) };
    }
    html! {
        span.editable data-editable=(id) data-editable-multiline=[multiline.then_some("true")] {
            span { (value) }
            small.editable-badge { "Edit" }
        }
    }
}

pub fn render_list(
    store: &ContentStore,
    mode: &EditModeController,
    id: &str,
    default: &[String],
) -> Markup {
    let items = list_items(store, id, default);
    let list = html! {
        ul {
            @for item in &items {
                li { (item) }
            }
        }
    };
    if !mode.is_editing() {
        return list;
    }
    html! {
        div.editable-list data-editable-list=(id) {
            (list)
            small.editable-badge { "Edit list" }
        }
    }
}

// ── Open editors ──────────────────────────────────────────────────────────────

/// Editor state for a single text field, from click to commit or cancel.
#[derive(Debug, Clone)]
pub struct TextEditor {
    id: String,
    original: String,
    pub draft: String,
    multiline: bool,
}

impl TextEditor {
    pub fn open(store: &ContentStore, id: &str, default: &str, multiline: bool) -> Self {
        let original = field_text(store, id, default);
        Self {
            id: id.to_string(),
            draft: original.clone(),
            original,
            multiline,
        }
    }

    pub fn render(&self) -> Markup {
        if self.multiline {
            html! { textarea.editable-input autofocus { (self.draft) } }
        } else {
            html! { input.editable-input autofocus value=(self.draft); }
        }
    }

    /// Enter commits single-line inputs; textareas keep Enter for newlines.
    pub fn commits_on_enter(&self) -> bool {
        !self.multiline
    }

    pub async fn commit(self, store: &ContentStore) {
        store.save_value(&self.id, self.draft).await;
    }

    /// Discard the draft and return the value the field showed on open.
    pub fn cancel(self) -> String {
        self.original
    }
}

/// Editor state for a list field; the draft is one item per line.
#[derive(Debug, Clone)]
pub struct ListEditor {
    id: String,
    original: Vec<String>,
    pub draft: String,
}

impl ListEditor {
    pub fn open(store: &ContentStore, id: &str, default: &[String]) -> Self {
        let original = list_items(store, id, default);
        Self {
            id: id.to_string(),
            draft: list_draft(&original),
            original,
        }
    }

    pub fn render(&self) -> Markup {
        html! { textarea.editable-input autofocus { (self.draft) } }
    }

    pub async fn commit(self, store: &ContentStore) {
        store
            .save_value(&self.id, parse_list_draft(&self.draft))
            .await;
    }

    pub fn cancel(self) -> Vec<String> {
        self.original
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        edit_mode::{DEFAULT_SESSION_KEY, PlaintextPassword},
        notify::Listeners,
        storage::{KeyValueSlot, LocalAdapter, MemorySlot},
    };
    use serde_json::json;
    use std::sync::Arc;

    fn setup(editing: bool) -> (ContentStore, EditModeController) {
        let store = ContentStore::new(Arc::new(LocalAdapter::new(MemorySlot::new())));
        let session = MemorySlot::new();
        if editing {
            session.set(DEFAULT_SESSION_KEY, "1").unwrap();
        }
        let mode = EditModeController::new(
            Arc::new(session),
            DEFAULT_SESSION_KEY,
            Arc::new(PlaintextPassword::default()),
            Listeners::new(),
        );
        (store, mode)
    }

    #[test]
    fn shortcut_detection() {
        let chord = |key: &str, ctrl, meta, shift| KeyChord {
            key: key.into(),
            ctrl,
            meta,
            shift,
        };
        assert!(chord("E", true, false, true).is_toggle_shortcut());
        assert!(chord("e", false, true, true).is_toggle_shortcut());
        assert!(!chord("e", true, false, false).is_toggle_shortcut());
        assert!(!chord("x", true, false, true).is_toggle_shortcut());
    }

    #[test]
    fn list_draft_parsing_trims_and_drops_blanks() {
        assert_eq!(
            parse_list_draft("  fast \n\n small\r\n   \ncheap"),
            vec!["fast", "small", "cheap"]
        );
        assert_eq!(split_default_list("a | b ||c"), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn viewing_renders_plain_escaped_text() {
        let (store, mode) = setup(false);
        store.save_value("hero.title", "<b>Hi</b>").await;
        let html = render_field(&store, &mode, "hero.title", "Default", false).into_string();
        assert_eq!(html, "&lt;b&gt;Hi&lt;/b&gt;");
    }

    #[tokio::test]
    async fn editing_renders_editable_wrapper() {
        let (store, mode) = setup(true);
        store.load().await;
        let html = render_field(&store, &mode, "hero.title", "Default", true).into_string();
        assert!(html.contains(r#"data-editable="hero.title""#));
        assert!(html.contains(r#"data-editable-multiline="true""#));
        assert!(html.contains("Default"));

        let defaults = vec!["one".to_string()];
        let list = render_list(&store, &mode, "features", &defaults).into_string();
        assert!(list.contains("<li>one</li>"));
        assert!(list.contains("Edit list"));
    }

    #[tokio::test]
    async fn text_editor_commit_and_cancel() {
        let (store, _mode) = setup(true);
        let mut editor = TextEditor::open(&store, "cta", "Sign up", false);
        assert!(editor.commits_on_enter());
        editor.draft = "Join now".into();
        assert_eq!(editor.clone().cancel(), "Sign up");
        editor.commit(&store).await;
        assert_eq!(store.get_value("cta", json!(null)), json!("Join now"));
    }

    #[tokio::test]
    async fn list_editor_commits_parsed_items() {
        let (store, _mode) = setup(true);
        let defaults = vec!["a".to_string(), "b".to_string()];
        let mut editor = ListEditor::open(&store, "features", &defaults);
        assert_eq!(editor.draft, "a\nb");
        editor.draft = " x \n\n y ".into();
        editor.commit(&store).await;
        assert_eq!(store.get_value("features", json!(null)), json!(["x", "y"]));

        // An emptied list falls back to the defaults when shown.
        let mut editor = ListEditor::open(&store, "features", &defaults);
        editor.draft = "\n".into();
        editor.commit(&store).await;
        assert_eq!(list_items(&store, "features", &defaults), defaults);
    }
}
