//! Editor state: the single source of truth for one open document.
//!
//! All edits go through `EditorState`, which re-reads the editing surface
//! afterwards. When the text changed, `content` is updated, every content
//! observer is notified synchronously, and the new value is published to
//! the autosave channel.

use crate::autosave::AutoSave;
use crate::format::{self, FormatRequest, Prompt};
use crate::render::{LivePreview, PreviewSurface, RenderPipeline};
use crate::search::FindReplace;
use crate::selection::{SearchMatch, Selection};
use crate::settings::EditorSettings;
use crate::surface::{EditSurface, TextSurface};
use tokio::sync::watch;

/// Receives committed content after every change.
pub trait ContentObserver {
    fn content_changed(&mut self, content: &str, settings: &EditorSettings);
}

/// State of one open document.
pub struct EditorState<S: EditSurface = TextSurface> {
    settings: EditorSettings,
    surface: S,
    /// Text as of the last commit.
    content: String,
    observers: Vec<Box<dyn ContentObserver>>,
    content_tx: watch::Sender<String>,
    /// Present while the find panel is open.
    find: Option<FindReplace>,
    autosave: AutoSave,
}

impl EditorState<TextSurface> {
    /// Creates an empty document.
    pub fn new(settings: EditorSettings) -> Self {
        Self::with_surface(settings, TextSurface::new())
    }

    /// Creates a document holding `content`.
    pub fn with_content(settings: EditorSettings, content: &str) -> Self {
        Self::with_surface(settings, TextSurface::from_str(content))
    }

    /// Undoes the last edit. Returns false if there was nothing to undo.
    pub fn undo(&mut self) -> bool {
        let undone = self.surface.undo();
        self.commit();
        undone
    }

    /// Redoes the last undone edit.
    pub fn redo(&mut self) -> bool {
        let redone = self.surface.redo();
        self.commit();
        redone
    }
}

impl<S: EditSurface> EditorState<S> {
    /// Creates a state around an existing editing surface.
    pub fn with_surface(settings: EditorSettings, surface: S) -> Self {
        let content = surface.text();
        let (content_tx, _) = watch::channel(content.clone());
        Self {
            settings,
            surface,
            content,
            observers: Vec::new(),
            content_tx,
            find: None,
            autosave: AutoSave::new(),
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn settings(&self) -> &EditorSettings {
        &self.settings
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn selection(&self) -> Selection {
        self.surface.selection()
    }

    pub fn set_selection(&mut self, selection: Selection) {
        self.surface.set_selection(selection);
    }

    /// Replaces the whole document.
    pub fn set_content(&mut self, content: &str) {
        self.surface.set_text(content);
        self.commit();
    }

    /// Replaces the selection with `text`.
    pub fn insert_text(&mut self, text: &str) {
        self.surface.insert_text(text);
        self.commit();
    }

    /// Runs an arbitrary edit against the surface, then commits.
    pub fn edit<R>(&mut self, f: impl FnOnce(&mut S) -> R) -> R {
        let result = f(&mut self.surface);
        self.commit();
        result
    }

    /// Applies a formatting command to the current selection.
    pub fn apply_format(&mut self, request: FormatRequest, prompt: &mut dyn Prompt) -> bool {
        let changed = format::apply_format(&mut self.surface, request, prompt);
        self.commit();
        changed
    }

    /// Opens the find panel, creating its state if needed.
    pub fn open_find(&mut self) -> &mut FindReplace {
        let find = self.find.get_or_insert_with(FindReplace::new);
        find.is_find_open = true;
        find
    }

    /// Opens the find panel with the replace row shown.
    pub fn open_replace(&mut self) -> &mut FindReplace {
        let find = self.open_find();
        find.is_replace_open = true;
        find
    }

    /// Closes the find panel and discards its state.
    pub fn close_find(&mut self) {
        self.find = None;
    }

    pub fn find_replace(&self) -> Option<&FindReplace> {
        self.find.as_ref()
    }

    pub fn find_replace_mut(&mut self) -> Option<&mut FindReplace> {
        self.find.as_mut()
    }

    /// Selects the first match of the find query. No-op while the panel is closed.
    pub fn find_next(&mut self) -> Option<SearchMatch> {
        let find = self.find.as_ref()?;
        find.find_next(&mut self.surface)
    }

    pub fn replace_next(&mut self) -> bool {
        let replaced = match self.find.as_ref() {
            Some(find) => find.replace_next(&mut self.surface),
            None => false,
        };
        self.commit();
        replaced
    }

    pub fn replace_all(&mut self) -> usize {
        let count = match self.find.as_ref() {
            Some(find) => find.replace_all(&mut self.surface),
            None => 0,
        };
        self.commit();
        count
    }

    /// Registers an observer. It is not called until the next change.
    pub fn subscribe(&mut self, observer: impl ContentObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Attaches a live preview and renders the current content into it.
    pub fn attach_preview(&mut self, target: impl PreviewSurface + 'static) {
        let mut preview = LivePreview::new(RenderPipeline::new(), Box::new(target));
        preview.content_changed(&self.content, &self.settings);
        self.observers.push(Box::new(preview));
    }

    /// Toggles live preview; enabling it re-renders the current content.
    pub fn set_live_preview(&mut self, enabled: bool) {
        self.settings.is_live_preview = enabled;
        if enabled {
            self.notify();
        }
    }

    /// Replaces the settings and re-notifies observers.
    ///
    /// Disabling autosave stops a running timer. Interval changes take
    /// effect on the next `start_auto_save`.
    pub fn update_settings(&mut self, settings: EditorSettings) {
        self.settings = settings;
        if !self.settings.auto_save {
            self.autosave.stop();
        }
        self.notify();
    }

    /// A receiver that always holds the latest committed content.
    pub fn content_receiver(&self) -> watch::Receiver<String> {
        self.content_tx.subscribe()
    }

    /// Starts autosave with the current settings, replacing any running timer.
    pub fn start_auto_save<F>(&mut self, on_save: F) -> bool
    where
        F: FnMut(&str) + Send + 'static,
    {
        let content = self.content_tx.subscribe();
        self.autosave.start(&self.settings, content, on_save)
    }

    pub fn stop_auto_save(&mut self) {
        self.autosave.stop();
    }

    pub fn is_auto_save_active(&self) -> bool {
        self.autosave.is_active()
    }

    /// Syncs `content` with the surface. Returns true if it changed.
    fn commit(&mut self) -> bool {
        let text = self.surface.text();
        if text == self.content {
            return false;
        }
        self.content = text;
        self.content_tx.send_replace(self.content.clone());
        self.notify();
        true
    }

    fn notify(&mut self) {
        for observer in &mut self.observers {
            observer.content_changed(&self.content, &self.settings);
        }
    }
}

impl<S: EditSurface> Drop for EditorState<S> {
    fn drop(&mut self) {
        self.autosave.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{ListKind, PromptRequest};
    use crate::render::SharedPreview;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    #[derive(Clone, Default)]
    struct Recorder {
        seen: Rc<RefCell<Vec<String>>>,
    }

    impl ContentObserver for Recorder {
        fn content_changed(&mut self, content: &str, _settings: &EditorSettings) {
            self.seen.borrow_mut().push(content.to_string());
        }
    }

    fn cancel(_: &PromptRequest) -> Option<String> {
        None
    }

    #[test]
    fn test_content_follows_formatting() {
        let mut state = EditorState::with_content(EditorSettings::default(), "a\nb");
        state.set_selection(Selection::with_range(0, 3));

        assert!(state.apply_format(FormatRequest::List(ListKind::Unordered), &mut cancel));
        assert_eq!(state.content(), "- a\n- b");
        assert_eq!(state.surface().text(), state.content());
    }

    #[test]
    fn test_observers_see_every_change() {
        let recorder = Recorder::default();
        let mut state = EditorState::new(EditorSettings::default());
        state.subscribe(recorder.clone());

        state.insert_text("hi");
        state.set_content("hi");
        state.insert_text("!");

        assert_eq!(*recorder.seen.borrow(), vec!["hi".to_string(), "hi!".to_string()]);
    }

    #[test]
    fn test_cancelled_format_does_not_notify() {
        let recorder = Recorder::default();
        let mut state = EditorState::with_content(EditorSettings::default(), "docs");
        state.subscribe(recorder.clone());
        state.set_selection(Selection::with_range(0, 4));

        assert!(!state.apply_format(FormatRequest::Link, &mut cancel));
        assert!(recorder.seen.borrow().is_empty());
    }

    #[test]
    fn test_preview_tracks_content() {
        let preview = SharedPreview::new();
        let mut state = EditorState::with_content(EditorSettings::default(), "# One");
        state.attach_preview(preview.clone());
        assert!(preview.html().contains("<h1>One</h1>"));

        state.set_content("# Two");
        assert!(preview.html().contains("<h1>Two</h1>"));
    }

    #[test]
    fn test_live_preview_toggle() {
        let preview = SharedPreview::new();
        let mut state = EditorState::with_content(EditorSettings::default(), "*one*");
        state.attach_preview(preview.clone());

        state.set_live_preview(false);
        state.set_content("*two*");
        assert!(preview.html().contains("<em>one</em>"));

        state.set_live_preview(true);
        assert!(preview.html().contains("<em>two</em>"));
    }

    #[test]
    fn test_find_panel_lifecycle() {
        let mut state = EditorState::with_content(EditorSettings::default(), "xfooy foo");
        assert_eq!(state.find_next(), None);

        state.open_find().find_text = "foo".to_string();
        assert_eq!(state.find_next(), Some(SearchMatch::new(1, 4)));
        assert!(!state.find_replace().unwrap().is_replace_open);

        let find = state.open_replace();
        assert_eq!(find.find_text, "foo");
        assert!(find.is_replace_open);

        state.close_find();
        assert!(state.find_replace().is_none());
        assert!(state.open_find().find_text.is_empty());
    }

    #[test]
    fn test_replace_all_updates_content_and_preview() {
        let preview = SharedPreview::new();
        let mut state = EditorState::with_content(EditorSettings::default(), "banana");
        state.attach_preview(preview.clone());

        let find = state.open_replace();
        find.find_text = "a".to_string();
        find.replace_text = "b".to_string();

        assert_eq!(state.replace_all(), 3);
        assert_eq!(state.content(), "bbnbnb");
        assert!(preview.html().contains("bbnbnb"));
    }

    #[test]
    fn test_replace_next_updates_content() {
        let mut state = EditorState::with_content(EditorSettings::default(), "foo foo");
        let find = state.open_replace();
        find.find_text = "foo".to_string();
        find.replace_text = "bar".to_string();

        state.find_next();
        assert!(state.replace_next());
        assert_eq!(state.content(), "bar foo");
        assert_eq!(state.selection(), Selection::with_range(4, 7));
    }

    #[test]
    fn test_undo_updates_content() {
        let mut state = EditorState::with_content(EditorSettings::default(), "hi");
        state.set_selection(Selection::with_range(0, 2));
        state.apply_format(FormatRequest::Bold, &mut cancel);
        assert_eq!(state.content(), "**hi**");

        assert!(state.undo());
        assert_eq!(state.content(), "hi");
        assert!(state.redo());
        assert_eq!(state.content(), "**hi**");
    }

    #[test]
    fn test_content_receiver_sees_latest() {
        let mut state = EditorState::new(EditorSettings::default());
        let rx = state.content_receiver();

        state.set_content("one");
        state.set_content("two");
        assert_eq!(*rx.borrow(), "two");
    }

    #[tokio::test(start_paused = true)]
    async fn test_auto_save_reads_latest_content() {
        let saved = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&saved);
        let mut state = EditorState::new(EditorSettings::default());

        assert!(state.start_auto_save(move |content: &str| {
            sink.lock().unwrap().push(content.to_string());
        }));

        tokio::time::sleep(Duration::from_secs(31)).await;
        assert!(saved.lock().unwrap().is_empty());

        state.set_content("draft");
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(*saved.lock().unwrap(), vec!["draft".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_state_stops_auto_save() {
        let saved = Arc::new(Mutex::new(0usize));
        let sink = Arc::clone(&saved);
        let state = {
            let mut state = EditorState::with_content(EditorSettings::default(), "draft");
            state.start_auto_save(move |_: &str| *sink.lock().unwrap() += 1);
            state
        };

        tokio::time::sleep(Duration::from_secs(31)).await;
        assert_eq!(*saved.lock().unwrap(), 1);

        drop(state);
        tokio::time::sleep(Duration::from_secs(120)).await;
        assert_eq!(*saved.lock().unwrap(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_disabling_auto_save_stops_timer() {
        let mut state = EditorState::with_content(EditorSettings::default(), "draft");
        assert!(state.start_auto_save(|_: &str| {}));
        assert!(state.is_auto_save_active());

        state.update_settings(EditorSettings {
            auto_save: false,
            ..EditorSettings::default()
        });
        assert!(!state.is_auto_save_active());
    }
}
