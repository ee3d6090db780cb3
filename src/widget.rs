//! The multi-select widget: one state record driven by [`Event`]s.
//!
//! Every event runs to completion synchronously. `handle` applies the event,
//! recomputes the filtered list when its inputs changed, and returns the
//! [`Command`]s the host has to carry out (focus changes, scrolling its own
//! list surface). Selection changes are reported through the `on_change`
//! callback before `handle` returns.

use crate::catalog::{Catalog, Group, Item};
use crate::filter::{FuzzyFilter, MatchOptions};
use crate::input::InputController;
use crate::nav::{NavState, Navigation};
use crate::selection::Selection;
use crate::window::ViewWindow;
use std::fmt;
use std::ops::Range;

/// Keys the widget reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Up,
    Down,
    Escape,
    Enter,
}

/// Where focus went when the input blurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusTarget {
    /// One of this widget's own option rows.
    OptionRow,
    Elsewhere,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Focus,
    Blur { related: Option<FocusTarget> },
    Key(Key),
    Insert(char),
    Backspace,
    /// Replace the text buffer wholesale (paste, host-managed input).
    SetText(String),
    ClickInput,
    /// Click on the rendered row holding `value`.
    ClickOption(String),
    /// Click on the "×" of the selected chip holding `value`.
    RemoveChip(String),
    /// Scroll the list by a signed number of height units.
    Scroll(isize),
    Resize { viewport_height: usize },
}

/// Side effects the host performs after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Row `index` of the filtered list was scrolled into view.
    ScrollToItem(usize),
    FocusInput,
    /// Remove focus from the input; the host answers with [`Event::Blur`].
    BlurInput,
}

/// Construction inputs.
#[derive(Debug, Clone, Default)]
pub struct Props {
    pub options: Vec<Item>,
    pub group_options: Vec<Group>,
    pub match_options: MatchOptions,
    pub window: ViewWindow,
}

/// A materialized list row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Row<'a> {
    /// Position in the filtered list.
    pub index: usize,
    pub item: &'a Item,
    pub group: Option<&'a str>,
    pub highlighted: bool,
}

/// A selected item as displayed above the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chip<'a> {
    pub item: &'a Item,
    pub class: String,
}

type ChangeFn = Box<dyn FnMut(&[Item])>;
type ClassFn = Box<dyn Fn(&Item) -> String>;

/// A catalog entry offered to the filter, remembering where it came from.
struct Candidate<'c> {
    index: usize,
    item: &'c Item,
}

impl AsRef<Item> for Candidate<'_> {
    fn as_ref(&self) -> &Item {
        self.item
    }
}

pub struct MultiSelect {
    catalog: Catalog,
    selection: Selection,
    filter: FuzzyFilter,
    input: InputController,
    nav: Navigation,
    window: ViewWindow,
    /// Catalog indices of the filtered list, in display order.
    filtered: Vec<usize>,
    on_change: ChangeFn,
    item_class: Option<ClassFn>,
}

impl fmt::Debug for MultiSelect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MultiSelect")
            .field("catalog", &self.catalog.len())
            .field("selection", &self.selection)
            .field("input", &self.input)
            .field("nav", &self.nav)
            .field("window", &self.window)
            .field("filtered", &self.filtered.len())
            .finish_non_exhaustive()
    }
}

impl MultiSelect {
    /// Mount the widget. `on_change` is called once with the empty selection.
    pub fn new(props: Props, on_change: impl FnMut(&[Item]) + 'static) -> Self {
        let mut widget = MultiSelect {
            catalog: Catalog::build(&props.options, &props.group_options),
            selection: Selection::new(),
            filter: FuzzyFilter::new(props.match_options),
            input: InputController::new(),
            nav: Navigation::new(),
            window: props.window,
            filtered: Vec::new(),
            on_change: Box::new(on_change),
            item_class: None,
        };
        widget.refilter();
        widget.notify();
        widget
    }

    /// Derive a class for each selected chip.
    #[must_use]
    pub fn with_item_class(mut self, f: impl Fn(&Item) -> String + 'static) -> Self {
        self.item_class = Some(Box::new(f));
        self
    }

    // ── Accessors ───────────────────────────────────────────────────────

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn text(&self) -> &str {
        self.input.text()
    }

    pub fn nav_state(&self) -> NavState {
        self.nav.state()
    }

    pub fn highlight(&self) -> Option<usize> {
        self.nav.highlight()
    }

    pub fn is_focused(&self) -> bool {
        self.nav.is_focused()
    }

    /// Whether the option list should be shown.
    pub fn is_searching(&self) -> bool {
        self.input.is_searching()
    }

    pub fn window(&self) -> &ViewWindow {
        &self.window
    }

    pub fn filtered_len(&self) -> usize {
        self.filtered.len()
    }

    /// The filtered list in display order.
    pub fn filtered(&self) -> impl Iterator<Item = &Item> + '_ {
        self.filtered
            .iter()
            .filter_map(|&i| self.catalog.entry(i).map(|e| &e.item))
    }

    /// Index range of the rows that need rendering.
    pub fn visible_range(&self) -> Range<usize> {
        self.window.slice(self.filtered.len())
    }

    /// The rows inside [`visible_range`](Self::visible_range).
    pub fn visible_rows(&self) -> Vec<Row<'_>> {
        let highlight = self.nav.highlight();
        self.visible_range()
            .filter_map(|index| {
                let entry = self.catalog.entry(self.filtered[index])?;
                Some(Row {
                    index,
                    item: &entry.item,
                    group: entry.group.as_deref(),
                    highlighted: highlight == Some(index),
                })
            })
            .collect()
    }

    /// Selected items in selection order, with their derived class.
    pub fn chips(&self) -> Vec<Chip<'_>> {
        self.selection
            .iter()
            .map(|item| Chip {
                item,
                class: self
                    .item_class
                    .as_ref()
                    .map(|f| f(item))
                    .unwrap_or_default(),
            })
            .collect()
    }

    // ── Prop updates ────────────────────────────────────────────────────

    /// Swap in new options. The selection is kept.
    pub fn set_options(&mut self, options: &[Item], groups: &[Group]) {
        self.catalog = Catalog::build(options, groups);
        self.refilter();
        self.nav.reconcile(self.filtered.len());
        self.window.clamp(self.filtered.len());
    }

    pub fn set_match_options(&mut self, options: MatchOptions) {
        self.filter = FuzzyFilter::new(options);
        self.refilter();
        self.nav.reconcile(self.filtered.len());
        self.window.clamp(self.filtered.len());
    }

    /// Toggle the catalog item with `value`, as if it had been clicked.
    /// Returns `false` when the value is unknown.
    pub fn toggle_value(&mut self, value: &str) -> bool {
        let Some(item) = self.catalog.get(value).cloned() else {
            return false;
        };
        self.toggle(&item);
        true
    }

    // ── Events ──────────────────────────────────────────────────────────

    pub fn handle(&mut self, event: Event) -> Vec<Command> {
        tracing::trace!(?event, state = ?self.nav.state(), "event");
        match event {
            Event::Focus => {
                self.nav.focus();
                Vec::new()
            }
            Event::Blur { related } => {
                if related == Some(FocusTarget::OptionRow) {
                    return Vec::new();
                }
                self.nav.blur();
                self.input.close();
                if self.input.clear() {
                    self.refilter();
                }
                self.window.reset();
                Vec::new()
            }
            Event::Key(key) => self.on_key(key),
            Event::Insert(c) => {
                let changed = self.input.insert(c);
                self.on_text_edit(changed)
            }
            Event::Backspace => {
                let changed = self.input.backspace();
                self.on_text_edit(changed)
            }
            Event::SetText(text) => {
                let changed = self.input.set(&text);
                self.on_text_edit(changed)
            }
            Event::ClickInput => {
                self.nav.focus();
                self.input.open();
                Vec::new()
            }
            Event::ClickOption(value) => {
                let Some(item) = self.catalog.get(&value).cloned() else {
                    return Vec::new();
                };
                self.nav.focus();
                self.confirm(&item)
            }
            Event::RemoveChip(value) => {
                if self.selection.remove(&value) {
                    tracing::debug!(%value, "chip removed");
                    self.after_selection_change();
                }
                Vec::new()
            }
            Event::Scroll(delta) => {
                self.window.scroll_by(delta, self.filtered.len());
                Vec::new()
            }
            Event::Resize { viewport_height } => {
                self.window.resize(viewport_height, self.filtered.len());
                Vec::new()
            }
        }
    }

    fn on_key(&mut self, key: Key) -> Vec<Command> {
        if !self.nav.is_focused() {
            return Vec::new();
        }
        let len = self.filtered.len();
        match key {
            Key::Up | Key::Down => {
                self.input.open();
                let moved = if key == Key::Up {
                    self.nav.move_up(len)
                } else {
                    self.nav.move_down(len)
                };
                match moved {
                    Some(index) => {
                        self.window.scroll_to_item(index, len);
                        vec![Command::ScrollToItem(index)]
                    }
                    None => Vec::new(),
                }
            }
            Key::Escape => vec![Command::BlurInput],
            Key::Enter => {
                let Some(index) = self.nav.confirm_target(len) else {
                    return Vec::new();
                };
                let Some(item) = self.catalog.entry(self.filtered[index]).map(|e| e.item.clone())
                else {
                    return Vec::new();
                };
                self.confirm(&item)
            }
        }
    }

    fn on_text_edit(&mut self, changed: bool) -> Vec<Command> {
        self.nav.focus();
        self.input.open();
        if !changed {
            return Vec::new();
        }
        self.refilter();
        self.nav.reset(self.filtered.len());
        self.window.reset();
        Vec::new()
    }

    /// Toggle `item`, clear the query and put the highlight back on top.
    fn confirm(&mut self, item: &Item) -> Vec<Command> {
        self.input.clear();
        self.toggle(item);
        self.nav.reset(self.filtered.len());
        self.window.reset();
        vec![Command::FocusInput]
    }

    fn toggle(&mut self, item: &Item) {
        let toggled = self.selection.toggle(item);
        tracing::debug!(value = %item.value, ?toggled, "toggled");
        self.after_selection_change();
    }

    fn after_selection_change(&mut self) {
        self.refilter();
        self.nav.reconcile(self.filtered.len());
        self.window.clamp(self.filtered.len());
        self.notify();
    }

    fn notify(&mut self) {
        let snapshot = self.selection.to_vec();
        (self.on_change)(&snapshot);
    }

    /// Recompute the filtered list from scratch.
    fn refilter(&mut self) {
        let candidates: Vec<Candidate<'_>> = self
            .catalog
            .entries()
            .iter()
            .enumerate()
            .filter(|(_, e)| !self.selection.contains(&e.item.value))
            .map(|(index, e)| Candidate {
                index,
                item: &e.item,
            })
            .collect();
        self.filtered = self
            .filter
            .filter(self.input.text(), candidates)
            .into_iter()
            .map(|c| c.index)
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Log = Rc<RefCell<Vec<Vec<String>>>>;

    fn greek() -> Vec<Item> {
        vec![
            Item::new("Alpha", "a"),
            Item::new("Beta", "b"),
            Item::new("Gamma", "g"),
        ]
    }

    fn mount(options: Vec<Item>) -> (MultiSelect, Log) {
        let log: Log = Rc::default();
        let sink = Rc::clone(&log);
        let widget = MultiSelect::new(
            Props {
                options,
                ..Props::default()
            },
            move |items| {
                sink.borrow_mut()
                    .push(items.iter().map(|i| i.value.clone()).collect());
            },
        );
        (widget, log)
    }

    fn numbered(n: usize) -> Vec<Item> {
        (0..n)
            .map(|i| Item::new(format!("Item {i}"), i.to_string()))
            .collect()
    }

    fn filtered_values(w: &MultiSelect) -> Vec<String> {
        w.filtered().map(|i| i.value.clone()).collect()
    }

    fn type_text(w: &mut MultiSelect, text: &str) {
        for c in text.chars() {
            w.handle(Event::Insert(c));
        }
    }

    #[test]
    fn mount_notifies_empty_selection() {
        let (w, log) = mount(greek());
        assert_eq!(*log.borrow(), vec![Vec::<String>::new()]);
        assert_eq!(w.nav_state(), NavState::Blurred);
        assert_eq!(filtered_values(&w), ["a", "b", "g"]);
    }

    #[test]
    fn typing_filters_and_resets_highlight() {
        let (mut w, _) = mount(greek());
        w.handle(Event::Focus);
        w.handle(Event::Key(Key::Down));
        w.handle(Event::Key(Key::Down));
        assert_eq!(w.highlight(), Some(1));

        type_text(&mut w, "ga");
        assert_eq!(filtered_values(&w), ["g"]);
        assert_eq!(w.highlight(), Some(0));
        assert!(w.is_searching());
    }

    #[test]
    fn no_matches_clears_highlight() {
        let (mut w, _) = mount(greek());
        w.handle(Event::Focus);
        type_text(&mut w, "zzz");
        assert_eq!(w.filtered_len(), 0);
        assert_eq!(w.nav_state(), NavState::Idle);
        assert!(w.handle(Event::Key(Key::Enter)).is_empty());
    }

    #[test]
    fn enter_selects_highlighted_and_clears_text() {
        let (mut w, log) = mount(greek());
        w.handle(Event::Focus);
        w.handle(Event::Key(Key::Down));
        w.handle(Event::Key(Key::Down));
        let commands = w.handle(Event::Key(Key::Enter));
        assert_eq!(commands, [Command::FocusInput]);
        assert_eq!(log.borrow().last().cloned(), Some(vec!["b".to_string()]));
        assert_eq!(filtered_values(&w), ["a", "g"]);
        assert_eq!(w.highlight(), Some(0));
        assert_eq!(w.text(), "");
    }

    #[test]
    fn enter_without_highlight_takes_first_row() {
        let (mut w, log) = mount(greek());
        w.handle(Event::Focus);
        w.handle(Event::Key(Key::Enter));
        assert_eq!(log.borrow().last().cloned(), Some(vec!["a".to_string()]));
    }

    #[test]
    fn keys_ignored_while_blurred() {
        let (mut w, log) = mount(greek());
        assert!(w.handle(Event::Key(Key::Down)).is_empty());
        assert!(w.handle(Event::Key(Key::Enter)).is_empty());
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn escape_requests_blur() {
        let (mut w, _) = mount(greek());
        w.handle(Event::Focus);
        w.handle(Event::Key(Key::Down));
        assert_eq!(w.handle(Event::Key(Key::Escape)), [Command::BlurInput]);
        // Still focused until the host reports the blur.
        assert!(w.is_focused());
    }

    #[test]
    fn blur_to_own_row_keeps_state() {
        let (mut w, _) = mount(greek());
        w.handle(Event::ClickInput);
        type_text(&mut w, "a");
        w.handle(Event::Blur {
            related: Some(FocusTarget::OptionRow),
        });
        assert_eq!(w.text(), "a");
        assert!(w.is_searching());
        assert_eq!(w.nav_state(), NavState::Highlighted(0));
    }

    #[test]
    fn blur_elsewhere_resets() {
        let (mut w, log) = mount(greek());
        w.handle(Event::ClickInput);
        w.handle(Event::Key(Key::Enter));
        type_text(&mut w, "g");
        w.handle(Event::Blur {
            related: Some(FocusTarget::Elsewhere),
        });
        assert_eq!(w.nav_state(), NavState::Blurred);
        assert_eq!(w.text(), "");
        assert!(!w.is_searching());
        assert_eq!(filtered_values(&w), ["b", "g"]);
        // The selection survives a blur.
        assert_eq!(log.borrow().last().cloned(), Some(vec!["a".to_string()]));
    }

    #[test]
    fn click_option_toggles_that_item() {
        let (mut w, log) = mount(greek());
        w.handle(Event::ClickInput);
        type_text(&mut w, "a");
        w.handle(Event::Key(Key::Down));
        let commands = w.handle(Event::ClickOption("g".into()));
        assert_eq!(commands, [Command::FocusInput]);
        assert_eq!(log.borrow().last().cloned(), Some(vec!["g".to_string()]));
        assert_eq!(w.text(), "");
        assert_eq!(w.highlight(), Some(0));
    }

    #[test]
    fn click_unknown_option_is_noop() {
        let (mut w, log) = mount(greek());
        assert!(w.handle(Event::ClickOption("nope".into())).is_empty());
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn remove_chip_keeps_focus_state() {
        let (mut w, log) = mount(greek());
        w.handle(Event::Focus);
        w.handle(Event::Key(Key::Enter));
        w.handle(Event::Key(Key::Enter));
        assert_eq!(
            log.borrow().last().cloned(),
            Some(vec!["a".to_string(), "b".to_string()])
        );
        w.handle(Event::RemoveChip("a".into()));
        assert_eq!(log.borrow().last().cloned(), Some(vec!["b".to_string()]));
        assert!(w.is_focused());
        assert_eq!(filtered_values(&w), ["a", "g"]);

        // Removing something not selected does not notify.
        let before = log.borrow().len();
        w.handle(Event::RemoveChip("zzz".into()));
        assert_eq!(log.borrow().len(), before);
    }

    #[test]
    fn arrows_scroll_the_window() {
        let (mut w, _) = mount(numbered(100));
        w.handle(Event::Resize { viewport_height: 5 });
        w.handle(Event::Focus);
        let mut last = Vec::new();
        for _ in 0..8 {
            last = w.handle(Event::Key(Key::Down));
        }
        assert_eq!(last, [Command::ScrollToItem(7)]);
        assert_eq!(w.window().scroll_offset, 3);
        let range = w.visible_range();
        assert!(range.contains(&7));
        assert!(range.len() <= 5 + 2 * crate::window::DEFAULT_OVERSCAN + 1);
        let rows = w.visible_rows();
        assert_eq!(rows.iter().filter(|r| r.highlighted).count(), 1);
    }

    #[test]
    fn scroll_event_moves_window_only() {
        let (mut w, _) = mount(numbered(100));
        w.handle(Event::Scroll(20));
        assert_eq!(w.window().scroll_offset, 20);
        assert_eq!(w.highlight(), None);
        assert_eq!(w.visible_rows().first().map(|r| r.index), Some(17));
    }

    #[test]
    fn chips_use_item_class() {
        let (w, _) = mount(greek());
        let mut w = w.with_item_class(|item| format!("chip-{}", item.value));
        w.toggle_value("g");
        w.toggle_value("a");
        let chips: Vec<(String, String)> = w
            .chips()
            .into_iter()
            .map(|c| (c.item.value.clone(), c.class))
            .collect();
        assert_eq!(
            chips,
            [
                ("g".to_string(), "chip-g".to_string()),
                ("a".to_string(), "chip-a".to_string())
            ]
        );
    }

    #[test]
    fn set_options_keeps_selection() {
        let (mut w, _) = mount(greek());
        w.toggle_value("a");
        w.set_options(
            &[Item::new("Delta", "d")],
            &[Group::new("Greek", vec![Item::new("Alpha", "a")])],
        );
        assert_eq!(filtered_values(&w), ["d"]);
        assert!(w.selection().contains("a"));
        let rows = w.visible_rows();
        assert_eq!(rows[0].group, None);
    }

    #[test]
    fn shrinking_list_clamps_highlight_and_scroll() {
        let (mut w, _) = mount(numbered(100));
        w.handle(Event::Focus);
        for _ in 0..50 {
            w.handle(Event::Key(Key::Down));
        }
        assert_eq!(w.highlight(), Some(49));
        assert_eq!(w.window().scroll_offset, 40);

        w.set_options(&numbered(20), &[]);
        assert_eq!(w.filtered_len(), 20);
        assert_eq!(w.highlight(), Some(19));
        assert_eq!(w.window().scroll_offset, 10);
        assert!(w.visible_rows().iter().any(|r| r.highlighted));

        type_text(&mut w, "1");
        assert_eq!(w.filtered_len(), 11);
        for _ in 0..10 {
            w.handle(Event::Key(Key::Down));
        }
        assert_eq!(w.highlight(), Some(10));
        assert_eq!(w.window().scroll_offset, 1);

        w.set_match_options(MatchOptions {
            limit: Some(3),
            ..MatchOptions::default()
        });
        assert_eq!(w.filtered_len(), 3);
        assert_eq!(w.highlight(), Some(2));
        assert_eq!(w.window().scroll_offset, 0);

        w.set_options(&[], &[]);
        assert_eq!(w.highlight(), None);
        assert_eq!(w.nav_state(), NavState::Idle);
    }

    #[test]
    fn match_options_refilter_current_text() {
        let (mut w, _) = mount(greek());
        w.handle(Event::Focus);
        type_text(&mut w, "a");
        assert_eq!(filtered_values(&w).len(), 3);
        w.set_match_options(MatchOptions {
            keys: vec![crate::filter::MatchKey::Value],
            ..MatchOptions::default()
        });
        assert_eq!(filtered_values(&w), ["a"]);
        assert_eq!(w.highlight(), Some(0));
    }

    #[test]
    fn rows_carry_group() {
        let log: Log = Rc::default();
        let sink = Rc::clone(&log);
        let w = MultiSelect::new(
            Props {
                group_options: vec![Group::new("States", greek())],
                ..Props::default()
            },
            move |items| sink.borrow_mut().push(items.iter().map(|i| i.value.clone()).collect()),
        );
        assert!(w.visible_rows().iter().all(|r| r.group == Some("States")));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn event() -> impl Strategy<Value = Event> {
            let key = prop_oneof![
                Just(Key::Up),
                Just(Key::Down),
                Just(Key::Enter),
                Just(Key::Escape),
            ];
            prop_oneof![
                Just(Event::Focus),
                proptest::option::of(Just(FocusTarget::OptionRow))
                    .prop_map(|related| Event::Blur { related }),
                key.prop_map(Event::Key),
                Just(Event::Backspace),
                proptest::char::range('a', 'z').prop_map(Event::Insert),
                (0usize..30).prop_map(|i| Event::ClickOption(i.to_string())),
                (0usize..30).prop_map(|i| Event::RemoveChip(i.to_string())),
                (-20isize..20).prop_map(Event::Scroll),
            ]
        }

        proptest! {
            #[test]
            fn invariants_hold(events in proptest::collection::vec(event(), 0..80)) {
                let (mut w, log) = mount(numbered(25));
                w.handle(Event::Resize { viewport_height: 6 });
                for event in events {
                    w.handle(event);

                    let len = w.filtered_len();
                    if let Some(i) = w.highlight() {
                        prop_assert!(i < len);
                    }
                    for item in w.filtered() {
                        prop_assert!(!w.selection().contains(&item.value));
                    }
                    prop_assert!(w.visible_range().end <= len);
                    prop_assert!(w.visible_range().len() <= 6 + 1 + 2 * crate::window::DEFAULT_OVERSCAN);

                    let last: Vec<String> = log.borrow().last().cloned().unwrap_or_default();
                    let current: Vec<String> = w.selection().iter().map(|i| i.value.clone()).collect();
                    prop_assert_eq!(last, current);
                }
            }
        }
    }
}
