//! Terminal host for the multi-select widget, drawn inline with crossterm.
//!
//! Layout (fixed height so mouse hits can be mapped back to rows):
//!
//! ```text
//! ? Select:
//!   [Gamma ×] [Alpha ×]          ← chip lines
//!   › ga_                        ← input
//!     Gamma          · Metros    ← list viewport (only while searching)
//!   ↑↓ move · enter select ...   ← help
//! ```

use crossterm::{
    cursor,
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event as TermEvent, KeyCode, KeyEvent,
        KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
    },
    style::{self, Color, Stylize},
    terminal, ExecutableCommand, QueueableCommand,
};
use multipick::config::DisplayConfig;
use multipick::{Command, Event, FocusTarget, Key, MultiSelect};
use std::io::{self, Write};

/// Lines reserved for selected chips.
const CHIP_LINES: u16 = 2;

/// Prompt, input and help lines around the chips and list.
const FIXED_LINES: u16 = 3;

const HELP: &str = "↑↓ move · enter select · esc close · tab focus · ctrl-d done";

const CHIP_COLORS: &[Color] = &[
    Color::Cyan,
    Color::Magenta,
    Color::Yellow,
    Color::Green,
    Color::Blue,
    Color::Red,
];

// ── Helpers ──────────────────────────────────────────────────────────────

/// Enter raw mode with mouse capture; returns a guard that restores state
/// when dropped. Stderr logging is held back while the guard lives.
struct RawGuard;

impl RawGuard {
    fn enter() -> io::Result<Self> {
        multipick::logging::hold_stderr();
        // Dropped on error so the held log lines still come out.
        let guard = RawGuard;
        terminal::enable_raw_mode()?;
        io::stdout().execute(EnableMouseCapture)?;
        Ok(guard)
    }
}

impl Drop for RawGuard {
    fn drop(&mut self) {
        let mut out = io::stdout();
        let _ = out.execute(DisableMouseCapture);
        let _ = out.execute(cursor::Show);
        let _ = terminal::disable_raw_mode();
        let _ = multipick::logging::release_stderr();
    }
}

/// Print the final "✔ prompt value" line after the widget finishes.
fn print_confirm(out: &mut impl Write, prompt: &str, value: &str) -> io::Result<()> {
    out.queue(style::Print(style::style("✔ ").green().bold()))?;
    out.queue(style::Print(style::style(prompt).bold()))?;
    out.queue(style::Print(" "))?;
    out.queue(style::Print(style::style(value).cyan()))?;
    out.queue(style::Print("\r\n"))?;
    out.flush()?;
    Ok(())
}

/// Stable colour for a chip class.
fn class_color(class: &str) -> Color {
    let hash = class
        .bytes()
        .fold(0usize, |acc, b| acc.wrapping_mul(31).wrapping_add(b as usize));
    CHIP_COLORS[hash % CHIP_COLORS.len()]
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut out: String = text.chars().take(width.saturating_sub(1)).collect();
    out.push('…');
    out
}

// ── Hit testing ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
enum Target {
    ChipRemove(String),
    /// Show chips from this index on.
    ChipPage(usize),
    Input,
    Option(String),
    List,
}

/// A clickable span on one rendered line.
#[derive(Debug, Clone)]
struct Hit {
    line: u16,
    cols: std::ops::Range<u16>,
    target: Target,
}

struct Layout {
    /// Terminal row of the prompt line.
    top: u16,
    width: u16,
    list_rows: u16,
}

impl Layout {
    fn input_line(&self) -> u16 {
        1 + CHIP_LINES
    }

    fn list_line(&self) -> u16 {
        self.input_line() + 1
    }

    fn height(&self) -> u16 {
        FIXED_LINES + CHIP_LINES + self.list_rows
    }
}

fn hit_test(hits: &[Hit], layout: &Layout, column: u16, row: u16) -> Option<Target> {
    let line = row.checked_sub(layout.top)?;
    hits.iter()
        .find(|h| h.line == line && h.cols.contains(&column))
        .map(|h| h.target.clone())
}

// ── multi_select ────────────────────────────────────────────────────────

/// Run `widget` in the terminal until the user finishes.
///
/// Typing searches, ↑/↓ move the highlight, Enter toggles, Esc leaves the
/// input; Enter or Esc while the input is unfocused (or Ctrl-D anywhere)
/// finishes. Rows and chip "×" marks are clickable.
pub fn multi_select(widget: &mut MultiSelect, display: &DisplayConfig) -> Result<(), String> {
    multi_select_inner(widget, display).map_err(|e| e.to_string())
}

fn multi_select_inner(widget: &mut MultiSelect, display: &DisplayConfig) -> io::Result<()> {
    let guard = RawGuard::enter()?;
    let mut out = io::stdout();

    let layout = reserve_layout(&mut out, widget)?;
    tracing::debug!(top = layout.top, height = layout.height(), "reserved picker area");

    apply(widget, Event::Focus);
    apply(widget, Event::ClickInput);

    let mut chip_start = 0;
    loop {
        if chip_start >= widget.selection().len() {
            chip_start = 0;
        }
        let hits = render(&mut out, &layout, widget, display, chip_start)?;

        let finished = match event::read()? {
            TermEvent::Key(key) if key.kind == KeyEventKind::Press => {
                if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c')
                {
                    drop(guard);
                    std::process::exit(130);
                }
                on_key(widget, key)
            }
            TermEvent::Mouse(mouse) => {
                on_mouse(widget, &hits, &layout, mouse, &mut chip_start);
                false
            }
            _ => false,
        };

        if finished {
            break;
        }
    }

    out.queue(cursor::MoveTo(0, layout.top))?;
    out.queue(terminal::Clear(terminal::ClearType::FromCursorDown))?;
    let names: Vec<&str> = widget.selection().iter().map(|i| i.name.as_str()).collect();
    let display_value = if names.is_empty() {
        "(none)".to_string()
    } else {
        names.join(", ")
    };
    print_confirm(&mut out, &display.prompt, &display_value)
}

/// Scroll the terminal so the whole widget fits, then remember where it
/// starts. Shrinks the list viewport on short terminals.
fn reserve_layout(out: &mut io::Stdout, widget: &mut MultiSelect) -> io::Result<Layout> {
    let (width, term_height) = terminal::size()?;
    let window = *widget.window();
    let wanted_rows = window.rows_per_page().max(1) as u16;
    let list_rows = wanted_rows.min(term_height.saturating_sub(FIXED_LINES + CHIP_LINES).max(1));
    if list_rows != wanted_rows {
        apply(
            widget,
            Event::Resize {
                viewport_height: list_rows as usize * window.row_height,
            },
        );
    }

    let mut layout = Layout {
        top: 0,
        width,
        list_rows,
    };
    let height = layout.height();
    for _ in 0..height {
        out.queue(style::Print("\r\n"))?;
    }
    out.queue(cursor::MoveUp(height))?;
    out.flush()?;
    let (_, row) = cursor::position()?;
    layout.top = row;
    Ok(layout)
}

/// Feed one event to the widget and carry out the commands it returns.
fn apply(widget: &mut MultiSelect, event: Event) {
    let mut queue = vec![event];
    while let Some(event) = queue.pop() {
        for command in widget.handle(event) {
            match command {
                Command::BlurInput => queue.push(Event::Blur {
                    related: Some(FocusTarget::Elsewhere),
                }),
                Command::FocusInput if !widget.is_focused() => queue.push(Event::Focus),
                // The widget's own window is the surface we draw from.
                Command::FocusInput | Command::ScrollToItem(_) => {}
            }
        }
    }
}

/// Returns `true` when the session should end.
fn on_key(widget: &mut MultiSelect, key: KeyEvent) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return key.code == KeyCode::Char('d');
    }

    if !widget.is_focused() {
        match key.code {
            KeyCode::Enter | KeyCode::Esc => return true,
            KeyCode::Tab => apply(widget, Event::Focus),
            KeyCode::Up | KeyCode::Down | KeyCode::Char(_) | KeyCode::Backspace => {
                apply(widget, Event::Focus);
                return on_key(widget, key);
            }
            _ => {}
        }
        return false;
    }

    match key.code {
        KeyCode::Up => apply(widget, Event::Key(Key::Up)),
        KeyCode::Down => apply(widget, Event::Key(Key::Down)),
        KeyCode::Enter => apply(widget, Event::Key(Key::Enter)),
        KeyCode::Esc => apply(widget, Event::Key(Key::Escape)),
        KeyCode::Tab => apply(
            widget,
            Event::Blur {
                related: Some(FocusTarget::Elsewhere),
            },
        ),
        KeyCode::Backspace => apply(widget, Event::Backspace),
        KeyCode::Char(c) => apply(widget, Event::Insert(c)),
        _ => {}
    }
    false
}

fn on_mouse(
    widget: &mut MultiSelect,
    hits: &[Hit],
    layout: &Layout,
    mouse: MouseEvent,
    chip_start: &mut usize,
) {
    let target = hit_test(hits, layout, mouse.column, mouse.row);
    let step = widget.window().row_height as isize;
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => match target {
            Some(Target::ChipRemove(value)) => apply(widget, Event::RemoveChip(value)),
            Some(Target::ChipPage(next)) => *chip_start = next,
            Some(Target::Option(value)) => {
                // The input blurs onto the row before the click lands.
                apply(
                    widget,
                    Event::Blur {
                        related: Some(FocusTarget::OptionRow),
                    },
                );
                apply(widget, Event::ClickOption(value));
            }
            Some(Target::Input) => apply(widget, Event::ClickInput),
            Some(Target::List) => {}
            None if widget.is_focused() => apply(
                widget,
                Event::Blur {
                    related: Some(FocusTarget::Elsewhere),
                },
            ),
            None => {}
        },
        MouseEventKind::ScrollDown if target.is_some() => apply(widget, Event::Scroll(step)),
        MouseEventKind::ScrollUp if target.is_some() => apply(widget, Event::Scroll(-step)),
        _ => {}
    }
}

// ── Rendering ────────────────────────────────────────────────────────────

fn render(
    out: &mut io::Stdout,
    layout: &Layout,
    widget: &MultiSelect,
    display: &DisplayConfig,
    chip_start: usize,
) -> io::Result<Vec<Hit>> {
    let mut hits = Vec::new();
    let width = layout.width as usize;

    out.queue(cursor::Hide)?;
    out.queue(cursor::MoveTo(0, layout.top))?;
    out.queue(terminal::Clear(terminal::ClearType::FromCursorDown))?;

    // Prompt
    out.queue(style::Print(style::style("? ").green().bold()))?;
    out.queue(style::Print(style::style(&display.prompt).bold()))?;

    render_chips(out, layout, widget, chip_start, &mut hits)?;

    // Input
    let input_line = layout.input_line();
    out.queue(cursor::MoveTo(0, layout.top + input_line))?;
    let marker = if widget.is_focused() {
        style::style("  › ").blue()
    } else {
        style::style("  › ").dark_grey()
    };
    out.queue(style::Print(marker))?;
    let text = truncate(widget.text(), width.saturating_sub(5));
    if text.is_empty() {
        out.queue(style::Print(style::style(&display.placeholder).dark_grey()))?;
    } else {
        out.queue(style::Print(&text))?;
    }
    hits.push(Hit {
        line: input_line,
        cols: 0..layout.width,
        target: Target::Input,
    });

    // List
    let list_line = layout.list_line();
    if widget.is_searching() {
        render_list(out, layout, widget, &mut hits)?;
    }

    // Help
    out.queue(cursor::MoveTo(0, layout.top + list_line + layout.list_rows))?;
    let status = if widget.is_searching() {
        format!("  {} matches · {HELP}", widget.filtered_len())
    } else {
        format!("  {HELP}")
    };
    out.queue(style::Print(style::style(truncate(&status, width)).dark_grey()))?;

    if widget.is_focused() {
        let col = 4 + text.chars().count();
        out.queue(cursor::MoveTo(col as u16, layout.top + input_line))?;
        out.queue(cursor::Show)?;
    }
    out.flush()?;
    Ok(hits)
}

/// One chip placed on a chip line.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ChipSlot {
    index: usize,
    line: u16,
    col: usize,
    label: String,
}

/// Clickable marker that shows another page of chips.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ChipPager {
    line: u16,
    col: usize,
    text: String,
    next: usize,
}

/// Place chips starting at `start` on the chip lines. Chips that do not fit
/// are reached through the pager; the last page pages back to the first.
fn layout_chips(
    names: &[&str],
    width: usize,
    start: usize,
) -> (Vec<ChipSlot>, Option<ChipPager>) {
    let mut slots = Vec::new();
    let mut line: u16 = 1;
    let mut col: usize = 2;

    for (index, name) in names.iter().enumerate().skip(start) {
        let label = truncate(name, width.saturating_sub(8));
        // "[label ×] "
        let chip_width = label.chars().count() + 4;
        if col + chip_width > width && col > 2 {
            if line == CHIP_LINES {
                let pager = ChipPager {
                    line,
                    col,
                    text: format!("+{} more", names.len() - index),
                    next: index,
                };
                return (slots, Some(pager));
            }
            line += 1;
            col = 2;
        }
        slots.push(ChipSlot {
            index,
            line,
            col,
            label,
        });
        col += chip_width + 1;
    }

    let pager = (start > 0).then(|| ChipPager {
        line,
        col,
        text: "« first".to_string(),
        next: 0,
    });
    (slots, pager)
}

fn render_chips(
    out: &mut io::Stdout,
    layout: &Layout,
    widget: &MultiSelect,
    chip_start: usize,
    hits: &mut Vec<Hit>,
) -> io::Result<()> {
    let chips = widget.chips();
    let names: Vec<&str> = chips.iter().map(|c| c.item.name.as_str()).collect();
    let (slots, pager) = layout_chips(&names, layout.width as usize, chip_start);

    for slot in slots {
        let Some(chip) = chips.get(slot.index) else {
            continue;
        };
        out.queue(cursor::MoveTo(slot.col as u16, layout.top + slot.line))?;
        let color = class_color(&chip.class);
        out.queue(style::Print(style::style(format!("[{} ", slot.label)).with(color)))?;
        out.queue(style::Print(style::style("×").with(color).bold()))?;
        out.queue(style::Print(style::style("] ").with(color)))?;
        let x_col = (slot.col + 1 + slot.label.chars().count() + 1) as u16;
        hits.push(Hit {
            line: slot.line,
            cols: x_col.saturating_sub(1)..x_col + 2,
            target: Target::ChipRemove(chip.item.value.clone()),
        });
    }

    if let Some(pager) = pager {
        out.queue(cursor::MoveTo(pager.col as u16, layout.top + pager.line))?;
        out.queue(style::Print(style::style(&pager.text).dark_grey().underlined()))?;
        let col = pager.col as u16;
        hits.push(Hit {
            line: pager.line,
            cols: col..col + pager.text.chars().count() as u16,
            target: Target::ChipPage(pager.next),
        });
    }
    Ok(())
}

fn render_list(
    out: &mut io::Stdout,
    layout: &Layout,
    widget: &MultiSelect,
    hits: &mut Vec<Hit>,
) -> io::Result<()> {
    let width = layout.width as usize;
    let list_line = layout.list_line();
    let visible = widget.window().visible(widget.filtered_len());

    for line in 0..layout.list_rows {
        hits.push(Hit {
            line: list_line + line,
            cols: 0..layout.width,
            target: Target::List,
        });
    }

    if widget.filtered_len() == 0 {
        out.queue(cursor::MoveTo(4, layout.top + list_line))?;
        out.queue(style::Print(style::style("No matches").dark_grey()))?;
        return Ok(());
    }

    for row in widget.visible_rows() {
        if !visible.contains(&row.index) {
            continue;
        }
        let offset = (row.index - visible.start) as u16;
        if offset >= layout.list_rows {
            break;
        }
        let line = list_line + offset;
        out.queue(cursor::MoveTo(4, layout.top + line))?;

        let group = row.group.map(|g| format!("  · {g}")).unwrap_or_default();
        let name_width = width.saturating_sub(6 + group.chars().count());
        let name = truncate(&row.item.name, name_width);
        if row.highlighted {
            out.queue(style::Print(style::style(&name).blue().bold()))?;
        } else {
            out.queue(style::Print(&name))?;
        }
        if !group.is_empty() {
            out.queue(style::Print(style::style(group).dark_grey()))?;
        }

        // Option hits go first so they win over the generic list hit.
        hits.insert(
            0,
            Hit {
                line,
                cols: 0..layout.width,
                target: Target::Option(row.item.value.clone()),
            },
        );
    }
    Ok(())
}
