use std::fmt::Write;

use devfm_core::{CoreResult, PaneView};

/// Formats one pane as a titled list with the cursor row marked.
///
/// Directories get a trailing `/`; files show their size.
pub fn render_pane(title: &str, pane: &dyn PaneView, focused: bool) -> CoreResult<String> {
    let mut out = String::new();
    let marker = if focused { "*" } else { " " };
    let _ = writeln!(out, "{marker} [{title}]");

    let rows = pane.rows()?;
    if rows.is_empty() {
        let _ = writeln!(out, "    (empty)");
    }
    let selected = pane.selected_index();
    for (row, entry) in rows.iter().enumerate() {
        let cursor = if row == selected { '>' } else { ' ' };
        if entry.is_dir() {
            let _ = writeln!(out, "  {cursor} {row:>3} {}/", entry.name());
        } else {
            let _ = writeln!(out, "  {cursor} {row:>3} {:<32} {:>10}", entry.name(), entry.size());
        }
    }
    Ok(out)
}

/// Title for the device pane: `device:/` or `device:/a/b`.
pub fn device_title(path: &[String]) -> String {
    format!("device:/{}", path.join("/"))
}

pub const HELP: &str = "\
commands:
  tab             switch pane
  j / k           cursor down / up
  gg / G          first / last row
  <n>             select row n
  open            enter selected directory
  mv <name>       rename selected entry
  rm              delete selected entry
  refresh         re-list focused pane
  ls              print panes
  quit";
