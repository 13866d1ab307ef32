/// Actions parsed from one line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputAction {
    /// Switch focus between the local and device pane.
    ToggleFocus,
    CursorUp,
    CursorDown,
    CursorTop,
    CursorBottom,
    /// Move the cursor to a row number as printed.
    Select(usize),
    /// Enter the selected directory.
    Open,
    /// Rename the selected entry.
    Rename(String),
    /// Delete the selected entry.
    Delete,
    /// Re-list the focused pane.
    Refresh,
    /// Print both panes.
    Show,
    Help,
    Quit,
}

/// Parses a command line. Returns `None` for blank or unknown input.
pub fn parse_line(line: &str) -> Option<InputAction> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let action = match word {
        "tab" => InputAction::ToggleFocus,
        "k" | "up" => InputAction::CursorUp,
        "j" | "down" => InputAction::CursorDown,
        "gg" | "top" => InputAction::CursorTop,
        "G" | "bottom" => InputAction::CursorBottom,
        "o" | "open" | "cd" => InputAction::Open,
        "mv" | "rename" if !rest.is_empty() => InputAction::Rename(rest.to_string()),
        "rm" | "delete" => InputAction::Delete,
        "r" | "refresh" => InputAction::Refresh,
        "ls" => InputAction::Show,
        "?" | "help" => InputAction::Help,
        "q" | "quit" | "exit" => InputAction::Quit,
        _ => InputAction::Select(word.parse().ok()?),
    };
    Some(action)
}
