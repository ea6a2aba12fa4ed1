use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppAction {
    Quit,
    MoveUp,
    MoveDown,
    OpenCreator,
    EditStatus,
    AddCreator,
    RenameCreator,
    ArchiveCreator,
    RestoreCreator,
    MoveCreatorUp,
    MoveCreatorDown,
    ResetAll,
    RefreshProfiles,
    ToggleArchivedView,
    ShowHelp,
    HideHelp,
    // Status prompt actions
    ToggleRead,
    ToggleCommented,
    StatusConfirm,
    StatusCancel,
    // Text input actions
    InputChar(char),
    InputBackspace,
    InputConfirm,
    InputCancel,
}

/// Which key map applies right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyContext {
    Checklist,
    Archived,
    Help,
    StatusPrompt,
    TextInput,
}

pub fn handle_key_event(key: KeyEvent, context: KeyContext) -> Option<AppAction> {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Some(AppAction::Quit);
    }

    match context {
        // Any key closes help
        KeyContext::Help => Some(AppAction::HideHelp),

        KeyContext::StatusPrompt => match key.code {
            KeyCode::Char('r') | KeyCode::Char('1') => Some(AppAction::ToggleRead),
            KeyCode::Char('c') | KeyCode::Char('2') => Some(AppAction::ToggleCommented),
            KeyCode::Enter => Some(AppAction::StatusConfirm),
            KeyCode::Esc => Some(AppAction::StatusCancel),
            _ => None,
        },

        KeyContext::TextInput => match key.code {
            KeyCode::Enter => Some(AppAction::InputConfirm),
            KeyCode::Esc => Some(AppAction::InputCancel),
            KeyCode::Backspace => Some(AppAction::InputBackspace),
            KeyCode::Char(c) => Some(AppAction::InputChar(c)),
            _ => None,
        },

        KeyContext::Archived => match key.code {
            KeyCode::Char('q') => Some(AppAction::Quit),
            KeyCode::Char('j') | KeyCode::Down => Some(AppAction::MoveDown),
            KeyCode::Char('k') | KeyCode::Up => Some(AppAction::MoveUp),
            KeyCode::Enter | KeyCode::Char('u') => Some(AppAction::RestoreCreator),
            KeyCode::Char('v') | KeyCode::Esc => Some(AppAction::ToggleArchivedView),
            KeyCode::Char('?') => Some(AppAction::ShowHelp),
            _ => None,
        },

        KeyContext::Checklist => match key.code {
            KeyCode::Char('q') => Some(AppAction::Quit),

            KeyCode::Char('j') | KeyCode::Down => Some(AppAction::MoveDown),
            KeyCode::Char('k') | KeyCode::Up => Some(AppAction::MoveUp),
            KeyCode::Char('J') => Some(AppAction::MoveCreatorDown),
            KeyCode::Char('K') => Some(AppAction::MoveCreatorUp),

            KeyCode::Enter | KeyCode::Char('o') => Some(AppAction::OpenCreator),
            KeyCode::Char('s') | KeyCode::Char(' ') => Some(AppAction::EditStatus),

            KeyCode::Char('a') => Some(AppAction::AddCreator),
            KeyCode::Char('e') => Some(AppAction::RenameCreator),
            KeyCode::Char('x') => Some(AppAction::ArchiveCreator),
            KeyCode::Char('v') => Some(AppAction::ToggleArchivedView),

            KeyCode::Char('r') => Some(AppAction::RefreshProfiles),
            KeyCode::Char('R') => Some(AppAction::ResetAll),

            KeyCode::Char('?') => Some(AppAction::ShowHelp),
            _ => None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_ctrl_c_always_quits() {
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        for context in [KeyContext::Checklist, KeyContext::TextInput, KeyContext::StatusPrompt] {
            assert_eq!(handle_key_event(ctrl_c, context), Some(AppAction::Quit));
        }
    }

    #[test]
    fn test_text_input_swallows_shortcuts() {
        assert_eq!(
            handle_key_event(key(KeyCode::Char('q')), KeyContext::TextInput),
            Some(AppAction::InputChar('q'))
        );
    }

    #[test]
    fn test_status_prompt_keys() {
        assert_eq!(
            handle_key_event(key(KeyCode::Char('r')), KeyContext::StatusPrompt),
            Some(AppAction::ToggleRead)
        );
        assert_eq!(
            handle_key_event(key(KeyCode::Char('c')), KeyContext::StatusPrompt),
            Some(AppAction::ToggleCommented)
        );
        assert_eq!(handle_key_event(key(KeyCode::Char('q')), KeyContext::StatusPrompt), None);
    }

    #[test]
    fn test_enter_depends_on_view() {
        assert_eq!(
            handle_key_event(key(KeyCode::Enter), KeyContext::Checklist),
            Some(AppAction::OpenCreator)
        );
        assert_eq!(
            handle_key_event(key(KeyCode::Enter), KeyContext::Archived),
            Some(AppAction::RestoreCreator)
        );
    }

    #[test]
    fn test_help_closes_on_any_key() {
        assert_eq!(
            handle_key_event(key(KeyCode::Char('z')), KeyContext::Help),
            Some(AppAction::HideHelp)
        );
    }
}
