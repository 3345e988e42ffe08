use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::{App, InputMode, RenameForm};
use crate::app_event::Notice;

impl App {
    pub fn on_key(&mut self, key: KeyEvent) -> Result<()> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return self.handle_key_q();
        }

        if self.show_help {
            self.handle_help_key(key.code);
            return Ok(());
        }

        match self.input_mode {
            InputMode::Normal => self.handle_normal_key(key.code)?,
            InputMode::Editing => self.handle_editing_key(key),
            InputMode::Rename => self.handle_rename_key(key.code),
        }
        Ok(())
    }

    fn handle_normal_key(&mut self, code: KeyCode) -> Result<()> {
        match code {
            KeyCode::Char('q') => self.handle_key_q()?,
            KeyCode::Char('j') | KeyCode::Down => self.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.select_previous(),
            KeyCode::Enter | KeyCode::Char('e') | KeyCode::Tab => self.handle_key_enter(),
            KeyCode::Char(' ') | KeyCode::Char('o') => self.toggle_current_open(),
            KeyCode::Char('a') => self.add_host(),
            KeyCode::Char('r') => self.open_rename_form(),
            KeyCode::Char('R') | KeyCode::F(5) => self.handle_key_reload(),
            KeyCode::Char('c') => self.handle_key_c()?,
            KeyCode::Char('?') => self.show_help = true,
            _ => {}
        }
        Ok(())
    }

    fn handle_editing_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Esc {
            self.input_mode = InputMode::Normal;
            return;
        }
        if let Some(text) = self.editor.handle_key(key) {
            if !self.store.is_system_selected() {
                self.edit_current_content(&text);
            }
        }
    }

    fn handle_rename_key(&mut self, code: KeyCode) {
        let Some(form) = self.rename_form.as_mut() else {
            self.input_mode = InputMode::Normal;
            return;
        };
        match code {
            KeyCode::Esc => self.close_rename_form(),
            KeyCode::Enter => self.submit_rename_form(),
            KeyCode::Backspace => {
                form.input.pop();
                form.error = None;
            }
            KeyCode::Char(c) => {
                form.input.push(c);
                form.error = None;
            }
            _ => {}
        }
    }

    fn handle_help_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('?') | KeyCode::Esc | KeyCode::Char('q') => {
                self.show_help = false;
                self.help_scroll_position = 0;
            }
            KeyCode::Char('j') | KeyCode::Down => {
                self.help_scroll_position = self.help_scroll_position.saturating_add(1);
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.help_scroll_position = self.help_scroll_position.saturating_sub(1);
            }
            _ => {}
        }
    }

    pub fn handle_key_q(&mut self) -> Result<()> {
        self.should_quit = true;
        Ok(())
    }

    /// Move focus into the editor. The system entry can be browsed but not edited.
    pub fn handle_key_enter(&mut self) {
        self.input_mode = InputMode::Editing;
        if self.editor.is_readonly() {
            self.set_status(Notice::info("Read-only: generated from the enabled hosts"));
        }
    }

    pub fn handle_key_reload(&mut self) {
        if self.store.is_system_selected() {
            self.spawn_refresh_system();
            self.set_status(Notice::info("Reloading system hosts..."));
        }
    }

    pub fn handle_key_c(&mut self) -> Result<()> {
        if let Err(e) = open::that(&self.config_path) {
            tracing::error!("Failed to open config file: {}", e);
            return Err(anyhow::anyhow!("Failed to open config file: {}", e));
        }
        self.set_status(Notice::info("Config changes apply on next start"));
        Ok(())
    }

    pub fn open_rename_form(&mut self) {
        let current = self.store.current();
        if current.is_system() {
            self.set_status(Notice::info("The system hosts entry cannot be renamed"));
            return;
        }
        self.rename_form = Some(RenameForm {
            host_id: current.id,
            input: current.name.clone(),
            error: None,
        });
        self.input_mode = InputMode::Rename;
    }

    pub fn close_rename_form(&mut self) {
        self.rename_form = None;
        self.input_mode = InputMode::Normal;
    }

    /// Keeps the form open with the validation message on failure.
    pub fn submit_rename_form(&mut self) {
        let Some(form) = self.rename_form.as_mut() else {
            return;
        };
        match self.store.rename(form.host_id, &form.input) {
            Ok(transition) => {
                self.apply(transition);
                self.close_rename_form();
            }
            Err(e) => form.error = Some(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::models::HostEntry;
    use std::path::PathBuf;

    fn app_with_hosts() -> App {
        let config = AppConfig {
            server_url: "http://127.0.0.1:9".to_string(),
            ..AppConfig::default()
        };
        let mut app = App::new(config, PathBuf::from("zhost.toml")).unwrap();
        let transition = app.store.load(vec![HostEntry::new(1, "a", "h 1.2.3.4")]);
        app.apply(transition);
        app
    }

    fn press(app: &mut App, code: KeyCode) {
        app.on_key(KeyEvent::new(code, KeyModifiers::NONE)).unwrap();
    }

    #[tokio::test]
    async fn typing_in_the_editor_updates_the_entry() {
        let mut app = app_with_hosts();
        press(&mut app, KeyCode::Char('j'));
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.input_mode, InputMode::Editing);

        press(&mut app, KeyCode::End);
        press(&mut app, KeyCode::Char('9'));
        assert_eq!(app.store.get(1).unwrap().content, "h 1.2.3.49");

        press(&mut app, KeyCode::Esc);
        assert_eq!(app.input_mode, InputMode::Normal);
        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);
    }

    #[tokio::test]
    async fn system_entry_is_not_editable() {
        let mut app = app_with_hosts();
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Char('x'));
        assert_eq!(app.store.hosts()[0].content, "");
        assert_eq!(app.editor.text(), "");
    }

    #[tokio::test]
    async fn rename_form_validates_before_saving() {
        let mut app = app_with_hosts();
        press(&mut app, KeyCode::Char('r'));
        assert!(app.rename_form.is_none());

        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Char('r'));
        assert_eq!(app.input_mode, InputMode::Rename);
        press(&mut app, KeyCode::Backspace);
        press(&mut app, KeyCode::Enter);
        assert_eq!(
            app.rename_form.as_ref().unwrap().error.as_deref(),
            Some("Name is required")
        );

        for c in "office".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        assert!(app.rename_form.as_ref().unwrap().error.is_none());
        press(&mut app, KeyCode::Enter);
        assert!(app.rename_form.is_none());
        assert_eq!(app.input_mode, InputMode::Normal);
        assert_eq!(app.store.get(1).unwrap().name, "office");
    }

    #[tokio::test]
    async fn help_popup_swallows_keys() {
        let mut app = app_with_hosts();
        press(&mut app, KeyCode::Char('?'));
        assert!(app.show_help);
        press(&mut app, KeyCode::Char('j'));
        assert_eq!(app.store.selection(), 0);
        assert_eq!(app.help_scroll_position, 1);
        press(&mut app, KeyCode::Esc);
        assert!(!app.show_help);
    }
}
