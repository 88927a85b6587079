mod screens;

use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use cellwars::net::{DEFAULT_NAME, MAX_NAME_LEN};
use cellwars::{ConnectionState, DEFAULT_PORT};
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{cursor, execute};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use crate::net::{ClientConfig, Inbound, NetworkClient};

pub use screens::Screen;

const MENU_ITEMS: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    None,
    Quit,
    Connect { addr: SocketAddr, name: String },
    Cancel,
    ChangeScreen(Screen),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Address,
}

/// Menu input state, kept apart from the terminal so key handling stays testable.
#[derive(Debug, Clone)]
pub struct MenuState {
    pub screen: Screen,
    pub selected_index: usize,
    pub name_input: String,
    pub address_input: String,
    pub focus: Field,
    pub error: Option<String>,
}

impl MenuState {
    pub fn new(name: &str) -> Self {
        Self {
            screen: Screen::MainMenu,
            selected_index: 0,
            name_input: name.chars().take(MAX_NAME_LEN).collect(),
            address_input: format!("127.0.0.1:{}", DEFAULT_PORT),
            focus: Field::Name,
            error: None,
        }
    }

    pub fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers) -> Action {
        if modifiers.contains(KeyModifiers::CONTROL) && code == KeyCode::Char('c') {
            return Action::Quit;
        }

        match self.screen {
            Screen::MainMenu => self.handle_main_menu_key(code),
            Screen::Join => self.handle_join_key(code),
            Screen::Joining => self.handle_joining_key(code),
        }
    }

    fn handle_main_menu_key(&mut self, code: KeyCode) -> Action {
        match code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected_index = self.selected_index.saturating_sub(1);
                Action::None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.selected_index = (self.selected_index + 1).min(MENU_ITEMS - 1);
                Action::None
            }
            KeyCode::Enter => match self.selected_index {
                0 => Action::ChangeScreen(Screen::Join),
                _ => Action::Quit,
            },
            KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
            _ => Action::None,
        }
    }

    fn handle_join_key(&mut self, code: KeyCode) -> Action {
        match code {
            KeyCode::Esc => {
                self.error = None;
                Action::ChangeScreen(Screen::MainMenu)
            }
            KeyCode::Tab | KeyCode::Up | KeyCode::Down => {
                self.focus = match self.focus {
                    Field::Name => Field::Address,
                    Field::Address => Field::Name,
                };
                Action::None
            }
            KeyCode::Enter => match self.address_input.parse() {
                Ok(addr) => {
                    self.error = None;
                    Action::Connect {
                        addr,
                        name: self.name_input.clone(),
                    }
                }
                Err(_) => {
                    self.error = Some("Invalid address format".to_string());
                    Action::None
                }
            },
            KeyCode::Backspace => {
                self.focused_input().pop();
                Action::None
            }
            KeyCode::Char(c) => {
                match self.focus {
                    Field::Name => {
                        if !c.is_control() && self.name_input.chars().count() < MAX_NAME_LEN {
                            self.name_input.push(c);
                        }
                    }
                    Field::Address => {
                        if c.is_ascii_digit() || c == '.' || c == ':' {
                            self.address_input.push(c);
                        }
                    }
                }
                Action::None
            }
            _ => Action::None,
        }
    }

    fn handle_joining_key(&mut self, code: KeyCode) -> Action {
        match code {
            KeyCode::Esc => Action::Cancel,
            _ => Action::None,
        }
    }

    fn focused_input(&mut self) -> &mut String {
        match self.focus {
            Field::Name => &mut self.name_input,
            Field::Address => &mut self.address_input,
        }
    }
}

pub struct Tui {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    menu: MenuState,
    client: Option<NetworkClient>,
    should_quit: bool,
    should_launch: bool,
}

impl Tui {
    pub fn new(name: &str) -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, cursor::Hide)?;

        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        Ok(Self {
            terminal,
            menu: MenuState::new(name),
            client: None,
            should_quit: false,
            should_launch: false,
        })
    }

    pub fn run(&mut self) -> io::Result<Option<NetworkClient>> {
        while !self.should_quit && !self.should_launch {
            self.draw()?;
            self.poll_client();
            if self.should_launch {
                continue;
            }

            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        let action = self.menu.handle_key(key.code, key.modifiers);
                        self.process_action(action)?;
                    }
                }
            }
        }

        Ok(if self.should_launch {
            self.client.take()
        } else {
            None
        })
    }

    /// Launches once the server welcomes us. A refused or silent join goes back to the form.
    fn poll_client(&mut self) {
        let Some(client) = &mut self.client else {
            return;
        };
        if let Err(e) = client.update() {
            log::debug!("Network error while joining: {}", e);
        }

        match client.state() {
            ConnectionState::Connected => self.should_launch = true,
            ConnectionState::Joining => {}
            ConnectionState::Disconnected => {
                let reason = client.drain_inbound().find_map(|inbound| match inbound {
                    Inbound::Denied(reason) => Some(reason),
                    _ => None,
                });
                self.menu.error = Some(match reason {
                    Some(reason) => format!("Join denied: {}", reason),
                    None => "No response from server".to_string(),
                });
                self.client = None;
                self.menu.screen = Screen::Join;
            }
        }
    }

    fn draw(&mut self) -> io::Result<()> {
        let menu = &self.menu;
        let client = &self.client;

        self.terminal.draw(|frame| {
            screens::render(frame, menu, client.as_ref());
        })?;

        Ok(())
    }

    fn process_action(&mut self, action: Action) -> io::Result<()> {
        match action {
            Action::None => {}
            Action::Quit => {
                self.should_quit = true;
            }
            Action::Connect { addr, name } => {
                self.connect_to_server(addr, &name)?;
            }
            Action::Cancel => {
                if let Some(client) = &mut self.client {
                    let _ = client.disconnect();
                }
                self.client = None;
                self.menu.screen = Screen::Join;
            }
            Action::ChangeScreen(screen) => {
                self.menu.screen = screen;
                self.menu.selected_index = 0;
            }
        }

        Ok(())
    }

    fn connect_to_server(&mut self, addr: SocketAddr, name: &str) -> io::Result<()> {
        let mut client = NetworkClient::new(ClientConfig::default())?;

        if let Err(e) = client.connect(addr, name) {
            self.menu.error = Some(format!("Connection failed: {}", e));
            return Ok(());
        }

        self.client = Some(client);
        self.menu.screen = Screen::Joining;

        Ok(())
    }

    pub fn restore_terminal(&mut self) -> io::Result<()> {
        terminal::disable_raw_mode()?;
        execute!(
            self.terminal.backend_mut(),
            LeaveAlternateScreen,
            cursor::Show
        )?;
        Ok(())
    }
}

impl Drop for Tui {
    fn drop(&mut self) {
        let _ = self.restore_terminal();
    }
}

/// Shows the join menu. Returns a client that has been welcomed, or `None` if the user quit.
pub fn run_menu(name: &str) -> io::Result<Option<NetworkClient>> {
    let name = if name.trim().is_empty() {
        DEFAULT_NAME
    } else {
        name
    };
    let mut tui = Tui::new(name)?;
    let result = tui.run();
    tui.restore_terminal()?;
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(menu: &mut MenuState, code: KeyCode) -> Action {
        menu.handle_key(code, KeyModifiers::NONE)
    }

    #[test]
    fn main_menu_navigation() {
        let mut menu = MenuState::new("Cell");
        assert_eq!(
            press(&mut menu, KeyCode::Enter),
            Action::ChangeScreen(Screen::Join)
        );

        press(&mut menu, KeyCode::Down);
        press(&mut menu, KeyCode::Down);
        assert_eq!(menu.selected_index, 1);
        assert_eq!(press(&mut menu, KeyCode::Enter), Action::Quit);
    }

    #[test]
    fn ctrl_c_quits_anywhere() {
        let mut menu = MenuState::new("Cell");
        menu.screen = Screen::Joining;
        assert_eq!(
            menu.handle_key(KeyCode::Char('c'), KeyModifiers::CONTROL),
            Action::Quit
        );
    }

    #[test]
    fn name_field_is_capped() {
        let mut menu = MenuState::new("");
        menu.screen = Screen::Join;
        for c in "Abcdefghijklmn".chars() {
            press(&mut menu, KeyCode::Char(c));
        }
        assert_eq!(menu.name_input, "Abcdefghij");
    }

    #[test]
    fn address_field_accepts_only_address_characters() {
        let mut menu = MenuState::new("Zed");
        menu.screen = Screen::Join;
        menu.address_input.clear();
        press(&mut menu, KeyCode::Tab);
        for c in "10.0.0.x1:99".chars() {
            press(&mut menu, KeyCode::Char(c));
        }
        assert_eq!(menu.address_input, "10.0.0.1:99");
        assert_eq!(menu.name_input, "Zed");
    }

    #[test]
    fn enter_connects_with_parsed_address() {
        let mut menu = MenuState::new("Zed");
        menu.screen = Screen::Join;
        let action = press(&mut menu, KeyCode::Enter);
        assert_eq!(
            action,
            Action::Connect {
                addr: SocketAddr::from(([127, 0, 0, 1], DEFAULT_PORT)),
                name: "Zed".to_string(),
            }
        );
    }

    #[test]
    fn bad_address_reports_error() {
        let mut menu = MenuState::new("Zed");
        menu.screen = Screen::Join;
        menu.address_input = "nope".to_string();
        assert_eq!(press(&mut menu, KeyCode::Enter), Action::None);
        assert!(menu.error.is_some());

        press(&mut menu, KeyCode::Esc);
        assert_eq!(menu.error, None);
    }
}
