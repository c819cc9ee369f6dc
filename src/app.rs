use crossterm::event::{KeyCode, KeyEvent};
use ratatui::widgets::ListState;

use crate::api;
use crate::models::{CreateTodoInput, Todo, UpdateTodoPatch};
use crate::parser::{parse_due_date, parse_todo_input};

pub struct App {
    pub todos: Vec<Todo>,
    pub state: ListState,
    pub detail: Option<Todo>,
    pub loading: bool,
    pub error: Option<String>,
    pub input_mode: InputMode,
    pub active_input: ActiveInput,
    pub draft_title: String,
    pub draft_due_date: String,
    pub editing_id: Option<String>,
}

pub enum InputMode {
    Normal,
    Adding,
    Editing,
    ConfirmingDelete,
}

#[derive(PartialEq)]
pub enum ActiveInput {
    Title,
    DueDate,
}

impl App {
    pub fn new() -> App {
        App {
            todos: Vec::new(),
            state: ListState::default(),
            detail: None,
            loading: false,
            error: None,
            input_mode: InputMode::Normal,
            active_input: ActiveInput::Title,
            draft_title: String::new(),
            draft_due_date: String::new(),
            editing_id: None,
        }
    }

    /// Replaces the whole list from the server. Displayed state is
    /// always the last successful read, never a local guess.
    pub async fn refresh(&mut self, base_url: &str) {
        self.loading = true;
        match api::fetch_todos(base_url).await {
            Ok(todos) => {
                self.todos = todos;
                self.error = None;
                if self.todos.is_empty() {
                    self.state.select(None);
                } else {
                    let i = self.state.selected().unwrap_or(0).min(self.todos.len() - 1);
                    self.state.select(Some(i));
                }
            }
            Err(err) => self.error = Some(err.to_string()),
        }
        self.loading = false;
    }

    /// Submits the add draft. A blank title is rejected locally and
    /// never reaches the network.
    pub async fn add(&mut self, base_url: &str) {
        if self.draft_title.trim().is_empty() {
            self.error = Some("Please enter a todo".to_string());
            return;
        }
        let parsed = parse_todo_input(&self.draft_title);
        let input = CreateTodoInput {
            title: Some(parsed.title),
            completed: None,
            due_date: parsed.due_date,
        };

        self.loading = true;
        match api::create_todo(base_url, &input).await {
            Ok(_) => {
                self.draft_title.clear();
                self.error = None;
                self.loading = false;
                self.input_mode = InputMode::Normal;
                self.refresh(base_url).await;
            }
            Err(err) => {
                self.error = Some(err.to_string());
                self.loading = false;
            }
        }
    }

    /// Flips the selected todo's completion on the server. No
    /// optimistic flip: on failure prior state stays as it was.
    pub async fn toggle(&mut self, base_url: &str) {
        let Some((id, completed)) = self
            .selected_todo()
            .map(|todo| (todo.id.clone(), todo.completed))
        else {
            return;
        };
        let patch = UpdateTodoPatch {
            completed: Some(!completed),
            ..UpdateTodoPatch::default()
        };
        match api::update_todo(base_url, &id, &patch).await {
            Ok(_) => self.refresh(base_url).await,
            Err(err) => self.error = Some(err.to_string()),
        }
    }

    /// Issues the delete after the confirmation prompt said yes.
    pub async fn remove_confirmed(&mut self, base_url: &str) {
        let Some(id) = self.selected_todo().map(|todo| todo.id.clone()) else {
            return;
        };
        match api::delete_todo(base_url, &id).await {
            Ok(()) => {
                self.detail = None;
                self.refresh(base_url).await;
            }
            Err(err) => self.error = Some(err.to_string()),
        }
    }

    /// Commits the inline edit draft for the todo in `editing_id`.
    pub async fn commit_edit(&mut self, base_url: &str) {
        let Some(id) = self.editing_id.clone() else {
            return;
        };
        let due_date = parse_due_date(&self.draft_due_date);
        if !self.draft_due_date.trim().is_empty() && due_date.is_none() {
            self.error = Some("Due date must look like YYYY-MM-DD".to_string());
            return;
        }
        let patch = UpdateTodoPatch {
            title: Some(self.draft_title.clone()),
            completed: None,
            due_date,
        };
        match api::update_todo(base_url, &id, &patch).await {
            Ok(_) => {
                self.editing_id = None;
                self.error = None;
                self.input_mode = InputMode::Normal;
                self.refresh(base_url).await;
            }
            Err(err) => self.error = Some(err.to_string()),
        }
    }

    /// Fetches the selected todo by id into the detail panel.
    pub async fn view_detail(&mut self, base_url: &str) {
        let Some(id) = self.selected_todo().map(|todo| todo.id.clone()) else {
            return;
        };
        match api::fetch_todo(base_url, &id).await {
            Ok(todo) => {
                self.detail = Some(todo);
                self.error = None;
            }
            Err(err) => self.error = Some(err.to_string()),
        }
    }

    pub fn selected_todo(&self) -> Option<&Todo> {
        self.state.selected().and_then(|i| self.todos.get(i))
    }

    pub fn next(&mut self) {
        if self.todos.is_empty() {
            return;
        }
        let i = match self.state.selected() {
            Some(i) => {
                if i >= self.todos.len() - 1 {
                    0
                } else {
                    i + 1
                }
            }
            None => 0,
        };
        self.state.select(Some(i));
    }

    pub fn previous(&mut self) {
        if self.todos.is_empty() {
            return;
        }
        let i = match self.state.selected() {
            Some(i) => {
                if i == 0 {
                    self.todos.len() - 1
                } else {
                    i - 1
                }
            }
            None => 0,
        };
        self.state.select(Some(i));
    }

    /// Routes one key event by input mode. Returns true to quit.
    pub async fn handle_input(&mut self, key: KeyEvent, base_url: &str) -> bool {
        match self.input_mode {
            InputMode::Normal => match key.code {
                KeyCode::Char('q') => return true,
                KeyCode::Char('j') | KeyCode::Down => self.next(),
                KeyCode::Char('k') | KeyCode::Up => self.previous(),
                KeyCode::Char('r') => self.refresh(base_url).await,
                KeyCode::Char(' ') | KeyCode::Char('t') => self.toggle(base_url).await,
                KeyCode::Char('a') => {
                    self.draft_title.clear();
                    self.input_mode = InputMode::Adding;
                }
                KeyCode::Char('e') => {
                    if let Some((id, title, due_date)) = self
                        .selected_todo()
                        .map(|todo| (todo.id.clone(), todo.title.clone(), todo.due_date))
                    {
                        self.editing_id = Some(id);
                        self.draft_title = title;
                        self.draft_due_date = due_date
                            .map(|due| due.format("%Y-%m-%d").to_string())
                            .unwrap_or_default();
                        self.active_input = ActiveInput::Title;
                        self.input_mode = InputMode::Editing;
                    }
                }
                KeyCode::Char('d') => {
                    if self.selected_todo().is_some() {
                        self.input_mode = InputMode::ConfirmingDelete;
                    }
                }
                KeyCode::Enter => self.view_detail(base_url).await,
                _ => {}
            },

            InputMode::Adding => match key.code {
                KeyCode::Enter => self.add(base_url).await,
                KeyCode::Char(c) => self.draft_title.push(c),
                KeyCode::Backspace => {
                    self.draft_title.pop();
                }
                KeyCode::Esc => {
                    self.draft_title.clear();
                    self.input_mode = InputMode::Normal;
                }
                _ => {}
            },

            InputMode::Editing => match key.code {
                KeyCode::Tab => {
                    self.active_input = match self.active_input {
                        ActiveInput::Title => ActiveInput::DueDate,
                        ActiveInput::DueDate => ActiveInput::Title,
                    };
                }
                KeyCode::Enter => self.commit_edit(base_url).await,
                KeyCode::Char(c) => match self.active_input {
                    ActiveInput::Title => self.draft_title.push(c),
                    ActiveInput::DueDate => self.draft_due_date.push(c),
                },
                KeyCode::Backspace => {
                    match self.active_input {
                        ActiveInput::Title => self.draft_title.pop(),
                        ActiveInput::DueDate => self.draft_due_date.pop(),
                    };
                }
                KeyCode::Esc => {
                    self.editing_id = None;
                    self.input_mode = InputMode::Normal;
                }
                _ => {}
            },

            InputMode::ConfirmingDelete => match key.code {
                KeyCode::Char('y') | KeyCode::Enter => {
                    self.input_mode = InputMode::Normal;
                    self.remove_confirmed(base_url).await;
                }
                KeyCode::Char('n') | KeyCode::Esc => {
                    self.input_mode = InputMode::Normal;
                }
                _ => {}
            },
        }
        false
    }
}
