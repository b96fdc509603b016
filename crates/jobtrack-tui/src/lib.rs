// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::style::Print;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use jobtrack_app::{
    AppCommand, AppEvent, AppMode, AppState, Application, ApplicationDetail, ApplicationId,
    ContactDetail, ContactId, Dashboard, DetailOutcome, FormKind, FormPayload, ListView,
    MessageInput, MessageKind, MutationOutcome, NetworkContact, Notice, NoticeLevel, Persisted,
    RecordStatus, RecordStore, SenderProfile, SessionUser, TabKind, generate_with,
    load_application_detail, load_contact_detail, load_dashboard, mutation,
    suggested_second_contact,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Tabs, Wrap};
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;
use time::{Date, OffsetDateTime};
use tracing::{error, info, warn};

const APP_TITLE: &str = "jobtrack";
const SECRET_MASK: &str = "********";
const LOADING_TEXT: &str = "Loading...";
const STATUS_CLEAR_DELAY: Duration = Duration::from_secs(4);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InternalEvent {
    ClearStatus { token: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignUpResult {
    SignedIn(SessionUser),
    /// The account exists but must be confirmed by email before sign-in.
    ConfirmationRequired,
}

/// Everything the UI needs from the outside world. Record reads and writes
/// go through the `RecordStore` supertrait; auth and the clipboard are
/// separate so a demo runtime can fake them.
pub trait AppRuntime: RecordStore {
    fn sign_in(&mut self, email: &str, password: &str) -> Result<SessionUser>;
    fn sign_up(&mut self, email: &str, password: &str) -> Result<SignUpResult>;
    fn sign_out(&mut self) -> Result<()>;

    fn sender_profile(&self) -> SenderProfile {
        SenderProfile::default()
    }

    fn today(&self) -> Date {
        OffsetDateTime::now_utc().date()
    }

    fn copy_to_clipboard(&mut self, text: &str) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(stdout, Print(osc52_sequence(text))).context("write clipboard escape sequence")
    }
}

/// Escape sequence asking the terminal emulator to put `text` on the
/// system clipboard.
pub fn osc52_sequence(text: &str) -> String {
    use base64::Engine as _;
    use base64::engine::general_purpose::STANDARD;

    let encoded = STANDARD.encode(text.as_bytes());
    format!("\x1b]52;c;{encoded}\x1b\\")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldKind {
    Text,
    Secret,
    Toggle,
    ApplicationStatus,
    ContactStatus,
    Date,
    OptionalDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FormFieldSpec {
    label: &'static str,
    kind: FieldKind,
}

const fn field(label: &'static str, kind: FieldKind) -> FormFieldSpec {
    FormFieldSpec { label, kind }
}

const SIGN_IN_FIELDS: [FormFieldSpec; 2] = [
    field("email", FieldKind::Text),
    field("password", FieldKind::Secret),
];

const SIGN_UP_FIELDS: [FormFieldSpec; 3] = [
    field("email", FieldKind::Text),
    field("password", FieldKind::Secret),
    field("confirm password", FieldKind::Secret),
];

const APPLICATION_FIELDS: [FormFieldSpec; 6] = [
    field("company", FieldKind::Text),
    field("link", FieldKind::Text),
    field("active", FieldKind::Toggle),
    field("status", FieldKind::ApplicationStatus),
    field("portal username", FieldKind::Text),
    field("portal password", FieldKind::Secret),
];

const CONTACT_FIELDS: [FormFieldSpec; 10] = [
    field("name", FieldKind::Text),
    field("status", FieldKind::ContactStatus),
    field("company", FieldKind::Text),
    field("role", FieldKind::Text),
    field("linkedin", FieldKind::Text),
    field("location", FieldKind::Text),
    field("first contact", FieldKind::Date),
    field("second contact", FieldKind::OptionalDate),
    field("notes", FieldKind::Text),
    field("action items", FieldKind::Text),
];

const MESSAGE_FIELDS: [&str; 3] = ["name", "company", "role"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FormUiState {
    kind: FormKind,
    field_index: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum DetailPane {
    Application(ApplicationDetail),
    Contact(ContactDetail),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum DeleteTarget {
    Application { id: ApplicationId, label: String },
    Contact { id: ContactId, label: String },
}

impl DeleteTarget {
    fn label(&self) -> &str {
        match self {
            Self::Application { label, .. } | Self::Contact { label, .. } => label,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct MessageUiState {
    input: MessageInput,
    field_index: usize,
    kind: MessageKind,
    sender: SenderProfile,
}

impl MessageUiState {
    fn field_mut(&mut self) -> &mut String {
        match self.field_index {
            0 => &mut self.input.name,
            1 => &mut self.input.company,
            _ => &mut self.input.role,
        }
    }

    fn shift_kind(&mut self, delta: isize) {
        let kinds = MessageKind::ALL;
        let current = kinds
            .iter()
            .position(|kind| *kind == self.kind)
            .unwrap_or(0) as isize;
        let next = (current + delta).rem_euclid(kinds.len() as isize) as usize;
        self.kind = kinds[next];
    }

    fn text(&self) -> String {
        generate_with(&self.input, &self.sender)
            .get(self.kind)
            .to_owned()
    }
}

#[derive(Debug, Default)]
struct ViewData {
    dashboard: Dashboard,
    dashboard_loading: bool,
    applications: ListView<Application>,
    contacts: ListView<NetworkContact>,
    application_cursor: usize,
    contact_cursor: usize,
    /// Tab whose fetch runs after the next frame so the placeholder shows.
    pending_load: Option<TabKind>,
    detail: Option<DetailPane>,
    search_editing: bool,
    message: Option<MessageUiState>,
    confirm_delete: Option<DeleteTarget>,
    form: Option<FormUiState>,
    help_visible: bool,
    status_token: u64,
}

impl ViewData {
    /// Keeps the status token so scheduled clears of older notices stay
    /// ignored.
    fn reset(&mut self) {
        *self = Self {
            status_token: self.status_token,
            ..Self::default()
        };
    }
}

pub fn run_app<R: AppRuntime>(state: &mut AppState, runtime: &mut R) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let mut view_data = ViewData::default();
    let (internal_tx, internal_rx) = mpsc::channel();

    fill_blank_form(state, runtime);
    sync_form_ui_state(state, &mut view_data);
    request_refresh(state, &mut view_data);

    let mut result = Ok(());
    loop {
        process_internal_events(state, &mut view_data, &internal_rx);

        if let Err(error) = terminal.draw(|frame| render(frame, state, &view_data)) {
            result = Err(error).context("draw frame");
            break;
        }

        if view_data.pending_load.is_some() {
            run_pending_load(state, runtime, &mut view_data, &internal_tx);
            continue;
        }

        let has_event = event::poll(Duration::from_millis(120)).context("poll event")?;
        if has_event {
            match event::read().context("read event")? {
                Event::Key(key) => {
                    if handle_key_event(state, runtime, &mut view_data, &internal_tx, key) {
                        break;
                    }
                }
                Event::Resize(_, _) => {}
                _ => {}
            }
        }
    }

    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    result
}

fn process_internal_events(
    state: &mut AppState,
    view_data: &mut ViewData,
    rx: &Receiver<InternalEvent>,
) {
    while let Ok(event) = rx.try_recv() {
        match event {
            InternalEvent::ClearStatus { token } if token == view_data.status_token => {
                state.dispatch(AppCommand::ClearStatus);
            }
            InternalEvent::ClearStatus { .. } => {}
        }
    }
}

fn schedule_status_clear(internal_tx: &Sender<InternalEvent>, token: u64) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(STATUS_CLEAR_DELAY);
        let _ = sender.send(InternalEvent::ClearStatus { token });
    });
}

fn emit_status(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    notice: Notice,
) {
    state.dispatch(AppCommand::SetStatus(notice));
    view_data.status_token = view_data.status_token.saturating_add(1);
    schedule_status_clear(internal_tx, view_data.status_token);
}

fn handle_key_event<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    if key.code == KeyCode::Char('q') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }

    if view_data.help_visible {
        if key.code == KeyCode::Esc || key.code == KeyCode::Char('?') {
            view_data.help_visible = false;
        }
        return false;
    }

    if view_data.confirm_delete.is_some() {
        handle_delete_confirm_key(state, runtime, view_data, internal_tx, key);
        return false;
    }

    if view_data.message.is_some() {
        handle_message_key(state, runtime, view_data, internal_tx, key);
        return false;
    }

    if matches!(state.mode, AppMode::Form(_)) {
        handle_form_key(state, runtime, view_data, internal_tx, key);
        return false;
    }

    if view_data.search_editing {
        handle_search_key(state, view_data, key);
        return false;
    }

    if key.code == KeyCode::Char('?') {
        view_data.help_visible = true;
        return false;
    }

    if !state.is_signed_in() {
        return false;
    }

    let browsing = view_data.detail.is_none();
    match key.code {
        KeyCode::Tab => {
            dispatch_and_refresh(state, runtime, view_data, AppCommand::NextTab, internal_tx);
        }
        KeyCode::BackTab => {
            dispatch_and_refresh(state, runtime, view_data, AppCommand::PrevTab, internal_tx);
        }
        KeyCode::Char('j') | KeyCode::Down if browsing => move_row_cursor(state, view_data, 1),
        KeyCode::Char('k') | KeyCode::Up if browsing => move_row_cursor(state, view_data, -1),
        KeyCode::Char('g') if browsing => move_row_cursor(state, view_data, isize::MIN),
        KeyCode::Char('G') if browsing => move_row_cursor(state, view_data, isize::MAX),
        KeyCode::Enter if browsing => open_detail(state, runtime, view_data, internal_tx),
        KeyCode::Esc | KeyCode::Backspace if !browsing => view_data.detail = None,
        KeyCode::Esc => set_search_text(state, view_data, String::new()),
        KeyCode::Char('/') if browsing && state.active_tab != TabKind::Dashboard => {
            view_data.search_editing = true;
        }
        KeyCode::Char('s') if browsing => cycle_status_filter(state, view_data, internal_tx),
        KeyCode::Char('A') if browsing => toggle_active_scope(state, view_data, internal_tx),
        KeyCode::Char('a') => open_new_form(state, runtime, view_data, internal_tx),
        KeyCode::Char('e') => open_edit_form(state, runtime, view_data, internal_tx),
        KeyCode::Char('d') => request_delete(state, view_data, internal_tx),
        KeyCode::Char('t') => toggle_focused_active(state, runtime, view_data, internal_tx),
        KeyCode::Char('m') => open_message_generator(state, &*runtime, view_data),
        KeyCode::Char('r') if browsing => request_refresh(state, view_data),
        KeyCode::Char('r') => reload_detail(state, runtime, view_data, internal_tx),
        KeyCode::Char('L') => sign_out(state, runtime, view_data, internal_tx),
        _ => {}
    }
    false
}

fn handle_search_key(state: &AppState, view_data: &mut ViewData, key: KeyEvent) {
    let mut text = match state.active_tab {
        TabKind::Applications => view_data.applications.search_text().to_owned(),
        TabKind::Network => view_data.contacts.search_text().to_owned(),
        TabKind::Dashboard => {
            view_data.search_editing = false;
            return;
        }
    };
    match key.code {
        KeyCode::Enter => {
            view_data.search_editing = false;
            return;
        }
        KeyCode::Esc => {
            view_data.search_editing = false;
            text.clear();
        }
        KeyCode::Backspace => {
            text.pop();
        }
        KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => text.push(ch),
        _ => return,
    }
    set_search_text(state, view_data, text);
}

fn set_search_text(state: &AppState, view_data: &mut ViewData, text: String) {
    match state.active_tab {
        TabKind::Applications => {
            view_data.applications.set_search(text);
            view_data.application_cursor = 0;
        }
        TabKind::Network => {
            view_data.contacts.set_search(text);
            view_data.contact_cursor = 0;
        }
        TabKind::Dashboard => {}
    }
}

fn move_row_cursor(state: &AppState, view_data: &mut ViewData, delta: isize) {
    let (cursor, len) = match state.active_tab {
        TabKind::Applications => (
            &mut view_data.application_cursor,
            view_data.applications.visible().len(),
        ),
        TabKind::Network => (
            &mut view_data.contact_cursor,
            view_data.contacts.visible().len(),
        ),
        TabKind::Dashboard => return,
    };
    if len == 0 {
        *cursor = 0;
        return;
    }
    let next = (*cursor as isize).saturating_add(delta);
    *cursor = next.clamp(0, len as isize - 1) as usize;
}

fn clamp_cursors(view_data: &mut ViewData) {
    let applications = view_data.applications.visible().len();
    let contacts = view_data.contacts.visible().len();
    view_data.application_cursor = view_data
        .application_cursor
        .min(applications.saturating_sub(1));
    view_data.contact_cursor = view_data.contact_cursor.min(contacts.saturating_sub(1));
}

fn selected_application(view_data: &ViewData) -> Option<&Application> {
    view_data
        .applications
        .visible()
        .get(view_data.application_cursor)
        .copied()
}

fn selected_contact(view_data: &ViewData) -> Option<&NetworkContact> {
    view_data
        .contacts
        .visible()
        .get(view_data.contact_cursor)
        .copied()
}

/// The application under the cursor, or the one whose detail is open.
fn focused_application(view_data: &ViewData) -> Option<&Application> {
    match &view_data.detail {
        Some(DetailPane::Application(detail)) => Some(&detail.application),
        Some(DetailPane::Contact(_)) => None,
        None => selected_application(view_data),
    }
}

fn focused_contact(view_data: &ViewData) -> Option<&NetworkContact> {
    match &view_data.detail {
        Some(DetailPane::Contact(detail)) => Some(&detail.contact),
        Some(DetailPane::Application(_)) => None,
        None => selected_contact(view_data),
    }
}

fn cycle_status_filter(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    let label = match state.active_tab {
        TabKind::Applications => view_data.applications.cycle_filter().label(),
        TabKind::Network => view_data.contacts.cycle_filter().label(),
        TabKind::Dashboard => return,
    };
    request_refresh(state, view_data);
    emit_status(
        state,
        view_data,
        internal_tx,
        Notice::info(format!("status: {label}")),
    );
}

fn toggle_active_scope(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    if state.active_tab != TabKind::Applications {
        return;
    }
    let active_only = !view_data.applications.query().active_only;
    if !view_data.applications.set_active_only(active_only) {
        return;
    }
    request_refresh(state, view_data);
    let message = if active_only {
        "showing active applications only"
    } else {
        "showing all applications"
    };
    emit_status(state, view_data, internal_tx, Notice::info(message));
}

/// Marks the active tab's data as loading. The fetch itself runs in
/// `run_pending_load` once a frame with the placeholder has been drawn.
fn request_refresh(state: &AppState, view_data: &mut ViewData) {
    if !state.is_signed_in() {
        return;
    }
    match state.active_tab {
        TabKind::Dashboard => view_data.dashboard_loading = true,
        TabKind::Applications => view_data.applications.begin_load(),
        TabKind::Network => view_data.contacts.begin_load(),
    }
    view_data.pending_load = Some(state.active_tab);
}

fn run_pending_load<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    let Some(tab) = view_data.pending_load.take() else {
        return;
    };
    let Some(owner) = state.owner().cloned() else {
        view_data.dashboard_loading = false;
        return;
    };
    let notice = match tab {
        TabKind::Dashboard => {
            view_data.dashboard = load_dashboard(runtime, &owner);
            view_data.dashboard_loading = false;
            None
        }
        TabKind::Applications => {
            let query = *view_data.applications.query();
            let result = Application::list(runtime, &owner, &query);
            view_data.applications.finish_load(result)
        }
        TabKind::Network => {
            let query = *view_data.contacts.query();
            let result = NetworkContact::list(runtime, &owner, &query);
            view_data.contacts.finish_load(result)
        }
    };
    clamp_cursors(view_data);
    if let Some(notice) = notice {
        emit_status(state, view_data, internal_tx, notice);
    }
}

fn open_detail<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    let Some(owner) = state.owner().cloned() else {
        return;
    };
    match state.active_tab {
        TabKind::Applications => {
            let Some(id) = selected_application(view_data).map(|row| row.id.clone()) else {
                return;
            };
            match load_application_detail(runtime, &owner, &id) {
                DetailOutcome::Loaded(detail) => {
                    view_data.detail = Some(DetailPane::Application(detail));
                }
                DetailOutcome::Redirect { tab, notice } => {
                    redirect_from_detail(state, runtime, view_data, internal_tx, tab, notice);
                }
            }
        }
        TabKind::Network => {
            let Some(id) = selected_contact(view_data).map(|row| row.id.clone()) else {
                return;
            };
            match load_contact_detail(runtime, &owner, &id) {
                DetailOutcome::Loaded(detail) => {
                    view_data.detail = Some(DetailPane::Contact(detail));
                }
                DetailOutcome::Redirect { tab, notice } => {
                    redirect_from_detail(state, runtime, view_data, internal_tx, tab, notice);
                }
            }
        }
        TabKind::Dashboard => {}
    }
}

fn reload_detail<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    let Some(owner) = state.owner().cloned() else {
        return;
    };
    match view_data.detail.take() {
        Some(DetailPane::Application(detail)) => {
            match load_application_detail(runtime, &owner, &detail.application.id) {
                DetailOutcome::Loaded(detail) => {
                    view_data.detail = Some(DetailPane::Application(detail));
                }
                DetailOutcome::Redirect { tab, notice } => {
                    redirect_from_detail(state, runtime, view_data, internal_tx, tab, notice);
                }
            }
        }
        Some(DetailPane::Contact(detail)) => {
            match load_contact_detail(runtime, &owner, &detail.contact.id) {
                DetailOutcome::Loaded(detail) => view_data.detail = Some(DetailPane::Contact(detail)),
                DetailOutcome::Redirect { tab, notice } => {
                    redirect_from_detail(state, runtime, view_data, internal_tx, tab, notice);
                }
            }
        }
        None => {}
    }
}

fn redirect_from_detail<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    tab: TabKind,
    notice: Notice,
) {
    view_data.detail = None;
    if state.active_tab == tab {
        request_refresh(state, view_data);
    } else {
        dispatch_and_refresh(
            state,
            runtime,
            view_data,
            AppCommand::SetActiveTab(tab),
            internal_tx,
        );
    }
    emit_status(state, view_data, internal_tx, notice);
}

fn open_new_form<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    let kind = match state.active_tab {
        TabKind::Applications => FormKind::Application,
        TabKind::Network => FormKind::Contact,
        TabKind::Dashboard => {
            emit_status(
                state,
                view_data,
                internal_tx,
                Notice::info("switch to applications or network to add a record"),
            );
            return;
        }
    };
    let payload = FormPayload::blank_for(kind, runtime.today());
    dispatch_and_refresh(
        state,
        runtime,
        view_data,
        AppCommand::OpenForm(payload),
        internal_tx,
    );
}

fn open_edit_form<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    let payload = match state.active_tab {
        TabKind::Applications => focused_application(view_data).map(FormPayload::edit_application),
        TabKind::Network => focused_contact(view_data).map(FormPayload::edit_contact),
        TabKind::Dashboard => None,
    };
    let Some(payload) = payload else {
        emit_status(
            state,
            view_data,
            internal_tx,
            Notice::info("nothing selected to edit"),
        );
        return;
    };
    dispatch_and_refresh(
        state,
        runtime,
        view_data,
        AppCommand::OpenForm(payload),
        internal_tx,
    );
}

fn request_delete(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    let target = match state.active_tab {
        TabKind::Applications => {
            focused_application(view_data).map(|row| DeleteTarget::Application {
                id: row.id.clone(),
                label: row.company.clone(),
            })
        }
        TabKind::Network => focused_contact(view_data).map(|row| DeleteTarget::Contact {
            id: row.id.clone(),
            label: row.name.clone(),
        }),
        TabKind::Dashboard => None,
    };
    match target {
        Some(target) => view_data.confirm_delete = Some(target),
        None => emit_status(
            state,
            view_data,
            internal_tx,
            Notice::info("nothing selected to delete"),
        ),
    }
}

fn handle_delete_confirm_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') => {
            let Some(target) = view_data.confirm_delete.take() else {
                return;
            };
            let owner = state.owner().cloned();
            let outcome = match &target {
                DeleteTarget::Application { id, .. } => mutation::delete(
                    runtime,
                    owner.as_ref(),
                    &mut view_data.applications,
                    id,
                ),
                DeleteTarget::Contact { id, .. } => {
                    mutation::delete(runtime, owner.as_ref(), &mut view_data.contacts, id)
                }
            };
            if outcome.is_applied() {
                view_data.detail = None;
                clamp_cursors(view_data);
            }
            report_outcome(state, view_data, internal_tx, &outcome);
        }
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            view_data.confirm_delete = None;
            emit_status(
                state,
                view_data,
                internal_tx,
                Notice::info("delete canceled"),
            );
        }
        _ => {}
    }
}

fn toggle_focused_active<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    if state.active_tab != TabKind::Applications {
        return;
    }
    let Some(application) = focused_application(view_data).cloned() else {
        return;
    };
    let owner = state.owner().cloned();
    let outcome = mutation::toggle_active(
        runtime,
        owner.as_ref(),
        &mut view_data.applications,
        &application,
    );
    if outcome.is_applied() {
        clamp_cursors(view_data);
        reload_detail(state, runtime, view_data, internal_tx);
    }
    report_outcome(state, view_data, internal_tx, &outcome);
}

fn report_outcome(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    outcome: &MutationOutcome,
) {
    let notice = match outcome {
        MutationOutcome::Skipped => Notice::error("sign in first"),
        other => match other.notice() {
            Some(notice) => notice.clone(),
            None => return,
        },
    };
    emit_status(state, view_data, internal_tx, notice);
}

fn open_message_generator<R: AppRuntime>(state: &AppState, runtime: &R, view_data: &mut ViewData) {
    let input = match state.active_tab {
        TabKind::Network => focused_contact(view_data)
            .map(MessageInput::from)
            .unwrap_or_default(),
        _ => MessageInput::default(),
    };
    view_data.message = Some(MessageUiState {
        input,
        field_index: 0,
        kind: MessageKind::Connect,
        sender: runtime.sender_profile(),
    });
}

fn handle_message_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let Some(message) = view_data.message.as_mut() else {
        return;
    };
    match key.code {
        KeyCode::Esc => view_data.message = None,
        KeyCode::Tab => message.field_index = (message.field_index + 1) % MESSAGE_FIELDS.len(),
        KeyCode::BackTab => {
            message.field_index =
                (message.field_index + MESSAGE_FIELDS.len() - 1) % MESSAGE_FIELDS.len();
        }
        KeyCode::Left => message.shift_kind(-1),
        KeyCode::Right => message.shift_kind(1),
        KeyCode::Backspace => {
            message.field_mut().pop();
        }
        KeyCode::Enter => {
            let text = message.text();
            let notice = match runtime.copy_to_clipboard(&text) {
                Ok(()) => Notice::success("Message copied to clipboard!"),
                Err(error) => {
                    error!("Failed to copy message: {error:#}");
                    Notice::error("Failed to copy message")
                }
            };
            emit_status(state, view_data, internal_tx, notice);
        }
        KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            message.field_mut().push(ch);
        }
        _ => {}
    }
}

fn handle_form_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    match key.code {
        KeyCode::Esc => {
            dispatch_and_refresh(state, runtime, view_data, AppCommand::CancelForm, internal_tx);
        }
        KeyCode::Enter => submit_form(state, runtime, view_data, internal_tx),
        KeyCode::Char('s') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            submit_form(state, runtime, view_data, internal_tx);
        }
        KeyCode::Tab | KeyCode::Down => {
            let status = move_form_field_cursor(state, view_data, 1);
            emit_status(state, view_data, internal_tx, Notice::info(status));
        }
        KeyCode::BackTab | KeyCode::Up => {
            let status = move_form_field_cursor(state, view_data, -1);
            emit_status(state, view_data, internal_tx, Notice::info(status));
        }
        KeyCode::Backspace => edit_form_field(state, view_data, FieldInput::Backspace),
        KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            edit_form_field(state, view_data, FieldInput::Char(ch));
        }
        _ => {}
    }
}

fn move_form_field_cursor(state: &AppState, view_data: &mut ViewData, delta: isize) -> String {
    sync_form_ui_state(state, view_data);
    let Some(mut form) = view_data.form else {
        return "form unavailable".to_owned();
    };
    let fields = form_field_specs(form.kind);
    let len = fields.len() as isize;
    let next = (form.field_index as isize + delta).rem_euclid(len) as usize;
    form.field_index = next;
    view_data.form = Some(form);
    format_form_field_status(form.kind, form.field_index)
}

fn format_form_field_status(kind: FormKind, index: usize) -> String {
    let fields = form_field_specs(kind);
    let spec = fields[index.min(fields.len() - 1)];
    format!("field {} ({}/{})", spec.label, index + 1, fields.len())
}

fn form_field_specs(kind: FormKind) -> &'static [FormFieldSpec] {
    match kind {
        FormKind::SignIn => &SIGN_IN_FIELDS,
        FormKind::SignUp => &SIGN_UP_FIELDS,
        FormKind::Application => &APPLICATION_FIELDS,
        FormKind::Contact => &CONTACT_FIELDS,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldInput {
    Char(char),
    Backspace,
}

/// Applies one keystroke to the focused field. Text fields take any
/// character; the others read it as a command.
fn edit_form_field(state: &mut AppState, view_data: &mut ViewData, input: FieldInput) {
    sync_form_ui_state(state, view_data);
    let Some(form) = view_data.form else {
        return;
    };
    let Some(mut payload) = state.form_payload.clone() else {
        return;
    };
    let spec = form_field_specs(form.kind)[form.field_index];

    let changed = match spec.kind {
        FieldKind::Text | FieldKind::Secret => match form_text_mut(&mut payload, form.field_index)
        {
            Some(text) => {
                match input {
                    FieldInput::Char(ch) => text.push(ch),
                    FieldInput::Backspace => {
                        text.pop();
                    }
                }
                true
            }
            None => false,
        },
        FieldKind::Toggle => match (&mut payload, input) {
            (FormPayload::Application { input, .. }, FieldInput::Char(' ')) => {
                input.active_apps = !input.active_apps;
                true
            }
            _ => false,
        },
        FieldKind::ApplicationStatus => match (&mut payload, input) {
            (FormPayload::Application { input, .. }, FieldInput::Char(ch)) => {
                match next_choice(input.status, ch) {
                    Some(status) => {
                        input.status = status;
                        true
                    }
                    None => false,
                }
            }
            _ => false,
        },
        FieldKind::ContactStatus => match (&mut payload, input) {
            (FormPayload::Contact { input, .. }, FieldInput::Char(ch)) => {
                match next_choice(input.status, ch) {
                    Some(status) => {
                        input.status = status;
                        true
                    }
                    None => false,
                }
            }
            _ => false,
        },
        FieldKind::Date => match (&mut payload, input) {
            (FormPayload::Contact { input, .. }, FieldInput::Char(ch)) => {
                match shift_date(input.date_of_first_contact, ch) {
                    Some(date) => {
                        input.set_first_contact(date);
                        true
                    }
                    None => false,
                }
            }
            _ => false,
        },
        FieldKind::OptionalDate => match (&mut payload, input) {
            (FormPayload::Contact { input, .. }, FieldInput::Char('x'))
            | (FormPayload::Contact { input, .. }, FieldInput::Backspace) => {
                input.second_contact = None;
                true
            }
            (FormPayload::Contact { input, .. }, FieldInput::Char(ch)) => {
                let base = input
                    .second_contact
                    .or_else(|| suggested_second_contact(input.date_of_first_contact));
                match (input.second_contact, base) {
                    (None, Some(suggested)) if date_step(ch).is_some() => {
                        input.second_contact = Some(suggested);
                        true
                    }
                    (Some(_), Some(current)) => match shift_date(current, ch) {
                        Some(date) => {
                            input.second_contact = Some(date);
                            true
                        }
                        None => false,
                    },
                    _ => false,
                }
            }
            _ => false,
        },
    };

    if changed {
        state.dispatch(AppCommand::SetFormPayload(payload));
    }
}

fn form_text_mut(payload: &mut FormPayload, index: usize) -> Option<&mut String> {
    match payload {
        FormPayload::SignIn(input) => match index {
            0 => Some(&mut input.email),
            1 => Some(&mut input.password),
            _ => None,
        },
        FormPayload::SignUp(input) => match index {
            0 => Some(&mut input.email),
            1 => Some(&mut input.password),
            2 => Some(&mut input.confirm_password),
            _ => None,
        },
        FormPayload::Application { input, .. } => match index {
            0 => Some(&mut input.company),
            1 => Some(&mut input.link),
            4 => Some(&mut input.username),
            5 => Some(&mut input.password),
            _ => None,
        },
        FormPayload::Contact { input, .. } => match index {
            0 => Some(&mut input.name),
            2 => Some(&mut input.company),
            3 => Some(&mut input.role),
            4 => Some(&mut input.linkedin_profile),
            5 => Some(&mut input.location),
            8 => Some(&mut input.notes),
            9 => Some(&mut input.action_items),
            _ => None,
        },
    }
}

/// Digits pick a status by position; space steps to the next one.
fn next_choice<S: RecordStatus>(current: S, ch: char) -> Option<S> {
    if ch == ' ' {
        let position = S::ALL.iter().position(|status| *status == current)?;
        return S::ALL.get((position + 1) % S::ALL.len()).copied();
    }
    let number = ch.to_digit(10)? as usize;
    S::ALL.get(number.checked_sub(1)?).copied()
}

fn date_step(ch: char) -> Option<i64> {
    match ch {
        '+' | '=' => Some(1),
        '-' => Some(-1),
        '>' => Some(7),
        '<' => Some(-7),
        _ => None,
    }
}

fn shift_date(date: Date, ch: char) -> Option<Date> {
    date.checked_add(time::Duration::days(date_step(ch)?))
}

fn submit_form<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    let Some(payload) = state.form_payload.clone() else {
        return;
    };
    let events = state.dispatch(AppCommand::SubmitForm);
    if !events
        .iter()
        .any(|event| matches!(event, AppEvent::FormSubmitted(_)))
    {
        note_status_events(view_data, internal_tx, &events);
        return;
    }

    let owner = state.owner().cloned();
    let outcome = match payload {
        FormPayload::SignIn(input) => {
            sign_in(state, runtime, view_data, internal_tx, &input.email, &input.password);
            return;
        }
        FormPayload::SignUp(input) => {
            sign_up(state, runtime, view_data, internal_tx, &input.email, &input.password);
            return;
        }
        FormPayload::Application { id: None, input } => mutation::create(
            runtime,
            owner.as_ref(),
            &mut view_data.applications,
            &input.to_draft(),
        ),
        FormPayload::Application {
            id: Some(id),
            input,
        } => mutation::update(
            runtime,
            owner.as_ref(),
            &mut view_data.applications,
            &id,
            input.to_patch(),
        ),
        FormPayload::Contact { id: None, input } => mutation::create(
            runtime,
            owner.as_ref(),
            &mut view_data.contacts,
            &input.to_draft(),
        ),
        FormPayload::Contact {
            id: Some(id),
            input,
        } => mutation::update(
            runtime,
            owner.as_ref(),
            &mut view_data.contacts,
            &id,
            input.to_patch(),
        ),
    };

    // A failed write keeps the form open so the input can be retried.
    if outcome.is_applied() {
        dispatch_and_refresh(state, runtime, view_data, AppCommand::CancelForm, internal_tx);
        clamp_cursors(view_data);
        reload_detail(state, runtime, view_data, internal_tx);
    }
    report_outcome(state, view_data, internal_tx, &outcome);
}

fn sign_in<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    email: &str,
    password: &str,
) {
    match runtime.sign_in(email.trim(), password) {
        Ok(user) => {
            info!("signed in as {}", user.email);
            let notice = Notice::success(format!("Signed in as {}", user.email));
            start_session(state, runtime, view_data, internal_tx, user);
            emit_status(state, view_data, internal_tx, notice);
        }
        Err(error) => {
            warn!("sign in failed: {error:#}");
            emit_status(
                state,
                view_data,
                internal_tx,
                Notice::error(format!("Sign in failed: {error}")),
            );
        }
    }
}

fn sign_up<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    email: &str,
    password: &str,
) {
    match runtime.sign_up(email.trim(), password) {
        Ok(SignUpResult::ConfirmationRequired) => {
            info!("account created for {}; awaiting confirmation", email.trim());
            dispatch_and_refresh(state, runtime, view_data, AppCommand::CancelForm, internal_tx);
            emit_status(
                state,
                view_data,
                internal_tx,
                Notice::success(
                    "Account created successfully! Please check your email to verify your account.",
                ),
            );
        }
        Ok(SignUpResult::SignedIn(user)) => {
            info!("account created and signed in as {}", user.email);
            start_session(state, runtime, view_data, internal_tx, user);
            emit_status(
                state,
                view_data,
                internal_tx,
                Notice::success("Account created successfully!"),
            );
        }
        Err(error) => {
            error!("Failed to create account: {error:#}");
            emit_status(
                state,
                view_data,
                internal_tx,
                Notice::error("Failed to create account. Please try again."),
            );
        }
    }
}

fn start_session<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    user: SessionUser,
) {
    view_data.reset();
    dispatch_and_refresh(
        state,
        runtime,
        view_data,
        AppCommand::SignedIn(user),
        internal_tx,
    );
}

fn sign_out<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    match runtime.sign_out() {
        Ok(()) => {
            info!("signed out");
            view_data.reset();
            dispatch_and_refresh(state, runtime, view_data, AppCommand::SignedOut, internal_tx);
            emit_status(
                state,
                view_data,
                internal_tx,
                Notice::success("Signed out successfully"),
            );
        }
        Err(error) => {
            error!("Error signing out: {error:#}");
            emit_status(
                state,
                view_data,
                internal_tx,
                Notice::error("Error signing out"),
            );
        }
    }
}

fn dispatch_and_refresh<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    command: AppCommand,
    internal_tx: &Sender<InternalEvent>,
) {
    let events = state.dispatch(command);
    fill_blank_form(state, runtime);
    if events
        .iter()
        .any(|event| matches!(event, AppEvent::TabChanged(_)))
    {
        view_data.detail = None;
        view_data.search_editing = false;
    }
    if should_refresh_view(&events) {
        request_refresh(state, view_data);
    }
    sync_form_ui_state(state, view_data);
    note_status_events(view_data, internal_tx, &events);
}

fn note_status_events(
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    events: &[AppEvent],
) {
    if events
        .iter()
        .any(|event| matches!(event, AppEvent::StatusUpdated(_)))
    {
        view_data.status_token = view_data.status_token.saturating_add(1);
        schedule_status_clear(internal_tx, view_data.status_token);
    }
}

fn should_refresh_view(events: &[AppEvent]) -> bool {
    events.iter().any(|event| {
        matches!(
            event,
            AppEvent::TabChanged(_) | AppEvent::SessionChanged(Some(_))
        )
    })
}

/// Auth forms open without a payload; give them an empty one to type into.
fn fill_blank_form<R: AppRuntime>(state: &mut AppState, runtime: &R) {
    if let AppMode::Form(kind) = state.mode
        && state.form_payload.is_none()
    {
        let payload = FormPayload::blank_for(kind, runtime.today());
        state.dispatch(AppCommand::SetFormPayload(payload));
    }
}

fn sync_form_ui_state(state: &AppState, view_data: &mut ViewData) {
    match state.mode {
        AppMode::Form(kind) => {
            let last = form_field_specs(kind).len().saturating_sub(1);
            let field_index = match view_data.form {
                Some(form) if form.kind == kind => form.field_index.min(last),
                _ => 0,
            };
            view_data.form = Some(FormUiState { kind, field_index });
        }
        AppMode::Nav => view_data.form = None,
    }
}

fn render(frame: &mut ratatui::Frame<'_>, state: &AppState, view_data: &ViewData) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(2),
        ])
        .split(frame.area());

    let selected = TabKind::ALL
        .iter()
        .position(|tab| *tab == state.active_tab)
        .unwrap_or(0);
    let tabs = Tabs::new(TabKind::ALL.iter().map(|tab| tab.label()).collect::<Vec<_>>())
        .block(
            Block::default()
                .title(header_title(state))
                .borders(Borders::ALL),
        )
        .style(Style::default().fg(Color::White))
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .select(selected);
    frame.render_widget(tabs, layout[0]);

    if !state.is_signed_in() {
        let welcome = Paragraph::new(welcome_text())
            .block(Block::default().borders(Borders::ALL).title("welcome"));
        frame.render_widget(welcome, layout[1]);
    } else if let Some(detail) = &view_data.detail {
        let (title, text) = match detail {
            DetailPane::Application(detail) => (
                "application",
                render_application_detail_text(detail),
            ),
            DetailPane::Contact(detail) => ("contact", render_contact_detail_text(detail)),
        };
        let body = Paragraph::new(text)
            .wrap(Wrap { trim: false })
            .block(Block::default().borders(Borders::ALL).title(title));
        frame.render_widget(body, layout[1]);
    } else {
        match state.active_tab {
            TabKind::Dashboard => {
                let body = Paragraph::new(render_dashboard_text(view_data))
                    .block(Block::default().borders(Borders::ALL).title("dashboard"));
                frame.render_widget(body, layout[1]);
            }
            TabKind::Applications => render_table(
                frame,
                layout[1],
                list_title(
                    "applications",
                    &view_data.applications,
                    view_data.search_editing,
                ),
                &APPLICATION_COLUMNS,
                application_rows(&view_data.applications),
                view_data.application_cursor,
                view_data.applications.is_loading(),
            ),
            TabKind::Network => render_table(
                frame,
                layout[1],
                list_title("network", &view_data.contacts, view_data.search_editing),
                &CONTACT_COLUMNS,
                contact_rows(&view_data.contacts),
                view_data.contact_cursor,
                view_data.contacts.is_loading(),
            ),
        }
    }

    let status_color = match state.status.as_ref().map(|notice| notice.level) {
        Some(NoticeLevel::Error) => Color::Red,
        Some(NoticeLevel::Success) => Color::Green,
        _ => Color::Yellow,
    };
    let status_widget = Paragraph::new(status_text(state, view_data))
        .style(Style::default().fg(status_color))
        .block(Block::default().borders(Borders::TOP));
    frame.render_widget(status_widget, layout[2]);

    if let (AppMode::Form(_), Some(payload), Some(form)) =
        (state.mode, &state.form_payload, view_data.form)
    {
        let area = centered_rect(64, 70, frame.area());
        frame.render_widget(Clear, area);
        let overlay = Paragraph::new(render_form_text(payload, form.field_index)).block(
            Block::default()
                .title(form_title(payload))
                .borders(Borders::ALL)
                .style(Style::default().fg(Color::Cyan)),
        );
        frame.render_widget(overlay, area);
    }

    if let Some(message) = &view_data.message {
        let area = centered_rect(80, 80, frame.area());
        frame.render_widget(Clear, area);
        let overlay = Paragraph::new(render_message_text(message))
            .wrap(Wrap { trim: false })
            .block(Block::default().title("messages").borders(Borders::ALL));
        frame.render_widget(overlay, area);
    }

    if let Some(target) = &view_data.confirm_delete {
        let area = centered_rect(48, 20, frame.area());
        frame.render_widget(Clear, area);
        let overlay = Paragraph::new(format!("delete {}?\n\ny confirm | n cancel", target.label()))
            .block(
                Block::default()
                    .title("confirm")
                    .borders(Borders::ALL)
                    .style(Style::default().fg(Color::Red)),
            );
        frame.render_widget(overlay, area);
    }

    if view_data.help_visible {
        let area = centered_rect(80, 72, frame.area());
        frame.render_widget(Clear, area);
        let help = Paragraph::new(help_overlay_text())
            .block(Block::default().title("help").borders(Borders::ALL));
        frame.render_widget(help, area);
    }
}

fn header_title(state: &AppState) -> String {
    match &state.session {
        Some(user) => format!("{APP_TITLE} | {}", user.email),
        None => APP_TITLE.to_owned(),
    }
}

fn welcome_text() -> &'static str {
    "Track job applications and networking contacts.\n\nSign in to continue, or press esc on the sign-in form to create an account."
}

fn render_table(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    title: String,
    columns: &[&str],
    rows: Vec<Vec<String>>,
    selected_row: usize,
    loading: bool,
) {
    let block = Block::default().borders(Borders::ALL).title(title);
    if loading {
        frame.render_widget(Paragraph::new(LOADING_TEXT).block(block), area);
        return;
    }
    if rows.is_empty() {
        frame.render_widget(Paragraph::new("No records. Press a to add one.").block(block), area);
        return;
    }

    let header = Row::new(columns.iter().map(|label| {
        Cell::from(*label).style(
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
    }));
    let table_rows = rows.into_iter().enumerate().map(|(index, cells)| {
        let style = if index == selected_row {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        Row::new(cells.into_iter().map(Cell::from)).style(style)
    });
    let widths = vec![Constraint::Min(8); columns.len().max(1)];
    let table = Table::new(table_rows, widths)
        .header(header)
        .column_spacing(1)
        .block(block);
    frame.render_widget(table, area);
}

fn list_title<R>(label: &str, view: &ListView<R>, search_editing: bool) -> String
where
    R: jobtrack_app::Record + jobtrack_app::Searchable,
{
    let mut parts = vec![
        label.to_owned(),
        format!("status: {}", view.query().filter.label()),
    ];
    if view.query().active_only {
        parts.push("active only".to_owned());
    }
    if search_editing || !view.search_text().is_empty() {
        let cursor = if search_editing { "_" } else { "" };
        parts.push(format!("/{}{cursor}", view.search_text()));
    }
    parts.push(format!("{} shown", view.visible().len()));
    parts.join(" | ")
}

const APPLICATION_COLUMNS: [&str; 7] = [
    "company", "status", "active", "link", "username", "password", "created",
];

const CONTACT_COLUMNS: [&str; 7] = [
    "name",
    "status",
    "company",
    "role",
    "location",
    "first contact",
    "follow up",
];

fn application_rows(view: &ListView<Application>) -> Vec<Vec<String>> {
    view.visible()
        .into_iter()
        .map(|row| {
            vec![
                row.company.clone(),
                row.status.as_str().to_owned(),
                yes_no(row.active_apps).to_owned(),
                row.link.clone(),
                row.username.clone(),
                mask_secret(&row.password),
                format_date(row.created_at.date()),
            ]
        })
        .collect()
}

fn contact_rows(view: &ListView<NetworkContact>) -> Vec<Vec<String>> {
    view.visible()
        .into_iter()
        .map(|row| {
            vec![
                row.name.clone(),
                row.status.as_str().to_owned(),
                row.company.clone(),
                row.role.clone(),
                row.location.clone(),
                format_date(row.date_of_first_contact),
                format_optional_date(row.second_contact),
            ]
        })
        .collect()
}

fn render_dashboard_text(view_data: &ViewData) -> String {
    if view_data.dashboard_loading {
        return LOADING_TEXT.to_owned();
    }
    let dashboard = &view_data.dashboard;
    let mut lines = vec!["recent applications".to_owned()];
    if dashboard.recent_applications.is_empty() {
        lines.push("  no active applications yet".to_owned());
    }
    for row in &dashboard.recent_applications {
        lines.push(format!(
            "  {} | {} | {}",
            row.company,
            row.status.as_str(),
            format_date(row.created_at.date())
        ));
    }
    lines.push(String::new());
    lines.push("recent contacts".to_owned());
    if dashboard.recent_contacts.is_empty() {
        lines.push("  no contacts yet".to_owned());
    }
    for row in &dashboard.recent_contacts {
        lines.push(format!(
            "  {} | {} | {} | {}",
            row.name,
            or_dash(&row.company),
            or_dash(&row.role),
            row.status.as_str()
        ));
    }
    lines.join("\n")
}

fn render_application_detail_text(detail: &ApplicationDetail) -> String {
    let application = &detail.application;
    let mut lines = vec![
        format!("company:   {}", application.company),
        format!("status:    {}", application.status.as_str()),
        format!("active:    {}", yes_no(application.active_apps)),
        format!("link:      {}", or_dash(&application.link)),
        format!("username:  {}", or_dash(&application.username)),
        format!("password:  {}", mask_secret(&application.password)),
        format!("created:   {}", format_date(application.created_at.date())),
        String::new(),
    ];
    if application.company.trim().is_empty() {
        lines.push("contacts: no company set".to_owned());
        return lines.join("\n");
    }
    lines.push(format!("contacts at {}", application.company));
    if detail.related_failed {
        lines.push("  could not load related contacts".to_owned());
    } else if detail.related.is_empty() {
        lines.push("  none yet".to_owned());
    }
    for contact in &detail.related {
        lines.push(format!(
            "  {} | {} | {} | {}",
            contact.name,
            or_dash(&contact.role),
            contact.company,
            contact.status.as_str()
        ));
    }
    lines.join("\n")
}

fn render_contact_detail_text(detail: &ContactDetail) -> String {
    let contact = &detail.contact;
    [
        format!("name:            {}", contact.name),
        format!("status:          {}", contact.status.as_str()),
        format!("company:         {}", or_dash(&contact.company)),
        format!("role:            {}", or_dash(&contact.role)),
        format!("linkedin:        {}", or_dash(&contact.linkedin_profile)),
        format!("location:        {}", or_dash(&contact.location)),
        format!(
            "first contact:   {}",
            format_date(contact.date_of_first_contact)
        ),
        format!(
            "second contact:  {}",
            format_optional_date(contact.second_contact)
        ),
        String::new(),
        "notes".to_owned(),
        indent_block(&contact.notes),
        String::new(),
        "action items".to_owned(),
        indent_block(&contact.action_items),
    ]
    .join("\n")
}

fn form_title(payload: &FormPayload) -> &'static str {
    match (payload.kind(), payload.is_edit()) {
        (FormKind::SignIn, _) => "sign in",
        (FormKind::SignUp, _) => "create account",
        (FormKind::Application, false) => "new application",
        (FormKind::Application, true) => "edit application",
        (FormKind::Contact, false) => "new contact",
        (FormKind::Contact, true) => "edit contact",
    }
}

fn render_form_text(payload: &FormPayload, field_index: usize) -> String {
    let fields = form_field_specs(payload.kind());
    let width = fields
        .iter()
        .map(|spec| spec.label.len())
        .max()
        .unwrap_or(0);
    let mut lines = Vec::with_capacity(fields.len() + 3);
    for (index, spec) in fields.iter().enumerate() {
        let marker = if index == field_index { ">" } else { " " };
        lines.push(format!(
            "{marker} {:<width$}  {}",
            spec.label,
            form_field_display(payload, index),
        ));
    }
    lines.push(String::new());
    lines.push(form_hint(payload, fields[field_index.min(fields.len() - 1)].kind).to_owned());
    lines.join("\n")
}

fn form_hint(payload: &FormPayload, kind: FieldKind) -> &'static str {
    match (payload.kind(), kind) {
        (_, FieldKind::Toggle) => "space toggle | tab next | enter save | esc cancel",
        (_, FieldKind::ApplicationStatus | FieldKind::ContactStatus) => {
            "1-9 pick | space next | tab next | enter save | esc cancel"
        }
        (_, FieldKind::Date) => "+/- day | </> week | tab next | enter save | esc cancel",
        (_, FieldKind::OptionalDate) => {
            "+/- day | </> week | x clear | tab next | enter save | esc cancel"
        }
        (FormKind::SignIn, _) => "enter sign in | esc create an account",
        (FormKind::SignUp, _) => "enter create account | esc back to sign in",
        _ => "type to edit | tab next | enter save | esc cancel",
    }
}

fn form_field_display(payload: &FormPayload, index: usize) -> String {
    match payload {
        FormPayload::SignIn(input) => match index {
            0 => input.email.clone(),
            _ => "*".repeat(input.password.chars().count()),
        },
        FormPayload::SignUp(input) => match index {
            0 => input.email.clone(),
            1 => "*".repeat(input.password.chars().count()),
            _ => "*".repeat(input.confirm_password.chars().count()),
        },
        FormPayload::Application { input, .. } => match index {
            0 => input.company.clone(),
            1 => input.link.clone(),
            2 => yes_no(input.active_apps).to_owned(),
            3 => choice_display(input.status),
            4 => input.username.clone(),
            _ => "*".repeat(input.password.chars().count()),
        },
        FormPayload::Contact { input, .. } => match index {
            0 => input.name.clone(),
            1 => choice_display(input.status),
            2 => input.company.clone(),
            3 => input.role.clone(),
            4 => input.linkedin_profile.clone(),
            5 => input.location.clone(),
            6 => format_date(input.date_of_first_contact),
            7 => format_optional_date(input.second_contact),
            8 => input.notes.clone(),
            _ => input.action_items.clone(),
        },
    }
}

fn choice_display<S: RecordStatus>(current: S) -> String {
    S::ALL
        .iter()
        .enumerate()
        .map(|(index, status)| {
            if *status == current {
                format!("[{}]", status.as_str())
            } else {
                format!("{}:{}", index + 1, status.as_str())
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn render_message_text(message: &MessageUiState) -> String {
    let mut lines = Vec::new();
    let values = [
        &message.input.name,
        &message.input.company,
        &message.input.role,
    ];
    for (index, (label, value)) in MESSAGE_FIELDS.iter().zip(values).enumerate() {
        let marker = if index == message.field_index { ">" } else { " " };
        lines.push(format!("{marker} {label:<8} {value}"));
    }
    lines.push(String::new());
    lines.push(
        MessageKind::ALL
            .iter()
            .map(|kind| {
                if *kind == message.kind {
                    format!("[{}]", kind.label())
                } else {
                    kind.label().to_owned()
                }
            })
            .collect::<Vec<_>>()
            .join("  "),
    );
    lines.push(String::new());
    lines.push(message.text());
    lines.push(String::new());
    lines.push("tab field | left/right message | enter copy | esc close".to_owned());
    lines.join("\n")
}

fn status_text(state: &AppState, view_data: &ViewData) -> String {
    if view_data.help_visible {
        return String::new();
    }

    let mode = match state.mode {
        AppMode::Nav => "NAV",
        AppMode::Form(_) => "FORM",
    };
    let hints = match (state.mode, view_data.form) {
        (AppMode::Form(_), Some(form)) => format!(
            "{} | tab/shift+tab | enter save | esc cancel",
            format_form_field_status(form.kind, form.field_index)
        ),
        _ if view_data.message.is_some() => "left/right | enter copy | esc close".to_owned(),
        _ if view_data.confirm_delete.is_some() => "y/n".to_owned(),
        _ if view_data.search_editing => "type to search | enter keep | esc clear".to_owned(),
        _ if view_data.detail.is_some() => {
            "esc back | e edit | d del | t active | m msg | r reload | ?".to_owned()
        }
        _ => "tab | j/k | enter open | / search | s status | A active | a/e/d | t | m | L | ? | ctrl+q"
            .to_owned(),
    };
    match &state.status {
        Some(notice) => format!("{mode} | {} | {hints}", notice.message),
        None => format!("{mode} | {hints}"),
    }
}

fn help_overlay_text() -> &'static str {
    "global:\n  ctrl+q           quit\n  ?                toggle help\n\nnav:\n  tab/shift+tab    switch dashboard / applications / network\n  j/k g/G          move selection\n  enter            open detail\n  esc              close detail or clear search\n  /                search loaded rows\n  s                cycle status filter\n  A                applications: active only on/off\n  a                add record\n  e                edit record\n  d                delete record (asks first)\n  t                applications: toggle active\n  m                message generator\n  r                reload\n  L                sign out\n\nform:\n  tab/shift+tab    move between fields\n  1-9 / space      pick status, toggle active\n  + - < >          shift dates by a day or a week\n  x                clear follow-up date\n  enter / ctrl+s   save\n  esc              cancel (sign-in: switch to create account)\n\nmessages:\n  tab              next field\n  left/right       choose message\n  enter            copy to clipboard"
}

fn mask_secret(value: &str) -> String {
    if value.is_empty() {
        String::new()
    } else {
        SECRET_MASK.to_owned()
    }
}

fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}

fn or_dash(value: &str) -> &str {
    if value.trim().is_empty() { "-" } else { value }
}

fn indent_block(value: &str) -> String {
    if value.trim().is_empty() {
        return "  -".to_owned();
    }
    value
        .lines()
        .map(|line| format!("  {line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_date(date: Date) -> String {
    format!(
        "{:04}-{:02}-{:02}",
        date.year(),
        u8::from(date.month()),
        date.day()
    )
}

fn format_optional_date(date: Option<Date>) -> String {
    date.map(format_date).unwrap_or_else(|| "-".to_owned())
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
