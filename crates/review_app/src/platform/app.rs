use std::collections::VecDeque;
use std::fs;
use std::future::Future;
use std::io::{self, Write};
use std::time::Duration;

use anyhow::{bail, Context};
use clap::Parser;
use log::LevelFilter;
use review_core::{update, Choice, Msg, ReviewPhase, ReviewState, Viewport};
use review_engine::{
    mask_key, ClientSettings, CredentialConfig, CredentialStore, EngineHandle, PollSettings,
    Provider, ReqwestTaskClient, TaskQuery,
};
use review_logging::{review_info, review_warn};

use super::cli::{AcceptPolicy, Cli, Command, EditArgs, KeyAction, TasksArgs};
use super::effects::{msg_from_event, EffectRunner};
use super::logging::{self, LogDestination};
use super::persistence::FileStore;
use super::ui::constants::EVENT_WAIT_MS;
use super::ui::render::{self, TerminalRenderer};

pub fn run_app() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let (destination, level) = if cli.verbose {
        (LogDestination::Both, LevelFilter::Debug)
    } else {
        (LogDestination::File, LevelFilter::Info)
    };
    logging::initialize(destination, level);
    review_info!("review_app starting");

    let store = FileStore::open(&cli.config)
        .with_context(|| format!("reading settings from {}", cli.config.display()))?;
    let mut credentials = CredentialStore::load(store)?;
    let settings = match &cli.server {
        Some(url) => ClientSettings::with_base_url(url.clone()),
        None => ClientSettings::default(),
    };

    match cli.command {
        Command::Edit(args) => run_edit(settings, credentials.config().clone(), args),
        Command::Headings { article } => {
            let client = ReqwestTaskClient::new(settings)?;
            let headings = block_on(client.section_headings(&article))??;
            print_lines(&render::format_headings(&headings))
        }
        Command::Tasks(args) => {
            let client = ReqwestTaskClient::new(settings)?;
            let page = block_on(client.list_tasks(&task_query(args)))??;
            print_lines(&render::format_task_page(&page))
        }
        Command::Task { id } => {
            let client = ReqwestTaskClient::new(settings)?;
            let detail = block_on(client.task_detail(&id))??;
            print_lines(&render::format_task_detail(&detail))
        }
        Command::Key { action } => run_key(&mut credentials, action),
    }
}

fn block_on<F: Future>(future: F) -> anyhow::Result<F::Output> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("starting async runtime")?;
    Ok(runtime.block_on(future))
}

fn task_query(args: TasksArgs) -> TaskQuery {
    TaskQuery {
        page: args.page,
        page_size: args.page_size,
        status: args.status,
        editing_mode: args.mode,
        date_from: args.from,
        date_to: args.to,
    }
}

fn print_lines(lines: &[String]) -> anyhow::Result<()> {
    let mut stdout = io::stdout().lock();
    for line in lines {
        writeln!(stdout, "{line}")?;
    }
    Ok(())
}

fn run_key<S: review_engine::KeyValueStore>(
    credentials: &mut CredentialStore<S>,
    action: KeyAction,
) -> anyhow::Result<()> {
    match action {
        KeyAction::Set { provider, key } => {
            credentials.set_key(provider, &key)?;
            println!("{provider}: {}", mask_key(&key));
        }
        KeyAction::Clear { provider } => {
            credentials.clear_key(provider)?;
            println!("{provider}: cleared");
        }
        KeyAction::Use { provider } => {
            credentials.select_provider(provider.provider())?;
            match provider.provider() {
                Some(provider) => println!("using {provider}"),
                None => println!("using the first configured provider"),
            }
        }
        KeyAction::Show => print_lines(&describe_credentials(credentials.config()))?,
    }
    Ok(())
}

fn describe_credentials(config: &CredentialConfig) -> Vec<String> {
    let mut lines: Vec<String> = Provider::ALL
        .into_iter()
        .map(|provider| {
            let key = config
                .keys
                .get(&provider)
                .map(|key| mask_key(key))
                .unwrap_or_else(|| "-".to_string());
            let marker = if config.selected == Some(provider) { "*" } else { " " };
            format!("{marker} {:<10} {key}", provider.as_str())
        })
        .collect();
    if let Ok(active) = config.active_credential() {
        lines.push(format!("requests use {}", active.provider));
    }
    lines
}

fn run_edit(
    settings: ClientSettings,
    credentials: CredentialConfig,
    args: EditArgs,
) -> anyhow::Result<()> {
    let engine = EngineHandle::new(settings, credentials, PollSettings::default())?;
    let mut session = ReviewSession::new(EffectRunner::new(engine, args.output.clone()));

    session.dispatch(Msg::ModeChanged(args.mode))?;
    if let Some(path) = &args.content_file {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        session.dispatch(Msg::ContentChanged(content))?;
    } else {
        session.dispatch(Msg::ArticleTitleChanged(
            args.article.clone().unwrap_or_default(),
        ))?;
        session.dispatch(Msg::SectionTitleChanged(
            args.section.clone().unwrap_or_default(),
        ))?;
    }
    session.dispatch(Msg::SubmitClicked)?;
    session.wait_for_result()?;

    session.apply_accept_policy(&args.accept)?;
    session.print_review(args.rows)?;

    if args.copy {
        session.dispatch(Msg::CopyClicked)?;
        if !session.state.copied() {
            eprintln!("Clipboard copy is not available on this terminal.");
        }
    }
    session.dispatch(Msg::ExportClicked)?;
    for summary in session.runner.exported() {
        eprintln!("Wrote {} ({} bytes)", summary.path.display(), summary.bytes);
    }
    Ok(())
}

/// One review, from submission to export. Dropping it closes the view.
struct ReviewSession {
    state: ReviewState,
    runner: EffectRunner,
    last_status: Option<String>,
}

impl ReviewSession {
    fn new(runner: EffectRunner) -> Self {
        Self {
            state: ReviewState::new(),
            runner,
            last_status: None,
        }
    }

    fn dispatch(&mut self, msg: Msg) -> anyhow::Result<()> {
        let mut inbox = VecDeque::from([msg]);
        while let Some(msg) = inbox.pop_front() {
            let state = std::mem::take(&mut self.state);
            let (state, effects) = update(state, msg);
            self.state = state;
            inbox.extend(self.runner.run(effects)?);
            if self.state.consume_dirty() {
                self.report_status();
            }
        }
        Ok(())
    }

    fn report_status(&mut self) {
        let status = render::status_line(&self.state.view());
        if status.is_some() && status != self.last_status {
            if let Some(line) = &status {
                eprintln!("{line}");
            }
        }
        self.last_status = status;
    }

    fn wait_for_result(&mut self) -> anyhow::Result<()> {
        let wait = Duration::from_millis(EVENT_WAIT_MS);
        loop {
            match self.state.phase() {
                ReviewPhase::Ready => return Ok(()),
                ReviewPhase::Failed { message, .. } => bail!("{message}"),
                ReviewPhase::Idle => {
                    let view = self.state.view();
                    bail!(view
                        .inline_error
                        .unwrap_or_else(|| "Nothing was submitted.".to_string()));
                }
                ReviewPhase::Submitting | ReviewPhase::Polling { .. } => {}
            }
            if let Some(event) = self.runner.engine().recv_timeout(wait) {
                self.dispatch(msg_from_event(event))?;
            }
        }
    }

    fn apply_accept_policy(&mut self, policy: &AcceptPolicy) -> anyhow::Result<()> {
        match policy {
            AcceptPolicy::All => self.dispatch(Msg::SelectAll(Choice::After)),
            AcceptPolicy::None => self.dispatch(Msg::SelectAll(Choice::Before)),
            AcceptPolicy::Indices(indices) => {
                for index in indices {
                    if !self.state.selections().is_changed_index(*index) {
                        review_warn!("paragraph {} has no proposed edit", index);
                        eprintln!("Paragraph {index} has no proposed edit; ignored.");
                        continue;
                    }
                    self.dispatch(Msg::SelectionChanged {
                        index: *index,
                        choice: Choice::After,
                    })?;
                }
                Ok(())
            }
        }
    }

    /// Prints the review list one viewport at a time so only the visible
    /// window is ever rendered.
    fn print_review(&mut self, rows: u32) -> anyhow::Result<()> {
        let height = rows.max(1);
        let mut top = 0;
        loop {
            self.dispatch(Msg::ViewportChanged { top, height })?;
            let list = self.state.list();
            let viewport = Viewport {
                overscan: 0,
                ..self.state.viewport()
            };
            let mut renderer = TerminalRenderer::new(self.state.selections());
            let window = list.materialize(viewport, &mut renderer);
            let Some((last_key, _)) = window.last() else {
                break;
            };
            let next_top = list
                .index_of(*last_key)
                .map(|index| list.item_top(index + 1))
                .unwrap_or_else(|| list.total_height());
            let total = list.total_height();

            let lines: Vec<String> = window.into_iter().flat_map(|(_, row)| row).collect();
            print_lines(&lines)?;

            if next_top >= total || next_top <= top {
                break;
            }
            top = next_top;
        }
        Ok(())
    }
}

impl Drop for ReviewSession {
    fn drop(&mut self) {
        if let Err(err) = self.dispatch(Msg::ViewClosed) {
            review_warn!("closing review failed: {}", err);
        }
    }
}
