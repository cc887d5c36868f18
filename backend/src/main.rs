//! `canteen` command-line front end.
//!
//! Opens one month of reservations from the data directory, applies the
//! requested change as the selected participant and reports counts and
//! rosters on stdout. Logs go to stderr.

use std::ffi::OsString;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use canteen::domain::{
    CanteenSession, DayOverview, GuardRejection, IdentityRegistry, LunchSlot, MonthKey, Outcome,
    Person, RosterCategory, SaveStatus, SelectionController, fetch_seed,
};
use canteen::outbound::names::HttpNameSource;
use canteen::outbound::persistence::{DataDir, JsonFileMonthRepository, JsonFileNamesRepository};
use canteen::outbound::publish::GitHubContentsPublisher;
use canteen::settings::{CanteenSettings, GITHUB_TOKEN_ENV, github_token};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use color_eyre::eyre::{Context, Result, eyre};
use mockable::{Clock, DefaultClock, DefaultEnv, Env};
use ortho_config::OrthoConfig;
use tokio::runtime::Builder;
use tracing::{info, warn};
use zeroize::Zeroizing;
use tracing_subscriber::{EnvFilter, fmt};

type Session = CanteenSession<JsonFileMonthRepository, JsonFileNamesRepository>;

const PUBLISH_TIMEOUT_SECS: u64 = 15;

/// `canteen` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "canteen",
    about = "Book weekday lunches: vegetarian meals and 11:45 or 12:30 sittings",
    version
)]
struct CliArgs {
    /// Month to open, as `YYYY-MM`. Defaults to the month of the date
    /// argument, then to the current month.
    #[arg(long, value_name = "YYYY-MM", global = true)]
    month: Option<String>,
    /// Act as this participant, registering them when unknown.
    #[arg(long = "as", value_name = "name", global = true)]
    actor: Option<String>,
    /// Directory holding the JSON blobs.
    #[arg(long = "data-dir", value_name = "path", global = true)]
    data_dir: Option<PathBuf>,
    /// Hour from which today's choices lock.
    #[arg(long = "cutoff-hour", value_name = "hour", global = true)]
    cutoff_hour: Option<u32>,
    /// Published `names.json` used to seed the participant list.
    #[arg(long = "names-url", value_name = "url", global = true)]
    names_url: Option<String>,
    /// Emit logs as JSON.
    #[arg(long = "log-json", global = true)]
    log_json: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Search or register participants.
    Names {
        #[command(subcommand)]
        action: NamesCommand,
    },
    /// Show the remembered participant.
    Whoami,
    /// Toggle a vegetarian meal for a weekday.
    Veg {
        /// Weekday as `YYYY-MM-DD`.
        date: NaiveDate,
    },
    /// Choose a sitting; choosing the held sitting again releases it.
    Slot {
        /// Weekday as `YYYY-MM-DD`.
        date: NaiveDate,
        /// `1145`, `1230` or `none`.
        slot: LunchSlot,
    },
    /// Counts for every weekday of the month.
    Calendar,
    /// Rosters for one weekday.
    Roster {
        /// Weekday as `YYYY-MM-DD`.
        date: NaiveDate,
        /// Print a single sheet: `vegetarian`, `1145` or `1230`.
        #[arg(long)]
        category: Option<RosterCategory>,
    },
    /// Save the month and commit it to the configured GitHub repository.
    Publish,
    /// Reload and report whenever another process saves the month.
    Watch {
        /// Seconds between checks.
        #[arg(long = "interval-secs", default_value_t = 2)]
        interval_secs: u64,
    },
}

#[derive(Debug, Clone, Subcommand)]
enum NamesCommand {
    /// List participants whose name contains the query.
    Search {
        /// Case-insensitive fragment.
        query: String,
    },
    /// Register a participant and remember them as the actor.
    Add {
        /// Display name.
        name: String,
    },
}

impl Command {
    const fn date(&self) -> Option<NaiveDate> {
        match self {
            Self::Veg { date } | Self::Slot { date, .. } | Self::Roster { date, .. } => Some(*date),
            _ => None,
        }
    }
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = CliArgs::parse();
    let settings = load_settings(&args)?;
    init_tracing(settings.log_json);
    settings.validate()?;

    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .wrap_err("failed to build runtime")?;
    runtime.block_on(async_main(&args, &settings))
}

fn load_settings(args: &CliArgs) -> Result<CanteenSettings> {
    let mut settings = CanteenSettings::load_from_iter([OsString::from("canteen")])
        .map_err(|err| eyre!("failed to load configuration: {err}"))?;
    if let Some(path) = &args.data_dir {
        settings.data_dir = Some(path.clone());
    }
    if let Some(hour) = args.cutoff_hour {
        settings.cutoff_hour = Some(hour);
    }
    if let Some(url) = &args.names_url {
        settings.names_url = Some(url.clone());
    }
    settings.log_json |= args.log_json;
    Ok(settings)
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = fmt().with_env_filter(filter).with_writer(io::stderr);
    let result = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    if let Err(e) = result {
        warn!(error = %e, "tracing init failed");
    }
}

async fn async_main(args: &CliArgs, settings: &CanteenSettings) -> Result<()> {
    let data_dir = settings.data_dir()?;
    let data = DataDir::open(&data_dir)
        .with_context(|| format!("failed to open data directory {data_dir}"))?;
    let names = Arc::new(JsonFileNamesRepository::new(data.clone()));
    let months = Arc::new(JsonFileMonthRepository::new(data));

    let seed = load_seed(settings).await?;
    let identity = IdentityRegistry::load(names, seed, settings.suggestion_limit()?);

    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let month = resolve_month(args, clock.local().date_naive());
    let controller = SelectionController::new(settings.edit_window()?, clock);
    let mut session = CanteenSession::open(months, identity, controller, month);
    if let Some(name) = args.actor.as_deref() {
        session.select_actor(name)?;
    }

    let mut out = io::stdout().lock();
    match &args.command {
        Command::Names { action } => run_names(&mut session, action, &mut out),
        Command::Whoami => write_actor(session.actor(), &mut out),
        Command::Veg { date } => {
            let toggle = session.toggle_vegetarian(*date)?;
            save_if_applied(&mut session, toggle.outcome)?;
            let state = session.own_choice(*date).is_some_and(|own| own.vegetarian);
            write_outcome(toggle.outcome, &mut out)?;
            writeln!(
                out,
                "{date} vegetarian: {}; {} vegetarian meals",
                if state { "yes" } else { "no" },
                toggle.count
            )?;
            Ok(())
        }
        Command::Slot { date, slot } => {
            let selection = session.select_slot(*date, *slot)?;
            save_if_applied(&mut session, selection.outcome)?;
            let held = session.own_choice(*date).map_or(LunchSlot::None, |own| own.slot);
            write_outcome(selection.outcome, &mut out)?;
            writeln!(
                out,
                "{date} sitting: {held}; 11:45 ({}) 12:30 ({})",
                selection.counts.slot_1145, selection.counts.slot_1230
            )?;
            Ok(())
        }
        Command::Calendar => {
            writeln!(out, "{}", session.month())?;
            for day in session.overview() {
                write_overview(&day, &mut out)?;
            }
            Ok(())
        }
        Command::Roster { date, category } => {
            let text = match category {
                Some(wanted) => session.roster_sheet(*date, *wanted).to_plain_text(),
                None => session.day_rosters(*date).to_plain_text(),
            };
            write!(out, "{text}")?;
            Ok(())
        }
        Command::Publish => publish(&mut session, settings, &mut out).await,
        Command::Watch { interval_secs } => {
            watch(&mut session, Duration::from_secs((*interval_secs).max(1)), &mut out).await
        }
    }
}

/// Month to open: `--month`, else the date argument's month, else today's.
///
/// An unparseable `--month` is logged and ignored.
fn resolve_month(args: &CliArgs, today: NaiveDate) -> MonthKey {
    let fallback = MonthKey::containing(args.command.date().unwrap_or(today));
    match args.month.as_deref().map(str::parse::<MonthKey>) {
        Some(Ok(month)) => month,
        Some(Err(error)) => {
            warn!(%error, %fallback, "ignoring --month");
            fallback
        }
        None => fallback,
    }
}

async fn load_seed(settings: &CanteenSettings) -> Result<Option<Vec<Person>>> {
    let Some(url) = settings.names_url()? else {
        return Ok(None);
    };
    let source = HttpNameSource::new(url, settings.names_timeout())
        .wrap_err("failed to build names client")?;
    Ok(fetch_seed(&source).await)
}

fn run_names(session: &mut Session, action: &NamesCommand, out: &mut impl Write) -> Result<()> {
    match action {
        NamesCommand::Search { query } => {
            let matches = session.identity().find_by_name(query);
            if matches.is_empty() {
                writeln!(out, "no participant matches {query:?}")?;
            }
            for person in matches {
                writeln!(out, "{}\t{}", person.name(), person.id())?;
            }
            Ok(())
        }
        NamesCommand::Add { name } => {
            let person = session.select_actor(name)?;
            writeln!(out, "selected {} ({})", person.name(), person.id())?;
            Ok(())
        }
    }
}

fn write_actor(actor: Option<&Person>, out: &mut impl Write) -> Result<()> {
    match actor {
        Some(person) => writeln!(out, "{} ({})", person.name(), person.id())?,
        None => writeln!(out, "no participant selected; pass --as <name>")?,
    }
    Ok(())
}

fn save_if_applied(session: &mut Session, outcome: Outcome) -> Result<()> {
    if outcome.is_applied() {
        session.save().wrap_err("failed to save reservations")?;
    }
    Ok(())
}

fn write_outcome(outcome: Outcome, out: &mut impl Write) -> Result<()> {
    match outcome {
        Outcome::Applied => {}
        Outcome::Rejected(GuardRejection::NoActor) => {
            writeln!(out, "not changed: select a participant with --as <name>")?;
        }
        Outcome::Rejected(GuardRejection::Locked) => {
            writeln!(out, "not changed: this day is locked")?;
        }
    }
    Ok(())
}

fn write_overview(day: &DayOverview, out: &mut impl Write) -> Result<()> {
    let own = day.own.map_or_else(String::new, |choice| {
        let veg = if choice.vegetarian { " veg" } else { "" };
        format!("  me: {}{veg}", choice.slot)
    });
    let lock = if day.editable { "" } else { "  locked" };
    writeln!(
        out,
        "{} {}  veg {:>2}  11:45 {:>2}  12:30 {:>2}{own}{lock}",
        day.date,
        day.date.format("%a"),
        day.counts.vegetarian,
        day.counts.slot_1145,
        day.counts.slot_1230,
    )?;
    Ok(())
}

async fn publish(
    session: &mut Session,
    settings: &CanteenSettings,
    out: &mut impl Write,
) -> Result<()> {
    let target = settings
        .github_target()
        .ok_or_else(|| eyre!("set CANTEEN_GITHUB_OWNER and CANTEEN_GITHUB_REPO to publish"))?;
    let token = publish_token(&DefaultEnv::new())?;
    let publisher =
        GitHubContentsPublisher::new(target, token, Duration::from_secs(PUBLISH_TIMEOUT_SECS))?;
    let receipt = session.publish(&publisher).await?;
    writeln!(out, "published {} to {}", session.month(), receipt.location)?;
    Ok(())
}

fn publish_token(env: &impl Env) -> Result<Zeroizing<String>> {
    github_token(env).ok_or_else(|| eyre!("set {GITHUB_TOKEN_ENV} to publish"))
}

async fn watch(session: &mut Session, interval: Duration, out: &mut impl Write) -> Result<()> {
    session.on_external_change(|change, store| {
        let booked: usize = store
            .month()
            .weekdays()
            .into_iter()
            .map(|date| {
                let counts = store.counts(date);
                counts.slot_1145 + counts.slot_1230
            })
            .sum();
        info!(month = %change.month, booked, "reservations changed elsewhere");
    });
    writeln!(out, "watching {}; press Ctrl-C to stop", session.month())?;
    out.flush()?;
    loop {
        tokio::time::sleep(interval).await;
        if let Some(change) = session.poll_external_changes() {
            if change.discarded_unsaved {
                writeln!(out, "unsaved changes were replaced by a newer save")?;
            }
            for day in session.overview() {
                write_overview(&day, out)?;
            }
            out.flush()?;
        }
        if session.status() == SaveStatus::Unsaved {
            warn!(month = %session.month(), "unsaved changes while watching");
        }
    }
}
