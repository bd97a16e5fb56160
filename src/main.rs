use clap::{Parser, Subcommand};
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use eventlagbe::api::VerificationTarget;
use eventlagbe::events::services::organization_names;
use eventlagbe::events::{fetch_events_by_ids, load_catalog, partition};
use eventlagbe::profiles::fields::PROFILE_NOT_FOUND;
use eventlagbe::profiles::services::resolve_current_user;
use eventlagbe::profiles::{ProfileLoader, ProfileScreen, Role, Tab};
use eventlagbe::state::AppState;

#[derive(Parser)]
#[command(author, version, about = "Event Lagbe backend client", long_about = None)]
struct Cli {
    /// Firebase uid of the signed-in account viewing profiles
    #[arg(long, global = true)]
    viewer: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Load a profile by role and Firebase uid
    Profile {
        role: Role,
        uid: String,
        /// Also render this tab
        #[arg(long)]
        tab: Option<Tab>,
    },
    /// Load a profile by Firebase uid alone
    Public {
        uid: String,
        #[arg(long)]
        tab: Option<Tab>,
    },
    /// Fetch events by id and split them into running and past
    Events { ids: Vec<String> },
    /// First page of events with skill names resolved
    Catalog,
    /// Events a participant has attended
    PastEvents { uid: String },
    /// An organizer's events, or who registered for one of them
    Registrations {
        uid: String,
        #[arg(long)]
        event: Option<String>,
        #[arg(long, default_value_t = 0, requires = "event")]
        page: u32,
        /// Print the participants as CSV instead
        #[arg(long, requires = "event")]
        export: bool,
    },
    /// Search organizations and organizers by name
    Directory { query: String },
    /// List accounts awaiting verification
    Verify {
        #[arg(long)]
        organizers: bool,
    },
    Approve {
        #[arg(long)]
        organizers: bool,
        #[arg(required = true)]
        ids: Vec<String>,
    },
    Reject {
        #[arg(long)]
        organizers: bool,
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Run the expired-event deactivation job now
    DeactivateExpired,
}

fn target(organizers: bool) -> VerificationTarget {
    if organizers {
        VerificationTarget::Organizer
    } else {
        VerificationTarget::Organization
    }
}

fn print<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn show_profile(
    state: &AppState,
    loader: &ProfileLoader,
    viewer: Option<&str>,
    tab: Option<Tab>,
) -> anyhow::Result<()> {
    let screen = loader.screen();
    let ProfileScreen::Ready(loaded) = &screen else {
        print(&screen)?;
        anyhow::bail!(PROFILE_NOT_FOUND);
    };
    let Some(tab) = tab else {
        return print(&screen);
    };

    let viewer = match viewer {
        Some(uid) => Some(resolve_current_user(&state.api, uid).await?),
        None => None,
    };
    let mut view = state.profile_view(loaded.role, loaded.saved.clone(), viewer.as_ref());
    if let Some(handle) = view.select_tab(tab)? {
        handle.await?;
    }
    print(&serde_json::json!({
        "badge": view.badge().label(),
        "follow": view.follow(),
        "content": view.content(),
    }))
}

async fn decide(state: &AppState, organizers: bool, ids: &[String], approve: bool) -> anyhow::Result<()> {
    let queue = state.verification_queue(target(organizers));
    queue.load().await;
    for id in ids {
        queue.toggle_select(id);
    }
    let ok = if approve {
        queue.approve_selected().await
    } else {
        queue.reject_selected().await
    };
    print(&queue.snapshot())?;
    if !ok {
        anyhow::bail!("verification action failed");
    }
    Ok(())
}

async fn registrations(
    state: &AppState,
    uid: &str,
    event: Option<&str>,
    page: u32,
    export: bool,
) -> anyhow::Result<()> {
    let list = state.registration_list(uid);
    list.load_events().await;
    let Some(event) = event else {
        return print(&list.events_panel());
    };

    list.select_event(event).await;
    if export {
        let Some(csv) = list.export_csv().await else {
            anyhow::bail!("nothing to export");
        };
        eprintln!("{}", list.export_file_name());
        println!("{csv}");
        return Ok(());
    }
    if page > 0 && !list.go_to_page(page).await {
        anyhow::bail!("page {page} is out of range");
    }
    print(&list.participants())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter =
        std::env::var("RUST_LOG").unwrap_or_else(|_| "eventlagbe=info,reqwest=warn".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init();
    }

    let cli = Cli::parse();
    let state = AppState::init()?;

    match cli.command {
        Command::Profile { role, uid, tab } => {
            let loader = state.profile_loader();
            loader.load(role, &uid).await;
            show_profile(&state, &loader, cli.viewer.as_deref(), tab).await?;
        }
        Command::Public { uid, tab } => {
            let loader = state.profile_loader();
            loader.load_public(&uid).await;
            show_profile(&state, &loader, cli.viewer.as_deref(), tab).await?;
        }
        Command::Events { ids } => {
            let events = fetch_events_by_ids(&state.api, &ids, &CancellationToken::new()).await;
            print(&partition(events))?;
        }
        Command::Catalog => match load_catalog(&state.api, state.config.events_page_size).await {
            Ok(catalog) => {
                let organizations = organization_names(&state.api).await;
                print(&serde_json::json!({
                    "events": catalog.events,
                    "skills": catalog.skill_names,
                    "organizations": organizations,
                }))?
            }
            Err(message) => {
                state.notices.error(message.clone());
                anyhow::bail!(message);
            }
        },
        Command::PastEvents { uid } => {
            let past = state.past_events(&uid);
            past.load().await;
            print(&past.panel())?;
        }
        Command::Registrations {
            uid,
            event,
            page,
            export,
        } => registrations(&state, &uid, event.as_deref(), page, export).await?,
        Command::Directory { query } => {
            let search = state.directory_search();
            search.search(&query).await;
            print(&search.snapshot())?;
        }
        Command::Verify { organizers } => {
            let queue = state.verification_queue(target(organizers));
            queue.load().await;
            print(&queue.snapshot())?;
        }
        Command::Approve { organizers, ids } => decide(&state, organizers, &ids, true).await?,
        Command::Reject { organizers, ids } => decide(&state, organizers, &ids, false).await?,
        Command::DeactivateExpired => {
            let task = state.expired_events_task();
            let ok = task.trigger().await;
            print(&task.status())?;
            if !ok {
                anyhow::bail!("deactivation task failed");
            }
        }
    }

    Ok(())
}
