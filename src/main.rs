use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{Instrument, error, info, span};
use tracing_subscriber::EnvFilter;

use country_explorer::browse;
use country_explorer::clock::SystemClock;
use country_explorer::config::Config;
use country_explorer::countries::{CountryClient, CountryRecord};
use country_explorer::error::AppError;
use country_explorer::live_timer::{COUNTRY_NOT_FOUND, LiveTimer};
use country_explorer::session::Session;

const HELP: &str = "\
Commands:
  type <text>       type into the search field (suggestions appear after a pause)
  suggestions       show the current suggestion list
  pick <n>          show the time for suggestion number n
  show <country>    show the live time for a country
  time              show the current result card
  watch <seconds>   print the live clock for a while
  stop              stop the live clock
  search <query>    list matching countries
  detail <country>  show country details
  login <email>     log in
  logout            log out
  fav <country>     add or remove a favorite (login required)
  favorites         list favorites
  help              show this help
  exit              quit";

/// Everything a command can touch.
struct App {
    client: Arc<CountryClient>,
    timer: LiveTimer<CountryClient>,
    session: Session,
}

/// Reads commands from stdin until `exit`. The live clock and the suggestion
/// debouncer keep running between commands on the same single-threaded runtime.
#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = Config::from_env()?;
    info!("Using country service at {}", config.api_base_url);

    let client = Arc::new(CountryClient::new(
        &config.api_base_url,
        config.http_timeout,
    )?);
    let timer = LiveTimer::new(Arc::clone(&client), &config, Arc::new(SystemClock));

    // print suggestions as soon as a lookup publishes them
    let mut suggestions = timer.subscribe_suggestions();
    tokio::spawn(async move {
        while suggestions.changed().await.is_ok() {
            let state = suggestions.borrow_and_update().clone();
            if !state.loading && !state.names.is_empty() {
                println!();
                print_suggestions(&state.names);
                prompt();
            }
        }
    });

    let mut app = App {
        client,
        timer,
        session: Session::new(),
    };

    println!("Country Explorer live timer. Type `help` for commands, `exit` to stop.");
    prompt();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line == "exit" {
            break;
        }
        if line.is_empty() {
            prompt();
            continue;
        }

        let (command, arg) = match line.split_once(char::is_whitespace) {
            Some((command, arg)) => (command, arg.trim()),
            None => (line, ""),
        };

        let result = run_command(&mut app, command, arg)
            .instrument(span!(tracing::Level::INFO, "command", name = command))
            .await;
        if let Err(e) = result {
            error!("Command {} failed: {}", command, e);
            println!("{}", user_message(&e));
        }

        prompt();
    }

    app.timer.close();
    info!("Bye");
    Ok(())
}

async fn run_command(app: &mut App, command: &str, arg: &str) -> Result<(), AppError> {
    match command {
        "help" => println!("{HELP}"),
        "type" => app.timer.type_query(arg),
        "suggestions" => {
            let state = app.timer.suggestions();
            if app.timer.suggestions_pending() || state.loading {
                println!("Loading...");
            } else if state.names.is_empty() {
                println!("No suggestions.");
            } else {
                print_suggestions(&state.names);
            }
        }
        "pick" => {
            let picked = match arg.parse::<usize>() {
                Ok(n) if n > 0 => app.timer.pick_suggestion(n - 1).await,
                _ => false,
            };
            if !picked {
                println!("No suggestion number {:?}.", arg);
                return Ok(());
            }
            println!("{}", app.timer.render_card());
        }
        "show" => {
            app.timer.show_time(arg).await;
            println!("{}", app.timer.render_card());
        }
        "time" => println!("{}", app.timer.render_card()),
        "watch" => {
            let secs = arg.parse().unwrap_or(5);
            watch_clock(&app.timer, Duration::from_secs(secs)).await;
        }
        "stop" => app.timer.close(),
        "search" => match app.client.fetch_by_name(arg).await {
            Ok(records) if !records.is_empty() => {
                for record in &records {
                    println!("{}", browse::summary_line(record));
                }
            }
            Ok(_) | Err(_) => println!("{COUNTRY_NOT_FOUND}"),
        },
        "detail" => {
            let record = first_match(&app.client, arg).await?;
            let favorite = app.session.is_favorite(&browse::country_code(&record));
            println!("{}", browse::detail_card(&record, favorite));
        }
        "login" => {
            app.session.login(arg)?;
            println!("Login successful!");
        }
        "logout" => {
            app.session.logout();
            println!("Logged out.");
        }
        "fav" => {
            if app.session.current_user().is_none() {
                return Err(AppError::LoginRequired("save favorites".to_string()));
            }
            let record = first_match(&app.client, arg).await?;
            let code = browse::country_code(&record);
            if app.session.toggle_favorite(&code, &record.name.common)? {
                println!("Added {} to favorites.", record.name.common);
            } else {
                println!("Removed {} from favorites.", record.name.common);
            }
        }
        "favorites" => {
            if app.session.favorites().is_empty() {
                println!("No favorites yet.");
            }
            for favorite in app.session.favorites() {
                println!("{} ({})", favorite.name, favorite.code);
            }
        }
        other => println!("Unknown command `{other}`. Type `help` for commands."),
    }
    Ok(())
}

async fn first_match(client: &CountryClient, name: &str) -> Result<CountryRecord, AppError> {
    client
        .fetch_by_name(name)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| AppError::CountryNotFound(name.to_string()))
}

/// Prints every clock update for `duration`.
async fn watch_clock(timer: &LiveTimer<CountryClient>, duration: Duration) {
    if !timer.clock().is_running() {
        println!("No country selected.");
        return;
    }

    if let Some(source) = timer.clock().source() {
        println!("Live time for {} ({}s):", source, duration.as_secs());
    }
    let mut display = timer.clock().subscribe();
    let deadline = tokio::time::sleep(duration);
    tokio::pin!(deadline);

    loop {
        tokio::select! {
            _ = &mut deadline => break,
            changed = display.changed() => {
                if changed.is_err() {
                    break;
                }
                if let Some(tick) = display.borrow_and_update().clone() {
                    println!("{tick}");
                }
            }
        }
    }
}

fn user_message(e: &AppError) -> String {
    match e {
        AppError::InvalidEmail(_) => "Please enter a valid email address.".to_string(),
        AppError::LoginRequired(_) => "Please login to save favorites".to_string(),
        e if e.is_not_found() => COUNTRY_NOT_FOUND.to_string(),
        e if e.is_network() => "Could not reach the country service.".to_string(),
        e => e.to_string(),
    }
}

fn print_suggestions(names: &[String]) {
    for (i, name) in names.iter().enumerate() {
        println!("  {}. {}", i + 1, name);
    }
}

fn prompt() {
    print!("> ");
    // a closed stdout only loses the prompt
    let _ = std::io::stdout().flush();
}
