//! Buganizer filter CLI
//!
//! Runs filter strings against issue lists from the command line, with
//! machine-readable `--json` output for scripting.

use anyhow::{anyhow, Context, Result};
use buganizer::cli::{Cli, Commands};
use buganizer::config::BuganizerConfig;
use buganizer::errors::{self, ActionableError};
use buganizer::filter::{self, FilterContext};
use buganizer::output::{
    format_issue_row, ExitCode, JsonError, JsonOutput, OutputContext, ParseResponse,
    PermissionsResponse, RemoveResponse, SuggestResponse, ViewsResponse,
};
use buganizer::permissions::{self, Grant, RESOURCES};
use buganizer::session::{Session, SessionError, UserDirectory};
use buganizer::storage::{
    InMemoryIssueRepository, IssueRepository, RepositoryError, SearchRequest,
};
use buganizer::views::{ViewError, ViewRegistry};
use buganizer::Issue;
use chrono::{NaiveTime, TimeZone, Utc};
use clap::Parser;
use serde::Serialize;
use serde_json::json;
use tracing_subscriber::EnvFilter;

/// Map an error to an exit code, preferring typed errors over message text.
fn error_to_exit_code(error: &anyhow::Error) -> ExitCode {
    if let Some(err) = error.downcast_ref::<RepositoryError>() {
        return match err {
            RepositoryError::NotFound(_) => ExitCode::NotFound,
            RepositoryError::InvalidPageSize(_)
            | RepositoryError::InvalidPageToken(_)
            | RepositoryError::Json(_) => ExitCode::InvalidArgument,
            RepositoryError::Io(io) if io.kind() == std::io::ErrorKind::NotFound => {
                ExitCode::NotFound
            }
            RepositoryError::Io(_) => ExitCode::ExternalError,
        };
    }

    if let Some(err) = error.downcast_ref::<ViewError>() {
        return match err {
            ViewError::EmptyName | ViewError::EmptyQuery => ExitCode::InvalidArgument,
            ViewError::NotFound(_) => ExitCode::NotFound,
            ViewError::PermissionDenied { .. } => ExitCode::PermissionDenied,
        };
    }

    if let Some(SessionError::UnknownUser(_)) = error.downcast_ref::<SessionError>() {
        return ExitCode::NotFound;
    }

    if let Some(io_error) = error.downcast_ref::<std::io::Error>() {
        return match io_error.kind() {
            std::io::ErrorKind::NotFound => ExitCode::NotFound,
            std::io::ErrorKind::PermissionDenied => ExitCode::PermissionDenied,
            _ => ExitCode::ExternalError,
        };
    }

    let error_msg = error.to_string().to_lowercase();
    if error_msg.contains("not found") {
        ExitCode::NotFound
    } else if error_msg.contains("permission denied") {
        ExitCode::PermissionDenied
    } else if error_msg.contains("invalid") {
        ExitCode::InvalidArgument
    } else {
        ExitCode::GenericError
    }
}

/// Build the `--json` error envelope. Actionable context is split into
/// `details.causes` and `suggestions`; other errors keep their full message.
fn to_json_error(error: &anyhow::Error, code: ExitCode, command: &str) -> JsonError {
    let Some(actionable) = error.downcast_ref::<ActionableError>() else {
        return JsonError::new(code.error_code(), error.to_string(), command);
    };

    let mut json_error = JsonError::new(code.error_code(), actionable.message(), command);
    if !actionable.causes().is_empty() {
        json_error = json_error.with_details(json!({ "causes": actionable.causes() }));
    }
    for remedy in actionable.remedies() {
        json_error = json_error.with_suggestion(remedy.as_str());
    }
    json_error
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

fn main() {
    init_tracing();

    let cli = Cli::parse();
    let command = cli.command.name();
    let json = cli.command.wants_json();

    let exit_code = match run(cli) {
        Ok(()) => ExitCode::Success,
        Err(e) => {
            let code = error_to_exit_code(&e);
            if json {
                let json_error = to_json_error(&e, code, command);
                match json_error.to_json_string() {
                    Ok(out) => println!("{}", out),
                    Err(_) => eprintln!("Error: {}", e),
                }
                json_error.exit_code()
            } else {
                eprintln!("Error: {}", e);
                code
            }
        }
    };

    if exit_code != ExitCode::Success {
        std::process::exit(exit_code.code());
    }
}

fn print_json<T: Serialize>(output: &OutputContext, data: T, command: &str) -> Result<()> {
    let json = JsonOutput::success(data, command).to_json_string()?;
    output.print_json(&json)?;
    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    let quiet = cli.quiet;
    let cwd = std::env::current_dir().context("Failed to read working directory")?;
    let config = BuganizerConfig::load(cli.config.as_deref(), &cwd)?;

    match cli.command {
        Commands::Search {
            query,
            issues,
            page,
            page_size,
            page_token,
            order_by,
            order,
            user,
            today,
            json,
        } => {
            let output = OutputContext::new(quiet, json);

            let repo = match &issues {
                Some(path) => InMemoryIssueRepository::load_json(path).map_err(|e| {
                    let help = errors::issues_file_unreadable(path, &e.to_string());
                    anyhow::Error::new(e).context(help)
                })?,
                None => {
                    let now = match today {
                        Some(day) => Utc.from_utc_datetime(&day.and_time(NaiveTime::MIN)),
                        None => Utc::now(),
                    };
                    InMemoryIssueRepository::fixture(config.fixture_count(), now)
                }
            };

            let ctx = match today {
                Some(day) => FilterContext::at(day),
                None => FilterContext::now(),
            }
            .with_current_user(user.unwrap_or_else(|| config.current_user()));

            let query = query.unwrap_or_else(|| config.default_query());
            let mut request = SearchRequest::new(query)
                .page(page)
                .page_size(page_size.unwrap_or_else(|| config.page_size()))
                .order_by(
                    order_by.unwrap_or_else(|| config.order_by()),
                    order.unwrap_or_else(|| config.order()),
                );
            if let Some(token) = &page_token {
                request = request.resume_from(token).map_err(|e| {
                    anyhow::Error::new(e).context(errors::invalid_page_token(token))
                })?;
            }

            let result = repo.search(&request, &ctx)?;

            if output.is_json() {
                return print_json(&output, result, "search");
            }

            for issue in &result.items {
                output.print_data(format_issue_row(issue))?;
            }
            if result.items.is_empty() && result.total > 0 {
                output.print_info(format!(
                    "Page {} is past the end ({} matches)",
                    result.page, result.total
                ))?;
            } else if result.items.is_empty() {
                output.print_info("No matching issues")?;
            } else {
                let first = request.page * request.page_size + 1;
                let last = first + result.items.len() - 1;
                let mut summary = format!("Showing {}-{} of {}", first, last, result.total);
                if let Some(token) = &result.next_page_token {
                    summary.push_str(&format!(" (next page token: {})", token));
                }
                output.print_info(summary)?;
            }
        }

        Commands::Parse { query, json } => {
            let output = OutputContext::new(quiet, json);
            let filters = filter::parse(&query);

            if output.is_json() {
                let response = ParseResponse {
                    normalized: filters.to_query_string(),
                    query,
                    filters,
                };
                return print_json(&output, response, "parse");
            }

            if filters.is_empty() {
                output.print_info("No filters")?;
            }
            for (key, values) in filters.iter() {
                output.print_data(format!("{}: {}", key, values.join(", ")))?;
            }
        }

        Commands::Suggest { partial, json } => {
            let output = OutputContext::new(quiet, json);
            let suggestions = filter::suggest(&partial);

            if output.is_json() {
                let response = SuggestResponse {
                    input: partial,
                    suggestions,
                };
                return print_json(&output, response, "suggest");
            }

            if suggestions.is_empty() {
                output.print_info("No suggestions")?;
            }
            for s in &suggestions {
                output.print_data(format!("{:<12} {}", s.text, s.description))?;
            }
        }

        Commands::Remove {
            query,
            key,
            value,
            json,
        } => {
            let output = OutputContext::new(quiet, json);
            let next = filter::remove_filter(&query, &key, &value);

            if output.is_json() {
                let response = RemoveResponse {
                    query: next,
                    removed: format!("{}:{}", key, value),
                };
                return print_json(&output, response, "remove");
            }
            output.print_data(next)?;
        }

        Commands::Permissions {
            role,
            resource,
            json,
        } => {
            let output = OutputContext::new(quiet, json);

            let grants: Vec<Grant> = match &resource {
                Some(name) => {
                    if !RESOURCES.contains(&name.as_str()) {
                        return Err(anyhow!(
                            "Invalid resource: '{}' (expected one of: {})",
                            name,
                            RESOURCES.join(", ")
                        ));
                    }
                    permissions::grants(role)
                        .iter()
                        .filter(|g| g.resource == name)
                        .copied()
                        .collect()
                }
                None => permissions::grants(role).to_vec(),
            };

            if output.is_json() {
                return print_json(&output, PermissionsResponse { role, grants }, "permissions");
            }

            if grants.is_empty() {
                output.print_info(format!("{} has no permissions here", role))?;
            }
            for g in &grants {
                output.print_data(format!("{:<13} {}", g.resource, g.actions.join(", ")))?;
            }
        }

        Commands::Views {
            user,
            teams,
            id,
            json,
        } => {
            let output = OutputContext::new(quiet, json);
            let user = user.unwrap_or_else(|| config.current_user());
            let registry = ViewRegistry::demo(Utc::now());

            let views = match &id {
                Some(view_id) => {
                    let view = registry.get(view_id, &user, &teams).map_err(|e| {
                        if matches!(e, ViewError::PermissionDenied { .. }) {
                            let help = errors::view_access_denied(view_id, &user);
                            anyhow::Error::new(e).context(help)
                        } else {
                            anyhow::Error::new(e)
                        }
                    })?;
                    vec![view]
                }
                None => registry.list_for(&user, &teams),
            };

            if output.is_json() {
                let response = ViewsResponse {
                    count: views.len(),
                    user,
                    views,
                };
                return print_json(&output, response, "views");
            }

            if views.is_empty() {
                output.print_info(format!("No saved views for {}", user))?;
            }
            for view in &views {
                let scope = view.team_id.as_deref().unwrap_or("personal");
                output.print_data(format!(
                    "{:<8} {:<16} {:<10} {}",
                    view.id, view.name, scope, view.query_string
                ))?;
            }
        }

        Commands::Login { email, json } => {
            let output = OutputContext::new(quiet, json);
            let directory = UserDirectory::demo();
            let session = Session::login(&directory, &email).map_err(|e| {
                let help = errors::unknown_user(&email, &directory.emails());
                anyhow::Error::new(e).context(help)
            })?;

            if output.is_json() {
                return print_json(&output, &session, "login");
            }

            if let Some(user) = session.user() {
                let role = session
                    .highest_role(None)
                    .map(|r| r.to_string())
                    .unwrap_or_else(|| "no role".to_string());
                output.print_data(format!("Signed in as {} <{}> ({})", user.name, user.email, role))?;
            }
        }

        Commands::Schema => {
            let schema = schemars::schema_for!(Vec<Issue>);
            println!("{}", serde_json::to_string_pretty(&schema)?);
        }
    }

    Ok(())
}
