//! opsconsole - terminal front end for the operations console

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use opsconsole::api_models::{ActivateLicenseRequest, LicenseRecordQuery, ValidateLicenseRequest};
use opsconsole::forms::environment::RepositoryField;
use opsconsole::forms::license::{expiry_after, AVAILABLE_MODULES};
use opsconsole::handlers::customers::CustomersPage;
use opsconsole::handlers::dashboard::DashboardPage;
use opsconsole::handlers::environments::EnvironmentsPage;
use opsconsole::handlers::licenses::LicensesPage;
use opsconsole::handlers::logs::LogsPage;
use opsconsole::handlers::settings::SettingsPage;
use opsconsole::handlers::users::UsersPage;
use opsconsole::interaction::{Interaction, TerminalInteraction};
use opsconsole::middleware::{post_login_target, protect, Navigation};
use opsconsole::models::{
    CustomerStatus, DeploymentType, EnvironmentStatus, LicenseAction, LicenseStatus, LicenseType,
    Role,
};
use opsconsole::{Config, ConsoleError, ConsoleState};

/// Manage customers, environments, licenses and users of the operations platform
#[derive(Parser, Debug)]
#[command(name = "opsconsole")]
#[command(about = "Operations console for customers, environments and licenses", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Operations API base URL (overrides api.base_url)
    #[arg(long, global = true, env = "OPSCONSOLE_API_URL")]
    api_url: Option<String>,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = Output::Table)]
    output: Output,

    /// Answer yes to every confirmation
    #[arg(short, long, global = true)]
    yes: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Output {
    Table,
    Json,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Sign in and store the session token
    Login {
        #[arg(short, long)]
        username: String,
        /// Password (prompted when omitted)
        #[arg(short, long, env = "OPSCONSOLE_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Sign out and forget the stored token
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Overall customer, environment and license counters
    Dashboard,
    /// Backend health
    Health,
    /// Manage customers
    Customers {
        #[command(subcommand)]
        command: CustomerCommands,
    },
    /// Manage Odoo environments
    Environments {
        #[command(subcommand)]
        command: EnvironmentCommands,
    },
    /// Manage license keys
    Licenses {
        #[command(subcommand)]
        command: LicenseCommands,
    },
    /// Manage console users
    Users {
        #[command(subcommand)]
        command: UserCommands,
    },
    /// Browse the activity log
    Logs {
        #[command(subcommand)]
        command: LogCommands,
    },
    /// System settings and maintenance
    Settings {
        #[command(subcommand)]
        command: SettingsCommands,
    },
}

#[derive(Subcommand, Debug)]
enum CustomerCommands {
    List {
        #[arg(short, long)]
        search: Option<String>,
        #[arg(long)]
        status: Option<CustomerStatus>,
        #[arg(long)]
        deployment_type: Option<DeploymentType>,
    },
    Show {
        id: i64,
    },
    Create {
        #[arg(long)]
        customer_id: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[command(flatten)]
        fields: CustomerFields,
    },
    Update {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[command(flatten)]
        fields: CustomerFields,
    },
    Delete {
        id: i64,
    },
    /// Issue a standard license for an offline customer
    GenerateLicense {
        id: i64,
    },
}

#[derive(clap::Args, Debug)]
struct CustomerFields {
    #[arg(long)]
    company: Option<String>,
    #[arg(long)]
    phone: Option<String>,
    #[arg(long)]
    deployment_type: Option<DeploymentType>,
    #[arg(long)]
    status: Option<CustomerStatus>,
    /// Contract start (YYYY-MM-DD)
    #[arg(long)]
    start: Option<NaiveDate>,
    /// Contract end (YYYY-MM-DD)
    #[arg(long)]
    end: Option<NaiveDate>,
    #[arg(long)]
    notes: Option<String>,
}

#[derive(Subcommand, Debug)]
enum EnvironmentCommands {
    List {
        #[arg(short, long)]
        search: Option<String>,
        #[arg(long)]
        status: Option<EnvironmentStatus>,
        #[arg(long)]
        customer: Option<i64>,
    },
    Show {
        id: i64,
    },
    Create {
        /// Customer record id
        #[arg(long)]
        customer: i64,
        #[arg(long)]
        release_name: String,
        /// Defaults to <release-name>.<domain suffix>
        #[arg(long)]
        domain: Option<String>,
        /// Generated when omitted
        #[arg(long)]
        admin_password: Option<String>,
        /// Addon repository as name=repository[#ref], repeatable
        #[arg(long = "addon")]
        addons: Vec<String>,
        /// Use an external database
        #[arg(long)]
        external_db_host: Option<String>,
        /// Expose through ingress
        #[arg(long)]
        ingress: bool,
    },
    Delete {
        id: i64,
    },
    Start {
        id: i64,
    },
    Stop {
        id: i64,
    },
    Health {
        id: i64,
    },
}

#[derive(Subcommand, Debug)]
enum LicenseCommands {
    List {
        #[arg(short, long)]
        search: Option<String>,
        #[arg(long)]
        status: Option<LicenseStatus>,
        #[arg(long = "type")]
        license_type: Option<LicenseType>,
        #[arg(long)]
        customer: Option<i64>,
    },
    Show {
        id: i64,
    },
    Create {
        #[arg(long)]
        customer: i64,
        #[arg(long = "type", default_value = "trial")]
        license_type: LicenseType,
        /// Validity in days from today (default one year)
        #[arg(long)]
        days: Option<u32>,
        /// Toggle a module on or off, repeatable
        #[arg(long = "module")]
        modules: Vec<String>,
        #[arg(long)]
        notes: Option<String>,
    },
    Delete {
        id: i64,
    },
    Activate {
        id: i64,
        #[arg(long)]
        fingerprint: Option<String>,
        #[arg(long)]
        domain: Option<String>,
        #[arg(long)]
        ip: Option<String>,
    },
    Revoke {
        id: i64,
    },
    Validate {
        license_key: String,
        #[arg(long)]
        fingerprint: Option<String>,
    },
    Usage {
        #[arg(long)]
        license: Option<i64>,
    },
    Logs {
        #[arg(long)]
        license: Option<i64>,
        #[arg(long)]
        action: Option<LicenseAction>,
    },
    /// List the selectable modules
    Modules,
}

#[derive(Subcommand, Debug)]
enum UserCommands {
    List {
        #[arg(short, long)]
        search: Option<String>,
        #[arg(long)]
        role: Option<Role>,
    },
    Show {
        id: i64,
    },
    Create {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "OPSCONSOLE_NEW_USER_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long, default_value = "viewer")]
        role: Role,
    },
    Delete {
        id: i64,
    },
    ResetPassword {
        id: i64,
    },
}

#[derive(Subcommand, Debug)]
enum LogCommands {
    List {
        #[arg(short, long)]
        search: Option<String>,
        #[arg(long)]
        user: Option<i64>,
        #[arg(long)]
        action: Option<String>,
        #[arg(long)]
        target_type: Option<String>,
        #[arg(long)]
        from: Option<NaiveDate>,
        #[arg(long)]
        to: Option<NaiveDate>,
    },
    Show {
        id: i64,
    },
}

#[derive(Subcommand, Debug)]
enum SettingsCommands {
    Show,
    Update {
        #[arg(long)]
        site_name: Option<String>,
        #[arg(long)]
        admin_email: Option<String>,
        #[arg(long)]
        maintenance: Option<bool>,
        #[arg(long)]
        log_retention_days: Option<u32>,
    },
    Info,
    Backup,
    CleanLogs,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let mut config = Config::from_env().context("failed to load configuration")?;
    if let Some(url) = &cli.api_url {
        config.api.base_url = url.clone();
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging.level.clone()));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    debug!(base_url = %config.api.base_url, "starting");
    let interaction: Arc<dyn Interaction> = Arc::new(TerminalInteraction { assume_yes: cli.yes });
    let state = ConsoleState::new(config, interaction);
    state.session.init().await;

    match run(&cli, &state).await {
        Ok(()) => Ok(()),
        Err(err) => match exit_code(&err) {
            Some(code) => {
                explain(&err);
                std::process::exit(code)
            }
            None => Err(err),
        },
    }
}

/// Exit status for console outcomes that were already shown to the
/// operator; anything else is printed by `main`'s error return.
fn exit_code(err: &anyhow::Error) -> Option<i32> {
    match err.downcast_ref::<ConsoleError>()? {
        ConsoleError::Cancelled => Some(0),
        ConsoleError::Api(_) => Some(1),
        ConsoleError::Validation(_) => Some(2),
        _ => None,
    }
}

fn explain(err: &anyhow::Error) {
    match err.downcast_ref::<ConsoleError>() {
        Some(ConsoleError::Cancelled) => eprintln!("Cancelled."),
        Some(ConsoleError::Validation(errors)) => {
            eprintln!("Please fix the following:");
            for (field, message) in errors.iter() {
                eprintln!("  {}: {}", field, message);
            }
        }
        // Already alerted or logged where it happened.
        Some(ConsoleError::Api(e)) => debug!(error = %e, "exiting after api failure"),
        _ => {}
    }
}

async fn run(cli: &Cli, state: &ConsoleState) -> Result<()> {
    let output = cli.output;
    match &cli.command {
        Commands::Login { username, password } => {
            let password = match password {
                Some(p) => p.clone(),
                None => state
                    .interaction
                    .prompt("Password", None)
                    .ok_or(ConsoleError::Cancelled)?,
            };
            let user = state
                .session
                .login(username, &SecretString::new(password))
                .await?;
            info!(next = %post_login_target(None), "signed in");
            println!("Signed in as {}", user.display_name());
        }
        Commands::Logout => {
            state.session.logout().await;
            println!("Signed out");
        }
        Commands::Whoami => {
            require_login(state, "/profile")?;
            let user = state.session.require_user()?;
            emit(output, &user, || {
                print_table(
                    &["ID", "USERNAME", "NAME", "EMAIL", "ROLE"],
                    vec![vec![
                        user.id.to_string(),
                        user.username.clone(),
                        user.display_name(),
                        user.email.clone(),
                        user.role().map(|r| r.to_string()).unwrap_or_default(),
                    ]],
                )
            })?;
        }
        Commands::Dashboard => {
            require_login(state, "/")?;
            let page = DashboardPage::new(state.clone());
            let stats = page.load().await?;
            emit(output, &stats, || {
                print_table(
                    &["RESOURCE", "TOTAL", "DETAIL"],
                    vec![
                        vec![
                            "customers".into(),
                            stats.total_customers.to_string(),
                            format!(
                                "active {} / online {} / offline {} / trial {}",
                                stats.active_customers,
                                stats.online_customers,
                                stats.offline_customers,
                                stats.trial_customers
                            ),
                        ],
                        vec![
                            "environments".into(),
                            stats.total_environments.to_string(),
                            format!(
                                "running {} / stopped {} / error {}",
                                stats.running_environments,
                                stats.stopped_environments,
                                stats.error_environments
                            ),
                        ],
                        vec![
                            "licenses".into(),
                            stats.total_licenses.to_string(),
                            format!(
                                "active {} / expired {} / revoked {}",
                                stats.active_licenses, stats.expired_licenses, stats.revoked_licenses
                            ),
                        ],
                    ],
                )
            })?;
        }
        Commands::Health => {
            let page = DashboardPage::new(state.clone());
            let health = page.health().await?;
            println!("{}", serde_json::to_string_pretty(&health)?);
        }
        Commands::Customers { command } => {
            require_login(state, "/customers")?;
            customers(state, output, command).await?;
        }
        Commands::Environments { command } => {
            require_login(state, "/environments")?;
            environments(state, output, command).await?;
        }
        Commands::Licenses { command } => {
            require_login(state, "/licenses")?;
            licenses(state, output, command).await?;
        }
        Commands::Users { command } => {
            require_login(state, "/users")?;
            users(state, output, command).await?;
        }
        Commands::Logs { command } => {
            require_login(state, "/logs")?;
            logs(state, output, command).await?;
        }
        Commands::Settings { command } => {
            require_login(state, "/settings")?;
            settings(state, output, command).await?;
        }
    }
    Ok(())
}

fn require_login(state: &ConsoleState, location: &str) -> Result<()> {
    match protect(&state.session, location) {
        Navigation::Proceed => Ok(()),
        Navigation::Wait => bail!("session is still loading"),
        Navigation::Redirect { from, .. } => {
            bail!("not signed in (needed for {}); run `opsconsole login` first", from)
        }
    }
}

async fn customers(state: &ConsoleState, output: Output, command: &CustomerCommands) -> Result<()> {
    let page = CustomersPage::new(state.clone());
    match command {
        CustomerCommands::List {
            search,
            status,
            deployment_type,
        } => {
            page.listing().update_filter(|q| {
                q.search = search.clone();
                q.status = *status;
                q.deployment_type = *deployment_type;
            });
            page.load().await?;
            let rows = page.customers();
            emit(output, &rows, || {
                print_table(
                    &["ID", "CUSTOMER ID", "NAME", "EMAIL", "DEPLOYMENT", "STATUS", "ENVS"],
                    rows.iter()
                        .map(|c| {
                            vec![
                                c.id.to_string(),
                                c.customer_id.clone(),
                                c.name.clone(),
                                c.contact_email.clone(),
                                c.deployment_type.to_string(),
                                c.status.to_string(),
                                c.environments_count.to_string(),
                            ]
                        })
                        .collect(),
                )
            })?;
        }
        CustomerCommands::Show { id } => {
            let customer = page.open_detail(*id).await?;
            emit_json(&customer)?;
        }
        CustomerCommands::Create {
            customer_id,
            name,
            email,
            fields,
        } => {
            let mut form = page.open_create()?;
            form.set_customer_id(customer_id.as_str());
            form.set_name(name.as_str());
            form.set_contact_email(email.as_str());
            apply_customer_fields(&mut form, fields);
            let saved = page.submit(&mut form).await?;
            println!("Created customer {} (id {})", saved.customer_id, saved.id);
        }
        CustomerCommands::Update {
            id,
            name,
            email,
            fields,
        } => {
            page.open_detail(*id).await?;
            let mut form = page.edit_selected()?;
            if let Some(name) = name {
                form.set_name(name.as_str());
            }
            if let Some(email) = email {
                form.set_contact_email(email.as_str());
            }
            apply_customer_fields(&mut form, fields);
            let saved = page.submit(&mut form).await?;
            println!("Updated customer {}", saved.customer_id);
        }
        CustomerCommands::Delete { id } => {
            let customer = page.open_detail(*id).await?;
            page.delete(&customer).await?;
            println!("Deleted customer {}", customer.customer_id);
        }
        CustomerCommands::GenerateLicense { id } => {
            page.open_detail(*id).await?;
            let license = page.generate_license().await?;
            emit(output, &license, || println!("{}", license.license_key))?;
        }
    }
    Ok(())
}

fn apply_customer_fields(form: &mut opsconsole::forms::customer::CustomerForm, fields: &CustomerFields) {
    if let Some(company) = &fields.company {
        form.set_company(company.as_str());
    }
    if let Some(phone) = &fields.phone {
        form.set_contact_phone(phone.as_str());
    }
    if let Some(deployment_type) = fields.deployment_type {
        form.set_deployment_type(deployment_type);
    }
    if let Some(status) = fields.status {
        form.set_status(status);
    }
    if fields.start.is_some() {
        form.set_contract_start_date(fields.start);
    }
    if fields.end.is_some() {
        form.set_contract_end_date(fields.end);
    }
    if let Some(notes) = &fields.notes {
        form.set_notes(notes.as_str());
    }
}

/// `name=repository[#ref]`
fn parse_addon(spec: &str) -> Result<(String, String, Option<String>)> {
    let (name, rest) = spec
        .split_once('=')
        .with_context(|| format!("addon `{}` is not name=repository[#ref]", spec))?;
    let (repository, git_ref) = match rest.rsplit_once('#') {
        Some((repository, git_ref)) => (repository, Some(git_ref.to_string())),
        None => (rest, None),
    };
    Ok((name.to_string(), repository.to_string(), git_ref))
}

async fn environments(
    state: &ConsoleState,
    output: Output,
    command: &EnvironmentCommands,
) -> Result<()> {
    let page = EnvironmentsPage::new(state.clone());
    match command {
        EnvironmentCommands::List {
            search,
            status,
            customer,
        } => {
            page.listing().update_filter(|q| {
                q.search = search.clone();
                q.status = *status;
                q.customer = *customer;
            });
            page.load().await?;
            let rows = page.environments();
            emit(output, &rows, || {
                print_table(
                    &["ID", "RELEASE", "CUSTOMER", "DOMAIN", "VERSION", "STATUS"],
                    rows.iter()
                        .map(|e| {
                            vec![
                                e.id.to_string(),
                                e.release_name.clone(),
                                e.customer_name.clone(),
                                e.domain.clone(),
                                e.odoo_version.clone(),
                                e.status.to_string(),
                            ]
                        })
                        .collect(),
                )
            })?;
        }
        EnvironmentCommands::Show { id } => {
            let environment = page.open_detail(*id).await?;
            emit_json(&environment)?;
        }
        EnvironmentCommands::Create {
            customer,
            release_name,
            domain,
            admin_password,
            addons,
            external_db_host,
            ingress,
        } => {
            let mut form = page.open_create()?;
            form.set_customer(*customer);
            form.set_release_name(release_name.as_str());
            if let Some(domain) = domain {
                form.set_domain(domain.as_str());
            }
            match admin_password {
                Some(password) => form.set_admin_password(password.as_str()),
                None => {
                    let generated = form.generate_admin_password();
                    eprintln!("Generated admin password: {}", generated.expose_secret());
                }
            }

            // The form starts with one blank entry.
            form.remove_repository(0);
            for spec in addons {
                let (name, repository, git_ref) = parse_addon(spec)?;
                form.add_repository();
                let index = form.repositories().len() - 1;
                form.update_repository(index, RepositoryField::Name, name);
                form.update_repository(index, RepositoryField::Repository, repository);
                if let Some(git_ref) = git_ref {
                    form.update_repository(index, RepositoryField::Ref, git_ref);
                }
            }

            if let Some(host) = external_db_host {
                let data = form.data_mut();
                data.external_db_enabled = true;
                data.external_db_host = host.clone();
            }
            form.data_mut().ingress_enabled = *ingress;

            let (saved, warnings) = page.submit(&mut form).await?;
            for warning in warnings {
                eprintln!("warning: {}", warning);
            }
            println!("Created environment {} (id {})", saved.release_name, saved.id);
        }
        EnvironmentCommands::Delete { id } => {
            let environment = page.open_detail(*id).await?;
            page.delete(&environment).await?;
            println!("Deleted environment {}", environment.release_name);
        }
        EnvironmentCommands::Start { id } => {
            let environment = page.start(*id).await?;
            println!("{}: {}", environment.release_name, environment.status);
        }
        EnvironmentCommands::Stop { id } => {
            let environment = page.stop(*id).await?;
            println!("{}: {}", environment.release_name, environment.status);
        }
        EnvironmentCommands::Health { id } => {
            let result = page.health_check(*id).await?;
            emit(output, &result, || println!("{}: {}", result.status, result.message))?;
        }
    }
    Ok(())
}

async fn licenses(state: &ConsoleState, output: Output, command: &LicenseCommands) -> Result<()> {
    let page = LicensesPage::new(state.clone());
    match command {
        LicenseCommands::List {
            search,
            status,
            license_type,
            customer,
        } => {
            page.listing().update_filter(|q| {
                q.search = search.clone();
                q.status = *status;
                q.license_type = *license_type;
                q.customer = *customer;
            });
            page.load().await?;
            let rows = page.licenses();
            emit(output, &rows, || {
                print_table(
                    &["ID", "KEY", "CUSTOMER", "TYPE", "STATUS", "VALID UNTIL", "DAYS LEFT"],
                    rows.iter()
                        .map(|l| {
                            vec![
                                l.id.to_string(),
                                l.license_key.clone(),
                                l.customer_name.clone(),
                                l.license_type.to_string(),
                                l.status.to_string(),
                                l.valid_until.date_naive().to_string(),
                                l.days_remaining.to_string(),
                            ]
                        })
                        .collect(),
                )
            })?;
        }
        LicenseCommands::Show { id } => {
            let license = page.open_detail(*id).await?;
            emit_json(&license)?;
        }
        LicenseCommands::Create {
            customer,
            license_type,
            days,
            modules,
            notes,
        } => {
            let mut form = page.open_create()?;
            form.set_customer(*customer);
            form.select_type(*license_type);
            if let Some(days) = days {
                let valid_until = expiry_after(form.data().valid_from, *days)
                    .with_context(|| format!("{} days runs past the last supported date", days))?;
                form.set_valid_until(valid_until);
            }
            for module in modules {
                form.toggle_module(module);
            }
            if let Some(notes) = notes {
                form.set_notes(notes.as_str());
            }
            let saved = page.submit(&mut form).await?;
            emit(output, &saved, || println!("{}", saved.license_key))?;
        }
        LicenseCommands::Delete { id } => {
            let license = page.open_detail(*id).await?;
            page.delete(&license).await?;
            println!("Deleted license {}", license.license_key);
        }
        LicenseCommands::Activate {
            id,
            fingerprint,
            domain,
            ip,
        } => {
            let request = ActivateLicenseRequest {
                hardware_fingerprint: fingerprint.clone(),
                deployment_domain: domain.clone(),
                deployment_ip: ip.clone(),
            };
            let response = page.activate(*id, &request).await?;
            println!("{}", response.message);
        }
        LicenseCommands::Revoke { id } => {
            let response = page.revoke(*id).await?;
            println!("{}", response.message);
        }
        LicenseCommands::Validate {
            license_key,
            fingerprint,
        } => {
            let request = ValidateLicenseRequest {
                license_key: license_key.clone(),
                hardware_fingerprint: fingerprint.clone(),
                ..Default::default()
            };
            let validation = page.validate(&request).await?;
            emit(output, &validation, || {
                if validation.valid {
                    println!(
                        "valid ({} days remaining)",
                        validation.days_remaining.unwrap_or_default()
                    );
                } else {
                    println!(
                        "invalid: {}",
                        validation.error.as_deref().unwrap_or("unknown reason")
                    );
                }
            })?;
        }
        LicenseCommands::Usage { license } => {
            let rows = page.usage(*license).await?;
            emit(output, &rows, || {
                print_table(
                    &["LICENSE", "USERS", "COMPANIES", "STORAGE GB", "IP", "CHECKED"],
                    rows.iter()
                        .map(|u| {
                            vec![
                                u.license_key.clone(),
                                u.current_users.to_string(),
                                u.current_companies.to_string(),
                                format!("{:.1}", u.current_storage_gb),
                                u.access_ip.clone(),
                                u.checked_at.to_rfc3339(),
                            ]
                        })
                        .collect(),
                )
            })?;
        }
        LicenseCommands::Logs { license, action } => {
            let query = LicenseRecordQuery {
                license: *license,
                action: *action,
            };
            let rows = page.logs(&query).await?;
            emit(output, &rows, || {
                print_table(
                    &["LICENSE", "ACTION", "MESSAGE", "BY", "AT"],
                    rows.iter()
                        .map(|l| {
                            vec![
                                l.license_key.clone(),
                                l.action.to_string(),
                                l.message.clone(),
                                l.created_by_name.clone().unwrap_or_default(),
                                l.created_at.to_rfc3339(),
                            ]
                        })
                        .collect(),
                )
            })?;
        }
        LicenseCommands::Modules => {
            print_table(
                &["MODULE", "DESCRIPTION"],
                AVAILABLE_MODULES
                    .iter()
                    .map(|(id, label)| vec![id.to_string(), label.to_string()])
                    .collect(),
            );
        }
    }
    Ok(())
}

async fn users(state: &ConsoleState, output: Output, command: &UserCommands) -> Result<()> {
    let page = UsersPage::new(state.clone());
    match command {
        UserCommands::List { search, role } => {
            page.listing().update_filter(|q| {
                q.search = search.clone();
                q.role = *role;
            });
            page.load().await?;
            let rows = page.users();
            emit(output, &rows, || {
                print_table(
                    &["ID", "USERNAME", "NAME", "EMAIL", "ROLE", "ACTIVE"],
                    rows.iter()
                        .map(|u| {
                            vec![
                                u.id.to_string(),
                                u.username.clone(),
                                u.display_name(),
                                u.email.clone(),
                                u.role().map(|r| r.to_string()).unwrap_or_default(),
                                u.is_active.to_string(),
                            ]
                        })
                        .collect(),
                )
            })?;
        }
        UserCommands::Show { id } => {
            let user = page.open_detail(*id).await?;
            emit_json(&user)?;
        }
        UserCommands::Create {
            username,
            email,
            password,
            role,
        } => {
            let mut form = page.open_create()?;
            form.set_username(username.as_str());
            form.set_email(email.as_str());
            form.set_password(password.as_str());
            form.set_role(*role);
            let saved = page.submit(&mut form).await?;
            println!("Created user {} (id {})", saved.username, saved.id);
        }
        UserCommands::Delete { id } => {
            let user = page.open_detail(*id).await?;
            page.delete(&user).await?;
            println!("Deleted user {}", user.username);
        }
        UserCommands::ResetPassword { id } => {
            page.reset_password(*id).await?;
        }
    }
    Ok(())
}

async fn logs(state: &ConsoleState, output: Output, command: &LogCommands) -> Result<()> {
    let page = LogsPage::new(state.clone());
    match command {
        LogCommands::List {
            search,
            user,
            action,
            target_type,
            from,
            to,
        } => {
            if let (Some(from), Some(to)) = (from, to) {
                if from > to {
                    bail!("--from must not be after --to");
                }
            }
            page.listing().update_filter(|q| {
                q.search = search.clone();
                q.user = *user;
                q.action = action.clone();
                q.target_type = target_type.clone();
                q.start_date = *from;
                q.end_date = *to;
            });
            page.load().await?;
            let rows = page.logs();
            emit(output, &rows, || {
                print_table(
                    &["AT", "USER", "ACTION", "TARGET", "DESCRIPTION"],
                    rows.iter()
                        .map(|l| {
                            vec![
                                l.created_at.to_rfc3339(),
                                l.user_name.clone(),
                                l.action.clone(),
                                format!("{} {}", l.target_type, l.target_id),
                                l.description.clone(),
                            ]
                        })
                        .collect(),
                )
            })?;
        }
        LogCommands::Show { id } => {
            let log = page.detail(*id).await?;
            emit_json(&log)?;
        }
    }
    Ok(())
}

async fn settings(state: &ConsoleState, output: Output, command: &SettingsCommands) -> Result<()> {
    let page = SettingsPage::new(state.clone());
    match command {
        SettingsCommands::Show => {
            let settings = page.load().await?;
            emit_json(&settings)?;
        }
        SettingsCommands::Update {
            site_name,
            admin_email,
            maintenance,
            log_retention_days,
        } => {
            page.load().await?;
            let mut form = page.form()?;
            if let Some(site_name) = site_name {
                form.update("site_name", |d| d.site_name = site_name.clone());
            }
            if let Some(admin_email) = admin_email {
                form.update("admin_email", |d| d.admin_email = admin_email.clone());
            }
            if let Some(maintenance) = maintenance {
                form.update("maintenance_mode", |d| d.maintenance_mode = *maintenance);
            }
            if let Some(days) = log_retention_days {
                form.update("log_retention_days", |d| d.log_retention_days = *days);
            }
            page.save(&mut form).await?;
        }
        SettingsCommands::Info => {
            let info = page.info().await?;
            emit(output, &info, || {
                println!("version:   {}", info.version);
                println!("platform:  {}", info.platform);
                println!("database:  {}", info.database_status);
                if let Some(disk) = &info.disk_usage {
                    println!("disk:      {} of {} used ({})", disk.used, disk.total, disk.usage_percent);
                }
            })?;
        }
        SettingsCommands::Backup => {
            let response = page.backup().await?;
            if !response.message.is_empty() {
                println!("{}", response.message);
            }
        }
        SettingsCommands::CleanLogs => {
            let response = page.clean_logs().await?;
            println!("Deleted {} log entries", response.deleted_count);
        }
    }
    Ok(())
}

fn emit<T: Serialize>(output: Output, value: &T, table: impl FnOnce()) -> Result<()> {
    match output {
        Output::Json => emit_json(value),
        Output::Table => {
            table();
            Ok(())
        }
    }
}

fn emit_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_table(headers: &[&str], rows: Vec<Vec<String>>) {
    if rows.is_empty() {
        println!("(no results)");
        return;
    }
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let line = |cells: Vec<&str>| {
        let padded: Vec<String> = cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect();
        println!("{}", padded.join("  ").trim_end());
    };
    line(headers.to_vec());
    for row in &rows {
        line(row.iter().map(String::as_str).collect());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opsconsole::forms::FieldErrors;
    use opsconsole::ApiError;

    #[test]
    fn test_exit_codes_for_reported_failures() {
        let api = anyhow::Error::from(ConsoleError::Api(ApiError::Server {
            status: 500,
            message: Some("helm upgrade failed".to_string()),
        }));
        assert_eq!(exit_code(&api), Some(1));
        assert_eq!(exit_code(&ConsoleError::Cancelled.into()), Some(0));
        assert_eq!(exit_code(&ConsoleError::Validation(FieldErrors::new()).into()), Some(2));

        // Unreported failures fall through to the default error print.
        assert_eq!(exit_code(&ConsoleError::NoSelection.into()), None);
        assert_eq!(exit_code(&anyhow::anyhow!("not signed in")), None);
    }
}
