// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod runtime;

use anyhow::{Context, Result, anyhow, bail};
use config::Config;
use fieldticket_api::Client;
use fieldticket_app::{
    EditTab, Lease, LeaseField, LeaseId, LeaseScreen, PasswordChange, ProfileField, Session,
    Theme, UniqId, UserId, UserRole,
};
use fieldticket_db::Store;
use runtime::{ApiRuntime, LeaseEdit, LeaseQuery, ProfileChange};
use std::env;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

fn main() {
    init_logging();
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("FIELDTICKET_LOG")
        .unwrap_or_else(|_| EnvFilter::new("fieldticket=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run() -> Result<()> {
    let options = parse_cli_args(env::args().skip(1), Config::default_path()?)?;
    if options.show_help {
        print_help();
        return Ok(());
    }

    if options.print_config_path {
        println!("{}", options.config_path.display());
        return Ok(());
    }

    if options.print_example {
        print!("{}", Config::example_config(&options.config_path));
        return Ok(());
    }

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `fieldticket --print-example-config` to generate a v1 template",
            options.config_path.display()
        )
    })?;

    let db_path = config.db_path()?;
    let store = Store::open(&db_path).with_context(|| {
        format!(
            "open database {} -- if this path is wrong, set [storage].db_path or FIELDTICKET_DB_PATH",
            db_path.display()
        )
    })?;
    store.bootstrap()?;
    let mut session = Session::hydrate(&store)?;

    let base_url = config.api_base_url(session.subdomain.as_deref())?;
    let client = Client::new(&base_url, config.api_timeout()?).with_context(|| {
        format!(
            "invalid [api] config in {}; fix domain/host/base_url/timeout values",
            options.config_path.display()
        )
    })?;
    debug!(base_url = client.base_url(), "api client ready");
    if options.check_only {
        return Ok(());
    }

    match options.command.unwrap_or(Command::Leases(LeaseQuery::default())) {
        Command::Leases(query) => {
            let mut screen = LeaseScreen::new(config.screen_options())?;
            let mut api = ApiRuntime::new(&client);
            runtime::run_lease_query(&mut screen, &mut api, &query)?;
            for lease in screen.page_rows() {
                println!("{}", lease_row(lease));
            }
            println!(
                "page {} of {} ({} matching)",
                screen.page(),
                screen.page_count(),
                screen.visible().len()
            );
        }
        Command::Lease { id, edit } => {
            let mut screen = LeaseScreen::new(config.screen_options())?;
            let mut api = ApiRuntime::new(&client);
            let report = runtime::run_lease_edit(&mut screen, &mut api, &id, &edit)?;
            for (list, uniq_id) in &report.removed {
                println!("deleted {} {uniq_id}", list.label().to_lowercase());
            }
            for toast in &report.toasts {
                eprintln!("warning: {toast}");
            }
            if report.saved {
                println!("lease {id} saved");
            }
            if let Some(lease) = &report.reloaded {
                print_lease(lease);
            }
        }
        Command::Options => {
            let options = runtime::load_options(&client)?;
            println!("tags:");
            for tag in &options.tags {
                println!("  {}\t{}", tag.id, tag.description);
            }
            println!("pumpers:");
            for user in &options.pumpers {
                println!("  {}\t{}", user.id, user.full_name);
            }
            println!("relief:");
            for user in &options.relief {
                println!("  {}\t{}", user.id, user.full_name);
            }
        }
        Command::Profile(change) => {
            let user_id = session
                .user_id
                .clone()
                .ok_or_else(|| anyhow!("not signed in -- run `fieldticket sign-in` first"))?;
            let editor = runtime::run_profile(&client, &user_id, &change)?;
            if let Some(user) = editor.user() {
                println!("user:   {}", user.user_id);
                println!("name:   {}", user.full_name.as_deref().unwrap_or(""));
                println!("role:   {}", user.role_label());
                println!("email:  {}", user.field(ProfileField::Email).unwrap_or(""));
                println!("phone:  {}", user.field(ProfileField::Phone).unwrap_or(""));
            }
            if change.password.is_some() {
                println!("password changed");
            }
        }
        Command::SignIn(signed_in) => {
            let signed_in = Session {
                theme: session.theme,
                ..signed_in
            };
            signed_in.persist(&store)?;
            let user = signed_in
                .user_id
                .as_ref()
                .map_or("", |id| id.as_str());
            println!("signed in as {user}");
        }
        Command::SignOut => {
            session.sign_out(&store)?;
            println!("signed out");
        }
        Command::Theme(choice) => {
            let theme = match choice {
                ThemeChoice::Show => session.theme,
                ThemeChoice::Set(theme) => theme,
                ThemeChoice::Toggle => session.theme.toggled(),
            };
            if theme != session.theme {
                session.set_theme(&store, theme)?;
            }
            println!("{}", session.theme.as_str());
        }
    }
    Ok(())
}

fn lease_row(lease: &Lease) -> String {
    format!(
        "{}\t{}\t{}\t{}",
        lease.id,
        lease.name,
        lease.field(LeaseField::PumperId).unwrap_or(""),
        lease.field(LeaseField::Rrc).unwrap_or("")
    )
}

fn print_lease(lease: &Lease) {
    for field in LeaseField::ALL {
        if let Some(value) = lease.field(field) {
            println!("{:<18}{value}", field.wire_name());
        }
    }
    for tank in &lease.tanks {
        println!(
            "tank {}\t{}\t{}",
            tank.uniq_id,
            tank.tank_id.as_deref().unwrap_or(""),
            tank.size.as_deref().unwrap_or("")
        );
    }
    for well in &lease.wells {
        println!(
            "well {}\t{}\t{}",
            well.uniq_id,
            well.well_id.as_deref().unwrap_or(""),
            well.api.as_deref().unwrap_or("")
        );
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ThemeChoice {
    Show,
    Set(Theme),
    Toggle,
}

#[derive(Debug, Clone, PartialEq)]
enum Command {
    Leases(LeaseQuery),
    Lease { id: LeaseId, edit: LeaseEdit },
    Options,
    Profile(ProfileChange),
    SignIn(Session),
    SignOut,
    Theme(ThemeChoice),
}

#[derive(Debug, Clone, PartialEq)]
struct CliOptions {
    config_path: PathBuf,
    print_config_path: bool,
    print_example: bool,
    check_only: bool,
    show_help: bool,
    command: Option<Command>,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        print_config_path: false,
        print_example: false,
        check_only: false,
        show_help: false,
        command: None,
    };

    let args: Vec<String> = args
        .into_iter()
        .map(|arg| arg.as_ref().to_owned())
        .collect();
    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--config requires a file path"))?;
                options.config_path = PathBuf::from(value);
            }
            "--print-config-path" => {
                options.print_config_path = true;
            }
            "--print-example-config" => {
                options.print_example = true;
            }
            "--check" => {
                options.check_only = true;
            }
            "--help" | "-h" => {
                options.show_help = true;
            }
            name if !name.starts_with('-') => {
                let rest: Vec<String> = iter.by_ref().collect();
                options.command = Some(parse_command(name, rest)?);
            }
            unknown => {
                bail!("unknown argument {unknown:?}; run with --help to see supported options");
            }
        }
    }

    Ok(options)
}

fn parse_command(name: &str, args: Vec<String>) -> Result<Command> {
    let mut iter = args.into_iter();
    match name {
        "leases" => {
            let mut query = LeaseQuery::default();
            while let Some(arg) = iter.next() {
                match arg.as_str() {
                    "--search" => query.search = Some(value(&mut iter, "--search", "a term")?),
                    "--sort" => {
                        let raw = value(&mut iter, "--sort", "a field name")?;
                        query.sort = Some(lease_field(&raw)?);
                    }
                    "--desc" => query.descending = true,
                    "--page" => {
                        let raw = value(&mut iter, "--page", "a page number")?;
                        let page: usize = raw
                            .parse()
                            .with_context(|| format!("--page expects a number, got {raw:?}"))?;
                        query.page = Some(page);
                    }
                    other => return Err(unknown_flag("leases", other)),
                }
            }
            Ok(Command::Leases(query))
        }
        "lease" => {
            let id = iter
                .next()
                .filter(|id| !id.starts_with('-'))
                .ok_or_else(|| anyhow!("lease requires a LeaseID, e.g. `fieldticket lease 1001`"))?;
            let mut edit = LeaseEdit::default();
            while let Some(arg) = iter.next() {
                match arg.as_str() {
                    "--tab" => {
                        let raw = value(&mut iter, "--tab", "a tab name")?;
                        let tab = EditTab::parse(&raw).ok_or_else(|| {
                            anyhow!(
                                "unknown tab {raw:?}; use one of: {}",
                                EditTab::ALL.map(EditTab::as_str).join(", ")
                            )
                        })?;
                        edit.tab = Some(tab);
                    }
                    "--set" => {
                        let raw = value(&mut iter, "--set", "Field=Value")?;
                        let (name, field_value) = assignment(&raw)?;
                        edit.fields.push((lease_field(name)?, field_value.to_owned()));
                    }
                    "--add-tank" => edit
                        .add_tanks
                        .push(value(&mut iter, "--add-tank", "a TankID")?),
                    "--add-well" => edit
                        .add_wells
                        .push(value(&mut iter, "--add-well", "a WellID")?),
                    "--delete-tank" => edit.delete_tanks.push(UniqId::from(
                        value(&mut iter, "--delete-tank", "a tank UniqID")?.as_str(),
                    )),
                    "--delete-well" => edit.delete_wells.push(UniqId::from(
                        value(&mut iter, "--delete-well", "a well UniqID")?.as_str(),
                    )),
                    other => return Err(unknown_flag("lease", other)),
                }
            }
            Ok(Command::Lease {
                id: LeaseId::from(id.as_str()),
                edit,
            })
        }
        "options" => {
            if let Some(other) = iter.next() {
                return Err(unknown_flag("options", &other));
            }
            Ok(Command::Options)
        }
        "profile" => {
            let mut change = ProfileChange::default();
            let mut password = None;
            let mut confirm = None;
            while let Some(arg) = iter.next() {
                match arg.as_str() {
                    "--set" => {
                        let raw = value(&mut iter, "--set", "Field=Value")?;
                        let (name, field_value) = assignment(&raw)?;
                        let field = ProfileField::parse(name).ok_or_else(|| {
                            anyhow!("unknown profile field {name:?}; use Email or Phone")
                        })?;
                        change.fields.push((field, field_value.to_owned()));
                    }
                    "--password" => password = Some(value(&mut iter, "--password", "a password")?),
                    "--confirm" => confirm = Some(value(&mut iter, "--confirm", "a password")?),
                    other => return Err(unknown_flag("profile", other)),
                }
            }
            change.password = match (password, confirm) {
                (None, None) => None,
                (password, confirm) => Some(PasswordChange {
                    password: password.unwrap_or_default(),
                    confirm: confirm.unwrap_or_default(),
                }),
            };
            Ok(Command::Profile(change))
        }
        "sign-in" => {
            let mut session = Session::default();
            while let Some(arg) = iter.next() {
                match arg.as_str() {
                    "--user-id" => {
                        session.user_id = Some(UserId::from(
                            value(&mut iter, "--user-id", "a user id")?.as_str(),
                        ));
                    }
                    "--role" => {
                        let raw = value(&mut iter, "--role", "a role code")?;
                        let role = UserRole::parse(&raw.to_ascii_uppercase()).ok_or_else(|| {
                            anyhow!("unknown role {raw:?}; use P, O, A, or I")
                        })?;
                        session.role = Some(role);
                    }
                    "--company" => {
                        session.company_name = Some(value(&mut iter, "--company", "a name")?);
                    }
                    "--job-role" => {
                        session.job_role = Some(value(&mut iter, "--job-role", "a job role")?);
                    }
                    "--subdomain" => {
                        session.subdomain = Some(value(&mut iter, "--subdomain", "a tenant")?);
                    }
                    "--email" => session.email = Some(value(&mut iter, "--email", "an address")?),
                    "--phone" => session.phone = Some(value(&mut iter, "--phone", "a number")?),
                    other => return Err(unknown_flag("sign-in", other)),
                }
            }
            if !session.is_signed_in() {
                bail!("sign-in requires --user-id");
            }
            if session.role.is_none() {
                bail!("sign-in requires --role (P, O, A, or I)");
            }
            Ok(Command::SignIn(session))
        }
        "sign-out" => {
            if let Some(other) = iter.next() {
                return Err(unknown_flag("sign-out", &other));
            }
            Ok(Command::SignOut)
        }
        "theme" => {
            let choice = match iter.next().as_deref() {
                None => ThemeChoice::Show,
                Some("toggle") => ThemeChoice::Toggle,
                Some(raw) => ThemeChoice::Set(Theme::parse(raw).ok_or_else(|| {
                    anyhow!("unknown theme {raw:?}; use light, dark, or toggle")
                })?),
            };
            if let Some(other) = iter.next() {
                return Err(unknown_flag("theme", &other));
            }
            Ok(Command::Theme(choice))
        }
        unknown => bail!("unknown command {unknown:?}; run with --help to see supported commands"),
    }
}

fn value(iter: &mut impl Iterator<Item = String>, flag: &str, what: &str) -> Result<String> {
    iter.next()
        .ok_or_else(|| anyhow!("{flag} requires {what}"))
}

fn assignment(raw: &str) -> Result<(&str, &str)> {
    raw.split_once('=')
        .filter(|(name, _)| !name.is_empty())
        .ok_or_else(|| anyhow!("expected Field=Value, got {raw:?}"))
}

fn lease_field(name: &str) -> Result<LeaseField> {
    LeaseField::parse(name).ok_or_else(|| {
        anyhow!("unknown lease field {name:?}; use a field name such as LeaseName or RRC")
    })
}

fn unknown_flag(command: &str, flag: &str) -> anyhow::Error {
    anyhow!("unknown argument {flag:?} for {command}; run with --help to see supported options")
}

fn print_help() {
    println!("fieldticket");
    println!("  --config <path>          Use a specific config path");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-example-config   Print a v1 config template");
    println!("  --check                  Validate config + DB + API settings");
    println!("  --help                   Show this help");
    println!();
    println!("commands:");
    println!("  leases [--search T] [--sort FIELD] [--desc] [--page N]");
    println!("  lease <LeaseID> [--tab T] [--set Field=Value]... [--add-tank TankID]...");
    println!("        [--add-well WellID]... [--delete-tank UniqID]... [--delete-well UniqID]...");
    println!("  options");
    println!("  profile [--set Email=V|Phone=V]... [--password P --confirm P]");
    println!("  sign-in --user-id ID --role P|O|A|I [--company C] [--job-role J]");
    println!("          [--subdomain S] [--email E] [--phone P]");
    println!("  sign-out");
    println!("  theme [light|dark|toggle]");
}
