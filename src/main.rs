//! copy-as-markdown - Markdown links for links, images and pages
//!
//! Host events (context-menu clicks, action-button clicks) arrive on the
//! command line and are dispatched through the option store, formatter and
//! clipboard. Options are edited from a small terminal form.

mod app;
mod config;
mod models;
mod screens;
mod services;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing::error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use models::{ClickInfo, OptionKey, OptionSetting, PartialOptions, Tab, DEFAULT_OPTIONS};
use services::{
    open_backend, register_menus, Clipboard, DispatchOutcome, Dispatcher, MenuRegistry, OptionStore,
    SystemClipboard, Trigger,
};

/// copy-as-markdown - copy links, images and pages as Markdown
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Config file path (default: ~/.config/copy-as-markdown/config.toml)
    #[arg(short, long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Register the context-menu entries and list them
    Menus,
    /// Deliver a context-menu click
    Click {
        /// Menu item id, e.g. copy-as-markdown-link
        menu_item_id: String,
        #[arg(long)]
        media_type: Option<String>,
        #[arg(long)]
        src_url: Option<String>,
        #[arg(long)]
        alt: Option<String>,
        #[arg(long)]
        link_text: Option<String>,
        #[arg(long)]
        link_url: Option<String>,
        #[command(flatten)]
        tab: TabArgs,
    },
    /// Deliver an action-button click
    Action {
        #[command(flatten)]
        tab: TabArgs,
    },
    /// Read or change options
    Options {
        #[command(subcommand)]
        command: OptionsCommand,
    },
}

#[derive(Subcommand, Debug)]
enum OptionsCommand {
    /// Print one option, or all of them
    Get { key: Option<String> },
    /// Set one option
    Set { key: String, value: String },
    /// Write the default value of every option
    Reset,
    /// Open the options form
    Edit,
}

/// The originating tab. Omitting --tab-url means no tab was found.
#[derive(clap::Args, Debug)]
struct TabArgs {
    #[arg(long, default_value_t = 0)]
    tab_id: i64,
    #[arg(long)]
    tab_title: Option<String>,
    #[arg(long)]
    tab_url: Option<String>,
}

impl TabArgs {
    fn into_tab(self) -> Option<Tab> {
        let url = self.tab_url?;
        Some(Tab {
            id: self.tab_id,
            title: self.tab_title,
            url: Some(url),
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Set up logging
    let filter = if args.debug {
        "copy_as_markdown=debug,info"
    } else {
        "copy_as_markdown=info,warn"
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Load configuration
    let config = if let Some(path) = args.config {
        config::Config::from_file(&path)?
    } else {
        config::Config::load()?
    };

    let store = OptionStore::new(open_backend(&config.db_path()));
    let clipboard: Arc<dyn Clipboard> = Arc::new(SystemClipboard);

    match args.command {
        Command::Menus => {
            let registry = MenuRegistry::new();
            register_menus(&registry, &store).await?;
            for item in registry.items() {
                println!("{:<24} {}", item.id, item.title);
            }
        }
        Command::Click {
            menu_item_id,
            media_type,
            src_url,
            alt,
            link_text,
            link_url,
            tab,
        } => {
            let info = ClickInfo {
                menu_item_id,
                media_type,
                src_url,
                alt_text: alt,
                link_text,
                link_url,
            };
            let dispatcher = Dispatcher::new(store, clipboard, config.privacy.tracking_params);
            let outcome = dispatcher
                .dispatch(Trigger::MenuClick {
                    info,
                    tab: tab.into_tab(),
                })
                .await?;
            report(&outcome);
        }
        Command::Action { tab } => {
            let tab = tab.into_tab();
            let dispatcher = Dispatcher::new(
                store,
                clipboard.clone(),
                config.privacy.tracking_params,
            );
            let outcome = dispatcher
                .dispatch(Trigger::ActionClick { tab: tab.clone() })
                .await?;

            match (outcome, tab) {
                (DispatchOutcome::ShowPopup(text), Some(tab)) => {
                    let mut app = app::App::popup(tab, text, clipboard);
                    app.run().await?;
                }
                (outcome, _) => report(&outcome),
            }
        }
        Command::Options { command } => match command {
            OptionsCommand::Get { key: Some(key) } => {
                let key: OptionKey = key.parse()?;
                println!("{}", store.get(key).await?);
            }
            OptionsCommand::Get { key: None } => {
                let options = store.get_all().await?;
                for setting in options.settings() {
                    println!("{:<24} {}", setting.key(), setting);
                }
            }
            OptionsCommand::Set { key, value } => {
                let setting = OptionSetting::parse(key.parse()?, &value)?;
                store.set(setting).await?;
            }
            OptionsCommand::Reset => {
                store.set_many(PartialOptions::from(DEFAULT_OPTIONS)).await?;
            }
            OptionsCommand::Edit => {
                let mut app = app::App::options(store);
                app.run().await?;
            }
        },
    }

    Ok(())
}

/// Print the copied text; failures were already logged by the dispatcher.
fn report(outcome: &DispatchOutcome) {
    match outcome {
        DispatchOutcome::Copied(text) | DispatchOutcome::ShowPopup(text) => println!("{}", text),
        DispatchOutcome::Aborted(_) | DispatchOutcome::ClipboardFailed(_) => {
            error!("nothing was copied");
        }
    }
}
