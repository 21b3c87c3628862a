#![allow(clippy::exit)]

use anyhow::Result;
use clap::Parser as _;
use hannou_cli::cli::{Cli, Commands};
use hannou_cli::commands::{
    UploadArgs, generate_completions, run_config, run_copy, run_delete, run_list, run_search,
    run_tag, run_tags, run_upload,
};
use hannou_cli::config::{self, Config, Overrides};
use hannou_cli::context::build_controller;
use hannou_cli::output::Output;
use hannou_cli::timing;
use hannou_input::SystemClipboard;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    timing::init_tracing(cli.verbose, cli.timing);

    if let Err(e) = run(cli).await {
        Output::new().error(format!("{e:#}"));
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Config {
            base_url,
            csrf_token,
        } => return run_config(&Config::config_path()?, base_url, csrf_token),
        Commands::Completions { shell } => {
            generate_completions(shell);
            return Ok(());
        }
        _ => {}
    }

    let file = Config::load()?;
    let overrides = Overrides {
        base_url: cli.base_url.as_deref(),
        csrf_token: cli.csrf_token.as_deref(),
        cookie: cli.cookie.as_deref(),
    };
    let settings = config::resolve(&file, overrides)?;
    let mut app = build_controller(&settings);

    match cli.command {
        Commands::List { tagless } => run_list(&mut app, tagless).await,
        Commands::Search { query } => run_search(&mut app, query.join(" ")).await,
        Commands::Upload {
            file,
            text,
            thumbnail,
        } => {
            let args = UploadArgs {
                file,
                text,
                thumbnail,
            };
            run_upload(&mut app, &SystemClipboard, args).await
        }
        Commands::Tag { id, tags } => run_tag(&mut app, &id, tags.join(" ")).await,
        Commands::Delete { id } => run_delete(&mut app, &id).await,
        Commands::Copy { id } => run_copy(&mut app, &SystemClipboard, &id).await,
        Commands::Tags { imageless } => run_tags(&mut app, imageless).await,
        Commands::Config { .. } | Commands::Completions { .. } => Ok(()),
    }
}
