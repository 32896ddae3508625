use anyhow::{Result, bail};
use clap::Parser;

mod cleanup;
mod cli;
mod extract;
mod github;
mod jira;
mod labeler;
mod listings;
mod model;
mod notes;
mod util;

use crate::cli::{Cli, Command};

fn main() -> Result<()> {
  let cli = Cli::parse();

  if cli.gen_man {
    let page = util::render_man_page::<Cli>()?;
    print!("{}", page);
    return Ok(());
  }

  let Some(command) = cli.command else {
    bail!("a subcommand is required; see --help")
  };

  match command {
    Command::Notes(args) => {
      let api = github::api::build_api();
      notes::run(api.as_ref(), &args)
    }
    Command::UpdateIssues(args) => {
      let api = github::api::build_api();
      github::linked_issues::run(api.as_ref(), &args.release_url, args.dry_run)
    }
    Command::LabelPr(args) => {
      let api = github::api::build_api();
      let config = labeler::load_config(args.config.as_deref())?;
      labeler::run(api.as_ref(), args.pr_number, &config, args.mode, args.dry_run)
    }
    Command::ValidateListing(args) => {
      if listings::validate_listing(&args.file) {
        Ok(())
      } else {
        std::process::exit(1);
      }
    }
    Command::FindDuplicates(args) => listings::run_duplicates(&args.first, &args.second, &args.output),
    Command::JiraNotes(args) => {
      let (email, token) = args.credentials()?;
      jira::run(&args.issue, &email, &token, &args.base_url, &args.field)
    }
  }
}
