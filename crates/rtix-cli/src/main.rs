mod cli;
mod commands;
mod logging;

use cli::{IsParams, ParseParams, SubtypeParams, build_cli};

fn main() {
    let matches = build_cli().get_matches();
    logging::init(matches.get_count("verbose"));

    match matches.subcommand() {
        Some(("parse", m)) => {
            let params = ParseParams::from_matches(m);
            commands::parse::run(params.into());
        }
        Some(("subtype", m)) => {
            let params = SubtypeParams::from_matches(m);
            commands::subtype::run(params.into());
        }
        Some(("is", m)) => {
            let params = IsParams::from_matches(m);
            commands::is::run(params.into());
        }
        _ => unreachable!("clap should have caught this"),
    }
}
