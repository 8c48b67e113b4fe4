// build.rs

use clap::{Arg, ArgAction, Command};
use clap_mangen::Man;
use std::env;
use std::fs;
use std::path::PathBuf;

/// Common argument: database path
fn db_path_arg() -> Arg {
    Arg::new("db_path")
        .short('d')
        .long("db-path")
        .value_name("PATH")
        .default_value("/var/lib/depot/depot.db")
        .help("Database path")
}

fn build_cli() -> Command {
    Command::new("depot")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Depot Project")
        .about("Debian package repository with mirrors, snapshots and garbage collection")
        .subcommand_required(false)
        .subcommand(
            Command::new("init")
                .about("Initialize a new depot database")
                .arg(db_path_arg()),
        )
        .subcommand(
            Command::new("db").about("Metadata store maintenance").subcommand(
                Command::new("cleanup")
                    .about("Remove packages and pool files nothing references")
                    .arg(db_path_arg())
                    .arg(
                        Arg::new("pool_dir")
                            .short('p')
                            .long("pool-dir")
                            .value_name("DIR")
                            .help("Package pool directory (default: <db dir>/pool, or $DEPOT_POOL_DIR)"),
                    )
                    .arg(
                        Arg::new("dry_run")
                            .long("dry-run")
                            .action(ArgAction::SetTrue)
                            .help("Show what would be removed without removing anything"),
                    )
                    .arg(
                        Arg::new("no_compact")
                            .long("no-compact")
                            .action(ArgAction::SetTrue)
                            .help("Skip compacting the database afterwards"),
                    )
                    .arg(
                        Arg::new("json")
                            .long("json")
                            .action(ArgAction::SetTrue)
                            .help("Print the report as JSON"),
                    )
                    .arg(
                        Arg::new("log_progress")
                            .long("log-progress")
                            .action(ArgAction::SetTrue)
                            .help("Log progress lines instead of drawing a progress bar (for cron jobs)"),
                    ),
            ),
        )
        .subcommand(
            Command::new("mirror")
                .about("Remote mirror management")
                .subcommand(
                    Command::new("drop")
                        .about("Drop a mirror unless snapshots depend on it")
                        .arg(Arg::new("name").required(true).help("Mirror name"))
                        .arg(db_path_arg())
                        .arg(
                            Arg::new("force")
                                .short('f')
                                .long("force")
                                .action(ArgAction::SetTrue)
                                .help("Drop even if snapshots depend on the mirror"),
                        ),
                )
                .subcommand(Command::new("list").about("List mirrors").arg(db_path_arg())),
        )
        .subcommand(
            Command::new("snapshot")
                .about("Snapshot inspection")
                .subcommand(Command::new("list").about("List snapshots").arg(db_path_arg())),
        )
        .subcommand(
            Command::new("completions")
                .about("Generate shell completions")
                .arg(Arg::new("shell").required(true).help("Shell to generate completions for")),
        )
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    let manifest_dir = match env::var("CARGO_MANIFEST_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(e) => {
            println!("cargo:warning=CARGO_MANIFEST_DIR not set: {}", e);
            return;
        }
    };
    let man_dir = manifest_dir.join("man");

    if let Err(e) = fs::create_dir_all(&man_dir) {
        println!("cargo:warning=Failed to create man directory: {}", e);
        return;
    }

    let man = Man::new(build_cli());
    let mut buffer = Vec::new();

    if let Err(e) = man.render(&mut buffer) {
        println!("cargo:warning=Failed to render man page: {}", e);
        return;
    }

    let man_path = man_dir.join("depot.1");
    if let Err(e) = fs::write(&man_path, buffer) {
        println!("cargo:warning=Failed to write man page: {}", e);
    }
}
