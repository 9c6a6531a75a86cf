// FILE: src/cli/mod.rs

mod handlers;

use crate::config::{self, FileEntry, ModuleOptions};
use crate::error::Result;
use crate::types::ScreenSize;
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::path::{Path, PathBuf};
use std::time::Instant;

pub struct Cli {
    config: Option<ModuleOptions>,
    config_dir: Option<PathBuf>,
    start_time: Instant,
}

impl Default for Cli {
    fn default() -> Self {
        Self::new()
    }
}

impl Cli {
    pub fn new() -> Self {
        Self {
            config: None,
            config_dir: None,
            start_time: Instant::now(),
        }
    }

    pub fn run(&mut self) -> Result<()> {
        self.start_time = Instant::now();
        let matches = self.build_cli().get_matches();

        self.setup_logging(matches.get_count("verbose"));

        if let Some(config_path) = matches.get_one::<PathBuf>("config") {
            self.config = Some(config::load(config_path)?);
            self.config_dir = config_path.parent().map(Path::to_path_buf);
        }

        match matches.subcommand() {
            Some(("build", sub_matches)) => handlers::handle_build_command(self, sub_matches),
            Some(("resolve", sub_matches)) => handlers::handle_resolve_command(self, sub_matches),
            Some(("init", sub_matches)) => handlers::handle_init_command(sub_matches),
            _ => {
                println!("No subcommand specified. Use --help for usage information.");
                Ok(())
            }
        }
    }

    fn build_cli(&self) -> Command {
        Command::new(crate::NAME)
            .version(crate::VERSION)
            .about(crate::DESCRIPTION)
            .arg(
                Arg::new("config")
                    .short('c')
                    .long("config")
                    .value_name("FILE")
                    .help("Configuration file path (.json or .toml)")
                    .value_parser(clap::value_parser!(PathBuf))
                    .global(true)
                    .action(ArgAction::Set),
            )
            .arg(
                Arg::new("verbose")
                    .short('v')
                    .long("verbose")
                    .help("Increase verbosity (can be used multiple times)")
                    .global(true)
                    .action(ArgAction::Count),
            )
            .subcommand(
                with_pipeline_args(Command::new("build").about("Compile stylesheets and publish their loading rules"))
                    .arg(Arg::new("manifest").short('m').long("manifest").value_name("FILE").value_parser(clap::value_parser!(PathBuf)).help("Where to write the artifact manifest"))
                    .arg(Arg::new("stats").long("stats").help("Print build statistics as JSON").action(ArgAction::SetTrue))
                    .arg(Arg::new("watch").short('w').long("watch").help("Watch sources and rebuild on change").action(ArgAction::SetTrue)),
            )
            .subcommand(
                with_pipeline_args(Command::new("resolve").about("Print the resolved file set as JSON without compiling")),
            )
            .subcommand(
                Command::new("init")
                    .about("Write a starter lazycss.toml")
                    .arg(Arg::new("dir").help("Project directory").default_value(".").index(1))
                    .arg(Arg::new("force").short('f').long("force").help("Overwrite an existing configuration").action(ArgAction::SetTrue)),
            )
    }

    fn setup_logging(&self, verbose_count: u8) {
        let log_level = match verbose_count {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        };
        // A second init (e.g. in tests) is harmless
        let _ = env_logger::Builder::from_default_env()
            .filter_level(log_level)
            .format_timestamp_secs()
            .try_init();
    }

    /// Config file values with command-line flags applied on top.
    pub fn build_options(&self, matches: &ArgMatches) -> Result<ModuleOptions> {
        let mut options = self.config.clone().unwrap_or_default();

        if let Some(dir) = matches.get_one::<PathBuf>("input-dir") {
            options.input_dir = Some(dir.clone());
        }
        if let Some(dir) = matches.get_one::<String>("output-dir") {
            options.output_dir = dir.clone();
        }
        if let Some(dir) = matches.get_one::<PathBuf>("cache-dir") {
            options.cache_dir = Some(dir.clone());
        }
        if let Some(files) = matches.get_many::<PathBuf>("file") {
            options.files.extend(files.map(|path| FileEntry {
                file_path: path.clone(),
                output_filename: None,
                width_gt: None,
                width_lt: None,
            }));
        }
        if let Some(width) = matches.get_one::<u32>("width-gt") {
            options.width_gt = Some(ScreenSize { width: *width });
        }
        if let Some(width) = matches.get_one::<u32>("width-lt") {
            options.width_lt = Some(ScreenSize { width: *width });
        }
        if matches.get_flag("no-plugin") {
            options.plugin = false;
        }

        options.validate()?;
        Ok(options)
    }

    /// `--root`, else the config file's directory, else the working directory.
    pub fn project_root(&self, matches: &ArgMatches) -> PathBuf {
        matches
            .get_one::<PathBuf>("root")
            .cloned()
            .or_else(|| self.config_dir.clone().filter(|d| !d.as_os_str().is_empty()))
            .unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn elapsed_ms(&self) -> u128 {
        self.start_time.elapsed().as_millis()
    }
}

fn with_pipeline_args(command: Command) -> Command {
    command
        .arg(Arg::new("root").short('r').long("root").value_name("DIR").value_parser(clap::value_parser!(PathBuf)).help("Project root that source paths are relative to"))
        .arg(Arg::new("input-dir").short('i').long("input-dir").value_name("DIR").value_parser(clap::value_parser!(PathBuf)).help("Directory to scan recursively for sources"))
        .arg(Arg::new("output-dir").short('o').long("output-dir").value_name("DIR").help("Output root and public base URL"))
        .arg(Arg::new("cache-dir").long("cache-dir").value_name("DIR").value_parser(clap::value_parser!(PathBuf)).help("On-disk namespace for compiled output"))
        .arg(Arg::new("file").short('F').long("file").value_name("PATH").value_parser(clap::value_parser!(PathBuf)).help("Add an explicit source file").action(ArgAction::Append))
        .arg(Arg::new("width-gt").long("width-gt").value_name("PX").value_parser(clap::value_parser!(u32)).help("Global rule: load when viewport is wider than PX"))
        .arg(Arg::new("width-lt").long("width-lt").value_name("PX").value_parser(clap::value_parser!(u32)).help("Global rule: load when viewport is narrower than PX"))
        .arg(Arg::new("no-plugin").long("no-plugin").help("Don't publish rules or register the runtime loader").action(ArgAction::SetTrue))
}
