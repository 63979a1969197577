use clap::{crate_authors, crate_description, crate_version, Arg, ArgAction, Command};
use pretty_env_logger::env_logger::Builder;
use std::env;
use std::io::Write;
use std::path::PathBuf;
use std::process::exit;

use monako_rs::service::Monako;
use monako_rs::Settings;

fn set_logger_level(b: &mut Builder, trace: bool) {
    let mut b = b;
    if trace {
        b = b.filter_level(log::LevelFilter::Trace)
    } else {
        match env::var("RUST_LOG") {
            Ok(filters) => b = b.parse_filters(&filters),
            Err(_) => b = b.filter_level(log::LevelFilter::Info),
        }
    }
    b.init();
}

fn setup_logger(trace: bool) {
    // Adapted from env_logger examples. <3 Systemd support
    match std::env::var("RUST_LOG_STYLE") {
        Ok(s) if s == "SYSTEMD" => {
            let builder = &mut pretty_env_logger::env_logger::builder();
            builder.format(|buf, record| {
                writeln!(
                    buf,
                    "<{}>{}: {}",
                    match record.level() {
                        log::Level::Error => 3,
                        log::Level::Warn => 4,
                        log::Level::Info => 6,
                        log::Level::Debug => 7,
                        log::Level::Trace => 7,
                    },
                    record.target(),
                    record.args()
                )
            });
            set_logger_level(builder, trace);
        }
        _ => {
            let builder = &mut pretty_env_logger::formatted_builder();
            set_logger_level(builder, trace);
        }
    };
}

pub(crate) fn main() {
    let cli = Command::new("Monako")
        .about(format!(
            "{}\n{}",
            crate_description!(),
            "Settings can be overridden with MONAKO__<KEY> environment variables.",
        ))
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .default_value("config.monako.yaml")
                .help("Configuration file"),
        )
        .arg(
            Arg::new("menu-config")
                .long("menu-config")
                .default_value("config.menu.md")
                .help("Menu file for the book theme"),
        )
        .arg(
            Arg::new("target-dir")
                .long("target-dir")
                .default_value(".")
                .help("Target dir for the composed site"),
        )
        .arg(
            Arg::new("base-url")
                .long("base-url")
                .help("Custom base URL"),
        )
        .arg(
            Arg::new("hugo-binary")
                .long("hugo-binary")
                .help("Hugo executable to run"),
        )
        .arg(
            Arg::new("trace")
                .action(ArgAction::SetTrue)
                .long("trace")
                .help("Enable trace logging"),
        )
        .arg(
            Arg::new("fail-on-error")
                .action(ArgAction::SetTrue)
                .long("fail-on-error")
                .help("Fail on hugo errors"),
        )
        .arg(
            Arg::new("check")
                .action(ArgAction::SetTrue)
                .short('t')
                .long("test")
                .help("Check the configuration"),
        )
        .version(crate_version!())
        .author(crate_authors!("\n"));

    let args = cli.get_matches();

    setup_logger(args.get_flag("trace"));

    let path_arg = |name: &str| {
        args.get_one::<String>(name)
            .map(PathBuf::from)
            .unwrap_or_default()
    };

    let settings = Settings {
        config_file: path_arg("config"),
        menu_file: path_arg("menu-config"),
        target_dir: path_arg("target-dir"),
        base_url: args.get_one::<String>("base-url").cloned(),
        hugo_binary: args.get_one::<String>("hugo-binary").cloned(),
        fail_on_error: args.get_flag("fail-on-error"),
    };

    if args.get_flag("check") {
        match settings.load_config() {
            Ok(config) => {
                tracing::info!(
                    origins = config.origins.len(),
                    base_url = config.base_url,
                    "Configuration is valid."
                );
                exit(0);
            }
            Err(err) => {
                tracing::error!("{err}");
                exit(2);
            }
        }
    }

    let monako = match Monako::init(&settings) {
        Ok(m) => m,
        Err(err) => {
            tracing::error!("{err}");
            exit(2);
        }
    };

    if let Err(err) = monako.run() {
        tracing::error!("{err}");
        exit(1);
    }
}
