//! Declarative option specs and their binding into `Params`.
//!
//! Actions describe options as data; this module turns them into a clap
//! command and copies whatever the user passed back out by key.
use crate::params::Params;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::path::PathBuf;

pub const OPERATION_ARG: &str = "operation";
pub const FILES_ARG: &str = "files";
pub const VERBOSE_KEY: &str = "verbose";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptKind {
    /// Free-form text value.
    Value,
    Integer,
    Flag,
    /// `--x` sets `true`, the negated long sets `false`; last one wins.
    Toggle { negated: &'static str },
    /// Comma-separated, repeatable.
    List,
    /// A flag that assigns several keys at once. Explicit options override.
    Preset(&'static [(&'static str, &'static str)]),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptSpec {
    pub key: &'static str,
    pub long: &'static str,
    pub short: Option<char>,
    pub value_name: Option<&'static str>,
    pub help: &'static str,
    pub kind: OptKind,
}

impl OptSpec {
    const fn new(key: &'static str, long: &'static str, help: &'static str, kind: OptKind) -> Self {
        Self {
            key,
            long,
            short: None,
            value_name: None,
            help,
            kind,
        }
    }

    pub const fn value(key: &'static str, long: &'static str, help: &'static str) -> Self {
        Self::new(key, long, help, OptKind::Value)
    }

    pub const fn integer(key: &'static str, long: &'static str, help: &'static str) -> Self {
        Self::new(key, long, help, OptKind::Integer)
    }

    pub const fn flag(key: &'static str, long: &'static str, help: &'static str) -> Self {
        Self::new(key, long, help, OptKind::Flag)
    }

    pub const fn toggle(
        key: &'static str,
        long: &'static str,
        negated: &'static str,
        help: &'static str,
    ) -> Self {
        Self::new(key, long, help, OptKind::Toggle { negated })
    }

    pub const fn list(key: &'static str, long: &'static str, help: &'static str) -> Self {
        Self::new(key, long, help, OptKind::List)
    }

    pub const fn preset(
        long: &'static str,
        assigns: &'static [(&'static str, &'static str)],
        help: &'static str,
    ) -> Self {
        Self::new(long, long, help, OptKind::Preset(assigns))
    }

    pub const fn short(mut self, short: char) -> Self {
        self.short = Some(short);
        self
    }

    pub const fn value_name(mut self, name: &'static str) -> Self {
        self.value_name = Some(name);
        self
    }

    fn args(&self) -> Vec<Arg> {
        let mut arg = Arg::new(self.key).long(self.long).help(self.help);
        if let Some(short) = self.short {
            arg = arg.short(short);
        }
        if let Some(name) = self.value_name {
            arg = arg.value_name(name);
        }
        match self.kind {
            OptKind::Value => vec![arg.action(ArgAction::Set)],
            OptKind::Integer => vec![arg
                .action(ArgAction::Set)
                .value_parser(value_parser!(i64))],
            OptKind::Flag | OptKind::Preset(_) => vec![arg.action(ArgAction::SetTrue)],
            OptKind::Toggle { negated } => vec![
                arg.action(ArgAction::SetTrue).overrides_with(negated),
                Arg::new(negated)
                    .long(negated)
                    .action(ArgAction::SetTrue)
                    .overrides_with(self.key)
                    .hide(true),
            ],
            OptKind::List => vec![arg.action(ArgAction::Append).value_delimiter(',')],
        }
    }
}

/// Options every action accepts.
pub fn common_options() -> Vec<OptSpec> {
    vec![OptSpec::flag(VERBOSE_KEY, "verbose", "Print additional information to STDERR").short('v')]
}

pub fn build_command(
    name: &'static str,
    about: &'static str,
    specs: &[OptSpec],
    expects_operation: bool,
    expects_files: bool,
) -> Command {
    let mut command = Command::new(name)
        .bin_name(format!("genoflow {name}"))
        .about(about)
        .disable_version_flag(true);
    let mut index = 1;
    if expects_operation {
        command = command.arg(
            Arg::new(OPERATION_ARG)
                .index(index)
                .value_name("OPERATION")
                .required(false),
        );
        index += 1;
    }
    if expects_files {
        command = command.arg(
            Arg::new(FILES_ARG)
                .index(index)
                .value_name("FILES")
                .num_args(0..)
                .value_parser(value_parser!(PathBuf)),
        );
    }
    for spec in specs.iter().chain(common_options().iter()) {
        for arg in spec.args() {
            command = command.arg(arg);
        }
    }
    command
}

/// Copy matched values into `params`. Presets go first so explicit options
/// always win regardless of argv order.
pub fn bind(matches: &ArgMatches, specs: &[OptSpec], params: &mut Params) {
    let all: Vec<OptSpec> = specs.iter().chain(common_options().iter()).copied().collect();
    for spec in &all {
        if let OptKind::Preset(assigns) = spec.kind {
            if matches.get_flag(spec.key) {
                for (key, value) in assigns {
                    params.set(key, *value);
                }
            }
        }
    }
    for spec in &all {
        match spec.kind {
            OptKind::Value => {
                if let Some(value) = matches.get_one::<String>(spec.key) {
                    params.set(spec.key, value.clone());
                }
            }
            OptKind::Integer => {
                if let Some(value) = matches.get_one::<i64>(spec.key) {
                    params.set(spec.key, *value);
                }
            }
            OptKind::Flag => {
                if matches.get_flag(spec.key) {
                    params.set(spec.key, true);
                }
            }
            OptKind::Toggle { negated } => {
                if matches.get_flag(spec.key) {
                    params.set(spec.key, true);
                } else if matches.get_flag(negated) {
                    params.set(spec.key, false);
                }
            }
            OptKind::List => {
                if let Some(values) = matches.get_many::<String>(spec.key) {
                    params.set(spec.key, values.cloned().collect::<Vec<_>>());
                }
            }
            OptKind::Preset(_) => {}
        }
    }
    if let Ok(Some(operation)) = matches.try_get_one::<String>(OPERATION_ARG) {
        params.set_operation(Some(operation.clone()));
    }
    if let Ok(Some(files)) = matches.try_get_many::<PathBuf>(FILES_ARG) {
        params.set_files(files.cloned().collect());
    }
}
